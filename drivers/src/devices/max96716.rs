use crate::controller;
use crate::device;
use crate::i2c;
use crate::properties;
use crate::registers::{Register, Update};
use crate::types;
use crate::types::Link;

pub type Configuration = crate::configuration::Configuration;

pub type Device<Transport = Box<dyn i2c::Transport>> = controller::Controller<Chip, Transport>;

pub struct Chip;

// pipe Y vc 0 and pipe Z vc 1, FS/DATA/FE identity mapping to CSI controller 1
const VIDEO_PIPE_TO_CSI_CONTROLLER: &[Register] = &[
    Register::new(0x044B, 0x07),
    Register::new(0x044D, 0x00),
    Register::new(0x044E, 0x00),
    Register::new(0x044F, 0x1E),
    Register::new(0x0450, 0x1E),
    Register::new(0x0451, 0x01),
    Register::new(0x0452, 0x01),
    Register::new(0x046D, 0x15),
    Register::new(0x048B, 0x07),
    Register::new(0x048D, 0x00),
    Register::new(0x048E, 0x40),
    Register::new(0x048F, 0x1E),
    Register::new(0x0490, 0x5E),
    Register::new(0x0491, 0x01),
    Register::new(0x0492, 0x41),
    Register::new(0x04AD, 0x15),
];

// link A pipe Z to pipe Y, link B pipe Z to pipe Z
const VIDEO_PIPE_SELECTION: &[Register] = &[Register::new(0x0161, 0x32), Register::new(0x0160, 0x03)];

// CSI out disabled, 2x4, 800 Mbps, 2 lanes
const MIPI_PHY: &[Register] = &[
    Register::new(0x0313, 0x00),
    Register::new(0x0330, 0x04),
    Register::new(0x044A, 0x50),
    Register::new(0x0320, 0x28),
];

const RLMS: &[Register] = &[
    Register::new(0x143F, 0x3D),
    Register::new(0x143E, 0xFD),
    Register::new(0x14AD, 0x68),
    Register::new(0x14AC, 0xA8),
    Register::new(0x148C, 0x10),
    Register::new(0x1498, 0xC0),
    Register::new(0x1446, 0x01),
    Register::new(0x1445, 0x81),
    Register::new(0x140B, 0x44),
    Register::new(0x140A, 0x08),
    Register::new(0x1431, 0x18),
    Register::new(0x1421, 0x08),
    Register::new(0x14A5, 0x70),
    Register::new(0x153F, 0x3D),
    Register::new(0x153E, 0xFD),
    Register::new(0x15AD, 0x68),
    Register::new(0x15AC, 0xA8),
    Register::new(0x158C, 0x10),
    Register::new(0x1598, 0xC0),
    Register::new(0x1546, 0x01),
    Register::new(0x1545, 0x81),
    Register::new(0x150B, 0x44),
    Register::new(0x150A, 0x08),
    Register::new(0x1531, 0x18),
    Register::new(0x1521, 0x08),
    Register::new(0x15A5, 0x70),
];

const REMOTE_CONTROL_CHANNEL_A: Update = Update::set(0x0003, 1 << 2);
const REMOTE_CONTROL_CHANNEL_B: Update = Update::set(0x0001, 1 << 4);

impl device::Deserializer for Chip {
    const PROPERTIES: properties::Deserializer = properties::Deserializer {
        name: "MAX96716",
        links: &[Link::A, Link::B],
        default_format: types::Format {
            width: 1920,
            height: 1080,
            code: types::MEDIA_BUS_FMT_UYVY8_1X16,
        },
        default_sub_streams: &[
            types::SubStream(0x001e07800438200f),
            types::SubStream(0x011e07800438200f),
        ],
        link_frequencies: &[400_000_000, 800_000_000],
    };

    const CHIP_ID: u8 = 0xBE;

    const REGULATORS: &'static [Update] = &[Update::set(0x0010, 0x04), Update::set(0x0012, 0x10)];

    const CONFIGURATION: &'static [&'static [Register]] =
        &[VIDEO_PIPE_SELECTION, VIDEO_PIPE_TO_CSI_CONTROLLER, MIPI_PHY, RLMS];

    const RESET: &'static [Update] = &[Update::set(0x0010, 0x20), Update::set(0x0012, 0x20)];

    const ISOLATION_REGISTERS: &'static [u16] = &[0x0001, 0x0003];

    const MIPI_ENABLE: &'static [Register] =
        &[Register::new(0x0330, 0x04), Register::new(0x0330, 0x84)];

    const MIPI_DISABLE: &'static [Register] = &[Register::new(0x0330, 0x04)];

    const REMOTE_INITIALIZATION: &'static [Register] = &[
        Register::new(0x0001, 0xE4),
        Register::new(0x0318, 0x5E),
        Register::new(0x0302, 0x10),
        Register::new(0x1417, 0x00),
        Register::new(0x1432, 0x7F),
        Register::new(0x0010, 0x31),
        Register::delay(100),
    ];

    fn lock_register(link: Link) -> Option<u16> {
        match link {
            Link::A => Some(0x0013),
            Link::B => Some(0x5009),
            Link::C | Link::D => None,
        }
    }

    // a set bit disables the link's remote control channel
    fn isolate(link: Link) -> Vec<Update> {
        match link {
            Link::A => vec![
                Update::clear(REMOTE_CONTROL_CHANNEL_A.register, REMOTE_CONTROL_CHANNEL_A.bits),
                REMOTE_CONTROL_CHANNEL_B,
            ],
            Link::B => vec![
                REMOTE_CONTROL_CHANNEL_A,
                Update::clear(REMOTE_CONTROL_CHANNEL_B.register, REMOTE_CONTROL_CHANNEL_B.bits),
            ],
            Link::C | Link::D => vec![REMOTE_CONTROL_CHANNEL_A, REMOTE_CONTROL_CHANNEL_B],
        }
    }
}
