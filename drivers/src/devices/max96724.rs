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

// one-shot reset of the four links, the serializers need it after re-addressing
const LINK_RESET: &[Register] = &[Register::new(0x0018, 0x0F), Register::delay(100)];

// pipes 0 to 3 mapped to CSI controller 1, PHY 1 and 2 at 1.2 Gbps, CSI output left off
const CSI_CONFIGURATION: &[Register] = &[
    Register::new(0x0017, 0x14),
    Register::new(0x0019, 0x94),
    Register::new(0x06C2, 0x10),
    Register::new(0x1401, 0x03),
    Register::new(0x1501, 0x03),
    Register::new(0x1601, 0x03),
    Register::new(0x1701, 0x03),
    Register::new(0x1445, 0x00),
    Register::new(0x1545, 0x00),
    Register::new(0x1645, 0x00),
    Register::new(0x1745, 0x00),
    Register::new(0x0010, 0x11),
    Register::new(0x0011, 0x11),
    Register::new(0x0006, 0x11),
    Register::new(0x0018, 0x0F),
    Register::new(0x0003, 0xFE),
    Register::new(0x0003, 0xAA),
    Register::new(0x00F0, 0x60),
    Register::new(0x00F1, 0xEA),
    Register::new(0x00F4, 0x0F),
    Register::new(0x090B, 0x07),
    Register::new(0x092D, 0x15),
    Register::new(0x090D, 0x1E),
    Register::new(0x090E, 0x1E),
    Register::new(0x090F, 0x00),
    Register::new(0x0910, 0x00),
    Register::new(0x0911, 0x01),
    Register::new(0x0912, 0x01),
    Register::new(0x094B, 0x07),
    Register::new(0x096D, 0x2A),
    Register::new(0x094D, 0x1E),
    Register::new(0x094E, 0x1E),
    Register::new(0x094F, 0x00),
    Register::new(0x0950, 0x00),
    Register::new(0x0951, 0x01),
    Register::new(0x0952, 0x01),
    Register::new(0x08A0, 0x04),
    Register::new(0x08A3, 0xE4),
    Register::new(0x08A4, 0xE4),
    Register::new(0x094A, 0xC0),
    Register::new(0x090A, 0xC0),
    Register::new(0x098A, 0xC0),
    Register::new(0x09CA, 0xC0),
    Register::new(0x08A2, 0xF0),
    Register::new(0x1C00, 0xF4),
    Register::new(0x1D00, 0xF4),
    Register::new(0x1E00, 0xF4),
    Register::new(0x1F00, 0xF4),
    Register::new(0x0415, 0x2C),
    Register::new(0x0418, 0x2C),
    Register::new(0x041B, 0x2C),
    Register::new(0x041E, 0x2C),
    Register::new(0x1C00, 0xF5),
    Register::new(0x1D00, 0xF5),
    Register::new(0x1E00, 0xF5),
    Register::new(0x1F00, 0xF5),
    Register::new(0x040B, 0x00),
];

const REMOTE_CONTROL_CHANNELS: u16 = 0x0003;

impl device::Deserializer for Chip {
    const PROPERTIES: properties::Deserializer = properties::Deserializer {
        name: "MAX96724",
        links: &[Link::A, Link::B, Link::C, Link::D],
        default_format: types::Format {
            width: 1600,
            height: 1300,
            code: types::MEDIA_BUS_FMT_UYVY8_1X16,
        },
        default_sub_streams: &[
            types::SubStream(0x001e06400514200f),
            types::SubStream(0x011e06400514200f),
            types::SubStream(0x001e06400514200f),
            types::SubStream(0x011e06400514200f),
        ],
        link_frequencies: &[400_000_000, 800_000_000],
    };

    const CHIP_ID: u8 = 0xA0;

    // serializers left at 0x28 and 0x2a by the boot firmware answer on every
    // control channel, park them before anything else talks on the bus
    const PRE_IDENTIFY: &'static [(Option<u16>, Register)] = &[
        (None, Register::new(REMOTE_CONTROL_CHANNELS, 0xFF)),
        (Some(0x28), Register::new(0x0001, 0x11)),
        (Some(0x28), Register::new(0x0003, 0x57)),
        (Some(0x2A), Register::new(0x0001, 0x11)),
        (Some(0x2A), Register::new(0x0003, 0x57)),
    ];

    const REGULATORS: &'static [Update] = &[Update::set(0x0017, 0x04), Update::set(0x0019, 0x10)];

    const RESET: &'static [Update] = &[Update::write(0x0018, 0x0F)];

    const DIAGNOSTICS: &'static [(&'static str, u16)] = &[
        ("CC settings", 0x0001),
        ("Link settings", 0x0006),
        ("Cable settings", 0x0022),
    ];

    const FINALIZE: &'static [&'static [Register]] = &[LINK_RESET, CSI_CONFIGURATION];

    const ISOLATION_REGISTERS: &'static [u16] = &[REMOTE_CONTROL_CHANNELS];

    const MIPI_ENABLE: &'static [Register] =
        &[Register::new(0x08A0, 0x04), Register::new(0x08A0, 0x84)];

    const MIPI_DISABLE: &'static [Register] = &[Register::new(0x08A0, 0x04)];

    const OUTPUT_ENABLE: &'static [Register] =
        &[Register::new(0x0002, 0x53), Register::new(0x040B, 0x42)];

    const OUTPUT_DISABLE: &'static [Register] =
        &[Register::new(0x0002, 0x03), Register::new(0x040B, 0x00)];

    const REMOTE_INITIALIZATION: &'static [Register] = &[
        Register::new(0x02DF, 0x00),
        Register::new(0x0330, 0x0C),
        Register::new(0x0330, 0x84),
        Register::new(0x0309, 0x01),
        Register::new(0x030A, 0x00),
        Register::new(0x0314, 0x5E),
        Register::new(0x0315, 0x80),
        Register::new(0x02DF, 0x10),
    ];

    fn lock_register(link: Link) -> Option<u16> {
        Some(match link {
            Link::A => 0x001A,
            Link::B => 0x000A,
            Link::C => 0x000B,
            Link::D => 0x000C,
        })
    }

    // two bits per link, all set disables every remote control channel
    fn isolate(link: Link) -> Vec<Update> {
        vec![Update::write(
            REMOTE_CONTROL_CHANNELS,
            !(1u8 << (2 * link.index())),
        )]
    }
}
