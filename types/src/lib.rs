pub const MEDIA_BUS_FMT_UYVY8_1X16: u32 = 0x200F;

pub const MIPI_CSI2_TYPE_YUV422_8: u8 = 0x1E;

/// Register address reinterpreted as a delay, the value is a duration in milliseconds.
pub const DELAY_ADDRESS: u16 = 0xFFFF;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Link {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
}

impl Link {
    pub const ALL: [Link; 4] = [Link::A, Link::B, Link::C, Link::D];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl std::fmt::Display for Link {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "SIO{}",
            match self {
                Self::A => 'A',
                Self::B => 'B',
                Self::C => 'C',
                Self::D => 'D',
            }
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Register {
    pub address: u16,
    pub value: u8,
}

impl Register {
    pub const fn new(address: u16, value: u8) -> Self {
        Self { address, value }
    }

    pub const fn delay(milliseconds: u8) -> Self {
        Self {
            address: DELAY_ADDRESS,
            value: milliseconds,
        }
    }

    pub fn delay_duration(&self) -> Option<std::time::Duration> {
        if self.address == DELAY_ADDRESS {
            Some(std::time::Duration::from_millis(self.value as u64))
        } else {
            None
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Format {
    pub width: u32,
    pub height: u32,
    pub code: u32,
}

/// Packed description of the stream carried by one link.
///
/// Bits 63..56 hold the virtual channel, 55..48 the CSI-2 data type,
/// 47..32 the width, 31..16 the height and 15..0 the media bus code.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubStream(pub u64);

impl SubStream {
    pub const fn new(virtual_channel: u8, data_type: u8, width: u16, height: u16, code: u16) -> Self {
        Self(
            ((virtual_channel as u64) << 56)
                | ((data_type as u64) << 48)
                | ((width as u64) << 32)
                | ((height as u64) << 16)
                | code as u64,
        )
    }

    pub fn virtual_channel(self) -> u8 {
        (self.0 >> 56) as u8
    }

    pub fn data_type(self) -> u8 {
        ((self.0 >> 48) & 0xFF) as u8
    }

    pub fn width(self) -> u16 {
        ((self.0 >> 32) & 0xFFFF) as u16
    }

    pub fn height(self) -> u16 {
        ((self.0 >> 16) & 0xFFFF) as u16
    }

    pub fn code(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    pub fn set_virtual_channel(&mut self, virtual_channel: u32) {
        self.0 = (self.0 & 0x00FF_FFFF_FFFF_FFFF) | (((virtual_channel & 0xFF) as u64) << 56);
    }

    pub fn set_data_type(&mut self, data_type: u32) {
        self.0 = (self.0 & 0xFF00_FFFF_FFFF_FFFF) | (((data_type & 0xFF) as u64) << 48);
    }

    pub fn set_width(&mut self, width: u32) {
        self.0 = (self.0 & 0xFFFF_0000_FFFF_FFFF) | (((width & 0xFFFF) as u64) << 32);
    }

    pub fn set_height(&mut self, height: u32) {
        self.0 = (self.0 & 0xFFFF_FFFF_0000_FFFF) | (((height & 0xFFFF) as u64) << 16);
    }

    pub fn set_code(&mut self, code: u32) {
        self.0 = (self.0 & 0xFFFF_FFFF_FFFF_0000) | (code & 0xFFFF) as u64;
    }
}
