use crate::properties;
use crate::registers::{Register, Update};
use crate::types::Link;

pub trait Deserializer: Sized {
    const PROPERTIES: properties::Deserializer;

    const CHIP_ID: u8;

    const CHIP_ID_REGISTER: u16 = 0x000D;

    const LOCK_BIT: u8 = 0x08;

    /// Best-effort writes issued before the chip is identified.
    /// `None` targets the deserializer itself, failures are logged and ignored.
    const PRE_IDENTIFY: &'static [(Option<u16>, Register)] = &[];

    const REGULATORS: &'static [Update];

    const CONFIGURATION: &'static [&'static [Register]] = &[];

    const RESET: &'static [Update];

    const RESET_DELAY: std::time::Duration = std::time::Duration::from_millis(100);

    const DIAGNOSTICS: &'static [(&'static str, u16)] = &[];

    const FINALIZE: &'static [&'static [Register]] = &[];

    const ISOLATION_REGISTERS: &'static [u16];

    const MIPI_ENABLE: &'static [Register];

    const MIPI_DISABLE: &'static [Register];

    const OUTPUT_ENABLE: &'static [Register] = &[];

    const OUTPUT_DISABLE: &'static [Register] = &[];

    const REMOTE_INITIALIZATION: &'static [Register];

    fn lock_register(link: Link) -> Option<u16>;

    fn isolate(link: Link) -> Vec<Update>;

    fn has_link(link: Link) -> bool {
        Self::PROPERTIES.links.contains(&link)
    }
}

pub mod remote {
    /// Writing `alias << 1` moves the serializer to `alias`.
    pub const DEVICE_ADDRESS: u16 = 0x0000;

    pub const PROBE: u16 = 0x0010;

    pub const DEVICE_ID: u16 = 0x000D;
}
