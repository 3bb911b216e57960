use crate::device;
use crate::registers::Register;
use crate::types::Link;

#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Serializer {
    Max9295,
    Max96717F,
}

impl Serializer {
    pub fn device_id(self) -> u8 {
        match self {
            Self::Max9295 => 0x91,
            Self::Max96717F => 0xC8,
        }
    }
}

impl std::fmt::Display for Serializer {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Self::Max9295 => "MAX9295",
            Self::Max96717F => "MAX96717F",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RemoteDevice {
    pub link: Link,
    pub physical_address: u16,
    pub alias_address: u16,
    pub serializer: Serializer,
    pub initialization: Option<Vec<Register>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Pins {
    pub power_down: Option<u32>,
    pub lock: Option<u32>,
    pub error: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LockPolling {
    pub attempts: u32,
    pub interval: std::time::Duration,
}

impl Default for LockPolling {
    fn default() -> Self {
        Self {
            attempts: 1,
            interval: std::time::Duration::from_millis(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Configuration {
    pub remote_devices: Vec<RemoteDevice>,
    pub pins: Pins,
    pub lock_polling: LockPolling,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{link} is not a port of {device}")]
    UnknownLink { link: Link, device: &'static str },

    #[error("{0} has more than one remote device")]
    DuplicateLink(Link),

    #[error("alias address 0x{0:02x} is used by more than one remote device")]
    DuplicateAlias(u16),

    #[error("0x{0:02x} is not a 7-bit address")]
    Address(u16),

    #[error("alias address 0x{0:02x} collides with the deserializer")]
    LocalAddressCollision(u16),
}

impl Configuration {
    pub fn deserialize_bincode(data: &[u8]) -> bincode::Result<Configuration> {
        bincode::deserialize(data)
    }

    pub fn remote_device(&self, link: Link) -> Option<&RemoteDevice> {
        self.remote_devices
            .iter()
            .find(|remote_device| remote_device.link == link)
    }

    pub fn validate<Deserializer: device::Deserializer>(
        &self,
        local_address: u16,
    ) -> Result<(), Error> {
        let mut links = 0u8;
        let mut aliases = std::collections::HashSet::new();
        for remote_device in self.remote_devices.iter() {
            if !Deserializer::has_link(remote_device.link) {
                return Err(Error::UnknownLink {
                    link: remote_device.link,
                    device: Deserializer::PROPERTIES.name,
                });
            }
            if links & remote_device.link.bit() != 0 {
                return Err(Error::DuplicateLink(remote_device.link));
            }
            links |= remote_device.link.bit();
            for address in [remote_device.physical_address, remote_device.alias_address] {
                if address > 0x7F {
                    return Err(Error::Address(address));
                }
            }
            if remote_device.alias_address == local_address {
                return Err(Error::LocalAddressCollision(remote_device.alias_address));
            }
            if !aliases.insert(remote_device.alias_address) {
                return Err(Error::DuplicateAlias(remote_device.alias_address));
            }
        }
        Ok(())
    }
}
