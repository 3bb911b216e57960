use crate::controller;
use crate::device::Deserializer;
use crate::error;
use crate::i2c;
use crate::i2c::Transport;
use crate::properties;
use crate::types;

macro_rules! register {
    ($($module:ident),+) => {
        paste::paste! {
            $(
                pub mod $module;
            )+

            #[derive(Debug, Copy, Clone, PartialEq, Eq)]
            pub enum Type {
                $(
                    [<$module:camel>],
                )+
            }

            impl std::fmt::Display for Type {
                fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    match self {
                        $(
                            Self::[<$module:camel>] => write!(formatter, stringify!($module)),
                        )+
                    }
                }
            }

            impl Type {
                pub fn name(self) -> &'static str  {
                    match self {
                        $(
                            Type::[<$module:camel>] => $module::Chip::PROPERTIES.name,
                        )+
                    }
                }
            }

            #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
            #[serde(tag = "type", content = "configuration")]
            pub enum Configuration {
                $(
                    #[serde(rename = "" $module)]
                    [<$module:camel>]($module::Configuration),
                )+
            }

            impl Configuration {
                pub fn deserialize_bincode(
                    device_type: Type,
                    data: &[u8]
                ) -> bincode::Result<Configuration> {
                    match device_type {
                        $(
                            Type::[<$module:camel>] => Ok(
                                Configuration::[<$module:camel>](bincode::deserialize(data)?)
                            ),
                        )+
                    }
                }

                pub fn device_type(&self) -> Type {
                    match self {
                        $(
                            Configuration::[<$module:camel>](_) => Type::[<$module:camel>],
                        )+
                    }
                }

                pub fn type_name(&self) -> &'static str {
                    self.device_type().name()
                }
            }

            pub enum Device {
                $(
                    [<$module:camel>]($module::Device),
                )+
            }

            pub fn detect<T: Transport + ?Sized>(transport: &mut T, address: u16) -> Result<Type, Error> {
                let mut reads = Vec::new();
                $(
                    let read = transport.read_at(address, $module::Chip::CHIP_ID_REGISTER)?;
                    if read == $module::Chip::CHIP_ID {
                        return Ok(Type::[<$module:camel>]);
                    }
                    reads.push(read);
                )+
                log::error!("unknown chip at 0x{address:02x} (read {reads:02x?})");
                Err(Error::NoDevice { address, read: reads.last().copied().unwrap_or_default() })
            }

            pub fn open_with(
                transport: Box<dyn Transport>,
                address: u16,
                configuration: Configuration,
            ) -> Result<Device, Error> {
                match configuration {
                    $(
                        Configuration::[<$module:camel>](configuration) => $module::Device::open(
                            transport,
                            address,
                            configuration,
                        )
                        .map(Device::[<$module:camel>])
                        .map_err(|error| Error::Device {
                            device_type: Type::[<$module:camel>],
                            error,
                        }),
                    )+
                }
            }

            impl Device {
                pub fn device_type(&self) -> Type {
                    match self {
                        $(
                            Self::[<$module:camel>](_) => Type::[<$module:camel>],
                        )+
                    }
                }

                pub fn name(&self) -> &'static str {
                    self.device_type().name()
                }

                pub fn properties(&self) -> properties::Deserializer {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.properties(),
                        )+
                    }
                }

                pub fn address(&self) -> u16 {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.address(),
                        )+
                    }
                }

                pub fn state(&self) -> controller::State {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.state(),
                        )+
                    }
                }

                pub fn stream_count(&self) -> u32 {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.stream_count(),
                        )+
                    }
                }

                pub fn available_mask(&self) -> u8 {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.available_mask(),
                        )+
                    }
                }

                pub fn locked_mask(&self) -> u8 {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.locked_mask(),
                        )+
                    }
                }

                pub fn link_status(&self, link: types::Link) -> bool {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.link_status(link),
                        )+
                    }
                }

                pub fn set_link_stream(&self, link: types::Link, enable: bool) -> Result<(), error::Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.set_link_stream(link, enable),
                        )+
                    }
                }

                pub fn set_sub_stream(&self, value: i64) -> Result<(), error::Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.set_sub_stream(value),
                        )+
                    }
                }

                pub fn set_output(&self, enable: bool) -> Result<(), error::Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.set_output(enable),
                        )+
                    }
                }

                pub fn reset_link(&self, link: types::Link) -> Result<(), error::Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.reset_link(link),
                        )+
                    }
                }

                pub fn suspend(&self) -> Result<(), error::Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.suspend(),
                        )+
                    }
                }

                pub fn resume(&self) -> Result<(), error::Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.resume(),
                        )+
                    }
                }

                pub fn format(&self, pad: usize) -> Result<types::Format, error::Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.format(pad),
                        )+
                    }
                }

                pub fn set_format(&self, pad: usize, format: types::Format) -> Result<types::Format, error::Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.set_format(pad, format),
                        )+
                    }
                }

                pub fn sub_streams(&self) -> Vec<types::SubStream> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.sub_streams(),
                        )+
                    }
                }

                pub fn link_frequencies(&self) -> &'static [i64] {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.link_frequencies(),
                        )+
                    }
                }
            }

            #[derive(Debug, PartialEq, Eq)]
            pub struct ParseTypeError {
                on: String
            }

            impl std::fmt::Display for ParseTypeError {
                fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(formatter, "unknow device type \"{}\"", self.on)
                }
            }

            impl std::error::Error for ParseTypeError {}

            impl std::str::FromStr for Type {
                type Err = ParseTypeError;

                fn from_str(string: &str) -> Result<Self, Self::Err> {
                    match string {
                        $(
                            stringify!($module) => paste::paste! {Ok(Self::[<$module:camel>])},
                        )+
                        _ => Err(Self::Err {on: string.to_owned()}),
                    }
                }
            }
        }
    };
}

register! { max96716, max96724 }

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    I2c(#[from] i2c::Error),

    #[error("{device_type}: {error}")]
    Device {
        device_type: Type,
        #[source]
        error: error::Error,
    },

    #[error("no supported deserializer at 0x{address:02x} (id 0x{read:02x})")]
    NoDevice { address: u16, read: u8 },
}

impl Error {
    pub fn device_error(&self) -> Option<&error::Error> {
        match self {
            Self::Device { error, .. } => Some(error),
            _ => None,
        }
    }
}

pub fn open(bus: &i2c::Configuration, configuration: Configuration) -> Result<Device, Error> {
    let transport = i2c::Bus::open(bus)?;
    log::debug!(
        "opened {} for {} at 0x{:02x}",
        bus.path,
        configuration.type_name(),
        bus.address
    );
    open_with(Box::new(transport), bus.address, configuration)
}

pub fn detect_on(bus: &i2c::Configuration) -> Result<Type, Error> {
    let mut transport = i2c::Bus::open(bus)?;
    detect(&mut transport, bus.address)
}
