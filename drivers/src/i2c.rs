use std::os::fd::AsRawFd;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Configuration {
    pub path: String,
    pub address: u16,
    pub retries: u32,
}

impl Configuration {
    pub fn deserialize_bincode(data: &[u8]) -> bincode::Result<Configuration> {
        bincode::deserialize(data)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("opening \"{path}\" failed (errno {errno})")]
    Open { path: String, errno: i32 },

    #[error("address 0x{address:02x} register 0x{register:04x} transfer failed (errno {errno})")]
    Transfer {
        address: u16,
        register: u16,
        errno: i32,
    },

    #[error("address 0x{address:02x} register 0x{register:04x} not acknowledged")]
    Nack { address: u16, register: u16 },
}

impl Error {
    pub fn address(&self) -> Option<u16> {
        match self {
            Self::Open { .. } => None,
            Self::Transfer { address, .. } | Self::Nack { address, .. } => Some(*address),
        }
    }
}

/// The slave address is a parameter of every transaction, implementations
/// must not keep a "current target" between calls.
pub trait Transport: Send {
    fn read_at(&mut self, address: u16, register: u16) -> Result<u8, Error>;

    fn write_at(&mut self, address: u16, register: u16, value: u8) -> Result<(), Error>;

    fn sleep(&mut self, duration: std::time::Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_at(&mut self, address: u16, register: u16) -> Result<u8, Error> {
        (**self).read_at(address, register)
    }

    fn write_at(&mut self, address: u16, register: u16, value: u8) -> Result<(), Error> {
        (**self).write_at(address, register, value)
    }

    fn sleep(&mut self, duration: std::time::Duration) {
        (**self).sleep(duration)
    }
}

// linux/i2c.h and linux/i2c-dev.h
const I2C_M_RD: u16 = 0x0001;
const I2C_RDWR: u64 = 0x0707;

#[repr(C)]
struct I2cMsg {
    addr: u16,
    flags: u16,
    len: u16,
    buf: *mut u8,
}

#[repr(C)]
struct I2cRdwrIoctlData {
    msgs: *mut I2cMsg,
    nmsgs: u32,
}

pub struct Bus {
    file: std::fs::File,
    retries: u32,
}

impl Bus {
    pub fn open(configuration: &Configuration) -> Result<Self, Error> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&configuration.path)
            .map_err(|error| Error::Open {
                path: configuration.path.clone(),
                errno: error.raw_os_error().unwrap_or(libc::ENODEV),
            })?;
        Ok(Self {
            file,
            retries: configuration.retries,
        })
    }

    fn transfer(&self, register: u16, messages: &mut [I2cMsg]) -> Result<(), Error> {
        let address = messages[0].addr;
        let mut data = I2cRdwrIoctlData {
            msgs: messages.as_mut_ptr(),
            nmsgs: messages.len() as u32,
        };
        let mut attempt = 0;
        loop {
            // unsafe: the messages and their buffers outlive the ioctl call
            let status = unsafe {
                libc::ioctl(
                    self.file.as_raw_fd(),
                    I2C_RDWR as _,
                    &mut data as *mut I2cRdwrIoctlData,
                )
            };
            if status == messages.len() as libc::c_int {
                return Ok(());
            }
            let error = if status < 0 {
                match std::io::Error::last_os_error().raw_os_error() {
                    Some(libc::ENXIO) | Some(libc::EREMOTEIO) => Error::Nack { address, register },
                    errno => Error::Transfer {
                        address,
                        register,
                        errno: errno.unwrap_or(libc::EIO),
                    },
                }
            } else {
                Error::Transfer {
                    address,
                    register,
                    errno: libc::EIO,
                }
            };
            if attempt >= self.retries {
                return Err(error);
            }
            attempt += 1;
        }
    }
}

impl Transport for Bus {
    fn read_at(&mut self, address: u16, register: u16) -> Result<u8, Error> {
        let mut register_bytes = register.to_be_bytes();
        let mut value = [0u8; 1];
        let mut messages = [
            I2cMsg {
                addr: address,
                flags: 0,
                len: register_bytes.len() as u16,
                buf: register_bytes.as_mut_ptr(),
            },
            I2cMsg {
                addr: address,
                flags: I2C_M_RD,
                len: value.len() as u16,
                buf: value.as_mut_ptr(),
            },
        ];
        self.transfer(register, &mut messages)?;
        Ok(value[0])
    }

    fn write_at(&mut self, address: u16, register: u16, value: u8) -> Result<(), Error> {
        let [high, low] = register.to_be_bytes();
        let mut buffer = [high, low, value];
        let mut messages = [I2cMsg {
            addr: address,
            flags: 0,
            len: buffer.len() as u16,
            buf: buffer.as_mut_ptr(),
        }];
        self.transfer(register, &mut messages)
    }
}
