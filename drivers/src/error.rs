use crate::configuration;
use crate::controller;
use crate::i2c;
use crate::registers;
use crate::types::Link;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    I2c(#[from] i2c::Error),

    #[error(transparent)]
    Registers(#[from] registers::Error),

    #[error(transparent)]
    Configuration(#[from] configuration::Error),

    #[error("{0} not locked")]
    LinkNotLocked(Link),

    #[error("failed to detect {device} (expected id 0x{expected:02x}, read 0x{read:02x})")]
    UnsupportedDevice {
        device: &'static str,
        expected: u8,
        read: u8,
    },

    #[error("no remote devices connected")]
    NoRemoteDevices,

    #[error("no device on {0}")]
    LinkNotAvailable(Link),

    #[error("pad {0} does not accept this operation")]
    InvalidPad(usize),

    #[error("media bus code 0x{0:04x} has no CSI-2 data type")]
    UnsupportedFormat(u32),

    #[error("{operation} is not allowed while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: controller::State,
    },
}
