pub mod bring_up;
pub mod configuration;
pub mod controller;
pub mod device;
pub mod devices;
pub mod error;
pub mod i2c;
pub mod lock;
pub mod properties;
pub mod registers;

pub use crate::controller::Controller;
pub use crate::controller::State;
pub use crate::devices::detect;
pub use crate::devices::open;
pub use crate::devices::Configuration;
pub use crate::devices::Device;
pub use crate::devices::Error;
pub use crate::devices::Type;
pub use crate::i2c::Configuration as I2cConfiguration;

pub use bincode;
pub use gmsl_types as types;
pub use libc;
