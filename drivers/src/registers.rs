use crate::i2c;

pub use gmsl_types::Register;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    I2c(#[from] i2c::Error),

    #[error("register list write failed at entry {index}")]
    List {
        index: usize,
        #[source]
        source: i2c::Error,
    },
}

impl Error {
    pub fn transport(&self) -> &i2c::Error {
        match self {
            Self::I2c(error) => error,
            Self::List { source, .. } => source,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Update {
    pub register: u16,
    pub mask: u8,
    pub bits: u8,
}

impl Update {
    pub const fn set(register: u16, bits: u8) -> Self {
        Self {
            register,
            mask: bits,
            bits,
        }
    }

    pub const fn clear(register: u16, bits: u8) -> Self {
        Self {
            register,
            mask: bits,
            bits: 0,
        }
    }

    pub const fn write(register: u16, value: u8) -> Self {
        Self {
            register,
            mask: 0xFF,
            bits: value,
        }
    }

    pub fn apply_to(&self, value: u8) -> u8 {
        (value & !self.mask) | (self.bits & self.mask)
    }
}

pub fn read<Transport: i2c::Transport + ?Sized>(
    transport: &mut Transport,
    address: u16,
    register: u16,
) -> Result<u8, i2c::Error> {
    transport.read_at(address, register).map_err(|error| {
        log::error!("address 0x{address:02x} register 0x{register:04x} read failed ({error})");
        error
    })
}

pub fn write<Transport: i2c::Transport + ?Sized>(
    transport: &mut Transport,
    address: u16,
    register: u16,
    value: u8,
) -> Result<(), i2c::Error> {
    transport
        .write_at(address, register, value)
        .map_err(|error| {
            log::error!(
                "address 0x{address:02x} register 0x{register:04x} write 0x{value:02x} failed ({error})"
            );
            error
        })
}

pub fn update<Transport: i2c::Transport + ?Sized>(
    transport: &mut Transport,
    address: u16,
    update: &Update,
) -> Result<(), i2c::Error> {
    let value = if update.mask == 0xFF {
        update.bits
    } else {
        update.apply_to(read(transport, address, update.register)?)
    };
    write(transport, address, update.register, value)
}

/// Writes `list` in order, delay entries suspend the caller instead.
///
/// Stops at the first failed write, the device is then partially configured.
pub fn apply<Transport: i2c::Transport + ?Sized>(
    transport: &mut Transport,
    address: u16,
    list: &[Register],
) -> Result<(), Error> {
    for (index, register) in list.iter().enumerate() {
        if let Some(duration) = register.delay_duration() {
            transport.sleep(duration);
            continue;
        }
        if let Err(source) = write(transport, address, register.address, register.value) {
            log::error!("address 0x{address:02x} register list write failed @ ({index})");
            return Err(Error::List { index, source });
        }
    }
    Ok(())
}
