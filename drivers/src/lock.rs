use crate::configuration;
use crate::device;
use crate::i2c;
use crate::registers;
use crate::types::Link;

pub fn is_locked<Deserializer, Transport>(
    transport: &mut Transport,
    address: u16,
    link: Link,
) -> bool
where
    Deserializer: device::Deserializer,
    Transport: i2c::Transport + ?Sized,
{
    let register = match Deserializer::lock_register(link) {
        Some(register) => register,
        None => {
            log::error!("invalid link {link}");
            return false;
        }
    };
    match registers::read(transport, address, register) {
        Ok(value) => value & Deserializer::LOCK_BIT != 0,
        Err(_) => {
            log::error!("failed to get link status {link}");
            false
        }
    }
}

pub fn locked_mask<Deserializer, Transport>(transport: &mut Transport, address: u16) -> u8
where
    Deserializer: device::Deserializer,
    Transport: i2c::Transport + ?Sized,
{
    Deserializer::PROPERTIES
        .links
        .iter()
        .fold(0u8, |mask, link| {
            mask | ((is_locked::<Deserializer, _>(transport, address, *link) as u8) << link.index())
        })
}

pub fn wait_locked<Deserializer, Transport>(
    transport: &mut Transport,
    address: u16,
    link: Link,
    polling: &configuration::LockPolling,
) -> bool
where
    Deserializer: device::Deserializer,
    Transport: i2c::Transport + ?Sized,
{
    let attempts = polling.attempts.max(1);
    for attempt in 0..attempts {
        if is_locked::<Deserializer, _>(transport, address, link) {
            return true;
        }
        if attempt + 1 < attempts {
            transport.sleep(polling.interval);
        }
    }
    false
}
