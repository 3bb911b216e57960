use crate::configuration;
use crate::device;
use crate::device::remote;
use crate::error::Error;
use crate::i2c;
use crate::lock;
use crate::registers;
use crate::types::Link;

/// Runs `operation` with only `link`'s remote control channel open.
///
/// The isolation registers are read before isolating and written back
/// afterwards, once per register, whatever `operation` returned.
pub fn with_isolation<Deserializer, Transport, Output, Operation>(
    transport: &mut Transport,
    address: u16,
    link: Link,
    operation: Operation,
) -> Result<Output, Error>
where
    Deserializer: device::Deserializer,
    Transport: i2c::Transport + ?Sized,
    Operation: FnOnce(&mut Transport) -> Result<Output, Error>,
{
    let mut snapshot = Vec::with_capacity(Deserializer::ISOLATION_REGISTERS.len());
    for register in Deserializer::ISOLATION_REGISTERS {
        snapshot.push((*register, registers::read(transport, address, *register)?));
    }
    let result = Deserializer::isolate(link)
        .iter()
        .try_for_each(|update| registers::update(transport, address, update))
        .map_err(Error::from)
        .and_then(|()| operation(transport));
    let mut restored = Ok(());
    for (register, value) in snapshot {
        if let Err(error) = registers::write(transport, address, register, value) {
            log::error!("failed to restore control channels after {link} ({error})");
            if restored.is_ok() {
                restored = Err(Error::from(error));
            }
        }
    }
    let output = result?;
    restored?;
    Ok(output)
}

pub fn bring_up<Deserializer, Transport>(
    transport: &mut Transport,
    address: u16,
    remote_device: &configuration::RemoteDevice,
    polling: &configuration::LockPolling,
) -> Result<(), Error>
where
    Deserializer: device::Deserializer,
    Transport: i2c::Transport + ?Sized,
{
    let link = remote_device.link;
    if !lock::wait_locked::<Deserializer, _>(transport, address, link, polling) {
        log::info!("link {link} not locked");
        return Err(Error::LinkNotLocked(link));
    }
    with_isolation::<Deserializer, _, _, _>(transport, address, link, |transport| {
        // a serializer that does not answer at its factory address was moved by a previous run
        let current_address = match transport.read_at(remote_device.physical_address, remote::PROBE)
        {
            Ok(_) => remote_device.physical_address,
            Err(error) => {
                log::debug!(
                    "{link}: no answer at 0x{:02x} ({error}), assuming alias 0x{:02x}",
                    remote_device.physical_address,
                    remote_device.alias_address
                );
                remote_device.alias_address
            }
        };
        registers::write(
            transport,
            current_address,
            remote::DEVICE_ADDRESS,
            (remote_device.alias_address << 1) as u8,
        )?;
        match transport.read_at(remote_device.alias_address, remote::DEVICE_ID) {
            Ok(id) if id == remote_device.serializer.device_id() => log::info!(
                "{link}: {} id 0x{id:02x} at 0x{:02x}",
                remote_device.serializer,
                remote_device.alias_address
            ),
            Ok(id) => log::warn!(
                "{link}: expected {} id 0x{:02x}, read 0x{id:02x} at 0x{:02x}",
                remote_device.serializer,
                remote_device.serializer.device_id(),
                remote_device.alias_address
            ),
            Err(error) => log::warn!(
                "{link}: serializer id read at 0x{:02x} failed ({error})",
                remote_device.alias_address
            ),
        }
        registers::apply(
            transport,
            remote_device.alias_address,
            remote_device
                .initialization
                .as_deref()
                .unwrap_or(Deserializer::REMOTE_INITIALIZATION),
        )?;
        Ok(())
    })
}
