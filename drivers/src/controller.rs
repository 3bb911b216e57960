use crate::bring_up;
use crate::configuration;
use crate::device;
use crate::error::Error;
use crate::i2c;
use crate::lock;
use crate::properties;
use crate::registers;
use crate::types;
use crate::types::Link;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    Unidentified,
    Identified,
    LinksDiscovered,
    Ready,
    Suspended,
}

struct Inner<Transport> {
    transport: Transport,
    state: State,
    locked: u8,
    available: u8,
    streaming: u8,
    requested: u8,
    stream_count: u32,
    formats: Vec<types::Format>,
    sub_streams: Vec<types::SubStream>,
}

pub struct Controller<Deserializer, Transport>
where
    Deserializer: device::Deserializer,
    Transport: i2c::Transport,
{
    address: u16,
    configuration: configuration::Configuration,
    inner: std::sync::Mutex<Inner<Transport>>,
    deserializer: std::marker::PhantomData<fn() -> Deserializer>,
}

pub fn mbus_code_to_mipi(code: u32) -> Result<u8, Error> {
    match code {
        types::MEDIA_BUS_FMT_UYVY8_1X16 => Ok(types::MIPI_CSI2_TYPE_YUV422_8),
        code => Err(Error::UnsupportedFormat(code)),
    }
}

impl<Deserializer, Transport> Controller<Deserializer, Transport>
where
    Deserializer: device::Deserializer,
    Transport: i2c::Transport,
{
    pub fn open(
        transport: Transport,
        address: u16,
        configuration: configuration::Configuration,
    ) -> Result<Self, Error> {
        configuration.validate::<Deserializer>(address)?;
        log::info!(
            "{} at 0x{address:02x}, power down pin {:?}, lock pin {:?}, error pin {:?}",
            Deserializer::PROPERTIES.name,
            configuration.pins.power_down,
            configuration.pins.lock,
            configuration.pins.error,
        );
        let links = Deserializer::PROPERTIES.links.len();
        let controller = Self {
            address,
            configuration,
            inner: std::sync::Mutex::new(Inner {
                transport,
                state: State::Unidentified,
                locked: 0,
                available: 0,
                streaming: 0,
                requested: 0,
                stream_count: 0,
                formats: vec![Deserializer::PROPERTIES.default_format; links],
                sub_streams: (0..links)
                    .map(|index| {
                        Deserializer::PROPERTIES
                            .default_sub_streams
                            .get(index)
                            .copied()
                            .unwrap_or_default()
                    })
                    .collect(),
            }),
            deserializer: std::marker::PhantomData,
        };
        {
            let mut inner = controller.lock();
            controller.initialize(&mut inner)?;
        }
        Ok(controller)
    }

    pub fn properties(&self) -> properties::Deserializer {
        Deserializer::PROPERTIES
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn state(&self) -> State {
        self.lock().state
    }

    pub fn available_mask(&self) -> u8 {
        self.lock().available
    }

    pub fn stream_count(&self) -> u32 {
        self.lock().stream_count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<Transport>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn initialize(&self, inner: &mut Inner<Transport>) -> Result<(), Error> {
        inner.state = State::Unidentified;
        inner.available = 0;
        inner.streaming = 0;
        inner.stream_count = 0;
        self.pre_identify(inner);
        self.identify_locked(inner)?;
        self.global_reset_locked(inner)?;
        self.discover_links_locked(inner)?;
        self.bring_up_all_links_locked(inner)?;
        Ok(())
    }

    fn pre_identify(&self, inner: &mut Inner<Transport>) {
        for (address, register) in Deserializer::PRE_IDENTIFY {
            let address = address.unwrap_or(self.address);
            if let Err(error) = inner
                .transport
                .write_at(address, register.address, register.value)
            {
                log::warn!(
                    "address 0x{address:02x} register 0x{:04x} pre-identify write ignored ({error})",
                    register.address
                );
            }
        }
    }

    fn identify_locked(&self, inner: &mut Inner<Transport>) -> Result<(), Error> {
        let read = registers::read(
            &mut inner.transport,
            self.address,
            Deserializer::CHIP_ID_REGISTER,
        )?;
        if read != Deserializer::CHIP_ID {
            log::error!(
                "failed to detect {} (id 0x{read:02x})",
                Deserializer::PROPERTIES.name
            );
            return Err(Error::UnsupportedDevice {
                device: Deserializer::PROPERTIES.name,
                expected: Deserializer::CHIP_ID,
                read,
            });
        }
        log::info!(
            "{} id 0x{read:02x} at 0x{:02x}",
            Deserializer::PROPERTIES.name,
            self.address
        );
        if inner.state == State::Unidentified {
            inner.state = State::Identified;
        }
        Ok(())
    }

    fn global_reset_locked(&self, inner: &mut Inner<Transport>) -> Result<(), Error> {
        for update in Deserializer::REGULATORS {
            registers::update(&mut inner.transport, self.address, update)?;
        }
        for list in Deserializer::CONFIGURATION {
            registers::apply(&mut inner.transport, self.address, list)?;
        }
        for update in Deserializer::RESET {
            registers::update(&mut inner.transport, self.address, update)?;
        }
        inner.transport.sleep(Deserializer::RESET_DELAY);
        for (name, register) in Deserializer::DIAGNOSTICS {
            if let Ok(value) = registers::read(&mut inner.transport, self.address, *register) {
                log::debug!("{name} 0x{value:02x}");
            }
        }
        Ok(())
    }

    fn discover_links_locked(&self, inner: &mut Inner<Transport>) -> Result<u8, Error> {
        if inner.state == State::Unidentified {
            return Err(Error::InvalidState {
                operation: "link discovery",
                state: inner.state,
            });
        }
        inner.locked = lock::locked_mask::<Deserializer, _>(&mut inner.transport, self.address);
        log::info!("Link status {:x}", inner.locked);
        if inner.locked == 0 {
            log::error!("No remote devices connected");
            return Err(Error::NoRemoteDevices);
        }
        if inner.state == State::Identified {
            inner.state = State::LinksDiscovered;
        }
        Ok(inner.locked)
    }

    fn bring_up_all_links_locked(&self, inner: &mut Inner<Transport>) -> Result<u8, Error> {
        if !matches!(inner.state, State::LinksDiscovered | State::Ready) {
            return Err(Error::InvalidState {
                operation: "link bring-up",
                state: inner.state,
            });
        }
        let mut available = 0u8;
        for remote_device in self.configuration.remote_devices.iter() {
            let link = remote_device.link;
            let result = if inner.locked & link.bit() == 0 {
                Err(Error::LinkNotLocked(link))
            } else {
                bring_up::bring_up::<Deserializer, _>(
                    &mut inner.transport,
                    self.address,
                    remote_device,
                    &self.configuration.lock_polling,
                )
            };
            match result {
                Ok(()) => available |= link.bit(),
                Err(error) => log::warn!("{link} excluded ({error})"),
            }
        }
        for link in Deserializer::PROPERTIES.links {
            if inner.streaming & !available & link.bit() != 0 {
                if let Err(error) = self.set_link_stream_locked(inner, *link, false) {
                    log::error!("failed to stop link {link} ({error})");
                }
            }
        }
        inner.available = available;
        if inner.state == State::LinksDiscovered {
            for list in Deserializer::FINALIZE {
                registers::apply(&mut inner.transport, self.address, list)?;
            }
            // the finalize lists may reset the links again
            inner.locked = lock::locked_mask::<Deserializer, _>(&mut inner.transport, self.address);
            log::info!("Link status {:x}", inner.locked);
            for link in Deserializer::PROPERTIES.links {
                if inner.available & !inner.locked & link.bit() != 0 {
                    log::warn!("{link} lost lock after initialization");
                }
            }
            inner.available &= inner.locked;
            if inner.locked == 0 {
                log::error!("No remote devices connected");
                return Err(Error::NoRemoteDevices);
            }
            inner.state = State::Ready;
        }
        Ok(inner.available)
    }

    fn set_link_stream_locked(
        &self,
        inner: &mut Inner<Transport>,
        link: Link,
        enable: bool,
    ) -> Result<(), Error> {
        if inner.available & link.bit() == 0 {
            log::error!("No device on link {link}");
            return Err(Error::LinkNotAvailable(link));
        }
        if enable {
            if inner.streaming & link.bit() != 0 {
                return Ok(());
            }
            if inner.stream_count == 0 {
                log::debug!("power on MIPI");
                registers::apply(&mut inner.transport, self.address, Deserializer::MIPI_ENABLE)?;
            }
            inner.stream_count += 1;
            inner.streaming |= link.bit();
        } else {
            if inner.streaming & link.bit() == 0 {
                return Ok(());
            }
            inner.streaming &= !link.bit();
            inner.stream_count -= 1;
            if inner.stream_count == 0 {
                log::debug!("power off MIPI");
                registers::apply(&mut inner.transport, self.address, Deserializer::MIPI_DISABLE)?;
            }
        }
        Ok(())
    }

    fn require_ready(inner: &Inner<Transport>, operation: &'static str) -> Result<(), Error> {
        if inner.state == State::Ready {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: inner.state,
            })
        }
    }

    pub fn identify(&self) -> Result<(), Error> {
        let mut inner = self.lock();
        self.identify_locked(&mut inner)
    }

    pub fn global_reset(&self) -> Result<(), Error> {
        let mut inner = self.lock();
        self.global_reset_locked(&mut inner)
    }

    pub fn discover_links(&self) -> Result<u8, Error> {
        let mut inner = self.lock();
        self.discover_links_locked(&mut inner)
    }

    pub fn bring_up_all_links(&self) -> Result<u8, Error> {
        let mut inner = self.lock();
        self.bring_up_all_links_locked(&mut inner)
    }

    pub fn set_link_stream(&self, link: Link, enable: bool) -> Result<(), Error> {
        let mut inner = self.lock();
        Self::require_ready(&inner, "stream control")?;
        if Deserializer::has_link(link) {
            if enable {
                inner.requested |= link.bit();
            } else {
                inner.requested &= !link.bit();
            }
        }
        self.set_link_stream_locked(&mut inner, link, enable)
    }

    pub fn set_sub_stream(&self, value: i64) -> Result<(), Error> {
        let value = (value & 0xFFFF) as u16;
        let index = (value >> 8) as usize;
        let link = Link::from_index(index)
            .filter(|link| Deserializer::has_link(*link))
            .ok_or(Error::InvalidPad(index))?;
        self.set_link_stream(link, value & 0xFF != 0)
    }

    pub fn set_output(&self, enable: bool) -> Result<(), Error> {
        let mut inner = self.lock();
        registers::apply(
            &mut inner.transport,
            self.address,
            if enable {
                Deserializer::OUTPUT_ENABLE
            } else {
                Deserializer::OUTPUT_DISABLE
            },
        )?;
        Ok(())
    }

    pub fn suspend(&self) -> Result<(), Error> {
        let mut inner = self.lock();
        Self::require_ready(&inner, "suspend")?;
        for link in Deserializer::PROPERTIES.links {
            if inner.streaming & link.bit() != 0 {
                if let Err(error) = self.set_link_stream_locked(&mut inner, *link, false) {
                    log::error!("failed to stop link {link} ({error})");
                }
            }
        }
        inner.state = State::Suspended;
        Ok(())
    }

    pub fn resume(&self) -> Result<(), Error> {
        let mut inner = self.lock();
        // a failed resume leaves one of the bring-up states, retrying from there is allowed
        if matches!(inner.state, State::Ready) {
            return Err(Error::InvalidState {
                operation: "resume",
                state: inner.state,
            });
        }
        if let Err(error) = self.initialize(&mut inner) {
            log::error!("resume fail ({error})");
            return Err(error);
        }
        for link in Deserializer::PROPERTIES.links {
            if inner.requested & link.bit() != 0 {
                if let Err(error) = self.set_link_stream_locked(&mut inner, *link, true) {
                    log::error!("failed to start link {link} ({error})");
                }
            }
        }
        Ok(())
    }

    pub fn reset_link(&self, link: Link) -> Result<(), Error> {
        let mut inner = self.lock();
        Self::require_ready(&inner, "link reset")?;
        let remote_device = self
            .configuration
            .remote_device(link)
            .ok_or(Error::LinkNotAvailable(link))?;
        match bring_up::bring_up::<Deserializer, _>(
            &mut inner.transport,
            self.address,
            remote_device,
            &self.configuration.lock_polling,
        ) {
            Ok(()) => {
                inner.available |= link.bit();
                Ok(())
            }
            Err(error) => {
                if inner.streaming & link.bit() != 0 {
                    if let Err(stop_error) = self.set_link_stream_locked(&mut inner, link, false) {
                        log::error!("failed to stop link {link} ({stop_error})");
                    }
                }
                inner.available &= !link.bit();
                Err(error)
            }
        }
    }

    pub fn link_status(&self, link: Link) -> bool {
        let mut inner = self.lock();
        lock::is_locked::<Deserializer, _>(&mut inner.transport, self.address, link)
    }

    pub fn locked_mask(&self) -> u8 {
        let mut inner = self.lock();
        lock::locked_mask::<Deserializer, _>(&mut inner.transport, self.address)
    }

    pub fn format(&self, pad: usize) -> Result<types::Format, Error> {
        let inner = self.lock();
        let source_pad = Deserializer::PROPERTIES.source_pad();
        let index = if pad == source_pad {
            if inner.available == 0 {
                0
            } else {
                inner.available.trailing_zeros() as usize
            }
        } else {
            pad
        };
        inner
            .formats
            .get(index)
            .copied()
            .ok_or(Error::InvalidPad(pad))
    }

    pub fn set_format(&self, pad: usize, format: types::Format) -> Result<types::Format, Error> {
        if pad >= Deserializer::PROPERTIES.source_pad() {
            return Err(Error::InvalidPad(pad));
        }
        let data_type = mbus_code_to_mipi(format.code)?;
        let mut inner = self.lock();
        inner.formats[pad] = format;
        let sub_stream = &mut inner.sub_streams[pad];
        sub_stream.set_code(format.code);
        sub_stream.set_height(format.height);
        sub_stream.set_width(format.width);
        sub_stream.set_data_type(data_type as u32);
        sub_stream.set_virtual_channel(pad as u32);
        Ok(format)
    }

    pub fn sub_streams(&self) -> Vec<types::SubStream> {
        self.lock().sub_streams.clone()
    }

    pub fn link_frequencies(&self) -> &'static [i64] {
        Deserializer::PROPERTIES.link_frequencies
    }
}

impl<Deserializer, Transport> Drop for Controller<Deserializer, Transport>
where
    Deserializer: device::Deserializer,
    Transport: i2c::Transport,
{
    fn drop(&mut self) {
        let address = self.address;
        let inner = self
            .inner
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if inner.stream_count > 0 {
            let _ = registers::apply(&mut inner.transport, address, Deserializer::MIPI_DISABLE);
        }
    }
}
