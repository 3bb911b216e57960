#![allow(dead_code)]

use gmsl_drivers::configuration;
use gmsl_drivers::i2c;
use gmsl_drivers::types::Link;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const LOCAL_ADDRESS: u16 = 0x27;
pub const PHYSICAL_ADDRESS: u16 = 0x40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Read { address: u16, register: u16 },
    Write { address: u16, register: u16, value: u8 },
    Sleep(std::time::Duration),
}

pub struct Remote {
    pub link: Link,
    pub address: u16,
    pub registers: HashMap<u16, u8>,
}

/// Whether the control channel of a link is open given the local registers.
pub type ChannelOpen = fn(&HashMap<u16, u8>, Link) -> bool;

pub struct State {
    pub local: HashMap<u16, u8>,
    pub remotes: Vec<Remote>,
    pub channel_open: ChannelOpen,
    pub events: Vec<Event>,
    pub failing_reads: HashSet<(u16, u16)>,
    pub failing_writes: HashSet<(u16, u16)>,
    pub lock_drops: Vec<((u16, u8), Vec<u16>)>,
}

/// Simulated bus with one deserializer at [`LOCAL_ADDRESS`] and serializers behind its links.
#[derive(Clone)]
pub struct Mock(pub Arc<Mutex<State>>);

pub fn max96716_channel_open(local: &HashMap<u16, u8>, link: Link) -> bool {
    let register = |address| local.get(&address).copied().unwrap_or(0);
    match link {
        Link::A => register(0x0003) & (1 << 2) == 0,
        Link::B => register(0x0001) & (1 << 4) == 0,
        Link::C | Link::D => false,
    }
}

pub fn max96724_channel_open(local: &HashMap<u16, u8>, link: Link) -> bool {
    local.get(&0x0003).copied().unwrap_or(0) & (1 << (2 * link.index())) == 0
}

impl Mock {
    pub fn new(chip_id: u8, channel_open: ChannelOpen) -> Self {
        let mut local = HashMap::new();
        local.insert(0x000D, chip_id);
        Self(Arc::new(Mutex::new(State {
            local,
            remotes: Vec::new(),
            channel_open,
            events: Vec::new(),
            failing_reads: HashSet::new(),
            failing_writes: HashSet::new(),
            lock_drops: Vec::new(),
        })))
    }

    pub fn max96716() -> Self {
        Self::new(0xBE, max96716_channel_open)
    }

    pub fn max96724() -> Self {
        Self::new(0xA0, max96724_channel_open)
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }

    /// Plugs a serializer at its factory address and sets the link lock flag.
    pub fn connect(&self, link: Link, lock_register: u16, device_id: u8) {
        let mut state = self.state();
        *state.local.entry(lock_register).or_insert(0) |= 0x08;
        let mut registers = HashMap::new();
        registers.insert(0x000D, device_id);
        state.remotes.push(Remote {
            link,
            address: PHYSICAL_ADDRESS,
            registers,
        });
    }

    pub fn set_local(&self, register: u16, value: u8) {
        self.state().local.insert(register, value);
    }

    pub fn local(&self, register: u16) -> u8 {
        self.state().local.get(&register).copied().unwrap_or(0)
    }

    pub fn remote_address(&self, link: Link) -> Option<u16> {
        self.state()
            .remotes
            .iter()
            .find(|remote| remote.link == link)
            .map(|remote| remote.address)
    }

    pub fn remote_register(&self, link: Link, register: u16) -> Option<u8> {
        self.state()
            .remotes
            .iter()
            .find(|remote| remote.link == link)
            .and_then(|remote| remote.registers.get(&register).copied())
    }

    pub fn fail_read(&self, address: u16, register: u16) {
        self.state().failing_reads.insert((address, register));
    }

    pub fn fail_write(&self, address: u16, register: u16) {
        self.state().failing_writes.insert((address, register));
    }

    /// Writing `value` to the local `register` clears the lock flag of `lock_registers`.
    pub fn drop_lock_on_write(&self, register: u16, value: u8, lock_registers: &[u16]) {
        self.state()
            .lock_drops
            .push(((register, value), lock_registers.to_vec()));
    }

    pub fn heal(&self) {
        let mut state = self.state();
        state.failing_reads.clear();
        state.failing_writes.clear();
    }

    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    pub fn clear_events(&self) {
        self.state().events.clear();
    }

    /// Writes on the local chip, in order.
    pub fn local_writes(&self) -> Vec<(u16, u8)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Write {
                    address,
                    register,
                    value,
                } if address == LOCAL_ADDRESS => Some((register, value)),
                _ => None,
            })
            .collect()
    }

    pub fn local_writes_to(&self, register: u16) -> Vec<u8> {
        self.local_writes()
            .into_iter()
            .filter(|(written, _)| *written == register)
            .map(|(_, value)| value)
            .collect()
    }

    pub fn boxed(&self) -> Box<dyn i2c::Transport> {
        Box::new(self.clone())
    }
}

impl State {
    fn remote_index(&self, address: u16, register: u16) -> Result<usize, i2c::Error> {
        let mut reachable = self.remotes.iter().enumerate().filter(|(_, remote)| {
            remote.address == address && (self.channel_open)(&self.local, remote.link)
        });
        match (reachable.next(), reachable.next()) {
            (Some((index, _)), None) => Ok(index),
            (Some(_), Some(_)) => Err(i2c::Error::Transfer {
                address,
                register,
                errno: 5,
            }),
            (None, _) => Err(i2c::Error::Nack { address, register }),
        }
    }
}

impl i2c::Transport for Mock {
    fn read_at(&mut self, address: u16, register: u16) -> Result<u8, i2c::Error> {
        let mut state = self.state();
        state.events.push(Event::Read { address, register });
        if state.failing_reads.contains(&(address, register)) {
            return Err(i2c::Error::Nack { address, register });
        }
        if address == LOCAL_ADDRESS {
            return Ok(state.local.get(&register).copied().unwrap_or(0));
        }
        let index = state.remote_index(address, register)?;
        Ok(state.remotes[index]
            .registers
            .get(&register)
            .copied()
            .unwrap_or(0))
    }

    fn write_at(&mut self, address: u16, register: u16, value: u8) -> Result<(), i2c::Error> {
        let mut state = self.state();
        if state.failing_writes.contains(&(address, register)) {
            return Err(i2c::Error::Nack { address, register });
        }
        if address == LOCAL_ADDRESS {
            state.local.insert(register, value);
            let dropped: Vec<u16> = state
                .lock_drops
                .iter()
                .filter(|(trigger, _)| *trigger == (register, value))
                .flat_map(|(_, lock_registers)| lock_registers.iter().copied())
                .collect();
            for lock_register in dropped {
                *state.local.entry(lock_register).or_insert(0) &= !0x08;
            }
        } else {
            let index = state.remote_index(address, register)?;
            let remote = &mut state.remotes[index];
            if register == 0x0000 {
                remote.address = (value >> 1) as u16;
            }
            remote.registers.insert(register, value);
        }
        state.events.push(Event::Write {
            address,
            register,
            value,
        });
        Ok(())
    }

    fn sleep(&mut self, duration: std::time::Duration) {
        self.state().events.push(Event::Sleep(duration));
    }
}

pub fn remote_device(link: Link, alias_address: u16) -> configuration::RemoteDevice {
    configuration::RemoteDevice {
        link,
        physical_address: PHYSICAL_ADDRESS,
        alias_address,
        serializer: configuration::Serializer::Max9295,
        initialization: None,
    }
}

pub fn configuration(remote_devices: Vec<configuration::RemoteDevice>) -> configuration::Configuration {
    configuration::Configuration {
        remote_devices,
        pins: configuration::Pins::default(),
        lock_polling: configuration::LockPolling::default(),
    }
}
