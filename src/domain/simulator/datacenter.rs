use crate::config::MachineGroupConfig;
use crate::domain::machine::{Host, Machine};
use crate::error::{Error, Result};

/// Physical hosts of the simulated cluster.
#[derive(Debug, Clone)]
pub struct Datacenter {
    pub hosts: Vec<Host>,
}

impl Datacenter {
    pub fn from_config(config: &MachineGroupConfig) -> Self {
        Datacenter { hosts: (0..config.count).map(|i| Host::from_config(i as u64, config)).collect() }
    }

    /// Places every machine on the suitable host with the most free slots (first host on ties).
    pub fn place_machines(&mut self, machines: &[Machine]) -> Result<()> {
        for machine in machines {
            let host = self
                .hosts
                .iter_mut()
                .filter(|h| h.is_suitable_for(machine))
                .fold(None::<&mut Host>, |best, h| match best {
                    Some(b) if b.free_slots() >= h.free_slots() => Some(b),
                    _ => Some(h),
                })
                .ok_or_else(|| Error::ConfigurationError(format!("no host has capacity left for machine {}", machine.id)))?;

            host.place(machine);
            log::trace!("Machine {} placed on host {}.", machine.id, host.id);
        }
        Ok(())
    }
}
