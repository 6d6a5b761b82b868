use crate::config::MachineGroupConfig;
use crate::domain::utils::id::{HostId, MachineId};

/// Virtual machine jobs are mapped onto. Capacities are fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    pub id: MachineId,
    /// Processing rate of a single slot in MIPS.
    pub mips_per_slot: f64,
    pub slots: u32,
    pub ram: f64,
    pub bw: f64,
    pub storage: f64,
}

impl Machine {
    pub fn new(id: u64, mips_per_slot: f64, slots: u32, ram: f64) -> Self {
        Machine { id: MachineId::new(id), mips_per_slot, slots, ram, bw: 0.0, storage: 0.0 }
    }

    /// Total processing rate over all slots.
    pub fn compute_capacity(&self) -> f64 {
        self.mips_per_slot * self.slots as f64
    }

    /// Creates the virtual machine pool of a scenario. Ids are assigned in order, starting at 0.
    pub fn pool_from_config(config: &MachineGroupConfig) -> Vec<Machine> {
        (0..config.count)
            .map(|i| Machine {
                id: MachineId::new(i as u64),
                mips_per_slot: config.mips_per_slot,
                slots: config.slots,
                ram: config.ram,
                bw: config.bw,
                storage: config.storage,
            })
            .collect()
    }
}

/// Physical host the virtual machines are placed on.
#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    pub id: HostId,
    pub mips_per_slot: f64,
    pub slots: u32,
    pub ram: f64,
    pub bw: f64,
    pub storage: f64,
    pub used_slots: u32,
    pub used_ram: f64,
    pub used_bw: f64,
    pub used_storage: f64,
    pub machines: Vec<MachineId>,
}

impl Host {
    pub fn from_config(id: u64, config: &MachineGroupConfig) -> Self {
        Host {
            id: HostId::new(id),
            mips_per_slot: config.mips_per_slot,
            slots: config.slots,
            ram: config.ram,
            bw: config.bw,
            storage: config.storage,
            used_slots: 0,
            used_ram: 0.0,
            used_bw: 0.0,
            used_storage: 0.0,
            machines: Vec::new(),
        }
    }

    pub fn free_slots(&self) -> u32 {
        self.slots - self.used_slots
    }

    /// True if the machine fits into the remaining capacity of this host.
    pub fn is_suitable_for(&self, machine: &Machine) -> bool {
        self.free_slots() >= machine.slots
            && self.mips_per_slot >= machine.mips_per_slot
            && self.ram - self.used_ram >= machine.ram
            && self.bw - self.used_bw >= machine.bw
            && self.storage - self.used_storage >= machine.storage
    }

    pub fn place(&mut self, machine: &Machine) {
        self.used_slots += machine.slots;
        self.used_ram += machine.ram;
        self.used_bw += machine.bw;
        self.used_storage += machine.storage;
        self.machines.push(machine.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_matches_group_config() {
        let pool = Machine::pool_from_config(&MachineGroupConfig::default_vms());

        assert_eq!(pool.len(), 8);
        assert_eq!(pool[7].id, MachineId::new(7));
        assert_eq!(pool[0].compute_capacity(), 20_000.0);
    }

    #[test]
    fn host_rejects_machine_once_slots_are_used_up() {
        let mut host = Host::from_config(0, &MachineGroupConfig::default_hosts());
        let vm = Machine::pool_from_config(&MachineGroupConfig::default_vms()).remove(0);

        for _ in 0..4 {
            assert!(host.is_suitable_for(&vm));
            host.place(&vm);
        }
        assert_eq!(host.free_slots(), 0);
        assert!(!host.is_suitable_for(&vm));
    }
}
