use std::fmt;
use std::marker::PhantomData;

/// Numeric identifier tagged with the kind of entity it refers to, so a job id can never be
/// passed where a machine id is expected.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Id<T> {
    pub id: u64,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub const fn new(id: u64) -> Self {
        Id { id, _marker: PhantomData }
    }

    pub fn value(&self) -> u64 {
        self.id
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> From<Id<T>> for u64 {
    fn from(id_wrapper: Id<T>) -> Self {
        id_wrapper.id
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_name = std::any::type_name::<T>();
        let clean_name = full_name.split("::").last().unwrap_or(full_name);
        let display_name = clean_name.replace("Tag", "Id");

        write!(f, "{}: {}", display_name, self.id)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct JobTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct MachineTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct HostTag;

pub type JobId = Id<JobTag>;
pub type MachineId = Id<MachineTag>;
pub type HostId = Id<HostTag>;
