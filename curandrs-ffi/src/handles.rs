//! Native handle tables.
//!
//! Managed objects never hold a native address. They hold a [`HandleId`]:
//! the slot index in the low 31 bits (offset by one so that 0 stays the
//! "detached" value), the resource kind in bit 31 and the slot generation in
//! the high 32 bits. Removing an entry bumps its slot generation, so a stale
//! id held by a managed object can never reach a resource created later in
//! the same slot. A table only accepts ids of its own kind.

use std::sync::{Mutex, MutexGuard, PoisonError};

use curand::{RawDistribution, RawGenerator};

use crate::host::{HostError, ManagedHost, ObjectRef};

const INDEX_MASK: u64 = 0x7fff_ffff;
const KIND_BIT: u64 = 1 << 31;

/// The kind of native resource a table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Generator,
    Distribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl HandleId {
    /// Value stored in a managed object that has no native resource.
    pub const DETACHED: u64 = 0;

    fn new(kind: HandleKind, index: usize, generation: u32) -> Self {
        let tag = match kind {
            HandleKind::Generator => 0,
            HandleKind::Distribution => KIND_BIT,
        };
        HandleId((u64::from(generation) << 32) | tag | (index as u64 + 1))
    }

    pub fn from_raw(raw: u64) -> Option<Self> {
        if raw & INDEX_MASK == 0 {
            None
        } else {
            Some(HandleId(raw))
        }
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }

    pub fn kind(self) -> HandleKind {
        if self.0 & KIND_BIT == 0 {
            HandleKind::Generator
        } else {
            HandleKind::Distribution
        }
    }

    fn index(self) -> usize {
        (self.0 & INDEX_MASK) as usize - 1
    }

    fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Generation-stamped slot arena for handles of one kind.
pub struct HandleTable<T> {
    kind: HandleKind,
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    live: usize,
}

impl<T> HandleTable<T> {
    pub fn new(kind: HandleKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    /// The slot for `id`, if the id belongs to this table and is current.
    fn slot_index(&self, id: HandleId) -> Option<usize> {
        if id.kind() != self.kind {
            return None;
        }
        let index = id.index();
        let slot = self.slots.get(index)?;
        (slot.generation == id.generation()).then_some(index)
    }

    pub fn insert(&mut self, value: T) -> HandleId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.value = Some(value);
            return HandleId::new(self.kind, index, slot.generation);
        }
        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        HandleId::new(self.kind, index, 0)
    }

    pub fn get(&self, id: HandleId) -> Option<&T> {
        let index = self.slot_index(id)?;
        self.slots[index].value.as_ref()
    }

    pub fn remove(&mut self, id: HandleId) -> Option<T> {
        let index = self.slot_index(id)?;
        let slot = &mut self.slots[index];
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.live -= 1;
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

/// Which creation call produced a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Device,
    Host,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorRecord {
    pub raw: RawGenerator,
    pub placement: Placement,
    pub rng_type: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionRecord {
    pub raw: RawDistribution,
    pub lambda: f64,
}

/// Live generators and distributions of one binding instance.
///
/// The locks only guard the tables; they are never held across a native call.
pub struct NativeHandles {
    generators: Mutex<HandleTable<GeneratorRecord>>,
    distributions: Mutex<HandleTable<DistributionRecord>>,
}

fn locked<T>(table: &Mutex<HandleTable<T>>) -> MutexGuard<'_, HandleTable<T>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read the handle id attached to a managed object.
pub fn attached_id<H: ManagedHost + ?Sized>(host: &H, object: ObjectRef) -> Result<Option<HandleId>, HostError> {
    Ok(HandleId::from_raw(host.native_handle(object)?))
}

/// Store `id` in a managed object.
pub fn attach<H: ManagedHost + ?Sized>(host: &H, object: ObjectRef, id: HandleId) -> Result<(), HostError> {
    host.set_native_handle(object, id.as_raw())
}

/// Clear the handle stored in a managed object.
pub fn detach<H: ManagedHost + ?Sized>(host: &H, object: ObjectRef) -> Result<(), HostError> {
    host.set_native_handle(object, HandleId::DETACHED)
}

impl Default for NativeHandles {
    fn default() -> Self {
        Self {
            generators: Mutex::new(HandleTable::new(HandleKind::Generator)),
            distributions: Mutex::new(HandleTable::new(HandleKind::Distribution)),
        }
    }
}

impl NativeHandles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_generator(&self, record: GeneratorRecord) -> HandleId {
        locked(&self.generators).insert(record)
    }

    pub fn generator(&self, id: HandleId) -> Option<GeneratorRecord> {
        locked(&self.generators).get(id).copied()
    }

    pub fn remove_generator(&self, id: HandleId) -> Option<GeneratorRecord> {
        locked(&self.generators).remove(id)
    }

    pub fn insert_distribution(&self, record: DistributionRecord) -> HandleId {
        locked(&self.distributions).insert(record)
    }

    pub fn distribution(&self, id: HandleId) -> Option<DistributionRecord> {
        locked(&self.distributions).get(id).copied()
    }

    pub fn remove_distribution(&self, id: HandleId) -> Option<DistributionRecord> {
        locked(&self.distributions).remove(id)
    }

    pub fn live_generators(&self) -> usize {
        locked(&self.generators).len()
    }

    pub fn live_distributions(&self) -> usize {
        locked(&self.distributions).len()
    }
}
