//! Operation registry for one mocked capability.
//!
//! Maps operation names to type-erased slots. DashMap with the ahash hasher
//! keeps lookups cheap when a capability has many operations, and lets
//! `Mock::method` register through a shared reference.

use crate::application::recorder::CallRecorder;
use crate::domain::operation::Operation;
use crate::infrastructure::mock::ConfigError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Type-erased view of one registered operation.
///
/// Lets the capability reset, fake and inspect operations without knowing their
/// argument and return types.
pub trait OperationSlot: Send + Sync + Debug {
    fn operation(&self) -> &Operation;

    fn recorder(&self) -> &Arc<CallRecorder>;

    /// Remove every configured stub.
    fn reset_stubs(&self);

    /// Append a stub answering any call with the default value.
    fn fake(&self);

    /// One line per configured stub.
    fn describe_stubs(&self) -> Vec<String>;
}

/// Name-keyed storage of operation slots.
#[derive(Debug)]
pub struct OperationRegistry {
    slots: DashMap<&'static str, Arc<dyn OperationSlot>, ahash::RandomState>,
    next_index: AtomicU32,
}

impl OperationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            slots: DashMap::with_hasher(ahash::RandomState::new()),
            next_index: AtomicU32::new(0),
        }
    }

    /// Register `name`, building its slot from the next free operation index.
    ///
    /// `build` returns the slot to store and a value handed back to the
    /// caller (the typed handle).
    ///
    /// # Errors
    ///
    /// `ConfigError::DuplicateOperation` if `name` is already registered.
    pub fn register<T, F>(&self, capability: &str, name: &'static str, build: F) -> Result<T, ConfigError>
    where
        F: FnOnce(u32) -> (Arc<dyn OperationSlot>, T),
    {
        match self.slots.entry(name) {
            Entry::Occupied(_) => Err(ConfigError::DuplicateOperation {
                capability: capability.to_string(),
                operation: name,
            }),
            Entry::Vacant(vacant) => {
                let index = self.next_index.fetch_add(1, Ordering::Relaxed);
                let (slot, handle) = build(index);
                vacant.insert(slot);
                Ok(handle)
            }
        }
    }

    /// Every slot, in registration order.
    pub fn slots(&self) -> Vec<Arc<dyn OperationSlot>> {
        let mut slots: Vec<Arc<dyn OperationSlot>> = self
            .slots
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        slots.sort_by_key(|slot| slot.operation().id().index());
        slots
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no operation is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
