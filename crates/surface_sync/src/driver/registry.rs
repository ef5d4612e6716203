//! Opaque handle table for adapter instances
//!
//! Hosts hold a [`DriverId`] instead of the driver itself, matching the
//! init-returns-handle / destroy-takes-handle contract of a plugin host.
//! Stale ids resolve to nothing instead of dangling.

use slotmap::SlotMap;

use super::ContextDriver;

slotmap::new_key_type! {
    /// Opaque handle to a registered context driver.
    pub struct DriverId;
}

/// Table of live adapter instances.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: SlotMap<DriverId, Box<dyn ContextDriver>>,
}

impl DriverRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            drivers: SlotMap::with_key(),
        }
    }

    /// Register a driver and hand out its handle.
    pub fn register(&mut self, driver: Box<dyn ContextDriver>) -> DriverId {
        self.drivers.insert(driver)
    }

    /// Resolve a handle.
    pub fn get(&self, id: DriverId) -> Option<&dyn ContextDriver> {
        self.drivers.get(id).map(AsRef::as_ref)
    }

    /// Resolve a handle mutably.
    pub fn get_mut(&mut self, id: DriverId) -> Option<&mut (dyn ContextDriver + 'static)> {
        self.drivers.get_mut(id).map(AsMut::as_mut)
    }

    /// Drop the driver behind `id`, releasing its resources. Tolerant of
    /// handles that were already destroyed; returns whether anything was
    /// removed.
    pub fn destroy(&mut self, id: DriverId) -> bool {
        self.drivers.remove(id).is_some()
    }

    /// Number of live drivers.
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// Whether any driver is registered.
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}
