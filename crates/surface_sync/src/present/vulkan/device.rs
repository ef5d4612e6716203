//! Host-supplied Vulkan device/instance/queue context

use std::sync::{Mutex, MutexGuard, PoisonError};

use ash::vk;

use crate::driver::InitError;

/// Vulkan handles the host created and the adapter consumes.
///
/// Ownership of the instance and device stays with the host; the adapter
/// only borrows them for surface/swapchain work and for present submission.
/// The queue lock serializes present submissions against any other host
/// use of the same queue.
pub struct VulkanDeviceContext {
    /// Loaded Vulkan entry points.
    pub entry: ash::Entry,
    /// Instance the surface will be created against.
    pub instance: ash::Instance,
    /// Physical device backing the logical device.
    pub physical_device: vk::PhysicalDevice,
    /// Logical device.
    pub device: ash::Device,
    /// Queue used for present submission.
    pub queue: vk::Queue,
    /// Family index of `queue`.
    pub queue_family_index: u32,
    queue_lock: Mutex<()>,
}

impl VulkanDeviceContext {
    /// Wrap host-created handles, rejecting null ones up front.
    pub fn new(
        entry: ash::Entry,
        instance: ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        queue: vk::Queue,
        queue_family_index: u32,
    ) -> Result<Self, InitError> {
        if physical_device == vk::PhysicalDevice::null() || queue == vk::Queue::null() {
            return Err(InitError::MissingDeviceContext);
        }
        Ok(Self {
            entry,
            instance,
            physical_device,
            device,
            queue,
            queue_family_index,
            queue_lock: Mutex::new(()),
        })
    }

    /// Hold the present queue for the duration of a submission.
    pub fn lock_queue(&self) -> MutexGuard<'_, ()> {
        self.queue_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
