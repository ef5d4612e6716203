//! Vulkan-backed presenter
//!
//! Consumes a host-supplied [`VulkanDeviceContext`] (the adapter never
//! creates instances, devices or queues) and implements the presenter seam
//! with ash.

pub mod device;
pub mod presenter;

pub use device::VulkanDeviceContext;
pub use presenter::VulkanPresenter;
