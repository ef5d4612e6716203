//! Context drivers: the lifecycle controller and present cycle driver
//!
//! A [`ContextDriver`] is the fixed capability set a host drives each frame:
//! poll the window, resize when told to, swap buffers, tune the present
//! interval. There is one implementation per platform + graphics API pair,
//! chosen by the host at startup; [`VulkanContextDriver`] is the Vulkan one.
//! Hosts address instances through opaque [`DriverId`]s issued by a
//! [`DriverRegistry`].

pub mod registry;
pub mod vulkan;

use bitflags::bitflags;
use thiserror::Error;

use crate::present::SwapchainError;

pub use registry::{DriverId, DriverRegistry};
pub use vulkan::VulkanContextDriver;

/// Adapter initialization errors. Fatal to the instance: no driver exists
/// after one of these, and nothing needs to be torn down by the caller.
#[derive(Error, Debug)]
pub enum InitError {
    /// The host did not supply a usable graphics device context.
    #[error("graphics device context is missing or unusable")]
    MissingDeviceContext,

    /// No native window was attached at the init instant.
    #[error("no native window available at init time")]
    WindowUnavailable,

    /// The graphics API failed while setting up adapter-owned objects.
    #[error("Vulkan API error during init: {0:?}")]
    Api(ash::vk::Result),
}

bitflags! {
    /// Optional capabilities a driver advertises to the host. Computed from
    /// build-time configuration, never from runtime state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DriverCaps: u32 {
        /// Slang shaders can be compiled for this context.
        const SLANG_SHADERS = 1 << 0;
    }
}

/// Result of one window poll cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowCheck {
    /// The platform requested shutdown. Always false for this adapter; a
    /// deployment wires its quit signal elsewhere.
    pub quit: bool,
    /// The swapchain no longer matches the window and a resize pass is
    /// needed.
    pub resize: bool,
    /// Up-to-date window width.
    pub width: u32,
    /// Up-to-date window height.
    pub height: u32,
}

/// Fixed capability set a host drives the adapter through.
pub trait ContextDriver {
    /// Last-known window geometry.
    fn video_size(&self) -> (u32, u32);

    /// Poll the shared window state. Consumes the edge-triggered changed
    /// flag and compares shared geometry against the caller's last-known
    /// `current_width`/`current_height`; either signal reports a resize.
    fn check_window(&mut self, current_width: u32, current_height: u32) -> WindowCheck;

    /// Rebuild the swapchain. Geometry is re-derived from the shared window
    /// state; the passed values are hints only. On failure the previous
    /// swapchain state is left untouched and the rebuild request stays
    /// pending.
    fn set_resize(&mut self, width_hint: u32, height_hint: u32) -> Result<(), SwapchainError>;

    /// First-time surface creation against the native window, followed by
    /// the initial swapchain build.
    fn set_video_mode(&mut self, width: u32, height: u32, fullscreen: bool) -> Result<(), SwapchainError>;

    /// Present the previously acquired image (or idle briefly when no
    /// swapchain is presentable) and acquire the next one.
    fn swap_buffers(&mut self);

    /// Request a present interval. A change only marks the swapchain for
    /// rebuild if one already exists; otherwise the new interval is
    /// absorbed into the eventual first creation.
    fn set_swap_interval(&mut self, interval: u32);

    /// Take-and-clear the invalidation signal raised by a successful
    /// swapchain rebuild. True means host resources referencing the old
    /// swapchain are stale.
    fn swapchain_invalidated(&mut self) -> bool;

    /// Build-time capability bits.
    fn capabilities(&self) -> DriverCaps;
}
