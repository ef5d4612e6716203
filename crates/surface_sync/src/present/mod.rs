//! Presentation collaborator seam
//!
//! The adapter decides *when* surfaces and swapchains are built, rebuilt and
//! presented; the [`Presenter`] implementation decides *how*. The Vulkan
//! implementation lives in [`vulkan`]; [`headless`] provides a windowless
//! stand-in for tests and headless hosts.

pub mod headless;
pub mod vulkan;

use thiserror::Error;

use crate::window::NativeWindow;

/// Swapchain build and presentation errors.
///
/// These are recoverable at the adapter level: a failed build leaves the
/// previous swapchain (if any) fully intact and the next cycle retries with
/// the then-current geometry.
#[derive(Error, Debug)]
pub enum SwapchainError {
    /// The graphics API rejected the call.
    #[error("Vulkan API error: {0:?}")]
    Api(ash::vk::Result),

    /// No surface exists to build a swapchain against.
    #[error("no surface to build a swapchain against")]
    MissingSurface,

    /// The native window disappeared before the surface could be created.
    #[error("native window is gone")]
    WindowUnavailable,

    /// Backend-specific build failure.
    #[error("swapchain creation failed: {0}")]
    CreationFailed(String),
}

/// Outcome of a successful swapchain build request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapchainCreation {
    /// A genuinely new swapchain object was created; images acquired from
    /// the previous one are gone.
    Created,
    /// The existing swapchain already matched the requested geometry and
    /// interval; nothing was replaced.
    Revalidated,
}

/// Outcome of a present submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresentOutcome {
    /// The image was queued for display.
    Presented,
    /// The swapchain no longer matches the surface; it must be rebuilt
    /// before further presentation.
    OutOfDate,
}

/// Surface/swapchain service consumed by the adapter.
///
/// Implementations are driven exclusively from the render thread; `&mut
/// self` throughout makes the no-reentrancy assumption explicit.
pub trait Presenter {
    /// Create the rendering surface against the native window. First-time
    /// setup; called once per video mode.
    fn create_surface(&mut self, window: &NativeWindow, width: u32, height: u32) -> Result<(), SwapchainError>;

    /// Build or rebuild the swapchain for the given geometry and present
    /// interval. On failure the previous swapchain must remain untouched
    /// and usable.
    fn create_swapchain(&mut self, width: u32, height: u32, swap_interval: u32) -> Result<SwapchainCreation, SwapchainError>;

    /// Whether a presentable swapchain currently exists.
    fn has_swapchain(&self) -> bool;

    /// Acquire the next presentable image, returning its index, or `None`
    /// when no image can be acquired (no swapchain yet, or the swapchain
    /// went stale).
    fn acquire_next_image(&mut self) -> Option<u32>;

    /// Submit the image at `image_index` for display.
    fn present(&mut self, image_index: u32) -> PresentOutcome;

    /// Release the swapchain and surface. Must tolerate a window that was
    /// already destroyed (`window == None`).
    fn destroy_surface(&mut self, window: Option<&NativeWindow>);
}
