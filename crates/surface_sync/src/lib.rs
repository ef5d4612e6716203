//! # Surface Sync
//!
//! A per-platform adapter that keeps a hardware-accelerated rendering
//! surface (a Vulkan swapchain bound to a native window) synchronized with a
//! window system that may resize, recreate, or destroy the window
//! asynchronously, on a thread other than the render thread.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────┐      ┌───────────────────────────┐
//! │   Window-system thread       │      │      Render thread        │
//! │  (publishes geometry and     │      │  (drives the adapter)     │
//! │   window existence)          │      │                           │
//! └──────────────┬───────────────┘      └──────────────┬────────────┘
//!                │ mutates under lock                  │ polls
//!        ┌───────▼──────────┐                 ┌────────▼──────────┐
//!        │ SharedWindowState │◄────snapshot───│ VulkanContextDriver│
//!        └──────────────────┘                 └────────┬──────────┘
//!                                                      │ consumes
//!                                             ┌────────▼──────────┐
//!                                             │  Presenter trait  │
//!                                             │ (Vulkan/headless) │
//!                                             └───────────────────┘
//! ```
//!
//! The render thread runs three cooperating pieces each cycle:
//!
//! - the window state observer ([`window::SharedWindowState::poll`]) reads the
//!   shared geometry and consumes the edge-triggered "content rect changed"
//!   flag in one critical section;
//! - the swapchain lifecycle controller ([`driver::VulkanContextDriver`])
//!   decides when the swapchain must be rebuilt and performs the rebuild
//!   through the [`present::Presenter`] collaborator;
//! - the present cycle driver (`swap_buffers`) presents the previously
//!   acquired image and eagerly acquires the next one, sleeping for a
//!   bounded interval when no presentable swapchain exists yet.
//!
//! The host addresses adapter instances through opaque [`driver::DriverId`]
//! handles issued by a [`driver::DriverRegistry`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod driver;
pub mod present;
pub mod window;

/// Common imports for adapter hosts
pub mod prelude {
    pub use crate::{
        config::DriverConfig,
        context::ContextFlags,
        driver::{ContextDriver, DriverCaps, DriverId, DriverRegistry, InitError, VulkanContextDriver, WindowCheck},
        present::{headless::HeadlessPresenter, PresentOutcome, Presenter, SwapchainCreation, SwapchainError},
        window::{NativeWindow, SharedWindowState, WindowSnapshot},
    };
}
