//! Windowless presenter for tests and headless hosts
//!
//! Fabricates swapchain state without touching a GPU, with failure
//! injection for exercising the adapter's recovery paths.

use super::{PresentOutcome, Presenter, SwapchainCreation, SwapchainError};
use crate::window::NativeWindow;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct HeadlessSwapchain {
    width: u32,
    height: u32,
    swap_interval: u32,
}

/// Presenter that simulates surface and swapchain state in memory.
pub struct HeadlessPresenter {
    surface: bool,
    swapchain: Option<HeadlessSwapchain>,
    image_count: u32,
    next_image: u32,
    fail_next_create: bool,
    fail_next_acquire: bool,
    out_of_date_next_present: bool,
    acquires: u32,
    presents: u32,
}

impl HeadlessPresenter {
    /// New presenter with the default triple-buffered image count.
    pub fn new() -> Self {
        Self::with_image_count(3)
    }

    /// New presenter fabricating `image_count` swapchain images.
    pub fn with_image_count(image_count: u32) -> Self {
        Self {
            surface: false,
            swapchain: None,
            image_count: image_count.max(1),
            next_image: 0,
            fail_next_create: false,
            fail_next_acquire: false,
            out_of_date_next_present: false,
            acquires: 0,
            presents: 0,
        }
    }

    /// Make the next `create_swapchain` call fail.
    pub fn fail_next_create(&mut self) {
        self.fail_next_create = true;
    }

    /// Make the next `acquire_next_image` call fail.
    pub fn fail_next_acquire(&mut self) {
        self.fail_next_acquire = true;
    }

    /// Make the next `present` call report an out-of-date swapchain.
    pub fn invalidate_next_present(&mut self) {
        self.out_of_date_next_present = true;
    }

    /// Drop the swapchain without going through the adapter, simulating an
    /// invalidation between acquire and present.
    pub fn drop_swapchain(&mut self) {
        self.swapchain = None;
    }

    /// Number of successful acquires so far.
    pub fn acquire_count(&self) -> u32 {
        self.acquires
    }

    /// Number of present submissions so far.
    pub fn present_count(&self) -> u32 {
        self.presents
    }
}

impl Default for HeadlessPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for HeadlessPresenter {
    fn create_surface(&mut self, _window: &NativeWindow, width: u32, height: u32) -> Result<(), SwapchainError> {
        log::debug!("[Headless] Surface created at {}x{}.", width, height);
        self.surface = true;
        Ok(())
    }

    fn create_swapchain(&mut self, width: u32, height: u32, swap_interval: u32) -> Result<SwapchainCreation, SwapchainError> {
        if !self.surface {
            return Err(SwapchainError::MissingSurface);
        }
        if self.fail_next_create {
            self.fail_next_create = false;
            return Err(SwapchainError::CreationFailed("injected failure".to_string()));
        }

        let requested = HeadlessSwapchain { width, height, swap_interval };
        if self.swapchain == Some(requested) {
            return Ok(SwapchainCreation::Revalidated);
        }

        self.swapchain = Some(requested);
        self.next_image = 0;
        Ok(SwapchainCreation::Created)
    }

    fn has_swapchain(&self) -> bool {
        self.swapchain.is_some()
    }

    fn acquire_next_image(&mut self) -> Option<u32> {
        self.swapchain?;
        if self.fail_next_acquire {
            self.fail_next_acquire = false;
            return None;
        }
        let index = self.next_image;
        self.next_image = (self.next_image + 1) % self.image_count;
        self.acquires += 1;
        Some(index)
    }

    fn present(&mut self, _image_index: u32) -> PresentOutcome {
        self.presents += 1;
        if self.out_of_date_next_present {
            self.out_of_date_next_present = false;
            return PresentOutcome::OutOfDate;
        }
        PresentOutcome::Presented
    }

    fn destroy_surface(&mut self, _window: Option<&NativeWindow>) {
        self.swapchain = None;
        self.surface = false;
    }
}
