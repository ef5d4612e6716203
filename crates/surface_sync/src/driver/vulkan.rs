//! Vulkan context driver: swapchain lifecycle controller + present cycle
//! driver
//!
//! Ties the window state observer, the adapter context and the presenter
//! together into the per-cycle state machine. All methods run on the render
//! thread; the window-system thread is only ever met through the shared
//! lock's bounded critical sections.

use std::thread;
use std::time::Duration;

use crate::config::DriverConfig;
use crate::context::{ContextFlags, SurfaceContext};
use crate::driver::{ContextDriver, DriverCaps, InitError, WindowCheck};
use crate::present::{PresentOutcome, Presenter, SwapchainCreation, SwapchainError};
use crate::window::SharedWindowState;

/// Driver for one window/surface pairing, generic over the presenter so the
/// same lifecycle logic runs against the real Vulkan backend or the
/// headless one.
pub struct VulkanContextDriver<P: Presenter> {
    shared: SharedWindowState,
    presenter: P,
    context: SurfaceContext,
    idle_wait: Duration,
}

impl<P: Presenter> VulkanContextDriver<P> {
    /// Initialize the adapter for a window that must exist at this instant.
    ///
    /// The existence check runs under the shared lock, so a window
    /// destroyed concurrently is either observed here (init fails, the
    /// presenter is dropped) or after init (handled by the per-operation
    /// re-checks).
    pub fn new(shared: SharedWindowState, presenter: P, config: &DriverConfig) -> Result<Self, InitError> {
        if !shared.window_exists() {
            return Err(InitError::WindowUnavailable);
        }
        Ok(Self {
            shared,
            presenter,
            context: SurfaceContext::new(config.swap_interval),
            idle_wait: config.idle_wait(),
        })
    }

    /// Adapter-owned context state, for hosts that read the flags directly.
    pub fn context(&self) -> &SurfaceContext {
        &self.context
    }

    /// The presenter this driver consumes.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Rebuild the swapchain for the current shared geometry and interval.
    fn rebuild_swapchain(&mut self) -> Result<(), SwapchainError> {
        let (width, height) = self.shared.content_rect();
        log::info!("[Vulkan] Native window size: {}x{}.", width, height);

        let creation = self
            .presenter
            .create_swapchain(width, height, self.context.swap_interval())
            .map_err(|err| {
                log::error!("[Vulkan] Failed to update swapchain: {}.", err);
                err
            })?;

        // Adopt first: a failed eager acquire below re-raises the rebuild
        // request, and adopting afterwards would erase it.
        self.context.adopt_swapchain(width, height);

        if creation == SwapchainCreation::Created {
            // Eager acquire so the present cycle has a ready frame.
            match self.presenter.acquire_next_image() {
                Some(index) => self.context.store_acquired_image(index),
                None => self.context.mark_needs_new_swapchain(),
            }
        }
        Ok(())
    }
}

impl<P: Presenter> ContextDriver for VulkanContextDriver<P> {
    fn video_size(&self) -> (u32, u32) {
        self.context.video_size()
    }

    fn check_window(&mut self, current_width: u32, current_height: u32) -> WindowCheck {
        let snapshot = self.shared.poll();
        if snapshot.rect_changed {
            self.context.mark_needs_new_swapchain();
        }

        // Swapchains are recreated in set_resize as a central place, so the
        // pending-rebuild flag triggers the resize path too.
        let mut resize = self
            .context
            .flags()
            .contains(ContextFlags::NEEDS_NEW_SWAPCHAIN);
        let mut width = current_width;
        let mut height = current_height;

        if snapshot.width != width || snapshot.height != height {
            log::info!(
                "[Vulkan] Resizing ({}x{}) -> ({}x{}).",
                width,
                height,
                snapshot.width,
                snapshot.height
            );
            width = snapshot.width;
            height = snapshot.height;
            resize = true;
        }

        WindowCheck {
            quit: false,
            resize,
            width,
            height,
        }
    }

    fn set_resize(&mut self, _width_hint: u32, _height_hint: u32) -> Result<(), SwapchainError> {
        // Shared state wins: the hints are ignored and geometry is
        // re-derived inside rebuild_swapchain.
        self.rebuild_swapchain()
    }

    fn set_video_mode(&mut self, _width: u32, _height: u32, _fullscreen: bool) -> Result<(), SwapchainError> {
        // Copy the handle out under the lock; surface creation itself must
        // not run inside the critical section.
        let window = self
            .shared
            .with_window(|w| w.copied())
            .ok_or(SwapchainError::WindowUnavailable)?;
        let (width, height) = self.shared.content_rect();

        self.presenter
            .create_surface(&window, width, height)
            .map_err(|err| {
                log::error!("[Vulkan] Failed to create surface: {}.", err);
                err
            })?;
        self.context.set_video_size(width, height);
        log::info!("[Vulkan] Native window size: {}x{}.", width, height);

        self.rebuild_swapchain()
    }

    fn swap_buffers(&mut self) {
        if let Some(index) = self.context.take_acquired_image() {
            if self.presenter.has_swapchain() {
                if self.presenter.present(index) == PresentOutcome::OutOfDate {
                    self.context.mark_needs_new_swapchain();
                }
            } else {
                // The swapchain went away between acquire and present;
                // idle briefly instead of presenting into nothing.
                thread::sleep(self.idle_wait);
            }
        }

        // Acquisition is decoupled from presentation: the next frame's
        // image is requested before control returns to the host.
        match self.presenter.acquire_next_image() {
            Some(index) => self.context.store_acquired_image(index),
            None => {
                if self.presenter.has_swapchain() {
                    self.context.mark_needs_new_swapchain();
                }
            }
        }
    }

    fn set_swap_interval(&mut self, interval: u32) {
        if self.context.set_swap_interval(interval) {
            log::info!("[Vulkan] Setting swap interval: {}.", interval);
            if self.presenter.has_swapchain() {
                self.context.mark_needs_new_swapchain();
            }
        }
    }

    fn swapchain_invalidated(&mut self) -> bool {
        self.context.acknowledge_invalidation()
    }

    fn capabilities(&self) -> DriverCaps {
        let mut caps = DriverCaps::empty();
        if cfg!(feature = "slang-shaders") {
            caps |= DriverCaps::SLANG_SHADERS;
        }
        caps
    }
}

impl<P: Presenter> Drop for VulkanContextDriver<P> {
    fn drop(&mut self) {
        // Teardown may race with window destruction; a vanished handle is
        // fine.
        let window = self.shared.with_window(|w| w.copied());
        self.presenter.destroy_surface(window.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::present::headless::HeadlessPresenter;
    use crate::window::NativeWindow;

    fn shared_with_window(width: u32, height: u32) -> SharedWindowState {
        let shared = SharedWindowState::with_content_rect(width, height);
        shared.attach_window(NativeWindow::Headless);
        shared
    }

    fn driver_with_video_mode(
        width: u32,
        height: u32,
    ) -> (SharedWindowState, VulkanContextDriver<HeadlessPresenter>) {
        let shared = shared_with_window(width, height);
        let mut driver =
            VulkanContextDriver::new(shared.clone(), HeadlessPresenter::new(), &DriverConfig::default())
                .unwrap();
        driver.set_video_mode(width, height, false).unwrap();
        (shared, driver)
    }

    #[test]
    fn init_requires_a_window() {
        let shared = SharedWindowState::with_content_rect(800, 600);
        let result =
            VulkanContextDriver::new(shared, HeadlessPresenter::new(), &DriverConfig::default());
        assert!(matches!(result, Err(InitError::WindowUnavailable)));
    }

    #[test]
    fn edge_flag_drives_resize_once() {
        let (shared, mut driver) = driver_with_video_mode(800, 600);
        shared.publish_content_rect(800, 600);

        // Same geometry, but the window system reported a discrete change.
        let check = driver.check_window(800, 600);
        assert!(check.resize);

        // Flag satisfied by the resize pass; the next poll with unchanged
        // geometry is quiet.
        driver.set_resize(check.width, check.height).unwrap();
        let check = driver.check_window(800, 600);
        assert!(!check.resize);
    }

    #[test]
    fn geometry_mismatch_reports_resize_without_edge_flag() {
        let (shared, mut driver) = driver_with_video_mode(800, 600);

        // Rect drifts without a changed event. Publish raises the edge
        // flag, so consume it first and then compare stale caller geometry.
        shared.publish_content_rect(1024, 768);
        let _ = shared.poll();

        let check = driver.check_window(800, 600);
        assert!(check.resize);
        assert_eq!((check.width, check.height), (1024, 768));
    }

    #[test]
    fn failed_recreate_leaves_context_untouched() {
        let (shared, mut driver) = driver_with_video_mode(800, 600);
        shared.publish_content_rect(1280, 720);
        driver.presenter.fail_next_create();

        let flags_before = driver.context().flags();
        let size_before = driver.video_size();

        assert!(driver.set_resize(1280, 720).is_err());
        assert_eq!(driver.video_size(), size_before);
        assert_eq!(driver.context().flags(), flags_before);
        assert!(driver.presenter().has_swapchain());

        // Next cycle retries with the then-current geometry and succeeds.
        driver.set_resize(1280, 720).unwrap();
        assert_eq!(driver.video_size(), (1280, 720));
    }

    #[test]
    fn interval_change_before_swapchain_is_absorbed() {
        let shared = shared_with_window(800, 600);
        let mut driver =
            VulkanContextDriver::new(shared, HeadlessPresenter::new(), &DriverConfig::default())
                .unwrap();

        driver.set_swap_interval(0);
        assert!(!driver
            .context()
            .flags()
            .contains(ContextFlags::NEEDS_NEW_SWAPCHAIN));
        assert_eq!(driver.context().swap_interval(), 0);
    }

    #[test]
    fn interval_change_after_swapchain_requests_rebuild() {
        let (_shared, mut driver) = driver_with_video_mode(800, 600);

        // Equal interval: no-op.
        driver.set_swap_interval(driver.context().swap_interval());
        assert!(!driver
            .context()
            .flags()
            .contains(ContextFlags::NEEDS_NEW_SWAPCHAIN));

        driver.set_swap_interval(0);
        assert!(driver
            .context()
            .flags()
            .contains(ContextFlags::NEEDS_NEW_SWAPCHAIN));
    }

    #[test]
    fn acquire_and_present_pair_across_cycles() {
        let (_shared, mut driver) = driver_with_video_mode(800, 600);

        // Video mode ends with an eagerly acquired image.
        assert!(driver
            .context()
            .flags()
            .contains(ContextFlags::HAS_ACQUIRED_IMAGE));

        for _ in 0..4 {
            let presents_before = driver.presenter().present_count();
            driver.swap_buffers();
            assert_eq!(driver.presenter().present_count(), presents_before + 1);
            // The next acquire already happened.
            assert!(driver
                .context()
                .flags()
                .contains(ContextFlags::HAS_ACQUIRED_IMAGE));
        }
    }

    #[test]
    fn degraded_path_sleeps_instead_of_presenting() {
        let (_shared, mut driver) = driver_with_video_mode(800, 600);
        assert!(driver
            .context()
            .flags()
            .contains(ContextFlags::HAS_ACQUIRED_IMAGE));

        // Swapchain invalidated between acquire and present.
        driver.presenter.drop_swapchain();
        let presents_before = driver.presenter().present_count();

        let start = Instant::now();
        driver.swap_buffers();
        assert!(start.elapsed() >= DriverConfig::default().idle_wait());
        assert_eq!(driver.presenter().present_count(), presents_before);
        assert!(!driver
            .context()
            .flags()
            .contains(ContextFlags::HAS_ACQUIRED_IMAGE));
    }

    #[test]
    fn failed_eager_acquire_keeps_rebuild_pending() {
        let shared = shared_with_window(800, 600);
        let mut driver =
            VulkanContextDriver::new(shared, HeadlessPresenter::new(), &DriverConfig::default())
                .unwrap();

        // The build succeeds but the eager acquire does not; the rebuild
        // request must survive so the next cycle recovers.
        driver.presenter.fail_next_acquire();
        driver.set_video_mode(800, 600, false).unwrap();

        assert!(driver
            .context()
            .flags()
            .contains(ContextFlags::NEEDS_NEW_SWAPCHAIN));
        assert!(!driver
            .context()
            .flags()
            .contains(ContextFlags::HAS_ACQUIRED_IMAGE));
        assert!(driver.swapchain_invalidated());

        // Recovery: the pending flag drives the next resize pass.
        let check = driver.check_window(800, 600);
        assert!(check.resize);
        driver.set_resize(check.width, check.height).unwrap();
        assert!(!driver
            .context()
            .flags()
            .contains(ContextFlags::NEEDS_NEW_SWAPCHAIN));
    }

    #[test]
    fn repeated_video_mode_rebuilds_cleanly() {
        let (shared, mut driver) = driver_with_video_mode(800, 600);

        shared.publish_content_rect(1920, 1080);
        driver.set_video_mode(1920, 1080, true).unwrap();

        assert_eq!(driver.video_size(), (1920, 1080));
        assert!(driver.presenter().has_swapchain());
        assert!(driver
            .context()
            .flags()
            .contains(ContextFlags::HAS_ACQUIRED_IMAGE));
    }

    #[test]
    fn out_of_date_present_requests_rebuild() {
        let (_shared, mut driver) = driver_with_video_mode(800, 600);
        driver.presenter.invalidate_next_present();

        driver.swap_buffers();
        assert!(driver
            .context()
            .flags()
            .contains(ContextFlags::NEEDS_NEW_SWAPCHAIN));
    }

    #[test]
    fn resize_scenario_end_to_end() {
        let (shared, mut driver) = driver_with_video_mode(800, 600);
        assert!(driver.swapchain_invalidated()); // initial build

        shared.publish_content_rect(1280, 720);

        let check = driver.check_window(800, 600);
        assert!(check.resize);
        assert!(!check.quit);
        assert_eq!((check.width, check.height), (1280, 720));

        driver.set_resize(check.width, check.height).unwrap();
        assert!(driver.swapchain_invalidated());
        assert!(!driver
            .context()
            .flags()
            .contains(ContextFlags::NEEDS_NEW_SWAPCHAIN));
        assert_eq!(driver.video_size(), (1280, 720));
    }

    #[test]
    fn set_video_mode_fails_after_window_destruction() {
        let shared = shared_with_window(800, 600);
        let mut driver =
            VulkanContextDriver::new(shared.clone(), HeadlessPresenter::new(), &DriverConfig::default())
                .unwrap();

        shared.detach_window();
        assert!(matches!(
            driver.set_video_mode(800, 600, false),
            Err(SwapchainError::WindowUnavailable)
        ));
    }

    #[test]
    fn teardown_tolerates_destroyed_window() {
        let (shared, driver) = driver_with_video_mode(800, 600);
        shared.detach_window();
        drop(driver); // must not panic
    }

    #[test]
    fn capabilities_come_from_build_configuration() {
        let (_shared, driver) = driver_with_video_mode(800, 600);
        let caps = driver.capabilities();
        assert_eq!(
            caps.contains(DriverCaps::SLANG_SHADERS),
            cfg!(feature = "slang-shaders")
        );
    }
}
