//! Swapchain creation, acquisition and presentation over ash

use std::sync::Arc;

use ash::extensions::khr::{Surface, Swapchain as SwapchainLoader};
use ash::vk;

use super::VulkanDeviceContext;
use crate::driver::InitError;
use crate::present::{PresentOutcome, Presenter, SwapchainCreation, SwapchainError};
use crate::window::NativeWindow;

/// Presenter backed by a real Vulkan swapchain.
///
/// Driven exclusively from the render thread. Acquisition is
/// fence-synchronized: no rendering happens between acquire and present
/// inside the adapter, so the fence wait is all the ordering presentation
/// needs.
pub struct VulkanPresenter {
    device_ctx: Arc<VulkanDeviceContext>,
    surface_loader: Surface,
    swapchain_loader: SwapchainLoader,
    surface: vk::SurfaceKHR,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    extent: vk::Extent2D,
    swap_interval: u32,
    acquire_fence: vk::Fence,
}

impl VulkanPresenter {
    /// Create the presenter against a host-supplied device context.
    pub fn new(device_ctx: Arc<VulkanDeviceContext>) -> Result<Self, InitError> {
        let surface_loader = Surface::new(&device_ctx.entry, &device_ctx.instance);
        let swapchain_loader = SwapchainLoader::new(&device_ctx.instance, &device_ctx.device);

        let fence_info = vk::FenceCreateInfo::builder();
        let acquire_fence = unsafe {
            device_ctx
                .device
                .create_fence(&fence_info, None)
                .map_err(InitError::Api)?
        };

        Ok(Self {
            device_ctx,
            surface_loader,
            swapchain_loader,
            surface: vk::SurfaceKHR::null(),
            swapchain: vk::SwapchainKHR::null(),
            images: Vec::new(),
            extent: vk::Extent2D { width: 0, height: 0 },
            swap_interval: 0,
            acquire_fence,
        })
    }

    /// Images of the current swapchain, for hosts rebuilding per-image
    /// resources after an invalidation.
    pub fn images(&self) -> &[vk::Image] {
        &self.images
    }

    /// Extent the current swapchain was built with.
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    fn choose_format(&self) -> Result<vk::SurfaceFormatKHR, SwapchainError> {
        let formats = unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(self.device_ctx.physical_device, self.surface)
                .map_err(SwapchainError::Api)?
        };
        if formats.is_empty() {
            return Err(SwapchainError::CreationFailed("surface reports no formats".to_string()));
        }
        Ok(formats
            .iter()
            .find(|sf| {
                sf.format == vk::Format::B8G8R8A8_SRGB
                    && sf.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
            })
            .copied()
            .unwrap_or(formats[0]))
    }

    /// Map the requested swap interval onto a supported present mode:
    /// interval 0 asks for MAILBOX then IMMEDIATE, anything else is FIFO.
    fn choose_present_mode(&self, swap_interval: u32) -> Result<vk::PresentModeKHR, SwapchainError> {
        let modes = unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(self.device_ctx.physical_device, self.surface)
                .map_err(SwapchainError::Api)?
        };
        if swap_interval == 0 {
            for desired in [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE] {
                if modes.contains(&desired) {
                    return Ok(desired);
                }
            }
        }
        Ok(vk::PresentModeKHR::FIFO)
    }

    fn release_swapchain(&mut self) {
        if self.swapchain != vk::SwapchainKHR::null() {
            unsafe {
                self.swapchain_loader.destroy_swapchain(self.swapchain, None);
            }
            self.swapchain = vk::SwapchainKHR::null();
            self.images.clear();
        }
    }

    /// Release the swapchain and surface, waiting the device out first.
    /// The swapchain goes before the surface it was created against.
    fn release_surface(&mut self) {
        if self.swapchain == vk::SwapchainKHR::null() && self.surface == vk::SurfaceKHR::null() {
            return;
        }
        unsafe {
            let _ = self.device_ctx.device.device_wait_idle();
        }
        self.release_swapchain();
        if self.surface != vk::SurfaceKHR::null() {
            unsafe {
                self.surface_loader.destroy_surface(self.surface, None);
            }
            self.surface = vk::SurfaceKHR::null();
        }
    }
}

impl Presenter for VulkanPresenter {
    fn create_surface(&mut self, window: &NativeWindow, width: u32, height: u32) -> Result<(), SwapchainError> {
        let NativeWindow::Raw { display, window } = window else {
            return Err(SwapchainError::CreationFailed(
                "headless window has no Vulkan surface".to_string(),
            ));
        };

        // A second video mode replaces the surface; release the old one
        // rather than leaking it.
        self.release_surface();

        let surface = unsafe {
            ash_window::create_surface(
                &self.device_ctx.entry,
                &self.device_ctx.instance,
                *display,
                *window,
                None,
            )
            .map_err(SwapchainError::Api)?
        };

        self.surface = surface;
        log::debug!("[Vulkan] Surface created for {}x{} window.", width, height);
        Ok(())
    }

    fn create_swapchain(&mut self, width: u32, height: u32, swap_interval: u32) -> Result<SwapchainCreation, SwapchainError> {
        if self.surface == vk::SurfaceKHR::null() {
            return Err(SwapchainError::MissingSurface);
        }

        let surface_caps = unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(self.device_ctx.physical_device, self.surface)
                .map_err(SwapchainError::Api)?
        };

        let extent = if surface_caps.current_extent.width != u32::MAX {
            surface_caps.current_extent
        } else {
            vk::Extent2D {
                width: width.clamp(
                    surface_caps.min_image_extent.width,
                    surface_caps.max_image_extent.width,
                ),
                height: height.clamp(
                    surface_caps.min_image_extent.height,
                    surface_caps.max_image_extent.height,
                ),
            }
        };

        // Nothing to rebuild if the existing swapchain already matches.
        if self.swapchain != vk::SwapchainKHR::null()
            && self.extent == extent
            && self.swap_interval == swap_interval
        {
            return Ok(SwapchainCreation::Revalidated);
        }

        let format = self.choose_format()?;
        let present_mode = self.choose_present_mode(swap_interval)?;

        let image_count = (surface_caps.min_image_count + 1).min(if surface_caps.max_image_count > 0 {
            surface_caps.max_image_count
        } else {
            surface_caps.min_image_count + 1
        });

        let create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(self.surface)
            .min_image_count(image_count)
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(surface_caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(self.swapchain);

        // The old swapchain stays live until creation succeeds, so a failed
        // rebuild leaves it usable.
        let new_swapchain = unsafe {
            self.swapchain_loader
                .create_swapchain(&create_info, None)
                .map_err(SwapchainError::Api)?
        };

        let images = unsafe {
            match self.swapchain_loader.get_swapchain_images(new_swapchain) {
                Ok(images) => images,
                Err(err) => {
                    self.swapchain_loader.destroy_swapchain(new_swapchain, None);
                    return Err(SwapchainError::Api(err));
                }
            }
        };

        self.release_swapchain();
        self.swapchain = new_swapchain;
        self.images = images;
        self.extent = extent;
        self.swap_interval = swap_interval;

        log::debug!(
            "[Vulkan] Swapchain created: {}x{}, {} images, {:?}.",
            extent.width,
            extent.height,
            self.images.len(),
            present_mode
        );
        Ok(SwapchainCreation::Created)
    }

    fn has_swapchain(&self) -> bool {
        self.swapchain != vk::SwapchainKHR::null()
    }

    fn acquire_next_image(&mut self) -> Option<u32> {
        if self.swapchain == vk::SwapchainKHR::null() {
            return None;
        }

        let acquired = unsafe {
            self.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                vk::Semaphore::null(),
                self.acquire_fence,
            )
        };

        match acquired {
            Ok((index, _suboptimal)) => {
                let device = &self.device_ctx.device;
                let fences = [self.acquire_fence];
                let waited = unsafe {
                    device
                        .wait_for_fences(&fences, true, u64::MAX)
                        .and_then(|()| device.reset_fences(&fences))
                };
                if let Err(err) = waited {
                    log::error!("[Vulkan] Acquire fence wait failed: {:?}.", err);
                    return None;
                }
                Some(index)
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => None,
            Err(err) => {
                log::error!("[Vulkan] Failed to acquire swapchain image: {:?}.", err);
                None
            }
        }
    }

    fn present(&mut self, image_index: u32) -> PresentOutcome {
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = {
            let _queue = self.device_ctx.lock_queue();
            unsafe {
                self.swapchain_loader
                    .queue_present(self.device_ctx.queue, &present_info)
            }
        };

        match result {
            Ok(false) => PresentOutcome::Presented,
            Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => PresentOutcome::OutOfDate,
            Err(err) => {
                log::error!("[Vulkan] Present failed: {:?}.", err);
                PresentOutcome::OutOfDate
            }
        }
    }

    fn destroy_surface(&mut self, window: Option<&NativeWindow>) {
        if window.is_none() {
            log::debug!("[Vulkan] Destroying surface after the window is gone.");
        }
        self.release_surface();
    }
}

impl Drop for VulkanPresenter {
    fn drop(&mut self) {
        self.destroy_surface(None);
        if self.acquire_fence != vk::Fence::null() {
            unsafe {
                self.device_ctx.device.destroy_fence(self.acquire_fence, None);
            }
            self.acquire_fence = vk::Fence::null();
        }
    }
}
