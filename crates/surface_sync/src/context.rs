//! Adapter-owned state for one window/surface pairing

use bitflags::bitflags;

bitflags! {
    /// Independent status bits for the surface context.
    ///
    /// The bits are not mutually exclusive; each one is raised and cleared
    /// on its own schedule by the lifecycle controller and the present
    /// cycle driver.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ContextFlags: u32 {
        /// Geometry or swap interval changed since the swapchain was last
        /// built; the next resize pass must rebuild it.
        const NEEDS_NEW_SWAPCHAIN = 1 << 0;
        /// An image index is held from a successful acquire and has not
        /// been presented yet.
        const HAS_ACQUIRED_IMAGE = 1 << 1;
        /// A recreation succeeded; host resources that reference the old
        /// swapchain are stale and must be rebuilt.
        const SWAPCHAIN_INVALID = 1 << 2;
    }
}

/// State the adapter owns for one window/surface pairing: the geometry the
/// swapchain was last built for, the requested swap interval, the currently
/// acquired image (if any) and the status flags.
#[derive(Debug)]
pub struct SurfaceContext {
    width: u32,
    height: u32,
    swap_interval: u32,
    current_image: Option<u32>,
    flags: ContextFlags,
}

impl SurfaceContext {
    /// New context with no swapchain built yet.
    pub fn new(swap_interval: u32) -> Self {
        Self {
            width: 0,
            height: 0,
            swap_interval,
            current_image: None,
            flags: ContextFlags::empty(),
        }
    }

    /// Geometry the swapchain was last built for.
    pub fn video_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Requested present interval. Independent of whether a swapchain
    /// currently reflects it.
    pub fn swap_interval(&self) -> u32 {
        self.swap_interval
    }

    /// Current status flags.
    pub fn flags(&self) -> ContextFlags {
        self.flags
    }

    /// Raise `NEEDS_NEW_SWAPCHAIN`.
    pub fn mark_needs_new_swapchain(&mut self) {
        self.flags |= ContextFlags::NEEDS_NEW_SWAPCHAIN;
    }

    /// Record a new swap interval. Returns true if it differed from the
    /// previous one.
    pub fn set_swap_interval(&mut self, interval: u32) -> bool {
        if self.swap_interval == interval {
            return false;
        }
        self.swap_interval = interval;
        true
    }

    /// Record a successful swapchain build for the given geometry:
    /// downstream resources are now stale and the rebuild request is
    /// satisfied.
    pub fn adopt_swapchain(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.flags |= ContextFlags::SWAPCHAIN_INVALID;
        self.flags &= !ContextFlags::NEEDS_NEW_SWAPCHAIN;
    }

    /// Record geometry without touching the flags (first-time video mode).
    pub fn set_video_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Store a successfully acquired image index.
    pub fn store_acquired_image(&mut self, index: u32) {
        self.current_image = Some(index);
        self.flags |= ContextFlags::HAS_ACQUIRED_IMAGE;
    }

    /// Take the held image index, clearing `HAS_ACQUIRED_IMAGE`. Returns
    /// `None` when no acquire is pending.
    pub fn take_acquired_image(&mut self) -> Option<u32> {
        if !self.flags.contains(ContextFlags::HAS_ACQUIRED_IMAGE) {
            return None;
        }
        self.flags &= !ContextFlags::HAS_ACQUIRED_IMAGE;
        self.current_image.take()
    }

    /// Acknowledge `SWAPCHAIN_INVALID` after the host rebuilt its cached
    /// resources. Returns true if the flag was set.
    pub fn acknowledge_invalidation(&mut self) -> bool {
        let was_set = self.flags.contains(ContextFlags::SWAPCHAIN_INVALID);
        self.flags &= !ContextFlags::SWAPCHAIN_INVALID;
        was_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_has_no_flags() {
        let ctx = SurfaceContext::new(1);
        assert_eq!(ctx.flags(), ContextFlags::empty());
        assert_eq!(ctx.video_size(), (0, 0));
        assert_eq!(ctx.swap_interval(), 1);
    }

    #[test]
    fn adopt_swapchain_flips_flags() {
        let mut ctx = SurfaceContext::new(1);
        ctx.mark_needs_new_swapchain();

        ctx.adopt_swapchain(1280, 720);
        assert!(!ctx.flags().contains(ContextFlags::NEEDS_NEW_SWAPCHAIN));
        assert!(ctx.flags().contains(ContextFlags::SWAPCHAIN_INVALID));
        assert_eq!(ctx.video_size(), (1280, 720));
    }

    #[test]
    fn acquired_image_is_taken_once() {
        let mut ctx = SurfaceContext::new(0);
        ctx.store_acquired_image(2);
        assert!(ctx.flags().contains(ContextFlags::HAS_ACQUIRED_IMAGE));

        assert_eq!(ctx.take_acquired_image(), Some(2));
        assert!(!ctx.flags().contains(ContextFlags::HAS_ACQUIRED_IMAGE));
        assert_eq!(ctx.take_acquired_image(), None);
    }

    #[test]
    fn interval_change_is_reported() {
        let mut ctx = SurfaceContext::new(1);
        assert!(!ctx.set_swap_interval(1));
        assert!(ctx.set_swap_interval(0));
        assert_eq!(ctx.swap_interval(), 0);
    }

    #[test]
    fn invalidation_is_acknowledged_once() {
        let mut ctx = SurfaceContext::new(1);
        ctx.adopt_swapchain(640, 480);
        assert!(ctx.acknowledge_invalidation());
        assert!(!ctx.acknowledge_invalidation());
    }
}
