//! Mutex-guarded window state shared between the window-system thread and
//! the render thread
//!
//! Critical sections are field reads/writes only; no graphics work ever
//! happens while the lock is held.

use std::sync::{Arc, Mutex, PoisonError};

use super::NativeWindow;

/// Value snapshot of the shared window state, read out of a single critical
/// section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSnapshot {
    /// Whether a native window handle is currently attached.
    pub window_exists: bool,
    /// Content width as last reported by the window system.
    pub width: u32,
    /// Content height as last reported by the window system.
    pub height: u32,
    /// Whether the window system flagged a content rect change since the
    /// last snapshot. Edge-triggered: consumed by the snapshot that
    /// observed it.
    pub rect_changed: bool,
}

struct WindowStateInner {
    window: Option<NativeWindow>,
    content_rect: (u32, u32),
    content_rect_changed: bool,
}

/// Shared window state storage.
///
/// The window-system side publishes through [`attach_window`],
/// [`detach_window`] and [`publish_content_rect`]; the render side observes
/// through [`poll`], [`content_rect`] and [`with_window`]. Clones share the
/// same underlying state.
///
/// [`attach_window`]: SharedWindowState::attach_window
/// [`detach_window`]: SharedWindowState::detach_window
/// [`publish_content_rect`]: SharedWindowState::publish_content_rect
/// [`poll`]: SharedWindowState::poll
/// [`content_rect`]: SharedWindowState::content_rect
/// [`with_window`]: SharedWindowState::with_window
#[derive(Clone)]
pub struct SharedWindowState {
    inner: Arc<Mutex<WindowStateInner>>,
}

impl SharedWindowState {
    /// Create shared state with no window and a zero content rect.
    pub fn new() -> Self {
        Self::with_content_rect(0, 0)
    }

    /// Create shared state with no window and a known content rect.
    pub fn with_content_rect(width: u32, height: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(WindowStateInner {
                window: None,
                content_rect: (width, height),
                content_rect_changed: false,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WindowStateInner> {
        // A poisoned lock only means another thread panicked mid-write of
        // plain fields; the state itself stays usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a native window handle. Window-system thread only.
    pub fn attach_window(&self, window: NativeWindow) {
        self.lock().window = Some(window);
    }

    /// Detach the native window handle. May happen at any time, including
    /// while the render thread is mid-cycle.
    pub fn detach_window(&self) {
        self.lock().window = None;
    }

    /// Publish a new content rect and raise the edge-triggered changed flag.
    /// Window-system thread only.
    pub fn publish_content_rect(&self, width: u32, height: u32) {
        let mut state = self.lock();
        state.content_rect = (width, height);
        state.content_rect_changed = true;
    }

    /// Whether a window handle is attached right now. The answer can be
    /// stale by the time the caller acts on it; use [`Self::with_window`]
    /// when the handle is about to be used.
    pub fn window_exists(&self) -> bool {
        self.lock().window.is_some()
    }

    /// Current content rect, without touching the changed flag.
    pub fn content_rect(&self) -> (u32, u32) {
        self.lock().content_rect
    }

    /// Snapshot the shared state and consume the changed flag.
    ///
    /// The flag is cleared exactly once, by the snapshot that observed it
    /// set; subsequent polls report `rect_changed == false` until the
    /// window system publishes again.
    pub fn poll(&self) -> WindowSnapshot {
        let mut state = self.lock();
        let rect_changed = state.content_rect_changed;
        state.content_rect_changed = false;
        WindowSnapshot {
            window_exists: state.window.is_some(),
            width: state.content_rect.0,
            height: state.content_rect.1,
            rect_changed,
        }
    }

    /// Run `f` with the current window handle while the lock is held, so
    /// existence check and handle use cannot be separated by a concurrent
    /// detach. `f` must not make blocking graphics calls.
    pub fn with_window<R>(&self, f: impl FnOnce(Option<&NativeWindow>) -> R) -> R {
        let state = self.lock();
        f(state.window.as_ref())
    }
}

impl Default for SharedWindowState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changed_flag_is_consumed_by_one_poll() {
        let shared = SharedWindowState::with_content_rect(800, 600);
        shared.publish_content_rect(1280, 720);

        let first = shared.poll();
        assert!(first.rect_changed);
        assert_eq!((first.width, first.height), (1280, 720));

        let second = shared.poll();
        assert!(!second.rect_changed);
        assert_eq!((second.width, second.height), (1280, 720));
    }

    #[test]
    fn content_rect_read_leaves_flag_intact() {
        let shared = SharedWindowState::new();
        shared.publish_content_rect(640, 480);

        assert_eq!(shared.content_rect(), (640, 480));
        assert!(shared.poll().rect_changed);
    }

    #[test]
    fn with_window_sees_detach() {
        let shared = SharedWindowState::new();
        shared.attach_window(NativeWindow::Headless);
        assert!(shared.with_window(|w| w.is_some()));

        shared.detach_window();
        assert!(shared.with_window(|w| w.is_none()));
        assert!(!shared.window_exists());
    }

    #[test]
    fn snapshot_reports_existence_and_rect_together() {
        let shared = SharedWindowState::with_content_rect(320, 240);
        shared.attach_window(NativeWindow::Headless);

        let snap = shared.poll();
        assert!(snap.window_exists);
        assert!(!snap.rect_changed);
        assert_eq!((snap.width, snap.height), (320, 240));
    }

    #[test]
    fn publishes_from_another_thread_are_observed() {
        let shared = SharedWindowState::with_content_rect(800, 600);
        let publisher = shared.clone();
        let handle = std::thread::spawn(move || {
            publisher.publish_content_rect(1920, 1080);
        });
        handle.join().unwrap();

        let snap = shared.poll();
        assert!(snap.rect_changed);
        assert_eq!((snap.width, snap.height), (1920, 1080));
    }
}
