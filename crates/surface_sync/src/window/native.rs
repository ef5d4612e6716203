//! Opaque native window handle

use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

/// Handle to the native window the surface is created against.
///
/// The window-system thread attaches and detaches this handle through
/// [`super::SharedWindowState`]; the render thread copies it out under the
/// shared lock and hands it to the presenter. The adapter never dereferences
/// the handle itself.
#[derive(Clone, Copy, Debug)]
pub enum NativeWindow {
    /// A real platform window, described by its raw display/window handles.
    Raw {
        /// Display-side handle (connection, display, instance).
        display: RawDisplayHandle,
        /// Window-side handle.
        window: RawWindowHandle,
    },
    /// A windowless stand-in for tests and headless hosts.
    Headless,
}

// The raw handles contain platform pointers. The window-system thread hands
// the handle over through the shared lock and only the render thread
// dereferences it (inside the presenter), so moving it across threads is
// sound.
unsafe impl Send for NativeWindow {}

impl NativeWindow {
    /// Whether this handle can back a real rendering surface.
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw { .. })
    }
}
