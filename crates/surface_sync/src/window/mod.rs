//! Shared window state and the window state observer
//!
//! The window system owns the native window and mutates its geometry and
//! existence from its own thread. The adapter never owns that state; it
//! holds a read/observe relationship through [`SharedWindowState`], which
//! serializes every access behind one mutex and hands data out as value
//! snapshots, never as live references across threads.
//!
//! # Module Organization
//!
//! - **`native`**: the opaque native window handle the presenter consumes
//! - **`shared`**: the mutex-guarded state and the snapshot/publish API

pub mod native;
pub mod shared;

pub use native::NativeWindow;
pub use shared::{SharedWindowState, WindowSnapshot};
