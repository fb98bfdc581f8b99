//! Headless view models for the desktop chrome: taskbar buttons, clock, and start menu.
//!
//! Presentation layers render these from shell state and send user intent back through
//! [`DesktopShell::dispatch`](crate::shell::DesktopShell::dispatch).

mod start_menu;
mod taskbar;

pub use start_menu::{StartMenu, StartMenuItem};
pub use taskbar::{taskbar_buttons, TaskbarButton, TaskbarClockConfig};
