use chrono::{DateTime, TimeZone};
use platform_host::format_clock_label;

use crate::model::{AppId, WindowId};
use crate::window_manager::WindowManager;

/// One taskbar button per running app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskbarButton {
    pub window_id: WindowId,
    pub app_id: AppId,
    pub title: String,
    pub icon_ref: String,
    /// The app owns the focused window.
    pub active: bool,
    pub minimized: bool,
}

/// Taskbar buttons in window-open order.
pub fn taskbar_buttons(wm: &WindowManager) -> Vec<TaskbarButton> {
    wm.running_apps()
        .into_iter()
        .map(|window| TaskbarButton {
            window_id: window.id,
            app_id: window.app_id.clone(),
            title: window.title.clone(),
            icon_ref: window.icon_ref.clone(),
            active: wm.is_app_active(&window.app_id),
            minimized: window.is_minimized(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskbarClockConfig {
    pub use_24_hour: bool,
    pub show_date: bool,
}

impl TaskbarClockConfig {
    pub fn label<Tz>(&self, at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let time = format_clock_label(at, self.use_24_hour);
        if self.show_date {
            format!("{time} {}", at.format("%-m/%-d/%Y"))
        } else {
            time
        }
    }
}
