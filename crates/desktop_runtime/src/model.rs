use std::fmt;

use serde::{Deserialize, Serialize};

pub const DESKTOP_LAYOUT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable app identifier (`notepad`, `explorer`) as declared by the app manifest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AppId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowState {
    #[default]
    Normal,
    Maximized,
    Minimized,
}

/// Requested transition for [`crate::window_manager::WindowManager::set_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowTransition {
    Normal,
    Maximized,
    Minimized,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

impl WindowPosition {
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: i32,
    pub height: i32,
}

impl WindowSize {
    pub fn clamped_min(self, min_width: i32, min_height: i32) -> Self {
        Self {
            width: self.width.max(min_width),
            height: self.height.max(min_height),
        }
    }
}

/// Usable desktop area windows are placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopBounds {
    pub width: i32,
    pub height: i32,
}

impl Default for DesktopBounds {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Payload handed to an app when it is launched for a specific file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchData {
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppWindow {
    pub id: WindowId,
    pub app_id: AppId,
    pub title: String,
    pub icon_ref: String,
    pub state: WindowState,
    pub prev_state_before_minimize: Option<WindowState>,
    pub position: WindowPosition,
    pub size: WindowSize,
    pub z_index: u32,
    pub launch_data: Option<LaunchData>,
}

impl AppWindow {
    pub fn is_minimized(&self) -> bool {
        self.state == WindowState::Minimized
    }

    pub fn is_maximized(&self) -> bool {
        self.state == WindowState::Maximized
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenWindowRequest {
    pub app_id: AppId,
    pub title: String,
    pub icon_ref: String,
    pub launch_data: Option<LaunchData>,
}

impl OpenWindowRequest {
    pub fn new(app_id: impl Into<AppId>, title: impl Into<String>) -> Self {
        let app_id = app_id.into();
        Self {
            icon_ref: app_id.as_str().to_string(),
            app_id,
            title: title.into(),
            launch_data: None,
        }
    }

    pub fn with_icon(mut self, icon_ref: impl Into<String>) -> Self {
        self.icon_ref = icon_ref.into();
        self
    }

    pub fn with_file(mut self, file_path: impl Into<String>) -> Self {
        self.launch_data = Some(LaunchData {
            file_path: file_path.into(),
        });
        self
    }
}

/// Field changes applied together with a state transition or a metadata update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowChanges {
    pub title: Option<String>,
    pub position: Option<WindowPosition>,
    pub size: Option<WindowSize>,
}

impl WindowChanges {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.position.is_none() && self.size.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

impl PointerPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn delta_from(self, start: PointerPosition) -> (i32, i32) {
        (self.x - start.x, self.y - start.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeEdge {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeEdge {
    pub fn moves_west(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    pub fn moves_east(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    pub fn moves_north(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    pub fn moves_south(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub window_id: WindowId,
    pub pointer_start: PointerPosition,
    pub position_start: WindowPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSession {
    pub window_id: WindowId,
    pub edge: ResizeEdge,
    pub pointer_start: PointerPosition,
    pub position_start: WindowPosition,
    pub size_start: WindowSize,
}

/// The single pointer gesture in flight, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionState {
    pub dragging: Option<DragSession>,
    pub resizing: Option<ResizeSession>,
}

impl InteractionState {
    pub fn is_active(&self) -> bool {
        self.dragging.is_some() || self.resizing.is_some()
    }

    pub fn window_id(&self) -> Option<WindowId> {
        self.dragging
            .map(|session| session.window_id)
            .or(self.resizing.map(|session| session.window_id))
    }
}

/// Desktop icon coordinates in desktop pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IconPosition {
    pub x: i32,
    pub y: i32,
}

impl IconPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rounds both coordinates to the nearest multiple of `grid`.
    pub fn snapped(self, grid: i32) -> Self {
        if grid <= 1 {
            return self;
        }
        let snap = |value: i32| {
            let g = f64::from(grid);
            ((f64::from(value) / g).round() * g) as i32
        };
        Self {
            x: snap(self.x),
            y: snap(self.y),
        }
    }
}

/// One restorable window in a persisted desktop layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowLayout {
    pub app_id: AppId,
    pub state: WindowState,
    /// State a minimized window returns to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_state_before_minimize: Option<WindowState>,
    pub position: WindowPosition,
    pub size: WindowSize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DesktopLayoutSnapshot {
    pub schema_version: u32,
    #[serde(default)]
    pub icon_positions: std::collections::BTreeMap<String, IconPosition>,
    #[serde(default)]
    pub windows: Vec<WindowLayout>,
}
