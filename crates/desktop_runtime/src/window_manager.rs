//! Window lifecycle, z-order, and pointer-gesture state.
//!
//! Focus is derived: the non-minimized window with the highest z-index is the focused one.
//! Raising a window always assigns `max(z) + 1` over every open window, so z-indices stay unique.
//! Operations on unknown window ids are no-ops.

use leptos::logging::{log, warn};

use crate::{
    config::{DesktopConfig, WindowPlacementConfig},
    events::{EventBus, Subscription},
    model::{
        AppId, AppWindow, DesktopBounds, DragSession, InteractionState, OpenWindowRequest,
        PointerPosition, ResizeEdge, ResizeSession, WindowChanges, WindowId, WindowPosition,
        WindowSize, WindowState, WindowTransition,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    Opened(WindowId),
    Closed(WindowId),
    StateChanged { id: WindowId, state: WindowState },
    GeometryChanged(WindowId),
    /// Title or other metadata changed.
    Updated(WindowId),
    FocusChanged(Option<WindowId>),
}

/// Applies a resize delta for `edge` to the start geometry.
///
/// Sizes clamp at the minimum. West and north edges keep the opposite edge anchored, so a clamped
/// resize never drifts the window.
pub fn resize_geometry(
    position_start: WindowPosition,
    size_start: WindowSize,
    edge: ResizeEdge,
    dx: i32,
    dy: i32,
    min_size: WindowSize,
) -> (WindowPosition, WindowSize) {
    let mut position = position_start;
    let mut size = size_start;

    if edge.moves_east() {
        size.width = (size_start.width + dx).max(min_size.width);
    }
    if edge.moves_west() {
        size.width = (size_start.width - dx).max(min_size.width);
        position.x = position_start.x + size_start.width - size.width;
    }
    if edge.moves_south() {
        size.height = (size_start.height + dy).max(min_size.height);
    }
    if edge.moves_north() {
        size.height = (size_start.height - dy).max(min_size.height);
        position.y = position_start.y + size_start.height - size.height;
    }

    (position, size)
}

#[derive(Debug)]
pub struct WindowManager {
    placement: WindowPlacementConfig,
    bounds: DesktopBounds,
    windows: Vec<AppWindow>,
    next_window_id: u64,
    interaction: InteractionState,
    show_desktop_snapshot: Option<Vec<WindowId>>,
    events: EventBus<WindowEvent>,
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new(&DesktopConfig::default())
    }
}

impl WindowManager {
    pub fn new(config: &DesktopConfig) -> Self {
        Self {
            placement: config.window.clone(),
            bounds: config.desktop,
            windows: Vec::new(),
            next_window_id: 1,
            interaction: InteractionState::default(),
            show_desktop_snapshot: None,
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&WindowEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn bounds(&self) -> DesktopBounds {
        self.bounds
    }

    /// Updates the desktop area used for future default placements.
    pub fn set_bounds(&mut self, bounds: DesktopBounds) {
        self.bounds = bounds;
    }

    pub fn min_size(&self) -> WindowSize {
        WindowSize {
            width: self.placement.min_width,
            height: self.placement.min_height,
        }
    }

    /// Windows in open order.
    pub fn windows(&self) -> &[AppWindow] {
        &self.windows
    }

    pub fn window(&self, id: WindowId) -> Option<&AppWindow> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn window_for_app(&self, app_id: &AppId) -> Option<&AppWindow> {
        self.windows.iter().find(|w| &w.app_id == app_id)
    }

    pub fn focused_window_id(&self) -> Option<WindowId> {
        self.windows
            .iter()
            .filter(|w| !w.is_minimized())
            .max_by_key(|w| w.z_index)
            .map(|w| w.id)
    }

    /// Non-minimized windows from back to front.
    pub fn visible_windows(&self) -> Vec<&AppWindow> {
        let mut visible: Vec<&AppWindow> =
            self.windows.iter().filter(|w| !w.is_minimized()).collect();
        visible.sort_by_key(|w| w.z_index);
        visible
    }

    /// One entry per running app (its top-most window), ordered by window id.
    pub fn running_apps(&self) -> Vec<&AppWindow> {
        let mut running: Vec<&AppWindow> = Vec::new();
        for window in &self.windows {
            match running.iter_mut().find(|w| w.app_id == window.app_id) {
                Some(slot) if slot.z_index < window.z_index => *slot = window,
                Some(_) => {}
                None => running.push(window),
            }
        }
        running.sort_by_key(|w| w.id);
        running
    }

    /// Returns `true` when the focused window belongs to `app_id`.
    pub fn is_app_active(&self, app_id: &AppId) -> bool {
        self.focused_window_id()
            .and_then(|id| self.window(id))
            .map(|w| &w.app_id == app_id)
            .unwrap_or(false)
    }

    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }

    pub fn is_showing_desktop(&self) -> bool {
        self.show_desktop_snapshot.is_some()
    }

    /// Opens a window for the requested app, or focuses the app's existing window.
    ///
    /// Launch data on a repeated launch is dropped; the existing window keeps its original file.
    pub fn open(&mut self, request: OpenWindowRequest) -> WindowId {
        if let Some(existing) = self.window_for_app(&request.app_id).map(|w| w.id) {
            if request.launch_data.is_some() {
                log!(
                    "{} is already open in window {existing}; launch data dropped",
                    request.app_id
                );
            }
            self.focus(existing);
            return existing;
        }

        let focus_before = self.focused_window_id();
        let id = WindowId(self.next_window_id);
        self.next_window_id += 1;
        let (position, size) = self.default_placement();
        let z_index = self.next_z_index();

        self.windows.push(AppWindow {
            id,
            app_id: request.app_id,
            title: request.title,
            icon_ref: request.icon_ref,
            state: WindowState::Normal,
            prev_state_before_minimize: None,
            position,
            size,
            z_index,
            launch_data: request.launch_data,
        });
        self.publish(focus_before, [WindowEvent::Opened(id)]);
        id
    }

    /// Raises `id` to the top, restoring it when minimized. No-op when it is already focused.
    pub fn focus(&mut self, id: WindowId) {
        if self.window(id).is_none() || self.focused_window_id() == Some(id) {
            return;
        }
        let focus_before = self.focused_window_id();
        let events = self.raise(id);
        self.publish(focus_before, events);
    }

    /// Applies a lifecycle transition together with optional field changes.
    pub fn set_state(
        &mut self,
        id: WindowId,
        transition: WindowTransition,
        changes: WindowChanges,
    ) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let focus_before = self.focused_window_id();
        let mut events = Vec::new();

        match transition {
            WindowTransition::Closed => {
                self.windows.remove(index);
                self.cancel_gesture_for(id);
                events.push(WindowEvent::Closed(id));
            }
            WindowTransition::Minimized => {
                self.cancel_gesture_for(id);
                if self.minimize_at(index) {
                    events.push(WindowEvent::StateChanged {
                        id,
                        state: WindowState::Minimized,
                    });
                }
                events.extend(self.apply_changes(id, changes));
            }
            WindowTransition::Normal | WindowTransition::Maximized => {
                let target = if transition == WindowTransition::Maximized {
                    WindowState::Maximized
                } else {
                    WindowState::Normal
                };
                if self.focused_window_id() != Some(id) {
                    events.extend(self.raise(id));
                }
                if let Some(window) = self.window_mut(id) {
                    window.prev_state_before_minimize = None;
                    if window.state != target {
                        window.state = target;
                        events.retain(|event| !matches!(event, WindowEvent::StateChanged { .. }));
                        events.push(WindowEvent::StateChanged { id, state: target });
                    }
                }
                if target == WindowState::Maximized {
                    self.cancel_gesture_for(id);
                }
                events.extend(self.apply_changes(id, changes));
            }
        }

        self.publish(focus_before, events);
    }

    /// Merges position and/or size into the window without touching z-order.
    ///
    /// Sizes below the configured minimum are clamped.
    pub fn update_geometry(
        &mut self,
        id: WindowId,
        position: Option<WindowPosition>,
        size: Option<WindowSize>,
    ) {
        let focus_before = self.focused_window_id();
        let events = self.apply_changes(
            id,
            WindowChanges {
                title: None,
                position,
                size,
            },
        );
        self.publish(focus_before, events);
    }

    /// Replaces the window title without raising it.
    pub fn set_title(&mut self, id: WindowId, title: impl Into<String>) {
        let focus_before = self.focused_window_id();
        let events = self.apply_changes(id, WindowChanges::title(title));
        self.publish(focus_before, events);
    }

    /// Minimizes every visible window, or restores the ones minimized by the previous call.
    ///
    /// With no visible windows and nothing to restore this does nothing.
    pub fn show_desktop(&mut self) {
        let focus_before = self.focused_window_id();
        let mut events = Vec::new();

        match self.show_desktop_snapshot.take() {
            Some(snapshot) => {
                let mut restored: Vec<WindowId> = Vec::new();
                for id in snapshot {
                    let Some(window) = self.window_mut(id) else {
                        continue;
                    };
                    if !window.is_minimized() {
                        continue;
                    }
                    window.state = window
                        .prev_state_before_minimize
                        .take()
                        .unwrap_or(WindowState::Normal);
                    events.push(WindowEvent::StateChanged {
                        id,
                        state: window.state,
                    });
                    restored.push(id);
                }
                let top = restored
                    .iter()
                    .filter_map(|id| self.window(*id))
                    .max_by_key(|w| w.z_index)
                    .map(|w| w.id);
                if let Some(top) = top {
                    if self.focused_window_id() != Some(top) {
                        events.extend(self.raise(top));
                    }
                }
            }
            None => {
                let visible: Vec<WindowId> = self
                    .windows
                    .iter()
                    .filter(|w| !w.is_minimized())
                    .map(|w| w.id)
                    .collect();
                if visible.is_empty() {
                    return;
                }
                self.interaction = InteractionState::default();
                for id in &visible {
                    if let Some(index) = self.index_of(*id) {
                        self.minimize_at(index);
                        events.push(WindowEvent::StateChanged {
                            id: *id,
                            state: WindowState::Minimized,
                        });
                    }
                }
                self.show_desktop_snapshot = Some(visible);
            }
        }

        self.publish(focus_before, events);
    }

    /// Taskbar button semantics: minimize the focused window, otherwise focus it.
    pub fn taskbar_click(&mut self, id: WindowId) {
        if self.focused_window_id() == Some(id) {
            self.set_state(id, WindowTransition::Minimized, WindowChanges::default());
        } else {
            self.focus(id);
        }
    }

    /// Starts moving `id`. Returns `false` when the gesture was not started.
    pub fn begin_drag(&mut self, id: WindowId, pointer: PointerPosition) -> bool {
        let Some(position_start) = self.gesture_start(id, "drag") else {
            return false;
        };
        self.focus(id);
        self.interaction.dragging = Some(DragSession {
            window_id: id,
            pointer_start: pointer,
            position_start,
        });
        true
    }

    /// Starts resizing `id` from `edge`. Returns `false` when the gesture was not started.
    pub fn begin_resize(
        &mut self,
        id: WindowId,
        edge: ResizeEdge,
        pointer: PointerPosition,
    ) -> bool {
        let Some(position_start) = self.gesture_start(id, "resize") else {
            return false;
        };
        let Some(size_start) = self.window(id).map(|w| w.size) else {
            return false;
        };
        self.focus(id);
        self.interaction.resizing = Some(ResizeSession {
            window_id: id,
            edge,
            pointer_start: pointer,
            position_start,
            size_start,
        });
        true
    }

    /// Recomputes the active gesture's geometry from its start state and the total pointer delta.
    pub fn update_gesture(&mut self, pointer: PointerPosition) {
        if let Some(session) = self.interaction.dragging {
            if self.window(session.window_id).is_none() {
                self.interaction = InteractionState::default();
                return;
            }
            let (dx, dy) = pointer.delta_from(session.pointer_start);
            self.update_geometry(
                session.window_id,
                Some(session.position_start.offset(dx, dy)),
                None,
            );
        } else if let Some(session) = self.interaction.resizing {
            if self.window(session.window_id).is_none() {
                self.interaction = InteractionState::default();
                return;
            }
            let (dx, dy) = pointer.delta_from(session.pointer_start);
            let (position, size) = resize_geometry(
                session.position_start,
                session.size_start,
                session.edge,
                dx,
                dy,
                self.min_size(),
            );
            self.update_geometry(session.window_id, Some(position), Some(size));
        }
    }

    /// Ends the active gesture and returns the window it applied to.
    pub fn end_gesture(&mut self) -> Option<WindowId> {
        let id = self.interaction.window_id();
        self.interaction = InteractionState::default();
        id.filter(|id| self.window(*id).is_some())
    }

    fn gesture_start(&self, id: WindowId, gesture: &str) -> Option<WindowPosition> {
        if let Some(active) = self.interaction.window_id() {
            warn!("{gesture} on window {id} ignored: gesture already active on window {active}");
            return None;
        }
        let window = self.window(id)?;
        if window.state != WindowState::Normal {
            return None;
        }
        Some(window.position)
    }

    fn cancel_gesture_for(&mut self, id: WindowId) {
        if self.interaction.window_id() == Some(id) {
            self.interaction = InteractionState::default();
        }
    }

    fn default_placement(&self) -> (WindowPosition, WindowSize) {
        let placement = &self.placement;
        let size = WindowSize {
            width: placement
                .default_width
                .min(self.bounds.width - placement.margin),
            height: placement
                .default_height
                .min(self.bounds.height - placement.margin),
        }
        .clamped_min(placement.min_width, placement.min_height);

        let slot = (self.windows.len() % placement.cascade_slots.max(1)) as i32;
        let offset = placement.cascade_step * slot;
        let x = (self.bounds.width - size.width) / 2 + offset;
        let y = (self.bounds.height - size.height) / 2 + offset;

        let position = WindowPosition {
            x: x.min(self.bounds.width - size.width).max(0),
            y: y.min(self.bounds.height - size.height).max(0),
        };
        (position, size)
    }

    fn next_z_index(&self) -> u32 {
        self.windows.iter().map(|w| w.z_index).max().unwrap_or(0) + 1
    }

    fn index_of(&self, id: WindowId) -> Option<usize> {
        self.windows.iter().position(|w| w.id == id)
    }

    fn window_mut(&mut self, id: WindowId) -> Option<&mut AppWindow> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    fn raise(&mut self, id: WindowId) -> Vec<WindowEvent> {
        let z_index = self.next_z_index();
        let Some(window) = self.window_mut(id) else {
            return Vec::new();
        };
        window.z_index = z_index;
        if window.is_minimized() {
            window.state = window
                .prev_state_before_minimize
                .take()
                .unwrap_or(WindowState::Normal);
            return vec![WindowEvent::StateChanged {
                id,
                state: window.state,
            }];
        }
        Vec::new()
    }

    fn minimize_at(&mut self, index: usize) -> bool {
        let window = &mut self.windows[index];
        if window.is_minimized() {
            return false;
        }
        window.prev_state_before_minimize = Some(match window.state {
            WindowState::Maximized => WindowState::Maximized,
            _ => WindowState::Normal,
        });
        window.state = WindowState::Minimized;
        true
    }

    fn apply_changes(&mut self, id: WindowId, changes: WindowChanges) -> Vec<WindowEvent> {
        let min = self.min_size();
        let Some(window) = self.window_mut(id) else {
            return Vec::new();
        };
        let mut events = Vec::new();

        if let Some(title) = changes.title {
            if window.title != title {
                window.title = title;
                events.push(WindowEvent::Updated(id));
            }
        }

        let mut geometry_changed = false;
        if let Some(position) = changes.position {
            geometry_changed |= window.position != position;
            window.position = position;
        }
        if let Some(size) = changes.size {
            let size = size.clamped_min(min.width, min.height);
            geometry_changed |= window.size != size;
            window.size = size;
        }
        if geometry_changed {
            events.push(WindowEvent::GeometryChanged(id));
        }
        events
    }

    fn publish(
        &self,
        focus_before: Option<WindowId>,
        events: impl IntoIterator<Item = WindowEvent>,
    ) {
        for event in events {
            self.events.emit(&event);
        }
        let focus_after = self.focused_window_id();
        if focus_after != focus_before {
            self.events.emit(&WindowEvent::FocusChanged(focus_after));
        }
    }
}
