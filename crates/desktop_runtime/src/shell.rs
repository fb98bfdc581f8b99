//! Desktop shell coordinator.
//!
//! [`DesktopShell`] glues user intent (icon double-clicks, file drops, taskbar clicks, explorer
//! navigation) to the [`WindowManager`] and [`VirtualFileSystem`]. It also owns the state that
//! belongs to neither: desktop icon placement, the start menu, mounted network drives, the
//! explorer view, and the item shown by the properties app.

use std::collections::BTreeMap;

use leptos::logging::{log, warn};
use platform_host::{
    is_root_path, normalize_virtual_path, virtual_file_name, CloudProvider, FILE_PATH_DRAG_MIME,
};
use thiserror::Error;

use crate::apps::{
    associated_app, file_window_title, AppContent, AppRegistry, ContentContext,
    PropertiesContext, EXPLORER_APP_ID, PROPERTIES_APP_ID, SETTINGS_APP_ID,
};
use crate::config::DesktopConfig;
use crate::drives::{DriveError, NetworkDrive, NetworkDrives};
use crate::events::{EventBus, Subscription};
use crate::explorer::{
    fetch_remote_listing, sidebar_sections, ExplorerView, NavigationTicket, RemoteFetch,
    SidebarSection, HOME_PATH,
};
use crate::host::DesktopHostContext;
use crate::model::{
    AppId, DesktopLayoutSnapshot, IconPosition, PointerPosition, WindowChanges, WindowId,
    WindowLayout, WindowState, WindowTransition, DESKTOP_LAYOUT_SCHEMA_VERSION,
};
use crate::vfs::{
    ClipboardController, EntryId, EntryKind, SearchResult, VfsError, VirtualFileSystem,
};
use crate::window_manager::WindowManager;

/// Settings section opened when a cloud provider has no client configured.
pub const CLOUD_SETTINGS_SECTION: &str = "Cloud Storage";

const MAX_SHORTCUT_HOPS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("unknown app `{0}`")]
    UnknownApp(AppId),
    #[error("no app can open `{0}`")]
    UnsupportedAssociation(String),
    #[error(transparent)]
    Vfs(#[from] VfsError),
    #[error(transparent)]
    Drive(#[from] DriveError),
    #[error("{} is not configured; opening Settings", .0.display_name())]
    CloudNotConfigured(CloudProvider),
    #[error("{0}")]
    Provider(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    StartMenuChanged(bool),
    IconMoved {
        icon_id: String,
        position: IconPosition,
    },
    ExplorerChanged(String),
    DrivesChanged,
    PropertiesChanged,
}

/// Drag-and-drop payload exchanged between icons, listings, and taskbar buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    pub mime: String,
    pub data: String,
}

impl DragPayload {
    pub fn file_path(path: &str) -> Self {
        Self {
            mime: FILE_PATH_DRAG_MIME.to_string(),
            data: normalize_virtual_path(path),
        }
    }

    /// The carried path, when this is a file-path payload.
    pub fn as_file_path(&self) -> Option<&str> {
        (self.mime == FILE_PATH_DRAG_MIME).then_some(self.data.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    TaskbarButton(WindowId),
    DesktopIcon(AppId),
}

/// Desktop icon with its effective position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopIcon {
    pub app_id: AppId,
    pub label: String,
    pub icon_ref: String,
    pub position: IconPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveIconDrag {
    icon_id: String,
    offset: (i32, i32),
}

/// Result of starting an explorer navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationStep {
    /// A local listing was shown immediately.
    Shown,
    /// A remote listing must be fetched (after logging in when `login_with` is set).
    Remote {
        ticket: NavigationTicket,
        login_with: Option<CloudProvider>,
    },
}

#[derive(Debug)]
pub struct DesktopShell {
    config: DesktopConfig,
    window_manager: WindowManager,
    vfs: VirtualFileSystem,
    clipboard: ClipboardController,
    registry: AppRegistry,
    host: DesktopHostContext,
    icon_positions: BTreeMap<String, IconPosition>,
    icon_drag: Option<ActiveIconDrag>,
    start_menu_open: bool,
    drives: NetworkDrives,
    explorer: ExplorerView,
    properties: Option<PropertiesContext>,
    settings_section: Option<String>,
    contents: BTreeMap<WindowId, Box<dyn AppContent>>,
    events: EventBus<ShellEvent>,
}

impl Default for DesktopShell {
    fn default() -> Self {
        Self::new(
            DesktopConfig::default(),
            AppRegistry::builtin(),
            DesktopHostContext::default(),
        )
    }
}

impl DesktopShell {
    /// Creates a shell over the seeded demo filesystem.
    pub fn new(config: DesktopConfig, registry: AppRegistry, host: DesktopHostContext) -> Self {
        Self::with_vfs(config, registry, host, VirtualFileSystem::seeded())
    }

    pub fn with_vfs(
        config: DesktopConfig,
        registry: AppRegistry,
        host: DesktopHostContext,
        vfs: VirtualFileSystem,
    ) -> Self {
        Self {
            window_manager: WindowManager::new(&config),
            config,
            vfs,
            clipboard: ClipboardController::default(),
            registry,
            host,
            icon_positions: BTreeMap::new(),
            icon_drag: None,
            start_menu_open: false,
            drives: NetworkDrives::default(),
            explorer: ExplorerView::default(),
            properties: None,
            settings_section: None,
            contents: BTreeMap::new(),
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&ShellEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    pub fn window_manager(&self) -> &WindowManager {
        &self.window_manager
    }

    pub fn window_manager_mut(&mut self) -> &mut WindowManager {
        &mut self.window_manager
    }

    pub fn vfs(&self) -> &VirtualFileSystem {
        &self.vfs
    }

    pub fn vfs_mut(&mut self) -> &mut VirtualFileSystem {
        &mut self.vfs
    }

    pub fn clipboard(&self) -> &ClipboardController {
        &self.clipboard
    }

    pub fn registry(&self) -> &AppRegistry {
        &self.registry
    }

    pub fn host(&self) -> &DesktopHostContext {
        &self.host
    }

    pub fn explorer(&self) -> &ExplorerView {
        &self.explorer
    }

    pub fn drives(&self) -> &NetworkDrives {
        &self.drives
    }

    pub fn properties(&self) -> Option<&PropertiesContext> {
        self.properties.as_ref()
    }

    pub fn is_start_menu_open(&self) -> bool {
        self.start_menu_open
    }

    pub fn sidebar(&self) -> Vec<SidebarSection> {
        sidebar_sections(&self.drives)
    }

    // Launching

    /// Opens (or focuses) the app's window and closes the start menu.
    pub fn launch_app(&mut self, app_id: &AppId) -> Result<WindowId, ShellError> {
        let request = self
            .registry
            .descriptor(app_id)
            .ok_or_else(|| ShellError::UnknownApp(app_id.clone()))?
            .open_request();
        self.set_start_menu(false);
        Ok(self.window_manager.open(request))
    }

    /// Opens `file_path` in `app_id` when the association table allows it.
    pub fn launch_with_file(
        &mut self,
        app_id: &AppId,
        file_path: &str,
    ) -> Result<WindowId, ShellError> {
        let descriptor = self
            .registry
            .descriptor(app_id)
            .ok_or_else(|| ShellError::UnknownApp(app_id.clone()))?;
        if associated_app(file_path).as_ref() != Some(app_id) {
            warn!("{app_id} does not support opening {file_path}");
            return Err(ShellError::UnsupportedAssociation(virtual_file_name(
                file_path,
            )));
        }
        let file_path = normalize_virtual_path(file_path);
        let mut request = descriptor.open_request().with_file(file_path.clone());
        request.title = file_window_title(&file_path, &descriptor.display_name);
        self.set_start_menu(false);
        Ok(self.window_manager.open(request))
    }

    /// Opens a filesystem path: folders in the explorer, shortcuts through their target, and
    /// files through the association table.
    pub fn open_path(&mut self, full_path: &str) -> Result<WindowId, ShellError> {
        let mut path = normalize_virtual_path(full_path);
        for _ in 0..MAX_SHORTCUT_HOPS {
            if is_root_path(&path) {
                return self.open_folder(&path);
            }
            let entry = self.vfs.resolve(&path)?;
            match entry.kind {
                EntryKind::Folder => return self.open_folder(&path),
                EntryKind::Shortcut => match &entry.target_path {
                    Some(target) => path = normalize_virtual_path(target),
                    None => return Err(VfsError::NotFound(path).into()),
                },
                EntryKind::File => {
                    let app_id = associated_app(&entry.name)
                        .ok_or_else(|| ShellError::UnsupportedAssociation(entry.name.clone()))?;
                    return self.launch_with_file(&app_id, &path);
                }
            }
        }
        Err(VfsError::NotFound(path).into())
    }

    /// Remote folders only get the explorer window; their listing arrives through navigation.
    fn open_folder(&mut self, path: &str) -> Result<WindowId, ShellError> {
        let id = self.launch_app(&AppId::from(EXPLORER_APP_ID))?;
        if !self.is_remote_path(path) {
            self.show_local(path);
        }
        Ok(id)
    }

    /// Stores the properties context and opens the hidden properties app.
    pub fn open_properties(
        &mut self,
        path: &str,
        item_id: &EntryId,
    ) -> Result<WindowId, ShellError> {
        let item = self
            .vfs
            .entry(path, item_id)
            .ok_or_else(|| VfsError::NotFound(item_id.to_string()))?
            .without_children();
        self.properties = Some(PropertiesContext {
            item,
            path: normalize_virtual_path(path),
        });
        self.events.emit(&ShellEvent::PropertiesChanged);
        let id = self.launch_app(&AppId::from(PROPERTIES_APP_ID))?;
        self.remount_if_open(id);
        Ok(id)
    }

    /// Opens Settings at `section`.
    pub fn open_settings(&mut self, section: &str) -> Result<WindowId, ShellError> {
        self.settings_section = Some(section.to_string());
        let id = self.launch_app(&AppId::from(SETTINGS_APP_ID))?;
        self.remount_if_open(id);
        Ok(id)
    }

    /// Mounts the window's content through the registry and applies its requested title.
    pub fn mount_window_content(&mut self, id: WindowId) -> Option<&dyn AppContent> {
        let window_manager = &self.window_manager;
        self.contents
            .retain(|window_id, _| window_manager.window(*window_id).is_some());
        let window = self.window_manager.window(id)?;
        let content = self.registry.mount_content(&ContentContext {
            window,
            vfs: &self.vfs,
            properties: self.properties.as_ref(),
            settings_section: self.settings_section.as_deref(),
        });
        if let Some(title) = content.requested_title() {
            self.window_manager.set_title(id, title);
        }
        self.contents.insert(id, content);
        self.contents.get(&id).map(|content| content.as_ref())
    }

    pub fn window_content(&self, id: WindowId) -> Option<&dyn AppContent> {
        self.contents.get(&id).map(|content| content.as_ref())
    }

    fn remount_if_open(&mut self, id: WindowId) {
        if self.contents.contains_key(&id) {
            self.mount_window_content(id);
        }
    }

    /// Closes a window and drops its mounted content.
    pub fn close_window(&mut self, id: WindowId) {
        self.window_manager
            .set_state(id, WindowTransition::Closed, WindowChanges::default());
        self.contents.remove(&id);
    }

    // Desktop surface

    pub fn show_desktop(&mut self) {
        self.window_manager.show_desktop();
    }

    pub fn taskbar_click(&mut self, id: WindowId) {
        self.window_manager.taskbar_click(id);
    }

    pub fn toggle_start_menu(&mut self) {
        self.set_start_menu(!self.start_menu_open);
    }

    /// Clicking the bare desktop closes the start menu.
    pub fn desktop_click(&mut self) {
        self.set_start_menu(false);
    }

    fn set_start_menu(&mut self, open: bool) {
        if self.start_menu_open != open {
            self.start_menu_open = open;
            self.events.emit(&ShellEvent::StartMenuChanged(open));
        }
    }

    /// Desktop icons in manifest order with their effective positions.
    pub fn desktop_icons(&self) -> Vec<DesktopIcon> {
        self.registry
            .desktop_icon_apps()
            .into_iter()
            .filter_map(|descriptor| {
                Some(DesktopIcon {
                    position: self.icon_position(descriptor.app_id.as_str())?,
                    app_id: descriptor.app_id.clone(),
                    label: descriptor.display_name.clone(),
                    icon_ref: descriptor.icon_ref.clone(),
                })
            })
            .collect()
    }

    /// Layout override if the icon was moved, otherwise the manifest launch position.
    pub fn icon_position(&self, icon_id: &str) -> Option<IconPosition> {
        self.icon_positions.get(icon_id).copied().or_else(|| {
            self.registry
                .descriptor(&AppId::from(icon_id))
                .and_then(|descriptor| descriptor.launch_position)
        })
    }

    /// Starts dragging an icon, remembering where inside the icon the pointer grabbed it.
    pub fn begin_icon_drag(&mut self, icon_id: &str, pointer: PointerPosition) -> bool {
        let Some(origin) = self.icon_position(icon_id) else {
            return false;
        };
        self.icon_drag = Some(ActiveIconDrag {
            icon_id: icon_id.to_string(),
            offset: pointer.delta_from(PointerPosition::new(origin.x, origin.y)),
        });
        true
    }

    /// Drops the dragged icon at `pointer`, snapped to the icon grid.
    pub fn drop_icon(&mut self, pointer: PointerPosition) -> Option<IconPosition> {
        let drag = self.icon_drag.take()?;
        let position = IconPosition::new(pointer.x - drag.offset.0, pointer.y - drag.offset.1)
            .snapped(self.config.icons.grid_size);
        self.icon_positions.insert(drag.icon_id.clone(), position);
        self.events.emit(&ShellEvent::IconMoved {
            icon_id: drag.icon_id,
            position,
        });
        Some(position)
    }

    pub fn cancel_icon_drag(&mut self) {
        self.icon_drag = None;
    }

    /// Handles a payload dropped on a taskbar button or desktop icon.
    ///
    /// Payloads of other types are ignored and yield `Ok(None)`.
    pub fn drop_payload(
        &mut self,
        target: &DropTarget,
        payload: &DragPayload,
    ) -> Result<Option<WindowId>, ShellError> {
        let Some(file_path) = payload.as_file_path() else {
            return Ok(None);
        };
        let app_id = match target {
            DropTarget::TaskbarButton(window_id) => match self.window_manager.window(*window_id) {
                Some(window) => window.app_id.clone(),
                None => return Ok(None),
            },
            DropTarget::DesktopIcon(app_id) => app_id.clone(),
        };
        self.launch_with_file(&app_id, file_path).map(Some)
    }

    // Explorer

    /// Shows a local directory in the explorer, superseding any pending remote navigation.
    pub fn show_local(&mut self, path: &str) {
        let path = normalize_virtual_path(path);
        let entries = self.vfs.list(&path).to_vec();
        self.explorer.show(&path, entries);
        self.events.emit(&ShellEvent::ExplorerChanged(path));
    }

    /// Re-reads the explorer's directory after a filesystem change. Remote views are left alone.
    pub fn refresh_explorer(&mut self) {
        if self.explorer.is_loading() || self.is_remote_path(self.explorer.current_path()) {
            return;
        }
        let path = self.explorer.current_path().to_string();
        self.show_local(&path);
        if let Some(term) = self.explorer.search().map(|search| search.term.clone()) {
            self.search_explorer(&term);
        }
    }

    /// Searches the explorer's directory and everything below it. A blank term clears the
    /// results.
    pub fn search_explorer(&mut self, term: &str) -> &[SearchResult] {
        let root = self.explorer.current_path().to_string();
        let results = self.vfs.search(&root, term);
        self.explorer.set_search(term, results);
        self.events.emit(&ShellEvent::ExplorerChanged(root));
        self.explorer
            .search()
            .map(|search| search.results.as_slice())
            .unwrap_or_default()
    }

    /// Opens the search hit at `index` the way a double-click on it would.
    pub fn open_search_result(&mut self, index: usize) -> Result<WindowId, ShellError> {
        let full_path = self
            .explorer
            .search()
            .and_then(|search| search.results.get(index))
            .map(SearchResult::full_path)
            .ok_or_else(|| VfsError::NotFound(format!("search result {index}")))?;
        self.open_path(&full_path)
    }

    fn is_remote_path(&self, path: &str) -> bool {
        CloudProvider::from_path(path).is_some() || self.host.content_provider().is_remote(path)
    }

    /// Starts navigating the explorer to `path`.
    ///
    /// Local paths are shown immediately. Cloud paths whose provider has no configured client
    /// open Settings at [`CLOUD_SETTINGS_SECTION`] and fail with
    /// [`ShellError::CloudNotConfigured`]. Other remote paths switch to an empty loading view and
    /// return the ticket to fetch with.
    pub fn begin_navigation(&mut self, path: &str) -> Result<NavigationStep, ShellError> {
        let path = normalize_virtual_path(path);
        let cloud = CloudProvider::from_path(&path);
        if let Some(provider) = cloud {
            if !self.host.auth_provider().is_configured(provider) {
                self.open_settings(CLOUD_SETTINGS_SECTION)?;
                return Err(ShellError::CloudNotConfigured(provider));
            }
        }
        if !self.is_remote_path(&path) {
            self.show_local(&path);
            return Ok(NavigationStep::Shown);
        }

        let auth = self.host.auth_provider();
        let login_with = cloud.filter(|provider| !auth.is_connected(*provider));
        let ticket = self.explorer.begin_remote(&path);
        self.events.emit(&ShellEvent::ExplorerChanged(path));
        Ok(NavigationStep::Remote { ticket, login_with })
    }

    /// Applies a finished remote fetch. Returns `Ok(false)` when the result was stale.
    pub fn finish_navigation(&mut self, fetch: RemoteFetch) -> Result<bool, ShellError> {
        if !self.explorer.is_current(fetch.ticket()) {
            log!("ignoring stale result for {}", fetch.ticket().path);
            return Ok(false);
        }
        match fetch {
            RemoteFetch::Listed { ticket, entries } => {
                let listing = self.vfs.ingest_listing(&ticket.path, &entries).to_vec();
                let applied = self.explorer.complete(&ticket, listing);
                self.events.emit(&ShellEvent::ExplorerChanged(ticket.path));
                Ok(applied)
            }
            RemoteFetch::LoginFailed {
                provider, reason, ..
            } => {
                warn!("login failed for {}: {reason}", provider.display_name());
                self.show_local(HOME_PATH);
                Err(ShellError::Provider(reason))
            }
            RemoteFetch::ListingFailed { ticket, reason } => {
                self.explorer.fail(&ticket);
                let restored = self.explorer.current_path().to_string();
                self.events.emit(&ShellEvent::ExplorerChanged(restored));
                Err(ShellError::Provider(reason))
            }
        }
    }

    /// Navigates the explorer to `path`, awaiting login and listing for remote paths.
    pub async fn navigate(&mut self, path: &str) -> Result<(), ShellError> {
        match self.begin_navigation(path)? {
            NavigationStep::Shown => Ok(()),
            NavigationStep::Remote { ticket, login_with } => {
                let content = self.host.content_provider();
                let auth = self.host.auth_provider();
                let fetch = fetch_remote_listing(&*content, &*auth, ticket, login_with).await;
                self.finish_navigation(fetch).map(|_| ())
            }
        }
    }

    // Clipboard and filesystem commands

    pub fn cut(&mut self, path: &str, item_id: &EntryId) -> Result<(), ShellError> {
        let item = self.clipboard_item(path, item_id)?;
        self.clipboard.cut(item, path);
        Ok(())
    }

    pub fn copy(&mut self, path: &str, item_id: &EntryId) -> Result<(), ShellError> {
        let item = self.clipboard_item(path, item_id)?;
        self.clipboard.copy(item, path);
        Ok(())
    }

    fn clipboard_item(
        &self,
        path: &str,
        item_id: &EntryId,
    ) -> Result<crate::vfs::FileSystemEntry, ShellError> {
        self.vfs
            .entry(path, item_id)
            .cloned()
            .ok_or_else(|| VfsError::NotFound(item_id.to_string()).into())
    }

    pub fn paste(&mut self, dest_path: &str) -> Result<(), ShellError> {
        self.vfs.paste(&mut self.clipboard, dest_path)?;
        self.refresh_explorer();
        Ok(())
    }

    /// Creates "New Folder" (or "New Folder (n)") in `parent_path`.
    pub fn create_folder(&mut self, parent_path: &str) -> Result<EntryId, ShellError> {
        let name = self.vfs.unique_name(parent_path, "New Folder");
        let entry = self.vfs.create(parent_path, EntryKind::Folder, &name)?;
        self.refresh_explorer();
        Ok(entry.id)
    }

    // Network drives

    pub fn mount_drive(&mut self, name: &str, path: &str) -> Result<NetworkDrive, ShellError> {
        let drive = self.drives.mount(name, path)?.clone();
        self.events.emit(&ShellEvent::DrivesChanged);
        Ok(drive)
    }

    pub fn unmount_drive(&mut self, name: &str) -> bool {
        let removed = self.drives.unmount(name);
        if removed {
            self.events.emit(&ShellEvent::DrivesChanged);
        }
        removed
    }

    pub fn replace_drives(&mut self, drives: NetworkDrives) {
        self.drives = drives;
        self.events.emit(&ShellEvent::DrivesChanged);
    }

    // Layout persistence

    /// Captures icon overrides and open windows (back to front).
    pub fn layout_snapshot(&self) -> DesktopLayoutSnapshot {
        let mut windows: Vec<_> = self.window_manager.windows().iter().collect();
        windows.sort_by_key(|window| window.z_index);
        DesktopLayoutSnapshot {
            schema_version: DESKTOP_LAYOUT_SCHEMA_VERSION,
            icon_positions: self.icon_positions.clone(),
            windows: windows
                .into_iter()
                .map(|window| WindowLayout {
                    app_id: window.app_id.clone(),
                    state: window.state,
                    prev_state_before_minimize: window.prev_state_before_minimize,
                    position: window.position,
                    size: window.size,
                })
                .collect(),
        }
    }

    /// Restores icon overrides and reopens saved windows. Unknown apps are skipped.
    pub fn restore_layout(&mut self, snapshot: DesktopLayoutSnapshot) {
        self.icon_positions = snapshot.icon_positions;
        for layout in snapshot.windows {
            let id = match self.launch_app(&layout.app_id) {
                Ok(id) => id,
                Err(err) => {
                    warn!("skipping saved window: {err}");
                    continue;
                }
            };
            self.window_manager
                .update_geometry(id, Some(layout.position), Some(layout.size));
            match layout.state {
                WindowState::Normal => {}
                WindowState::Maximized => self.window_manager.set_state(
                    id,
                    WindowTransition::Maximized,
                    WindowChanges::default(),
                ),
                WindowState::Minimized => {
                    if layout.prev_state_before_minimize == Some(WindowState::Maximized) {
                        self.window_manager.set_state(
                            id,
                            WindowTransition::Maximized,
                            WindowChanges::default(),
                        );
                    }
                    self.window_manager.set_state(
                        id,
                        WindowTransition::Minimized,
                        WindowChanges::default(),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use futures::executor::block_on;
    use platform_host::{
        AuthStatusProvider, ContentEntry, MemoryAuthStatusProvider, MemoryContentProvider,
        MemoryPrefsStore,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn cloud_shell() -> (DesktopShell, MemoryContentProvider, MemoryAuthStatusProvider) {
        let content = MemoryContentProvider::with_remote_schemes(["gdrive", "dropbox", "onedrive"]);
        let auth = MemoryAuthStatusProvider::default();
        let host = DesktopHostContext::new(
            Rc::new(content.clone()),
            Rc::new(auth.clone()),
            Rc::new(MemoryPrefsStore::default()),
        );
        let shell = DesktopShell::new(DesktopConfig::default(), AppRegistry::builtin(), host);
        (shell, content, auth)
    }

    #[test]
    fn launching_twice_focuses_existing_window() {
        let mut shell = DesktopShell::default();
        let notepad = AppId::from("notepad");

        let first = shell.launch_app(&notepad).expect("launch");
        shell.launch_app(&AppId::from("terminal")).expect("launch");
        let second = shell.launch_app(&notepad).expect("relaunch");

        assert_eq!(first, second);
        assert_eq!(shell.window_manager().windows().len(), 2);
        assert_eq!(shell.window_manager().focused_window_id(), Some(first));
    }

    #[test]
    fn unknown_apps_are_reported() {
        let mut shell = DesktopShell::default();
        assert_eq!(
            shell.launch_app(&AppId::from("paint")),
            Err(ShellError::UnknownApp(AppId::from("paint")))
        );
    }

    #[test]
    fn text_file_opens_in_notepad_with_file_title() {
        let mut shell = DesktopShell::default();
        let id = shell.open_path("C:/Documents/readme.txt").expect("open");

        let window = shell.window_manager().window(id).expect("window");
        assert_eq!(window.app_id, AppId::from("notepad"));
        assert_eq!(window.title, "readme.txt - Notepad");
        assert_eq!(
            window.launch_data.as_ref().map(|data| data.file_path.as_str()),
            Some("C:/Documents/readme.txt")
        );
    }

    #[test]
    fn unsupported_files_are_not_opened() {
        let mut shell = DesktopShell::default();

        assert_eq!(
            shell.open_path("C:/Documents/report.docx"),
            Err(ShellError::UnsupportedAssociation("report.docx".to_string()))
        );
        assert_eq!(
            shell.launch_with_file(&AppId::from("calculator"), "C:/Documents/readme.txt"),
            Err(ShellError::UnsupportedAssociation("readme.txt".to_string()))
        );
        assert!(shell.window_manager().windows().is_empty());
    }

    #[test]
    fn shortcuts_open_their_target() {
        let mut shell = DesktopShell::default();
        shell
            .vfs_mut()
            .create_shortcut("C:/Desktop", "C:/Documents")
            .expect("shortcut");

        let id = shell
            .open_path("C:/Desktop/Documents - Shortcut")
            .expect("open");
        assert_eq!(
            shell.window_manager().window(id).map(|w| w.app_id.as_str()),
            Some("explorer")
        );
        assert_eq!(shell.explorer().current_path(), "C:/Documents");
        assert_eq!(shell.explorer().entries().len(), 3);
    }

    #[test]
    fn file_drop_on_taskbar_button_launches_associated_app() {
        let mut shell = DesktopShell::default();
        let notepad = shell.launch_app(&AppId::from("notepad")).expect("launch");
        let payload = DragPayload::file_path("C:/Documents/readme.txt");

        let opened = shell
            .drop_payload(&DropTarget::TaskbarButton(notepad), &payload)
            .expect("drop");
        assert_eq!(opened, Some(notepad));

        let other = DragPayload {
            mime: "text/plain".to_string(),
            data: "hello".to_string(),
        };
        assert_eq!(
            shell.drop_payload(&DropTarget::DesktopIcon(AppId::from("notepad")), &other),
            Ok(None)
        );
    }

    #[test]
    fn icon_drop_snaps_to_grid() {
        let mut shell = DesktopShell::default();
        assert_eq!(shell.icon_position("notepad"), Some(IconPosition::new(20, 220)));

        assert!(shell.begin_icon_drag("notepad", PointerPosition::new(30, 230)));
        let dropped = shell.drop_icon(PointerPosition::new(184, 306));

        assert_eq!(dropped, Some(IconPosition::new(170, 300)));
        assert_eq!(shell.icon_position("notepad"), Some(IconPosition::new(170, 300)));
        assert_eq!(shell.drop_icon(PointerPosition::new(0, 0)), None);
    }

    #[test]
    fn start_menu_closes_on_desktop_click_and_launch() {
        let mut shell = DesktopShell::default();
        shell.toggle_start_menu();
        assert!(shell.is_start_menu_open());
        shell.desktop_click();
        assert!(!shell.is_start_menu_open());

        shell.toggle_start_menu();
        shell.launch_app(&AppId::from("browser")).expect("launch");
        assert!(!shell.is_start_menu_open());
    }

    #[test]
    fn properties_window_shows_selected_item() {
        let mut shell = DesktopShell::default();
        let report = shell
            .vfs()
            .resolve("C:/Documents/report.docx")
            .expect("seeded")
            .id
            .clone();

        let id = shell
            .open_properties("C:/Documents", &report)
            .expect("properties");
        let content = shell.mount_window_content(id).expect("mounted");
        let properties = content
            .as_any()
            .downcast_ref::<crate::apps::PropertiesContent>()
            .expect("properties content");
        assert_eq!(properties.rows()[0].1, "DOCX File");
        assert_eq!(
            shell.properties().map(PropertiesContext::full_path),
            Some("C:/Documents/report.docx".to_string())
        );
    }

    #[test]
    fn mounting_notepad_applies_requested_title() {
        let mut shell = DesktopShell::default();
        let id = shell
            .launch_with_file(&AppId::from("notepad"), "C:/Documents/readme.txt")
            .expect("launch");
        shell.window_manager_mut().set_title(id, "Notepad");

        shell.mount_window_content(id).expect("mounted");
        assert_eq!(
            shell.window_manager().window(id).map(|w| w.title.as_str()),
            Some("readme.txt - Notepad")
        );

        shell.close_window(id);
        assert!(shell.window_content(id).is_none());
    }

    #[test]
    fn unconfigured_cloud_opens_settings() {
        let (mut shell, _, _) = cloud_shell();

        assert_eq!(
            shell.begin_navigation("gdrive:/"),
            Err(ShellError::CloudNotConfigured(CloudProvider::GoogleDrive))
        );
        let settings = shell
            .window_manager()
            .window_for_app(&AppId::from("settings"))
            .map(|w| w.id)
            .expect("settings window");
        let content = shell.mount_window_content(settings).expect("mounted");
        let section = &content
            .as_any()
            .downcast_ref::<crate::apps::SettingsContent>()
            .expect("settings content")
            .active_section;
        assert_eq!(section, CLOUD_SETTINGS_SECTION);
        assert_eq!(shell.explorer().current_path(), HOME_PATH);
    }

    #[test]
    fn remote_navigation_logs_in_and_ingests_listing() {
        let (mut shell, content, auth) = cloud_shell();
        auth.configure(CloudProvider::Dropbox);
        content.insert_listing(
            "dropbox:/",
            vec![ContentEntry::folder("Photos"), ContentEntry::file("a.txt", 2048)],
        );

        block_on(shell.navigate("dropbox:/")).expect("navigate");

        assert!(auth.is_connected(CloudProvider::Dropbox));
        let names: Vec<_> = shell
            .explorer()
            .entries()
            .iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(names, vec!["Photos", "a.txt"]);
        assert_eq!(shell.explorer().entries()[1].size_label.as_deref(), Some("2 KB"));
        assert_eq!(shell.vfs().listing("dropbox:/").len(), 2);
    }

    #[test]
    fn failed_login_returns_home() {
        let (mut shell, _, auth) = cloud_shell();
        auth.configure(CloudProvider::OneDrive);
        auth.deny_login(CloudProvider::OneDrive, "cancelled");
        shell.show_local("C:/Pictures");

        let result = block_on(shell.navigate("onedrive:/"));
        assert_eq!(result, Err(ShellError::Provider("cancelled".to_string())));
        assert_eq!(shell.explorer().current_path(), HOME_PATH);
    }

    #[test]
    fn stale_remote_result_is_discarded() {
        let (mut shell, content, auth) = cloud_shell();
        auth.connect(CloudProvider::GoogleDrive);
        content.insert_listing("gdrive:/", vec![ContentEntry::folder("Stale")]);

        let NavigationStep::Remote { ticket, login_with } =
            shell.begin_navigation("gdrive:/").expect("remote")
        else {
            panic!("expected remote navigation");
        };
        assert_eq!(login_with, None);
        shell.begin_navigation("C:/Documents").expect("local");

        let fetch = block_on(fetch_remote_listing(&content, &auth, ticket, login_with));
        assert_eq!(shell.finish_navigation(fetch), Ok(false));
        assert_eq!(shell.explorer().current_path(), "C:/Documents");
        assert!(shell.vfs().listing("gdrive:/").is_empty());
    }

    #[test]
    fn listing_failure_restores_previous_view() {
        let (mut shell, _, auth) = cloud_shell();
        auth.connect(CloudProvider::GoogleDrive);
        shell.show_local("C:/Downloads");

        let result = block_on(shell.navigate("gdrive:/missing"));
        assert!(matches!(result, Err(ShellError::Provider(_))));
        assert_eq!(shell.explorer().current_path(), "C:/Downloads");
        assert_eq!(shell.explorer().entries()[0].name, "installer.exe");
    }

    #[test]
    fn create_folder_refreshes_explorer() {
        let mut shell = DesktopShell::default();
        shell.show_local("C:/");

        shell.create_folder("C:/").expect("create");
        shell.create_folder("C:/").expect("create");

        let names: Vec<_> = shell
            .explorer()
            .entries()
            .iter()
            .map(|entry| entry.name.clone())
            .collect();
        assert!(names.ends_with(&["New Folder".to_string(), "New Folder (2)".to_string()]));
    }

    #[test]
    fn drives_appear_in_sidebar_until_unmounted() {
        let mut shell = DesktopShell::default();
        shell.mount_drive("Team", "E:/Backup-2024").expect("mount");
        assert_eq!(
            shell.mount_drive("TEAM", "C:/"),
            Err(ShellError::Drive(DriveError::NameConflict("TEAM".to_string())))
        );
        assert_eq!(shell.sidebar().len(), 4);

        assert!(shell.unmount_drive("Team"));
        assert_eq!(shell.sidebar().len(), 3);
    }

    #[test]
    fn layout_snapshot_restores_windows_and_icons() {
        let mut shell = DesktopShell::default();
        let explorer = shell.launch_app(&AppId::from("explorer")).expect("launch");
        let terminal = shell.launch_app(&AppId::from("terminal")).expect("launch");
        shell.window_manager_mut().set_state(
            explorer,
            WindowTransition::Minimized,
            WindowChanges::default(),
        );
        shell.begin_icon_drag("terminal", PointerPosition::new(130, 20));
        shell.drop_icon(PointerPosition::new(402, 98));
        let snapshot = shell.layout_snapshot();

        let mut restored = DesktopShell::default();
        restored.restore_layout(snapshot.clone());

        assert_eq!(restored.layout_snapshot(), snapshot);
        let explorer_layout = snapshot
            .windows
            .iter()
            .find(|layout| layout.app_id.as_str() == "explorer")
            .expect("explorer saved");
        assert_eq!(explorer_layout.prev_state_before_minimize, Some(WindowState::Normal));
        let focused = restored.window_manager().focused_window_id();
        assert_eq!(
            focused.and_then(|id| restored.window_manager().window(id)).map(|w| w.app_id.as_str()),
            shell.window_manager().window(terminal).map(|w| w.app_id.as_str())
        );
    }

    #[test]
    fn explorer_search_covers_current_directory_only() {
        let mut shell = DesktopShell::default();
        shell.show_local("C:/Documents");

        let found: Vec<String> = shell
            .search_explorer("RE")
            .iter()
            .map(SearchResult::full_path)
            .collect();

        assert_eq!(
            found,
            vec![
                "C:/Documents/report.docx",
                "C:/Documents/presentation.pptx",
                "C:/Documents/readme.txt",
            ]
        );
        assert_eq!(
            shell.explorer().search().map(|search| search.summary()),
            Some("Found 3 item(s) matching \"RE\" in C:/Documents and subdirectories".to_string())
        );
        shell.search_explorer("  ");
        assert!(shell.explorer().search().is_none());
    }

    #[test]
    fn opening_search_results_navigates_or_launches() {
        let mut shell = DesktopShell::default();
        shell.show_local("C:/");
        shell.search_explorer("readme");

        let notepad = shell.open_search_result(0).expect("open file");
        assert_eq!(
            shell.window_manager().window(notepad).map(|w| w.app_id.as_str()),
            Some("notepad")
        );

        shell.search_explorer("pict");
        shell.open_search_result(0).expect("open folder");
        assert_eq!(shell.explorer().current_path(), "C:/Pictures");
        assert!(shell.explorer().search().is_none());
        assert!(matches!(
            shell.open_search_result(0),
            Err(ShellError::Vfs(VfsError::NotFound(_)))
        ));
    }

    #[test]
    fn window_minimized_from_maximized_comes_back_maximized() {
        let mut shell = DesktopShell::default();
        let id = shell.launch_app(&AppId::from("browser")).expect("launch");
        shell
            .window_manager_mut()
            .set_state(id, WindowTransition::Maximized, WindowChanges::default());
        shell
            .window_manager_mut()
            .set_state(id, WindowTransition::Minimized, WindowChanges::default());
        let snapshot = shell.layout_snapshot();
        assert_eq!(
            snapshot.windows[0].prev_state_before_minimize,
            Some(WindowState::Maximized)
        );

        let mut restored = DesktopShell::default();
        restored.restore_layout(snapshot.clone());
        assert_eq!(restored.layout_snapshot(), snapshot);

        let window = restored.window_manager().windows()[0].id;
        restored.taskbar_click(window);
        assert_eq!(
            restored.window_manager().window(window).map(|w| w.state),
            Some(WindowState::Maximized)
        );
    }
}
