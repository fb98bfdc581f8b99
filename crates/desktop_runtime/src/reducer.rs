//! Reducer actions, side-effect intents, and transition logic for the desktop shell.

use leptos::logging::warn;
use platform_host::CloudProvider;

use crate::explorer::NavigationTicket;
use crate::model::{
    AppId, DesktopBounds, DesktopLayoutSnapshot, PointerPosition, ResizeEdge, WindowChanges,
    WindowId, WindowTransition,
};
use crate::shell::{DesktopShell, DragPayload, DropTarget, NavigationStep, ShellError};
use crate::vfs::{EntryId, EntryKind};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_desktop`].
pub enum DesktopAction {
    /// Open (or focus) an app by id.
    LaunchApp { app_id: AppId },
    /// Open an app on a file, subject to file associations.
    LaunchWithFile { app_id: AppId, file_path: String },
    /// Open a folder, shortcut, or file by full path.
    OpenPath { path: String },
    CloseWindow { window_id: WindowId },
    FocusWindow { window_id: WindowId },
    MinimizeWindow { window_id: WindowId },
    MaximizeWindow { window_id: WindowId },
    RestoreWindow { window_id: WindowId },
    /// Taskbar button click: restore, minimize, or focus.
    TaskbarClick { window_id: WindowId },
    BeginMove {
        window_id: WindowId,
        pointer: PointerPosition,
    },
    BeginResize {
        window_id: WindowId,
        edge: ResizeEdge,
        pointer: PointerPosition,
    },
    /// Pointer moved during the active move or resize.
    UpdateGesture { pointer: PointerPosition },
    EndGesture,
    /// Desktop area changed size.
    SetBounds { bounds: DesktopBounds },
    ShowDesktop,
    ToggleStartMenu,
    /// Click on the bare desktop background.
    DesktopClick,
    BeginIconDrag {
        icon_id: String,
        pointer: PointerPosition,
    },
    DropIcon { pointer: PointerPosition },
    DropPayload {
        target: DropTarget,
        payload: DragPayload,
    },
    /// Navigate the explorer; remote paths emit [`RuntimeEffect::FetchRemoteListing`].
    Navigate { path: String },
    /// Search the explorer's directory and its subdirectories.
    SearchExplorer { term: String },
    /// Open one of the current search results.
    OpenSearchResult { index: usize },
    /// Create "New Folder" with the next free suffix.
    CreateFolder { parent_path: String },
    CreateEntry {
        parent_path: String,
        kind: EntryKind,
        name: String,
    },
    CreateShortcut {
        parent_path: String,
        target_path: String,
    },
    Rename {
        path: String,
        item_id: EntryId,
        new_name: String,
    },
    MoveEntry {
        item_id: EntryId,
        source_path: String,
        dest_path: String,
    },
    Delete { path: String, item_id: EntryId },
    Cut { path: String, item_id: EntryId },
    Copy { path: String, item_id: EntryId },
    Paste { dest_path: String },
    Undo,
    Redo,
    OpenProperties { path: String, item_id: EntryId },
    OpenSettings { section: String },
    MountDrive { name: String, path: String },
    UnmountDrive { name: String },
    /// Hydrate icons and windows from a persisted layout.
    RestoreLayout { snapshot: DesktopLayoutSnapshot },
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by [`reduce_desktop`] for the host to execute.
pub enum RuntimeEffect {
    /// Persist the current desktop layout snapshot.
    PersistLayout,
    /// Persist the mounted network drives.
    PersistNetworkDrives,
    /// Log in (when `login_with` is set), list the ticket's path, and finish the navigation.
    FetchRemoteListing {
        ticket: NavigationTicket,
        login_with: Option<CloudProvider>,
    },
    /// User-facing message for a rejected action.
    Notice(String),
}

/// Applies a [`DesktopAction`] to the shell and collects resulting side effects.
///
/// # Errors
///
/// Returns the [`ShellError`] of the first failing step. Failed actions leave the shell unchanged,
/// except that a cloud path without a configured client still opens Settings.
pub fn reduce_desktop(
    shell: &mut DesktopShell,
    action: DesktopAction,
) -> Result<Vec<RuntimeEffect>, ShellError> {
    let mut effects = Vec::new();
    match action {
        DesktopAction::LaunchApp { app_id } => {
            shell.launch_app(&app_id)?;
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::LaunchWithFile { app_id, file_path } => {
            shell.launch_with_file(&app_id, &file_path)?;
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::OpenPath { path } => {
            shell.open_path(&path)?;
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::CloseWindow { window_id } => {
            shell.close_window(window_id);
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::FocusWindow { window_id } => {
            shell.window_manager_mut().focus(window_id);
        }
        DesktopAction::MinimizeWindow { window_id } => {
            transition(shell, window_id, WindowTransition::Minimized);
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::MaximizeWindow { window_id } => {
            transition(shell, window_id, WindowTransition::Maximized);
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::RestoreWindow { window_id } => {
            transition(shell, window_id, WindowTransition::Normal);
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::TaskbarClick { window_id } => {
            shell.taskbar_click(window_id);
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::BeginMove { window_id, pointer } => {
            shell.window_manager_mut().begin_drag(window_id, pointer);
        }
        DesktopAction::BeginResize {
            window_id,
            edge,
            pointer,
        } => {
            shell
                .window_manager_mut()
                .begin_resize(window_id, edge, pointer);
        }
        DesktopAction::UpdateGesture { pointer } => {
            shell.window_manager_mut().update_gesture(pointer);
        }
        DesktopAction::EndGesture => {
            if shell.window_manager_mut().end_gesture().is_some() {
                effects.push(RuntimeEffect::PersistLayout);
            }
        }
        DesktopAction::SetBounds { bounds } => {
            shell.window_manager_mut().set_bounds(bounds);
        }
        DesktopAction::ShowDesktop => {
            shell.show_desktop();
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::ToggleStartMenu => shell.toggle_start_menu(),
        DesktopAction::DesktopClick => shell.desktop_click(),
        DesktopAction::BeginIconDrag { icon_id, pointer } => {
            shell.begin_icon_drag(&icon_id, pointer);
        }
        DesktopAction::DropIcon { pointer } => {
            if shell.drop_icon(pointer).is_some() {
                effects.push(RuntimeEffect::PersistLayout);
            }
        }
        DesktopAction::DropPayload { target, payload } => {
            if shell.drop_payload(&target, &payload)?.is_some() {
                effects.push(RuntimeEffect::PersistLayout);
            }
        }
        DesktopAction::Navigate { path } => {
            if let NavigationStep::Remote { ticket, login_with } = shell.begin_navigation(&path)? {
                effects.push(RuntimeEffect::FetchRemoteListing { ticket, login_with });
            }
        }
        DesktopAction::SearchExplorer { term } => {
            shell.search_explorer(&term);
        }
        DesktopAction::OpenSearchResult { index } => {
            shell.open_search_result(index)?;
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::CreateFolder { parent_path } => {
            shell.create_folder(&parent_path)?;
        }
        DesktopAction::CreateEntry {
            parent_path,
            kind,
            name,
        } => {
            shell.vfs_mut().create(&parent_path, kind, &name)?;
            shell.refresh_explorer();
        }
        DesktopAction::CreateShortcut {
            parent_path,
            target_path,
        } => {
            shell.vfs_mut().create_shortcut(&parent_path, &target_path)?;
            shell.refresh_explorer();
        }
        DesktopAction::Rename {
            path,
            item_id,
            new_name,
        } => {
            shell.vfs_mut().rename(&path, &item_id, &new_name)?;
            shell.refresh_explorer();
        }
        DesktopAction::MoveEntry {
            item_id,
            source_path,
            dest_path,
        } => {
            shell
                .vfs_mut()
                .move_entry(&item_id, &source_path, &dest_path)?;
            shell.refresh_explorer();
        }
        DesktopAction::Delete { path, item_id } => {
            shell.vfs_mut().remove(&path, &item_id)?;
            shell.refresh_explorer();
        }
        DesktopAction::Cut { path, item_id } => shell.cut(&path, &item_id)?,
        DesktopAction::Copy { path, item_id } => shell.copy(&path, &item_id)?,
        DesktopAction::Paste { dest_path } => shell.paste(&dest_path)?,
        DesktopAction::Undo => {
            if shell.vfs_mut().undo()? {
                shell.refresh_explorer();
            }
        }
        DesktopAction::Redo => {
            if shell.vfs_mut().redo()? {
                shell.refresh_explorer();
            }
        }
        DesktopAction::OpenProperties { path, item_id } => {
            shell.open_properties(&path, &item_id)?;
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::OpenSettings { section } => {
            shell.open_settings(&section)?;
            effects.push(RuntimeEffect::PersistLayout);
        }
        DesktopAction::MountDrive { name, path } => {
            shell.mount_drive(&name, &path)?;
            effects.push(RuntimeEffect::PersistNetworkDrives);
        }
        DesktopAction::UnmountDrive { name } => {
            if shell.unmount_drive(&name) {
                effects.push(RuntimeEffect::PersistNetworkDrives);
            }
        }
        DesktopAction::RestoreLayout { snapshot } => {
            shell.restore_layout(snapshot);
        }
    }
    Ok(effects)
}

fn transition(shell: &mut DesktopShell, window_id: WindowId, transition: WindowTransition) {
    shell
        .window_manager_mut()
        .set_state(window_id, transition, WindowChanges::default());
}

impl DesktopShell {
    /// Reduces `action`, turning a rejection into a [`RuntimeEffect::Notice`].
    pub fn dispatch(&mut self, action: DesktopAction) -> Vec<RuntimeEffect> {
        match reduce_desktop(self, action) {
            Ok(effects) => effects,
            Err(err) => {
                warn!("desktop action rejected: {err}");
                vec![RuntimeEffect::Notice(err.to_string())]
            }
        }
    }
}
