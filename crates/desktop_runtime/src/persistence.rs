//! Desktop persistence adapters for layout and network-drive preferences.
//!
//! Persistence is best effort: load failures are logged and treated as "nothing saved".

use leptos::logging::warn;
use platform_host::{
    load_pref_with, save_pref_with, PrefsError, PrefsStore, DESKTOP_LAYOUT_PREFS_KEY,
    NETWORK_DRIVES_PREFS_KEY,
};

use crate::drives::{NetworkDrive, NetworkDrives};
use crate::model::{DesktopLayoutSnapshot, DESKTOP_LAYOUT_SCHEMA_VERSION};
use crate::shell::DesktopShell;

/// Loads the saved desktop layout, ignoring snapshots from other schema versions.
pub async fn load_layout_snapshot(prefs: &dyn PrefsStore) -> Option<DesktopLayoutSnapshot> {
    match load_pref_with::<_, DesktopLayoutSnapshot>(prefs, DESKTOP_LAYOUT_PREFS_KEY).await {
        Ok(Some(snapshot)) if snapshot.schema_version == DESKTOP_LAYOUT_SCHEMA_VERSION => {
            Some(snapshot)
        }
        Ok(Some(snapshot)) => {
            warn!(
                "desktop layout schema {} unsupported (expected {DESKTOP_LAYOUT_SCHEMA_VERSION})",
                snapshot.schema_version
            );
            None
        }
        Ok(None) => None,
        Err(err) => {
            warn!("desktop layout load failed: {err}");
            None
        }
    }
}

/// Persists the desktop layout snapshot.
pub async fn persist_layout_snapshot(
    prefs: &dyn PrefsStore,
    snapshot: &DesktopLayoutSnapshot,
) -> Result<(), PrefsError> {
    save_pref_with(prefs, DESKTOP_LAYOUT_PREFS_KEY, snapshot).await
}

/// Loads mounted network drives; unreadable or invalid entries are dropped.
pub async fn load_network_drives(prefs: &dyn PrefsStore) -> NetworkDrives {
    match load_pref_with::<_, Vec<NetworkDrive>>(prefs, NETWORK_DRIVES_PREFS_KEY).await {
        Ok(saved) => NetworkDrives::from_saved(saved.unwrap_or_default()),
        Err(err) => {
            warn!("network drives load failed: {err}");
            NetworkDrives::default()
        }
    }
}

/// Persists the mounted network drives.
pub async fn persist_network_drives(
    prefs: &dyn PrefsStore,
    drives: &NetworkDrives,
) -> Result<(), PrefsError> {
    save_pref_with(prefs, NETWORK_DRIVES_PREFS_KEY, &drives.drives()).await
}

/// Restores the saved layout and network drives into a freshly booted shell.
pub async fn hydrate_shell(shell: &mut DesktopShell) {
    let prefs = shell.host().prefs_store();
    if let Some(snapshot) = load_layout_snapshot(prefs.as_ref()).await {
        shell.restore_layout(snapshot);
    }
    let drives = load_network_drives(prefs.as_ref()).await;
    if !drives.is_empty() {
        shell.replace_drives(drives);
    }
}
