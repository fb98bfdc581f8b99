//! User-mounted network locations listed in the explorer sidebar.

use platform_host::normalize_virtual_path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriveError {
    #[error("a drive named `{0}` already exists")]
    NameConflict(String),
    #[error("invalid drive path `{0}`: expected a drive-rooted path such as `C:/`")]
    InvalidPath(String),
    #[error("drive name cannot be empty")]
    EmptyName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDrive {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkDrives {
    drives: Vec<NetworkDrive>,
}

impl NetworkDrives {
    /// Rebuilds the registry from a persisted list, dropping entries that would not mount today.
    pub fn from_saved(saved: Vec<NetworkDrive>) -> Self {
        let mut drives = Self::default();
        for drive in saved {
            if let Err(err) = drives.mount(&drive.name, &drive.path) {
                leptos::logging::warn!("skipping saved network drive `{}`: {err}", drive.name);
            }
        }
        drives
    }

    pub fn drives(&self) -> &[NetworkDrive] {
        &self.drives
    }

    pub fn is_empty(&self) -> bool {
        self.drives.is_empty()
    }

    /// Adds a drive. Names are unique ignoring case; paths must contain a `:/` root.
    pub fn mount(&mut self, name: &str, path: &str) -> Result<&NetworkDrive, DriveError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DriveError::EmptyName);
        }
        if self
            .drives
            .iter()
            .any(|drive| drive.name.to_lowercase() == name.to_lowercase())
        {
            return Err(DriveError::NameConflict(name.to_string()));
        }
        if !path.contains(":/") {
            return Err(DriveError::InvalidPath(path.to_string()));
        }

        self.drives.push(NetworkDrive {
            name: name.to_string(),
            path: normalize_virtual_path(path),
        });
        Ok(&self.drives[self.drives.len() - 1])
    }

    /// Removes the drive with exactly this name. Returns `false` if none matched.
    pub fn unmount(&mut self, name: &str) -> bool {
        let before = self.drives.len();
        self.drives.retain(|drive| drive.name != name);
        self.drives.len() != before
    }
}
