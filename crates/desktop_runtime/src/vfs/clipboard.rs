use platform_host::normalize_virtual_path;
use serde::{Deserialize, Serialize};

use super::entry::{EntryId, FileSystemEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClipboardMode {
    Copy,
    Cut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    pub item: FileSystemEntry,
    pub source_path: String,
    pub mode: ClipboardMode,
}

/// Holds at most one pending cut/copy item.
#[derive(Debug, Clone, Default)]
pub struct ClipboardController {
    entry: Option<ClipboardEntry>,
}

impl ClipboardController {
    pub fn cut(&mut self, item: FileSystemEntry, source_path: &str) {
        self.set(item, source_path, ClipboardMode::Cut);
    }

    pub fn copy(&mut self, item: FileSystemEntry, source_path: &str) {
        self.set(item, source_path, ClipboardMode::Copy);
    }

    pub fn entry(&self) -> Option<&ClipboardEntry> {
        self.entry.as_ref()
    }

    pub fn take(&mut self) -> Option<ClipboardEntry> {
        self.entry.take()
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// Returns `true` when `id` is pending a cut (listings dim such entries).
    pub fn is_cut(&self, id: &EntryId) -> bool {
        self.entry
            .as_ref()
            .map(|entry| entry.mode == ClipboardMode::Cut && &entry.item.id == id)
            .unwrap_or(false)
    }

    fn set(&mut self, item: FileSystemEntry, source_path: &str, mode: ClipboardMode) {
        self.entry = Some(ClipboardEntry {
            item: item.without_children(),
            source_path: normalize_virtual_path(source_path),
            mode,
        });
    }
}
