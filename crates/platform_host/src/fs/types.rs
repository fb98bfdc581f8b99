//! Content-provider data types shared across host contracts and implementations.

use serde::{Deserialize, Serialize};

/// Drag-and-drop payload type carrying a file's full virtual path.
///
/// Desktop icons, explorer listings, and taskbar buttons use it to identify the drag source.
pub const FILE_PATH_DRAG_MIME: &str = "application/x-webdesk-file-path";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Entry kind reported by a content provider.
pub enum ContentEntryKind {
    /// Directory entry.
    Folder,
    /// File entry.
    File,
    /// Link to another path.
    Shortcut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Directory entry returned by provider listing operations.
pub struct ContentEntry {
    /// Base name of the entry.
    pub name: String,
    /// Folder, file, or shortcut.
    pub kind: ContentEntryKind,
    /// File size in bytes (files only).
    pub size_bytes: Option<u64>,
    /// Last-modified time in unix milliseconds when available.
    pub modified_at_unix_ms: Option<i64>,
    /// Shortcut target path.
    pub target_path: Option<String>,
}

impl ContentEntry {
    /// Creates a folder entry with no metadata.
    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ContentEntryKind::Folder,
            size_bytes: None,
            modified_at_unix_ms: None,
            target_path: None,
        }
    }

    /// Creates a file entry with a known byte size.
    pub fn file(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            kind: ContentEntryKind::File,
            size_bytes: Some(size_bytes),
            modified_at_unix_ms: None,
            target_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Result payload for provider listing operations.
pub struct ContentListResult {
    /// Normalized directory path that was listed.
    pub cwd: String,
    /// Whether the listing came from a remote backend.
    pub remote: bool,
    /// Child entries in display order.
    pub entries: Vec<ContentEntry>,
}

/// Formats a byte count the way file listings display it (`1 KB`, `2.1 MB`, `256 MB`).
pub fn format_size_label(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let value = bytes as f64;
    if bytes < 1024 {
        format!("{bytes} B")
    } else if value < MB {
        format!("{} KB", (value / KB).round().max(1.0) as u64)
    } else if value < GB {
        format!("{} MB", one_decimal(value / MB))
    } else {
        format!("{} GB", one_decimal(value / GB))
    }
}

fn one_decimal(value: f64) -> String {
    let rendered = format!("{value:.1}");
    match rendered.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => rendered,
    }
}
