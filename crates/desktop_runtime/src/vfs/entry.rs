use std::fmt;

use platform_host::ContentEntryKind;
use serde::{Deserialize, Serialize};

/// Identity assigned once when an entry is created; never reused.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Folder,
    File,
    Shortcut,
}

impl From<ContentEntryKind> for EntryKind {
    fn from(kind: ContentEntryKind) -> Self {
        match kind {
            ContentEntryKind::Folder => Self::Folder,
            ContentEntryKind::File => Self::File,
            ContentEntryKind::Shortcut => Self::Shortcut,
        }
    }
}

/// A named node in a directory listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSystemEntry {
    pub id: EntryId,
    pub name: String,
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_label: Option<String>,
    /// Descendants captured by a deep-copy snapshot. Live listings never carry children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileSystemEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl FileSystemEntry {
    pub fn new(id: EntryId, name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            size_label: None,
            modified_label: None,
            children: None,
            target_path: None,
            content: None,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// Lowercased extension including the dot (`.txt`), if the name has one.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }

    /// Type column label shown by listings and the properties dialog.
    pub fn item_type_label(&self) -> String {
        match self.kind {
            EntryKind::Folder => "File folder".to_string(),
            EntryKind::Shortcut => "Shortcut (.lnk)".to_string(),
            EntryKind::File => match self.extension() {
                Some(ext) => format!("{} File", ext.trim_start_matches('.').to_uppercase()),
                None => "File".to_string(),
            },
        }
    }

    /// Copy of this entry without its snapshot children.
    pub(crate) fn without_children(&self) -> Self {
        Self {
            children: None,
            ..self.clone()
        }
    }
}

pub(crate) fn extension_of(name: &str) -> Option<String> {
    let idx = name.rfind('.')?;
    if idx == 0 || idx + 1 == name.len() {
        return None;
    }
    Some(name[idx..].to_lowercase())
}

/// Splits `name` into stem and extension (`report`, `.docx`). Folders keep the full name.
pub(crate) fn split_stem(name: &str, is_folder: bool) -> (&str, &str) {
    if is_folder {
        return (name, "");
    }
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => name.split_at(idx),
        _ => (name, ""),
    }
}
