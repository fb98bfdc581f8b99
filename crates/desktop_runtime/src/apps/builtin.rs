//! Built-in window contents for the bundled apps.

use std::any::Any;

use platform_host::virtual_file_name;

use super::{AppContent, ContentContext, PropertiesContext};
use crate::model::{AppId, AppWindow};
use crate::vfs::EntryKind;

/// Settings sections a launch may jump to.
pub const SETTINGS_SECTIONS: &[&str] = &[
    "System",
    "Bluetooth",
    "Network",
    "Personalization",
    "App Icons",
    "Cloud Storage",
    "Apps",
    "Accounts",
    "Time",
    "Gaming",
    "Accessibility",
    "Privacy",
    "Update",
];

const DEFAULT_SETTINGS_SECTION: &str = "Personalization";

/// Text document opened in Notepad.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotepadContent {
    pub file_path: Option<String>,
    pub text: String,
}

impl AppContent for NotepadContent {
    fn requested_title(&self) -> Option<String> {
        self.file_path
            .as_deref()
            .map(|path| format!("{} - Notepad", virtual_file_name(path)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(super) fn mount_notepad(context: &ContentContext<'_>) -> Box<dyn AppContent> {
    let loaded = context.launch_file().and_then(|path| {
        match context.vfs.file_content(path) {
            Ok(Some(text)) => Some(NotepadContent {
                file_path: Some(path.to_string()),
                text: text.to_string(),
            }),
            Ok(None) => None,
            Err(err) => {
                leptos::logging::warn!("notepad could not open {path}: {err}");
                None
            }
        }
    });
    Box::new(loaded.unwrap_or_default())
}

/// Detail rows for the item in the current [`PropertiesContext`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertiesContent {
    pub context: Option<PropertiesContext>,
}

impl PropertiesContent {
    /// Label/value pairs in display order. Empty when nothing is selected.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let Some(context) = &self.context else {
            return Vec::new();
        };
        let item = &context.item;
        let mut rows = vec![("Type of file", item.item_type_label())];
        if item.kind == EntryKind::Shortcut {
            if let Some(target) = &item.target_path {
                rows.push(("Target", target.clone()));
            }
        }
        rows.push(("Location", context.path.clone()));
        if let Some(size) = &item.size_label {
            rows.push(("Size", size.clone()));
        }
        rows.push(("Modified", item.modified_label.clone().unwrap_or_default()));
        rows
    }
}

impl AppContent for PropertiesContent {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(super) fn mount_properties(context: &ContentContext<'_>) -> Box<dyn AppContent> {
    Box::new(PropertiesContent {
        context: context.properties.cloned(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsContent {
    pub active_section: String,
}

impl AppContent for SettingsContent {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(super) fn mount_settings(context: &ContentContext<'_>) -> Box<dyn AppContent> {
    let section = context
        .settings_section
        .filter(|section| SETTINGS_SECTIONS.contains(section))
        .unwrap_or(DEFAULT_SETTINGS_SECTION);
    Box::new(SettingsContent {
        active_section: section.to_string(),
    })
}

/// Stand-in for apps whose behavior lives outside the desktop core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderContent {
    pub app_id: AppId,
    pub title: String,
}

impl PlaceholderContent {
    pub fn for_window(window: &AppWindow) -> Self {
        Self {
            app_id: window.app_id.clone(),
            title: window.title.clone(),
        }
    }
}

impl AppContent for PlaceholderContent {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
