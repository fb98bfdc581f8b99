//! App registry built from the generated manifest catalog, plus window-content factories.
//!
//! Descriptors come from `manifests/*.toml` (validated and sorted by `build.rs`). Window content is
//! resolved at mount time through a factory table keyed by app id, so adding an app means adding
//! a manifest and registering a factory.

mod builtin;

use std::{any::Any, collections::BTreeMap, fmt, sync::OnceLock};

use leptos::logging::warn;
use platform_host::{join_virtual_path, virtual_file_name};
use serde::Deserialize;

use crate::model::{AppId, AppWindow, IconPosition, OpenWindowRequest};
use crate::vfs::{FileSystemEntry, VirtualFileSystem};

pub use builtin::{
    NotepadContent, PlaceholderContent, PropertiesContent, SettingsContent, SETTINGS_SECTIONS,
};

include!(concat!(env!("OUT_DIR"), "/app_catalog_generated.rs"));

/// File extension (lowercase, with dot) to app id.
pub const FILE_ASSOCIATIONS: &[(&str, &str)] = &[(".txt", "notepad")];

/// App launched for explorer folders.
pub const EXPLORER_APP_ID: &str = "explorer";
/// Hidden app showing [`PropertiesContext`].
pub const PROPERTIES_APP_ID: &str = "properties";
/// App opened when a cloud provider still needs configuration.
pub const SETTINGS_APP_ID: &str = "settings";

/// Resolves the app associated with a file name's extension, ignoring case.
pub fn associated_app(file_name: &str) -> Option<AppId> {
    let lower = file_name.to_lowercase();
    FILE_ASSOCIATIONS
        .iter()
        .find(|(extension, _)| lower.ends_with(extension))
        .map(|(_, app_id)| AppId::from(*app_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppDescriptor {
    pub app_id: AppId,
    pub display_name: String,
    pub icon_ref: String,
    pub show_in_launcher: bool,
    pub show_on_desktop: bool,
    pub launch_position: Option<IconPosition>,
}

impl AppDescriptor {
    /// Window request for a plain launch (title = display name).
    pub fn open_request(&self) -> OpenWindowRequest {
        OpenWindowRequest::new(self.app_id.clone(), self.display_name.clone())
            .with_icon(self.icon_ref.clone())
    }
}

fn catalog_descriptors() -> &'static [AppDescriptor] {
    static CATALOG: OnceLock<Vec<AppDescriptor>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        serde_json::from_str(APP_MANIFEST_CATALOG_JSON).unwrap_or_else(|err| {
            warn!("generated app manifest catalog failed to parse: {err}");
            Vec::new()
        })
    })
}

/// Item shown by the properties app.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertiesContext {
    pub item: FileSystemEntry,
    pub path: String,
}

impl PropertiesContext {
    pub fn full_path(&self) -> String {
        join_virtual_path(&self.path, &self.item.name)
    }
}

/// Everything a content factory may read while mounting into a window.
#[derive(Clone, Copy)]
pub struct ContentContext<'a> {
    pub window: &'a AppWindow,
    pub vfs: &'a VirtualFileSystem,
    pub properties: Option<&'a PropertiesContext>,
    pub settings_section: Option<&'a str>,
}

impl ContentContext<'_> {
    /// File path the window was launched with, if any.
    pub fn launch_file(&self) -> Option<&str> {
        self.window
            .launch_data
            .as_ref()
            .map(|data| data.file_path.as_str())
    }
}

/// Headless window content mounted for one app window.
pub trait AppContent: fmt::Debug {
    /// Title the window should adopt after mounting.
    fn requested_title(&self) -> Option<String> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

pub type ContentFactory = fn(&ContentContext<'_>) -> Box<dyn AppContent>;

#[derive(Debug, Clone)]
pub struct AppRegistry {
    descriptors: Vec<AppDescriptor>,
    factories: BTreeMap<AppId, ContentFactory>,
}

impl Default for AppRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AppRegistry {
    /// Registry over the generated catalog with the built-in content factories.
    pub fn builtin() -> Self {
        let mut registry = Self::from_descriptors(catalog_descriptors().to_vec());
        registry.register_content("notepad", builtin::mount_notepad);
        registry.register_content(PROPERTIES_APP_ID, builtin::mount_properties);
        registry.register_content(SETTINGS_APP_ID, builtin::mount_settings);
        registry
    }

    /// Registry with the given descriptors and no content factories.
    pub fn from_descriptors(descriptors: Vec<AppDescriptor>) -> Self {
        Self {
            descriptors,
            factories: BTreeMap::new(),
        }
    }

    pub fn register_content(&mut self, app_id: impl Into<AppId>, factory: ContentFactory) {
        self.factories.insert(app_id.into(), factory);
    }

    pub fn descriptors(&self) -> &[AppDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, app_id: &AppId) -> Option<&AppDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| &descriptor.app_id == app_id)
    }

    pub fn launcher_apps(&self) -> Vec<&AppDescriptor> {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.show_in_launcher)
            .collect()
    }

    pub fn desktop_icon_apps(&self) -> Vec<&AppDescriptor> {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.show_on_desktop)
            .collect()
    }

    /// Builds the content for a window. Apps without a factory get a placeholder.
    pub fn mount_content(&self, context: &ContentContext<'_>) -> Box<dyn AppContent> {
        match self.factories.get(&context.window.app_id) {
            Some(factory) => factory(context),
            None => Box::new(PlaceholderContent::for_window(context.window)),
        }
    }
}

/// Window title for an app opened on a file (`readme.txt - Notepad`).
pub fn file_window_title(file_path: &str, app_name: &str) -> String {
    format!("{} - {app_name}", virtual_file_name(file_path))
}
