//! Typed host-domain contracts shared by the desktop runtime.
//!
//! This crate is the boundary for services the desktop core consumes but does not own: virtual
//! path helpers, the content/listing provider that fronts local and remote drives, the cloud
//! auth-status provider, and lightweight preference storage. Each service trait ships with a
//! no-op adapter and an in-memory adapter for tests and headless hosts.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod fs;
pub mod storage;
pub mod time;

pub use auth::{
    AuthFuture, AuthStatusProvider, CloudProvider, MemoryAuthStatusProvider,
    NoopAuthStatusProvider,
};
pub use fs::path::{
    is_root_path, is_same_or_descendant, join_virtual_path, normalize_virtual_path, path_scheme,
    rebase_virtual_path, split_virtual_path, virtual_file_name,
};
pub use fs::service::{ContentFuture, ContentProvider, MemoryContentProvider, NoopContentProvider};
pub use fs::types::{
    format_size_label, ContentEntry, ContentEntryKind, ContentListResult, FILE_PATH_DRAG_MIME,
};
pub use storage::prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, NoopPrefsStore, PrefsError, PrefsStore,
    PrefsStoreFuture, DESKTOP_LAYOUT_PREFS_KEY, NETWORK_DRIVES_PREFS_KEY,
};
pub use time::{
    format_clock_label, format_modified_label, modified_label_from_unix_ms, modified_label_now,
};
