//! Preference storage for persisted desktop state.
//!
//! Two JSON documents live here: the desktop layout snapshot and the mounted network drives,
//! each under a fixed key. Nothing is durable by contract; a host may back the store with
//! anything or nothing, and callers treat a missing key as "use defaults".

use std::{
    cell::RefCell,
    collections::BTreeMap,
    future::{self, Future},
    pin::Pin,
    rc::Rc,
};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Preference key holding the serialized desktop layout snapshot.
pub const DESKTOP_LAYOUT_PREFS_KEY: &str = "webdesk.layout.v1";
/// Preference key holding the mounted network drive list.
pub const NETWORK_DRIVES_PREFS_KEY: &str = "webdesk.network_drives.v1";

/// Boxed future returned by [`PrefsStore`] methods, kept object safe for `Rc<dyn PrefsStore>`.
pub type PrefsStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("preference store failed for `{key}`: {message}")]
    Store { key: String, message: String },
    #[error("preference `{key}` is not valid JSON for its type: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
    #[error("preference `{key}` could not be encoded: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

/// Host key/value store holding one raw JSON document per key.
pub trait PrefsStore {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, PrefsError>>;

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), PrefsError>>;

    fn delete_pref<'a>(&'a self, key: &'a str) -> PrefsStoreFuture<'a, Result<(), PrefsError>>;
}

fn ready<'a, T: 'a>(value: T) -> PrefsStoreFuture<'a, T> {
    Box::pin(future::ready(value))
}

/// Store that remembers nothing. Every load reports a missing key.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPrefsStore;

impl PrefsStore for NoopPrefsStore {
    fn load_pref<'a>(
        &'a self,
        _key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, PrefsError>> {
        ready(Ok(None))
    }

    fn save_pref<'a>(
        &'a self,
        _key: &'a str,
        _raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), PrefsError>> {
        ready(Ok(()))
    }

    fn delete_pref<'a>(&'a self, _key: &'a str) -> PrefsStoreFuture<'a, Result<(), PrefsError>> {
        ready(Ok(()))
    }
}

/// In-memory store. Clones share one map, so a test can hand one clone to the shell and
/// inspect another.
#[derive(Debug, Clone, Default)]
pub struct MemoryPrefsStore {
    documents: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryPrefsStore {
    /// Stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.documents.borrow().keys().cloned().collect()
    }

    /// Raw JSON stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.documents.borrow().get(key).cloned()
    }
}

impl PrefsStore for MemoryPrefsStore {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, PrefsError>> {
        ready(Ok(self.raw(key)))
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), PrefsError>> {
        self.documents
            .borrow_mut()
            .insert(key.to_owned(), raw_json.to_owned());
        ready(Ok(()))
    }

    fn delete_pref<'a>(&'a self, key: &'a str) -> PrefsStoreFuture<'a, Result<(), PrefsError>> {
        self.documents.borrow_mut().remove(key);
        ready(Ok(()))
    }
}

/// Reads `key` and decodes it as `T`. A missing key is `Ok(None)`.
///
/// # Errors
///
/// [`PrefsError::Store`] from the backing store, or [`PrefsError::Decode`] when the stored
/// JSON does not fit `T`.
pub async fn load_pref_with<S, T>(store: &S, key: &str) -> Result<Option<T>, PrefsError>
where
    S: PrefsStore + ?Sized,
    T: DeserializeOwned,
{
    match store.load_pref(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| PrefsError::Decode {
                key: key.to_owned(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and writes it under `key`.
///
/// # Errors
///
/// [`PrefsError::Encode`] when `value` cannot be serialized, or the store's own error.
pub async fn save_pref_with<S, T>(store: &S, key: &str, value: &T) -> Result<(), PrefsError>
where
    S: PrefsStore + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| PrefsError::Encode {
        key: key.to_owned(),
        source,
    })?;
    store.save_pref(key, &raw).await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct MountedDrive {
        name: String,
        path: String,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Layout {
        schema_version: u32,
        #[serde(default)]
        icon_positions: BTreeMap<String, (i32, i32)>,
    }

    #[test]
    fn drive_list_is_stored_as_json_array() {
        let store = MemoryPrefsStore::default();
        let drives = vec![MountedDrive {
            name: "Archive".to_string(),
            path: "E:/Backup-2024".to_string(),
        }];

        block_on(save_pref_with(&store, NETWORK_DRIVES_PREFS_KEY, &drives)).expect("save");

        assert_eq!(
            store.raw(NETWORK_DRIVES_PREFS_KEY).as_deref(),
            Some(r#"[{"name":"Archive","path":"E:/Backup-2024"}]"#)
        );
        let loaded: Option<Vec<MountedDrive>> =
            block_on(load_pref_with(&store, NETWORK_DRIVES_PREFS_KEY)).expect("load");
        assert_eq!(loaded, Some(drives));
    }

    #[test]
    fn layout_missing_optional_fields_decodes_with_defaults() {
        let store = MemoryPrefsStore::default();
        let shared: &dyn PrefsStore = &store.clone();
        block_on(shared.save_pref(DESKTOP_LAYOUT_PREFS_KEY, r#"{"schema_version":1}"#))
            .expect("save");

        let layout: Option<Layout> =
            block_on(load_pref_with(&store, DESKTOP_LAYOUT_PREFS_KEY)).expect("load");
        assert_eq!(
            layout,
            Some(Layout {
                schema_version: 1,
                icon_positions: BTreeMap::new(),
            })
        );
        assert_eq!(store.keys(), vec![DESKTOP_LAYOUT_PREFS_KEY.to_string()]);

        block_on(shared.delete_pref(DESKTOP_LAYOUT_PREFS_KEY)).expect("delete");
        let gone: Option<Layout> =
            block_on(load_pref_with(&store, DESKTOP_LAYOUT_PREFS_KEY)).expect("load");
        assert_eq!(gone, None);
    }

    #[test]
    fn malformed_drive_list_is_a_decode_error_naming_the_key() {
        let store = MemoryPrefsStore::default();
        block_on(store.save_pref(NETWORK_DRIVES_PREFS_KEY, r#"{"name":"Archive"}"#))
            .expect("save");

        let err = block_on(load_pref_with::<_, Vec<MountedDrive>>(
            &store,
            NETWORK_DRIVES_PREFS_KEY,
        ))
        .expect_err("object is not a drive list");

        assert!(matches!(&err, PrefsError::Decode { key, .. } if key == NETWORK_DRIVES_PREFS_KEY));
        assert!(err.to_string().contains(NETWORK_DRIVES_PREFS_KEY));
    }

    #[test]
    fn noop_store_forgets_saved_layouts() {
        let store: &dyn PrefsStore = &NoopPrefsStore;
        block_on(store.save_pref(DESKTOP_LAYOUT_PREFS_KEY, r#"{"schema_version":1}"#))
            .expect("save");
        let layout: Option<Layout> =
            block_on(load_pref_with(store, DESKTOP_LAYOUT_PREFS_KEY)).expect("load");
        assert_eq!(layout, None);
    }
}
