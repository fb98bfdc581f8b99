//! Content/listing provider contracts.
//!
//! The desktop core never talks to a disk or cloud backend directly; it asks a
//! [`ContentProvider`] for listings and file text and treats every backend the same way.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use super::{
    path::{normalize_virtual_path, path_scheme},
    types::{ContentEntry, ContentListResult},
};

/// Object-safe boxed future used by [`ContentProvider`] async methods.
pub type ContentFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service that lists directories and reads file text for a backend.
pub trait ContentProvider {
    /// Lists a directory.
    fn list<'a>(&'a self, path: &'a str) -> ContentFuture<'a, Result<ContentListResult, String>>;

    /// Reads file text. `Ok(None)` means the file exists but has no readable content.
    fn get_content<'a>(&'a self, path: &'a str)
        -> ContentFuture<'a, Result<Option<String>, String>>;

    /// Returns `true` when `path` is served by a remote backend.
    fn is_remote(&self, path: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op provider for hosts without any backend.
pub struct NoopContentProvider;

impl ContentProvider for NoopContentProvider {
    fn list<'a>(&'a self, _path: &'a str) -> ContentFuture<'a, Result<ContentListResult, String>> {
        Box::pin(async { Err("content provider unavailable: list".to_string()) })
    }

    fn get_content<'a>(
        &'a self,
        _path: &'a str,
    ) -> ContentFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn is_remote(&self, _path: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory provider keyed by normalized path.
///
/// Paths whose scheme is registered through [`MemoryContentProvider::with_remote_schemes`] are
/// reported as remote.
pub struct MemoryContentProvider {
    listings: Rc<RefCell<HashMap<String, Vec<ContentEntry>>>>,
    contents: Rc<RefCell<HashMap<String, String>>>,
    remote_schemes: Vec<String>,
}

impl MemoryContentProvider {
    /// Creates a provider that treats the given schemes (`gdrive`, `dropbox`) as remote.
    pub fn with_remote_schemes<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            remote_schemes: schemes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Registers the listing returned for `path`.
    pub fn insert_listing(&self, path: &str, entries: Vec<ContentEntry>) {
        self.listings
            .borrow_mut()
            .insert(normalize_virtual_path(path), entries);
    }

    /// Registers the text returned for a file path.
    pub fn insert_content(&self, path: &str, text: impl Into<String>) {
        self.contents
            .borrow_mut()
            .insert(normalize_virtual_path(path), text.into());
    }
}

impl ContentProvider for MemoryContentProvider {
    fn list<'a>(&'a self, path: &'a str) -> ContentFuture<'a, Result<ContentListResult, String>> {
        Box::pin(async move {
            let cwd = normalize_virtual_path(path);
            let entries = self
                .listings
                .borrow()
                .get(&cwd)
                .cloned()
                .ok_or_else(|| format!("path `{cwd}` not found"))?;
            Ok(ContentListResult {
                remote: self.is_remote(&cwd),
                cwd,
                entries,
            })
        })
    }

    fn get_content<'a>(
        &'a self,
        path: &'a str,
    ) -> ContentFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move {
            Ok(self
                .contents
                .borrow()
                .get(&normalize_virtual_path(path))
                .cloned())
        })
    }

    fn is_remote(&self, path: &str) -> bool {
        path_scheme(path)
            .map(|scheme| self.remote_schemes.iter().any(|remote| remote == scheme))
            .unwrap_or(false)
    }
}
