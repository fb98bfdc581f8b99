//! In-memory hierarchical filesystem with linear undo/redo.
//!
//! Listings are keyed by normalized directory path and keep display (insertion) order. Unknown
//! directories spring into existence as empty listings on first [`VirtualFileSystem::list`].
//! Every mutating operation is all-or-nothing: on error the listings and both history stacks are
//! left untouched.

mod clipboard;
mod entry;
mod history;
mod seed;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use leptos::logging::warn;
use platform_host::{
    format_size_label, is_root_path, is_same_or_descendant, join_virtual_path,
    modified_label_from_unix_ms, modified_label_now, normalize_virtual_path,
    rebase_virtual_path, split_virtual_path, ContentEntry,
};
use thiserror::Error;

pub use clipboard::{ClipboardController, ClipboardEntry, ClipboardMode};
pub use entry::{EntryId, EntryKind, FileSystemEntry};
pub use history::{ActionHistory, UndoableAction};

use crate::events::{EventBus, Subscription};
use entry::split_stem;
use seed::SEED_TREE;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    #[error("an item named `{name}` already exists in {path}")]
    NameConflict { name: String, path: String },
    #[error("{0} was not found")]
    NotFound(String),
    #[error("{0} is not a folder")]
    NotAFolder(String),
    #[error("cannot move or copy `{name}` into itself")]
    SelfMove { name: String },
    #[error("`{0}` is not a valid name")]
    InvalidName(String),
    #[error("the clipboard is empty")]
    EmptyClipboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VfsEvent {
    DirectoryChanged(String),
    HistoryChanged { can_undo: bool, can_redo: bool },
}

/// A search hit together with the directory that lists it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub entry: FileSystemEntry,
    pub path: String,
}

impl SearchResult {
    pub fn full_path(&self) -> String {
        join_virtual_path(&self.path, &self.entry.name)
    }
}

#[derive(Debug)]
pub struct VirtualFileSystem {
    listings: BTreeMap<String, Vec<FileSystemEntry>>,
    history: ActionHistory,
    next_entry_id: u64,
    events: EventBus<VfsEvent>,
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFileSystem {
    /// Creates an empty filesystem.
    pub fn new() -> Self {
        Self {
            listings: BTreeMap::new(),
            history: ActionHistory::default(),
            next_entry_id: 1,
            events: EventBus::new(),
        }
    }

    /// Creates a filesystem holding the demo `C:/` and `E:/` drives.
    pub fn seeded() -> Self {
        let mut vfs = Self::new();
        for (path, entries) in SEED_TREE {
            let listing = entries
                .iter()
                .map(|seed| FileSystemEntry {
                    size_label: seed.size_label.map(str::to_string),
                    modified_label: Some(seed.modified_label.to_string()),
                    content: seed.content.map(str::to_string),
                    ..FileSystemEntry::new(vfs.allocate_id(), seed.name, seed.kind)
                })
                .collect();
            vfs.listings.insert((*path).to_string(), listing);
        }
        vfs
    }

    pub fn subscribe(&self, listener: impl Fn(&VfsEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Returns the listing for `path`, creating an empty one if the directory is unknown.
    pub fn list(&mut self, path: &str) -> &[FileSystemEntry] {
        self.listings
            .entry(normalize_virtual_path(path))
            .or_default()
    }

    /// Read-only view of a listing; unknown directories read as empty.
    pub fn listing(&self, path: &str) -> &[FileSystemEntry] {
        self.listings
            .get(&normalize_virtual_path(path))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Directory paths with a listing, in sorted order.
    pub fn directory_paths(&self) -> impl Iterator<Item = &str> {
        self.listings.keys().map(String::as_str)
    }

    /// Looks up the entry at `full_path` by exact leaf name in its parent listing.
    pub fn resolve(&self, full_path: &str) -> Result<&FileSystemEntry, VfsError> {
        let not_found = || VfsError::NotFound(normalize_virtual_path(full_path));
        let (dir, leaf) = split_virtual_path(full_path).ok_or_else(not_found)?;
        self.listing(&dir)
            .iter()
            .find(|entry| entry.name == leaf)
            .ok_or_else(not_found)
    }

    /// Looks up an entry by id within one listing.
    pub fn entry(&self, path: &str, id: &EntryId) -> Option<&FileSystemEntry> {
        self.listing(path).iter().find(|entry| &entry.id == id)
    }

    /// Returns `true` for drive roots and paths resolving to a folder entry.
    pub fn is_folder(&self, path: &str) -> bool {
        is_root_path(path)
            || self
                .resolve(path)
                .map(FileSystemEntry::is_folder)
                .unwrap_or(false)
    }

    /// Creates an entry named `name` at the end of `parent_path`.
    pub fn create(
        &mut self,
        parent_path: &str,
        kind: EntryKind,
        name: &str,
    ) -> Result<FileSystemEntry, VfsError> {
        let parent = normalize_virtual_path(parent_path);
        let name = validate_name(name)?;
        self.ensure_container(&parent)?;
        self.ensure_name_free(&parent, &name, None)?;
        if kind == EntryKind::Folder {
            self.ensure_listing_free(&parent, &name)?;
        }

        let mut entry = FileSystemEntry::new(self.allocate_id(), name, kind);
        entry.modified_label = Some(modified_label_now());
        if kind == EntryKind::File {
            entry.size_label = Some(format_size_label(0));
            entry.content = Some(String::new());
        }

        self.attach_subtree(&parent, entry.clone(), None);
        self.history.record(UndoableAction::Create {
            item: entry.clone(),
            parent_path: parent.clone(),
        });
        self.publish([parent], true);
        Ok(entry)
    }

    /// Creates `"<target name> - Shortcut"` in `parent_path` pointing at `target_path`.
    pub fn create_shortcut(
        &mut self,
        parent_path: &str,
        target_path: &str,
    ) -> Result<FileSystemEntry, VfsError> {
        let parent = normalize_virtual_path(parent_path);
        let target = normalize_virtual_path(target_path);
        self.ensure_container(&parent)?;
        let target_name = self.resolve(&target)?.name.clone();
        let name = self.unique_name(&parent, &format!("{target_name} - Shortcut"));

        let mut entry = FileSystemEntry::new(self.allocate_id(), name, EntryKind::Shortcut);
        entry.target_path = Some(target);
        entry.size_label = Some("1 KB".to_string());
        entry.modified_label = Some(modified_label_now());

        self.attach_subtree(&parent, entry.clone(), None);
        self.history.record(UndoableAction::Create {
            item: entry.clone(),
            parent_path: parent.clone(),
        });
        self.publish([parent], true);
        Ok(entry)
    }

    /// Returns `base`, or the first free `"base (n)"` starting at 2.
    pub fn unique_name(&self, parent_path: &str, base: &str) -> String {
        let listing = self.listing(parent_path);
        let taken = |name: &str| listing.iter().any(|entry| entry.name == name);
        if !taken(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base} ({n})"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    pub fn rename(
        &mut self,
        path: &str,
        item_id: &EntryId,
        new_name: &str,
    ) -> Result<(), VfsError> {
        let path = normalize_virtual_path(path);
        let new_name = validate_name(new_name)?;
        let (old_name, is_folder) = self
            .entry(&path, item_id)
            .map(|entry| (entry.name.clone(), entry.is_folder()))
            .ok_or_else(|| missing_item(&path, item_id))?;
        if old_name == new_name {
            return Ok(());
        }
        self.ensure_name_free(&path, &new_name, Some(item_id))?;
        if is_folder {
            self.ensure_listing_free(&path, &new_name)?;
        }

        self.apply_rename(&path, item_id, &new_name);
        self.history.record(UndoableAction::Rename {
            item_id: item_id.clone(),
            old_name,
            new_name,
            path: path.clone(),
        });
        self.publish([path], true);
        Ok(())
    }

    /// Moves an entry between directories.
    ///
    /// Checks run in order: the item must exist in `source_path`, the destination must be a
    /// folder, a folder may not land in itself or its own subtree, and the name must be free.
    /// A folder also needs its new directory to hold no entries.
    pub fn move_entry(
        &mut self,
        item_id: &EntryId,
        source_path: &str,
        dest_path: &str,
    ) -> Result<(), VfsError> {
        let source = normalize_virtual_path(source_path);
        let dest = normalize_virtual_path(dest_path);
        let (source_index, item) = self
            .listing(&source)
            .iter()
            .enumerate()
            .find(|(_, entry)| &entry.id == item_id)
            .map(|(index, entry)| (index, entry.clone()))
            .ok_or_else(|| missing_item(&source, item_id))?;

        if !self.is_folder(&dest) {
            return Err(VfsError::NotAFolder(dest));
        }
        let moves_into_itself = item.is_folder()
            && is_same_or_descendant(&dest, &join_virtual_path(&source, &item.name));
        if dest == source || moves_into_itself {
            return Err(VfsError::SelfMove { name: item.name });
        }
        self.ensure_name_free(&dest, &item.name, None)?;
        if item.is_folder() {
            self.ensure_listing_free(&dest, &item.name)?;
        }

        self.apply_move(&source, &dest, item_id, None);
        self.history.record(UndoableAction::Move {
            item,
            source_path: source.clone(),
            dest_path: dest.clone(),
            source_index,
        });
        self.publish([source, dest], true);
        Ok(())
    }

    /// Deletes an entry and, for folders, every descendant listing. Returns the deep copy kept
    /// for undo.
    pub fn remove(&mut self, path: &str, item_id: &EntryId) -> Result<FileSystemEntry, VfsError> {
        let path = normalize_virtual_path(path);
        let (index, snapshot) = self
            .detach_subtree(&path, item_id)
            .ok_or_else(|| missing_item(&path, item_id))?;

        self.history.record(UndoableAction::Delete {
            item: snapshot.clone(),
            parent_path: path.clone(),
            index,
        });
        self.publish([path], true);
        Ok(snapshot)
    }

    /// Pastes the clipboard entry into `dest_path`.
    ///
    /// Copies duplicate the whole subtree under fresh ids and pick a `" - Copy"` name on collision.
    /// Cuts are moves and clear the clipboard once they succeed.
    pub fn paste(
        &mut self,
        clipboard: &mut ClipboardController,
        dest_path: &str,
    ) -> Result<FileSystemEntry, VfsError> {
        let dest = normalize_virtual_path(dest_path);
        let clip = clipboard.entry().cloned().ok_or(VfsError::EmptyClipboard)?;

        match clip.mode {
            ClipboardMode::Cut => {
                self.move_entry(&clip.item.id, &clip.source_path, &dest)?;
                clipboard.clear();
                Ok(self
                    .entry(&dest, &clip.item.id)
                    .cloned()
                    .unwrap_or(clip.item))
            }
            ClipboardMode::Copy => {
                if !self.is_folder(&dest) {
                    return Err(VfsError::NotAFolder(dest));
                }
                if clip.item.is_folder()
                    && is_same_or_descendant(
                        &dest,
                        &join_virtual_path(&clip.source_path, &clip.item.name),
                    )
                {
                    return Err(VfsError::SelfMove {
                        name: clip.item.name,
                    });
                }

                let mut copy = self
                    .snapshot_subtree(&clip.source_path, &clip.item.id)
                    .unwrap_or(clip.item);
                copy.name = self.copy_name(&dest, &copy.name, copy.is_folder());
                if copy.is_folder() {
                    self.ensure_listing_free(&dest, &copy.name)?;
                }
                self.assign_fresh_ids(&mut copy);

                self.attach_subtree(&dest, copy.clone(), None);
                self.history.record(UndoableAction::Create {
                    item: copy.clone(),
                    parent_path: dest.clone(),
                });
                self.publish([dest], true);
                Ok(copy.without_children())
            }
        }
    }

    /// Reverts the most recent action. Returns `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, VfsError> {
        let Some(action) = self.history.pop_undo() else {
            return Ok(false);
        };
        match self.revert(&action) {
            Ok(touched) => {
                self.history.push_redo(action);
                self.publish(touched, true);
                Ok(true)
            }
            Err(err) => {
                warn!("undo {} failed: {err}", action.label());
                self.history.push_undo(action);
                Err(err)
            }
        }
    }

    /// Re-applies the most recently undone action. Returns `Ok(false)` when there is nothing to
    /// redo.
    pub fn redo(&mut self) -> Result<bool, VfsError> {
        let Some(action) = self.history.pop_redo() else {
            return Ok(false);
        };
        match self.replay(&action) {
            Ok(touched) => {
                self.history.push_undo(action);
                self.publish(touched, true);
                Ok(true)
            }
            Err(err) => {
                warn!("redo {} failed: {err}", action.label());
                self.history.push_redo(action);
                Err(err)
            }
        }
    }

    /// Case-insensitive substring search over `root` and every directory below it, in path
    /// then display order.
    pub fn search(&self, root: &str, term: &str) -> Vec<SearchResult> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let root = normalize_virtual_path(root);
        self.listings
            .iter()
            .filter(|(path, _)| is_same_or_descendant(path, &root))
            .flat_map(|(path, entries)| {
                entries
                    .iter()
                    .filter(|entry| entry.name.to_lowercase().contains(&needle))
                    .map(move |entry| SearchResult {
                        entry: entry.clone(),
                        path: path.clone(),
                    })
            })
            .collect()
    }

    /// Text stored for a file. Shortcuts read through to their target file.
    pub fn file_content(&self, full_path: &str) -> Result<Option<&str>, VfsError> {
        let entry = self.resolve(full_path)?;
        match entry.kind {
            EntryKind::File => Ok(entry.content.as_deref()),
            EntryKind::Shortcut => match entry.target_path.as_deref() {
                Some(target) => match self.resolve(target)? {
                    target if target.kind == EntryKind::File => Ok(target.content.as_deref()),
                    _ => Ok(None),
                },
                None => Ok(None),
            },
            EntryKind::Folder => Ok(None),
        }
    }

    /// Replaces the listing at `path` with entries reported by a content provider.
    ///
    /// Entries keep their id across refreshes when name and kind are unchanged. Ingestion is not
    /// an undoable action.
    pub fn ingest_listing(&mut self, path: &str, entries: &[ContentEntry]) -> &[FileSystemEntry] {
        let path = normalize_virtual_path(path);
        let previous = self.listings.remove(&path).unwrap_or_default();
        let mut seen = HashSet::new();
        let mut listing = Vec::with_capacity(entries.len());

        for reported in entries {
            if !seen.insert(reported.name.as_str()) {
                warn!("duplicate entry `{}` in {path} listing ignored", reported.name);
                continue;
            }
            let kind = EntryKind::from(reported.kind);
            let kept = previous
                .iter()
                .find(|entry| entry.name == reported.name && entry.kind == kind);
            let id = match kept {
                Some(entry) => entry.id.clone(),
                None => self.allocate_id(),
            };
            listing.push(FileSystemEntry {
                size_label: reported
                    .size_bytes
                    .filter(|_| kind != EntryKind::Folder)
                    .map(format_size_label),
                modified_label: reported
                    .modified_at_unix_ms
                    .and_then(modified_label_from_unix_ms),
                target_path: reported.target_path.as_deref().map(normalize_virtual_path),
                content: kept.and_then(|entry| entry.content.clone()),
                ..FileSystemEntry::new(id, reported.name.clone(), kind)
            });
        }

        self.listings.insert(path.clone(), listing);
        self.publish([path.clone()], false);
        self.listing(&path)
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId::new(self.next_entry_id.to_string());
        self.next_entry_id += 1;
        id
    }

    fn ensure_name_free(
        &self,
        dir: &str,
        name: &str,
        except: Option<&EntryId>,
    ) -> Result<(), VfsError> {
        let conflict = self
            .listing(dir)
            .iter()
            .any(|entry| entry.name == name && Some(&entry.id) != except);
        if conflict {
            return Err(VfsError::NameConflict {
                name: name.to_string(),
                path: dir.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_container(&self, path: &str) -> Result<(), VfsError> {
        match self.resolve(path) {
            Ok(entry) if !entry.is_folder() => Err(VfsError::NotAFolder(path.to_string())),
            _ => Ok(()),
        }
    }

    /// A folder named `name` in `dir` may only take over directory keys whose listings are
    /// empty. Placeholders left by `list` are replaced, anything holding entries is a conflict.
    fn ensure_listing_free(&self, dir: &str, name: &str) -> Result<(), VfsError> {
        let target = join_virtual_path(dir, name);
        let occupied = self
            .listings
            .iter()
            .any(|(key, entries)| !entries.is_empty() && is_same_or_descendant(key, &target));
        if occupied {
            return Err(VfsError::NameConflict {
                name: name.to_string(),
                path: dir.to_string(),
            });
        }
        Ok(())
    }

    fn is_folder_entry(&self, dir: &str, item_id: &EntryId) -> bool {
        self.entry(dir, item_id)
            .map(FileSystemEntry::is_folder)
            .unwrap_or(false)
    }

    fn copy_name(&self, dest: &str, name: &str, is_folder: bool) -> String {
        let listing = self.listing(dest);
        let taken = |candidate: &str| listing.iter().any(|entry| entry.name == candidate);
        if !taken(name) {
            return name.to_string();
        }
        let (stem, ext) = split_stem(name, is_folder);
        let first = format!("{stem} - Copy{ext}");
        if !taken(&first) {
            return first;
        }
        (2..)
            .map(|n| format!("{stem} - Copy ({n}){ext}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or(first)
    }

    fn assign_fresh_ids(&mut self, entry: &mut FileSystemEntry) {
        entry.id = self.allocate_id();
        if let Some(children) = entry.children.as_mut() {
            for child in children {
                self.assign_fresh_ids(child);
            }
        }
    }

    fn apply_rename(&mut self, path: &str, item_id: &EntryId, new_name: &str) -> bool {
        let Some(entry) = self
            .listings
            .get_mut(path)
            .and_then(|listing| listing.iter_mut().find(|entry| &entry.id == item_id))
        else {
            return false;
        };
        let old_name = std::mem::replace(&mut entry.name, new_name.to_string());
        if entry.is_folder() {
            self.rekey_subtree(
                &join_virtual_path(path, &old_name),
                &join_virtual_path(path, new_name),
            );
        }
        true
    }

    fn apply_move(
        &mut self,
        source: &str,
        dest: &str,
        item_id: &EntryId,
        insert_at: Option<usize>,
    ) -> bool {
        let Some(listing) = self.listings.get_mut(source) else {
            return false;
        };
        let Some(index) = listing.iter().position(|entry| &entry.id == item_id) else {
            return false;
        };
        let entry = listing.remove(index);
        if entry.is_folder() {
            self.rekey_subtree(
                &join_virtual_path(source, &entry.name),
                &join_virtual_path(dest, &entry.name),
            );
        }
        insert_entry(self.listings.entry(dest.to_string()).or_default(), entry, insert_at);
        true
    }

    /// Moves every listing at or below `from` to the same relative place below `to`.
    fn rekey_subtree(&mut self, from: &str, to: &str) {
        let keys: Vec<String> = self
            .listings
            .keys()
            .filter(|key| is_same_or_descendant(key, from))
            .cloned()
            .collect();
        for key in keys {
            let Some(new_key) = rebase_virtual_path(&key, from, to) else {
                continue;
            };
            if let Some(listing) = self.listings.remove(&key) {
                self.listings.insert(new_key, listing);
            }
        }
    }

    fn snapshot_subtree(&self, parent: &str, item_id: &EntryId) -> Option<FileSystemEntry> {
        let mut entry = self.entry(parent, item_id)?.clone();
        if entry.is_folder() {
            entry.children = Some(self.snapshot_listing_tree(&join_virtual_path(parent, &entry.name)));
        }
        Some(entry)
    }

    fn snapshot_listing_tree(&self, dir: &str) -> Vec<FileSystemEntry> {
        self.listing(dir)
            .iter()
            .map(|entry| {
                let mut copy = entry.clone();
                if copy.is_folder() {
                    copy.children =
                        Some(self.snapshot_listing_tree(&join_virtual_path(dir, &entry.name)));
                }
                copy
            })
            .collect()
    }

    /// Removes an entry and returns its index and a deep snapshot of its subtree.
    fn detach_subtree(
        &mut self,
        parent: &str,
        item_id: &EntryId,
    ) -> Option<(usize, FileSystemEntry)> {
        let listing = self.listings.get_mut(parent)?;
        let index = listing.iter().position(|entry| &entry.id == item_id)?;
        let mut entry = listing.remove(index);
        if entry.is_folder() {
            let dir = join_virtual_path(parent, &entry.name);
            entry.children = Some(self.take_listing_tree(&dir));
            self.listings
                .retain(|key, _| !is_same_or_descendant(key, &dir));
        }
        Some((index, entry))
    }

    fn take_listing_tree(&mut self, dir: &str) -> Vec<FileSystemEntry> {
        let entries = self.listings.remove(dir).unwrap_or_default();
        entries
            .into_iter()
            .map(|mut entry| {
                if entry.is_folder() {
                    entry.children =
                        Some(self.take_listing_tree(&join_virtual_path(dir, &entry.name)));
                }
                entry
            })
            .collect()
    }

    /// Inserts a snapshot and recreates the descendant listings it carries.
    fn attach_subtree(
        &mut self,
        parent: &str,
        mut entry: FileSystemEntry,
        index: Option<usize>,
    ) {
        if let Some(children) = entry.children.take() {
            if entry.is_folder() {
                self.restore_listing_tree(&join_virtual_path(parent, &entry.name), children);
            }
        }
        insert_entry(self.listings.entry(parent.to_string()).or_default(), entry, index);
    }

    fn restore_listing_tree(&mut self, dir: &str, children: Vec<FileSystemEntry>) {
        let mut listing = Vec::with_capacity(children.len());
        for mut child in children {
            if let Some(grandchildren) = child.children.take() {
                if child.is_folder() {
                    self.restore_listing_tree(&join_virtual_path(dir, &child.name), grandchildren);
                }
            }
            listing.push(child);
        }
        self.listings.insert(dir.to_string(), listing);
    }

    fn revert(&mut self, action: &UndoableAction) -> Result<Vec<String>, VfsError> {
        match action {
            UndoableAction::Create { item, parent_path } => {
                self.detach_subtree(parent_path, &item.id)
                    .ok_or_else(|| missing_item(parent_path, &item.id))?;
                Ok(vec![parent_path.clone()])
            }
            UndoableAction::Rename {
                item_id,
                old_name,
                path,
                ..
            } => {
                self.ensure_name_free(path, old_name, Some(item_id))?;
                if self.is_folder_entry(path, item_id) {
                    self.ensure_listing_free(path, old_name)?;
                }
                if !self.apply_rename(path, item_id, old_name) {
                    return Err(missing_item(path, item_id));
                }
                Ok(vec![path.clone()])
            }
            UndoableAction::Move {
                item,
                source_path,
                dest_path,
                source_index,
            } => {
                self.ensure_name_free(source_path, &item.name, Some(&item.id))?;
                if item.is_folder() {
                    self.ensure_listing_free(source_path, &item.name)?;
                }
                if !self.apply_move(dest_path, source_path, &item.id, Some(*source_index)) {
                    return Err(missing_item(dest_path, &item.id));
                }
                Ok(vec![dest_path.clone(), source_path.clone()])
            }
            UndoableAction::Delete {
                item,
                parent_path,
                index,
            } => {
                self.ensure_name_free(parent_path, &item.name, None)?;
                if item.is_folder() {
                    self.ensure_listing_free(parent_path, &item.name)?;
                }
                self.attach_subtree(parent_path, item.clone(), Some(*index));
                Ok(vec![parent_path.clone()])
            }
        }
    }

    fn replay(&mut self, action: &UndoableAction) -> Result<Vec<String>, VfsError> {
        match action {
            UndoableAction::Create { item, parent_path } => {
                self.ensure_name_free(parent_path, &item.name, None)?;
                if item.is_folder() {
                    self.ensure_listing_free(parent_path, &item.name)?;
                }
                self.attach_subtree(parent_path, item.clone(), None);
                Ok(vec![parent_path.clone()])
            }
            UndoableAction::Rename {
                item_id,
                new_name,
                path,
                ..
            } => {
                self.ensure_name_free(path, new_name, Some(item_id))?;
                if self.is_folder_entry(path, item_id) {
                    self.ensure_listing_free(path, new_name)?;
                }
                if !self.apply_rename(path, item_id, new_name) {
                    return Err(missing_item(path, item_id));
                }
                Ok(vec![path.clone()])
            }
            UndoableAction::Move {
                item,
                source_path,
                dest_path,
                ..
            } => {
                self.ensure_name_free(dest_path, &item.name, Some(&item.id))?;
                if item.is_folder() {
                    self.ensure_listing_free(dest_path, &item.name)?;
                }
                if !self.apply_move(source_path, dest_path, &item.id, None) {
                    return Err(missing_item(source_path, &item.id));
                }
                Ok(vec![source_path.clone(), dest_path.clone()])
            }
            UndoableAction::Delete {
                item, parent_path, ..
            } => {
                self.detach_subtree(parent_path, &item.id)
                    .ok_or_else(|| missing_item(parent_path, &item.id))?;
                Ok(vec![parent_path.clone()])
            }
        }
    }

    fn publish(&self, dirs: impl IntoIterator<Item = String>, history_changed: bool) {
        let dirs: BTreeSet<String> = dirs.into_iter().collect();
        for dir in dirs {
            self.events.emit(&VfsEvent::DirectoryChanged(dir));
        }
        if history_changed {
            self.events.emit(&VfsEvent::HistoryChanged {
                can_undo: self.history.can_undo(),
                can_redo: self.history.can_redo(),
            });
        }
    }
}

fn insert_entry(listing: &mut Vec<FileSystemEntry>, entry: FileSystemEntry, index: Option<usize>) {
    match index {
        Some(index) => listing.insert(index.min(listing.len()), entry),
        None => listing.push(entry),
    }
}

fn missing_item(path: &str, item_id: &EntryId) -> VfsError {
    VfsError::NotFound(format!("item {item_id} in {path}"))
}

fn validate_name(name: &str) -> Result<String, VfsError> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(&['/', '\\', ':'][..]);
    if invalid {
        return Err(VfsError::InvalidName(name.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use platform_host::ContentEntryKind;
    use pretty_assertions::assert_eq;

    use super::*;

    type Shape = Vec<(String, EntryKind, Option<String>)>;

    fn names(vfs: &VirtualFileSystem, path: &str) -> Vec<String> {
        vfs.listing(path).iter().map(|e| e.name.clone()).collect()
    }

    fn shape(vfs: &VirtualFileSystem) -> BTreeMap<String, Shape> {
        vfs.listings
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(path, entries)| {
                (
                    path.clone(),
                    entries
                        .iter()
                        .map(|e| (e.name.clone(), e.kind, e.content.clone()))
                        .collect(),
                )
            })
            .collect()
    }

    fn id_of(vfs: &VirtualFileSystem, full_path: &str) -> EntryId {
        vfs.resolve(full_path).expect("entry").id.clone()
    }

    #[test]
    fn seeded_tree_matches_demo_drive() {
        let vfs = VirtualFileSystem::seeded();
        assert_eq!(
            names(&vfs, "C:/"),
            vec!["Desktop", "Documents", "Downloads", "Pictures", "Windows", "system.dll"]
        );
        assert_eq!(
            names(&vfs, "E:/"),
            vec!["Backup-2024", "project-files.zip"]
        );
        let readme = vfs.resolve("C:/Documents/readme.txt").expect("readme");
        assert_eq!(readme.size_label.as_deref(), Some("1 KB"));
        assert!(vfs
            .file_content("C:/Documents/readme.txt")
            .expect("content")
            .expect("text")
            .starts_with("This is a test file"));
    }

    #[test]
    fn list_creates_unknown_directories_lazily() {
        let mut vfs = VirtualFileSystem::new();
        assert!(vfs.list("C:/Nowhere/").is_empty());
        assert!(vfs.directory_paths().any(|path| path == "C:/Nowhere"));
    }

    #[test]
    fn resolve_matches_exact_leaf_names() {
        let vfs = VirtualFileSystem::seeded();
        assert_eq!(vfs.resolve("C:/Documents").expect("folder").kind, EntryKind::Folder);
        assert_eq!(
            vfs.resolve("C:/documents"),
            Err(VfsError::NotFound("C:/documents".to_string()))
        );
        assert!(vfs.resolve("C:/").is_err());
        assert!(vfs.is_folder("C:/"));
        assert!(!vfs.is_folder("C:/system.dll"));
    }

    #[test]
    fn create_appends_fresh_entry_and_rejects_duplicates() {
        let mut vfs = VirtualFileSystem::seeded();
        let folder = vfs.create("C:/", EntryKind::Folder, "New Folder").expect("create");

        assert_eq!(names(&vfs, "C:/").last().map(String::as_str), Some("New Folder"));
        assert!(vfs.listing("C:/").iter().filter(|e| e.id == folder.id).count() == 1);
        assert_eq!(
            vfs.create("C:/", EntryKind::File, "Documents"),
            Err(VfsError::NameConflict {
                name: "Documents".to_string(),
                path: "C:/".to_string()
            })
        );
        assert_eq!(
            vfs.create("C:/", EntryKind::File, "  "),
            Err(VfsError::InvalidName("  ".to_string()))
        );
        assert_eq!(vfs.history().undo_len(), 1);
    }

    #[test]
    fn rename_conflict_leaves_listing_and_history_unchanged() {
        let mut vfs = VirtualFileSystem::seeded();
        let documents = id_of(&vfs, "C:/Documents");
        let before = shape(&vfs);

        let err = vfs.rename("C:/", &documents, "Downloads").expect_err("conflict");

        assert!(matches!(err, VfsError::NameConflict { .. }));
        assert_eq!(shape(&vfs), before);
        assert!(!vfs.can_undo());
    }

    #[test]
    fn folder_rename_keeps_descendants_reachable() {
        let mut vfs = VirtualFileSystem::seeded();
        let documents = id_of(&vfs, "C:/Documents");

        vfs.rename("C:/", &documents, "Docs").expect("rename");
        assert!(vfs.resolve("C:/Docs/readme.txt").is_ok());
        assert!(vfs.listing("C:/Documents").is_empty());

        vfs.undo().expect("undo");
        assert!(vfs.resolve("C:/Documents/readme.txt").is_ok());
        vfs.redo().expect("redo");
        assert!(vfs.resolve("C:/Docs/report.docx").is_ok());
    }

    #[test]
    fn renaming_to_same_name_is_not_recorded() {
        let mut vfs = VirtualFileSystem::seeded();
        let documents = id_of(&vfs, "C:/Documents");
        vfs.rename("C:/", &documents, " Documents ").expect("same name");
        assert!(!vfs.can_undo());
    }

    #[test]
    fn move_checks_run_in_order() {
        let mut vfs = VirtualFileSystem::seeded();
        let documents = id_of(&vfs, "C:/Documents");
        let readme = id_of(&vfs, "C:/Documents/readme.txt");

        assert!(matches!(
            vfs.move_entry(&EntryId::new("nope"), "C:/", "E:/"),
            Err(VfsError::NotFound(_))
        ));
        assert_eq!(
            vfs.move_entry(&readme, "C:/Documents", "C:/system.dll"),
            Err(VfsError::NotAFolder("C:/system.dll".to_string()))
        );
        assert!(matches!(
            vfs.move_entry(&readme, "C:/Documents", "C:/Documents"),
            Err(VfsError::SelfMove { .. })
        ));
        assert!(matches!(
            vfs.move_entry(&documents, "C:/", "C:/Documents"),
            Err(VfsError::SelfMove { .. })
        ));
        vfs.create("C:/Downloads", EntryKind::File, "readme.txt")
            .expect("create");
        assert!(matches!(
            vfs.move_entry(&readme, "C:/Documents", "C:/Downloads"),
            Err(VfsError::NameConflict { .. })
        ));
    }

    #[test]
    fn moving_folder_into_its_descendant_fails_without_changes() {
        let mut vfs = VirtualFileSystem::seeded();
        vfs.create("C:/Documents", EntryKind::Folder, "Work").expect("create");
        vfs.create("C:/Documents/Work", EntryKind::Folder, "Deep").expect("create");
        let documents = id_of(&vfs, "C:/Documents");
        let before = shape(&vfs);
        let undo_len = vfs.history().undo_len();

        let err = vfs
            .move_entry(&documents, "C:/", "C:/Documents/Work/Deep")
            .expect_err("cycle");

        assert_eq!(
            err,
            VfsError::SelfMove {
                name: "Documents".to_string()
            }
        );
        assert_eq!(shape(&vfs), before);
        assert_eq!(vfs.history().undo_len(), undo_len);
    }

    #[test]
    fn move_undo_restores_original_position() {
        let mut vfs = VirtualFileSystem::seeded();
        let report = id_of(&vfs, "C:/Documents/report.docx");
        let before = shape(&vfs);

        vfs.move_entry(&report, "C:/Documents", "E:/").expect("move");
        let after = shape(&vfs);
        assert_eq!(names(&vfs, "E:/").last().map(String::as_str), Some("report.docx"));

        vfs.undo().expect("undo");
        assert_eq!(shape(&vfs), before);
        vfs.redo().expect("redo");
        assert_eq!(shape(&vfs), after);
    }

    #[test]
    fn folder_move_carries_descendant_listings_to_other_drive() {
        let mut vfs = VirtualFileSystem::seeded();
        let documents = id_of(&vfs, "C:/Documents");

        vfs.move_entry(&documents, "C:/", "E:/Backup-2024").expect("move");

        assert!(vfs.resolve("E:/Backup-2024/Documents/readme.txt").is_ok());
        assert!(vfs.listing("C:/Documents").is_empty());
    }

    #[test]
    fn nested_folder_delete_round_trips_through_undo_and_redo() {
        let mut vfs = VirtualFileSystem::seeded();
        vfs.create("C:/Documents", EntryKind::Folder, "Work").expect("create");
        vfs.create("C:/Documents/Work", EntryKind::File, "plan.txt").expect("create");
        let documents = id_of(&vfs, "C:/Documents");
        let before = shape(&vfs);

        let snapshot = vfs.remove("C:/", &documents).expect("remove");
        let after = shape(&vfs);
        assert_eq!(snapshot.children.as_ref().map(Vec::len), Some(4));
        assert!(vfs.listing("C:/Documents/Work").is_empty());

        vfs.undo().expect("undo");
        assert_eq!(shape(&vfs), before);
        assert_eq!(names(&vfs, "C:/")[1], "Documents");

        vfs.redo().expect("redo");
        assert_eq!(shape(&vfs), after);
    }

    #[test]
    fn create_and_rename_undo_round_trip() {
        let mut vfs = VirtualFileSystem::seeded();
        let before = shape(&vfs);
        let created = vfs.create("C:/", EntryKind::File, "notes.txt").expect("create");
        let after_create = shape(&vfs);

        vfs.undo().expect("undo");
        assert_eq!(shape(&vfs), before);
        vfs.redo().expect("redo");
        assert_eq!(shape(&vfs), after_create);
        assert_eq!(vfs.resolve("C:/notes.txt").expect("redone").id, created.id);

        vfs.rename("C:/", &created.id, "todo.txt").expect("rename");
        vfs.undo().expect("undo rename");
        assert_eq!(shape(&vfs), after_create);
    }

    #[test]
    fn fresh_mutation_clears_redo_and_empty_history_is_ok() {
        let mut vfs = VirtualFileSystem::seeded();
        assert_eq!(vfs.undo(), Ok(false));
        assert_eq!(vfs.redo(), Ok(false));

        vfs.create("C:/", EntryKind::Folder, "A").expect("create");
        vfs.undo().expect("undo");
        assert!(vfs.can_redo());
        vfs.create("C:/", EntryKind::Folder, "B").expect("create");
        assert!(!vfs.can_redo());
    }

    #[test]
    fn failed_redo_keeps_action_on_redo_stack() {
        let mut vfs = VirtualFileSystem::seeded();
        vfs.create("C:/", EntryKind::Folder, "A").expect("create");
        vfs.undo().expect("undo");
        vfs.ingest_listing(
            "C:/",
            &[ContentEntry {
                name: "A".to_string(),
                kind: ContentEntryKind::Folder,
                size_bytes: None,
                modified_at_unix_ms: None,
                target_path: None,
            }],
        );

        assert!(matches!(vfs.redo(), Err(VfsError::NameConflict { .. })));
        assert!(vfs.can_redo());
        assert_eq!(names(&vfs, "C:/"), vec!["A"]);
    }

    #[test]
    fn unique_and_shortcut_names() {
        let mut vfs = VirtualFileSystem::seeded();
        assert_eq!(vfs.unique_name("C:/", "New Folder"), "New Folder");
        vfs.create("C:/", EntryKind::Folder, "New Folder").expect("create");
        assert_eq!(vfs.unique_name("C:/", "New Folder"), "New Folder (2)");

        let shortcut = vfs
            .create_shortcut("C:/Desktop", "C:/Documents/readme.txt")
            .expect("shortcut");
        assert_eq!(shortcut.name, "readme.txt - Shortcut");
        assert_eq!(shortcut.target_path.as_deref(), Some("C:/Documents/readme.txt"));
        let again = vfs
            .create_shortcut("C:/Desktop", "C:/Documents/readme.txt")
            .expect("shortcut");
        assert_eq!(again.name, "readme.txt - Shortcut (2)");
        assert!(vfs
            .file_content("C:/Desktop/readme.txt - Shortcut")
            .expect("read")
            .is_some());
    }

    #[test]
    fn paste_copy_duplicates_subtree_with_fresh_ids() {
        let mut vfs = VirtualFileSystem::seeded();
        let mut clipboard = ClipboardController::default();
        let documents = vfs.resolve("C:/Documents").expect("folder").clone();
        let original_ids: HashSet<EntryId> =
            vfs.listing("C:/Documents").iter().map(|e| e.id.clone()).collect();

        clipboard.copy(documents, "C:/");
        let copy = vfs.paste(&mut clipboard, "C:/").expect("paste");

        assert_eq!(copy.name, "Documents - Copy");
        assert_eq!(
            names(&vfs, "C:/Documents - Copy"),
            names(&vfs, "C:/Documents")
        );
        assert!(vfs
            .listing("C:/Documents - Copy")
            .iter()
            .all(|e| !original_ids.contains(&e.id)));
        assert!(clipboard.entry().is_some());

        let second = vfs.paste(&mut clipboard, "C:/").expect("paste again");
        assert_eq!(second.name, "Documents - Copy (2)");

        vfs.undo().expect("undo");
        vfs.undo().expect("undo");
        assert!(vfs.listing("C:/Documents - Copy").is_empty());
        vfs.redo().expect("redo");
        assert_eq!(names(&vfs, "C:/Documents - Copy").len(), 3);
    }

    #[test]
    fn paste_copy_keeps_file_extension_after_copy_suffix() {
        let mut vfs = VirtualFileSystem::seeded();
        let mut clipboard = ClipboardController::default();
        let report = vfs.resolve("C:/Documents/report.docx").expect("file").clone();
        clipboard.copy(report, "C:/Documents");

        let copy = vfs.paste(&mut clipboard, "C:/Documents").expect("paste");
        assert_eq!(copy.name, "report - Copy.docx");
    }

    #[test]
    fn paste_cut_moves_and_clears_clipboard() {
        let mut vfs = VirtualFileSystem::seeded();
        let mut clipboard = ClipboardController::default();
        let installer = vfs.resolve("C:/Downloads/installer.exe").expect("file").clone();
        clipboard.cut(installer.clone(), "C:/Downloads");

        let moved = vfs.paste(&mut clipboard, "E:/").expect("paste");

        assert_eq!(moved.id, installer.id);
        assert!(vfs.listing("C:/Downloads").is_empty());
        assert!(clipboard.entry().is_none());
        assert_eq!(
            vfs.paste(&mut clipboard, "E:/"),
            Err(VfsError::EmptyClipboard)
        );
    }

    #[test]
    fn pasting_folder_copy_into_itself_fails() {
        let mut vfs = VirtualFileSystem::seeded();
        let mut clipboard = ClipboardController::default();
        let windows = vfs.resolve("C:/Windows").expect("folder").clone();
        clipboard.copy(windows, "C:/");

        assert!(matches!(
            vfs.paste(&mut clipboard, "C:/Windows/System32"),
            Err(VfsError::SelfMove { .. })
        ));
    }

    #[test]
    fn search_is_case_insensitive_and_reports_directory() {
        let vfs = VirtualFileSystem::seeded();
        let found: Vec<String> = vfs
            .search("C:/", "RE")
            .iter()
            .map(SearchResult::full_path)
            .collect();
        assert_eq!(
            found,
            vec![
                "C:/Pictures",
                "C:/Documents/report.docx",
                "C:/Documents/presentation.pptx",
                "C:/Documents/readme.txt",
            ]
        );
        assert!(vfs.search("C:/", "   ").is_empty());
    }

    #[test]
    fn search_stays_within_root_and_its_subdirectories() {
        let mut vfs = VirtualFileSystem::seeded();
        vfs.create("C:/Documents", EntryKind::Folder, "Reports").expect("create");
        vfs.create("C:/Documents/Reports", EntryKind::File, "q3.txt").expect("create");

        let found: Vec<String> = vfs
            .search("C:/Documents/", "re")
            .iter()
            .map(SearchResult::full_path)
            .collect();
        assert_eq!(
            found,
            vec![
                "C:/Documents/report.docx",
                "C:/Documents/presentation.pptx",
                "C:/Documents/readme.txt",
                "C:/Documents/Reports",
            ]
        );
        assert_eq!(vfs.search("C:/Documents/Reports", "q3").len(), 1);
        assert!(vfs.search("E:/", "readme").is_empty());
    }

    #[test]
    fn create_under_a_file_or_shortcut_is_not_a_folder() {
        let mut vfs = VirtualFileSystem::seeded();
        assert_eq!(
            vfs.create("C:/system.dll", EntryKind::File, "x.txt"),
            Err(VfsError::NotAFolder("C:/system.dll".to_string()))
        );
        vfs.create_shortcut("C:/Desktop", "C:/Documents")
            .expect("shortcut");
        assert_eq!(
            vfs.create_shortcut("C:/Desktop/Documents - Shortcut", "C:/system.dll"),
            Err(VfsError::NotAFolder("C:/Desktop/Documents - Shortcut".to_string()))
        );
        assert!(vfs.listing("C:/system.dll").is_empty());
        assert_eq!(vfs.history().undo_len(), 1);
    }

    #[test]
    fn folder_rename_onto_populated_placeholder_is_refused() {
        let mut vfs = VirtualFileSystem::seeded();
        vfs.list("C:/Docs");
        vfs.create("C:/Docs", EntryKind::File, "a.txt").expect("create");
        let documents = id_of(&vfs, "C:/Documents");
        let before = shape(&vfs);

        assert_eq!(
            vfs.rename("C:/", &documents, "Docs"),
            Err(VfsError::NameConflict {
                name: "Docs".to_string(),
                path: "C:/".to_string()
            })
        );
        assert_eq!(shape(&vfs), before);

        assert_eq!(vfs.undo(), Ok(true));
        assert!(vfs.listing("C:/Docs").is_empty());
        assert_eq!(vfs.undo(), Ok(false));
        assert!(!vfs.can_undo());

        vfs.rename("C:/", &documents, "Docs").expect("placeholder is empty now");
        assert_eq!(names(&vfs, "C:/Docs"), names(&VirtualFileSystem::seeded(), "C:/Documents"));
    }

    #[test]
    fn folder_move_and_delete_undo_refuse_populated_targets() {
        let mut vfs = VirtualFileSystem::seeded();
        let windows = id_of(&vfs, "C:/Windows");
        vfs.list("E:/Windows");
        vfs.create("E:/Windows", EntryKind::File, "stray.txt").expect("create");

        assert!(matches!(
            vfs.move_entry(&windows, "C:/", "E:/"),
            Err(VfsError::NameConflict { .. })
        ));
        assert_eq!(names(&vfs, "C:/Windows"), vec!["System32"]);

        vfs.remove("C:/", &windows).expect("remove");
        vfs.ingest_listing("C:/Windows", &[ContentEntry::file("ghost.txt", 1)]);
        assert!(matches!(vfs.undo(), Err(VfsError::NameConflict { .. })));
        assert_eq!(names(&vfs, "C:/Windows"), vec!["ghost.txt"]);
        assert!(!vfs.is_folder("C:/Windows"));
        assert_eq!(vfs.history().undo_len(), 2);
    }

    #[test]
    fn ingest_listing_keeps_ids_for_unchanged_entries() {
        let mut vfs = VirtualFileSystem::new();
        let reported = vec![
            ContentEntry::folder("Shared"),
            ContentEntry::file("notes.txt", 2048),
        ];
        let first_ids: Vec<EntryId> = vfs
            .ingest_listing("gdrive:/", &reported)
            .iter()
            .map(|e| e.id.clone())
            .collect();
        let listing = vfs.ingest_listing("gdrive:/", &reported).to_vec();

        assert_eq!(
            listing.iter().map(|e| e.id.clone()).collect::<Vec<_>>(),
            first_ids
        );
        assert_eq!(listing[1].size_label.as_deref(), Some("2 KB"));
        assert_eq!(listing[0].size_label, None);
        assert!(!vfs.can_undo());
        assert!(vfs.is_folder("gdrive:/Shared"));
    }

    #[test]
    fn events_report_changed_directories_and_history() {
        let mut vfs = VirtualFileSystem::seeded();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let _subscription = vfs.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        let report = id_of(&vfs, "C:/Documents/report.docx");

        vfs.move_entry(&report, "C:/Documents", "E:/").expect("move");

        assert_eq!(
            *log.borrow(),
            vec![
                VfsEvent::DirectoryChanged("C:/Documents".to_string()),
                VfsEvent::DirectoryChanged("E:/".to_string()),
                VfsEvent::HistoryChanged {
                    can_undo: true,
                    can_redo: false
                },
            ]
        );
    }
}
