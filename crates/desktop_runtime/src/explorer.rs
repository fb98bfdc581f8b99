//! Explorer view state: current directory, sidebar, and async-safe remote navigation.
//!
//! Local paths list straight from the [`VirtualFileSystem`](crate::vfs::VirtualFileSystem).
//! Remote listings are fetched through host providers; each remote navigation hands out a
//! [`NavigationTicket`] and results whose ticket no longer matches the view are discarded.

use leptos::logging::{log, warn};
use platform_host::{
    normalize_virtual_path, AuthStatusProvider, CloudProvider, ContentEntry, ContentProvider,
};

use crate::drives::NetworkDrives;
use crate::vfs::{FileSystemEntry, SearchResult};

/// Directory shown when an explorer opens or a cloud login fails.
pub const HOME_PATH: &str = "C:/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarItem {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarSection {
    pub name: &'static str,
    pub items: Vec<SidebarItem>,
}

fn section(name: &'static str, items: &[(&str, &str)]) -> SidebarSection {
    SidebarSection {
        name,
        items: items
            .iter()
            .map(|(name, path)| SidebarItem {
                name: (*name).to_string(),
                path: (*path).to_string(),
            })
            .collect(),
    }
}

/// Sidebar sections; "Network Locations" is only present while drives are mounted.
pub fn sidebar_sections(drives: &NetworkDrives) -> Vec<SidebarSection> {
    let mut sections = vec![
        section(
            "Favorites",
            &[
                ("Desktop", "C:/Desktop"),
                ("Documents", "C:/Documents"),
                ("Downloads", "C:/Downloads"),
                ("Pictures", "C:/Pictures"),
            ],
        ),
        section(
            "Devices & Drives",
            &[("OS (C:)", "C:/"), ("External Drive (E:)", "E:/")],
        ),
        SidebarSection {
            name: "Cloud Storage",
            items: CloudProvider::ALL
                .into_iter()
                .map(|provider| SidebarItem {
                    name: provider.display_name().to_string(),
                    path: provider.root_path().to_string(),
                })
                .collect(),
        },
    ];
    if !drives.is_empty() {
        sections.push(SidebarSection {
            name: "Network Locations",
            items: drives
                .drives()
                .iter()
                .map(|drive| SidebarItem {
                    name: drive.name.clone(),
                    path: drive.path.clone(),
                })
                .collect(),
        });
    }
    sections
}

/// Identifies one pending remote navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTicket {
    pub generation: u64,
    pub path: String,
}

/// Outcome of [`fetch_remote_listing`], applied with `DesktopShell::finish_navigation`.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteFetch {
    Listed {
        ticket: NavigationTicket,
        entries: Vec<ContentEntry>,
    },
    LoginFailed {
        ticket: NavigationTicket,
        provider: CloudProvider,
        reason: String,
    },
    ListingFailed {
        ticket: NavigationTicket,
        reason: String,
    },
}

impl RemoteFetch {
    pub fn ticket(&self) -> &NavigationTicket {
        match self {
            Self::Listed { ticket, .. }
            | Self::LoginFailed { ticket, .. }
            | Self::ListingFailed { ticket, .. } => ticket,
        }
    }
}

/// Logs in if required, then lists the ticket's path. Borrows only the host providers so the
/// shell stays free for other commands while the future is pending.
pub async fn fetch_remote_listing(
    content: &dyn ContentProvider,
    auth: &dyn AuthStatusProvider,
    ticket: NavigationTicket,
    login_with: Option<CloudProvider>,
) -> RemoteFetch {
    if let Some(provider) = login_with {
        if let Err(reason) = auth.login(provider).await {
            return RemoteFetch::LoginFailed {
                ticket,
                provider,
                reason,
            };
        }
    }
    match content.list(&ticket.path).await {
        Ok(listing) => RemoteFetch::Listed {
            ticket,
            entries: listing.entries,
        },
        Err(reason) => RemoteFetch::ListingFailed { ticket, reason },
    }
}

/// Search results for the explorer's current directory and its subdirectories.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerSearch {
    pub term: String,
    pub root: String,
    pub results: Vec<SearchResult>,
}

impl ExplorerSearch {
    pub fn summary(&self) -> String {
        format!(
            "Found {} item(s) matching \"{}\" in {} and subdirectories",
            self.results.len(),
            self.term,
            self.root
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerView {
    current_path: String,
    entries: Vec<FileSystemEntry>,
    stable_path: String,
    stable_entries: Vec<FileSystemEntry>,
    generation: u64,
    loading: bool,
    search: Option<ExplorerSearch>,
}

impl Default for ExplorerView {
    fn default() -> Self {
        Self {
            current_path: HOME_PATH.to_string(),
            entries: Vec::new(),
            stable_path: HOME_PATH.to_string(),
            stable_entries: Vec::new(),
            generation: 0,
            loading: false,
            search: None,
        }
    }
}

impl ExplorerView {
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn entries(&self) -> &[FileSystemEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn search(&self) -> Option<&ExplorerSearch> {
        self.search.as_ref()
    }

    /// Replaces the search results. A blank term clears them.
    pub fn set_search(&mut self, term: &str, results: Vec<SearchResult>) {
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| ExplorerSearch {
            term: term.to_string(),
            root: self.current_path.clone(),
            results,
        });
    }

    /// Shows a completed listing and supersedes any pending remote navigation.
    pub fn show(&mut self, path: &str, entries: Vec<FileSystemEntry>) {
        self.generation += 1;
        self.apply(normalize_virtual_path(path), entries);
    }

    /// Switches to an empty, loading view of `path` and returns its ticket.
    pub fn begin_remote(&mut self, path: &str) -> NavigationTicket {
        self.generation += 1;
        self.current_path = normalize_virtual_path(path);
        self.entries.clear();
        self.search = None;
        self.loading = true;
        NavigationTicket {
            generation: self.generation,
            path: self.current_path.clone(),
        }
    }

    pub fn is_current(&self, ticket: &NavigationTicket) -> bool {
        ticket.generation == self.generation && ticket.path == self.current_path
    }

    /// Applies a remote listing. Returns `false` (and changes nothing) for stale tickets.
    pub fn complete(&mut self, ticket: &NavigationTicket, entries: Vec<FileSystemEntry>) -> bool {
        if !self.is_current(ticket) {
            log!("discarding stale listing for {}", ticket.path);
            return false;
        }
        self.apply(ticket.path.clone(), entries);
        true
    }

    /// Returns to the last stable view after a failed remote navigation.
    pub fn fail(&mut self, ticket: &NavigationTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        warn!("navigation to {} failed; restoring {}", ticket.path, self.stable_path);
        self.generation += 1;
        self.current_path = self.stable_path.clone();
        self.entries = self.stable_entries.clone();
        self.loading = false;
        true
    }

    fn apply(&mut self, path: String, entries: Vec<FileSystemEntry>) {
        if self.current_path != path {
            self.search = None;
        }
        self.stable_path = path.clone();
        self.stable_entries = entries.clone();
        self.current_path = path;
        self.entries = entries;
        self.loading = false;
    }
}
