//! Demo drive contents loaded into a fresh filesystem.

use super::entry::EntryKind;

pub(super) struct SeedEntry {
    pub name: &'static str,
    pub kind: EntryKind,
    pub size_label: Option<&'static str>,
    pub modified_label: &'static str,
    pub content: Option<&'static str>,
}

const fn folder(name: &'static str, modified_label: &'static str) -> SeedEntry {
    SeedEntry {
        name,
        kind: EntryKind::Folder,
        size_label: None,
        modified_label,
        content: None,
    }
}

const fn file(name: &'static str, size: &'static str, modified_label: &'static str) -> SeedEntry {
    SeedEntry {
        name,
        kind: EntryKind::File,
        size_label: Some(size),
        modified_label,
        content: None,
    }
}

pub(super) const README_TEXT: &str = "This is a test file for the WebOS project.\n\n\
You can drag this file onto the Notepad icon to open it.";

/// Listings in load order, keyed by normalized directory path.
pub(super) const SEED_TREE: &[(&str, &[SeedEntry])] = &[
    (
        "C:/",
        &[
            folder("Desktop", "7/21/2024 09:00 AM"),
            folder("Documents", "7/20/2024 10:00 AM"),
            folder("Downloads", "7/20/2024 11:30 AM"),
            folder("Pictures", "7/19/2024 05:20 PM"),
            folder("Windows", "6/1/2024 08:00 AM"),
            file("system.dll", "2.1 MB", "6/1/2024 09:00 AM"),
        ],
    ),
    (
        "C:/Documents",
        &[
            file("report.docx", "128 KB", "7/20/2024 10:05 AM"),
            file("presentation.pptx", "4.5 MB", "7/18/2024 02:45 PM"),
            SeedEntry {
                name: "readme.txt",
                kind: EntryKind::File,
                size_label: Some("1 KB"),
                modified_label: "7/21/2024 01:15 PM",
                content: Some(README_TEXT),
            },
        ],
    ),
    (
        "C:/Downloads",
        &[file("installer.exe", "15.2 MB", "7/20/2024 11:31 AM")],
    ),
    (
        "C:/Pictures",
        &[file("vacation.jpg", "3.8 MB", "7/19/2024 05:22 PM")],
    ),
    ("C:/Windows", &[folder("System32", "6/1/2024 08:00 AM")]),
    (
        "E:/",
        &[
            folder("Backup-2024", "7/15/2024 01:00 PM"),
            file("project-files.zip", "256 MB", "7/14/2024 03:00 PM"),
        ],
    ),
];
