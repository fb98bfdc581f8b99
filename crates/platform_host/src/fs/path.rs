//! Virtual-path helpers shared by the filesystem core and provider adapters.
//!
//! Paths are either drive-rooted (`C:/Documents`, `gdrive:/folder`) or slash-rooted
//! (`/notes`). Roots always keep their trailing slash; every other normalized path has none.

/// Normalizes a virtual path.
///
/// Trims whitespace, converts backslashes to `/`, resolves `.`/`..`, collapses repeated
/// separators, and keeps the drive or provider prefix (`C:`, `gdrive:`) when present. Empty
/// input normalizes to `/`.
pub fn normalize_virtual_path(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let (scheme, rest) = split_scheme(&unified);

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let root = match scheme {
        Some(scheme) => format!("{scheme}:/"),
        None => "/".to_string(),
    };
    format!("{root}{}", segments.join("/"))
}

/// Returns the drive letter or provider scheme of `path` (`C`, `gdrive`), if any.
pub fn path_scheme(path: &str) -> Option<&str> {
    split_scheme(path.trim()).0
}

/// Returns `true` for drive/provider roots (`C:/`, `gdrive:/`) and `/`.
pub fn is_root_path(path: &str) -> bool {
    normalize_virtual_path(path).ends_with('/')
}

/// Joins a directory path and an entry name with exactly one separator.
pub fn join_virtual_path(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Splits a full path into its parent directory and leaf name.
///
/// Returns `None` for roots, which have no parent.
pub fn split_virtual_path(full_path: &str) -> Option<(String, String)> {
    let normalized = normalize_virtual_path(full_path);
    if normalized.ends_with('/') {
        return None;
    }
    let idx = normalized.rfind('/')?;
    let (dir, leaf) = (&normalized[..idx], &normalized[idx + 1..]);
    let dir = if dir.is_empty() {
        "/".to_string()
    } else if dir.ends_with(':') {
        format!("{dir}/")
    } else {
        dir.to_string()
    };
    Some((dir, leaf.to_string()))
}

/// Returns the leaf name of `path`, or the normalized root itself for roots.
pub fn virtual_file_name(path: &str) -> String {
    match split_virtual_path(path) {
        Some((_, leaf)) => leaf,
        None => normalize_virtual_path(path),
    }
}

/// Returns `true` when `path` equals `ancestor` or lives anywhere beneath it.
pub fn is_same_or_descendant(path: &str, ancestor: &str) -> bool {
    let path = normalize_virtual_path(path);
    let ancestor = normalize_virtual_path(ancestor);
    if path == ancestor {
        return true;
    }
    let prefix = if ancestor.ends_with('/') {
        ancestor
    } else {
        format!("{ancestor}/")
    };
    path.starts_with(&prefix)
}

/// Rewrites `path` from under `from` to under `to`.
///
/// Both prefixes are expected to be normalized. Returns `None` when `path` is not `from` or one
/// of its descendants.
pub fn rebase_virtual_path(path: &str, from: &str, to: &str) -> Option<String> {
    if path == from {
        return Some(to.to_string());
    }
    let prefix = if from.ends_with('/') {
        from.to_string()
    } else {
        format!("{from}/")
    };
    path.strip_prefix(&prefix)
        .map(|rest| join_virtual_path(to, rest))
}

fn split_scheme(path: &str) -> (Option<&str>, &str) {
    let first_slash = path.find('/').unwrap_or(path.len());
    match path[..first_slash].find(':') {
        Some(idx) if idx > 0 => (Some(&path[..idx]), &path[idx + 1..]),
        _ => (None, path),
    }
}
