//! Filename normalisation shared by the zone reader and the template
//! reader, so a zone's `pac-filename` field and a template's on-disk
//! relative path compare equal regardless of the author's OS.

use std::path::{Component, Path, PathBuf};

/// Replace backslashes with forward slashes, then clean the path
/// (collapsing `.`/`..` components), producing a stable, comparable key.
pub fn normalize_path(raw: &str) -> String {
    let unix_slashes = raw.replace('\\', "/");
    let mut out = PathBuf::new();
    for component in Path::new(&unix_slashes).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    let cleaned = out.to_string_lossy().replace('\\', "/");
    if cleaned.is_empty() {
        ".".to_string()
    } else {
        cleaned
    }
}
