//! UTF-8 path file helpers built on `cap-std` and `camino`.
//!
//! Every helper resolves its target through an ambient directory handle, so
//! callers work with `Utf8Path` values end to end.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use std::io;

/// Open an existing file for reading.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Create or truncate the file at `path` and write `contents` to it.
///
/// The parent directory must already exist; see [`ensure_parent_dir`].
pub fn write_utf8_file(path: &Utf8Path, contents: &str) -> io::Result<()> {
    let (dir, file_name) = open_parent_dir(path)?;
    dir.write(file_name.as_str(), contents)
}

/// Create every missing directory above `path`.
///
/// Creation starts from the nearest ancestor that already exists, so only
/// the missing tail is created.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    let existing = parent
        .ancestors()
        .find(|ancestor| ancestor.as_str().is_empty() || ancestor.is_dir())
        .unwrap_or(Utf8Path::new(""));
    let missing = parent
        .strip_prefix(existing)
        .map_err(|_| io::Error::other(format!("{existing} is not an ancestor of {parent}")))?;
    if missing.as_str().is_empty() {
        return Ok(());
    }

    let base = if existing.as_str().is_empty() {
        Utf8Path::new(".")
    } else {
        existing
    };
    fs_utf8::Dir::open_ambient_dir(base, ambient_authority())?.create_dir_all(missing)
}

fn open_parent_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}
