// src/watch/path_utils.rs

use std::path::Path;

/// `path` relative to `root`, with forward slashes, as the route globs
/// expect.
///
/// Falls back to comparing canonicalized paths, since notify may report a
/// different absolute spelling of the same directory (symlinks,
/// `/private/var` on macOS). `None` if `path` is outside `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    // Removed files cannot be canonicalized; try their parent instead.
    let path_canon = match path.canonicalize() {
        Ok(p) => p,
        Err(_) => {
            let parent = path.parent()?.canonicalize().ok()?;
            parent.join(path.file_name()?)
        }
    };

    path_canon
        .strip_prefix(&root_canon)
        .ok()
        .map(to_slash)
}

fn to_slash(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
