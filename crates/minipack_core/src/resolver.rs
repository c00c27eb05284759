use log::trace;
use path_clean::clean;
use std::path::{Path, PathBuf};

/// Joins `specifier` onto `dir` and cleans the result lexically.
///
/// This is the only resolution strategy: no node_modules lookup and no extension
/// or index-file probing. A leading `/` does not escape `dir`, the specifier is
/// always appended to it.
pub fn resolve(dir: &Path, specifier: &str) -> PathBuf {
    let relative = specifier.trim_start_matches(['/', '\\']);
    let resolved = clean(dir.join(relative));
    trace!("Resolved '{}' from {} to {}", specifier, dir.display(), resolved.display());
    resolved
}

/// Directory used to resolve the dependencies of `file`.
pub fn dirname(file: &Path) -> &Path {
    file.parent().unwrap_or_else(|| Path::new(""))
}

/// Key under which a resolved path is considered the same module.
pub(crate) fn identity_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| clean(path))
}
