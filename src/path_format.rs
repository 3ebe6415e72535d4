//! Path strings for the clipboard.
use std::path::Path;

/// Joins the vault root and a vault-relative path with the host separator.
///
/// The relative path is `/`-separated; each segment is pushed so the result
/// uses the platform's separator throughout. `..` segments are kept as-is.
pub fn copy_full(vault_root: &Path, relative_path: &str) -> String {
    let mut full = vault_root.to_path_buf();
    for segment in relative_path.split('/').filter(|s| !s.is_empty()) {
        full.push(segment);
    }
    full.display().to_string()
}

/// The vault-relative path, unchanged.
pub fn copy_relative(relative_path: &str) -> String {
    relative_path.to_string()
}
