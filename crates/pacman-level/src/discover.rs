use std::path::{Path, PathBuf};

/// List the `*.lvl` files directly under `dir`, sorted lexicographically
/// by file name.
///
/// Levels advance in this order and only this order -- the session
/// never shuffles or re-reads the directory mid-game, so the ordering
/// has to be both deterministic and independent of the filesystem's own
/// (unspecified) directory-entry order.
pub fn discover_levels(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut levels: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("lvl"))
        .collect();
    levels.sort();
    Ok(levels)
}
