//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// Directory holding the database file of a `sqlite:` URL, if any.
///
/// In-memory URLs and non-sqlite URLs yield `None`.
pub fn sqlite_parent_dir(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("sqlite:")?;
    let rest = rest.trim_start_matches("//");
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Ensure the directory a file-backed sqlite database lives in exists.
pub async fn ensure_database_dir(url: &str) -> anyhow::Result<()> {
    let Some(dir) = sqlite_parent_dir(url) else {
        return Ok(());
    };
    if tokio::fs::metadata(&dir).await.is_ok() {
        return Ok(());
    }
    warn!(dir = %dir.display(), "database directory not found; creating it");
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    info!(dir = %dir.display(), "database directory created");
    Ok(())
}
