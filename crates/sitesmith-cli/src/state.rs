//! Snapshot file backing the in-memory platform between invocations.

use std::path::Path;

use anyhow::{Context, Result};
use sitesmith_db_memory::{InMemoryPlatform, PlatformSnapshot};
use tracing::debug;

/// Loads the platform from `path`, or starts empty when the file is absent.
pub fn load_platform(path: &Path) -> Result<InMemoryPlatform> {
    if !path.exists() {
        debug!(path = %path.display(), "No snapshot, starting empty");
        return Ok(InMemoryPlatform::new());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let snapshot: PlatformSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    debug!(path = %path.display(), scopes = snapshot.scopes.len(), "Snapshot loaded");
    Ok(InMemoryPlatform::from_snapshot(snapshot))
}

pub fn save_platform(platform: &InMemoryPlatform, path: &Path) -> Result<()> {
    let raw = serde_json::to_string_pretty(&platform.snapshot())?;
    std::fs::write(path, raw).with_context(|| format!("writing snapshot {}", path.display()))?;
    debug!(path = %path.display(), "Snapshot saved");
    Ok(())
}
