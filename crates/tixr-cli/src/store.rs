//! # Snapshot File Store
//!
//! Loads and saves the registry as a pretty-printed JSON
//! [`RegistrySnapshot`]. A missing file loads as an empty registry; a
//! present-but-invalid file is an error (never silently replaced).

use std::path::Path;

use anyhow::Context;

use tixr_registry::{RegistrySnapshot, TicketRegistry};

/// Load a registry from `path`, or an empty one if the file does not exist.
pub fn load(path: &Path) -> anyhow::Result<TicketRegistry> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no snapshot file, starting empty");
        return Ok(TicketRegistry::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let snapshot: RegistrySnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    let registry = TicketRegistry::from_snapshot(&snapshot)
        .with_context(|| format!("validating snapshot {}", path.display()))?;
    Ok(registry)
}

/// Write `registry`'s snapshot to `path` as pretty-printed JSON.
pub fn save(path: &Path, registry: &TicketRegistry) -> anyhow::Result<()> {
    let snapshot = registry.snapshot();
    let json = serde_json::to_string_pretty(&snapshot).context("serializing snapshot")?;
    std::fs::write(path, json)
        .with_context(|| format!("writing snapshot {}", path.display()))?;
    Ok(())
}
