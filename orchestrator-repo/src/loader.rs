//! JSON file loaders.

use std::path::Path;

use anyhow::Context;
use orchestrator_types::{Catalog, CatalogConfig, Operation};

/// Reads and validates the provider catalogue at `path`.
pub fn load_catalog(path: impl AsRef<Path>) -> anyhow::Result<Catalog> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalogue {}", path.display()))?;
    parse_catalog(&raw).with_context(|| format!("Invalid catalogue {}", path.display()))
}

pub fn parse_catalog(raw: &str) -> anyhow::Result<Catalog> {
    let config: CatalogConfig =
        serde_json::from_str(raw).context("Failed to parse catalogue JSON")?;
    Ok(Catalog::from_config(config)?)
}

/// Reads an operation snapshot, transactions included.
pub fn load_operation(path: impl AsRef<Path>) -> anyhow::Result<Operation> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read operation {}", path.display()))?;
    parse_operation(&raw).with_context(|| format!("Invalid operation {}", path.display()))
}

pub fn parse_operation(raw: &str) -> anyhow::Result<Operation> {
    serde_json::from_str(raw).context("Failed to parse operation JSON")
}
