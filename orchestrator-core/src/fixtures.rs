//! Shared test fixtures.

use std::sync::Arc;

use orchestrator_types::{Catalog, CatalogConfig};

const SAMPLE: &str = include_str!("../../config/providers.json");

/// The sample catalogue shipped in `config/providers.json`.
pub fn catalog() -> Arc<Catalog> {
    let config: CatalogConfig = serde_json::from_str(SAMPLE).unwrap();
    Arc::new(Catalog::from_config(config).unwrap())
}
