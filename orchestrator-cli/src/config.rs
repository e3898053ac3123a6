//! Configuration loading from environment.

use std::env;
use std::path::PathBuf;

use orchestrator_types::Environment;

const DEFAULT_CATALOG: &str = "config/providers.json";

/// CLI configuration.
pub struct Config {
    pub catalog_path: PathBuf,
    pub environment: Environment,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let catalog_path = env::var("ORCHESTRATOR_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CATALOG.to_string())
            .into();

        let environment = match env::var("ORCHESTRATOR_ENV") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("ORCHESTRATOR_ENV: {}", e))?,
            Err(_) => Environment::Production,
        };

        Ok(Self {
            catalog_path,
            environment,
        })
    }

    /// Command-line flags win over the environment.
    pub fn with_overrides(
        mut self,
        catalog: Option<PathBuf>,
        environment: Option<Environment>,
    ) -> Self {
        if let Some(path) = catalog {
            self.catalog_path = path;
        }
        if let Some(env) = environment {
            self.environment = env;
        }
        self
    }
}
