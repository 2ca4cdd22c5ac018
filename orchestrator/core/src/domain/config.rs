// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Forge Configuration Types
//
// Defines the configuration schema for an agentforge installation:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Git credentials and the workspace root for working copies
// - Platform provider defaults that requests are layered on
// - Record storage backend selection
// - Logging settings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::provider::{ProviderDefaults, ProviderKind};
use crate::domain::repository::{PostgresConfig, StorageBackend};

pub const API_VERSION: &str = "100monkeys.ai/v1";
pub const KIND: &str = "ForgeConfig";

/// Top-level Kubernetes-style configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeConfigManifest {
    /// API version (must be "100monkeys.ai/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "ForgeConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: ForgeConfigSpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForgeConfigSpec {
    #[serde(default)]
    pub git: GitConfig,

    /// Platform defaults for every supported provider
    #[serde(default)]
    pub providers: ProviderDefaults,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Access token for private repositories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Directory that holds one working copy per provisioning run
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            token: None,
            workspace_root: default_workspace_root(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    #[default]
    InMemory,
    Postgres { connection_string: String },
}

impl StorageConfig {
    pub fn backend(&self) -> StorageBackend {
        match self {
            StorageConfig::InMemory => StorageBackend::InMemory,
            StorageConfig::Postgres { connection_string } => {
                StorageBackend::PostgreSQL(PostgresConfig {
                    connection_string: connection_string.clone(),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("compact" or "json")
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_workspace_root() -> PathBuf {
    std::env::temp_dir().join("agentforge")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for ForgeConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "agentforge".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: ForgeConfigSpec::default(),
        }
    }
}

impl ForgeConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. AGENTFORGE_CONFIG_PATH environment variable
    /// 2. ./agentforge-config.yaml (working directory)
    /// 3. ~/.agentforge/config.yaml (user home)
    /// 4. /etc/agentforge/config.yaml (system, Unix) or C:\ProgramData\AgentForge\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("AGENTFORGE_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./agentforge-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".agentforge").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/agentforge/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\AgentForge\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails if missing or invalid
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(token) = get("AGENTFORGE_GIT_TOKEN") {
            tracing::info!("Environment override: AGENTFORGE_GIT_TOKEN=<redacted>");
            self.spec.git.token = Some(token);
        }

        if let Some(dir) = get("AGENTFORGE_WORKSPACE_DIR") {
            tracing::info!("Environment override: AGENTFORGE_WORKSPACE_DIR={}", dir);
            self.spec.git.workspace_root = PathBuf::from(dir);
        }

        if let Some(url) = get("AGENTFORGE_OLLAMA_URL") {
            tracing::info!("Environment override: AGENTFORGE_OLLAMA_URL={}", url);
            self.spec.providers.local.ollama_url = url;
        }

        if let Some(url) = get("AGENTFORGE_CHROMA_URL") {
            tracing::info!("Environment override: AGENTFORGE_CHROMA_URL={}", url);
            self.spec.providers.local.chroma_url = url;
        }

        if let Some(connection_string) = get("AGENTFORGE_DATABASE_URL") {
            tracing::info!("Environment override: AGENTFORGE_DATABASE_URL=<redacted>");
            self.spec.storage = StorageConfig::Postgres { connection_string };
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        self.spec
            .providers
            .default_provider
            .parse::<ProviderKind>()
            .map_err(|e| anyhow::anyhow!("spec.providers.default_provider: {}", e))?;

        if let StorageConfig::Postgres { connection_string } = &self.spec.storage {
            if connection_string.is_empty() {
                anyhow::bail!("spec.storage.connection_string cannot be empty for postgres");
            }
        }

        match self.spec.observability.logging.format.as_str() {
            "compact" | "json" => {}
            other => anyhow::bail!(
                "Invalid logging format: '{}'. Must be 'compact' or 'json'",
                other
            ),
        }

        Ok(())
    }
}
