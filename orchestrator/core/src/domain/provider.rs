// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Provider Configuration
//!
//! Selects which backend family provisions an agent's infrastructure.
//!
//! [`ProviderConfig`] is a closed tagged union: the `provider` field is the
//! discriminator and only the selected variant's settings exist. Adding a
//! provider means adding one variant here and one `match` arm in
//! `application::provider_factory`; the workflows never change.
//!
//! ```yaml
//! provider: local
//! ollama_url: http://localhost:11434
//! model: codellama:7b-instruct
//! chroma_url: http://localhost:8000
//! embedding_model: nomic-embed-text
//! ```
//!
//! [`AiConfigurationRequest`] is the loosely typed shape callers submit. It is
//! resolved against the platform defaults into a [`ProviderConfig`] before
//! anything else happens, so an unknown provider name surfaces as a
//! [`ConfigError`] rather than a panic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend family discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Managed cloud AI provider (AWS Bedrock knowledge bases and agents)
    #[serde(rename = "bedrock")]
    ManagedCloud,
    /// Self-hosted stack (Ollama + ChromaDB)
    #[serde(rename = "local")]
    Local,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::ManagedCloud, ProviderKind::Local];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::ManagedCloud => "bedrock",
            ProviderKind::Local => "local",
        }
    }

    /// Human-facing name used in log lines and error messages
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::ManagedCloud => "Bedrock",
            ProviderKind::Local => "local",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bedrock" => Ok(ProviderKind::ManagedCloud),
            "local" => Ok(ProviderKind::Local),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Settings for the managed cloud provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedCloudConfig {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub foundation_model: String,
    #[serde(default)]
    pub agent_service_role_arn: String,
    #[serde(default)]
    pub knowledge_base_service_role_arn: String,
    #[serde(default)]
    pub s3_bucket_name: String,
}

/// Settings for the self-hosted provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default)]
    pub ollama_url: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub chroma_url: String,
    #[serde(default)]
    pub embedding_model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum ProviderConfig {
    #[serde(rename = "bedrock")]
    ManagedCloud(ManagedCloudConfig),
    #[serde(rename = "local")]
    Local(LocalConfig),
}

impl ProviderConfig {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderConfig::ManagedCloud(_) => ProviderKind::ManagedCloud,
            ProviderConfig::Local(_) => ProviderKind::Local,
        }
    }

    /// Side-effect-free check of the selected variant's required settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            ProviderConfig::ManagedCloud(config) => {
                require(ProviderKind::ManagedCloud, "region", &config.region)?;
                require(ProviderKind::ManagedCloud, "foundation model", &config.foundation_model)?;
                require(
                    ProviderKind::ManagedCloud,
                    "agent service role ARN",
                    &config.agent_service_role_arn,
                )?;
                Ok(())
            }
            ProviderConfig::Local(config) => {
                require(ProviderKind::Local, "Ollama URL", &config.ollama_url)?;
                require(ProviderKind::Local, "model", &config.model)?;
                Ok(())
            }
        }
    }

    /// Provider metadata recorded next to the created resources
    pub fn metadata(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut metadata = serde_json::Map::new();
        metadata.insert("provider".into(), self.kind().as_str().into());
        match self {
            ProviderConfig::ManagedCloud(config) => {
                metadata.insert("region".into(), config.region.clone().into());
                metadata.insert("model".into(), config.foundation_model.clone().into());
                metadata.insert("service_role".into(), config.agent_service_role_arn.clone().into());
                metadata.insert("s3_bucket".into(), config.s3_bucket_name.clone().into());
            }
            ProviderConfig::Local(config) => {
                metadata.insert("ollama_url".into(), config.ollama_url.clone().into());
                metadata.insert("model".into(), config.model.clone().into());
                metadata.insert("chroma_url".into(), config.chroma_url.clone().into());
            }
        }
        metadata
    }
}

fn require(provider: ProviderKind, field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField { provider, field });
    }
    Ok(())
}

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_LOCAL_MODEL: &str = "codellama:7b-instruct";
pub const DEFAULT_CHROMA_URL: &str = "http://localhost:8000";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Platform-level provider settings that requests are layered on top of
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDefaults {
    /// Provider used when a request does not name one
    #[serde(default = "default_provider")]
    pub default_provider: String,

    #[serde(default)]
    pub bedrock: ManagedCloudConfig,

    #[serde(default = "default_local")]
    pub local: LocalConfig,
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            bedrock: ManagedCloudConfig::default(),
            local: default_local(),
        }
    }
}

fn default_local() -> LocalConfig {
    LocalConfig {
        ollama_url: DEFAULT_OLLAMA_URL.to_string(),
        model: DEFAULT_LOCAL_MODEL.to_string(),
        chroma_url: DEFAULT_CHROMA_URL.to_string(),
        embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
    }
}

fn default_provider() -> String {
    ProviderKind::Local.as_str().to_string()
}

/// Provider selection as submitted by a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiConfigurationRequest {
    #[serde(default)]
    pub provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrock: Option<ManagedCloudConfig>,
}

impl AiConfigurationRequest {
    /// Resolve against platform defaults. Non-empty request fields win.
    pub fn resolve(&self, defaults: &ProviderDefaults) -> Result<ProviderConfig, ConfigError> {
        let name = if self.provider.trim().is_empty() {
            defaults.default_provider.as_str()
        } else {
            self.provider.as_str()
        };

        match name.parse::<ProviderKind>()? {
            ProviderKind::ManagedCloud => {
                let mut config = defaults.bedrock.clone();
                if let Some(requested) = &self.bedrock {
                    overlay(&mut config.region, &requested.region);
                    overlay(&mut config.foundation_model, &requested.foundation_model);
                    overlay(&mut config.agent_service_role_arn, &requested.agent_service_role_arn);
                    overlay(
                        &mut config.knowledge_base_service_role_arn,
                        &requested.knowledge_base_service_role_arn,
                    );
                    overlay(&mut config.s3_bucket_name, &requested.s3_bucket_name);
                }
                Ok(ProviderConfig::ManagedCloud(config))
            }
            ProviderKind::Local => {
                let mut config = defaults.local.clone();
                if let Some(requested) = &self.local {
                    overlay(&mut config.ollama_url, &requested.ollama_url);
                    overlay(&mut config.model, &requested.model);
                    overlay(&mut config.chroma_url, &requested.chroma_url);
                    overlay(&mut config.embedding_model, &requested.embedding_model);
                }
                Ok(ProviderConfig::Local(config))
            }
        }
    }
}

fn overlay(target: &mut String, value: &str) {
    if !value.trim().is_empty() {
        *target = value.to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported AI provider: {0}")]
    UnsupportedProvider(String),

    #[error("{provider} {field} is required")]
    MissingField {
        provider: ProviderKind,
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_bedrock() -> ManagedCloudConfig {
        ManagedCloudConfig {
            region: "us-west-2".to_string(),
            foundation_model: "amazon.titan-tg1-large".to_string(),
            agent_service_role_arn: "arn:aws:iam::123456789012:role/agent".to_string(),
            knowledge_base_service_role_arn: String::new(),
            s3_bucket_name: "codebases".to_string(),
        }
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("bedrock".parse::<ProviderKind>().unwrap(), ProviderKind::ManagedCloud);
        assert_eq!(" Local ".parse::<ProviderKind>().unwrap(), ProviderKind::Local);
        assert_eq!(
            "openai".parse::<ProviderKind>(),
            Err(ConfigError::UnsupportedProvider("openai".to_string()))
        );
    }

    #[test]
    fn test_validate_checks_only_selected_variant() {
        assert!(ProviderConfig::ManagedCloud(valid_bedrock()).validate().is_ok());

        let mut missing_region = valid_bedrock();
        missing_region.region.clear();
        let err = ProviderConfig::ManagedCloud(missing_region).validate().unwrap_err();
        assert_eq!(err.to_string(), "bedrock region is required");

        let local = ProviderConfig::Local(LocalConfig {
            ollama_url: "http://localhost:11434".to_string(),
            model: String::new(),
            ..LocalConfig::default()
        });
        assert_eq!(local.validate().unwrap_err().to_string(), "local model is required");
    }

    #[test]
    fn test_tagged_yaml_parsing() {
        let yaml = r#"
provider: local
ollama_url: http://ollama:11434
model: llama3.2
"#;
        let config: ProviderConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.kind(), ProviderKind::Local);
        assert!(config.validate().is_ok());

        let unknown = serde_yaml::from_str::<ProviderConfig>("provider: openai\n");
        assert!(unknown.is_err());
    }

    #[test]
    fn test_resolve_overlays_request_on_defaults() {
        let defaults = ProviderDefaults::default();
        let request = AiConfigurationRequest {
            provider: "local".to_string(),
            local: Some(LocalConfig {
                model: "llama3.2".to_string(),
                ..LocalConfig::default()
            }),
            bedrock: None,
        };

        match request.resolve(&defaults).unwrap() {
            ProviderConfig::Local(config) => {
                assert_eq!(config.model, "llama3.2");
                assert_eq!(config.ollama_url, "http://localhost:11434");
            }
            other => panic!("unexpected provider: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_uses_configured_default_provider() {
        let defaults = ProviderDefaults {
            default_provider: "bedrock".to_string(),
            bedrock: valid_bedrock(),
            local: LocalConfig::default(),
        };

        let config = AiConfigurationRequest::default().resolve(&defaults).unwrap();
        assert_eq!(config.kind(), ProviderKind::ManagedCloud);
    }

    #[test]
    fn test_resolve_rejects_unknown_provider() {
        let request = AiConfigurationRequest {
            provider: "openai".to_string(),
            ..AiConfigurationRequest::default()
        };
        assert!(matches!(
            request.resolve(&ProviderDefaults::default()),
            Err(ConfigError::UnsupportedProvider(_))
        ));
    }
}
