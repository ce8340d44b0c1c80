//! LLM integration for the email classifier.
//!
//! Supports:
//! - **OpenAI**: Direct API access via rig-core (default)
//! - **Anthropic**: Direct API access via rig-core
//!
//! Uses the rig-core crate for HTTP transport and the `RigAdapter` to bridge
//! rig's `CompletionModel` trait to our `LlmProvider` trait. A provider is
//! built per request through [`ProviderFactory`], so missing credentials
//! surface as a configuration error on the request instead of at startup.

pub mod provider;
mod rig_adapter;

pub use provider::*;
pub use rig_adapter::RigAdapter;

use std::str::FromStr;
use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::ExposeSecret;

use crate::error::{ConfigError, LlmError};

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
    Anthropic,
}

impl LlmBackend {
    /// Provider name used in logs and errors.
    pub fn label(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding the credential for this backend.
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-latest",
        }
    }
}

impl FromStr for LlmBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(ConfigError::InvalidValue {
                key: "LLM_BACKEND".to_string(),
                message: format!("unknown backend '{}' (expected openai or anthropic)", other),
            }),
        }
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: Option<secrecy::SecretString>,
    pub model: String,
}

impl ProviderFactory for LlmConfig {
    fn create(&self) -> Result<Arc<dyn LlmProvider>, LlmError> {
        create_provider(self)
    }
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let Some(api_key) = config.api_key.as_ref() else {
        return Err(LlmError::MissingApiKey {
            provider: config.backend.label().to_string(),
            env_var: config.backend.api_key_var().to_string(),
        });
    };

    match config.backend {
        LlmBackend::OpenAi => create_openai_provider(config, api_key.expose_secret()),
        LlmBackend::Anthropic => create_anthropic_provider(config, api_key.expose_secret()),
    }
}

fn create_openai_provider(config: &LlmConfig, api_key: &str) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::openai;

    let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
        openai::Client::new(api_key).map_err(|e| LlmError::NotConfigured {
            provider: "openai".to_string(),
            reason: format!("failed to create OpenAI client: {}", e),
        })?;

    let model = client.completion_model(&config.model);
    tracing::debug!("Using OpenAI (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model, "openai")))
}

fn create_anthropic_provider(
    config: &LlmConfig,
    api_key: &str,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::anthropic;

    let client: rig::client::Client<anthropic::client::AnthropicExt> =
        anthropic::Client::new(api_key).map_err(|e| LlmError::NotConfigured {
            provider: "anthropic".to_string(),
            reason: format!("failed to create Anthropic client: {}", e),
        })?;

    let model = client.completion_model(&config.model);
    tracing::debug!("Using Anthropic (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model, "anthropic")))
}
