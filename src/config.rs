//! Configuration types.

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};
use crate::pipeline::types::Signature;

/// Origin the bundled frontend dev server runs on. Always allowed by CORS.
pub const DEV_FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Default request body limit: 10 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Process-wide server configuration. Immutable once built.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub host: IpAddr,
    /// Port to bind the HTTP listener to.
    pub port: u16,
    /// Extra origin allowed by CORS, next to [`DEV_FRONTEND_ORIGIN`].
    pub frontend_url: String,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// Upstream LLM settings.
    pub llm: LlmConfig,
    /// Identity every suggested reply is signed with.
    pub signature: Signature,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match var("LLM_BACKEND") {
            Some(raw) => raw.parse::<LlmBackend>()?,
            None => LlmBackend::OpenAi,
        };

        // A missing key is not fatal at startup: each request reports it.
        let api_key = var(backend.api_key_var()).map(|k| SecretString::from(k.trim().to_string()));
        let model = var("LLM_MODEL").unwrap_or_else(|| backend.default_model().to_string());

        let host = parse_or("HOST", var("HOST"), IpAddr::from([0, 0, 0, 0]))?;
        let port = parse_or("PORT", var("PORT"), 8000)?;
        let max_upload_bytes =
            parse_or("MAX_UPLOAD_BYTES", var("MAX_UPLOAD_BYTES"), DEFAULT_MAX_UPLOAD_BYTES)?;

        let defaults = Signature::default();
        let signature = Signature {
            name: var("SIGNATURE_NAME").unwrap_or(defaults.name),
            title: var("SIGNATURE_TITLE").unwrap_or(defaults.title),
            organization: var("SIGNATURE_ORGANIZATION").unwrap_or(defaults.organization),
        };

        Ok(Self {
            host,
            port,
            frontend_url: var("FRONTEND_URL").unwrap_or_else(|| DEV_FRONTEND_ORIGIN.to_string()),
            max_upload_bytes,
            llm: LlmConfig {
                backend,
                api_key,
                model,
            },
            signature,
        })
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{}': {}", raw, e),
        }),
        None => Ok(default),
    }
}
