//! Error types for the email classifier.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Input validation errors. Detected locally, before any LLM call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("No file or text was provided")]
    MissingContent,

    #[error("Email content is empty")]
    EmptyContent,

    #[error("Text exceeds the maximum of {max} characters")]
    TooLong { max: usize },

    #[error("Unsupported file type: {filename}")]
    UnsupportedFileType { filename: String },

    #[error("File is not valid UTF-8")]
    InvalidUtf8,

    #[error("Failed to read PDF: {0}")]
    PdfRead(String),

    #[error("PDF has no extractable text")]
    PdfNoText,

    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Invalid multipart body: {0}")]
    InvalidMultipart(String),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Missing API key for provider {provider}: set {env_var}")]
    MissingApiKey { provider: String, env_var: String },

    #[error("Provider {provider} is not configured: {reason}")]
    NotConfigured { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },
}

impl LlmError {
    /// Credential or client setup problems, as opposed to a failed call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey { .. } | Self::NotConfigured { .. } | Self::AuthFailed { .. }
        )
    }
}

/// Classification pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    Validation(#[from] InputError),

    #[error("Configuration error: {0}")]
    Configuration(LlmError),

    #[error("Upstream error: {0}")]
    Upstream(LlmError),
}

impl From<LlmError> for PipelineError {
    fn from(e: LlmError) -> Self {
        if e.is_configuration() {
            Self::Configuration(e)
        } else {
            Self::Upstream(e)
        }
    }
}
