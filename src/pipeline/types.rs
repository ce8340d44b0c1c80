//! Shared types for the classification pipeline.

use serde::Serialize;

use crate::error::InputError;

// ── Email content ───────────────────────────────────────────────────

/// Email text that is guaranteed to be non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent(String);

impl EmailContent {
    /// Trim the raw text and reject it if nothing is left.
    pub fn new(raw: &str) -> Result<Self, InputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InputError::EmptyContent);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ── Category ────────────────────────────────────────────────────────

/// Binary email category.
///
/// Serialized with the labels the prompts and the frontend use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    /// Requires a follow-up action (support request, technical question).
    #[serde(rename = "Produtivo")]
    Productive,
    /// No follow-up needed (thanks, greetings, spam).
    #[serde(rename = "Improdutivo")]
    Unproductive,
}

impl Category {
    /// Wire label, also used verbatim in prompts and fallback matching.
    pub fn label(self) -> &'static str {
        match self {
            Self::Productive => "Produtivo",
            Self::Unproductive => "Improdutivo",
        }
    }

    /// Exact match against a wire label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Produtivo" => Some(Self::Productive),
            "Improdutivo" => Some(Self::Unproductive),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Results ─────────────────────────────────────────────────────────

/// Normalized classification. `confidence` is always within `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationResult {
    pub category: Category,
    pub confidence: f64,
}

/// API-facing result of one classification request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResponse {
    pub category: Category,
    pub suggested_response: String,
    pub confidence: f64,
}

// ── Signature ───────────────────────────────────────────────────────

/// Sender identity every suggested reply must be signed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub title: String,
    pub organization: String,
}

impl Signature {
    /// The closing block appended to replies.
    pub fn closing_block(&self) -> String {
        format!(
            "Atenciosamente.\n{}\n{}\n{}",
            self.name, self.title, self.organization
        )
    }

    /// Whether `text` already carries both the name and the organization.
    pub fn is_signed(&self, text: &str) -> bool {
        text.contains(&self.name) && text.contains(&self.organization)
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            name: "Lucas".to_string(),
            title: "CEO".to_string(),
            organization: "AutoU".to_string(),
        }
    }
}
