//! Email processor: sequences validation, classification and drafting for
//! one request.
//!
//! Flow:
//! 1. Reject blank content (no provider is built, no LLM call is made)
//! 2. Build a provider for this request
//! 3. Classify once, then draft once with the resolved category

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::PipelineError;
use crate::llm::provider::ProviderFactory;
use crate::pipeline::classifier::Classifier;
use crate::pipeline::drafter::ResponseDrafter;
use crate::pipeline::types::{ClassificationResponse, EmailContent, Signature};

/// Turns email text into a [`ClassificationResponse`].
pub struct EmailProcessor {
    providers: Arc<dyn ProviderFactory>,
    signature: Signature,
}

impl EmailProcessor {
    pub fn new(providers: Arc<dyn ProviderFactory>, signature: Signature) -> Self {
        Self {
            providers,
            signature,
        }
    }

    /// Classify an email and draft a reply for it.
    ///
    /// Fails with `Validation` for blank content, `Configuration` for
    /// credential problems, and `Upstream` when the classification call
    /// itself fails.
    pub async fn process(&self, raw: &str) -> Result<ClassificationResponse, PipelineError> {
        let email = EmailContent::new(raw)?;
        debug!(chars = email.as_str().chars().count(), "Processing email");

        let llm = self.providers.create()?;

        let classification = Classifier::new(Arc::clone(&llm)).classify(&email).await?;
        let suggested_response = ResponseDrafter::new(llm, self.signature.clone())
            .draft(&email, classification.category)
            .await?;

        info!(
            category = %classification.category,
            confidence = classification.confidence,
            "Email processed"
        );

        Ok(ClassificationResponse {
            category: classification.category,
            suggested_response,
            confidence: classification.confidence,
        })
    }
}
