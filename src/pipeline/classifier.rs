//! Classification caller: asks the LLM for a category and coerces whatever
//! comes back into a valid [`ClassificationResult`].
//!
//! Coercion chain:
//! 1. Strip Markdown code fences, parse as a JSON object
//! 2. On parse failure, look for a category label in the raw text
//! 3. Force unknown categories to `Productive`, default missing confidence
//! 4. Clamp confidence into `[0.0, 1.0]`

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::pipeline::types::{Category, ClassificationResult, EmailContent};

/// Low temperature: the answer should be a stable label.
const CLASSIFY_TEMPERATURE: f32 = 0.3;

/// The expected reply is a tiny JSON object.
const CLASSIFY_MAX_TOKENS: u32 = 100;

/// Confidence when a label was found in unparseable output.
const LABEL_MATCH_CONFIDENCE: f64 = 0.8;

/// Confidence when nothing usable was found at all.
const NO_SIGNAL_CONFIDENCE: f64 = 0.5;

/// Confidence when the JSON omits it or it is not a number.
const DEFAULT_CONFIDENCE: f64 = 0.8;

const CLASSIFY_SYSTEM_PROMPT: &str =
    "Você é um classificador de emails especializado. Sempre responda apenas com JSON válido.";

/// Categorizes an email with a single LLM call.
pub struct Classifier {
    llm: Arc<dyn LlmProvider>,
}

impl Classifier {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Classify an email. Malformed model output never fails; only the
    /// LLM call itself can.
    pub async fn classify(&self, email: &EmailContent) -> Result<ClassificationResult, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(CLASSIFY_SYSTEM_PROMPT),
            ChatMessage::user(build_classification_prompt(email.as_str())),
        ])
        .with_temperature(CLASSIFY_TEMPERATURE)
        .with_max_tokens(CLASSIFY_MAX_TOKENS);

        debug!(model = self.llm.model_name(), "Requesting classification");
        let response = self.llm.complete(request).await?;
        debug!(
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Classification reply received"
        );

        let result = normalize_classification(&response.content);
        info!(
            category = %result.category,
            confidence = result.confidence,
            "Email classified"
        );
        Ok(result)
    }
}

// ── Prompt construction ─────────────────────────────────────────────

fn build_classification_prompt(email: &str) -> String {
    format!(
        "Você é um classificador de emails profissional para uma empresa financeira.\n\
         Analise o seguinte email e classifique-o como \"{productive}\" ou \"{unproductive}\":\n\
         Email: {email}\n\
         Critérios:\n\
         - {productive}: Emails que requerem uma ação ou resposta específica (solicitações de suporte técnico, atualização sobre casos, dúvidas sobre o sistema, problemas técnicos, solicitações de informação)\n\
         - {unproductive}: Emails que não necessitam de uma ação imediata (mensagens de felicitações, agradecimentos genéricos, spam, mensagens sem propósito claro)\n\
         Responda APENAS com JSON válido no formato:\n\
         {{\"category\": \"{productive}\" ou \"{unproductive}\", \"confidence\": 0.0-1.0}}\n\
         Não inclua nenhum texto adicional, apenas o JSON.",
        productive = Category::Productive.label(),
        unproductive = Category::Unproductive.label(),
        email = email,
    )
}

// ── Response normalization ──────────────────────────────────────────

/// Coerce raw model output into a valid classification.
pub fn normalize_classification(raw: &str) -> ClassificationResult {
    let cleaned = strip_code_fences(raw);

    let Some(fields) = parse_object(&cleaned) else {
        let result = classify_from_text(&cleaned);
        warn!(
            raw_response = %raw,
            category = %result.category,
            confidence = result.confidence,
            "Classification reply is not JSON, matched labels in raw text"
        );
        return result;
    };

    let category = match fields.get("category").and_then(Value::as_str) {
        Some(label) => Category::from_label(label).unwrap_or_else(|| {
            warn!(label, "Unknown category label, defaulting to Produtivo");
            Category::Productive
        }),
        None => {
            warn!("Classification reply has no string category, defaulting to Produtivo");
            Category::Productive
        }
    };

    let confidence = fields
        .get("confidence")
        .and_then(numeric)
        .unwrap_or(DEFAULT_CONFIDENCE);

    ClassificationResult {
        category,
        confidence: confidence.clamp(0.0, 1.0),
    }
}

/// Parse failure fallback: look for a label in priority order.
fn classify_from_text(text: &str) -> ClassificationResult {
    if text.contains(Category::Productive.label()) {
        ClassificationResult {
            category: Category::Productive,
            confidence: LABEL_MATCH_CONFIDENCE,
        }
    } else if text.contains(Category::Unproductive.label()) {
        ClassificationResult {
            category: Category::Unproductive,
            confidence: LABEL_MATCH_CONFIDENCE,
        }
    } else {
        ClassificationResult {
            category: Category::Productive,
            confidence: NO_SIGNAL_CONFIDENCE,
        }
    }
}

/// Integers and floats both count; booleans and strings do not.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Numbers outside the f64 range (e.g. `1e400`) fail to parse, so such a
/// reply takes the label-matching path.
fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(fields)) => Some(fields),
        _ => None,
    }
}

/// Remove Markdown code fences the model sometimes wraps JSON in.
fn strip_code_fences(text: &str) -> String {
    text.trim()
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}
