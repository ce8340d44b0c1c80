//! Response drafter: asks the LLM for a reply in the tone the category calls
//! for, and guarantees the reply ends with the sender's signature.
//!
//! Transport and output problems degrade to a canned reply. Only
//! configuration errors propagate.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::pipeline::types::{Category, EmailContent, Signature};

/// Higher temperature: replies should read naturally.
const DRAFT_TEMPERATURE: f32 = 0.7;

/// Enough for a 150 word reply plus the closing block.
const DRAFT_MAX_TOKENS: u32 = 200;

const DRAFT_SYSTEM_PROMPT: &str = "Você é um assistente que gera respostas profissionais para emails corporativos. Sempre responda em português brasileiro.";

const CANNED_PRODUCTIVE_REPLY: &str = "Obrigado pelo seu email. Recebemos sua solicitação e nossa equipe está analisando. Retornaremos em breve com uma resposta.";

const CANNED_UNPRODUCTIVE_REPLY: &str =
    "Obrigado pelo contato. Sua mensagem foi recebida com muito carinho. Tenha um ótimo dia!";

/// Drafts a signed reply with a single LLM call.
pub struct ResponseDrafter {
    llm: Arc<dyn LlmProvider>,
    signature: Signature,
}

impl ResponseDrafter {
    pub fn new(llm: Arc<dyn LlmProvider>, signature: Signature) -> Self {
        Self { llm, signature }
    }

    /// Draft a reply for an already classified email.
    ///
    /// Returns `Err` only for configuration errors. Any other failure yields
    /// the canned reply for `category`.
    pub async fn draft(&self, email: &EmailContent, category: Category) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(DRAFT_SYSTEM_PROMPT),
            ChatMessage::user(build_draft_prompt(email.as_str(), category, &self.signature)),
        ])
        .with_temperature(DRAFT_TEMPERATURE)
        .with_max_tokens(DRAFT_MAX_TOKENS);

        debug!(
            model = self.llm.model_name(),
            category = %category,
            "Requesting reply draft"
        );

        let raw = match self.llm.complete(request).await {
            Ok(response) => {
                debug!(
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    "Draft reply received"
                );
                response.content
            }
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                warn!(error = %e, category = %category, "Draft generation failed, using canned reply");
                return Ok(self.canned_reply(category));
            }
        };

        let text = strip_wrapping_quotes(raw.trim());
        // A bare signature is not a reply; send the category's canned text instead.
        if text.trim().is_empty() {
            warn!(category = %category, "Draft reply was empty, using canned reply");
            return Ok(self.canned_reply(category));
        }

        let reply = self.ensure_signed(text);
        info!(category = %category, chars = reply.chars().count(), "Reply drafted");
        Ok(reply)
    }

    /// Static fallback reply for a category, signed.
    pub fn canned_reply(&self, category: Category) -> String {
        let body = match category {
            Category::Productive => CANNED_PRODUCTIVE_REPLY,
            Category::Unproductive => CANNED_UNPRODUCTIVE_REPLY,
        };
        format!("{}\n\n{}", body, self.signature.closing_block())
    }

    /// Append the closing block unless both name and organization appear.
    fn ensure_signed(&self, text: &str) -> String {
        if self.signature.is_signed(text) {
            text.to_string()
        } else {
            debug!("Draft reply unsigned, appending closing block");
            format!("{}\n\n{}", text.trim_end(), self.signature.closing_block())
        }
    }
}

// ── Prompt construction ─────────────────────────────────────────────

fn build_draft_prompt(email: &str, category: Category, signature: &Signature) -> String {
    let (kind, requirements) = match category {
        Category::Productive => (
            "produtivo",
            "- Indique que a solicitação foi recebida e será analisada\n\
             - Seja específico e relevante ao conteúdo do email\n\
             - Máximo 150 palavras",
        ),
        Category::Unproductive => (
            "improdutivo (agradecimento, felicitações, etc)",
            "- Agradeça o contato\n\
             - Seja breve e cordial\n\
             - Máximo 50 palavras",
        ),
    };

    format!(
        "Você é um assistente profissional de uma empresa financeira.\n\
         Gere uma resposta profissional, curta e adequada para o seguinte email {kind}.\n\
         Email recebido:\n\
         {email}\n\
         Requisitos:\n\
         - Resposta em português brasileiro\n\
         - Profissional mas calorosa\n\
         {requirements}\n\
         - Sempre finalize a resposta com:\n  \
         Atenciosamente.\n  \
         {name}\n  \
         {title}\n  \
         {organization}\n\
         \n\
         Responda APENAS com a resposta sugerida, sem explicações ou formatação adicional.",
        kind = kind,
        email = email,
        requirements = requirements,
        name = signature.name,
        title = signature.title,
        organization = signature.organization,
    )
}

// ── Response cleanup ────────────────────────────────────────────────

/// Strip one layer of `"` quotes, then one layer of `'` quotes.
fn strip_wrapping_quotes(text: &str) -> &str {
    let text = strip_pair(text, '"');
    strip_pair(text, '\'')
}

fn strip_pair(text: &str, quote: char) -> &str {
    if !(text.starts_with(quote) && text.ends_with(quote)) {
        return text;
    }
    if text.len() < 2 * quote.len_utf8() {
        // A lone quote character is both prefix and suffix.
        return "";
    }
    &text[quote.len_utf8()..text.len() - quote.len_utf8()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{ScriptedLlm, auth_error, network_error};

    const CLOSING: &str = "Atenciosamente.\nLucas\nCEO\nAutoU";

    fn email(text: &str) -> EmailContent {
        EmailContent::new(text).unwrap()
    }

    fn drafter(llm: Arc<ScriptedLlm>) -> ResponseDrafter {
        ResponseDrafter::new(llm, Signature::default())
    }

    // ── Prompt construction ─────────────────────────────────────────

    #[test]
    fn productive_prompt_asks_for_acknowledgment() {
        let prompt = build_draft_prompt("Preciso de ajuda", Category::Productive, &Signature::default());
        assert!(prompt.contains("email produtivo."));
        assert!(prompt.contains("será analisada"));
        assert!(prompt.contains("Máximo 150 palavras"));
        assert!(prompt.contains("Preciso de ajuda"));
        assert!(prompt.contains("Atenciosamente.\n  Lucas\n  CEO\n  AutoU"));
        assert!(!prompt.contains("Máximo 50 palavras"));
    }

    #[test]
    fn unproductive_prompt_asks_for_brief_thanks() {
        let prompt = build_draft_prompt("Feliz Natal", Category::Unproductive, &Signature::default());
        assert!(prompt.contains("email improdutivo (agradecimento, felicitações, etc)."));
        assert!(prompt.contains("Agradeça o contato"));
        assert!(prompt.contains("Máximo 50 palavras"));
        assert!(!prompt.contains("Máximo 150 palavras"));
    }

    #[test]
    fn prompt_uses_injected_signature() {
        let signature = Signature {
            name: "Ana".into(),
            title: "CTO".into(),
            organization: "Acme".into(),
        };
        let prompt = build_draft_prompt("Oi", Category::Productive, &signature);
        assert!(prompt.contains("Atenciosamente.\n  Ana\n  CTO\n  Acme"));
    }

    // ── Quote stripping ─────────────────────────────────────────────

    #[test]
    fn strips_double_quotes() {
        assert_eq!(strip_wrapping_quotes("\"Olá, tudo bem\""), "Olá, tudo bem");
    }

    #[test]
    fn strips_single_quotes() {
        assert_eq!(strip_wrapping_quotes("'Olá'"), "Olá");
    }

    #[test]
    fn strips_one_layer_of_each_kind() {
        assert_eq!(strip_wrapping_quotes("\"'Olá'\""), "Olá");
        assert_eq!(strip_wrapping_quotes("\"\"Olá\"\""), "\"Olá\"");
    }

    #[test]
    fn leaves_unbalanced_quotes() {
        assert_eq!(strip_wrapping_quotes("\"Olá"), "\"Olá");
        assert_eq!(strip_wrapping_quotes("Diga \"sim\""), "Diga \"sim\"");
    }

    #[test]
    fn lone_quote_becomes_empty() {
        assert_eq!(strip_wrapping_quotes("\""), "");
    }

    // ── Drafting with mock LLM ──────────────────────────────────────

    #[tokio::test]
    async fn unsigned_reply_gets_closing_block() {
        let llm = Arc::new(ScriptedLlm::replying(
            "Olá! Recebemos sua solicitação e vamos analisá-la.   \n",
        ));
        let reply = drafter(llm)
            .draft(&email("Preciso de ajuda"), Category::Productive)
            .await
            .unwrap();
        assert_eq!(
            reply,
            format!("Olá! Recebemos sua solicitação e vamos analisá-la.\n\n{CLOSING}")
        );
        assert!(reply.ends_with(CLOSING));
    }

    #[tokio::test]
    async fn reply_missing_only_organization_gets_closing_block() {
        let llm = Arc::new(ScriptedLlm::replying("Obrigado!\nLucas"));
        let reply = drafter(llm)
            .draft(&email("Obrigado pela ajuda"), Category::Unproductive)
            .await
            .unwrap();
        assert_eq!(reply, format!("Obrigado!\nLucas\n\n{CLOSING}"));
    }

    #[tokio::test]
    async fn signed_reply_is_not_duplicated() {
        let text = format!("Obrigado pelo contato!\n\n{CLOSING}");
        let llm = Arc::new(ScriptedLlm::replying(&text));
        let reply = drafter(llm)
            .draft(&email("Feliz Natal a todos!"), Category::Unproductive)
            .await
            .unwrap();
        assert_eq!(reply, text);
        assert_eq!(reply.matches("Atenciosamente.").count(), 1);
    }

    #[tokio::test]
    async fn quoted_reply_is_unwrapped_before_signing() {
        let llm = Arc::new(ScriptedLlm::replying("\"Obrigado pelo contato!\""));
        let reply = drafter(llm)
            .draft(&email("Feliz Natal"), Category::Unproductive)
            .await
            .unwrap();
        assert_eq!(reply, format!("Obrigado pelo contato!\n\n{CLOSING}"));
    }

    #[tokio::test]
    async fn draft_request_uses_creative_sampling() {
        let llm = Arc::new(ScriptedLlm::replying("Oi"));
        drafter(llm.clone())
            .draft(&email("Preciso de ajuda"), Category::Productive)
            .await
            .unwrap();

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, Some(0.7));
        assert_eq!(requests[0].max_tokens, Some(200));
        assert_eq!(requests[0].system_prompt().as_deref(), Some(DRAFT_SYSTEM_PROMPT));
    }

    #[tokio::test]
    async fn network_failure_yields_canned_productive_reply() {
        let llm = Arc::new(ScriptedLlm::failing(network_error()));
        let reply = drafter(llm)
            .draft(&email("Preciso de ajuda com o sistema"), Category::Productive)
            .await
            .unwrap();
        assert_eq!(reply, format!("{CANNED_PRODUCTIVE_REPLY}\n\n{CLOSING}"));
    }

    #[tokio::test]
    async fn network_failure_yields_canned_unproductive_reply() {
        let llm = Arc::new(ScriptedLlm::failing(network_error()));
        let reply = drafter(llm)
            .draft(&email("Feliz Natal a todos!"), Category::Unproductive)
            .await
            .unwrap();
        assert_eq!(reply, format!("{CANNED_UNPRODUCTIVE_REPLY}\n\n{CLOSING}"));
    }

    #[tokio::test]
    async fn empty_reply_yields_canned_reply() {
        let llm = Arc::new(ScriptedLlm::replying("  \"\"  "));
        let reply = drafter(llm)
            .draft(&email("Preciso de ajuda"), Category::Productive)
            .await
            .unwrap();
        assert_eq!(reply, format!("{CANNED_PRODUCTIVE_REPLY}\n\n{CLOSING}"));
    }

    #[tokio::test]
    async fn configuration_failure_propagates() {
        let llm = Arc::new(ScriptedLlm::failing(auth_error()));
        let err = drafter(llm)
            .draft(&email("Preciso de ajuda"), Category::Productive)
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
