//! Maps pipeline errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use crate::error::{InputError, LlmError, PipelineError};

/// Error returned by the classify endpoint. Rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        Self(e)
    }
}

impl From<InputError> for ApiError {
    fn from(e: InputError) -> Self {
        Self(PipelineError::Validation(e))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
            PipelineError::Configuration(_) | PipelineError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// User-facing message, in the language of the frontend.
    pub fn message(&self) -> String {
        match &self.0 {
            PipelineError::Validation(e) => input_message(e),
            PipelineError::Configuration(e) => format!(
                "Erro de configuração: {}. Verifique o arquivo .env",
                configuration_detail(e)
            ),
            PipelineError::Upstream(e) => format!("Erro ao processar: {}", e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            error!(error = %self.0, "Classification request failed");
        } else {
            debug!(error = %self.0, "Classification request rejected");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn input_message(e: &InputError) -> String {
    match e {
        InputError::MissingContent => "É necessário fornecer um arquivo ou texto".to_string(),
        InputError::EmptyContent => "Conteúdo do email não pode estar vazio".to_string(),
        InputError::TooLong { max } => format!("Texto muito longo. Máximo {} caracteres", max),
        InputError::UnsupportedFileType { .. } => {
            "Tipo de arquivo não suportado. Use .txt ou .pdf".to_string()
        }
        InputError::InvalidUtf8 => {
            "Erro ao decodificar arquivo. Certifique-se de usar UTF-8".to_string()
        }
        InputError::PdfRead(reason) => format!("Erro ao ler arquivo: {}", reason),
        InputError::PdfNoText => {
            "Erro ao ler arquivo: PDF não contém texto extraível (pode ser escaneado)".to_string()
        }
        InputError::InvalidJson(_) => "Formato JSON inválido".to_string(),
        InputError::InvalidMultipart(_) => "Formato multipart inválido".to_string(),
    }
}

fn configuration_detail(e: &LlmError) -> String {
    match e {
        LlmError::MissingApiKey { env_var, .. } => format!("{} não encontrada", env_var),
        LlmError::AuthFailed { provider } => {
            format!("credenciais rejeitadas pelo provedor {}", provider)
        }
        LlmError::NotConfigured { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}
