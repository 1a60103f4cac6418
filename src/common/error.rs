// src/common/error.rs

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    db::document_store::{StoreError, StoreOperation},
    models::validation::ValidationReport,
};

// ---
// Erros de edição do rascunho
// ---

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    #[error("Caminho de campo inválido: '{0}'")]
    InvalidPath(String),

    #[error("'{0}' não é um objeto")]
    NotAnObject(String),

    #[error("'{0}' não é uma lista")]
    NotAnArray(String),

    #[error("Índice {index} fora da lista '{path}' (tamanho {len})")]
    IndexOutOfBounds { path: String, index: usize, len: usize },

    #[error("Valor inválido para '{path}': {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("O campo '{0}' não pode ser alterado diretamente")]
    ReadOnlyField(String),

    #[error("Selecione a atividade antes da sub-atividade")]
    ActivityRequired,

    #[error("Sub-atividade '{sub_activity}' não pertence à listagem {activity}")]
    InvalidSubActivity { activity: String, sub_activity: String },

    #[error("Clientes e projetos ainda não foram carregados")]
    ReferencesLoading,
}

// ---
// Resultado do salvamento
// ---

/// Falha recuperável de `save`: o rascunho continua intacto.
#[derive(Debug, Clone, Error)]
pub enum SaveError {
    #[error("O relatório não passou na validação")]
    Validation(ValidationReport),

    #[error("Falha ao gravar em '{collection}' ({operation}): {source}")]
    Store {
        collection: String,
        document_id: Option<String>,
        operation: StoreOperation,
        payload: Value,
        #[source]
        source: StoreError,
    },
}

// ---
// Erro da API
// ---

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(ValidationReport),

    #[error("Payload inválido")]
    InvalidPayload(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Sessão de rascunho {0} não encontrada")]
    SessionNotFound(Uuid),

    #[error("Relatório '{0}' não encontrado")]
    RcaNotFound(String),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro ao gerar PDF: {0}")]
    PdfError(String),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl From<SaveError> for AppError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::Validation(report) => AppError::ValidationError(report),
            SaveError::Store { source, .. } => AppError::Store(source),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Detalhes por caminho de campo
            AppError::ValidationError(report) => {
                let mut details: BTreeMap<String, Vec<String>> = BTreeMap::new();
                for violation in &report.violations {
                    details
                        .entry(violation.path.clone())
                        .or_default()
                        .push(violation.message.clone());
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                    "violations": report.violations,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::InvalidPayload(errors) => {
                let details: BTreeMap<String, Vec<String>> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errs)| {
                        let messages = errs
                            .iter()
                            .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
                            .collect();
                        (field.to_string(), messages)
                    })
                    .collect();
                let body = Json(json!({
                    "error": "Requisição inválida.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Draft(DraftError::ReferencesLoading) => (
                StatusCode::CONFLICT,
                DraftError::ReferencesLoading.to_string(),
            ),
            AppError::Draft(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Store(StoreError::PermissionDenied { collection, operation }) => (
                StatusCode::FORBIDDEN,
                format!("Sem permissão para {} em '{}'.", operation, collection),
            ),
            AppError::Store(StoreError::NotFound { id, .. }) | AppError::RcaNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Relatório '{}' não encontrado.", id))
            }
            AppError::Store(StoreError::Unavailable(detail)) => {
                tracing::error!("Armazenamento indisponível: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Armazenamento indisponível. Tente novamente.".to_string(),
                )
            }
            AppError::Store(StoreError::InvalidDocument(detail)) => (StatusCode::BAD_REQUEST, detail),
            AppError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Sessão de rascunho {} não encontrada.", id),
            ),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),

            // O resto vira 500, com o detalhe só no log
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
