// src/db/document_store.rs

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::auth::Role;

/// Documento lido de uma coleção: id + corpo JSON.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StoredDocument {
    pub id: String,
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreOperation {
    Create,
    Update,
    Get,
    List,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreOperation::Create => "create",
            StoreOperation::Update => "update",
            StoreOperation::Get => "get",
            StoreOperation::List => "list",
        })
    }
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Permissão negada para {operation} em '{collection}'")]
    PermissionDenied {
        collection: String,
        operation: StoreOperation,
    },

    #[error("Documento '{id}' não encontrado em '{collection}'")]
    NotFound { collection: String, id: String },

    #[error("Armazenamento indisponível: {0}")]
    Unavailable(String),

    #[error("Documento inválido: {0}")]
    InvalidDocument(String),
}

/// Coleções de documentos JSON (clients, projects, rcas, ...).
/// Sem garantia de leitura-após-escrita.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, collection: &str, document: Value) -> Result<String, StoreError>;

    /// Atualização parcial: as chaves de primeiro nível de `partial`
    /// substituem as armazenadas; as demais permanecem.
    async fn update(&self, collection: &str, id: &str, partial: Value) -> Result<(), StoreError>;

    /// Troca o corpo inteiro: chaves ausentes em `document` deixam de existir.
    async fn replace(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError>;

    async fn list_all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;

    /// Filtro de igualdade sobre um campo de primeiro nível.
    async fn find_by(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<StoredDocument>, StoreError>;
}

// ---
// Política de escrita por papel
// ---
//
// Espelha as políticas de RLS de `migrations/`. O PostgreSQL aplica as
// dele; o armazenamento em memória usa esta função.

pub fn role_can_write(role: Role, collection: &str) -> bool {
    match collection {
        "rcas" => matches!(role, Role::Admin | Role::Gestor | Role::Tecnico),
        "clients" | "projects" => matches!(role, Role::Admin | Role::Gestor | Role::Comercial),
        _ => matches!(role, Role::Admin),
    }
}
