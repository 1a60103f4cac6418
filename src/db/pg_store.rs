// src/db/pg_store.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::{
    common::db_utils::{begin_rls_transaction, is_permission_denied},
    db::document_store::{DocumentStore, StoreError, StoreOperation, StoredDocument},
    models::auth::CurrentUser,
};

/// Coleções sobre a tabela `documents` (JSONB). Cada instância é ligada a
/// um usuário: toda operação roda numa transação com as variáveis de RLS.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    user: CurrentUser,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool, user: CurrentUser) -> Self {
        Self { pool, user }
    }

    fn map_err(&self, collection: &str, operation: StoreOperation, err: sqlx::Error) -> StoreError {
        if is_permission_denied(&err) {
            return StoreError::PermissionDenied {
                collection: collection.to_string(),
                operation,
            };
        }
        tracing::error!("Erro de banco em {} '{}': {}", operation, collection, err);
        StoreError::Unavailable(err.to_string())
    }

    /// UPDATE de um documento existente. Zero linhas afetadas com a linha
    /// visível para leitura indica bloqueio de permissão.
    async fn write_existing(&self, collection: &str, id: &str, data: &Value, sql: &str) -> Result<(), StoreError> {
        if !data.is_object() {
            return Err(StoreError::InvalidDocument("o documento deve ser um objeto JSON".to_string()));
        }
        let not_found = || StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        };
        let uuid = Uuid::parse_str(id).map_err(|_| not_found())?;
        let op = StoreOperation::Update;

        let mut tx = begin_rls_transaction(&self.pool, &self.user)
            .await
            .map_err(|e| self.map_err(collection, op, e))?;

        let result = sqlx::query(sql)
            .bind(collection)
            .bind(uuid)
            .bind(data)
            .execute(&mut *tx)
            .await
            .map_err(|e| self.map_err(collection, op, e))?;

        if result.rows_affected() == 0 {
            let visible: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM documents WHERE collection = $1 AND id = $2)",
            )
            .bind(collection)
            .bind(uuid)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| self.map_err(collection, op, e))?;

            return Err(if visible {
                StoreError::PermissionDenied {
                    collection: collection.to_string(),
                    operation: op,
                }
            } else {
                not_found()
            });
        }

        tx.commit().await.map_err(|e| self.map_err(collection, op, e))?;
        Ok(())
    }
}

fn row_to_document(row: &PgRow) -> Result<StoredDocument, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    let data: Value = row.try_get("data")?;
    Ok(StoredDocument { id: id.to_string(), data })
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        if !document.is_object() {
            return Err(StoreError::InvalidDocument("o documento deve ser um objeto JSON".to_string()));
        }
        let op = StoreOperation::Create;

        let mut tx = begin_rls_transaction(&self.pool, &self.user)
            .await
            .map_err(|e| self.map_err(collection, op, e))?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO documents (collection, data, created_by)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(collection)
        .bind(&document)
        .bind(self.user.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| self.map_err(collection, op, e))?;

        tx.commit().await.map_err(|e| self.map_err(collection, op, e))?;
        Ok(id.to_string())
    }

    async fn update(&self, collection: &str, id: &str, partial: Value) -> Result<(), StoreError> {
        // Merge raso: chaves de primeiro nível do patch substituem as gravadas
        self.write_existing(
            collection,
            id,
            &partial,
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .await
    }

    async fn replace(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        self.write_existing(
            collection,
            id,
            &document,
            r#"
            UPDATE documents
            SET data = $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let Ok(uuid) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let op = StoreOperation::Get;

        let mut tx = begin_rls_transaction(&self.pool, &self.user)
            .await
            .map_err(|e| self.map_err(collection, op, e))?;

        let row = sqlx::query("SELECT id, data FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(uuid)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| self.map_err(collection, op, e))?;

        tx.commit().await.map_err(|e| self.map_err(collection, op, e))?;

        row.as_ref()
            .map(row_to_document)
            .transpose()
            .map_err(|e| self.map_err(collection, op, e))
    }

    async fn list_all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let op = StoreOperation::List;

        let mut tx = begin_rls_transaction(&self.pool, &self.user)
            .await
            .map_err(|e| self.map_err(collection, op, e))?;

        let rows = sqlx::query("SELECT id, data FROM documents WHERE collection = $1 ORDER BY created_at")
            .bind(collection)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| self.map_err(collection, op, e))?;

        tx.commit().await.map_err(|e| self.map_err(collection, op, e))?;

        rows.iter()
            .map(row_to_document)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.map_err(collection, op, e))
    }

    async fn find_by(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<StoredDocument>, StoreError> {
        let op = StoreOperation::List;

        let mut tx = begin_rls_transaction(&self.pool, &self.user)
            .await
            .map_err(|e| self.map_err(collection, op, e))?;

        let rows = sqlx::query(
            r#"
            SELECT id, data FROM documents
            WHERE collection = $1 AND data -> $2 = $3
            ORDER BY created_at
            "#,
        )
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| self.map_err(collection, op, e))?;

        tx.commit().await.map_err(|e| self.map_err(collection, op, e))?;

        rows.iter()
            .map(row_to_document)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.map_err(collection, op, e))
    }
}
