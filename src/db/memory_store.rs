// src/db/memory_store.rs
//
// Armazenamento em memória: desenvolvimento local sem PostgreSQL e testes.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::document_store::{role_can_write, DocumentStore, StoreError, StoreOperation, StoredDocument},
    models::auth::Role,
};

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    unavailable: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere com id conhecido (carga inicial, testes).
    pub async fn seed(&self, collection: &str, id: &str, data: Value) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
    }

    /// Simula queda do armazenamento: toda operação falha com `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("armazenamento em memória fora do ar".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        self.check_available()?;
        if !document.is_object() {
            return Err(StoreError::InvalidDocument("o documento deve ser um objeto JSON".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        self.seed(collection, &id, document).await;
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, partial: Value) -> Result<(), StoreError> {
        self.check_available()?;
        let Value::Object(fields) = partial else {
            return Err(StoreError::InvalidDocument("o documento deve ser um objeto JSON".to_string()));
        };

        let mut collections = self.collections.write().await;
        let stored = existing_mut(&mut collections, collection, id)?;

        // Mesmo comportamento do `data || $3` no PostgreSQL
        match stored {
            Value::Object(current) => current.extend(fields),
            other => *other = Value::Object(fields),
        }
        Ok(())
    }

    async fn replace(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        self.check_available()?;
        if !document.is_object() {
            return Err(StoreError::InvalidDocument("o documento deve ser um objeto JSON".to_string()));
        }

        let mut collections = self.collections.write().await;
        *existing_mut(&mut collections, collection, id)? = document;
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        self.check_available()?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| StoredDocument { id: id.to_string(), data: data.clone() }))
    }

    async fn list_all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.check_available()?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| StoredDocument { id: id.clone(), data: data.clone() })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_by(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<StoredDocument>, StoreError> {
        let all = self.list_all(collection).await?;
        Ok(all.into_iter().filter(|doc| doc.data.get(field) == Some(value)).collect())
    }
}

fn existing_mut<'a>(
    collections: &'a mut HashMap<String, BTreeMap<String, Value>>,
    collection: &str,
    id: &str,
) -> Result<&'a mut Value, StoreError> {
    collections
        .get_mut(collection)
        .and_then(|docs| docs.get_mut(id))
        .ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })
}

/// Visão do armazenamento em memória com o papel do usuário corrente,
/// aplicando a mesma política de escrita do banco.
#[derive(Debug, Clone)]
pub struct RoleScopedStore {
    inner: Arc<MemoryDocumentStore>,
    role: Role,
}

impl RoleScopedStore {
    pub fn new(inner: Arc<MemoryDocumentStore>, role: Role) -> Self {
        Self { inner, role }
    }

    fn check_write(&self, collection: &str, operation: StoreOperation) -> Result<(), StoreError> {
        if role_can_write(self.role, collection) {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied {
                collection: collection.to_string(),
                operation,
            })
        }
    }
}

#[async_trait]
impl DocumentStore for RoleScopedStore {
    async fn create(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        self.check_write(collection, StoreOperation::Create)?;
        self.inner.create(collection, document).await
    }

    async fn update(&self, collection: &str, id: &str, partial: Value) -> Result<(), StoreError> {
        self.check_write(collection, StoreOperation::Update)?;
        self.inner.update(collection, id, partial).await
    }

    async fn replace(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        self.check_write(collection, StoreOperation::Update)?;
        self.inner.replace(collection, id, document).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn list_all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.inner.list_all(collection).await
    }

    async fn find_by(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<StoredDocument>, StoreError> {
        self.inner.find_by(collection, field, value).await
    }
}
