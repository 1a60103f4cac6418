// src/db.rs

pub mod document_store;
pub use document_store::{DocumentStore, StoreError, StoreOperation, StoredDocument};
pub mod memory_store;
pub use memory_store::{MemoryDocumentStore, RoleScopedStore};
pub mod pg_store;
pub use pg_store::PgDocumentStore;
