// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{DocumentStore, MemoryDocumentStore, PgDocumentStore, RoleScopedStore},
    models::auth::CurrentUser,
    services::{auth::AuthService, draft_sessions::{DraftSessionStore, DEFAULT_IDLE_TIMEOUT}, pdf_service::PdfService},
};

/// De onde vêm as coleções. Sem `DATABASE_URL`, tudo fica em memória.
#[derive(Clone)]
pub enum StoreProvider {
    Postgres(PgPool),
    Memory(Arc<MemoryDocumentStore>),
}

impl StoreProvider {
    /// Store com o escopo de permissões do usuário da requisição.
    pub fn for_user(&self, user: &CurrentUser) -> Arc<dyn DocumentStore> {
        match self {
            StoreProvider::Postgres(pool) => Arc::new(PgDocumentStore::new(pool.clone(), user.clone())),
            StoreProvider::Memory(store) => Arc::new(RoleScopedStore::new(store.clone(), user.role)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: StoreProvider,
    pub sessions: DraftSessionStore,
    pub auth_service: AuthService,
    pub pdf_service: PdfService,
    pub bind_addr: String,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET deve ser definido"))?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let fonts_dir = env::var("FONTS_DIR").unwrap_or_else(|_| "./fonts".to_string());
        let session_idle_timeout = env::var("DRAFT_SESSION_IDLE_MINUTES")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map_or(DEFAULT_IDLE_TIMEOUT, |minutes| Duration::from_secs(minutes * 60));

        let store = match env::var("DATABASE_URL") {
            Ok(database_url) => {
                let max_connections = env::var("DB_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5);

                // Conecta ao banco de dados, usando '?' para propagar erros
                let db_pool = PgPoolOptions::new()
                    .max_connections(max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(&database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                StoreProvider::Postgres(db_pool)
            }
            Err(_) => {
                tracing::warn!("DATABASE_URL não definida; usando armazenamento em memória");
                StoreProvider::Memory(Arc::new(MemoryDocumentStore::new()))
            }
        };

        Ok(Self {
            store,
            sessions: DraftSessionStore::with_idle_timeout(session_idle_timeout),
            auth_service: AuthService::new(jwt_secret),
            pdf_service: PdfService::new(fonts_dir),
            bind_addr,
        })
    }

    /// Estado sem banco, com acesso direto ao store (testes e demonstração).
    pub fn in_memory(jwt_secret: &str) -> (Self, Arc<MemoryDocumentStore>) {
        let memory = Arc::new(MemoryDocumentStore::new());
        let state = Self {
            store: StoreProvider::Memory(memory.clone()),
            sessions: DraftSessionStore::new(),
            auth_service: AuthService::new(jwt_secret.to_string()),
            pdf_service: PdfService::new("./fonts".to_string()),
            bind_addr: "127.0.0.1:0".to_string(),
        };
        (state, memory)
    }
}
