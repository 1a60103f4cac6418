// src/services/draft_sessions.rs
//
// Sessões de edição: um rascunho por sessão, de um único dono.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::{
    sync::{Mutex, RwLock},
    task::JoinHandle,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::DocumentStore,
    models::auth::CurrentUser,
    services::{
        rca_draft::{ReportDraft, RCAS_COLLECTION},
        reference_resolver::ReferenceIndex,
    },
};

#[derive(Debug)]
pub struct DraftSession {
    pub draft: ReportDraft,
    pub references: ReferenceIndex,
    pub owner: Uuid,
}

impl DraftSession {
    /// Recarrega clientes e projetos. Falha deixa o índice como pendente.
    pub async fn reload_references(&mut self, store: &dyn DocumentStore) -> bool {
        match ReferenceIndex::load(store).await {
            Ok(index) => self.references = index,
            Err(e) => {
                tracing::warn!("Não foi possível carregar clientes/projetos: {}", e);
                self.references = ReferenceIndex::pending();
            }
        }
        self.references.is_loaded()
    }
}

pub type SharedSession = Arc<Mutex<DraftSession>>;

/// Sessão sem acesso por mais tempo que isso é descartada.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

struct SessionEntry {
    session: SharedSession,
    last_access: Instant,
}

#[derive(Clone)]
pub struct DraftSessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    idle_timeout: Duration,
}

impl Default for DraftSessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl DraftSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Abre uma sessão, vazia ou a partir de um RCA gravado.
    pub async fn open(
        &self,
        store: &dyn DocumentStore,
        user: &CurrentUser,
        rca_id: Option<&str>,
    ) -> Result<(Uuid, SharedSession), AppError> {
        // 1. Rascunho
        let draft = match rca_id {
            None => ReportDraft::initialize(None),
            Some(id) => {
                let stored = store
                    .get(RCAS_COLLECTION, id)
                    .await?
                    .ok_or_else(|| AppError::RcaNotFound(id.to_string()))?;
                ReportDraft::from_stored(&stored)
            }
        };

        // 2. Referências (a sessão abre mesmo sem elas)
        let mut session = DraftSession {
            draft,
            references: ReferenceIndex::pending(),
            owner: user.id,
        };
        session.reload_references(store).await;

        // 3. Registra, aproveitando para limpar as ociosas
        self.evict_idle().await;
        let id = Uuid::new_v4();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(
            id,
            SessionEntry {
                session: shared.clone(),
                last_access: Instant::now(),
            },
        );

        tracing::info!("Sessão de rascunho {} aberta por {}", id, user.id);
        Ok((id, shared))
    }

    /// Sessão de outro usuário, ou ociosa demais, responde como inexistente.
    pub async fn get(&self, id: Uuid, user: &CurrentUser) -> Result<SharedSession, AppError> {
        let session = {
            let mut sessions = self.sessions.write().await;
            let expired = sessions.get(&id).map(|entry| entry.last_access.elapsed() > self.idle_timeout);
            match expired {
                None => None,
                Some(true) => {
                    sessions.remove(&id);
                    tracing::info!("Sessão de rascunho {} expirada por inatividade", id);
                    None
                }
                Some(false) => sessions.get(&id).map(|entry| entry.session.clone()),
            }
        }
        .ok_or(AppError::SessionNotFound(id))?;

        if session.lock().await.owner != user.id {
            return Err(AppError::SessionNotFound(id));
        }

        if let Some(entry) = self.sessions.write().await.get_mut(&id) {
            entry.last_access = Instant::now();
        }
        Ok(session)
    }

    pub async fn discard(&self, id: Uuid, user: &CurrentUser) -> Result<(), AppError> {
        // Confere o dono antes de remover
        self.get(id, user).await?;
        self.sessions.write().await.remove(&id);
        tracing::info!("Sessão de rascunho {} descartada", id);
        Ok(())
    }

    /// Remove as sessões sem acesso há mais que o limite. Retorna quantas saíram.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_access.elapsed() <= self.idle_timeout);

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!("{} sessão(ões) de rascunho ociosa(s) descartada(s)", evicted);
        }
        evicted
    }

    /// Varredura periódica das sessões ociosas, enquanto o servidor roda.
    pub fn spawn_idle_sweep(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                store.evict_idle().await;
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
