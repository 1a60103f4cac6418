// src/handlers/drafts.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{AppError, DraftError, SaveError},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        rca::{Activity, ReportStatus, ValidationMode},
        validation::ValidationReport,
    },
    services::{
        draft_sessions::DraftSession,
        field_gates::ActiveFields,
        rca_draft::{ReportDraft, SaveOutcome},
    },
};

// ---
// Payloads
// ---

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenDraftPayload {
    /// RCA gravado a editar; vazio abre um formulário novo.
    pub rca_id: Option<String>,
}

/// Uma edição. O lote é aplicado por inteiro ou não é aplicado.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DraftOperation {
    Set {
        path: String,
        #[schema(value_type = Object)]
        value: Value,
    },
    Append {
        path: String,
        #[serde(default)]
        #[schema(value_type = Object)]
        element: Option<Value>,
    },
    Remove {
        path: String,
        index: usize,
    },
    SetActivity {
        activity: Option<Activity>,
    },
    SetSubActivity {
        code: String,
    },
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OperationsPayload {
    pub operations: Vec<DraftOperation>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SelectReferencePayload {
    #[validate(length(min = 1, message = "Informe o identificador"))]
    pub id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidatePayload {
    pub mode: ValidationMode,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SavePayload {
    pub status: ReportStatus,
}

/// Estado da sessão devolvido após cada chamada.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub id: Uuid,
    pub rca_id: Option<String>,
    #[schema(value_type = Object)]
    pub document: Value,
    pub active_fields: ActiveFields,
    pub dirty: bool,
    pub references_loaded: bool,
}

impl DraftView {
    fn of(id: Uuid, session: &DraftSession) -> Self {
        Self {
            id,
            rca_id: session.draft.id().map(str::to_string),
            document: session.draft.document().clone(),
            active_fields: session.draft.active_fields(),
            dirty: session.draft.is_dirty(),
            references_loaded: session.references.is_loaded(),
        }
    }
}

fn apply_operation(draft: &mut ReportDraft, operation: DraftOperation) -> Result<(), DraftError> {
    match operation {
        DraftOperation::Set { path, value } => draft.set_scalar(&path, value),
        DraftOperation::Append { path, element } => draft.append_array_item(&path, element).map(|_| ()),
        DraftOperation::Remove { path, index } => draft.remove_array_item(&path, index).map(|_| ()),
        DraftOperation::SetActivity { activity } => {
            draft.set_activity(activity);
            Ok(())
        }
        DraftOperation::SetSubActivity { code } => draft.set_sub_activity(&code),
    }
}

// ---
// Handlers
// ---

// POST /api/drafts
#[utoipa::path(
    post,
    path = "/api/drafts",
    tag = "Drafts",
    request_body = OpenDraftPayload,
    responses(
        (status = 201, description = "Sessão de rascunho aberta", body = DraftView),
        (status = 404, description = "RCA não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn open_draft(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<OpenDraftPayload>,
) -> Result<impl IntoResponse, AppError> {
    let store = app_state.store.for_user(&user);
    let (id, session) = app_state
        .sessions
        .open(store.as_ref(), &user, payload.rca_id.as_deref())
        .await?;

    let view = DraftView::of(id, &*session.lock().await);
    Ok((StatusCode::CREATED, Json(view)))
}

// GET /api/drafts/{id}
#[utoipa::path(
    get,
    path = "/api/drafts/{id}",
    tag = "Drafts",
    responses(
        (status = 200, description = "Estado atual do rascunho", body = DraftView),
        (status = 404, description = "Sessão não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da sessão")),
    security(("api_jwt" = []))
)]
pub async fn get_draft(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = app_state.sessions.get(id, &user).await?;
    let view = DraftView::of(id, &*session.lock().await);
    Ok((StatusCode::OK, Json(view)))
}

// DELETE /api/drafts/{id}
#[utoipa::path(
    delete,
    path = "/api/drafts/{id}",
    tag = "Drafts",
    responses(
        (status = 204, description = "Sessão descartada"),
        (status = 404, description = "Sessão não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da sessão")),
    security(("api_jwt" = []))
)]
pub async fn discard_draft(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.sessions.discard(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/drafts/{id}/operations
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/operations",
    tag = "Drafts",
    request_body = OperationsPayload,
    responses(
        (status = 200, description = "Edições aplicadas", body = DraftView),
        (status = 400, description = "Caminho ou valor inválido; nada foi aplicado")
    ),
    params(("id" = Uuid, Path, description = "ID da sessão")),
    security(("api_jwt" = []))
)]
pub async fn apply_operations(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<OperationsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let session = app_state.sessions.get(id, &user).await?;
    let mut session = session.lock().await;

    // Aplica numa cópia; só troca se o lote inteiro passar
    let mut draft = session.draft.clone();
    for operation in payload.operations {
        apply_operation(&mut draft, operation)?;
    }
    session.draft = draft;

    Ok((StatusCode::OK, Json(DraftView::of(id, &session))))
}

// POST /api/drafts/{id}/client
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/client",
    tag = "Drafts",
    request_body = SelectReferencePayload,
    responses(
        (status = 200, description = "Cliente selecionado e dados preenchidos", body = DraftView),
        (status = 409, description = "Clientes ainda não carregados")
    ),
    params(("id" = Uuid, Path, description = "ID da sessão")),
    security(("api_jwt" = []))
)]
pub async fn select_client(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectReferencePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let session = app_state.sessions.get(id, &user).await?;
    let mut session = session.lock().await;
    let DraftSession { draft, references, .. } = &mut *session;
    draft.select_client(&payload.id, references)?;

    Ok((StatusCode::OK, Json(DraftView::of(id, &session))))
}

// POST /api/drafts/{id}/project
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/project",
    tag = "Drafts",
    request_body = SelectReferencePayload,
    responses(
        (status = 200, description = "Projeto selecionado e dados preenchidos", body = DraftView),
        (status = 409, description = "Projetos ainda não carregados")
    ),
    params(("id" = Uuid, Path, description = "ID da sessão")),
    security(("api_jwt" = []))
)]
pub async fn select_project(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectReferencePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let session = app_state.sessions.get(id, &user).await?;
    let mut session = session.lock().await;
    let DraftSession { draft, references, .. } = &mut *session;
    draft.select_project(&payload.id, references)?;

    Ok((StatusCode::OK, Json(DraftView::of(id, &session))))
}

// POST /api/drafts/{id}/references/reload
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/references/reload",
    tag = "Drafts",
    responses(
        (status = 200, description = "Índices recarregados (ou ainda pendentes)", body = DraftView)
    ),
    params(("id" = Uuid, Path, description = "ID da sessão")),
    security(("api_jwt" = []))
)]
pub async fn reload_references(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let store = app_state.store.for_user(&user);
    let session = app_state.sessions.get(id, &user).await?;
    let mut session = session.lock().await;
    session.reload_references(store.as_ref()).await;

    Ok((StatusCode::OK, Json(DraftView::of(id, &session))))
}

// POST /api/drafts/{id}/validate
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/validate",
    tag = "Drafts",
    request_body = ValidatePayload,
    responses(
        (status = 200, description = "Relatório de validação", body = ValidationReport)
    ),
    params(("id" = Uuid, Path, description = "ID da sessão")),
    security(("api_jwt" = []))
)]
pub async fn validate_draft(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ValidatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let session = app_state.sessions.get(id, &user).await?;
    let report = session.lock().await.draft.validate(payload.mode);
    Ok((StatusCode::OK, Json(report)))
}

// POST /api/drafts/{id}/save
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/save",
    tag = "Drafts",
    request_body = SavePayload,
    responses(
        (status = 200, description = "RCA gravado", body = SaveOutcome),
        (status = 403, description = "Sem permissão de escrita em 'rcas'"),
        (status = 422, description = "Aprovação bloqueada por pendências"),
        (status = 503, description = "Armazenamento indisponível")
    ),
    params(("id" = Uuid, Path, description = "ID da sessão")),
    security(("api_jwt" = []))
)]
pub async fn save_draft(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SavePayload>,
) -> Result<impl IntoResponse, AppError> {
    let store = app_state.store.for_user(&user);
    let session = app_state.sessions.get(id, &user).await?;
    let mut session = session.lock().await;

    match session.draft.save(payload.status, store.as_ref()).await {
        Ok(outcome) => {
            tracing::info!(
                "RCA {} gravado como {:?} por {} ({} pendências)",
                outcome.id,
                outcome.status,
                user.id,
                outcome.report.violations.len()
            );
            Ok((StatusCode::OK, Json(outcome)))
        }
        Err(err) => {
            if let SaveError::Store { collection, document_id, operation, source, .. } = &err {
                tracing::warn!(
                    "Falha ao gravar RCA: coleção={} operação={} documento={:?} usuário={} papel={} erro={}",
                    collection,
                    operation,
                    document_id,
                    user.id,
                    user.role.as_str(),
                    source
                );
            }
            Err(err.into())
        }
    }
}
