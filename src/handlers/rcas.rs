// src/handlers/rcas.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    db::StoredDocument,
    middleware::auth::AuthenticatedUser,
    models::{auth::CurrentUser, rca::ReportStatus},
    services::rca_draft::RCAS_COLLECTION,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRcasQuery {
    /// Filtra por status (Rascunho ou Aprovado)
    pub status: Option<ReportStatus>,
}

// GET /api/rcas
#[utoipa::path(
    get,
    path = "/api/rcas",
    tag = "RCAs",
    params(ListRcasQuery),
    responses(
        (status = 200, description = "RCAs gravados", body = Vec<StoredDocument>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_rcas(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ListRcasQuery>,
) -> Result<impl IntoResponse, AppError> {
    let store = app_state.store.for_user(&user);

    let rcas = match query.status {
        Some(status) => {
            let status = serde_json::to_value(status).unwrap_or(Value::Null);
            store.find_by(RCAS_COLLECTION, "status", &status).await?
        }
        None => store.list_all(RCAS_COLLECTION).await?,
    };

    Ok((StatusCode::OK, Json(rcas)))
}

async fn fetch_rca(app_state: &AppState, user: &CurrentUser, id: &str) -> Result<StoredDocument, AppError> {
    app_state
        .store
        .for_user(user)
        .get(RCAS_COLLECTION, id)
        .await?
        .ok_or_else(|| AppError::RcaNotFound(id.to_string()))
}

// GET /api/rcas/{id}
#[utoipa::path(
    get,
    path = "/api/rcas/{id}",
    tag = "RCAs",
    responses(
        (status = 200, description = "RCA gravado", body = StoredDocument),
        (status = 404, description = "RCA não encontrado")
    ),
    params(("id" = String, Path, description = "ID do RCA")),
    security(("api_jwt" = []))
)]
pub async fn get_rca(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let rca = fetch_rca(&app_state, &user, &id).await?;
    Ok((StatusCode::OK, Json(rca)))
}

// GET /api/rcas/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/rcas/{id}/pdf",
    tag = "RCAs",
    responses(
        (status = 200, description = "RCA em PDF (application/pdf)"),
        (status = 404, description = "RCA não encontrado")
    ),
    params(("id" = String, Path, description = "ID do RCA")),
    security(("api_jwt" = []))
)]
pub async fn generate_rca_pdf(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let rca = fetch_rca(&app_state, &user, &id).await?;

    // Renderização é CPU; fora do executor assíncrono
    let pdf_service = app_state.pdf_service.clone();
    let pdf_bytes = tokio::task::spawn_blocking(move || pdf_service.render_rca(&rca))
        .await
        .map_err(|e| AppError::PdfError(e.to_string()))??;

    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"rca_{}.pdf\"", id)),
    ];

    Ok((headers, pdf_bytes).into_response())
}
