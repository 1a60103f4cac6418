// src/handlers/catalog.rs

use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    models::{catalogs::OptionCatalogs, rca::Activity},
    services::variant_registry,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogEntry {
    pub code: String,
    pub label: String,
}

fn parse_activity(raw: &str) -> Result<Activity, AppError> {
    raw.parse::<Activity>()
        .map_err(|code| AppError::BadRequest(format!("Listagem desconhecida: '{}'", code)))
}

// GET /api/catalog/activities
#[utoipa::path(
    get,
    path = "/api/catalog/activities",
    tag = "Catalog",
    responses(
        (status = 200, description = "Listagens da DN 217", body = Vec<CatalogEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_activities() -> impl IntoResponse {
    let entries: Vec<CatalogEntry> = Activity::ALL
        .into_iter()
        .map(|a| CatalogEntry { code: a.code().to_string(), label: a.label().to_string() })
        .collect();
    (StatusCode::OK, Json(entries))
}

// GET /api/catalog/activities/{activity}/sub-activities
#[utoipa::path(
    get,
    path = "/api/catalog/activities/{activity}/sub-activities",
    tag = "Catalog",
    responses(
        (status = 200, description = "Sub-atividades da listagem", body = Vec<CatalogEntry>),
        (status = 400, description = "Listagem desconhecida")
    ),
    params(
        ("activity" = String, Path, description = "Letra da listagem (A a H)")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sub_activities(Path(activity): Path<String>) -> Result<impl IntoResponse, AppError> {
    let activity = parse_activity(&activity)?;
    let entries: Vec<CatalogEntry> = variant_registry::list_sub_activities(activity)
        .iter()
        .map(|s| CatalogEntry { code: s.code.to_string(), label: s.description.to_string() })
        .collect();
    Ok((StatusCode::OK, Json(entries)))
}

// GET /api/catalog/variants/{activity}/{sub_activity}
#[utoipa::path(
    get,
    path = "/api/catalog/variants/{activity}/{sub_activity}",
    tag = "Catalog",
    responses(
        (status = 200, description = "Template do Módulo 4 ou placeholder 'notImplemented'"),
        (status = 400, description = "Listagem desconhecida")
    ),
    params(
        ("activity" = String, Path, description = "Letra da listagem (A a H)"),
        ("sub_activity" = String, Path, description = "Código da sub-atividade")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_variant(Path((activity, sub_activity)): Path<(String, String)>) -> Result<impl IntoResponse, AppError> {
    let activity = parse_activity(&activity)?;
    Ok((StatusCode::OK, Json(variant_registry::lookup(activity, &sub_activity))))
}

// GET /api/catalog/options
#[utoipa::path(
    get,
    path = "/api/catalog/options",
    tag = "Catalog",
    responses(
        (status = 200, description = "Opções dos campos de seleção")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_options() -> impl IntoResponse {
    (StatusCode::OK, Json(OptionCatalogs::all()))
}
