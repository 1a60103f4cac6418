// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;


use crate::{config::AppState, docs::ApiDoc, middleware::auth::auth_guard};

/// Monta todas as rotas. Tudo sob `/api`, exceto `health`, exige JWT.
pub fn build_router(app_state: AppState) -> Router {
    let catalog_routes = Router::new()
        .route("/activities", get(handlers::catalog::list_activities))
        .route("/activities/{activity}/sub-activities", get(handlers::catalog::list_sub_activities))
        .route("/variants/{activity}/{sub_activity}", get(handlers::catalog::get_variant))
        .route("/options", get(handlers::catalog::get_options));

    let draft_routes = Router::new()
        .route("/", post(handlers::drafts::open_draft))
        .route(
            "/{id}",
            get(handlers::drafts::get_draft).delete(handlers::drafts::discard_draft),
        )
        .route("/{id}/operations", post(handlers::drafts::apply_operations))
        .route("/{id}/client", post(handlers::drafts::select_client))
        .route("/{id}/project", post(handlers::drafts::select_project))
        .route("/{id}/references/reload", post(handlers::drafts::reload_references))
        .route("/{id}/validate", post(handlers::drafts::validate_draft))
        .route("/{id}/save", post(handlers::drafts::save_draft));

    let rca_routes = Router::new()
        .route("/", get(handlers::rcas::list_rcas))
        .route("/{id}", get(handlers::rcas::get_rca))
        .route("/{id}/pdf", get(handlers::rcas::generate_rca_pdf));

    let protected = Router::new()
        .nest("/catalog", catalog_routes)
        .nest("/drafts", draft_routes)
        .nest("/rcas", rca_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .with_state(app_state)
}
