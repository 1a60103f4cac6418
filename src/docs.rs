// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::db;
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Catálogo ---
        handlers::catalog::list_activities,
        handlers::catalog::list_sub_activities,
        handlers::catalog::get_variant,
        handlers::catalog::get_options,

        // --- Rascunhos ---
        handlers::drafts::open_draft,
        handlers::drafts::get_draft,
        handlers::drafts::discard_draft,
        handlers::drafts::apply_operations,
        handlers::drafts::select_client,
        handlers::drafts::select_project,
        handlers::drafts::reload_references,
        handlers::drafts::validate_draft,
        handlers::drafts::save_draft,

        // --- RCAs ---
        handlers::rcas::list_rcas,
        handlers::rcas::get_rca,
        handlers::rcas::generate_rca_pdf,
    ),
    components(
        schemas(
            // --- Documento ---
            models::rca::Activity,
            models::rca::ReportStatus,
            models::rca::ValidationMode,
            models::rca::CoordinateFormat,
            models::rca::RcaDocument,

            // --- Validação ---
            models::validation::Violation,
            models::validation::ValidationReport,

            // --- Rascunhos ---
            services::field_gates::ActiveFields,
            services::rca_draft::SaveOutcome,
            db::StoredDocument,
            handlers::catalog::CatalogEntry,
            handlers::drafts::OpenDraftPayload,
            handlers::drafts::DraftOperation,
            handlers::drafts::OperationsPayload,
            handlers::drafts::SelectReferencePayload,
            handlers::drafts::ValidatePayload,
            handlers::drafts::SavePayload,
            handlers::drafts::DraftView,
        )
    ),
    tags(
        (name = "Catalog", description = "Listagens, sub-atividades e templates do Módulo 4"),
        (name = "Drafts", description = "Edição de RCAs em rascunho"),
        (name = "RCAs", description = "Relatórios gravados e exportação em PDF")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
