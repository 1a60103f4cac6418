// src/services.rs

pub mod auth;
pub mod draft_sessions;
pub mod field_gates;
pub mod pdf_service;
pub mod rca_draft;
pub mod rca_validation;
pub mod reference_resolver;
pub mod variant_registry;
pub mod variant_templates;
