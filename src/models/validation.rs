// src/models/validation.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::rca::ValidationMode;

/// Uma violação, indexada pelo caminho do campo (`modulo4.tanques[0].produto`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub path: String,
    /// Código estável ("required", "invalid_number", "invalid_option", ...)
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub mode: ValidationMode,
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new(mode: ValidationMode, mut violations: Vec<Violation>) -> Self {
        violations.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.code.cmp(&b.code)));
        violations.dedup();
        Self {
            mode,
            valid: violations.is_empty(),
            violations,
        }
    }

    pub fn has(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }

    pub fn code_at(&self, path: &str) -> Option<&str> {
        self.violations
            .iter()
            .find(|v| v.path == path)
            .map(|v| v.code.as_str())
    }
}
