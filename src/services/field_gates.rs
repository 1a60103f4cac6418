// src/services/field_gates.rs
//
// Campos condicionais: perguntas que só existem quando outra resposta as
// revela (APP, reserva legal, formato de coordenada, anexo "Outros").

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    common::json_utils::{get_str_path, is_blank},
    models::{catalogs::ANEXO_OUTROS, variant::{Gate, VariantTemplate}},
    services::variant_registry::resolve_for_document,
};

/// Campos compartilhados (Módulos 1 a 7, exceto o 4) e o que os revela.
pub const SHARED_GATES: &[(&str, Gate)] = &[
    ("caracterizacaoArea.intervencaoApp", Gate::IsTrue { path: "caracterizacaoArea.possuiApp" }),
    ("caracterizacaoArea.areaAppHa", Gate::IsTrue { path: "caracterizacaoArea.possuiApp" }),
    (
        "caracterizacaoArea.numeroAutorizacaoIntervencao",
        Gate::IsTrue { path: "caracterizacaoArea.intervencaoApp" },
    ),
    (
        "caracterizacaoArea.areaReservaLegalHa",
        Gate::IsTrue { path: "caracterizacaoArea.possuiReservaLegal" },
    ),
    // Sem formato escolhido, vale GMS
    ("geographicLocation.latitude", Gate::EqualsOrUnset { path: "geographicLocation.formato", value: "GMS" }),
    ("geographicLocation.longitude", Gate::EqualsOrUnset { path: "geographicLocation.formato", value: "GMS" }),
    ("geographicLocation.utm", Gate::Equals { path: "geographicLocation.formato", value: "UTM" }),
    ("anexosOutros", Gate::Contains { path: "anexos", value: ANEXO_OUTROS }),
];

fn shared_gate(path: &str) -> Option<&'static Gate> {
    SHARED_GATES.iter().find(|(p, _)| *p == path).map(|(_, g)| g)
}

/// Um campo compartilhado está ativo quando o seu gate está aberto e o
/// campo que o controla também está ativo (gates encadeados).
pub fn is_shared_field_active(path: &str, document: &Value) -> bool {
    match shared_gate(path) {
        None => true,
        Some(gate) => gate.is_open(document) && is_shared_field_active(gate.path(), document),
    }
}

/// Gate de Módulo 4: o controlador também pode ser condicional.
pub fn is_gate_open(gate: Option<&Gate>, document: &Value) -> bool {
    gate.is_none_or(|g| g.is_open(document) && is_shared_field_active(g.path(), document))
}

/// Módulo 4 só existe depois de atividade e sub-atividade escolhidas.
pub fn module4_enabled(document: &Value) -> bool {
    !is_blank(get_str_path(document, "activity")) && !is_blank(get_str_path(document, "subActivity"))
}

/// Visão dos campos ativos, consumida pela camada de renderização.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFields {
    pub module4_enabled: bool,
    pub variant_id: Option<String>,
    /// Caminho -> ativo. Grupos de lista usam `grupo[].campo`.
    pub fields: BTreeMap<String, bool>,
}

pub fn active_fields(document: &Value) -> ActiveFields {
    let mut fields: BTreeMap<String, bool> = SHARED_GATES
        .iter()
        .map(|(path, _)| (path.to_string(), is_shared_field_active(path, document)))
        .collect();

    let enabled = module4_enabled(document);
    let template = if enabled { resolve_for_document(document) } else { None };
    if let Some(template) = template {
        collect_module4_gates(template, document, &mut fields);
    }

    ActiveFields {
        module4_enabled: enabled,
        variant_id: template.map(|t| t.id.to_string()),
        fields,
    }
}

fn collect_module4_gates(template: &VariantTemplate, document: &Value, out: &mut BTreeMap<String, bool>) {
    for group in template.arrays {
        let group_open = is_gate_open(group.gate.as_ref(), document);
        if group.gate.is_some() {
            out.insert(format!("modulo4.{}", group.key), group_open);
        }
        for field in group.fields.iter().filter(|f| f.gate.is_some()) {
            out.insert(
                format!("modulo4.{}[].{}", group.key, field.key),
                group_open && is_gate_open(field.gate.as_ref(), document),
            );
        }
    }
    for group in template.singletons {
        for field in group.fields.iter().filter(|f| f.gate.is_some()) {
            out.insert(
                format!("modulo4.{}.{}", group.key, field.key),
                is_gate_open(field.gate.as_ref(), document),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn app_questions_follow_the_presence_boolean() {
        let mut doc = json!({ "caracterizacaoArea": { "possuiApp": false, "intervencaoApp": true } });
        assert!(!is_shared_field_active("caracterizacaoArea.areaAppHa", &doc));
        // intervencaoApp = true não vale enquanto a própria pergunta está oculta
        assert!(!is_shared_field_active("caracterizacaoArea.numeroAutorizacaoIntervencao", &doc));

        doc["caracterizacaoArea"]["possuiApp"] = json!(true);
        assert!(is_shared_field_active("caracterizacaoArea.areaAppHa", &doc));
        assert!(is_shared_field_active("caracterizacaoArea.numeroAutorizacaoIntervencao", &doc));
    }

    #[test]
    fn coordinate_format_selects_one_set() {
        let doc = json!({ "geographicLocation": { "formato": "UTM" } });
        let view = active_fields(&doc);

        assert_eq!(view.fields["geographicLocation.utm"], true);
        assert_eq!(view.fields["geographicLocation.latitude"], false);
    }

    #[test]
    fn missing_coordinate_format_means_gms() {
        let doc = json!({ "geographicLocation": { "datum": "SIRGAS 2000" } });
        let view = active_fields(&doc);

        assert_eq!(view.fields["geographicLocation.latitude"], true);
        assert_eq!(view.fields["geographicLocation.longitude"], true);
        assert_eq!(view.fields["geographicLocation.utm"], false);
    }

    #[test]
    fn module4_gates_only_appear_for_the_selected_variant() {
        let doc = json!({
            "activity": "F",
            "subActivity": "F-06-01-7",
            "modulo4": { "instalacoes": { "possuiLavagem": true } }
        });
        let view = active_fields(&doc);

        assert!(view.module4_enabled);
        assert_eq!(view.variant_id.as_deref(), Some("posto-combustiveis"));
        assert_eq!(view.fields["modulo4.caixasSeparadoras"], true);

        let empty = active_fields(&json!({ "activity": "F" }));
        assert!(!empty.module4_enabled);
        assert!(!empty.fields.contains_key("modulo4.caixasSeparadoras"));
    }
}
