// src/models/variant.rs
//
// Descritores declarativos do Módulo 4. Não referenciam componentes de
// tela: qualquer camada de renderização interpreta os mesmos dados.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::common::json_utils::{get_str_path, is_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "options", rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Boolean,
    Enum(&'static [&'static str]),
}

impl FieldKind {
    /// Valor de um campo ainda não preenchido.
    pub fn empty_value(self) -> Value {
        match self {
            FieldKind::Text | FieldKind::Enum(_) => Value::String(String::new()),
            FieldKind::Number | FieldKind::Date | FieldKind::Boolean => Value::Null,
        }
    }
}

/// Condição que revela um campo ou grupo (ex.: "possui APP?" = sim).
/// Os caminhos são absolutos no documento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "when", rename_all = "camelCase")]
pub enum Gate {
    IsTrue { path: &'static str },
    Equals { path: &'static str, value: &'static str },
    /// Como `Equals`, mas também abre com o controlador vazio (valor padrão).
    EqualsOrUnset { path: &'static str, value: &'static str },
    Contains { path: &'static str, value: &'static str },
}

impl Gate {
    pub fn path(&self) -> &'static str {
        match self {
            Gate::IsTrue { path }
            | Gate::Equals { path, .. }
            | Gate::EqualsOrUnset { path, .. }
            | Gate::Contains { path, .. } => *path,
        }
    }

    pub fn is_open(&self, document: &Value) -> bool {
        let current = get_str_path(document, self.path());
        match self {
            Gate::IsTrue { .. } => current.and_then(Value::as_bool).unwrap_or(false),
            Gate::Equals { value, .. } => current.and_then(Value::as_str) == Some(*value),
            Gate::EqualsOrUnset { value, .. } => is_blank(current) || current.and_then(Value::as_str) == Some(*value),
            Gate::Contains { value, .. } => current
                .and_then(Value::as_array)
                .is_some_and(|items| items.iter().any(|i| i.as_str() == Some(*value))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<Gate>,
}

impl FieldSpec {
    pub const fn text(key: &'static str, label: &'static str) -> Self {
        Self { key, label, kind: FieldKind::Text, required: false, gate: None }
    }

    pub const fn number(key: &'static str, label: &'static str) -> Self {
        Self { key, label, kind: FieldKind::Number, required: false, gate: None }
    }

    pub const fn date(key: &'static str, label: &'static str) -> Self {
        Self { key, label, kind: FieldKind::Date, required: false, gate: None }
    }

    pub const fn boolean(key: &'static str, label: &'static str) -> Self {
        Self { key, label, kind: FieldKind::Boolean, required: false, gate: None }
    }

    pub const fn choice(key: &'static str, label: &'static str, options: &'static [&'static str]) -> Self {
        Self { key, label, kind: FieldKind::Enum(options), required: false, gate: None }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn when(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }
}

/// Grupo repetível ("field array"): `modulo4.<key>[]`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayGroup {
    pub key: &'static str,
    pub label: &'static str,
    pub fields: &'static [FieldSpec],
    /// Mínimo de itens exigido na aprovação.
    pub min_items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<Gate>,
}

impl ArrayGroup {
    pub fn empty_element(&self) -> Value {
        Value::Object(empty_fields(self.fields))
    }
}

/// Registro único da variante: `modulo4.<key>.<campo>`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingletonGroup {
    pub key: &'static str,
    pub label: &'static str,
    pub fields: &'static [FieldSpec],
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub arrays: &'static [ArrayGroup],
    pub singletons: &'static [SingletonGroup],
}

impl VariantTemplate {
    /// Formato padrão do Módulo 4 para esta variante.
    pub fn default_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        for group in self.arrays {
            payload.insert(group.key.to_string(), Value::Array(Vec::new()));
        }
        for group in self.singletons {
            payload.insert(group.key.to_string(), Value::Object(empty_fields(group.fields)));
        }
        payload
    }

    pub fn array(&self, key: &str) -> Option<&'static ArrayGroup> {
        self.arrays.iter().find(|g| g.key == key)
    }

    /// Caminhos relativos (`<grupo>.<campo>` ou `<grupo>[].<campo>`) dos
    /// campos do tipo data.
    pub fn date_fields(&self) -> Vec<(&'static str, &'static str, bool)> {
        let arrays = self.arrays.iter().flat_map(|g| {
            g.fields
                .iter()
                .filter(|f| f.kind == FieldKind::Date)
                .map(move |f| (g.key, f.key, true))
        });
        let singletons = self.singletons.iter().flat_map(|g| {
            g.fields
                .iter()
                .filter(|f| f.kind == FieldKind::Date)
                .map(move |f| (g.key, f.key, false))
        });
        arrays.chain(singletons).collect()
    }
}

fn empty_fields(fields: &[FieldSpec]) -> Map<String, Value> {
    fields
        .iter()
        .map(|f| (f.key.to_string(), f.kind.empty_value()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CAMPOS: &[FieldSpec] = &[
        FieldSpec::text("nome", "Nome").required(),
        FieldSpec::number("quantidade", "Quantidade"),
    ];

    #[test]
    fn empty_element_uses_kind_defaults() {
        let group = ArrayGroup { key: "itens", label: "Itens", fields: CAMPOS, min_items: 1, gate: None };
        assert_eq!(group.empty_element(), json!({ "nome": "", "quantidade": null }));
    }

    #[test]
    fn gates_read_absolute_paths() {
        let doc = json!({ "area": { "possuiApp": true }, "anexos": ["Outros"], "geo": { "formato": "UTM" } });

        assert!(Gate::IsTrue { path: "area.possuiApp" }.is_open(&doc));
        assert!(Gate::Contains { path: "anexos", value: "Outros" }.is_open(&doc));
        assert!(Gate::Equals { path: "geo.formato", value: "UTM" }.is_open(&doc));
        assert!(!Gate::IsTrue { path: "area.inexistente" }.is_open(&doc));
    }

    #[test]
    fn unset_controller_opens_the_default_branch() {
        let gms = Gate::EqualsOrUnset { path: "geo.formato", value: "GMS" };

        assert!(gms.is_open(&json!({})));
        assert!(gms.is_open(&json!({ "geo": { "formato": "" } })));
        assert!(gms.is_open(&json!({ "geo": { "formato": "GMS" } })));
        assert!(!gms.is_open(&json!({ "geo": { "formato": "UTM" } })));
    }

    #[test]
    fn kinds_serialize_with_their_options() {
        let kind = FieldKind::Enum(&["Classe I", "Classe IIA"]);
        assert_eq!(
            serde_json::to_value(kind).unwrap(),
            json!({ "type": "enum", "options": ["Classe I", "Classe IIA"] })
        );
        assert_eq!(serde_json::to_value(FieldKind::Text).unwrap(), json!({ "type": "text" }));
    }
}
