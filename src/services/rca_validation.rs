// src/services/rca_validation.rs
//
// Validação do relatório em dois níveis:
//  - draft: só a forma (o documento desserializa nos tipos e os valores do
//    Módulo 4 têm o tipo declarado no template);
//  - final: obrigatórios, catálogos, gates e faixas de coordenadas.

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::{
    common::json_utils::{get_str_path, is_blank, to_camel_case, DATE_FORMAT},
    models::{
        catalogs::{ANEXOS, DATUMS, IMPACTOS_MEIO_BIOTICO, IMPACTOS_MEIO_FISICO, IMPACTOS_MEIO_SOCIOECONOMICO, TIPOS_PESSOA, TIPOS_ZONA, UFS, ZEE_CLASSES},
        rca::{
            Activity, CaracterizacaoArea, DadosMunicipio, DocumentoReferencia, Empreendedor, Empreendimento,
            GeographicLocation, MedidaControle, RcaDocument, ReportStatus, ResponsaveisEstudo, ResponsavelAmbiental,
            ValidationMode, Zee,
        },
        validation::{ValidationReport, Violation},
        variant::{FieldKind, FieldSpec, VariantTemplate},
    },
    services::{
        field_gates::{is_gate_open, is_shared_field_active, SHARED_GATES},
        variant_registry::{is_valid_sub_activity, resolve_for_document},
    },
};

pub fn validate_document(document: &Value, mode: ValidationMode) -> ValidationReport {
    let mut violations = Vec::new();

    // 1. Forma dos módulos compartilhados
    let typed = check_shape(document, &mut violations);

    // 2. Tipos dos valores já preenchidos no Módulo 4
    let template = resolve_for_document(document);
    if let Some(template) = template {
        check_module4_kinds(template, document, &mut violations);
    }

    if mode == ValidationMode::Final {
        // 3. Obrigatórios incondicionais (derive do validator)
        if let Some(Err(errors)) = typed.as_ref().map(Validate::validate) {
            collect_validator_errors("", &errors, &mut violations);
        }

        // 4. Regras que dependem de outras respostas
        check_selection(document, &mut violations);
        check_location(document, &mut violations);
        check_gated_shared_fields(document, &mut violations);
        check_catalogs(document, &mut violations);

        // 5. Obrigatórios da variante (sem variante registrada não há Módulo 4 a exigir)
        if let Some(template) = template {
            check_module4_required(template, document, &mut violations);
        }
    }

    ValidationReport::new(mode, violations)
}

// ---
// Violações
// ---

fn default_message(code: &str) -> &'static str {
    match code {
        "required" => "Campo obrigatório",
        "invalid_number" => "Informe um número",
        "invalid_date_format" => "Data inválida (use AAAA-MM-DD)",
        "invalid_boolean" => "Informe sim ou não",
        "invalid_list" => "Deve ser uma lista",
        "invalid_text" => "Deve ser um texto",
        "invalid_option" => "Opção fora do catálogo",
        "invalid_range" => "Valor fora do intervalo permitido",
        _ => "Valor inválido",
    }
}

fn push(out: &mut Vec<Violation>, path: impl Into<String>, code: &str) {
    out.push(Violation {
        path: path.into(),
        code: code.to_string(),
        message: default_message(code).to_string(),
    });
}

fn push_with(out: &mut Vec<Violation>, path: impl Into<String>, code: &str, message: String) {
    out.push(Violation {
        path: path.into(),
        code: code.to_string(),
        message,
    });
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Achata os erros do `validator` em caminhos camelCase (`socioeconomia[0].municipio`).
fn collect_validator_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<Violation>) {
    for (field, kind) in errors.errors() {
        let path = join(prefix, &to_camel_case(field));
        match kind {
            ValidationErrorsKind::Field(list) => {
                for e in list {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| default_message(&e.code).to_string());
                    push_with(out, path.clone(), &e.code, message);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_validator_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validator_errors(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

// ---
// Forma
// ---

type ShapeCheck = fn(&Value) -> Result<(), serde_json::Error>;

fn shape_of<T: DeserializeOwned>(value: &Value) -> Result<(), serde_json::Error> {
    T::deserialize(value).map(|_| ())
}

const SHAPES: &[(&str, ShapeCheck)] = &[
    ("activity", shape_of::<Option<Activity>>),
    ("subActivity", shape_of::<String>),
    ("status", shape_of::<Option<ReportStatus>>),
    ("clientId", shape_of::<String>),
    ("projectId", shape_of::<String>),
    ("documentoReferencia", shape_of::<DocumentoReferencia>),
    ("empreendedor", shape_of::<Empreendedor>),
    ("empreendimento", shape_of::<Empreendimento>),
    ("responsavelAmbiental", shape_of::<ResponsavelAmbiental>),
    ("responsaveisEstudo", shape_of::<ResponsaveisEstudo>),
    ("geographicLocation", shape_of::<GeographicLocation>),
    ("caracterizacaoArea", shape_of::<CaracterizacaoArea>),
    ("modulo4", shape_of::<serde_json::Map<String, Value>>),
    ("impactosMeioFisico", shape_of::<Vec<String>>),
    ("impactosMeioBiotico", shape_of::<Vec<String>>),
    ("impactosMeioSocioeconomico", shape_of::<Vec<String>>),
    ("zee", shape_of::<Zee>),
    ("socioeconomia", shape_of::<Vec<DadosMunicipio>>),
    ("medidasControle", shape_of::<Vec<MedidaControle>>),
    ("anexos", shape_of::<Vec<String>>),
    ("anexosOutros", shape_of::<String>),
];

/// Desserializa o documento inteiro; se falhar, aponta o módulo culpado.
fn check_shape(document: &Value, out: &mut Vec<Violation>) -> Option<RcaDocument> {
    match RcaDocument::deserialize(document) {
        Ok(doc) => return Some(doc),
        Err(e) if !document.is_object() => {
            push_with(out, "", "invalid_type", e.to_string());
            return None;
        }
        Err(_) => {}
    }

    for (key, check) in SHAPES {
        if let Some(value) = document.get(*key) {
            if let Err(e) = check(value) {
                push_with(out, *key, "invalid_type", e.to_string());
            }
        }
    }
    None
}

// ---
// Módulo 4
// ---

/// Código de erro quando o valor não tem o tipo declarado. Vazio não é
/// checado aqui (é assunto do "required").
fn kind_violation(kind: FieldKind, value: &Value) -> Option<&'static str> {
    let ok = match kind {
        FieldKind::Text => value.is_string(),
        FieldKind::Number => value.is_number(),
        FieldKind::Boolean => value.is_boolean(),
        FieldKind::Date => value
            .as_str()
            .is_some_and(|s| chrono::NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok()),
        FieldKind::Enum(options) => return (!value.as_str().is_some_and(|s| options.contains(&s))).then_some("invalid_option"),
    };
    if ok {
        return None;
    }
    Some(match kind {
        FieldKind::Number => "invalid_number",
        FieldKind::Date => "invalid_date_format",
        FieldKind::Boolean => "invalid_boolean",
        _ => "invalid_text",
    })
}

fn check_record_kinds(fields: &[FieldSpec], record: &Value, prefix: &str, out: &mut Vec<Violation>) {
    let Some(obj) = record.as_object() else {
        push(out, prefix, "invalid_type");
        return;
    };
    for field in fields {
        let value = obj.get(field.key);
        if is_blank(value) {
            continue;
        }
        if let Some(code) = value.and_then(|v| kind_violation(field.kind, v)) {
            push(out, join(prefix, field.key), code);
        }
    }
}

fn check_module4_kinds(template: &VariantTemplate, document: &Value, out: &mut Vec<Violation>) {
    let Some(modulo4) = document.get("modulo4").and_then(Value::as_object) else {
        return;
    };

    for group in template.arrays {
        let path = format!("modulo4.{}", group.key);
        match modulo4.get(group.key) {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    check_record_kinds(group.fields, item, &format!("{}[{}]", path, index), out);
                }
            }
            Some(_) => push(out, path, "invalid_list"),
        }
    }

    for group in template.singletons {
        match modulo4.get(group.key) {
            None | Some(Value::Null) => {}
            Some(record) => check_record_kinds(group.fields, record, &format!("modulo4.{}", group.key), out),
        }
    }
}

fn check_record_required(fields: &[FieldSpec], record: Option<&Value>, prefix: &str, document: &Value, out: &mut Vec<Violation>) {
    for field in fields.iter().filter(|f| f.required) {
        if !is_gate_open(field.gate.as_ref(), document) {
            continue;
        }
        if is_blank(record.and_then(|r| r.get(field.key))) {
            push(out, join(prefix, field.key), "required");
        }
    }
}

fn check_module4_required(template: &VariantTemplate, document: &Value, out: &mut Vec<Violation>) {
    let modulo4 = document.get("modulo4");

    for group in template.arrays {
        if !is_gate_open(group.gate.as_ref(), document) {
            continue;
        }
        let path = format!("modulo4.{}", group.key);
        let items = modulo4
            .and_then(|m| m.get(group.key))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        if items.len() < group.min_items {
            push_with(
                out,
                path.clone(),
                "min_items",
                format!("Informe ao menos {} item(ns) em '{}'", group.min_items, group.label),
            );
        }
        for (index, item) in items.iter().enumerate() {
            check_record_required(group.fields, Some(item), &format!("{}[{}]", path, index), document, out);
        }
    }

    for group in template.singletons {
        let record = modulo4.and_then(|m| m.get(group.key));
        check_record_required(group.fields, record, &format!("modulo4.{}", group.key), document, out);
    }
}

// ---
// Módulos compartilhados
// ---

fn str_at<'a>(document: &'a Value, path: &str) -> Option<&'a str> {
    get_str_path(document, path).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn check_selection(document: &Value, out: &mut Vec<Violation>) {
    let activity = str_at(document, "activity");
    let sub_activity = str_at(document, "subActivity");

    let Some(activity) = activity else {
        push(out, "activity", "required");
        return;
    };
    let Some(sub_activity) = sub_activity else {
        push(out, "subActivity", "required");
        return;
    };
    match activity.parse::<Activity>() {
        Ok(a) if is_valid_sub_activity(a, sub_activity) => {}
        Ok(_) => push(out, "subActivity", "invalid_option"),
        Err(_) => push(out, "activity", "invalid_option"),
    }
}

fn check_number_range(document: &Value, path: &str, min: f64, max: f64, max_inclusive: bool, out: &mut Vec<Violation>) {
    match get_str_path(document, path) {
        None | Some(Value::Null) => push(out, path, "required"),
        Some(Value::Number(n)) => {
            let v = n.as_f64().unwrap_or(f64::NAN);
            let below_max = if max_inclusive { v <= max } else { v < max };
            if !(v >= min && below_max) {
                push(out, path, "invalid_range");
            }
        }
        Some(_) => push(out, path, "invalid_number"),
    }
}

fn check_location(document: &Value, out: &mut Vec<Violation>) {
    match str_at(document, "geographicLocation.datum") {
        None => push(out, "geographicLocation.datum", "required"),
        Some(datum) if !DATUMS.contains(&datum) => push(out, "geographicLocation.datum", "invalid_option"),
        Some(_) => {}
    }

    if is_shared_field_active("geographicLocation.latitude", document) {
        for (axis, max_degrees) in [("latitude", 90.0), ("longitude", 180.0)] {
            let base = format!("geographicLocation.{}", axis);
            check_number_range(document, &format!("{}.graus", base), 0.0, max_degrees, true, out);
            check_number_range(document, &format!("{}.minutos", base), 0.0, 60.0, false, out);
            check_number_range(document, &format!("{}.segundos", base), 0.0, 60.0, false, out);
        }
    }

    if is_shared_field_active("geographicLocation.utm", document) {
        check_number_range(document, "geographicLocation.utm.x", 0.0, f64::MAX, true, out);
        check_number_range(document, "geographicLocation.utm.y", 0.0, f64::MAX, true, out);
        // Fusos que cobrem o território brasileiro
        check_number_range(document, "geographicLocation.utm.fuso", 18.0, 25.0, true, out);
    }
}

fn check_gated_shared_fields(document: &Value, out: &mut Vec<Violation>) {
    for path in ["caracterizacaoArea.possuiApp", "caracterizacaoArea.possuiReservaLegal"] {
        if get_str_path(document, path).and_then(Value::as_bool).is_none() {
            push(out, path, "required");
        }
    }

    // Coordenadas têm regras próprias em check_location
    for (path, _) in SHARED_GATES.iter().filter(|(p, _)| !p.starts_with("geographicLocation.")) {
        if is_shared_field_active(path, document) && is_blank(get_str_path(document, path)) {
            push(out, *path, "required");
        }
    }
}

fn check_option(document: &Value, path: &str, catalog: &[&str], out: &mut Vec<Violation>) {
    if let Some(value) = str_at(document, path) {
        if !catalog.contains(&value) {
            push(out, path, "invalid_option");
        }
    }
}

fn check_checklist(document: &Value, path: &str, catalog: &[&str], out: &mut Vec<Violation>) {
    let Some(items) = get_str_path(document, path).and_then(Value::as_array) else {
        return;
    };
    for (index, item) in items.iter().enumerate() {
        if !item.as_str().is_some_and(|s| catalog.contains(&s)) {
            push(out, format!("{}[{}]", path, index), "invalid_option");
        }
    }
}

fn check_catalogs(document: &Value, out: &mut Vec<Violation>) {
    check_option(document, "empreendedor.tipoPessoa", TIPOS_PESSOA, out);
    check_option(document, "empreendedor.uf", UFS, out);
    check_option(document, "empreendimento.tipoZona", TIPOS_ZONA, out);
    check_option(document, "empreendimento.uf", UFS, out);

    check_checklist(document, "impactosMeioFisico", IMPACTOS_MEIO_FISICO, out);
    check_checklist(document, "impactosMeioBiotico", IMPACTOS_MEIO_BIOTICO, out);
    check_checklist(document, "impactosMeioSocioeconomico", IMPACTOS_MEIO_SOCIOECONOMICO, out);
    check_checklist(document, "anexos", ANEXOS, out);

    for factor in Zee::FACTORS {
        check_option(document, &format!("zee.{}", factor), ZEE_CLASSES, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::approvable_posto;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn complete_report_passes_final_validation() {
        let report = validate_document(&approvable_posto(), ValidationMode::Final);
        assert_eq!(report.violations, vec![]);
        assert!(report.valid);
    }

    #[test]
    fn draft_mode_ignores_missing_required_fields() {
        let doc = json!({ "activity": "F", "subActivity": "F-06-01-7", "modulo4": { "tanques": [{}] } });
        assert!(validate_document(&doc, ValidationMode::Draft).valid);
    }

    #[test]
    fn draft_mode_reports_type_errors_by_module() {
        let doc = json!({ "empreendedor": "texto solto", "caracterizacaoArea": { "areaTotalHa": "dez" } });
        let report = validate_document(&doc, ValidationMode::Draft);

        assert_eq!(report.code_at("empreendedor"), Some("invalid_type"));
        assert_eq!(report.code_at("caracterizacaoArea"), Some("invalid_type"));
    }

    #[rstest]
    #[case(json!("quinze"), "invalid_number")]
    #[case(json!(true), "invalid_number")]
    fn module4_kind_errors_show_in_draft_mode(#[case] value: Value, #[case] code: &str) {
        let mut doc = approvable_posto();
        doc["modulo4"]["tanques"][0]["capacidadeM3"] = value;

        let report = validate_document(&doc, ValidationMode::Draft);
        assert_eq!(report.code_at("modulo4.tanques[0].capacidadeM3"), Some(code));
    }

    #[test]
    fn enum_fields_reject_values_outside_options() {
        let mut doc = approvable_posto();
        doc["modulo4"]["tanques"][0]["produto"] = json!("Querosene");

        let report = validate_document(&doc, ValidationMode::Draft);
        assert_eq!(report.code_at("modulo4.tanques[0].produto"), Some("invalid_option"));
    }

    #[test]
    fn missing_module4_field_blocks_approval() {
        let mut doc = approvable_posto();
        doc["modulo4"]["capacidadeEstocagem"]["cotaMaxima"] = Value::Null;

        let report = validate_document(&doc, ValidationMode::Final);
        assert_eq!(report.code_at("modulo4.capacidadeEstocagem.cotaMaxima"), Some("required"));
    }

    #[test]
    fn min_items_counts_only_open_groups() {
        let mut doc = approvable_posto();
        assert!(!validate_document(&doc, ValidationMode::Final).has("modulo4.caixasSeparadoras"));

        doc["modulo4"]["instalacoes"]["possuiLavagem"] = json!(true);
        let report = validate_document(&doc, ValidationMode::Final);
        assert_eq!(report.code_at("modulo4.caixasSeparadoras"), Some("min_items"));
    }

    #[test]
    fn gated_app_fields_become_required() {
        let mut doc = approvable_posto();
        doc["caracterizacaoArea"]["possuiApp"] = json!(true);
        doc["caracterizacaoArea"]["intervencaoApp"] = json!(true);

        let report = validate_document(&doc, ValidationMode::Final);

        assert!(report.has("caracterizacaoArea.areaAppHa"));
        assert!(report.has("caracterizacaoArea.numeroAutorizacaoIntervencao"));
    }

    #[test]
    fn outros_attachment_requires_description() {
        let mut doc = approvable_posto();
        doc["anexos"] = json!(["Outros"]);

        let report = validate_document(&doc, ValidationMode::Final);
        assert_eq!(report.code_at("anexosOutros"), Some("required"));
    }

    #[test]
    fn utm_coordinates_are_checked_only_in_utm_format() {
        let mut doc = approvable_posto();
        doc["geographicLocation"]["formato"] = json!("UTM");
        doc["geographicLocation"]["utm"] = json!({ "x": 512345.0, "y": 7765432.0, "fuso": 30 });

        let report = validate_document(&doc, ValidationMode::Final);

        assert_eq!(report.code_at("geographicLocation.utm.fuso"), Some("invalid_range"));
        assert!(!report.has("geographicLocation.latitude.graus"));
    }

    #[test]
    fn missing_coordinate_format_checks_gms_coordinates() {
        let mut doc = approvable_posto();
        doc["geographicLocation"].as_object_mut().unwrap().remove("formato");
        assert!(validate_document(&doc, ValidationMode::Final).valid);

        doc["geographicLocation"]["latitude"]["graus"] = json!(95);
        let report = validate_document(&doc, ValidationMode::Final);
        assert_eq!(report.code_at("geographicLocation.latitude.graus"), Some("invalid_range"));
    }

    #[test]
    fn shared_required_fields_use_camel_case_paths() {
        let mut doc = approvable_posto();
        doc["documentoReferencia"]["dataEmissao"] = Value::Null;
        doc["socioeconomia"] = json!([{ "municipio": "" }]);

        let report = validate_document(&doc, ValidationMode::Final);

        assert!(report.has("documentoReferencia.dataEmissao"));
        assert!(report.has("socioeconomia[0].municipio"));
    }

    #[test]
    fn sub_activity_must_belong_to_the_listing() {
        let mut doc = approvable_posto();
        doc["subActivity"] = json!("A-02-09-7");

        let report = validate_document(&doc, ValidationMode::Final);
        assert_eq!(report.code_at("subActivity"), Some("invalid_option"));
    }

    #[test]
    fn unregistered_variant_does_not_require_module4() {
        let mut doc = approvable_posto();
        doc["subActivity"] = json!("F-01-01-5");
        doc["modulo4"] = json!({});

        assert!(validate_document(&doc, ValidationMode::Final).valid);
    }
}
