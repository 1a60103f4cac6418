// src/services/rca_draft.rs
//
// Rascunho do RCA: o documento em edição, as mutações que o formulário
// faz sobre ele e o salvamento.

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::{
    common::{
        error::{DraftError, SaveError},
        json_utils::{
            coerce_date, deep_merge, get_existing_mut, get_path, get_path_mut, get_str_path, prune_empty, set_path,
            FieldPath, PathSegment,
        },
    },
    db::document_store::{DocumentStore, StoreOperation, StoredDocument},
    models::{
        rca::{default_document, Activity, DadosMunicipio, MedidaControle, Profissional, ReportStatus, ValidationMode, DATE_FIELDS},
        validation::ValidationReport,
        variant::{FieldKind, FieldSpec, VariantTemplate},
    },
    services::{
        field_gates::{active_fields, ActiveFields},
        reference_resolver::{resolve_client_defaults, resolve_project_defaults, DraftPatch, ReferenceIndex},
        rca_validation::validate_document,
        variant_registry::{is_valid_sub_activity, resolve_for_document, resolve_variant},
    },
};

pub const RCAS_COLLECTION: &str = "rcas";

/// Resultado de um salvamento bem-sucedido.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub id: String,
    pub status: ReportStatus,
    pub created: bool,
    /// Pendências encontradas; só bloqueiam na aprovação.
    pub report: ValidationReport,
}

#[derive(Debug, Clone)]
pub struct ReportDraft {
    document: Value,
    id: Option<String>,
    /// Última versão gravada (ou a carregada), já limpa.
    baseline: Value,
}

impl ReportDraft {
    /// Sem documento: formato padrão. Com documento: `merge(padrões, armazenado)`,
    /// com o Módulo 4 da variante gravada e as datas normalizadas.
    pub fn initialize(existing: Option<&Value>) -> Self {
        let document = match existing {
            None => default_document(),
            Some(stored) => {
                let mut defaults = default_document();
                if let Some(template) = resolve_for_document(stored) {
                    defaults["modulo4"] = Value::Object(template.default_payload());
                }
                let mut merged = deep_merge(defaults, stored.clone());
                coerce_date_fields(&mut merged);
                merged
            }
        };

        let mut draft = Self { document, id: None, baseline: Value::Null };
        draft.baseline = draft.serialize();
        draft
    }

    pub fn from_stored(stored: &StoredDocument) -> Self {
        let mut draft = Self::initialize(Some(&stored.data));
        draft.id = Some(stored.id.clone());
        draft
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn status(&self) -> ReportStatus {
        get_str_path(&self.document, "status")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    pub fn activity(&self) -> Option<Activity> {
        get_str_path(&self.document, "activity")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    pub fn sub_activity(&self) -> &str {
        get_str_path(&self.document, "subActivity")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn variant(&self) -> Option<&'static VariantTemplate> {
        resolve_for_document(&self.document)
    }

    pub fn active_fields(&self) -> ActiveFields {
        active_fields(&self.document)
    }

    // ---
    // Mutações
    // ---

    /// Grava um campo. Sem validação aqui; `activity` e `subActivity` passam
    /// pelas operações próprias porque mudam a forma do documento.
    pub fn set_scalar(&mut self, raw_path: &str, value: Value) -> Result<(), DraftError> {
        let path = FieldPath::parse(raw_path)?;

        // Esses campos são folhas: nada abaixo deles
        if matches!(path.root_key(), Some("activity" | "subActivity" | "status")) && path.segments().len() > 1 {
            return Err(DraftError::InvalidPath(raw_path.to_string()));
        }

        if path.is_key("activity") {
            let activity = match &value {
                Value::Null => None,
                Value::String(s) if s.trim().is_empty() => None,
                Value::String(s) => Some(s.parse::<Activity>().map_err(|_| DraftError::InvalidValue {
                    path: raw_path.to_string(),
                    reason: format!("listagem desconhecida '{}'", s),
                })?),
                _ => {
                    return Err(DraftError::InvalidValue {
                        path: raw_path.to_string(),
                        reason: "informe a letra da listagem".to_string(),
                    })
                }
            };
            self.set_activity(activity);
            return Ok(());
        }
        if path.is_key("subActivity") {
            let code = match &value {
                Value::Null => "",
                Value::String(s) => s.as_str(),
                _ => {
                    return Err(DraftError::InvalidValue {
                        path: raw_path.to_string(),
                        reason: "informe o código da sub-atividade".to_string(),
                    })
                }
            };
            return self.set_sub_activity(code);
        }
        if path.is_key("status") {
            return Err(DraftError::ReadOnlyField(raw_path.to_string()));
        }

        let value = self.normalize_leaf(&path, value);
        set_path(&mut self.document, &path, value)
    }

    /// Troca a listagem. Mudou a listagem, a sub-atividade é limpa.
    pub fn set_activity(&mut self, activity: Option<Activity>) {
        if self.activity() == activity {
            return;
        }
        self.document["activity"] = activity.map_or(Value::Null, |a| Value::String(a.code().to_string()));
        self.document["subActivity"] = Value::String(String::new());
    }

    /// Escolhe a sub-atividade e completa o Módulo 4 com os padrões da variante.
    pub fn set_sub_activity(&mut self, code: &str) -> Result<(), DraftError> {
        let code = code.trim();
        if code.is_empty() {
            self.document["subActivity"] = Value::String(String::new());
            return Ok(());
        }

        let activity = self.activity().ok_or(DraftError::ActivityRequired)?;
        if !is_valid_sub_activity(activity, code) {
            return Err(DraftError::InvalidSubActivity {
                activity: activity.code().to_string(),
                sub_activity: code.to_string(),
            });
        }
        self.document["subActivity"] = Value::String(code.to_string());

        if let Some(template) = resolve_variant(activity, code) {
            // Dados já digitados no Módulo 4 são mantidos
            let current = self.document.get("modulo4").cloned().unwrap_or(Value::Null);
            self.document["modulo4"] = deep_merge(Value::Object(template.default_payload()), current);
        }
        Ok(())
    }

    /// Acrescenta um item no fim da lista. Sem elemento, usa o item vazio
    /// do grupo (Módulo 4 ou listas compartilhadas). Retorna o novo tamanho.
    pub fn append_array_item(&mut self, raw_path: &str, element: Option<Value>) -> Result<usize, DraftError> {
        let path = FieldPath::parse(raw_path)?;
        let element = match element {
            Some(e) => e,
            None => self.empty_element(&path).ok_or_else(|| DraftError::InvalidValue {
                path: raw_path.to_string(),
                reason: "lista sem item padrão; informe o elemento".to_string(),
            })?,
        };

        let slot = get_path_mut(&mut self.document, &path)?;
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        let items = slot
            .as_array_mut()
            .ok_or_else(|| DraftError::NotAnArray(path.to_string()))?;
        items.push(element);
        Ok(items.len())
    }

    /// Remove por posição; os itens seguintes sobem uma posição.
    pub fn remove_array_item(&mut self, raw_path: &str, index: usize) -> Result<Value, DraftError> {
        let path = FieldPath::parse(raw_path)?;
        let items = get_existing_mut(&mut self.document, &path)?
            .as_array_mut()
            .ok_or_else(|| DraftError::NotAnArray(path.to_string()))?;

        if index >= items.len() {
            return Err(DraftError::IndexOutOfBounds {
                path: path.to_string(),
                index,
                len: items.len(),
            });
        }
        Ok(items.remove(index))
    }

    /// Sobrescreve os campos do patch, sem olhar o que havia antes.
    pub fn apply_patch(&mut self, patch: &DraftPatch) -> Result<(), DraftError> {
        for (raw_path, value) in patch.entries() {
            let path = FieldPath::parse(raw_path)?;
            set_path(&mut self.document, &path, value.clone())?;
        }
        Ok(())
    }

    pub fn select_client(&mut self, client_id: &str, references: &ReferenceIndex) -> Result<(), DraftError> {
        if !references.is_loaded() {
            return Err(DraftError::ReferencesLoading);
        }
        let patch = resolve_client_defaults(client_id, references.client(client_id));
        self.apply_patch(&patch)
    }

    pub fn select_project(&mut self, project_id: &str, references: &ReferenceIndex) -> Result<(), DraftError> {
        if !references.is_loaded() {
            return Err(DraftError::ReferencesLoading);
        }
        let patch = resolve_project_defaults(project_id, references.project(project_id), references.clients());
        self.apply_patch(&patch)
    }

    // ---
    // Validação e gravação
    // ---

    pub fn validate(&self, mode: ValidationMode) -> ValidationReport {
        validate_document(&self.document, mode)
    }

    /// Documento limpo: sem "", [], {} e null em nenhum nível.
    pub fn serialize(&self) -> Value {
        prune_empty(&self.document).unwrap_or_else(|| Value::Object(Map::new()))
    }

    pub fn is_dirty(&self) -> bool {
        self.serialize() != self.baseline
    }

    /// Valida no modo do status pedido e grava em `rcas` (cria ou substitui o
    /// corpo inteiro, para que remoções também persistam).
    /// Em qualquer falha o rascunho fica exatamente como estava.
    pub async fn save(&mut self, status: ReportStatus, store: &dyn DocumentStore) -> Result<SaveOutcome, SaveError> {
        let mut candidate = self.document.clone();
        candidate["status"] = serde_json::to_value(status).unwrap_or(Value::Null);

        // 1. Validação (aprovação bloqueia; rascunho só informa)
        let mode = ValidationMode::from(status);
        let report = validate_document(&candidate, mode);
        if mode == ValidationMode::Final && !report.valid {
            return Err(SaveError::Validation(report));
        }

        // 2. Limpeza
        let payload = prune_empty(&candidate).unwrap_or_else(|| Value::Object(Map::new()));

        // 3. Gravação
        let (operation, result) = match &self.id {
            None => (
                StoreOperation::Create,
                store.create(RCAS_COLLECTION, payload.clone()).await,
            ),
            Some(id) => (
                StoreOperation::Update,
                store
                    .replace(RCAS_COLLECTION, id, payload.clone())
                    .await
                    .map(|_| id.clone()),
            ),
        };

        let id = match result {
            Ok(id) => id,
            Err(source) => {
                return Err(SaveError::Store {
                    collection: RCAS_COLLECTION.to_string(),
                    document_id: self.id.clone(),
                    operation,
                    payload,
                    source,
                });
            }
        };

        // 4. Só agora o rascunho muda
        self.document = candidate;
        self.id = Some(id.clone());
        self.baseline = payload;

        Ok(SaveOutcome {
            id,
            status,
            created: operation == StoreOperation::Create,
            report,
        })
    }

    // ---
    // Formato dos campos
    // ---

    fn empty_element(&self, path: &FieldPath) -> Option<Value> {
        match path.segments() {
            [PathSegment::Key(root), PathSegment::Key(group)] if root == "modulo4" => {
                self.variant().and_then(|t| t.array(group)).map(|g| g.empty_element())
            }
            _ => shared_empty_element(&path.without_indices()),
        }
    }

    /// Spec do campo do Módulo 4 (`modulo4.<grupo>[i].<campo>` ou
    /// `modulo4.<grupo>.<campo>`).
    fn module4_field(&self, path: &FieldPath) -> Option<&'static FieldSpec> {
        let template = self.variant()?;
        let (group, field) = match path.segments() {
            [PathSegment::Key(root), PathSegment::Key(group), PathSegment::Index(_), PathSegment::Key(field)]
            | [PathSegment::Key(root), PathSegment::Key(group), PathSegment::Key(field)]
                if root == "modulo4" =>
            {
                (group, field)
            }
            _ => return None,
        };

        let fields = template
            .arrays
            .iter()
            .find(|g| g.key == group)
            .map(|g| g.fields)
            .or_else(|| template.singletons.iter().find(|g| g.key == group).map(|g| g.fields))?;
        fields.iter().find(|f| f.key == field)
    }

    /// Vazio vira o vazio do tipo do campo ("" para texto, null para número
    /// e data); datas digitadas em outro formato são normalizadas.
    fn normalize_leaf(&self, path: &FieldPath, value: Value) -> Value {
        let blank = value.is_null() || value.as_str().is_some_and(|s| s.is_empty());

        if let Some(field) = self.module4_field(path) {
            if blank {
                return field.kind.empty_value();
            }
            if field.kind == FieldKind::Date {
                return coerce_date(&value);
            }
            return value;
        }

        if DATE_FIELDS.contains(&path.to_string().as_str()) {
            return if blank { Value::Null } else { coerce_date(&value) };
        }

        if blank {
            return match shared_default_leaf(path) {
                Some(Value::String(_)) => Value::String(String::new()),
                Some(container @ (Value::Object(_) | Value::Array(_))) => container,
                _ => Value::Null,
            };
        }
        value
    }
}

/// Item vazio das listas compartilhadas.
fn shared_empty_element(array_path: &str) -> Option<Value> {
    let element = match array_path {
        "responsaveisEstudo.outrosProfissionais" => serde_json::to_value(Profissional::default()),
        "socioeconomia" => serde_json::to_value(DadosMunicipio::default()),
        "medidasControle" => serde_json::to_value(MedidaControle::default()),
        _ => return None,
    };
    element.ok()
}

/// Valor padrão de um caminho dos módulos compartilhados, atravessando
/// listas pelo item vazio.
fn shared_default_leaf(path: &FieldPath) -> Option<Value> {
    let mut current = default_document();
    let mut keys: Vec<&str> = Vec::new();

    for segment in path.segments() {
        current = match segment {
            PathSegment::Key(k) => {
                keys.push(k.as_str());
                current.get(k.as_str())?.clone()
            }
            PathSegment::Index(_) => shared_empty_element(&keys.join("."))?,
        };
    }
    Some(current)
}

/// Normaliza as datas conhecidas (módulos compartilhados e Módulo 4).
fn coerce_date_fields(document: &mut Value) {
    let mut paths: Vec<String> = DATE_FIELDS.iter().map(|p| p.to_string()).collect();

    if let Some(template) = resolve_for_document(document) {
        for (group, field, is_array) in template.date_fields() {
            if !is_array {
                paths.push(format!("modulo4.{}.{}", group, field));
                continue;
            }
            let len = get_str_path(document, &format!("modulo4.{}", group))
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            paths.extend((0..len).map(|i| format!("modulo4.{}[{}].{}", group, i, field)));
        }
    }

    for raw in paths {
        let Ok(path) = FieldPath::parse(&raw) else { continue };
        if let Some(current) = get_path(document, &path) {
            if current.is_null() {
                continue;
            }
            let coerced = coerce_date(current);
            // Caminho existe: set_path não falha
            let _ = set_path(document, &path, coerced);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{document_store::StoreError, memory_store::{MemoryDocumentStore, RoleScopedStore}},
        models::{auth::Role, reference::{Client, Project}},
        tests::fixtures::approvable_posto,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn posto_draft() -> ReportDraft {
        let mut draft = ReportDraft::initialize(None);
        draft.set_activity(Some(Activity::ResiduosServicos));
        draft.set_sub_activity("F-06-01-7").unwrap();
        draft
    }

    #[test]
    fn changing_activity_clears_sub_activity_for_every_listing() {
        for from in Activity::ALL {
            for to in Activity::ALL.into_iter().filter(|a| *a != from) {
                let mut draft = ReportDraft::initialize(None);
                draft.set_activity(Some(from));
                draft.document["subActivity"] = json!("X-00-00-0");

                draft.set_scalar("activity", json!(to.code())).unwrap();

                assert_eq!(draft.sub_activity(), "", "{} -> {}", from, to);
                assert_eq!(draft.activity(), Some(to));
            }
        }
    }

    #[test]
    fn same_activity_keeps_sub_activity() {
        let mut draft = posto_draft();
        draft.set_scalar("activity", json!("F")).unwrap();
        assert_eq!(draft.sub_activity(), "F-06-01-7");
    }

    #[test]
    fn sub_activity_must_match_the_listing() {
        let mut draft = ReportDraft::initialize(None);
        assert_eq!(draft.set_sub_activity("F-06-01-7"), Err(DraftError::ActivityRequired));

        draft.set_activity(Some(Activity::Alimenticia));
        assert!(matches!(
            draft.set_sub_activity("F-06-01-7"),
            Err(DraftError::InvalidSubActivity { .. })
        ));
        assert_eq!(draft.sub_activity(), "");
    }

    #[test]
    fn selecting_variant_fills_module4_shape() {
        let draft = posto_draft();

        assert_eq!(draft.document["modulo4"]["tanques"], json!([]));
        assert_eq!(draft.document["modulo4"]["capacidadeEstocagem"]["cotaMaxima"], Value::Null);
        assert_eq!(draft.variant().map(|t| t.id), Some("posto-combustiveis"));
    }

    #[test]
    fn appending_three_and_removing_the_middle_keeps_order() {
        let mut draft = ReportDraft::initialize(None);
        draft.set_activity(Some(Activity::Quimica));
        draft.set_sub_activity("C-04-01-4").unwrap();

        for nome in ["Ácido sulfúrico", "Soda cáustica", "Cal hidratada"] {
            draft.append_array_item("modulo4.materiasPrimas", Some(json!({ "nome": nome }))).unwrap();
        }
        let removed = draft.remove_array_item("modulo4.materiasPrimas", 1).unwrap();

        assert_eq!(removed["nome"], json!("Soda cáustica"));
        assert_eq!(
            draft.document["modulo4"]["materiasPrimas"],
            json!([{ "nome": "Ácido sulfúrico" }, { "nome": "Cal hidratada" }])
        );
    }

    #[test]
    fn append_without_element_uses_group_template() {
        let mut draft = posto_draft();

        let len = draft.append_array_item("modulo4.tanques", None).unwrap();

        assert_eq!(len, 1);
        assert_eq!(draft.document["modulo4"]["tanques"][0]["produto"], json!(""));
        assert_eq!(draft.document["modulo4"]["tanques"][0]["capacidadeM3"], Value::Null);

        draft.append_array_item("socioeconomia", None).unwrap();
        assert_eq!(draft.document["socioeconomia"][0]["municipio"], json!(""));
    }

    #[test]
    fn removing_out_of_range_is_an_error() {
        let mut draft = posto_draft();
        let err = draft.remove_array_item("modulo4.tanques", 0).unwrap_err();
        assert!(matches!(err, DraftError::IndexOutOfBounds { index: 0, len: 0, .. }));
    }

    #[test]
    fn status_is_not_a_plain_field() {
        let mut draft = ReportDraft::initialize(None);
        assert!(matches!(draft.set_scalar("status", json!("Aprovado")), Err(DraftError::ReadOnlyField(_))));
    }

    #[test]
    fn blank_values_take_the_field_empty_shape() {
        let mut draft = posto_draft();
        draft.append_array_item("modulo4.tanques", None).unwrap();

        draft.set_scalar("modulo4.tanques[0].capacidadeM3", json!("")).unwrap();
        draft.set_scalar("empreendedor.nome", Value::Null).unwrap();
        draft.set_scalar("documentoReferencia.dataEmissao", json!("")).unwrap();

        assert_eq!(draft.document["modulo4"]["tanques"][0]["capacidadeM3"], Value::Null);
        assert_eq!(draft.document["empreendedor"]["nome"], json!(""));
        assert_eq!(draft.document["documentoReferencia"]["dataEmissao"], Value::Null);
    }

    #[test]
    fn typed_dates_are_normalized() {
        let mut draft = ReportDraft::initialize(None);
        draft.set_scalar("documentoReferencia.dataEmissao", json!("10/03/2024")).unwrap();
        assert_eq!(draft.document["documentoReferencia"]["dataEmissao"], json!("2024-03-10"));
    }

    #[test]
    fn gating_fields_change_active_fields_immediately() {
        let mut draft = ReportDraft::initialize(None);
        assert_eq!(draft.active_fields().fields["caracterizacaoArea.areaAppHa"], false);

        draft.set_scalar("caracterizacaoArea.possuiApp", json!(true)).unwrap();
        assert_eq!(draft.active_fields().fields["caracterizacaoArea.areaAppHa"], true);
    }

    #[test]
    fn load_then_serialize_only_drops_empty_defaults() {
        let stored = approvable_posto();
        let draft = ReportDraft::initialize(Some(&stored));
        assert_eq!(draft.serialize(), prune_empty(&stored).unwrap());
    }

    #[test]
    fn load_backfills_keys_missing_from_older_documents() {
        let stored = json!({ "activity": "F", "subActivity": "F-06-01-7", "empreendedor": { "nome": "Posto" } });
        let draft = ReportDraft::initialize(Some(&stored));

        assert_eq!(draft.document["empreendedor"]["cep"], json!(""));
        assert_eq!(draft.document["modulo4"]["instalacoes"]["possuiLavagem"], Value::Null);
        assert_eq!(draft.serialize(), json!({
            "activity": "F",
            "subActivity": "F-06-01-7",
            "empreendedor": { "nome": "Posto" }
        }));
        assert_eq!(draft.status(), ReportStatus::Rascunho);
    }

    #[test]
    fn load_never_adds_status_or_coordinate_format() {
        let stored = json!({
            "activity": "F",
            "subActivity": "F-06-01-7",
            "geographicLocation": { "datum": "SIRGAS 2000", "utm": { "x": 512345.0, "y": 7765432.0, "fuso": 23 } }
        });
        let draft = ReportDraft::initialize(Some(&stored));

        assert_eq!(draft.serialize(), prune_empty(&stored).unwrap());
        assert!(!draft.is_dirty());
    }

    #[test]
    fn fields_below_activity_or_status_are_rejected() {
        let mut draft = posto_draft();
        let before = draft.document.clone();

        for raw in ["activity.x", "subActivity.codigo", "status[0]"] {
            let err = draft.set_scalar(raw, json!("A")).unwrap_err();
            assert_eq!(err, DraftError::InvalidPath(raw.to_string()));
        }
        assert_eq!(draft.document, before);
        assert_eq!(draft.sub_activity(), "F-06-01-7");
    }

    #[test]
    fn failed_remove_leaves_no_trace() {
        let mut draft = posto_draft();
        let before = draft.document.clone();

        assert!(draft.remove_array_item("modulo4.naoExiste", 0).is_err());
        assert!(draft.remove_array_item("naoExiste.lista", 0).is_err());

        assert_eq!(draft.document, before);
        assert!(draft.document["modulo4"].get("naoExiste").is_none());
    }

    #[test]
    fn load_coerces_stored_dates() {
        let mut stored = approvable_posto();
        stored["documentoReferencia"]["dataEmissao"] = json!({ "seconds": 1680699600, "nanoseconds": 0 });
        stored["modulo4"]["tanques"][0]["dataInstalacao"] = json!("2019-06-01T00:00:00Z");

        let draft = ReportDraft::initialize(Some(&stored));

        assert_eq!(draft.document["documentoReferencia"]["dataEmissao"], json!("2023-04-05"));
        assert_eq!(draft.document["modulo4"]["tanques"][0]["dataInstalacao"], json!("2019-06-01"));
    }

    #[test]
    fn serialize_prunes_every_empty_shape() {
        let mut draft = ReportDraft::initialize(None);
        draft.document = json!({ "a": "", "b": [], "c": { "d": null }, "e": "x" });
        assert_eq!(draft.serialize(), json!({ "e": "x" }));
    }

    #[test]
    fn client_selection_waits_for_references() {
        let mut draft = ReportDraft::initialize(None);
        let before = draft.document.clone();

        let err = draft.select_client("c1", &ReferenceIndex::pending()).unwrap_err();

        assert_eq!(err, DraftError::ReferencesLoading);
        assert_eq!(draft.document, before);
    }

    #[test]
    fn last_selection_overwrites_manual_edits() {
        let client = Client { id: "c1".into(), name: "Cliente Um".into(), entity_type: "Produtor Rural".into(), ..Default::default() };
        let project = Project { id: "p1".into(), property_name: "Fazenda Boa Vista".into(), client_id: "c1".into(), ..Default::default() };
        let refs = ReferenceIndex::from_records(vec![client], vec![project]);
        let mut draft = ReportDraft::initialize(None);

        draft.set_scalar("empreendedor.nome", json!("Digitado à mão")).unwrap();
        draft.select_client("c1", &refs).unwrap();
        draft.select_project("p1", &refs).unwrap();

        assert_eq!(draft.document["empreendedor"]["nome"], json!("Cliente Um"));
        assert_eq!(draft.document["empreendedor"]["tipoPessoa"], json!("Pessoa Física"));
        assert_eq!(draft.document["empreendimento"]["nome"], json!("Fazenda Boa Vista"));
        assert_eq!(draft.document["clientId"], json!("c1"));
        assert_eq!(draft.document["projectId"], json!("p1"));
    }

    #[tokio::test]
    async fn draft_save_writes_even_with_missing_module4_fields() {
        let store = MemoryDocumentStore::new();
        let mut stored = approvable_posto();
        stored["modulo4"]["capacidadeEstocagem"]["cotaMaxima"] = Value::Null;
        let mut draft = ReportDraft::initialize(Some(&stored));

        let outcome = draft.save(ReportStatus::Rascunho, &store).await.unwrap();

        assert!(outcome.created);
        assert!(!outcome.report.has("modulo4.capacidadeEstocagem.cotaMaxima"));
        assert_eq!(store.count(RCAS_COLLECTION).await, 1);
        assert_eq!(draft.id(), Some(outcome.id.as_str()));
        assert!(!draft.is_dirty());
    }

    #[tokio::test]
    async fn approval_with_missing_module4_field_writes_nothing() {
        let store = MemoryDocumentStore::new();
        let mut stored = approvable_posto();
        stored["modulo4"]["capacidadeEstocagem"]["cotaMaxima"] = Value::Null;
        let mut draft = ReportDraft::initialize(Some(&stored));

        let err = draft.save(ReportStatus::Aprovado, &store).await.unwrap_err();

        let SaveError::Validation(report) = err else { panic!("esperava erro de validação") };
        assert!(report.has("modulo4.capacidadeEstocagem.cotaMaxima"));
        assert_eq!(store.count(RCAS_COLLECTION).await, 0);
        assert_eq!(draft.status(), ReportStatus::Rascunho);
        assert_eq!(draft.id(), None);
    }

    #[tokio::test]
    async fn approval_then_update_uses_the_same_id() {
        let store = MemoryDocumentStore::new();
        let mut draft = ReportDraft::initialize(Some(&approvable_posto()));

        let first = draft.save(ReportStatus::Rascunho, &store).await.unwrap();
        draft.set_scalar("empreendimento.numero", json!("1200")).unwrap();
        assert!(draft.is_dirty());
        let second = draft.save(ReportStatus::Aprovado, &store).await.unwrap();

        assert!(!second.created);
        assert_eq!(first.id, second.id);
        let saved = store.get(RCAS_COLLECTION, &first.id).await.unwrap().unwrap();
        assert_eq!(saved.data["status"], json!("Aprovado"));
        assert_eq!(saved.data["empreendimento"]["numero"], json!("1200"));
        assert_eq!(draft.status(), ReportStatus::Aprovado);
    }

    #[tokio::test]
    async fn removed_items_stay_removed_after_saving_again() {
        let store = MemoryDocumentStore::new();
        let mut draft = posto_draft();

        draft
            .append_array_item("medidasControle", Some(json!({ "impacto": "Ruído", "medida": "Barreira" })))
            .unwrap();
        draft.set_scalar("anexosOutros", json!("Croqui")).unwrap();
        let first = draft.save(ReportStatus::Rascunho, &store).await.unwrap();

        draft.remove_array_item("medidasControle", 0).unwrap();
        draft.set_scalar("anexosOutros", json!("")).unwrap();
        let second = draft.save(ReportStatus::Rascunho, &store).await.unwrap();
        assert_eq!(first.id, second.id);

        let saved = store.get(RCAS_COLLECTION, &first.id).await.unwrap().unwrap();
        assert!(saved.data.get("medidasControle").is_none());
        assert!(saved.data.get("anexosOutros").is_none());

        let reopened = ReportDraft::from_stored(&saved);
        assert_eq!(reopened.document["medidasControle"], json!([]));
        assert_eq!(reopened.serialize(), saved.data);
    }

    #[tokio::test]
    async fn store_failure_keeps_the_draft_and_carries_context() {
        let store = MemoryDocumentStore::new();
        store.set_unavailable(true);
        let mut draft = ReportDraft::initialize(Some(&approvable_posto()));
        let before = draft.document.clone();

        let err = draft.save(ReportStatus::Aprovado, &store).await.unwrap_err();

        let SaveError::Store { collection, operation, payload, source, document_id } = err else {
            panic!("esperava erro de armazenamento")
        };
        assert_eq!(collection, RCAS_COLLECTION);
        assert_eq!(operation, StoreOperation::Create);
        assert_eq!(document_id, None);
        assert_eq!(payload["status"], json!("Aprovado"));
        assert!(matches!(source, StoreError::Unavailable(_)));
        assert_eq!(draft.document, before);
        assert_eq!(draft.id(), None);
    }

    #[tokio::test]
    async fn permission_denied_is_recoverable() {
        let inner = Arc::new(MemoryDocumentStore::new());
        let mut draft = ReportDraft::initialize(Some(&approvable_posto()));

        let denied = RoleScopedStore::new(inner.clone(), Role::Comercial);
        let err = draft.save(ReportStatus::Rascunho, &denied).await.unwrap_err();
        assert!(matches!(err, SaveError::Store { source: StoreError::PermissionDenied { .. }, .. }));

        // Mesmo rascunho, outro usuário com permissão
        let allowed = RoleScopedStore::new(inner.clone(), Role::Tecnico);
        assert!(draft.save(ReportStatus::Rascunho, &allowed).await.is_ok());
        assert_eq!(inner.count(RCAS_COLLECTION).await, 1);
    }
}
