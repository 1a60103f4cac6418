// src/services/reference_resolver.rs

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::{
    common::json_utils::coerce_date,
    db::document_store::{DocumentStore, StoreError, StoredDocument},
    models::reference::{Client, Project},
};

pub const CLIENTS_COLLECTION: &str = "clients";
pub const PROJECTS_COLLECTION: &str = "projects";

/// Conjunto de campos a sobrescrever no rascunho. A ordem é a de aplicação.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DraftPatch(Vec<(String, Value)>);

impl DraftPatch {
    fn set(&mut self, path: &str, value: impl Into<Value>) {
        self.0.push((path.to_string(), value.into()));
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.0
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.0.iter().find(|(p, _)| p == path).map(|(_, v)| v)
    }
}

// ---
// Índices em memória
// ---

/// Coleções de referência já carregadas. Enquanto `loaded` for falso as
/// seleções de cliente/projeto ficam desabilitadas.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    clients: HashMap<String, Client>,
    projects: HashMap<String, Project>,
    loaded: bool,
}

impl ReferenceIndex {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn from_records(clients: Vec<Client>, projects: Vec<Project>) -> Self {
        Self {
            clients: clients.into_iter().map(|c| (c.id.clone(), c)).collect(),
            projects: projects.into_iter().map(|p| (p.id.clone(), p)).collect(),
            loaded: true,
        }
    }

    /// Carrega `clients` e `projects` do armazenamento. Documentos mal
    /// formados são ignorados (com log) em vez de derrubar a sessão.
    pub async fn load(store: &dyn DocumentStore) -> Result<Self, StoreError> {
        let clients = store.list_all(CLIENTS_COLLECTION).await?;
        let projects = store.list_all(PROJECTS_COLLECTION).await?;

        let clients: Vec<Client> = clients.into_iter().filter_map(|doc| decode(doc, CLIENTS_COLLECTION)).collect();
        let projects: Vec<Project> = projects.into_iter().filter_map(|doc| decode(doc, PROJECTS_COLLECTION)).collect();

        tracing::debug!(
            "Índices de referência carregados: {} clientes, {} projetos",
            clients.len(),
            projects.len()
        );

        Ok(Self::from_records(clients, projects))
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.get(id)
    }

    pub fn clients(&self) -> &HashMap<String, Client> {
        &self.clients
    }
}

trait WithId {
    fn set_id(&mut self, id: String);
}

impl WithId for Client {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl WithId for Project {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

fn decode<T>(doc: StoredDocument, collection: &str) -> Option<T>
where
    T: serde::de::DeserializeOwned + WithId,
{
    match serde_json::from_value::<T>(doc.data) {
        Ok(mut record) => {
            record.set_id(doc.id);
            Some(record)
        }
        Err(e) => {
            tracing::warn!("Ignorando documento '{}' de '{}': {}", doc.id, collection, e);
            None
        }
    }
}

// ---
// Resolução de padrões
// ---

/// "Pessoa Física" e "Produtor Rural" viram "Pessoa Física"; o resto é
/// "Pessoa Jurídica".
pub fn normalize_entity_type(entity_type: &str) -> &'static str {
    match entity_type.trim() {
        "Pessoa Física" | "Produtor Rural" => "Pessoa Física",
        _ => "Pessoa Jurídica",
    }
}

/// Patch sobre `empreendedor.*`. Cliente ausente (id antigo, removido)
/// resolve para strings vazias.
pub fn resolve_client_defaults(client_id: &str, client: Option<&Client>) -> DraftPatch {
    let empty = Client::default();
    let found = client.is_some();
    let c = client.unwrap_or(&empty);

    let mut patch = DraftPatch::default();
    patch.set("clientId", client_id);
    patch.set("empreendedor.nome", c.name.as_str());
    patch.set("empreendedor.cpfCnpj", c.cpf_cnpj.as_str());
    patch.set("empreendedor.endereco", c.address.as_str());
    patch.set("empreendedor.municipio", c.municipio.as_str());
    patch.set("empreendedor.uf", c.uf.as_str());
    patch.set("empreendedor.cep", c.cep.as_str());
    patch.set("empreendedor.fone", c.phone.as_str());
    patch.set("empreendedor.fax", c.fax.as_str());
    patch.set("empreendedor.email", c.email.as_str());
    patch.set(
        "empreendedor.tipoPessoa",
        if found { normalize_entity_type(&c.entity_type) } else { "" },
    );

    // Só grava a data quando ela é reconhecível
    let nascimento = match coerce_date(&c.data_nascimento) {
        Value::String(s) if chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d").is_ok() => Value::String(s),
        _ => Value::Null,
    };
    patch.set("empreendedor.dataNascimento", nascimento);

    patch
}

/// Patch sobre `empreendimento.*`. Telefone, fax e e-mail vêm do cliente
/// dono do projeto (via `project.clientId`), não do projeto.
pub fn resolve_project_defaults(
    project_id: &str,
    project: Option<&Project>,
    clients: &HashMap<String, Client>,
) -> DraftPatch {
    let empty = Project::default();
    let p = project.unwrap_or(&empty);
    let owner = clients.get(&p.client_id);

    let mut patch = DraftPatch::default();
    patch.set("projectId", project_id);
    patch.set("empreendimento.nome", p.property_name.as_str());
    patch.set("empreendimento.nomeFantasia", p.fantasy_name.as_str());
    patch.set("empreendimento.codigoIncra", p.incra_code.as_str());
    patch.set("empreendimento.cnpj", p.cnpj.as_str());
    patch.set("empreendimento.tipoZona", p.zone_type.as_str());
    patch.set("empreendimento.endereco", p.address.as_str());
    patch.set("empreendimento.municipio", p.municipio.as_str());
    patch.set("empreendimento.distrito", p.district.as_str());
    patch.set("empreendimento.uf", p.uf.as_str());
    patch.set("empreendimento.cep", p.cep.as_str());
    patch.set("empreendimento.inscricaoEstadual", p.inscricao_estadual.as_str());
    patch.set("empreendimento.inscricaoMunicipal", p.inscricao_municipal.as_str());
    patch.set("empreendimento.fone", owner.map(|c| c.phone.as_str()).unwrap_or(""));
    patch.set("empreendimento.fax", owner.map(|c| c.fax.as_str()).unwrap_or(""));
    patch.set("empreendimento.email", owner.map(|c| c.email.as_str()).unwrap_or(""));

    patch
}
