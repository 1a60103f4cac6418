// src/models/rca.rs

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

// --- Enums ---

/// Listagens da DN 217. Gravadas pela letra da listagem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Activity {
    #[serde(rename = "A")]
    Mineraria,
    #[serde(rename = "B")]
    Metalurgica,
    #[serde(rename = "C")]
    Quimica,
    #[serde(rename = "D")]
    Alimenticia,
    #[serde(rename = "E")]
    Infraestrutura,
    #[serde(rename = "F")]
    ResiduosServicos,
    #[serde(rename = "G")]
    Agrossilvipastoril,
    #[serde(rename = "H")]
    Outras,
}

impl Activity {
    pub const ALL: [Activity; 8] = [
        Activity::Mineraria,
        Activity::Metalurgica,
        Activity::Quimica,
        Activity::Alimenticia,
        Activity::Infraestrutura,
        Activity::ResiduosServicos,
        Activity::Agrossilvipastoril,
        Activity::Outras,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Activity::Mineraria => "A",
            Activity::Metalurgica => "B",
            Activity::Quimica => "C",
            Activity::Alimenticia => "D",
            Activity::Infraestrutura => "E",
            Activity::ResiduosServicos => "F",
            Activity::Agrossilvipastoril => "G",
            Activity::Outras => "H",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Activity::Mineraria => "Listagem A - Atividades Minerárias",
            Activity::Metalurgica => "Listagem B - Atividades Industriais / Indústria Metalúrgica e Outras",
            Activity::Quimica => "Listagem C - Atividades Industriais / Indústria Química e Outras",
            Activity::Alimenticia => "Listagem D - Atividades Industriais / Indústria Alimentícia",
            Activity::Infraestrutura => "Listagem E - Atividades de Infraestrutura",
            Activity::ResiduosServicos => "Listagem F - Gerenciamento de Resíduos e Serviços",
            Activity::Agrossilvipastoril => "Listagem G - Atividades Agrossilvipastoris",
            Activity::Outras => "Listagem H - Outras Atividades",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Activity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Activity::ALL
            .into_iter()
            .find(|a| a.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| s.to_string())
    }
}

/// Ausente num documento nunca gravado; o salvamento sempre o preenche.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ReportStatus {
    #[default]
    Rascunho,
    Aprovado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    Draft,
    Final,
}

impl From<ReportStatus> for ValidationMode {
    fn from(status: ReportStatus) -> Self {
        match status {
            ReportStatus::Rascunho => ValidationMode::Draft,
            ReportStatus::Aprovado => ValidationMode::Final,
        }
    }
}

/// Sem formato escolhido, vale GMS (ver `field_gates`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CoordinateFormat {
    #[serde(rename = "GMS")]
    Gms,
    #[serde(rename = "UTM")]
    Utm,
}

// --- Documento (Módulos 1 a 3, 5 a 7) ---
//
// Todos os structs usam `#[serde(default)]`: um documento salvo com um
// schema mais antigo ainda desserializa. O `Default` de `RcaDocument` é o
// formato padrão completo do formulário.

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RcaDocument {
    pub activity: Option<Activity>,
    pub sub_activity: String,
    pub status: Option<ReportStatus>,
    pub client_id: String,
    pub project_id: String,

    // Módulo 1 - Identificação
    #[validate(nested)]
    pub documento_referencia: DocumentoReferencia,
    #[validate(nested)]
    pub empreendedor: Empreendedor,
    #[validate(nested)]
    pub empreendimento: Empreendimento,
    #[validate(nested)]
    pub responsavel_ambiental: ResponsavelAmbiental,
    #[validate(nested)]
    pub responsaveis_estudo: ResponsaveisEstudo,

    // Módulo 2 - Localização
    pub geographic_location: GeographicLocation,

    // Módulo 3 - Caracterização da área
    #[validate(nested)]
    pub caracterizacao_area: CaracterizacaoArea,

    // Módulo 4 - Depende da atividade (ver VariantTemplate)
    #[schema(value_type = Object)]
    pub modulo4: Map<String, Value>,

    // Módulo 5 - Impactos
    pub impactos_meio_fisico: Vec<String>,
    pub impactos_meio_biotico: Vec<String>,
    pub impactos_meio_socioeconomico: Vec<String>,

    // Módulo 6 - ZEE e socioeconomia
    #[validate(nested)]
    pub zee: Zee,
    #[validate(length(min = 1, code = "required", message = "Informe ao menos um município"), nested)]
    pub socioeconomia: Vec<DadosMunicipio>,

    // Módulo 7 - Medidas e anexos
    #[validate(nested)]
    pub medidas_controle: Vec<MedidaControle>,
    pub anexos: Vec<String>,
    pub anexos_outros: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentoReferencia {
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub tipo: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub numero: String,
    pub orgao_emissor: String,
    #[validate(required(code = "required", message = "Campo obrigatório"))]
    pub data_emissao: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Empreendedor {
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub tipo_pessoa: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub nome: String,
    #[validate(length(min = 11, code = "required", message = "CPF/CNPJ obrigatório"))]
    pub cpf_cnpj: String,
    pub identidade: String,
    pub orgao_expedidor: String,
    pub data_nascimento: Option<NaiveDate>,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub endereco: String,
    pub numero: String,
    pub complemento: String,
    pub bairro: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub municipio: String,
    #[validate(length(min = 2, code = "required", message = "Campo obrigatório"))]
    pub uf: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub cep: String,
    pub caixa_postal: String,
    pub fone: String,
    pub fax: String,
    pub celular: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Empreendimento {
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub nome: String,
    pub nome_fantasia: String,
    pub codigo_incra: String,
    pub cnpj: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub tipo_zona: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub endereco: String,
    pub numero: String,
    pub complemento: String,
    pub bairro: String,
    pub distrito: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub municipio: String,
    #[validate(length(min = 2, code = "required", message = "Campo obrigatório"))]
    pub uf: String,
    pub cep: String,
    pub caixa_postal: String,
    pub fone: String,
    pub fax: String,
    pub email: String,
    pub inscricao_estadual: String,
    pub inscricao_municipal: String,
    pub numero_empregados: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponsavelAmbiental {
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub nome: String,
    pub cpf: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub formacao: String,
    pub conselho: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub registro_conselho: String,
    pub art: String,
    pub fone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Profissional {
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub nome: String,
    pub formacao: String,
    pub registro_conselho: String,
    pub art: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponsaveisEstudo {
    #[validate(nested)]
    pub coordenador: Profissional,
    #[validate(nested)]
    pub outros_profissionais: Vec<Profissional>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CoordenadaGms {
    pub graus: Option<f64>,
    pub minutos: Option<f64>,
    pub segundos: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CoordenadaUtm {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub fuso: Option<i32>,
}

// Obrigatoriedade depende do formato escolhido; checada em rca_validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GeographicLocation {
    pub formato: Option<CoordinateFormat>,
    pub datum: String,
    pub latitude: CoordenadaGms,
    pub longitude: CoordenadaGms,
    pub utm: CoordenadaUtm,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CaracterizacaoArea {
    #[validate(required(code = "required", message = "Campo obrigatório"), range(min = 0.0, code = "invalid_range"))]
    pub area_total_ha: Option<f64>,
    #[validate(range(min = 0.0, code = "invalid_range"))]
    pub area_construida_m2: Option<f64>,
    pub possui_app: Option<bool>,
    pub intervencao_app: Option<bool>,
    #[validate(range(min = 0.0, code = "invalid_range"))]
    pub area_app_ha: Option<f64>,
    pub numero_autorizacao_intervencao: String,
    pub possui_reserva_legal: Option<bool>,
    #[validate(range(min = 0.0, code = "invalid_range"))]
    pub area_reserva_legal_ha: Option<f64>,
    pub abastecimento_agua: String,
}

/// Uma classificação por fator do ZEE-MG.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Zee {
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub vulnerabilidade_natural: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub potencialidade_social: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub qualidade_ambiental: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub integridade_flora: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub integridade_fauna: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub risco_erosao: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub vulnerabilidade_aguas_subterraneas: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub prioridade_conservacao: String,
}

impl Zee {
    /// Chaves (camelCase) dos fatores, na ordem do formulário.
    pub const FACTORS: [&'static str; 8] = [
        "vulnerabilidadeNatural",
        "potencialidadeSocial",
        "qualidadeAmbiental",
        "integridadeFlora",
        "integridadeFauna",
        "riscoErosao",
        "vulnerabilidadeAguasSubterraneas",
        "prioridadeConservacao",
    ];
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DadosMunicipio {
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub municipio: String,
    pub populacao: Option<u64>,
    #[validate(range(min = 0.0, max = 1.0, code = "invalid_range"))]
    pub idh: Option<f64>,
    pub principais_atividades: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MedidaControle {
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub impacto: String,
    #[validate(length(min = 1, code = "required", message = "Campo obrigatório"))]
    pub medida: String,
    pub prazo: String,
}

/// Formato padrão completo, sem o Módulo 4 (que depende da variante).
pub fn default_document() -> Value {
    // Serialização de structs simples não falha
    serde_json::to_value(RcaDocument::default()).unwrap_or_else(|_| Value::Object(Map::new()))
}

/// Caminhos de campos do tipo data fora do Módulo 4.
pub const DATE_FIELDS: [&str; 2] = ["documentoReferencia.dataEmissao", "empreendedor.dataNascimento"];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn default_document_exposes_every_shared_key() {
        let doc = default_document();

        assert_eq!(doc["status"], Value::Null);
        assert_eq!(doc["activity"], Value::Null);
        assert_eq!(doc["empreendedor"]["nome"], json!(""));
        assert_eq!(doc["geographicLocation"]["formato"], Value::Null);
        assert_eq!(doc["responsaveisEstudo"]["outrosProfissionais"], json!([]));
        assert_eq!(doc["modulo4"], json!({}));
        assert_eq!(doc["zee"]["riscoErosao"], json!(""));
    }

    #[test]
    fn activity_round_trips_by_listing_letter() {
        assert_eq!(serde_json::to_value(Activity::ResiduosServicos).unwrap(), json!("F"));
        assert_eq!("g".parse::<Activity>().unwrap(), Activity::Agrossilvipastoril);
        assert!("Z".parse::<Activity>().is_err());
    }

    #[test]
    fn older_documents_still_deserialize() {
        let stored = json!({ "activity": "F", "empreendedor": { "nome": "Posto Bom Jesus" } });
        let doc: RcaDocument = serde_json::from_value(stored).unwrap();

        assert_eq!(doc.activity, Some(Activity::ResiduosServicos));
        assert_eq!(doc.empreendedor.nome, "Posto Bom Jesus");
        assert_eq!(doc.status, None);
        assert_eq!(doc.geographic_location.formato, None);
    }
}
