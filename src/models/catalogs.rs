// src/models/catalogs.rs
//
// Catálogos fixos de opções dos módulos compartilhados.

use serde::Serialize;

pub const TIPOS_PESSOA: &[&str] = &["Pessoa Física", "Pessoa Jurídica"];

pub const TIPOS_ZONA: &[&str] = &["Urbana", "Rural"];

pub const DATUMS: &[&str] = &["SIRGAS 2000", "SAD 69", "Córrego Alegre", "WGS 84"];

pub const UFS: &[&str] = &[
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB", "PR",
    "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

pub const IMPACTOS_MEIO_FISICO: &[&str] = &[
    "Alteração da qualidade do ar",
    "Alteração da qualidade das águas superficiais",
    "Alteração da qualidade das águas subterrâneas",
    "Alteração da qualidade do solo",
    "Geração de ruídos e vibrações",
    "Indução de processos erosivos",
    "Assoreamento de cursos d'água",
    "Alteração do relevo",
];

pub const IMPACTOS_MEIO_BIOTICO: &[&str] = &[
    "Supressão de vegetação nativa",
    "Afugentamento da fauna",
    "Perda de habitat",
    "Atropelamento de fauna",
    "Intervenção em Área de Preservação Permanente",
    "Fragmentação de remanescentes florestais",
];

pub const IMPACTOS_MEIO_SOCIOECONOMICO: &[&str] = &[
    "Geração de empregos",
    "Aumento da arrecadação municipal",
    "Aumento do tráfego de veículos",
    "Incômodo à vizinhança",
    "Dinamização da economia local",
    "Pressão sobre a infraestrutura urbana",
];

pub const ZEE_CLASSES: &[&str] = &["Muito baixa", "Baixa", "Média", "Alta", "Muito alta"];

pub const ANEXO_OUTROS: &str = "Outros";

pub const ANEXOS: &[&str] = &[
    "Planta de localização do empreendimento",
    "Planta de layout das instalações",
    "Anotação de Responsabilidade Técnica (ART)",
    "Certidão de uso e ocupação do solo",
    "Outorga ou cadastro de uso insignificante de recursos hídricos",
    "Cadastro Ambiental Rural (CAR)",
    "Relatório fotográfico",
    "Fluxograma do processo produtivo",
    ANEXO_OUTROS,
];

/// Todos os catálogos, para o cliente montar os selects.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionCatalogs {
    pub tipos_pessoa: &'static [&'static str],
    pub tipos_zona: &'static [&'static str],
    pub datums: &'static [&'static str],
    pub ufs: &'static [&'static str],
    pub impactos_meio_fisico: &'static [&'static str],
    pub impactos_meio_biotico: &'static [&'static str],
    pub impactos_meio_socioeconomico: &'static [&'static str],
    pub zee_classes: &'static [&'static str],
    pub anexos: &'static [&'static str],
}

impl OptionCatalogs {
    pub fn all() -> Self {
        Self {
            tipos_pessoa: TIPOS_PESSOA,
            tipos_zona: TIPOS_ZONA,
            datums: DATUMS,
            ufs: UFS,
            impactos_meio_fisico: IMPACTOS_MEIO_FISICO,
            impactos_meio_biotico: IMPACTOS_MEIO_BIOTICO,
            impactos_meio_socioeconomico: IMPACTOS_MEIO_SOCIOECONOMICO,
            zee_classes: ZEE_CLASSES,
            anexos: ANEXOS,
        }
    }
}
