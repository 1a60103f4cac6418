// src/services/variant_registry.rs

use serde::Serialize;
use serde_json::Value;

use crate::{
    common::json_utils::get_str_path,
    models::{rca::Activity, variant::VariantTemplate},
    services::variant_templates as templates,
};

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubActivity {
    pub code: &'static str,
    pub description: &'static str,
}

const fn sub(code: &'static str, description: &'static str) -> SubActivity {
    SubActivity { code, description }
}

// =========================================================================
//  Catálogo de sub-atividades por listagem
// =========================================================================

const LISTAGEM_A: &[SubActivity] = &[
    sub("A-02-07-0", "Lavra a céu aberto - Minerais não metálicos, exceto rochas ornamentais e de revestimento"),
    sub("A-02-09-7", "Extração de rocha para produção de britas"),
    sub("A-03-01-8", "Extração de areia e cascalho para utilização imediata na construção civil"),
];

const LISTAGEM_B: &[SubActivity] = &[
    sub("B-03-04-2", "Produção de fundidos de ferro e aço"),
    sub("B-05-01-1", "Fabricação de estruturas metálicas"),
    sub("B-10-07-0", "Serralheria e fabricação de esquadrias metálicas"),
];

const LISTAGEM_C: &[SubActivity] = &[
    sub("C-04-01-4", "Fabricação de produtos químicos orgânicos e inorgânicos"),
    sub("C-04-15-4", "Fabricação de tintas, esmaltes, lacas e vernizes"),
    sub("C-07-01-8", "Fabricação de artefatos de material plástico"),
];

const LISTAGEM_D: &[SubActivity] = &[
    sub("D-01-03-1", "Abate de animais de médio e grande porte"),
    sub("D-01-06-1", "Preparação do leite e fabricação de produtos de laticínios"),
    sub("D-01-13-9", "Formulação de rações balanceadas e de alimentos preparados para animais"),
];

const LISTAGEM_E: &[SubActivity] = &[
    sub("E-01-03-1", "Pavimentação e/ou melhoramentos de rodovias"),
    sub("E-02-03-8", "Linhas de transmissão de energia elétrica"),
    sub("E-03-06-9", "Estação de tratamento de esgoto sanitário"),
];

const LISTAGEM_F: &[SubActivity] = &[
    sub("F-01-01-5", "Central de recebimento, armazenamento e triagem de sucata metálica"),
    sub("F-05-12-6", "Unidade de triagem de recicláveis"),
    sub(
        "F-06-01-7",
        "Postos revendedores, postos ou pontos de abastecimento, instalações de sistemas retalhistas e postos flutuantes de combustíveis",
    ),
];

const LISTAGEM_G: &[SubActivity] = &[
    sub("G-01-03-1", "Culturas anuais, semiperenes e perenes, silvicultura e cultivos agrossilvipastoris"),
    sub("G-02-02-1", "Avicultura"),
    sub("G-02-07-0", "Criação de bovinos, bubalinos, equinos, muares, ovinos e caprinos, em regime extensivo"),
    sub("G-04-01-4", "Beneficiamento primário de produtos agrícolas"),
];

/// Listagem H ainda não tem sub-catálogo.
const LISTAGEM_H: &[SubActivity] = &[];

// =========================================================================
//  Tabela de variantes (atividade, sub-atividade) -> template
// =========================================================================

const VARIANTS: &[(Activity, &str, &VariantTemplate)] = &[
    (Activity::Mineraria, "A-02-09-7", &templates::EXTRACAO_BRITA),
    (Activity::Metalurgica, "B-03-04-2", &templates::FUNDICAO),
    (Activity::Quimica, "C-04-01-4", &templates::INDUSTRIA_QUIMICA),
    (Activity::Alimenticia, "D-01-06-1", &templates::LATICINIOS),
    (Activity::Alimenticia, "D-01-13-9", &templates::FABRICACAO_RACOES),
    (Activity::ResiduosServicos, "F-05-12-6", &templates::TRIAGEM_RECICLAVEIS),
    (Activity::ResiduosServicos, "F-06-01-7", &templates::POSTO_COMBUSTIVEIS),
    (Activity::Agrossilvipastoril, "G-01-03-1", &templates::CULTURAS_ANUAIS),
    (Activity::Agrossilvipastoril, "G-02-07-0", &templates::CRIACAO_EXTENSIVA),
];

pub fn list_sub_activities(activity: Activity) -> &'static [SubActivity] {
    match activity {
        Activity::Mineraria => LISTAGEM_A,
        Activity::Metalurgica => LISTAGEM_B,
        Activity::Quimica => LISTAGEM_C,
        Activity::Alimenticia => LISTAGEM_D,
        Activity::Infraestrutura => LISTAGEM_E,
        Activity::ResiduosServicos => LISTAGEM_F,
        Activity::Agrossilvipastoril => LISTAGEM_G,
        Activity::Outras => LISTAGEM_H,
    }
}

pub fn is_valid_sub_activity(activity: Activity, code: &str) -> bool {
    list_sub_activities(activity).iter().any(|s| s.code == code)
}

/// Busca exata. `None` é o placeholder "ainda não implementado", não um erro.
pub fn resolve_variant(activity: Activity, sub_activity: &str) -> Option<&'static VariantTemplate> {
    VARIANTS
        .iter()
        .find(|(a, code, _)| *a == activity && *code == sub_activity)
        .map(|(_, _, template)| *template)
}

/// Variante de um documento (seleções gravadas em `activity`/`subActivity`).
pub fn resolve_for_document(document: &Value) -> Option<&'static VariantTemplate> {
    let activity = get_str_path(document, "activity")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Activity>().ok())?;
    let sub_activity = get_str_path(document, "subActivity").and_then(Value::as_str)?;
    resolve_variant(activity, sub_activity)
}

/// Resposta do catálogo: o template ou o placeholder.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum VariantLookup {
    Available { template: &'static VariantTemplate },
    NotImplemented { activity: Activity, sub_activity: String },
}

pub fn lookup(activity: Activity, sub_activity: &str) -> VariantLookup {
    match resolve_variant(activity, sub_activity) {
        Some(template) => VariantLookup::Available { template },
        None => VariantLookup::NotImplemented {
            activity,
            sub_activity: sub_activity.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_listed_pair_resolves_or_falls_back() {
        for activity in Activity::ALL {
            for sub in list_sub_activities(activity) {
                // Nunca entra em pânico; `None` vira placeholder
                match lookup(activity, sub.code) {
                    VariantLookup::Available { template } => assert!(!template.id.is_empty()),
                    VariantLookup::NotImplemented { sub_activity, .. } => assert_eq!(sub_activity, sub.code),
                }
            }
        }
    }

    #[test]
    fn every_registered_variant_belongs_to_its_catalog() {
        for (activity, code, _) in VARIANTS {
            assert!(is_valid_sub_activity(*activity, code), "{} fora da listagem {}", code, activity);
        }
    }

    #[test]
    fn lookup_is_exact_match_only() {
        assert!(resolve_variant(Activity::ResiduosServicos, "F-06-01-7").is_some());
        assert!(resolve_variant(Activity::ResiduosServicos, "F-06-01").is_none());
        assert!(resolve_variant(Activity::Alimenticia, "F-06-01-7").is_none());
    }

    #[test]
    fn listing_without_catalog_is_empty() {
        assert!(list_sub_activities(Activity::Outras).is_empty());
    }

    #[test]
    fn template_group_keys_are_unique() {
        for (_, _, template) in VARIANTS {
            let mut keys = HashSet::new();
            for key in template.arrays.iter().map(|g| g.key).chain(template.singletons.iter().map(|g| g.key)) {
                assert!(keys.insert(key), "grupo {} repetido em {}", key, template.id);
            }
        }
    }

    #[test]
    fn resolves_from_stored_selection() {
        let doc = serde_json::json!({ "activity": "G", "subActivity": "G-02-07-0" });
        assert_eq!(resolve_for_document(&doc).map(|t| t.id), Some("criacao-extensiva"));
    }
}
