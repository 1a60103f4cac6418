// src/models/reference.rs
//
// Entidades de referência lidas das coleções `clients` e `projects`.
// Vêm de outras telas do sistema, então toleramos campos nulos ou ausentes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    #[serde(skip_deserializing)]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub cpf_cnpj: String,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub municipio: String,
    #[serde(deserialize_with = "lenient_string")]
    pub uf: String,
    #[serde(deserialize_with = "lenient_string")]
    pub cep: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fax: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub entity_type: String,
    // Pode estar como string, timestamp ou objeto; normalizado no resolver
    pub data_nascimento: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(skip_deserializing)]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub property_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fantasy_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub incra_code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub cnpj: String,
    #[serde(deserialize_with = "lenient_string")]
    pub zone_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub municipio: String,
    #[serde(deserialize_with = "lenient_string")]
    pub district: String,
    #[serde(deserialize_with = "lenient_string")]
    pub uf: String,
    #[serde(deserialize_with = "lenient_string")]
    pub cep: String,
    #[serde(deserialize_with = "lenient_string")]
    pub client_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub inscricao_estadual: String,
    #[serde(deserialize_with = "lenient_string")]
    pub inscricao_municipal: String,
}

/// null vira "", números viram texto (CEP e telefone às vezes chegam como número).
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tolerates_nulls_and_numbers() {
        let client: Client = serde_json::from_value(json!({
            "name": "Fazenda Boa Vista",
            "phone": null,
            "cep": 35700000,
        }))
        .unwrap();

        assert_eq!(client.name, "Fazenda Boa Vista");
        assert_eq!(client.phone, "");
        assert_eq!(client.cep, "35700000");
        assert_eq!(client.email, "");
    }
}
