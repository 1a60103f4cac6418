// src/tests/fixtures.rs
//
// Documentos de teste reaproveitados entre módulos.

use serde_json::{json, Value};

/// Posto de combustíveis (F-06-01-7) pronto para aprovação.
pub fn approvable_posto() -> Value {
    json!({
        "activity": "F",
        "subActivity": "F-06-01-7",
        "status": "Rascunho",
        "documentoReferencia": {
            "tipo": "FCE",
            "numero": "123/2024",
            "orgaoEmissor": "SEMAD",
            "dataEmissao": "2024-03-10"
        },
        "empreendedor": {
            "tipoPessoa": "Pessoa Jurídica",
            "nome": "Auto Posto Serra Azul Ltda",
            "cpfCnpj": "12.345.678/0001-99",
            "endereco": "Rodovia MG-050, km 12",
            "municipio": "Divinópolis",
            "uf": "MG",
            "cep": "35500-000"
        },
        "empreendimento": {
            "nome": "Auto Posto Serra Azul",
            "tipoZona": "Urbana",
            "endereco": "Rodovia MG-050, km 12",
            "municipio": "Divinópolis",
            "uf": "MG"
        },
        "responsavelAmbiental": {
            "nome": "Ana Souza",
            "formacao": "Engenheira Ambiental",
            "registroConselho": "CREA-MG 123456"
        },
        "responsaveisEstudo": { "coordenador": { "nome": "Ana Souza" } },
        "geographicLocation": {
            "formato": "GMS",
            "datum": "SIRGAS 2000",
            "latitude": { "graus": 20, "minutos": 8, "segundos": 30.5 },
            "longitude": { "graus": 44, "minutos": 53, "segundos": 2 }
        },
        "caracterizacaoArea": {
            "areaTotalHa": 0.5,
            "possuiApp": false,
            "possuiReservaLegal": false
        },
        "modulo4": {
            "tanques": [{
                "identificacao": "T1",
                "produto": "Etanol",
                "capacidadeM3": 15,
                "tipoParede": "Parede dupla"
            }],
            "caixasSeparadoras": [],
            "equipamentos": [],
            "residuosSolidos": [{
                "residuo": "Estopas contaminadas",
                "origem": "Pista de abastecimento",
                "classe": "Classe I",
                "destinacao": "Coprocessamento"
            }],
            "capacidadeEstocagem": { "cotaMaxima": 60, "capacidadeTotalM3": 60 },
            "instalacoes": { "possuiLavagem": false, "possuiTrocaOleo": false }
        },
        "impactosMeioFisico": ["Alteração da qualidade do solo"],
        "zee": {
            "vulnerabilidadeNatural": "Média",
            "potencialidadeSocial": "Alta",
            "qualidadeAmbiental": "Média",
            "integridadeFlora": "Baixa",
            "integridadeFauna": "Baixa",
            "riscoErosao": "Média",
            "vulnerabilidadeAguasSubterraneas": "Alta",
            "prioridadeConservacao": "Baixa"
        },
        "socioeconomia": [{ "municipio": "Divinópolis" }],
        "anexos": ["Relatório fotográfico"]
    })
}
