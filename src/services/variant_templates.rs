// src/services/variant_templates.rs
//
// Templates do Módulo 4 (caracterização específica da atividade).
// Grupos de campos reaproveitados entre variantes ficam no topo; variantes
// diferentes usam os mesmos campos com outro nome de grupo quando o
// formulário oficial assim pede (ex.: `insumos`, `maquinario`).

use crate::models::variant::{ArrayGroup, FieldSpec, Gate, SingletonGroup, VariantTemplate};

// --- Opções ---

const UNIDADES: &[&str] = &["t", "kg", "m³", "L", "unidade"];
const ESTADOS_FISICOS: &[&str] = &["Sólido", "Líquido", "Gasoso", "Pastoso"];
const CLASSES_RESIDUO: &[&str] = &["Classe I", "Classe IIA", "Classe IIB"];
const FONTES_ENERGIA: &[&str] = &["Elétrica", "Diesel", "Gás", "Lenha", "Outra"];
const COMBUSTIVEIS: &[&str] = &[
    "Gasolina comum",
    "Gasolina aditivada",
    "Etanol",
    "Diesel S10",
    "Diesel S500",
    "Arla 32",
];
const TIPOS_PAREDE: &[&str] = &["Parede simples", "Parede dupla"];
const REGIMES_OPERACAO: &[&str] = &["Contínuo", "Batelada", "Misto"];
const COMBUSTIVEIS_CALDEIRA: &[&str] = &["Lenha", "Cavaco", "Gás natural", "GLP", "Óleo BPF"];
const METODOS_LAVRA: &[&str] = &["Céu aberto em bancadas", "Céu aberto em encosta", "Cava"];
const TIPOS_FORNO: &[&str] = &["Indução", "Cubilô", "Arco elétrico", "Cadinho"];
const SISTEMAS_CULTIVO: &[&str] = &["Convencional", "Plantio direto", "Orgânico"];
const CLASSES_TOXICOLOGICAS: &[&str] = &["Categoria 1", "Categoria 2", "Categoria 3", "Categoria 4", "Categoria 5"];
const ESPECIES: &[&str] = &["Bovinos", "Bubalinos", "Equinos", "Muares", "Ovinos", "Caprinos"];
const TIPOS_PASTAGEM: &[&str] = &["Nativa", "Plantada", "Mista"];

// --- Campos reaproveitados ---

const MATERIAS_PRIMAS: &[FieldSpec] = &[
    FieldSpec::text("nome", "Matéria-prima / insumo").required(),
    FieldSpec::choice("estadoFisico", "Estado físico", ESTADOS_FISICOS).required(),
    FieldSpec::number("consumoMensal", "Consumo mensal").required(),
    FieldSpec::choice("unidade", "Unidade", UNIDADES).required(),
    FieldSpec::text("formaArmazenamento", "Forma de armazenamento"),
    FieldSpec::text("origem", "Origem / fornecedor"),
];

const EQUIPAMENTOS: &[FieldSpec] = &[
    FieldSpec::text("descricao", "Equipamento").required(),
    FieldSpec::number("quantidade", "Quantidade").required(),
    FieldSpec::number("potenciaCv", "Potência (CV)"),
    FieldSpec::choice("fonteEnergia", "Fonte de energia", FONTES_ENERGIA),
];

const RESIDUOS_SOLIDOS: &[FieldSpec] = &[
    FieldSpec::text("residuo", "Resíduo").required(),
    FieldSpec::text("origem", "Origem").required(),
    FieldSpec::choice("classe", "Classe (NBR 10.004)", CLASSES_RESIDUO).required(),
    FieldSpec::number("quantidadeMensal", "Quantidade mensal"),
    FieldSpec::choice("unidade", "Unidade", UNIDADES),
    FieldSpec::text("acondicionamento", "Acondicionamento"),
    FieldSpec::text("destinacao", "Destinação final").required(),
    FieldSpec::text("empresaResponsavel", "Empresa responsável"),
];

const PRODUTOS: &[FieldSpec] = &[
    FieldSpec::text("nome", "Produto").required(),
    FieldSpec::number("producaoMensal", "Produção mensal").required(),
    FieldSpec::choice("unidade", "Unidade", UNIDADES).required(),
];

const EFLUENTES_LIQUIDOS: &[FieldSpec] = &[
    FieldSpec::text("origem", "Origem do efluente").required(),
    FieldSpec::number("vazaoM3Dia", "Vazão (m³/dia)").required(),
    FieldSpec::text("tratamento", "Sistema de tratamento").required(),
    FieldSpec::text("corpoReceptor", "Corpo receptor / lançamento"),
];

const EMISSOES_ATMOSFERICAS: &[FieldSpec] = &[
    FieldSpec::text("fonte", "Fonte emissora").required(),
    FieldSpec::text("poluente", "Poluente").required(),
    FieldSpec::text("sistemaControle", "Sistema de controle").required(),
];

// --- F-06-01-7: Postos de combustíveis ---

const TANQUES: &[FieldSpec] = &[
    FieldSpec::text("identificacao", "Identificação").required(),
    FieldSpec::choice("produto", "Produto armazenado", COMBUSTIVEIS).required(),
    FieldSpec::number("capacidadeM3", "Capacidade (m³)").required(),
    FieldSpec::choice("tipoParede", "Tipo de parede", TIPOS_PAREDE).required(),
    FieldSpec::date("dataInstalacao", "Data de instalação"),
];

const CAIXAS_SEPARADORAS: &[FieldSpec] = &[
    FieldSpec::text("identificacao", "Identificação").required(),
    FieldSpec::number("capacidadeL", "Capacidade (L)").required(),
    FieldSpec::date("dataUltimaLimpeza", "Data da última limpeza"),
];

pub const POSTO_COMBUSTIVEIS: VariantTemplate = VariantTemplate {
    id: "posto-combustiveis",
    title: "Postos revendedores e pontos de abastecimento de combustíveis",
    arrays: &[
        ArrayGroup { key: "tanques", label: "Tanques de armazenamento", fields: TANQUES, min_items: 1, gate: None },
        ArrayGroup {
            key: "caixasSeparadoras",
            label: "Caixas separadoras de água e óleo",
            fields: CAIXAS_SEPARADORAS,
            min_items: 1,
            gate: Some(Gate::IsTrue { path: "modulo4.instalacoes.possuiLavagem" }),
        },
        ArrayGroup { key: "equipamentos", label: "Equipamentos", fields: EQUIPAMENTOS, min_items: 0, gate: None },
        ArrayGroup { key: "residuosSolidos", label: "Resíduos sólidos", fields: RESIDUOS_SOLIDOS, min_items: 1, gate: None },
    ],
    singletons: &[
        SingletonGroup {
            key: "capacidadeEstocagem",
            label: "Capacidade de estocagem",
            fields: &[
                FieldSpec::number("cotaMaxima", "Cota máxima (m³)").required(),
                FieldSpec::number("capacidadeTotalM3", "Capacidade total (m³)").required(),
                FieldSpec::number("numeroBicos", "Número de bicos"),
            ],
        },
        SingletonGroup {
            key: "instalacoes",
            label: "Instalações",
            fields: &[
                FieldSpec::boolean("possuiLavagem", "Possui lavagem de veículos?").required(),
                FieldSpec::boolean("possuiTrocaOleo", "Possui troca de óleo?").required(),
                FieldSpec::boolean("possuiLojaConveniencia", "Possui loja de conveniência?"),
            ],
        },
    ],
};

// --- C-04-01-4: Indústria química ---

const REATORES: &[FieldSpec] = &[
    FieldSpec::text("identificacao", "Identificação").required(),
    FieldSpec::choice("tipo", "Tipo", REGIMES_OPERACAO),
    FieldSpec::number("volumeM3", "Volume (m³)").required(),
    FieldSpec::number("temperaturaOperacaoC", "Temperatura de operação (°C)"),
    FieldSpec::number("pressaoOperacaoBar", "Pressão de operação (bar)"),
    FieldSpec::text("materialConstrucao", "Material de construção"),
];

pub const INDUSTRIA_QUIMICA: VariantTemplate = VariantTemplate {
    id: "industria-quimica",
    title: "Fabricação de produtos químicos",
    arrays: &[
        ArrayGroup { key: "materiasPrimas", label: "Matérias-primas", fields: MATERIAS_PRIMAS, min_items: 1, gate: None },
        ArrayGroup { key: "reatores", label: "Reatores", fields: REATORES, min_items: 1, gate: None },
        ArrayGroup { key: "produtos", label: "Produtos", fields: PRODUTOS, min_items: 1, gate: None },
        ArrayGroup { key: "efluentesLiquidos", label: "Efluentes líquidos", fields: EFLUENTES_LIQUIDOS, min_items: 0, gate: None },
        ArrayGroup { key: "emissoesAtmosfericas", label: "Emissões atmosféricas", fields: EMISSOES_ATMOSFERICAS, min_items: 0, gate: None },
        ArrayGroup { key: "residuosSolidos", label: "Resíduos sólidos", fields: RESIDUOS_SOLIDOS, min_items: 1, gate: None },
        ArrayGroup { key: "equipamentos", label: "Equipamentos", fields: EQUIPAMENTOS, min_items: 0, gate: None },
    ],
    singletons: &[SingletonGroup {
        key: "processo",
        label: "Processo produtivo",
        fields: &[
            FieldSpec::text("descricaoProcesso", "Descrição do processo").required(),
            FieldSpec::choice("regimeOperacao", "Regime de operação", REGIMES_OPERACAO).required(),
            FieldSpec::number("turnosDia", "Turnos por dia").required(),
        ],
    }],
};

// --- D-01-13-9: Rações ---

pub const FABRICACAO_RACOES: VariantTemplate = VariantTemplate {
    id: "fabricacao-racoes",
    title: "Formulação de rações balanceadas e alimentos para animais",
    arrays: &[
        ArrayGroup { key: "materiasPrimas", label: "Matérias-primas", fields: MATERIAS_PRIMAS, min_items: 1, gate: None },
        ArrayGroup { key: "produtos", label: "Produtos", fields: PRODUTOS, min_items: 1, gate: None },
        ArrayGroup { key: "equipamentos", label: "Equipamentos", fields: EQUIPAMENTOS, min_items: 1, gate: None },
        ArrayGroup { key: "residuosSolidos", label: "Resíduos sólidos", fields: RESIDUOS_SOLIDOS, min_items: 0, gate: None },
        ArrayGroup { key: "emissoesAtmosfericas", label: "Emissões atmosféricas", fields: EMISSOES_ATMOSFERICAS, min_items: 0, gate: None },
    ],
    singletons: &[SingletonGroup {
        key: "processo",
        label: "Capacidade",
        fields: &[
            FieldSpec::number("capacidadeInstaladaTDia", "Capacidade instalada (t/dia)").required(),
            FieldSpec::number("diasTrabalhadosMes", "Dias trabalhados por mês").required(),
        ],
    }],
};

// --- D-01-06-1: Laticínios ---

pub const LATICINIOS: VariantTemplate = VariantTemplate {
    id: "laticinios",
    title: "Preparação do leite e fabricação de produtos de laticínios",
    arrays: &[
        ArrayGroup { key: "produtos", label: "Produtos", fields: PRODUTOS, min_items: 1, gate: None },
        ArrayGroup { key: "efluentesLiquidos", label: "Efluentes líquidos", fields: EFLUENTES_LIQUIDOS, min_items: 1, gate: None },
        ArrayGroup { key: "residuosSolidos", label: "Resíduos sólidos", fields: RESIDUOS_SOLIDOS, min_items: 0, gate: None },
        ArrayGroup { key: "equipamentos", label: "Equipamentos", fields: EQUIPAMENTOS, min_items: 0, gate: None },
    ],
    singletons: &[
        SingletonGroup {
            key: "recepcaoLeite",
            label: "Recepção de leite",
            fields: &[
                FieldSpec::number("volumeDiarioL", "Volume diário recebido (L)").required(),
                FieldSpec::text("origem", "Origem do leite"),
            ],
        },
        SingletonGroup {
            key: "caldeira",
            label: "Caldeira",
            fields: &[
                FieldSpec::boolean("possuiCaldeira", "Possui caldeira?").required(),
                FieldSpec::choice("combustivel", "Combustível", COMBUSTIVEIS_CALDEIRA)
                    .required()
                    .when(Gate::IsTrue { path: "modulo4.caldeira.possuiCaldeira" }),
                FieldSpec::number("consumoMensal", "Consumo mensal de combustível")
                    .when(Gate::IsTrue { path: "modulo4.caldeira.possuiCaldeira" }),
            ],
        },
    ],
};

// --- A-02-09-7: Brita ---

pub const EXTRACAO_BRITA: VariantTemplate = VariantTemplate {
    id: "extracao-brita",
    title: "Extração de rocha para produção de britas",
    arrays: &[
        ArrayGroup { key: "insumos", label: "Insumos", fields: MATERIAS_PRIMAS, min_items: 0, gate: None },
        ArrayGroup { key: "equipamentos", label: "Equipamentos", fields: EQUIPAMENTOS, min_items: 1, gate: None },
        ArrayGroup { key: "residuosSolidos", label: "Resíduos sólidos", fields: RESIDUOS_SOLIDOS, min_items: 0, gate: None },
    ],
    singletons: &[SingletonGroup {
        key: "lavra",
        label: "Lavra",
        fields: &[
            FieldSpec::choice("metodoLavra", "Método de lavra", METODOS_LAVRA).required(),
            FieldSpec::number("producaoBrutaAnualT", "Produção bruta anual (t)").required(),
            FieldSpec::number("areaLavraHa", "Área de lavra (ha)").required(),
            FieldSpec::text("processoAnm", "Processo ANM"),
            FieldSpec::boolean("usoExplosivos", "Utiliza explosivos?").required(),
            FieldSpec::text("fornecedorExplosivos", "Empresa responsável pelo desmonte")
                .required()
                .when(Gate::IsTrue { path: "modulo4.lavra.usoExplosivos" }),
        ],
    }],
};

// --- B-03-04-2: Fundição ---

const FORNOS: &[FieldSpec] = &[
    FieldSpec::text("identificacao", "Identificação").required(),
    FieldSpec::choice("tipo", "Tipo de forno", TIPOS_FORNO).required(),
    FieldSpec::number("capacidadeT", "Capacidade (t/corrida)").required(),
    FieldSpec::text("combustivel", "Combustível / energia"),
];

pub const FUNDICAO: VariantTemplate = VariantTemplate {
    id: "fundicao",
    title: "Produção de fundidos de ferro e aço",
    arrays: &[
        ArrayGroup { key: "materiasPrimas", label: "Matérias-primas", fields: MATERIAS_PRIMAS, min_items: 1, gate: None },
        ArrayGroup { key: "fornos", label: "Fornos", fields: FORNOS, min_items: 1, gate: None },
        ArrayGroup { key: "equipamentos", label: "Equipamentos", fields: EQUIPAMENTOS, min_items: 0, gate: None },
        ArrayGroup { key: "emissoesAtmosfericas", label: "Emissões atmosféricas", fields: EMISSOES_ATMOSFERICAS, min_items: 1, gate: None },
        ArrayGroup { key: "residuosSolidos", label: "Resíduos sólidos", fields: RESIDUOS_SOLIDOS, min_items: 1, gate: None },
    ],
    singletons: &[],
};

// --- G-01-03-1: Culturas ---

const CULTURAS: &[FieldSpec] = &[
    FieldSpec::text("cultura", "Cultura").required(),
    FieldSpec::number("areaHa", "Área plantada (ha)").required(),
    FieldSpec::choice("sistemaCultivo", "Sistema de cultivo", SISTEMAS_CULTIVO),
    FieldSpec::boolean("irrigada", "Irrigada?"),
];

const DEFENSIVOS: &[FieldSpec] = &[
    FieldSpec::text("produto", "Produto comercial").required(),
    FieldSpec::choice("classeToxicologica", "Classe toxicológica", CLASSES_TOXICOLOGICAS).required(),
    FieldSpec::number("dosePorHa", "Dose por hectare"),
];

pub const CULTURAS_ANUAIS: VariantTemplate = VariantTemplate {
    id: "culturas-anuais",
    title: "Culturas anuais, semiperenes e perenes",
    arrays: &[
        ArrayGroup { key: "culturas", label: "Culturas", fields: CULTURAS, min_items: 1, gate: None },
        ArrayGroup { key: "defensivos", label: "Defensivos agrícolas", fields: DEFENSIVOS, min_items: 0, gate: None },
        ArrayGroup { key: "maquinario", label: "Máquinas e implementos", fields: EQUIPAMENTOS, min_items: 0, gate: None },
        ArrayGroup { key: "residuosSolidos", label: "Resíduos sólidos", fields: RESIDUOS_SOLIDOS, min_items: 0, gate: None },
    ],
    singletons: &[SingletonGroup {
        key: "irrigacao",
        label: "Irrigação",
        fields: &[
            FieldSpec::boolean("possuiIrrigacao", "Possui irrigação?").required(),
            FieldSpec::text("outorga", "Número da outorga / cadastro")
                .required()
                .when(Gate::IsTrue { path: "modulo4.irrigacao.possuiIrrigacao" }),
            FieldSpec::number("vazaoM3H", "Vazão captada (m³/h)")
                .when(Gate::IsTrue { path: "modulo4.irrigacao.possuiIrrigacao" }),
        ],
    }],
};

// --- G-02-07-0: Bovinocultura extensiva ---

const REBANHO: &[FieldSpec] = &[
    FieldSpec::choice("especie", "Espécie", ESPECIES).required(),
    FieldSpec::text("categoria", "Categoria"),
    FieldSpec::number("numeroCabecas", "Número de cabeças").required(),
];

pub const CRIACAO_EXTENSIVA: VariantTemplate = VariantTemplate {
    id: "criacao-extensiva",
    title: "Criação de bovinos, bubalinos, equinos, muares, ovinos e caprinos em regime extensivo",
    arrays: &[
        ArrayGroup { key: "rebanho", label: "Rebanho", fields: REBANHO, min_items: 1, gate: None },
        ArrayGroup { key: "maquinario", label: "Máquinas e implementos", fields: EQUIPAMENTOS, min_items: 0, gate: None },
    ],
    singletons: &[SingletonGroup {
        key: "pastagem",
        label: "Pastagem",
        fields: &[
            FieldSpec::number("areaPastagemHa", "Área de pastagem (ha)").required(),
            FieldSpec::choice("tipoPastagem", "Tipo de pastagem", TIPOS_PASTAGEM).required(),
            FieldSpec::text("manejoDejetos", "Manejo de dejetos"),
        ],
    }],
};

// --- F-05-12-6: Triagem de recicláveis ---

const RESIDUOS_RECEBIDOS: &[FieldSpec] = &[
    FieldSpec::text("tipo", "Tipo de resíduo").required(),
    FieldSpec::text("origem", "Origem").required(),
    FieldSpec::number("quantidadeMensalT", "Quantidade mensal (t)").required(),
];

pub const TRIAGEM_RECICLAVEIS: VariantTemplate = VariantTemplate {
    id: "triagem-reciclaveis",
    title: "Unidade de triagem de recicláveis",
    arrays: &[
        ArrayGroup { key: "residuosRecebidos", label: "Resíduos recebidos", fields: RESIDUOS_RECEBIDOS, min_items: 1, gate: None },
        ArrayGroup { key: "equipamentos", label: "Equipamentos", fields: EQUIPAMENTOS, min_items: 0, gate: None },
        ArrayGroup { key: "rejeitos", label: "Rejeitos", fields: RESIDUOS_SOLIDOS, min_items: 1, gate: None },
    ],
    singletons: &[],
};
