// src/services/pdf_service.rs

use genpdf::{elements, style, Element};
use serde_json::Value;

use crate::{
    common::{error::AppError, json_utils::get_str_path},
    db::document_store::StoredDocument,
    models::{
        rca::{Activity, Zee},
        variant::{FieldSpec, VariantTemplate},
    },
    services::{field_gates::is_gate_open, variant_registry::resolve_for_document},
};

/// Bloco do relatório: pares rótulo/valor seguidos de tabelas.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfSection {
    pub title: String,
    pub lines: Vec<(String, String)>,
    pub tables: Vec<PdfTable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PdfSection {
    fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), lines: Vec::new(), tables: Vec::new() }
    }

    fn line(mut self, label: &str, document: &Value, path: &str) -> Self {
        self.lines.push((label.to_string(), display_value(get_str_path(document, path))));
        self
    }
}

#[derive(Clone)]
pub struct PdfService {
    fonts_dir: String,
}

impl PdfService {
    pub fn new(fonts_dir: String) -> Self {
        Self { fonts_dir }
    }

    pub fn render_rca(&self, stored: &StoredDocument) -> Result<Vec<u8>, AppError> {
        // 1. Configura o PDF
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None)
            .map_err(|_| AppError::PdfError(format!("Fonte não encontrada na pasta {}", self.fonts_dir)))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("RCA {}", stored.id));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new("RELATÓRIO DE CONTROLE AMBIENTAL - RCA")
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        let status = display_value(get_str_path(&stored.data, "status"));
        doc.push(
            elements::Paragraph::new(format!("Documento {} - {}", stored.id, status))
                .styled(style::Style::new().with_font_size(10)),
        );
        doc.push(elements::Break::new(1.5));

        // --- MÓDULOS ---
        for section in build_sections(&stored.data) {
            doc.push(
                elements::Paragraph::new(section.title)
                    .styled(style::Style::new().bold().with_font_size(14)),
            );
            for (label, value) in section.lines {
                doc.push(elements::Paragraph::new(format!("{}: {}", label, value)));
            }
            for table in section.tables {
                push_table(&mut doc, table)?;
            }
            doc.push(elements::Break::new(1));
        }

        let mut footer = elements::Paragraph::new("Documento gerado automaticamente");
        footer.set_alignment(genpdf::Alignment::Right);
        doc.push(footer.styled(style::Style::new().italic().with_font_size(8)));

        // 2. Renderiza
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::PdfError(e.to_string()))?;

        tracing::info!("PDF do RCA {} gerado ({} bytes)", stored.id, buffer.len());
        Ok(buffer)
    }
}

fn push_table(doc: &mut genpdf::Document, table: PdfTable) -> Result<(), AppError> {
    doc.push(elements::Paragraph::new(table.title).styled(style::Style::new().bold()));

    if table.rows.is_empty() {
        doc.push(elements::Paragraph::new("Nenhum item informado").styled(style::Style::new().italic()));
        return Ok(());
    }

    let mut layout = elements::TableLayout::new(vec![1; table.headers.len()]);
    layout.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold();
    let mut header = layout.row();
    for cell in table.headers {
        header = header.element(elements::Paragraph::new(cell).styled(style_bold));
    }
    header.push().map_err(|e| AppError::PdfError(e.to_string()))?;

    for cells in table.rows {
        let mut row = layout.row();
        for cell in cells {
            row = row.element(elements::Paragraph::new(cell));
        }
        row.push().map_err(|e| AppError::PdfError(e.to_string()))?;
    }

    doc.push(layout);
    Ok(())
}

/// Conteúdo do relatório, independente de fontes e layout.
pub fn build_sections(document: &Value) -> Vec<PdfSection> {
    let activity = get_str_path(document, "activity")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Activity>().ok());

    let mut identificacao = PdfSection::new("1. Identificação");
    identificacao.lines.push((
        "Atividade".to_string(),
        activity.map(|a| a.label().to_string()).unwrap_or_else(|| "-".to_string()),
    ));
    let identificacao = identificacao
        .line("Sub-atividade", document, "subActivity")
        .line("Empreendedor", document, "empreendedor.nome")
        .line("CPF/CNPJ", document, "empreendedor.cpfCnpj")
        .line("Empreendimento", document, "empreendimento.nome")
        .line("Município", document, "empreendimento.municipio")
        .line("UF", document, "empreendimento.uf")
        .line("Responsável ambiental", document, "responsavelAmbiental.nome")
        .line("Registro no conselho", document, "responsavelAmbiental.registroConselho");

    let mut localizacao = PdfSection::new("2. Localização")
        .line("Datum", document, "geographicLocation.datum")
        .line("Formato", document, "geographicLocation.formato");
    if get_str_path(document, "geographicLocation.formato").and_then(Value::as_str) == Some("UTM") {
        localizacao = localizacao
            .line("X", document, "geographicLocation.utm.x")
            .line("Y", document, "geographicLocation.utm.y")
            .line("Fuso", document, "geographicLocation.utm.fuso");
    } else {
        localizacao.lines.push(("Latitude".to_string(), gms(document, "geographicLocation.latitude")));
        localizacao.lines.push(("Longitude".to_string(), gms(document, "geographicLocation.longitude")));
    }

    let area = PdfSection::new("3. Caracterização da área")
        .line("Área total (ha)", document, "caracterizacaoArea.areaTotalHa")
        .line("Área construída (m²)", document, "caracterizacaoArea.areaConstruidaM2")
        .line("Possui APP", document, "caracterizacaoArea.possuiApp")
        .line("Possui reserva legal", document, "caracterizacaoArea.possuiReservaLegal")
        .line("Abastecimento de água", document, "caracterizacaoArea.abastecimentoAgua");

    let modulo4 = match resolve_for_document(document) {
        Some(template) => module4_section(template, document),
        None => {
            let mut section = PdfSection::new("4. Caracterização do empreendimento");
            section.lines.push((
                "Situação".to_string(),
                "Formulário específico não disponível para esta sub-atividade".to_string(),
            ));
            section
        }
    };

    let impactos = PdfSection::new("5. Impactos ambientais")
        .line("Meio físico", document, "impactosMeioFisico")
        .line("Meio biótico", document, "impactosMeioBiotico")
        .line("Meio socioeconômico", document, "impactosMeioSocioeconomico");

    let mut zee = PdfSection::new("6. ZEE e socioeconomia");
    for factor in Zee::FACTORS {
        zee = zee.line(factor, document, &format!("zee.{}", factor));
    }
    zee.tables.push(rows_table(
        "Municípios",
        document,
        "socioeconomia",
        &[("municipio", "Município"), ("populacao", "População"), ("idh", "IDH")],
    ));

    let mut medidas = PdfSection::new("7. Medidas de controle e anexos").line("Anexos", document, "anexos");
    if !display_value(get_str_path(document, "anexosOutros")).eq("-") {
        medidas = medidas.line("Outros anexos", document, "anexosOutros");
    }
    medidas.tables.push(rows_table(
        "Medidas de controle",
        document,
        "medidasControle",
        &[("impacto", "Impacto"), ("medida", "Medida"), ("prazo", "Prazo")],
    ));

    vec![identificacao, localizacao, area, modulo4, impactos, zee, medidas]
}

fn module4_section(template: &VariantTemplate, document: &Value) -> PdfSection {
    let mut section = PdfSection::new(format!("4. {}", template.title));

    for group in template.singletons {
        for field in visible(group.fields, document) {
            let path = format!("modulo4.{}.{}", group.key, field.key);
            section.lines.push((field.label.to_string(), display_value(get_str_path(document, &path))));
        }
    }

    for group in template.arrays.iter().filter(|g| is_gate_open(g.gate.as_ref(), document)) {
        let fields = visible(group.fields, document);
        let items = get_str_path(document, &format!("modulo4.{}", group.key))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        section.tables.push(PdfTable {
            title: group.label.to_string(),
            headers: fields.iter().map(|f| f.label.to_string()).collect(),
            rows: items
                .iter()
                .map(|item| fields.iter().map(|f| display_value(item.get(f.key))).collect())
                .collect(),
        });
    }
    section
}

fn visible<'a>(fields: &'a [FieldSpec], document: &Value) -> Vec<&'a FieldSpec> {
    fields.iter().filter(|f| is_gate_open(f.gate.as_ref(), document)).collect()
}

fn rows_table(title: &str, document: &Value, path: &str, columns: &[(&str, &str)]) -> PdfTable {
    let items = get_str_path(document, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    PdfTable {
        title: title.to_string(),
        headers: columns.iter().map(|(_, label)| label.to_string()).collect(),
        rows: items
            .iter()
            .map(|item| columns.iter().map(|(key, _)| display_value(item.get(*key))).collect())
            .collect(),
    }
}

fn gms(document: &Value, path: &str) -> String {
    let part = |key: &str| display_value(get_str_path(document, &format!("{}.{}", path, key)));
    format!("{}° {}' {}\"", part("graus"), part("minutos"), part("segundos"))
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "Sim".to_string(),
        Some(Value::Bool(false)) => "Não".to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(items)) if items.is_empty() => "-".to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|i| display_value(Some(i)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other @ Value::Object(_)) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::approvable_posto;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn section<'a>(sections: &'a [PdfSection], prefix: &str) -> &'a PdfSection {
        sections.iter().find(|s| s.title.starts_with(prefix)).unwrap()
    }

    #[test]
    fn module4_tables_follow_the_variant_template() {
        let sections = build_sections(&approvable_posto());
        let modulo4 = section(&sections, "4.");

        let tanques = modulo4.tables.iter().find(|t| t.title.contains("anque")).unwrap();
        assert_eq!(tanques.rows.len(), 1);
        assert_eq!(tanques.headers.len(), tanques.rows[0].len());
    }

    #[test]
    fn unregistered_variant_renders_placeholder() {
        let sections = build_sections(&json!({ "activity": "A", "subActivity": "A-02-07-0" }));
        let modulo4 = section(&sections, "4.");

        assert!(modulo4.tables.is_empty());
        assert_eq!(modulo4.lines[0].0, "Situação");
    }

    #[test]
    fn values_are_rendered_for_reading() {
        assert_eq!(display_value(Some(&json!(true))), "Sim");
        assert_eq!(display_value(Some(&json!("  "))), "-");
        assert_eq!(display_value(None), "-");
        assert_eq!(display_value(Some(&json!(["Ruído", "Poeira"]))), "Ruído, Poeira");
    }

    #[test]
    fn utm_location_lists_utm_coordinates() {
        let doc = json!({ "geographicLocation": { "formato": "UTM", "utm": { "x": 500000, "y": 7800000, "fuso": 23 } } });
        let localizacao = build_sections(&doc).into_iter().nth(1).unwrap();

        assert!(localizacao.lines.contains(&("Fuso".to_string(), "23".to_string())));
        assert!(!localizacao.lines.iter().any(|(label, _)| label == "Latitude"));
    }
}
