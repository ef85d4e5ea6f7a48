//! Structured plan → standalone HTML page.
//!
//! Every value coming from the generated document or the opportunity is
//! passed through [`escape_html`] before it is written.

use dealplan_core::models::{DealStrategyPlan, DspDocument};

use super::{escape_html, RenderContext};

const EMPTY_STATE: &str = r#"<span class="empty-state">N/A</span>"#;

const STYLE: &str = r#"
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #2c3e50; background: #f8f9fa; padding: 40px 20px; }
    .container { max-width: 1200px; margin: 0 auto; background: white; padding: 60px; border-radius: 12px; box-shadow: 0 4px 20px rgba(0,0,0,0.08); }
    .header { text-align: center; border-bottom: 4px solid #3498db; padding-bottom: 30px; margin-bottom: 50px; }
    .header h1 { font-size: 2.5em; margin-bottom: 10px; font-weight: 700; }
    .header .opportunity-name { font-size: 1.5em; color: #7f8c8d; font-weight: 300; }
    .section { margin-bottom: 50px; page-break-inside: avoid; }
    .section-title { font-size: 1.8em; font-weight: 700; margin-bottom: 25px; padding-bottom: 12px; border-bottom: 3px solid #3498db; display: flex; align-items: center; }
    .section-number { display: inline-flex; align-items: center; justify-content: center; width: 40px; height: 40px; background: #3498db; color: white; border-radius: 50%; margin-right: 15px; font-size: 0.8em; flex-shrink: 0; }
    .purpose-box { background: #ecf7fd; border-left: 4px solid #3498db; padding: 15px 20px; margin-bottom: 25px; border-radius: 4px; font-style: italic; color: #5a6c7d; }
    .subsection { margin-bottom: 25px; }
    .subsection-title { color: #34495e; font-size: 1.2em; font-weight: 600; margin-bottom: 12px; padding-left: 10px; border-left: 3px solid #95a5a6; }
    .content { color: #444; line-height: 1.8; padding-left: 15px; }
    .content ul { list-style: none; }
    .content li { padding: 8px 0 8px 30px; position: relative; }
    .content li:before { content: "▸"; position: absolute; left: 10px; color: #3498db; font-weight: bold; }
    table { width: 100%; border-collapse: collapse; margin: 20px 0; }
    th { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 16px; text-align: left; font-weight: 600; text-transform: uppercase; }
    td { padding: 14px 16px; border-bottom: 1px solid #ecf0f1; color: #555; }
    .badge { display: inline-block; padding: 6px 14px; border-radius: 20px; font-size: 0.85em; font-weight: 600; text-transform: uppercase; }
    .badge-high { background: linear-gradient(135deg, #f093fb 0%, #f5576c 100%); color: white; }
    .badge-medium { background: linear-gradient(135deg, #fa709a 0%, #fee140 100%); color: white; }
    .badge-low { background: linear-gradient(135deg, #a8edea 0%, #fed6e3 100%); color: #555; }
    .badge-info { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; }
    .metadata { margin-top: 60px; padding: 30px; background: linear-gradient(135deg, #f5f7fa 0%, #c3cfe2 100%); border-radius: 8px; border-top: 4px solid #667eea; }
    .metadata h3 { margin-bottom: 20px; font-size: 1.3em; }
    .metadata-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 15px; }
    .metadata-item { background: white; padding: 15px; border-radius: 6px; }
    .metadata-label { font-weight: 600; color: #7f8c8d; font-size: 0.85em; text-transform: uppercase; margin-bottom: 8px; }
    .empty-state { color: #95a5a6; font-style: italic; }
    @media print { body { padding: 0; background: white; } .container { box-shadow: none; padding: 40px; } }
"#;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Escaped value, or the N/A placeholder when empty
fn scalar(value: &str) -> String {
    if is_blank(value) {
        EMPTY_STATE.to_string()
    } else {
        escape_html(value)
    }
}

/// Badge class for a priority or confidence level
fn badge_class(level: &str) -> &'static str {
    let level = level.to_lowercase();
    if level.contains("high") || level.contains("alta") {
        "badge-high"
    } else if level.contains("medium") || level.contains("media") {
        "badge-medium"
    } else if level.contains("low") || level.contains("baja") {
        "badge-low"
    } else {
        "badge-info"
    }
}

fn badge(level: &str) -> String {
    let trimmed = level.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return EMPTY_STATE.to_string();
    }
    format!(
        r#"<span class="badge {}">{}</span>"#,
        badge_class(trimmed),
        escape_html(trimmed)
    )
}

/// Accumulates the page body
struct Page {
    out: String,
}

impl Page {
    fn new() -> Self {
        Self {
            out: String::with_capacity(16 * 1024),
        }
    }

    fn open_section(&mut self, number: u8, title: &str, purpose: &str) {
        self.out.push_str(&format!(
            "    <div class=\"section\">\n      <h2 class=\"section-title\"><span class=\"section-number\">{}</span>{}</h2>\n",
            number, title
        ));
        if !is_blank(purpose) {
            self.out.push_str(&format!(
                "      <div class=\"purpose-box\">{}</div>\n",
                escape_html(purpose)
            ));
        }
    }

    fn close_section(&mut self) {
        self.out.push_str("    </div>\n");
    }

    fn subsection(&mut self, title: &str, inner_html: &str) {
        self.out.push_str(&format!(
            "      <div class=\"subsection\">\n        <h3 class=\"subsection-title\">{}</h3>\n        <div class=\"content\">{}</div>\n      </div>\n",
            title, inner_html
        ));
    }

    fn text(&mut self, title: &str, value: &str) {
        self.subsection(title, &format!("<p>{}</p>", scalar(value)));
    }

    fn notes(&mut self, notes: &str) {
        if !is_blank(notes) {
            self.text("Notas", notes);
        }
    }

    fn list(&mut self, title: &str, items: &[String]) {
        let items: Vec<_> = items.iter().filter(|item| !is_blank(item)).collect();
        if items.is_empty() {
            return;
        }
        let lis: String = items
            .iter()
            .map(|item| format!("<li>{}</li>", escape_html(item)))
            .collect();
        self.subsection(title, &format!("<ul>{}</ul>", lis));
    }

    fn table(&mut self, title: &str, headers: &[&str], rows: Vec<Vec<&str>>) {
        if rows.is_empty() {
            return;
        }
        let head: String = headers
            .iter()
            .map(|h| format!("<th>{}</th>", h))
            .collect();
        let body: String = rows
            .iter()
            .map(|row| {
                let cells: String = row
                    .iter()
                    .map(|cell| format!("<td>{}</td>", scalar(cell)))
                    .collect();
                format!("<tr>{}</tr>", cells)
            })
            .collect();
        self.subsection(
            title,
            &format!(
                "<table><thead><tr>{}</tr></thead><tbody>{}</tbody></table>",
                head, body
            ),
        );
    }

    fn metadata_item(&mut self, label: &str, value_html: &str) {
        self.out.push_str(&format!(
            "        <div class=\"metadata-item\"><div class=\"metadata-label\">{}</div><div class=\"metadata-value\">{}</div></div>\n",
            label, value_html
        ));
    }
}

fn write_sections(page: &mut Page, plan: &DealStrategyPlan) {
    let s = &plan.project_objective;
    page.open_section(1, "Objetivo del Proyecto", &s.purpose);
    page.text("Objetivo Estratégico", &s.strategic_objective);
    page.text("Criterios de Éxito", &s.success_criteria);
    page.notes(&s.notes);
    page.close_section();

    let s = &plan.use_case;
    page.open_section(2, "Caso de Uso", &s.purpose);
    page.text("Problema a Resolver", &s.problem_to_solve);
    page.text("Consecuencias Actuales", &s.current_consequences);
    page.text("Impacto en el Negocio", &s.business_impact);
    page.subsection("Nivel de Prioridad", &badge(&s.priority_level));
    page.text("Justificación de Prioridad", &s.priority_rationale);
    page.notes(&s.notes);
    page.close_section();

    let s = &plan.bundles;
    page.open_section(3, "Bundles", &s.purpose);
    page.text("Bundle Recomendado", &s.recommended_bundle);
    page.table(
        "Opciones Consideradas",
        &["Bundle", "Razón de Fit"],
        s.bundle_options_considered
            .iter()
            .map(|o| vec![o.bundle.as_str(), o.fit_reason.as_str()])
            .collect(),
    );
    page.notes(&s.notes);
    page.close_section();

    let s = &plan.preliminary_solution_approach;
    page.open_section(4, "Abordaje Preliminar de la Solución", &s.purpose);
    page.text("Abordaje Recomendado", &s.recommended_approach);
    page.text("Justificación del Abordaje", &s.approach_rationale);
    page.list("Supuestos", &s.assumptions);
    page.list("Preguntas Abiertas", &s.open_questions);
    page.notes(&s.notes);
    page.close_section();

    let s = &plan.functionalities_description;
    page.open_section(5, "Descripción de Funcionalidades", &s.purpose);
    page.table(
        "Funcionalidades Esperadas",
        &["Nombre", "Descripción", "Valor de Negocio"],
        s.expected_functionalities
            .iter()
            .map(|f| vec![f.name.as_str(), f.description.as_str(), f.business_value.as_str()])
            .collect(),
    );
    page.list("Fuera de Alcance", &s.out_of_scope);
    page.notes(&s.notes);
    page.close_section();

    let s = &plan.technical;
    page.open_section(6, "Aspectos Técnicos", &s.purpose);
    page.text("Ambiente Cloud", &s.cloud_environment);
    page.text("Experiencia Cloud", &s.cloud_experience);
    page.text("Responsable de Infraestructura", &s.infrastructure_owner);
    page.table(
        "Datos Requeridos",
        &["Tipo de Dato", "Disponibilidad", "Ubicación"],
        s.required_data
            .iter()
            .map(|d| vec![d.data_type.as_str(), d.availability.as_str(), d.location.as_str()])
            .collect(),
    );
    page.list("Brechas o Riesgos de Datos", &s.data_gaps_or_risks);
    page.notes(&s.notes);
    page.close_section();

    let s = &plan.competitiveness_and_strategic_positioning;
    page.open_section(7, "Competitividad y Posicionamiento Estratégico", &s.purpose);
    page.table(
        "Competidores o Alternativas",
        &["Nombre", "Estado/Rol", "Fortalezas", "Debilidades"],
        s.competitors_or_alternatives
            .iter()
            .map(|c| {
                vec![
                    c.name.as_str(),
                    c.status_or_role.as_str(),
                    c.strengths.as_str(),
                    c.weaknesses.as_str(),
                ]
            })
            .collect(),
    );
    page.list("Ventajas de Santex", &s.santex_advantages);
    page.text("Narrativa de Diferenciación", &s.differentiation_narrative);
    page.notes(&s.notes);
    page.close_section();

    let s = &plan.commercial_roadmap_next_steps;
    page.open_section(8, "Roadmap Comercial y Próximos Pasos", &s.purpose);
    page.table(
        "Próximos Pasos",
        &["Paso", "Responsable", "Fecha Esperada", "Criterios de Salida"],
        s.next_steps
            .iter()
            .map(|n| {
                vec![
                    n.step.as_str(),
                    n.owner.as_str(),
                    n.expected_date_or_window.as_str(),
                    n.exit_criteria.as_str(),
                ]
            })
            .collect(),
    );
    page.list("Dependencias", &s.dependencies);
    page.notes(&s.notes);
    page.close_section();
}

fn write_metadata(page: &mut Page, plan: &DealStrategyPlan, ctx: &RenderContext<'_>) {
    let meta = &plan.meta;
    let inputs = if meta.generated_from_inputs.is_empty() {
        ctx.source_inputs
    } else {
        meta.generated_from_inputs.as_slice()
    };
    let inputs_html = if inputs.is_empty() {
        EMPTY_STATE.to_string()
    } else {
        inputs
            .iter()
            .map(|name| escape_html(name))
            .collect::<Vec<_>>()
            .join(", ")
    };

    page.out.push_str(
        "    <div class=\"metadata\">\n      <h3>Información del Documento</h3>\n      <div class=\"metadata-grid\">\n",
    );
    page.metadata_item("Opportunity ID", &ctx.opportunity_id.to_string());
    page.metadata_item("Generado desde inputs", &inputs_html);
    page.metadata_item("Nivel de confianza", &badge(&meta.confidence_level));
    page.metadata_item("Generado", &escape_html(&ctx.timestamp()));
    if !is_blank(&meta.missing_information_summary) {
        page.metadata_item(
            "Resumen de información faltante",
            &escape_html(&meta.missing_information_summary),
        );
    }
    page.out.push_str("      </div>\n    </div>\n");
}

/// Render a validated plan as a complete HTML document
pub fn render_html(document: &DspDocument, ctx: &RenderContext<'_>) -> String {
    let plan = &document.deal_strategy_plan;
    let name = escape_html(ctx.opportunity_name);

    let mut page = Page::new();
    write_sections(&mut page, plan);
    write_metadata(&mut page, plan, ctx);

    format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n  <meta charset=\"UTF-8\">\n  \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n  \
         <title>Deal Strategy Plan - {name}</title>\n  <style>{style}</style>\n</head>\n<body>\n  \
         <div class=\"container\">\n    <div class=\"header\">\n      <h1>Deal Strategy Plan</h1>\n      \
         <div class=\"opportunity-name\">{name}</div>\n    </div>\n{body}  </div>\n</body>\n</html>\n",
        name = name,
        style = STYLE,
        body = page.out,
    )
}
