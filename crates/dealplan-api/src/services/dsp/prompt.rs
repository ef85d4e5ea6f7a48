//! Instructional prompts sent to the generation service

use dealplan_ai::ChatMessage;
use dealplan_core::models::{DspFormat, Opportunity};

use super::attempts::RejectionReason;
use super::corpus::Corpus;

const CONSULTANT_SYSTEM_PROMPT: &str = "\
Eres un consultor senior de preventa que redacta Deal Strategy Plans (DSP) para oportunidades comerciales.

Reglas:
- Basate exclusivamente en la información de los documentos provistos. No inventes datos, nombres, cifras ni fechas.
- Si falta información para una sección, escribí \"N/A\" y mencioná qué dato falta.
- Redactá en español, con tono profesional, claro y conciso.
- Respondé únicamente con un documento Markdown. Usá encabezados (#, ##) para cada sección.
- No incluyas texto antes o después del documento.";

const STRUCTURED_SYSTEM_PROMPT: &str = "\
Eres un consultor senior de preventa que completa Deal Strategy Plans (DSP) en formato JSON.

Reglas:
- Respondé SOLO con JSON válido. Sin markdown, sin bloques de código, sin texto adicional.
- Mantené exactamente el esquema indicado: mismas claves, mismos tipos. No agregues ni quites campos.
- No inventes información. Si un dato no está en los documentos, usá \"N/A\" (o una lista vacía en campos de tipo lista).
- Sé conciso. El contenido debe estar en español.
- Los campos \"purpose\" deben conservar el texto provisto en el esquema.";

const MARKDOWN_SECTIONS: &str = "\
1. Objetivo del Proyecto: objetivo estratégico del cliente y criterios de éxito.
2. Caso de Uso: problema a resolver, consecuencias actuales, impacto en el negocio y nivel de prioridad (Alta/Media/Baja) con su justificación.
3. Bundles: bundle de aceleración recomendado y opciones consideradas.
4. Abordaje Preliminar de la Solución: abordaje recomendado, justificación, supuestos y preguntas abiertas.
5. Descripción de Funcionalidades: funcionalidades esperadas con su valor de negocio y lo que queda fuera de alcance.
6. Aspectos Técnicos: ambiente cloud, experiencia cloud, responsable de infraestructura, datos requeridos y brechas o riesgos de datos.
7. Competitividad y Posicionamiento Estratégico: competidores o alternativas, ventajas de Santex y narrativa de diferenciación.
8. Roadmap Comercial y Próximos Pasos: próximos pasos con responsable, fecha esperada y criterios de salida, y dependencias.
Cerrá con un nivel de confianza (Alta/Media/Baja) y un resumen de la información faltante.";

fn schema_skeleton(opportunity_id: i32, input_names: &[String]) -> String {
    let schema = serde_json::json!({
        "deal_strategy_plan": {
            "project_objective": {
                "purpose": "Definir el objetivo estratégico que persigue el cliente con la iniciativa.",
                "strategic_objective": "",
                "success_criteria": "",
                "notes": ""
            },
            "use_case": {
                "purpose": "Describir el problema concreto a resolver y su impacto en el negocio.",
                "problem_to_solve": "",
                "current_consequences": "",
                "business_impact": "",
                "priority_level": "Alta | Media | Baja",
                "priority_rationale": "",
                "notes": ""
            },
            "bundles": {
                "purpose": "Identificar si aplica un bundle de aceleración.",
                "recommended_bundle": "",
                "bundle_options_considered": [{ "bundle": "", "fit_reason": "" }],
                "notes": ""
            },
            "preliminary_solution_approach": {
                "purpose": "Definir el abordaje inicial según claridad del proyecto y madurez tecnológica.",
                "recommended_approach": "",
                "approach_rationale": "",
                "assumptions": [""],
                "open_questions": [""],
                "notes": ""
            },
            "functionalities_description": {
                "purpose": "Listar funcionalidades iniciales esperadas, sin detalle técnico profundo.",
                "expected_functionalities": [{ "name": "", "description": "", "business_value": "" }],
                "out_of_scope": [""],
                "notes": ""
            },
            "technical": {
                "purpose": "Evaluar infraestructura y disponibilidad de datos.",
                "cloud_environment": "",
                "cloud_experience": "",
                "infrastructure_owner": "",
                "required_data": [{ "data_type": "", "availability": "", "location": "" }],
                "data_gaps_or_risks": [""],
                "notes": ""
            },
            "competitiveness_and_strategic_positioning": {
                "purpose": "Mapear el entorno competitivo y construir una narrativa diferencial.",
                "competitors_or_alternatives": [{ "name": "", "status_or_role": "", "strengths": "", "weaknesses": "" }],
                "santex_advantages": [""],
                "differentiation_narrative": "",
                "notes": ""
            },
            "commercial_roadmap_next_steps": {
                "purpose": "Establecer hitos comerciales y criterios de salida.",
                "next_steps": [{ "step": "", "owner": "", "expected_date_or_window": "", "exit_criteria": "" }],
                "dependencies": [""],
                "notes": ""
            },
            "meta": {
                "opportunity_id": opportunity_id.to_string(),
                "generated_from_inputs": input_names,
                "confidence_level": "Alta | Media | Baja",
                "missing_information_summary": ""
            }
        }
    });
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// System and user messages for the first attempt
pub fn initial_messages(
    format: DspFormat,
    opportunity: &Opportunity,
    corpus: &Corpus,
) -> Vec<ChatMessage> {
    let description = opportunity
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("N/A");

    match format {
        DspFormat::Markdown => vec![
            ChatMessage::system(CONSULTANT_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Oportunidad: {name} (ID {id})\nDescripción: {description}\n\n\
                 Redactá el Deal Strategy Plan con estas secciones:\n{sections}\n\n\
                 DOCUMENTOS DE LA OPORTUNIDAD:\n{corpus}",
                name = opportunity.opportunity_name,
                id = opportunity.opportunity_id,
                sections = MARKDOWN_SECTIONS,
                corpus = corpus.text,
            )),
        ],
        DspFormat::Html => vec![
            ChatMessage::system(STRUCTURED_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Oportunidad: {name} (ID {id})\nDescripción: {description}\n\n\
                 Completá este esquema JSON con la información de los documentos:\n{schema}\n\n\
                 DOCUMENTOS DE LA OPORTUNIDAD:\n{corpus}",
                name = opportunity.opportunity_name,
                id = opportunity.opportunity_id,
                schema = schema_skeleton(opportunity.opportunity_id, &corpus.input_names),
                corpus = corpus.text,
            )),
        ],
    }
}

/// Follow-up instruction after a rejected answer
pub fn corrective_prompt(format: DspFormat, reason: &RejectionReason) -> String {
    let fix = match format {
        DspFormat::Markdown => {
            "Devolvé el documento completo en Markdown, comenzando con un encabezado (#)."
        }
        DspFormat::Html => {
            "Devolvé SOLO el objeto JSON completo, con todas las claves del esquema y los tipos correctos."
        }
    };
    format!(
        "Tu respuesta anterior fue rechazada ({}). {}",
        reason, fix
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn opportunity() -> Opportunity {
        Opportunity {
            opportunity_id: 42,
            opportunity_name: "Acme Renewal".to_string(),
            description: None,
            client_id: 1,
            responsible_id: 1,
            status: "OPEN".to_string(),
            generated_at: Utc::now(),
            generated_by: None,
        }
    }

    fn corpus() -> Corpus {
        Corpus {
            text: "\n\n=== INPUT: brief.pdf ===\ncontenido".to_string(),
            input_names: vec!["brief.pdf".to_string()],
        }
    }

    #[test]
    fn test_structured_prompt_embeds_schema_and_corpus() {
        let messages = initial_messages(DspFormat::Html, &opportunity(), &corpus());
        assert_eq!(messages.len(), 2);
        let user = &messages[1].content;
        assert!(user.contains("\"deal_strategy_plan\""));
        assert!(user.contains("\"42\""));
        assert!(user.contains("brief.pdf"));
        assert!(user.contains("=== INPUT: brief.pdf ==="));
        assert!(messages[0].content.contains("JSON"));
    }

    #[test]
    fn test_markdown_prompt_lists_sections() {
        let messages = initial_messages(DspFormat::Markdown, &opportunity(), &corpus());
        assert!(messages[0].content.contains("Markdown"));
        assert!(messages[1].content.contains("Roadmap Comercial"));
        assert!(messages[1].content.contains("Descripción: N/A"));
    }

    #[test]
    fn test_corrective_prompt_names_reason() {
        let text = corrective_prompt(
            DspFormat::Html,
            &RejectionReason::SchemaViolation("missing field `meta`".into()),
        );
        assert!(text.contains("SchemaViolation(missing field `meta`)"));
    }
}
