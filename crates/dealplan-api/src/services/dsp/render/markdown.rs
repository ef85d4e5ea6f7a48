use super::RenderContext;

/// Wrap a generated Markdown body with the title, metadata and footer.
///
/// The body is inserted as-is.
pub fn render_markdown(ctx: &RenderContext<'_>, body: &str) -> String {
    let sources = if ctx.source_inputs.is_empty() {
        "N/A".to_string()
    } else {
        ctx.source_inputs.join(", ")
    };

    format!(
        "# Deal Strategy Plan: {name}\n\
         \n\
         > **Opportunity ID:** {id}  \n\
         > **Generado:** {timestamp}  \n\
         > **Inputs utilizados:** {sources}\n\
         \n\
         ---\n\
         \n\
         {body}\n\
         \n\
         ---\n\
         \n\
         *Documento generado automáticamente a partir de los inputs de la oportunidad. \
         Revisar antes de compartir con el cliente.*\n",
        name = ctx.opportunity_name,
        id = ctx.opportunity_id,
        timestamp = ctx.timestamp(),
        sources = sources,
        body = body.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_markdown_layout() {
        let inputs = vec!["brief.pdf".to_string(), "rfp.pdf".to_string()];
        let ctx = RenderContext {
            opportunity_id: 7,
            opportunity_name: "Acme <Renewal>",
            generated_at: chrono::Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            source_inputs: &inputs,
        };
        let doc = render_markdown(&ctx, "## Objetivo\n<b>texto</b>\n");

        assert!(doc.starts_with("# Deal Strategy Plan: Acme <Renewal>\n"));
        assert!(doc.contains("**Opportunity ID:** 7"));
        assert!(doc.contains("2026-03-01 09:30 UTC"));
        assert!(doc.contains("brief.pdf, rfp.pdf"));
        assert!(doc.contains("## Objetivo\n<b>texto</b>\n"));
        assert!(doc.trim_end().ends_with('*'));
    }
}
