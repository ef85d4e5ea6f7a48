//! Fixed document templates for generated plans

mod html;
mod markdown;

pub use html::render_html;
pub use markdown::render_markdown;

use chrono::{DateTime, Utc};

/// Values the templates take from the opportunity rather than from generated content
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub opportunity_id: i32,
    pub opportunity_name: &'a str,
    pub generated_at: DateTime<Utc>,
    pub source_inputs: &'a [String],
}

impl RenderContext<'_> {
    fn timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

/// Escape text for interpolation into HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}
