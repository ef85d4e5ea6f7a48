//! Storage-safe file names for uploaded inputs

use std::sync::LazyLock;

use regex::Regex;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s.\-]").expect("valid regex"));
static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static UNDERSCORE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("valid regex"));

/// Sanitize a client-supplied file name so it can be used as an object key.
///
/// The extension (text after the last `.`, unless the name starts with it) is
/// re-appended with separators and whitespace replaced. In the stem, anything other than ASCII letters, digits, `_`,
/// whitespace, `.` and `-` becomes `_`, whitespace runs become `_`, repeated
/// underscores collapse and leading/trailing underscores are trimmed.
pub fn sanitize_file_name(original: &str) -> String {
    let (stem, extension) = match original.rfind('.') {
        Some(idx) if idx > 0 => (&original[..idx], Some(&original[idx + 1..])),
        _ => (original, None),
    };

    let cleaned = UNSAFE_CHARS.replace_all(stem, "_");
    let cleaned = WHITESPACE_RUNS.replace_all(&cleaned, "_");
    let cleaned = UNDERSCORE_RUNS.replace_all(&cleaned, "_");
    let cleaned = cleaned.trim_matches('_');

    match extension {
        Some(ext) => {
            let ext = UNSAFE_CHARS.replace_all(ext, "_");
            format!("{}.{}", cleaned, WHITESPACE_RUNS.replace_all(&ext, "_"))
        }
        None => cleaned.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_spaces_and_symbols() {
        assert_eq!(
            sanitize_file_name("Acme RFP (final) v2.pdf"),
            "Acme_RFP_final_v2.pdf"
        );
        assert_eq!(sanitize_file_name("notes #1 & #2.pdf"), "notes_1_2.pdf");
    }

    #[test]
    fn test_sanitize_accented_letters_become_underscores() {
        assert_eq!(sanitize_file_name("Propuesta técnica.pdf"), "Propuesta_t_cnica.pdf");
        assert_eq!(sanitize_file_name("año.pdf"), "a_o.pdf");
    }

    #[test]
    fn test_sanitize_keeps_dots_and_dashes_in_stem() {
        assert_eq!(sanitize_file_name("q3.report-draft.pdf"), "q3.report-draft.pdf");
    }

    #[test]
    fn test_sanitize_leading_dot_is_not_an_extension() {
        assert_eq!(sanitize_file_name(".env"), ".env");
        assert_eq!(sanitize_file_name("README"), "README");
    }

    #[test]
    fn test_sanitize_trims_underscores() {
        assert_eq!(sanitize_file_name("__ brief __.pdf"), "brief.pdf");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for name in [
            "Acme RFP (final) v2.pdf",
            "Propuesta técnica  2024.pdf",
            "../../etc/passwd",
            "a//b\\c.pdf",
        ] {
            let once = sanitize_file_name(name);
            assert_eq!(sanitize_file_name(&once), once, "input: {}", name);
        }
    }

    #[test]
    fn test_sanitize_strips_path_separators() {
        let sanitized = sanitize_file_name("../../secret.pdf");
        assert!(!sanitized.contains('/'));
        assert_eq!(sanitized, ".._.._secret.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
    }
}
