//! Corpus assembly: download every input, extract its text, concatenate.

use dealplan_ai::TextExtractor;
use dealplan_core::models::Input;
use dealplan_core::AppError;
use dealplan_storage::{Storage, INPUTS_BUCKET};

/// Concatenated input text plus the names of the inputs that contributed to it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    pub text: String,
    pub input_names: Vec<String>,
}

impl Corpus {
    /// Length used for the minimum-size check
    pub fn trimmed_len(&self) -> usize {
        self.text.trim().chars().count()
    }

    /// Fail when too little text was extracted to ground a plan
    pub fn ensure_minimum(&self, minimum: usize) -> Result<(), AppError> {
        let length = self.trimmed_len();
        if length < minimum {
            return Err(AppError::InsufficientCorpus { length, minimum });
        }
        Ok(())
    }
}

fn corpus_entry(input_name: &str, text: &str) -> String {
    format!("\n\n=== INPUT: {} ===\n{}", input_name, text)
}

/// Build the corpus serially. Inputs that cannot be downloaded or yield no
/// text are skipped with a warning.
pub async fn build_corpus(
    inputs: &[Input],
    storage: &dyn Storage,
    extractor: &dyn TextExtractor,
) -> Corpus {
    let mut entries = Vec::with_capacity(inputs.len());
    let mut input_names = Vec::with_capacity(inputs.len());

    for input in inputs {
        let data = match storage.download(INPUTS_BUCKET, &input.storage_path).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(
                    input_id = input.input_id,
                    storage_path = %input.storage_path,
                    error = %e,
                    "Skipping input: download failed"
                );
                continue;
            }
        };

        let text = match extractor.extract_text(data).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    input_id = input.input_id,
                    input_name = %input.input_name,
                    error = %e,
                    "Skipping input: text extraction failed"
                );
                continue;
            }
        };

        if text.trim().is_empty() {
            tracing::warn!(
                input_id = input.input_id,
                input_name = %input.input_name,
                "Skipping input: no extractable text"
            );
            continue;
        }

        tracing::debug!(
            input_id = input.input_id,
            text_len = text.len(),
            "Input added to corpus"
        );
        entries.push(corpus_entry(&input.input_name, &text));
        input_names.push(input.input_name.clone());
    }

    Corpus {
        text: entries.join("\n"),
        input_names,
    }
}
