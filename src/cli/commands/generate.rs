//! Generate command implementation.
//!
//! The command-line batch adapter: validate the input file, run the
//! pipeline, write a text report. The input file belongs to the user
//! and is never deleted.

use crate::cli::preflight;
use crate::cli::{Output, OutputSelection};
use crate::config::{Prompts, Settings};
use crate::error::LektorError;
use crate::model::init_client;
use crate::pipeline::{Pipeline, PipelineResult};
use crate::upload::{is_allowed_extension, ALLOWED_EXTENSIONS, MAX_UPLOAD_BYTES};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Run the generate command.
pub async fn run_generate(
    audio_file: &str,
    selection: &OutputSelection,
    out: &str,
    settings: Settings,
) -> Result<()> {
    let path = Path::new(audio_file);

    if !path.exists() {
        let e = LektorError::InvalidInput(format!("The file '{}' does not exist.", audio_file));
        Output::error(&e.to_string());
        return Err(e.into());
    }

    if !is_allowed_extension(audio_file) {
        let e = LektorError::InvalidInput(format!(
            "Invalid file type. Supported types: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ));
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let size = std::fs::metadata(path)?.len();
    if size > MAX_UPLOAD_BYTES as u64 {
        let e = LektorError::InvalidInput(
            "File size exceeds the 50MB limit. Please use a smaller file.".to_string(),
        );
        Output::error(&e.to_string());
        return Err(e.into());
    }

    // Fail fast on a missing key before any remote call.
    if let Err(e) = preflight::check_api_key() {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let client = init_client(&settings.model.name)?;
    let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
    let pipeline = Pipeline::new(Arc::new(client), prompts);

    let kinds = selection.kinds();

    Output::info(&format!("Processing: {}", audio_file));
    let spinner = Output::spinner("Transcribing and generating study materials...");
    let result = pipeline.run(path, kinds).await;
    spinner.finish_and_clear();

    match result {
        Ok(result) => {
            std::fs::write(out, format_report(&result))?;
            Output::success(&format!("Successfully generated and saved content to '{}'", out));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to process: {}", e));
            Err(e.into())
        }
    }
}

/// Render the text report: transcript first, then one uppercased
/// section per generated kind.
fn format_report(result: &PipelineResult) -> String {
    let mut report = format!("--- LECTURE TRANSCRIPT ---\n{}\n\n", result.transcript);

    for material in &result.materials {
        report.push_str(&format!(
            "--- {} ---\n{}\n\n",
            material.kind.to_string().to_uppercase(),
            material.text
        ));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{MaterialKind, StudyMaterial};

    #[test]
    fn test_format_report_sections() {
        let result = PipelineResult {
            transcript: "today we cover sorting".to_string(),
            materials: vec![
                StudyMaterial {
                    kind: MaterialKind::Notes,
                    text: "- sorting".to_string(),
                },
                StudyMaterial {
                    kind: MaterialKind::Flashcards,
                    text: "Sort: ordering items".to_string(),
                },
            ],
        };

        let report = format_report(&result);

        assert!(report.starts_with("--- LECTURE TRANSCRIPT ---\ntoday we cover sorting\n"));
        assert!(report.contains("--- NOTES ---\n- sorting\n"));
        assert!(report.contains("--- FLASHCARDS ---\nSort: ordering items\n"));
        assert!(!report.contains("--- QUIZ ---"));
    }
}
