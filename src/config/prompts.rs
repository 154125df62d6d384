//! Prompt templates for Lektor.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    /// Instruction handed to the model together with the uploaded audio.
    pub transcription: String,
    /// Instruction for structured study notes.
    pub notes: String,
    /// Instruction for a multiple-choice quiz.
    pub quiz: String,
    /// Instruction for Term:Definition flashcards.
    pub flashcards: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            transcription: "Listen to this audio file and provide a highly accurate, \
                word-for-word transcript of what is being spoken. Do not summarize \
                or add external information."
                .to_string(),

            notes: "You are an expert academic assistant. Summarize the following \
                lecture transcript into clear, comprehensive, and well-structured \
                study notes. Highlight key concepts, definitions, and important \
                examples."
                .to_string(),

            quiz: "You are an expert academic assistant. Create a multiple-choice \
                quiz (5 questions) based on the following lecture transcript. \
                Include the correct answers and a brief explanation at the end."
                .to_string(),

            flashcards: "You are an expert academic assistant. Create a set of \
                flashcards (Term: Definition format) based on the key concepts in \
                the following lecture transcript. Format them clearly."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, applying overrides from the custom directory if present.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let prompts_path = custom_path.join("prompts.toml");
            if prompts_path.exists() {
                let content = std::fs::read_to_string(&prompts_path)?;
                prompts = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.transcription.contains("word-for-word"));
        assert!(prompts.quiz.contains("5 questions"));
        assert!(prompts.flashcards.contains("Term: Definition"));
    }

    #[test]
    fn test_load_without_custom_dir() {
        let prompts = Prompts::load(None).unwrap();
        assert_eq!(prompts.notes, Prompts::default().notes);
    }

    #[test]
    fn test_load_custom_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("prompts.toml"),
            "transcription = \"transcribe it\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str()).unwrap();
        assert_eq!(prompts.transcription, "transcribe it");
        // Unspecified fields fall back to defaults via serde(default).
        assert_eq!(prompts.quiz, Prompts::default().quiz);
    }
}
