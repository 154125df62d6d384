//! CLI module for Lektor.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::pipeline::MaterialKind;
use clap::{Parser, Subcommand, ValueEnum};

/// Lektor - Lecture Audio to Study Materials
///
/// Turn a lecture recording into study notes, a quiz, and flashcards.
/// The name "Lektor" comes from the Norwegian word for "lecturer."
#[derive(Parser, Debug)]
#[command(name = "lektor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate study materials from a lecture audio file
    Generate {
        /// Path to the lecture audio file (e.g., mp3, wav, m4a)
        audio_file: String,

        /// Type of output to generate
        #[arg(long = "type", value_enum, default_value = "all")]
        output_type: OutputSelection,

        /// Output file path to save the generated content
        #[arg(long, default_value = "lecture_output.txt")]
        out: String,
    },

    /// Start the web upload form and JSON API
    Serve {
        /// Host to bind to (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Start the interactive browser studio
    Studio {
        /// Host to bind to (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration and API access
    Doctor,
}

/// What the generate command should produce.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSelection {
    Notes,
    Quiz,
    Flashcards,
    All,
}

impl OutputSelection {
    /// The material kinds this selection expands to.
    pub fn kinds(&self) -> &'static [MaterialKind] {
        match self {
            OutputSelection::Notes => &[MaterialKind::Notes],
            OutputSelection::Quiz => &[MaterialKind::Quiz],
            OutputSelection::Flashcards => &[MaterialKind::Flashcards],
            OutputSelection::All => MaterialKind::ALL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_expansion() {
        assert_eq!(OutputSelection::All.kinds().len(), 3);
        assert_eq!(OutputSelection::Quiz.kinds(), &[MaterialKind::Quiz]);
    }
}
