//! Lektor - Lecture Audio to Study Materials
//!
//! Turn a lecture recording into study notes, a quiz, and flashcards
//! using the Gemini API.
//!
//! The name "Lektor" comes from the Norwegian word for "lecturer."
//!
//! # Overview
//!
//! Lektor allows you to:
//! - Transcribe a lecture recording word-for-word
//! - Generate structured study notes, a 5-question quiz, and flashcards
//!   from the transcript
//! - Run the same pipeline from a CLI, a web upload form, or an
//!   interactive browser UI
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `model` - Remote generative model client abstraction
//! - `pipeline` - Transcribe-then-generate orchestration
//! - `upload` - Upload validation rules and temp-file handling
//! - `cli` - Command-line interface and the two server adapters
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lektor::config::Prompts;
//! use lektor::model::init_client;
//! use lektor::pipeline::{MaterialKind, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = init_client("gemini-2.5-flash")?;
//!     let pipeline = Pipeline::new(Arc::new(client), Prompts::default());
//!
//!     let result = pipeline
//!         .run(std::path::Path::new("lecture.mp3"), MaterialKind::ALL)
//!         .await?;
//!     println!("{}", result.transcript);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod upload;

pub use error::{LektorError, Result};
