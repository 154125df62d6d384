//! Generation pipeline for Lektor.
//!
//! Coordinates the two-step flow shared by every adapter: transcribe
//! the lecture audio, then generate each requested study material from
//! the transcript. The pipeline knows nothing about uploads, HTTP, or
//! output files; adapters own validation and cleanup.

use crate::config::Prompts;
use crate::error::Result;
use crate::model::ModelClient;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Kind of study material derived from a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Notes,
    Quiz,
    Flashcards,
}

impl MaterialKind {
    /// All kinds, in presentation order.
    pub const ALL: &'static [MaterialKind] =
        &[MaterialKind::Notes, MaterialKind::Quiz, MaterialKind::Flashcards];

    /// Map a kind name to a variant.
    ///
    /// Unrecognized names fall back to notes; this mirrors the lookup
    /// adapters rely on and is a documented fallback, not an error.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "quiz" => MaterialKind::Quiz,
            "flashcards" => MaterialKind::Flashcards,
            _ => MaterialKind::Notes,
        }
    }
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterialKind::Notes => write!(f, "notes"),
            MaterialKind::Quiz => write!(f, "quiz"),
            MaterialKind::Flashcards => write!(f, "flashcards"),
        }
    }
}

/// Generated text tagged with its kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyMaterial {
    pub kind: MaterialKind,
    pub text: String,
}

/// Aggregate result of one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Verbatim transcript text.
    pub transcript: String,
    /// One material per requested kind, in request order.
    pub materials: Vec<StudyMaterial>,
}

impl PipelineResult {
    /// Get the generated text for a kind, if it was requested.
    pub fn material(&self, kind: MaterialKind) -> Option<&str> {
        self.materials
            .iter()
            .find(|m| m.kind == kind)
            .map(|m| m.text.as_str())
    }
}

/// The transcribe-then-generate pipeline.
///
/// Stateless aside from the injected client handle; one instance can be
/// shared across requests.
pub struct Pipeline {
    client: Arc<dyn ModelClient>,
    prompts: Prompts,
}

impl Pipeline {
    /// Create a new pipeline over a model client.
    pub fn new(client: Arc<dyn ModelClient>, prompts: Prompts) -> Self {
        Self { client, prompts }
    }

    /// Transcribe an audio file word-for-word.
    ///
    /// The caller has already validated size and extension; no re-check
    /// happens here. The transcript is returned verbatim, with no
    /// post-processing or length limit.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    pub async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        info!("Transcribing audio");
        let transcript = self
            .client
            .transcribe_audio(audio_path, &self.prompts.transcription)
            .await?;
        debug!("Transcript is {} chars", transcript.len());
        Ok(transcript)
    }

    /// Generate one study material from a transcript.
    ///
    /// One remote round trip, no retries.
    #[instrument(skip(self, transcript))]
    pub async fn generate_material(
        &self,
        transcript: &str,
        kind: MaterialKind,
    ) -> Result<StudyMaterial> {
        info!("Generating {}", kind);
        let prompt = self.generation_prompt(transcript, kind);
        let text = self.client.generate(&prompt).await?;
        Ok(StudyMaterial { kind, text })
    }

    /// Run the full pipeline: transcribe, then generate each requested
    /// kind in order.
    ///
    /// If transcription fails no generation is attempted. The first
    /// generation failure aborts the remaining calls; earlier results
    /// are discarded and the whole invocation is reported as failed.
    pub async fn run(&self, audio_path: &Path, kinds: &[MaterialKind]) -> Result<PipelineResult> {
        let transcript = self.transcribe(audio_path).await?;

        let mut materials = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            materials.push(self.generate_material(&transcript, kind).await?);
        }

        Ok(PipelineResult {
            transcript,
            materials,
        })
    }

    /// Build the full generation prompt for a kind.
    fn generation_prompt(&self, transcript: &str, kind: MaterialKind) -> String {
        let instruction = match kind {
            MaterialKind::Notes => &self.prompts.notes,
            MaterialKind::Quiz => &self.prompts.quiz,
            MaterialKind::Flashcards => &self.prompts.flashcards,
        };

        format!(
            "{}\n\nHere is the lecture transcript:\n{}",
            instruction, transcript
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LektorError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Stub client recording every generation prompt it receives.
    struct StubClient {
        transcript: &'static str,
        fail_transcription: bool,
        fail_prompt_containing: Option<&'static str>,
        generate_calls: Mutex<Vec<String>>,
    }

    impl StubClient {
        fn new(transcript: &'static str) -> Self {
            Self {
                transcript,
                fail_transcription: false,
                fail_prompt_containing: None,
                generate_calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.generate_calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ModelClient for StubClient {
        async fn transcribe_audio(&self, _path: &Path, _instruction: &str) -> Result<String> {
            if self.fail_transcription {
                return Err(LektorError::Transcription("model unavailable".to_string()));
            }
            Ok(self.transcript.to_string())
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            self.generate_calls.lock().unwrap().push(prompt.to_string());

            if let Some(needle) = self.fail_prompt_containing {
                if prompt.contains(needle) {
                    return Err(LektorError::Generation("quota exceeded".to_string()));
                }
            }
            Ok(format!("generated from {} chars", prompt.len()))
        }
    }

    fn pipeline_over(client: StubClient) -> (Arc<StubClient>, Pipeline) {
        let client = Arc::new(client);
        let pipeline = Pipeline::new(client.clone(), Prompts::default());
        (client, pipeline)
    }

    #[tokio::test]
    async fn test_run_all_kinds() {
        let (client, pipeline) = pipeline_over(StubClient::new("the lecture text"));

        let result = pipeline
            .run(Path::new("lecture.mp3"), MaterialKind::ALL)
            .await
            .unwrap();

        assert_eq!(result.transcript, "the lecture text");
        assert_eq!(result.materials.len(), 3);
        assert_eq!(client.call_count(), 3);
        assert!(result.material(MaterialKind::Quiz).is_some());
    }

    #[tokio::test]
    async fn test_transcription_failure_skips_generation() {
        let mut stub = StubClient::new("unused");
        stub.fail_transcription = true;
        let (client, pipeline) = pipeline_over(stub);

        let result = pipeline.run(Path::new("lecture.mp3"), MaterialKind::ALL).await;

        assert!(matches!(result, Err(LektorError::Transcription(_))));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_aborts_remaining_kinds() {
        let mut stub = StubClient::new("the lecture text");
        // The quiz instruction is the only one mentioning multiple-choice.
        stub.fail_prompt_containing = Some("multiple-choice");
        let (client, pipeline) = pipeline_over(stub);

        let result = pipeline.run(Path::new("lecture.mp3"), MaterialKind::ALL).await;

        assert!(matches!(result, Err(LektorError::Generation(_))));
        // Notes succeeded, quiz failed, flashcards never attempted.
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_single_kind_run() {
        let (client, pipeline) = pipeline_over(StubClient::new("text"));

        let result = pipeline
            .run(Path::new("lecture.wav"), &[MaterialKind::Flashcards])
            .await
            .unwrap();

        assert_eq!(result.materials.len(), 1);
        assert_eq!(result.materials[0].kind, MaterialKind::Flashcards);
        assert_eq!(client.call_count(), 1);
        assert!(result.material(MaterialKind::Notes).is_none());
    }

    #[tokio::test]
    async fn test_generation_prompt_embeds_transcript() {
        let (_, pipeline) = pipeline_over(StubClient::new(""));

        let prompt = pipeline.generation_prompt("photosynthesis basics", MaterialKind::Quiz);
        assert!(prompt.contains("multiple-choice"));
        assert!(prompt.ends_with("Here is the lecture transcript:\nphotosynthesis basics"));

        let prompt = pipeline.generation_prompt("x", MaterialKind::Flashcards);
        assert!(prompt.contains("Term: Definition"));
    }

    #[test]
    fn test_unknown_kind_falls_back_to_notes() {
        assert_eq!(MaterialKind::from_name("bogus-kind"), MaterialKind::Notes);
        assert_eq!(MaterialKind::from_name("QUIZ"), MaterialKind::Quiz);
        assert_eq!(MaterialKind::from_name("flashcards"), MaterialKind::Flashcards);
    }
}
