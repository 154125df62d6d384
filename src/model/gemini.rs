//! Gemini REST client.
//!
//! Talks to the Generative Language API directly over `reqwest`: file
//! upload, `generateContent`, and file deletion. Audio transcription is
//! upload -> generate -> delete, with the delete issued on every exit
//! path so no remote file outlives the call that created it.

use super::ModelClient;
use crate::error::{Result, LektorError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default timeout for Gemini API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Gemini-backed model client.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client with the default endpoint and timeout.
    pub fn new(api_key: String, model: &str) -> Result<Self> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Create a new client against a custom endpoint.
    pub fn with_base_url(api_key: String, model: &str, base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        })
    }

    /// Upload an audio file and return the server-side handle.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn upload_file(&self, audio_path: &Path) -> Result<RemoteFile> {
        let bytes = tokio::fs::read(audio_path).await?;
        let mime_type = mime_type_for(audio_path);

        debug!("Uploading {} bytes ({})", bytes.len(), mime_type);

        let url = format!("{}/upload/v1beta/files?key={}", self.base_url, self.api_key);
        let response = self
            .http
            .post(&url)
            .header("X-Goog-Upload-Protocol", "raw")
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| LektorError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LektorError::Upload(api_error_message(response).await));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| LektorError::Upload(format!("Malformed upload response: {}", e)))?;

        debug!("Uploaded as {}", uploaded.file.name);
        Ok(uploaded.file)
    }

    /// Delete a server-side file by its resource name (e.g. "files/abc123").
    #[instrument(skip(self))]
    async fn delete_file(&self, name: &str) -> Result<()> {
        let url = format!("{}/v1beta/{}?key={}", self.base_url, name, self.api_key);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| LektorError::RemoteCleanup(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LektorError::RemoteCleanup(api_error_message(response).await));
        }

        debug!("Deleted remote file {}", name);
        Ok(())
    }

    /// Issue one `generateContent` call and return the concatenated text.
    async fn generate_parts(&self, parts: Vec<Part>) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LektorError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LektorError::Generation(api_error_message(response).await));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LektorError::Generation(format!("Malformed response: {}", e)))?;

        extract_text(&body)
            .ok_or_else(|| LektorError::Generation("Empty response from model".to_string()))
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    #[instrument(skip(self, instruction), fields(audio_path = %audio_path.display()))]
    async fn transcribe_audio(&self, audio_path: &Path, instruction: &str) -> Result<String> {
        let remote = self.upload_file(audio_path).await?;

        let parts = vec![
            Part::file(&remote),
            Part::text(instruction),
        ];
        let generated = self.generate_parts(parts).await.map_err(|e| match e {
            LektorError::Generation(msg) => LektorError::Transcription(msg),
            other => other,
        });

        // Release the remote file before inspecting the generation
        // result, so a failed call does not leak the upload.
        let cleanup = self.delete_file(&remote.name).await;

        let transcript = generated?;

        if let Err(e) = cleanup {
            warn!("Transcript obtained but remote cleanup failed: {}", e);
            return Err(e);
        }

        debug!("Transcribed {} chars", transcript.len());
        Ok(transcript)
    }

    #[instrument(skip(self, prompt))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_parts(vec![Part::text(prompt)]).await
    }
}

/// Map an audio extension to the MIME type Gemini expects.
fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Pull a human-readable message out of an API error response.
async fn api_error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => format!("HTTP {}: {}", status, body.chars().take(200).collect::<String>()),
    }
}

/// Concatenate the text parts of the first candidate, if any.
fn extract_text(response: &GenerateResponse) -> Option<String> {
    let candidate = response.candidates.first()?;
    let parts = &candidate.content.as_ref()?.parts;

    let text: String = parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// === Wire Types ===

/// Server-side handle to an uploaded file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteFile {
    /// Resource name, e.g. "files/abc123".
    name: String,
    /// URI referenced from generation requests.
    uri: String,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "fileData", skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            file_data: None,
        }
    }

    fn file(remote: &RemoteFile) -> Self {
        Self {
            text: None,
            file_data: Some(FileData {
                file_uri: remote.uri.clone(),
                mime_type: remote
                    .mime_type
                    .clone()
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
            }),
        }
    }
}

#[derive(Serialize)]
struct FileData {
    #[serde(rename = "fileUri")]
    file_uri: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_mapping() {
        assert_eq!(mime_type_for(Path::new("lecture.mp3")), "audio/mpeg");
        assert_eq!(mime_type_for(Path::new("lecture.WAV")), "audio/wav");
        assert_eq!(mime_type_for(Path::new("lecture.flac")), "audio/flac");
        assert_eq!(mime_type_for(Path::new("lecture")), "application/octet-stream");
    }

    #[test]
    fn test_extract_text_concatenates_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "world"}]}}]}"#,
        )
        .unwrap();

        assert_eq!(extract_text(&response), Some("Hello world".to_string()));
    }

    #[test]
    fn test_extract_text_empty_candidates() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(extract_text(&response), None);
    }

    #[test]
    fn test_generate_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::file(&RemoteFile {
                        name: "files/abc".to_string(),
                        uri: "https://example/files/abc".to_string(),
                        mime_type: Some("audio/mpeg".to_string()),
                    }),
                    Part::text("transcribe"),
                ],
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["fileData"]["mimeType"], "audio/mpeg");
        assert_eq!(parts[1]["text"], "transcribe");
    }
}
