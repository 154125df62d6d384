//! Interactive studio adapter.
//!
//! Serves a tabbed single-page app (Study Notes / Flashcards / Quiz /
//! Raw Transcript) backed by its own upload endpoint. Uploads land in a
//! named temp file that is removed when the handler returns, success or
//! not.

use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::model::{init_client, GeminiClient, ModelClient};
use crate::pipeline::{MaterialKind, Pipeline};
use crate::upload::{
    extension_of, is_allowed_extension, ALLOWED_EXTENSIONS, MAX_UPLOAD_BYTES,
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

const STUDIO_HTML: &str = include_str!("../ui/studio.html");

/// Slack for multipart framing on top of the per-file ceiling.
const BODY_LIMIT_BYTES: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

/// Shared studio state.
struct StudioState {
    settings: Settings,
    prompts: Prompts,
    client: RwLock<Option<Arc<GeminiClient>>>,
}

/// Run the interactive studio server.
pub async fn run_studio(
    host: Option<&str>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let host = host.unwrap_or(&settings.server.host).to_string();
    let port = port.unwrap_or(settings.server.studio_port);

    let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
    let state = Arc::new(StudioState {
        settings,
        prompts,
        client: RwLock::new(None),
    });

    if get_or_init_client(&state).await.is_err() {
        Output::warning(
            "GEMINI_API_KEY is not configured. Processing will fail until it is set in the environment or a .env file.",
        );
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(studio_page))
        .route("/api/process", post(process_audio))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Lektor Studio");
    println!();
    Output::success(&format!("Open http://{} in your browser", addr));
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn get_or_init_client(state: &StudioState) -> Result<Arc<GeminiClient>> {
    if let Some(client) = state.client.read().await.as_ref() {
        return Ok(client.clone());
    }

    let client = Arc::new(init_client(&state.settings.model.name)?);
    *state.client.write().await = Some(client.clone());
    Ok(client)
}

#[derive(Serialize)]
struct ProcessOk {
    success: bool,
    transcript: String,
    notes: String,
    quiz: String,
    flashcards: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

async fn studio_page() -> Html<&'static str> {
    Html(STUDIO_HTML)
}

async fn process_audio(
    State(state): State<Arc<StudioState>>,
    mut multipart: Multipart,
) -> Response {
    let client = match get_or_init_client(&state).await {
        Ok(client) => client,
        Err(e) => {
            error!("Client not configured: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    let mut audio: Option<(String, Vec<u8>)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        };

        if field.name() != Some("audio") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        };
        audio = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = audio else {
        return error_response(StatusCode::BAD_REQUEST, "No audio file provided.");
    };

    if filename.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No selected file.");
    }

    if !is_allowed_extension(&filename) {
        return error_response(
            StatusCode::BAD_REQUEST,
            &format!(
                "Invalid file type. Supported types: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ),
        );
    }

    if bytes.len() > MAX_UPLOAD_BYTES {
        return error_response(
            StatusCode::BAD_REQUEST,
            "File size exceeds the 50MB limit. Please upload a smaller file.",
        );
    }

    // Keep the extension so the client can pick the right MIME type.
    // The temp file is removed when this handler returns.
    let extension = extension_of(&filename).unwrap_or_else(|| "mp3".to_string());
    let temp_file = match write_temp_audio(&bytes, &extension) {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to store upload: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    let pipeline = Pipeline::new(client as Arc<dyn ModelClient>, state.prompts.clone());

    match pipeline.run(temp_file.path(), MaterialKind::ALL).await {
        Ok(result) => Json(ProcessOk {
            success: true,
            transcript: result.transcript.clone(),
            notes: result.material(MaterialKind::Notes).unwrap_or_default().to_string(),
            quiz: result.material(MaterialKind::Quiz).unwrap_or_default().to_string(),
            flashcards: result
                .material(MaterialKind::Flashcards)
                .unwrap_or_default()
                .to_string(),
        })
        .into_response(),
        Err(e) => {
            error!("Pipeline failed: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Transcription Failed: {}", e),
            )
        }
    }
}

/// Write upload bytes into a named temp file with the right suffix.
fn write_temp_audio(bytes: &[u8], extension: &str) -> Result<tempfile::NamedTempFile> {
    let mut temp_file = tempfile::Builder::new()
        .prefix("lektor_")
        .suffix(&format!(".{}", extension))
        .tempfile()?;
    temp_file.write_all(bytes)?;
    temp_file.flush()?;
    Ok(temp_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_temp_audio_keeps_suffix() {
        let temp_file = write_temp_audio(b"audio", "wav").unwrap();
        let path = temp_file.path().to_path_buf();

        assert!(path.extension().is_some_and(|e| e == "wav"));
        assert_eq!(std::fs::read(&path).unwrap(), b"audio");

        drop(temp_file);
        assert!(!path.exists());
    }
}
