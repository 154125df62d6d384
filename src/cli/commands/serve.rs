//! Web form adapter: static upload page plus JSON endpoint.
//!
//! `POST /api/upload` accepts a multipart `audio` field, stores it
//! under a unique name, runs the pipeline, and returns the generated
//! materials as JSON. The stored file is deleted on every exit path.

use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::model::{init_client, GeminiClient, ModelClient};
use crate::pipeline::{MaterialKind, Pipeline, PipelineResult};
use crate::upload::{is_allowed_extension, UploadGuard, ALLOWED_EXTENSIONS, MAX_UPLOAD_BYTES};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

const INDEX_HTML: &str = include_str!("../ui/index.html");
const APP_JS: &str = include_str!("../ui/app.js");

/// Shared application state.
struct AppState {
    settings: Settings,
    prompts: Prompts,
    /// Lazily initialized model client; stays `None` until the key is
    /// configured and is re-checked on each request while absent.
    client: RwLock<Option<Arc<GeminiClient>>>,
}

/// Run the web form server.
pub async fn run_serve(
    host: Option<&str>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let host = host.unwrap_or(&settings.server.host).to_string();
    let port = port.unwrap_or(settings.server.port);

    let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
    let state = Arc::new(AppState {
        settings,
        prompts,
        client: RwLock::new(None),
    });

    // Warn early when the key is missing; requests will retry.
    if get_or_init_client(&state).await.is_err() {
        Output::warning(
            "GEMINI_API_KEY is not configured. Uploads will fail until it is set in the environment or a .env file.",
        );
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index))
        .route("/static/app.js", get(app_js))
        .route("/api/upload", post(upload_audio))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Lektor Web");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Upload page", "GET  /");
    Output::kv("Upload API", "POST /api/upload");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Get the shared client, initializing it if the key has appeared
/// since the last attempt.
async fn get_or_init_client(state: &AppState) -> Result<Arc<GeminiClient>> {
    if let Some(client) = state.client.read().await.as_ref() {
        return Ok(client.clone());
    }

    let client = Arc::new(init_client(&state.settings.model.name)?);
    *state.client.write().await = Some(client.clone());
    Ok(client)
}

// === Request/Response Types ===

#[derive(Serialize)]
struct UploadOk {
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

fn success_body(result: &PipelineResult) -> UploadOk {
    UploadOk {
        success: true,
        transcript: result.transcript.clone(),
        notes: result.material(MaterialKind::Notes).unwrap_or_default().to_string(),
        quiz: result.material(MaterialKind::Quiz).unwrap_or_default().to_string(),
        flashcards: result
            .material(MaterialKind::Flashcards)
            .unwrap_or_default()
            .to_string(),
    }
}

// === Handlers ===

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}

async fn upload_audio(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    // Lazy client init, retried per request while the key is absent.
    let client = match get_or_init_client(&state).await {
        Ok(client) => client,
        Err(e) => {
            error!("Client not configured: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    // Pull the audio field out of the multipart body.
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

    // Deleted on drop, whatever happens below.
    let guard = match UploadGuard::store(&state.settings.upload_dir(), &filename, &bytes) {
        Ok(guard) => guard,
        Err(e) => {
            error!("Failed to store upload: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    let pipeline = Pipeline::new(client as Arc<dyn ModelClient>, state.prompts.clone());

    match pipeline.run(guard.path(), MaterialKind::ALL).await {
        Ok(result) => Json(success_body(&result)).into_response(),
        Err(e) => {
            error!("Pipeline failed: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Transcription Failed: {}", e),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StudyMaterial;

    #[test]
    fn test_success_body_shape() {
        let result = PipelineResult {
            transcript: "T".to_string(),
            materials: vec![
                StudyMaterial {
                    kind: MaterialKind::Notes,
                    text: "N".to_string(),
                },
                StudyMaterial {
                    kind: MaterialKind::Quiz,
                    text: "Q".to_string(),
                },
                StudyMaterial {
                    kind: MaterialKind::Flashcards,
                    text: "F".to_string(),
                },
            ],
        };

        let json = serde_json::to_value(success_body(&result)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["transcript"], "T");
        assert_eq!(json["notes"], "N");
        assert_eq!(json["quiz"], "Q");
        assert_eq!(json["flashcards"], "F");
    }
}
