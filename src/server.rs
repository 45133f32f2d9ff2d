//! HTTP API front end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/upload-document` | Multipart PDF upload; extracts, chunks, embeds, indexes |
//! | `POST` | `/chat` | JSON `{doc_id, message}`; retrieval-augmented answer |
//! | `GET`  | `/documents` | List indexed documents |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Only PDF files are supported" } }
//! ```
//!
//! Codes: `bad_request` (400), `not_found` (404), `capacity` (503),
//! `internal` (500).
//!
//! # State
//!
//! Documents and their conversation logs live in a bounded in-memory map
//! (`server.max_documents`); there is no persistence and no eviction —
//! uploads past the bound are rejected. Chat requests against the same
//! document are serialized by a per-session async lock; different documents
//! proceed concurrently.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted, for browser front ends.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::extract::extract_pdf_text;
use crate::history::Conversation;
use crate::models::{Document, Turn};
use crate::pipeline::QaEngine;

/// One uploaded document and its conversation log.
pub struct Session {
    pub document: Document,
    /// Async lock: held for the duration of a chat request, which serializes
    /// concurrent chats against the same document.
    pub history: tokio::sync::Mutex<Conversation>,
}

/// Shared state for all route handlers.
#[derive(Clone)]
struct AppState {
    engine: Arc<QaEngine>,
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
    max_documents: usize,
}

/// Build the API router around an engine. Used by [`run_server`] and by
/// integration tests driving the router in-process.
pub fn router(engine: Arc<QaEngine>) -> Router {
    let max_documents = engine.config().server.max_documents;
    let state = AppState {
        engine,
        sessions: Arc::new(RwLock::new(HashMap::new())),
        max_documents,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/upload-document", post(handle_upload))
        .route("/chat", post(handle_chat))
        .route("/documents", get(handle_list_documents))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve the API until the process is terminated.
pub async fn run_server(config: &Config, engine: Arc<QaEngine>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(engine);

    println!("pdfqa API listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn capacity_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        code: "capacity".to_string(),
        message: message.into(),
    }
}

fn internal_error(err: anyhow::Error) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: format!("{:#}", err),
    }
}

// ============ POST /upload-document ============

#[derive(Serialize)]
struct UploadResponse {
    doc_id: String,
    filename: String,
    chunks_count: usize,
    message: String,
}

async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    if state.sessions.read().unwrap().len() >= state.max_documents {
        return Err(capacity_error("document capacity reached"));
    }

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") || field.file_name().is_some() {
            let filename = field
                .file_name()
                .unwrap_or("upload.pdf")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("failed to read upload: {}", e)))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }
    let (filename, bytes) =
        upload.ok_or_else(|| bad_request("multipart field 'file' is required"))?;

    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(bad_request("Only PDF files are supported"));
    }

    let text = extract_pdf_text(&bytes).map_err(|e| bad_request(e.to_string()))?;

    let document = state
        .engine
        .index_document(&filename, &text)
        .await
        .map_err(internal_error)?;

    let response = UploadResponse {
        doc_id: document.id.clone(),
        filename: document.filename.clone(),
        chunks_count: document.chunks.len(),
        message: "Document processed successfully".to_string(),
    };

    let mut sessions = state.sessions.write().unwrap();
    if sessions.len() >= state.max_documents {
        // Another upload filled the map while this one was embedding;
        // drop the collection that was just built.
        state.engine.remove_document(&document.id);
        return Err(capacity_error("document capacity reached"));
    }
    sessions.insert(
        document.id.clone(),
        Arc::new(Session {
            document,
            history: tokio::sync::Mutex::new(Conversation::new()),
        }),
    );

    Ok(Json(response))
}

// ============ POST /chat ============

#[derive(Deserialize)]
struct ChatRequestBody {
    doc_id: String,
    message: String,
}

#[derive(Serialize)]
struct ChatResponseBody {
    answer: String,
    citations: Vec<String>,
    chunks: Vec<String>,
    chat_history: Vec<Turn>,
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequestBody>,
) -> Result<Json<ChatResponseBody>, AppError> {
    if request.message.trim().is_empty() {
        return Err(bad_request("message must not be empty"));
    }

    let session = state
        .sessions
        .read()
        .unwrap()
        .get(&request.doc_id)
        .cloned()
        .ok_or_else(|| not_found("Document not found"))?;

    let mut history = session.history.lock().await;

    let answer = state
        .engine
        .answer(&request.doc_id, &history, &request.message)
        .await
        .map_err(internal_error)?;

    history.append(Turn::user(request.message));
    history.append(Turn::assistant(
        answer.answer.clone(),
        answer.citations.clone(),
        answer.chunks.clone(),
    ));

    Ok(Json(ChatResponseBody {
        answer: answer.answer,
        citations: answer.citations,
        chunks: answer.chunks,
        chat_history: history.all().to_vec(),
    }))
}

// ============ GET /documents ============

#[derive(Serialize)]
struct DocumentsResponse {
    documents: Vec<DocumentSummary>,
}

#[derive(Serialize)]
struct DocumentSummary {
    doc_id: String,
    filename: String,
    chunks_count: usize,
}

async fn handle_list_documents(State(state): State<AppState>) -> Json<DocumentsResponse> {
    let sessions = state.sessions.read().unwrap();
    let mut documents: Vec<DocumentSummary> = sessions
        .values()
        .map(|s| DocumentSummary {
            doc_id: s.document.id.clone(),
            filename: s.document.filename.clone(),
            chunks_count: s.document.chunks.len(),
        })
        .collect();
    documents.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));
    Json(DocumentsResponse { documents })
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
