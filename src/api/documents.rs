use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::RetrievalError;
use crate::models::{FilesResponse, MessageResponse, UploadRequest, UploadResponse};
use crate::state::AppState;

/// POST /api/documents - Chunk, embed, and index a document's text.
/// The filename is recorded once per distinct name; re-uploading the same
/// name appends its chunks again.
pub async fn upload_document(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let filename = req.filename.trim().to_string();
    if filename.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Filename is required".to_string()));
    }

    let outcome = state
        .retrieval
        .ingest(&state.http_client, &state.config.llm, &filename, &req.text)
        .await
        .map_err(|e| match e {
            RetrievalError::InvalidConfiguration { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            RetrievalError::EmbeddingBackend(_) => (StatusCode::BAD_GATEWAY, e.to_string()),
            RetrievalError::AlignmentCorruption { .. } => (StatusCode::CONFLICT, e.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        })?;

    tracing::info!(
        "Embedded {} chunks from {filename}",
        outcome.chunk_count
    );

    Ok(Json(UploadResponse {
        message: "Document uploaded and embedded".to_string(),
        chunks: outcome.chunk_count,
        warning: outcome.persist_warning,
    }))
}

/// GET /api/files - List uploaded filenames in insertion order.
pub async fn list_files(State(state): State<AppState>) -> Json<FilesResponse> {
    Json(FilesResponse {
        files: state.retrieval.list_files(),
    })
}

/// POST /api/reset - Clear the index, corpus, and file registry.
pub async fn reset(State(state): State<AppState>) -> Json<MessageResponse> {
    state.retrieval.reset();
    Json(MessageResponse {
        message: "Memory cleared.".to_string(),
    })
}
