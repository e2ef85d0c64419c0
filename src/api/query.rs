use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::RetrievalError;
use crate::models::{QueryRequest, QueryResponse};
use crate::state::AppState;

/// POST /api/query - Retrieve context for a question without calling the
/// chat model. An embedding failure degrades to an empty context so the
/// caller can still proceed unguided.
pub async fn query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, String)> {
    let question = req.question.trim();
    if question.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Question is required".to_string()));
    }
    let top_k = req.top_k.max(1);

    match state
        .retrieval
        .query(&state.http_client, &state.config.llm, question, top_k)
        .await
    {
        Ok(context) => Ok(Json(QueryResponse { context })),
        Err(RetrievalError::EmbeddingBackend(e)) => {
            tracing::warn!("Query embedding failed, returning empty context: {e:#}");
            Ok(Json(QueryResponse {
                context: String::new(),
            }))
        }
        Err(e @ RetrievalError::AlignmentCorruption { .. }) => {
            Err((StatusCode::CONFLICT, e.to_string()))
        }
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}
