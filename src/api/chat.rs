use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::Json;
use futures_util::stream::{self, Stream, StreamExt};

use crate::error::RetrievalError;
use crate::llm::chat_stream::stream_chat;
use crate::models::{ChatMessage, ChatRequest};
use crate::state::AppState;

const MAX_QUESTION_LEN: usize = 2000;
const IDLE_TIMEOUT_SECS: u64 = 30;
/// Nearest chunks forwarded as context to the chat model.
const CONTEXT_CHUNKS: usize = 1;

/// POST /api/chat - RAG chat endpoint with SSE streaming.
///
/// Emits one `context` event with the retrieved snippet, `delta` events
/// with answer fragments, an `error` event on stream failure or idle
/// timeout, and a terminal `done` event. Dropping the connection cancels
/// the upstream completion without touching retrieval state.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, String)> {
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Question is required".to_string()));
    }
    let question = truncate_to_char_boundary(&question, MAX_QUESTION_LEN);

    // ── Step 1: Retrieve context ──────────────────────────
    // An embedding failure degrades to an empty context so the chat model
    // still answers, unguided.
    let context = match state
        .retrieval
        .query(
            &state.http_client,
            &state.config.llm,
            &question,
            CONTEXT_CHUNKS,
        )
        .await
    {
        Ok(context) => context,
        Err(RetrievalError::EmbeddingBackend(e)) => {
            tracing::warn!("Context retrieval failed, answering unguided: {e:#}");
            String::new()
        }
        Err(e @ RetrievalError::AlignmentCorruption { .. }) => {
            return Err((StatusCode::CONFLICT, e.to_string()));
        }
        Err(e) => return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    };

    // ── Step 2: Build prompt ──────────────────────────────
    let messages = build_messages(&context, &question);

    let context_event = Event::default()
        .event("context")
        .json_data(serde_json::json!({ "context": context }))
        .unwrap();

    // ── Step 3: Start LLM stream ──────────────────────────
    let llm_stream = stream_chat(&state.http_client, &state.config.llm, messages)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("LLM error: {e}")))?;

    // ── Step 4: Map to SSE events with idle timeout ───────
    let idle_timeout = Duration::from_secs(IDLE_TIMEOUT_SECS);

    let delta_stream = futures_util::stream::unfold(
        (llm_stream, false),
        move |(mut llm_stream, finished)| async move {
            if finished {
                return None;
            }
            match tokio::time::timeout(idle_timeout, llm_stream.next()).await {
                Ok(Some(Ok(content))) => {
                    let event: Result<Event, Infallible> = Ok(Event::default()
                        .event("delta")
                        .json_data(serde_json::json!({ "content": content }))
                        .unwrap());
                    Some((event, (llm_stream, false)))
                }
                Ok(Some(Err(e))) => {
                    // Emit the error, then stop on the next poll
                    let event: Result<Event, Infallible> = Ok(Event::default()
                        .event("error")
                        .json_data(serde_json::json!({ "message": e.to_string() }))
                        .unwrap());
                    Some((event, (llm_stream, true)))
                }
                Ok(None) => None, // Stream ended naturally
                Err(_) => {
                    let event: Result<Event, Infallible> = Ok(Event::default()
                        .event("error")
                        .json_data(
                            serde_json::json!({ "message": "LLM response timed out (idle)" }),
                        )
                        .unwrap());
                    Some((event, (llm_stream, true)))
                }
            }
        },
    );

    let done_event: Result<Event, Infallible> = Ok(Event::default()
        .event("done")
        .json_data(serde_json::json!({}))
        .unwrap());

    let event_stream = stream::once(async move { Ok(context_event) })
        .chain(delta_stream)
        .chain(stream::once(async move { done_event }));

    Ok(Sse::new(event_stream))
}

// ─── Helper functions ────────────────────────────────────

fn build_messages(context: &str, question: &str) -> Vec<ChatMessage> {
    let prompt = format!(
        "You are a helpful assistant. Based only on the following information, \
         give a concise and clear answer to the user's question.\n\n\
         Context:\n{context}\n\n\
         Question: {question}\nAnswer:"
    );
    vec![
        ChatMessage {
            role: "system".to_string(),
            content: "You are a helpful assistant.".to_string(),
        },
        ChatMessage {
            role: "user".to_string(),
            content: prompt,
        },
    ]
}

fn truncate_to_char_boundary(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    s.char_indices()
        .take_while(|(i, _)| *i < max_len)
        .map(|(_, c)| c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_to_char_boundary("hello", 100), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let long = "a".repeat(3000);
        let result = truncate_to_char_boundary(&long, MAX_QUESTION_LEN);
        assert_eq!(result.len(), MAX_QUESTION_LEN);
    }

    #[test]
    fn test_truncate_unicode_safe() {
        // 4-byte emoji, must not split in the middle
        let s = "Hello 🌍 world";
        let result = truncate_to_char_boundary(s, 8);
        assert!(result.is_char_boundary(result.len()));
    }

    #[test]
    fn test_messages_structure() {
        let msgs = build_messages("retrieved text", "what is this?");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, "system");
        assert_eq!(msgs[1].role, "user");
        assert!(msgs[1].content.contains("retrieved text"));
        assert!(msgs[1].content.contains("what is this?"));
    }

    #[test]
    fn test_messages_with_empty_context() {
        let msgs = build_messages("", "anything?");
        assert!(msgs[1].content.contains("Context:\n\n"));
        assert!(msgs[1].content.contains("Question: anything?"));
    }
}
