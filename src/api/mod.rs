//! Axum HTTP handlers: document upload and registry management, context
//! retrieval, and the SSE chat endpoint.

pub mod chat;
pub mod documents;
pub mod query;
