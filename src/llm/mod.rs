//! Clients for the remote model backends: batch embeddings and streaming
//! chat completions, each speaking either the Ollama or the
//! OpenAI-compatible wire protocol.

pub mod chat_stream;
pub mod embeddings;
