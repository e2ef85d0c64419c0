//! # doc-chat
//!
//! A minimal retrieval-augmented-generation (RAG) backend: documents are
//! ingested as raw text, split into overlapping chunks, embedded into dense
//! vectors, and indexed for exact nearest-neighbor search. Questions are
//! answered by retrieving the closest chunk(s) and forwarding them as
//! context to a streaming chat completion.
//!
//! ## Data flow
//!
//! ```text
//!   Ingestion                           Query
//!
//!   raw text ──► Chunker                question ──► Embedding API
//!                  │                                     │
//!                  ▼                                     ▼
//!            Embedding API                         Vector Index
//!                  │                              (squared-L2 NN)
//!                  ▼                                     │
//!        Vector Index + Corpus ──► Snapshot              ▼
//!        (position-aligned)        (3 files)       Corpus lookup
//!                                                        │
//!                                                        ▼
//!                                               context ──► Chat LLM (SSE)
//! ```
//!
//! The vector at position `i` always embeds the chunk at position `i`; that
//! alignment is the invariant every mutation preserves and every load
//! verifies.
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, data dir, chunking, and LLM settings
//! - [`models`] - Request/response JSON types
//! - [`error`] - Typed retrieval error taxonomy
//! - [`chunking`] - Fixed-size overlapping text splitter
//! - [`retrieval`] - The core: vector index, corpus store, file registry, snapshot persistence
//! - [`llm::embeddings`] - Batch embedding generation via Ollama or OpenAI-compatible APIs
//! - [`llm::chat_stream`] - Streaming chat completions for both providers
//! - [`api`] - Axum HTTP handlers for upload, query, chat, files, and reset
//! - [`state`] - Shared application state

pub mod api;
pub mod chunking;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod retrieval;
pub mod state;
