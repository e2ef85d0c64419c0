use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the retrieval core.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The chunking parameters would never advance through the input.
    #[error("invalid chunking configuration: chunk_size={chunk_size}, overlap={overlap}")]
    InvalidConfiguration { chunk_size: usize, overlap: usize },

    /// The embedding backend failed or returned malformed output.
    #[error("embedding backend error: {0:#}")]
    EmbeddingBackend(anyhow::Error),

    /// A snapshot artifact could not be read at startup.
    #[error("failed to read snapshot artifact {path}: {source:#}")]
    PersistenceRead {
        path: PathBuf,
        source: anyhow::Error,
    },

    /// A snapshot artifact could not be written. In-memory state is still
    /// updated when this occurs; only durability is lost.
    #[error("failed to write snapshot artifact {path}: {source:#}")]
    PersistenceWrite {
        path: PathBuf,
        source: anyhow::Error,
    },

    /// The vector index and corpus store lengths diverged. The service
    /// refuses ingest and query until a reset.
    #[error("vector index has {index_len} entries but corpus has {corpus_len}; reset required")]
    AlignmentCorruption { index_len: usize, corpus_len: usize },

    /// A vector of the wrong width was offered to the index.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
