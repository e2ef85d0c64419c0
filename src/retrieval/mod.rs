//! Retrieval core: chunk → embed → index → persist on the ingestion path,
//! embed → search → lookup on the query path.
//!
//! [`RetrievalService`] owns the vector index, the corpus store, and the
//! uploaded-file registry behind a single lock. The index and corpus are
//! position-aligned: the vector at position `i` embeds the chunk at
//! position `i`. Mutations (ingest, reset) hold the write lock for the
//! whole append-and-persist step; queries share read access. Embedding
//! calls always happen before a lock is taken.

pub mod index;
pub mod persist;

use std::path::Path;

use parking_lot::RwLock;

use crate::chunking;
use crate::config::LlmConfig;
use crate::error::RetrievalError;
use crate::llm::embeddings;
use self::index::VectorIndex;
use self::persist::{Snapshot, SnapshotPaths};

/// Outcome of an ingestion call.
#[derive(Debug)]
pub struct IngestOutcome {
    pub chunk_count: usize,
    /// Set when the snapshot write failed. The in-memory state is updated
    /// regardless; only durability is lost.
    pub persist_warning: Option<String>,
}

struct StoreInner {
    index: VectorIndex,
    corpus: Vec<String>,
    files: Vec<String>,
}

impl StoreInner {
    fn check_alignment(&self) -> Result<(), RetrievalError> {
        if self.index.len() != self.corpus.len() {
            return Err(RetrievalError::AlignmentCorruption {
                index_len: self.index.len(),
                corpus_len: self.corpus.len(),
            });
        }
        Ok(())
    }
}

/// Shared retrieval state and orchestration.
pub struct RetrievalService {
    inner: RwLock<StoreInner>,
    paths: SnapshotPaths,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RetrievalService {
    /// Create the data directory if needed and restore the persisted
    /// snapshot. A misaligned snapshot is restored as-is and reported; the
    /// service then refuses ingest and query until a reset.
    pub fn open(
        data_dir: &Path,
        embedding_dim: usize,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> anyhow::Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let paths = SnapshotPaths::new(data_dir);

        let Snapshot {
            index,
            corpus,
            files,
        } = persist::load(&paths, embedding_dim);

        if index.len() != corpus.len() {
            tracing::error!(
                "Restored snapshot is misaligned ({} vectors, {} chunks); \
                 ingest and query are disabled until reset",
                index.len(),
                corpus.len()
            );
        } else {
            tracing::info!(
                "Restored {} chunks from {} files",
                corpus.len(),
                files.len()
            );
        }

        Ok(Self {
            inner: RwLock::new(StoreInner {
                index,
                corpus,
                files,
            }),
            paths,
            chunk_size,
            chunk_overlap,
        })
    }

    /// Ingest a document: split into chunks, embed them, append to the
    /// index and corpus together, record the filename, persist.
    pub async fn ingest(
        &self,
        client: &reqwest::Client,
        llm: &LlmConfig,
        filename: &str,
        text: &str,
    ) -> Result<IngestOutcome, RetrievalError> {
        let chunks = chunking::split_text(text, self.chunk_size, self.chunk_overlap)?;
        let embeddings = embeddings::embed_batch(client, llm, &chunks)
            .await
            .map_err(RetrievalError::EmbeddingBackend)?;
        self.append_chunks(filename, chunks, embeddings)
    }

    /// Append pre-embedded chunks. The index append is width-checked and
    /// all-or-nothing, so the corpus is only extended once the index has
    /// accepted the whole batch.
    pub fn append_chunks(
        &self,
        filename: &str,
        chunks: Vec<String>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<IngestOutcome, RetrievalError> {
        if embeddings.len() != chunks.len() {
            return Err(RetrievalError::EmbeddingBackend(anyhow::anyhow!(
                "backend returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let chunk_count = chunks.len();
        let mut inner = self.inner.write();
        inner.check_alignment()?;

        inner.index.append(embeddings)?;
        inner.corpus.extend(chunks);
        if !inner.files.iter().any(|f| f == filename) {
            inner.files.push(filename.to_string());
        }

        let persist_warning = self.save_locked(&inner);
        Ok(IngestOutcome {
            chunk_count,
            persist_warning,
        })
    }

    /// Embed `question` and return the retrieved context: the text of the
    /// `k` nearest chunks joined by newlines. Empty store yields an empty
    /// string.
    pub async fn query(
        &self,
        client: &reqwest::Client,
        llm: &LlmConfig,
        question: &str,
        k: usize,
    ) -> Result<String, RetrievalError> {
        let query_vector = embeddings::embed_single(client, llm, question)
            .await
            .map_err(RetrievalError::EmbeddingBackend)?;
        self.retrieve(&query_vector, k)
    }

    /// Nearest-neighbor lookup against an already-embedded query.
    pub fn retrieve(&self, query_vector: &[f32], k: usize) -> Result<String, RetrievalError> {
        let inner = self.inner.read();
        inner.check_alignment()?;

        let hits = inner.index.search(query_vector, k);
        let texts: Vec<&str> = hits
            .iter()
            .map(|h| inner.corpus[h.position].as_str())
            .collect();
        Ok(texts.join("\n"))
    }

    /// Clear the index, corpus, and file registry, then persist the empty
    /// state. Never touches the embedding backend. A failed persist is
    /// logged; the caller still observes a cleared service.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        let dim = inner.index.dim();
        inner.index = VectorIndex::new(dim);
        inner.corpus.clear();
        inner.files.clear();

        if let Some(warning) = self.save_locked(&inner) {
            tracing::warn!("Reset persisted partially: {warning}");
        }
    }

    pub fn list_files(&self) -> Vec<String> {
        self.inner.read().files.clone()
    }

    pub fn chunk_count(&self) -> usize {
        self.inner.read().corpus.len()
    }

    fn save_locked(&self, inner: &StoreInner) -> Option<String> {
        match persist::save(&self.paths, &inner.index, &inner.corpus, &inner.files) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Snapshot write failed: {e}");
                Some(e.to_string())
            }
        }
    }
}
