//! Snapshot persistence for the retrieval state.
//!
//! Three artifacts live under the data directory and are rewritten after
//! every mutation:
//!
//! - `index.bin`   — bincode-encoded vector index
//! - `chunks.json` — ordered chunk texts
//! - `files.json`  — ordered uploaded-file names
//!
//! The index and chunk artifacts restore as a pair at startup; if either is
//! missing or unreadable both start empty. The files artifact loads
//! independently. There is no atomicity across artifacts: a crash between
//! writes can leave the pair misaligned, which the service detects before
//! serving.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::index::VectorIndex;
use crate::error::RetrievalError;

pub struct SnapshotPaths {
    pub index: PathBuf,
    pub chunks: PathBuf,
    pub files: PathBuf,
}

impl SnapshotPaths {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            index: data_dir.join("index.bin"),
            chunks: data_dir.join("chunks.json"),
            files: data_dir.join("files.json"),
        }
    }
}

/// State restored from disk at startup.
pub struct Snapshot {
    pub index: VectorIndex,
    pub corpus: Vec<String>,
    pub files: Vec<String>,
}

/// Write all three artifacts. Each write goes through a temp file + rename
/// so a torn write never replaces a good artifact.
pub fn save(
    paths: &SnapshotPaths,
    index: &VectorIndex,
    corpus: &[String],
    files: &[String],
) -> Result<(), RetrievalError> {
    let encoded = bincode::serialize(index).map_err(|e| RetrievalError::PersistenceWrite {
        path: paths.index.clone(),
        source: e.into(),
    })?;
    write_atomic(&paths.index, &encoded)?;

    let chunks_json =
        serde_json::to_vec(corpus).map_err(|e| RetrievalError::PersistenceWrite {
            path: paths.chunks.clone(),
            source: e.into(),
        })?;
    write_atomic(&paths.chunks, &chunks_json)?;

    let files_json = serde_json::to_vec(files).map_err(|e| RetrievalError::PersistenceWrite {
        path: paths.files.clone(),
        source: e.into(),
    })?;
    write_atomic(&paths.files, &files_json)?;

    Ok(())
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), RetrievalError> {
    let tmp = path.with_extension("tmp");
    let result = std::fs::write(&tmp, data).and_then(|()| std::fs::rename(&tmp, path));
    result.map_err(|e| RetrievalError::PersistenceWrite {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// Load a snapshot, tolerating missing or unreadable artifacts. Failures
/// are logged and the affected state starts empty; this never errors.
pub fn load(paths: &SnapshotPaths, dim: usize) -> Snapshot {
    let (index, corpus) = match load_index_pair(paths, dim) {
        Ok(Some(pair)) => pair,
        Ok(None) => (VectorIndex::new(dim), Vec::new()),
        Err(e) => {
            tracing::warn!("Starting with an empty index: {e}");
            (VectorIndex::new(dim), Vec::new())
        }
    };

    let files = match load_files(&paths.files) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!("Starting with an empty file registry: {e}");
            Vec::new()
        }
    };

    Snapshot {
        index,
        corpus,
        files,
    }
}

fn load_index_pair(
    paths: &SnapshotPaths,
    dim: usize,
) -> Result<Option<(VectorIndex, Vec<String>)>, RetrievalError> {
    if !paths.index.exists() || !paths.chunks.exists() {
        return Ok(None);
    }

    let bytes = std::fs::read(&paths.index).map_err(|e| RetrievalError::PersistenceRead {
        path: paths.index.clone(),
        source: e.into(),
    })?;
    let index: VectorIndex =
        bincode::deserialize(&bytes).map_err(|e| RetrievalError::PersistenceRead {
            path: paths.index.clone(),
            source: e.into(),
        })?;

    if index.dim() != dim {
        return Err(RetrievalError::PersistenceRead {
            path: paths.index.clone(),
            source: anyhow::anyhow!(
                "stored embedding dimension {} does not match configured {}",
                index.dim(),
                dim
            ),
        });
    }

    let data =
        std::fs::read_to_string(&paths.chunks).map_err(|e| RetrievalError::PersistenceRead {
            path: paths.chunks.clone(),
            source: e.into(),
        })?;
    let corpus: Vec<String> =
        serde_json::from_str(&data).map_err(|e| RetrievalError::PersistenceRead {
            path: paths.chunks.clone(),
            source: e.into(),
        })?;

    Ok(Some((index, corpus)))
}

fn load_files(path: &Path) -> Result<Vec<String>, RetrievalError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let files = std::fs::read_to_string(path)
        .context("Failed to read file registry")
        .and_then(|data| serde_json::from_str(&data).context("Failed to parse file registry"))
        .map_err(|e| RetrievalError::PersistenceRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SnapshotPaths::new(dir.path());

        let mut index = VectorIndex::new(2);
        index.append(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let corpus = vec!["first chunk".to_string(), "second chunk".to_string()];
        let files = vec!["a.txt".to_string()];

        save(&paths, &index, &corpus, &files).unwrap();
        let snapshot = load(&paths, 2);

        assert_eq!(snapshot.index.len(), 2);
        assert_eq!(snapshot.corpus, corpus);
        assert_eq!(snapshot.files, files);
    }

    #[test]
    fn test_load_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SnapshotPaths::new(dir.path());
        let snapshot = load(&paths, 3);
        assert!(snapshot.index.is_empty());
        assert!(snapshot.corpus.is_empty());
        assert!(snapshot.files.is_empty());
    }

    #[test]
    fn test_missing_chunks_artifact_drops_pair_but_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SnapshotPaths::new(dir.path());

        let mut index = VectorIndex::new(1);
        index.append(vec![vec![1.0]]).unwrap();
        save(&paths, &index, &["chunk".to_string()], &["a.txt".to_string()]).unwrap();

        std::fs::remove_file(&paths.chunks).unwrap();

        let snapshot = load(&paths, 1);
        assert!(snapshot.index.is_empty());
        assert!(snapshot.corpus.is_empty());
        assert_eq!(snapshot.files, vec!["a.txt".to_string()]);
    }

    #[test]
    fn test_dimension_change_discards_pair() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SnapshotPaths::new(dir.path());

        let mut index = VectorIndex::new(2);
        index.append(vec![vec![1.0, 2.0]]).unwrap();
        save(&paths, &index, &["chunk".to_string()], &[]).unwrap();

        let snapshot = load(&paths, 4);
        assert!(snapshot.index.is_empty());
        assert_eq!(snapshot.index.dim(), 4);
        assert!(snapshot.corpus.is_empty());
    }

    #[test]
    fn test_corrupt_index_artifact_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SnapshotPaths::new(dir.path());

        save(&paths, &VectorIndex::new(1), &[], &[]).unwrap();
        std::fs::write(&paths.index, b"not bincode").unwrap();

        let snapshot = load(&paths, 1);
        assert!(snapshot.index.is_empty());
    }
}
