//! On-disk embedding cache.
//!
//! One JSON file per track: `<name>_embedding.json` holding
//! `{"name", "dimensions", "vector"}`. The stored name is authoritative;
//! the file name is only its filesystem-safe form.

use std::path::{Path, PathBuf};

use seedscout_core::safe_filename;
use seedscout_select::EmbeddingStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{EmbeddingError, Result};

/// Suffix of every cache file.
pub const EMBEDDING_SUFFIX: &str = "_embedding.json";

#[derive(Debug, Serialize, Deserialize)]
struct EmbeddingFile {
    name: String,
    dimensions: usize,
    vector: Vec<f32>,
}

/// Cache file path for `name` inside `dir`.
pub fn embedding_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}{EMBEDDING_SUFFIX}", safe_filename(name)))
}

/// Write one embedding, creating `dir` if needed. Returns the file path.
pub fn save_embedding(dir: &Path, name: &str, vector: &[f32]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = embedding_path(dir, name);
    let file = EmbeddingFile {
        name: name.to_string(),
        dimensions: vector.len(),
        vector: vector.to_vec(),
    };
    std::fs::write(&path, serde_json::to_vec(&file)?)?;
    debug!(name, path = %path.display(), "saved embedding");
    Ok(path)
}

/// Read one cached embedding, if present.
///
/// Distinct names can share a sanitized file name; a file whose stored
/// name differs from `name` belongs to another entry and counts as a miss.
pub fn load_embedding(dir: &Path, name: &str) -> Result<Option<Vec<f32>>> {
    let path = embedding_path(dir, name);
    if !path.exists() {
        return Ok(None);
    }
    let file = read_file(&path)?;
    if file.name != name {
        debug!(name, stored = %file.name, path = %path.display(), "cache file holds another name");
        return Ok(None);
    }
    Ok(Some(file.vector))
}

/// Load every cache file in `dir`, sorted by name.
///
/// A missing directory yields an empty store. Vectors must all share one
/// dimension.
pub fn load_embeddings_from_dir(dir: &Path) -> Result<EmbeddingStore> {
    let mut store = EmbeddingStore::new();
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "embedding directory absent");
        return Ok(store);
    }

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_cache_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(EMBEDDING_SUFFIX));
        if !is_cache_file {
            continue;
        }
        let file = read_file(&path)?;
        let _ = store.insert(file.name, file.vector)?;
    }
    store.sort_by_name();

    info!(dir = %dir.display(), count = store.len(), "loaded embeddings");
    Ok(store)
}

fn read_file(path: &Path) -> Result<EmbeddingFile> {
    let file: EmbeddingFile = serde_json::from_slice(&std::fs::read(path)?)?;
    if file.vector.len() != file.dimensions {
        return Err(EmbeddingError::DimensionMismatch {
            expected: file.dimensions,
            got: file.vector.len(),
        });
    }
    Ok(file)
}

/// Delete files ending in any of `suffixes` from each directory.
///
/// Subdirectories are left alone. Missing directories are logged and
/// skipped. Returns the number of files deleted.
pub fn clear_directory_contents<P: AsRef<Path>>(dirs: &[P], suffixes: &[&str]) -> Result<usize> {
    let mut total = 0;
    for dir in dirs {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "directory not found");
            continue;
        }
        let mut deleted = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let matches = path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| suffixes.iter().any(|s| n.ends_with(s)));
            if matches {
                std::fs::remove_file(&path)?;
                deleted += 1;
            }
        }
        info!(dir = %dir.display(), deleted, "cleared directory");
        total += deleted;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use seedscout_core::logging::capture_logs;
    use tracing::Level;

    #[test]
    fn save_then_load_single() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_embedding(dir.path(), "Artist - Song", &[0.5, -0.5]).unwrap();
        assert!(path.ends_with("Artist - Song_embedding.json"));
        assert_eq!(
            load_embedding(dir.path(), "Artist - Song").unwrap(),
            Some(vec![0.5, -0.5])
        );
        assert_eq!(load_embedding(dir.path(), "other").unwrap(), None);
    }

    #[test]
    fn unsafe_names_are_kept_in_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_embedding(dir.path(), "AC/DC - T.N.T?", &[1.0]).unwrap();
        assert!(path.ends_with("AC_DC - T.N.T__embedding.json"));

        let store = load_embeddings_from_dir(dir.path()).unwrap();
        assert_eq!(store.names(), vec!["AC/DC - T.N.T?"]);
    }

    #[test]
    fn colliding_names_do_not_share_a_vector() {
        let dir = tempfile::tempdir().unwrap();
        let _ = save_embedding(dir.path(), "AC/DC", &[1.0, 2.0]).unwrap();
        assert_eq!(embedding_path(dir.path(), "AC/DC"), embedding_path(dir.path(), "AC_DC"));

        assert_eq!(load_embedding(dir.path(), "AC_DC").unwrap(), None);
        assert_eq!(load_embedding(dir.path(), "AC/DC").unwrap(), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn directory_load_is_sorted_and_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let _ = save_embedding(dir.path(), "charlie", &[3.0, 0.0]).unwrap();
        let _ = save_embedding(dir.path(), "alpha", &[1.0, 0.0]).unwrap();
        let _ = save_embedding(dir.path(), "bravo", &[2.0, 0.0]).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let store = load_embeddings_from_dir(dir.path()).unwrap();
        assert_eq!(store.names(), vec!["alpha", "bravo", "charlie"]);
        assert_eq!(store.get("bravo"), Some(&[2.0_f32, 0.0][..]));
    }

    #[test]
    fn missing_directory_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_embeddings_from_dir(&dir.path().join("nope")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn mixed_dimensions_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let _ = save_embedding(dir.path(), "a", &[1.0, 2.0]).unwrap();
        let _ = save_embedding(dir.path(), "b", &[1.0, 2.0, 3.0]).unwrap();
        assert_matches!(
            load_embeddings_from_dir(dir.path()),
            Err(EmbeddingError::DimensionMismatch { .. })
        );
    }

    #[test]
    fn inconsistent_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("x_embedding.json"),
            r#"{"name":"x","dimensions":3,"vector":[1.0]}"#,
        )
        .unwrap();
        assert_matches!(
            load_embeddings_from_dir(dir.path()),
            Err(EmbeddingError::DimensionMismatch {
                expected: 3,
                got: 1
            })
        );
    }

    #[test]
    fn corrupt_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x_embedding.json"), "{").unwrap();
        assert_matches!(load_embedding(dir.path(), "x"), Err(EmbeddingError::Json(_)));
    }

    #[test]
    fn clear_removes_matching_files_only() {
        let (logs, _guard) = capture_logs();
        let tracks = tempfile::tempdir().unwrap();
        let embeddings = tempfile::tempdir().unwrap();
        std::fs::write(tracks.path().join("a.wav"), b"x").unwrap();
        std::fs::write(tracks.path().join("b.mp3"), b"x").unwrap();
        std::fs::write(tracks.path().join("keep.txt"), b"x").unwrap();
        let _ = save_embedding(embeddings.path(), "a", &[1.0]).unwrap();
        let missing = tracks.path().join("missing");

        let dirs = [tracks.path().to_path_buf(), embeddings.path().to_path_buf(), missing];
        let deleted = clear_directory_contents(&dirs, &[".wav", ".mp3", EMBEDDING_SUFFIX]).unwrap();

        assert_eq!(deleted, 3);
        assert!(tracks.path().join("keep.txt").exists());
        assert!(!tracks.path().join("a.wav").exists());
        assert!(logs.has_event(Level::WARN, "directory not found"));
    }
}
