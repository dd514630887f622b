//! Directory document store
//!
//! Reads a database exported as a directory of Extended JSON files. Used by
//! native apps and the CLI.
//!
//! ## Layout
//!
//! The directory is the database, named after the directory itself. Each
//! `<collection>.json` file holds a JSON array of documents; each
//! `<collection>.jsonl` file holds one document per line, as written by
//! `mongoexport`. When both exist for one name, the `.json` file is used.
//!
//! ## Security
//!
//! Collection names containing path separators or ".." are rejected, so every
//! resolved path stays inside the database directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::debug;

use super::{Connector, Document, DocumentStore, StoreError, is_valid_collection_name};

const EXTENSIONS: [&str; 2] = ["json", "jsonl"];

/// Directory document store
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    base_path: PathBuf,
    database: String,
}

impl DirectoryStore {
    /// Create a store over `base_path` without touching the file system
    ///
    /// # Example
    ///
    /// ```rust
    /// use mongodb_erd::storage::DirectoryStore;
    ///
    /// let store = DirectoryStore::new("/exports/blog");
    /// ```
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        let base_path = base_path.as_ref().to_path_buf();
        let database = base_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Self {
            base_path,
            database,
        }
    }

    /// Open a store, failing when the directory does not exist
    pub async fn open(base_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = Self::new(base_path);
        store.check_database().await?;
        Ok(store)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    async fn check_database(&self) -> Result<(), StoreError> {
        match fs::metadata(&self.base_path).await {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(StoreError::database_not_found(self.base_path.display().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::database_not_found(self.base_path.display().to_string()))
            }
            Err(e) => Err(StoreError::IoError(format!(
                "Failed to open database directory {}: {}",
                self.base_path.display(),
                e
            ))),
        }
    }

    /// Resolve the export file backing `collection`
    async fn resolve_collection(&self, collection: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_collection_name(collection) {
            return Err(StoreError::InvalidName(collection.to_string()));
        }

        for ext in EXTENSIONS {
            let path = self.base_path.join(format!("{}.{}", collection, ext));
            if let Ok(metadata) = fs::metadata(&path).await
                && metadata.is_file()
            {
                return Ok(path);
            }
        }

        Err(StoreError::collection_not_found(collection))
    }

    /// Read up to `limit` documents from an export file
    async fn read_documents(
        &self,
        path: &Path,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            StoreError::IoError(format!("Failed to read file {}: {}", path.display(), e))
        })?;
        let limit = limit.unwrap_or(usize::MAX);

        let is_lines = path.extension().and_then(|e| e.to_str()) == Some("jsonl");
        if is_lines {
            let mut documents = Vec::new();
            for (line_no, line) in content.lines().enumerate() {
                if documents.len() >= limit {
                    break;
                }
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let doc: Value = serde_json::from_str(line).map_err(|e| {
                    StoreError::SerializationError(format!(
                        "{} line {}: {}",
                        path.display(),
                        line_no + 1,
                        e
                    ))
                })?;
                documents.push(doc);
            }
            return Ok(documents);
        }

        let value: Value = serde_json::from_str(&content).map_err(|e| {
            StoreError::SerializationError(format!("{}: {}", path.display(), e))
        })?;
        match value {
            Value::Array(items) => Ok(items.into_iter().take(limit).collect()),
            other => Err(StoreError::SerializationError(format!(
                "{}: expected a JSON array of documents, found {}",
                path.display(),
                match other {
                    Value::Object(_) => "an object",
                    _ => "a scalar",
                }
            ))),
        }
    }
}

#[async_trait]
impl DocumentStore for DirectoryStore {
    fn database(&self) -> Option<&str> {
        Some(&self.database)
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        self.check_database().await?;

        let mut names = Vec::new();
        let mut read_dir = fs::read_dir(&self.base_path).await.map_err(|e| {
            StoreError::IoError(format!(
                "Failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| StoreError::IoError(format!("Failed to read directory entry: {}", e)))?
        {
            let path = entry.path();
            if let Ok(file_type) = entry.file_type().await
                && file_type.is_file()
                && let Some(ext) = path.extension().and_then(|e| e.to_str())
                && EXTENSIONS.contains(&ext)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && !names.iter().any(|n: &String| n == stem)
            {
                names.push(stem.to_string());
            }
        }

        // Directory iteration order is platform dependent
        names.sort();
        debug!(database = %self.database, collections = names.len(), "Listed collections");
        Ok(names)
    }

    async fn sample(&self, collection: &str, limit: usize) -> Result<Vec<Document>, StoreError> {
        let path = self.resolve_collection(collection).await?;
        self.read_documents(&path, Some(limit)).await
    }

    fn supports_exists(&self) -> bool {
        true
    }

    async fn exists(&self, collection: &str, id: &Value) -> Result<bool, StoreError> {
        let path = self.resolve_collection(collection).await?;
        let documents = self.read_documents(&path, None).await?;
        Ok(documents.iter().any(|doc| doc.get("_id") == Some(id)))
    }
}

#[async_trait]
impl Connector for DirectoryStore {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>, StoreError> {
        self.check_database().await?;
        Ok(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("users.json"),
            r#"[{"_id": {"$oid": "507f1f77bcf86cd799439011"}, "name": "Alice"}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("posts.jsonl"),
            "{\"_id\": 1, \"title\": \"a\"}\n\n{\"_id\": 2, \"title\": \"b\"}\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        dir
    }

    #[test]
    fn test_database_named_after_directory() {
        let store = DirectoryStore::new("/exports/blog");
        assert_eq!(store.database(), Some("blog"));
    }

    #[test]
    fn test_list_collections_sorted() {
        runtime().block_on(async {
            let dir = fixture();
            let store = DirectoryStore::open(dir.path()).await.unwrap();
            assert_eq!(store.list_collections().await.unwrap(), vec!["posts", "users"]);
        });
    }

    #[test]
    fn test_sample_json_lines_skips_blank_lines() {
        runtime().block_on(async {
            let dir = fixture();
            let store = DirectoryStore::new(dir.path());
            let docs = store.sample("posts", 10).await.unwrap();
            assert_eq!(docs.len(), 2);
            assert_eq!(store.sample("posts", 1).await.unwrap().len(), 1);
        });
    }

    #[test]
    fn test_exists_matches_id() {
        runtime().block_on(async {
            let dir = fixture();
            let store = DirectoryStore::new(dir.path());
            let id = json!({"$oid": "507f1f77bcf86cd799439011"});
            assert!(store.exists("users", &id).await.unwrap());
            assert!(!store.exists("posts", &id).await.unwrap());
        });
    }

    #[test]
    fn test_rejects_path_traversal() {
        runtime().block_on(async {
            let dir = fixture();
            let store = DirectoryStore::new(dir.path());
            let err = store.sample("../users", 10).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidName(_)));
        });
    }

    #[test]
    fn test_missing_directory() {
        runtime().block_on(async {
            let err = DirectoryStore::open("/nonexistent/mongodb-erd/db")
                .await
                .unwrap_err();
            assert!(err.is_not_found());
        });
    }
}
