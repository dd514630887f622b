//! Directory store tests
#![cfg(feature = "native-fs")]

use std::path::Path;

use mongodb_erd::introspect::{FailurePolicy, IntrospectConfig, IntrospectError, Introspector};
use mongodb_erd::models::{Confidence, FieldType};
use mongodb_erd::storage::{Connector, DirectoryStore, DocumentStore, StoreError};
use serde_json::json;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const ALICE: &str = "507f1f77bcf86cd799439011";

/// `blog/` with users as a JSON array and posts as JSON lines
fn blog_export() -> TempDir {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("blog");
    std::fs::create_dir(&db).unwrap();
    std::fs::write(
        db.join("users.json"),
        format!(r#"[{{"_id": {{"$oid": "{ALICE}"}}, "name": "Alice", "joined": {{"$date": "2024-01-15T10:30:00Z"}}}}]"#),
    )
    .unwrap();
    std::fs::write(
        db.join("posts.jsonl"),
        format!(
            "{}\n\n{}\n",
            json!({"_id": {"$oid": "65a1b2c3d4e5f6a7b8c9d001"}, "author_id": {"$oid": ALICE}, "title": "Hello"}),
            json!({"_id": {"$oid": "65a1b2c3d4e5f6a7b8c9d002"}, "author_id": {"$oid": ALICE}, "title": null}),
        ),
    )
    .unwrap();
    std::fs::write(db.join("notes.txt"), "not a collection").unwrap();
    dir
}

fn database(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("blog")
}

mod directory_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_listing_sorted_and_filtered() {
        let dir = blog_export();
        let store = DirectoryStore::open(database(&dir)).await.unwrap();
        assert_eq!(store.database(), Some("blog"));
        assert_eq!(store.list_collections().await.unwrap(), vec!["posts", "users"]);
    }

    #[tokio::test]
    async fn test_jsonl_skips_blank_lines() {
        let dir = blog_export();
        let store = DirectoryStore::new(database(&dir));
        let docs = store.sample("posts", 10).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(store.sample("posts", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_exists_matches_extended_json_id() {
        let dir = blog_export();
        let store = DirectoryStore::new(database(&dir));
        assert!(store.exists("users", &json!({"$oid": ALICE})).await.unwrap());
        assert!(!store.exists("posts", &json!({"$oid": ALICE})).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_database() {
        let dir = TempDir::new().unwrap();
        let err = DirectoryStore::new(dir.path().join("nope"))
            .connect()
            .await
            .err()
            .unwrap();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = blog_export();
        let store = DirectoryStore::new(database(&dir));
        let err = store.sample("../blog/users", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidName(_)));
    }
}

mod directory_introspection_tests {
    use super::*;

    async fn run(path: &Path, config: IntrospectConfig) -> Result<mongodb_erd::SchemaReport, IntrospectError> {
        Introspector::new(config)
            .run_scoped(&DirectoryStore::new(path), CancellationToken::new())
            .await
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let dir = blog_export();
        let report = run(&database(&dir), IntrospectConfig::new()).await.unwrap();

        assert_eq!(report.database.as_deref(), Some("blog"));
        let names: Vec<_> = report.collections.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["posts", "users"]);

        let users = report.collection("users").unwrap();
        assert_eq!(users.field("joined").unwrap().field_type, FieldType::Date);

        let title = report.collection("posts").unwrap().field("title").unwrap();
        assert!(title.nullable);

        assert_eq!(report.relationships.len(), 1);
        assert_eq!(report.relationships[0].to_collection, "users");
        assert_eq!(report.relationships[0].confidence, Confidence::ExistenceConfirmed);
    }

    #[tokio::test]
    async fn test_malformed_file_policy() {
        let dir = blog_export();
        std::fs::write(database(&dir).join("broken.json"), "{\"not\": \"an array\"}").unwrap();

        let err = run(&database(&dir), IntrospectConfig::new()).await.unwrap_err();
        assert_eq!(err.collection_name(), Some("broken"));

        let report = run(
            &database(&dir),
            IntrospectConfig::new().with_failure_policy(FailurePolicy::Partial),
        )
        .await
        .unwrap();
        assert_eq!(report.collections.len(), 2);
        assert_eq!(report.failures[0].collection, "broken");
    }
}

#[cfg(feature = "cli")]
mod generate_command_tests {
    use super::*;
    use mongodb_erd::cli::commands::{GenerateArgs, handle_generate};
    use mongodb_erd::cli::output::OutputTarget;
    use mongodb_erd::export::OutputFormat;

    #[tokio::test]
    async fn test_generate_writes_mermaid_file() {
        let dir = blog_export();
        let output = dir.path().join("out").join("blog.mmd");
        let args = GenerateArgs {
            source: dir.path().to_path_buf(),
            database: Some("blog".to_string()),
            output: Some(output.clone()),
            format: Some(OutputFormat::Mermaid),
            ..GenerateArgs::default()
        };

        let outcome = handle_generate(&args, CancellationToken::new()).await.unwrap();
        assert_eq!(outcome.target, OutputTarget::File(output.clone()));

        let written = std::fs::read_to_string(output).unwrap();
        assert!(written.contains("erDiagram"));
        assert!(written.contains("posts }o--|| users : \"author_id\""));
    }

    #[tokio::test]
    async fn test_generate_reads_config_file() {
        let dir = blog_export();
        let config = dir.path().join("erd.toml");
        let output = dir.path().join("report.json");
        std::fs::write(
            &config,
            format!(
                "[introspect]\nexistenceCheck = false\n\n[output]\nformat = \"json\"\npath = {:?}\n",
                output.display().to_string()
            ),
        )
        .unwrap();

        let args = GenerateArgs {
            source: database(&dir),
            config: Some(config),
            ..GenerateArgs::default()
        };
        let outcome = handle_generate(&args, CancellationToken::new()).await.unwrap();
        assert_eq!(outcome.report.relationships[0].confidence, Confidence::NameHeuristic);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(written["relationships"][0]["toCollection"], "authors");
    }
}
