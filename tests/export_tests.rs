//! Export module tests

use mongodb_erd::export::{OutputFormat, Theme, export_report};
use mongodb_erd::export::ascii::LEGEND;
use mongodb_erd::introspect::{IntrospectConfig, Introspector};
use mongodb_erd::models::SchemaReport;
use mongodb_erd::storage::MemoryStore;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

fn oid(n: u8) -> Value {
    json!({ "$oid": format!("65a1b2c3d4e5f6a7b8c9d0{:02x}", n) })
}

fn blog() -> MemoryStore {
    MemoryStore::new("blog")
        .with_collection("users", vec![json!({"_id": oid(1), "name": "Alice"})])
        .with_collection(
            "posts",
            vec![json!({"_id": oid(10), "author_id": oid(1), "title": "Hello"})],
        )
}

async fn introspect(store: &MemoryStore, config: IntrospectConfig) -> SchemaReport {
    Introspector::new(config)
        .run_scoped(store, CancellationToken::new())
        .await
        .unwrap()
}

mod mermaid_export_tests {
    use super::*;

    #[tokio::test]
    async fn test_blog_diagram() {
        let report = introspect(&blog(), IntrospectConfig::new()).await;
        let result = export_report(&report, OutputFormat::Mermaid, Theme::Default).unwrap();

        assert_eq!(
            result.content,
            "erDiagram\n\
             \x20   users {\n\
             \x20       ObjectId _id PK\n\
             \x20       string name\n\
             \x20   }\n\
             \n\
             \x20   posts {\n\
             \x20       ObjectId _id PK\n\
             \x20       ObjectId author_id FK\n\
             \x20       string title\n\
             \x20   }\n\
             \n\
             \x20   posts }o--|| users : \"author_id\"\n"
        );
    }

    #[tokio::test]
    async fn test_heuristic_target_rendered_without_entity() {
        let report = introspect(&blog(), IntrospectConfig::new().with_existence_check(false)).await;
        let result = export_report(&report, OutputFormat::Mermaid, Theme::Default).unwrap();

        assert!(result.content.contains("    posts }o--|| authors : \"author_id\"\n"));
        assert!(!result.content.contains("authors {"));
    }

    #[tokio::test]
    async fn test_theme_directive_first_line() {
        let report = introspect(&blog(), IntrospectConfig::new()).await;
        let result = export_report(&report, OutputFormat::Mermaid, Theme::Forest).unwrap();

        let mut lines = result.content.lines();
        assert_eq!(lines.next(), Some("%%{init: {\"theme\": \"forest\"}}%%"));
        assert_eq!(lines.next(), Some("erDiagram"));
    }

    #[tokio::test]
    async fn test_nested_fields_stay_out_of_entity() {
        let store = MemoryStore::new("crm").with_collection(
            "customers",
            vec![json!({"_id": 1, "address": {"city": "Berlin", "zip": "10115"}})],
        );
        let report = introspect(&store, IntrospectConfig::new()).await;
        let result = export_report(&report, OutputFormat::Mermaid, Theme::Default).unwrap();

        assert!(result.content.contains("        object address\n"));
        assert!(!result.content.contains("city"));
    }

    #[tokio::test]
    async fn test_sanitized_collisions() {
        let store = MemoryStore::new("shop")
            .with_collection("order-items", vec![json!({"_id": 1, "first": true})])
            .with_collection("users", vec![json!({"_id": 2})])
            .with_collection("order_items", vec![json!({"_id": 3, "second": true})]);
        let report = introspect(&store, IntrospectConfig::new()).await;
        let result = export_report(&report, OutputFormat::Mermaid, Theme::Default).unwrap();

        assert_eq!(result.content.matches("order_items {").count(), 1);
        assert!(result.content.contains("boolean second"));
        assert!(!result.content.contains("boolean first"));
        let order = result.content.find("order_items {").unwrap();
        let users = result.content.find("users {").unwrap();
        assert!(order < users);
    }

    #[tokio::test]
    async fn test_empty_database() {
        let report = introspect(&MemoryStore::new("empty"), IntrospectConfig::new()).await;
        let result = export_report(&report, OutputFormat::Mermaid, Theme::Default).unwrap();
        assert_eq!(result.content, "erDiagram\n");
    }
}

mod ascii_export_tests {
    use super::*;

    #[tokio::test]
    async fn test_blog_text() {
        let report = introspect(&blog(), IntrospectConfig::new()).await;
        let result = export_report(&report, OutputFormat::Ascii, Theme::Dark).unwrap();

        let expected = format!(
            "Collection: users\n\
             \x20 _id: ObjectId [PK]\n\
             \x20 name: string\n\
             \x20 Relationships:\n\
             \x20   (none)\n\
             \n\
             Collection: posts\n\
             \x20 _id: ObjectId [PK]\n\
             \x20 author_id: ObjectId [FK]\n\
             \x20 title: string\n\
             \x20 Relationships:\n\
             \x20   author_id → users\n\
             \n\
             {}",
            LEGEND
        );
        assert_eq!(result.content, expected);
    }
}

mod report_export_tests {
    use super::*;

    #[tokio::test]
    async fn test_json_report() {
        let report = introspect(&blog(), IntrospectConfig::new()).await;
        let result = export_report(&report, OutputFormat::Json, Theme::Default).unwrap();
        assert_eq!(result.format, "json");

        let parsed: Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(parsed["database"], "blog");
        assert_eq!(parsed["collections"][1]["name"], "posts");
        assert_eq!(parsed["relationships"][0]["toCollection"], "users");
        assert_eq!(parsed["relationships"][0]["confidence"], "existenceConfirmed");
        assert!(parsed.get("failures").is_none());
    }

    #[tokio::test]
    async fn test_yaml_report() {
        let report = introspect(&blog(), IntrospectConfig::new()).await;
        let result = export_report(&report, OutputFormat::Yaml, Theme::Default).unwrap();

        let parsed: SchemaReport = serde_yaml::from_str(&result.content).unwrap();
        assert_eq!(parsed, report);
    }
}
