//! mongodb-erd - Schema inference and entity-relationship diagrams for document stores
//!
//! Provides unified interfaces for:
//! - Document store access (via store backends)
//! - Per-document type inference and per-collection schema aggregation
//! - Relationship discovery from field names and existence checks
//! - Mermaid, plain-text, JSON and YAML export
//! - Orchestrated, cancellable introspection runs

pub mod cli;
pub mod config;
pub mod export;
pub mod inference;
pub mod introspect;
pub mod models;
pub mod relationships;
pub mod sampler;
pub mod storage;

// Re-export commonly used types
pub use storage::{Connector, Document, DocumentStore, MemoryStore, ResourceKind, StoreError};
#[cfg(feature = "native-fs")]
pub use storage::DirectoryStore;

pub use config::{ConfigError, ErdConfig, OutputConfig};
pub use export::{
    AsciiExporter, DiagramSynthesizer, ExportError, ExportResult, MermaidExporter, OutputFormat,
    ReportExporter, Theme, export_report,
};
pub use inference::{InferenceConfig, InferenceError, TypeInferencer, aggregate};
pub use introspect::{FailurePolicy, IntrospectConfig, IntrospectError, IntrospectResult, Introspector};
pub use relationships::{DetectorConfig, RelationshipDetector};
pub use sampler::Sampler;

// Re-export models
pub use models::{
    Cardinality, CollectionFailure, CollectionSchema, Confidence, DiagramDescription,
    FieldDescriptor, FieldType, RelationshipEdge, SchemaReport,
};
