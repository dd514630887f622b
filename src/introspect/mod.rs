//! Introspection runs
//!
//! Ties the store, sampler, inferencer, aggregator and relationship detector
//! together:
//!
//! ```text
//! list collections -> sample (bounded) -> infer -> aggregate -> detect relationships
//! ```
//!
//! # Example
//!
//! ```rust
//! use mongodb_erd::introspect::{IntrospectConfig, Introspector};
//! use mongodb_erd::storage::MemoryStore;
//! use serde_json::json;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let store = MemoryStore::new("blog")
//!     .with_collection("users", vec![json!({"_id": {"$oid": "507f1f77bcf86cd799439011"}})])
//!     .with_collection("posts", vec![json!({
//!         "_id": {"$oid": "507f1f77bcf86cd799439012"},
//!         "author_id": {"$oid": "507f1f77bcf86cd799439011"}
//!     })]);
//!
//! let introspector = Introspector::new(IntrospectConfig::default());
//! let report = introspector.run_scoped(&store, CancellationToken::new()).await.unwrap();
//!
//! assert_eq!(report.relationships[0].to_collection, "users");
//! # });
//! ```

mod config;
mod error;
mod executor;

pub use config::{DEFAULT_SAMPLING_CONCURRENCY, FailurePolicy, IntrospectConfig};
pub use error::{IntrospectError, IntrospectResult};
pub use executor::Introspector;
