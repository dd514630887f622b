//! Schema inference engine for sampled documents
//!
//! This module infers field types from MongoDB Extended JSON documents and
//! aggregates them into one schema per collection.
//!
//! ## Features
//!
//! - **Type inference** - Detect scalar, date, reference, array and object types
//! - **Extended JSON** - Recognize `$oid`, DBRef, `$date` and number wrappers
//! - **Depth bound** - Stop descending past a fixed nesting depth
//! - **Aggregation** - Merge per-document observations, widening conflicts to `Mixed`
//!
//! ## Example
//!
//! ```rust
//! use mongodb_erd::inference::{TypeInferencer, aggregate};
//! use serde_json::json;
//!
//! let inferencer = TypeInferencer::new();
//! let docs = vec![
//!     inferencer.infer_document("users", &json!({"name": "Alice", "age": 30})).unwrap(),
//!     inferencer.infer_document("users", &json!({"name": "Bob", "age": "n/a"})).unwrap(),
//! ];
//!
//! let schema = aggregate("users", docs);
//! assert_eq!(schema.fields.len(), 2);
//! ```

mod config;
mod error;
mod formats;
mod inferrer;
mod merge;

pub use config::{DEFAULT_MAX_DEPTH, InferenceConfig, InferenceConfigBuilder};
pub use error::InferenceError;
pub use formats::{Format, Wrapper, detect_format, detect_wrapper, reference_value};
pub use inferrer::{InferredDocument, TypeInferencer};
pub use merge::{aggregate, merge_fields, merge_types};
