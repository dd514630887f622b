//! Cross-collection relationship discovery
//!
//! Reference candidate fields are linked to a target collection either by
//! confirming sampled identifiers against the store or by the field name.
//!
//! # Example
//!
//! ```rust
//! use mongodb_erd::relationships::{candidate_collection, strip_reference_suffix};
//!
//! assert_eq!(strip_reference_suffix("author_id"), "author");
//! assert_eq!(candidate_collection("author_id").as_deref(), Some("authors"));
//! ```

mod detector;
mod naming;

pub use detector::{DEFAULT_PROBE_CONCURRENCY, DetectorConfig, RelationshipDetector};
pub use naming::{
    SUFFIX_RULES, SuffixRule, candidate_collection, pluralize, resolve_known,
    strip_reference_suffix,
};
