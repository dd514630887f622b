//! Models module
//!
//! Defines the data structures produced by an introspection run: field
//! descriptors, collection schemas, relationship edges, and the diagram
//! description handed to the notation writers.

pub mod collection;
pub mod diagram;
pub mod field;
pub mod relationship;

pub use collection::{CollectionFailure, CollectionSchema, SchemaReport};
pub use diagram::{Attribute, DiagramDescription, EntityBlock, KeyMarker, RelationshipStatement};
pub use field::{FieldDescriptor, FieldType};
pub use relationship::{Cardinality, Confidence, RelationshipEdge, dedup_edges};
