#![forbid(unsafe_code)]

//! Concept-tree model for mind maps (headless).
//!
//! - [`ConceptTree`]: the canonical tree, an arena keyed by node id with explicit parent links
//! - [`ingest`]: validation + id assignment for generated or persisted trees
//! - [`mutation`]: structural edits that always return a new tree value
//! - [`export`]: Markdown outline and JSON exchange form

pub mod config;
pub mod error;
pub mod export;
pub mod ids;
pub mod ingest;
pub mod model;
pub mod mutation;
pub mod tree;

pub use config::MindmapConfig;
pub use error::{Error, Result};
pub use ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use model::{ConceptNode, ManualPosition, NodeStyle};
pub use mutation::{BlockReason, Edit, EditOutcome, StyleChange};
pub use tree::{ConceptTree, NodeRef};
