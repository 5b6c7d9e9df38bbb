//! Semantic search adapters.

mod in_memory_semantic_search;

pub use in_memory_semantic_search::{InMemorySemanticSearch, IndexedContent};
