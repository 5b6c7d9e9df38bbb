//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - Mock model provider and the retrying decorator
//! - `storage` - In-memory workflow repository and profile store
//! - `search` - In-memory semantic search
//! - `delivery` - Recording message delivery
//! - `security` - Mock upstream classifier
//! - `templates` - YAML template catalog

pub mod ai;
pub mod delivery;
pub mod search;
pub mod security;
pub mod storage;
pub mod templates;
