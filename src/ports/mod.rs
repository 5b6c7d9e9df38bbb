//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the engine and the outside world. Adapters implement these ports.
//!
//! - `WorkflowRepository` - Workflow and step persistence
//! - `SemanticSearch` - Similarity search over prior content
//! - `ProfileStore` - User knowledge profiles
//! - `AIProvider` - Model invocation
//! - `MessageDelivery` - Out-of-turn messages to a thread
//! - `ClassificationService` - Optional upstream sensitivity classifier

mod ai_provider;
mod classification_service;
mod message_delivery;
mod profile_store;
mod semantic_search;
mod workflow_repository;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, RequestMetadata, TokenUsage,
};
pub use classification_service::ClassificationService;
pub use message_delivery::MessageDelivery;
pub use profile_store::ProfileStore;
pub use semantic_search::{SearchContentType, SearchHit, SearchQuery, SemanticSearch, SourceMetadata};
pub use workflow_repository::WorkflowRepository;
