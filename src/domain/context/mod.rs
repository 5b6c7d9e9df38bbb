//! Context domain - the sanitized knowledge bundle and its prompt injector.

mod bundle;
mod injector;

pub use bundle::{rank_order, ContextBundle, ContextItem, KnowledgeScope, ProfileSummary};
pub use injector::PromptContextInjector;
