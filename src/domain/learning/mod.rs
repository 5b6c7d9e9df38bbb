//! Learning domain - user knowledge profiles and the signals that refine them.

mod profile;
mod signals;

pub use profile::{ProfileVersion, UserKnowledgeProfile, WorkflowUsage};
pub use signals::{InputStyle, LearningSignals, PreferenceCandidates};
