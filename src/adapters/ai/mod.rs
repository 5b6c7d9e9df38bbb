//! AI provider adapters.

mod mock_provider;
mod retrying_provider;

pub use mock_provider::{MockAIProvider, MockError, MockResponse, DEFAULT_MOCK_RESPONSE};
pub use retrying_provider::{RetryPolicy, RetryingAIProvider};
