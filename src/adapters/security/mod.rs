//! Upstream classification adapters.

mod mock_classification_service;

pub use mock_classification_service::MockClassificationService;
