//! Template catalog configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Template catalog configuration
///
/// Without a path the built-in catalog is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatesConfig {
    /// YAML file or directory of YAML files
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

impl TemplatesConfig {
    /// Validate templates configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.catalog_path {
            Some(path) if path.as_os_str().is_empty() => Err(ValidationError::EmptyCatalogPath),
            _ => Ok(()),
        }
    }
}
