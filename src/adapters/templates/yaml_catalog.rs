//! YAML template catalog.
//!
//! Loads workflow templates from a single YAML file (one template or a
//! list) or from every `.yaml`/`.yml` file in a directory. Templates read
//! from disk replace the built-in template for the same workflow type;
//! built-in templates fill in every type the catalog does not define, so
//! the base workflow is always available.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::TemplatesConfig;
use crate::domain::foundation::DomainError;
use crate::domain::workflow::{builtin_templates, TemplateRegistry, WorkflowTemplate};

/// Errors raised while loading a template catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid template catalog: {0}")]
    Invalid(#[from] DomainError),
}

/// One file may hold a single template or a list of them.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Many(Vec<WorkflowTemplate>),
    One(Box<WorkflowTemplate>),
}

impl CatalogFile {
    fn into_templates(self) -> Vec<WorkflowTemplate> {
        match self {
            CatalogFile::Many(list) => list,
            CatalogFile::One(template) => vec![*template],
        }
    }
}

pub struct YamlTemplateCatalog;

impl YamlTemplateCatalog {
    /// Builds the registry from configuration, falling back to the
    /// built-in catalog when no path is configured.
    pub fn registry_from_config(config: &TemplatesConfig) -> Result<TemplateRegistry, CatalogError> {
        match &config.catalog_path {
            Some(path) => Self::load(path),
            None => Ok(TemplateRegistry::from_templates(builtin_templates())?),
        }
    }

    /// Loads templates from a file or directory and overlays them on the
    /// built-in catalog.
    pub fn load(path: &Path) -> Result<TemplateRegistry, CatalogError> {
        let loaded = Self::read_templates(path)?;
        let mut registry = TemplateRegistry::new();
        for template in &loaded {
            registry.register(template.clone())?;
        }
        for builtin in builtin_templates() {
            if !registry.contains(builtin.workflow_type) {
                registry.register(builtin)?;
            }
        }
        tracing::info!(
            path = %path.display(),
            loaded = loaded.len(),
            total = registry.len(),
            "Template catalog loaded"
        );
        Ok(registry)
    }

    /// Reads every template under `path` without validating them.
    pub fn read_templates(path: &Path) -> Result<Vec<WorkflowTemplate>, CatalogError> {
        let metadata = fs::metadata(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Self::read_file(path);
        }

        let entries = fs::read_dir(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let file = entry.path();
            let is_yaml = file
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
            if is_yaml && file.is_file() {
                files.push(file);
            }
        }
        // Stable load order regardless of directory iteration order.
        files.sort();

        let mut templates = Vec::new();
        for file in files {
            templates.extend(Self::read_file(&file)?);
        }
        Ok(templates)
    }

    fn read_file(path: &Path) -> Result<Vec<WorkflowTemplate>, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: CatalogFile =
            serde_yaml::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), "Read template file");
        Ok(parsed.into_templates())
    }
}
