//! Security level ordering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Sensitivity level of a piece of content.
///
/// Totally ordered from least to most sensitive. Within one content item's
/// lifecycle a level may only be raised.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    Public,
    #[default]
    Internal,
    Confidential,
    Restricted,
}

impl SecurityLevel {
    /// Returns the more sensitive of the two levels.
    pub fn escalate(self, other: SecurityLevel) -> SecurityLevel {
        self.max(other)
    }

    /// Returns true if content at this level may be passed to a model unredacted.
    pub fn is_model_safe(&self) -> bool {
        *self <= SecurityLevel::Internal
    }

    /// Returns true if content at this level is visible under the given ceiling.
    pub fn within(&self, ceiling: SecurityLevel) -> bool {
        *self <= ceiling
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SecurityLevel::Public => "public",
            SecurityLevel::Internal => "internal",
            SecurityLevel::Confidential => "confidential",
            SecurityLevel::Restricted => "restricted",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SecurityLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(SecurityLevel::Public),
            "internal" => Ok(SecurityLevel::Internal),
            "confidential" => Ok(SecurityLevel::Confidential),
            "restricted" => Ok(SecurityLevel::Restricted),
            other => Err(ValidationError::invalid_format(
                "security_level",
                format!("unknown level '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_totally_ordered() {
        assert!(SecurityLevel::Public < SecurityLevel::Internal);
        assert!(SecurityLevel::Internal < SecurityLevel::Confidential);
        assert!(SecurityLevel::Confidential < SecurityLevel::Restricted);
    }

    #[test]
    fn escalate_never_lowers() {
        assert_eq!(
            SecurityLevel::Restricted.escalate(SecurityLevel::Public),
            SecurityLevel::Restricted
        );
        assert_eq!(
            SecurityLevel::Internal.escalate(SecurityLevel::Confidential),
            SecurityLevel::Confidential
        );
    }

    #[test]
    fn only_public_and_internal_are_model_safe() {
        assert!(SecurityLevel::Public.is_model_safe());
        assert!(SecurityLevel::Internal.is_model_safe());
        assert!(!SecurityLevel::Confidential.is_model_safe());
        assert!(!SecurityLevel::Restricted.is_model_safe());
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Confidential".parse::<SecurityLevel>().unwrap(), SecurityLevel::Confidential);
        assert!("secret".parse::<SecurityLevel>().is_err());
    }
}
