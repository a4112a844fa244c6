// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for import transforms

use thiserror::Error;

/// Result type for import transform operations
pub type Result<T> = std::result::Result<T, TransformError>;

/// Errors raised while configuring or running import transforms
#[derive(Debug, Error)]
pub enum TransformError {
    /// A rule object set both `to` and `text`
    #[error("Transform for '{key}' sets both `to` and `text`; choose one")]
    BothTargets {
        /// Rule key
        key: String,
    },

    /// A rule object set neither `to` nor `text`
    #[error("Transform for '{key}' must set either `to` or `text`")]
    MissingTarget {
        /// Rule key
        key: String,
    },

    /// The same specifier was registered twice
    #[error("Duplicate transform for '{0}'")]
    DuplicateRule(String),

    /// A rule key was the empty string
    #[error("Transform keys must be non-empty specifiers")]
    EmptySpecifier,

    /// A substitution rule points at itself
    #[error("Transform for '{0}' substitutes the specifier with itself")]
    SelfSubstitution(String),

    /// Substitution rules form a loop
    #[error("Substitution cycle detected: {}", .0.join(" -> "))]
    SubstitutionCycle(Vec<String>),

    /// Unrecognized platform name
    #[error("Unknown platform '{0}' (expected browser, node or neutral)")]
    UnknownPlatform(String),

    /// Configuration could not be parsed
    #[error("Invalid transform configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// Hook filter could not be compiled
    #[error("Invalid hook filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    /// Internal invariant broken between the resolve and load hooks
    #[error("Invariant violated for '{key}': {reason}")]
    InvariantViolation {
        /// Rule key carried by the virtual token
        key: String,
        /// What was wrong
        reason: String,
    },

    /// Module not found by the host
    #[error("Cannot find module '{0}'")]
    ModuleNotFound(String),

    /// Host resolution error
    #[error("Error resolving module '{module}': {reason}")]
    Resolution {
        /// Module specifier
        module: String,
        /// Reason for failure
        reason: String,
    },

    /// File system error
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransformError {
    /// Create a module not found error
    pub fn module_not_found(module: impl Into<String>) -> Self {
        Self::ModuleNotFound(module.into())
    }

    /// Create an invariant violation error
    pub fn invariant(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error belongs to plugin setup rather than to a build
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::BothTargets { .. }
                | Self::MissingTarget { .. }
                | Self::DuplicateRule(_)
                | Self::EmptySpecifier
                | Self::SelfSubstitution(_)
                | Self::SubstitutionCycle(_)
                | Self::UnknownPlatform(_)
                | Self::InvalidConfig(_)
                | Self::InvalidFilter(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_classification() {
        assert!(TransformError::BothTargets { key: "a".into() }.is_config_error());
        assert!(TransformError::DuplicateRule("a".into()).is_config_error());
        assert!(!TransformError::invariant("a", "no text").is_config_error());
        assert!(!TransformError::module_not_found("a").is_config_error());
    }

    #[test]
    fn test_cycle_message() {
        let err = TransformError::SubstitutionCycle(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(err.to_string(), "Substitution cycle detected: a -> b -> a");
    }
}
