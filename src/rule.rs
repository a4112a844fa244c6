// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Transform rules
//!
//! A rule is written in configuration as either a plain replacement path or
//! an object with optional `platform` and exactly one of `to` / `text`:
//!
//! ```json
//! {
//!   "node:path": "path-browserify",
//!   "node:os": { "platform": "browser", "to": "os-browserify" },
//!   "node:fs": { "text": "export default {}" }
//! }
//! ```
//!
//! The shape is checked once, when the rule is built; after that a rule is
//! either [`RuleAction::Substitute`] or [`RuleAction::Virtualize`].

use crate::error::{Result, TransformError};
use crate::platform::Platform;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A rule as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    /// Substitute with this path on every platform
    Path(String),
    /// Structured rule
    Object(RuleObject),
}

/// Structured rule fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleObject {
    /// Platform the rule is limited to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Replacement specifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Inline module source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl From<&str> for RuleSpec {
    fn from(path: &str) -> Self {
        RuleSpec::Path(path.to_string())
    }
}

impl From<String> for RuleSpec {
    fn from(path: String) -> Self {
        RuleSpec::Path(path)
    }
}

impl From<RuleObject> for RuleSpec {
    fn from(object: RuleObject) -> Self {
        RuleSpec::Object(object)
    }
}

/// What a rule does once it applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    /// Resolve `target` instead of the matched specifier
    Substitute {
        /// Replacement specifier
        target: String,
    },
    /// Serve `content` as the module body
    Virtualize {
        /// Module source, returned verbatim
        content: String,
    },
}

/// A validated transform rule
#[derive(Debug, Clone)]
pub struct TransformRule {
    key: String,
    platform: Option<Platform>,
    action: RuleAction,
    filter: Regex,
}

impl TransformRule {
    /// Build a substitution rule
    pub fn substitute(
        key: impl Into<String>,
        target: impl Into<String>,
        platform: Option<Platform>,
    ) -> Result<Self> {
        Self::new(
            key.into(),
            platform,
            RuleAction::Substitute {
                target: target.into(),
            },
        )
    }

    /// Build a virtual module rule
    pub fn virtualize(
        key: impl Into<String>,
        content: impl Into<String>,
        platform: Option<Platform>,
    ) -> Result<Self> {
        Self::new(
            key.into(),
            platform,
            RuleAction::Virtualize {
                content: content.into(),
            },
        )
    }

    /// Validate a configuration entry
    pub fn from_spec(key: impl Into<String>, spec: RuleSpec) -> Result<Self> {
        let key = key.into();
        match spec {
            RuleSpec::Path(target) => Self::substitute(key, target, None),
            RuleSpec::Object(RuleObject { platform, to, text }) => {
                let platform = platform.as_deref().map(str::parse::<Platform>).transpose()?;
                match (to, text) {
                    (Some(_), Some(_)) => Err(TransformError::BothTargets { key }),
                    (None, None) => Err(TransformError::MissingTarget { key }),
                    (Some(target), None) => Self::substitute(key, target, platform),
                    (None, Some(content)) => Self::virtualize(key, content, platform),
                }
            }
        }
    }

    fn new(key: String, platform: Option<Platform>, action: RuleAction) -> Result<Self> {
        if key.is_empty() {
            return Err(TransformError::EmptySpecifier);
        }
        if let RuleAction::Substitute { target } = &action {
            if *target == key {
                return Err(TransformError::SelfSubstitution(key));
            }
        }
        let filter = Regex::new(&format!("^{}$", regex::escape(&key)))?;
        Ok(Self {
            key,
            platform,
            action,
            filter,
        })
    }

    /// The exact specifier this rule matches
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Platform gate, `None` meaning every platform
    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    /// The rule's action
    pub fn action(&self) -> &RuleAction {
        &self.action
    }

    /// Substitution target, if this is a substitution rule
    pub fn target(&self) -> Option<&str> {
        match &self.action {
            RuleAction::Substitute { target } => Some(target),
            RuleAction::Virtualize { .. } => None,
        }
    }

    /// Inline content, if this is a virtual module rule
    pub fn content(&self) -> Option<&str> {
        match &self.action {
            RuleAction::Virtualize { content } => Some(content),
            RuleAction::Substitute { .. } => None,
        }
    }

    /// Anchored filter for hosts that register hooks by regular expression.
    ///
    /// Matches exactly the specifiers [`TransformRule::key`] matches.
    pub fn filter(&self) -> &Regex {
        &self.filter
    }

    /// Whether the rule is active for a build targeting `platform`.
    ///
    /// A gated rule never applies to a build that set no platform.
    pub fn applies_to(&self, platform: impl Into<Option<Platform>>) -> bool {
        let platform = platform.into();
        self.platform.is_none_or(|gate| Some(gate) == platform)
    }
}

impl PartialEq for TransformRule {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.platform == other.platform && self.action == other.action
    }
}

impl Eq for TransformRule {}
