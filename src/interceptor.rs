// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Resolution interceptor
//!
//! Decides, per request, whether a specifier passes through to the host,
//! is substituted, or is claimed as a virtual module. Decisions are a pure
//! function of the request and the rule table, so the interceptor can be
//! shared across concurrent resolutions without locking.

use crate::request::{ImportSite, ResolveOutcome, ResolveRequest, VirtualToken};
use crate::rule::{RuleAction, TransformRule};
use crate::table::RuleTable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Namespace virtual modules are claimed under
pub const DEFAULT_NAMESPACE: &str = "import-transform";

/// How substitution rules redirect a specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubstitutionStrategy {
    /// Hand the target back to the host's resolver
    #[default]
    Reresolve,
    /// Claim the specifier and load a module re-exporting the target
    ReexportShim,
}

/// Matches requests against the rule table
#[derive(Debug, Clone)]
pub struct ResolutionInterceptor {
    table: Arc<RuleTable>,
    namespace: String,
    strategy: SubstitutionStrategy,
}

impl ResolutionInterceptor {
    /// Create an interceptor over `table`
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self {
            table,
            namespace: DEFAULT_NAMESPACE.to_string(),
            strategy: SubstitutionStrategy::default(),
        }
    }

    /// Claim virtual modules under `namespace`
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Use `strategy` for substitution rules
    pub fn with_strategy(mut self, strategy: SubstitutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Namespace of claimed modules
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Substitution strategy
    pub fn strategy(&self) -> SubstitutionStrategy {
        self.strategy
    }

    /// The rule table
    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Decide what to do with `request`
    pub fn resolve(&self, request: &ResolveRequest) -> ResolveOutcome {
        let Some(rule) = self.table.get(&request.specifier) else {
            return ResolveOutcome::PassThrough;
        };

        let resolve_dir = match &request.site {
            ImportSite::Module { resolve_dir } => resolve_dir,
            ImportSite::Detached => {
                trace!("Skipping '{}': no importing module", request.specifier);
                return ResolveOutcome::PassThrough;
            }
        };

        if !rule.applies_to(request.platform) {
            trace!(
                "Skipping '{}': rule is limited to platform {:?}, building for {:?}",
                request.specifier,
                rule.platform(),
                request.platform
            );
            return ResolveOutcome::PassThrough;
        }

        match (rule.action(), self.strategy) {
            (RuleAction::Substitute { target }, SubstitutionStrategy::Reresolve) => {
                debug!("Substituting '{}' with '{}'", request.specifier, target);
                ResolveOutcome::Substitute {
                    specifier: target.clone(),
                    resolve_dir: resolve_dir.clone(),
                    kind: request.kind,
                }
            }
            (RuleAction::Substitute { .. }, SubstitutionStrategy::ReexportShim)
            | (RuleAction::Virtualize { .. }, _) => {
                debug!("Claiming '{}' as a virtual module", request.specifier);
                self.claim(rule, &request.specifier, resolve_dir)
            }
        }
    }

    fn claim(&self, rule: &TransformRule, path: &str, resolve_dir: &Path) -> ResolveOutcome {
        ResolveOutcome::Virtual {
            path: path.to_string(),
            namespace: self.namespace.clone(),
            token: VirtualToken {
                name: rule.key().to_string(),
                resolve_dir: resolve_dir.to_path_buf(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::request::ImportKind;
    use std::path::PathBuf;

    fn interceptor(json: &str) -> ResolutionInterceptor {
        ResolutionInterceptor::new(Arc::new(RuleTable::from_json_str(json).unwrap()))
    }

    #[test]
    fn test_unmatched_specifier_passes_through() {
        let interceptor = interceptor(r#"{ "node:path": "path-browserify" }"#);
        for platform in Platform::ALL {
            for dir in ["", "/project"] {
                let request = ResolveRequest::new("node:fs", dir, platform);
                assert!(interceptor.resolve(&request).is_pass_through());
            }
        }
    }

    #[test]
    fn test_detached_site_is_never_transformed() {
        let interceptor = interceptor(
            r#"{ "node:path": "path-browserify", "node:os": { "text": "export {}" } }"#,
        );
        for specifier in ["node:path", "node:os"] {
            let request = ResolveRequest::new(specifier, "", Platform::Browser);
            assert_eq!(interceptor.resolve(&request), ResolveOutcome::PassThrough);
        }
    }

    #[test]
    fn test_ungated_substitution_on_every_platform() {
        let interceptor = interceptor(r#"{ "node:path": "path-browserify" }"#);
        for platform in Platform::ALL {
            let request = ResolveRequest::new("node:path", "/project/src", platform)
                .with_kind(ImportKind::RequireCall);
            assert_eq!(
                interceptor.resolve(&request),
                ResolveOutcome::Substitute {
                    specifier: "path-browserify".into(),
                    resolve_dir: PathBuf::from("/project/src"),
                    kind: ImportKind::RequireCall,
                }
            );
        }
    }

    #[test]
    fn test_gated_rule_inert_on_other_platforms() {
        let interceptor = interceptor(
            r#"{ "node:path": { "platform": "browser", "to": "path-browserify" } }"#,
        );
        let node = ResolveRequest::new("node:path", "/project", Platform::Node);
        assert!(interceptor.resolve(&node).is_pass_through());
        let neutral = ResolveRequest::new("node:path", "/project", Platform::Neutral);
        assert!(interceptor.resolve(&neutral).is_pass_through());

        let browser = ResolveRequest::new("node:path", "/project", Platform::Browser);
        assert!(matches!(
            interceptor.resolve(&browser),
            ResolveOutcome::Substitute { specifier, .. } if specifier == "path-browserify"
        ));
    }

    #[test]
    fn test_gated_text_rule_fully_inert() {
        let interceptor =
            interceptor(r#"{ "node:path": { "platform": "node", "text": "export {}" } }"#);
        let request = ResolveRequest::new("node:path", "/project", Platform::Browser);
        assert!(interceptor.resolve(&request).is_pass_through());
    }

    #[test]
    fn test_unset_platform_only_applies_ungated_rules() {
        let interceptor = interceptor(
            r#"{
                "node:path": { "platform": "browser", "to": "path-browserify" },
                "node:os": "os-browserify"
            }"#,
        );
        let gated = ResolveRequest::new("node:path", "/project", None);
        assert!(interceptor.resolve(&gated).is_pass_through());

        let ungated = ResolveRequest::new("node:os", "/project", None);
        assert!(matches!(
            interceptor.resolve(&ungated),
            ResolveOutcome::Substitute { specifier, .. } if specifier == "os-browserify"
        ));
    }

    #[test]
    fn test_text_rule_claims_specifier() {
        let interceptor = interceptor(r#"{ "node:path": { "text": "export {}" } }"#)
            .with_namespace("shims");
        let request = ResolveRequest::new("node:path", "/project/src", Platform::Neutral);
        assert_eq!(
            interceptor.resolve(&request),
            ResolveOutcome::Virtual {
                path: "node:path".into(),
                namespace: "shims".into(),
                token: VirtualToken {
                    name: "node:path".into(),
                    resolve_dir: PathBuf::from("/project/src"),
                },
            }
        );
    }

    #[test]
    fn test_shim_strategy_claims_substitutions() {
        let interceptor = interceptor(r#"{ "node:path": "path-browserify" }"#)
            .with_strategy(SubstitutionStrategy::ReexportShim);
        let request = ResolveRequest::new("node:path", "/project", Platform::Browser);
        assert!(matches!(
            interceptor.resolve(&request),
            ResolveOutcome::Virtual { namespace, .. } if namespace == DEFAULT_NAMESPACE
        ));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let interceptor = interceptor(
            r#"{ "node:path": "path-browserify", "node:os": { "text": "export {}" } }"#,
        );
        for specifier in ["node:path", "node:os", "lodash"] {
            let request = ResolveRequest::new(specifier, "/project", Platform::Browser);
            assert_eq!(interceptor.resolve(&request), interceptor.resolve(&request));
        }
    }
}
