// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Virtual module loader - serves content for claimed specifiers

use crate::error::{Result, TransformError};
use crate::interceptor::SubstitutionStrategy;
use crate::request::VirtualToken;
use crate::rule::RuleAction;
use crate::table::RuleTable;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Source of a virtual module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualModule {
    /// Module body
    pub contents: String,
    /// Directory relative specifiers inside `contents` resolve from
    pub resolve_dir: PathBuf,
}

/// Loads virtual modules claimed by the interceptor
#[derive(Debug, Clone)]
pub struct VirtualLoader {
    table: Arc<RuleTable>,
    strategy: SubstitutionStrategy,
}

impl VirtualLoader {
    /// Create a loader over `table`
    pub fn new(table: Arc<RuleTable>, strategy: SubstitutionStrategy) -> Self {
        Self { table, strategy }
    }

    /// Load the module claimed at `path` with `token`
    pub fn load(&self, path: &str, token: &VirtualToken) -> Result<VirtualModule> {
        let rule = self.table.get(&token.name).ok_or_else(|| {
            TransformError::invariant(&token.name, "no transform registered for claimed module")
        })?;

        let contents = match (rule.action(), self.strategy) {
            (RuleAction::Virtualize { content }, _) => content.clone(),
            (RuleAction::Substitute { target }, SubstitutionStrategy::ReexportShim) => {
                reexport_shim(&rewrite_specifier(path, rule.key(), target))
            }
            (RuleAction::Substitute { .. }, SubstitutionStrategy::Reresolve) => {
                return Err(TransformError::invariant(
                    rule.key(),
                    "claimed module has no inline text",
                ));
            }
        };

        debug!(
            "Loaded virtual module '{}' ({} bytes) from {}",
            path,
            contents.len(),
            token.resolve_dir.display()
        );

        Ok(VirtualModule {
            contents,
            resolve_dir: token.resolve_dir.clone(),
        })
    }
}

/// Replace the first occurrence of `name` in `path` with `target`
pub fn rewrite_specifier(path: &str, name: &str, target: &str) -> String {
    path.replacen(name, target, 1)
}

/// Module source re-exporting everything from `specifier`
pub fn reexport_shim(specifier: &str) -> String {
    // JSON string syntax is a valid JS string literal
    let quoted = serde_json::Value::from(specifier).to_string();
    format!("export * from {quoted};\nexport {{ default }} from {quoted};\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader(json: &str, strategy: SubstitutionStrategy) -> VirtualLoader {
        VirtualLoader::new(Arc::new(RuleTable::from_json_str(json).unwrap()), strategy)
    }

    fn token(name: &str) -> VirtualToken {
        VirtualToken {
            name: name.into(),
            resolve_dir: PathBuf::from("/project/src"),
        }
    }

    #[test]
    fn test_text_returned_verbatim() {
        let text = "export function join(...a){return a.join('/')}\n\n  // trailing  ";
        let json = serde_json::json!({ "node:path": { "text": text } }).to_string();
        let loader = loader(&json, SubstitutionStrategy::Reresolve);

        let module = loader.load("node:path", &token("node:path")).unwrap();
        assert_eq!(module.contents, text);
        assert_eq!(module.resolve_dir, PathBuf::from("/project/src"));
    }

    #[test]
    fn test_substitution_token_is_invariant_violation() {
        let loader = loader(r#"{ "node:path": "path-browserify" }"#, SubstitutionStrategy::Reresolve);
        let err = loader.load("node:path", &token("node:path")).unwrap_err();
        assert!(matches!(err, TransformError::InvariantViolation { .. }));
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_unknown_token_is_invariant_violation() {
        let loader = loader(r#"{ "node:path": { "text": "" } }"#, SubstitutionStrategy::Reresolve);
        let err = loader.load("node:fs", &token("node:fs")).unwrap_err();
        assert!(matches!(err, TransformError::InvariantViolation { key, .. } if key == "node:fs"));
    }

    #[test]
    fn test_shim_reexports_target() {
        let loader = loader(
            r#"{ "node:path": "path-browserify" }"#,
            SubstitutionStrategy::ReexportShim,
        );
        let module = loader.load("node:path", &token("node:path")).unwrap();
        assert_eq!(
            module.contents,
            "export * from \"path-browserify\";\nexport { default } from \"path-browserify\";\n"
        );
    }

    #[test]
    fn test_rewrite_specifier_first_occurrence() {
        assert_eq!(
            rewrite_specifier("./dir1/file-b", "./dir1/file-b", "./dir2/file-a"),
            "./dir2/file-a"
        );
        assert_eq!(rewrite_specifier("a/a", "a", "b"), "b/a");
    }

    #[test]
    fn test_shim_quotes_specifier() {
        assert_eq!(
            reexport_shim("it's"),
            "export * from \"it's\";\nexport { default } from \"it's\";\n"
        );
    }
}
