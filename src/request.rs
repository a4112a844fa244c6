// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Resolution requests and outcomes

use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the specifier was imported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    /// Build entry point
    EntryPoint,
    /// `import` / `export ... from`
    #[default]
    ImportStatement,
    /// `require()`
    RequireCall,
    /// `import()`
    DynamicImport,
    /// `require.resolve()`
    RequireResolve,
    /// CSS `@import`
    ImportRule,
    /// CSS `composes: ... from`
    ComposesFrom,
    /// CSS `url()`
    UrlToken,
}

/// Where a specifier is being resolved from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportSite {
    /// A real module in the graph, with the directory its imports resolve from
    Module {
        /// Importer's resolve directory
        resolve_dir: PathBuf,
    },
    /// No importing file: entry points and host-internal resolutions.
    /// Transforms never rewrite these.
    Detached,
}

impl ImportSite {
    /// Classify a host-provided resolve directory; empty means detached
    pub fn from_resolve_dir(resolve_dir: impl Into<PathBuf>) -> Self {
        let resolve_dir = resolve_dir.into();
        if resolve_dir.as_os_str().is_empty() {
            ImportSite::Detached
        } else {
            ImportSite::Module { resolve_dir }
        }
    }

    /// The resolve directory, if this is a real import site
    pub fn resolve_dir(&self) -> Option<&Path> {
        match self {
            ImportSite::Module { resolve_dir } => Some(resolve_dir),
            ImportSite::Detached => None,
        }
    }
}

/// A single specifier to resolve
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolveRequest {
    /// Specifier as written in the importing code
    pub specifier: String,
    /// Importing context
    pub site: ImportSite,
    /// Kind of import
    pub kind: ImportKind,
    /// The build's target platform, `None` when the build set none
    pub platform: Option<Platform>,
    /// Specifiers already substituted on the way to this request, oldest first
    pub substituted: Vec<String>,
}

impl ResolveRequest {
    /// Create a request for an import statement
    pub fn new(
        specifier: impl Into<String>,
        resolve_dir: impl Into<PathBuf>,
        platform: impl Into<Option<Platform>>,
    ) -> Self {
        Self {
            specifier: specifier.into(),
            site: ImportSite::from_resolve_dir(resolve_dir),
            kind: ImportKind::default(),
            platform: platform.into(),
            substituted: Vec::new(),
        }
    }

    /// Set the import kind
    pub fn with_kind(mut self, kind: ImportKind) -> Self {
        self.kind = kind;
        self
    }
}

/// State carried from a virtual claim to its load
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualToken {
    /// Key of the rule that claimed the specifier
    pub name: String,
    /// Importer's resolve directory
    pub resolve_dir: PathBuf,
}

/// What the interceptor decided for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// No opinion; the host resolves normally
    PassThrough,
    /// Resolve `specifier` instead, as if the importer had written it
    Substitute {
        /// Replacement specifier
        specifier: String,
        /// Same resolve directory as the original request
        resolve_dir: PathBuf,
        /// Same import kind as the original request
        kind: ImportKind,
    },
    /// The specifier is owned by the plugin; content comes from the loader
    Virtual {
        /// Unaltered specifier
        path: String,
        /// Namespace the load hook listens on
        namespace: String,
        /// Token to hand back on load
        token: VirtualToken,
    },
}

impl ResolveOutcome {
    /// Whether the host should fall through to default resolution
    pub fn is_pass_through(&self) -> bool {
        matches!(self, ResolveOutcome::PassThrough)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_resolve_dir_is_detached() {
        assert_eq!(ImportSite::from_resolve_dir(""), ImportSite::Detached);
        assert_eq!(ImportSite::Detached.resolve_dir(), None);

        let site = ImportSite::from_resolve_dir("/project/src");
        assert_eq!(site.resolve_dir(), Some(Path::new("/project/src")));
    }

    #[test]
    fn test_request_defaults_to_import_statement() {
        let request = ResolveRequest::new("node:path", "/project", Platform::Node);
        assert_eq!(request.kind, ImportKind::ImportStatement);
        let request = request.with_kind(ImportKind::RequireCall);
        assert_eq!(request.kind, ImportKind::RequireCall);
        assert!(request.substituted.is_empty());
    }

    #[test]
    fn test_request_without_platform() {
        let request = ResolveRequest::new("node:path", "/project", None);
        assert_eq!(request.platform, None);
        let request = ResolveRequest::new("node:path", "/project", Platform::Neutral);
        assert_eq!(request.platform, Some(Platform::Neutral));
    }

    #[test]
    fn test_token_plugin_data_shape() {
        let token = VirtualToken {
            name: "node:path".into(),
            resolve_dir: PathBuf::from("/project"),
        };
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "node:path", "resolveDir": "/project" }));
    }
}
