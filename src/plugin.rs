// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The import-transform plugin: options plus the two hooks

use crate::error::Result;
use crate::host::TransformHooks;
use crate::interceptor::{DEFAULT_NAMESPACE, ResolutionInterceptor, SubstitutionStrategy};
use crate::loader::{VirtualLoader, VirtualModule};
use crate::request::{ResolveOutcome, ResolveRequest, VirtualToken};
use crate::table::RuleTable;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;

/// Plugin name reported to hosts
pub const PLUGIN_NAME: &str = "import-transform";

/// Plugin configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PluginOptions {
    /// Specifier to transform mapping
    pub rules: RuleTable,
    /// Namespace for virtual modules
    pub namespace: String,
    /// How substitution rules are applied
    pub strategy: SubstitutionStrategy,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            rules: RuleTable::default(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            strategy: SubstitutionStrategy::default(),
        }
    }
}

impl PluginOptions {
    /// Options with `rules` and defaults for everything else
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    /// Parse full plugin options from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Redirects matching specifiers to other specifiers or to inline modules
#[derive(Debug, Clone)]
pub struct ImportTransformPlugin {
    interceptor: ResolutionInterceptor,
    loader: VirtualLoader,
}

impl ImportTransformPlugin {
    /// Create the plugin from options
    pub fn new(options: PluginOptions) -> Self {
        let table = Arc::new(options.rules);
        Self {
            interceptor: ResolutionInterceptor::new(Arc::clone(&table))
                .with_namespace(options.namespace)
                .with_strategy(options.strategy),
            loader: VirtualLoader::new(table, options.strategy),
        }
    }

    /// Create the plugin from a JSON rule mapping, failing on invalid rules
    pub fn from_json_str(rules: &str) -> Result<Self> {
        Ok(Self::new(PluginOptions::new(RuleTable::from_json_str(rules)?)))
    }

    /// The rules this plugin applies
    pub fn rules(&self) -> &RuleTable {
        self.interceptor.table()
    }

    /// Hook filters, one per rule
    pub fn filters(&self) -> impl Iterator<Item = &Regex> {
        self.rules().filters()
    }

    /// The resolution interceptor
    pub fn interceptor(&self) -> &ResolutionInterceptor {
        &self.interceptor
    }

    /// The virtual module loader
    pub fn loader(&self) -> &VirtualLoader {
        &self.loader
    }
}

impl From<RuleTable> for ImportTransformPlugin {
    fn from(rules: RuleTable) -> Self {
        Self::new(PluginOptions::new(rules))
    }
}

impl TransformHooks for ImportTransformPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn namespace(&self) -> &str {
        self.interceptor.namespace()
    }

    fn matches(&self, specifier: &str) -> bool {
        self.filters().any(|filter| filter.is_match(specifier))
    }

    fn resolve(&self, request: &ResolveRequest) -> ResolveOutcome {
        self.interceptor.resolve(request)
    }

    fn load(&self, path: &str, token: &VirtualToken) -> Result<VirtualModule> {
        self.loader.load(path, token)
    }
}
