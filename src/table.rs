// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Rule table: validated, insertion-ordered, looked up by exact key

use crate::error::{Result, TransformError};
use crate::platform::Platform;
use crate::rule::{RuleSpec, TransformRule};
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use tracing::debug;

/// Immutable set of transform rules for one build
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<TransformRule>,
    index: FxHashMap<String, usize>,
}

impl RuleTable {
    /// Start building a table
    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder::default()
    }

    /// Validate `(specifier, rule)` entries into a table
    pub fn from_specs<I, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, RuleSpec)>,
        K: Into<String>,
    {
        let mut builder = Self::builder();
        for (key, spec) in entries {
            builder.insert(TransformRule::from_spec(key, spec)?)?;
        }
        builder.build()
    }

    /// Parse a JSON mapping of specifier to rule
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: OrderedEntries = serde_json::from_str(json)?;
        Self::from_specs(entries.0)
    }

    /// Parse an already-decoded JSON mapping
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let entries: OrderedEntries = serde_json::from_value(value)?;
        Self::from_specs(entries.0)
    }

    /// Look up the rule for an exact specifier
    pub fn get(&self, specifier: &str) -> Option<&TransformRule> {
        self.index.get(specifier).map(|&i| &self.rules[i])
    }

    /// Whether a rule is registered for `specifier`
    pub fn contains(&self, specifier: &str) -> bool {
        self.index.contains_key(specifier)
    }

    /// Rules in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TransformRule> {
        self.rules.iter()
    }

    /// Anchored hook filters, one per rule, in registration order
    pub fn filters(&self) -> impl Iterator<Item = &Regex> {
        self.rules.iter().map(TransformRule::filter)
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a TransformRule;
    type IntoIter = std::slice::Iter<'a, TransformRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Accumulates rules, rejecting duplicates as they arrive
#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    rules: Vec<TransformRule>,
    index: FxHashMap<String, usize>,
}

impl RuleTableBuilder {
    /// Register a rule
    pub fn insert(&mut self, rule: TransformRule) -> Result<&mut Self> {
        if self.index.contains_key(rule.key()) {
            return Err(TransformError::DuplicateRule(rule.key().to_string()));
        }
        self.index.insert(rule.key().to_string(), self.rules.len());
        self.rules.push(rule);
        Ok(self)
    }

    /// Register a rule from its configuration form
    pub fn rule(&mut self, key: impl Into<String>, spec: impl Into<RuleSpec>) -> Result<&mut Self> {
        self.insert(TransformRule::from_spec(key, spec.into())?)
    }

    /// Finish the table, checking substitution chains
    pub fn build(self) -> Result<RuleTable> {
        let table = RuleTable {
            rules: self.rules,
            index: self.index,
        };
        check_cycles(&table)?;
        debug!("Registered {} import transform(s)", table.len());
        Ok(table)
    }
}

/// Reject substitution chains that return to their start on some platform.
///
/// A chain only continues through rules whose platform gates can all be
/// active in the same build.
fn check_cycles(table: &RuleTable) -> Result<()> {
    for start in table.iter() {
        let Some(mut target) = start.target() else {
            continue;
        };
        let mut gate: Option<Platform> = start.platform();
        let mut chain = vec![start.key()];

        while let Some(next) = table.get(target) {
            let Some(next_target) = next.target() else {
                break;
            };
            match (gate, next.platform()) {
                (Some(a), Some(b)) if a != b => break,
                (None, b) => gate = b,
                _ => {}
            }
            if let Some(pos) = chain.iter().position(|key| *key == next.key()) {
                let mut cycle: Vec<String> = chain[pos..].iter().map(|k| k.to_string()).collect();
                cycle.push(next.key().to_string());
                return Err(TransformError::SubstitutionCycle(cycle));
            }
            chain.push(next.key());
            target = next_target;
        }
    }
    Ok(())
}

/// JSON object entries in document order, duplicates kept
struct OrderedEntries(Vec<(String, RuleSpec)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of specifier to transform")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, RuleSpec>()? {
                    entries.push(entry);
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl<'de> Deserialize<'de> for RuleTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = OrderedEntries::deserialize(deserializer)?;
        RuleTable::from_specs(entries.0).map_err(de::Error::custom)
    }
}
