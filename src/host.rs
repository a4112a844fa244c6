// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Boundary with the host build tool
//!
//! The core exposes two hooks through [`TransformHooks`]; a host adapter
//! calls them and supplies its own resolver through [`Host`] so that
//! substitutions go back through the host's normal resolution.

use crate::error::{Result, TransformError};
use crate::loader::VirtualModule;
use crate::request::{ImportKind, ResolveOutcome, ResolveRequest, VirtualToken};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::instrument;

/// Options for a host resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Directory to resolve relative specifiers from
    pub resolve_dir: PathBuf,
    /// Kind of import
    pub kind: ImportKind,
    /// Specifiers substituted so far in this resolution, oldest first
    pub substituted: Vec<String>,
}

impl ResolveOptions {
    /// Options for an import written in `resolve_dir`
    pub fn new(resolve_dir: impl Into<PathBuf>, kind: ImportKind) -> Self {
        Self {
            resolve_dir: resolve_dir.into(),
            kind,
            substituted: Vec::new(),
        }
    }
}

/// A module location as determined by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostResolution {
    /// File on disk
    File(PathBuf),
    /// Platform built-in (e.g. `fs` on node)
    Builtin(String),
    /// Left for the runtime to provide
    External(String),
    /// Claimed by a plugin; content comes from its load hook
    Virtual {
        /// Claimed specifier
        path: String,
        /// Namespace of the claiming plugin
        namespace: String,
        /// Data for the load hook
        token: VirtualToken,
    },
}

/// The host's resolver
#[async_trait]
pub trait Host: Send + Sync {
    /// Resolve `specifier` the way an import written in `options.resolve_dir` would
    async fn resolve(&self, specifier: &str, options: ResolveOptions) -> Result<HostResolution>;
}

/// The two hooks a transform plugin offers a host
pub trait TransformHooks: Send + Sync {
    /// Plugin name
    fn name(&self) -> &str;

    /// Namespace the load hook serves
    fn namespace(&self) -> &str;

    /// Whether the resolve hook may have an opinion on `specifier`.
    ///
    /// Hosts can skip the hook when this is false.
    fn matches(&self, specifier: &str) -> bool {
        let _ = specifier;
        true
    }

    /// Resolve hook
    fn resolve(&self, request: &ResolveRequest) -> ResolveOutcome;

    /// Load hook for a module claimed by [`TransformHooks::resolve`]
    fn load(&self, path: &str, token: &VirtualToken) -> Result<VirtualModule>;
}

/// Run the resolve hook, re-resolving substitutions through `host`.
///
/// Returns `None` when the hook has no opinion and the host should continue
/// with its default resolution. The substitution chain travels with the
/// re-resolution, and a specifier that comes back around is a
/// [`TransformError::SubstitutionCycle`], even when the rules involved belong
/// to different plugins.
#[instrument(level = "debug", skip_all, fields(specifier = %request.specifier, platform = ?request.platform))]
pub async fn resolve_with_host(
    hooks: &dyn TransformHooks,
    request: &ResolveRequest,
    host: &dyn Host,
) -> Result<Option<HostResolution>> {
    match hooks.resolve(request) {
        ResolveOutcome::PassThrough => Ok(None),
        ResolveOutcome::Substitute {
            specifier,
            resolve_dir,
            kind,
        } => {
            let mut substituted = request.substituted.clone();
            substituted.push(request.specifier.clone());
            if let Some(pos) = substituted.iter().position(|seen| *seen == specifier) {
                let mut cycle = substituted.split_off(pos);
                cycle.push(specifier);
                return Err(TransformError::SubstitutionCycle(cycle));
            }
            let resolved = host
                .resolve(
                    &specifier,
                    ResolveOptions {
                        resolve_dir,
                        kind,
                        substituted,
                    },
                )
                .await?;
            Ok(Some(resolved))
        }
        ResolveOutcome::Virtual {
            path,
            namespace,
            token,
        } => Ok(Some(HostResolution::Virtual {
            path,
            namespace,
            token,
        })),
    }
}
