// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host that runs transform plugins ahead of Node resolution

use crate::resolver::NodeResolver;
use async_trait::async_trait;
use spacey_import_transform::{
    resolve_with_host, Host, HostResolution, ImportKind, ImportSite, Platform, ResolveOptions,
    ResolveRequest, Result, TransformError, TransformHooks,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Loaded module source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    /// Display path, `namespace:path` for virtual modules
    pub id: String,
    /// Module source
    pub contents: String,
    /// Directory the module's own imports resolve from
    pub resolve_dir: PathBuf,
}

/// Build host for one target platform, or for none
pub struct NodeHost {
    platform: Option<Platform>,
    resolver: NodeResolver,
    plugins: Vec<Arc<dyn TransformHooks>>,
    externals: Vec<String>,
}

impl NodeHost {
    /// Create a host targeting `platform`; `None` leaves platform-gated rules inert
    pub fn new(platform: impl Into<Option<Platform>>) -> Self {
        let platform = platform.into();
        Self {
            platform,
            resolver: NodeResolver::new(platform),
            plugins: Vec::new(),
            externals: Vec::new(),
        }
    }

    /// Register a plugin; plugins run in registration order
    pub fn with_plugin(mut self, plugin: impl TransformHooks + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Register a shared plugin
    pub fn with_shared_plugin(mut self, plugin: Arc<dyn TransformHooks>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Leave `specifier` unresolved for the runtime
    pub fn with_external(mut self, specifier: impl Into<String>) -> Self {
        self.externals.push(specifier.into());
        self
    }

    /// The build's target platform
    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    /// Resolve a build entry point; entries have no importing module
    pub async fn resolve_entry(&self, path: &Path) -> Result<HostResolution> {
        let specifier = path.to_string_lossy();
        self.resolve_request(ResolveRequest {
            specifier: specifier.into_owned(),
            site: ImportSite::Detached,
            kind: ImportKind::EntryPoint,
            platform: self.platform,
            substituted: Vec::new(),
        })
        .await
    }

    /// Resolve `specifier` as imported by the module at `importer`
    pub async fn resolve_import(
        &self,
        specifier: &str,
        importer: &LoadedModule,
    ) -> Result<HostResolution> {
        self.resolve(
            specifier,
            ResolveOptions::new(importer.resolve_dir.clone(), ImportKind::ImportStatement),
        )
        .await
    }

    /// Load the source of a resolved module
    pub async fn load(&self, resolution: &HostResolution) -> Result<LoadedModule> {
        match resolution {
            HostResolution::File(path) => {
                let contents = tokio::fs::read_to_string(path).await?;
                Ok(LoadedModule {
                    id: path.display().to_string(),
                    contents,
                    resolve_dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
                })
            }
            HostResolution::Virtual {
                path,
                namespace,
                token,
            } => {
                let plugin = self
                    .plugins
                    .iter()
                    .find(|plugin| plugin.namespace() == namespace)
                    .ok_or_else(|| TransformError::Resolution {
                        module: path.clone(),
                        reason: format!("no plugin serves namespace '{namespace}'"),
                    })?;
                let module = plugin.load(path, token)?;
                Ok(LoadedModule {
                    id: format!("{namespace}:{path}"),
                    contents: module.contents,
                    resolve_dir: module.resolve_dir,
                })
            }
            HostResolution::Builtin(name) | HostResolution::External(name) => {
                Err(TransformError::Resolution {
                    module: name.clone(),
                    reason: "module is provided at runtime and has no source".to_string(),
                })
            }
        }
    }

    #[instrument(level = "debug", skip(self), fields(specifier = %request.specifier))]
    async fn resolve_request(&self, request: ResolveRequest) -> Result<HostResolution> {
        for plugin in &self.plugins {
            if !plugin.matches(&request.specifier) {
                continue;
            }
            if let Some(resolved) = resolve_with_host(plugin.as_ref(), &request, self).await? {
                debug!("Plugin '{}' resolved '{}'", plugin.name(), request.specifier);
                return Ok(resolved);
            }
        }

        if self.externals.iter().any(|ext| *ext == request.specifier) {
            return Ok(HostResolution::External(request.specifier));
        }

        let resolve_dir = request
            .site
            .resolve_dir()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.resolver.resolve(&request.specifier, &resolve_dir).await
    }
}

#[async_trait]
impl Host for NodeHost {
    async fn resolve(&self, specifier: &str, options: ResolveOptions) -> Result<HostResolution> {
        self.resolve_request(ResolveRequest {
            specifier: specifier.to_string(),
            site: ImportSite::from_resolve_dir(options.resolve_dir),
            kind: options.kind,
            platform: self.platform,
            substituted: options.substituted,
        })
        .await
    }
}
