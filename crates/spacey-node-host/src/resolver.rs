// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module path resolution (Node.js algorithm)

use serde::Deserialize;
use spacey_import_transform::{HostResolution, Platform, Result, TransformError};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Node.js built-in module names
pub const BUILTIN_MODULES: &[&str] = &[
    "assert",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "https",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Extensions tried for extensionless specifiers, in order
pub const RESOLVE_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs", ".json",
];

/// Disk-backed resolver for one target platform
#[derive(Debug, Clone)]
pub struct NodeResolver {
    platform: Option<Platform>,
    extensions: Vec<String>,
}

impl NodeResolver {
    /// Create a resolver for `platform`
    pub fn new(platform: impl Into<Option<Platform>>) -> Self {
        Self {
            platform: platform.into(),
            extensions: RESOLVE_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    /// Check if a specifier names a built-in module
    pub fn is_builtin(name: &str) -> bool {
        let name = name.strip_prefix("node:").unwrap_or(name);
        let name = name.split('/').next().unwrap_or(name);
        BUILTIN_MODULES.contains(&name)
    }

    /// Resolve `specifier` relative to `resolve_dir`
    pub async fn resolve(&self, specifier: &str, resolve_dir: &Path) -> Result<HostResolution> {
        if Self::is_builtin(specifier) {
            return match self.platform {
                Some(Platform::Node) => {
                    let name = specifier.strip_prefix("node:").unwrap_or(specifier);
                    Ok(HostResolution::Builtin(name.to_string()))
                }
                Some(platform) => Err(TransformError::Resolution {
                    module: specifier.to_string(),
                    reason: format!("built-in module is not available on platform {platform}"),
                }),
                None => Err(TransformError::Resolution {
                    module: specifier.to_string(),
                    reason: "built-in module is not available without a platform".to_string(),
                }),
            };
        }

        if specifier.starts_with("./")
            || specifier.starts_with("../")
            || specifier.starts_with('/')
            || (cfg!(windows) && specifier.chars().nth(1) == Some(':'))
        {
            let path = self.resolve_file(&resolve_dir.join(specifier)).await?;
            return path
                .map(HostResolution::File)
                .ok_or_else(|| TransformError::module_not_found(specifier));
        }

        self.resolve_node_modules(specifier, resolve_dir).await
    }

    /// Resolve a file path, trying extensions and directory indexes
    async fn resolve_file(&self, path: &Path) -> Result<Option<PathBuf>> {
        if is_file(path).await {
            return Ok(Some(normalize(path).await));
        }

        for ext in &self.extensions {
            let mut filename = path.as_os_str().to_os_string();
            filename.push(ext);
            let with_ext = PathBuf::from(filename);
            trace!("Trying {}", with_ext.display());
            if is_file(&with_ext).await {
                return Ok(Some(normalize(&with_ext).await));
            }
        }

        if is_dir(path).await {
            return self.resolve_directory(path).await;
        }

        Ok(None)
    }

    /// Resolve a directory (package.json main or index file)
    async fn resolve_directory(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let package_json_path = dir.join("package.json");
        if is_file(&package_json_path).await {
            let content = tokio::fs::read_to_string(&package_json_path).await?;
            let pkg: PackageJson =
                serde_json::from_str(&content).map_err(|e| TransformError::Resolution {
                    module: package_json_path.display().to_string(),
                    reason: format!("invalid package.json: {e}"),
                })?;
            if let Some(main) = pkg.main {
                let main_path = dir.join(&main);
                if is_file(&main_path).await {
                    return Ok(Some(normalize(&main_path).await));
                }
                for ext in &self.extensions {
                    let mut filename = main_path.as_os_str().to_os_string();
                    filename.push(ext);
                    let with_ext = PathBuf::from(filename);
                    if is_file(&with_ext).await {
                        return Ok(Some(normalize(&with_ext).await));
                    }
                }
            }
        }

        for ext in &self.extensions {
            let index = dir.join(format!("index{}", ext));
            if is_file(&index).await {
                return Ok(Some(normalize(&index).await));
            }
        }

        Ok(None)
    }

    /// Resolve a package from the nearest node_modules
    async fn resolve_node_modules(&self, specifier: &str, resolve_dir: &Path) -> Result<HostResolution> {
        let (package_name, subpath) = parse_package_specifier(specifier);

        let mut current = Some(resolve_dir);
        while let Some(dir) = current {
            let package_dir = dir.join("node_modules").join(package_name);

            if is_dir(&package_dir).await {
                let resolved = match subpath {
                    Some(sub) => self.resolve_file(&package_dir.join(sub)).await?,
                    None => self.resolve_directory(&package_dir).await?,
                };
                if let Some(path) = resolved {
                    return Ok(HostResolution::File(path));
                }
            }

            current = dir.parent();
        }

        Err(TransformError::module_not_found(specifier))
    }
}

/// Split a bare specifier into package name and optional subpath
pub fn parse_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    if specifier.starts_with('@') {
        // @scope/name or @scope/name/subpath
        if let Some(slash_pos) = specifier[1..].find('/') {
            let after_scope = &specifier[slash_pos + 2..];
            if let Some(subpath_pos) = after_scope.find('/') {
                let name_end = slash_pos + 2 + subpath_pos;
                return (&specifier[..name_end], Some(&specifier[name_end + 1..]));
            }
        }
        (specifier, None)
    } else if let Some(slash_pos) = specifier.find('/') {
        (&specifier[..slash_pos], Some(&specifier[slash_pos + 1..]))
    } else {
        (specifier, None)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|meta| meta.is_file())
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|meta| meta.is_dir())
}

async fn normalize(path: &Path) -> PathBuf {
    tokio::fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Minimal package.json structure for resolution
#[derive(Debug, Deserialize)]
struct PackageJson {
    main: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_builtin() {
        assert!(NodeResolver::is_builtin("fs"));
        assert!(NodeResolver::is_builtin("path"));
        assert!(NodeResolver::is_builtin("node:fs"));
        assert!(NodeResolver::is_builtin("node:path/posix"));
        assert!(!NodeResolver::is_builtin("lodash"));
        assert!(!NodeResolver::is_builtin("path-browserify"));
    }

    #[test]
    fn test_parse_package_specifier() {
        assert_eq!(parse_package_specifier("lodash"), ("lodash", None));
        assert_eq!(parse_package_specifier("lodash/get"), ("lodash", Some("get")));
        assert_eq!(parse_package_specifier("@types/node"), ("@types/node", None));
        assert_eq!(
            parse_package_specifier("@babel/core/lib/index"),
            ("@babel/core", Some("lib/index"))
        );
    }

    #[tokio::test]
    async fn test_builtin_depends_on_platform() {
        let node = NodeResolver::new(Platform::Node);
        assert_eq!(
            node.resolve("node:path", Path::new("/")).await.unwrap(),
            HostResolution::Builtin("path".into())
        );

        let browser = NodeResolver::new(Platform::Browser);
        assert!(matches!(
            browser.resolve("node:path", Path::new("/")).await,
            Err(TransformError::Resolution { .. })
        ));

        let unset = NodeResolver::new(None);
        assert!(matches!(
            unset.resolve("node:path", Path::new("/")).await,
            Err(TransformError::Resolution { .. })
        ));
    }

    #[tokio::test]
    async fn test_relative_file_resolves_to_canonical_path() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("src")).await.unwrap();
        tokio::fs::write(dir.path().join("util.ts"), "export {}").await.unwrap();

        let resolver = NodeResolver::new(Platform::Browser);
        let resolved = resolver
            .resolve("../util", &dir.path().join("src"))
            .await
            .unwrap();
        let expected = dir.path().join("util.ts").canonicalize().unwrap();
        assert_eq!(resolved, HostResolution::File(expected));
    }
}
