// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-node-host
//!
//! A build host that resolves modules the way Node.js does and runs
//! import-transform plugins ahead of its own resolution.
//!
//! Substitutions produced by a plugin are resolved through the same host,
//! so relative paths, extension lookup, `node_modules` lookup and other
//! plugins all apply to the replacement specifier.
//!
//! ```rust,ignore
//! use spacey_import_transform::{ImportTransformPlugin, Platform};
//! use spacey_node_host::NodeHost;
//!
//! let plugin = ImportTransformPlugin::from_json_str(r#"{ "node:path": "path-browserify" }"#)?;
//! let host = NodeHost::new(Platform::Browser).with_plugin(plugin);
//!
//! let entry = host.resolve_entry(Path::new("/app/src/main.ts")).await?;
//! let module = host.load(&entry).await?;
//! let path = host.resolve_import("node:path", &module).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod host;
pub mod resolver;

pub use host::{LoadedModule, NodeHost};
pub use resolver::{parse_package_specifier, NodeResolver, BUILTIN_MODULES, RESOLVE_EXTENSIONS};
