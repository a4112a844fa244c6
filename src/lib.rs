// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-import-transform
//!
//! Build-time import redirection for Spacey's bundling pipeline.
//!
//! A table of exact specifiers maps each one to either:
//!
//! - a replacement specifier, which the host resolves as if the importer had
//!   written it, or
//! - inline module source, served as a virtual module.
//!
//! Either kind of rule may be limited to one target [`Platform`].
//!
//! ## Quick Start
//!
//! ```rust
//! use spacey_import_transform::{
//!     ImportTransformPlugin, Platform, ResolveOutcome, ResolveRequest, TransformHooks,
//! };
//!
//! let plugin = ImportTransformPlugin::from_json_str(r#"{
//!     "node:path": { "platform": "browser", "to": "path-browserify" },
//!     "node:fs": { "text": "export default {}" }
//! }"#)?;
//!
//! let request = ResolveRequest::new("node:path", "/app/src", Platform::Browser);
//! assert!(matches!(
//!     plugin.resolve(&request),
//!     ResolveOutcome::Substitute { specifier, .. } if specifier == "path-browserify"
//! ));
//!
//! let request = ResolveRequest::new("node:path", "/app/src", Platform::Node);
//! assert!(plugin.resolve(&request).is_pass_through());
//! # Ok::<(), spacey_import_transform::TransformError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod host;
pub mod interceptor;
pub mod loader;
pub mod platform;
pub mod plugin;
pub mod request;
pub mod rule;
pub mod table;

// Re-exports
pub use error::{Result, TransformError};
pub use host::{resolve_with_host, Host, HostResolution, ResolveOptions, TransformHooks};
pub use interceptor::{ResolutionInterceptor, SubstitutionStrategy, DEFAULT_NAMESPACE};
pub use loader::{VirtualLoader, VirtualModule};
pub use platform::Platform;
pub use plugin::{ImportTransformPlugin, PluginOptions, PLUGIN_NAME};
pub use request::{ImportKind, ImportSite, ResolveOutcome, ResolveRequest, VirtualToken};
pub use rule::{RuleAction, RuleObject, RuleSpec, TransformRule};
pub use table::{RuleTable, RuleTableBuilder};
