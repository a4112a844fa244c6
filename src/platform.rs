// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Build target platforms

use crate::error::TransformError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform a build targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Browser bundles
    Browser,
    /// Node.js bundles
    Node,
    /// No platform-specific defaults
    Neutral,
}

impl Platform {
    /// All platforms, in declaration order
    pub const ALL: [Platform; 3] = [Platform::Browser, Platform::Node, Platform::Neutral];

    /// Lowercase platform name
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Browser => "browser",
            Platform::Node => "node",
            Platform::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "browser" => Ok(Platform::Browser),
            "node" => Ok(Platform::Node),
            "neutral" => Ok(Platform::Neutral),
            other => Err(TransformError::UnknownPlatform(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_platform() {
        assert_eq!("browser".parse::<Platform>().unwrap(), Platform::Browser);
        assert_eq!("node".parse::<Platform>().unwrap(), Platform::Node);
        assert_eq!("neutral".parse::<Platform>().unwrap(), Platform::Neutral);
        assert!(matches!(
            "deno".parse::<Platform>(),
            Err(TransformError::UnknownPlatform(name)) if name == "deno"
        ));
    }

    #[test]
    fn test_platform_serde_names() {
        let json = serde_json::to_string(&Platform::Node).unwrap();
        assert_eq!(json, "\"node\"");
        for platform in Platform::ALL {
            assert_eq!(platform.to_string().parse::<Platform>().unwrap(), platform);
        }
    }
}
