// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{P2SiteError, Result};
use crate::models::coordinate::{Coordinate, CoordinateGlob};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of the `artifacts` list: what to resolve and how to bundle it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRequest {
    pub id: Coordinate,

    #[serde(default = "default_transitive")]
    pub transitive: bool,

    #[serde(default)]
    pub source: bool,

    #[serde(default)]
    pub excludes: Vec<CoordinateGlob>,

    #[serde(default)]
    pub instructions: Instructions,
}

fn default_transitive() -> bool {
    true
}

impl ArtifactRequest {
    pub fn new(id: Coordinate) -> Self {
        Self {
            id,
            transitive: default_transitive(),
            source: false,
            excludes: Vec::new(),
            instructions: Instructions::default(),
        }
    }

    pub fn with_transitive(mut self, transitive: bool) -> Self {
        self.transitive = transitive;
        self
    }

    pub fn with_source(mut self, source: bool) -> Self {
        self.source = source;
        self
    }

    pub fn with_excludes(mut self, excludes: Vec<CoordinateGlob>) -> Self {
        self.excludes = excludes;
        self
    }

    pub fn with_instructions(mut self, instructions: Instructions) -> Self {
        self.instructions = instructions;
        self
    }

    /// Rejects requests whose excludes would remove the root itself.
    pub fn check(&self) -> Result<()> {
        if let Some(glob) = self.excludes.iter().find(|glob| glob.matches(&self.id)) {
            return Err(P2SiteError::Validation(format!(
                "Exclude '{glob}' matches the requested artifact {} itself",
                self.id
            )));
        }
        Ok(())
    }
}

/// User overrides for the synthesized bundle manifest.
///
/// Name, version, package lists and headers apply to the requested artifact only;
/// the source flags apply to every member of the resolved set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructions {
    #[serde(default)]
    pub symbolic_name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub export_package: Option<Vec<String>>,

    #[serde(default)]
    pub import_package: Option<Vec<String>>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Nest the source jar inside the bundle instead of tracking it separately.
    #[serde(default)]
    pub embed_source: bool,

    /// Publish the source jar as its own `.source` bundle.
    #[serde(default = "default_source_bundle")]
    pub source_bundle: bool,
}

fn default_source_bundle() -> bool {
    true
}

impl Default for Instructions {
    fn default() -> Self {
        Self {
            symbolic_name: None,
            version: None,
            export_package: None,
            import_package: None,
            headers: BTreeMap::new(),
            embed_source: false,
            source_bundle: default_source_bundle(),
        }
    }
}

impl Instructions {
    /// True when any manifest-affecting override is present.
    pub fn has_overrides(&self) -> bool {
        self.symbolic_name.is_some()
            || self.version.is_some()
            || self.export_package.is_some()
            || self.import_package.is_some()
            || !self.headers.is_empty()
    }
}
