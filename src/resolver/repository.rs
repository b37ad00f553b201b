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

use crate::error::Result;
use crate::models::{Coordinate, CoordinateGlob};
use std::path::PathBuf;

/// Capability the resolver needs from the host's repository system.
pub trait ArtifactRepository: Send + Sync {
    /// Get a unique identifier for this repository
    fn id(&self) -> &str;

    /// Check if the repository can be queried at all; consulted once at startup
    fn is_available(&self) -> Result<bool>;

    /// Find the file for a coordinate, if any configured location has it
    fn locate(&self, coordinate: &Coordinate) -> Option<PathBuf>;

    /// Declared direct dependencies of a coordinate, in declaration order
    fn dependencies(&self, coordinate: &Coordinate) -> Result<Vec<Dependency>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependencyScope {
    #[default]
    Compile,
    Runtime,
    Provided,
    Test,
    System,
    Import,
}

impl DependencyScope {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("runtime") => DependencyScope::Runtime,
            Some("provided") => DependencyScope::Provided,
            Some("test") => DependencyScope::Test,
            Some("system") => DependencyScope::System,
            Some("import") => DependencyScope::Import,
            _ => DependencyScope::Compile,
        }
    }

    /// Scopes that end up on the runtime classpath of a consumer.
    pub fn is_transitive(self) -> bool {
        matches!(self, DependencyScope::Compile | DependencyScope::Runtime)
    }
}

/// Edge in the dependency graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub coordinate: Coordinate,
    pub scope: DependencyScope,
    pub optional: bool,
    /// Patterns pruning this dependency's own subtree.
    pub exclusions: Vec<CoordinateGlob>,
}

impl Dependency {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            scope: DependencyScope::Compile,
            optional: false,
            exclusions: Vec::new(),
        }
    }
}
