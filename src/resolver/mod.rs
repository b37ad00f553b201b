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

//! Artifact resolution: from one coordinate plus flags to a flat set of files.

pub mod graph;
pub mod local;
pub mod pom;
pub mod repository;

pub use graph::TransitiveResolver;
pub use local::LocalRepository;
pub use repository::{ArtifactRepository, Dependency, DependencyScope};

use crate::error::Result;
use crate::models::{ArtifactRequest, Coordinate, CoordinateGlob};
use std::fmt;
use std::path::PathBuf;

/// Resolves a request into concrete artifact files.
pub trait ArtifactResolver: Send + Sync {
    fn resolve(&self, request: &ResolutionRequest) -> Result<ResolutionResult>;
}

/// Immutable description of one resolution, built once per [`ArtifactRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionRequest {
    root: Coordinate,
    resolve_source: bool,
    resolve_transitive: bool,
    excludes: Vec<CoordinateGlob>,
}

impl ResolutionRequest {
    pub fn builder(root: Coordinate) -> ResolutionRequestBuilder {
        ResolutionRequestBuilder {
            root,
            resolve_source: false,
            resolve_transitive: false,
            excludes: Vec::new(),
        }
    }

    pub fn root(&self) -> &Coordinate {
        &self.root
    }

    pub fn resolve_source(&self) -> bool {
        self.resolve_source
    }

    pub fn resolve_transitive(&self) -> bool {
        self.resolve_transitive
    }

    pub fn excludes(&self) -> &[CoordinateGlob] {
        &self.excludes
    }

    pub fn is_excluded(&self, coordinate: &Coordinate) -> bool {
        self.excludes.iter().any(|glob| glob.matches(coordinate))
    }
}

impl From<&ArtifactRequest> for ResolutionRequest {
    fn from(request: &ArtifactRequest) -> Self {
        ResolutionRequest::builder(request.id.clone())
            .resolve_source(request.source)
            .resolve_transitive(request.transitive)
            .excludes(request.excludes.clone())
            .build()
    }
}

pub struct ResolutionRequestBuilder {
    root: Coordinate,
    resolve_source: bool,
    resolve_transitive: bool,
    excludes: Vec<CoordinateGlob>,
}

impl ResolutionRequestBuilder {
    pub fn resolve_source(mut self, resolve_source: bool) -> Self {
        self.resolve_source = resolve_source;
        self
    }

    pub fn resolve_transitive(mut self, resolve_transitive: bool) -> Self {
        self.resolve_transitive = resolve_transitive;
        self
    }

    pub fn excludes(mut self, excludes: Vec<CoordinateGlob>) -> Self {
        self.excludes = excludes;
        self
    }

    pub fn build(self) -> ResolutionRequest {
        ResolutionRequest {
            root: self.root,
            resolve_source: self.resolve_source,
            resolve_transitive: self.resolve_transitive,
            excludes: self.excludes,
        }
    }
}

/// A coordinate together with the file it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedArtifact {
    pub coordinate: Coordinate,
    pub path: PathBuf,
}

/// One member of a resolution result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub artifact: LocatedArtifact,
    pub source: Option<LocatedArtifact>,
    /// True only for the coordinate that was requested.
    pub root: bool,
}

impl ResolvedArtifact {
    pub fn coordinate(&self) -> &Coordinate {
        &self.artifact.coordinate
    }
}

/// A requested source artifact that could not be found. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNotFoundWarning {
    pub artifact: Coordinate,
}

impl fmt::Display for SourceNotFoundWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to resolve source for artifact {}", self.artifact)
    }
}

/// Flattened, de-duplicated closure in first-discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
    pub artifacts: Vec<ResolvedArtifact>,
    pub warnings: Vec<SourceNotFoundWarning>,
}

impl ResolutionResult {
    pub fn coordinates(&self) -> Vec<&Coordinate> {
        self.artifacts.iter().map(ResolvedArtifact::coordinate).collect()
    }
}
