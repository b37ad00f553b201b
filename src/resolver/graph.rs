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
use crate::models::{Coordinate, CoordinateGlob};
use crate::resolver::repository::ArtifactRepository;
use crate::resolver::{
    ArtifactResolver, LocatedArtifact, ResolutionRequest, ResolutionResult, ResolvedArtifact,
    SourceNotFoundWarning,
};
use log::{debug, warn};
use std::collections::{HashSet, VecDeque};

/// Node waiting to have its dependencies expanded.
struct PendingNode {
    coordinate: Coordinate,
    depth: usize,
    /// Exclusions inherited from every edge on the path from the root.
    exclusions: Vec<CoordinateGlob>,
}

/// Breadth-first, nearest-wins resolver over an [`ArtifactRepository`].
pub struct TransitiveResolver<R: ArtifactRepository> {
    repository: R,
}

impl<R: ArtifactRepository> TransitiveResolver<R> {
    /// Wraps a repository after checking that it can be used at all.
    pub fn new(repository: R) -> Result<Self> {
        if !repository.is_available()? {
            return Err(P2SiteError::Resolution(format!(
                "Repository '{}' is not available",
                repository.id()
            )));
        }
        Ok(Self { repository })
    }

    fn locate(&self, coordinate: &Coordinate, required_by: Option<&Coordinate>) -> Result<LocatedArtifact> {
        let path = self.repository.locate(coordinate).ok_or_else(|| {
            let reason = match required_by {
                Some(parent) => format!(
                    "Could not find artifact {coordinate} (required by {parent}) in repository '{}'",
                    self.repository.id()
                ),
                None => format!(
                    "Could not find artifact {coordinate} in repository '{}'",
                    self.repository.id()
                ),
            };
            P2SiteError::Resolution(reason)
        })?;

        Ok(LocatedArtifact {
            coordinate: coordinate.clone(),
            path,
        })
    }

    /// Members of the closure below `root`, in first-discovery order, with the
    /// coordinate that pulled each one in.
    ///
    /// The first coordinate seen for a conflict key wins; breadth-first order makes
    /// that the one nearest to the root, ties going to declaration order. Nodes
    /// matching `request` excludes are dropped from the output but still expanded.
    fn collect_closure(&self, request: &ResolutionRequest) -> Result<Vec<(Coordinate, Coordinate)>> {
        let root = request.root();
        let mut seen: HashSet<String> = HashSet::from([root.conflict_key()]);
        let mut queue = VecDeque::from([PendingNode {
            coordinate: root.clone(),
            depth: 0,
            exclusions: Vec::new(),
        }]);
        let mut closure = Vec::new();

        while let Some(node) = queue.pop_front() {
            for dependency in self.repository.dependencies(&node.coordinate)? {
                let coordinate = dependency.coordinate;

                if !dependency.scope.is_transitive() {
                    continue;
                }
                if dependency.optional && node.depth > 0 {
                    continue;
                }
                if node.exclusions.iter().any(|glob| glob.matches(&coordinate)) {
                    continue;
                }
                if !seen.insert(coordinate.conflict_key()) {
                    continue;
                }

                if request.is_excluded(&coordinate) {
                    debug!("Excluding {coordinate} (required by {})", node.coordinate);
                } else if coordinate.extension() == "pom" {
                    debug!("Skipping pom-only dependency {coordinate}");
                } else {
                    closure.push((coordinate.clone(), node.coordinate.clone()));
                }

                let mut exclusions = node.exclusions.clone();
                exclusions.extend(dependency.exclusions);
                queue.push_back(PendingNode {
                    coordinate,
                    depth: node.depth + 1,
                    exclusions,
                });
            }
        }

        Ok(closure)
    }

    fn attach_source(
        &self,
        artifact: LocatedArtifact,
        root: bool,
        warnings: &mut Vec<SourceNotFoundWarning>,
    ) -> ResolvedArtifact {
        let source_coordinate = artifact.coordinate.sources();
        let source = self
            .repository
            .locate(&source_coordinate)
            .map(|path| LocatedArtifact {
                coordinate: source_coordinate,
                path,
            });

        if source.is_none() {
            let warning = SourceNotFoundWarning {
                artifact: artifact.coordinate.clone(),
            };
            warn!("{warning}");
            warnings.push(warning);
        }

        ResolvedArtifact {
            artifact,
            source,
            root,
        }
    }
}

impl<R: ArtifactRepository> ArtifactResolver for TransitiveResolver<R> {
    fn resolve(&self, request: &ResolutionRequest) -> Result<ResolutionResult> {
        let mut members = vec![(self.locate(request.root(), None)?, true)];

        if request.resolve_transitive() {
            for (coordinate, required_by) in self.collect_closure(request)? {
                members.push((self.locate(&coordinate, Some(&required_by))?, false));
            }
        }

        let mut result = ResolutionResult::default();
        for (artifact, root) in members {
            let resolved = if request.resolve_source() {
                self.attach_source(artifact, root, &mut result.warnings)
            } else {
                ResolvedArtifact {
                    artifact,
                    source: None,
                    root,
                }
            };
            result.artifacts.push(resolved);
        }

        Ok(result)
    }
}
