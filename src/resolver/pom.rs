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

//! The subset of the Maven project model needed to walk dependency graphs.
//!
//! Only the POM itself is consulted: parent coordinates are inherited, but parent
//! properties and imported BOMs are not. Version ranges are taken literally.

use crate::error::{P2SiteError, Result};
use crate::models::{Coordinate, CoordinateGlob};
use crate::resolver::repository::{Dependency, DependencyScope};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;

const MAX_INTERPOLATION_DEPTH: usize = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<PomParent>,
    pub properties: Option<BTreeMap<String, String>>,
    pub dependency_management: Option<DependencyManagement>,
    pub dependencies: Option<DependencyList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomParent {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DependencyManagement {
    pub dependencies: Option<DependencyList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DependencyList {
    #[serde(default)]
    pub dependency: Vec<PomDependency>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomDependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub classifier: Option<String>,
    pub scope: Option<String>,
    pub optional: Option<String>,
    pub exclusions: Option<ExclusionList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExclusionList {
    #[serde(default)]
    pub exclusion: Vec<PomExclusion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomExclusion {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
}

impl Pom {
    pub fn parse(xml: &str) -> Result<Self> {
        quick_xml::de::from_str(xml)
            .map_err(|e| P2SiteError::Resolution(format!("Invalid POM: {e}")))
    }

    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or_else(|| self.parent.as_ref()?.group_id.as_deref())
    }

    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.parent.as_ref()?.version.as_deref())
    }

    fn property(&self, name: &str) -> Option<String> {
        let parent = self.parent.as_ref();
        let value = match name {
            "project.version" | "pom.version" | "version" => self.effective_version(),
            "project.groupId" | "pom.groupId" | "groupId" => self.effective_group_id(),
            "project.artifactId" | "pom.artifactId" | "artifactId" => self.artifact_id.as_deref(),
            "project.parent.version" | "parent.version" => parent?.version.as_deref(),
            "project.parent.groupId" | "parent.groupId" => parent?.group_id.as_deref(),
            _ => self.properties.as_ref()?.get(name).map(String::as_str),
        };
        value.map(|v| v.trim().to_string())
    }

    /// Expands `${...}` placeholders; unknown placeholders are left in place.
    pub fn interpolate(&self, value: &str) -> String {
        let mut current = value.trim().to_string();

        for _ in 0..MAX_INTERPOLATION_DEPTH {
            let mut output = String::with_capacity(current.len());
            let mut rest = current.as_str();
            let mut changed = false;

            while let Some(start) = rest.find("${") {
                output.push_str(&rest[..start]);
                let after = &rest[start + 2..];
                match after.find('}') {
                    Some(end) => {
                        match self.property(&after[..end]) {
                            Some(resolved) => {
                                output.push_str(&resolved);
                                changed = true;
                            }
                            None => output.push_str(&rest[start..start + end + 3]),
                        }
                        rest = &after[end + 1..];
                    }
                    None => {
                        output.push_str(&rest[start..]);
                        rest = "";
                    }
                }
            }
            output.push_str(rest);
            current = output;

            if !changed {
                break;
            }
        }

        current
    }

    fn managed_version(&self, group_id: &str, artifact_id: &str) -> Option<String> {
        let managed = self.dependency_management.as_ref()?.dependencies.as_ref()?;
        managed
            .dependency
            .iter()
            .find(|dep| {
                dep.group_id.as_deref().map(|g| self.interpolate(g)).as_deref() == Some(group_id)
                    && dep.artifact_id.as_deref().map(|a| self.interpolate(a)).as_deref()
                        == Some(artifact_id)
            })
            .and_then(|dep| dep.version.as_deref())
            .map(|version| self.interpolate(version))
    }

    /// Direct dependencies with placeholders expanded, in declaration order.
    pub fn dependencies(&self, owner: &Coordinate) -> Result<Vec<Dependency>> {
        let Some(list) = &self.dependencies else {
            return Ok(Vec::new());
        };

        list.dependency
            .iter()
            .map(|dep| self.to_dependency(owner, dep))
            .collect()
    }

    fn to_dependency(&self, owner: &Coordinate, dep: &PomDependency) -> Result<Dependency> {
        let required = |value: Option<&str>, field: &str| {
            value.map(|v| self.interpolate(v)).ok_or_else(|| {
                P2SiteError::Resolution(format!("Dependency of {owner} is missing <{field}>"))
            })
        };

        let group_id = required(dep.group_id.as_deref(), "groupId")?;
        let artifact_id = required(dep.artifact_id.as_deref(), "artifactId")?;
        let version = match dep.version.as_deref() {
            Some(version) => self.interpolate(version),
            None => self.managed_version(&group_id, &artifact_id).ok_or_else(|| {
                P2SiteError::Resolution(format!(
                    "Dependency {group_id}:{artifact_id} of {owner} has no version"
                ))
            })?,
        };

        let (extension, mut classifier) = match dep.kind.as_deref().map(str::trim) {
            None | Some("jar") | Some("bundle") => ("jar".to_string(), None),
            Some("test-jar") => ("jar".to_string(), Some("tests".to_string())),
            Some(other) => (other.to_string(), None),
        };
        if let Some(explicit) = dep.classifier.as_deref() {
            classifier = Some(self.interpolate(explicit));
        }

        let coordinate_text = format!("{group_id}:{artifact_id}:{version}");
        if coordinate_text.contains("${") {
            return Err(P2SiteError::Resolution(format!(
                "Unresolved property in dependency {coordinate_text} of {owner}"
            )));
        }

        let coordinate = Coordinate::new(group_id, artifact_id, version)
            .with_extension(extension)
            .with_classifier(classifier);

        let exclusions = dep
            .exclusions
            .as_ref()
            .map(|list| {
                list.exclusion
                    .iter()
                    .filter_map(|exclusion| {
                        let group = exclusion.group_id.as_deref().unwrap_or("*").trim();
                        let artifact = exclusion.artifact_id.as_deref().unwrap_or("*").trim();
                        CoordinateGlob::from_str(&format!("{group}:{artifact}")).ok()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Dependency {
            coordinate,
            scope: DependencyScope::parse(dep.scope.as_deref()),
            optional: dep.optional.as_deref().map(str::trim) == Some("true"),
            exclusions,
        })
    }
}
