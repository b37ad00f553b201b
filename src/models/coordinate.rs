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
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_EXTENSION: &str = "jar";

/// Identity of one library artifact: `group:artifact[:extension[:classifier]]:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    group_id: String,
    artifact_id: String,
    extension: String,
    classifier: Option<String>,
    version: String,
}

impl Coordinate {
    pub fn new<S: Into<String>>(group_id: S, artifact_id: S, version: S) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            classifier: None,
            version: version.into(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn with_extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_classifier<S: Into<String>>(mut self, classifier: Option<S>) -> Self {
        self.classifier = classifier.map(|value| value.into());
        self
    }

    /// The `sources` counterpart of this artifact.
    pub fn sources(&self) -> Self {
        self.clone()
            .with_extension(DEFAULT_EXTENSION)
            .with_classifier(Some("sources"))
    }

    /// The POM describing this artifact's dependencies.
    pub fn pom(&self) -> Self {
        self.clone()
            .with_extension("pom")
            .with_classifier(None::<String>)
    }

    /// Versionless key used for nearest-wins conflict resolution.
    pub fn conflict_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.group_id,
            self.artifact_id,
            self.extension,
            self.classifier.as_deref().unwrap_or_default()
        )
    }

    /// `artifact-version[-classifier].extension`
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, classifier, self.extension
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.extension),
        }
    }

    /// Location of the file relative to a Maven2-layout repository root.
    pub fn repository_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.group_id.split('.') {
            path.push(segment);
        }
        path.push(&self.artifact_id);
        path.push(&self.version);
        path.push(self.file_name());
        path
    }
}

impl FromStr for Coordinate {
    type Err = P2SiteError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.iter().any(|part| part.trim().is_empty()) {
            return Err(P2SiteError::InvalidCoordinate(s.to_string()));
        }

        let (group_id, artifact_id, extension, classifier, version) = match parts.as_slice() {
            [g, a, v] => (*g, *a, DEFAULT_EXTENSION, None, *v),
            [g, a, e, v] => (*g, *a, *e, None, *v),
            [g, a, e, c, v] => (*g, *a, *e, Some(*c), *v),
            _ => return Err(P2SiteError::InvalidCoordinate(s.to_string())),
        };

        Ok(Coordinate::new(group_id, artifact_id, version)
            .with_extension(extension)
            .with_classifier(classifier))
    }
}

impl TryFrom<String> for Coordinate {
    type Error = P2SiteError;

    fn try_from(value: String) -> Result<Self> {
        Coordinate::from_str(&value)
    }
}

impl From<Coordinate> for String {
    fn from(value: Coordinate) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}:{}", self.extension, classifier)?;
        } else if self.extension != DEFAULT_EXTENSION {
            write!(f, ":{}", self.extension)?;
        }
        write!(f, ":{}", self.version)
    }
}

/// Exclusion pattern matched against coordinate identity.
///
/// Segments follow the coordinate layout and each one may use glob wildcards:
/// `artifact`, `group:artifact`, `group:artifact:version`,
/// `group:artifact:extension:version` or `group:artifact:extension:classifier:version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CoordinateGlob {
    raw: String,
    segments: Vec<Pattern>,
}

impl CoordinateGlob {
    pub fn matches(&self, coordinate: &Coordinate) -> bool {
        let classifier = coordinate.classifier().unwrap_or_default();
        let fields: Vec<&str> = match self.segments.len() {
            1 => vec![coordinate.artifact_id()],
            2 => vec![coordinate.group_id(), coordinate.artifact_id()],
            3 => vec![
                coordinate.group_id(),
                coordinate.artifact_id(),
                coordinate.version(),
            ],
            4 => vec![
                coordinate.group_id(),
                coordinate.artifact_id(),
                coordinate.extension(),
                coordinate.version(),
            ],
            _ => vec![
                coordinate.group_id(),
                coordinate.artifact_id(),
                coordinate.extension(),
                classifier,
                coordinate.version(),
            ],
        };

        self.segments
            .iter()
            .zip(fields)
            .all(|(pattern, field)| pattern.matches(field))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for CoordinateGlob {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for CoordinateGlob {}

impl FromStr for CoordinateGlob {
    type Err = P2SiteError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let parts: Vec<&str> = raw.split(':').collect();
        if raw.is_empty() || parts.len() > 5 || parts.iter().any(|part| part.is_empty()) {
            return Err(P2SiteError::Config(format!(
                "Invalid exclude pattern '{s}'. Expected: [group:]artifact[:version]"
            )));
        }

        let segments = parts
            .iter()
            .map(|part| {
                Pattern::new(part).map_err(|e| {
                    P2SiteError::Config(format!("Invalid exclude pattern '{s}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }
}

impl TryFrom<String> for CoordinateGlob {
    type Error = P2SiteError;

    fn try_from(value: String) -> Result<Self> {
        CoordinateGlob::from_str(&value)
    }
}

impl From<CoordinateGlob> for String {
    fn from(value: CoordinateGlob) -> Self {
        value.raw
    }
}

impl fmt::Display for CoordinateGlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn parse_three_part_coordinate() {
        let coordinate = Coordinate::from_str("org.example:lib:1.2.0").unwrap();
        assert_eq!(coordinate.group_id(), "org.example");
        assert_eq!(coordinate.artifact_id(), "lib");
        assert_eq!(coordinate.extension(), "jar");
        assert_eq!(coordinate.classifier(), None);
        assert_eq!(coordinate.version(), "1.2.0");
        assert_eq!(coordinate.to_string(), "org.example:lib:1.2.0");
    }

    #[test]
    fn parse_five_part_coordinate() {
        let coordinate = Coordinate::from_str("org.example:lib:jar:sources:1.2.0").unwrap();
        assert_eq!(coordinate.classifier(), Some("sources"));
        assert_eq!(coordinate.to_string(), "org.example:lib:jar:sources:1.2.0");
        assert_eq!(coordinate.file_name(), "lib-1.2.0-sources.jar");
    }

    #[test]
    fn parse_rejects_malformed_coordinates() {
        for input in ["", "lib", "org.example:lib", "org.example::1.0", "a:b:c:d:e:f"] {
            assert!(
                matches!(
                    Coordinate::from_str(input),
                    Err(P2SiteError::InvalidCoordinate(_))
                ),
                "expected rejection for {input:?}"
            );
        }
    }

    #[test]
    fn repository_path_uses_maven2_layout() {
        let coordinate = Coordinate::from_str("org.example:lib:1.2.0").unwrap();
        assert_eq!(
            coordinate.repository_path(),
            Path::new("org/example/lib/1.2.0/lib-1.2.0.jar")
        );
        assert_eq!(
            coordinate.pom().repository_path(),
            Path::new("org/example/lib/1.2.0/lib-1.2.0.pom")
        );
    }

    #[test]
    fn conflict_key_ignores_version() {
        let a = Coordinate::from_str("org.example:lib:1.0").unwrap();
        let b = Coordinate::from_str("org.example:lib:2.0").unwrap();
        assert_eq!(a.conflict_key(), b.conflict_key());
        assert_ne!(a.conflict_key(), a.sources().conflict_key());
    }

    #[test]
    fn glob_matches_by_segment_count() {
        let coordinate = Coordinate::from_str("org.slf4j:slf4j-api:2.0.9").unwrap();

        assert!(CoordinateGlob::from_str("slf4j-api").unwrap().matches(&coordinate));
        assert!(
            CoordinateGlob::from_str("org.slf4j:*")
                .unwrap()
                .matches(&coordinate)
        );
        assert!(
            CoordinateGlob::from_str("org.slf4j:slf4j-*:2.*")
                .unwrap()
                .matches(&coordinate)
        );
        assert!(
            !CoordinateGlob::from_str("org.slf4j:slf4j-api:1.*")
                .unwrap()
                .matches(&coordinate)
        );
        assert!(
            !CoordinateGlob::from_str("com.other:*")
                .unwrap()
                .matches(&coordinate)
        );
    }

    #[test]
    fn glob_rejects_empty_segments() {
        assert!(CoordinateGlob::from_str("org.slf4j:").is_err());
        assert!(CoordinateGlob::from_str("").is_err());
    }

    #[test]
    fn coordinate_deserializes_from_string() {
        let coordinate: Coordinate = serde_json::from_str("\"org.example:lib:1.2.0\"").unwrap();
        assert_eq!(coordinate.artifact_id(), "lib");
        assert!(serde_json::from_str::<Coordinate>("\"nope\"").is_err());
    }
}
