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
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

pub const INDEX_FORMAT_VERSION: u32 = 1;
pub const CONTENT_INDEX: &str = "content";
pub const ARTIFACT_INDEX: &str = "artifacts";
pub const PLUGINS_DIRECTORY: &str = "plugins";

/// Capability description of every module in a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataIndex {
    pub version: u32,
    pub updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub units: Vec<InstallableUnit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryUnit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallableUnit {
    pub symbolic_name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub provided_packages: Vec<PackageCapability>,
    #[serde(default)]
    pub required_packages: Vec<String>,
    /// Symbolic name of the bundle this one carries sources for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_of: Option<String>,
}

impl InstallableUnit {
    pub fn identity(&self) -> UnitRef {
        UnitRef {
            symbolic_name: self.symbolic_name.clone(),
            version: self.version.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCapability {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitRef {
    pub symbolic_name: String,
    pub version: String,
}

/// A category as recorded in the metadata index, with resolved members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryUnit {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub members: Vec<UnitRef>,
}

/// Physical location and checksums of every module file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactIndex {
    pub version: u32,
    pub updated: String,
    pub artifacts: Vec<ArtifactEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub symbolic_name: String,
    pub version: String,
    /// Relative to the repository root, always with `/` separators.
    pub path: String,
    pub size: u64,
    pub md5: String,
    pub sha256: String,
}

/// User-facing category file (`category.toml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    #[serde(default, rename = "category")]
    pub categories: Vec<CategorySpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// `symbolic-name-glob[:version-glob]` patterns.
    pub members: Vec<String>,
}

impl CategoryDefinition {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            P2SiteError::Publishing(format!(
                "Cannot read category definition {}: {e}",
                path.display()
            ))
        })?;
        let definition: CategoryDefinition = toml::from_str(&contents)?;
        if definition.categories.is_empty() {
            return Err(P2SiteError::Publishing(format!(
                "Category definition {} declares no categories",
                path.display()
            )));
        }
        Ok(definition)
    }
}

/// Location of an index in `directory`, whichever form exists.
pub fn find_index(directory: &Path, base_name: &str) -> Option<(PathBuf, bool)> {
    let compressed = directory.join(format!("{base_name}.jar"));
    if compressed.is_file() {
        return Some((compressed, true));
    }
    let plain = directory.join(format!("{base_name}.json"));
    plain.is_file().then_some((plain, false))
}

/// Writes `<base>.json`, or `<base>.jar` holding a single `<base>.json` entry.
/// The other form is removed so that readers never see a stale copy.
pub fn write_index<T: Serialize>(
    directory: &Path,
    base_name: &str,
    value: &T,
    compress: bool,
    minify: bool,
) -> Result<PathBuf> {
    let json = if minify {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    let entry_name = format!("{base_name}.json");
    let plain = directory.join(&entry_name);
    let compressed = directory.join(format!("{base_name}.jar"));

    let (written, stale) = if compress {
        let mut zip = zip::ZipWriter::new(File::create(&compressed)?);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        zip.start_file(entry_name.as_str(), options)?;
        zip.write_all(json.as_bytes())?;
        zip.finish()?;
        (compressed, plain)
    } else {
        fs::write(&plain, &json)?;
        (plain, compressed)
    };

    if stale.exists() {
        fs::remove_file(&stale)?;
    }
    Ok(written)
}

pub fn read_index<T: DeserializeOwned>(directory: &Path, base_name: &str) -> Result<T> {
    let Some((path, compressed)) = find_index(directory, base_name) else {
        return Err(P2SiteError::NotFound(format!(
            "No {base_name} index in {}",
            directory.display()
        )));
    };

    let json = if compressed {
        let mut archive = ZipArchive::new(File::open(&path)?)?;
        let mut entry = archive.by_name(&format!("{base_name}.json"))?;
        let mut json = String::new();
        entry.read_to_string(&mut json)?;
        json
    } else {
        fs::read_to_string(&path)?
    };

    Ok(serde_json::from_str(&json)?)
}
