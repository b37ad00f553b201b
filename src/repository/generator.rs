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

use crate::bundler::manifest::{self, Manifest, split_clauses};
use crate::error::{P2SiteError, Result};
use crate::repository::index::{
    ARTIFACT_INDEX, ArtifactEntry, ArtifactIndex, CONTENT_INDEX, CategoryDefinition, CategoryUnit,
    INDEX_FORMAT_VERSION, InstallableUnit, MetadataIndex, PLUGINS_DIRECTORY, PackageCapability,
    UnitRef, find_index, read_index, write_index,
};
use chrono::Utc;
use glob::Pattern;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Options shared by both publishing steps
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    pub compress: bool,
    pub minify_json: bool,
    pub repository_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSummary {
    pub units: usize,
    pub content_index: PathBuf,
    pub artifact_index: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub categories: usize,
    /// Patterns that matched no unit, as `category: pattern`.
    pub unmatched: Vec<String>,
}

pub struct RepositoryGenerator {
    config: GeneratorConfig,
}

impl RepositoryGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Copies `<source>/plugins/*.jar` into `<destination>/plugins` and writes both indexes.
    pub fn publish_bundles(&self, source: &Path, destination: &Path) -> Result<PublishSummary> {
        let plugins = source.join(PLUGINS_DIRECTORY);
        if !plugins.is_dir() {
            return Err(P2SiteError::Publishing(format!(
                "Source directory {} has no {PLUGINS_DIRECTORY}/ folder",
                source.display()
            )));
        }

        let target_plugins = destination.join(PLUGINS_DIRECTORY);
        fs::create_dir_all(&target_plugins)?;

        let mut jars: Vec<PathBuf> = WalkDir::new(&plugins)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "jar"))
            .collect();
        jars.sort();

        let mut units = Vec::with_capacity(jars.len());
        let mut artifacts = Vec::with_capacity(jars.len());
        let mut identities = BTreeSet::new();

        for jar in &jars {
            let unit = read_unit(jar)?;
            if !identities.insert(unit.identity()) {
                return Err(P2SiteError::Publishing(format!(
                    "Duplicate bundle {} {} in {}",
                    unit.symbolic_name,
                    unit.version,
                    plugins.display()
                )));
            }

            let file_name = jar
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let target = target_plugins.join(&file_name);
            fs::copy(jar, &target)?;

            let bytes = fs::read(&target)?;
            artifacts.push(ArtifactEntry {
                symbolic_name: unit.symbolic_name.clone(),
                version: unit.version.clone(),
                path: format!("{PLUGINS_DIRECTORY}/{file_name}"),
                size: bytes.len() as u64,
                md5: hex::encode(md5::compute(&bytes).0),
                sha256: hex::encode(Sha256::digest(&bytes)),
            });
            self.report_progress(&format!("Published {} {}", unit.symbolic_name, unit.version));
            units.push(unit);
        }

        let updated = Utc::now().to_rfc3339();
        let content = MetadataIndex {
            version: INDEX_FORMAT_VERSION,
            updated: updated.clone(),
            name: self.config.repository_name.clone(),
            units,
            categories: Vec::new(),
        };
        let artifact_index = ArtifactIndex {
            version: INDEX_FORMAT_VERSION,
            updated,
            artifacts,
        };

        let content_index = write_index(
            destination,
            CONTENT_INDEX,
            &content,
            self.config.compress,
            self.config.minify_json,
        )?;
        let artifact_index = write_index(
            destination,
            ARTIFACT_INDEX,
            &artifact_index,
            self.config.compress,
            self.config.minify_json,
        )?;
        self.report_progress(&format!(
            "Wrote {} and {}",
            content_index.display(),
            artifact_index.display()
        ));

        Ok(PublishSummary {
            units: content.units.len(),
            content_index,
            artifact_index,
        })
    }

    /// Resolves each category's patterns against the metadata index and records the
    /// matching unit identities in it. The index keeps its existing form.
    pub fn merge_categories(&self, repository: &Path, definition_file: &Path) -> Result<CategorySummary> {
        let definition = CategoryDefinition::load(definition_file)?;
        let Some((_, compressed)) = find_index(repository, CONTENT_INDEX) else {
            return Err(P2SiteError::Publishing(format!(
                "No metadata index in {}; publish bundles first",
                repository.display()
            )));
        };
        let mut index: MetadataIndex = read_index(repository, CONTENT_INDEX)?;
        let mut unmatched = Vec::new();

        for category in &definition.categories {
            let mut members = BTreeSet::new();
            for raw in &category.members {
                let pattern = UnitPattern::parse(raw)?;
                let before = members.len();
                let mut matched_any = false;
                for unit in index.units.iter().filter(|unit| pattern.matches(unit)) {
                    matched_any = true;
                    members.insert(unit.identity());
                }
                if !matched_any {
                    log::warn!("Category '{}': pattern '{raw}' matches no bundle", category.id);
                    unmatched.push(format!("{}: {raw}", category.id));
                } else {
                    log::debug!(
                        "Category '{}': pattern '{raw}' added {} bundle(s)",
                        category.id,
                        members.len() - before
                    );
                }
            }

            let category = CategoryUnit {
                id: category.id.clone(),
                label: category.label.clone().unwrap_or_else(|| category.id.clone()),
                description: category.description.clone(),
                members: members.into_iter().collect::<Vec<UnitRef>>(),
            };
            match index.categories.iter_mut().find(|c| c.id == category.id) {
                Some(existing) => *existing = category,
                None => index.categories.push(category),
            }
        }

        index.updated = Utc::now().to_rfc3339();
        write_index(
            repository,
            CONTENT_INDEX,
            &index,
            compressed,
            self.config.minify_json,
        )?;
        self.report_progress(&format!(
            "Merged {} categor{} into {}",
            definition.categories.len(),
            if definition.categories.len() == 1 { "y" } else { "ies" },
            repository.display()
        ));

        Ok(CategorySummary {
            categories: definition.categories.len(),
            unmatched,
        })
    }

    fn report_progress(&self, message: &str) {
        println!("📦 {message}");
    }
}

/// `name-glob[:version-glob]`
struct UnitPattern {
    name: Pattern,
    version: Option<Pattern>,
}

impl UnitPattern {
    fn parse(raw: &str) -> Result<Self> {
        let compile = |value: &str| {
            Pattern::new(value.trim()).map_err(|e| {
                P2SiteError::Publishing(format!("Invalid category pattern '{raw}': {e}"))
            })
        };
        let (name, version) = match raw.split_once(':') {
            Some((name, version)) => (compile(name)?, Some(compile(version)?)),
            None => (compile(raw)?, None),
        };
        Ok(Self { name, version })
    }

    fn matches(&self, unit: &InstallableUnit) -> bool {
        self.name.matches(&unit.symbolic_name)
            && self
                .version
                .as_ref()
                .is_none_or(|version| version.matches(&unit.version))
    }
}

fn read_unit(jar: &Path) -> Result<InstallableUnit> {
    let not_a_bundle = |reason: String| {
        P2SiteError::Publishing(format!("{} is not a bundle: {reason}", jar.display()))
    };

    let mut archive = ZipArchive::new(File::open(jar)?).map_err(|e| not_a_bundle(e.to_string()))?;
    let mut raw = Vec::new();
    archive
        .by_name(manifest::MANIFEST_PATH)
        .map_err(|_| not_a_bundle("no manifest".to_string()))?
        .read_to_end(&mut raw)?;
    let manifest = Manifest::parse(&raw)?;

    let symbolic_name = manifest
        .symbolic_name()
        .ok_or_else(|| not_a_bundle("no Bundle-SymbolicName".to_string()))?
        .to_string();
    let version = manifest
        .get(manifest::BUNDLE_VERSION)
        .unwrap_or("0.0.0")
        .trim()
        .to_string();

    let provided_packages = manifest
        .get(manifest::EXPORT_PACKAGE)
        .map(|value| exported_packages(value, &version))
        .unwrap_or_default();
    let required_packages = manifest
        .get(manifest::IMPORT_PACKAGE)
        .map(manifest::package_names)
        .unwrap_or_default();
    let source_of = manifest
        .get(manifest::ECLIPSE_SOURCE_BUNDLE)
        .and_then(|value| value.split(';').next())
        .map(|name| name.trim().to_string());

    Ok(InstallableUnit {
        symbolic_name,
        version,
        name: manifest.get(manifest::BUNDLE_NAME).map(str::to_string),
        provided_packages,
        required_packages,
        source_of,
    })
}

/// Exported packages with their `version` attribute, or the bundle version if absent.
fn exported_packages(value: &str, bundle_version: &str) -> Vec<PackageCapability> {
    let mut capabilities = Vec::new();
    for clause in split_clauses(value) {
        let parts: Vec<&str> = clause.split(';').map(str::trim).collect();
        let version = parts
            .iter()
            .filter_map(|part| part.strip_prefix("version="))
            .map(|v| v.trim_matches('"').to_string())
            .next()
            .unwrap_or_else(|| bundle_version.to_string());
        for name in parts.iter().take_while(|part| !part.contains('=')) {
            capabilities.push(PackageCapability {
                name: name.to_string(),
                version: version.clone(),
            });
        }
    }
    capabilities
}
