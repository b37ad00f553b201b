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

//! Turning plain library jars into bundles.

pub mod analyzer;
pub mod classfile;
pub mod manifest;
pub mod naming;

pub use analyzer::{Analysis, ArchiveContents, ArchiveEntry, analyze, read_manifest};
pub use manifest::Manifest;

use crate::error::{P2SiteError, Result};
use crate::models::{ArtifactRequest, OsgiVersion};
use crate::resolver::ResolvedArtifact;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const EMBEDDED_SOURCE_DIRECTORY: &str = "OSGI-OPT/src";
const SIGNATURE_EXTENSIONS: [&str; 4] = [".SF", ".RSA", ".DSA", ".EC"];

/// Writes bundles for one resolved artifact.
pub trait ArtifactBundler: Send + Sync {
    /// Returns the path of the main bundle written.
    fn execute(&self, request: &BundlerRequest, instructions: &BundlerInstructions) -> Result<PathBuf>;

    /// File name of the main bundle `execute` would write.
    fn output_name(&self, _request: &BundlerRequest, instructions: &BundlerInstructions) -> Result<String> {
        Ok(instructions.file_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlerRequest {
    pub binary: PathBuf,
    pub source: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl BundlerRequest {
    pub fn new(artifact: &ResolvedArtifact, output_dir: &Path) -> Self {
        Self {
            binary: artifact.artifact.path.clone(),
            source: artifact.source.as_ref().map(|source| source.path.clone()),
            output_dir: output_dir.to_path_buf(),
        }
    }
}

/// Either computed from the archive, or given verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PackagePolicy {
    #[default]
    Computed,
    Explicit(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlerInstructions {
    pub symbolic_name: String,
    pub version: OsgiVersion,
    pub name: String,
    pub exports: PackagePolicy,
    pub imports: PackagePolicy,
    pub headers: BTreeMap<String, String>,
    pub embed_source: bool,
    pub source_bundle: bool,
    /// Set when any value above came from the user rather than the coordinate.
    pub overridden: bool,
}

impl BundlerInstructions {
    /// Computed defaults for a coordinate, plus the request's overrides when the
    /// artifact is the one that was requested.
    pub fn for_artifact(request: &ArtifactRequest, artifact: &ResolvedArtifact) -> Result<Self> {
        let coordinate = artifact.coordinate();
        let user = &request.instructions;

        let mut instructions = Self {
            symbolic_name: naming::symbolic_name(coordinate),
            version: OsgiVersion::from_maven(coordinate.version()),
            name: coordinate.artifact_id().to_string(),
            exports: PackagePolicy::Computed,
            imports: PackagePolicy::Computed,
            headers: BTreeMap::new(),
            embed_source: user.embed_source,
            source_bundle: user.source_bundle,
            overridden: false,
        };

        if !artifact.root || !user.has_overrides() {
            return Ok(instructions);
        }

        if let Some(symbolic_name) = &user.symbolic_name {
            instructions.symbolic_name = symbolic_name.clone();
        }
        if let Some(version) = &user.version {
            instructions.version = OsgiVersion::from_str(version)?;
        }
        if let Some(exports) = &user.export_package {
            instructions.exports = PackagePolicy::Explicit(exports.clone());
        }
        if let Some(imports) = &user.import_package {
            instructions.imports = PackagePolicy::Explicit(imports.clone());
        }
        instructions.headers = user.headers.clone();
        instructions.overridden = true;

        Ok(instructions)
    }

    pub fn file_name(&self) -> String {
        naming::bundle_file_name(&self.symbolic_name, &self.version)
    }
}

/// Rewrites jars with a synthesized manifest.
pub struct JarBundler {
    pedantic: bool,
}

impl JarBundler {
    pub fn new(pedantic: bool) -> Self {
        Self { pedantic }
    }

    fn build_manifest(
        &self,
        instructions: &BundlerInstructions,
        analysis: &Analysis,
        embedded_source: Option<&str>,
    ) -> Result<Manifest> {
        let version = instructions.version.to_string();

        let exports: Vec<String> = match &instructions.exports {
            PackagePolicy::Computed => analysis.packages.iter().cloned().collect(),
            PackagePolicy::Explicit(packages) => {
                if let Some(missing) = packages.iter().find(|p| !analysis.packages.contains(*p)) {
                    return Err(P2SiteError::Bundling(format!(
                        "Export-Package entry '{missing}' is not a package of {}",
                        instructions.symbolic_name
                    )));
                }
                packages.clone()
            }
        };
        let imports: Vec<String> = match &instructions.imports {
            PackagePolicy::Computed => analysis.imports.iter().cloned().collect(),
            PackagePolicy::Explicit(packages) => packages.clone(),
        };

        let mut manifest = Manifest::new();
        manifest.set("Bundle-ManifestVersion", "2");
        manifest.set(manifest::BUNDLE_SYMBOLIC_NAME, &instructions.symbolic_name);
        manifest.set(manifest::BUNDLE_VERSION, &version);
        manifest.set(manifest::BUNDLE_NAME, &instructions.name);
        if !exports.is_empty() {
            let clauses: Vec<String> = exports
                .iter()
                .map(|package| format!("{package};version=\"{version}\""))
                .collect();
            manifest.set(manifest::EXPORT_PACKAGE, clauses.join(","));
        }
        if !imports.is_empty() {
            manifest.set(manifest::IMPORT_PACKAGE, imports.join(","));
        }
        let nested: Vec<&str> = analysis
            .class_path
            .iter()
            .map(String::as_str)
            .chain(embedded_source)
            .collect();
        if !nested.is_empty() {
            let mut class_path = vec!["."];
            class_path.extend(nested);
            manifest.set(manifest::BUNDLE_CLASSPATH, class_path.join(","));
        }
        for (name, value) in &instructions.headers {
            manifest.set(name, value);
        }

        Ok(manifest)
    }

    /// Bundles that already describe themselves are copied untouched.
    fn copy_existing_bundle(
        &self,
        request: &BundlerRequest,
        symbolic_name: &str,
        version: &OsgiVersion,
    ) -> Result<PathBuf> {
        let output = request
            .output_dir
            .join(naming::bundle_file_name(symbolic_name, version));

        debug!(
            "{} is already a bundle ({symbolic_name} {version}), copying as-is",
            request.binary.display()
        );
        fs::copy(&request.binary, &output).map_err(|e| write_error(&output, e))?;
        Ok(output)
    }

    fn write_source_bundle(
        &self,
        source: &Path,
        output_dir: &Path,
        symbolic_name: &str,
        version: &OsgiVersion,
        name: &str,
    ) -> Result<PathBuf> {
        let contents = ArchiveContents::read(source)?;
        let source_name = naming::source_symbolic_name(symbolic_name);

        let mut manifest = Manifest::new();
        manifest.set("Bundle-ManifestVersion", "2");
        manifest.set(manifest::BUNDLE_SYMBOLIC_NAME, &source_name);
        manifest.set(manifest::BUNDLE_VERSION, version.to_string());
        manifest.set(manifest::BUNDLE_NAME, format!("{name} Source"));
        manifest.set(
            manifest::ECLIPSE_SOURCE_BUNDLE,
            format!("{symbolic_name};version=\"{version}\";roots:=\".\""),
        );

        let output = output_dir.join(naming::bundle_file_name(&source_name, version));
        write_bundle(&output, &manifest, &contents, None)?;
        Ok(output)
    }
}

impl ArtifactBundler for JarBundler {
    fn execute(&self, request: &BundlerRequest, instructions: &BundlerInstructions) -> Result<PathBuf> {
        let contents = ArchiveContents::read(&request.binary)?;
        fs::create_dir_all(&request.output_dir).map_err(|e| write_error(&request.output_dir, e))?;

        let existing = contents.manifest().unwrap_or_else(|e| {
            debug!("Ignoring unreadable manifest in {}: {e}", request.binary.display());
            None
        });
        let embed = instructions.embed_source && request.source.is_some();

        let (symbolic_name, version, output) = match existing_identity(request, instructions, existing.as_ref()) {
            Some((name, version)) => {
                let output = self.copy_existing_bundle(request, &name, &version)?;
                (name, version, output)
            }
            None => {
                let analysis = analyze(&contents);
                if !analysis.warnings.is_empty() {
                    if self.pedantic {
                        return Err(P2SiteError::Bundling(format!(
                            "{} produced analysis warnings: {}",
                            request.binary.display(),
                            analysis.warnings.join("; ")
                        )));
                    }
                    for warning in &analysis.warnings {
                        warn!("{}: {warning}", request.binary.display());
                    }
                }

                let embedded = match (&request.source, embed) {
                    (Some(source), true) => Some((source.as_path(), embedded_entry_name(source))),
                    _ => None,
                };
                let manifest = self.build_manifest(
                    instructions,
                    &analysis,
                    embedded.as_ref().map(|(_, entry)| entry.as_str()),
                )?;
                let output = request.output_dir.join(instructions.file_name());
                write_bundle(&output, &manifest, &contents, embedded.as_ref())?;
                (
                    instructions.symbolic_name.clone(),
                    instructions.version.clone(),
                    output,
                )
            }
        };

        if let Some(source) = &request.source {
            if instructions.source_bundle && !instructions.embed_source {
                let source_output = self.write_source_bundle(
                    source,
                    &request.output_dir,
                    &symbolic_name,
                    &version,
                    &instructions.name,
                )?;
                debug!("Wrote source bundle {}", source_output.display());
            }
        }

        Ok(output)
    }

    fn output_name(&self, request: &BundlerRequest, instructions: &BundlerInstructions) -> Result<String> {
        if !copies_existing(request, instructions) {
            return Ok(instructions.file_name());
        }
        let existing = read_manifest(&request.binary).unwrap_or_else(|e| {
            debug!("Ignoring unreadable manifest in {}: {e}", request.binary.display());
            None
        });
        Ok(match existing_identity(request, instructions, existing.as_ref()) {
            Some((name, version)) => naming::bundle_file_name(&name, &version),
            None => instructions.file_name(),
        })
    }
}

/// Overrides and embedded sources force a rebuild even for existing bundles.
fn copies_existing(request: &BundlerRequest, instructions: &BundlerInstructions) -> bool {
    !instructions.overridden && !(instructions.embed_source && request.source.is_some())
}

/// Name and version of a jar that is copied as-is, if it is.
fn existing_identity(
    request: &BundlerRequest,
    instructions: &BundlerInstructions,
    existing: Option<&Manifest>,
) -> Option<(String, OsgiVersion)> {
    if !copies_existing(request, instructions) {
        return None;
    }
    let existing = existing?;
    let name = existing.symbolic_name()?.to_string();
    let version = existing
        .get(manifest::BUNDLE_VERSION)
        .map(OsgiVersion::from_maven)
        .unwrap_or_else(|| OsgiVersion::new(0, 0, 0));
    Some((name, version))
}

/// `OSGI-OPT/src/<file name>`, also listed on `Bundle-ClassPath`.
fn embedded_entry_name(source: &Path) -> String {
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sources.jar".to_string());
    format!("{EMBEDDED_SOURCE_DIRECTORY}/{file_name}")
}

fn is_signature_file(name: &str) -> bool {
    name.strip_prefix("META-INF/")
        .filter(|rest| !rest.contains('/'))
        .is_some_and(|rest| {
            let upper = rest.to_ascii_uppercase();
            SIGNATURE_EXTENSIONS.iter().any(|ext| upper.ends_with(ext))
        })
}

fn write_error(path: &Path, error: impl std::fmt::Display) -> P2SiteError {
    P2SiteError::Bundling(format!("Cannot write {}: {error}", path.display()))
}

/// Manifest first, then the original entries minus the old manifest and signatures,
/// then the embedded source jar if any.
fn write_bundle(
    output: &Path,
    manifest: &Manifest,
    contents: &ArchiveContents,
    embedded_source: Option<&(&Path, String)>,
) -> Result<()> {
    let file = File::create(output).map_err(|e| write_error(output, e))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let mut write_entry = |name: &str, data: &[u8]| -> Result<()> {
        zip.start_file(name, options).map_err(|e| write_error(output, e))?;
        zip.write_all(data).map_err(|e| write_error(output, e))
    };

    write_entry(manifest::MANIFEST_PATH, &manifest.to_bytes())?;
    for entry in contents.entries() {
        if entry.name.eq_ignore_ascii_case(manifest::MANIFEST_PATH) || is_signature_file(&entry.name) {
            continue;
        }
        write_entry(&entry.name, &entry.data)?;
    }
    if let Some((source, entry_name)) = embedded_source {
        let data = fs::read(source)?;
        write_entry(entry_name, &data)?;
    }

    zip.finish().map_err(|e| write_error(output, e))?;
    Ok(())
}
