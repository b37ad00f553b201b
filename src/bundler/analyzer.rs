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

use crate::bundler::classfile;
use crate::bundler::manifest::{MANIFEST_PATH, Manifest};
use crate::error::{P2SiteError, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Top-level directories that never hold packages.
const RESERVED_DIRECTORIES: [&str; 3] = ["META-INF/", "OSGI-INF/", "OSGI-OPT/"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// File entries of a jar, in archive order. Directory entries are not kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveContents {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveContents {
    pub fn new(entries: Vec<ArchiveEntry>) -> Self {
        Self { entries }
    }

    /// Reads every file entry into memory.
    pub fn read(path: &Path) -> Result<Self> {
        let not_a_jar =
            |e: zip::result::ZipError| P2SiteError::Bundling(format!("{} is not a readable jar: {e}", path.display()));

        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file).map_err(not_a_jar)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(not_a_jar)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data).map_err(|e| {
                P2SiteError::Bundling(format!(
                    "Cannot read entry '{}' of {}: {e}",
                    file.name(),
                    path.display()
                ))
            })?;
            entries.push(ArchiveEntry {
                name: file.name().to_string(),
                data,
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn manifest(&self) -> Result<Option<Manifest>> {
        self.entry(MANIFEST_PATH)
            .map(|entry| Manifest::parse(&entry.data))
            .transpose()
    }
}

/// Reads only the manifest entry of a jar.
pub fn read_manifest(path: &Path) -> Result<Option<Manifest>> {
    let not_a_jar =
        |e: zip::result::ZipError| P2SiteError::Bundling(format!("{} is not a readable jar: {e}", path.display()));

    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(not_a_jar)?;
    let mut entry = match archive.by_name(MANIFEST_PATH) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(not_a_jar(e)),
    };

    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    Manifest::parse(&data).map(Some)
}

/// Result of inspecting one archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    /// Packages contained in the archive.
    pub packages: BTreeSet<String>,
    /// Every package referenced from class files, including the archive's own.
    pub referenced: BTreeSet<String>,
    /// Referenced packages not provided by the archive or the JVM.
    pub imports: BTreeSet<String>,
    /// Nested jars, in archive order.
    pub class_path: Vec<String>,
    pub warnings: Vec<String>,
}

/// Inspects the archive's entries. Never fails; problems end up in `warnings`.
pub fn analyze(contents: &ArchiveContents) -> Analysis {
    let mut analysis = Analysis::default();
    let mut default_package_classes = 0usize;

    for entry in contents.entries() {
        let name = entry.name.as_str();

        if name.ends_with(".jar") {
            analysis.class_path.push(name.to_string());
            continue;
        }
        if RESERVED_DIRECTORIES.iter().any(|dir| name.starts_with(dir)) {
            continue;
        }

        let is_class = name.ends_with(".class");
        match name.rsplit_once('/') {
            Some((directory, _)) => {
                analysis.packages.insert(directory.replace('/', "."));
            }
            None if is_class && !is_descriptor_class(name) => default_package_classes += 1,
            None => {}
        }

        if is_class && !is_descriptor_class(name) {
            match classfile::parse(&entry.data) {
                Ok(info) => analysis.referenced.extend(info.referenced_packages),
                Err(e) => analysis
                    .warnings
                    .push(format!("Unreadable class file {name}: {e}")),
            }
        }
    }

    if default_package_classes > 0 {
        analysis.warnings.push(format!(
            "{default_package_classes} class(es) in the default package cannot be exported"
        ));
    }

    analysis.imports = analysis
        .referenced
        .iter()
        .filter(|package| !analysis.packages.contains(*package))
        .filter(|package| !is_jvm_package(package))
        .cloned()
        .collect();

    analysis
}

fn is_descriptor_class(name: &str) -> bool {
    name.ends_with("module-info.class") || name.ends_with("package-info.class")
}

fn is_jvm_package(package: &str) -> bool {
    package == "java" || package.starts_with("java.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixtures::{ClassFileBuilder, write_jar};
    use tempfile::TempDir;

    fn entry(name: &str, data: &[u8]) -> ArchiveEntry {
        ArchiveEntry {
            name: name.to_string(),
            data: data.to_vec(),
        }
    }

    fn lib_class() -> Vec<u8> {
        ClassFileBuilder::new("org/example/lib/Lib")
            .class_ref("org/example/lib/internal/Helper")
            .class_ref("org/slf4j/Logger")
            .method("format", "(Ljava/time/Instant;)Ljava/lang/String;")
            .build()
    }

    #[test]
    fn packages_exclude_reserved_and_default() {
        let contents = ArchiveContents::new(vec![
            entry("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
            entry("META-INF/maven/pom.xml", b"<project/>"),
            entry("OSGI-OPT/src/Lib.java", b""),
            entry("org/example/lib/Lib.class", &lib_class()),
            entry("org/example/lib/messages.properties", b"a=b"),
            entry("org/example/lib/internal/Helper.class", &ClassFileBuilder::new("org/example/lib/internal/Helper").build()),
            entry("templates/page.html", b"<html/>"),
            entry("module-info.class", b"ignored"),
        ]);

        let analysis = analyze(&contents);
        let packages: Vec<_> = analysis.packages.iter().map(String::as_str).collect();
        assert_eq!(packages, vec!["org.example.lib", "org.example.lib.internal", "templates"]);
        assert!(analysis.warnings.is_empty(), "{:?}", analysis.warnings);
    }

    #[test]
    fn imports_are_external_non_jvm_references() {
        let contents = ArchiveContents::new(vec![
            entry("org/example/lib/Lib.class", &lib_class()),
            entry("org/example/lib/internal/Helper.class", &ClassFileBuilder::new("org/example/lib/internal/Helper").build()),
        ]);

        let analysis = analyze(&contents);
        let imports: Vec<_> = analysis.imports.iter().map(String::as_str).collect();
        assert_eq!(imports, vec!["org.slf4j"]);
        assert!(analysis.referenced.contains("java.time"));
    }

    #[test]
    fn nested_jars_become_class_path() {
        let contents = ArchiveContents::new(vec![
            entry("lib/dep-a.jar", b"PK"),
            entry("org/example/A.class", &ClassFileBuilder::new("org/example/A").build()),
            entry("lib/dep-b.jar", b"PK"),
        ]);

        let analysis = analyze(&contents);
        assert_eq!(analysis.class_path, vec!["lib/dep-a.jar", "lib/dep-b.jar"]);
        assert!(!analysis.packages.contains("lib"));
    }

    #[test]
    fn broken_and_default_package_classes_warn() {
        let contents = ArchiveContents::new(vec![
            entry("Main.class", &ClassFileBuilder::new("Main").build()),
            entry("org/example/Broken.class", b"not a class"),
        ]);

        let analysis = analyze(&contents);
        assert_eq!(analysis.warnings.len(), 2);
        assert!(analysis.warnings.iter().any(|w| w.contains("org/example/Broken.class")));
        assert!(analysis.warnings.iter().any(|w| w.contains("default package")));
        assert!(analysis.packages.contains("org.example"));
    }

    #[test]
    fn analysis_is_deterministic() {
        let contents = ArchiveContents::new(vec![
            entry("org/example/lib/Lib.class", &lib_class()),
            entry("b/B.class", &ClassFileBuilder::new("b/B").build()),
        ]);
        assert_eq!(analyze(&contents), analyze(&contents));
    }

    #[test]
    fn read_skips_directories_and_rejects_non_archives() {
        let temp_dir = TempDir::new().unwrap();
        let jar = temp_dir.path().join("lib.jar");
        write_jar(&jar, &[("org/example/lib/Lib.class", &lib_class())]);

        let contents = ArchiveContents::read(&jar).unwrap();
        assert_eq!(contents.entries().len(), 1);
        assert!(contents.manifest().unwrap().is_none());

        let bogus = temp_dir.path().join("bogus.jar");
        std::fs::write(&bogus, b"plain text").unwrap();
        assert!(matches!(
            ArchiveContents::read(&bogus),
            Err(P2SiteError::Bundling(_))
        ));
    }

    #[test]
    fn read_manifest_only() {
        let temp_dir = TempDir::new().unwrap();
        let plain = temp_dir.path().join("plain.jar");
        write_jar(&plain, &[("org/example/lib/Lib.class", &lib_class())]);
        assert!(read_manifest(&plain).unwrap().is_none());

        let bundle = temp_dir.path().join("bundle.jar");
        write_jar(
            &bundle,
            &[(
                MANIFEST_PATH,
                b"Manifest-Version: 1.0\r\nBundle-SymbolicName: org.example.lib\r\n\r\n".as_slice(),
            )],
        );
        let manifest = read_manifest(&bundle).unwrap().unwrap();
        assert_eq!(manifest.symbolic_name(), Some("org.example.lib"));
    }
}
