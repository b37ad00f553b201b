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

/// Shared test fixtures for creating jars and Maven2-layout repositories
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Builds the bytes of a class that extends `java/lang/Object`
///
/// # Arguments
/// * `internal_name` - Slash-separated class name (e.g., "org/example/lib/Api")
/// * `references` - Other classes named in the constant pool
#[allow(dead_code)]
pub fn class_file(internal_name: &str, references: &[&str]) -> Vec<u8> {
    let mut pool = Vec::new();
    let mut next_index: u16 = 1;
    let mut add_class = |pool: &mut Vec<u8>, name: &str| -> u16 {
        pool.push(1);
        pool.extend_from_slice(&(name.len() as u16).to_be_bytes());
        pool.extend_from_slice(name.as_bytes());
        let utf8 = next_index;
        pool.push(7);
        pool.extend_from_slice(&utf8.to_be_bytes());
        next_index += 2;
        utf8 + 1
    };

    let this_class = add_class(&mut pool, internal_name);
    let super_class = add_class(&mut pool, "java/lang/Object");
    for reference in references {
        add_class(&mut pool, reference);
    }

    let mut out = Vec::new();
    out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&52u16.to_be_bytes());
    out.extend_from_slice(&next_index.to_be_bytes());
    out.extend_from_slice(&pool);
    out.extend_from_slice(&0x0021u16.to_be_bytes());
    out.extend_from_slice(&this_class.to_be_bytes());
    out.extend_from_slice(&super_class.to_be_bytes());
    // interfaces, fields, methods, attributes
    for _ in 0..4 {
        out.extend_from_slice(&0u16.to_be_bytes());
    }
    out
}

/// Creates jar bytes from `(entry name, contents)` pairs
#[allow(dead_code)]
pub fn jar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Writes a jar to `path`, creating parent directories
#[allow(dead_code)]
pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, jar_bytes(entries)).unwrap();
}

/// Reads one entry of a jar on disk as UTF-8
#[allow(dead_code)]
pub fn read_jar_text(path: &Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
}

#[allow(dead_code)]
pub fn jar_entry_names(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// A `<dependency>` element for [`MavenArtifact::with_dependency`]
#[allow(dead_code)]
pub struct PomDependency {
    pub coordinate: String,
    pub scope: Option<&'static str>,
    pub optional: bool,
}

/// One artifact to install into a Maven2-layout repository
#[allow(dead_code)]
pub struct MavenArtifact {
    group_id: String,
    artifact_id: String,
    version: String,
    classes: Vec<(String, Vec<u8>)>,
    dependencies: Vec<PomDependency>,
    with_sources: bool,
}

#[allow(dead_code)]
impl MavenArtifact {
    /// `coordinate` is `group:artifact:version`
    pub fn new(coordinate: &str) -> Self {
        let parts: Vec<&str> = coordinate.split(':').collect();
        assert_eq!(parts.len(), 3, "expected group:artifact:version");
        Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            version: parts[2].to_string(),
            classes: Vec::new(),
            dependencies: Vec::new(),
            with_sources: false,
        }
    }

    pub fn with_class(mut self, internal_name: &str, references: &[&str]) -> Self {
        self.classes.push((
            format!("{internal_name}.class"),
            class_file(internal_name, references),
        ));
        self
    }

    pub fn with_dependency(mut self, coordinate: &str, scope: Option<&'static str>) -> Self {
        self.dependencies.push(PomDependency {
            coordinate: coordinate.to_string(),
            scope,
            optional: false,
        });
        self
    }

    pub fn with_optional_dependency(mut self, coordinate: &str) -> Self {
        self.dependencies.push(PomDependency {
            coordinate: coordinate.to_string(),
            scope: None,
            optional: true,
        });
        self
    }

    pub fn with_sources(mut self) -> Self {
        self.with_sources = true;
        self
    }

    fn directory(&self, root: &Path) -> PathBuf {
        let mut dir = root.to_path_buf();
        for segment in self.group_id.split('.') {
            dir.push(segment);
        }
        dir.join(&self.artifact_id).join(&self.version)
    }

    /// Writes the jar, POM and (optionally) source jar under `root`
    pub fn install(&self, root: &Path) -> PathBuf {
        let dir = self.directory(root);
        fs::create_dir_all(&dir).unwrap();
        let base = format!("{}-{}", self.artifact_id, self.version);

        let entries: Vec<(&str, &[u8])> = self
            .classes
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
            .collect();
        let jar = dir.join(format!("{base}.jar"));
        write_jar(&jar, &entries);

        if self.with_sources {
            let sources: Vec<(String, Vec<u8>)> = self
                .classes
                .iter()
                .map(|(name, _)| {
                    let java = name.trim_end_matches(".class").to_string() + ".java";
                    let body = format!("// {java}\n").into_bytes();
                    (java, body)
                })
                .collect();
            let entries: Vec<(&str, &[u8])> = sources
                .iter()
                .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
                .collect();
            write_jar(&dir.join(format!("{base}-sources.jar")), &entries);
        }

        fs::write(dir.join(format!("{base}.pom")), self.pom()).unwrap();
        jar
    }

    fn pom(&self) -> String {
        let mut dependencies = String::new();
        for dependency in &self.dependencies {
            let parts: Vec<&str> = dependency.coordinate.split(':').collect();
            dependencies.push_str("    <dependency>\n");
            dependencies.push_str(&format!("      <groupId>{}</groupId>\n", parts[0]));
            dependencies.push_str(&format!("      <artifactId>{}</artifactId>\n", parts[1]));
            dependencies.push_str(&format!("      <version>{}</version>\n", parts[2]));
            if let Some(scope) = dependency.scope {
                dependencies.push_str(&format!("      <scope>{scope}</scope>\n"));
            }
            if dependency.optional {
                dependencies.push_str("      <optional>true</optional>\n");
            }
            dependencies.push_str("    </dependency>\n");
        }

        if !dependencies.is_empty() {
            dependencies = format!("  <dependencies>\n{dependencies}  </dependencies>\n");
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>{}</groupId>
  <artifactId>{}</artifactId>
  <version>{}</version>
{dependencies}</project>
"#,
            self.group_id, self.artifact_id, self.version
        )
    }
}
