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

/// Shared fixtures for building synthetic class files and jars in unit tests
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

/// Builds a minimal but well-formed class file
///
/// The class extends `java/lang/Object`. Constants are appended in call order,
/// so tests can reason about pool layout when they need to.
pub struct ClassFileBuilder {
    pool: Vec<u8>,
    next_index: u16,
    this_class: u16,
    super_class: u16,
    methods: Vec<(u16, u16)>,
}

impl ClassFileBuilder {
    pub fn new(internal_name: &str) -> Self {
        let mut builder = Self {
            pool: Vec::new(),
            next_index: 1,
            this_class: 0,
            super_class: 0,
            methods: Vec::new(),
        };
        builder.this_class = builder.add_class(internal_name);
        builder.super_class = builder.add_class("java/lang/Object");
        builder
    }

    fn add_utf8(&mut self, value: &str) -> u16 {
        self.pool.push(1);
        self.pool
            .extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.pool.extend_from_slice(value.as_bytes());
        self.bump(1)
    }

    fn add_class(&mut self, internal_name: &str) -> u16 {
        let name = self.add_utf8(internal_name);
        self.pool.push(7);
        self.pool.extend_from_slice(&name.to_be_bytes());
        self.bump(1)
    }

    fn bump(&mut self, slots: u16) -> u16 {
        let index = self.next_index;
        self.next_index += slots;
        index
    }

    pub fn class_ref(mut self, internal_name: &str) -> Self {
        self.add_class(internal_name);
        self
    }

    pub fn name_and_type(mut self, name: &str, descriptor: &str) -> Self {
        let name = self.add_utf8(name);
        let descriptor = self.add_utf8(descriptor);
        self.pool.push(12);
        self.pool.extend_from_slice(&name.to_be_bytes());
        self.pool.extend_from_slice(&descriptor.to_be_bytes());
        self.bump(1);
        self
    }

    pub fn method_type(mut self, descriptor: &str) -> Self {
        let descriptor = self.add_utf8(descriptor);
        self.pool.push(16);
        self.pool.extend_from_slice(&descriptor.to_be_bytes());
        self.bump(1);
        self
    }

    pub fn long_constant(mut self, value: i64) -> Self {
        self.pool.push(5);
        self.pool.extend_from_slice(&value.to_be_bytes());
        self.bump(2);
        self
    }

    pub fn method(mut self, name: &str, descriptor: &str) -> Self {
        let name = self.add_utf8(name);
        let descriptor = self.add_utf8(descriptor);
        self.methods.push((name, descriptor));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&52u16.to_be_bytes());
        out.extend_from_slice(&self.next_index.to_be_bytes());
        out.extend_from_slice(&self.pool);
        out.extend_from_slice(&0x0021u16.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        // interfaces, fields
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        for (name, descriptor) in &self.methods {
            out.extend_from_slice(&0x0001u16.to_be_bytes());
            out.extend_from_slice(&name.to_be_bytes());
            out.extend_from_slice(&descriptor.to_be_bytes());
            out.extend_from_slice(&0u16.to_be_bytes());
        }
        out.extend_from_slice(&0u16.to_be_bytes());
        out
    }
}

/// Creates an in-memory jar from `(entry name, contents)` pairs
pub fn jar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options: zip::write::FileOptions<'_, ()> =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);

    for (name, contents) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Writes a jar to `path`, creating parent directories
pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, jar_bytes(entries)).unwrap();
}

/// Lists entry names of a jar on disk, in archive order
pub fn jar_entry_names(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Reads one entry of a jar on disk
pub fn read_jar_entry(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut buf = Vec::new();
    std::io::Read::read_to_end(&mut entry, &mut buf).unwrap();
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_file_header() {
        let bytes = ClassFileBuilder::new("a/B").build();
        assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
        // utf8 "a/B", class, utf8 "java/lang/Object", class
        assert_eq!(u16::from_be_bytes([bytes[8], bytes[9]]), 5);
    }

    #[test]
    fn test_jar_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/x.jar");
        write_jar(&path, &[("a/B.class", b"data"), ("README", b"hi")]);
        assert_eq!(jar_entry_names(&path).len(), 2);
        assert_eq!(read_jar_entry(&path, "README"), b"hi");
    }
}
