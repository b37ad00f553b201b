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

//! Reading and writing `META-INF/MANIFEST.MF`.
//!
//! Only the main section is modelled. Per-entry sections are dropped when a
//! manifest is rewritten, which is what bundling wants anyway since they mostly
//! carry signature digests.

use crate::error::{P2SiteError, Result};

pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

pub const BUNDLE_SYMBOLIC_NAME: &str = "Bundle-SymbolicName";
pub const BUNDLE_VERSION: &str = "Bundle-Version";
pub const BUNDLE_NAME: &str = "Bundle-Name";
pub const EXPORT_PACKAGE: &str = "Export-Package";
pub const IMPORT_PACKAGE: &str = "Import-Package";
pub const BUNDLE_CLASSPATH: &str = "Bundle-ClassPath";
pub const ECLIPSE_SOURCE_BUNDLE: &str = "Eclipse-SourceBundle";

const MAX_LINE_BYTES: usize = 72;

/// Main-section attributes in insertion order. Names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    attributes: Vec<(String, String)>,
}

impl Manifest {
    pub fn new() -> Self {
        let mut manifest = Self::default();
        manifest.set("Manifest-Version", "1.0");
        manifest
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(bytes);
        let mut attributes: Vec<(String, String)> = Vec::new();

        for line in text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line)) {
            if line.is_empty() {
                if attributes.is_empty() {
                    continue;
                }
                break;
            }

            if let Some(continuation) = line.strip_prefix(' ') {
                let Some((_, value)) = attributes.last_mut() else {
                    return Err(P2SiteError::Bundling(
                        "Manifest starts with a continuation line".to_string(),
                    ));
                };
                value.push_str(continuation);
                continue;
            }

            let Some((name, value)) = line.split_once(':') else {
                return Err(P2SiteError::Bundling(format!(
                    "Malformed manifest line '{line}'"
                )));
            };
            attributes.push((
                name.trim().to_string(),
                value.strip_prefix(' ').unwrap_or(value).to_string(),
            ));
        }

        Ok(Self { attributes })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Replaces an existing attribute in place or appends a new one.
    pub fn set<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        let name = name.into();
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Symbolic name without directives (`;singleton:=true` and friends).
    pub fn symbolic_name(&self) -> Option<&str> {
        self.get(BUNDLE_SYMBOLIC_NAME)
            .map(|value| value.split(';').next().unwrap_or(value).trim())
            .filter(|name| !name.is_empty())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, value) in &self.attributes {
            write_wrapped(&mut out, &format!("{name}: {value}"));
        }
        out.extend_from_slice(b"\r\n");
        out
    }
}

/// Writes one header, breaking it into lines of at most 72 bytes. Continuation
/// lines start with a single space. Breaks never split a UTF-8 sequence.
fn write_wrapped(out: &mut Vec<u8>, line: &str) {
    let mut rest = line;
    let mut budget = MAX_LINE_BYTES;
    loop {
        if rest.len() <= budget {
            out.extend_from_slice(rest.as_bytes());
            out.extend_from_slice(b"\r\n");
            return;
        }
        let mut split = budget;
        while !rest.is_char_boundary(split) {
            split -= 1;
        }
        out.extend_from_slice(&rest.as_bytes()[..split]);
        out.extend_from_slice(b"\r\n ");
        rest = &rest[split..];
        budget = MAX_LINE_BYTES - 1;
    }
}

/// Splits a header value into clauses at commas outside double quotes.
pub fn split_clauses(value: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (index, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                clauses.push(value[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    clauses.push(value[start..].trim());
    clauses.retain(|clause| !clause.is_empty());
    clauses
}

/// Package names of an `Export-Package` or `Import-Package` value, attributes dropped.
pub fn package_names(value: &str) -> Vec<String> {
    split_clauses(value)
        .into_iter()
        .flat_map(|clause| {
            clause
                .split(';')
                .take_while(|part| !part.contains('='))
                .map(|part| part.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|name| !name.is_empty())
        .collect()
}
