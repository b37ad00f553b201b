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
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bundle version in `major.minor.micro[.qualifier]` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OsgiVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub qualifier: String,
}

impl OsgiVersion {
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: String::new(),
        }
    }

    pub fn with_qualifier<S: Into<String>>(mut self, qualifier: S) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    /// Converts an arbitrary Maven version into a bundle version.
    ///
    /// Up to three leading numeric components are taken, missing ones become 0, and
    /// whatever follows becomes the qualifier with illegal characters replaced by `_`.
    /// `1.2.0-SNAPSHOT` becomes `1.2.0.SNAPSHOT`, `R5` becomes `0.0.0.R5`.
    pub fn from_maven(version: &str) -> Self {
        let mut numbers = Vec::with_capacity(3);
        let mut rest = version.trim();

        while numbers.len() < 3 {
            let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits == 0 {
                break;
            }
            let Ok(value) = rest[..digits].parse::<u32>() else {
                break;
            };
            numbers.push(value);
            rest = &rest[digits..];

            let next_is_number = rest.starts_with('.')
                && rest[1..].chars().next().is_some_and(|c| c.is_ascii_digit());
            if numbers.len() < 3 && next_is_number {
                rest = &rest[1..];
            } else {
                break;
            }
        }

        let qualifier: String = rest
            .trim_start_matches(['.', '-', '_'])
            .chars()
            .map(|c| if is_qualifier_char(c) { c } else { '_' })
            .collect();

        OsgiVersion {
            major: numbers.first().copied().unwrap_or(0),
            minor: numbers.get(1).copied().unwrap_or(0),
            micro: numbers.get(2).copied().unwrap_or(0),
            qualifier,
        }
    }
}

fn is_qualifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

impl FromStr for OsgiVersion {
    type Err = P2SiteError;

    /// Strict parse; used for user-supplied overrides.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || P2SiteError::InvalidVersionFormat(s.to_string());
        let trimmed = s.trim();
        let mut parts = trimmed.splitn(4, '.');

        let mut numbers = [0u32; 3];
        for (index, slot) in numbers.iter_mut().enumerate() {
            match parts.next() {
                Some(part) => {
                    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                        return Err(invalid());
                    }
                    *slot = part.parse().map_err(|_| invalid())?;
                }
                None if index > 0 => break,
                None => return Err(invalid()),
            }
        }

        let qualifier = parts.next().unwrap_or_default();
        if parts.next().is_some() || !qualifier.chars().all(is_qualifier_char) {
            return Err(invalid());
        }
        if trimmed.ends_with('.') {
            return Err(invalid());
        }

        Ok(OsgiVersion {
            major: numbers[0],
            minor: numbers[1],
            micro: numbers[2],
            qualifier: qualifier.to_string(),
        })
    }
}

impl TryFrom<String> for OsgiVersion {
    type Error = P2SiteError;

    fn try_from(value: String) -> Result<Self> {
        OsgiVersion::from_str(&value)
    }
}

impl From<OsgiVersion> for String {
    fn from(value: OsgiVersion) -> Self {
        value.to_string()
    }
}

impl fmt::Display for OsgiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}
