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

use crate::error::P2SiteError;
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a P2SiteError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a P2SiteError) -> Self {
        let (suggestion, details) = match error {
            P2SiteError::Resolution(_) => (
                Some(
                    "Check that the coordinate exists in one of the configured repositories \
                     (see 'repositories' in p2site.toml)."
                        .to_string(),
                ),
                None,
            ),
            P2SiteError::Validation(msg) => (
                Some(
                    "Adjust the artifact's [instructions] block: when 'source = true', enable \
                     either 'embed_source' or 'source_bundle', but not both."
                        .to_string(),
                ),
                Some(format!("Rejected before bundling: {msg}")),
            ),
            P2SiteError::Bundling(_) => (
                Some(
                    "Verify the input is a valid jar and that every entry listed in \
                     'export_package' exists in it. Set 'pedantic = false' to downgrade \
                     analysis warnings."
                        .to_string(),
                ),
                None,
            ),
            P2SiteError::Publishing(msg) => {
                let suggestion = if msg.contains("timed out") {
                    "Increase 'timeout_secs' (0 waits forever).".to_string()
                } else {
                    "Ensure the publisher program is installed and the destination directory \
                     is writable. Pass '-vv' to see the publisher invocation."
                        .to_string()
                };
                (Some(suggestion), None)
            }
            P2SiteError::InvalidCoordinate(_) => (
                Some(
                    "Coordinates use the form 'group:artifact[:extension[:classifier]]:version' \
                     (e.g., 'org.example:lib:1.2.0')."
                        .to_string(),
                ),
                None,
            ),
            P2SiteError::Config(msg) => (
                Some("Check p2site.toml and any P2SITE_* environment variables.".to_string()),
                Some(msg.clone()),
            ),
            _ => (None, None),
        };

        ErrorContext {
            error,
            suggestion,
            details,
        }
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
