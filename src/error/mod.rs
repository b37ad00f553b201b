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

mod context;
mod exit_codes;
mod format;

pub use context::ErrorContext;
pub use exit_codes::get_exit_code;
pub use format::{format_error_chain, format_error_with_color};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum P2SiteError {
    #[error("Failed to resolve artifact: {0}")]
    Resolution(String),

    #[error("Invalid bundle request: {0}")]
    Validation(String),

    #[error("Failed to bundle artifact: {0}")]
    Bundling(String),

    #[error("Failed to publish repository: {0}")]
    Publishing(String),

    #[error("Invalid coordinate '{0}'")]
    InvalidCoordinate(String),

    #[error("Invalid version format: {0}")]
    InvalidVersionFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Interrupted: {0}")]
    Interrupted(String),

    #[error("Worker thread panicked: {0}")]
    ThreadPanic(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

impl From<config::ConfigError> for P2SiteError {
    fn from(err: config::ConfigError) -> Self {
        P2SiteError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, P2SiteError>;
