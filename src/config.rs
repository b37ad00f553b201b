use crate::error::{P2SiteError, Result};
use crate::models::ArtifactRequest;
use crate::resolver::LocalRepository;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "p2site.toml";
const ENV_PREFIX: &str = "P2SITE";
const DEFAULT_BUILD_DIRECTORY: &str = "target";
const DEFAULT_WORKERS: usize = 4;
const STAGING_DIRECTORY: &str = "source";
const REPOSITORY_DIRECTORY: &str = "repository";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub artifacts: Vec<ArtifactRequest>,

    #[serde(default = "default_build_directory")]
    pub build_directory: PathBuf,

    #[serde(default)]
    pub destination_directory: Option<PathBuf>,

    #[serde(default)]
    pub category_file: Option<PathBuf>,

    #[serde(default = "default_compress_site")]
    pub compress_site: bool,

    #[serde(default)]
    pub pedantic: bool,

    /// Publisher deadline in seconds; 0 waits forever.
    #[serde(default)]
    pub timeout_secs: u64,

    /// Whitespace-separated arguments appended to every publisher invocation.
    #[serde(default)]
    pub additional_args: String,

    #[serde(default)]
    pub publisher_program: Option<PathBuf>,

    #[serde(default)]
    pub repositories: Vec<PathBuf>,

    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_build_directory() -> PathBuf {
    PathBuf::from(DEFAULT_BUILD_DIRECTORY)
}

fn default_compress_site() -> bool {
    true
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl SiteConfig {
    /// Loads `path`, then applies `P2SITE_*` environment overrides
    /// (`P2SITE_TIMEOUT_SECS=30`, `P2SITE_REPOSITORIES="/a /b"`).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(P2SiteError::Config(format!(
                "Configuration file {} not found",
                path.display()
            )));
        }
        log::debug!("Loading configuration from {}", path.display());
        Self::build(File::from(path).format(FileFormat::Toml))
    }

    /// Same as [`SiteConfig::load`] with the TOML given inline.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Self::build(File::from_str(contents, FileFormat::Toml))
    }

    fn build<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(" ")
                    .with_list_parse_key("repositories"),
            )
            .build()?;

        let config = settings.try_deserialize::<SiteConfig>()?.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Empty strings in optional paths mean "not set".
    fn normalized(mut self) -> Self {
        let non_empty = |path: Option<PathBuf>| path.filter(|p| !p.as_os_str().is_empty());
        self.destination_directory = non_empty(self.destination_directory);
        self.category_file = non_empty(self.category_file);
        self.publisher_program = non_empty(self.publisher_program);
        self.repositories.retain(|p| !p.as_os_str().is_empty());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.artifacts.is_empty() {
            return Err(P2SiteError::Config(
                "'artifacts' must list at least one artifact".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(P2SiteError::Config("'workers' must be at least 1".to_string()));
        }
        for artifact in &self.artifacts {
            artifact.check()?;
        }

        let staging = self.staging_directory();
        let destination = self.destination_directory();
        if destination.starts_with(&staging) || staging.starts_with(&destination) {
            return Err(P2SiteError::Config(format!(
                "'destination_directory' ({}) must not overlap the staging directory ({})",
                destination.display(),
                staging.display()
            )));
        }
        Ok(())
    }

    /// `<build>/source`, wiped at the start and end of every run.
    pub fn staging_directory(&self) -> PathBuf {
        self.build_directory.join(STAGING_DIRECTORY)
    }

    pub fn destination_directory(&self) -> PathBuf {
        self.destination_directory
            .clone()
            .unwrap_or_else(|| self.build_directory.join(REPOSITORY_DIRECTORY))
    }

    pub fn additional_args(&self) -> Vec<String> {
        self.additional_args
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Configured roots, or `~/.m2/repository` when none are given.
    pub fn repository_roots(&self) -> Vec<PathBuf> {
        if !self.repositories.is_empty() {
            return self.repositories.clone();
        }
        LocalRepository::default_root().into_iter().collect()
    }
}
