//! Maven2-layout repositories on the local filesystem.
//!
//! Each root is laid out as `group/segments/artifact/version/artifact-version[-classifier].ext`,
//! which is what `~/.m2/repository` and most repository mirrors look like on disk.

use crate::error::{P2SiteError, Result};
use crate::models::Coordinate;
use crate::resolver::pom::Pom;
use crate::resolver::repository::{ArtifactRepository, Dependency};
use std::fs;
use std::path::PathBuf;

/// Repository backed by one or more Maven2-layout directories, searched in order
pub struct LocalRepository {
    roots: Vec<PathBuf>,
}

impl LocalRepository {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// The user's local Maven repository (`~/.m2/repository`)
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".m2").join("repository"))
    }
}

impl ArtifactRepository for LocalRepository {
    fn id(&self) -> &str {
        "local"
    }

    fn is_available(&self) -> Result<bool> {
        Ok(self.roots.iter().any(|root| root.is_dir()))
    }

    fn locate(&self, coordinate: &Coordinate) -> Option<PathBuf> {
        let relative = coordinate.repository_path();
        self.roots
            .iter()
            .map(|root| root.join(&relative))
            .find(|candidate| candidate.is_file())
    }

    fn dependencies(&self, coordinate: &Coordinate) -> Result<Vec<Dependency>> {
        let Some(pom_path) = self.locate(&coordinate.pom()) else {
            log::debug!("No POM for {coordinate}, treating it as dependency-free");
            return Ok(Vec::new());
        };

        let contents = fs::read_to_string(&pom_path)?;
        let pom = Pom::parse(&contents).map_err(|e| match e {
            P2SiteError::Resolution(msg) => {
                P2SiteError::Resolution(format!("{}: {msg}", pom_path.display()))
            }
            other => other,
        })?;
        pom.dependencies(coordinate)
    }
}
