use crate::error::{P2SiteError, Result};
use crate::publisher::launcher::PublisherLauncher;
use crate::repository::{DEFAULT_CATEGORY, DEFAULT_CATEGORY_FILE};
use log::debug;
use std::fs;
use std::path::PathBuf;

/// Merges a category definition into a published repository.
pub struct CategoryPublisher<'a> {
    launcher: &'a PublisherLauncher,
    repository: PathBuf,
    category_file: Option<PathBuf>,
    additional_args: Vec<String>,
}

impl<'a> CategoryPublisher<'a> {
    pub fn new(
        launcher: &'a PublisherLauncher,
        repository: PathBuf,
        category_file: Option<PathBuf>,
        additional_args: Vec<String>,
    ) -> Self {
        Self {
            launcher,
            repository,
            category_file,
            additional_args,
        }
    }

    /// The configured definition, or the built-in one written into the repository.
    pub fn prepare_definition(&self) -> Result<PathBuf> {
        if let Some(file) = &self.category_file {
            if !file.is_file() {
                return Err(P2SiteError::Publishing(format!(
                    "Category file {} does not exist",
                    file.display()
                )));
            }
            return Ok(file.clone());
        }

        let target = self.repository.join(DEFAULT_CATEGORY_FILE);
        debug!("Installing default category definition at {}", target.display());
        fs::write(&target, DEFAULT_CATEGORY).map_err(|e| {
            P2SiteError::Publishing(format!("Cannot write {}: {e}", target.display()))
        })?;
        Ok(target)
    }

    pub fn arguments(&self, definition: &std::path::Path) -> Vec<String> {
        let mut args = vec![
            "category".to_string(),
            "--metadata-repository".to_string(),
            self.repository.display().to_string(),
            "--category-definition".to_string(),
            definition.display().to_string(),
        ];
        args.extend(self.additional_args.iter().cloned());
        args
    }

    pub fn execute(&self) -> Result<()> {
        let definition = self.prepare_definition()?;
        self.launcher.launch(&self.arguments(&definition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::cancellation::CancellationToken;
    use tempfile::TempDir;

    fn launcher() -> PublisherLauncher {
        PublisherLauncher::new(PathBuf::from("p2site-publisher"), 0, CancellationToken::new())
    }

    #[test]
    fn default_definition_is_installed() {
        let temp_dir = TempDir::new().unwrap();
        let launcher = launcher();
        let publisher = CategoryPublisher::new(&launcher, temp_dir.path().to_path_buf(), None, Vec::new());

        let definition = publisher.prepare_definition().unwrap();
        assert_eq!(definition, temp_dir.path().join("category.toml"));
        assert_eq!(fs::read_to_string(&definition).unwrap(), DEFAULT_CATEGORY);

        let args = publisher.arguments(&definition);
        assert_eq!(args[0], "category");
        assert_eq!(args[1], "--metadata-repository");
        assert_eq!(args[3], "--category-definition");
    }

    #[test]
    fn configured_definition_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let launcher = launcher();
        let missing = temp_dir.path().join("missing.toml");
        let publisher = CategoryPublisher::new(
            &launcher,
            temp_dir.path().to_path_buf(),
            Some(missing),
            Vec::new(),
        );
        assert!(matches!(
            publisher.prepare_definition(),
            Err(P2SiteError::Publishing(_))
        ));
        assert!(!temp_dir.path().join("category.toml").exists());
    }
}
