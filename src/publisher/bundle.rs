use crate::error::Result;
use crate::publisher::launcher::PublisherLauncher;
use std::path::PathBuf;

/// Publishes staged bundles as a repository with metadata and artifact indexes.
pub struct BundlePublisher<'a> {
    launcher: &'a PublisherLauncher,
    source: PathBuf,
    destination: PathBuf,
    compress: bool,
    additional_args: Vec<String>,
}

impl<'a> BundlePublisher<'a> {
    pub fn new(
        launcher: &'a PublisherLauncher,
        source: PathBuf,
        destination: PathBuf,
        compress: bool,
        additional_args: Vec<String>,
    ) -> Self {
        Self {
            launcher,
            source,
            destination,
            compress,
            additional_args,
        }
    }

    pub fn arguments(&self) -> Vec<String> {
        let mut args = vec![
            "bundles".to_string(),
            "--source".to_string(),
            self.source.display().to_string(),
            "--destination".to_string(),
            self.destination.display().to_string(),
        ];
        if self.compress {
            args.push("--compress".to_string());
        }
        args.extend(self.additional_args.iter().cloned());
        args
    }

    pub fn execute(&self) -> Result<()> {
        self.launcher.launch(&self.arguments())
    }
}
