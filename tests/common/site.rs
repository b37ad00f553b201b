use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch project: a Maven repository, a build directory and a `p2site.toml`.
pub struct TestSite {
    temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestSite {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("m2")).unwrap();
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn maven_repository(&self) -> PathBuf {
        self.path().join("m2")
    }

    pub fn build_directory(&self) -> PathBuf {
        self.path().join("build")
    }

    pub fn site_directory(&self) -> PathBuf {
        self.build_directory().join("repository")
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("p2site.toml")
    }

    /// Writes `p2site.toml` pointing at this site's directories and the
    /// publisher built alongside the tests. `body` is appended verbatim.
    pub fn write_config(&self, body: &str) -> PathBuf {
        let config = format!(
            "build_directory = '{}'\nrepositories = ['{}']\npublisher_program = '{}'\n{body}",
            self.build_directory().display(),
            self.maven_repository().display(),
            env!("CARGO_BIN_EXE_p2site-publisher"),
        );
        let path = self.config_path();
        fs::write(&path, config).unwrap();
        path
    }
}
