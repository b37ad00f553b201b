use crate::bundler::{ArchiveContents, analyze};
use crate::error::{P2SiteError, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    archive: String,
    symbolic_name: Option<&'a str>,
    packages: Vec<&'a str>,
    imports: Vec<&'a str>,
    class_path: &'a [String],
    warnings: &'a [String],
}

/// Prints what bundling would compute for one jar.
pub struct AnalyzeCommand;

impl AnalyzeCommand {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }

    pub fn execute(&self, archive: &Path, json: bool) -> Result<()> {
        if !archive.is_file() {
            return Err(P2SiteError::NotFound(archive.display().to_string()));
        }

        let contents = ArchiveContents::read(archive)?;
        let manifest = contents.manifest()?;
        let analysis = analyze(&contents);

        let output = AnalyzeOutput {
            archive: archive.display().to_string(),
            symbolic_name: manifest.as_ref().and_then(|m| m.symbolic_name()),
            packages: analysis.packages.iter().map(String::as_str).collect(),
            imports: analysis.imports.iter().map(String::as_str).collect(),
            class_path: &analysis.class_path,
            warnings: &analysis.warnings,
        };

        if json {
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Archive: {}", output.archive);
        if let Some(name) = output.symbolic_name {
            println!("Existing bundle: {name}");
        }
        print_section("Packages", &output.packages);
        print_section("Imports", &output.imports);
        if !output.class_path.is_empty() {
            let class_path: Vec<&str> = output.class_path.iter().map(String::as_str).collect();
            print_section("Nested jars", &class_path);
        }
        for warning in output.warnings {
            eprintln!("Warning: {warning}");
        }
        Ok(())
    }
}

fn print_section(title: &str, items: &[&str]) {
    println!("{title} ({}):", items.len());
    for item in items {
        println!("  {item}");
    }
}
