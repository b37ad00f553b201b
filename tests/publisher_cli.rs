mod common;

use assert_cmd::Command as AssertCommand;
use common::{TestSite, fixtures};
use p2site::repository::index::{CONTENT_INDEX, read_index};
use p2site::repository::MetadataIndex;
use predicates::prelude::*;
use std::fs;

fn bundle(bsn: &str, version: &str) -> Vec<u8> {
    let manifest = format!(
        "Manifest-Version: 1.0\r\nBundle-ManifestVersion: 2\r\nBundle-SymbolicName: {bsn};singleton:=true\r\nBundle-Version: {version}\r\nExport-Package: {bsn};version=\"{version}\"\r\n\r\n"
    );
    fixtures::jar_bytes(&[("META-INF/MANIFEST.MF", manifest.as_bytes())])
}

fn stage(site: &TestSite, bundles: &[(&str, &str)]) -> std::path::PathBuf {
    let plugins = site.path().join("staging").join("plugins");
    fs::create_dir_all(&plugins).unwrap();
    for (bsn, version) in bundles {
        fs::write(plugins.join(format!("{bsn}_{version}.jar")), bundle(bsn, version)).unwrap();
    }
    site.path().join("staging")
}

#[test]
fn test_bundles_then_category() {
    let site = TestSite::new();
    let source = stage(&site, &[("org.example.a", "1.0.0"), ("org.example.b", "2.0.0")]);
    let destination = site.path().join("site");

    AssertCommand::new(env!("CARGO_BIN_EXE_p2site-publisher"))
        .args(["--name", "Example", "bundles", "--source"])
        .arg(&source)
        .arg("--destination")
        .arg(&destination)
        .assert()
        .success()
        .stdout(predicate::str::contains("Published 2 bundle(s)"));

    let content: MetadataIndex = read_index(&destination, CONTENT_INDEX).unwrap();
    assert_eq!(content.name.as_deref(), Some("Example"));
    assert_eq!(content.units[0].symbolic_name, "org.example.a");
    assert!(destination.join("plugins/org.example.b_2.0.0.jar").is_file());

    let definition = site.path().join("category.toml");
    fs::write(
        &definition,
        "[[category]]\nid = \"b\"\nmembers = [\"org.example.b:2.*\", \"org.other.*\"]\n",
    )
    .unwrap();

    AssertCommand::new(env!("CARGO_BIN_EXE_p2site-publisher"))
        .arg("category")
        .arg("--metadata-repository")
        .arg(&destination)
        .arg("--category-definition")
        .arg(&definition)
        .assert()
        .success()
        .stderr(predicate::str::contains("1 category pattern(s) matched nothing"));

    let content: MetadataIndex = read_index(&destination, CONTENT_INDEX).unwrap();
    assert_eq!(content.categories.len(), 1);
    assert_eq!(content.categories[0].members.len(), 1);
    assert_eq!(content.categories[0].members[0].symbolic_name, "org.example.b");
}

#[test]
fn test_compressed_indexes() {
    let site = TestSite::new();
    let source = stage(&site, &[("org.example.a", "1.0.0")]);
    let destination = site.path().join("site");

    AssertCommand::new(env!("CARGO_BIN_EXE_p2site-publisher"))
        .args(["--minify", "bundles", "--compress", "--source"])
        .arg(&source)
        .arg("--destination")
        .arg(&destination)
        .assert()
        .success();

    assert!(destination.join("content.jar").is_file());
    assert!(destination.join("artifacts.jar").is_file());
    assert!(!destination.join("content.json").exists());
}

#[test]
fn test_duplicate_bundles_fail() {
    let site = TestSite::new();
    let source = stage(&site, &[("org.example.a", "1.0.0")]);
    fs::write(
        source.join("plugins").join("copy.jar"),
        bundle("org.example.a", "1.0.0"),
    )
    .unwrap();

    AssertCommand::new(env!("CARGO_BIN_EXE_p2site-publisher"))
        .args(["bundles", "--source"])
        .arg(&source)
        .arg("--destination")
        .arg(site.path().join("site"))
        .assert()
        .failure()
        .code(40)
        .stderr(predicate::str::contains("Duplicate bundle org.example.a"));
}

#[test]
fn test_category_without_index_fails() {
    let site = TestSite::new();
    let definition = site.path().join("category.toml");
    fs::write(&definition, "[[category]]\nid = \"all\"\nmembers = [\"*\"]\n").unwrap();

    AssertCommand::new(env!("CARGO_BIN_EXE_p2site-publisher"))
        .arg("category")
        .arg("--metadata-repository")
        .arg(site.path())
        .arg("--category-definition")
        .arg(&definition)
        .assert()
        .failure()
        .code(40);
}
