//! Detection against a real directory tree through `LocalFilesystem`.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use dockgen_adapters::LocalFilesystem;
use dockgen_core::prelude::*;

fn classifier() -> ProjectClassifier {
    ProjectClassifier::new(Arc::new(LocalFilesystem::new()), WalkOptions::default())
}

#[test]
fn every_manifest_marker_names_its_stack() {
    let cases = [
        ("package.json", "{}", "Node.js"),
        ("requirements.txt", "flask==3.0.0\n", "Python"),
        ("pyproject.toml", "[project]\nname = \"x\"\n", "Python"),
        ("Pipfile", "[packages]\n", "Python"),
        ("setup.py", "from setuptools import setup\n", "Python"),
        ("pom.xml", "<project></project>\n", "Java"),
        ("build.gradle", "plugins {}\n", "Java"),
        ("build.gradle.kts", "plugins {}\n", "Java"),
        ("go.mod", "module x\n", "Go"),
        ("Api.csproj", "<Project></Project>\n", ".NET"),
        ("Lib.fsproj", "<Project></Project>\n", ".NET"),
        ("Gemfile", "source \"https://rubygems.org\"\n", "Ruby"),
        ("Cargo.toml", "[package]\nname = \"x\"\n", "Rust"),
        ("composer.json", "{}", "PHP"),
    ];

    for (marker, content, label) in cases {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(marker), content).unwrap();

        let analysis = classifier()
            .classify(dir.path())
            .unwrap_or_else(|e| panic!("{marker}: {e}"));

        assert_eq!(analysis.layout, Layout::Single, "{marker}");
        assert_eq!(analysis.components.len(), 1, "{marker}");
        assert_eq!(analysis.components[0].stack.to_string(), label, "{marker}");
        assert_eq!(analysis.components[0].manifests, vec![PathBuf::from(marker)], "{marker}");
    }
}

#[test]
fn dot_root_is_named_after_the_directory() {
    let dir = TempDir::new().unwrap();
    let shop = dir.path().join("shop");
    fs::create_dir(&shop).unwrap();
    fs::write(shop.join("package.json"), r#"{"name":"x"}"#).unwrap();

    let analysis = classifier().classify(&shop.join(".")).unwrap();

    assert_eq!(analysis.project_name(), "shop");
    assert_eq!(analysis.components[0].name, "shop");
}

#[test]
fn source_files_alone_fall_back_to_extension() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("main.go"), "package main\n").unwrap();
    fs::write(dir.path().join("util.go"), "package main\n").unwrap();

    let analysis = classifier().classify(dir.path()).unwrap();

    assert_eq!(analysis.components[0].stack, Stack::Go);
    assert!(analysis.components[0].manifests.is_empty());
}
