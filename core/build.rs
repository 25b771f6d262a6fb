use std::collections::HashSet;
use std::env;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Deserialize)]
struct CatalogFile {
    title: Option<String>,
    cards: Vec<CardEntry>,
}

#[derive(Deserialize)]
struct CardEntry {
    label: String,
    image: String,
    link: String,
    content: Option<String>,
}

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("missing CARGO_MANIFEST_DIR"));
    let workspace_root = manifest_dir.parent().unwrap_or(&manifest_dir);
    let env_path = workspace_root.join(".env");
    let env_local_path = workspace_root.join(".env.local");

    let _ = dotenvy::from_filename(&env_local_path);
    let _ = dotenvy::from_filename(&env_path);

    println!("cargo:rerun-if-env-changed=SYSTEMS_CATALOG_PATH");
    println!("cargo:rerun-if-changed={}", env_path.display());
    println!("cargo:rerun-if-changed={}", env_local_path.display());

    let catalog_path = resolve_catalog_path(workspace_root);
    println!("cargo:rerun-if-changed={}", catalog_path.display());

    let contents = fs::read_to_string(&catalog_path).unwrap_or_else(|err| {
        panic!(
            "failed to read systems catalog at {}: {err}",
            catalog_path.display()
        )
    });

    let catalog: CatalogFile = toml::from_str(&contents).unwrap_or_else(|err| {
        panic!(
            "failed to parse systems catalog at {}: {err}",
            catalog_path.display()
        )
    });

    if catalog.cards.is_empty() {
        panic!("systems catalog {} has no cards", catalog_path.display());
    }

    validate_entries(&catalog.cards, &catalog_path);

    let title = catalog.title.as_deref().unwrap_or("SYSTEMS");

    let mut output = String::new();
    writeln!(&mut output, "pub const PAGE_TITLE: &str = {};", rust_string(title)).unwrap();
    writeln!(&mut output).unwrap();
    writeln!(&mut output, "pub const SYSTEM_CATALOG: &[CatalogCard] = &[").unwrap();

    for entry in &catalog.cards {
        let content = match entry.content.as_deref() {
            Some(path) => {
                let content_path = resolve_content_path(path, workspace_root);
                if !content_path.exists() {
                    panic!(
                        "card '{}' content {} does not exist",
                        entry.label,
                        content_path.display()
                    );
                }
                println!("cargo:rerun-if-changed={}", content_path.display());
                format!("Some(include_str!({}))", rust_string(&content_path.display().to_string()))
            }
            None => "None".to_string(),
        };
        writeln!(&mut output, "    CatalogCard {{").unwrap();
        writeln!(&mut output, "        label: {},", rust_string(&entry.label)).unwrap();
        writeln!(&mut output, "        image: {},", rust_string(&entry.image)).unwrap();
        writeln!(&mut output, "        link: {},", rust_string(&entry.link)).unwrap();
        writeln!(&mut output, "        content: {},", content).unwrap();
        writeln!(&mut output, "    }},").unwrap();
    }

    writeln!(&mut output, "];").unwrap();

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("missing OUT_DIR"));
    let out_path = out_dir.join("systems_catalog.rs");
    fs::write(&out_path, output).unwrap_or_else(|err| {
        panic!("failed to write {}: {err}", out_path.display())
    });
}

fn resolve_catalog_path(workspace_root: &Path) -> PathBuf {
    let env_value = env::var("SYSTEMS_CATALOG_PATH").ok();
    let raw_path = match env_value {
        Some(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => workspace_root.join("systems/catalog.toml"),
    };
    if raw_path.is_relative() {
        workspace_root.join(raw_path)
    } else {
        raw_path
    }
}

fn resolve_content_path(path: &str, workspace_root: &Path) -> PathBuf {
    let raw_path = PathBuf::from(path);
    if raw_path.is_absolute() {
        raw_path
    } else {
        workspace_root.join(raw_path)
    }
}

fn rust_string(value: &str) -> String {
    format!("{:?}", value)
}

fn validate_entries(entries: &[CardEntry], catalog_path: &Path) {
    let mut labels = HashSet::new();
    let mut links = HashSet::new();

    for entry in entries {
        if entry.label.trim().is_empty() {
            panic!("card label cannot be empty in {}", catalog_path.display());
        }
        if entry.image.trim().is_empty() {
            panic!(
                "card '{}' image cannot be empty in {}",
                entry.label,
                catalog_path.display()
            );
        }
        if entry.image.starts_with("http://") || entry.image.starts_with("https://") {
            panic!(
                "card '{}' image cannot be a URL in {}",
                entry.label,
                catalog_path.display()
            );
        }
        if entry.link.trim().is_empty() {
            panic!(
                "card '{}' link cannot be empty in {}",
                entry.label,
                catalog_path.display()
            );
        }
        if !labels.insert(entry.label.clone()) {
            panic!(
                "duplicate card label '{}' in {}",
                entry.label,
                catalog_path.display()
            );
        }
        if !links.insert(entry.link.clone()) {
            panic!(
                "duplicate card link '{}' in {}",
                entry.link,
                catalog_path.display()
            );
        }
    }
}
