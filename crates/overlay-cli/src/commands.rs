//! Command implementations for the `overlay` binary

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use overlay_engine::OverlaySource;
use overlay_tree::flatten;

use crate::error::Result;

fn source_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(OverlaySource::find_default_path)
}

/// Resolve one entity and print the merged tree.
pub fn run_resolve(entity_id: &str, config: Option<PathBuf>, flat: bool) -> Result<()> {
    let path = source_path(config);
    tracing::debug!(?path, entity = entity_id, "Resolving entity configuration");
    let source = OverlaySource::load(&path)?;
    let tree = overlay_engine::resolve(entity_id, &source);

    if flat {
        print_flat(&tree);
    } else {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    }
    Ok(())
}

/// Flatten a standalone YAML/JSON document to dotted lines.
pub fn run_flatten(file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)?;
    let tree: Value = if file.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    print_flat(&tree);
    Ok(())
}

/// List instance ids and template names declared by the source.
pub fn run_list(config: Option<PathBuf>) -> Result<()> {
    let path = source_path(config);
    let source = OverlaySource::load(&path)?;

    println!("instances:");
    for id in source.instance_ids() {
        println!("  {id}");
    }
    println!("templates:");
    for name in source.template_names() {
        println!("  {name}");
    }
    Ok(())
}

fn print_flat(tree: &Value) {
    for (key, value) in flatten(tree, &[]).iter() {
        println!("{key} = {value}");
    }
}
