use std::path::Path;

use anyhow::{Context, Result};
use interfacer_core::config::{InterfacerConfig, DEFAULT_CONFIG_FILE};
use interfacer_core::scanner::{with_default_excludes, Scanner, SymbolTable};

use crate::canonicalize_or_current;

/// Load the config named by `--config`, or `interfacer.yaml` from the working
/// directory when it exists, or defaults.
pub fn load_config(path: Option<&str>) -> Result<InterfacerConfig> {
    match path {
        Some(path) => InterfacerConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config {path}")),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            InterfacerConfig::load(Path::new(DEFAULT_CONFIG_FILE))
                .with_context(|| format!("Failed to load config {DEFAULT_CONFIG_FILE}"))
        }
        None => Ok(InterfacerConfig::default()),
    }
}

/// Scan `root` as module `module` with the default exclusions added.
pub fn scan_tree(root: &str, module: &str, exclude: &[String], implements: bool) -> Result<SymbolTable> {
    let root_path = canonicalize_or_current(root)?;
    let mut scanner = Scanner::new(module);
    if !implements {
        scanner = scanner.without_implements();
    }
    scanner
        .scan(&root_path, &with_default_excludes(exclude))
        .with_context(|| format!("Failed to scan {}", root_path.display()))
}
