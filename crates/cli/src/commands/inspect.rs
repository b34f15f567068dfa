use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::commands::util::scan_tree;

#[derive(Debug, Clone, Serialize)]
pub struct ImplementerView {
    pub name: String,
    pub files: Vec<PathBuf>,
    pub receiver: String,
}

/// An interface with its method set and implementers.
#[derive(Debug, Clone, Serialize)]
pub struct InterfaceView {
    pub name: String,
    pub package: String,
    pub files: Vec<PathBuf>,
    pub methods: Vec<String>,
    pub implementers: Vec<ImplementerView>,
}

/// Scan a tree and show one interface.
pub fn inspect_command(
    root: &str,
    module: &str,
    interface: &str,
    exclude: &[String],
    json: bool,
) -> Result<()> {
    let table = scan_tree(root, module, exclude, true)?;
    let info = table
        .lookup_interface(interface)
        .ok_or_else(|| anyhow!("Interface not found: {interface}"))?;

    let mut implementers: Vec<ImplementerView> = table
        .implementers(info)
        .map(|st| {
            let receiver = st.method_receiver();
            ImplementerView {
                name: st.name().to_string(),
                files: st.base.file_paths.clone(),
                receiver: format!("{} {}", receiver.name, receiver.ty),
            }
        })
        .collect();
    implementers.sort_by(|a, b| a.name.cmp(&b.name));

    let view = InterfaceView {
        name: info.name().to_string(),
        package: info.base.package.clone(),
        files: info.base.file_paths.clone(),
        methods: info.base.tokens.iter().map(ToString::to_string).collect(),
        implementers,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("Interface: {}", view.name);
    println!("Package:   {}", view.package);
    for file in &view.files {
        println!("File:      {}", file.display());
    }
    println!("Methods ({}):", view.methods.len());
    for method in &view.methods {
        println!("  - {method}");
    }
    println!("Implementers ({}):", view.implementers.len());
    if view.implementers.is_empty() {
        println!("  (none)");
    }
    for imp in &view.implementers {
        let file = imp.files.first().map(|f| f.display().to_string()).unwrap_or_default();
        println!("  - {} ({}) {}", imp.name, imp.receiver, file);
    }
    Ok(())
}
