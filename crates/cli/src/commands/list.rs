use anyhow::Result;
use serde::Serialize;

use crate::commands::util::scan_tree;

#[derive(Debug, Clone, Serialize)]
pub struct TypeSummary {
    pub name: String,
    pub methods: usize,
    pub files: usize,
    /// Interfaces only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementers: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeSummary {
    pub structs: Vec<TypeSummary>,
    pub interfaces: Vec<TypeSummary>,
}

/// Scan a tree and list every struct and interface with its method count.
pub fn list_command(root: &str, module: &str, exclude: &[String], json: bool) -> Result<()> {
    let table = scan_tree(root, module, exclude, true)?;

    let mut structs: Vec<TypeSummary> = table
        .structs()
        .iter()
        .map(|st| TypeSummary {
            name: st.name().to_string(),
            methods: st.base.tokens.len(),
            files: st.base.file_paths.len(),
            implementers: None,
        })
        .collect();
    let mut interfaces: Vec<TypeSummary> = table
        .interfaces()
        .iter()
        .map(|iface| TypeSummary {
            name: iface.name().to_string(),
            methods: iface.base.tokens.len(),
            files: iface.base.file_paths.len(),
            implementers: Some(iface.implementers.len()),
        })
        .collect();
    structs.sort_by(|a, b| a.name.cmp(&b.name));
    interfaces.sort_by(|a, b| a.name.cmp(&b.name));
    let summary = TreeSummary { structs, interfaces };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Structs ({}):", summary.structs.len());
    for st in &summary.structs {
        println!("  - {} ({} methods)", st.name, st.methods);
    }
    println!("Interfaces ({}):", summary.interfaces.len());
    for iface in &summary.interfaces {
        println!(
            "  - {} ({} methods, {} implementers)",
            iface.name,
            iface.methods,
            iface.implementers.unwrap_or_default()
        );
    }
    Ok(())
}
