use anyhow::{Context, Result};
use interfacer_core::config::InterfacerConfig;
use interfacer_core::services::{self, ImplementReport, StubReport};

use crate::canonicalize_or_current;

/// Command-line overrides for an `implement` run.
#[derive(Debug, Clone, Default)]
pub struct ImplementArgs {
    pub project_dir: Option<String>,
    pub project_module: Option<String>,
    pub interface: Option<String>,
    pub method: Option<String>,
    pub returns: Option<String>,
    pub exclude: Vec<String>,
    pub dry_run: bool,
    pub json: bool,
}

/// Apply command-line values on top of the file configuration.
pub fn overlay_args(mut config: InterfacerConfig, args: &ImplementArgs) -> Result<InterfacerConfig> {
    if let Some(dir) = &args.project_dir {
        config.project_dir = Some(canonicalize_or_current(dir)?);
    }
    if let Some(module) = &args.project_module {
        config.project_module = Some(module.clone());
    }
    if let Some(interface) = &args.interface {
        config.interface_full_name = Some(interface.clone());
    }
    if let Some(method) = &args.method {
        config.new_method = Some(method.clone());
    }
    if let Some(returns) = &args.returns {
        config.return_default_values = Some(returns.clone());
    }
    config.exclude_dirs.extend(args.exclude.iter().cloned());
    Ok(config)
}

/// Add the method to the interface and stub it into every implementer.
pub fn implement_command(config: InterfacerConfig, args: &ImplementArgs) -> Result<()> {
    let config = overlay_args(config, args)?;
    let resolved = config.validate().context("Invalid configuration")?;
    let report = services::implement(&resolved, args.dry_run)
        .with_context(|| format!("Failed to implement {}", resolved.interface_full_name))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ImplementReport) {
    let verb = if report.dry_run { "Would add" } else { "Added" };
    println!("Interface: {}", report.interface);
    println!("Method:    {}", report.method);
    if report.interface_updated {
        println!("{verb} method to {}", report.interface_file.display());
    } else {
        println!("Interface already declares {}", report.method);
    }

    println!("Implementers ({}):", report.stubs.len());
    print_stubs(&report.stubs, verb);
    for sub in &report.sub_modules {
        println!("Sub-module {} ({}):", sub.module, sub.stubs.len());
        print_stubs(&sub.stubs, verb);
    }

    if report.files.is_empty() {
        println!("No files changed.");
    } else {
        println!("{} file(s) {}:", report.files.len(), if report.dry_run { "to write" } else { "written" });
        for file in &report.files {
            println!("  - {}", file.display());
        }
    }
}

fn print_stubs(stubs: &[StubReport], verb: &str) {
    if stubs.is_empty() {
        println!("  (none)");
    }
    for stub in stubs {
        let status = if stub.added { verb } else { "Exists" };
        println!("  - {} [{status}] ({}) -> {}", stub.type_name, stub.receiver, stub.file.display());
    }
}
