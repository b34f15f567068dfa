//! The `implement` pipeline: scan, add the method to the interface, stub it
//! into every implementer, then repeat the stubbing for sub-modules.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, ResolvedConfig, SubModuleConfig};
use crate::model::{InterfaceInfo, StructInfo};
use crate::scanner::resolve::{ImportTable, NameResolver};
use crate::scanner::{with_default_excludes, ScanError, Scanner, SymbolTable};
use crate::syntax;
use crate::writer::{PendingWrites, ResolvedSignature, Stub, WriteError};

#[derive(Debug, Error)]
pub enum ImplementError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("interface {0} not found in the project")]
    InterfaceNotFound(String),

    #[error("interface {0} has no declaring file")]
    NoDeclaringFile(String),
}

/// What happened (or would happen, on a dry run) for one implementing type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StubReport {
    pub type_name: String,
    pub file: PathBuf,
    pub receiver: String,
    /// False when the type already had the method.
    pub added: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubModuleReport {
    pub module: String,
    pub stubs: Vec<StubReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImplementReport {
    pub interface: String,
    pub method: String,
    pub interface_file: PathBuf,
    pub interface_updated: bool,
    pub stubs: Vec<StubReport>,
    pub sub_modules: Vec<SubModuleReport>,
    /// Files written, or that would be written on a dry run.
    pub files: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Run the whole pipeline for a validated configuration.
pub fn implement(config: &ResolvedConfig, dry_run: bool) -> Result<ImplementReport, ImplementError> {
    let started = Instant::now();
    let name = config.interface_full_name.as_str();
    let table = Scanner::new(&config.project_module)
        .with_record(config.record)
        .scan(&config.project_dir, &config.exclude_dirs)?;
    let interface =
        table.lookup_interface(name).ok_or_else(|| ImplementError::InterfaceNotFound(name.to_string()))?;
    let interface_file = interface
        .base
        .file_paths
        .first()
        .cloned()
        .ok_or_else(|| ImplementError::NoDeclaringFile(name.to_string()))?;
    let signature = resolve_signature(&table, interface, &interface_file, config)?;

    let mut pending = PendingWrites::new();
    let interface_updated =
        pending.add_interface_method(&interface_file, interface.base.local_name(), &config.method)?;
    let stubs = queue_stubs(&mut pending, table.implementers(interface), &signature, config)?;
    let mut files = finish(pending, dry_run)?;

    let mut sub_modules = Vec::new();
    if !config.sub_modules.is_empty() {
        // The donor must see the interface with the new method so that the
        // method can be excluded from matching.
        let donor = if dry_run {
            None
        } else {
            Some(
                Scanner::new(&config.project_module)
                    .without_implements()
                    .scan(&config.project_dir, &config.exclude_dirs)?,
            )
        };
        let (donor, excluded) = match &donor {
            Some(rescanned) => (rescanned, vec![config.method.name.clone()]),
            None => (&table, Vec::new()),
        };
        for sub in &config.sub_modules {
            let (report, written) = implement_sub_module(sub, donor, &excluded, &signature, config, dry_run)?;
            files.extend(written);
            sub_modules.push(report);
        }
    }

    info!(
        interface = name,
        implementers = stubs.len(),
        files = files.len(),
        dry_run,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "implement finished"
    );
    Ok(ImplementReport {
        interface: name.to_string(),
        method: config.method.to_string(),
        interface_file,
        interface_updated,
        stubs,
        sub_modules,
        files,
        dry_run,
    })
}

fn implement_sub_module(
    sub: &SubModuleConfig,
    donor: &SymbolTable,
    excluded: &[String],
    signature: &ResolvedSignature,
    config: &ResolvedConfig,
    dry_run: bool,
) -> Result<(SubModuleReport, Vec<PathBuf>), ImplementError> {
    let excludes = with_default_excludes(&sub.exclude_dirs);
    let mut table = Scanner::new(&sub.project_module)
        .with_record(config.record)
        .scan(&sub.project_dir, &excludes)?;
    let id = table.adopt_interface(donor, &config.interface_full_name, excluded)?;
    let interface = table.interface_info(id);

    let mut pending = PendingWrites::new();
    let stubs = queue_stubs(&mut pending, table.implementers(interface), signature, config)?;
    let files = finish(pending, dry_run)?;
    Ok((SubModuleReport { module: sub.project_module.clone(), stubs }, files))
}

/// Resolve the configured signature against the imports of the file that
/// declares the interface.
fn resolve_signature(
    table: &SymbolTable,
    interface: &InterfaceInfo,
    interface_file: &Path,
    config: &ResolvedConfig,
) -> Result<ResolvedSignature, ImplementError> {
    let src = fs::read_to_string(interface_file)
        .map_err(|source| WriteError::Io { path: interface_file.to_path_buf(), source })?;
    let file = syntax::parse_source(&src)
        .map_err(|source| WriteError::Parse { path: interface_file.to_path_buf(), source })?;
    let imports = ImportTable::from_specs(&file.imports);
    let declared = table.declared_in(&interface.base.package);
    let resolver = NameResolver::new(&interface.base.package, &imports, &declared);
    Ok(config.method.resolve(&resolver))
}

fn queue_stubs<'a>(
    pending: &mut PendingWrites,
    implementers: impl Iterator<Item = &'a StructInfo>,
    signature: &ResolvedSignature,
    config: &ResolvedConfig,
) -> Result<Vec<StubReport>, ImplementError> {
    let mut reports = Vec::new();
    for st in implementers {
        let Some(file) = target_file(st, config) else {
            warn!(type_name = st.name(), "implementer has no declaring file");
            continue;
        };
        let receiver = st.method_receiver();
        // Methods of a type may live in any file of its package.
        let added = if st.methods.contains_key(&signature.name) {
            false
        } else {
            let stub = Stub {
                receiver: &receiver,
                package: &st.base.package,
                signature,
                defaults: &config.return_defaults,
            };
            pending.add_stub(&file, &stub)?
        };
        reports.push(StubReport {
            type_name: st.name().to_string(),
            file,
            receiver: format!("{} {}", receiver.name, receiver.ty),
            added,
        });
    }
    Ok(reports)
}

/// `write_paths` override (relative to the project dir) or the first file
/// that declares the type.
fn target_file(st: &StructInfo, config: &ResolvedConfig) -> Option<PathBuf> {
    match config.write_paths.get(st.name()) {
        Some(path) if path.is_absolute() => Some(path.clone()),
        Some(path) => Some(config.project_dir.join(path)),
        None => st.base.file_paths.first().cloned(),
    }
}

fn finish(pending: PendingWrites, dry_run: bool) -> Result<Vec<PathBuf>, WriteError> {
    if dry_run {
        Ok(pending.files().map(|(path, _)| path.to_path_buf()).collect())
    } else {
        pending.commit()
    }
}
