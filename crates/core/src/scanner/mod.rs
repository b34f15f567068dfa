//! Whole-tree scanning.
//!
//! A scan walks a Go module directory by directory, feeds each parsed file to
//! the unit parser, then links the collected records into one graph:
//!
//! 1. late qualification of bare type names declared after their first use,
//! 2. replay of the queued embedding links,
//! 3. token computation for structs and interfaces,
//! 4. the implements test for every struct/interface pair.
//!
//! Nothing is global: each call to [`Scanner::scan`] returns its own
//! [`SymbolTable`].

pub mod links;
pub mod resolve;
pub mod store;
pub mod unit;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::model::StructInfo;
use crate::syntax::{self, ParseError, SourceFile};
pub use links::LinkRegistry;
pub use store::SymbolTable;

/// Directory names every scan skips in addition to the configured ones.
pub const ALWAYS_EXCLUDED: &[&str] = &[".idea", ".git", "vendor", ".github"];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot access scan root {path}: {source}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scan root {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("directory traversal failed: {0}")]
    Traversal(#[from] walkdir::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("interface {0} not found in the donor tree")]
    InterfaceNotFound(String),

    #[error("interface {0} is already declared in the receiving tree")]
    InterfaceCollision(String),
}

pub type ScanResult<T> = Result<T, ScanError>;

/// Scanner for one module rooted at a directory.
#[derive(Debug, Clone)]
pub struct Scanner {
    module: String,
    implements: bool,
    record: bool,
}

impl Scanner {
    /// `module` is the import path of the scan root, e.g. `example.com/app`.
    pub fn new(module: impl Into<String>) -> Self {
        Self { module: module.into(), implements: true, record: false }
    }

    /// Skip the implements test; the table is then only useful as a donor
    /// for [`SymbolTable::adopt_interface`] or for inspection.
    pub fn without_implements(mut self) -> Self {
        self.implements = false;
        self
    }

    /// Log every scanned struct and interface under [`RECORD_TARGET`].
    pub fn with_record(mut self, record: bool) -> Self {
        self.record = record;
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Scan `root`, skipping directories whose name is in `excluded`.
    ///
    /// Any unreadable directory or file, and any file that fails to parse,
    /// aborts the scan.
    pub fn scan(&self, root: &Path, excluded: &[String]) -> ScanResult<SymbolTable> {
        let started = Instant::now();
        let meta = fs::metadata(root)
            .map_err(|source| ScanError::RootUnavailable { path: root.to_path_buf(), source })?;
        if !meta.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let excluded: HashSet<&str> = excluded.iter().map(String::as_str).collect();
        let mut table = SymbolTable::new();
        let mut links = LinkRegistry::new();
        let mut files = 0usize;

        let walker = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !entry.file_name().to_str().is_some_and(|name| excluded.contains(name))
        });
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let package = package_path(&self.module, root, entry.path());
            files += self.scan_dir(entry.path(), &package, &mut table, &mut links)?;
        }

        table.qualify_late();
        let queued = links.len();
        let linked = links.replay(&mut table);
        table.compute_tokens();
        let matched = if self.implements { table.match_implementers() } else { 0 };

        info!(
            root = %root.display(),
            files,
            structs = table.structs().len(),
            interfaces = table.interfaces().len(),
            links = linked,
            dropped_links = queued - linked,
            implementations = matched,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan finished"
        );
        if self.record {
            record_symbols(&table);
        }
        Ok(table)
    }

    /// Parse the `.go` files directly inside `dir`; returns how many were read.
    fn scan_dir(
        &self,
        dir: &Path,
        package: &str,
        table: &mut SymbolTable,
        links: &mut LinkRegistry,
    ) -> ScanResult<usize> {
        let read_err = |source| ScanError::Read { path: dir.to_path_buf(), source };
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "go") {
                paths.push(path);
            }
        }
        paths.sort();

        // Files grouped by their package clause.
        let mut units: BTreeMap<String, Vec<(PathBuf, SourceFile)>> = BTreeMap::new();
        for path in &paths {
            let src = fs::read_to_string(path)
                .map_err(|source| ScanError::Read { path: path.clone(), source })?;
            let file = syntax::parse_source(&src)
                .map_err(|source| ScanError::Parse { path: path.clone(), source })?;
            units.entry(file.package.clone()).or_default().push((path.clone(), file));
        }

        let dir_name = dir.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        for (name, files) in units {
            if name.ends_with("_test") {
                debug!(dir = %dir.display(), package = %name, "skipping external test package");
                continue;
            }
            if name != dir_name && name != "main" {
                warn!(dir = %dir.display(), package = %name, "package name differs from directory name");
            }
            let mut declared = HashSet::new();
            for (path, file) in &files {
                unit::parse_unit(table, links, package, &mut declared, path, file);
            }
        }
        Ok(paths.len())
    }
}

/// `tracing` target of the per-symbol scan record.
pub const RECORD_TARGET: &str = "interfacer::record";

fn record_symbols(table: &SymbolTable) {
    for st in table.structs() {
        let methods: Vec<&str> = st.methods.keys().map(String::as_str).collect();
        let embedded: Vec<&str> = st
            .embedded_structs
            .iter()
            .map(|&id| table.struct_info(id).name())
            .chain(st.embedded_interfaces.iter().map(|&id| table.interface_info(id).name()))
            .collect();
        info!(
            target: RECORD_TARGET,
            kind = "struct",
            name = %st.name(),
            package = %st.base.package,
            methods = ?methods,
            embedded = ?embedded,
            "record"
        );
    }
    for iface in table.interfaces() {
        let methods: Vec<&str> = iface.methods.iter().map(|m| m.name.as_str()).collect();
        let embedded: Vec<&str> = iface.embedded.iter().map(|&id| table.interface_info(id).name()).collect();
        let implementers: Vec<&str> = table.implementers(iface).map(StructInfo::name).collect();
        info!(
            target: RECORD_TARGET,
            kind = "interface",
            name = %iface.name(),
            package = %iface.base.package,
            methods = ?methods,
            embedded = ?embedded,
            implementers = ?implementers,
            "record"
        );
    }
}

/// Import path of `dir` inside the module rooted at `root`.
pub fn package_path(module: &str, root: &Path, dir: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    let mut path = module.to_string();
    for component in rel.components() {
        path.push('/');
        path.push_str(&component.as_os_str().to_string_lossy());
    }
    path
}

/// Configured exclusions plus [`ALWAYS_EXCLUDED`], without duplicates.
pub fn with_default_excludes(configured: &[String]) -> Vec<String> {
    let mut all: Vec<String> = configured.to_vec();
    for name in ALWAYS_EXCLUDED {
        if !all.iter().any(|n| n == name) {
            all.push((*name).to_string());
        }
    }
    all
}
