//! Source edits: adding a method to an interface declaration and appending
//! stub implementations.
//!
//! The edit functions are pure (`&str` in, new text out) and leave the file
//! untouched when the method is already present. [`PendingWrites`] batches
//! edits per file so several stubs can land in the same file, and commits
//! them with a write-then-rename.

pub mod signature;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::model::Receiver;
use crate::scanner::resolve::{default_import_name, localize, ImportTable};
use crate::syntax::ast::{SourceFile, TypeExpr};
use crate::syntax::{self, ParseError};
pub use signature::{split_values, MethodSignature, ResolvedParam, ResolvedSignature};

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error on {path}: {source}")]
    Io {
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

    #[error("interface {interface} is not declared in {path}")]
    InterfaceNotDeclared { interface: String, path: PathBuf },

    #[error("invalid method signature `{signature}`: {source}")]
    InvalidSignature {
        signature: String,
        #[source]
        source: ParseError,
    },
}

/// Outcome of [`with_interface_method`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Splice {
    Inserted(String),
    /// The interface already declares a method of that name.
    AlreadyPresent,
    NotDeclared,
}

/// Add `method` to `type <interface> interface { ... }` in `src`.
///
/// The method goes on its own line just before the closing brace; a one-line
/// declaration such as `interface{}` is expanded to one method per line.
pub fn with_interface_method(
    src: &str,
    interface: &str,
    method: &MethodSignature,
) -> Result<Splice, ParseError> {
    let file = syntax::parse_source(src)?;
    let Some(body) = file.type_specs().find_map(|spec| match &spec.ty {
        TypeExpr::Interface(body) if spec.name == interface => Some(body),
        _ => None,
    }) else {
        return Ok(Splice::NotDeclared);
    };
    if body.methods().any(|m| m.name == method.name) {
        return Ok(Splice::AlreadyPresent);
    }

    let line = method.to_string();
    let (lb, rb) = (body.lbrace.offset, body.rbrace.offset);
    let mut out = String::with_capacity(src.len() + line.len() + 8);

    if body.lbrace.line == body.rbrace.line {
        let indent = indent_of(src, lb);
        out.push_str(&src[..lb]);
        out.push_str("{\n");
        for existing in src[lb + 1..rb].split(';').map(str::trim).filter(|s| !s.is_empty()) {
            out.push_str(&format!("{indent}\t{existing}\n"));
        }
        out.push_str(&format!("{indent}\t{line}\n{indent}}}"));
        out.push_str(&src[rb + 1..]);
        return Ok(Splice::Inserted(out));
    }

    let line_start = line_start(src, rb);
    let before_brace = &src[line_start..rb];
    if before_brace.trim().is_empty() {
        out.push_str(&src[..line_start]);
        out.push_str(&format!("{before_brace}\t{line}\n"));
        out.push_str(&src[line_start..]);
    } else {
        out.push_str(&src[..rb]);
        out.push_str(&format!("\n\t{line}\n"));
        out.push_str(&src[rb..]);
    }
    Ok(Splice::Inserted(out))
}

/// A stub implementation to append for one implementing type.
#[derive(Debug, Clone)]
pub struct Stub<'a> {
    pub receiver: &'a Receiver,
    /// Package the stub is written into; its own types lose their qualifier.
    pub package: &'a str,
    pub signature: &'a ResolvedSignature,
    /// Values for the `return` statement; empty means none configured.
    pub defaults: &'a [String],
}

impl Stub<'_> {
    fn body(&self) -> String {
        if !self.defaults.is_empty() {
            format!("\treturn {}\n", self.defaults.join(", "))
        } else if !self.signature.results.is_empty() {
            "\tpanic(\"implement me\")\n".to_string()
        } else {
            String::new()
        }
    }
}

/// Append `stub` to `src` unless a method of the same name already exists on
/// the same receiver type. Imports the stub needs are added.
pub fn with_method_stub(src: &str, stub: &Stub<'_>) -> Result<Option<String>, ParseError> {
    let file = syntax::parse_source(src)?;
    if has_method(&file, stub.receiver.ty.trim_start_matches('*'), &stub.signature.name) {
        return Ok(None);
    }

    let mut imports = ImportTable::from_specs(&file.imports);
    let mut needed = BTreeMap::new();
    let mut localize_all = |params: &[ResolvedParam]| -> Vec<(Option<String>, String)> {
        params
            .iter()
            .map(|p| {
                let local = localize(&p.ty, stub.package, &imports);
                if let Some(path) = local.import {
                    let name = local.alias.clone().unwrap_or_else(|| default_import_name(&path).to_string());
                    imports.insert(name, path.clone());
                    needed.insert(path, local.alias);
                }
                (p.name.clone(), local.text)
            })
            .collect()
    };
    let params = localize_all(&stub.signature.params);
    let results = localize_all(&stub.signature.results);
    let header = signature::render_signature(&stub.signature.name, &params, &results);

    let mut out = with_imports(src, &file, &needed);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!(
        "\nfunc ({} {}) {header} {{\n{}}}\n",
        stub.receiver.name,
        stub.receiver.ty,
        stub.body()
    ));
    Ok(Some(out))
}

/// Whether `file` declares `name` on a receiver whose base type is `receiver`.
pub fn has_method(file: &SourceFile, receiver: &str, name: &str) -> bool {
    file.funcs().any(|func| {
        func.name == name
            && func
                .receiver
                .as_ref()
                .and_then(|r| r.ty.base_name())
                .is_some_and(|base| matches!(base, TypeExpr::Named(n) if n == receiver))
    })
}

/// Insert an `import "path"` line (or `import alias "path"`) after the
/// package clause for every path in `paths` that `file` does not import yet.
pub fn with_imports(src: &str, file: &SourceFile, paths: &BTreeMap<String, Option<String>>) -> String {
    let missing: Vec<(&String, &Option<String>)> =
        paths.iter().filter(|(p, _)| !file.imports.iter().any(|i| &i.path == *p)).collect();
    if missing.is_empty() {
        return src.to_string();
    }
    let at = src[file.package_pos.offset..]
        .find('\n')
        .map_or(src.len(), |i| file.package_pos.offset + i + 1);
    let mut out = String::with_capacity(src.len() + missing.len() * 16);
    out.push_str(&src[..at]);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    for (path, alias) in missing {
        match alias {
            Some(alias) => out.push_str(&format!("import {alias} \"{path}\"\n")),
            None => out.push_str(&format!("import \"{path}\"\n")),
        }
    }
    out.push_str(&src[at..]);
    out
}

fn line_start(src: &str, offset: usize) -> usize {
    src[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn indent_of(src: &str, offset: usize) -> &str {
    let start = line_start(src, offset);
    let line = &src[start..];
    &line[..line.len() - line.trim_start_matches([' ', '\t']).len()]
}

/// File edits accumulated in memory until [`commit`](Self::commit).
#[derive(Debug, Default)]
pub struct PendingWrites {
    files: BTreeMap<PathBuf, String>,
}

impl PendingWrites {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self, path: &Path) -> Result<String, WriteError> {
        match self.files.get(path) {
            Some(text) => Ok(text.clone()),
            None => fs::read_to_string(path)
                .map_err(|source| WriteError::Io { path: path.to_path_buf(), source }),
        }
    }

    /// Queue the interface edit. Returns false when the method is already there.
    pub fn add_interface_method(
        &mut self,
        path: &Path,
        interface: &str,
        method: &MethodSignature,
    ) -> Result<bool, WriteError> {
        let src = self.current(path)?;
        let splice = with_interface_method(&src, interface, method)
            .map_err(|source| WriteError::Parse { path: path.to_path_buf(), source })?;
        match splice {
            Splice::Inserted(text) => {
                debug!(file = %path.display(), interface, method = %method.name, "interface method queued");
                self.files.insert(path.to_path_buf(), text);
                Ok(true)
            }
            Splice::AlreadyPresent => Ok(false),
            Splice::NotDeclared => Err(WriteError::InterfaceNotDeclared {
                interface: interface.to_string(),
                path: path.to_path_buf(),
            }),
        }
    }

    /// Queue a stub. Returns false when the receiver already has the method.
    pub fn add_stub(&mut self, path: &Path, stub: &Stub<'_>) -> Result<bool, WriteError> {
        let src = self.current(path)?;
        let edited = with_method_stub(&src, stub)
            .map_err(|source| WriteError::Parse { path: path.to_path_buf(), source })?;
        match edited {
            Some(text) => {
                debug!(file = %path.display(), receiver = %stub.receiver.ty, "stub queued");
                self.files.insert(path.to_path_buf(), text);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files with pending edits and their new contents.
    pub fn files(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().map(|(p, s)| (p.as_path(), s.as_str()))
    }

    /// Write every edited file and return their paths.
    pub fn commit(self) -> Result<Vec<PathBuf>, WriteError> {
        let mut written = Vec::with_capacity(self.files.len());
        for (path, contents) in self.files {
            write_atomic(&path, &contents)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Write `contents` next to `path` and rename it into place.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), WriteError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let io_err = |source| WriteError::Io { path: path.to_path_buf(), source };
    fs::write(&tmp, contents).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}
