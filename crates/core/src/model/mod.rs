//! Symbol model for a scanned Go tree.
//!
//! Struct and interface records live in the arena owned by
//! [`SymbolTable`](crate::scanner::SymbolTable); the embedding lists below hold
//! arena ids rather than references so the table can keep mutating while the
//! graph is being linked.

mod token;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use token::MethodToken;

/// Arena index of a struct record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StructId(pub usize);

/// Arena index of an interface record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct InterfaceId(pub usize);

/// Identity shared by structs and interfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseInfo {
    /// Fully-qualified name, `package/path.TypeName`.
    pub name: String,
    /// Declaring package path.
    pub package: String,
    /// Files that declare the type or contribute methods to it, first-seen first.
    pub file_paths: Vec<PathBuf>,
    /// Sorted, de-duplicated method tokens; empty until the scan links the tree.
    pub tokens: Vec<MethodToken>,
}

impl BaseInfo {
    pub fn new(name: impl Into<String>, package: impl Into<String>, file: &Path) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            file_paths: vec![file.to_path_buf()],
            tokens: Vec::new(),
        }
    }

    /// Record another contributing file, ignoring duplicates.
    pub fn add_file(&mut self, file: &Path) {
        if !self.file_paths.iter().any(|p| p == file) {
            self.file_paths.push(file.to_path_buf());
        }
    }

    /// The unqualified type name (`Foo` for `example.com/p.Foo`).
    pub fn local_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Receiver of a method declared with `func (r *T) ...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiverInfo {
    pub name: Option<String>,
    /// Receiver type as written locally, `*T` or `T`.
    pub ty: String,
    pub is_pointer: bool,
}

/// One method, either declared in an interface or attached to a struct.
#[derive(Debug, Clone, Serialize)]
pub struct MethodInfo {
    pub name: String,
    /// `None` for interface methods.
    pub receiver: Option<ReceiverInfo>,
    pub params: Vec<String>,
    /// Parameter names as written; only used when rendering.
    pub param_names: Vec<Option<String>>,
    pub returns: Vec<String>,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            receiver: None,
            params: Vec::new(),
            param_names: Vec::new(),
            returns: Vec::new(),
        }
    }

    pub fn token(&self) -> MethodToken {
        MethodToken::new(&self.name, &self.params, &self.returns)
    }
}

/// Methods are equal when name and type sequences match; names of parameters
/// and receivers do not take part.
impl PartialEq for MethodInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.params == other.params && self.returns == other.returns
    }
}

impl Eq for MethodInfo {}

/// Receiver name/type pair to use when generating a new method for a struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receiver {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructInfo {
    #[serde(flatten)]
    pub base: BaseInfo,
    /// Keyed by method name; a later declaration replaces an earlier one.
    pub methods: BTreeMap<String, MethodInfo>,
    pub embedded_structs: Vec<StructId>,
    pub embedded_interfaces: Vec<InterfaceId>,
}

impl StructInfo {
    pub fn new(base: BaseInfo) -> Self {
        Self {
            base,
            methods: BTreeMap::new(),
            embedded_structs: Vec::new(),
            embedded_interfaces: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }

    pub fn add_method(&mut self, method: MethodInfo) {
        self.methods.insert(method.name.clone(), method);
    }

    /// Receiver to reuse for generated methods.
    ///
    /// Taken from the first existing method with a named receiver; a struct
    /// with none gets the lowercased first letter of its name and a pointer
    /// receiver.
    pub fn method_receiver(&self) -> Receiver {
        for method in self.methods.values() {
            if let Some(ReceiverInfo { name: Some(name), ty, .. }) = &method.receiver {
                if name != "_" {
                    return Receiver { name: name.clone(), ty: ty.clone() };
                }
            }
        }
        let local = self.base.local_name();
        let name = local.chars().next().map(|c| c.to_lowercase().collect()).unwrap_or_default();
        Receiver { name, ty: format!("*{local}") }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceInfo {
    #[serde(flatten)]
    pub base: BaseInfo,
    pub methods: Vec<MethodInfo>,
    pub embedded: Vec<InterfaceId>,
    /// Structs found to implement this interface.
    pub implementers: Vec<StructId>,
    /// Tokens ignored by the implements test (derived views only).
    pub excluded: BTreeSet<MethodToken>,
}

impl InterfaceInfo {
    pub fn new(base: BaseInfo) -> Self {
        Self {
            base,
            methods: Vec::new(),
            embedded: Vec::new(),
            implementers: Vec::new(),
            excluded: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }
}

/// Structural implements test over pre-sorted token lists.
///
/// Walks both lists once: equal tokens advance both cursors, a smaller struct
/// token is an extra struct method and is skipped, a smaller interface token
/// is a missing method unless it is excluded.
pub fn implements(structure: &StructInfo, interface: &InterfaceInfo) -> bool {
    tokens_implement(&structure.base.tokens, &interface.base.tokens, &interface.excluded)
}

/// Token-level form of [`implements`].
pub fn tokens_implement(
    struct_tokens: &[MethodToken],
    interface_tokens: &[MethodToken],
    excluded: &BTreeSet<MethodToken>,
) -> bool {
    let (mut x, mut y) = (0, 0);
    while x < struct_tokens.len() && y < interface_tokens.len() {
        let (s, i) = (&struct_tokens[x], &interface_tokens[y]);
        if s == i {
            x += 1;
            y += 1;
        } else if s < i {
            x += 1;
        } else if excluded.contains(i) {
            y += 1;
        } else {
            return false;
        }
    }
    while y < interface_tokens.len() && excluded.contains(&interface_tokens[y]) {
        y += 1;
    }
    y == interface_tokens.len()
}
