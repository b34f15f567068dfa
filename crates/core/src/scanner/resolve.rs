//! Name resolution: local type spellings to fully-qualified identities.

use std::collections::{HashMap, HashSet};

use crate::syntax::ast::{ImportName, ImportSpec, TypeExpr};

/// Import aliases of one file, alias -> import path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    aliases: HashMap<String, String>,
}

impl ImportTable {
    pub fn from_specs(specs: &[ImportSpec]) -> Self {
        let mut aliases = HashMap::new();
        for spec in specs {
            let alias = match &spec.name {
                ImportName::Alias(alias) => alias.clone(),
                ImportName::Default => default_import_name(&spec.path).to_string(),
                ImportName::Dot | ImportName::Blank => continue,
            };
            aliases.insert(alias, spec.path.clone());
        }
        Self { aliases }
    }

    /// Record `alias` as naming `path`, as a newly added import would.
    pub fn insert(&mut self, alias: impl Into<String>, path: impl Into<String>) {
        self.aliases.insert(alias.into(), path.into());
    }

    pub fn path_for(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Alias under which `path` is imported, if it is.
    pub fn alias_for(&self, path: &str) -> Option<&str> {
        self.aliases.iter().find(|(_, p)| p.as_str() == path).map(|(a, _)| a.as_str())
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Name a package is known by when imported without an alias.
///
/// That is the last path segment, except that a major-version suffix such as
/// `v2` gives way to the segment before it.
pub fn default_import_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    if is_major_version(last) {
        if let Some(prev) = segments.next() {
            return prev;
        }
    }
    last
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Split leading `*` / `...` markers off a rendered type.
pub(crate) fn split_markers(raw: &str) -> (&str, &str) {
    let mut rest = raw;
    loop {
        if let Some(r) = rest.strip_prefix('*') {
            rest = r;
        } else if let Some(r) = rest.strip_prefix("...") {
            rest = r;
        } else {
            break;
        }
    }
    (&raw[..raw.len() - rest.len()], rest)
}

/// Where an embedded type points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedTarget {
    /// Already fully qualified.
    Resolved(String),
    /// A bare name that may be declared later in `package`.
    Deferred { package: String, name: String },
}

/// Resolves type references written inside one file of one package.
pub struct NameResolver<'a> {
    package: &'a str,
    imports: &'a ImportTable,
    /// Local names declared in this package so far.
    declared: &'a HashSet<String>,
}

impl<'a> NameResolver<'a> {
    pub fn new(package: &'a str, imports: &'a ImportTable, declared: &'a HashSet<String>) -> Self {
        Self { package, imports, declared }
    }

    pub fn package(&self) -> &str {
        self.package
    }

    /// Resolve a rendered reference such as `Foo`, `*Foo`, `pkg.Foo`, `...pkg.Foo`.
    pub fn resolve(&self, raw: &str) -> String {
        let (markers, name) = split_markers(raw);
        format!("{markers}{}", self.resolve_bare(name))
    }

    fn resolve_bare(&self, name: &str) -> String {
        if self.declared.contains(name) {
            return format!("{}.{name}", self.package);
        }
        if let Some((alias, sel)) = name.split_once('.') {
            return match self.imports.path_for(alias) {
                Some(path) => format!("{path}.{sel}"),
                None => name.to_string(),
            };
        }
        name.to_string()
    }

    /// Resolve a parsed type expression. Shapes the scanner does not resolve
    /// (generic instantiations, inline interfaces/structs, opaque text) keep
    /// their source spelling.
    pub fn resolve_expr(&self, ty: &TypeExpr) -> String {
        match ty {
            TypeExpr::Named(name) => self.resolve_bare(name),
            TypeExpr::Qualified { package, name } => self.resolve_bare(&format!("{package}.{name}")),
            TypeExpr::Pointer(inner) => format!("*{}", self.resolve_expr(inner)),
            TypeExpr::Variadic(inner) => format!("...{}", self.resolve_expr(inner)),
            TypeExpr::Generic { .. }
            | TypeExpr::Interface(_)
            | TypeExpr::Struct(_)
            | TypeExpr::Opaque(_) => ty.render(),
        }
    }

    /// Target of an embedded field or embedded interface element.
    pub fn embed_target(&self, ty: &TypeExpr) -> Option<EmbedTarget> {
        match ty.base_name()? {
            TypeExpr::Named(name) if self.declared.contains(name) => {
                Some(EmbedTarget::Resolved(format!("{}.{name}", self.package)))
            }
            TypeExpr::Named(name) => {
                Some(EmbedTarget::Deferred { package: self.package.to_string(), name: name.clone() })
            }
            TypeExpr::Qualified { package, name } => {
                Some(EmbedTarget::Resolved(self.resolve_bare(&format!("{package}.{name}"))))
            }
            _ => None,
        }
    }
}

/// Qualify a bare name that turned out to be declared in `package` once the
/// whole tree was known. Anything else is returned unchanged.
pub fn qualify_late(ty: &str, package: &str, declared: &HashSet<String>) -> String {
    let (markers, name) = split_markers(ty);
    if name.is_empty() || !name.chars().all(|c| c == '_' || c.is_alphanumeric()) {
        return ty.to_string();
    }
    let qualified = format!("{package}.{name}");
    if declared.contains(&qualified) {
        format!("{markers}{qualified}")
    } else {
        ty.to_string()
    }
}

/// A fully-qualified type rendered for use inside another package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Localized {
    pub text: String,
    /// Import the rendering needs and `imports` does not provide yet.
    pub import: Option<String>,
    /// Explicit alias for that import, set when its default name is already
    /// bound to another path in the file.
    pub alias: Option<String>,
}

/// Render a resolved type string as it must be spelled inside
/// `target_package`, given the target file's imports.
///
/// Types of `target_package` lose their qualifier; other packages are spelled
/// through the alias the file already uses, or else their default import
/// name. A default name taken by another import gets a numbered alias
/// (`log2`). Builtins and unresolved shapes are kept verbatim.
pub fn localize(ty: &str, target_package: &str, imports: &ImportTable) -> Localized {
    let (markers, name) = split_markers(ty);
    let verbatim = || Localized { text: ty.to_string(), import: None, alias: None };
    let Some((path, local)) = name.rsplit_once('.') else {
        return verbatim();
    };
    let is_path = !path.is_empty()
        && path.chars().all(|c| c.is_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '~'));
    let is_ident = local.chars().all(|c| c == '_' || c.is_alphanumeric());
    if !is_path || !is_ident {
        return verbatim();
    }
    if path == target_package {
        return Localized { text: format!("{markers}{local}"), import: None, alias: None };
    }
    if let Some(alias) = imports.alias_for(path) {
        return Localized { text: format!("{markers}{alias}.{local}"), import: None, alias: None };
    }
    let default = default_import_name(path);
    let alias = match imports.path_for(default) {
        None => None,
        Some(_) => (2..)
            .map(|n| format!("{default}{n}"))
            .find(|candidate| imports.path_for(candidate).is_none()),
    };
    let name = alias.as_deref().unwrap_or(default);
    Localized {
        text: format!("{markers}{name}.{local}"),
        import: Some(path.to_string()),
        alias,
    }
}
