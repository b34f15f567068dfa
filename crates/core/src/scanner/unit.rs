//! Extraction of one parsed file into the symbol table.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use super::links::{Link, LinkRegistry, OwnerKind};
use super::resolve::{ImportTable, NameResolver};
use super::store::SymbolTable;
use crate::model::{BaseInfo, InterfaceInfo, MethodInfo, ReceiverInfo};
use crate::syntax::ast::{FuncDecl, InterfaceElem, Signature, SourceFile, TypeExpr};

/// Counts reported by [`parse_unit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitSummary {
    pub structs: usize,
    pub interfaces: usize,
    pub methods: usize,
    pub links: usize,
}

/// Record every type and method declared in `file` and queue its embedding
/// edges.
///
/// `declared` holds the local type names seen so far in the package and is
/// extended with this file's declarations before anything is resolved.
pub fn parse_unit(
    table: &mut SymbolTable,
    links: &mut LinkRegistry,
    package: &str,
    declared: &mut HashSet<String>,
    path: &Path,
    file: &SourceFile,
) -> UnitSummary {
    let imports = ImportTable::from_specs(&file.imports);
    for spec in file.type_specs() {
        declared.insert(spec.name.clone());
        table.declare(format!("{package}.{}", spec.name));
    }
    let resolver = NameResolver::new(package, &imports, declared);
    let mut summary = UnitSummary::default();
    let mut edges: Vec<(String, OwnerKind, &TypeExpr)> = Vec::new();

    for spec in file.type_specs() {
        let name = format!("{package}.{}", spec.name);
        match &spec.ty {
            TypeExpr::Struct(st) => {
                table.upsert_struct(&name, package, path);
                summary.structs += 1;
                for field in st.fields.iter().filter(|f| f.is_embedded()) {
                    edges.push((name.clone(), OwnerKind::Struct, &field.ty));
                }
            }
            TypeExpr::Interface(it) => {
                let mut info = InterfaceInfo::new(BaseInfo::new(&name, package, path));
                for elem in &it.elems {
                    match elem {
                        InterfaceElem::Method(spec) => {
                            info.methods.push(method_info(&resolver, &spec.name, &spec.signature));
                        }
                        InterfaceElem::Embedded(ty) => {
                            edges.push((name.clone(), OwnerKind::Interface, ty));
                        }
                        InterfaceElem::Union(text) => {
                            debug!(interface = %name, element = %text, "ignoring type-set element");
                        }
                    }
                }
                table.insert_interface(info);
                summary.interfaces += 1;
            }
            _ => {}
        }
    }

    for func in file.funcs() {
        if let Some((local, method)) = receiver_method(&resolver, func) {
            let id = table.upsert_struct(&format!("{package}.{local}"), package, path);
            table.struct_mut(id).add_method(method);
            summary.methods += 1;
        }
    }

    for (owner, owner_kind, ty) in edges {
        match resolver.embed_target(ty) {
            Some(target) => {
                links.push(Link { owner, owner_kind, target });
                summary.links += 1;
            }
            None => debug!(owner = %owner, embedded = %ty.render(), "embedding is not a named type"),
        }
    }

    debug!(
        file = %path.display(),
        package,
        structs = summary.structs,
        interfaces = summary.interfaces,
        methods = summary.methods,
        links = summary.links,
        "parsed unit"
    );
    summary
}

fn method_info(resolver: &NameResolver<'_>, name: &str, signature: &Signature) -> MethodInfo {
    let mut method = MethodInfo::new(name);
    for param in &signature.params {
        method.params.push(resolver.resolve_expr(&param.ty));
        method.param_names.push(param.name.clone());
    }
    method.returns = signature.results.iter().map(|r| resolver.resolve_expr(&r.ty)).collect();
    method
}

/// Receiver type's local name and the method attached to it.
fn receiver_method(resolver: &NameResolver<'_>, func: &FuncDecl) -> Option<(String, MethodInfo)> {
    let receiver = func.receiver.as_ref()?;
    let is_pointer = matches!(receiver.ty, TypeExpr::Pointer(_));
    let TypeExpr::Named(local) = receiver.ty.base_name()? else {
        return None;
    };
    let ty = if is_pointer { format!("*{local}") } else { local.clone() };

    let mut method = method_info(resolver, &func.name, &func.signature);
    method.receiver = Some(ReceiverInfo { name: receiver.name.clone(), ty, is_pointer });
    Some((local.clone(), method))
}
