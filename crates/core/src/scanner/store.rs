use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use super::resolve;
use super::ScanError;
use crate::model::{
    implements, BaseInfo, InterfaceId, InterfaceInfo, MethodInfo, MethodToken, StructId,
    StructInfo,
};

/// Every struct and interface of one scan session, keyed by fully-qualified
/// name. Records are stored in arenas and refer to each other by id.
#[derive(Debug, Default, Serialize)]
pub struct SymbolTable {
    structs: Vec<StructInfo>,
    interfaces: Vec<InterfaceInfo>,
    #[serde(skip)]
    struct_index: HashMap<String, StructId>,
    #[serde(skip)]
    interface_index: HashMap<String, InterfaceId>,
    /// Fully-qualified names of every declared named type.
    #[serde(skip)]
    declared: HashSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structs(&self) -> &[StructInfo] {
        &self.structs
    }

    pub fn interfaces(&self) -> &[InterfaceInfo] {
        &self.interfaces
    }

    pub fn struct_id(&self, name: &str) -> Option<StructId> {
        self.struct_index.get(name).copied()
    }

    pub fn interface_id(&self, name: &str) -> Option<InterfaceId> {
        self.interface_index.get(name).copied()
    }

    pub fn struct_info(&self, id: StructId) -> &StructInfo {
        &self.structs[id.0]
    }

    pub fn interface_info(&self, id: InterfaceId) -> &InterfaceInfo {
        &self.interfaces[id.0]
    }

    pub fn lookup_struct(&self, name: &str) -> Option<&StructInfo> {
        self.struct_id(name).map(|id| self.struct_info(id))
    }

    /// Look up an interface by fully-qualified name, e.g. `example.com/app/store.Store`.
    pub fn lookup_interface(&self, name: &str) -> Option<&InterfaceInfo> {
        self.interface_id(name).map(|id| self.interface_info(id))
    }

    /// Structs recorded as implementing `interface`.
    pub fn implementers<'a>(
        &'a self,
        interface: &'a InterfaceInfo,
    ) -> impl Iterator<Item = &'a StructInfo> + 'a {
        interface.implementers.iter().map(|id| self.struct_info(*id))
    }

    pub fn declare(&mut self, name: impl Into<String>) {
        self.declared.insert(name.into());
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    /// Local names of the types declared in `package`.
    pub fn declared_in(&self, package: &str) -> HashSet<String> {
        self.declared
            .iter()
            .filter_map(|name| name.rsplit_once('.'))
            .filter(|(pkg, _)| *pkg == package)
            .map(|(_, local)| local.to_string())
            .collect()
    }

    /// Fetch or create the struct record for `name`, recording `file` as a
    /// contributing file either way.
    pub fn upsert_struct(&mut self, name: &str, package: &str, file: &std::path::Path) -> StructId {
        if let Some(id) = self.struct_id(name) {
            self.structs[id.0].base.add_file(file);
            return id;
        }
        let id = StructId(self.structs.len());
        self.structs.push(StructInfo::new(BaseInfo::new(name, package, file)));
        self.struct_index.insert(name.to_string(), id);
        id
    }

    pub fn struct_mut(&mut self, id: StructId) -> &mut StructInfo {
        &mut self.structs[id.0]
    }

    /// Insert an interface, replacing an earlier record of the same name.
    pub fn insert_interface(&mut self, info: InterfaceInfo) -> InterfaceId {
        if let Some(id) = self.interface_id(info.name()) {
            warn!(interface = %info.name(), "interface redeclared; keeping the later declaration");
            self.interfaces[id.0] = info;
            return id;
        }
        let id = InterfaceId(self.interfaces.len());
        self.interface_index.insert(info.name().to_string(), id);
        self.interfaces.push(info);
        id
    }

    pub fn embed_struct(&mut self, owner: StructId, embedded: StructId) {
        let list = &mut self.structs[owner.0].embedded_structs;
        if !list.contains(&embedded) {
            list.push(embedded);
        }
    }

    pub fn embed_interface_in_struct(&mut self, owner: StructId, embedded: InterfaceId) {
        let list = &mut self.structs[owner.0].embedded_interfaces;
        if !list.contains(&embedded) {
            list.push(embedded);
        }
    }

    pub fn embed_interface(&mut self, owner: InterfaceId, embedded: InterfaceId) {
        let list = &mut self.interfaces[owner.0].embedded;
        if !list.contains(&embedded) {
            list.push(embedded);
        }
    }

    /// Re-qualify bare parameter and return types whose declaration was only
    /// seen after the method that uses them.
    pub fn qualify_late(&mut self) {
        let declared = &self.declared;
        let requalify = |package: &str, method: &mut MethodInfo| {
            for ty in method.params.iter_mut().chain(method.returns.iter_mut()) {
                *ty = resolve::qualify_late(ty, package, declared);
            }
        };
        for st in &mut self.structs {
            let package = st.base.package.clone();
            st.methods.values_mut().for_each(|m| requalify(&package, m));
        }
        for iface in &mut self.interfaces {
            let package = iface.base.package.clone();
            iface.methods.iter_mut().for_each(|m| requalify(&package, m));
        }
    }

    /// Flattened, sorted token set of a struct: its own methods plus
    /// everything reachable through embedding.
    pub fn struct_tokens(&self, id: StructId) -> Vec<MethodToken> {
        let mut out = Vec::new();
        self.collect_struct(id, &mut HashSet::new(), &mut HashSet::new(), &mut out);
        finish(out)
    }

    /// Flattened, sorted token set of an interface.
    pub fn interface_tokens(&self, id: InterfaceId) -> Vec<MethodToken> {
        let mut out = Vec::new();
        self.collect_interface(id, &mut HashSet::new(), &mut out);
        finish(out)
    }

    fn collect_struct(
        &self,
        id: StructId,
        seen_structs: &mut HashSet<StructId>,
        seen_interfaces: &mut HashSet<InterfaceId>,
        out: &mut Vec<MethodToken>,
    ) {
        if !seen_structs.insert(id) {
            return;
        }
        let st = &self.structs[id.0];
        out.extend(st.methods.values().map(MethodInfo::token));
        for &embedded in &st.embedded_structs {
            self.collect_struct(embedded, seen_structs, seen_interfaces, out);
        }
        for &embedded in &st.embedded_interfaces {
            self.collect_interface(embedded, seen_interfaces, out);
        }
    }

    fn collect_interface(
        &self,
        id: InterfaceId,
        seen: &mut HashSet<InterfaceId>,
        out: &mut Vec<MethodToken>,
    ) {
        if !seen.insert(id) {
            return;
        }
        let iface = &self.interfaces[id.0];
        out.extend(iface.methods.iter().map(MethodInfo::token));
        for &embedded in &iface.embedded {
            self.collect_interface(embedded, seen, out);
        }
    }

    /// Compute the token sets of every struct and interface. Structs are
    /// flattened on a second thread while this one handles interfaces.
    pub fn compute_tokens(&mut self) {
        let (struct_tokens, interface_tokens) = std::thread::scope(|scope| {
            let table = &*self;
            let structs = scope.spawn(move || {
                (0..table.structs.len()).map(|i| table.struct_tokens(StructId(i))).collect::<Vec<_>>()
            });
            let interfaces: Vec<_> =
                (0..table.interfaces.len()).map(|i| table.interface_tokens(InterfaceId(i))).collect();
            let structs = structs.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (structs, interfaces)
        });
        for (st, tokens) in self.structs.iter_mut().zip(struct_tokens) {
            st.base.tokens = tokens;
        }
        for (iface, tokens) in self.interfaces.iter_mut().zip(interface_tokens) {
            iface.base.tokens = tokens;
        }
    }

    /// Run the implements test for every struct against every interface.
    pub fn match_implementers(&mut self) -> usize {
        let mut matched = 0;
        for iface in &mut self.interfaces {
            let found: Vec<StructId> = self
                .structs
                .iter()
                .enumerate()
                .filter(|(_, st)| implements(st, iface))
                .map(|(i, _)| StructId(i))
                .collect();
            matched += found.len();
            iface.implementers = found;
        }
        matched
    }

    /// Methods of an interface including those of embedded interfaces,
    /// outermost first.
    pub fn flattened_methods(&self, id: InterfaceId) -> Vec<MethodInfo> {
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        let mut methods: Vec<MethodInfo> = Vec::new();
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            let iface = &self.interfaces[next.0];
            methods.extend(iface.methods.iter().cloned());
            stack.extend(iface.embedded.iter().rev());
        }
        methods
    }

    /// Find a method by plain name on an interface or, depth first, on the
    /// interfaces it embeds.
    pub fn find_interface_method(&self, id: InterfaceId, name: &str) -> Option<&MethodInfo> {
        self.find_method_in(id, name, &mut HashSet::new())
    }

    fn find_method_in(
        &self,
        id: InterfaceId,
        name: &str,
        seen: &mut HashSet<InterfaceId>,
    ) -> Option<&MethodInfo> {
        if !seen.insert(id) {
            return None;
        }
        let iface = &self.interfaces[id.0];
        if let Some(method) = iface.methods.iter().find(|m| m.name == name) {
            return Some(method);
        }
        iface.embedded.iter().find_map(|&embedded| self.find_method_in(embedded, name, seen))
    }

    /// Bring an interface of another tree into this one.
    ///
    /// The copy is self-contained (its methods are flattened and it embeds
    /// nothing of this table), ignores the methods named in `excluded` when
    /// matching, and is matched against every struct of this table.
    pub fn adopt_interface(
        &mut self,
        donor: &SymbolTable,
        name: &str,
        excluded: &[String],
    ) -> Result<InterfaceId, ScanError> {
        let source_id =
            donor.interface_id(name).ok_or_else(|| ScanError::InterfaceNotFound(name.to_string()))?;
        if self.interface_id(name).is_some() {
            return Err(ScanError::InterfaceCollision(name.to_string()));
        }

        let source = donor.interface_info(source_id);
        let mut copy = InterfaceInfo::new(source.base.clone());
        copy.methods = donor.flattened_methods(source_id);
        if copy.base.tokens.is_empty() {
            copy.base.tokens = donor.interface_tokens(source_id);
        }
        for method_name in excluded {
            match donor.find_interface_method(source_id, method_name) {
                Some(method) => {
                    copy.excluded.insert(method.token());
                }
                None => warn!(interface = %name, method = %method_name, "excluded method not declared"),
            }
        }
        copy.implementers = self
            .structs
            .iter()
            .enumerate()
            .filter(|(_, st)| implements(st, &copy))
            .map(|(i, _)| StructId(i))
            .collect();
        debug!(interface = %name, implementers = copy.implementers.len(), "adopted interface");
        Ok(self.insert_interface(copy))
    }
}

fn finish(mut tokens: Vec<MethodToken>) -> Vec<MethodToken> {
    tokens.sort();
    tokens.dedup();
    tokens
}
