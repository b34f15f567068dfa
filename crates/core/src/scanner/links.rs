//! Composition edges recorded during parsing and replayed once the whole tree
//! is known.

use tracing::debug;

use super::resolve::EmbedTarget;
use super::store::SymbolTable;

/// Which kind of record embeds the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerKind {
    Struct,
    Interface,
}

/// Edge actually attached by [`Link::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    EmbedsStruct,
    EmbedsInterface,
    InterfaceEmbedsInterface,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Fully-qualified name of the embedding type.
    pub owner: String,
    pub owner_kind: OwnerKind,
    pub target: EmbedTarget,
}

impl Link {
    /// Fully-qualified name of the embedded type.
    pub fn target_name(&self) -> String {
        match &self.target {
            EmbedTarget::Resolved(name) => name.clone(),
            EmbedTarget::Deferred { package, name } => format!("{package}.{name}"),
        }
    }

    /// Attach the edge. Returns `None` when either side is unknown.
    pub fn apply(&self, table: &mut SymbolTable) -> Option<EdgeKind> {
        let target = self.target_name();
        match self.owner_kind {
            OwnerKind::Struct => {
                let owner = table.struct_id(&self.owner)?;
                if let Some(embedded) = table.struct_id(&target) {
                    table.embed_struct(owner, embedded);
                    Some(EdgeKind::EmbedsStruct)
                } else {
                    let embedded = table.interface_id(&target)?;
                    table.embed_interface_in_struct(owner, embedded);
                    Some(EdgeKind::EmbedsInterface)
                }
            }
            OwnerKind::Interface => {
                let owner = table.interface_id(&self.owner)?;
                let embedded = table.interface_id(&target)?;
                table.embed_interface(owner, embedded);
                Some(EdgeKind::InterfaceEmbedsInterface)
            }
        }
    }
}

/// Queue of links waiting for the end of the traversal.
#[derive(Debug, Default)]
pub struct LinkRegistry {
    links: Vec<Link>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, link: Link) {
        self.links.push(link);
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Apply every queued link in registration order and return how many
    /// attached.
    pub fn replay(self, table: &mut SymbolTable) -> usize {
        let mut applied = 0;
        for link in self.links {
            match link.apply(table) {
                Some(kind) => {
                    debug!(owner = %link.owner, target = %link.target_name(), ?kind, "linked");
                    applied += 1;
                }
                None => {
                    debug!(owner = %link.owner, target = %link.target_name(), "dropped unresolved embedding");
                }
            }
        }
        applied
    }
}
