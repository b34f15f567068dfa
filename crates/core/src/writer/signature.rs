use std::fmt;

use serde::Serialize;

use super::WriteError;
use crate::scanner::resolve::NameResolver;
pub(crate) use crate::syntax::ast::render_signature;
use crate::syntax::{self, ast::Param};

/// A method signature as written in configuration, e.g.
/// `Lookup(ctx context.Context, id string) (*User, error)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

impl MethodSignature {
    pub fn parse(text: &str) -> Result<Self, WriteError> {
        let spec = syntax::parse_method_spec(text.trim()).map_err(|source| {
            WriteError::InvalidSignature { signature: text.to_string(), source }
        })?;
        Ok(Self { name: spec.name, params: spec.signature.params, results: spec.signature.results })
    }

    pub fn param_types(&self) -> Vec<String> {
        self.params.iter().map(|p| p.ty.render()).collect()
    }

    pub fn result_types(&self) -> Vec<String> {
        self.results.iter().map(|p| p.ty.render()).collect()
    }

    /// Resolve every parameter and result type in the context of the file
    /// that declares the interface.
    pub fn resolve(&self, resolver: &NameResolver<'_>) -> ResolvedSignature {
        let resolve = |params: &[Param]| -> Vec<ResolvedParam> {
            params
                .iter()
                .map(|p| ResolvedParam { name: p.name.clone(), ty: resolver.resolve_expr(&p.ty) })
                .collect()
        };
        ResolvedSignature {
            name: self.name.clone(),
            params: resolve(&self.params),
            results: resolve(&self.results),
        }
    }
}

/// Renders as Go source text, normalized (`Name(a int, b string) (int, error)`).
impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render = |params: &[Param]| -> Vec<(Option<String>, String)> {
            params.iter().map(|p| (p.name.clone(), p.ty.render())).collect()
        };
        f.write_str(&render_signature(&self.name, &render(&self.params), &render(&self.results)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedParam {
    pub name: Option<String>,
    /// Fully-qualified where the type could be resolved.
    pub ty: String,
}

/// A signature whose types no longer depend on the declaring file's imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSignature {
    pub name: String,
    pub params: Vec<ResolvedParam>,
    pub results: Vec<ResolvedParam>,
}

/// Split a comma-separated list of Go expressions, ignoring commas nested in
/// brackets or string literals. Empty input yields no items.
pub fn split_values(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut current = String::new();
    for c in text.chars() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' && q != '`' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);
    let items: Vec<String> = items.into_iter().map(|s| s.trim().to_string()).collect();
    if items.len() == 1 && items[0].is_empty() {
        Vec::new()
    } else {
        items
    }
}
