//! Declaration-level syntax tree for one Go source file.
//!
//! Only the parts the scanner needs are modelled: the package clause, imports,
//! type declarations and function declarations. Function bodies, `var` and
//! `const` declarations are skipped by the parser and never appear here.

/// Position of a token in its file (1-based line, byte offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub package: String,
    /// Position of the `package` keyword.
    pub package_pos: Pos,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
}

impl SourceFile {
    /// Iterate over every type spec, including those inside grouped `type ( ... )` blocks.
    pub fn type_specs(&self) -> impl Iterator<Item = &TypeSpec> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Type(spec) => Some(spec),
            Decl::Func(_) => None,
        })
    }

    /// Iterate over every function declaration, with or without a receiver.
    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Func(func) => Some(func),
            Decl::Type(_) => None,
        })
    }
}

/// How an import names its package inside the importing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportName {
    /// No explicit name; the package is known by its default name.
    Default,
    /// `import alias "path"`.
    Alias(String),
    /// `import . "path"`.
    Dot,
    /// `import _ "path"`.
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: ImportName,
    pub path: String,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Type(TypeSpec),
    Func(FuncDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    /// `type A = B` rather than `type A B`.
    pub is_alias: bool,
    /// The declaration carries a type parameter list.
    pub is_generic: bool,
    pub ty: TypeExpr,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub receiver: Option<Receiver>,
    pub signature: Signature,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub fields: Vec<Field>,
    pub lbrace: Pos,
    pub rbrace: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Empty for an embedded (anonymous) field.
    pub names: Vec<String>,
    pub ty: TypeExpr,
    /// Raw tag literal, quotes included.
    pub tag: Option<String>,
}

impl Field {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }

    fn render(&self) -> String {
        let mut out = self.names.join(", ");
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&self.ty.render());
        if let Some(tag) = &self.tag {
            out.push(' ');
            out.push_str(tag);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    pub elems: Vec<InterfaceElem>,
    pub lbrace: Pos,
    pub rbrace: Pos,
}

impl InterfaceType {
    pub fn methods(&self) -> impl Iterator<Item = &MethodSpec> {
        self.elems.iter().filter_map(|e| match e {
            InterfaceElem::Method(m) => Some(m),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceElem {
    Method(MethodSpec),
    Embedded(TypeExpr),
    /// Type-set element such as `~int | ~string`; kept as normalized text.
    Union(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSpec {
    pub name: String,
    pub signature: Signature,
    pub pos: Pos,
}

/// A type expression as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `Foo`
    Named(String),
    /// `pkg.Foo`
    Qualified { package: String, name: String },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `...T` (final parameter only)
    Variadic(Box<TypeExpr>),
    /// `Foo[A, B]`; the arguments are kept as normalized text.
    Generic { base: Box<TypeExpr>, args: String },
    Interface(InterfaceType),
    Struct(StructType),
    /// Any shape the scanner does not resolve (slices, arrays, maps, channels,
    /// function types), carried as whitespace-normalized source text.
    Opaque(String),
}

impl TypeExpr {
    /// Source-like rendering used for tokens and diagnostics. Inline
    /// interface and struct types render their members in one line, the way
    /// gofmt prints them (`interface{ Close() error; Reset() }`).
    pub fn render(&self) -> String {
        match self {
            TypeExpr::Named(name) => name.clone(),
            TypeExpr::Qualified { package, name } => format!("{package}.{name}"),
            TypeExpr::Pointer(inner) => format!("*{}", inner.render()),
            TypeExpr::Variadic(inner) => format!("...{}", inner.render()),
            TypeExpr::Generic { base, args } => format!("{}[{args}]", base.render()),
            TypeExpr::Interface(iface) => {
                let elems: Vec<String> = iface
                    .elems
                    .iter()
                    .map(|elem| match elem {
                        InterfaceElem::Method(m) => m.render(),
                        InterfaceElem::Embedded(ty) => ty.render(),
                        InterfaceElem::Union(text) => text.clone(),
                    })
                    .collect();
                braced("interface", &elems)
            }
            TypeExpr::Struct(st) => {
                let fields: Vec<String> = st.fields.iter().map(Field::render).collect();
                braced("struct", &fields)
            }
            TypeExpr::Opaque(text) => text.clone(),
        }
    }

    /// Strip pointer and generic wrappers down to the named type they refer to.
    pub fn base_name(&self) -> Option<&TypeExpr> {
        match self {
            TypeExpr::Named(_) | TypeExpr::Qualified { .. } => Some(self),
            TypeExpr::Pointer(inner) | TypeExpr::Generic { base: inner, .. } => inner.base_name(),
            _ => None,
        }
    }
}

impl MethodSpec {
    /// `Name(a T) R` with every type rendered.
    pub fn render(&self) -> String {
        let parts = |params: &[Param]| -> Vec<(Option<String>, String)> {
            params.iter().map(|p| (p.name.clone(), p.ty.render())).collect()
        };
        render_signature(&self.name, &parts(&self.signature.params), &parts(&self.signature.results))
    }
}

fn braced(keyword: &str, members: &[String]) -> String {
    if members.is_empty() {
        format!("{keyword}{{}}")
    } else {
        format!("{keyword}{{ {} }}", members.join("; "))
    }
}

/// `Name(a T, b U) R` / `Name(T) (R, S)` from already-rendered parts.
pub(crate) fn render_signature(
    name: &str,
    params: &[(Option<String>, String)],
    results: &[(Option<String>, String)],
) -> String {
    let list = |items: &[(Option<String>, String)]| {
        items
            .iter()
            .map(|(n, ty)| match n {
                Some(n) => format!("{n} {ty}"),
                None => ty.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut out = format!("{name}({})", list(params));
    match results {
        [] => {}
        [(None, ty)] => {
            out.push(' ');
            out.push_str(ty);
        }
        _ => {
            out.push_str(" (");
            out.push_str(&list(results));
            out.push(')');
        }
    }
    out
}
