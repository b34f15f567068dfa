use super::ast::{
    Decl, Field, FuncDecl, ImportName, ImportSpec, InterfaceElem, InterfaceType, MethodSpec,
    Param, Receiver, Signature, SourceFile, StructType, TypeExpr, TypeSpec,
};
use super::lexer::{Keyword, Punct, Token, TokenKind};
use super::ParseError;

type PResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over the token list of one file.
pub struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    idx: usize,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str, tokens: Vec<Token>) -> Self {
        Self { src, tokens, idx: 0 }
    }

    pub fn parse_file(mut self) -> PResult<SourceFile> {
        self.skip_semis();
        let package_pos = self.peek().pos;
        self.expect_keyword(Keyword::Package)?;
        let package = self.expect_ident()?;
        self.expect_semi()?;

        let mut imports = Vec::new();
        self.skip_semis();
        while self.at_keyword(Keyword::Import) {
            self.bump();
            if self.eat(Punct::LParen) {
                self.skip_semis();
                while !self.at(Punct::RParen) {
                    imports.push(self.import_spec()?);
                    self.expect_semi_or_close(Punct::RParen)?;
                    self.skip_semis();
                }
                self.expect(Punct::RParen)?;
            } else {
                imports.push(self.import_spec()?);
            }
            self.expect_semi()?;
            self.skip_semis();
        }

        let mut decls = Vec::new();
        loop {
            self.skip_semis();
            match &self.peek().kind {
                TokenKind::Eof => break,
                TokenKind::Keyword(Keyword::Type) => {
                    self.bump();
                    if self.eat(Punct::LParen) {
                        self.skip_semis();
                        while !self.at(Punct::RParen) {
                            decls.push(Decl::Type(self.type_spec()?));
                            self.expect_semi_or_close(Punct::RParen)?;
                            self.skip_semis();
                        }
                        self.expect(Punct::RParen)?;
                    } else {
                        decls.push(Decl::Type(self.type_spec()?));
                    }
                    self.expect_semi()?;
                }
                TokenKind::Keyword(Keyword::Func) => {
                    decls.push(Decl::Func(self.func_decl()?));
                    self.expect_semi()?;
                }
                TokenKind::Keyword(Keyword::Var) | TokenKind::Keyword(Keyword::Const) => {
                    self.bump();
                    self.skip_statement()?;
                }
                TokenKind::Keyword(Keyword::Import) => {
                    return Err(self.error("imports must appear before other declarations"));
                }
                _ => return Err(self.error("expected declaration")),
            }
        }

        Ok(SourceFile { package, package_pos, imports, decls })
    }

    pub fn parse_method_spec(mut self) -> PResult<MethodSpec> {
        let pos = self.peek().pos;
        let name = self.expect_ident()?;
        let signature = self.signature()?;
        self.skip_semis();
        if !matches!(self.peek().kind, TokenKind::Eof) {
            return Err(self.error("unexpected input after method signature"));
        }
        Ok(MethodSpec { name, signature, pos })
    }

    // ---- token helpers ----

    fn peek(&self) -> &Token {
        &self.tokens[self.idx.min(self.tokens.len() - 1)]
    }

    fn peek_nth(&self, n: usize) -> &Token {
        &self.tokens[(self.idx + n).min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.idx < self.tokens.len() - 1 {
            self.idx += 1;
        }
        tok
    }

    fn at(&self, punct: Punct) -> bool {
        self.peek().kind == TokenKind::Punct(punct)
    }

    fn at_keyword(&self, kw: Keyword) -> bool {
        self.peek().kind == TokenKind::Keyword(kw)
    }

    fn eat(&mut self, punct: Punct) -> bool {
        if self.at(punct) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: Punct) -> PResult<Token> {
        if self.at(punct) {
            Ok(self.bump())
        } else {
            Err(self.error(format!("expected {punct:?}")))
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> PResult<()> {
        if self.at_keyword(kw) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected keyword {kw:?}")))
        }
    }

    fn expect_ident(&mut self) -> PResult<String> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.bump();
                Ok(name)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn expect_semi(&mut self) -> PResult<()> {
        if self.eat(Punct::Semi) || matches!(self.peek().kind, TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.error("expected ';' or newline"))
        }
    }

    /// Inside a group a trailing element may be closed directly by `close`.
    fn expect_semi_or_close(&mut self, close: Punct) -> PResult<()> {
        if self.at(close) {
            Ok(())
        } else {
            self.expect_semi()
        }
    }

    fn skip_semis(&mut self) {
        while self.eat(Punct::Semi) {}
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let tok = self.peek();
        ParseError { line: tok.pos.line, column: tok.col, message: message.into() }
    }

    /// Whitespace-normalized source text between two byte offsets.
    fn text(&self, start: usize, end: usize) -> String {
        self.src[start..end].split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn prev_end(&self) -> usize {
        if self.idx == 0 {
            0
        } else {
            self.tokens[self.idx - 1].end
        }
    }

    /// Skip a balanced `open ... close` run, the current token being `open`.
    fn skip_balanced(&mut self) -> PResult<()> {
        let mut depth = 0usize;
        loop {
            let tok = self.bump();
            match tok.kind {
                TokenKind::Punct(Punct::LParen | Punct::LBrace | Punct::LBracket) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBrace | Punct::RBracket) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                TokenKind::Eof => {
                    return Err(ParseError {
                        line: tok.pos.line,
                        column: tok.col,
                        message: "unbalanced brackets".into(),
                    })
                }
                _ => {}
            }
        }
    }

    /// Skip tokens up to (not including) the `;` that ends the current statement.
    fn skip_statement(&mut self) -> PResult<()> {
        loop {
            match &self.peek().kind {
                TokenKind::Punct(Punct::Semi) | TokenKind::Eof => return Ok(()),
                TokenKind::Punct(Punct::LParen | Punct::LBrace | Punct::LBracket) => {
                    self.skip_balanced()?
                }
                TokenKind::Punct(Punct::RParen | Punct::RBrace | Punct::RBracket) => {
                    return Err(self.error("unexpected closing bracket"))
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Index of the token just after the bracket group starting at `from`.
    fn after_group(&self, from: usize) -> usize {
        let mut depth = 0usize;
        let mut i = from;
        while i < self.tokens.len() {
            match self.tokens[i].kind {
                TokenKind::Punct(Punct::LParen | Punct::LBrace | Punct::LBracket) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBrace | Punct::RBracket) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return i + 1;
                    }
                }
                TokenKind::Eof => return i,
                _ => {}
            }
            i += 1;
        }
        self.tokens.len() - 1
    }

    fn kind_at(&self, i: usize) -> &TokenKind {
        &self.tokens[i.min(self.tokens.len() - 1)].kind
    }

    // ---- declarations ----

    fn import_spec(&mut self) -> PResult<ImportSpec> {
        let pos = self.peek().pos;
        let name = match &self.peek().kind {
            TokenKind::Ident(alias) if alias == "_" => {
                self.bump();
                ImportName::Blank
            }
            TokenKind::Ident(alias) => {
                let alias = alias.clone();
                self.bump();
                ImportName::Alias(alias)
            }
            TokenKind::Punct(Punct::Dot) => {
                self.bump();
                ImportName::Dot
            }
            _ => ImportName::Default,
        };
        match self.bump().kind {
            TokenKind::Str(path) => Ok(ImportSpec { name, path, pos }),
            _ => Err(self.error("expected import path")),
        }
    }

    fn type_spec(&mut self) -> PResult<TypeSpec> {
        let pos = self.peek().pos;
        let name = self.expect_ident()?;
        let mut is_generic = false;
        if self.at(Punct::LBracket) && self.is_type_param_list() {
            self.skip_balanced()?;
            is_generic = true;
        }
        let is_alias = self.eat(Punct::Assign);
        let ty = self.parse_type()?;
        Ok(TypeSpec { name, is_alias, is_generic, ty, pos })
    }

    /// `[T any]` / `[K, V comparable]` versus an array length `[N]`.
    fn is_type_param_list(&self) -> bool {
        matches!(self.peek_nth(1).kind, TokenKind::Ident(_))
            && matches!(
                self.peek_nth(2).kind,
                TokenKind::Ident(_)
                    | TokenKind::Keyword(_)
                    | TokenKind::Punct(
                        Punct::Comma | Punct::Tilde | Punct::Star | Punct::LBracket
                    )
            )
    }

    fn func_decl(&mut self) -> PResult<FuncDecl> {
        let pos = self.peek().pos;
        self.expect_keyword(Keyword::Func)?;

        let receiver = if self.at(Punct::LParen) {
            let params = self.param_list()?;
            let mut params = params.into_iter();
            match (params.next(), params.next()) {
                (Some(param), None) => Some(Receiver { name: param.name, ty: param.ty }),
                _ => return Err(self.error("method must have exactly one receiver")),
            }
        } else {
            None
        };

        let name = self.expect_ident()?;
        if self.at(Punct::LBracket) {
            self.skip_balanced()?;
        }
        let signature = self.signature()?;
        if self.at(Punct::LBrace) {
            self.skip_balanced()?;
        }
        Ok(FuncDecl { name, receiver, signature, pos })
    }

    fn signature(&mut self) -> PResult<Signature> {
        let params = self.param_list()?;
        let results = if self.at(Punct::LParen) {
            self.param_list()?
        } else if self.starts_type() {
            vec![Param { name: None, ty: self.parse_type()? }]
        } else {
            Vec::new()
        };
        Ok(Signature { params, results })
    }

    fn starts_type(&self) -> bool {
        match &self.peek().kind {
            TokenKind::Ident(_) => true,
            TokenKind::Keyword(kw) => matches!(
                kw,
                Keyword::Map | Keyword::Chan | Keyword::Func | Keyword::Interface | Keyword::Struct
            ),
            TokenKind::Punct(p) => {
                matches!(p, Punct::Star | Punct::LBracket | Punct::Arrow | Punct::LParen)
            }
            _ => false,
        }
    }

    /// Parse `( ... )` applying Go's grouping rule: when any entry is a
    /// `name Type` pair, bare entries are names sharing the next pair's type.
    fn param_list(&mut self) -> PResult<Vec<Param>> {
        enum Entry {
            Single(TypeExpr),
            Pair(String, TypeExpr),
        }

        self.expect(Punct::LParen)?;
        let mut entries = Vec::new();
        while !self.at(Punct::RParen) {
            let first = self.parse_type()?;
            if self.at(Punct::Comma) || self.at(Punct::RParen) {
                entries.push(Entry::Single(first));
            } else {
                let TypeExpr::Named(name) = first else {
                    return Err(self.error("expected parameter name"));
                };
                entries.push(Entry::Pair(name, self.parse_type()?));
            }
            if !self.eat(Punct::Comma) {
                break;
            }
        }
        self.expect(Punct::RParen)?;

        let named = entries.iter().any(|e| matches!(e, Entry::Pair(..)));
        if !named {
            return Ok(entries
                .into_iter()
                .map(|e| match e {
                    Entry::Single(ty) | Entry::Pair(_, ty) => Param { name: None, ty },
                })
                .collect());
        }

        let mut params = Vec::with_capacity(entries.len());
        let mut shared: Option<TypeExpr> = None;
        for entry in entries.into_iter().rev() {
            match entry {
                Entry::Pair(name, ty) => {
                    shared = Some(ty.clone());
                    params.push(Param { name: Some(name), ty });
                }
                Entry::Single(TypeExpr::Named(name)) => match &shared {
                    Some(ty) => params.push(Param { name: Some(name), ty: ty.clone() }),
                    None => return Err(self.error("missing parameter type")),
                },
                Entry::Single(_) => return Err(self.error("mixed named and unnamed parameters")),
            }
        }
        params.reverse();
        Ok(params)
    }

    // ---- types ----

    fn parse_type(&mut self) -> PResult<TypeExpr> {
        let start = self.peek().pos.offset;
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                self.bump();
                let base = if self.at(Punct::Dot)
                    && matches!(self.peek_nth(1).kind, TokenKind::Ident(_))
                {
                    self.bump();
                    let sel = self.expect_ident()?;
                    TypeExpr::Qualified { package: name, name: sel }
                } else {
                    TypeExpr::Named(name)
                };
                if self.at(Punct::LBracket) && self.is_type_args() {
                    let open = self.peek().end;
                    self.skip_balanced()?;
                    let close = self.tokens[self.idx - 1].pos.offset;
                    let args = self.text(open, close);
                    return Ok(TypeExpr::Generic { base: Box::new(base), args });
                }
                Ok(base)
            }
            TokenKind::Punct(Punct::Star) => {
                self.bump();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            TokenKind::Punct(Punct::Ellipsis) => {
                self.bump();
                Ok(TypeExpr::Variadic(Box::new(self.parse_type()?)))
            }
            TokenKind::Punct(Punct::LParen) => {
                self.bump();
                let inner = self.parse_type()?;
                self.expect(Punct::RParen)?;
                Ok(inner)
            }
            TokenKind::Punct(Punct::LBracket) => {
                self.skip_balanced()?;
                self.parse_type()?;
                Ok(TypeExpr::Opaque(self.text(start, self.prev_end())))
            }
            TokenKind::Punct(Punct::Arrow) => {
                self.bump();
                self.expect_keyword(Keyword::Chan)?;
                self.parse_type()?;
                Ok(TypeExpr::Opaque(self.text(start, self.prev_end())))
            }
            TokenKind::Keyword(Keyword::Chan) => {
                self.bump();
                self.eat(Punct::Arrow);
                self.parse_type()?;
                Ok(TypeExpr::Opaque(self.text(start, self.prev_end())))
            }
            TokenKind::Keyword(Keyword::Map) => {
                self.bump();
                self.expect(Punct::LBracket)?;
                self.parse_type()?;
                self.expect(Punct::RBracket)?;
                self.parse_type()?;
                Ok(TypeExpr::Opaque(self.text(start, self.prev_end())))
            }
            TokenKind::Keyword(Keyword::Func) => {
                self.bump();
                self.signature()?;
                Ok(TypeExpr::Opaque(self.text(start, self.prev_end())))
            }
            TokenKind::Keyword(Keyword::Interface) => {
                self.bump();
                Ok(TypeExpr::Interface(self.interface_body()?))
            }
            TokenKind::Keyword(Keyword::Struct) => {
                self.bump();
                Ok(TypeExpr::Struct(self.struct_body()?))
            }
            _ => Err(self.error("expected type")),
        }
    }

    /// After a type name, `[` opens type arguments unless the bracket group
    /// is followed by another type (then it belongs to an array/slice that
    /// follows a parameter or field name).
    fn is_type_args(&self) -> bool {
        if matches!(self.peek_nth(1).kind, TokenKind::Punct(Punct::RBracket)) {
            return false;
        }
        let after = self.after_group(self.idx);
        !matches!(
            self.kind_at(after),
            TokenKind::Ident(_)
                | TokenKind::Punct(Punct::Star | Punct::LBracket | Punct::LParen | Punct::Arrow)
                | TokenKind::Keyword(
                    Keyword::Map
                        | Keyword::Chan
                        | Keyword::Func
                        | Keyword::Interface
                        | Keyword::Struct
                )
        )
    }

    fn struct_body(&mut self) -> PResult<StructType> {
        let lbrace = self.expect(Punct::LBrace)?.pos;
        let mut fields = Vec::new();
        self.skip_semis();
        while !self.at(Punct::RBrace) {
            let mut field = self.field()?;
            if matches!(self.peek().kind, TokenKind::Str(_)) {
                let tag = self.bump();
                field.tag = Some(self.src[tag.pos.offset..tag.end].to_string());
            }
            fields.push(field);
            self.expect_semi_or_close(Punct::RBrace)?;
            self.skip_semis();
        }
        let rbrace = self.expect(Punct::RBrace)?.pos;
        Ok(StructType { fields, lbrace, rbrace })
    }

    fn field(&mut self) -> PResult<Field> {
        if self.at(Punct::Star) {
            return Ok(Field { names: Vec::new(), ty: self.parse_type()?, tag: None });
        }
        let TokenKind::Ident(_) = self.peek().kind else {
            return Err(self.error("expected field"));
        };

        let embedded = match &self.peek_nth(1).kind {
            TokenKind::Punct(Punct::Dot | Punct::Semi | Punct::RBrace) | TokenKind::Str(_) => true,
            TokenKind::Punct(Punct::LBracket) => matches!(
                self.kind_at(self.after_group(self.idx + 1)),
                TokenKind::Punct(Punct::Semi | Punct::RBrace) | TokenKind::Str(_)
            ),
            _ => false,
        };
        if embedded {
            return Ok(Field { names: Vec::new(), ty: self.parse_type()?, tag: None });
        }

        let mut names = vec![self.expect_ident()?];
        while self.eat(Punct::Comma) {
            names.push(self.expect_ident()?);
        }
        let ty = self.parse_type()?;
        Ok(Field { names, ty, tag: None })
    }

    fn interface_body(&mut self) -> PResult<InterfaceType> {
        let lbrace = self.expect(Punct::LBrace)?.pos;
        let mut elems = Vec::new();
        self.skip_semis();
        while !self.at(Punct::RBrace) {
            elems.push(self.interface_elem()?);
            self.expect_semi_or_close(Punct::RBrace)?;
            self.skip_semis();
        }
        let rbrace = self.expect(Punct::RBrace)?.pos;
        Ok(InterfaceType { elems, lbrace, rbrace })
    }

    fn interface_elem(&mut self) -> PResult<InterfaceElem> {
        let pos = self.peek().pos;
        if let TokenKind::Ident(name) = &self.peek().kind {
            if matches!(self.peek_nth(1).kind, TokenKind::Punct(Punct::LParen)) {
                let name = name.clone();
                self.bump();
                let signature = self.signature()?;
                return Ok(InterfaceElem::Method(MethodSpec { name, signature, pos }));
            }
        }

        let start = self.idx;
        let is_union = self.at(Punct::Tilde) || {
            let probe = self.parse_type();
            probe.is_err() || self.at(Punct::Pipe)
        };
        if !is_union {
            self.idx = start;
            return Ok(InterfaceElem::Embedded(self.parse_type()?));
        }

        self.idx = start;
        loop {
            match &self.peek().kind {
                TokenKind::Punct(Punct::Semi | Punct::RBrace) | TokenKind::Eof => break,
                TokenKind::Punct(Punct::LParen | Punct::LBrace | Punct::LBracket) => {
                    self.skip_balanced()?
                }
                _ => {
                    self.bump();
                }
            }
        }
        Ok(InterfaceElem::Union(self.text(pos.offset, self.prev_end())))
    }
}
