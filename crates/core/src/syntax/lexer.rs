use super::ast::Pos;
use super::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,
}

impl Keyword {
    fn lookup(ident: &str) -> Option<Self> {
        let kw = match ident {
            "break" => Keyword::Break,
            "case" => Keyword::Case,
            "chan" => Keyword::Chan,
            "const" => Keyword::Const,
            "continue" => Keyword::Continue,
            "default" => Keyword::Default,
            "defer" => Keyword::Defer,
            "else" => Keyword::Else,
            "fallthrough" => Keyword::Fallthrough,
            "for" => Keyword::For,
            "func" => Keyword::Func,
            "go" => Keyword::Go,
            "goto" => Keyword::Goto,
            "if" => Keyword::If,
            "import" => Keyword::Import,
            "interface" => Keyword::Interface,
            "map" => Keyword::Map,
            "package" => Keyword::Package,
            "range" => Keyword::Range,
            "return" => Keyword::Return,
            "select" => Keyword::Select,
            "struct" => Keyword::Struct,
            "switch" => Keyword::Switch,
            "type" => Keyword::Type,
            "var" => Keyword::Var,
            _ => return None,
        };
        Some(kw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semi,
    Dot,
    Ellipsis,
    Star,
    Assign,
    Arrow,
    Tilde,
    Pipe,
    IncDec,
    /// Any other operator; the parser only ever skips these.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Keyword(Keyword),
    /// Number or rune literal, kept verbatim.
    Literal(String),
    /// String literal with its quotes removed.
    Str(String),
    Punct(Punct),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
    pub col: usize,
    /// Byte offset one past the last byte of the token.
    pub end: usize,
}

impl Token {
    fn ends_statement(&self) -> bool {
        match &self.kind {
            TokenKind::Ident(_) | TokenKind::Literal(_) | TokenKind::Str(_) => true,
            TokenKind::Keyword(kw) => matches!(
                kw,
                Keyword::Break | Keyword::Continue | Keyword::Fallthrough | Keyword::Return
            ),
            TokenKind::Punct(p) => matches!(
                p,
                Punct::RParen | Punct::RBracket | Punct::RBrace | Punct::IncDec
            ),
            TokenKind::Eof => false,
        }
    }
}

const OPERATORS: &[(&str, Punct)] = &[
    ("...", Punct::Ellipsis),
    ("<<=", Punct::Other),
    (">>=", Punct::Other),
    ("&^=", Punct::Other),
    ("++", Punct::IncDec),
    ("--", Punct::IncDec),
    ("<-", Punct::Arrow),
    ("&&", Punct::Other),
    ("||", Punct::Other),
    ("==", Punct::Other),
    ("!=", Punct::Other),
    ("<=", Punct::Other),
    (">=", Punct::Other),
    (":=", Punct::Other),
    ("+=", Punct::Other),
    ("-=", Punct::Other),
    ("*=", Punct::Other),
    ("/=", Punct::Other),
    ("%=", Punct::Other),
    ("&=", Punct::Other),
    ("|=", Punct::Other),
    ("^=", Punct::Other),
    ("<<", Punct::Other),
    (">>", Punct::Other),
    ("&^", Punct::Other),
    ("(", Punct::LParen),
    (")", Punct::RParen),
    ("{", Punct::LBrace),
    ("}", Punct::RBrace),
    ("[", Punct::LBracket),
    ("]", Punct::RBracket),
    (",", Punct::Comma),
    (";", Punct::Semi),
    (".", Punct::Dot),
    ("*", Punct::Star),
    ("=", Punct::Assign),
    ("~", Punct::Tilde),
    ("|", Punct::Pipe),
    ("+", Punct::Other),
    ("-", Punct::Other),
    ("/", Punct::Other),
    ("%", Punct::Other),
    ("&", Punct::Other),
    ("^", Punct::Other),
    ("<", Punct::Other),
    (">", Punct::Other),
    ("!", Punct::Other),
    (":", Punct::Other),
];

/// Go tokenizer with automatic semicolon insertion.
pub struct Lexer<'a> {
    src: &'a str,
    idx: usize,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, idx: 0, line: 1, col: 1, tokens: Vec::new() }
    }

    /// Tokenize the whole input. The returned list always ends with `Eof`.
    pub fn lex_all(mut self) -> Result<Vec<Token>, ParseError> {
        loop {
            let newline = self.skip_trivia()?;
            if newline {
                self.insert_semi();
            }
            let Some(c) = self.peek() else {
                self.insert_semi();
                let pos = Pos { line: self.line, offset: self.idx };
                self.tokens.push(Token { kind: TokenKind::Eof, pos, col: self.col, end: self.idx });
                return Ok(self.tokens);
            };

            let start = Pos { line: self.line, offset: self.idx };
            let col = self.col;
            let kind = if c == '_' || c.is_alphabetic() {
                let ident = self.take_while(|c| c == '_' || c.is_alphanumeric());
                match Keyword::lookup(ident) {
                    Some(kw) => TokenKind::Keyword(kw),
                    None => TokenKind::Ident(ident.to_string()),
                }
            } else if c.is_ascii_digit()
                || (c == '.' && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()))
            {
                TokenKind::Literal(self.number())
            } else if c == '"' {
                TokenKind::Str(self.interpreted_string()?)
            } else if c == '`' {
                TokenKind::Str(self.raw_string()?)
            } else if c == '\'' {
                TokenKind::Literal(self.rune()?)
            } else {
                TokenKind::Punct(self.operator()?)
            };

            self.tokens.push(Token { kind, pos: start, col, end: self.idx });
        }
    }

    fn insert_semi(&mut self) {
        if let Some(last) = self.tokens.last() {
            if last.ends_statement() {
                let pos = Pos { line: self.line, offset: self.idx };
                self.tokens.push(Token {
                    kind: TokenKind::Punct(Punct::Semi),
                    pos,
                    col: self.col,
                    end: self.idx,
                });
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.idx..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.idx..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.idx;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.idx]
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError { line: self.line, column: self.col, message: message.into() }
    }

    /// Skip whitespace and comments. Returns true when a newline was crossed.
    fn skip_trivia(&mut self) -> Result<bool, ParseError> {
        let mut newline = false;
        loop {
            match self.peek() {
                Some('\n') => {
                    newline = true;
                    self.bump();
                }
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_nth(1) == Some('/') => {
                    self.take_while(|c| c != '\n');
                }
                Some('/') if self.peek_nth(1) == Some('*') => {
                    let (line, col) = (self.line, self.col);
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some('\n') => newline = true,
                            Some(_) => {}
                            None => {
                                return Err(ParseError {
                                    line,
                                    column: col,
                                    message: "comment not terminated".into(),
                                })
                            }
                        }
                    }
                }
                _ => return Ok(newline),
            }
        }
    }

    fn number(&mut self) -> String {
        let start = self.idx;
        let mut prev = '\0';
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '+' || c == '-') && matches!(prev, 'e' | 'E' | 'p' | 'P');
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                prev = c;
                self.bump();
            } else {
                break;
            }
        }
        self.src[start..self.idx].to_string()
    }

    fn interpreted_string(&mut self) -> Result<String, ParseError> {
        let (line, col) = (self.line, self.col);
        self.bump();
        let start = self.idx;
        loop {
            match self.peek() {
                Some('"') => {
                    let value = self.src[start..self.idx].to_string();
                    self.bump();
                    return Ok(value);
                }
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some('\n') | None => {
                    return Err(ParseError {
                        line,
                        column: col,
                        message: "string literal not terminated".into(),
                    })
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn raw_string(&mut self) -> Result<String, ParseError> {
        let (line, col) = (self.line, self.col);
        self.bump();
        let start = self.idx;
        while let Some(c) = self.peek() {
            if c == '`' {
                let value = self.src[start..self.idx].to_string();
                self.bump();
                return Ok(value);
            }
            self.bump();
        }
        Err(ParseError { line, column: col, message: "raw string literal not terminated".into() })
    }

    fn rune(&mut self) -> Result<String, ParseError> {
        let (line, col) = (self.line, self.col);
        let start = self.idx;
        self.bump();
        loop {
            match self.peek() {
                Some('\'') => {
                    self.bump();
                    return Ok(self.src[start..self.idx].to_string());
                }
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some('\n') | None => {
                    return Err(ParseError {
                        line,
                        column: col,
                        message: "rune literal not terminated".into(),
                    })
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn operator(&mut self) -> Result<Punct, ParseError> {
        let rest = &self.src[self.idx..];
        for (text, punct) in OPERATORS {
            if rest.starts_with(text) {
                for _ in 0..text.len() {
                    self.bump();
                }
                return Ok(*punct);
            }
        }
        let c = self.peek().unwrap_or('\0');
        Err(self.error(format!("unexpected character {c:?}")))
    }
}
