//! Go syntax front end.
//!
//! A hand-written lexer and a declaration-level parser. The scanner only needs
//! type declarations, method signatures and imports, so function bodies and
//! value declarations are skipped by bracket matching instead of being parsed.

pub mod ast;
pub mod lexer;
pub mod parser;

use thiserror::Error;

pub use ast::SourceFile;

/// A syntax error at a 1-based line/column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parse the text of one Go source file.
pub fn parse_source(src: &str) -> Result<SourceFile, ParseError> {
    let tokens = lexer::Lexer::new(src).lex_all()?;
    parser::Parser::new(src, tokens).parse_file()
}

/// Parse a lone interface method spec such as `Close(force bool) error`.
pub fn parse_method_spec(src: &str) -> Result<ast::MethodSpec, ParseError> {
    let tokens = lexer::Lexer::new(src).lex_all()?;
    parser::Parser::new(src, tokens).parse_method_spec()
}
