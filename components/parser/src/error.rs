//! Parser error helpers

use crate::lexer::{Token, TokenKind};
use core_types::{CompileError, SourcePosition};

/// Human-readable description of a token for diagnostics
pub fn describe(token: &Token) -> String {
    match &token.kind {
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Str(_) => "string literal".to_string(),
        _ => format!("'{}'", token.lexeme),
    }
}

/// Create a syntax error at a given position
pub fn syntax_error(message: impl Into<String>, position: SourcePosition) -> CompileError {
    CompileError::syntax(message, position)
}

/// Create an unexpected token error
pub fn unexpected_token(expected: &str, got: &Token, position: SourcePosition) -> CompileError {
    syntax_error(format!("expected {}, got {}", expected, describe(got)), position)
}
