//! Declaration pre-pass
//!
//! Collects every function signature and constant declaration of a source
//! unit without compiling any bodies, so calls can refer to functions
//! declared later or in another source.

use crate::error::{syntax_error, unexpected_token};
use crate::lexer::{Keyword, Punctuator, Token, TokenKind};
use core_types::{CompileError, CompileResult, SourcePosition, ValueType};

/// A function signature and where its body starts
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// Function name
    pub name: String,
    /// Parameter names and types
    pub params: Vec<(String, ValueType)>,
    /// Declared return type
    pub return_type: ValueType,
    /// Token index of the body's opening brace
    pub body: usize,
    /// Position of the function name
    pub position: SourcePosition,
}

impl FunctionDecl {
    /// Parameter types, in order
    pub fn param_types(&self) -> Vec<ValueType> {
        self.params.iter().map(|(_, ty)| *ty).collect()
    }
}

/// A constant declared in a `const { ... }` block
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    /// Constant name
    pub name: String,
    /// Declared type
    pub ty: ValueType,
    /// Token index of the initializer expression
    pub init: usize,
    /// Position of the constant name
    pub position: SourcePosition,
}

/// Everything declared at the top level of one source unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Declarations {
    /// Functions in textual order
    pub functions: Vec<FunctionDecl>,
    /// Constants in textual order
    pub constants: Vec<ConstDecl>,
}

struct Scanner<'a> {
    tokens: &'a [Token],
    source: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> &'a Token {
        // tokenize always ends the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn position(&self) -> SourcePosition {
        SourcePosition::from_offset(self.source, self.peek().offset)
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, p: Punctuator) -> bool {
        self.peek().is_punct(p)
    }

    fn expect(&mut self, p: Punctuator, what: &str) -> CompileResult<()> {
        if self.check(p) {
            self.advance();
            Ok(())
        } else {
            Err(unexpected_token(what, self.peek(), self.position()))
        }
    }

    fn expect_type(&mut self) -> CompileResult<ValueType> {
        match self.peek().type_keyword() {
            Some(ty) => {
                self.advance();
                Ok(ty)
            }
            None => Err(unexpected_token("a type", self.peek(), self.position())),
        }
    }

    fn expect_identifier(&mut self) -> CompileResult<(String, SourcePosition)> {
        let position = self.position();
        match self.peek().identifier() {
            Some(name) => {
                self.advance();
                Ok((name.to_string(), position))
            }
            None => Err(unexpected_token("an identifier", self.peek(), position)),
        }
    }

    /// Skip a brace-delimited block starting at the current `{`
    fn skip_block(&mut self) -> CompileResult<()> {
        let open = self.position();
        self.expect(Punctuator::LBrace, "'{'")?;
        let mut depth = 1usize;
        while depth > 0 {
            if self.is_at_end() {
                return Err(syntax_error("unterminated block", open));
            }
            let token = self.advance();
            if token.is_punct(Punctuator::LBrace) {
                depth += 1;
            } else if token.is_punct(Punctuator::RBrace) {
                depth -= 1;
            }
        }
        Ok(())
    }

    /// Skip an initializer expression up to its terminating `;`
    fn skip_expression(&mut self) -> CompileResult<()> {
        let mut depth = 0usize;
        loop {
            let token = self.peek();
            match &token.kind {
                TokenKind::Eof => {
                    return Err(unexpected_token("';'", token, self.position()));
                }
                TokenKind::Punctuator(Punctuator::LParen | Punctuator::LBracket) => depth += 1,
                TokenKind::Punctuator(Punctuator::RParen | Punctuator::RBracket) => {
                    depth = depth.saturating_sub(1)
                }
                TokenKind::Punctuator(Punctuator::Semicolon) if depth == 0 => return Ok(()),
                TokenKind::Punctuator(Punctuator::LBrace | Punctuator::RBrace) => {
                    return Err(unexpected_token("';'", token, self.position()));
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn const_block(&mut self, out: &mut Vec<ConstDecl>) -> CompileResult<()> {
        self.advance(); // const
        self.expect(Punctuator::LBrace, "'{' after 'const'")?;
        while !self.check(Punctuator::RBrace) {
            if self.is_at_end() {
                return Err(unexpected_token("'}'", self.peek(), self.position()));
            }
            let ty_position = self.position();
            let ty = self.expect_type()?;
            if ty == ValueType::Void {
                return Err(syntax_error("constants cannot be void", ty_position));
            }
            let (name, position) = self.expect_identifier()?;
            if out.iter().any(|c| c.name == name) {
                return Err(CompileError::Redeclaration { name, position });
            }
            self.expect(Punctuator::Assign, "'=' in constant declaration")?;
            let init = self.pos;
            self.skip_expression()?;
            self.advance(); // ;
            out.push(ConstDecl {
                name,
                ty,
                init,
                position,
            });
        }
        self.advance(); // }
        Ok(())
    }

    fn params(&mut self) -> CompileResult<Vec<(String, ValueType)>> {
        let mut params: Vec<(String, ValueType)> = Vec::new();
        if self.check(Punctuator::RParen) {
            return Ok(params);
        }
        loop {
            let ty_position = self.position();
            let ty = match (self.peek().type_keyword(), params.last()) {
                (Some(_), _) => self.expect_type()?,
                // A bare name shares the previous parameter's type
                (None, Some((_, previous))) if self.peek().identifier().is_some() => *previous,
                _ => return Err(unexpected_token("a parameter type", self.peek(), ty_position)),
            };
            if ty == ValueType::Void {
                return Err(syntax_error("parameters cannot be void", ty_position));
            }
            let (name, position) = self.expect_identifier()?;
            if params.iter().any(|(n, _)| *n == name) {
                return Err(CompileError::Redeclaration { name, position });
            }
            params.push((name, ty));
            if self.check(Punctuator::Comma) {
                self.advance();
            } else {
                return Ok(params);
            }
        }
    }

    fn function(&mut self) -> CompileResult<FunctionDecl> {
        let return_type = self.expect_type()?;
        let (name, position) = self.expect_identifier()?;
        self.expect(Punctuator::LParen, "'(' after function name")?;
        let params = self.params()?;
        self.expect(Punctuator::RParen, "')' after parameters")?;
        let body = self.pos;
        self.skip_block()?;
        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body,
            position,
        })
    }
}

/// Scan a token stream for top-level declarations
pub fn collect_declarations(tokens: &[Token], source: &str) -> CompileResult<Declarations> {
    let mut scanner = Scanner {
        tokens,
        source,
        pos: 0,
    };
    let mut decls = Declarations::default();
    if tokens.is_empty() {
        return Ok(decls);
    }
    while !scanner.is_at_end() {
        if scanner.peek().is_keyword(Keyword::Const) {
            scanner.const_block(&mut decls.constants)?;
        } else if scanner.peek().type_keyword().is_some() {
            decls.functions.push(scanner.function()?);
        } else {
            return Err(unexpected_token(
                "a function or const block",
                scanner.peek(),
                scanner.position(),
            ));
        }
    }
    Ok(decls)
}
