//! Single-pass typed compiler from tokens to bytecode
//!
//! Function bodies are compiled straight from the token stream: each
//! statement parser takes a token position and returns the position after
//! the statement, emitting instructions as it goes. Expressions return their
//! static type together with the new position.

use crate::declarations::{collect_declarations, ConstDecl, Declarations, FunctionDecl};
use crate::error::{syntax_error, unexpected_token};
use crate::lexer::{tokenize, Keyword, Punctuator, Token, TokenKind};
use crate::scope::{Local, ScopeStack};
use crate::typing::{binary_result, unary_result};
use builtins::NativeRegistry;
use bytecode_system::{
    format_types, BytecodeChunk, CompiledProgram, FunctionId, FunctionInfo, GlobalId, GlobalInfo,
    NativeId, Opcode, DEFAULT_CAPACITY, INITIALIZER_NAME,
};
use core_types::{CompileError, CompileResult, LinkError, Operand, SourcePosition, ValueType};
use log::{debug, info};
use std::collections::BTreeSet;

/// A named unit of script text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSource {
    /// Name used in diagnostics
    pub name: String,
    /// Script text
    pub text: String,
}

impl ScriptSource {
    /// Create a named source
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Default limit on nested statements and expressions
pub const DEFAULT_MAX_NESTING: usize = 64;

/// Compiler settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Maximum number of instructions in the program buffer
    pub capacity: usize,
    /// Maximum nesting of statements, parenthesized expressions and prefix
    /// operators. The compiler recurses once per level, so this bounds its
    /// stack use.
    pub max_nesting: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

/// Line start offsets of one source, for cheap position lookups
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self { starts }
    }

    fn position(&self, text: &str, offset: usize) -> SourcePosition {
        let offset = offset.min(text.len());
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.starts[line];
        let column = text[start..offset].chars().count() + 1;
        SourcePosition::new(line as u32 + 1, column as u32, offset)
    }
}

struct Unit<'s> {
    source: &'s ScriptSource,
    tokens: Vec<Token>,
    decls: Declarations,
    lines: LineIndex,
}

/// Program-wide tables visible to every body
#[derive(Clone, Copy)]
struct Symbols<'a> {
    functions: &'a [FunctionInfo],
    globals: &'a [GlobalInfo],
    registry: &'a NativeRegistry,
}

#[derive(Debug, Clone, Copy)]
enum Callee {
    Script(FunctionId),
    Native(NativeId),
}

struct Candidate<'a> {
    callee: Callee,
    params: &'a [ValueType],
    return_type: ValueType,
}

/// Pending jumps of the innermost enclosing loop
#[derive(Debug, Default)]
struct LoopContext {
    breaks: Vec<usize>,
    continues: Vec<usize>,
}

/// Statement forms, chosen by looking at most one token ahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementKind {
    Block,
    Declaration,
    Assignment,
    Step,
    If,
    While,
    For,
    Break,
    Continue,
    Return,
    Empty,
    Expression,
}

/// Binary precedence levels, lowest first; logical operators sit above these
const BINARY_LEVELS: &[&[(Punctuator, Opcode)]] = &[
    &[(Punctuator::Or, Opcode::BitOr)],
    &[(Punctuator::Xor, Opcode::BitXor)],
    &[(Punctuator::And, Opcode::BitAnd)],
    &[(Punctuator::EqEq, Opcode::Eq), (Punctuator::NotEq, Opcode::Ne)],
    &[
        (Punctuator::Lt, Opcode::Lt),
        (Punctuator::LtEq, Opcode::Le),
        (Punctuator::Gt, Opcode::Gt),
        (Punctuator::GtEq, Opcode::Ge),
    ],
    &[(Punctuator::LtLt, Opcode::Shl), (Punctuator::GtGt, Opcode::Shr)],
    &[(Punctuator::Plus, Opcode::Add), (Punctuator::Minus, Opcode::Sub)],
    &[
        (Punctuator::Star, Opcode::Mul),
        (Punctuator::Slash, Opcode::Div),
        (Punctuator::Percent, Opcode::Mod),
    ],
];

fn compound_operator(p: Punctuator) -> Option<Opcode> {
    match p {
        Punctuator::PlusEq => Some(Opcode::Add),
        Punctuator::MinusEq => Some(Opcode::Sub),
        Punctuator::StarEq => Some(Opcode::Mul),
        Punctuator::SlashEq => Some(Opcode::Div),
        Punctuator::PercentEq => Some(Opcode::Mod),
        _ => None,
    }
}

struct FunctionCompiler<'a> {
    symbols: Symbols<'a>,
    tokens: &'a [Token],
    text: &'a str,
    lines: &'a LineIndex,
    chunk: &'a mut BytecodeChunk,
    natives: &'a mut BTreeSet<NativeId>,
    scopes: ScopeStack,
    return_type: ValueType,
    loops: Vec<LoopContext>,
    visible_globals: usize,
    depth: usize,
    max_nesting: usize,
}

impl<'a> FunctionCompiler<'a> {
    fn new(
        symbols: Symbols<'a>,
        unit: &'a Unit<'_>,
        chunk: &'a mut BytecodeChunk,
        natives: &'a mut BTreeSet<NativeId>,
        return_type: ValueType,
        visible_globals: usize,
        max_nesting: usize,
    ) -> Self {
        Self {
            symbols,
            tokens: &unit.tokens,
            text: &unit.source.text,
            lines: &unit.lines,
            chunk,
            natives,
            scopes: ScopeStack::new(),
            return_type,
            loops: Vec::new(),
            visible_globals,
            depth: 0,
            max_nesting,
        }
    }

    // ===== token helpers =====

    fn token(&self, pos: usize) -> &'a Token {
        // tokenize always ends the stream with Eof
        &self.tokens[pos.min(self.tokens.len() - 1)]
    }

    fn position(&self, pos: usize) -> SourcePosition {
        self.lines.position(self.text, self.token(pos).offset)
    }

    fn check(&self, pos: usize, p: Punctuator) -> bool {
        self.token(pos).is_punct(p)
    }

    fn expect(&self, pos: usize, p: Punctuator, what: &str) -> CompileResult<usize> {
        if self.check(pos, p) {
            Ok(pos + 1)
        } else {
            Err(unexpected_token(what, self.token(pos), self.position(pos)))
        }
    }

    fn identifier(&self, pos: usize) -> CompileResult<&'a str> {
        self.token(pos)
            .identifier()
            .ok_or_else(|| unexpected_token("an identifier", self.token(pos), self.position(pos)))
    }

    fn emit(&mut self, opcode: Opcode, pos: usize) -> CompileResult<usize> {
        let position = self.position(pos);
        self.chunk.emit_with_position(opcode, position)
    }

    /// Run `f` one nesting level deeper, failing past the configured limit
    fn nested<T>(
        &mut self,
        pos: usize,
        f: impl FnOnce(&mut Self) -> CompileResult<T>,
    ) -> CompileResult<T> {
        if self.depth >= self.max_nesting {
            return Err(syntax_error(
                format!("nested too deeply (limit {})", self.max_nesting),
                self.position(pos),
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn patch_here(&mut self, at: usize) {
        let target = self.chunk.current_offset();
        self.chunk.patch_jump(at, target);
    }

    fn emit_constant(&mut self, value: Operand, pos: usize) -> CompileResult<usize> {
        let idx = self.chunk.add_constant(value);
        self.emit(Opcode::PushConst(idx), pos)
    }

    /// Check `found` against `expected`, widening int to float
    fn coerce(&mut self, expected: ValueType, found: ValueType, pos: usize) -> CompileResult<()> {
        if expected == found {
            Ok(())
        } else if expected.widens_from(found) {
            self.emit(Opcode::Widen, pos)?;
            Ok(())
        } else {
            Err(CompileError::type_mismatch(expected, found, self.position(pos)))
        }
    }

    fn require_bool(&self, found: ValueType, pos: usize) -> CompileResult<()> {
        if found == ValueType::Bool {
            Ok(())
        } else {
            Err(CompileError::type_mismatch(ValueType::Bool, found, self.position(pos)))
        }
    }

    fn global(&self, name: &str) -> Option<(GlobalId, &'a GlobalInfo)> {
        let globals: &'a [GlobalInfo] = self.symbols.globals;
        globals[..self.visible_globals.min(globals.len())]
            .iter()
            .enumerate()
            .find(|(_, g)| g.name == name)
            .map(|(idx, g)| (GlobalId(idx as u32), g))
    }

    /// Local for an assignment target
    fn assignable(&self, pos: usize) -> CompileResult<Local> {
        let name = self.identifier(pos)?;
        if let Some(local) = self.scopes.resolve(name) {
            return Ok(local);
        }
        let position = self.position(pos);
        if self.global(name).is_some() {
            Err(CompileError::AssignToConstant {
                name: name.to_string(),
                position,
            })
        } else {
            Err(CompileError::UndefinedVariable {
                name: name.to_string(),
                position,
            })
        }
    }

    // ===== entry points =====

    /// Compile a function body, returning the frame's slot count
    fn function_body(mut self, decl: &FunctionDecl) -> CompileResult<usize> {
        for (name, ty) in &decl.params {
            self.scopes.declare(name, *ty).ok_or_else(|| CompileError::Redeclaration {
                name: name.clone(),
                position: decl.position,
            })?;
        }
        let mut pos = self.expect(decl.body, Punctuator::LBrace, "'{'")?;
        while !self.check(pos, Punctuator::RBrace) {
            pos = self.statement(pos)?;
        }

        // Falling off the end returns the default value
        match self.return_type {
            ValueType::Void => self.emit(Opcode::ReturnVoid, pos)?,
            ty => {
                self.emit(Opcode::PushDefault(ty), pos)?;
                self.emit(Opcode::Return, pos)?
            }
        };
        Ok(self.scopes.slot_count())
    }

    /// Compile one constant's initializer into the current function
    fn constant_initializer(mut self, decl: &ConstDecl, id: GlobalId) -> CompileResult<()> {
        let (found, pos) = self.expression(decl.init)?;
        self.coerce(decl.ty, found, decl.init)?;
        self.expect(pos, Punctuator::Semicolon, "';'")?;
        self.emit(Opcode::StoreGlobal(id), decl.init)?;
        Ok(())
    }

    // ===== statements =====

    fn classify(&self, pos: usize) -> StatementKind {
        let token = self.token(pos);
        match &token.kind {
            TokenKind::Punctuator(Punctuator::LBrace) => StatementKind::Block,
            TokenKind::Punctuator(Punctuator::Semicolon) => StatementKind::Empty,
            TokenKind::Keyword(Keyword::If) => StatementKind::If,
            TokenKind::Keyword(Keyword::While) => StatementKind::While,
            TokenKind::Keyword(Keyword::For) => StatementKind::For,
            TokenKind::Keyword(Keyword::Break) => StatementKind::Break,
            TokenKind::Keyword(Keyword::Continue) => StatementKind::Continue,
            TokenKind::Keyword(Keyword::Return) => StatementKind::Return,
            TokenKind::Keyword(kw) if kw.value_type().is_some() => StatementKind::Declaration,
            TokenKind::Identifier => match self.token(pos + 1).kind {
                TokenKind::Punctuator(
                    Punctuator::Assign
                    | Punctuator::PlusEq
                    | Punctuator::MinusEq
                    | Punctuator::StarEq
                    | Punctuator::SlashEq
                    | Punctuator::PercentEq,
                ) => StatementKind::Assignment,
                TokenKind::Punctuator(Punctuator::PlusPlus | Punctuator::MinusMinus) => {
                    StatementKind::Step
                }
                _ => StatementKind::Expression,
            },
            _ => StatementKind::Expression,
        }
    }

    fn statement(&mut self, pos: usize) -> CompileResult<usize> {
        self.nested(pos, |this| this.statement_inner(pos))
    }

    fn statement_inner(&mut self, pos: usize) -> CompileResult<usize> {
        match self.classify(pos) {
            StatementKind::Block => {
                self.scopes.push();
                let end = self.block(pos)?;
                self.scopes.pop();
                Ok(end)
            }
            StatementKind::Empty => Ok(pos + 1),
            StatementKind::If => self.if_statement(pos),
            StatementKind::While => self.while_statement(pos),
            StatementKind::For => self.for_statement(pos),
            StatementKind::Break => self.break_statement(pos),
            StatementKind::Continue => self.continue_statement(pos),
            StatementKind::Return => self.return_statement(pos),
            StatementKind::Declaration
            | StatementKind::Assignment
            | StatementKind::Step
            | StatementKind::Expression => {
                let end = self.simple(pos)?;
                self.expect(end, Punctuator::Semicolon, "';'")
            }
        }
    }

    /// A statement in its own scope, as used for branch and loop bodies
    fn scoped_statement(&mut self, pos: usize) -> CompileResult<usize> {
        self.scopes.push();
        let end = self.statement(pos)?;
        self.scopes.pop();
        Ok(end)
    }

    fn block(&mut self, pos: usize) -> CompileResult<usize> {
        let mut pos = self.expect(pos, Punctuator::LBrace, "'{'")?;
        while !self.check(pos, Punctuator::RBrace) {
            if self.token(pos).kind == TokenKind::Eof {
                return Err(unexpected_token("'}'", self.token(pos), self.position(pos)));
            }
            pos = self.statement(pos)?;
        }
        Ok(pos + 1)
    }

    /// Declaration, assignment, step or expression, without the `;`
    fn simple(&mut self, pos: usize) -> CompileResult<usize> {
        match self.classify(pos) {
            StatementKind::Declaration => self.declaration(pos),
            StatementKind::Assignment => self.assignment(pos),
            StatementKind::Step => self.step(pos),
            StatementKind::Expression => {
                let (ty, end) = self.expression(pos)?;
                if ty != ValueType::Void {
                    self.emit(Opcode::Pop, pos)?;
                }
                Ok(end)
            }
            _ => Err(unexpected_token("a simple statement", self.token(pos), self.position(pos))),
        }
    }

    fn declaration(&mut self, pos: usize) -> CompileResult<usize> {
        let ty = self
            .token(pos)
            .type_keyword()
            .ok_or_else(|| unexpected_token("a type", self.token(pos), self.position(pos)))?;
        if ty == ValueType::Void {
            return Err(syntax_error("variables cannot be void", self.position(pos)));
        }
        let name_pos = pos + 1;
        let name = self.identifier(name_pos)?;

        let mut end = name_pos + 1;
        if self.check(end, Punctuator::Assign) {
            let (found, next) = self.expression(end + 1)?;
            self.coerce(ty, found, end + 1)?;
            end = next;
        } else {
            self.emit(Opcode::PushDefault(ty), name_pos)?;
        }

        // Declared after the initializer so it cannot see itself
        let local = self
            .scopes
            .declare(name, ty)
            .ok_or_else(|| CompileError::Redeclaration {
                name: name.to_string(),
                position: self.position(name_pos),
            })?;
        self.emit(Opcode::StoreLocal(local.slot), name_pos)?;
        Ok(end)
    }

    fn assignment(&mut self, pos: usize) -> CompileResult<usize> {
        let local = self.assignable(pos)?;
        let op_pos = pos + 1;
        let value_pos = pos + 2;
        let operator = match self.token(op_pos).kind {
            TokenKind::Punctuator(p) => compound_operator(p),
            _ => None,
        };

        let end = match operator {
            None => {
                let (found, end) = self.expression(value_pos)?;
                self.coerce(local.ty, found, value_pos)?;
                end
            }
            Some(op) => {
                self.emit(Opcode::LoadLocal(local.slot), pos)?;
                let (found, end) = self.expression(value_pos)?;
                let result = binary_result(op, local.ty, found).map_err(|(expected, culprit)| {
                    CompileError::type_mismatch(expected, culprit, self.position(value_pos))
                })?;
                self.emit(op, op_pos)?;
                self.coerce(local.ty, result, value_pos)?;
                end
            }
        };
        self.emit(Opcode::StoreLocal(local.slot), pos)?;
        Ok(end)
    }

    /// `x++` / `x--`
    fn step(&mut self, pos: usize) -> CompileResult<usize> {
        let local = self.assignable(pos)?;
        if !local.ty.is_numeric() {
            return Err(CompileError::type_mismatch(
                "int or float",
                local.ty,
                self.position(pos),
            ));
        }
        let op_pos = pos + 1;
        let op = if self.check(op_pos, Punctuator::PlusPlus) {
            Opcode::Add
        } else {
            Opcode::Sub
        };
        self.emit(Opcode::LoadLocal(local.slot), pos)?;
        self.emit_constant(Operand::Int(1), op_pos)?;
        self.emit(op, op_pos)?;
        self.emit(Opcode::StoreLocal(local.slot), pos)?;
        Ok(op_pos + 1)
    }

    /// `( expr )` with a bool check
    fn condition(&mut self, pos: usize) -> CompileResult<usize> {
        let pos = self.expect(pos, Punctuator::LParen, "'('")?;
        let (ty, end) = self.expression(pos)?;
        self.require_bool(ty, pos)?;
        self.expect(end, Punctuator::RParen, "')'")
    }

    fn if_statement(&mut self, pos: usize) -> CompileResult<usize> {
        let pos = self.condition(pos + 1)?;
        let else_jump = self.emit(Opcode::JumpIfFalse(0), pos)?;
        let pos = self.scoped_statement(pos)?;

        if self.token(pos).is_keyword(Keyword::Else) {
            let end_jump = self.emit(Opcode::Jump(0), pos)?;
            self.patch_here(else_jump);
            let pos = self.scoped_statement(pos + 1)?;
            self.patch_here(end_jump);
            Ok(pos)
        } else {
            self.patch_here(else_jump);
            Ok(pos)
        }
    }

    fn while_statement(&mut self, pos: usize) -> CompileResult<usize> {
        let loop_start = self.chunk.current_offset();
        let body_pos = self.condition(pos + 1)?;
        let exit_jump = self.emit(Opcode::JumpIfFalse(0), body_pos)?;

        self.loops.push(LoopContext::default());
        let end = self.scoped_statement(body_pos)?;
        let ctx = self.loops.pop().unwrap_or_default();

        self.emit(Opcode::Jump(loop_start), end)?;
        self.patch_here(exit_jump);
        for at in ctx.breaks {
            self.patch_here(at);
        }
        for at in ctx.continues {
            self.chunk.patch_jump(at, loop_start);
        }
        Ok(end)
    }

    /// Index of the `)` closing a `for` header, starting inside it
    fn closing_paren(&self, pos: usize) -> CompileResult<usize> {
        let mut depth = 0usize;
        let mut pos = pos;
        loop {
            let token = self.token(pos);
            match token.kind {
                TokenKind::Punctuator(Punctuator::LParen) => depth += 1,
                TokenKind::Punctuator(Punctuator::RParen) if depth == 0 => return Ok(pos),
                TokenKind::Punctuator(Punctuator::RParen) => depth -= 1,
                TokenKind::Punctuator(Punctuator::Semicolon | Punctuator::LBrace)
                | TokenKind::Eof => {
                    return Err(unexpected_token("')'", token, self.position(pos)));
                }
                _ => {}
            }
            pos += 1;
        }
    }

    fn for_statement(&mut self, pos: usize) -> CompileResult<usize> {
        self.scopes.push();
        let mut pos = self.expect(pos + 1, Punctuator::LParen, "'(' after 'for'")?;
        if !self.check(pos, Punctuator::Semicolon) {
            pos = self.simple(pos)?;
        }
        pos = self.expect(pos, Punctuator::Semicolon, "';'")?;

        let loop_start = self.chunk.current_offset();
        let exit_jump = if self.check(pos, Punctuator::Semicolon) {
            None
        } else {
            let (ty, end) = self.expression(pos)?;
            self.require_bool(ty, pos)?;
            let jump = self.emit(Opcode::JumpIfFalse(0), pos)?;
            pos = end;
            Some(jump)
        };
        pos = self.expect(pos, Punctuator::Semicolon, "';'")?;

        // The update clause is compiled after the body
        let update = pos;
        let close = self.closing_paren(update)?;

        self.loops.push(LoopContext::default());
        let end = self.scoped_statement(close + 1)?;
        let ctx = self.loops.pop().unwrap_or_default();

        let continue_target = self.chunk.current_offset();
        if update != close {
            let update_end = self.simple(update)?;
            self.expect(update_end, Punctuator::RParen, "')'")?;
        }
        self.emit(Opcode::Jump(loop_start), end)?;

        if let Some(jump) = exit_jump {
            self.patch_here(jump);
        }
        for at in ctx.breaks {
            self.patch_here(at);
        }
        for at in ctx.continues {
            self.chunk.patch_jump(at, continue_target);
        }
        self.scopes.pop();
        Ok(end)
    }

    fn loop_context(&mut self, pos: usize, keyword: &str) -> CompileResult<&mut LoopContext> {
        let position = self.position(pos);
        self.loops.last_mut().ok_or(CompileError::InvalidBreak {
            keyword: keyword.to_string(),
            position,
        })
    }

    fn break_statement(&mut self, pos: usize) -> CompileResult<usize> {
        self.loop_context(pos, "break")?;
        let jump = self.emit(Opcode::Jump(0), pos)?;
        self.loop_context(pos, "break")?.breaks.push(jump);
        self.expect(pos + 1, Punctuator::Semicolon, "';' after 'break'")
    }

    fn continue_statement(&mut self, pos: usize) -> CompileResult<usize> {
        self.loop_context(pos, "continue")?;
        let jump = self.emit(Opcode::Jump(0), pos)?;
        self.loop_context(pos, "continue")?.continues.push(jump);
        self.expect(pos + 1, Punctuator::Semicolon, "';' after 'continue'")
    }

    fn return_statement(&mut self, pos: usize) -> CompileResult<usize> {
        let value_pos = pos + 1;
        if self.check(value_pos, Punctuator::Semicolon) {
            if self.return_type != ValueType::Void {
                return Err(CompileError::type_mismatch(
                    self.return_type,
                    ValueType::Void,
                    self.position(value_pos),
                ));
            }
            self.emit(Opcode::ReturnVoid, pos)?;
            return Ok(value_pos + 1);
        }

        let (found, end) = self.expression(value_pos)?;
        match (self.return_type, found) {
            (ValueType::Void, ValueType::Void) => {
                self.emit(Opcode::ReturnVoid, pos)?;
            }
            (ValueType::Void, found) => {
                return Err(CompileError::type_mismatch(
                    ValueType::Void,
                    found,
                    self.position(value_pos),
                ));
            }
            (expected, found) => {
                self.coerce(expected, found, value_pos)?;
                self.emit(Opcode::Return, pos)?;
            }
        }
        self.expect(end, Punctuator::Semicolon, "';' after return value")
    }

    // ===== expressions =====

    fn expression(&mut self, pos: usize) -> CompileResult<(ValueType, usize)> {
        self.nested(pos, |this| this.logical_or(pos))
    }

    /// Short-circuit `a || b`
    fn logical_or(&mut self, pos: usize) -> CompileResult<(ValueType, usize)> {
        let (mut ty, mut pos) = self.logical_and(pos)?;
        while self.check(pos, Punctuator::OrOr) {
            self.require_bool(ty, pos)?;
            let op_pos = pos;
            let short = self.emit(Opcode::JumpIfTrue(0), op_pos)?;
            let (right, next) = self.logical_and(op_pos + 1)?;
            self.require_bool(right, op_pos + 1)?;
            let end = self.emit(Opcode::Jump(0), op_pos)?;
            self.patch_here(short);
            self.emit(Opcode::PushTrue, op_pos)?;
            self.patch_here(end);
            ty = ValueType::Bool;
            pos = next;
        }
        Ok((ty, pos))
    }

    /// Short-circuit `a && b`
    fn logical_and(&mut self, pos: usize) -> CompileResult<(ValueType, usize)> {
        let (mut ty, mut pos) = self.binary(0, pos)?;
        while self.check(pos, Punctuator::AndAnd) {
            self.require_bool(ty, pos)?;
            let op_pos = pos;
            let short = self.emit(Opcode::JumpIfFalse(0), op_pos)?;
            let (right, next) = self.binary(0, op_pos + 1)?;
            self.require_bool(right, op_pos + 1)?;
            let end = self.emit(Opcode::Jump(0), op_pos)?;
            self.patch_here(short);
            self.emit(Opcode::PushFalse, op_pos)?;
            self.patch_here(end);
            ty = ValueType::Bool;
            pos = next;
        }
        Ok((ty, pos))
    }

    fn binary(&mut self, level: usize, pos: usize) -> CompileResult<(ValueType, usize)> {
        let Some(operators) = BINARY_LEVELS.get(level) else {
            return self.unary(pos);
        };
        let (mut left, mut pos) = self.binary(level + 1, pos)?;
        loop {
            let Some(&(_, op)) = operators.iter().find(|(p, _)| self.check(pos, *p)) else {
                return Ok((left, pos));
            };
            let op_pos = pos;
            let (right, next) = self.binary(level + 1, op_pos + 1)?;
            left = binary_result(op, left, right).map_err(|(expected, culprit)| {
                CompileError::type_mismatch(expected, culprit, self.position(op_pos))
            })?;
            self.emit(op, op_pos)?;
            pos = next;
        }
    }

    fn unary(&mut self, pos: usize) -> CompileResult<(ValueType, usize)> {
        let op = if self.check(pos, Punctuator::Minus) {
            Opcode::Neg
        } else if self.check(pos, Punctuator::Not) {
            Opcode::Not
        } else {
            return self.primary(pos);
        };
        let (operand, end) = self.nested(pos, |this| this.unary(pos + 1))?;
        let ty = unary_result(op, operand).map_err(|(expected, culprit)| {
            CompileError::type_mismatch(expected, culprit, self.position(pos + 1))
        })?;
        self.emit(op, pos)?;
        Ok((ty, end))
    }

    fn primary(&mut self, pos: usize) -> CompileResult<(ValueType, usize)> {
        let token = self.token(pos);
        match &token.kind {
            TokenKind::Int(value) => {
                self.emit_constant(Operand::Int(*value), pos)?;
                Ok((ValueType::Int, pos + 1))
            }
            TokenKind::Float(value) => {
                self.emit_constant(Operand::Double(*value), pos)?;
                Ok((ValueType::Float, pos + 1))
            }
            TokenKind::Str(text) => {
                self.emit_constant(Operand::Str(text.clone()), pos)?;
                Ok((ValueType::String, pos + 1))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.emit(Opcode::PushTrue, pos)?;
                Ok((ValueType::Bool, pos + 1))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.emit(Opcode::PushFalse, pos)?;
                Ok((ValueType::Bool, pos + 1))
            }
            TokenKind::Punctuator(Punctuator::LParen) => {
                let (ty, end) = self.expression(pos + 1)?;
                let end = self.expect(end, Punctuator::RParen, "')'")?;
                Ok((ty, end))
            }
            TokenKind::Punctuator(Punctuator::LBracket) => self.vector_literal(pos),
            TokenKind::Identifier if self.check(pos + 1, Punctuator::LParen) => self.call(pos),
            TokenKind::Identifier => self.variable(pos),
            _ => Err(unexpected_token("an expression", token, self.position(pos))),
        }
    }

    /// `[x, y]`
    fn vector_literal(&mut self, pos: usize) -> CompileResult<(ValueType, usize)> {
        let x_pos = pos + 1;
        let (x, end) = self.expression(x_pos)?;
        if !x.is_numeric() {
            return Err(CompileError::type_mismatch("int or float", x, self.position(x_pos)));
        }
        let y_pos = self.expect(end, Punctuator::Comma, "',' in vector literal")?;
        let (y, end) = self.expression(y_pos)?;
        if !y.is_numeric() {
            return Err(CompileError::type_mismatch("int or float", y, self.position(y_pos)));
        }
        let end = self.expect(end, Punctuator::RBracket, "']'")?;
        self.emit(Opcode::MakeVec2, pos)?;
        Ok((ValueType::Vec2, end))
    }

    fn variable(&mut self, pos: usize) -> CompileResult<(ValueType, usize)> {
        let name = self.identifier(pos)?;
        if let Some(local) = self.scopes.resolve(name) {
            self.emit(Opcode::LoadLocal(local.slot), pos)?;
            return Ok((local.ty, pos + 1));
        }
        if let Some((id, global)) = self.global(name) {
            self.emit(Opcode::LoadGlobal(id), pos)?;
            return Ok((global.ty, pos + 1));
        }
        Err(CompileError::UndefinedVariable {
            name: name.to_string(),
            position: self.position(pos),
        })
    }

    fn call(&mut self, pos: usize) -> CompileResult<(ValueType, usize)> {
        let name = self.identifier(pos)?;
        let mut cursor = pos + 2;
        let mut args: Vec<(ValueType, usize)> = Vec::new();
        if !self.check(cursor, Punctuator::RParen) {
            loop {
                let (ty, end) = self.expression(cursor)?;
                if ty == ValueType::Void {
                    return Err(CompileError::type_mismatch("a value", ty, self.position(cursor)));
                }
                args.push((ty, cursor));
                cursor = end;
                if self.check(cursor, Punctuator::Comma) {
                    cursor += 1;
                } else {
                    break;
                }
            }
        }
        let end = self.expect(cursor, Punctuator::RParen, "')' after arguments")?;

        let (callee, return_type) = self.resolve_call(name, &args, pos)?;
        match callee {
            Callee::Script(id) => {
                self.emit(Opcode::Call(id), pos)?;
            }
            Callee::Native(id) => {
                self.natives.insert(id);
                self.emit(Opcode::CallNative(id), pos)?;
            }
        }
        Ok((return_type, end))
    }

    /// Pick the overload of `name` for the given argument types
    fn resolve_call(
        &self,
        name: &str,
        args: &[(ValueType, usize)],
        pos: usize,
    ) -> CompileResult<(Callee, ValueType)> {
        let Symbols {
            functions,
            registry,
            ..
        } = self.symbols;

        let scripts = functions
            .iter()
            .enumerate()
            .filter(|(_, f)| f.name == name)
            .map(|(idx, f)| Candidate {
                callee: Callee::Script(FunctionId(idx as u32)),
                params: &f.params,
                return_type: f.return_type,
            });
        let natives = registry.overloads(name).into_iter().map(|(id, b)| Candidate {
            callee: Callee::Native(id),
            params: &b.params,
            return_type: b.return_type,
        });
        let candidates: Vec<Candidate<'_>> = scripts.chain(natives).collect();

        let position = self.position(pos);
        if candidates.is_empty() {
            return Err(LinkError::UnresolvedSymbol {
                name: name.to_string(),
                position,
            }
            .into());
        }

        let types: Vec<ValueType> = args.iter().map(|(ty, _)| *ty).collect();
        if let Some(exact) = candidates.iter().find(|c| c.params == types.as_slice()) {
            return Ok((exact.callee, exact.return_type));
        }

        let same_arity: Vec<&Candidate<'_>> = candidates
            .iter()
            .filter(|c| c.params.len() == types.len())
            .collect();
        let compatible: Vec<&Candidate<'_>> = same_arity
            .iter()
            .copied()
            .filter(|c| c.params.iter().zip(&types).all(|(p, a)| p.accepts(*a)))
            .collect();

        match compatible.as_slice() {
            [only] => Ok((only.callee, only.return_type)),
            [] => {
                if let [single] = same_arity.as_slice() {
                    let offending = single
                        .params
                        .iter()
                        .zip(args)
                        .find(|(p, (a, _))| !p.accepts(*a));
                    if let Some((expected, (found, arg_pos))) = offending {
                        return Err(CompileError::type_mismatch(
                            *expected,
                            *found,
                            self.position(*arg_pos),
                        ));
                    }
                }
                Err(CompileError::NoMatchingOverload {
                    name: name.to_string(),
                    args: format_types(&types),
                    position,
                })
            }
            _ => Err(CompileError::AmbiguousOverload {
                name: name.to_string(),
                args: format_types(&types),
                position,
            }),
        }
    }
}

/// Compile a set of sources against a native registry.
///
/// Every source is tokenized and scanned for declarations before any body
/// is compiled, so calls resolve regardless of textual or source order. The
/// first error aborts the compile.
pub fn compile_program(
    sources: &[ScriptSource],
    registry: &NativeRegistry,
    options: &CompileOptions,
) -> CompileResult<CompiledProgram> {
    info!("compiling {} source unit(s)", sources.len());

    let mut units = Vec::with_capacity(sources.len());
    for source in sources {
        let tokens = tokenize(&source.text)?;
        let decls = collect_declarations(&tokens, &source.text)?;
        debug!(
            "{}: {} tokens, {} function(s), {} constant(s)",
            source.name,
            tokens.len(),
            decls.functions.len(),
            decls.constants.len()
        );
        units.push(Unit {
            source,
            tokens,
            decls,
            lines: LineIndex::new(&source.text),
        });
    }

    let mut functions: Vec<FunctionInfo> = Vec::new();
    for decl in units.iter().flat_map(|u| &u.decls.functions) {
        let params = decl.param_types();
        let clashes = functions
            .iter()
            .any(|f| f.name == decl.name && f.params == params)
            || registry.find_exact(&decl.name, &params).is_some();
        if clashes {
            return Err(CompileError::DuplicateFunction {
                signature: format!("{}({})", decl.name, format_types(&params)),
                position: decl.position,
            });
        }
        functions.push(FunctionInfo {
            name: decl.name.clone(),
            params,
            return_type: decl.return_type,
            entry: 0,
            local_count: 0,
            position: decl.position,
        });
    }

    let mut globals: Vec<GlobalInfo> = Vec::new();
    for decl in units.iter().flat_map(|u| &u.decls.constants) {
        if globals.iter().any(|g| g.name == decl.name) {
            return Err(CompileError::Redeclaration {
                name: decl.name.clone(),
                position: decl.position,
            });
        }
        globals.push(GlobalInfo {
            name: decl.name.clone(),
            ty: decl.ty,
            position: decl.position,
        });
    }

    let initializer = if globals.is_empty() {
        None
    } else {
        let id = FunctionId(functions.len() as u32);
        functions.push(FunctionInfo {
            name: INITIALIZER_NAME.to_string(),
            params: Vec::new(),
            return_type: ValueType::Void,
            entry: 0,
            local_count: 0,
            position: SourcePosition::default(),
        });
        Some(id)
    };

    let mut chunk = BytecodeChunk::with_capacity_limit(options.capacity);
    let mut natives = BTreeSet::new();
    let mut layout: Vec<(usize, usize)> = Vec::with_capacity(functions.len());
    let symbols = Symbols {
        functions: &functions,
        globals: &globals,
        registry,
    };

    for unit in &units {
        for decl in &unit.decls.functions {
            let entry = chunk.current_offset();
            let compiler = FunctionCompiler::new(
                symbols,
                unit,
                &mut chunk,
                &mut natives,
                decl.return_type,
                globals.len(),
                options.max_nesting,
            );
            let locals = compiler.function_body(decl)?;
            debug!(
                "compiled {}({}) at {:04} with {} local(s)",
                decl.name,
                format_types(&decl.param_types()),
                entry,
                locals
            );
            layout.push((entry, locals));
        }
    }

    if initializer.is_some() {
        let entry = chunk.current_offset();
        let mut index = 0usize;
        for unit in &units {
            for decl in &unit.decls.constants {
                // Only constants declared earlier are visible
                let compiler = FunctionCompiler::new(
                    symbols,
                    unit,
                    &mut chunk,
                    &mut natives,
                    ValueType::Void,
                    index,
                    options.max_nesting,
                );
                compiler.constant_initializer(decl, GlobalId(index as u32))?;
                index += 1;
            }
        }
        chunk.emit(Opcode::ReturnVoid)?;
        layout.push((entry, 0));
    }

    for (info, (entry, locals)) in functions.iter_mut().zip(layout) {
        info.entry = entry;
        info.local_count = locals;
    }

    info!(
        "compiled {} function(s), {} constant(s), {} instruction(s)",
        functions.len(),
        globals.len(),
        chunk.instruction_count()
    );

    Ok(CompiledProgram {
        chunk,
        functions,
        globals,
        initializer,
        natives: natives.into_iter().collect(),
    })
}
