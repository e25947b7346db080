//! SnapScript front end
//!
//! Turns script sources into a [`CompiledProgram`] in two passes: a
//! declaration pre-pass over every source, then a single typed pass per
//! function body that emits bytecode directly from the token stream.
//!
//! # Overview
//!
//! - [`Lexer`] - Tokenizes SnapScript source code
//! - [`Token`] - Token types including identifiers, literals, keywords
//! - [`collect_declarations`] - Function signatures and constants of a source
//! - [`ScopeStack`] - Block scopes and local slot allocation
//! - [`compile_program`] - Sources plus natives to a program
//!
//! # Example
//!
//! ```
//! use builtins::NativeRegistry;
//! use parser::{compile_program, CompileOptions, ScriptSource};
//!
//! let registry = NativeRegistry::with_stdlib().unwrap();
//! let sources = [ScriptSource::new("main", "int Twice(int x) { return x * 2; }")];
//! let program = compile_program(&sources, &registry, &CompileOptions::default()).unwrap();
//!
//! assert!(program.find("Twice").is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod declarations;
pub mod error;
pub mod lexer;
pub mod scope;
pub mod typing;

pub use compiler::{compile_program, CompileOptions, ScriptSource, DEFAULT_MAX_NESTING};
pub use declarations::{collect_declarations, ConstDecl, Declarations, FunctionDecl};
pub use lexer::{tokenize, Keyword, Lexer, Punctuator, Token, TokenKind};
pub use scope::{Local, ScopeStack};
