//! Lua source code parser
//!
//! This module transforms Lua source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens + comment trivia)
//! - [`parse`]: Parser driver, errors and block parsing (tokens → AST)
//! - `statements` / `expressions`: the grammar, as `impl Parser` blocks
//! - [`ast`]: node arena and node kinds
//!
//! # Supported Language
//!
//! Lua 5.x statements plus the Luau `continue` statement and compound
//! assignments (`+= -= *= /= %=`). Numbers are decimal with an optional
//! fraction; strings are single- or double-quoted. Long strings, hex and
//! exponent literals, `goto` and labels are not supported.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with one method per precedence level.
//! No external parser generator dependencies.

pub mod ast;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use ast::{Ast, NodeId, NodeKind};
pub use parse::{parse, ParseError, ParseResult, Parser};
