//! # Introduction
//!
//! luast is a front end for Lua 5.x with the Luau `continue` statement and
//! compound assignments. It turns source text into an arena-allocated syntax
//! tree that keeps comments, source spans and parent links, and offers a
//! visitor contract for read-only passes plus a rewriter that shares every
//! subtree it does not change.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → Ast → Visitor / Rewriter → Outline / Source / TUI
//! ```
//!
//! 1. [`parser`] — tokenises the source and builds the [`parser::Ast`].
//! 2. [`visit`] — the [`visit::Visitor`] and [`visit::Rewriter`] traits, the
//!    outline printer and the source generator.
//! 3. [`ui`] — ratatui-based tree explorer; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! use luast::parser::parse;
//! use luast::visit::{generate, CodegenOptions};
//!
//! let ast = parse("local x = 1 + 2 -- sum").unwrap();
//! let text = generate(&ast, ast.root(), &CodegenOptions::default());
//! assert_eq!(text, "local x = 1 + 2 -- sum\n");
//! ```

pub mod parser;
pub mod ui;
pub mod visit;
