//! # Introduction
//!
//! SQOPL front end: a tokenizer and a recursive-descent parser that turn
//! SQOPL source text into a typed AST, or fail with a positioned
//! [`parser::Diagnostic`].
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser → AST
//! ```
//!
//! 1. [`parser::lexer`]: produces [`parser::Token`]s lazily, one token of
//!    lookahead at a time.
//! 2. [`parser::parse`]: pulls tokens and builds [`parser::ast::Statement`]s.
//!    The parser is an iterator over top-level statements.
//! 3. [`parser::ast`]: node structs grouped into layers
//!    (`Literal` → `Expression` → `Statement`, `Definition` → `Declaration`),
//!    plus the parallel `Type` hierarchy.
//!
//! ```
//! use sqopl::parser::Parser;
//!
//! let program = Parser::new("import std:io;\nfn main() { print(\"hi\"); }")
//!     .parse_program()
//!     .unwrap();
//! assert_eq!(program.statements.len(), 2);
//! ```
//!
//! The library never prints; the `sqopl` binary renders diagnostics.

pub mod parser;
