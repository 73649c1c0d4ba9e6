//! SQOPL source code parser
//!
//! This module transforms SQOPL source text into an Abstract Syntax Tree (AST):
//! - [`token`]: positions, locations and token groups
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), extended by the grammar modules
//!   [`types`], [`declarations`], [`statements`] and [`expressions`]
//! - [`ast`]: AST node definitions
//! - [`error`]: the [`Diagnostic`] returned by both stages
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with one precedence table for binary
//! operators. No external parser generator dependencies. Parsing stops at the
//! first diagnostic; there is no recovery.

pub mod ast;
pub mod declarations;
pub mod error;
pub mod expressions;
pub mod lexer;
pub mod parse;
pub mod statements;
pub mod token;
pub mod types;

#[cfg(test)]
mod lexer_property_tests;

pub use error::{Diagnostic, Result};
pub use lexer::Lexer;
pub use parse::{Parser, MAX_NESTING_DEPTH};
pub use token::{Location, Position, Token, TokenGroup};
