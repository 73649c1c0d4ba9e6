//! Diagnostics produced by the lexer and the parser
//!
//! Every failure is a [`Diagnostic`]. Parsing stops at the first one.

use std::io;

use thiserror::Error;

use super::ast::NodeKind;
use super::token::{Location, Position, Token, TokenGroup};

/// Diagnostic is an error raised while tokenizing or parsing.
#[derive(Error, Debug)]
pub enum Diagnostic {
    #[error("Expected character '{expected}' of group {expected_group}, but got token {got}")]
    ExpectedCharacter {
        expected: char,
        expected_group: TokenGroup,
        got: Token,
    },
    #[error("Expected one of characters {}, but got token {got}", describe_candidates(.expected))]
    ExpectedOneOfCharacters {
        expected: Vec<(char, TokenGroup)>,
        got: Token,
    },
    #[error("Expected token {expected_group}({expected}), but got token {got}")]
    ExpectedToken {
        expected_group: TokenGroup,
        expected: String,
        got: Token,
    },
    #[error("Expected token of group {expected}, but got token {got}")]
    ExpectedTokenOfGroup { expected: TokenGroup, got: Token },
    #[error("Unexpected EOF while parsing node {while_parsing}")]
    UnexpectedEndOfInput {
        while_parsing: NodeKind,
        position: Position,
    },
    #[error("Cannot parse a node beginning with token {token}")]
    CannotParse { token: Token },
    #[error("Invalid character {character:?} at {position}")]
    InvalidCharacter { character: char, position: Position },
    #[error("Unterminated string literal starting at {start}")]
    UnterminatedString { start: Position },
    #[error("Invalid base-{radix} integer literal {literal:?} at {location}")]
    InvalidIntegerLiteral {
        literal: String,
        radix: u32,
        location: Location,
    },
    #[error("Nesting deeper than {limit} levels at {location}")]
    NestingTooDeep { location: Location, limit: usize },
    #[error("failed to read source: {0}")]
    Io(#[from] io::Error),
}

impl Diagnostic {
    /// The source span this diagnostic points at, if it has one.
    pub fn location(&self) -> Option<Location> {
        match self {
            Diagnostic::ExpectedCharacter { got, .. }
            | Diagnostic::ExpectedOneOfCharacters { got, .. }
            | Diagnostic::ExpectedToken { got, .. }
            | Diagnostic::ExpectedTokenOfGroup { got, .. } => Some(got.location),
            Diagnostic::CannotParse { token } => Some(token.location),
            Diagnostic::UnexpectedEndOfInput { position, .. }
            | Diagnostic::InvalidCharacter { position, .. } => {
                Some(Location::new(*position, *position))
            }
            Diagnostic::UnterminatedString { start } => Some(Location::new(*start, *start)),
            Diagnostic::InvalidIntegerLiteral { location, .. }
            | Diagnostic::NestingTooDeep { location, .. } => Some(*location),
            Diagnostic::Io(_) => None,
        }
    }

    /// The offending token, for the mismatch variants.
    pub fn got(&self) -> Option<&Token> {
        match self {
            Diagnostic::ExpectedCharacter { got, .. }
            | Diagnostic::ExpectedOneOfCharacters { got, .. }
            | Diagnostic::ExpectedToken { got, .. }
            | Diagnostic::ExpectedTokenOfGroup { got, .. } => Some(got),
            Diagnostic::CannotParse { token } => Some(token),
            _ => None,
        }
    }

    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Diagnostic::UnexpectedEndOfInput { .. })
    }
}

fn describe_candidates(candidates: &[(char, TokenGroup)]) -> String {
    candidates
        .iter()
        .map(|(ch, group)| format!("'{}' ({})", ch, group))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result is an alias for standard result with bound Diagnostic type.
pub type Result<T> = std::result::Result<T, Diagnostic>;
