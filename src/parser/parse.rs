//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! token access, the expectation primitives, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `types`: type annotations
//! - `declarations`: imports, functions, structs and variable definitions
//! - `statements`: statement dispatch, blocks and control flow
//! - `expressions`: expressions with precedence climbing
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! The lexer only produces single-character operators. The parser keeps a
//! short queue of tokens pulled ahead of the lexer so that two adjacent
//! operator characters can be read as one operator (`==`, `&&`, `?.`, ...).
//! [`Parser::expect_character`] always takes a single character, so `&&Foo`
//! in a type is still a reference to a reference.

use std::collections::VecDeque;
use std::io::Read;

use log::{debug, trace};

use crate::parser::ast::{Node, NodeKind, Program, Statement};
use crate::parser::error::{Diagnostic, Result};
use crate::parser::lexer::Lexer;
use crate::parser::token::{Location, Position, Token, TokenGroup};

/// Two-character operators assembled from adjacent operator tokens.
pub(crate) const GLUED_OPERATORS: &[&str] =
    &["==", "!=", "<=", ">=", "&&", "||", "<<", ">>", "??", "?.", "=>"];

/// Deepest nesting of expressions, blocks and types the parser accepts.
/// Below it, `stacker` grows the stack on the heap.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Stack space left before `stacker` allocates a new segment.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_SEGMENT: usize = 1024 * 1024;

/// Recursive descent parser for SQOPL
pub struct Parser {
    lexer: Lexer,
    pending: VecDeque<Token>,
    context: Vec<NodeKind>,
    depth: usize,
    last_end: Position,
    finished: bool,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self::from_lexer(Lexer::new(source))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(Self::from_lexer(Lexer::from_reader(reader)?))
    }

    pub fn from_lexer(lexer: Lexer) -> Self {
        Self {
            lexer,
            pending: VecDeque::new(),
            context: Vec::new(),
            depth: 0,
            last_end: Position::default(),
            finished: false,
        }
    }

    /// Parse the entire program (top-level statements)
    pub fn parse_program(&mut self) -> Result<Program> {
        let statements = self.by_ref().collect::<Result<Vec<_>>>()?;
        Ok(Program::new(statements))
    }

    /// Parse the next top-level statement, or `None` once input is exhausted.
    pub fn next_statement(&mut self) -> Result<Option<Statement>> {
        if self.peek_token()?.is_none() {
            return Ok(None);
        }

        let statement = self.parse_top_level_statement()?;
        debug!(
            "parsed {} at {}",
            statement.kind(),
            statement.location()
        );
        Ok(Some(statement))
    }

    // ===== Context =====

    /// Run `f` with `kind` recorded as the innermost open production.
    pub(crate) fn within<T>(
        &mut self,
        kind: NodeKind,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        trace!("enter {}", kind);
        self.context.push(kind);
        let result = f(self);
        self.context.pop();
        result
    }

    /// Replace the innermost production kind once it is known more precisely.
    pub(crate) fn retag(&mut self, kind: NodeKind) {
        if let Some(top) = self.context.last_mut() {
            *top = kind;
        }
    }

    /// Run `f` one nesting level deeper. Fails with `NestingTooDeep` at
    /// `location` once [`MAX_NESTING_DEPTH`] levels are open.
    pub(crate) fn nested<T>(
        &mut self,
        location: Location,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(Diagnostic::NestingTooDeep {
                location,
                limit: MAX_NESTING_DEPTH,
            });
        }

        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || f(self));
        self.depth -= 1;
        result
    }

    /// Like [`Parser::nested`], at the next token.
    pub(crate) fn nested_here<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let location = self.peek_required()?.location;
        self.nested(location, f)
    }

    pub(crate) fn end_of_input(&self) -> Diagnostic {
        Diagnostic::UnexpectedEndOfInput {
            while_parsing: self.context.last().copied().unwrap_or(NodeKind::Block),
            position: self.last_end,
        }
    }

    // ===== Token access =====

    pub(crate) fn peek_token(&mut self) -> Result<Option<Token>> {
        match self.pending.front() {
            Some(token) => Ok(Some(token.clone())),
            None => self.lexer.peek_token(),
        }
    }

    /// Peek, treating end of input as an error.
    pub(crate) fn peek_required(&mut self) -> Result<Token> {
        self.peek_token()?.ok_or_else(|| self.end_of_input())
    }

    /// Consume the next token, treating end of input as an error.
    pub(crate) fn advance(&mut self) -> Result<Token> {
        let token = match self.pending.pop_front() {
            Some(token) => Some(token),
            None => self.lexer.next_token()?,
        };
        let token = token.ok_or_else(|| self.end_of_input())?;
        self.last_end = token.end();
        Ok(token)
    }

    /// Make sure at least `n` tokens are queued, if the input has them.
    fn fill(&mut self, n: usize) -> Result<()> {
        while self.pending.len() < n {
            match self.lexer.next_token()? {
                Some(token) => self.pending.push_back(token),
                None => break,
            }
        }
        Ok(())
    }

    /// The token `n` places ahead of the next one, without consuming anything.
    pub(crate) fn peek_nth(&mut self, n: usize) -> Result<Option<Token>> {
        self.fill(n + 1)?;
        Ok(self.pending.get(n).cloned())
    }

    /// The operator at the front of the input, gluing two adjacent operator
    /// characters when they form a known two-character operator.
    fn front_operator(&mut self) -> Result<Option<(String, usize)>> {
        self.fill(2)?;
        let Some(first) = self.pending.front() else {
            return Ok(None);
        };
        if first.group != TokenGroup::Operator {
            return Ok(None);
        }

        if let Some(second) = self.pending.get(1) {
            if second.group == TokenGroup::Operator && first.end() == second.start() {
                let glued = format!("{}{}", first.characters, second.characters);
                if GLUED_OPERATORS.contains(&glued.as_str()) {
                    return Ok(Some((glued, 2)));
                }
            }
        }
        Ok(Some((first.characters.clone(), 1)))
    }

    /// Whether the next operator is exactly `op`.
    pub(crate) fn check_operator(&mut self, op: &str) -> Result<bool> {
        Ok(self
            .front_operator()?
            .is_some_and(|(front, _)| front == op))
    }

    /// Consume the next operator if it is exactly `op`, returning it as one
    /// token spanning all of its characters.
    pub(crate) fn match_operator(&mut self, op: &str) -> Result<Option<Token>> {
        let Some((front, width)) = self.front_operator()? else {
            return Ok(None);
        };
        if front != op {
            return Ok(None);
        }

        let first = self.advance()?;
        let mut location = first.location;
        for _ in 1..width {
            location.end = self.advance()?.end();
        }
        Ok(Some(Token::new(TokenGroup::Operator, front, location)))
    }

    /// Consume the first of `ops` that is next in the input.
    pub(crate) fn match_any_operator(&mut self, ops: &[&str]) -> Result<Option<Token>> {
        for op in ops {
            if let Some(token) = self.match_operator(op)? {
                return Ok(Some(token));
            }
        }
        Ok(None)
    }

    pub(crate) fn check_char(&mut self, ch: char, group: TokenGroup) -> Result<bool> {
        Ok(self
            .peek_token()?
            .is_some_and(|token| token.is_char(ch, group)))
    }

    pub(crate) fn match_char(&mut self, ch: char, group: TokenGroup) -> Result<bool> {
        if self.check_char(ch, group)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn check_word(&mut self, word: &str) -> Result<bool> {
        Ok(self.peek_token()?.is_some_and(|token| token.is_word(word)))
    }

    pub(crate) fn match_word(&mut self, word: &str) -> Result<bool> {
        if self.check_word(word)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Start of the next token; end of input is an error.
    pub(crate) fn next_start(&mut self) -> Result<Position> {
        Ok(self.peek_required()?.start())
    }

    /// Location from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: Position) -> Location {
        Location::new(start, self.last_end)
    }

    // ===== Expectations =====

    pub(crate) fn expect_character(&mut self, ch: char, group: TokenGroup) -> Result<Token> {
        let token = self.advance()?;
        if token.is_char(ch, group) {
            Ok(token)
        } else {
            Err(Diagnostic::ExpectedCharacter {
                expected: ch,
                expected_group: group,
                got: token,
            })
        }
    }

    /// Expect a keyword (or any exact token text) of `group`.
    pub(crate) fn expect_token(&mut self, group: TokenGroup, text: &str) -> Result<Token> {
        let token = self.advance()?;
        if token.group == group && token.characters == text {
            Ok(token)
        } else {
            Err(Diagnostic::ExpectedToken {
                expected_group: group,
                expected: text.to_string(),
                got: token,
            })
        }
    }

    pub(crate) fn expect_token_of_group(&mut self, group: TokenGroup) -> Result<Token> {
        let token = self.advance()?;
        if token.group == group {
            Ok(token)
        } else {
            Err(Diagnostic::ExpectedTokenOfGroup {
                expected: group,
                got: token,
            })
        }
    }

    /// Expect any one of `candidates`. Nothing is consumed on failure.
    pub(crate) fn expect_one_of_characters(
        &mut self,
        candidates: &[(char, TokenGroup)],
    ) -> Result<Token> {
        let token = self.peek_required()?;
        if candidates
            .iter()
            .any(|&(ch, group)| token.is_char(ch, group))
        {
            return self.advance();
        }
        Err(Diagnostic::ExpectedOneOfCharacters {
            expected: candidates.to_vec(),
            got: token,
        })
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<Token> {
        self.expect_token(TokenGroup::Identifier, keyword)
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String> {
        Ok(self.expect_token_of_group(TokenGroup::Identifier)?.characters)
    }

    pub(crate) fn expect_operator(&mut self, ch: char) -> Result<Token> {
        self.expect_character(ch, TokenGroup::Operator)
    }

    pub(crate) fn expect_separator(&mut self, ch: char) -> Result<Token> {
        self.expect_character(ch, TokenGroup::Separator)
    }

    pub(crate) fn expect_grouping(&mut self, ch: char) -> Result<Token> {
        self.expect_character(ch, TokenGroup::Grouping)
    }

    pub(crate) fn expect_semicolon(&mut self) -> Result<Token> {
        self.expect_separator(';')
    }

    /// Expect a two-character operator such as `=>`.
    pub(crate) fn expect_glued(&mut self, op: &str) -> Result<Token> {
        match self.match_operator(op)? {
            Some(token) => Ok(token),
            None => {
                let got = self.peek_required()?;
                Err(Diagnostic::ExpectedToken {
                    expected_group: TokenGroup::Operator,
                    expected: op.to_string(),
                    got,
                })
            }
        }
    }
}

impl Iterator for Parser {
    type Item = Result<Statement>;

    /// Yields top-level statements until input ends or the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_statement() {
            Ok(Some(statement)) => Some(Ok(statement)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{Declaration, Definition};

    #[test]
    fn test_parse_simple_function() {
        let mut parser = Parser::new("fn main() { return 0; }");
        let program = parser.parse_program().unwrap();

        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Statement::Declaration(Declaration::Definition(Definition::Function(function))) => {
                assert_eq!(function.name, "main");
                assert!(function.parameters.is_empty());
                assert!(function.return_type.is_none());
                assert_eq!(function.body.code.len(), 1);
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_glued_operators_need_adjacency() {
        let mut parser = Parser::new("== = =");
        assert!(parser.check_operator("==").unwrap());
        let token = parser.match_operator("==").unwrap().unwrap();
        assert_eq!(token.characters, "==");
        assert_eq!(token.location.start, Position::new(1, 1));
        assert_eq!(token.location.end, Position::new(1, 3));

        assert!(!parser.check_operator("==").unwrap());
        assert!(parser.match_operator("=").unwrap().is_some());
        assert!(parser.match_operator("=").unwrap().is_some());
        assert!(parser.peek_token().unwrap().is_none());
    }

    #[test]
    fn test_expect_character_splits_glued_operators() {
        let mut parser = Parser::new("&&");
        parser.fill(2).unwrap();
        assert!(parser.expect_operator('&').is_ok());
        assert!(parser.expect_operator('&').is_ok());
    }

    #[test]
    fn test_expect_one_of_consumes_nothing_on_failure() {
        let mut parser = Parser::new("Foo");
        let candidates = [('&', TokenGroup::Operator), ('[', TokenGroup::Grouping)];
        match parser.expect_one_of_characters(&candidates) {
            Err(Diagnostic::ExpectedOneOfCharacters { expected, got }) => {
                assert_eq!(expected, candidates.to_vec());
                assert!(got.is_word("Foo"));
            }
            other => panic!("Expected one-of failure, got {:?}", other),
        }
        assert!(parser.peek_token().unwrap().unwrap().is_word("Foo"));
    }

    #[test]
    fn test_end_of_input_reports_innermost_context() {
        let mut parser = Parser::new("x");
        let err = parser
            .within(NodeKind::FunctionDefinition, |p| {
                p.within(NodeKind::Block, |p| {
                    p.advance()?;
                    p.advance()
                })
            })
            .unwrap_err();
        match err {
            Diagnostic::UnexpectedEndOfInput {
                while_parsing,
                position,
            } => {
                assert_eq!(while_parsing, NodeKind::Block);
                assert_eq!(position, Position::new(1, 2));
            }
            other => panic!("Expected EOF, got {:?}", other),
        }
    }

    #[test]
    fn test_iterator_fuses_after_error() {
        let items: Vec<_> = Parser::new("import a; 42; import b;").collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(Diagnostic::CannotParse { .. })));
    }

    #[test]
    fn test_empty_program() {
        let program = Parser::new("  # nothing here\n").parse_program().unwrap();
        assert!(program.statements.is_empty());
    }
}
