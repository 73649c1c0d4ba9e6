//! Lexer (tokenizer) for SQOPL source code
//!
//! Converts raw source text into a lazy stream of [`Token`]s consumed by the
//! parser. Keywords are ordinary identifiers at this layer; the parser
//! recognises them by text.
//!
//! `#` starts a comment that runs to the end of the line.

use std::io::Read;

use log::trace;

use super::error::{Diagnostic, Result};
use super::token::{Location, Position, Token, TokenGroup};

/// Where the lexer is in the input.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    position: usize,
    line: u32,
    column: u32,
}

/// A token lexed ahead of time, plus the cursor just past it.
#[derive(Debug)]
struct Peeked {
    token: Option<Token>,
    after: Cursor,
}

/// Lexer for SQOPL source code
pub struct Lexer {
    input: Vec<char>,
    cursor: Cursor,
    peeked: Option<Peeked>,
    failed: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            cursor: Cursor {
                position: 0,
                line: 1,
                column: 1,
            },
            peeked: None,
            failed: false,
        }
    }

    /// Read the whole stream and lex it. Non UTF-8 input is an I/O error.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(Self::new(&source))
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Consume and return the next token. `Ok(None)` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let token = match self.peeked.take() {
            Some(peeked) => {
                self.cursor = peeked.after;
                peeked.token
            }
            None => self.lex_token()?,
        };

        if let Some(token) = &token {
            trace!("lexed {}", token);
        }
        Ok(token)
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<Option<Token>> {
        if let Some(peeked) = &self.peeked {
            return Ok(peeked.token.clone());
        }

        let saved = self.cursor;
        let result = self.lex_token();
        let after = std::mem::replace(&mut self.cursor, saved);
        let token = result?;

        self.peeked = Some(Peeked {
            token: token.clone(),
            after,
        });
        Ok(token)
    }

    /// Position of the next unread character.
    pub fn current_position(&self) -> Position {
        Position::new(self.cursor.line, self.cursor.column)
    }

    fn lex_token(&mut self) -> Result<Option<Token>> {
        loop {
            self.skip_whitespace();

            let start = self.current_position();
            let Some(ch) = self.peek() else {
                return Ok(None);
            };

            if let Some(group) = TokenGroup::of_char(ch) {
                self.advance();
                return Ok(Some(Token::new(group, ch, self.span_from(start))));
            }

            return match ch {
                '#' => {
                    self.skip_comment();
                    continue;
                }
                '"' => self.string_literal(start).map(Some),
                '1'..='9' => self.decimal_literal(start).map(Some),
                '0' => self.prefixed_literal(start).map(Some),
                c if is_identifier_start(c) => Ok(Some(self.identifier(start))),
                _ => Err(Diagnostic::InvalidCharacter {
                    character: ch,
                    position: start,
                }),
            };
        }
    }

    /// Parse string literal
    ///
    /// The character that ends the run is consumed as the closing quote, even
    /// when it is a tab or line break.
    fn string_literal(&mut self, start: Position) -> Result<Token> {
        self.advance(); // opening quote
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            if !is_string_part(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }

        if self.advance().is_none() {
            return Err(Diagnostic::UnterminatedString { start });
        }

        Ok(Token::new(TokenGroup::String, text, self.span_from(start)))
    }

    /// Parse a base-10 integer that does not start with `0`.
    fn decimal_literal(&mut self, start: Position) -> Result<Token> {
        let digits = self.take_digits(10);
        let value = i64::from_str_radix(&digits, 10).map_err(|_| {
            Diagnostic::InvalidIntegerLiteral {
                literal: digits.clone(),
                radix: 10,
                location: self.span_from(start),
            }
        })?;

        Ok(Token::new(
            TokenGroup::Integer,
            value.to_string(),
            self.span_from(start),
        ))
    }

    /// Parse `0`, `0b…`, `0o…` or `0x…`.
    fn prefixed_literal(&mut self, start: Position) -> Result<Token> {
        self.advance(); // '0'

        let (prefix, radix) = match self.peek() {
            Some(p @ ('b' | 'B')) => (p, 2),
            Some(p @ ('o' | 'O')) => (p, 8),
            Some(p @ ('x' | 'X')) => (p, 16),
            _ => return Ok(Token::new(TokenGroup::Integer, "0", self.span_from(start))),
        };
        self.advance();

        let digits = self.take_digits(radix);
        let invalid = |lexer: &Self| Diagnostic::InvalidIntegerLiteral {
            literal: format!("0{}{}", prefix, digits),
            radix,
            location: lexer.span_from(start),
        };

        if digits.is_empty() {
            return Err(invalid(self));
        }
        let value = i64::from_str_radix(&digits, radix).map_err(|_| invalid(self))?;

        Ok(Token::new(
            TokenGroup::Integer,
            value.to_string(),
            self.span_from(start),
        ))
    }

    fn identifier(&mut self, start: Position) -> Token {
        let mut ident = String::new();
        while let Some(ch) = self.peek() {
            if !is_identifier_part(ch) {
                break;
            }
            ident.push(ch);
            self.advance();
        }
        Token::new(TokenGroup::Identifier, ident, self.span_from(start))
    }

    fn take_digits(&mut self, radix: u32) -> String {
        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            if !ch.is_digit(radix) {
                break;
            }
            digits.push(ch);
            self.advance();
        }
        digits
    }

    /// Skip spaces, tabs, carriage returns and newlines.
    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r' | '\n') = self.peek() {
            self.advance();
        }
    }

    /// Skip a `#` comment, including its newline.
    fn skip_comment(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.cursor.position).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.cursor.position += 1;

        if ch == '\n' {
            self.cursor.line += 1;
            self.cursor.column = 1;
        } else {
            self.cursor.column += 1;
        }

        Some(ch)
    }

    fn span_from(&self, start: Position) -> Location {
        Location::new(start, self.current_position())
    }
}

impl Iterator for Lexer {
    type Item = Result<Token>;

    /// Yields tokens until end of input or the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.next_token().transpose();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn is_string_part(ch: char) -> bool {
    !matches!(ch, '"' | '\t' | '\n' | '\r')
}
