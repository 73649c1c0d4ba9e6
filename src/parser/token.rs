//! Token model shared by the lexer, the parser and diagnostics
//!
//! - [`Position`] / [`Location`]: 1-based points and spans in source text
//! - [`TokenGroup`]: the fixed character classes a token can belong to
//! - [`Token`]: one classified lexeme with its location

use std::fmt;

/// A point in source text. Both fields are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}

/// A span of source text. `end` is the position just past the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether `other` lies entirely inside this span.
    pub fn encloses(&self, other: &Location) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Character classes used to classify tokens.
///
/// The punctuation groups own a fixed, ordered set of member characters.
/// `Identifier`, `String`, `Integer` and `Decimal` are markers without
/// members. `Decimal` is reserved and never produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenGroup {
    Operator,
    Separator,
    Grouping,
    Identifier,
    String,
    Integer,
    Decimal,
}

impl TokenGroup {
    pub const OPERATOR_CHARS: &'static str = "~!^&*-+=|/.?<>%";
    pub const SEPARATOR_CHARS: &'static str = ";:,";
    pub const GROUPING_CHARS: &'static str = "([{}])";

    pub const ALL: [TokenGroup; 7] = [
        TokenGroup::Operator,
        TokenGroup::Separator,
        TokenGroup::Grouping,
        TokenGroup::Identifier,
        TokenGroup::String,
        TokenGroup::Integer,
        TokenGroup::Decimal,
    ];

    /// Member characters of this group (empty for marker groups).
    pub fn members(self) -> &'static str {
        match self {
            TokenGroup::Operator => Self::OPERATOR_CHARS,
            TokenGroup::Separator => Self::SEPARATOR_CHARS,
            TokenGroup::Grouping => Self::GROUPING_CHARS,
            TokenGroup::Identifier
            | TokenGroup::String
            | TokenGroup::Integer
            | TokenGroup::Decimal => "",
        }
    }

    pub fn contains(self, ch: char) -> bool {
        self.members().contains(ch)
    }

    /// The punctuation group a single character belongs to, if any.
    ///
    /// Checked in lexer priority order: operators, then grouping, then
    /// separators.
    pub fn of_char(ch: char) -> Option<TokenGroup> {
        [TokenGroup::Operator, TokenGroup::Grouping, TokenGroup::Separator]
            .into_iter()
            .find(|group| group.contains(ch))
    }

    /// Structural lookup of a punctuation group by its ordered member set.
    pub fn from_members(members: &str) -> Option<TokenGroup> {
        if members.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|group| group.members() == members)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TokenGroup::Operator => "Operators",
            TokenGroup::Separator => "Separators",
            TokenGroup::Grouping => "Grouping",
            TokenGroup::Identifier => "Identifiers",
            TokenGroup::String => "Strings",
            TokenGroup::Integer => "Integers",
            TokenGroup::Decimal => "Decimals",
        }
    }

    /// Display name for an optional group; `"Unknown"` when absent.
    pub fn name_of(group: Option<TokenGroup>) -> &'static str {
        group.map_or("Unknown", TokenGroup::display_name)
    }
}

impl fmt::Display for TokenGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A classified lexeme.
///
/// `characters` holds the literal character for punctuation, the identifier
/// text, the unquoted string payload, or the canonical decimal text of an
/// integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub group: TokenGroup,
    pub characters: String,
    pub location: Location,
}

impl Token {
    pub fn new(group: TokenGroup, characters: impl Into<String>, location: Location) -> Self {
        Self {
            group,
            characters: characters.into(),
            location,
        }
    }

    /// Whether this token is exactly the single character `ch` of `group`.
    pub fn is_char(&self, ch: char, group: TokenGroup) -> bool {
        self.group == group && self.single_char() == Some(ch)
    }

    /// Whether this token is an identifier spelled `text`.
    pub fn is_word(&self, text: &str) -> bool {
        self.group == TokenGroup::Identifier && self.characters == text
    }

    /// The character of a one-character token.
    pub fn single_char(&self) -> Option<char> {
        let mut chars = self.characters.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        }
    }

    pub fn start(&self) -> Position {
        self.location.start
    }

    pub fn end(&self) -> Position {
        self.location.end
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) @ {}-{}",
            self.group.display_name(),
            self.characters,
            self.location.start,
            self.location.end
        )
    }
}
