// Integration tests for the SQOPL tokenizer

use rstest::rstest;

use sqopl::parser::{Diagnostic, Lexer, Location, Position, Token, TokenGroup};

fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize().expect("Lexing failed")
}

#[rstest]
#[case("+", TokenGroup::Operator)]
#[case(";", TokenGroup::Separator)]
#[case("(", TokenGroup::Grouping)]
#[case("?", TokenGroup::Operator)]
#[case(":", TokenGroup::Separator)]
#[case("}", TokenGroup::Grouping)]
fn test_punctuation_is_one_column(#[case] source: &str, #[case] group: TokenGroup) {
    let tokens = lex(source);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].group, group);
    assert_eq!(tokens[0].characters, source);
    assert_eq!(
        tokens[0].location,
        Location::new(Position::new(1, 1), Position::new(1, 2))
    );
}

#[rstest]
#[case("0b101")]
#[case("0o5")]
#[case("5")]
#[case("0x5")]
#[case("0X5")]
fn test_integers_are_canonical(#[case] source: &str) {
    let tokens = lex(source);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].group, TokenGroup::Integer);
    assert_eq!(tokens[0].characters, "5");
}

#[test]
fn test_comment_then_keyword() {
    let tokens = lex("# hello\nfn");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_word("fn"));
    assert_eq!(tokens[0].start(), Position::new(2, 1));
}

#[test]
fn test_string_literal() {
    let tokens = lex("\"abc\" ");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].group, TokenGroup::String);
    assert_eq!(tokens[0].characters, "abc");
}

#[test]
fn test_newline_ends_string_early() {
    // A raw newline is taken as the closing quote; the text so far is kept.
    let tokens = lex("\"ab\ncd");
    assert_eq!(tokens[0].group, TokenGroup::String);
    assert_eq!(tokens[0].characters, "ab");
    assert!(tokens[1].is_word("cd"));
}

#[test]
fn test_display_form() {
    let tokens = lex("\nfn");
    assert_eq!(tokens[0].to_string(), "Identifiers(fn) @ (2:1)-(2:3)");
}

#[test]
fn test_peek_is_non_destructive() {
    let mut lexer = Lexer::new("let x");
    let first = lexer.peek_token().unwrap();
    assert_eq!(lexer.peek_token().unwrap(), first);
    assert_eq!(lexer.next_token().unwrap(), first);
    assert!(lexer.next_token().unwrap().unwrap().is_word("x"));
    assert!(lexer.next_token().unwrap().is_none());
}

#[test]
fn test_sample_program_tokens() {
    let source = "fn main() {\n    let x = 0x10;\n}\n";
    let groups: Vec<TokenGroup> = lex(source).iter().map(|t| t.group).collect();
    assert_eq!(
        groups,
        [
            TokenGroup::Identifier,
            TokenGroup::Identifier,
            TokenGroup::Grouping,
            TokenGroup::Grouping,
            TokenGroup::Grouping,
            TokenGroup::Identifier,
            TokenGroup::Identifier,
            TokenGroup::Operator,
            TokenGroup::Integer,
            TokenGroup::Separator,
            TokenGroup::Grouping,
        ]
    );
}

#[rstest]
#[case("let $x", '$')]
#[case("a @ b", '@')]
fn test_invalid_character(#[case] source: &str, #[case] bad: char) {
    match Lexer::new(source).tokenize() {
        Err(Diagnostic::InvalidCharacter { character, .. }) => assert_eq!(character, bad),
        other => panic!("Expected invalid character, got {:?}", other),
    }
}

#[test]
fn test_iterator_stops_after_error() {
    let items: Vec<_> = Lexer::new("a $ b").collect();
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(items[1].is_err());
}
