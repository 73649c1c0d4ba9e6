//! Property-based tests for the lexer.
//!
//! 1. **Lexer never panics** on arbitrary input
//! 2. **Positions are monotonic**: token starts never decrease and every
//!    token ends at or after its start
//! 3. **Tokens do not overlap**
//! 4. **Peeking is invisible**: interleaving peeks does not change the stream
//! 5. **Integers are canonical** in every radix

use proptest::prelude::*;

use super::lexer::Lexer;
use super::token::{Token, TokenGroup};

/// Lexes as far as possible, stopping at the first diagnostic.
fn lex_prefix(input: &str) -> Vec<Token> {
    Lexer::new(input).map_while(Result::ok).collect()
}

/// Source made of characters the lexer accepts, including the awkward ones.
fn lexable_source() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_ \t\r\n#\"~!^&*+=|/.?<>%;:,(){}\\[\\]-]{0,200}"
}

/// Default is 512 cases; override via `PROPTEST_CASES` env var for nightly runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: Lexer never panics on arbitrary string input.
    #[test]
    fn lexer_never_panics(input in "\\PC{0,300}") {
        let _ = Lexer::new(&input).tokenize();
    }

    /// Property 2: Start positions never decrease and spans are not inverted.
    #[test]
    fn positions_are_monotonic(input in lexable_source()) {
        let tokens = lex_prefix(&input);
        for token in &tokens {
            prop_assert!(
                token.end() >= token.start(),
                "Token {} ends before it starts for input {:?}",
                token,
                input,
            );
        }
        for window in tokens.windows(2) {
            prop_assert!(
                window[1].start() >= window[0].start(),
                "Start went backwards: {} then {} for input {:?}",
                window[0],
                window[1],
                input,
            );
        }
    }

    /// Property 3: Each token starts at or after the previous token's end.
    #[test]
    fn tokens_do_not_overlap(input in lexable_source()) {
        let tokens = lex_prefix(&input);
        for window in tokens.windows(2) {
            prop_assert!(
                window[1].start() >= window[0].end(),
                "Overlapping tokens: {} and {} for input {:?}",
                window[0],
                window[1],
                input,
            );
        }
    }

    /// Property 4: Peeking before every read yields the same stream.
    #[test]
    fn peeking_is_invisible(input in lexable_source()) {
        let plain = lex_prefix(&input);

        let mut lexer = Lexer::new(&input);
        let mut peeked = Vec::new();
        loop {
            let ahead = match lexer.peek_token() {
                Ok(token) => token,
                Err(_) => break,
            };
            let taken = lexer.next_token();
            prop_assert!(taken.is_ok());
            let taken = taken.unwrap_or(None);
            prop_assert_eq!(&ahead, &taken);
            match taken {
                Some(token) => peeked.push(token),
                None => break,
            }
        }

        prop_assert_eq!(plain, peeked);
    }

    /// Property 5: Integers carry canonical decimal text whatever the radix.
    #[test]
    fn integers_are_canonical(value in 0i64..=i64::MAX) {
        for source in [
            value.to_string(),
            format!("0x{:x}", value),
            format!("0o{:o}", value),
            format!("0b{:b}", value),
        ] {
            let tokens = Lexer::new(&source).tokenize();
            prop_assert!(tokens.is_ok(), "{:?} failed to lex", source);
            let tokens = tokens.unwrap_or_default();
            prop_assert_eq!(tokens.len(), 1);
            prop_assert_eq!(tokens[0].group, TokenGroup::Integer);
            prop_assert_eq!(&tokens[0].characters, &value.to_string());
        }
    }
}
