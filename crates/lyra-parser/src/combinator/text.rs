//! Text-level parser primitives: literals, character classes, and regex
//! matchers.

use super::{Failure, Parser, Success};
use crate::input::Input;
use regex::Regex;
use std::borrow::Cow;

/// Match an exact string.
pub fn literal(expected: &'static str) -> Parser<&'static str> {
    let label = format!("'{expected}'");
    Parser::new(move |input, _cx| {
        if input.rest().starts_with(expected) {
            Ok(Success {
                value: expected,
                rest: input.advance(expected.len()),
            })
        } else {
            Err(Failure {
                at: input.clone(),
                expected: vec![Cow::Owned(label.clone())],
            })
        }
    })
}

/// Match a single character satisfying `predicate`.
pub fn ch(
    predicate: impl Fn(char) -> bool + Send + Sync + 'static,
    description: &'static str,
) -> Parser<char> {
    Parser::new(move |input, _cx| match input.peek() {
        Some(c) if predicate(c) => Ok(Success {
            value: c,
            rest: input.advance(c.len_utf8()),
        }),
        _ => Err(Failure::new(input.clone(), description)),
    })
}

/// Match a regular expression at the cursor.
///
/// The pattern is anchored as `^(?:pattern)` and compiled exactly once, when
/// the parser is constructed; the hot parsing path never recompiles.
///
/// # Panics
///
/// Panics if `pattern` is not a valid regular expression. Patterns are
/// grammar-author constants, so a bad one is a defect in the grammar.
pub fn pattern(pattern: &str, description: &'static str) -> Parser<String> {
    let regex = Regex::new(&format!("^(?:{pattern})"))
        .unwrap_or_else(|e| panic!("invalid grammar pattern `{pattern}`: {e}"));
    Parser::new(move |input, _cx| match regex.find(input.rest()) {
        Some(m) => Ok(Success {
            value: m.as_str().to_owned(),
            rest: input.advance(m.end()),
        }),
        None => Err(Failure::new(input.clone(), description)),
    })
}

/// Skip GraphQL ignored tokens: white space, line terminators, commas,
/// comments, and a byte-order mark. Commas are insignificant separators in
/// GraphQL, the same class as white space.
pub(crate) fn skip_ignored(input: &Input) -> Input {
    let mut current = input.clone();
    loop {
        let rest = current.rest();
        let Some(c) = rest.chars().next() else {
            return current;
        };
        match c {
            ' ' | '\t' | '\n' | '\r' | ',' | '\u{feff}' => {
                current = current.advance(c.len_utf8());
            }
            '#' => {
                let len = rest.find('\n').unwrap_or(rest.len());
                current = current.advance(len);
            }
            _ => return current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_reports_expected_token() {
        let err = literal("query").parse(&Input::new("q")).unwrap_err();
        assert_eq!(err.expected, vec!["'query'"]);
        assert_eq!(err.message(), "expected 'query' but 'q' found");
    }

    #[test]
    fn pattern_is_anchored() {
        let digits = pattern("[0-9]+", "digits");
        let s = digits.parse(&Input::new("123abc")).unwrap();
        assert_eq!(s.value, "123");
        // Does not match later in the input.
        assert!(digits.parse(&Input::new("abc123")).is_err());
    }

    #[test]
    fn skip_ignored_treats_commas_as_whitespace() {
        let input = Input::new(",,, \t # rest of line\n  x");
        let skipped = skip_ignored(&input);
        assert_eq!(skipped.rest(), "x");
    }

    #[test]
    fn ch_matches_one_character() {
        let letter = ch(|c| c.is_ascii_alphabetic(), "a letter");
        assert_eq!(letter.parse(&Input::new("ab")).unwrap().value, 'a');
        let err = letter.parse(&Input::new("1")).unwrap_err();
        assert_eq!(err.message(), "expected a letter but '1' found");
    }
}
