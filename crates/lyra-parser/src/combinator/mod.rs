//! Generic parser combinators over an immutable [`Input`] cursor.
//!
//! A [`Parser<T>`] is a cheap-to-clone handle around a function from a cursor
//! to a [`ParseResult<T>`]. Grammars are built by composing small parsers with
//! [`then`][Parser::then], [`or`][Parser::or], [`many`][Parser::many] and
//! friends; nothing here knows anything about GraphQL.

use crate::input::Input;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering as AtomicOrdering;
use std::sync::Arc;
use std::sync::OnceLock;

pub mod text;

/// A successful parse: the produced value and the cursor past the consumed
/// input.
#[derive(Debug, Clone)]
pub struct Success<T> {
    pub value: T,
    pub rest: Input,
}

/// A failed parse: where it failed and what would have been accepted there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub at: Input,
    pub expected: Vec<Cow<'static, str>>,
}

pub type ParseResult<T> = Result<Success<T>, Failure>;

impl Failure {
    pub fn new(at: Input, expected: impl Into<Cow<'static, str>>) -> Self {
        Self {
            at,
            expected: vec![expected.into()],
        }
    }

    /// Combine two failures by the furthest-failure heuristic: keep the one
    /// that consumed more input; on a tie, union the expected sets.
    pub fn merge(mut self, other: Failure) -> Failure {
        match self.at.offset().cmp(&other.at.offset()) {
            Ordering::Greater => self,
            Ordering::Less => other,
            Ordering::Equal => {
                for e in other.expected {
                    if !self.expected.contains(&e) {
                        self.expected.push(e);
                    }
                }
                self
            }
        }
    }

    /// A description of what was actually found at the failure position.
    pub fn found(&self) -> String {
        match self.at.peek() {
            Some(c) => format!("'{c}'"),
            None => "end of source".to_owned(),
        }
    }

    /// Spec-style message, e.g. `expected '}' but end of source found`.
    pub fn message(&self) -> String {
        let mut expected = String::new();
        for (i, e) in self.expected.iter().enumerate() {
            if i > 0 {
                if i + 1 == self.expected.len() {
                    expected.push_str(" or ");
                } else {
                    expected.push_str(", ");
                }
            }
            expected.push_str(e);
        }
        format!("expected {} but {} found", expected, self.found())
    }
}

/// Per-parse state threaded through every combinator application.
///
/// Holds the set of (production, offset) pairs currently on the parse stack,
/// which is how [`Parser::lazy`] and [`forward`] detect left-recursive
/// grammar definitions.
#[derive(Debug, Default)]
pub struct ParseContext {
    active: HashSet<(u64, usize)>,
}

impl ParseContext {
    fn enter(&mut self, key: (u64, usize)) -> bool {
        self.active.insert(key)
    }

    fn leave(&mut self, key: (u64, usize)) {
        self.active.remove(&key);
    }
}

type RunFn<T> = dyn Fn(&Input, &mut ParseContext) -> ParseResult<T> + Send + Sync;

/// A composable parser producing values of type `T`.
pub struct Parser<T> {
    run: Arc<RunFn<T>>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

static NEXT_PRODUCTION_ID: AtomicU64 = AtomicU64::new(0);

impl<T: 'static> Parser<T> {
    pub fn new(
        f: impl Fn(&Input, &mut ParseContext) -> ParseResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self { run: Arc::new(f) }
    }

    /// Apply this parser at `input` with a fresh context.
    pub fn parse(&self, input: &Input) -> ParseResult<T> {
        let mut cx = ParseContext::default();
        self.apply(input, &mut cx)
    }

    pub(crate) fn apply(&self, input: &Input, cx: &mut ParseContext) -> ParseResult<T> {
        (self.run)(input, cx)
    }

    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Parser<U> {
        Parser::new(move |input, cx| {
            let s = self.apply(input, cx)?;
            Ok(Success {
                value: f(s.value),
                rest: s.rest,
            })
        })
    }

    /// Like [`map`][Self::map], but the function may reject the value. A
    /// rejection becomes a failure at the start position, with the returned
    /// label as the expected description.
    pub fn try_map<U: 'static>(
        self,
        f: impl Fn(T) -> Result<U, Cow<'static, str>> + Send + Sync + 'static,
    ) -> Parser<U> {
        Parser::new(move |input, cx| {
            let s = self.apply(input, cx)?;
            match f(s.value) {
                Ok(value) => Ok(Success {
                    value,
                    rest: s.rest,
                }),
                Err(expected) => Err(Failure {
                    at: input.clone(),
                    expected: vec![expected],
                }),
            }
        })
    }

    /// Sequential composition: run `self`, then `next` on the remainder.
    /// Fails immediately if either stage fails.
    pub fn then<U: 'static>(self, next: Parser<U>) -> Parser<(T, U)> {
        Parser::new(move |input, cx| {
            let first = self.apply(input, cx)?;
            let second = next.apply(&first.rest, cx)?;
            Ok(Success {
                value: (first.value, second.value),
                rest: second.rest,
            })
        })
    }

    /// Sequence, keeping only the second value.
    pub fn skip_then<U: 'static>(self, next: Parser<U>) -> Parser<U> {
        self.then(next).map(|(_, second)| second)
    }

    /// Sequence, keeping only the first value.
    pub fn then_skip<U: 'static>(self, next: Parser<U>) -> Parser<T> {
        self.then(next).map(|(first, _)| first)
    }

    /// Ordered choice. Tries `self` first; if it fails, or succeeds without
    /// consuming input, `other` gets a chance and the result that progressed
    /// further wins. Failures on both sides merge by the furthest-failure
    /// heuristic.
    pub fn or(self, other: Parser<T>) -> Parser<T> {
        Parser::new(move |input, cx| match self.apply(input, cx) {
            Ok(s) if s.rest.offset() > input.offset() => Ok(s),
            Ok(s) => match other.apply(input, cx) {
                Ok(s2) if s2.rest.offset() > s.rest.offset() => Ok(s2),
                _ => Ok(s),
            },
            Err(e1) => match other.apply(input, cx) {
                Ok(s2) => Ok(s2),
                Err(e2) => Err(e1.merge(e2)),
            },
        })
    }

    pub fn opt(self) -> Parser<Option<T>> {
        Parser::new(move |input, cx| match self.apply(input, cx) {
            Ok(s) => Ok(Success {
                value: Some(s.value),
                rest: s.rest,
            }),
            Err(_) => Ok(Success {
                value: None,
                rest: input.clone(),
            }),
        })
    }

    /// Zero or more repetitions. Never fails. A success that consumed no
    /// input is kept but terminates the loop, so a nullable sub-parser
    /// cannot spin forever.
    pub fn many(self) -> Parser<Vec<T>> {
        Parser::new(move |input, cx| {
            let mut items = Vec::new();
            let mut current = input.clone();
            loop {
                match self.apply(&current, cx) {
                    Ok(s) => {
                        let progressed = s.rest.offset() > current.offset();
                        current = s.rest;
                        items.push(s.value);
                        if !progressed {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            Ok(Success {
                value: items,
                rest: current,
            })
        })
    }

    /// One or more repetitions; the first application's failure propagates.
    pub fn many1(self) -> Parser<Vec<T>> {
        Parser::new(move |input, cx| {
            let first = self.apply(input, cx)?;
            let mut items = vec![first.value];
            let mut current = first.rest;
            loop {
                match self.apply(&current, cx) {
                    Ok(s) => {
                        let progressed = s.rest.offset() > current.offset();
                        current = s.rest;
                        items.push(s.value);
                        if !progressed {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            Ok(Success {
                value: items,
                rest: current,
            })
        })
    }

    /// One or more repetitions of `self` separated by `separator`; separator
    /// values are discarded. A trailing separator is not consumed.
    pub fn sep_by<S: 'static>(self, separator: Parser<S>) -> Parser<Vec<T>> {
        let rest = separator.skip_then(self.clone()).many();
        self.then(rest).map(|(first, mut rest)| {
            rest.insert(0, first);
            rest
        })
    }

    /// Replace the expected set of a failure that consumed no input with a
    /// single, more readable description.
    pub fn expected(self, label: &'static str) -> Parser<T> {
        Parser::new(move |input, cx| match self.apply(input, cx) {
            Err(f) if f.at.offset() == input.offset() => Err(Failure {
                at: f.at,
                expected: vec![label.into()],
            }),
            r => r,
        })
    }

    /// Skip ignored tokens (whitespace, commas, comments) on both sides.
    pub fn token(self) -> Parser<T> {
        Parser::new(move |input, cx| {
            let start = text::skip_ignored(input);
            let s = self.apply(&start, cx)?;
            Ok(Success {
                value: s.value,
                rest: text::skip_ignored(&s.rest),
            })
        })
    }

    /// Pair the value with the [`crate::SourceSpan`] it was parsed from.
    pub fn spanned(self) -> Parser<(T, crate::SourceSpan)> {
        Parser::new(move |input, cx| {
            let s = self.apply(input, cx)?;
            let span = crate::SourceSpan {
                start: input.offset(),
                end: s.rest.offset(),
                line: input.line(),
                column: input.column(),
            };
            Ok(Success {
                value: (s.value, span),
                rest: s.rest,
            })
        })
    }

    /// Require that nothing but ignored tokens follow.
    pub fn end(self) -> Parser<T> {
        Parser::new(move |input, cx| {
            let s = self.apply(input, cx)?;
            let rest = text::skip_ignored(&s.rest);
            if rest.at_end() {
                Ok(Success {
                    value: s.value,
                    rest,
                })
            } else {
                Err(Failure::new(rest, "end of source"))
            }
        })
    }

    /// A lazily-constructed parser, for self-referential productions. The
    /// thunk runs once, on first use.
    ///
    /// # Panics
    ///
    /// Panics if the production re-enters itself at the same position, which
    /// means the grammar definition is left-recursive. That is an error in
    /// the grammar itself, not in the parsed input.
    pub fn lazy(f: impl Fn() -> Parser<T> + Send + Sync + 'static) -> Parser<T> {
        let id = NEXT_PRODUCTION_ID.fetch_add(1, AtomicOrdering::Relaxed);
        let cell: OnceLock<Parser<T>> = OnceLock::new();
        Parser::new(move |input, cx| {
            let inner = cell.get_or_init(&f);
            guarded(id, inner, input, cx)
        })
    }
}

/// A forward declaration of a parser, for mutually-recursive productions.
///
/// Returns a usable [`Parser`] immediately plus a handle that must be given
/// the real definition (exactly once) before the parser is applied. Like
/// [`Parser::lazy`], applying the parser twice at the same position without
/// progress panics with a left-recursion diagnostic.
pub fn forward<T: 'static>(name: &'static str) -> (Parser<T>, ForwardDecl<T>) {
    let id = NEXT_PRODUCTION_ID.fetch_add(1, AtomicOrdering::Relaxed);
    let slot: Arc<OnceLock<Parser<T>>> = Arc::new(OnceLock::new());
    let decl = ForwardDecl {
        name,
        slot: Arc::clone(&slot),
    };
    let parser = Parser::new(move |input, cx| {
        let inner = slot
            .get()
            .unwrap_or_else(|| panic!("grammar production `{name}` used before being defined"));
        guarded(id, inner, input, cx)
    });
    (parser, decl)
}

fn guarded<T: 'static>(
    id: u64,
    inner: &Parser<T>,
    input: &Input,
    cx: &mut ParseContext,
) -> ParseResult<T> {
    let key = (id, input.offset());
    if !cx.enter(key) {
        panic!(
            "left recursion detected in grammar at line {} column {}",
            input.line(),
            input.column()
        );
    }
    let result = inner.apply(input, cx);
    cx.leave(key);
    result
}

/// The defining end of a [`forward`] declaration.
pub struct ForwardDecl<T> {
    name: &'static str,
    slot: Arc<OnceLock<Parser<T>>>,
}

impl<T: 'static> ForwardDecl<T> {
    pub fn define(self, parser: Parser<T>) {
        if self.slot.set(parser).is_err() {
            panic!("grammar production `{}` defined twice", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::text::literal;
    use super::*;

    fn at(source: &str) -> Input {
        Input::new(source)
    }

    #[test]
    fn or_prefers_furthest_failure() {
        // `abc` fails after consuming 2 characters, `ax` after 1.
        let a = literal("ab").then(literal("c")).map(|_| "abc");
        let b = literal("a").then(literal("x")).map(|_| "ax");
        let err = a.or(b).parse(&at("aby")).unwrap_err();
        assert_eq!(err.at.offset(), 2);
        assert_eq!(err.expected, vec!["'c'"]);
    }

    #[test]
    fn or_merges_expected_sets_on_tie() {
        let p = literal("foo").or(literal("bar"));
        let err = p.parse(&at("qux")).unwrap_err();
        assert_eq!(err.at.offset(), 0);
        assert_eq!(err.expected, vec!["'foo'", "'bar'"]);
        assert_eq!(err.message(), "expected 'foo' or 'bar' but 'q' found");
    }

    #[test]
    fn or_gives_second_branch_a_chance_after_empty_success() {
        let empty = literal("x").opt().map(|_| "empty");
        let real = literal("ab").map(|_| "ab");
        let s = empty.or(real).parse(&at("ab")).unwrap();
        assert_eq!(s.value, "ab");
        assert_eq!(s.rest.offset(), 2);
    }

    #[test]
    fn many_terminates_on_zero_progress_success() {
        let nullable = literal("a").opt();
        let s = nullable.many().parse(&at("b")).unwrap();
        // One zero-length success is kept, then the loop stops.
        assert_eq!(s.value, vec![None]);
        assert_eq!(s.rest.offset(), 0);
    }

    #[test]
    fn many_accumulates_in_order() {
        let s = literal("ab").many().parse(&at("ababab!")).unwrap();
        assert_eq!(s.value.len(), 3);
        assert_eq!(s.rest.offset(), 6);
    }

    #[test]
    fn sep_by_leaves_trailing_separator() {
        let p = literal("a").sep_by(literal(";"));
        let s = p.parse(&at("a;a;a;")).unwrap();
        assert_eq!(s.value.len(), 3);
        // The separator after the last item stays unconsumed.
        assert_eq!(s.rest.offset(), 5);
    }

    #[test]
    fn expected_relabels_failures_without_progress() {
        let p = literal("a").then(literal("b")).expected("an ab pair");
        let err = p.clone().parse(&at("x")).unwrap_err();
        assert_eq!(err.expected, vec!["an ab pair"]);
        // A failure after progress keeps the precise expectation.
        let err = p.parse(&at("ax")).unwrap_err();
        assert_eq!(err.expected, vec!["'b'"]);
    }

    #[test]
    fn then_short_circuits() {
        let p = literal("a").then(literal("b")).then(literal("c"));
        let err = p.parse(&at("ax")).unwrap_err();
        assert_eq!(err.at.offset(), 1);
        assert_eq!(err.expected, vec!["'b'"]);
    }

    #[test]
    fn token_skips_whitespace_commas_and_comments() {
        let p = literal("a").token().then(literal("b").token());
        let s = p.parse(&at("  a, # comment\n b  ")).unwrap();
        assert!(s.rest.at_end());
    }

    #[test]
    fn end_rejects_trailing_input() {
        let err = literal("a").end().parse(&at("a b")).unwrap_err();
        assert_eq!(err.expected, vec!["end of source"]);
    }

    #[test]
    #[should_panic(expected = "left recursion detected")]
    fn left_recursion_panics_instead_of_looping() {
        let (expr, decl) = forward::<()>("expr");
        decl.define(expr.clone().then(literal("+")).map(|_| ()));
        let _ = expr.parse(&at("1+1"));
    }

    #[test]
    #[should_panic(expected = "used before being defined")]
    fn forward_use_before_definition_panics() {
        let (p, _decl) = forward::<()>("orphan");
        let _ = p.parse(&at("x"));
    }

    #[test]
    fn lazy_builds_once_and_recurses() {
        // nested := '(' nested ')' | 'x'
        fn nested() -> Parser<u32> {
            Parser::lazy(|| {
                literal("(")
                    .skip_then(nested())
                    .then_skip(literal(")"))
                    .map(|n| n + 1)
                    .or(literal("x").map(|_| 0))
            })
        }
        let s = nested().parse(&at("((x))")).unwrap();
        assert_eq!(s.value, 2);
    }
}
