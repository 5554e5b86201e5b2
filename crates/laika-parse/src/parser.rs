//! The combinator algebra (§4.1). `Parser<T>` is a pure function from
//! [`Cursor`] to [`ParseResult<T>`]; everything else in this module builds
//! bigger parsers out of smaller ones without ever mutating a cursor in
//! place.

use std::fmt;
use std::rc::Rc;

use crate::cursor::Cursor;
use crate::result::{Failure, ParseResult};

/// A captured substring of the input, anchored with absolute offsets so a
/// diagnostic can point back at it even after the cursor has moved on.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl fmt::Debug for Fragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("text", &self.text)
            .finish()
    }
}

/// A parser is a boxed, cheaply-cloneable function `Cursor -> ParseResult<T>`.
/// Cloning a `Parser` clones the `Rc`, not the closure, so combinators are
/// free to capture a parser by value and invoke it any number of times (e.g.
/// `rep`'s loop).
pub struct Parser<'a, T> {
    run: Rc<dyn Fn(Cursor<'a>) -> ParseResult<'a, T> + 'a>,
}

impl<'a, T> Clone for Parser<'a, T> {
    fn clone(&self) -> Self {
        Parser {
            run: Rc::clone(&self.run),
        }
    }
}

/// Options shared by the repetition combinators: `min` successes are
/// required, `max` (if set) caps how many are attempted.
#[derive(Clone, Copy, Debug, Default)]
pub struct RepOptions {
    pub min: usize,
    pub max: Option<usize>,
}

impl RepOptions {
    pub fn min(min: usize) -> Self {
        RepOptions { min, max: None }
    }

    pub fn at_most(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }
}

impl<'a, T: 'a> Parser<'a, T> {
    pub fn new(f: impl Fn(Cursor<'a>) -> ParseResult<'a, T> + 'a) -> Self {
        Parser { run: Rc::new(f) }
    }

    /// A parser that always fails without consuming input.
    pub fn fail(message: impl Into<String> + Clone + 'a) -> Self {
        Parser::new(move |cur| ParseResult::failure(message.clone(), cur))
    }

    /// A parser that always succeeds with `value`, consuming nothing.
    pub fn pure(value: T) -> Self
    where
        T: Clone,
    {
        Parser::new(move |cur| ParseResult::success(value.clone(), cur))
    }

    pub fn parse(&self, cursor: Cursor<'a>) -> ParseResult<'a, T> {
        (self.run)(cursor)
    }

    /// Sequencing: `a ~ b`. Runs `self`, then `other` from the resulting
    /// cursor, and pairs both values.
    pub fn and<U: 'a>(self, other: Parser<'a, U>) -> Parser<'a, (T, U)> {
        Parser::new(move |cur| match self.parse(cur) {
            ParseResult::Success { value: a, next } => match other.parse(next) {
                ParseResult::Success { value: b, next } => {
                    ParseResult::success((a, b), next)
                }
                ParseResult::Failure(f) => ParseResult::Failure(f),
            },
            ParseResult::Failure(f) => ParseResult::Failure(f),
        })
    }

    /// `a ~> b`: sequence, keep only the right result.
    pub fn and_right<U: 'a>(self, other: Parser<'a, U>) -> Parser<'a, U> {
        self.and(other).map(|(_, b)| b)
    }

    /// `a <~ b`: sequence, keep only the left result.
    pub fn and_left<U: 'a>(self, other: Parser<'a, U>) -> Parser<'a, T> {
        self.and(other).map(|(a, _)| a)
    }

    /// Choice: `a | b`. Tries `self`; on failure, retries `other` against
    /// the *original* cursor (alternation never rewinds a chosen success).
    /// Failing branches merge their `max_offset` per §3.2.
    pub fn or(self, other: Parser<'a, T>) -> Parser<'a, T> {
        Parser::new(move |cur| match self.parse(cur) {
            ok @ ParseResult::Success { .. } => ok,
            ParseResult::Failure(f1) => match other.parse(cur) {
                ok @ ParseResult::Success { .. } => ok,
                ParseResult::Failure(f2) => ParseResult::Failure(f1.merge(f2)),
            },
        })
    }

    pub fn map<U: 'a>(self, f: impl Fn(T) -> U + 'a) -> Parser<'a, U> {
        Parser::new(move |cur| self.parse(cur).map(&f))
    }

    /// Monadic bind: runs `self`, feeds its value into `f` to build the next
    /// parser, and runs that against the remaining input.
    pub fn flat_map<U: 'a>(self, f: impl Fn(T) -> Parser<'a, U> + 'a) -> Parser<'a, U> {
        Parser::new(move |cur| match self.parse(cur) {
            ParseResult::Success { value, next } => f(value).parse(next),
            ParseResult::Failure(failure) => ParseResult::Failure(failure),
        })
    }

    /// Applies a partial function; if it returns `None`, turns success into
    /// a failure carrying `fallback_msg`, rather than propagating a panic.
    pub fn collect<U: 'a>(
        self,
        partial: impl Fn(T) -> Option<U> + 'a,
        fallback_msg: impl Into<String> + Clone + 'a,
    ) -> Parser<'a, U> {
        Parser::new(move |cur| match self.parse(cur) {
            ParseResult::Success { value, next } => match partial(value) {
                Some(u) => ParseResult::success(u, next),
                None => ParseResult::failure(fallback_msg.clone(), cur),
            },
            ParseResult::Failure(failure) => ParseResult::Failure(failure),
        })
    }

    /// Replaces the parsed value with a constant, discarding it.
    pub fn as_value<U: Clone + 'a>(self, value: U) -> Parser<'a, U> {
        self.map(move |_| value.clone())
    }

    /// Runs a fallible semantic transform; an `Err` becomes a parser
    /// failure rather than an exception, per §4.1 ("no exceptions are used
    /// for control flow").
    pub fn eval_map<U: 'a>(self, f: impl Fn(T) -> Result<U, String> + 'a) -> Parser<'a, U> {
        Parser::new(move |cur| match self.parse(cur) {
            ParseResult::Success { value, next } => match f(value) {
                Ok(u) => ParseResult::success(u, next),
                Err(msg) => ParseResult::failure(msg, cur),
            },
            ParseResult::Failure(failure) => ParseResult::Failure(failure),
        })
    }

    /// Cooperative recovery: on failure, builds a replacement parser from
    /// the `Failure` and retries from the *original* cursor.
    pub fn handle_error_with(self, recover: impl Fn(&Failure<'a>) -> Parser<'a, T> + 'a) -> Parser<'a, T> {
        Parser::new(move |cur| match self.parse(cur) {
            ok @ ParseResult::Success { .. } => ok,
            ParseResult::Failure(f) => recover(&f).parse(cur),
        })
    }

    /// Always succeeds; yields `Some(value)` on success, `None` on failure,
    /// in both cases without propagating a `Failure` upward.
    pub fn opt(self) -> Parser<'a, Option<T>> {
        Parser::new(move |cur| match self.parse(cur) {
            ParseResult::Success { value, next } => ParseResult::success(Some(value), next),
            ParseResult::Failure(_) => ParseResult::success(None, cur),
        })
    }

    /// Zero-or-more repetitions (shorthand for `rep` with default options).
    pub fn rep0(self) -> Parser<'a, Vec<T>> {
        self.rep(RepOptions::default())
    }

    /// One-or-more repetitions.
    pub fn rep1(self) -> Parser<'a, Vec<T>> {
        self.rep(RepOptions::min(1))
    }

    /// Repeats `self`, collecting successes, honoring `opts.min`/`opts.max`.
    /// Stops at the first failure or at `max`; fails overall if fewer than
    /// `min` successes were collected.
    pub fn rep(self, opts: RepOptions) -> Parser<'a, Vec<T>> {
        Parser::new(move |cur| {
            let mut values = Vec::new();
            let mut at = cur;
            let mut furthest = at.pos();
            loop {
                if let Some(max) = opts.max {
                    if values.len() >= max {
                        break;
                    }
                }
                match self.parse(at) {
                    ParseResult::Success { value, next } => {
                        furthest = furthest.max(next.pos());
                        values.push(value);
                        at = next;
                    }
                    ParseResult::Failure(f) => {
                        furthest = furthest.max(f.max_offset);
                        break;
                    }
                }
            }
            if values.len() < opts.min {
                ParseResult::Failure(Failure {
                    message: format!("expected at least {} repetitions, got {}", opts.min, values.len()),
                    cursor: at,
                    max_offset: furthest,
                })
            } else {
                ParseResult::success(values, at)
            }
        })
    }

    /// Repeats `self` separated by `sep`, discarding separator values.
    pub fn rep_sep<S: 'a>(self, sep: Parser<'a, S>, opts: RepOptions) -> Parser<'a, Vec<T>> {
        Parser::new(move |cur| {
            let mut values = Vec::new();
            let mut at = cur;
            let mut furthest = at.pos();
            loop {
                if let Some(max) = opts.max {
                    if values.len() >= max {
                        break;
                    }
                }
                let attempt_at = at;
                if !values.is_empty() {
                    match sep.parse(at) {
                        ParseResult::Success { next, .. } => at = next,
                        ParseResult::Failure(f) => {
                            furthest = furthest.max(f.max_offset);
                            break;
                        }
                    }
                }
                match self.parse(at) {
                    ParseResult::Success { value, next } => {
                        furthest = furthest.max(next.pos());
                        values.push(value);
                        at = next;
                    }
                    ParseResult::Failure(f) => {
                        furthest = furthest.max(f.max_offset);
                        at = attempt_at;
                        break;
                    }
                }
            }
            if values.len() < opts.min {
                ParseResult::Failure(Failure {
                    message: format!("expected at least {} repetitions, got {}", opts.min, values.len()),
                    cursor: at,
                    max_offset: furthest,
                })
            } else {
                ParseResult::success(values, at)
            }
        })
    }

    /// Repeats `self` until `end` would succeed (without consuming `end`'s
    /// match). Useful for "read blocks until a terminator line" loops.
    pub fn rep_until<U: 'a>(self, end: Parser<'a, U>, opts: RepOptions) -> Parser<'a, Vec<T>> {
        Parser::new(move |cur| {
            let mut values = Vec::new();
            let mut at = cur;
            let mut furthest = at.pos();
            loop {
                if let Some(max) = opts.max {
                    if values.len() >= max {
                        break;
                    }
                }
                if end.parse(at).is_success() {
                    break;
                }
                match self.parse(at) {
                    ParseResult::Success { value, next } => {
                        furthest = furthest.max(next.pos());
                        values.push(value);
                        at = next;
                    }
                    ParseResult::Failure(f) => {
                        furthest = furthest.max(f.max_offset);
                        break;
                    }
                }
            }
            if values.len() < opts.min {
                ParseResult::Failure(Failure {
                    message: format!("expected at least {} repetitions before terminator, got {}", opts.min, values.len()),
                    cursor: at,
                    max_offset: furthest,
                })
            } else {
                ParseResult::success(values, at)
            }
        })
    }

    /// Succeeds iff `self` fails; consumes nothing either way. The
    /// classic negative-lookahead combinator.
    pub fn not(self) -> Parser<'a, ()> {
        Parser::new(move |cur| match self.parse(cur) {
            ParseResult::Success { .. } => ParseResult::failure("unexpected match", cur),
            ParseResult::Failure(_) => ParseResult::success((), cur),
        })
    }

    /// Yields the substring consumed by `self`, discarding its value.
    pub fn source(self) -> Parser<'a, &'a str> {
        Parser::new(move |cur| match self.parse(cur) {
            ParseResult::Success { next, .. } => {
                let text = &cur.remaining()[..next.pos() - cur.pos()];
                ParseResult::success(text, next)
            }
            ParseResult::Failure(f) => ParseResult::Failure(f),
        })
    }

    /// Pairs the parsed value with the [`Fragment`] it was parsed from,
    /// anchored against the cursor's root document.
    pub fn with_cursor(self) -> Parser<'a, (T, Fragment<'a>)> {
        Parser::new(move |cur| match self.parse(cur) {
            ParseResult::Success { value, next } => {
                let start = cur.pos();
                let end = next.pos();
                let text = &cur.remaining()[..end - start];
                ParseResult::success((value, Fragment { text, start, end }), next)
            }
            ParseResult::Failure(f) => ParseResult::Failure(f),
        })
    }
}

impl<'a, T: 'a> std::ops::BitOr for Parser<'a, T> {
    type Output = Parser<'a, T>;

    fn bitor(self, rhs: Parser<'a, T>) -> Parser<'a, T> {
        self.or(rhs)
    }
}

/// Tries `p` starting `n` bytes ahead of the current position without
/// consuming any input, regardless of whether `p` succeeds.
pub fn look_ahead<'a, U: 'a>(n: usize, p: Parser<'a, U>) -> Parser<'a, U> {
    Parser::new(move |cur: Cursor<'a>| {
        let available = cur.remaining().len();
        let shifted = cur.advance(n.min(available));
        match p.parse(shifted) {
            ParseResult::Success { value, .. } => ParseResult::success(value, cur),
            ParseResult::Failure(f) => ParseResult::Failure(Failure {
                message: f.message,
                cursor: cur,
                max_offset: f.max_offset,
            }),
        }
    })
}

/// Tries `p` starting `n` bytes *before* the current position (against the
/// root document), without consuming input. Fails outright if `n` would
/// reach before the start of the root document.
pub fn look_behind<'a, U: 'a>(n: usize, p: Parser<'a, U>) -> Parser<'a, U> {
    Parser::new(move |cur: Cursor<'a>| {
        if cur.pos() < n {
            return ParseResult::failure("look_behind offset precedes start of input", cur);
        }
        let behind = Cursor::new(cur.root()).advance(cur.pos() - n);
        match p.parse(behind) {
            ParseResult::Success { value, .. } => ParseResult::success(value, cur),
            ParseResult::Failure(f) => ParseResult::Failure(Failure {
                message: f.message,
                cursor: cur,
                max_offset: f.max_offset,
            }),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit<'a>(s: &'static str) -> Parser<'a, &'a str> {
        Parser::new(move |cur: Cursor<'a>| {
            if cur.starts_with(s) {
                let next = cur.advance(s.len());
                ParseResult::success(&cur.remaining()[..s.len()], next)
            } else {
                ParseResult::failure(format!("expected '{s}'"), cur)
            }
        })
    }

    #[test]
    fn and_sequences_and_pairs() {
        let p = lit("foo").and(lit("bar"));
        let res = p.parse(Cursor::new("foobarbaz"));
        match res {
            ParseResult::Success { value, next } => {
                assert_eq!(value, ("foo", "bar"));
                assert_eq!(next.remaining(), "baz");
            }
            ParseResult::Failure(_) => panic!("expected success"),
        }
    }

    #[test]
    fn and_right_keeps_only_right() {
        let p = lit("foo").and_right(lit("bar"));
        let res = p.parse(Cursor::new("foobar"));
        assert!(matches!(res, ParseResult::Success { value: "bar", .. }));
    }

    #[test]
    fn or_tries_alternatives_from_original_cursor() {
        let p = lit("foo").or(lit("bar"));
        assert!(p.parse(Cursor::new("bar")).is_success());
        assert!(p.parse(Cursor::new("foo")).is_success());
        assert!(!p.parse(Cursor::new("baz")).is_success());
    }

    #[test]
    fn or_merges_max_offset_toward_the_branch_that_got_further() {
        let deep = Parser::new(|cur: Cursor<'_>| {
            let next = cur.advance(2);
            ParseResult::<()>::Failure(Failure::new("deep fail", next))
        });
        let shallow = lit("zzz");
        let combined = deep.or(shallow);
        match combined.parse(Cursor::new("ab")) {
            ParseResult::Failure(f) => assert_eq!(f.max_offset, 2),
            ParseResult::Success { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn rep0_collects_zero_or_more() {
        let p = lit("a").rep0();
        let res = p.parse(Cursor::new("aaab"));
        match res {
            ParseResult::Success { value, next } => {
                assert_eq!(value, vec!["a", "a", "a"]);
                assert_eq!(next.remaining(), "b");
            }
            ParseResult::Failure(_) => panic!("expected success"),
        }
    }

    #[test]
    fn rep1_requires_at_least_one() {
        let p = lit("a").rep1();
        assert!(!p.parse(Cursor::new("bbb")).is_success());
    }

    #[test]
    fn rep_until_stops_before_terminator_without_consuming_it() {
        let p = lit("x").rep_until(lit("END"), RepOptions::default());
        let res = p.parse(Cursor::new("xxxEND"));
        match res {
            ParseResult::Success { value, next } => {
                assert_eq!(value, vec!["x", "x", "x"]);
                assert_eq!(next.remaining(), "END");
            }
            ParseResult::Failure(_) => panic!("expected success"),
        }
    }

    #[test]
    fn opt_never_fails() {
        let p = lit("a").opt();
        assert!(p.parse(Cursor::new("b")).is_success());
    }

    #[test]
    fn not_succeeds_only_when_inner_fails_and_consumes_nothing() {
        let p = lit("a").not();
        let cur = Cursor::new("b");
        match p.parse(cur) {
            ParseResult::Success { next, .. } => assert_eq!(next.pos(), 0),
            ParseResult::Failure(_) => panic!("expected success"),
        }
        assert!(!lit("a").not().parse(Cursor::new("a")).is_success());
    }

    #[test]
    fn source_yields_consumed_text() {
        let p = lit("foo").and(lit("bar")).source();
        match p.parse(Cursor::new("foobarbaz")) {
            ParseResult::Success { value, .. } => assert_eq!(value, "foobar"),
            ParseResult::Failure(_) => panic!("expected success"),
        }
    }

    #[test]
    fn with_cursor_anchors_fragment_offsets() {
        let p = lit("bar").with_cursor();
        let cur = Cursor::new("foobarbaz").advance(3);
        match p.parse(cur) {
            ParseResult::Success { value: (v, frag), .. } => {
                assert_eq!(v, "bar");
                assert_eq!(frag.start, 3);
                assert_eq!(frag.end, 6);
                assert_eq!(frag.text, "bar");
            }
            ParseResult::Failure(_) => panic!("expected success"),
        }
    }

    #[test]
    fn eval_map_turns_err_into_failure() {
        let p = lit("42").eval_map(|s| s.parse::<i32>().map_err(|e| e.to_string()));
        assert!(p.parse(Cursor::new("42")).is_success());
        let p2 = lit("xx").eval_map(|s: &str| -> Result<i32, String> { Err(format!("bad: {s}")) });
        assert!(!p2.parse(Cursor::new("xx")).is_success());
    }

    #[test]
    fn handle_error_with_recovers() {
        let p = lit("a").handle_error_with(|_f| Parser::pure("fallback"));
        match p.parse(Cursor::new("zzz")) {
            ParseResult::Success { value, .. } => assert_eq!(value, "fallback"),
            ParseResult::Failure(_) => panic!("expected recovery"),
        }
    }

    #[test]
    fn look_ahead_does_not_consume() {
        let p = look_ahead(3, lit("bar"));
        let cur = Cursor::new("foobar");
        match p.parse(cur) {
            ParseResult::Success { value, next } => {
                assert_eq!(value, "bar");
                assert_eq!(next.pos(), 0);
            }
            ParseResult::Failure(_) => panic!("expected success"),
        }
    }

    #[test]
    fn look_behind_checks_text_before_cursor() {
        let cur = Cursor::new("foobar").advance(3);
        let p = look_behind(3, lit("foo"));
        match p.parse(cur) {
            ParseResult::Success { value, next } => {
                assert_eq!(value, "foo");
                assert_eq!(next.pos(), 3);
            }
            ParseResult::Failure(_) => panic!("expected success"),
        }
    }
}
