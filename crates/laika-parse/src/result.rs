//! The parser result sum and the failure-merging rule that alternation uses
//! to pick the "most informative" branch (§3.2).

use crate::cursor::Cursor;

/// The outcome of running a parser: either a value plus the cursor positioned
/// just past what was consumed, or a [`Failure`].
#[derive(Clone, Debug)]
pub enum ParseResult<'a, T> {
    Success { value: T, next: Cursor<'a> },
    Failure(Failure<'a>),
}

/// A parse failure. `max_offset` is the furthest absolute input offset any
/// branch that contributed to this failure managed to reach; alternation
/// uses it to prefer the failure that got furthest, which in practice means
/// the most specific error message wins over a shallow "expected X" from a
/// branch that bailed out immediately.
#[derive(Clone, Debug)]
pub struct Failure<'a> {
    pub message: String,
    pub cursor: Cursor<'a>,
    pub max_offset: usize,
}

impl<'a> Failure<'a> {
    pub fn new(message: impl Into<String>, cursor: Cursor<'a>) -> Self {
        let max_offset = cursor.pos();
        Failure {
            message: message.into(),
            cursor,
            max_offset,
        }
    }

    /// Merges two failures per the `max_offset` tie-break rule in §3.2:
    /// the failure that reached further into the input wins; ties keep the
    /// left (first-tried) failure, preserving left-to-right alternation
    /// precedence.
    pub fn merge(self, other: Failure<'a>) -> Failure<'a> {
        if other.max_offset > self.max_offset {
            other
        } else {
            self
        }
    }
}

impl<'a, T> ParseResult<'a, T> {
    pub fn success(value: T, next: Cursor<'a>) -> Self {
        ParseResult::Success { value, next }
    }

    pub fn failure(message: impl Into<String>, cursor: Cursor<'a>) -> Self {
        ParseResult::Failure(Failure::new(message, cursor))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success { .. })
    }

    pub fn max_offset(&self) -> usize {
        match self {
            ParseResult::Success { next, .. } => next.pos(),
            ParseResult::Failure(f) => f.max_offset,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseResult<'a, U> {
        match self {
            ParseResult::Success { value, next } => ParseResult::Success {
                value: f(value),
                next,
            },
            ParseResult::Failure(failure) => ParseResult::Failure(failure),
        }
    }
}
