//! [`PrefixedParser`]: a [`Parser`] tagged with the set of characters it can
//! possibly start on. The span-parsing loop (§4.3) builds an `O(1)`
//! character→candidates table from this tag instead of trying every
//! registered span parser at every position.

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::cursor::Cursor;
use crate::parser::Parser;
use crate::result::ParseResult;

/// The set of characters a [`PrefixedParser`] is allowed to start on. Kept
/// as an ordered set so two parsers' start-char sets can be unioned
/// deterministically when they're combined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartChars(Rc<BTreeSet<char>>);

impl StartChars {
    pub fn single(c: char) -> Self {
        StartChars(Rc::new(BTreeSet::from([c])))
    }

    pub fn many(chars: impl IntoIterator<Item = char>) -> Self {
        StartChars(Rc::new(chars.into_iter().collect()))
    }

    pub fn union(&self, other: &StartChars) -> StartChars {
        StartChars(Rc::new(self.0.union(&other.0).copied().collect()))
    }

    pub fn contains(&self, c: char) -> bool {
        self.0.contains(&c)
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }
}

/// A [`Parser`] that is guaranteed to fail unless the current character is
/// one of `start_chars`. The guarantee is the caller's responsibility to
/// uphold (nothing here re-checks it at parse time beyond the cheap
/// membership test a dispatch table already performs).
pub struct PrefixedParser<'a, T> {
    pub start_chars: StartChars,
    parser: Parser<'a, T>,
}

impl<'a, T> Clone for PrefixedParser<'a, T> {
    fn clone(&self) -> Self {
        PrefixedParser {
            start_chars: self.start_chars.clone(),
            parser: self.parser.clone(),
        }
    }
}

impl<'a, T: 'a> PrefixedParser<'a, T> {
    pub fn new(start_chars: StartChars, parser: Parser<'a, T>) -> Self {
        PrefixedParser { start_chars, parser }
    }

    pub fn parse(&self, cursor: Cursor<'a>) -> ParseResult<'a, T> {
        self.parser.parse(cursor)
    }

    pub fn as_parser(&self) -> Parser<'a, T> {
        self.parser.clone()
    }

    /// Quick rejection test a dispatch table uses before bothering to run
    /// the full parser: `false` means "definitely will not match here".
    pub fn could_start_at(&self, c: char) -> bool {
        self.start_chars.contains(c)
    }

    pub fn map<U: 'a>(self, f: impl Fn(T) -> U + 'a) -> PrefixedParser<'a, U> {
        PrefixedParser {
            start_chars: self.start_chars,
            parser: self.parser.map(f),
        }
    }

    /// Sequencing preserves `self`'s start chars: whatever `other` starts
    /// with doesn't matter because `self` must match first.
    pub fn and<U: 'a>(self, other: Parser<'a, U>) -> PrefixedParser<'a, (T, U)> {
        PrefixedParser {
            start_chars: self.start_chars,
            parser: self.parser.and(other),
        }
    }

    pub fn and_right<U: 'a>(self, other: Parser<'a, U>) -> PrefixedParser<'a, U> {
        PrefixedParser {
            start_chars: self.start_chars,
            parser: self.parser.and_right(other),
        }
    }

    pub fn and_left<U: 'a>(self, other: Parser<'a, U>) -> PrefixedParser<'a, T> {
        PrefixedParser {
            start_chars: self.start_chars,
            parser: self.parser.and_left(other),
        }
    }

    /// Choice unions both operands' start-char sets: the combined parser
    /// can start on anything either side could.
    pub fn or(self, other: PrefixedParser<'a, T>) -> PrefixedParser<'a, T> {
        PrefixedParser {
            start_chars: self.start_chars.union(&other.start_chars),
            parser: self.parser.or(other.parser),
        }
    }
}

/// A dispatch table from a start character to the `PrefixedParser`
/// candidates that might match there, built once per call site (e.g. once
/// per span-parser registration) and then reused for every position in the
/// input — this is what keeps the block/span loops from degrading into a
/// quadratic "try every parser at every offset" scan.
pub struct DispatchTable<'a, T> {
    by_char: std::collections::HashMap<char, Vec<PrefixedParser<'a, T>>>,
    catch_all: Vec<PrefixedParser<'a, T>>,
}

impl<'a, T: 'a> DispatchTable<'a, T> {
    pub fn build(parsers: Vec<PrefixedParser<'a, T>>) -> Self {
        let mut by_char: std::collections::HashMap<char, Vec<PrefixedParser<'a, T>>> =
            std::collections::HashMap::new();
        for p in &parsers {
            for c in p.start_chars.iter() {
                by_char.entry(c).or_default().push(p.clone());
            }
        }
        DispatchTable {
            by_char,
            catch_all: Vec::new(),
        }
    }

    /// Candidates worth trying at `c`, in registration order.
    pub fn candidates(&self, c: char) -> impl Iterator<Item = &PrefixedParser<'a, T>> {
        self.by_char
            .get(&c)
            .into_iter()
            .flatten()
            .chain(self.catch_all.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ParseResult;

    fn star<'a>() -> PrefixedParser<'a, &'a str> {
        PrefixedParser::new(
            StartChars::single('*'),
            Parser::new(|cur: Cursor<'a>| {
                if cur.starts_with("*") {
                    ParseResult::success("*", cur.advance(1))
                } else {
                    ParseResult::failure("expected '*'", cur)
                }
            }),
        )
    }

    fn underscore<'a>() -> PrefixedParser<'a, &'a str> {
        PrefixedParser::new(
            StartChars::single('_'),
            Parser::new(|cur: Cursor<'a>| {
                if cur.starts_with("_") {
                    ParseResult::success("_", cur.advance(1))
                } else {
                    ParseResult::failure("expected '_'", cur)
                }
            }),
        )
    }

    #[test]
    fn union_combines_start_chars() {
        let combined = star().or(underscore());
        assert!(combined.could_start_at('*'));
        assert!(combined.could_start_at('_'));
        assert!(!combined.could_start_at('a'));
    }

    #[test]
    fn dispatch_table_only_offers_matching_candidates() {
        let table = DispatchTable::build(vec![star(), underscore()]);
        assert_eq!(table.candidates('*').count(), 1);
        assert_eq!(table.candidates('_').count(), 1);
        assert_eq!(table.candidates('x').count(), 0);
    }
}
