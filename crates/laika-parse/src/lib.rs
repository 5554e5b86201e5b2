//! `laika-parse` — the position-tracking parser combinator core (L1) that
//! every Laika front-end is built on.
//!
//! Nothing in this crate knows about Markdown, reStructuredText, or the
//! document AST; it only knows how to turn a `&str` into `ParseResult`s via
//! composable [`Parser`] values. See `laika-markup` for the markup-specific
//! grammars built on top of it.

pub mod cursor;
pub mod delimited;
pub mod parser;
pub mod prefixed;
pub mod result;

pub use cursor::{Cursor, Position};
pub use delimited::{delimited_text, scan_inline_step, DelimitedOptions, InlineEvent};
pub use parser::{look_ahead, look_behind, Fragment, Parser, RepOptions};
pub use prefixed::{DispatchTable, PrefixedParser, StartChars};
pub use result::{Failure, ParseResult};
