//! HOCON-style config text parsing (§4.6/§6.4): turns the nested-object,
//! scalar, array, substitution and include-directive syntax into a
//! [`ConfigValue`] tree, the same kind of textual boundary contract the
//! markup front ends implement for document syntax. Unlike those front
//! ends this needs no block/span split — one recursive-descent pass over
//! a [`Cursor`] is enough.
//!
//! `laika-config` does no file I/O of its own (keeping the core crates
//! ambient-I/O-free, same discipline as the rest of the workspace): `parse`
//! rejects `include` directives outright, and `parse_with_includes` takes
//! the load side from the caller via [`IncludeLoader`].

use std::collections::BTreeMap;

use laika_parse::Cursor;
use thiserror::Error;

use crate::origin::Origin;
use crate::value::ConfigValue;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{path}:{line}: {message}")]
pub struct ParseError {
    pub path: String,
    pub line: usize,
    pub message: String,
}

/// Resolves an `include "name"` directive to the included document's text.
/// Implemented for any `Fn(&str) -> Result<String, String>`, so a caller
/// can pass a closure around `std::fs::read_to_string` without this crate
/// ever touching the filesystem itself.
pub trait IncludeLoader {
    fn load(&self, name: &str) -> Result<String, String>;
}

impl<F: Fn(&str) -> Result<String, String>> IncludeLoader for F {
    fn load(&self, name: &str) -> Result<String, String> {
        self(name)
    }
}

struct RejectIncludes;

impl IncludeLoader for RejectIncludes {
    fn load(&self, name: &str) -> Result<String, String> {
        Err(format!("include \"{name}\" used but no include loader was supplied"))
    }
}

/// Parses `input` (attributed to `path` in each value's `Origin::File`).
/// An `include` directive anywhere in `input` is a parse error — use
/// [`parse_with_includes`] when includes need to be honored.
pub fn parse(input: &str, path: &str) -> Result<ConfigValue, ParseError> {
    parse_with_includes(input, path, &RejectIncludes)
}

/// Parses `input` like [`parse`], but resolves `include "name"` directives
/// by calling `loader`: the included text is parsed recursively (against
/// the same loader) and deep-merged into the including object at the point
/// of inclusion (§6.4).
pub fn parse_with_includes(input: &str, path: &str, loader: &dyn IncludeLoader) -> Result<ConfigValue, ParseError> {
    let mut parser = Parser { cur: Cursor::new(input), path, loader };
    parser.skip_ws_and_comments();
    let mut fields = BTreeMap::new();
    parser.parse_members(&mut fields, false)?;
    parser.skip_ws_and_comments();
    if !parser.cur.at_eof() {
        return Err(parser.error("unexpected trailing content after top-level object"));
    }
    Ok(ConfigValue::Object { fields, origin: Origin::File { path: path.to_string(), line: 1 } })
}

/// One token of a concatenated value run (§6.4's "string concatenation"):
/// either a value already known at parse time, or a substitution whose
/// final text is only known once the root config resolves.
enum ValuePart {
    Literal(ConfigValue),
    Substitution { path: String, optional: bool, origin: Origin },
}

struct Parser<'a> {
    cur: Cursor<'a>,
    path: &'a str,
    loader: &'a dyn IncludeLoader,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError { path: self.path.to_string(), line: self.cur.position().line, message: message.into() }
    }

    fn origin(&self) -> Origin {
        Origin::File { path: self.path.to_string(), line: self.cur.position().line }
    }

    fn peek(&self) -> Option<char> {
        self.cur.char_at(0)
    }

    fn advance(&mut self, n: usize) {
        self.cur = self.cur.advance(n);
    }

    /// Skips whitespace, `#`/`//` line comments, and bare commas between
    /// members — HOCON treats a comma as just another separator alongside
    /// newlines.
    fn skip_ws_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == ',' => self.advance(c.len_utf8()),
                Some('#') => self.skip_to_eol(),
                Some('/') if self.cur.starts_with("//") => self.skip_to_eol(),
                _ => return,
            }
        }
    }

    fn skip_to_eol(&mut self) {
        let rest = self.cur.remaining();
        let len = rest.find('\n').unwrap_or(rest.len());
        self.advance(len);
    }

    /// Skips horizontal whitespace and comments only, stopping at a newline
    /// — used within a single value run, where a newline (not inside
    /// brackets) ends the concatenation but a comma/space doesn't.
    fn skip_inline_ws_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() && c != '\n' => self.advance(c.len_utf8()),
                Some('#') => self.skip_to_eol(),
                Some('/') if self.cur.starts_with("//") => self.skip_to_eol(),
                _ => return,
            }
        }
    }

    /// Parses the members of an object body: `key : value` or
    /// `key { nested }` pairs, and `include "name"` directives, until EOF
    /// (`in_braces == false`) or a closing `}` (`in_braces == true`).
    fn parse_members(&mut self, fields: &mut BTreeMap<String, ConfigValue>, in_braces: bool) -> Result<(), ParseError> {
        loop {
            self.skip_ws_and_comments();
            match self.peek() {
                None => {
                    if in_braces {
                        return Err(self.error("unexpected end of input inside '{'"));
                    }
                    return Ok(());
                }
                Some('}') => {
                    if !in_braces {
                        return Err(self.error("unexpected '}'"));
                    }
                    self.advance(1);
                    return Ok(());
                }
                _ => {}
            }

            if self.cur.starts_with("include") && self.starts_include_directive() {
                self.advance("include".len());
                self.skip_inline_ws_and_comments();
                let name = self.parse_quoted_string()?;
                let included = self
                    .loader
                    .load(&name)
                    .map_err(|err| self.error(format!("failed to include \"{name}\": {err}")))?;
                let included_value = parse_with_includes(&included, &name, self.loader)
                    .map_err(|err| self.error(format!("in included file \"{name}\": {err}")))?;
                if let ConfigValue::Object { fields: included_fields, .. } = included_value {
                    for (key, value) in included_fields {
                        merge_field(fields, key, value);
                    }
                }
                continue;
            }

            let segments = self.parse_key_path()?;
            self.skip_inline_ws_and_comments();
            let value = match self.peek() {
                Some('{') => self.parse_object()?,
                Some(':') | Some('=') => {
                    self.advance(1);
                    self.skip_inline_ws_and_comments();
                    self.parse_value_run()?
                }
                _ => return Err(self.error("expected ':', '=' or '{' after a key")),
            };
            set_path_segments(fields, &segments, value);
        }
    }

    /// `include` is only a directive at the start of a member; anything
    /// else starting with those letters (e.g. a bare key named `includes`)
    /// is an ordinary key.
    fn starts_include_directive(&self) -> bool {
        self.cur.remaining()["include".len()..]
            .chars()
            .next()
            .is_none_or(|c| c.is_whitespace() || c == '"')
    }

    fn parse_key_path(&mut self) -> Result<Vec<String>, ParseError> {
        let mut segments = vec![self.parse_key_segment()?];
        loop {
            self.skip_inline_ws_and_comments_within_key();
            if self.peek() == Some('.') {
                self.advance(1);
                self.skip_inline_ws_and_comments_within_key();
                segments.push(self.parse_key_segment()?);
            } else {
                return Ok(segments);
            }
        }
    }

    // A key path's segments may not be split across lines, but may have
    // plain spaces around the '.' separator.
    fn skip_inline_ws_and_comments_within_key(&mut self) {
        while matches!(self.peek(), Some(c) if c == ' ' || c == '\t') {
            self.advance(1);
        }
    }

    fn parse_key_segment(&mut self) -> Result<String, ParseError> {
        if self.peek() == Some('"') {
            return self.parse_quoted_string();
        }
        let rest = self.cur.remaining();
        let len = rest
            .char_indices()
            .take_while(|(_, c)| !matches!(c, '.' | ':' | '=' | '{' | '}' | ',' | '\n' | '#') && !c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .last()
            .unwrap_or(0);
        if len == 0 {
            return Err(self.error("expected a config key"));
        }
        let key = rest[..len].to_string();
        self.advance(len);
        Ok(key)
    }

    fn parse_object(&mut self) -> Result<ConfigValue, ParseError> {
        let origin = self.origin();
        self.advance(1); // '{'
        let mut fields = BTreeMap::new();
        self.parse_members(&mut fields, true)?;
        Ok(ConfigValue::Object { fields, origin })
    }

    fn parse_array(&mut self) -> Result<ConfigValue, ParseError> {
        let origin = self.origin();
        self.advance(1); // '['
        let mut items = Vec::new();
        loop {
            self.skip_ws_and_comments();
            match self.peek() {
                None => return Err(self.error("unexpected end of input inside '['")),
                Some(']') => {
                    self.advance(1);
                    return Ok(ConfigValue::Array { items, origin });
                }
                _ => {
                    items.push(self.parse_value_run()?);
                    self.skip_ws_and_comments();
                    if self.peek() == Some(',') {
                        self.advance(1);
                    }
                }
            }
        }
    }

    /// Parses one value, and any further atoms concatenated onto it on the
    /// same line (§6.4): `name = "hello, " ${user.name}` becomes a single
    /// string built by joining the resolved parts at resolve time.
    fn parse_value_run(&mut self) -> Result<ConfigValue, ParseError> {
        let first = self.parse_value_atom()?;
        if matches!(first, ConfigValue::Object { .. } | ConfigValue::Array { .. }) {
            return Ok(first);
        }
        let mut parts = vec![atom_to_part(first)];
        loop {
            self.skip_inline_ws_and_comments();
            match self.peek() {
                Some(c) if is_value_terminator(c) => break,
                None => break,
                _ => {
                    let atom = self.parse_value_atom()?;
                    parts.push(atom_to_part(atom));
                }
            }
        }
        if parts.len() == 1 {
            return Ok(part_to_value(parts.pop().unwrap()));
        }
        Ok(build_concatenation(parts))
    }

    fn parse_value_atom(&mut self) -> Result<ConfigValue, ParseError> {
        match self.peek() {
            None => Err(self.error("expected a value")),
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') => {
                let origin = self.origin();
                let s = self.parse_quoted_string()?;
                Ok(ConfigValue::String { value: s, origin })
            }
            Some('$') if self.cur.starts_with("${") => self.parse_substitution(),
            _ => self.parse_bare_atom(),
        }
    }

    fn parse_substitution(&mut self) -> Result<ConfigValue, ParseError> {
        let origin = self.origin();
        self.advance(2); // "${"
        let optional = self.peek() == Some('?');
        if optional {
            self.advance(1);
        }
        let rest = self.cur.remaining();
        let Some(end) = rest.find('}') else {
            return Err(self.error("unterminated substitution, expected '}'"));
        };
        let path = rest[..end].trim().to_string();
        self.advance(end + 1);
        Ok(ConfigValue::Substitution { path, optional, origin })
    }

    fn parse_quoted_string(&mut self) -> Result<String, ParseError> {
        if self.peek() != Some('"') {
            return Err(self.error("expected a quoted string"));
        }
        self.advance(1);
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string literal")),
                Some('"') => {
                    self.advance(1);
                    return Ok(out);
                }
                Some('\\') => {
                    self.advance(1);
                    match self.peek() {
                        Some('n') => out.push('\n'),
                        Some('t') => out.push('\t'),
                        Some('r') => out.push('\r'),
                        Some(c @ ('"' | '\\' | '/')) => out.push(c),
                        Some(other) => return Err(self.error(format!("invalid escape '\\{other}'"))),
                        None => return Err(self.error("unterminated escape at end of input")),
                    }
                    self.advance(self.peek_escaped_len());
                }
                Some(c) => {
                    out.push(c);
                    self.advance(c.len_utf8());
                }
            }
        }
    }

    // The escaped character was already peeked (and matched) above without
    // advancing past it; this just reports its byte length so the caller's
    // single `advance` call consumes exactly that character.
    fn peek_escaped_len(&self) -> usize {
        self.peek().map(char::len_utf8).unwrap_or(0)
    }

    fn parse_bare_atom(&mut self) -> Result<ConfigValue, ParseError> {
        let origin = self.origin();
        let rest = self.cur.remaining();
        let len = rest
            .char_indices()
            .take_while(|(_, c)| !is_value_terminator(*c) && !c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .last()
            .unwrap_or(0);
        if len == 0 {
            return Err(self.error(format!("unexpected character '{}'", self.peek().unwrap_or(' '))));
        }
        let token = &rest[..len];
        self.advance(len);
        Ok(match token {
            "true" => ConfigValue::Bool { value: true, origin },
            "false" => ConfigValue::Bool { value: false, origin },
            "null" => ConfigValue::Null { origin },
            _ => match token.parse::<i64>() {
                Ok(i) => ConfigValue::Int { value: i, origin },
                Err(_) => match token.parse::<f64>() {
                    Ok(d) => ConfigValue::Double { value: d.to_bits(), origin },
                    Err(_) => ConfigValue::String { value: token.to_string(), origin },
                },
            },
        })
    }
}

fn is_value_terminator(c: char) -> bool {
    matches!(c, ',' | '}' | ']' | '\n' | '#')
}

fn atom_to_part(value: ConfigValue) -> ValuePart {
    match value {
        ConfigValue::Substitution { path, optional, origin } => ValuePart::Substitution { path, optional, origin },
        other => ValuePart::Literal(other),
    }
}

fn part_to_value(part: ValuePart) -> ConfigValue {
    match part {
        ValuePart::Literal(v) => v,
        ValuePart::Substitution { path, optional, origin } => ConfigValue::Substitution { path, optional, origin },
    }
}

/// Builds a `Dependent` value (§4.6) that re-resolves each substitution
/// part against the eventual root config and joins every part's string
/// form, left to right — HOCON's string-concatenation rule.
fn build_concatenation(parts: Vec<ValuePart>) -> ConfigValue {
    let origin = match parts.first() {
        Some(ValuePart::Literal(v)) => v.origin().clone(),
        Some(ValuePart::Substitution { origin, .. }) => origin.clone(),
        None => Origin::Default,
    };
    let resolve = crate::value::DependentFn(std::rc::Rc::new(move |root: &ConfigValue| {
        let mut out = String::new();
        for part in &parts {
            match part {
                ValuePart::Literal(v) => out.push_str(&display_scalar(v)),
                ValuePart::Substitution { path, .. } => match crate::resolver::resolve(root, path) {
                    Ok(resolved) => out.push_str(&display_scalar(&resolved)),
                    Err(err) => return Err(err.to_string()),
                },
            }
        }
        Ok(ConfigValue::String { value: out, origin: Origin::Default })
    }));
    ConfigValue::Dependent { resolve, origin }
}

fn display_scalar(value: &ConfigValue) -> String {
    match value {
        ConfigValue::Null { .. } => String::new(),
        ConfigValue::Bool { value, .. } => value.to_string(),
        ConfigValue::Int { value, .. } => value.to_string(),
        ConfigValue::Double { value, .. } => f64::from_bits(*value).to_string(),
        ConfigValue::String { value, .. } => value.clone(),
        other => format!("{other:?}"),
    }
}

/// Inserts `value` at `segments` inside `fields`, deep-merging into an
/// already-present object at the same path rather than discarding it
/// (HOCON's "later same-key object wins per-leaf" rule, §4.6) — the same
/// rule `deep_merge` applies between whole documents, applied here one
/// member at a time as the file is parsed.
fn set_path_segments(fields: &mut BTreeMap<String, ConfigValue>, segments: &[String], value: ConfigValue) {
    match segments {
        [] => unreachable!("a key path always has at least one segment"),
        [last] => merge_field(fields, last.clone(), value),
        [head, rest @ ..] => {
            let mut nested = match fields.remove(head) {
                Some(ConfigValue::Object { fields, .. }) => fields,
                _ => BTreeMap::new(),
            };
            set_path_segments(&mut nested, rest, value);
            fields.insert(head.clone(), ConfigValue::Object { fields: nested, origin: Origin::Default });
        }
    }
}

fn merge_field(fields: &mut BTreeMap<String, ConfigValue>, key: String, value: ConfigValue) {
    match (fields.get(&key), &value) {
        (Some(ConfigValue::Object { .. }), ConfigValue::Object { .. }) => {
            let existing = fields.remove(&key).unwrap();
            fields.insert(key, crate::merge::deep_merge(&existing, &value));
        }
        _ => {
            fields.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_flat_object_of_scalars() {
        let config = parse("a = 1\nb = \"two\"\nc = true\n", "test.conf").unwrap();
        let fields = config.as_object().unwrap();
        assert_eq!(fields.get("a").unwrap().as_int(), Some(1));
        assert_eq!(fields.get("b").unwrap().as_str(), Some("two"));
        assert_eq!(fields.get("c").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn parses_a_dotted_key_path_into_nested_objects() {
        let config = parse("laika.autosectionnumbering = true\n", "test.conf").unwrap();
        assert_eq!(config.get_raw("laika.autosectionnumbering").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn parses_brace_shorthand_for_nested_objects() {
        let config = parse("laika { autosectionnumbering = true }\n", "test.conf").unwrap();
        assert_eq!(config.get_raw("laika.autosectionnumbering").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn parses_an_array_of_scalars() {
        let config = parse("items = [1, 2, 3]\n", "test.conf").unwrap();
        let items = &config.as_object().unwrap().get("items").unwrap();
        match items {
            ConfigValue::Array { items, .. } => {
                assert_eq!(items.iter().map(|v| v.as_int().unwrap()).collect::<Vec<_>>(), vec![1, 2, 3]);
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_required_substitution() {
        let config = parse("a = 1\nb = ${a}\n", "test.conf").unwrap();
        let resolved = crate::resolver::resolve(&config, "b").unwrap();
        assert_eq!(resolved.as_int(), Some(1));
    }

    #[test]
    fn parses_an_optional_substitution_to_a_missing_key() {
        let config = parse("b = ${?missing}\n", "test.conf").unwrap();
        let resolved = crate::resolver::resolve(&config, "b").unwrap();
        assert!(matches!(resolved, ConfigValue::Null { .. }));
    }

    #[test]
    fn concatenates_a_literal_and_a_substitution() {
        let config = parse("name = \"world\"\ngreeting = \"hello, \" ${name}\n", "test.conf").unwrap();
        let resolved = crate::resolver::resolve(&config, "greeting").unwrap();
        assert_eq!(resolved.as_str(), Some("hello, world"));
    }

    #[test]
    fn later_objects_at_the_same_key_deep_merge_instead_of_overwriting() {
        let config = parse("a { x = 1 }\na { y = 2 }\n", "test.conf").unwrap();
        let a = config.get_raw("a").unwrap().as_object().unwrap();
        assert_eq!(a.get("x").unwrap().as_int(), Some(1));
        assert_eq!(a.get("y").unwrap().as_int(), Some(2));
    }

    #[test]
    fn include_directive_is_rejected_without_a_loader() {
        let err = parse("include \"other.conf\"\n", "test.conf").unwrap_err();
        assert!(err.message.contains("no include loader"));
    }

    #[test]
    fn include_directive_merges_the_loaded_document() {
        let loader = |name: &str| -> Result<String, String> {
            assert_eq!(name, "shared.conf");
            Ok("shared_key = 42\n".to_string())
        };
        let config = parse_with_includes("include \"shared.conf\"\ntop = 1\n", "test.conf", &loader).unwrap();
        let fields = config.as_object().unwrap();
        assert_eq!(fields.get("top").unwrap().as_int(), Some(1));
        assert_eq!(fields.get("shared_key").unwrap().as_int(), Some(42));
    }

    #[test]
    fn comments_are_skipped() {
        let config = parse("# a comment\na = 1 # trailing\n", "test.conf").unwrap();
        assert_eq!(config.get_raw("a").unwrap().as_int(), Some(1));
    }
}
