//! The directive framework (§4.4): a declarative description of a block or
//! span directive — its name, its attributes (positional/named, each with a
//! required flag and a decoder), how it consumes its body, and the builder
//! function that turns a validated invocation into an AST node.
//!
//! Unknown or malformed directives never panic or raise: they degrade into
//! an `Invalid` node the surrounding application can choose to render or
//! fail on (§4.5).

use std::collections::BTreeMap;
use std::rc::Rc;

use laika_ast::{Block, Invalid, SourceFragment, Span};

use crate::line::{fragment_for_lines, Line};

#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

pub fn decode_string(raw: &str) -> Result<AttributeValue, String> {
    Ok(AttributeValue::Str(raw.trim().to_string()))
}

pub fn decode_int(raw: &str) -> Result<AttributeValue, String> {
    raw.trim()
        .parse::<i64>()
        .map(AttributeValue::Int)
        .map_err(|_| format!("'{raw}' is not a valid integer"))
}

pub fn decode_flag(raw: &str) -> Result<AttributeValue, String> {
    match raw.trim() {
        "" | "true" | "yes" | "on" => Ok(AttributeValue::Bool(true)),
        "false" | "no" | "off" => Ok(AttributeValue::Bool(false)),
        other => Err(format!("'{other}' is not a valid flag")),
    }
}

#[derive(Clone)]
pub struct AttributeSpec {
    pub name: String,
    pub required: bool,
    pub decode: Rc<dyn Fn(&str) -> Result<AttributeValue, String>>,
}

impl AttributeSpec {
    pub fn required(name: impl Into<String>, decode: Rc<dyn Fn(&str) -> Result<AttributeValue, String>>) -> Self {
        AttributeSpec { name: name.into(), required: true, decode }
    }

    pub fn optional(name: impl Into<String>, decode: Rc<dyn Fn(&str) -> Result<AttributeValue, String>>) -> Self {
        AttributeSpec { name: name.into(), required: false, decode }
    }
}

/// How a directive's body is handed to its builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyMode {
    None,
    RawText,
    Blocks,
    Spans,
}

pub struct DirectiveInvocation {
    pub positional: Vec<String>,
    pub named: BTreeMap<String, AttributeValue>,
    pub raw_text: Option<String>,
    pub blocks: Vec<Block>,
    pub spans: Vec<Span>,
    pub source: SourceFragment,
}

impl DirectiveInvocation {
    pub fn named_str(&self, name: &str) -> Option<&str> {
        self.named.get(name).and_then(AttributeValue::as_str)
    }
}

pub struct DirectiveSpec {
    pub name: String,
    pub positional: Vec<AttributeSpec>,
    pub named: Vec<AttributeSpec>,
    pub body: BodyMode,
    pub build: Rc<dyn Fn(DirectiveInvocation) -> Block>,
}

impl DirectiveSpec {
    pub fn new(name: impl Into<String>, body: BodyMode, build: impl Fn(DirectiveInvocation) -> Block + 'static) -> Self {
        DirectiveSpec {
            name: name.into(),
            positional: Vec::new(),
            named: Vec::new(),
            body,
            build: Rc::new(build),
        }
    }

    pub fn with_positional(mut self, spec: AttributeSpec) -> Self {
        self.positional.push(spec);
        self
    }

    pub fn with_named(mut self, spec: AttributeSpec) -> Self {
        self.named.push(spec);
        self
    }
}

#[derive(Default)]
pub struct DirectiveRegistry {
    specs: BTreeMap<String, DirectiveSpec>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        DirectiveRegistry::default()
    }

    pub fn register(&mut self, spec: DirectiveSpec) {
        self.specs.insert(spec.name.clone(), spec);
    }

    pub fn merge(&mut self, other: DirectiveRegistry) {
        self.specs.extend(other.specs);
    }

    pub fn get(&self, name: &str) -> Option<&DirectiveSpec> {
        self.specs.get(name)
    }
}

/// Splits a directive body into its leading `:field: value` attribute lines
/// and the remaining content lines, per RST's field-list convention.
pub fn split_named_fields<'a>(lines: &[Line<'a>]) -> (BTreeMap<String, String>, Vec<Line<'a>>) {
    let mut fields = BTreeMap::new();
    let mut i = 0;
    while i < lines.len() {
        let t = lines[i].text.trim();
        if let Some(rest) = t.strip_prefix(':') {
            if let Some(close) = rest.find(':') {
                let name = rest[..close].trim().to_string();
                let value = rest[close + 1..].trim().to_string();
                fields.insert(name, value);
                i += 1;
                continue;
            }
        }
        break;
    }
    (fields, lines[i..].to_vec())
}

/// Resolves a directive invocation against `registry`, producing either the
/// spec's built `Block` or an `Invalid` node describing what went wrong.
pub fn apply_block_directive(
    registry: &DirectiveRegistry,
    name: &str,
    positional_args: Vec<String>,
    raw_named: BTreeMap<String, String>,
    raw_text: Option<String>,
    blocks: Vec<Block>,
    spans: Vec<Span>,
    source: SourceFragment,
) -> Block {
    let Some(spec) = registry.get(name) else {
        return Block::Invalid(Invalid::warning(format!("unknown directive '{name}'"), source));
    };

    let mut named = BTreeMap::new();
    for attr in &spec.named {
        match raw_named.get(&attr.name) {
            Some(raw) => match (attr.decode)(raw) {
                Ok(v) => {
                    named.insert(attr.name.clone(), v);
                }
                Err(msg) => {
                    return Block::Invalid(Invalid::error(
                        format!("directive '{name}': attribute '{}': {msg}", attr.name),
                        source,
                    ));
                }
            },
            None if attr.required => {
                return Block::Invalid(Invalid::error(
                    format!("directive '{name}': missing required attribute '{}'", attr.name),
                    source,
                ));
            }
            None => {}
        }
    }

    (spec.build)(DirectiveInvocation {
        positional: positional_args,
        named,
        raw_text,
        blocks,
        spans,
        source,
    })
}

/// Parses a `@:name(positional, key=value, ...)` call header, shared verbatim
/// by both host languages' block grammars (§4.4's directive syntax sits on
/// top of either markup language, not inside it). Returns `None` if `text`
/// doesn't open with `@:`.
fn parse_call_header(text: &str) -> Option<(String, Vec<String>, BTreeMap<String, String>)> {
    let rest = text.trim_start().strip_prefix("@:")?;
    let name_len = rest
        .find(|c: char| c == '(' || c == '{' || c.is_whitespace())
        .unwrap_or(rest.len());
    let name = rest[..name_len].to_string();
    if name.is_empty() {
        return None;
    }
    let after_name = rest[name_len..].trim_start();
    let mut positional = Vec::new();
    let mut named = BTreeMap::new();
    if let Some(args) = after_name.strip_prefix('(') {
        let close = args.find(')')?;
        for part in args[..close].split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once('=') {
                Some((k, v)) => {
                    named.insert(k.trim().to_string(), v.trim().trim_matches('"').to_string());
                }
                None => positional.push(part.to_string()),
            }
        }
    }
    Some((name, positional, named))
}

/// Recognizes a `@:name(...)` call, optionally followed by a `{ ... }` body
/// running to a line whose trimmed text is exactly `}`. `parse_body_blocks`
/// recurses into the host language's own block grammar for `BodyMode::Blocks`
/// directives; callers without a recursive parser (e.g. span-only contexts)
/// can pass a closure returning an empty vec.
pub fn try_directive_call(
    root: &str,
    lines: &[Line],
    registry: &DirectiveRegistry,
    parse_body_blocks: impl Fn(&str, &[Line]) -> Vec<Block>,
) -> Option<(Block, usize)> {
    let first = lines[0];
    let (name, positional, named) = parse_call_header(first.text)?;
    let trimmed_end = first.text.trim_end();

    if !trimmed_end.ends_with('{') {
        let source = fragment_for_lines(root, &[first]);
        return Some((
            apply_block_directive(registry, &name, positional, named, None, vec![], vec![], source),
            1,
        ));
    }

    let mut body_lines = Vec::new();
    let mut i = 1;
    while i < lines.len() && lines[i].text.trim() != "}" {
        body_lines.push(lines[i]);
        i += 1;
    }
    let consumed = if i < lines.len() { i + 1 } else { i };
    let source = fragment_for_lines(root, &lines[..consumed.max(1)]);

    let Some(spec) = registry.get(&name) else {
        return Some((Block::Invalid(Invalid::warning(format!("unknown directive '{name}'"), source)), consumed));
    };

    let (raw_text, blocks) = match spec.body {
        BodyMode::Blocks => (None, parse_body_blocks(root, &body_lines)),
        BodyMode::RawText | BodyMode::Spans => {
            let text = body_lines.iter().map(|l| l.text).collect::<Vec<_>>().join("\n");
            (Some(text), vec![])
        }
        BodyMode::None => (None, vec![]),
    };

    Some((
        apply_block_directive(registry, &name, positional, named, raw_text, blocks, vec![], source),
        consumed,
    ))
}
