//! The style declaration set and cascade (§3.6, §4.7): a CSS-like subset
//! (type/id/class selectors, `>` and descendant combinators, `*`) with no
//! attribute selectors, pseudo-classes, or media queries.

use std::collections::BTreeMap;

use laika_parse::Cursor;

/// What a renderer asks the cascade to match against: a node's variant
/// name, its `Options.id`, and its `Options.styles` set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub type_name: String,
    pub id: Option<String>,
    pub classes: std::collections::BTreeSet<String>,
}

impl NodeDescriptor {
    pub fn new(type_name: impl Into<String>, options: &crate::options::Options) -> Self {
        NodeDescriptor {
            type_name: type_name.into(),
            id: options.id.clone(),
            classes: options.styles.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Type(String),
    Id(String),
    Class(String),
}

impl SimpleSelector {
    fn matches(&self, node: &NodeDescriptor) -> bool {
        match self {
            SimpleSelector::Universal => true,
            SimpleSelector::Type(t) => &node.type_name == t,
            SimpleSelector::Id(id) => node.id.as_deref() == Some(id.as_str()),
            SimpleSelector::Class(c) => node.classes.contains(c),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompoundSelector(pub Vec<SimpleSelector>);

impl CompoundSelector {
    fn matches(&self, node: &NodeDescriptor) -> bool {
        self.0.iter().all(|s| s.matches(node))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Child,
    Descendant,
}

/// A selector as a chain of compound selectors right-to-left: `compounds`
/// has one more element than `combinators`, with `compounds.last()` being
/// the target node's own compound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

/// The specificity tuple `(ids, classes, types, order)` from §3.6; `order`
/// is filled in by the declaration set at insertion time, not by the
/// selector parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity {
    pub ids: usize,
    pub classes: usize,
    pub types: usize,
    pub order: usize,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Selector, String> {
        let cur = Cursor::new(input);
        let (selector, cur) = parse_selector(cur)?;
        let cur = skip_ws(cur);
        if !cur.at_eof() {
            return Err(format!("unexpected trailing input: {:?}", cur.remaining()));
        }
        Ok(selector)
    }

    fn matches(&self, node: &NodeDescriptor, ancestors: &[NodeDescriptor]) -> bool {
        if self.compounds.is_empty() {
            return false;
        }
        let last = self.compounds.len() - 1;
        if !self.compounds[last].matches(node) {
            return false;
        }
        self.match_ancestors(last, ancestors, ancestors.len())
    }

    fn match_ancestors(&self, compound_idx: usize, ancestors: &[NodeDescriptor], pos: usize) -> bool {
        if compound_idx == 0 {
            return true;
        }
        let combinator = self.combinators[compound_idx - 1];
        let target = &self.compounds[compound_idx - 1];
        match combinator {
            Combinator::Child => {
                if pos == 0 {
                    return false;
                }
                target.matches(&ancestors[pos - 1])
                    && self.match_ancestors(compound_idx - 1, ancestors, pos - 1)
            }
            Combinator::Descendant => {
                let mut i = pos;
                while i > 0 {
                    i -= 1;
                    if target.matches(&ancestors[i])
                        && self.match_ancestors(compound_idx - 1, ancestors, i)
                    {
                        return true;
                    }
                }
                false
            }
        }
    }

    /// `(ids, classes, types)` — `order` is appended by the caller.
    fn specificity_without_order(&self) -> (usize, usize, usize) {
        let mut ids = 0;
        let mut classes = 0;
        let mut types = 0;
        for compound in &self.compounds {
            for simple in &compound.0 {
                match simple {
                    SimpleSelector::Id(_) => ids += 1,
                    SimpleSelector::Class(_) => classes += 1,
                    SimpleSelector::Type(_) => types += 1,
                    SimpleSelector::Universal => {}
                }
            }
        }
        (ids, classes, types)
    }
}

fn skip_ws(cur: Cursor<'_>) -> Cursor<'_> {
    let mut c = cur;
    while let Some(ch) = c.char_at(0) {
        if ch.is_whitespace() {
            c = c.advance(ch.len_utf8());
        } else {
            break;
        }
    }
    c
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '-'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}

fn parse_ident<'a>(cur: Cursor<'a>) -> Result<(String, Cursor<'a>), String> {
    let first = cur
        .char_at(0)
        .filter(|c| is_ident_start(*c))
        .ok_or_else(|| format!("expected identifier at {}", cur.position()))?;
    let mut c = cur.advance(first.len_utf8());
    let mut s = String::new();
    s.push(first);
    while let Some(ch) = c.char_at(0) {
        if is_ident_continue(ch) {
            s.push(ch);
            c = c.advance(ch.len_utf8());
        } else {
            break;
        }
    }
    Ok((s, c))
}

fn parse_simple_selector<'a>(cur: Cursor<'a>) -> Result<(SimpleSelector, Cursor<'a>), String> {
    match cur.char_at(0) {
        Some('*') => Ok((SimpleSelector::Universal, cur.advance(1))),
        Some('#') => {
            let (name, next) = parse_ident(cur.advance(1))?;
            Ok((SimpleSelector::Id(name), next))
        }
        Some('.') => {
            let (name, next) = parse_ident(cur.advance(1))?;
            Ok((SimpleSelector::Class(name), next))
        }
        Some(ch) if is_ident_start(ch) => {
            let (name, next) = parse_ident(cur)?;
            Ok((SimpleSelector::Type(name), next))
        }
        _ => Err(format!("expected a selector at {}", cur.position())),
    }
}

fn parse_compound_selector<'a>(cur: Cursor<'a>) -> Result<(CompoundSelector, Cursor<'a>), String> {
    let (first, mut c) = parse_simple_selector(cur)?;
    let mut parts = vec![first];
    loop {
        match parse_simple_selector(c) {
            Ok((simple, next)) => {
                parts.push(simple);
                c = next;
            }
            Err(_) => break,
        }
    }
    Ok((CompoundSelector(parts), c))
}

fn parse_selector<'a>(cur: Cursor<'a>) -> Result<(Selector, Cursor<'a>), String> {
    let cur = skip_ws(cur);
    let (first, mut c) = parse_compound_selector(cur)?;
    let mut compounds = vec![first];
    let mut combinators = Vec::new();
    loop {
        let before_ws = c;
        let after_ws = skip_ws(c);
        let had_ws = after_ws.pos() != before_ws.pos();
        if after_ws.char_at(0) == Some('>') {
            let after_combinator = skip_ws(after_ws.advance(1));
            match parse_compound_selector(after_combinator) {
                Ok((next_compound, next_cur)) => {
                    combinators.push(Combinator::Child);
                    compounds.push(next_compound);
                    c = next_cur;
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        if had_ws {
            match parse_compound_selector(after_ws) {
                Ok((next_compound, next_cur)) => {
                    combinators.push(Combinator::Descendant);
                    compounds.push(next_compound);
                    c = next_cur;
                    continue;
                }
                Err(_) => {
                    c = before_ws;
                    break;
                }
            }
        }
        break;
    }
    Ok((
        Selector {
            compounds,
            combinators,
        },
        c,
    ))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub selector: Selector,
    pub properties: BTreeMap<String, String>,
}

/// A parsed style sheet; `styles_for` implements the cascade from §4.7:
/// matching declarations are sorted by specificity then declaration order,
/// with later values overriding earlier ones.
#[derive(Clone, Debug, Default)]
pub struct StyleDeclarationSet {
    declarations: Vec<Declaration>,
}

impl StyleDeclarationSet {
    pub fn new() -> Self {
        StyleDeclarationSet::default()
    }

    pub fn push(&mut self, declaration: Declaration) {
        self.declarations.push(declaration);
    }

    pub fn styles_for(
        &self,
        node: &NodeDescriptor,
        ancestors: &[NodeDescriptor],
    ) -> BTreeMap<String, String> {
        let mut matched: Vec<(Specificity, &Declaration)> = self
            .declarations
            .iter()
            .enumerate()
            .filter(|(_, d)| d.selector.matches(node, ancestors))
            .map(|(order, d)| {
                let (ids, classes, types) = d.selector.specificity_without_order();
                (
                    Specificity {
                        ids,
                        classes,
                        types,
                        order,
                    },
                    d,
                )
            })
            .collect();
        matched.sort_by_key(|(spec, _)| *spec);
        let mut result = BTreeMap::new();
        for (_, decl) in matched {
            for (k, v) in &decl.properties {
                result.insert(k.clone(), v.clone());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(type_name: &str, id: Option<&str>, classes: &[&str]) -> NodeDescriptor {
        NodeDescriptor {
            type_name: type_name.to_string(),
            id: id.map(|s| s.to_string()),
            classes: classes.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn parses_type_id_class_and_universal_selectors() {
        assert!(Selector::parse("paragraph").is_ok());
        assert!(Selector::parse("#intro").is_ok());
        assert!(Selector::parse(".highlight").is_ok());
        assert!(Selector::parse("*").is_ok());
        assert!(Selector::parse("paragraph.highlight#intro").is_ok());
    }

    #[test]
    fn descendant_combinator_matches_any_ancestor() {
        let selector = Selector::parse("section paragraph").unwrap();
        let ancestors = vec![node("root", None, &[]), node("section", None, &[])];
        assert!(selector.matches(&node("paragraph", None, &[]), &ancestors));
    }

    #[test]
    fn child_combinator_requires_direct_parent() {
        let selector = Selector::parse("section > paragraph").unwrap();
        let direct = vec![node("root", None, &[]), node("section", None, &[])];
        assert!(selector.matches(&node("paragraph", None, &[]), &direct));

        let indirect = vec![node("section", None, &[]), node("quotedblock", None, &[])];
        assert!(!selector.matches(&node("paragraph", None, &[]), &indirect));
    }

    #[test]
    fn cascade_prefers_higher_specificity_then_later_declaration() {
        let mut set = StyleDeclarationSet::new();
        set.push(Declaration {
            selector: Selector::parse("paragraph").unwrap(),
            properties: BTreeMap::from([("color".to_string(), "black".to_string())]),
        });
        set.push(Declaration {
            selector: Selector::parse("#intro").unwrap(),
            properties: BTreeMap::from([("color".to_string(), "red".to_string())]),
        });
        set.push(Declaration {
            selector: Selector::parse("paragraph").unwrap(),
            properties: BTreeMap::from([("color".to_string(), "blue".to_string())]),
        });
        let styles = set.styles_for(&node("paragraph", Some("intro"), &[]), &[]);
        assert_eq!(styles.get("color"), Some(&"red".to_string()));
    }
}
