//! Invalid-element policy (§4.5): two severity thresholds decide which
//! `Invalid` nodes survive into rendered output and which ones fail the
//! whole transformation. `Invalid` nodes are plain AST values, never
//! exceptions, so both filters are ordinary `Severity` comparisons applied
//! after every rewrite phase has run.

use laika_ast::{Block, Invalid, Severity, Span};

/// Render-filter / fail-filter pair. Defaults match §4.5: render warnings
/// and below, fail on errors and above.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Filters {
    pub render_at_most: Severity,
    pub fail_at_least: Severity,
}

impl Default for Filters {
    fn default() -> Self {
        Filters {
            render_at_most: Severity::Warning,
            fail_at_least: Severity::Error,
        }
    }
}

impl Filters {
    pub fn should_render(&self, severity: Severity) -> bool {
        severity <= self.render_at_most
    }

    pub fn should_fail(&self, severity: Severity) -> bool {
        severity >= self.fail_at_least
    }
}

/// One `Invalid` node, formatted with enough context (line number, message,
/// line content) for a multi-line diagnostic (§7).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidElementInfo {
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub line_content: String,
}

impl From<&Invalid> for InvalidElementInfo {
    fn from(inv: &Invalid) -> Self {
        InvalidElementInfo {
            line: inv.source.line,
            column: inv.source.column,
            message: inv.message.clone(),
            line_content: inv.source.text.lines().next().unwrap_or("").to_string(),
        }
    }
}

impl std::fmt::Display for InvalidElementInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}:{}: {}", self.line, self.column, self.message)?;
        writeln!(f, "  {}", self.line_content)?;
        write!(f, "  {}^", " ".repeat(self.column.saturating_sub(1)))
    }
}

/// Raised at the end of a transform when the fail-filter matches one or
/// more invalid elements (§7).
#[derive(Debug, PartialEq, Eq)]
pub struct InvalidDocument {
    pub elements: Vec<InvalidElementInfo>,
}

impl std::fmt::Display for InvalidDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "document contains {} invalid element(s):", self.elements.len())?;
        let formatted = self.elements.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n");
        write!(f, "{formatted}")
    }
}

impl std::error::Error for InvalidDocument {}

/// Walks the whole tree (blocks and every span they own, directly or
/// nested) and collects every `Invalid` node found.
pub fn collect_invalid(blocks: &[Block]) -> Vec<&Invalid> {
    let mut out = Vec::new();
    for block in blocks {
        collect_invalid_in_block(block, &mut out);
    }
    out
}

fn collect_invalid_in_block<'a>(block: &'a Block, out: &mut Vec<&'a Invalid>) {
    if let Block::Invalid(inv) = block {
        out.push(inv);
    }
    if let Some(children) = block.children() {
        for child in children {
            collect_invalid_in_block(child, out);
        }
    }
    if let Some(spans) = block.own_spans() {
        for span in spans {
            collect_invalid_in_span(span, out);
        }
    }
    if let Block::DefinitionList { items, .. } = block {
        for item in items {
            for span in &item.term {
                collect_invalid_in_span(span, out);
            }
        }
    }
    if let Block::QuotedBlock { attribution, .. } = block {
        for span in attribution {
            collect_invalid_in_span(span, out);
        }
    }
    if let Block::Table { head, body, .. } = block {
        for row in head.iter().chain(body.iter()) {
            for cell in &row.cells {
                for cell_block in &cell.content {
                    collect_invalid_in_block(cell_block, out);
                }
            }
        }
    }
}

fn collect_invalid_in_span<'a>(span: &'a Span, out: &mut Vec<&'a Invalid>) {
    if let Span::Invalid(inv) = span {
        out.push(inv);
    }
    if let Some(children) = span.children() {
        for child in children {
            collect_invalid_in_span(child, out);
        }
    }
}

/// Applies the fail-filter over a fully rewritten tree; `Err` carries every
/// matching element, formatted and ready to print.
pub fn check_fail_filter(blocks: &[Block], filters: &Filters) -> Result<(), InvalidDocument> {
    let elements: Vec<InvalidElementInfo> = collect_invalid(blocks)
        .into_iter()
        .filter(|inv| filters.should_fail(inv.severity))
        .map(InvalidElementInfo::from)
        .collect();
    if elements.is_empty() {
        Ok(())
    } else {
        Err(InvalidDocument { elements })
    }
}
