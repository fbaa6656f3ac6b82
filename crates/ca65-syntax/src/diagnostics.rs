//! Syntax diagnostics collected from `ERROR` and `MISSING` nodes.

use serde::Serialize;
use tree_sitter::{Node, Tree};

use crate::parser::text;
use crate::span::Span;

/// Longest excerpt of skipped text quoted in a message.
const EXCERPT_LEN: usize = 24;

/// A syntax error recorded in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Human-readable description, e.g. `unexpected "#)"` or `missing ")"`.
    pub message: String,
    /// The source covered by the error. Zero-width for missing tokens.
    pub span: Span,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.span.start_line + 1,
            self.span.start_col + 1,
            self.message
        )
    }
}

/// Every syntax error in `tree`, in source order.
#[must_use]
pub fn diagnostics(tree: &Tree, source: &str) -> Vec<Diagnostic> {
    let mut found = Vec::new();
    collect(tree.root_node(), source, &mut found);
    found
}

fn collect(node: Node<'_>, source: &str, found: &mut Vec<Diagnostic>) {
    if node.is_error() {
        found.push(Diagnostic {
            message: unexpected(text(node, source)),
            span: Span::from_node(&node),
        });
        return;
    }
    if node.is_missing() {
        found.push(Diagnostic {
            message: format!("missing {}", describe_kind(node)),
            span: Span::from_node(&node),
        });
        return;
    }
    if !node.has_error() {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, source, found);
    }
}

fn unexpected(skipped: &str) -> String {
    let first_line = skipped.lines().map(str::trim).find(|l| !l.is_empty());
    let Some(line) = first_line else {
        return "syntax error".to_string();
    };
    match line.char_indices().nth(EXCERPT_LEN) {
        Some((cut, _)) => format!("unexpected \"{}...\"", &line[..cut]),
        None => format!("unexpected \"{line}\""),
    }
}

/// `")"` for tokens, `.endenum` for directive keywords, `number` for the rest.
fn describe_kind(node: Node<'_>) -> String {
    let kind = node.kind();
    if !node.is_named() {
        format!("\"{kind}\"")
    } else if let Some(keyword) = kind.strip_prefix("dot_keyword_") {
        format!("\".{keyword}\"")
    } else {
        kind.trim_start_matches('_').replace('_', " ")
    }
}
