//! Parsing CA65 source into tree-sitter trees.
//!
//! Syntax errors never fail a parse: tree-sitter recovers and records them
//! as `ERROR` and `MISSING` nodes, which [`crate::diagnostics`] reports. The
//! only errors surfaced as `Result`s are loading the grammar and a parse
//! the runtime gave up on.

use thiserror::Error;
use tracing::debug;
use tree_sitter::{Language, LanguageError, Node, Tree};

/// Errors that can occur during parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The runtime rejected the grammar, e.g. for an ABI mismatch.
    #[error("failed to load the ca65 grammar: {0}")]
    Language(#[from] LanguageError),
    /// Tree-sitter returned no tree.
    #[error("parsing failed")]
    TreeSitterError,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A reusable parser with the ca65 grammar loaded.
pub struct Parser {
    inner: tree_sitter::Parser,
}

impl Parser {
    /// Create a parser for the bundled ca65 grammar.
    pub fn new() -> ParseResult<Self> {
        Self::with_language(&tree_sitter_ca65::language())
    }

    /// Create a parser for `language`.
    pub fn with_language(language: &Language) -> ParseResult<Self> {
        let mut inner = tree_sitter::Parser::new();
        inner.set_language(language)?;
        Ok(Self { inner })
    }

    /// Parse `source` into a tree.
    pub fn parse(&mut self, source: &str) -> ParseResult<Tree> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or(ParseError::TreeSitterError)?;
        debug!(
            bytes = source.len(),
            lines = tree.root_node().named_child_count(),
            errors = tree.root_node().has_error(),
            "parsed source"
        );
        Ok(tree)
    }

    /// Parse `source` with a fresh parser.
    pub fn parse_tree(source: &str) -> ParseResult<Tree> {
        Self::new()?.parse(source)
    }
}

/// The source text a node covers.
pub(crate) fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// `node` and everything below it, in document order.
pub(crate) fn descendants<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    let mut cursor = node.walk();
    let mut done = false;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let current = cursor.node();
        if cursor.goto_first_child() {
            return Some(current);
        }
        loop {
            if cursor.goto_next_sibling() {
                return Some(current);
            }
            if !cursor.goto_parent() {
                done = true;
                return Some(current);
            }
        }
    })
}
