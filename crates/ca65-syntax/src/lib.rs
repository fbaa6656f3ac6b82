//! CA65 syntax parsing on top of tree-sitter.
//!
//! This crate provides:
//! - A [`Parser`] that loads the `tree-sitter-ca65` grammar and turns CA65
//!   assembly source into tree-sitter trees
//! - Syntax diagnostics collected from `ERROR` and `MISSING` nodes
//! - A symbol outline and a formatter built on the tree
//!
//! # Example
//!
//! ```
//! use ca65_syntax::Parser;
//!
//! let source = "reset: lda #$00 ; clear\n";
//! let tree = Parser::parse_tree(source).unwrap();
//! let line = tree.root_node().child(0).unwrap();
//! assert_eq!(line.kind(), "source_line");
//! let label = line.child_by_field_name("label").unwrap();
//! assert_eq!(label.utf8_text(source.as_bytes()).unwrap(), "reset:");
//! assert!(!tree.root_node().has_error());
//! ```

pub mod diagnostics;
pub mod format;
pub mod outline;
pub mod parser;
pub mod span;

#[cfg(test)]
mod proptest_support;

pub use diagnostics::{Diagnostic, diagnostics};
pub use format::{FormatConfig, MnemonicCase, format};
pub use outline::{Definition, DefinitionKind, outline};
pub use parser::{ParseError, ParseResult, Parser};
pub use span::Span;
pub use tree_sitter::{LANGUAGE_VERSION, MIN_COMPATIBLE_LANGUAGE_VERSION, Node, Tree};
