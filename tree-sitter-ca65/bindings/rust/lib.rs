//! This crate provides ca65 language support for the [tree-sitter] parsing library.
//!
//! The grammar lives in `grammar.js`; `src/parser.c` and `src/node-types.json`
//! are generated from it with `tree-sitter generate`. C, C++ and Swift hosts
//! reach the same descriptor through `tree_sitter_ca65()`, declared in
//! `bindings/c/tree-sitter-ca65.h`.
//!
//! [tree-sitter]: https://tree-sitter.github.io/

use tree_sitter::Language;

unsafe extern "C" {
    fn tree_sitter_ca65() -> *const ();
}

/// Get the tree-sitter [Language] for this grammar.
pub fn language() -> Language {
    unsafe { Language::from_raw(tree_sitter_ca65() as _) }
}

/// File extensions editors associate with ca65 sources.
pub const FILE_TYPES: &[&str] = &["s", "asm", "inc", "ca65"];

/// The content of the [`node-types.json`] file for this grammar.
///
/// [`node-types.json`]: https://tree-sitter.github.io/tree-sitter/using-parsers#static-node-types
pub const NODE_TYPES: &str = include_str!("../../src/node-types.json");

/// The symbol highlighting queries.
pub const HIGHLIGHTS_QUERY: &str = include_str!("../../queries/highlights.scm");
