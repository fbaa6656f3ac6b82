//! Formatter for CA65 sources.
//!
//! Works line by line, guided by the tree: labels and symbol definitions
//! go to column 0, instructions are indented, trailing comments are
//! aligned. Everything between those anchors is kept as written, so the
//! token stream never changes. Lines with syntax errors are left alone.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tree_sitter::{Node, Tree};

use crate::parser::descendants;

/// How the formatter rewrites opcode mnemonics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MnemonicCase {
    /// Keep mnemonics as written.
    #[default]
    Preserve,
    /// `lda`
    Lower,
    /// `LDA`
    Upper,
}

/// Configuration for the formatter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Spaces before an instruction (default: 8).
    pub indent: usize,
    /// Column trailing comments start at (default: 40, 0 disables
    /// alignment).
    pub comment_column: usize,
    /// Mnemonic case (default: preserve).
    pub mnemonic_case: MnemonicCase,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent: 8,
            comment_column: 40,
            mnemonic_case: MnemonicCase::Preserve,
        }
    }
}

/// Format a parsed source file to a string.
///
/// `tree` must be the parse of `source`.
#[must_use]
pub fn format(tree: &Tree, source: &str, config: &FormatConfig) -> String {
    let mut formatter = Formatter::new(tree, source, config);
    formatter.format_source();
    formatter.output
}

/// The internal formatter state.
struct Formatter<'a, 't> {
    config: &'a FormatConfig,
    source: &'t str,
    /// Row -> the `source_line` starting on it.
    lines: HashMap<usize, Node<'t>>,
    /// Row -> byte offset of its comment.
    comments: HashMap<usize, usize>,
    error_rows: HashSet<usize>,
    output: String,
}

impl<'a, 't> Formatter<'a, 't> {
    fn new(tree: &'t Tree, source: &'t str, config: &'a FormatConfig) -> Self {
        let root = tree.root_node();
        let mut lines = HashMap::new();
        let mut comments = HashMap::new();
        for node in descendants(root) {
            let row = node.start_position().row;
            if node.kind() == "comment" {
                comments.insert(row, node.start_byte());
            } else if node.kind() == "source_line" {
                lines.entry(row).or_insert(node);
            }
        }
        Self {
            config,
            source,
            lines,
            comments,
            error_rows: error_rows(root),
            output: String::with_capacity(source.len()),
        }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn format_source(&mut self) {
        let source = self.source;
        let mut offset = 0;
        for (row, raw) in source.split_inclusive('\n').enumerate() {
            let start = offset;
            offset += raw.len();
            if self.error_rows.contains(&row) {
                self.write(raw);
                continue;
            }
            let (body, ending) = split_line_ending(raw);
            let line = self.format_line(row, start, body);
            self.write(&line);
            self.write(ending);
        }
    }

    fn format_line(&self, row: usize, start: usize, body: &'t str) -> String {
        let (code_part, comment) = match self.comments.get(&row) {
            Some(&at) if at >= start && at - start <= body.len() => {
                let split = at - start;
                (&body[..split], Some(body[split..].trim_end_matches(is_blank)))
            }
            _ => (body, None),
        };
        let code = code_part.trim_matches(is_blank);
        let Some(comment) = comment else {
            return self.format_code(row, start, code_part, code);
        };
        if code.is_empty() {
            // Comment-only lines keep their own indentation.
            return format!("{code_part}{comment}");
        }
        let mut line = self.format_code(row, start, code_part, code);
        let width = line.chars().count();
        let column = self.config.comment_column;
        if column > 0 && width < column {
            pad_to(&mut line, column);
        } else {
            line.push(' ');
        }
        line.push_str(comment);
        line
    }

    /// Lay out the code of one row. `code` is `code_part` without its
    /// surrounding blanks.
    fn format_code(&self, row: usize, start: usize, code_part: &str, code: &str) -> String {
        if code.is_empty() {
            return String::new();
        }
        let code_start = start + (code_part.len() - code_part.trim_start_matches(is_blank).len());
        let line = self
            .lines
            .get(&row)
            .copied()
            .filter(|line| line.start_byte() == code_start);
        let Some(line) = line else {
            // Inside a block body: enum members, struct fields, terminators.
            return self.indented(code);
        };
        if let Some(label) = line.child_by_field_name("label") {
            let split = label.end_byte().saturating_sub(code_start).min(code.len());
            let rest = code[split..].trim_start_matches(is_blank);
            let mut out = code[..split].to_string();
            if rest.is_empty() {
                return out;
            }
            if out.len() < self.config.indent {
                pad_to(&mut out, self.config.indent);
            } else {
                out.push(' ');
            }
            let rest_start = code_start + (code.len() - rest.len());
            out.push_str(&self.with_mnemonic_case(line, rest, rest_start));
            return out;
        }
        if line.child_by_field_name("symbol").is_some() {
            return code.to_string();
        }
        self.indented(&self.with_mnemonic_case(line, code, code_start))
    }

    fn indented(&self, code: &str) -> String {
        let mut out = " ".repeat(self.config.indent);
        out.push_str(code);
        out
    }

    /// `text` starts at byte `base` of the source. Rewrites the opcode of
    /// `line`'s instruction if it lies inside `text`.
    fn with_mnemonic_case(&self, line: Node<'_>, text: &str, base: usize) -> String {
        let opcode = line
            .child_by_field_name("inst")
            .filter(|inst| inst.kind() == "actual_inst")
            .and_then(|inst| inst.child_by_field_name("opcode"));
        let Some(opcode) = opcode else {
            return text.to_string();
        };
        let range = opcode.byte_range();
        if range.start < base || range.end > base + text.len() {
            return text.to_string();
        }
        let (from, to) = (range.start - base, range.end - base);
        let mnemonic = &text[from..to];
        let mnemonic = match self.config.mnemonic_case {
            MnemonicCase::Preserve => return text.to_string(),
            MnemonicCase::Lower => mnemonic.to_ascii_lowercase(),
            MnemonicCase::Upper => mnemonic.to_ascii_uppercase(),
        };
        format!("{}{mnemonic}{}", &text[..from], &text[to..])
    }
}

/// Rows touched by a top-level node containing an error.
///
/// Recovery may pull tokens from following rows into a broken line, so the
/// whole node is left alone, not just the row of the `ERROR` itself.
fn error_rows(root: Node<'_>) -> HashSet<usize> {
    let mut rows = HashSet::new();
    let mut cursor = root.walk();
    let broken: Vec<Node<'_>> = if root.is_error() {
        vec![root]
    } else {
        root.children(&mut cursor).filter(Node::has_error).collect()
    };
    for node in broken {
        let start = node.start_position();
        let end = node.end_position();
        // A trailing newline ends the node at column 0 of the next row.
        let last = if end.column == 0 && end.row > start.row {
            end.row - 1
        } else {
            end.row
        };
        rows.extend(start.row..=last);
    }
    rows
}

/// Blanks as the lexer sees them.
const fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c' | '\r')
}

fn split_line_ending(raw: &str) -> (&str, &str) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, "\n")
    } else {
        (raw, "")
    }
}

fn pad_to(line: &mut String, column: usize) {
    let width = line.chars().count();
    if width < column {
        line.extend(std::iter::repeat_n(' ', column - width));
    }
}
