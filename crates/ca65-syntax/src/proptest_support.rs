//! Property-based testing support with arbitrary generators.
//!
//! Strategies here build CA65 source text line by line, so the parser and
//! formatter invariants can be checked on realistic input as well as on
//! arbitrary strings.

use proptest::prelude::*;

/// A symbol name that can never collide with a mnemonic, register or
/// control command.
fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}".prop_map(|s| format!("v_{s}"))
}

/// Decimal, hex or binary literal.
fn number_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0..65536u32).prop_map(|n| n.to_string()),
        (0..256u32).prop_map(|n| format!("${n:02x}")),
        (0..256u32).prop_map(|n| format!("%{n:08b}")),
    ]
}

/// A small expression: a literal, a name, or one binary operation.
fn expression_strategy() -> impl Strategy<Value = String> {
    let atom = prop_oneof![number_strategy(), identifier_strategy()];
    let op = prop::sample::select(vec!["+", "-", "*", "&", "|", "<<"]);
    prop_oneof![
        atom.clone(),
        (atom.clone(), op, atom.clone()).prop_map(|(l, op, r)| format!("{l} {op} {r}")),
        atom.prop_map(|a| format!("<{a}")),
    ]
}

/// An operand in one of the addressing-mode shapes.
fn operand_strategy() -> impl Strategy<Value = String> {
    let addr = prop_oneof![number_strategy(), identifier_strategy()];
    prop_oneof![
        Just(String::new()),
        expression_strategy().prop_map(|e| format!(" #{e}")),
        addr.clone().prop_map(|a| format!(" {a}")),
        addr.clone().prop_map(|a| format!(" {a},x")),
        addr.clone().prop_map(|a| format!(" {a},Y")),
        addr.clone().prop_map(|a| format!(" ({a}),y")),
        addr.prop_map(|a| format!(" ({a},x)")),
    ]
}

fn comment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-z ]{0,12}".prop_map(|c| format!(" ;{c}"))]
}

fn indent_strategy() -> impl Strategy<Value = String> {
    "[ \t]{0,4}"
}

/// Generate an instruction line, optionally labelled.
pub fn arb_instruction_line() -> impl Strategy<Value = String> {
    let label = prop_oneof![
        Just(String::new()),
        identifier_strategy().prop_map(|l| format!("{l}: ")),
        identifier_strategy().prop_map(|l| format!("@{l}: ")),
    ];
    let opcode = prop::sample::select(vec!["lda", "STA", "ldx", "jmp", "inc", "cmp", "Adc"]);
    (indent_strategy(), label, opcode, operand_strategy(), comment_strategy()).prop_map(
        |(indent, label, opcode, operand, comment)| {
            format!("{indent}{label}{opcode}{operand}{comment}")
        },
    )
}

/// Generate a symbol definition line.
pub fn arb_symbol_line() -> impl Strategy<Value = String> {
    let op = prop::sample::select(vec!["=", ":=", ".set"]);
    (indent_strategy(), identifier_strategy(), op, expression_strategy(), comment_strategy())
        .prop_map(|(indent, name, op, expr, comment)| format!("{indent}{name} {op} {expr}{comment}"))
}

/// Generate a control command line.
pub fn arb_directive_line() -> impl Strategy<Value = String> {
    let values = prop::collection::vec(expression_strategy(), 1..4);
    prop_oneof![
        values.prop_map(|v| format!(".byte {}", v.join(", "))),
        expression_strategy().prop_map(|e| format!(".word {e}")),
        Just(".segment \"CODE\"".to_string()),
        number_strategy().prop_map(|n| format!(".res {n}")),
        identifier_strategy().prop_map(|n| format!(".proc {n}")),
        Just(".endproc".to_string()),
    ]
    .prop_flat_map(|line| (indent_strategy(), Just(line), comment_strategy()))
    .prop_map(|(indent, line, comment)| format!("{indent}{line}{comment}"))
}

/// Generate a blank or comment-only line.
pub fn arb_trivia_line() -> impl Strategy<Value = String> {
    (indent_strategy(), comment_strategy()).prop_map(|(indent, comment)| {
        format!("{indent}{}", comment.trim_start())
    })
}

/// Generate a well-formed source file.
pub fn arb_source() -> impl Strategy<Value = String> {
    let line = prop_oneof![
        arb_instruction_line(),
        arb_symbol_line(),
        arb_directive_line(),
        arb_trivia_line(),
    ];
    prop::collection::vec(line, 0..12).prop_map(|lines| {
        let mut out = lines.join("\n");
        out.push('\n');
        out
    })
}

/// Generate a source file that mixes well-formed lines with broken ones.
pub fn arb_noisy_source() -> impl Strategy<Value = String> {
    let broken = prop::sample::select(vec![
        "  lda (",
        ".bogus 1",
        "v_x = ",
        "@dangling",
        "  sta $20,z",
        ".enum",
    ])
    .prop_map(str::to_string);
    let line = prop_oneof![3 => arb_instruction_line(), 1 => arb_symbol_line(), 1 => broken];
    prop::collection::vec(line, 0..10).prop_map(|lines| lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FormatConfig, MnemonicCase, format};
    use crate::parser::descendants;
    use crate::{Node, Parser, Tree};

    fn parse(source: &str) -> Tree {
        Parser::parse_tree(source).unwrap()
    }

    fn check_nesting(node: Node<'_>) -> Result<(), TestCaseError> {
        let mut last_end = node.start_byte();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            prop_assert!(child.start_byte() >= last_end, "{child:?} overlaps its sibling");
            prop_assert!(child.end_byte() <= node.end_byte(), "{child:?} escapes {node:?}");
            last_end = child.end_byte();
            check_nesting(child)?;
        }
        Ok(())
    }

    proptest! {
        /// Parsing never panics and every non-blank byte lies inside the root.
        #[test]
        fn root_covers_any_input(source in "[ -~\t\n]{0,80}") {
            let tree = parse(&source);
            let root = tree.root_node();
            prop_assert!(root.kind() == "source" || root.is_error(), "root is {}", root.kind());
            let trimmed = source.trim_start_matches([' ', '\t', '\n']);
            let first = source.len() - trimmed.len();
            let last = source.trim_end_matches([' ', '\t', '\n']).len().max(first);
            prop_assert!(root.start_byte() <= first);
            prop_assert!(root.end_byte() >= last);
            prop_assert!(root.end_byte() <= source.len());
        }

        /// Arbitrary Unicode never panics the parser.
        #[test]
        fn parse_any_string(source in any::<String>()) {
            let tree = parse(&source);
            prop_assert!(tree.root_node().end_byte() <= source.len());
        }

        /// Children are ordered and lie inside their parent.
        #[test]
        fn children_nest(source in "[ -~\t\n]{0,80}") {
            let tree = parse(&source);
            check_nesting(tree.root_node())?;
        }

        /// Every node kind in a tree is known to the grammar.
        #[test]
        fn node_kinds_are_known(source in arb_noisy_source()) {
            let tree = parse(&source);
            let language = tree.language();
            for node in descendants(tree.root_node()).filter(|n| !n.is_missing()) {
                prop_assert_eq!(
                    language.id_for_node_kind(node.kind(), node.is_named()),
                    node.kind_id(),
                    "unknown kind {}", node.kind()
                );
            }
        }

        /// Generated sources parse without errors.
        #[test]
        fn generated_sources_parse_cleanly(source in arb_source()) {
            let tree = parse(&source);
            prop_assert!(!tree.root_node().has_error(), "{}\n{}", source, tree.root_node().to_sexp());
        }

        /// Formatting should be idempotent: format(format(x)) == format(x).
        #[test]
        fn format_idempotent(source in arb_noisy_source(), upper in any::<bool>()) {
            let config = FormatConfig {
                mnemonic_case: if upper { MnemonicCase::Upper } else { MnemonicCase::Preserve },
                ..FormatConfig::default()
            };
            let once = format(&parse(&source), &source, &config);
            let twice = format(&parse(&once), &once, &config);
            prop_assert_eq!(once, twice);
        }

        /// Formatting never changes the structure of the tree.
        #[test]
        fn format_preserves_structure(source in arb_noisy_source()) {
            let before = parse(&source);
            let formatted = format(&before, &source, &FormatConfig::default());
            let after = parse(&formatted);
            prop_assert_eq!(before.root_node().to_sexp(), after.root_node().to_sexp());
        }
    }
}
