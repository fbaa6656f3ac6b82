//! Symbol outline: the names a source file defines, imports and exports.

use serde::Serialize;

use tree_sitter::{Node, Tree};

use crate::parser::{descendants, text};
use crate::span::Span;

/// What kind of name a [`Definition`] introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    /// `name:`
    Label,
    /// `@name:`
    LocalLabel,
    /// `name = expr`
    Equate,
    /// `name := expr`
    LabelAssign,
    /// `name .set expr`
    Set,
    /// `.macro name`
    Macro,
    /// `.define name`
    Define,
    /// `.proc name`
    Proc,
    /// `.scope name`
    Scope,
    /// `.struct name`
    Struct,
    /// `.union name`
    Union,
    /// `.enum name`
    Enum,
    /// `.import` / `.importzp`
    Import,
    /// `.export` / `.exportzp`
    Export,
}

impl DefinitionKind {
    /// Lower-case name used in listings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::LocalLabel => "local_label",
            Self::Equate => "equate",
            Self::LabelAssign => "label_assign",
            Self::Set => "set",
            Self::Macro => "macro",
            Self::Define => "define",
            Self::Proc => "proc",
            Self::Scope => "scope",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Enum => "enum",
            Self::Import => "import",
            Self::Export => "export",
        }
    }

    fn for_node(kind: &str) -> Option<Self> {
        Some(match kind {
            "label" => Self::Label,
            "local_label" => Self::LocalLabel,
            "symbol_eq" => Self::Equate,
            "symbol_assign" => Self::LabelAssign,
            "symbol_set" => Self::Set,
            "pseudo_inst_macro" => Self::Macro,
            "pseudo_inst_define" => Self::Define,
            "pseudo_inst_proc_symbol" => Self::Proc,
            "pseudo_inst_scope_symbol" => Self::Scope,
            "pseudo_inst_struct" => Self::Struct,
            "pseudo_inst_union" => Self::Union,
            "pseudo_inst_enum" => Self::Enum,
            "pseudo_inst_import_symbol" | "pseudo_inst_importzp_symbol" => Self::Import,
            "pseudo_inst_export_symbol" | "pseudo_inst_exportzp_symbol" => Self::Export,
            _ => return None,
        })
    }
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named definition found in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    /// The defined name as written, e.g. `@loop` or `reset`.
    pub name: String,
    /// What kind of definition this is.
    pub kind: DefinitionKind,
    /// Location of the name.
    pub span: Span,
}

/// List every definition in `tree`, in source order.
///
/// Anonymous `.struct`, `.union` and `.enum` blocks are skipped.
#[must_use]
pub fn outline(tree: &Tree, source: &str) -> Vec<Definition> {
    descendants(tree.root_node())
        .filter_map(|node| {
            let kind = DefinitionKind::for_node(node.kind())?;
            let name = name_node(node)?;
            Some(Definition {
                name: text(name, source).to_string(),
                kind,
                span: Span::from_node(&name),
            })
        })
        .collect()
}

fn name_node(node: Node<'_>) -> Option<Node<'_>> {
    let name = match node.kind() {
        "label" | "local_label" => node.named_child(0),
        _ => node.child_by_field_name("name"),
    }?;
    // Recovery can leave a zero-width MISSING name behind.
    (!name.is_missing()).then_some(name)
}
