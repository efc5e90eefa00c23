#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::workspace;
use crate::base::{Position, Range};
use crate::ide::{FoldingRange, document_symbols, folding_ranges, goto_definition, hover};
use crate::semantic::symbol_table::{ScopeKind, SymbolKind};
use crate::syntax::TreeNode;
use crate::syntax::build::*;

fn widget() -> TreeNode {
    compilation_unit(vec![class("Widget", 0).modifiers(&["public"]).ends(1)])
}

fn shop() -> TreeNode {
    compilation_unit(vec![class("Shop", 0).modifiers(&["public"]).ends(6).body(vec![
        field("Widget", "primary", 1),
        method("void", "open", 2).ends(5).body(vec![
            local_var("Integer", "count", 3),
            assign(ident("count", 4, 4), "=", ident("limit", 4, 12)),
        ]),
    ])])
}

// ============================================================================
// HOVER
// ============================================================================

#[test]
fn test_hover_on_declaration() {
    let (manager, tables) = workspace(&[("file:///Shop.cls", shop())]);

    let result = hover(&tables[0], &manager, Position::new(0, 8)).unwrap();
    assert!(result.contents.starts_with("```apex\npublic class Shop\n```"));
    assert_eq!(result.range, Range::from_coords(0, 6, 0, 10));
}

#[test]
fn test_hover_on_type_usage_shows_target() {
    let (manager, tables) = workspace(&[
        ("file:///Widget.cls", widget()),
        ("file:///Shop.cls", shop()),
    ]);

    let result = hover(&tables[1], &manager, Position::new(1, 2)).unwrap();
    assert!(result.contents.contains("public class Widget"));
    assert!(result.contents.contains("*Declared in* `file:///Widget.cls`"));
    assert_eq!(result.range.start, Position::new(1, 0));
}

#[test]
fn test_hover_on_local_usage() {
    let (manager, tables) = workspace(&[("file:///Shop.cls", shop())]);

    let result = hover(&tables[0], &manager, Position::new(4, 5)).unwrap();
    assert!(result.contents.contains("Integer count"));
    assert!(!result.contents.contains("Declared in"));
}

#[test]
fn test_hover_on_nothing() {
    let (manager, tables) = workspace(&[("file:///Shop.cls", shop())]);

    assert!(hover(&tables[0], &manager, Position::new(5, 0)).is_none());
    // `limit` is not declared anywhere
    assert!(hover(&tables[0], &manager, Position::new(4, 13)).is_none());
}

// ============================================================================
// GO TO DEFINITION
// ============================================================================

#[test]
fn test_goto_type_in_other_file() {
    let (manager, tables) = workspace(&[
        ("file:///Widget.cls", widget()),
        ("file:///Shop.cls", shop()),
    ]);

    let result = goto_definition(&tables[1], &manager, Position::new(1, 3));
    assert_eq!(result.targets.len(), 1);
    let target = &result.targets[0];
    assert_eq!(target.uri.as_str(), "file:///Widget.cls");
    assert_eq!(target.kind, SymbolKind::Class);
    assert_eq!(target.range.start, Position::new(0, 6));
}

#[test]
fn test_goto_local_variable() {
    let (manager, tables) = workspace(&[("file:///Shop.cls", shop())]);

    let result = goto_definition(&tables[0], &manager, Position::new(4, 6));
    assert_eq!(result.targets.len(), 1);
    assert_eq!(result.targets[0].kind, SymbolKind::Variable);
    assert_eq!(result.targets[0].range.start.line, 3);
    assert_eq!(result.targets[0].confidence, 1.0);
}

#[test]
fn test_goto_ambiguous_type_prefers_same_file() {
    let local = compilation_unit(vec![class("Shop", 0).ends(4).body(vec![
        class("Helper", 1).ends(2),
        field("Helper", "helper", 3),
    ])]);
    let other = compilation_unit(vec![class("Helper", 0).ends(1)]);
    let (manager, tables) = workspace(&[
        ("file:///Helper.cls", other),
        ("file:///Shop.cls", local),
    ]);

    let result = goto_definition(&tables[1], &manager, Position::new(3, 2));
    assert_eq!(result.targets.len(), 2);
    assert_eq!(result.targets[0].uri.as_str(), "file:///Shop.cls");
    assert!(result.targets[0].confidence >= result.targets[1].confidence);
}

#[test]
fn test_goto_on_declaration_returns_itself() {
    let (manager, tables) = workspace(&[("file:///Shop.cls", shop())]);

    let result = goto_definition(&tables[0], &manager, Position::new(2, 6));
    assert_eq!(result.targets.len(), 1);
    assert_eq!(result.targets[0].name.as_str(), "open");
}

// ============================================================================
// OUTLINE AND FOLDING
// ============================================================================

#[test]
fn test_document_symbols_are_hierarchical() {
    let tree = compilation_unit(vec![class("Order", 0).ends(8).body(vec![
        field("Decimal", "total", 1),
        class("Line", 2).ends(4).body(vec![field("Integer", "quantity", 3)]),
        method("void", "submit", 5).ends(7).body(vec![local_var("Integer", "tries", 6)]),
    ])]);
    let (_, tables) = workspace(&[("file:///Order.cls", tree)]);

    let outline = document_symbols(&tables[0]);
    assert_eq!(outline.len(), 1);
    let order = &outline[0];
    let names: Vec<&str> = order.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["total", "Line", "submit"]);
    assert_eq!(order.children[1].children[0].name.as_str(), "quantity");
    assert!(order.children[2].children.is_empty());
    assert_eq!(order.children[2].detail, "void submit()");
}

#[test]
fn test_folding_ranges_from_multiline_scopes() {
    let tree = compilation_unit(vec![class("Flow", 0).ends(8).body(vec![
        method("void", "run", 1).ends(6).body(vec![
            if_stmt(2, 4, vec![call("step", 3, 4, vec![])]),
            while_stmt(5, 5, vec![]),
        ]),
        method("void", "noop", 7),
    ])]);
    let (_, tables) = workspace(&[("file:///Flow.cls", tree)]);

    assert_eq!(
        folding_ranges(&tables[0]),
        vec![
            FoldingRange { start_line: 0, end_line: 8, scope: ScopeKind::Class },
            FoldingRange { start_line: 1, end_line: 6, scope: ScopeKind::Method },
            FoldingRange { start_line: 2, end_line: 4, scope: ScopeKind::If },
        ]
    );
}
