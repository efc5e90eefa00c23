#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use apexls::Position;
use apexls::semantic::SymbolKind;
use apexls::semantic::symbol_table::ScopeKind;

use super::Workspace;
use crate::helpers::source_fixtures::*;

async fn shop_workspace() -> Workspace {
    let workspace = Workspace::new();
    workspace.open(BASE_URI, base()).await;
    workspace.open(WIDGET_URI, widget()).await;
    workspace.open(SHOP_URI, shop()).await;
    workspace
}

// =============================================================================
// HOVER
// =============================================================================

#[tokio::test]
async fn test_hover_on_field_type_shows_declaring_document() {
    let workspace = shop_workspace().await;
    let analysis = workspace.host.analysis();

    let hover = analysis.hover(SHOP_URI, Position::new(1, 2)).unwrap();

    assert!(hover.contents.starts_with("```apex\npublic class Widget\n```"));
    assert!(hover.contents.contains(&format!("*Declared in* `{WIDGET_URI}`")));
}

#[tokio::test]
async fn test_hover_on_unknown_document() {
    let workspace = shop_workspace().await;
    let analysis = workspace.host.analysis();

    assert!(analysis.hover("file:///classes/Nope.cls", Position::new(0, 0)).is_none());
}

// =============================================================================
// GOTO DEFINITION
// =============================================================================

#[tokio::test]
async fn test_goto_field_type_in_other_document() {
    let workspace = shop_workspace().await;
    let analysis = workspace.host.analysis();

    let result = analysis.goto_definition(SHOP_URI, Position::new(1, 3));
    assert_eq!(result.targets.len(), 1);
    assert_eq!(result.targets[0].uri.as_str(), WIDGET_URI);
    assert_eq!(result.targets[0].kind, SymbolKind::Class);
}

#[tokio::test]
async fn test_goto_local_from_assignment() {
    let workspace = shop_workspace().await;
    let analysis = workspace.host.analysis();

    let result = analysis.goto_definition(SHOP_URI, Position::new(4, 10));

    assert_eq!(result.targets.len(), 1);
    let target = &result.targets[0];
    assert_eq!(target.name.as_str(), "total");
    assert_eq!(target.kind, SymbolKind::Variable);
    assert_eq!(target.range.start.line, 3);
}

#[tokio::test]
async fn test_goto_on_whitespace_is_empty() {
    let workspace = shop_workspace().await;
    let analysis = workspace.host.analysis();

    assert!(analysis.goto_definition(SHOP_URI, Position::new(6, 0)).is_empty());
}

// =============================================================================
// OUTLINE AND FOLDING
// =============================================================================

#[tokio::test]
async fn test_outline_of_shop() {
    let workspace = shop_workspace().await;
    let analysis = workspace.host.analysis();

    let outline = analysis.document_symbols(SHOP_URI);

    assert_eq!(outline.len(), 1);
    assert_eq!(outline[0].name.as_str(), "Shop");
    assert_eq!(outline[0].kind, SymbolKind::Class);
    let children = outline[0]
        .children
        .iter()
        .map(|child| (child.name.as_str(), child.kind))
        .collect::<Vec<_>>();
    assert_eq!(
        children,
        vec![("item", SymbolKind::Field), ("submit", SymbolKind::Method)]
    );
}

#[tokio::test]
async fn test_folding_ranges_of_shop() {
    let workspace = shop_workspace().await;
    let analysis = workspace.host.analysis();

    let folds = analysis
        .folding_ranges(SHOP_URI)
        .into_iter()
        .map(|fold| (fold.start_line, fold.end_line, fold.scope))
        .collect::<Vec<_>>();

    assert_eq!(folds, vec![(0, 6, ScopeKind::Class), (2, 5, ScopeKind::Method)]);
}
