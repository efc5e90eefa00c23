#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use apexls::semantic::manager::{ResolutionContext, RiskLevel};
use apexls::semantic::{ReferenceType, SymbolKind};
use apexls::syntax::build::*;
use apexls::{SharedSymbolManager, SymbolManager};

use crate::helpers::diagnostic_helpers::{type_id, type_named};
use crate::helpers::source_fixtures::*;

fn indexed(files: &[(&str, apexls::syntax::TreeNode)]) -> SymbolManager {
    let mut manager = SymbolManager::default();
    for (uri, tree) in files {
        manager.add_file(&collect(uri, tree)).unwrap();
    }
    manager
}

// =============================================================================
// INDEXING
// =============================================================================

#[test]
fn test_workspace_symbols_are_found_by_name_and_file() {
    let manager = indexed(&[(BASE_URI, base()), (WIDGET_URI, widget()), (SHOP_URI, shop())]);

    assert_eq!(manager.find_files_for_symbol("Widget"), vec![WIDGET_URI]);
    let names = manager
        .find_symbols_in_file(SHOP_URI)
        .iter()
        .filter(|symbol| !symbol.is_scope())
        .map(|symbol| symbol.name.to_string())
        .collect::<Vec<_>>();
    for expected in ["Shop", "item", "submit", "total"] {
        assert!(names.contains(&expected.to_string()), "missing {expected} in {names:?}");
    }
    assert_eq!(manager.indexed_files().len(), 3);
}

#[test]
fn test_names_resolve_case_insensitively() {
    let manager = indexed(&[(WIDGET_URI, widget())]);

    let kinds = manager
        .find_symbol_by_name("WIDGET")
        .iter()
        .filter(|symbol| !symbol.is_scope())
        .map(|symbol| symbol.kind)
        .collect::<Vec<_>>();
    assert_eq!(kinds, vec![SymbolKind::Class]);
}

// =============================================================================
// CROSS-FILE EDGES
// =============================================================================

#[test]
fn test_inheritance_edge_is_independent_of_indexing_order() {
    for base_first in [true, false] {
        let manager = if base_first {
            indexed(&[(BASE_URI, base()), (SHOP_URI, shop())])
        } else {
            indexed(&[(SHOP_URI, shop()), (BASE_URI, base())])
        };

        let edges = manager.find_references_to(
            &type_id(&manager, "Base"),
            Some(ReferenceType::Inheritance),
        );
        assert_eq!(edges.len(), 1, "base_first = {base_first}");
        assert_eq!(edges[0].source, type_id(&manager, "Shop"));
    }
}

#[test]
fn test_type_usage_links_to_declaring_file() {
    let manager = indexed(&[(SHOP_URI, shop()), (WIDGET_URI, widget())]);

    let usages = manager
        .find_references_to(&type_id(&manager, "Widget"), None)
        .into_iter()
        .filter(|edge| !edge.reference_type.is_structural())
        .collect::<Vec<_>>();
    assert!(!usages.is_empty());
    assert!(
        usages
            .iter()
            .all(|edge| edge.file.as_deref() == Some(SHOP_URI))
    );
}

#[test]
fn test_removing_a_file_drops_its_edges() {
    let mut manager = indexed(&[(BASE_URI, base()), (SHOP_URI, shop())]);
    let base_id = type_id(&manager, "Base");

    assert!(manager.remove_file(SHOP_URI) > 0);

    assert!(
        manager
            .find_references_to(&base_id, Some(ReferenceType::Inheritance))
            .is_empty()
    );
    assert!(manager.find_symbol_by_name("Shop").is_empty());
}

#[test]
fn test_reindexing_a_file_replaces_its_symbols() {
    let mut manager = indexed(&[(WIDGET_URI, widget())]);
    let renamed = compilation_unit(vec![class("Gadget", 0).modifiers(&["public"]).ends(1)]);

    manager.add_file(&collect(WIDGET_URI, &renamed)).unwrap();

    assert!(manager.find_symbol_by_name("Widget").is_empty());
    assert_eq!(type_named(&manager, "Gadget").file_uri.as_str(), WIDGET_URI);
}

// =============================================================================
// ANALYSIS
// =============================================================================

#[test]
fn test_resolution_prefers_the_requesting_file() {
    let helper = |uri: &str| {
        let tree = compilation_unit(vec![class("Helper", 0).modifiers(&["public"]).ends(1)]);
        (uri.to_string(), tree)
    };
    let (first_uri, first) = helper("file:///a/Helper.cls");
    let (second_uri, second) = helper("file:///b/Helper.cls");
    let manager = indexed(&[(first_uri.as_str(), first), (second_uri.as_str(), second)]);

    let resolution = manager
        .resolve_symbol("Helper", &ResolutionContext::in_file(second_uri.as_str()))
        .unwrap();

    assert_eq!(resolution.symbol.file_uri.as_str(), second_uri);
    assert_eq!(resolution.candidates.len(), 2);
    assert!(resolution.candidates[0].confidence > resolution.candidates[1].confidence);
}

#[test]
fn test_impact_of_a_widely_extended_base() {
    let mut manager = indexed(&[(BASE_URI, base())]);
    for n in 0..6 {
        let (uri, tree) = subclass(&format!("Special{n}"), "Base");
        manager.add_file(&collect(&uri, &tree)).unwrap();
    }

    let impact = manager.analyze_impact(&type_id(&manager, "Base")).unwrap();
    assert_eq!(impact.direct_impact.len(), 6);
    assert_eq!(impact.risk, RiskLevel::Medium);
}

#[test]
fn test_inheritance_cycle_across_files() {
    let (left_uri, left) = subclass("Left", "Right");
    let (right_uri, right) = subclass("Right", "Left");
    let manager = indexed(&[(left_uri.as_str(), left), (right_uri.as_str(), right)]);

    let cycles = manager.detect_circular_dependencies();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].len(), 2);
    assert!(cycles[0].contains(&type_id(&manager, "Left")));
}

#[tokio::test]
async fn test_bulk_indexing_reports_per_file() {
    let shared = SharedSymbolManager::default();
    let tables = vec![
        collect(BASE_URI, &base()),
        collect(WIDGET_URI, &widget()),
        collect(SHOP_URI, &shop()),
    ];

    let results = shared.add_files_chunked(&tables, 2).await;

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(Result::is_ok));
    assert!(shared.find_type("Shop").is_some());
    assert_eq!(
        shared.lookup("Shop.submit").map(|symbol| symbol.kind),
        Some(SymbolKind::Method)
    );
}
