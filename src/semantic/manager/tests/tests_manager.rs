#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::{class_file, manager, table, type_id};
use crate::base::{Location, Range};
use crate::semantic::graphs::ReferenceType;
use crate::semantic::manager::{ManagerSettings, SymbolManager};
use crate::semantic::symbol_table::{ScopeKind, Symbol, SymbolKey, SymbolKind, SymbolTable};
use crate::syntax::build::*;

fn name_cache_hits(manager: &SymbolManager) -> u64 {
    manager
        .cache_stats()
        .into_iter()
        .find(|(name, _)| *name == "name")
        .map(|(_, stats)| stats.hits)
        .unwrap()
}

#[test]
fn test_repeated_lookup_is_served_from_cache() {
    let mut manager = manager();
    manager.add_file(&class_file("Base", None)).unwrap();

    let first = manager.find_symbol_by_name("base");
    let second = manager.find_symbol_by_name("BASE");
    assert_eq!(first, second);
    assert_eq!(name_cache_hits(&manager), 1);
}

#[test]
fn test_duplicate_fqn_resolves_to_remaining_file() {
    let mut manager = manager();
    let dup = compilation_unit(vec![class("Dup", 0).ends(2)]);
    manager.add_file(&table("file:///A.cls", &dup)).unwrap();
    manager.add_file(&table("file:///B.cls", &dup)).unwrap();
    assert!(manager.find_symbol_by_fqn("Dup").is_some());

    manager.remove_file("file:///B.cls");

    let found = manager.find_symbol_by_fqn("dup").unwrap();
    assert_eq!(found.file_uri.as_str(), "file:///A.cls");
    assert_eq!(manager.find_symbol_by_name("Dup").len(), 1);
}

#[test]
fn test_adding_a_file_invalidates_cached_misses() {
    let mut manager = manager();
    assert!(manager.find_symbol_by_name("Base").is_empty());
    assert!(manager.find_symbol_by_fqn("Base").is_none());

    manager.add_file(&class_file("Base", None)).unwrap();

    assert!(manager
        .find_symbol_by_name("Base")
        .iter()
        .any(|symbol| symbol.kind == SymbolKind::Class));
    assert!(manager.find_symbol_by_fqn("Base").is_some());
}

#[test]
fn test_removing_a_file_invalidates_file_and_relationship_caches() {
    let mut manager = manager();
    manager.add_file(&class_file("Base", None)).unwrap();
    manager.add_file(&class_file("Child", Some("Base"))).unwrap();
    let base = type_id(&manager, "Base");

    let inherits = Some(ReferenceType::Inheritance);
    assert_eq!(manager.find_references_to(&base, inherits).len(), 1);
    assert!(!manager.find_symbols_in_file("file:///Child.cls").is_empty());

    assert!(manager.remove_file("file:///Child.cls") > 0);
    assert!(manager.find_references_to(&base, inherits).is_empty());
    assert!(manager.find_symbols_in_file("file:///Child.cls").is_empty());
    assert!(manager.file_metadata("file:///Child.cls").is_none());
}

#[test]
fn test_expired_entries_are_recomputed() {
    let settings = ManagerSettings::default().with_cache_ttl(std::time::Duration::ZERO);
    let mut manager = SymbolManager::new(settings);
    manager.add_file(&class_file("Base", None)).unwrap();

    manager.find_symbol_by_name("Base");
    manager.find_symbol_by_name("Base");
    assert_eq!(name_cache_hits(&manager), 0);
}

#[test]
fn test_file_metadata_keeps_scope_hierarchy() {
    let tree = compilation_unit(vec![class("Shop", 0).ends(8).body(vec![
        field("Integer", "count", 1),
        method("void", "run", 2).ends(7).body(vec![
            if_stmt(3, 6, vec![local_var("Integer", "n", 4)]),
        ]),
    ])]);
    let mut manager = manager();
    manager.add_file(&table("file:///Shop.cls", &tree)).unwrap();

    let metadata = manager.file_metadata("file:///Shop.cls").unwrap();
    let branch = metadata
        .scopes
        .iter()
        .find(|scope| scope.scope_kind == ScopeKind::If)
        .unwrap();
    assert_eq!(branch.symbols.len(), 1);
    assert_eq!(branch.parent.as_deref(), Some("run()"));

    let path = metadata.scope_path(&branch.name);
    assert_eq!(path.first().map(|name| name.as_str()), Some("file"));
    assert_eq!(path.len(), 4);
    assert_eq!(metadata.scope_count, 4);
    assert!(metadata.symbols_in_scope("Shop").len() >= 2);
}

#[test]
fn test_reindexing_reuses_pooled_handles() {
    let mut manager = manager();
    let base = class_file("Base", None);
    manager.add_file(&base).unwrap();
    let created = manager.pool_stats().created;

    manager.add_file(&base).unwrap();
    let stats = manager.pool_stats();
    assert_eq!(stats.created, created);
    assert_eq!(stats.reused, created);

    manager.remove_file("file:///Base.cls");
    assert_eq!(manager.sweep_pool() as u64, created);
    assert_eq!(manager.pool_stats().active, 0);
}

#[test]
fn test_failed_add_leaves_no_partial_state() {
    let mut table = SymbolTable::new("file:///A.cls");
    table.add_symbol(Symbol::new(
        "file:///A.cls",
        SymbolKey::new(Vec::new(), SymbolKind::Class, "Good"),
        "Good",
        Location::single(Range::from_coords(0, 0, 0, 4)),
    ));
    table.add_symbol(Symbol::new(
        "file:///B.cls",
        SymbolKey::new(Vec::new(), SymbolKind::Class, "Stray"),
        "Stray",
        Location::single(Range::from_coords(1, 0, 1, 5)),
    ));

    let mut manager = manager();
    assert!(manager.add_file(&table).is_err());
    assert!(manager.find_symbols_in_file("file:///A.cls").is_empty());
    assert!(manager.find_symbol_by_name("Good").is_empty());
}

#[test]
fn test_statistics_count_symbols_and_files() {
    let mut manager = manager();
    manager.add_file(&class_file("Base", None)).unwrap();
    manager.add_file(&class_file("Child", Some("Base"))).unwrap();

    let stats = manager.statistics();
    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.total_symbols, manager.graph().len());
    assert!(stats
        .symbols_by_kind
        .iter()
        .any(|(kind, count)| kind == "class" && *count == 2));
    assert_eq!(stats.caches.len(), 6);

    manager.remove_file("file:///Child.cls");
    assert_eq!(manager.statistics().total_files, 1);
}
