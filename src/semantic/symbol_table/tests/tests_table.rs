#![allow(clippy::unwrap_used)]

use crate::base::{Location, Position, Range};
use crate::semantic::symbol_table::{
    ScopeKind, Symbol, SymbolDetails, SymbolId, SymbolKey, SymbolKind, SymbolTable,
};

const URI: &str = "file:///Account.cls";

fn loc(line: u32, start: u32, end: u32) -> Location {
    Location::single(Range::from_coords(line, start, line, end))
}

fn block(path: &[&str], name: &str, kind: ScopeKind, parent: Option<&SymbolId>) -> Symbol {
    let key = SymbolKey::new(path.iter().map(|p| (*p).into()).collect(), SymbolKind::Block, name);
    Symbol::new(URI, key, name, Location::single(Range::from_coords(0, 0, 10, 0)))
        .with_parent(parent.cloned())
        .with_details(SymbolDetails::Block { scope_kind: kind })
}

fn symbol(path: &[&str], kind: SymbolKind, name: &str, parent: Option<&SymbolId>) -> Symbol {
    let key = SymbolKey::new(path.iter().map(|p| (*p).into()).collect(), kind, name);
    Symbol::new(URI, key, name, loc(1, 4, 4 + name.len() as u32)).with_parent(parent.cloned())
}

/// file -> class Account -> class scope -> field `name`
fn account_table() -> (SymbolTable, SymbolId, SymbolId, SymbolId) {
    let mut table = SymbolTable::new(URI);
    let file = table.add_symbol(block(&[], "file", ScopeKind::File, None));
    let class = table.add_symbol(symbol(&["file"], SymbolKind::Class, "Account", Some(&file)));
    let scope = table.add_symbol(block(
        &["file"],
        "Account",
        ScopeKind::Class,
        Some(&class),
    ));
    table.add_symbol(symbol(&["file", "Account"], SymbolKind::Field, "name", Some(&scope)));
    (table, file, class, scope)
}

#[test]
fn test_ids_are_deterministic() {
    let key = SymbolKey::new(vec!["file".into(), "Account".into()], SymbolKind::Field, "name");
    assert_eq!(
        key.to_id(URI).as_str(),
        "file:///Account.cls#file.Account.field:name"
    );
    assert_eq!(key.to_id(URI).file_uri(), URI);
}

#[test]
fn test_lookup_is_case_insensitive() {
    let (table, ..) = account_table();
    assert_eq!(table.lookup("ACCOUNT").len(), 1);
    assert_eq!(table.lookup("Name")[0].kind, SymbolKind::Field);
    assert!(table.lookup("missing").is_empty());
}

#[test]
fn test_readding_symbol_keeps_parent() {
    let (mut table, file, _, scope) = account_table();
    let field = table.lookup("name")[0].clone();

    let mut replacement = field.clone().with_parent(Some(file.clone()));
    replacement.fqn = Some("Account.name".into());
    table.add_symbol(replacement);

    let stored = table.get(&field.id).unwrap();
    assert_eq!(stored.parent_id.as_ref(), Some(&scope));
    assert_eq!(stored.fqn.as_deref(), Some("Account.name"));

    table.add_symbol(field.clone().with_parent(None));
    assert_eq!(table.get(&field.id).unwrap().parent_id.as_ref(), Some(&scope));
    assert_eq!(table.children_of(&scope).len(), 1);
}

#[test]
fn test_allocate_id_suffixes_collisions() {
    let (table, ..) = account_table();
    let key = SymbolKey::new(vec!["file".into()], SymbolKind::Class, "Account");
    let id = table.allocate_id(&key);
    assert_eq!(id.as_str(), "file:///Account.cls#file.class:Account~2");

    let fresh = SymbolKey::new(vec!["file".into()], SymbolKind::Class, "Contact");
    assert_eq!(table.allocate_id(&fresh), fresh.to_id(URI));
}

#[test]
fn test_tree_navigation() {
    let (table, file, class, scope) = account_table();
    let field = table.lookup("name")[0].id.clone();

    let ancestors: Vec<&SymbolId> = table.ancestors(&field).iter().map(|s| &s.id).collect();
    assert_eq!(ancestors, vec![&scope, &class, &file]);
    assert_eq!(table.enclosing_type(&field).unwrap().id, class);
    assert_eq!(table.body_scope(&class).unwrap().id, scope);
    assert_eq!(table.members_of(&class).len(), 1);
    assert_eq!(table.file_scope().unwrap().id, file);
    assert!(table.enclosing_method(&field).is_none());
}

#[test]
fn test_lookup_from_scope_walks_outwards() {
    let (mut table, _, _, scope) = account_table();
    let method = table.add_symbol(symbol(
        &["file", "Account"],
        SymbolKind::Method,
        "save",
        Some(&scope),
    ));
    let body = table.add_symbol(block(
        &["file", "Account"],
        "save",
        ScopeKind::Method,
        Some(&method),
    ));

    let found = table.lookup_from_scope("NAME", &body).unwrap();
    assert_eq!(found.kind, SymbolKind::Field);
    assert!(table.lookup_from_scope("other", &body).is_none());
}

#[test]
fn test_symbol_at_position() {
    let (table, ..) = account_table();
    let found = table.symbol_at(Position::new(1, 5)).unwrap();
    assert_eq!(found.name, "name");
    assert!(table.symbol_at(Position::new(7, 0)).is_none());
}

#[test]
fn test_update_details() {
    let (mut table, _, class, _) = account_table();
    let updated = table.update_details(&class, |details| {
        *details = SymbolDetails::Type {
            super_class: Some("Base".into()),
            interfaces: vec![],
            enum_values: vec![],
            sobject: None,
        };
    });
    assert!(updated);
    assert_eq!(table.get(&class).unwrap().super_class(), Some("Base"));
    assert!(!table.update_details(&SymbolId::new("nope"), |_| {}));
}
