
use crate::semantic::collector::SymbolCollector;
use crate::semantic::graphs::SymbolGraph;
use crate::semantic::symbol_table::{SymbolId, SymbolTable};
use crate::syntax::TreeNode;
use crate::syntax::build::*;

fn table(uri: &str, tree: &TreeNode) -> SymbolTable {
    SymbolCollector::collect(tree, uri).table
}

/// `class {name} extends {base}` alone in `file:///{name}.cls`.
fn class_file(name: &str, base: Option<&str>) -> SymbolTable {
    let mut class = class(name, 0).ends(2);
    if let Some(base) = base {
        class = class.extends(base);
    }
    table(&format!("file:///{name}.cls"), &compilation_unit(vec![class]))
}

fn id_of(graph: &SymbolGraph, name: &str) -> SymbolId {
    graph
        .lookup_by_name(name)
        .into_iter()
        .find(|symbol| symbol.kind.is_type())
        .map(|symbol| symbol.id.clone())
        .unwrap_or_else(|| panic!("no type named {name}"))
}
