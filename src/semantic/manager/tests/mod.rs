mod tests_manager;

use crate::semantic::collector::SymbolCollector;
use crate::semantic::manager::{ManagerSettings, SymbolManager};
use crate::semantic::symbol_table::{SymbolId, SymbolTable};
use crate::syntax::TreeNode;
use crate::syntax::build::*;

fn table(uri: &str, tree: &TreeNode) -> SymbolTable {
    SymbolCollector::collect(tree, uri).table
}

fn table_in_namespace(uri: &str, namespace: &str, tree: &TreeNode) -> SymbolTable {
    let mut collector = SymbolCollector::new(uri).with_namespace(namespace);
    crate::syntax::ParseTree::walk(tree, &mut collector);
    collector.finish().table
}

/// `class {name} extends {base}` alone in `file:///{name}.cls`.
fn class_file(name: &str, base: Option<&str>) -> SymbolTable {
    let mut class = class(name, 0).modifiers(&["public"]).ends(2);
    if let Some(base) = base {
        class = class.extends(base);
    }
    table(&format!("file:///{name}.cls"), &compilation_unit(vec![class]))
}

fn manager() -> SymbolManager {
    SymbolManager::new(ManagerSettings::default())
}

fn type_id(manager: &SymbolManager, name: &str) -> SymbolId {
    manager
        .find_symbol_by_name(name)
        .into_iter()
        .find(|symbol| symbol.kind.is_type())
        .map(|symbol| symbol.id.clone())
        .unwrap_or_else(|| panic!("no type named {name}"))
}
