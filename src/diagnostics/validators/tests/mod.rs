mod tests_immediate;

use crate::diagnostics::types::Diagnostic;
use crate::semantic::collector::SymbolCollector;
use crate::semantic::symbol_table::SymbolTable;
use crate::semantic::SharedSymbolManager;
use crate::syntax::TreeNode;

use super::{ValidationContext, Validator};

/// Collect `tree` as `uri` and index it.
fn index(manager: &SharedSymbolManager, uri: &str, tree: &TreeNode) -> SymbolTable {
    let table = SymbolCollector::collect(tree, uri).table;
    manager.add_file(&table).unwrap();
    table
}

async fn run(
    validator: &dyn Validator,
    manager: &SharedSymbolManager,
    table: &SymbolTable,
) -> Vec<Diagnostic> {
    let context = ValidationContext {
        uri: table.file_uri(),
        table,
        manager,
        artifacts: None,
        max_inheritance_depth: 10,
    };
    validator.validate(&context).await.unwrap()
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics
        .iter()
        .filter_map(|d| d.code.as_deref())
        .collect()
}
