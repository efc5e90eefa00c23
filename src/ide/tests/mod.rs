mod tests_queries;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::semantic::collector::SymbolCollector;
use crate::semantic::symbol_table::SymbolTable;
use crate::semantic::{ManagerSettings, SymbolManager};
use crate::syntax::{DocumentParser, ParsedDocument, TreeNode};

/// Parser stand-in returning registered trees by document text.
#[derive(Default)]
struct FixtureParser {
    trees: Mutex<FxHashMap<String, TreeNode>>,
}

impl FixtureParser {
    fn register(&self, text: &str, tree: TreeNode) {
        self.trees.lock().insert(text.to_string(), tree);
    }
}

impl DocumentParser for FixtureParser {
    fn parse(&self, _uri: &str, text: &str) -> ParsedDocument {
        match self.trees.lock().get(text).cloned() {
            Some(tree) => ParsedDocument::new(tree, Vec::new()),
            None => ParsedDocument::failed(Vec::new()),
        }
    }
}

/// Collect every `(uri, tree)` into one manager; returns the tables in order.
fn workspace(files: &[(&str, TreeNode)]) -> (SymbolManager, Vec<SymbolTable>) {
    let mut manager = SymbolManager::new(ManagerSettings::default());
    let tables = files
        .iter()
        .map(|(uri, tree)| {
            let table = SymbolCollector::collect(tree, uri).table;
            manager.add_file(&table).unwrap();
            table
        })
        .collect();
    (manager, tables)
}
