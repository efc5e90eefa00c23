
use crate::semantic::collector::{CollectionResult, SymbolCollector};
use crate::semantic::types::SemanticError;
use crate::syntax::TreeNode;

const URI: &str = "file:///Test.cls";

fn collect(tree: &TreeNode) -> CollectionResult {
    SymbolCollector::collect(tree, URI)
}

fn errors_containing<'a>(result: &'a CollectionResult, text: &str) -> Vec<&'a SemanticError> {
    result
        .errors
        .iter()
        .filter(|e| e.message.contains(text))
        .collect()
}
