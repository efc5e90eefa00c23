mod tests_pipeline;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::base::Range;
use crate::diagnostics::{Diagnostic, DiagnosticPipeline, PipelineSettings, TextDocument};
use crate::semantic::SharedSymbolManager;
use crate::semantic::collector::SymbolCollector;
use crate::semantic::symbol_table::SymbolTable;
use crate::syntax::{DocumentParser, ParsedDocument, SyntaxError, TreeNode};

/// Parser stand-in returning registered trees by document text.
#[derive(Default)]
struct FixtureParser {
    documents: Mutex<FxHashMap<String, (Option<TreeNode>, Vec<SyntaxError>)>>,
    parses: AtomicUsize,
}

impl FixtureParser {
    fn register(&self, text: &str, tree: TreeNode) {
        self.documents
            .lock()
            .insert(text.to_string(), (Some(tree), Vec::new()));
    }

    fn register_with_errors(&self, text: &str, tree: Option<TreeNode>, errors: Vec<SyntaxError>) {
        self.documents
            .lock()
            .insert(text.to_string(), (tree, errors));
    }

    fn parses(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }
}

impl DocumentParser for FixtureParser {
    fn parse(&self, _uri: &str, text: &str) -> ParsedDocument {
        self.parses.fetch_add(1, Ordering::Relaxed);
        match self.documents.lock().get(text).cloned() {
            Some((Some(tree), errors)) => ParsedDocument::new(tree, errors),
            Some((None, errors)) => ParsedDocument::failed(errors),
            None => ParsedDocument::failed(vec![SyntaxError::new(
                Range::from_coords(0, 0, 0, 1),
                "unexpected input",
            )]),
        }
    }
}

fn pipeline_with(parser: &Arc<FixtureParser>, settings: PipelineSettings) -> DiagnosticPipeline {
    DiagnosticPipeline::new(parser.clone(), SharedSymbolManager::default(), settings)
}

/// Register `tree` under a text derived from `uri` and `version`.
fn document(parser: &FixtureParser, uri: &str, version: i32, tree: TreeNode) -> TextDocument {
    let text = format!("// {uri} v{version}");
    parser.register(&text, tree);
    TextDocument::new(uri, version, text)
}

fn table(uri: &str, tree: &TreeNode) -> SymbolTable {
    SymbolCollector::collect(tree, uri).table
}

fn has_code(diagnostics: &[Diagnostic], code: &str) -> bool {
    diagnostics.iter().any(|d| d.code.as_deref() == Some(code))
}
