//! IDE feature tests through the analysis host
//!
//! Tests for:
//! - Document lifecycle (open, change, save, close)
//! - Hover and go to definition across documents
//! - Document outline and folding ranges

pub mod tests_editing;
pub mod tests_navigation;

use std::sync::Arc;

use apexls::syntax::TreeNode;
use apexls::{AnalysisHost, TextDocument};

use crate::helpers::source_fixtures::{FixtureParser, text_of};

/// Host plus the parser backing it.
pub struct Workspace {
    pub host: AnalysisHost,
    pub parser: Arc<FixtureParser>,
}

impl Workspace {
    pub fn new() -> Self {
        let parser = Arc::new(FixtureParser::default());
        Self {
            host: AnalysisHost::new(parser.clone()),
            parser,
        }
    }

    pub fn version(&self, uri: &str, version: i32, tree: TreeNode) -> TextDocument {
        let text = text_of(uri, version);
        self.parser.register(&text, tree);
        TextDocument::new(uri, version, text)
    }

    pub async fn open(&self, uri: &str, tree: TreeNode) {
        let document = self.version(uri, 1, tree);
        self.host.open(document).await;
    }
}
