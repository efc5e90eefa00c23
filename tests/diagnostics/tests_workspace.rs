#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use apexls::diagnostics::{
    ArtifactError, ArtifactLoader, ArtifactOutcome, ArtifactRequest, PipelineSettings, codes,
};
use apexls::syntax::{SyntaxError, TreeNode};
use apexls::{
    Diagnostic, DiagnosticPipeline, DiagnosticRequest, Range, Severity, SharedSymbolManager,
    TextDocument,
};

use crate::helpers::diagnostic_helpers::{assert_has_code, assert_lacks_code};
use crate::helpers::source_fixtures::*;

fn pipeline(parser: &Arc<FixtureParser>) -> DiagnosticPipeline {
    DiagnosticPipeline::new(
        parser.clone(),
        SharedSymbolManager::default(),
        PipelineSettings::default(),
    )
}

fn document(parser: &FixtureParser, uri: &str, tree: TreeNode) -> TextDocument {
    let text = text_of(uri, 1);
    parser.register(&text, tree);
    TextDocument::new(uri, 1, text)
}

async fn open(
    pipeline: &DiagnosticPipeline,
    parser: &FixtureParser,
    uri: &str,
    tree: TreeNode,
) -> TextDocument {
    let document = document(parser, uri, tree);
    pipeline.diagnostics(&document, DiagnosticRequest::Push).await;
    document
}

fn errors(diagnostics: &[Diagnostic]) -> Vec<&Diagnostic> {
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect()
}

// =============================================================================
// DEPENDENT DOCUMENTS
// =============================================================================

#[tokio::test]
async fn test_consistent_workspace_has_no_errors() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline(&parser);
    open(&pipeline, &parser, BASE_URI, base()).await;
    open(&pipeline, &parser, WIDGET_URI, widget()).await;
    let shop = open(&pipeline, &parser, SHOP_URI, shop()).await;

    let diagnostics = pipeline.diagnostics(&shop, DiagnosticRequest::Pull).await;

    assert_eq!(errors(&diagnostics), Vec::<&Diagnostic>::new());
    assert_lacks_code(&diagnostics, codes::UNUSED_VARIABLE);
}

#[tokio::test]
async fn test_undefined_type_clears_once_declaring_document_opens() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline(&parser);
    open(&pipeline, &parser, BASE_URI, base()).await;
    let shop = open(&pipeline, &parser, SHOP_URI, shop()).await;

    let before = pipeline.diagnostics(&shop, DiagnosticRequest::Pull).await;
    let undefined = before
        .iter()
        .find(|d| d.code.as_deref() == Some(codes::UNDEFINED_TYPE))
        .unwrap();
    assert_eq!(undefined.message, "Unknown type 'Widget'");
    assert_eq!(undefined.range.start.line, 1);

    open(&pipeline, &parser, WIDGET_URI, widget()).await;

    let after = pipeline.diagnostics(&shop, DiagnosticRequest::Pull).await;
    assert_lacks_code(&after, codes::UNDEFINED_TYPE);
}

#[tokio::test]
async fn test_removed_super_class_is_reported_missing() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline(&parser);
    open(&pipeline, &parser, BASE_URI, base()).await;
    open(&pipeline, &parser, WIDGET_URI, widget()).await;
    let shop = open(&pipeline, &parser, SHOP_URI, shop()).await;

    pipeline.remove(BASE_URI);

    let diagnostics = pipeline.diagnostics(&shop, DiagnosticRequest::Pull).await;
    assert_has_code(&diagnostics, codes::MISSING_SUPERCLASS);
}

#[tokio::test]
async fn test_interface_contract_checked_against_other_document() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline(&parser);
    open(&pipeline, &parser, RUNNABLE_URI, runnable()).await;
    let lazy = open(&pipeline, &parser, "file:///classes/LazyJob.cls", job("LazyJob", false)).await;
    let busy = open(&pipeline, &parser, "file:///classes/BusyJob.cls", job("BusyJob", true)).await;

    let lazy_diagnostics = pipeline.diagnostics(&lazy, DiagnosticRequest::Pull).await;
    let missing = lazy_diagnostics
        .iter()
        .find(|d| d.code.as_deref() == Some(codes::MISSING_INTERFACE_METHOD))
        .unwrap();
    assert_eq!(
        missing.message,
        "Class 'LazyJob' must implement method 'run(String)' from interface 'Runnable'"
    );

    let busy_diagnostics = pipeline.diagnostics(&busy, DiagnosticRequest::Pull).await;
    assert_lacks_code(&busy_diagnostics, codes::MISSING_INTERFACE_METHOD);
}

#[tokio::test]
async fn test_push_skips_cross_document_checks() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline(&parser);
    let shop = document(&parser, SHOP_URI, shop());

    let diagnostics = pipeline.diagnostics(&shop, DiagnosticRequest::Push).await;

    assert_lacks_code(&diagnostics, codes::UNDEFINED_TYPE);
    assert_lacks_code(&diagnostics, codes::MISSING_SUPERCLASS);
}

// =============================================================================
// SYNTAX ERRORS
// =============================================================================

#[tokio::test]
async fn test_syntax_errors_accompany_semantic_diagnostics() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline(&parser);
    let text = text_of(SHOP_URI, 1);
    parser.register_with_errors(
        &text,
        shop(),
        vec![SyntaxError::new(
            Range::from_coords(4, 24, 4, 25),
            "missing ';' at '}'",
        )],
    );
    let shop = TextDocument::new(SHOP_URI, 1, text);

    let diagnostics = pipeline.diagnostics(&shop, DiagnosticRequest::Pull).await;

    let syntax = diagnostics
        .iter()
        .find(|d| d.code.as_deref() == Some(codes::SYNTAX_ERROR))
        .unwrap();
    assert_eq!(syntax.message, "missing ';' at '}'");
    assert_eq!(syntax.severity, Severity::Error);
    // The partial tree is still analysed
    assert_has_code(&diagnostics, codes::UNDEFINED_TYPE);
}

#[tokio::test]
async fn test_unparseable_document_reports_only_syntax_errors() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline(&parser);
    let garbage = TextDocument::new(SHOP_URI, 1, "public clas Shop {");

    let diagnostics = pipeline
        .diagnostics(&garbage, DiagnosticRequest::Interactive)
        .await;

    assert_eq!(
        diagnostics
            .iter()
            .map(|d| d.code.as_deref())
            .collect::<Vec<_>>(),
        vec![Some(codes::SYNTAX_ERROR)]
    );
}

// =============================================================================
// ARTIFACT LOADING
// =============================================================================

/// Serves `Widget` from a package outside the workspace.
#[derive(Default)]
struct PackageLoader {
    requests: AtomicUsize,
}

#[async_trait]
impl ArtifactLoader for PackageLoader {
    async fn load(&self, request: &ArtifactRequest) -> Result<ArtifactOutcome, ArtifactError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if request.type_name.eq_ignore_ascii_case("Widget") {
            let uri = "file:///package/Widget.cls";
            Ok(ArtifactOutcome::Loaded(vec![collect(uri, &widget())]))
        } else {
            Ok(ArtifactOutcome::NotFound)
        }
    }
}

#[tokio::test]
async fn test_missing_type_is_loaded_from_package() {
    let parser = Arc::new(FixtureParser::default());
    let loader = Arc::new(PackageLoader::default());
    let pipeline = pipeline(&parser).with_artifact_loader(loader.clone());
    open(&pipeline, &parser, BASE_URI, base()).await;
    let shop = open(&pipeline, &parser, SHOP_URI, shop()).await;

    let diagnostics = pipeline.diagnostics(&shop, DiagnosticRequest::Pull).await;

    assert_lacks_code(&diagnostics, codes::UNDEFINED_TYPE);
    assert_eq!(loader.requests.load(Ordering::Relaxed), 1);
    let widget = pipeline.manager().find_type("Widget").unwrap();
    assert_eq!(widget.file_uri.as_str(), "file:///package/Widget.cls");
}

#[tokio::test]
async fn test_user_requested_load() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline(&parser).with_artifact_loader(Arc::new(PackageLoader::default()));

    let found = pipeline.load_artifact(SHOP_URI, "Widget").await.unwrap();
    assert_eq!(found.map(|symbol| symbol.name.to_string()), Some("Widget".to_string()));

    let missing = pipeline.load_artifact(SHOP_URI, "Gizmo").await.unwrap();
    assert!(missing.is_none());
}

// =============================================================================
// CROSS-FILE PASS
// =============================================================================

#[tokio::test]
async fn test_interactive_request_reports_cycle_across_documents() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline(&parser);
    let (left_uri, left) = subclass("Left", "Right");
    let (right_uri, right) = subclass("Right", "Left");
    let left = open(&pipeline, &parser, &left_uri, left).await;
    open(&pipeline, &parser, &right_uri, right).await;

    let diagnostics = pipeline
        .diagnostics(&left, DiagnosticRequest::Interactive)
        .await;

    assert_has_code(&diagnostics, codes::CIRCULAR_DEPENDENCY);
    assert_has_code(&diagnostics, codes::CIRCULAR_INHERITANCE);
}
