#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use super::{FixtureParser, document, has_code, pipeline_with};
use crate::base::Range;
use crate::diagnostics::{
    Diagnostic, DiagnosticRequest, EnrichmentLevel, PipelineSettings, TextDocument,
    ValidationContext, ValidationError, ValidationTier, Validator, codes, sources,
};
use crate::semantic::SymbolAvailability;
use crate::syntax::SyntaxError;
use crate::syntax::build::*;

/// A class with one unused local and one unknown field type.
fn shop() -> crate::syntax::TreeNode {
    compilation_unit(vec![class("Shop", 0).ends(5).body(vec![
        field("Widget", "primary", 1),
        method("void", "open", 2).ends(4).body(vec![local_var("Integer", "count", 3)]),
    ])])
}

struct Failing(ValidationTier);

#[async_trait]
impl Validator for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn tier(&self) -> ValidationTier {
        self.0
    }

    async fn validate(
        &self,
        _context: &ValidationContext<'_>,
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        Err(ValidationError::failed("failing", "boom"))
    }
}

/// Always reports the same warning at the top of the file.
struct Echo;

#[async_trait]
impl Validator for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn tier(&self) -> ValidationTier {
        ValidationTier::Immediate
    }

    async fn validate(
        &self,
        _context: &ValidationContext<'_>,
    ) -> Result<Vec<Diagnostic>, ValidationError> {
        Ok(vec![
            Diagnostic::warning(Range::from_coords(0, 0, 0, 5), "echo").with_code("test.echo"),
        ])
    }
}

// ============================================================================
// CACHING
// ============================================================================

#[tokio::test]
async fn test_same_version_is_compiled_once() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline_with(&parser, PipelineSettings::default());
    let doc = document(&parser, "file:///Shop.cls", 1, shop());

    let first = pipeline.diagnostics(&doc, DiagnosticRequest::Pull).await;
    let second = pipeline.diagnostics(&doc, DiagnosticRequest::Pull).await;

    assert_eq!(first, second);
    assert_eq!(pipeline.compile_count(), 1);
    assert_eq!(parser.parses(), 1);
    assert_eq!(pipeline.cache().stats().hits, 1);
}

#[tokio::test]
async fn test_new_version_is_recompiled() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline_with(&parser, PipelineSettings::default());
    let v1 = document(&parser, "file:///Shop.cls", 1, shop());
    pipeline.diagnostics(&v1, DiagnosticRequest::Push).await;

    let fixed = compilation_unit(vec![class("Shop", 0).ends(1)]);
    let v2 = document(&parser, "file:///Shop.cls", 2, fixed);
    let diagnostics = pipeline.diagnostics(&v2, DiagnosticRequest::Pull).await;

    assert_eq!(pipeline.compile_count(), 2);
    assert!(diagnostics.is_empty());
    assert_eq!(pipeline.store().get("file:///Shop.cls").unwrap().version, 2);
}

#[tokio::test]
async fn test_superseded_version_is_not_stored() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline_with(&parser, PipelineSettings::default());
    let v2 = document(&parser, "file:///Shop.cls", 2, shop());
    let v1 = document(
        &parser,
        "file:///Shop.cls",
        1,
        compilation_unit(vec![class("Shop", 0).ends(1)]),
    );

    pipeline.compile(&v2);
    pipeline.compile(&v1);

    assert_eq!(pipeline.store().get("file:///Shop.cls").unwrap().version, 2);
    assert_eq!(pipeline.cache().len(), 1);
}

// ============================================================================
// TIERS
// ============================================================================

#[tokio::test]
async fn test_push_runs_only_immediate_validators() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline_with(&parser, PipelineSettings::default());
    let doc = document(&parser, "file:///Shop.cls", 1, shop());

    let pushed = pipeline.diagnostics(&doc, DiagnosticRequest::Push).await;
    assert!(has_code(&pushed, codes::UNUSED_VARIABLE));
    assert!(!has_code(&pushed, codes::UNDEFINED_TYPE));

    let pulled = pipeline.diagnostics(&doc, DiagnosticRequest::Pull).await;
    assert!(has_code(&pulled, codes::UNUSED_VARIABLE));
    assert!(has_code(&pulled, codes::UNDEFINED_TYPE));
}

#[tokio::test]
async fn test_pull_enriches_stored_table() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline_with(&parser, PipelineSettings::default());
    let doc = document(&parser, "file:///Shop.cls", 1, shop());

    pipeline.diagnostics(&doc, DiagnosticRequest::Push).await;
    let level = pipeline.store().get("file:///Shop.cls").unwrap().level;
    assert_eq!(level, EnrichmentLevel::Declarations);

    pipeline.diagnostics(&doc, DiagnosticRequest::Pull).await;
    let level = pipeline.store().get("file:///Shop.cls").unwrap().level;
    assert_eq!(level, EnrichmentLevel::References);
}

#[tokio::test]
async fn test_failing_thorough_tier_keeps_immediate_results() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline_with(&parser, PipelineSettings::default())
        .with_validator(Arc::new(Failing(ValidationTier::Thorough)));
    let doc = document(&parser, "file:///Shop.cls", 1, shop());

    let diagnostics = pipeline.diagnostics(&doc, DiagnosticRequest::Pull).await;
    assert!(has_code(&diagnostics, codes::UNUSED_VARIABLE));
    assert!(!has_code(&diagnostics, codes::UNDEFINED_TYPE));
}

#[tokio::test]
async fn test_failing_immediate_tier_keeps_thorough_results() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline_with(&parser, PipelineSettings::default())
        .with_validator(Arc::new(Failing(ValidationTier::Immediate)));
    let doc = document(&parser, "file:///Shop.cls", 1, shop());

    let diagnostics = pipeline.diagnostics(&doc, DiagnosticRequest::Pull).await;
    assert!(!has_code(&diagnostics, codes::UNUSED_VARIABLE));
    assert!(has_code(&diagnostics, codes::UNDEFINED_TYPE));
}

#[tokio::test]
async fn test_identical_diagnostics_are_merged() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline_with(&parser, PipelineSettings::default())
        .with_validators(vec![Arc::new(Echo), Arc::new(Echo)]);
    let doc = document(&parser, "file:///Shop.cls", 1, shop());

    let diagnostics = pipeline.diagnostics(&doc, DiagnosticRequest::Push).await;
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "echo");
}

// ============================================================================
// SYNTAX ERRORS
// ============================================================================

#[tokio::test]
async fn test_syntax_errors_are_always_reported() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline_with(&parser, PipelineSettings::default());
    let error = SyntaxError::new(Range::from_coords(2, 4, 2, 5), "missing ';'");
    parser.register_with_errors("broken", Some(shop()), vec![error.clone()]);
    let doc = TextDocument::new("file:///Shop.cls", 1, "broken");

    for request in [
        DiagnosticRequest::Push,
        DiagnosticRequest::Pull,
        DiagnosticRequest::Interactive,
    ] {
        let diagnostics = pipeline.diagnostics(&doc, request).await;
        let syntax = diagnostics
            .iter()
            .find(|d| d.code.as_deref() == Some(codes::SYNTAX_ERROR))
            .unwrap();
        assert_eq!(syntax.message, "missing ';'");
        assert_eq!(syntax.range, error.range);
        assert_eq!(syntax.source.as_str(), sources::SYNTAX);
    }
}

#[tokio::test]
async fn test_unparseable_document_reports_only_syntax_errors() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline_with(&parser, PipelineSettings::default());
    let doc = TextDocument::new("file:///Garbage.cls", 1, "}}}");

    let diagnostics = pipeline.diagnostics(&doc, DiagnosticRequest::Interactive).await;
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_deref(), Some(codes::SYNTAX_ERROR));
}

// ============================================================================
// CROSS-FILE PASS
// ============================================================================

#[tokio::test]
async fn test_dependency_cycle_is_reported() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline_with(&parser, PipelineSettings::default());
    let alpha = document(
        &parser,
        "file:///Alpha.cls",
        1,
        compilation_unit(vec![class("Alpha", 0).modifiers(&["virtual"]).extends("Beta").ends(1)]),
    );
    let beta = document(
        &parser,
        "file:///Beta.cls",
        1,
        compilation_unit(vec![class("Beta", 0).modifiers(&["virtual"]).extends("Alpha").ends(1)]),
    );
    pipeline.compile(&beta);

    let pushed = pipeline.diagnostics(&alpha, DiagnosticRequest::Push).await;
    assert!(!has_code(&pushed, codes::CIRCULAR_DEPENDENCY));

    let pulled = pipeline.diagnostics(&alpha, DiagnosticRequest::Pull).await;
    let cycle = pulled
        .iter()
        .find(|d| d.code.as_deref() == Some(codes::CIRCULAR_DEPENDENCY))
        .unwrap();
    assert_eq!(cycle.source.as_str(), sources::CROSS_FILE);
    assert!(cycle.message.starts_with("'Alpha' is part of a circular dependency"));
    assert!(has_code(&pulled, codes::CIRCULAR_INHERITANCE));
}

#[tokio::test]
async fn test_high_impact_symbol_is_reported() {
    let parser = Arc::new(FixtureParser::default());
    let settings = PipelineSettings {
        high_impact_threshold: 2,
        ..PipelineSettings::default()
    };
    let pipeline = pipeline_with(&parser, settings);
    let base = document(
        &parser,
        "file:///Base.cls",
        1,
        compilation_unit(vec![class("Base", 0).modifiers(&["public", "virtual"]).ends(1)]),
    );
    pipeline.compile(&base);
    for name in ["One", "Two", "Three"] {
        let uri = format!("file:///{name}.cls");
        let child = document(
            &parser,
            &uri,
            1,
            compilation_unit(vec![class(name, 0).extends("Base").ends(1)]),
        );
        pipeline.compile(&child);
    }

    let diagnostics = pipeline.diagnostics(&base, DiagnosticRequest::Pull).await;
    let impact = diagnostics
        .iter()
        .find(|d| d.code.as_deref() == Some(codes::HIGH_IMPACT))
        .unwrap();
    assert_eq!(impact.message, "Changing 'Base' affects 3 symbols (low risk)");
}

#[tokio::test]
async fn test_cross_file_pass_can_be_disabled() {
    let parser = Arc::new(FixtureParser::default());
    let settings = PipelineSettings {
        high_impact_threshold: 0,
        cross_file_enhancement: false,
        ..PipelineSettings::default()
    };
    let pipeline = pipeline_with(&parser, settings);
    let base = document(
        &parser,
        "file:///Base.cls",
        1,
        compilation_unit(vec![class("Base", 0).modifiers(&["virtual"]).ends(1)]),
    );
    let child = document(
        &parser,
        "file:///Child.cls",
        1,
        compilation_unit(vec![class("Child", 0).extends("Base").ends(1)]),
    );
    pipeline.compile(&child);

    let diagnostics = pipeline.diagnostics(&base, DiagnosticRequest::Interactive).await;
    assert!(!has_code(&diagnostics, codes::HIGH_IMPACT));
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[tokio::test]
async fn test_close_keeps_symbols_indexed() {
    let parser = Arc::new(FixtureParser::default());
    let pipeline = pipeline_with(&parser, PipelineSettings::default());
    let doc = document(&parser, "file:///Shop.cls", 1, shop());
    pipeline.diagnostics(&doc, DiagnosticRequest::Push).await;

    pipeline.close("file:///Shop.cls");
    assert!(pipeline.cache().is_empty());
    assert!(!pipeline.store().contains("file:///Shop.cls"));
    assert!(pipeline.manager().is_symbol_available("Shop"));

    pipeline.remove("file:///Shop.cls");
    assert!(!pipeline.manager().is_symbol_available("Shop"));
}
