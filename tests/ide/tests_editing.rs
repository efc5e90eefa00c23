#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use apexls::diagnostics::codes;
use apexls::syntax::build::*;
use apexls::{DiagnosticRequest, Position};

use super::Workspace;
use crate::helpers::diagnostic_helpers::{assert_has_code, assert_lacks_code, codes as codes_of};
use crate::helpers::source_fixtures::*;

#[tokio::test]
async fn test_open_then_save_enriches_diagnostics() {
    let workspace = Workspace::new();
    workspace.open(BASE_URI, base()).await;

    let document = workspace.version(SHOP_URI, 1, shop());
    let pushed = workspace.host.open(document).await;
    assert_lacks_code(&pushed, codes::UNDEFINED_TYPE);

    let saved = workspace.host.save(SHOP_URI).await;
    assert_has_code(&saved, codes::UNDEFINED_TYPE);
}

#[tokio::test]
async fn test_renaming_a_type_breaks_its_users() {
    let workspace = Workspace::new();
    workspace.open(BASE_URI, base()).await;
    workspace.open(WIDGET_URI, widget()).await;
    workspace.open(SHOP_URI, shop()).await;
    assert_lacks_code(&workspace.host.save(SHOP_URI).await, codes::UNDEFINED_TYPE);

    let renamed = compilation_unit(vec![class("Gadget", 0).modifiers(&["public"]).ends(1)]);
    let document = workspace.version(WIDGET_URI, 2, renamed);
    workspace.host.change(document).await;

    let diagnostics = workspace.host.save(SHOP_URI).await;
    assert_has_code(&diagnostics, codes::UNDEFINED_TYPE);
    let analysis = workspace.host.analysis();
    assert!(analysis.goto_definition(SHOP_URI, Position::new(1, 3)).is_empty());
}

#[tokio::test]
async fn test_late_change_is_ignored() {
    let workspace = Workspace::new();
    let newer = workspace.version(WIDGET_URI, 3, widget());
    workspace.host.open(newer).await;

    let renamed = compilation_unit(vec![class("Gadget", 0).ends(1)]);
    let older = workspace.version(WIDGET_URI, 2, renamed);
    let diagnostics = workspace.host.change(older).await;

    assert!(diagnostics.is_empty());
    assert_eq!(workspace.host.document(WIDGET_URI).unwrap().version, 3);
    let outline = workspace.host.analysis().document_symbols(WIDGET_URI);
    assert_eq!(outline[0].name.as_str(), "Widget");
}

#[tokio::test]
async fn test_closed_document_still_defines_types() {
    let workspace = Workspace::new();
    workspace.open(BASE_URI, base()).await;
    workspace.open(WIDGET_URI, widget()).await;
    workspace.open(SHOP_URI, shop()).await;

    assert!(workspace.host.close(WIDGET_URI));
    assert!(!workspace.host.close(WIDGET_URI));

    assert_eq!(workspace.host.open_documents().len(), 2);
    let diagnostics = workspace.host.save(SHOP_URI).await;
    assert_lacks_code(&diagnostics, codes::UNDEFINED_TYPE);
    assert!(
        workspace
            .host
            .diagnostics(WIDGET_URI, DiagnosticRequest::Pull)
            .await
            .is_empty()
    );
}

#[tokio::test]
async fn test_unused_local_reported_on_open() {
    let workspace = Workspace::new();
    let tree = compilation_unit(vec![class("Counter", 0).modifiers(&["public"]).ends(4).body(vec![
        method("void", "tick", 1).ends(3).body(vec![local_var("Integer", "spare", 2)]),
    ])]);
    let document = workspace.version("file:///classes/Counter.cls", 1, tree);

    let diagnostics = workspace.host.open(document).await;

    assert_eq!(codes_of(&diagnostics), vec![codes::UNUSED_VARIABLE]);
    assert_eq!(diagnostics[0].message, "Local variable 'spare' is never used");
}
