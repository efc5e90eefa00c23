#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::{codes, index, run};
use crate::diagnostics::types::{Severity, codes as diagnostic_codes};
use crate::diagnostics::validators::{
    AbstractMemberValidator, TestMethodValidator, UnusedVariableValidator,
};
use crate::semantic::SharedSymbolManager;
use crate::syntax::build::*;

// ============================================================================
// ABSTRACT MEMBERS
// ============================================================================

#[tokio::test]
async fn test_abstract_method_in_concrete_class() {
    let manager = SharedSymbolManager::default();
    let tree = compilation_unit(vec![class("Shape", 0).modifiers(&["public"]).ends(3).body(vec![
        method("Decimal", "area", 1).modifiers(&["public", "abstract"]),
    ])]);
    let table = index(&manager, "file:///Shape.cls", &tree);

    let diagnostics = run(&AbstractMemberValidator, &manager, &table).await;
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::ABSTRACT_MEMBER_IN_CONCRETE_CLASS]);
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert!(diagnostics[0].message.contains("'area'"));
    assert!(diagnostics[0].message.contains("'Shape'"));
}

#[tokio::test]
async fn test_abstract_method_in_abstract_class_is_fine() {
    let manager = SharedSymbolManager::default();
    let tree = compilation_unit(vec![
        class("Shape", 0)
            .modifiers(&["public", "abstract"])
            .ends(3)
            .body(vec![method("Decimal", "area", 1).modifiers(&["public", "abstract"])]),
    ]);
    let table = index(&manager, "file:///Shape.cls", &tree);

    assert!(run(&AbstractMemberValidator, &manager, &table).await.is_empty());
}

#[tokio::test]
async fn test_interface_methods_are_not_flagged() {
    let manager = SharedSymbolManager::default();
    let tree = compilation_unit(vec![
        interface("Runnable", 0)
            .ends(2)
            .body(vec![interface_method("void", "run", 1)]),
    ]);
    let table = index(&manager, "file:///Runnable.cls", &tree);

    assert!(run(&AbstractMemberValidator, &manager, &table).await.is_empty());
}

// ============================================================================
// TEST METHODS
// ============================================================================

#[tokio::test]
async fn test_test_method_outside_test_class() {
    let manager = SharedSymbolManager::default();
    let tree = compilation_unit(vec![class("Service", 0).ends(4).body(vec![
        method("void", "checksTotals", 1).annotated("IsTest", &[]).ends(2),
        method("void", "helper", 3),
    ])]);
    let table = index(&manager, "file:///Service.cls", &tree);

    let diagnostics = run(&TestMethodValidator, &manager, &table).await;
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::TEST_METHOD_OUTSIDE_TEST_CLASS]);
    assert!(diagnostics[0].message.contains("'checksTotals'"));
}

#[tokio::test]
async fn test_test_method_inside_test_class() {
    let manager = SharedSymbolManager::default();
    let tree = compilation_unit(vec![
        class("ServiceTest", 0)
            .annotated("IsTest", &[])
            .ends(3)
            .body(vec![
                method("void", "checksTotals", 1)
                    .annotated("IsTest", &[])
                    .ends(2),
            ]),
    ]);
    let table = index(&manager, "file:///ServiceTest.cls", &tree);

    assert!(run(&TestMethodValidator, &manager, &table).await.is_empty());
}

#[tokio::test]
async fn test_test_method_in_inner_class_of_test_class() {
    let manager = SharedSymbolManager::default();
    let tree = compilation_unit(vec![
        class("OuterTest", 0)
            .annotated("IsTest", &[])
            .ends(5)
            .body(vec![class("Fixtures", 1).ends(4).body(vec![
                method("void", "checks", 2).annotated("IsTest", &[]).ends(3),
            ])]),
    ]);
    let table = index(&manager, "file:///OuterTest.cls", &tree);

    assert!(run(&TestMethodValidator, &manager, &table).await.is_empty());
}

// ============================================================================
// UNUSED LOCALS
// ============================================================================

#[tokio::test]
async fn test_unused_local_is_reported() {
    let manager = SharedSymbolManager::default();
    let tree = compilation_unit(vec![class("Counter", 0).ends(6).body(vec![
        method("void", "count", 1).ends(5).body(vec![
            local_var("Integer", "unused", 2),
            local_var("Integer", "total", 3),
            assign(ident("total", 4, 4), "+=", ident("total", 4, 13)),
        ]),
    ])]);
    let table = index(&manager, "file:///Counter.cls", &tree);

    let diagnostics = run(&UnusedVariableValidator, &manager, &table).await;
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::UNUSED_VARIABLE]);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].message, "Local variable 'unused' is never used");
    assert_eq!(diagnostics[0].range.start.line, 2);
}

#[tokio::test]
async fn test_local_used_through_chain_is_not_reported() {
    let manager = SharedSymbolManager::default();
    let tree = compilation_unit(vec![class("Printer", 0).ends(5).body(vec![
        method("void", "print", 1).ends(4).body(vec![
            local_var("String", "label", 2),
            chain("label.trim()", 3, 4),
        ]),
    ])]);
    let table = index(&manager, "file:///Printer.cls", &tree);

    assert!(run(&UnusedVariableValidator, &manager, &table).await.is_empty());
}

#[tokio::test]
async fn test_usage_in_sibling_method_does_not_count() {
    let manager = SharedSymbolManager::default();
    let tree = compilation_unit(vec![class("Pair", 0).ends(8).body(vec![
        method("void", "first", 1).ends(3).body(vec![local_var("Integer", "value", 2)]),
        method("void", "second", 4).ends(7).body(vec![
            local_var("Integer", "value", 5),
            call("log", 6, 4, vec![ident("value", 6, 8)]),
        ]),
    ])]);
    let table = index(&manager, "file:///Pair.cls", &tree);

    let diagnostics = run(&UnusedVariableValidator, &manager, &table).await;
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].range.start.line, 2);
}

#[tokio::test]
async fn test_catch_variable_is_exempt() {
    let manager = SharedSymbolManager::default();
    let tree = compilation_unit(vec![class("Guard", 0).ends(6).body(vec![
        method("void", "run", 1).ends(5).body(vec![
            try_stmt(2, 3, vec![call("work", 2, 10, vec![])]),
            catch_clause("Exception", "e", 3, 4, vec![]),
        ]),
    ])]);
    let table = index(&manager, "file:///Guard.cls", &tree);

    assert!(run(&UnusedVariableValidator, &manager, &table).await.is_empty());
}
