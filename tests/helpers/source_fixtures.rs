//! Parse trees of a small order-processing workspace and a parser that serves them.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use apexls::SymbolTable;
use apexls::semantic::SymbolCollector;
use apexls::syntax::build::*;
use apexls::syntax::{DocumentParser, ParsedDocument, SyntaxError, TreeNode};

pub const BASE_URI: &str = "file:///classes/Base.cls";
pub const WIDGET_URI: &str = "file:///classes/Widget.cls";
pub const SHOP_URI: &str = "file:///classes/Shop.cls";
pub const RUNNABLE_URI: &str = "file:///classes/Runnable.cls";

/// Parser stand-in: returns the tree registered for a document text.
///
/// Text that was never registered parses to nothing with one syntax error.
#[derive(Default)]
pub struct FixtureParser {
    trees: Mutex<FxHashMap<String, (TreeNode, Vec<SyntaxError>)>>,
}

impl FixtureParser {
    pub fn register(&self, text: &str, tree: TreeNode) {
        self.register_with_errors(text, tree, Vec::new());
    }

    pub fn register_with_errors(&self, text: &str, tree: TreeNode, errors: Vec<SyntaxError>) {
        self.trees
            .lock()
            .insert(text.to_string(), (tree, errors));
    }
}

impl DocumentParser for FixtureParser {
    fn parse(&self, _uri: &str, text: &str) -> ParsedDocument {
        match self.trees.lock().get(text).cloned() {
            Some((tree, errors)) => ParsedDocument::new(tree, errors),
            None => ParsedDocument::failed(vec![SyntaxError::new(
                apexls::Range::from_coords(0, 0, 0, 1),
                "unexpected input",
            )]),
        }
    }
}

/// Document text standing in for version `version` of `uri`.
pub fn text_of(uri: &str, version: i32) -> String {
    format!("// {uri} @ {version}")
}

pub fn collect(uri: &str, tree: &TreeNode) -> SymbolTable {
    SymbolCollector::collect(tree, uri).table
}

/// ```text
/// 0 public virtual class Base {
/// 1     public virtual void submit() {
/// 2     }
/// 3 }
/// ```
pub fn base() -> TreeNode {
    compilation_unit(vec![
        class("Base", 0)
            .modifiers(&["public", "virtual"])
            .ends(3)
            .body(vec![
                method("void", "submit", 1)
                    .modifiers(&["public", "virtual"])
                    .ends(2),
            ]),
    ])
}

/// ```text
/// 0 public class Widget {
/// 1     public Integer size;
/// 2 }
/// ```
pub fn widget() -> TreeNode {
    compilation_unit(vec![
        class("Widget", 0)
            .modifiers(&["public"])
            .ends(2)
            .body(vec![field("Integer", "size", 1).modifiers(&["public"])]),
    ])
}

/// ```text
/// 0 public class Shop extends Base {
/// 1     Widget item;
/// 2     public override void submit() {
/// 3         Integer total = 0;
/// 4         total = item.size;
/// 5     }
/// 6 }
/// ```
pub fn shop() -> TreeNode {
    compilation_unit(vec![
        class("Shop", 0)
            .modifiers(&["public"])
            .extends("Base")
            .ends(6)
            .body(vec![
                field("Widget", "item", 1),
                method("void", "submit", 2)
                    .modifiers(&["public", "override"])
                    .ends(5)
                    .body(vec![
                        local_var("Integer", "total", 3),
                        assign(ident("total", 4, 8), "=", chain("item.size", 4, 16)),
                    ]),
            ]),
    ])
}

/// `public interface Runnable { void run(String input); }`
pub fn runnable() -> TreeNode {
    compilation_unit(vec![
        interface("Runnable", 0)
            .modifiers(&["public"])
            .ends(2)
            .body(vec![interface_method("void", "run", 1).param("String", "input")]),
    ])
}

/// `public class {name} implements Runnable` with or without `run(String)`.
pub fn job(name: &str, implements_run: bool) -> TreeNode {
    let members = if implements_run {
        vec![
            method("void", "run", 1)
                .modifiers(&["public"])
                .param("String", "input")
                .ends(2),
        ]
    } else {
        Vec::new()
    };
    compilation_unit(vec![
        class(name, 0)
            .modifiers(&["public"])
            .implements(&["Runnable"])
            .ends(3)
            .body(members),
    ])
}

/// `public virtual class {name} extends {base}` alone in `file:///classes/{name}.cls`.
pub fn subclass(name: &str, base: &str) -> (String, TreeNode) {
    let tree = compilation_unit(vec![
        class(name, 0)
            .modifiers(&["public", "virtual"])
            .extends(base)
            .ends(1),
    ]);
    (format!("file:///classes/{name}.cls"), tree)
}
