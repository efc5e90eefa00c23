//! Syntax: the contract with the parser collaborator.
//!
//! The grammar-driven parser lives outside this crate. It hands the semantic layer a
//! traversal of one file as typed enter/exit callbacks ([`ParseListener`]) over nodes
//! that expose only their text, their range and a few named child slots
//! ([`SyntaxNode`]).
//!
//! [`TreeNode`] is an owned implementation of both sides of the contract. Hosts that
//! convert a foreign parse tree, and the tests, build them with [`build`].

pub mod build;
mod listener;
mod node;

pub use listener::{
    Construct, DocumentParser, ParseListener, ParseTree, ParsedDocument, SyntaxError,
};
pub use node::{NodeRole, SyntaxNode, TreeNode};
