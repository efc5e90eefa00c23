//! Foundation types for the apexls toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Position`], [`Range`] - 0-indexed line/column positions for symbols and references
//! - [`Location`] - the dual symbol/identifier range carried by every symbol
//! - Language constants (reserved words, built-in classes, primitives)
//!
//! This module has NO dependencies on other apexls modules.

pub mod constants;
mod position;

pub use position::{Location, Position, Range};
