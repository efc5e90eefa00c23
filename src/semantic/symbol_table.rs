//! Per-file symbol table: symbols, scope tree and recorded name usages.
mod lookup;
mod modifiers;
mod references;
mod serialize;
mod symbol;
mod table;
mod type_info;

pub use modifiers::{
    Annotation, AnnotationParameter, ModifierOutcome, Modifiers, Sharing, Visibility,
};
pub use references::{AccessType, HierarchicalReference, ReferenceContext, TypeReference};
pub use symbol::{
    ParameterInfo, ScopeKind, Symbol, SymbolDetails, SymbolId, SymbolKey, SymbolKind,
    parameter_signature,
};
pub use table::SymbolTable;
pub use type_info::TypeInfo;

#[cfg(test)]
mod tests;
