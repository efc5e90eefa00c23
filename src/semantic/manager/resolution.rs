//! Ranking of candidates when a name matches more than one symbol.
//!
//! Each candidate gets a confidence in `[0, 1]`: a weighted sum of six factors,
//! each itself in `[0, 1]`. A lone candidate skips scoring.

use std::sync::Arc;

use serde::Serialize;
use smol_str::SmolStr;

use crate::semantic::graphs::{ReferenceType, SymbolGraph};
use crate::semantic::symbol_table::{Symbol, Visibility};

pub const IMPORT_WEIGHT: f64 = 0.30;
pub const NAMESPACE_WEIGHT: f64 = 0.20;
pub const SCOPE_WEIGHT: f64 = 0.15;
pub const TYPE_WEIGHT: f64 = 0.15;
pub const ACCESS_WEIGHT: f64 = 0.10;
pub const RELATIONSHIP_WEIGHT: f64 = 0.10;

/// Confidence reported when only one symbol carries the name.
pub const SINGLE_CANDIDATE_CONFIDENCE: f64 = 0.9;

/// Factor value when the context says nothing about it.
const NEUTRAL: f64 = 0.5;

/// What is known about the place a name is used.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    pub source_file: Option<SmolStr>,
    pub imports: Vec<String>,
    pub namespace: Option<String>,
    /// Enclosing scope names, outermost first
    pub scope_chain: Vec<String>,
    pub expected_type: Option<String>,
    pub parameter_types: Vec<String>,
    pub return_type: Option<String>,
    /// Least visibility the use site requires
    pub access_modifier: Option<Visibility>,
    pub relationship: Option<ReferenceType>,
}

impl ResolutionContext {
    pub fn in_file(uri: impl Into<SmolStr>) -> Self {
        Self {
            source_file: Some(uri.into()),
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_imports(mut self, imports: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.imports = imports.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scope_chain(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scope_chain = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_expected_type(mut self, type_name: impl Into<String>) -> Self {
        self.expected_type = Some(type_name.into());
        self
    }

    pub fn with_relationship(mut self, relationship: ReferenceType) -> Self {
        self.relationship = Some(relationship);
        self
    }
}

/// Per-factor scores of one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreFactors {
    pub import: f64,
    pub namespace: f64,
    pub scope: f64,
    pub type_context: f64,
    pub access: f64,
    pub relationship: f64,
}

impl ScoreFactors {
    pub fn confidence(&self) -> f64 {
        self.import * IMPORT_WEIGHT
            + self.namespace * NAMESPACE_WEIGHT
            + self.scope * SCOPE_WEIGHT
            + self.type_context * TYPE_WEIGHT
            + self.access * ACCESS_WEIGHT
            + self.relationship * RELATIONSHIP_WEIGHT
    }

    fn reasons(&self) -> Vec<&'static str> {
        let mut reasons = Vec::new();
        if self.import >= 1.0 {
            reasons.push("matches an import");
        }
        if self.namespace >= 1.0 {
            reasons.push("same namespace");
        }
        if self.scope >= 1.0 {
            reasons.push("in an enclosing scope");
        } else if self.scope > NEUTRAL {
            reasons.push("same file");
        }
        if self.type_context >= 1.0 {
            reasons.push("type fits the context");
        }
        if self.access <= 0.0 {
            reasons.push("not accessible here");
        }
        if self.relationship <= 0.0 {
            reasons.push("wrong kind for the relationship");
        }
        reasons
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub symbol: Arc<Symbol>,
    pub confidence: f64,
    pub factors: ScoreFactors,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub symbol: Arc<Symbol>,
    pub confidence: f64,
    pub justification: String,
    /// Every candidate, best first
    pub candidates: Vec<ScoredCandidate>,
}

/// Pick the best of `candidates` for a use described by `context`.
pub fn resolve_among(
    graph: &SymbolGraph,
    candidates: Vec<Arc<Symbol>>,
    context: &ResolutionContext,
) -> Option<Resolution> {
    match candidates.len() {
        0 => None,
        1 => {
            let symbol = candidates.into_iter().next()?;
            Some(Resolution {
                justification: format!(
                    "{} is the only symbol with this name",
                    symbol.qualified_name()
                ),
                candidates: vec![ScoredCandidate {
                    symbol: Arc::clone(&symbol),
                    confidence: SINGLE_CANDIDATE_CONFIDENCE,
                    factors: ScoreFactors::default(),
                }],
                confidence: SINGLE_CANDIDATE_CONFIDENCE,
                symbol,
            })
        }
        _ => {
            let mut scored = candidates
                .into_iter()
                .map(|symbol| {
                    let factors = score(graph, &symbol, context);
                    ScoredCandidate {
                        confidence: factors.confidence(),
                        factors,
                        symbol,
                    }
                })
                .collect::<Vec<_>>();
            scored.sort_by(|a, b| {
                b.confidence
                    .total_cmp(&a.confidence)
                    .then_with(|| a.symbol.id.cmp(&b.symbol.id))
            });

            let best = scored.first()?;
            let reasons = best.factors.reasons();
            let justification = format!(
                "{} chosen from {} candidates (confidence {:.2}){}",
                best.symbol.qualified_name(),
                scored.len(),
                best.confidence,
                if reasons.is_empty() {
                    String::new()
                } else {
                    format!(": {}", reasons.join(", "))
                }
            );
            Some(Resolution {
                symbol: Arc::clone(&best.symbol),
                confidence: best.confidence,
                justification,
                candidates: scored,
            })
        }
    }
}

/// Score one candidate against the context.
pub fn score(graph: &SymbolGraph, symbol: &Symbol, context: &ResolutionContext) -> ScoreFactors {
    let same_file = context
        .source_file
        .as_ref()
        .is_some_and(|uri| *uri == symbol.file_uri);
    let enclosing = enclosing_names(graph, symbol);

    ScoreFactors {
        import: import_factor(symbol, &enclosing, context),
        namespace: match (&context.namespace, &symbol.namespace) {
            (Some(wanted), Some(actual)) if wanted.eq_ignore_ascii_case(actual) => 1.0,
            (Some(_), _) => 0.0,
            (None, _) => NEUTRAL,
        },
        scope: if enclosing.iter().any(|name| {
            context
                .scope_chain
                .iter()
                .any(|scope| scope.eq_ignore_ascii_case(name))
        }) {
            1.0
        } else if same_file {
            0.75
        } else {
            0.0
        },
        type_context: type_factor(symbol, context),
        access: access_factor(symbol, same_file, context.access_modifier),
        relationship: context.relationship.map_or(NEUTRAL, |relationship| {
            if relationship.accepts_target(symbol.kind) {
                1.0
            } else {
                0.0
            }
        }),
    }
}

/// Names of the types and methods enclosing a symbol, nearest first.
fn enclosing_names(graph: &SymbolGraph, symbol: &Symbol) -> Vec<SmolStr> {
    let mut names = Vec::new();
    let mut seen = Vec::new();
    let mut current = symbol.parent_id.clone();
    while let Some(id) = current {
        if seen.contains(&id) {
            break;
        }
        let Some(parent) = graph.get(&id) else {
            break;
        };
        if parent.kind.is_type() || parent.kind.is_method_like() {
            names.push(parent.name.clone());
        }
        seen.push(id);
        current = parent.parent_id.clone();
    }
    names
}

fn import_factor(symbol: &Symbol, enclosing: &[SmolStr], context: &ResolutionContext) -> f64 {
    if context.imports.is_empty() {
        return 0.0;
    }
    let qualified = symbol.qualified_name().to_lowercase();
    let matched = context.imports.iter().any(|import| {
        let import = import.trim_end_matches(".*").to_lowercase();
        qualified == import
            || qualified.starts_with(&format!("{import}."))
            || symbol
                .namespace
                .as_ref()
                .is_some_and(|ns| ns.eq_ignore_ascii_case(&import))
            || enclosing.iter().any(|name| name.eq_ignore_ascii_case(&import))
    });
    if matched { 1.0 } else { 0.0 }
}

fn type_factor(symbol: &Symbol, context: &ResolutionContext) -> f64 {
    let mut checks = Vec::new();
    if let Some(expected) = &context.expected_type {
        let actual = symbol
            .type_info()
            .or_else(|| symbol.return_type())
            .map(|info| info.name.as_str())
            .unwrap_or(symbol.name.as_str());
        checks.push(actual.eq_ignore_ascii_case(expected));
    }
    if let Some(expected) = &context.return_type {
        checks.push(
            symbol
                .return_type()
                .is_some_and(|info| info.name.eq_ignore_ascii_case(expected)),
        );
    }
    if !context.parameter_types.is_empty() {
        let parameters = symbol.parameters();
        checks.push(
            parameters.len() == context.parameter_types.len()
                && parameters
                    .iter()
                    .zip(&context.parameter_types)
                    .all(|(param, wanted)| param.type_info.name.eq_ignore_ascii_case(wanted)),
        );
    }
    if checks.is_empty() {
        return NEUTRAL;
    }
    checks.iter().filter(|ok| **ok).count() as f64 / checks.len() as f64
}

fn visibility_rank(visibility: Visibility) -> u8 {
    match visibility {
        Visibility::Private | Visibility::Default => 0,
        Visibility::Protected => 1,
        Visibility::Public => 2,
        Visibility::Global => 3,
    }
}

fn access_factor(symbol: &Symbol, same_file: bool, required: Option<Visibility>) -> f64 {
    if same_file {
        return 1.0;
    }
    let actual = symbol.modifiers.visibility;
    match required {
        Some(required) if visibility_rank(actual) >= visibility_rank(required) => 1.0,
        Some(_) => 0.0,
        None if symbol.kind.is_type() && actual == Visibility::Default => NEUTRAL,
        None => match visibility_rank(actual) {
            0 => 0.0,
            1 => NEUTRAL,
            _ => 1.0,
        },
    }
}
