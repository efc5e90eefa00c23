//! Change-impact analysis: who is affected if a symbol changes.

use std::fmt;

use serde::Serialize;

use crate::semantic::graphs::{ReferenceType, SymbolGraph};
use crate::semantic::symbol_table::SymbolId;

/// Upper bound (inclusive) of total impact classified as low risk.
pub const LOW_RISK_MAX: usize = 5;
/// Upper bound (inclusive) of total impact classified as medium risk.
pub const MEDIUM_RISK_MAX: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn classify(total_impact: usize) -> Self {
        match total_impact {
            0..=LOW_RISK_MAX => Self::Low,
            n if n <= MEDIUM_RISK_MAX => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BreakingChangeKind {
    /// Public or global: callers outside the project may depend on it
    PublicApi,
    /// Implemented by other types
    InterfaceContract,
    /// Extended by other types
    Inheritance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakingChange {
    pub kind: BreakingChangeKind,
    pub description: String,
    /// Symbols on the other side of the relationship
    pub affected: Vec<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub symbol: SymbolId,
    pub direct_impact: Vec<SymbolId>,
    pub indirect_impact: Vec<SymbolId>,
    pub risk: RiskLevel,
    pub breaking_changes: Vec<BreakingChange>,
}

impl ImpactAnalysis {
    pub fn total_impact(&self) -> usize {
        self.direct_impact.len() + self.indirect_impact.len()
    }
}

/// Impact of changing `id`, expanding dependents breadth-first up to `depth` levels.
pub fn analyze_impact(graph: &SymbolGraph, id: &SymbolId, depth: usize) -> Option<ImpactAnalysis> {
    let symbol = graph.get(id)?;

    let dependents = |graph: &SymbolGraph, node: &SymbolId| {
        graph
            .incoming(node, None)
            .into_iter()
            .filter(|edge| !edge.reference_type.is_structural())
            .map(|edge| edge.source)
            .collect::<Vec<_>>()
    };

    let direct_impact = graph.reach(id, Some(1), dependents);
    let indirect_impact = graph
        .reach(id, Some(depth.max(1)), dependents)
        .into_iter()
        .filter(|other| !direct_impact.contains(other))
        .collect::<Vec<_>>();

    let mut breaking_changes = Vec::new();
    if symbol.modifiers.visibility.is_exposed() {
        breaking_changes.push(BreakingChange {
            kind: BreakingChangeKind::PublicApi,
            description: format!(
                "{} is {} and may be used outside this project",
                symbol.name,
                symbol.modifiers.visibility.keyword().unwrap_or("exposed")
            ),
            affected: direct_impact.clone(),
        });
    }
    for (reference_type, kind, verb) in [
        (
            ReferenceType::InterfaceImplementation,
            BreakingChangeKind::InterfaceContract,
            "implemented",
        ),
        (
            ReferenceType::Inheritance,
            BreakingChangeKind::Inheritance,
            "extended",
        ),
    ] {
        let affected = graph
            .incoming(id, Some(reference_type))
            .into_iter()
            .map(|edge| edge.source)
            .collect::<Vec<_>>();
        if !affected.is_empty() {
            breaking_changes.push(BreakingChange {
                kind,
                description: format!("{} is {} by {} type(s)", symbol.name, verb, affected.len()),
                affected,
            });
        }
    }

    let risk = RiskLevel::classify(direct_impact.len() + indirect_impact.len());
    Some(ImpactAnalysis {
        symbol: id.clone(),
        direct_impact,
        indirect_impact,
        risk,
        breaking_changes,
    })
}
