//! Per-symbol code metrics derived from the graph.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::base::constants::DEPRECATED_ANNOTATION;
use crate::semantic::graphs::{ReferenceType, SymbolGraph};
use crate::semantic::symbol_table::{Symbol, SymbolId, Visibility};

use super::impact::analyze_impact;

/// Incoming usages from which a symbol counts as a hotspot.
const HOTSPOT_USAGES: usize = 10;
/// Outgoing dependencies from which a symbol counts as a hub.
const HUB_DEPENDENCIES: usize = 10;
/// Half-saturation point of [`normalize`].
const NORMALIZATION_MIDPOINT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStage {
    Active,
    Experimental,
    Legacy,
    Deprecated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UsagePattern {
    /// Nothing references it
    Unused,
    /// Many incoming usages
    Hotspot,
    /// Many outgoing dependencies
    Hub,
    /// Depends on nothing
    Leaf,
    /// Extended or implemented by other types
    InheritanceRoot,
    /// Only referenced from test code
    TestOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMetrics {
    pub symbol: SymbolId,
    pub cyclomatic_complexity: u32,
    pub inheritance_depth: usize,
    /// Afferent plus efferent coupling, in `[0, 1)`
    pub coupling_score: f64,
    /// Direct plus indirect impact, in `[0, 1)`
    pub impact_score: f64,
    pub refactoring_risk: f64,
    pub reference_count: usize,
    pub usage_patterns: Vec<UsagePattern>,
    pub lifecycle: LifecycleStage,
}

/// Map a non-negative count onto `[0, 1)`.
fn normalize(count: usize) -> f64 {
    let count = count as f64;
    count / (count + NORMALIZATION_MIDPOINT)
}

pub fn compute_metrics(
    graph: &SymbolGraph,
    id: &SymbolId,
    impact_depth: usize,
    max_inheritance_depth: usize,
) -> Option<SymbolMetrics> {
    let symbol = graph.get(id)?;

    let usages = graph
        .incoming(id, None)
        .into_iter()
        .filter(|edge| !edge.reference_type.is_structural())
        .collect::<Vec<_>>();
    let dependencies = graph
        .outgoing(id, None)
        .into_iter()
        .filter(|edge| !edge.reference_type.is_structural())
        .collect::<Vec<_>>();

    let afferent = usages.iter().map(|edge| &edge.source).collect::<FxHashSet<_>>();
    let efferent = dependencies
        .iter()
        .map(|edge| &edge.target)
        .collect::<FxHashSet<_>>();

    let impact = analyze_impact(graph, id, impact_depth);
    let total_impact = impact.as_ref().map_or(0, |impact| impact.total_impact());
    let impact_score = normalize(total_impact);
    let inheritance_depth = inheritance_depth(graph, id, max_inheritance_depth);

    let is_inherited = usages.iter().any(|edge| edge.reference_type.is_inheritance());
    let mut usage_patterns = Vec::new();
    if usages.is_empty() && !symbol.is_scope() {
        usage_patterns.push(UsagePattern::Unused);
    }
    if usages.len() >= HOTSPOT_USAGES {
        usage_patterns.push(UsagePattern::Hotspot);
    }
    if efferent.len() >= HUB_DEPENDENCIES {
        usage_patterns.push(UsagePattern::Hub);
    }
    if dependencies.is_empty() {
        usage_patterns.push(UsagePattern::Leaf);
    }
    if is_inherited {
        usage_patterns.push(UsagePattern::InheritanceRoot);
    }
    if !usages.is_empty()
        && usages
            .iter()
            .all(|edge| is_test_code(graph, &edge.source))
    {
        usage_patterns.push(UsagePattern::TestOnly);
    }

    Some(SymbolMetrics {
        symbol: id.clone(),
        cyclomatic_complexity: cyclomatic_complexity(graph, &symbol),
        inheritance_depth,
        coupling_score: normalize(afferent.len() + efferent.len()),
        impact_score,
        refactoring_risk: refactoring_risk(
            &symbol,
            impact_score,
            is_inherited,
            inheritance_depth as f64 / max_inheritance_depth.max(1) as f64,
        ),
        reference_count: usages.len(),
        usage_patterns,
        lifecycle: lifecycle(&symbol, usages.len()),
    })
}

/// One plus the number of branching scopes in a method body; for a type, the sum
/// over its methods.
pub fn cyclomatic_complexity(graph: &SymbolGraph, symbol: &Symbol) -> u32 {
    if symbol.kind.is_method_like() {
        return 1 + count_branches(graph, &symbol.id);
    }
    if symbol.kind.is_type() {
        let methods = structural_descendants(graph, &symbol.id)
            .into_iter()
            .filter_map(|id| graph.get(&id))
            .filter(|member| member.kind.is_method_like())
            .collect::<Vec<_>>();
        return methods
            .iter()
            .map(|method| 1 + count_branches(graph, &method.id))
            .sum::<u32>()
            .max(1);
    }
    1
}

fn count_branches(graph: &SymbolGraph, id: &SymbolId) -> u32 {
    structural_descendants(graph, id)
        .into_iter()
        .filter_map(|id| graph.get(&id))
        .filter(|descendant| descendant.scope_kind().is_some_and(|kind| kind.is_branch()))
        .count() as u32
}

/// Everything below `id` along containment edges.
fn structural_descendants(graph: &SymbolGraph, id: &SymbolId) -> Vec<SymbolId> {
    graph.reach(id, None, |graph, node| {
        graph
            .outgoing(node, None)
            .into_iter()
            .filter(|edge| edge.reference_type.is_structural())
            .map(|edge| edge.target)
            .collect()
    })
}

/// Length of the `extends` chain above a symbol, capped at `max_depth`.
pub fn inheritance_depth(graph: &SymbolGraph, id: &SymbolId, max_depth: usize) -> usize {
    let mut depth = 0;
    let mut seen = FxHashSet::default();
    let mut current = id.clone();
    seen.insert(current.clone());
    while depth < max_depth {
        let next = graph
            .outgoing(&current, Some(ReferenceType::Inheritance))
            .into_iter()
            .map(|edge| edge.target)
            .next();
        match next {
            Some(parent) if seen.insert(parent.clone()) => {
                depth += 1;
                current = parent;
            }
            _ => break,
        }
    }
    depth
}

fn refactoring_risk(
    symbol: &Symbol,
    impact_score: f64,
    is_inherited: bool,
    relative_depth: f64,
) -> f64 {
    let visibility = match symbol.modifiers.visibility {
        Visibility::Global => 1.0,
        Visibility::Public => 0.8,
        Visibility::Protected => 0.5,
        Visibility::Private | Visibility::Default => 0.2,
    };
    let inheritance = if is_inherited { 1.0 } else { relative_depth };
    let modifiers = symbol.modifiers;
    let modifier = if modifiers.is_abstract
        || modifiers.is_virtual
        || modifiers.is_override
        || modifiers.is_web_service
    {
        1.0
    } else if modifiers.is_static {
        0.5
    } else {
        0.0
    };
    visibility * 0.3 + impact_score * 0.3 + inheritance * 0.2 + modifier * 0.2
}

fn lifecycle(symbol: &Symbol, reference_count: usize) -> LifecycleStage {
    let name = symbol.name.to_lowercase();
    let deprecated = symbol
        .annotations
        .iter()
        .any(|annotation| annotation.is_named(DEPRECATED_ANNOTATION));
    if deprecated || name.contains("deprecated") {
        LifecycleStage::Deprecated
    } else if name.contains("legacy") || name.starts_with("old") || name.ends_with("_old") {
        LifecycleStage::Legacy
    } else if ["experimental", "beta", "draft", "prototype"]
        .iter()
        .any(|marker| name.contains(marker))
        || (reference_count == 0 && !symbol.is_scope() && !symbol.kind.is_type())
    {
        LifecycleStage::Experimental
    } else {
        LifecycleStage::Active
    }
}

/// Whether a symbol is a test method or lives in one, or in a test class.
fn is_test_code(graph: &SymbolGraph, id: &SymbolId) -> bool {
    let mut current = graph.get(id);
    let mut hops = 0;
    while let Some(symbol) = current {
        if symbol.modifiers.is_test_method || symbol.annotations.iter().any(|a| a.is_test()) {
            return true;
        }
        hops += 1;
        if hops > 64 {
            return false;
        }
        current = symbol.parent_id.as_ref().and_then(|parent| graph.get(parent));
    }
    false
}
