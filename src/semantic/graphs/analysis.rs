//! Cycle detection and dependency analysis over the symbol graph.
//!
//! Both ignore containment edges: a class does not "depend" on its own methods.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::symbol_graph::SymbolGraph;
use crate::semantic::symbol_table::SymbolId;

/// Direct and transitive neighbours of one symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyAnalysis {
    pub symbol: Option<SymbolId>,
    /// Symbols this one references
    pub direct_dependencies: Vec<SymbolId>,
    /// Everything reachable through outgoing edges, direct ones included
    pub transitive_dependencies: Vec<SymbolId>,
    /// Symbols referencing this one
    pub direct_dependents: Vec<SymbolId>,
    /// Everything reaching this one through incoming edges, direct ones included
    pub transitive_dependents: Vec<SymbolId>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

impl SymbolGraph {
    /// Every dependency cycle, each as the ordered list of ids along it.
    ///
    /// Cycles are reported once, rotated to start at their smallest id. Self
    /// references (direct recursion) are not reported.
    pub fn find_cycles(&self) -> Vec<Vec<SymbolId>> {
        let mut roots = self.symbols().map(|symbol| symbol.id.clone()).collect::<Vec<_>>();
        roots.sort();

        let mut state: FxHashMap<SymbolId, Visit> = FxHashMap::default();
        let mut seen: FxHashSet<Vec<SymbolId>> = FxHashSet::default();
        let mut cycles = Vec::new();

        for root in roots {
            if state.contains_key(&root) {
                continue;
            }
            let mut path = Vec::new();
            self.visit(&root, &mut state, &mut path, &mut |cycle| {
                let cycle = canonical(cycle);
                if seen.insert(cycle.clone()) {
                    cycles.push(cycle);
                }
            });
        }

        if !cycles.is_empty() {
            debug!("[GRAPH] found {} dependency cycle(s)", cycles.len());
        }
        cycles
    }

    fn visit(
        &self,
        id: &SymbolId,
        state: &mut FxHashMap<SymbolId, Visit>,
        path: &mut Vec<SymbolId>,
        report: &mut dyn FnMut(&[SymbolId]),
    ) {
        state.insert(id.clone(), Visit::InProgress);
        path.push(id.clone());

        let mut targets = self.dependency_targets(id).cloned().collect::<Vec<_>>();
        targets.sort();
        targets.dedup();

        for target in targets {
            if target == *id {
                continue;
            }
            match state.get(&target) {
                Some(Visit::InProgress) => {
                    if let Some(start) = path.iter().position(|step| *step == target) {
                        report(&path[start..]);
                    }
                }
                Some(Visit::Done) => {}
                None => self.visit(&target, state, path, report),
            }
        }

        path.pop();
        state.insert(id.clone(), Visit::Done);
    }

    /// Cycles passing through a symbol.
    pub fn cycles_through(&self, id: &SymbolId) -> Vec<Vec<SymbolId>> {
        self.find_cycles()
            .into_iter()
            .filter(|cycle| cycle.contains(id))
            .collect()
    }

    /// Direct and transitive dependencies and dependents of a symbol.
    pub fn dependency_analysis(&self, id: &SymbolId) -> DependencyAnalysis {
        if !self.contains(id) {
            return DependencyAnalysis::default();
        }
        let direct_dependencies = unique(self.dependency_targets(id).filter(|other| *other != id));
        let direct_dependents = unique(self.dependent_sources(id).filter(|other| *other != id));

        DependencyAnalysis {
            symbol: Some(id.clone()),
            transitive_dependencies: self.reach(id, None, |graph, node| {
                graph.dependency_targets(node).cloned().collect()
            }),
            transitive_dependents: self.reach(id, None, |graph, node| {
                graph.dependent_sources(node).cloned().collect()
            }),
            direct_dependencies,
            direct_dependents,
        }
    }

    /// Breadth-first expansion from `start`, optionally bounded in depth.
    ///
    /// `start` itself is never part of the result.
    pub fn reach(
        &self,
        start: &SymbolId,
        max_depth: Option<usize>,
        next: impl Fn(&Self, &SymbolId) -> Vec<SymbolId>,
    ) -> Vec<SymbolId> {
        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        visited.insert(start.clone());
        let mut queue = VecDeque::from([(start.clone(), 0usize)]);
        let mut found = Vec::new();

        while let Some((node, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            for neighbour in next(self, &node) {
                if visited.insert(neighbour.clone()) {
                    found.push(neighbour.clone());
                    queue.push_back((neighbour, depth + 1));
                }
            }
        }
        found
    }
}

/// Rotate a cycle so that it starts at its smallest id.
fn canonical(cycle: &[SymbolId]) -> Vec<SymbolId> {
    let start = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(index, _)| index)
        .unwrap_or(0);
    cycle[start..]
        .iter()
        .chain(cycle[..start].iter())
        .cloned()
        .collect()
}

fn unique<'a>(ids: impl Iterator<Item = &'a SymbolId>) -> Vec<SymbolId> {
    let mut out: Vec<SymbolId> = Vec::new();
    for id in ids {
        if !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}
