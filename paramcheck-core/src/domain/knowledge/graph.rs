// paramcheck-core/src/domain/knowledge/graph.rs

use crate::domain::error::DomainError;
use crate::domain::knowledge::rule::ValidationRule;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Subsequent-rule links between the rules of one MO.
pub struct RuleGraph {
    mo_name: String,
    nodes: BTreeSet<String>,
    next: BTreeMap<String, String>,
    dangling: Vec<DomainError>,
}

impl RuleGraph {
    /// Builds the graph of `mo_name`'s rules. Links pointing outside the MO
    /// are kept aside as `UnknownRule` defects.
    pub fn build<'a>(mo_name: &str, rules: impl IntoIterator<Item = &'a ValidationRule>) -> Self {
        let rules: Vec<&ValidationRule> = rules.into_iter().collect();
        let nodes: BTreeSet<String> = rules.iter().map(|r| r.rule_id.clone()).collect();

        let mut next = BTreeMap::new();
        let mut dangling = Vec::new();
        for rule in &rules {
            let Some(target) = rule.subsequent_rule.as_deref() else {
                continue;
            };
            if nodes.contains(target) {
                next.insert(rule.rule_id.clone(), target.to_string());
            } else {
                dangling.push(DomainError::UnknownRule {
                    rule_id: target.to_string(),
                    referenced_by: rule.rule_id.clone(),
                });
            }
        }

        Self {
            mo_name: mo_name.to_string(),
            nodes,
            next,
            dangling,
        }
    }

    pub fn dangling(&self) -> &[DomainError] {
        &self.dangling
    }

    /// Layered topological order of the chains: layer N holds the rules whose
    /// predecessors all sit in layers 0..N-1. Fails on the first cycle found.
    pub fn layers(&self) -> Result<Vec<Vec<String>>, DomainError> {
        let mut in_degree: BTreeMap<&str, usize> =
            self.nodes.iter().map(|n| (n.as_str(), 0)).collect();
        for target in self.next.values() {
            if let Some(degree) = in_degree.get_mut(target.as_str()) {
                *degree += 1;
            }
        }

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();

        let mut layers = Vec::new();
        let mut resolved = 0;
        while !queue.is_empty() {
            let mut layer = Vec::new();
            for _ in 0..queue.len() {
                let Some(current) = queue.pop_front() else {
                    break;
                };
                layer.push(current.to_string());
                resolved += 1;

                if let Some(target) = self.next.get(current)
                    && let Some(degree) = in_degree.get_mut(target.as_str())
                {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(target.as_str());
                    }
                }
            }
            layers.push(layer);
        }

        if resolved != self.nodes.len() {
            let stuck = in_degree
                .iter()
                .find(|(_, degree)| **degree > 0)
                .map(|(name, _)| *name);
            return Err(DomainError::RuleGraphCycle {
                mo_name: self.mo_name.clone(),
                path: stuck.map(|start| self.cycle_from(start)).unwrap_or_default(),
            });
        }

        Ok(layers)
    }

    /// Every distinct cycle, each reported once starting at its smallest rule ID.
    pub fn cycles(&self) -> Vec<DomainError> {
        let mut seen = BTreeSet::new();
        let mut cycles = Vec::new();
        for start in &self.nodes {
            let path = self.cycle_from(start);
            if path.is_empty() {
                continue;
            }
            let members: BTreeSet<String> = path.iter().cloned().collect();
            let Some(first) = members.iter().next().cloned() else {
                continue;
            };
            if seen.insert(first.clone()) {
                cycles.push(DomainError::RuleGraphCycle {
                    mo_name: self.mo_name.clone(),
                    path: self.cycle_from(&first),
                });
            }
        }
        cycles
    }

    /// Follows links from `start`. When the walk closes a loop, returns the
    /// loop itself, first rule repeated at the end. Empty when the chain ends.
    fn cycle_from(&self, start: &str) -> Vec<String> {
        let mut path: Vec<&str> = vec![start];
        let mut current = start;
        while let Some(target) = self.next.get(current) {
            if let Some(pos) = path.iter().position(|p| *p == target.as_str()) {
                let mut cycle: Vec<String> = path[pos..].iter().map(|s| s.to_string()).collect();
                cycle.push(target.clone());
                return cycle;
            }
            path.push(target.as_str());
            current = target.as_str();
        }
        Vec::new()
    }
}
