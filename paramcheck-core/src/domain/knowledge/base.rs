// paramcheck-core/src/domain/knowledge/base.rs

use crate::domain::error::DomainError;
use crate::domain::finding::EngineDiagnostic;
use crate::domain::knowledge::definition::{ParameterDefinition, ParameterType};
use crate::domain::knowledge::graph::RuleGraph;
use crate::domain::knowledge::rule::{CompiledRule, ValidationRule};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// A rule as stored in the knowledge base: the authored row, its position in
/// the rule table, and the outcome of compiling it.
#[derive(Debug, Clone)]
pub struct RuleEntry {
    pub rule: ValidationRule,
    pub row: usize,
    pub compiled: Result<CompiledRule, DomainError>,
}

impl RuleEntry {
    pub fn id(&self) -> &str {
        &self.rule.rule_id
    }
}

/// Read-only reference data for a validation run.
///
/// Rules live in an arena indexed by rule ID; each MO keeps its rules sorted
/// by (execution order, table row).
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    definitions: BTreeMap<String, BTreeMap<String, ParameterDefinition>>,
    rules: Vec<RuleEntry>,
    by_id: HashMap<String, usize>,
    by_mo: BTreeMap<String, Vec<usize>>,
}

impl KnowledgeBase {
    pub fn new(
        definitions: Vec<ParameterDefinition>,
        rules: Vec<ValidationRule>,
    ) -> Result<Self, DomainError> {
        let mut kb = KnowledgeBase::default();

        for def in definitions {
            let per_mo = kb.definitions.entry(def.mo_name.clone()).or_default();
            if per_mo.contains_key(&def.parameter_name) {
                warn!(
                    "Duplicate definition of '{}' in MO '{}', keeping the last one",
                    def.parameter_name, def.mo_name
                );
            }
            per_mo.insert(def.parameter_name.clone(), def);
        }

        for (row, rule) in rules.into_iter().enumerate() {
            if kb.by_id.contains_key(&rule.rule_id) {
                return Err(DomainError::DuplicateRule(rule.rule_id));
            }
            let compiled = rule.compile(|name| kb.parameter_type(&rule.mo_name, name));
            let index = kb.rules.len();
            kb.by_id.insert(rule.rule_id.clone(), index);
            kb.by_mo.entry(rule.mo_name.clone()).or_default().push(index);
            kb.rules.push(RuleEntry {
                rule,
                row,
                compiled,
            });
        }

        for indices in kb.by_mo.values_mut() {
            indices.sort_by_key(|&i| (kb.rules[i].rule.execution_order, kb.rules[i].row));
        }

        Ok(kb)
    }

    pub fn definition(&self, mo_name: &str, parameter: &str) -> Option<&ParameterDefinition> {
        self.definitions.get(mo_name)?.get(parameter)
    }

    pub fn definitions_for(&self, mo_name: &str) -> impl Iterator<Item = &ParameterDefinition> {
        self.definitions.get(mo_name).into_iter().flat_map(|m| m.values())
    }

    pub fn parameter_type(&self, mo_name: &str, parameter: &str) -> Option<ParameterType> {
        self.definition(mo_name, parameter).map(|d| d.parameter_type)
    }

    pub fn rule(&self, rule_id: &str) -> Option<&RuleEntry> {
        self.by_id.get(rule_id).map(|&i| &self.rules[i])
    }

    /// Rules of one MO in traversal order.
    pub fn rules_for(&self, mo_name: &str) -> impl Iterator<Item = &RuleEntry> {
        self.by_mo
            .get(mo_name)
            .into_iter()
            .flatten()
            .map(|&i| &self.rules[i])
    }

    pub fn has_rules(&self, mo_name: &str) -> bool {
        self.by_mo.contains_key(mo_name)
    }

    pub fn mo_names_with_rules(&self) -> impl Iterator<Item = &str> {
        self.by_mo.keys().map(String::as_str)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn parameter_count(&self) -> usize {
        self.definitions.values().map(BTreeMap::len).sum()
    }

    /// Rule graph of one MO, for chain analysis.
    pub fn graph(&self, mo_name: &str) -> RuleGraph {
        RuleGraph::build(mo_name, self.rules_for(mo_name).map(|e| &e.rule))
    }

    /// Load-time defects: rules that failed to compile, dangling subsequent
    /// links and subsequent-rule cycles.
    pub fn defects(&self) -> Vec<EngineDiagnostic> {
        let mut defects = Vec::new();
        for mo_name in self.mo_names_with_rules() {
            for entry in self.rules_for(mo_name) {
                if let Err(error) = &entry.compiled {
                    defects.push(EngineDiagnostic::for_rule(mo_name, entry.id(), error.clone()));
                }
            }

            let graph = self.graph(mo_name);
            for error in graph.dangling() {
                let referenced_by = match error {
                    DomainError::UnknownRule { referenced_by, .. } => Some(referenced_by.as_str()),
                    _ => None,
                };
                defects.push(EngineDiagnostic {
                    mo_name: mo_name.to_string(),
                    instance_key: None,
                    rule_id: referenced_by.map(String::from),
                    error: error.clone(),
                });
            }
            for error in graph.cycles() {
                defects.push(EngineDiagnostic::for_mo(mo_name, error));
            }
        }
        defects
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::knowledge::rule::{CheckKind, Expectation, LogicalRelation};
    use crate::domain::value::ParameterValue;
    use anyhow::Result;

    fn rule(id: &str, mo: &str, order: u32) -> ValidationRule {
        ValidationRule {
            rule_id: id.into(),
            mo_name: mo.into(),
            check_kind: CheckKind::Misconfiguration,
            parameter_combination: "sw".into(),
            expected_value: "k1:on".into(),
            filter_condition: None,
            logical_relation: LogicalRelation::And,
            execution_order: order,
            subsequent_rule: None,
            description: String::new(),
        }
    }

    fn definition(mo: &str, name: &str, ty: ParameterType) -> ParameterDefinition {
        ParameterDefinition {
            mo_name: mo.into(),
            mo_description: String::new(),
            scenario: String::new(),
            parameter_name: name.into(),
            parameter_id: String::new(),
            parameter_type: ty,
            parameter_meaning: String::new(),
            value_description: String::new(),
        }
    }

    #[test]
    fn test_rules_sorted_by_order_then_row() -> Result<()> {
        let kb = KnowledgeBase::new(
            vec![],
            vec![rule("R3", "M", 2), rule("R1", "M", 1), rule("R2", "M", 1), rule("X", "N", 1)],
        )?;
        let ids: Vec<&str> = kb.rules_for("M").map(|e| e.id()).collect();
        assert_eq!(ids, vec!["R1", "R2", "R3"]);
        assert_eq!(kb.mo_names_with_rules().collect::<Vec<_>>(), vec!["M", "N"]);
        assert_eq!(kb.rules_for("unknown").count(), 0);
        assert_eq!(kb.rule_count(), 4);
        Ok(())
    }

    #[test]
    fn test_duplicate_rule_is_rejected() {
        let err = KnowledgeBase::new(vec![], vec![rule("R1", "M", 1), rule("R1", "M", 2)]).unwrap_err();
        assert_eq!(err, DomainError::DuplicateRule("R1".into()));
    }

    #[test]
    fn test_compilation_uses_definition_types() -> Result<()> {
        let kb = KnowledgeBase::new(
            vec![definition("M", "sw", ParameterType::Multiple)],
            vec![rule("R1", "M", 1), rule("R2", "OTHER", 1)],
        )?;
        let compiled = kb.rule("R1").unwrap().compiled.as_ref().unwrap();
        assert_eq!(
            compiled.expectation,
            Expectation::Values(vec![ParameterValue::multi("k1:on")?])
        );
        assert_eq!(kb.parameter_type("M", "sw"), Some(ParameterType::Multiple));
        assert_eq!(kb.parameter_type("OTHER", "sw"), None);
        Ok(())
    }

    #[test]
    fn test_later_duplicate_definition_wins() -> Result<()> {
        let kb = KnowledgeBase::new(
            vec![
                definition("M", "sw", ParameterType::Single),
                definition("M", "sw", ParameterType::Multiple),
            ],
            vec![],
        )?;
        assert_eq!(kb.parameter_count(), 1);
        assert_eq!(kb.parameter_type("M", "sw"), Some(ParameterType::Multiple));
        Ok(())
    }

    #[test]
    fn test_defects_collects_compile_and_graph_problems() -> Result<()> {
        let mut bad_filter = rule("R1", "M", 1);
        bad_filter.filter_condition = Some("(a=1".into());
        let mut r2 = rule("R2", "M", 1);
        r2.subsequent_rule = Some("R3".into());
        let mut r3 = rule("R3", "M", 2);
        r3.subsequent_rule = Some("R2".into());
        let mut r4 = rule("R4", "M", 3);
        r4.subsequent_rule = Some("NOPE".into());

        let kb = KnowledgeBase::new(vec![], vec![bad_filter, r2, r3, r4])?;
        let kinds: Vec<&str> = kb.defects().iter().map(|d| d.error.kind()).collect();
        assert_eq!(kinds, vec!["syntax-error", "unknown-rule", "rule-graph-cycle"]);
        Ok(())
    }
}
