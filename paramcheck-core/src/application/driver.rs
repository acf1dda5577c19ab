// paramcheck-core/src/application/driver.rs

use crate::application::executor::{ExecutionOutcome, RuleExecutor};
use crate::application::report::ValidationReport;
use crate::domain::finding::ValidationError;
use crate::domain::group::MoGroup;
use crate::domain::knowledge::KnowledgeBase;
use crate::domain::project::InstanceScope;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, instrument, warn};

/// Which part of the data a run covers.
#[derive(Debug, Clone, Default)]
pub struct ValidationScope {
    pub instance_scope: InstanceScope,
    pub mo: Option<String>,
    pub instance: Option<String>,
}

pub struct ValidationDriver<'kb> {
    kb: &'kb KnowledgeBase,
}

impl<'kb> ValidationDriver<'kb> {
    pub fn new(kb: &'kb KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Findings of every rule of `mo_name` against the groups of one instance.
    /// Nothing is evaluated until the result is iterated, and iterating again
    /// recomputes from the same inputs.
    pub fn check_parameter_validation<'a>(
        &self,
        groups: &'a [MoGroup],
        mo_name: &'a str,
        instance_key: &'a str,
    ) -> ParameterValidation<'a>
    where
        'kb: 'a,
    {
        let has_rules = self.kb.has_rules(mo_name);
        if !has_rules {
            warn!(mo = mo_name, "MO has no validation rules");
        }
        ParameterValidation {
            kb: self.kb,
            groups: groups
                .iter()
                .filter(|g| g.mo_name == mo_name && g.instance_key == instance_key)
                .collect(),
            mo_name,
            instance_key,
            has_rules,
        }
    }

    /// Runs every MO with rules against every instance in scope.
    #[instrument(skip_all, fields(groups = groups.len()))]
    pub fn validate_all(&self, groups: &[MoGroup], scope: &ValidationScope) -> ValidationReport {
        let in_scope = |mo: &str| scope.mo.as_deref().is_none_or(|wanted| wanted == mo);

        let data_mos: BTreeSet<&str> = groups.iter().map(|g| g.mo_name.as_str()).collect();
        for mo in data_mos {
            if in_scope(mo) && !self.kb.has_rules(mo) {
                warn!(mo, "MO has no validation rules, its data is not checked");
            }
        }

        // A run narrowed to one MO only covers the instances that MO's table has.
        let keyed = groups.iter().filter(|g| in_scope(&g.mo_name));
        let instances: Vec<&str> = instance_keys(keyed, scope.instance_scope)
            .into_iter()
            .filter(|key| scope.instance.as_deref().is_none_or(|wanted| wanted == *key))
            .collect();
        let rule_mos: Vec<&str> = self.kb.mo_names_with_rules().filter(|mo| in_scope(*mo)).collect();

        let mut report = ValidationReport::default();
        report.stats.instances = instances.len();
        for instance in &instances {
            for mo in &rule_mos {
                for outcome in self.check_parameter_validation(groups, mo, instance).outcomes() {
                    report.absorb(outcome);
                }
            }
        }

        info!(
            instances = report.stats.instances,
            findings = report.findings.len(),
            diagnostics = report.diagnostics.len(),
            "Validation finished"
        );
        report
    }
}

/// Instance keys a run covers: all keys seen, or only those every MO table has.
fn instance_keys<'g>(
    groups: impl IntoIterator<Item = &'g MoGroup>,
    scope: InstanceScope,
) -> BTreeSet<&'g str> {
    let mut per_mo: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for group in groups {
        per_mo
            .entry(group.mo_name.as_str())
            .or_default()
            .insert(group.instance_key.as_str());
    }

    match scope {
        InstanceScope::All => per_mo.into_values().flatten().collect(),
        InstanceScope::Common => {
            let mut tables = per_mo.into_values();
            let Some(first) = tables.next() else {
                return BTreeSet::new();
            };
            tables.fold(first, |acc, keys| acc.intersection(&keys).copied().collect())
        }
    }
}

/// Lazy result of [`ValidationDriver::check_parameter_validation`].
pub struct ParameterValidation<'a> {
    kb: &'a KnowledgeBase,
    groups: Vec<&'a MoGroup>,
    mo_name: &'a str,
    instance_key: &'a str,
    has_rules: bool,
}

impl<'a> ParameterValidation<'a> {
    /// One outcome per matching group. When the MO has rules but the instance
    /// has no data for it, a single outcome carries the `SYSTEM` finding.
    pub fn outcomes(&self) -> impl Iterator<Item = ExecutionOutcome> + '_ {
        let executor = RuleExecutor::new(self.kb);
        let missing = (self.has_rules && self.groups.is_empty()).then(|| ExecutionOutcome {
            findings: vec![ValidationError::missing_data(self.mo_name, self.instance_key)],
            ..ExecutionOutcome::default()
        });
        let groups = if self.has_rules { self.groups.as_slice() } else { &[] };

        missing
            .into_iter()
            .chain(groups.iter().map(move |group| executor.execute(group)))
    }

    /// Findings in rule-execution order.
    pub fn findings(&self) -> impl Iterator<Item = ValidationError> + '_ {
        self.outcomes().flat_map(|outcome| outcome.findings)
    }

    /// Evaluates everything at once into run statistics.
    pub fn run(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        report.stats.instances = 1;
        for outcome in self.outcomes() {
            report.absorb(outcome);
        }
        report
    }
}
