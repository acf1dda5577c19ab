// paramcheck-core/src/application/executor.rs

use crate::domain::condition::{FailedComparison, evaluate, failed_comparisons};
use crate::domain::error::DomainError;
use crate::domain::finding::{EngineDiagnostic, Mismatch, ValidationError};
use crate::domain::group::{MoGroup, ParameterContext};
use crate::domain::knowledge::{
    CheckKind, CompiledRule, Expectation, KnowledgeBase, LogicalRelation, ParamRef, RuleEntry,
};
use crate::domain::value::{ParameterValue, Scalar};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleState {
    Pending,
    Evaluating,
    /// Checked, no finding.
    Satisfied,
    /// Checked, finding emitted.
    Violated,
    /// Filter condition false: the rule does not apply.
    Skipped,
    /// Could not be evaluated; a diagnostic explains why.
    Faulted,
}

impl RuleState {
    fn follows_subsequent(self) -> bool {
        matches!(self, Self::Satisfied | Self::Violated)
    }
}

impl fmt::Display for RuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Evaluating => "evaluating",
            Self::Satisfied => "satisfied",
            Self::Violated => "violated",
            Self::Skipped => "skipped",
            Self::Faulted => "faulted",
        };
        write!(f, "{}", s)
    }
}

/// How the traversal arrived at a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "via", rename_all = "lowercase")]
pub enum Reached {
    /// In execution order.
    Ordered,
    /// Through the subsequent-rule link of `from`.
    Subsequent { from: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTrace {
    pub rule_id: String,
    pub state: RuleState,
    pub reached: Reached,
}

/// Combined result of the sibling rules sharing one execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderVerdict {
    pub execution_order: u32,
    pub passed: bool,
}

/// Everything one traversal of one MO group produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionOutcome {
    pub findings: Vec<ValidationError>,
    pub diagnostics: Vec<EngineDiagnostic>,
    pub trace: Vec<RuleTrace>,
    pub verdicts: Vec<OrderVerdict>,
    /// Set when a rule-graph cycle stopped the traversal; findings are then discarded.
    pub aborted: bool,
}

impl ExecutionOutcome {
    /// Terminal state of a rule, `Pending` when the traversal never reached it.
    pub fn state_of(&self, rule_id: &str) -> RuleState {
        self.trace
            .iter()
            .find(|t| t.rule_id == rule_id)
            .map_or(RuleState::Pending, |t| t.state)
    }

    pub fn rules_executed(&self) -> usize {
        self.trace.len()
    }
}

/// Applies the rules of an MO to one group, borrowing the knowledge base read-only.
pub struct RuleExecutor<'kb> {
    kb: &'kb KnowledgeBase,
}

impl<'kb> RuleExecutor<'kb> {
    pub fn new(kb: &'kb KnowledgeBase) -> Self {
        Self { kb }
    }

    pub fn execute(&self, group: &MoGroup) -> ExecutionOutcome {
        let mut traversal = Traversal {
            kb: self.kb,
            group,
            ctx: group.context(self.kb),
            states: HashMap::new(),
            held: HashMap::new(),
            outcome: ExecutionOutcome::default(),
        };

        for (name, error) in traversal.ctx.malformed() {
            debug!(parameter = name, "Malformed parameter value");
            traversal
                .outcome
                .diagnostics
                .push(EngineDiagnostic::for_mo(&group.mo_name, error.clone()).at_instance(&group.instance_key));
        }

        let rules: Vec<&RuleEntry> = self.kb.rules_for(&group.mo_name).collect();
        for siblings in rules.chunk_by(|a, b| a.rule.execution_order == b.rule.execution_order) {
            if let Err(cycle) = traversal.run_order(siblings) {
                traversal.abort(cycle);
                break;
            }
        }

        let mut unclaimed: Vec<ValidationError> = traversal.held.drain().map(|(_, f)| f).collect();
        unclaimed.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
        traversal.outcome.findings.extend(unclaimed);
        traversal.outcome
    }
}

enum Evaluation {
    Skipped,
    Satisfied,
    Violated(ValidationError),
    /// A parameter the rule reads could not be parsed.
    Unavailable,
}

struct Traversal<'a> {
    kb: &'a KnowledgeBase,
    group: &'a MoGroup,
    ctx: ParameterContext,
    states: HashMap<String, RuleState>,
    /// Findings of rules reached through a chain, kept until their own
    /// execution order is combined.
    held: HashMap<String, ValidationError>,
    outcome: ExecutionOutcome,
}

impl<'a> Traversal<'a> {
    fn diagnostic(&self, rule_id: Option<&str>, error: DomainError) -> EngineDiagnostic {
        let diag = match rule_id {
            Some(id) => EngineDiagnostic::for_rule(&self.group.mo_name, id, error),
            None => EngineDiagnostic::for_mo(&self.group.mo_name, error),
        };
        diag.at_instance(&self.group.instance_key)
    }

    /// Runs one execution order: siblings first, combined by their logical
    /// relation, then the subsequent chains of the siblings that applied.
    /// Siblings already reached through a chain take part in the combination
    /// with their recorded state; their own chains were walked back then.
    fn run_order(&mut self, siblings: &[&'a RuleEntry]) -> Result<(), DomainError> {
        let mut results = Vec::new();
        let mut fresh = Vec::new();
        for &entry in siblings {
            match self.states.get(entry.id()).copied() {
                Some(state) => {
                    let finding = self.held.remove(entry.id());
                    results.push((entry, state, finding));
                }
                None => {
                    let (state, finding) = self.run_rule(entry, Reached::Ordered);
                    results.push((entry, state, finding));
                    fresh.push(entry.id());
                }
            }
        }

        let or_satisfied = results.iter().any(|(e, state, _)| {
            e.rule.logical_relation == LogicalRelation::Or && *state == RuleState::Satisfied
        });
        let or_evaluated = results.iter().any(|(e, state, _)| {
            e.rule.logical_relation == LogicalRelation::Or
                && matches!(state, RuleState::Satisfied | RuleState::Violated)
        });
        let and_passed = results.iter().all(|(e, state, _)| {
            e.rule.logical_relation == LogicalRelation::Or || *state != RuleState::Violated
        });

        if let Some(&(first, _, _)) = results.first() {
            self.outcome.verdicts.push(OrderVerdict {
                execution_order: first.rule.execution_order,
                passed: and_passed && (or_satisfied || !or_evaluated),
            });
        }

        let mut to_follow = Vec::new();
        for (entry, state, finding) in results {
            let suppressed = entry.rule.logical_relation == LogicalRelation::Or && or_satisfied;
            if let Some(finding) = finding {
                if suppressed {
                    debug!(rule = entry.id(), "Violation suppressed by a satisfied OR sibling");
                } else {
                    self.outcome.findings.push(finding);
                }
            }
            if state.follows_subsequent() && fresh.contains(&entry.id()) {
                to_follow.push(entry);
            }
        }

        for entry in to_follow {
            self.follow_chain(entry)?;
        }
        Ok(())
    }

    /// Walks the subsequent links starting after `start`. Rules already run
    /// are not run again but their links are still walked, so that a loop is
    /// detected however the traversal entered it.
    fn follow_chain(&mut self, start: &'a RuleEntry) -> Result<(), DomainError> {
        let mut path = vec![start.id().to_string()];
        let mut current = start;

        while let Some(next_id) = current.rule.subsequent_rule.as_deref() {
            if path.iter().any(|p| p == next_id) {
                path.push(next_id.to_string());
                return Err(DomainError::RuleGraphCycle {
                    mo_name: self.group.mo_name.clone(),
                    path,
                });
            }

            let Some(next) = self
                .kb
                .rule(next_id)
                .filter(|e| e.rule.mo_name == self.group.mo_name)
            else {
                let diag = self.diagnostic(
                    Some(current.id()),
                    DomainError::UnknownRule {
                        rule_id: next_id.to_string(),
                        referenced_by: current.id().to_string(),
                    },
                );
                self.outcome.diagnostics.push(diag);
                return Ok(());
            };

            let state = match self.states.get(next.id()).copied() {
                Some(state) => state,
                None => {
                    let (state, finding) = self.run_rule(
                        next,
                        Reached::Subsequent {
                            from: current.id().to_string(),
                        },
                    );
                    if let Some(finding) = finding {
                        self.held.insert(next.id().to_string(), finding);
                    }
                    state
                }
            };

            if !state.follows_subsequent() {
                return Ok(());
            }
            path.push(next.id().to_string());
            current = next;
        }
        Ok(())
    }

    fn abort(&mut self, cycle: DomainError) {
        warn!(
            mo = %self.group.mo_name,
            instance = %self.group.instance_key,
            "{}",
            cycle
        );
        self.outcome.findings.clear();
        self.held.clear();
        let diag = self.diagnostic(None, cycle);
        self.outcome.diagnostics.push(diag);
        self.outcome.aborted = true;
    }

    fn run_rule(&mut self, entry: &RuleEntry, reached: Reached) -> (RuleState, Option<ValidationError>) {
        let rule_id = entry.id();
        self.states.insert(rule_id.to_string(), RuleState::Evaluating);
        debug!(rule = rule_id, "pending -> evaluating");

        let (state, finding) = match self.evaluate_rule(entry) {
            Ok(Evaluation::Skipped) => (RuleState::Skipped, None),
            Ok(Evaluation::Satisfied) => (RuleState::Satisfied, None),
            Ok(Evaluation::Violated(finding)) => (RuleState::Violated, Some(finding)),
            Ok(Evaluation::Unavailable) => (RuleState::Faulted, None),
            Err(error) => {
                let diag = self.diagnostic(Some(rule_id), error);
                self.outcome.diagnostics.push(diag);
                (RuleState::Faulted, None)
            }
        };

        debug!(rule = rule_id, "evaluating -> {}", state);
        self.states.insert(rule_id.to_string(), state);
        self.outcome.trace.push(RuleTrace {
            rule_id: rule_id.to_string(),
            state,
            reached,
        });
        (state, finding)
    }

    fn evaluate_rule(&self, entry: &RuleEntry) -> Result<Evaluation, DomainError> {
        let compiled = entry.compiled.as_ref().map_err(Clone::clone)?;

        // Already reported once for the whole group.
        if compiled
            .referenced_parameters()
            .into_iter()
            .any(|name| self.ctx.is_malformed(name))
        {
            return Ok(Evaluation::Unavailable);
        }

        if let Some(filter) = &compiled.filter
            && !evaluate(filter, &self.ctx)?
        {
            return Ok(Evaluation::Skipped);
        }

        let mismatches = match entry.rule.check_kind {
            CheckKind::Misconfiguration => self.check_misconfiguration(compiled)?,
            CheckKind::MissingConfiguration => self.check_missing(compiled)?,
        };
        if mismatches.is_empty() {
            return Ok(Evaluation::Satisfied);
        }

        let fix_commands = match entry.rule.check_kind {
            CheckKind::Misconfiguration => self.fix_commands(&mismatches),
            CheckKind::MissingConfiguration => Vec::new(),
        };
        Ok(Evaluation::Violated(
            ValidationError::new(
                entry.id(),
                &self.group.mo_name,
                &self.group.instance_key,
                entry.rule.check_kind,
                mismatches,
            )
            .with_fix_commands(fix_commands)
            .with_rule_description(&entry.rule.description),
        ))
    }

    // --- MISCONFIGURATION ---

    fn check_misconfiguration(&self, compiled: &CompiledRule) -> Result<Vec<Mismatch>, DomainError> {
        match &compiled.expectation {
            Expectation::Unspecified => Ok(Vec::new()),
            Expectation::Condition(node) => {
                if evaluate(node, &self.ctx)? {
                    return Ok(Vec::new());
                }
                Ok(failed_comparisons(node, &self.ctx)?
                    .into_iter()
                    .map(condition_mismatch)
                    .collect())
            }
            Expectation::Values(values) => {
                let mut mismatches = Vec::new();
                for (target, expected) in compiled.targets.iter().zip(values) {
                    mismatches.extend(self.compare_target(target, expected)?);
                }
                Ok(mismatches)
            }
        }
    }

    fn compare_target(
        &self,
        target: &ParamRef,
        expected: &ParameterValue,
    ) -> Result<Vec<Mismatch>, DomainError> {
        let Some(actual) = self.ctx.get(&target.name) else {
            return Ok(vec![Mismatch::Absent {
                parameter: target.name.clone(),
                sub_key: target.sub_key.clone(),
            }]);
        };

        match (&target.sub_key, actual, expected) {
            (Some(sub), ParameterValue::Multi(have), ParameterValue::Scalar(want)) => {
                Ok(match have.get(sub) {
                    Some(value) if value.loosely_equals(want) => Vec::new(),
                    value => vec![Mismatch::SubKey {
                        parameter: target.name.clone(),
                        sub_key: sub.clone(),
                        expected: want.to_string(),
                        actual: value.map(Scalar::to_string),
                        description: self.sub_key_description(&target.name, sub),
                    }],
                })
            }
            (None, ParameterValue::Multi(have), ParameterValue::Multi(want)) => Ok(have
                .diff_against(want)
                .into_iter()
                .map(|diff| Mismatch::SubKey {
                    parameter: target.name.clone(),
                    description: self.sub_key_description(&target.name, &diff.key),
                    sub_key: diff.key,
                    expected: diff.expected.to_string(),
                    actual: diff.actual.map(|a| a.to_string()),
                })
                .collect()),
            (None, ParameterValue::Scalar(have), ParameterValue::Scalar(want)) => {
                Ok(if have.loosely_equals(want) {
                    Vec::new()
                } else {
                    vec![value_mismatch(&target.name, want.to_string(), have.to_string())]
                })
            }
            (None, ParameterValue::Scalar(have), ParameterValue::Multi(want)) => {
                let want = want.to_string();
                Ok(if have.text() == want {
                    Vec::new()
                } else {
                    vec![value_mismatch(&target.name, want, have.to_string())]
                })
            }
            _ => Err(DomainError::UnsupportedComparison {
                parameter: target.to_string(),
                operator: "=".to_string(),
                literal: expected.to_string(),
            }),
        }
    }

    fn sub_key_description(&self, parameter: &str, sub_key: &str) -> Option<String> {
        self.kb
            .definition(&self.group.mo_name, parameter)
            .and_then(|d| d.sub_key_descriptions().remove(sub_key))
    }

    // --- MISSING CONFIGURATION ---

    fn check_missing(&self, compiled: &CompiledRule) -> Result<Vec<Mismatch>, DomainError> {
        let expected_values = match &compiled.expectation {
            Expectation::Values(values) => Some(values),
            _ => None,
        };

        let mut mismatches = Vec::new();
        for (i, target) in compiled.targets.iter().enumerate() {
            let absent = |sub_key: Option<String>| Mismatch::Absent {
                parameter: target.name.clone(),
                sub_key,
            };
            match (&target.sub_key, self.ctx.get(&target.name)) {
                (_, None) => mismatches.push(absent(target.sub_key.clone())),
                (Some(sub), Some(ParameterValue::Multi(have))) => {
                    if !have.contains_key(sub) {
                        mismatches.push(absent(Some(sub.clone())));
                    }
                }
                (Some(_), Some(ParameterValue::Scalar(have))) => {
                    return Err(DomainError::UnsupportedComparison {
                        parameter: target.to_string(),
                        operator: "present".to_string(),
                        literal: have.to_string(),
                    });
                }
                (None, Some(ParameterValue::Multi(have))) => {
                    if let Some(ParameterValue::Multi(want)) =
                        expected_values.and_then(|values| values.get(i))
                    {
                        mismatches.extend(
                            want.keys()
                                .filter(|key| !have.contains_key(key))
                                .map(|key| absent(Some(key.to_string()))),
                        );
                    }
                }
                (None, Some(ParameterValue::Scalar(_))) => {}
            }
        }
        Ok(mismatches)
    }

    // --- FIX COMMANDS ---

    /// `MOD <MO>:<id>=<value>;` for scalars, `MOD <MO>:<id>=k1=v1;k2=v2;` for
    /// the differing sub-keys of a multi-value parameter.
    fn fix_commands(&self, mismatches: &[Mismatch]) -> Vec<String> {
        let mo = &self.group.mo_name;
        let mut scalar = Vec::new();
        let mut sub_keys: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for mismatch in mismatches {
            match mismatch {
                Mismatch::Value {
                    parameter,
                    expected,
                    ..
                } => scalar.push((parameter.as_str(), expected.as_str())),
                Mismatch::Condition {
                    parameter,
                    operator,
                    literal,
                    ..
                } if operator == "=" && !literal.contains(':') => {
                    scalar.push((parameter.as_str(), literal.as_str()))
                }
                Mismatch::SubKey {
                    parameter,
                    sub_key,
                    expected,
                    ..
                } => sub_keys
                    .entry(parameter.as_str())
                    .or_default()
                    .push(format!("{}={}", sub_key, expected)),
                _ => {}
            }
        }

        let mut commands: Vec<String> = scalar
            .into_iter()
            .map(|(parameter, value)| format!("MOD {}:{}={};", mo, self.command_id(parameter), value))
            .collect();
        commands.extend(sub_keys.into_iter().map(|(parameter, pairs)| {
            format!("MOD {}:{}={};", mo, self.command_id(parameter), pairs.join(";"))
        }));
        commands
    }

    fn command_id<'p>(&'p self, parameter: &'p str) -> &'p str {
        self.kb
            .definition(&self.group.mo_name, parameter)
            .map_or(parameter, |d| d.command_id())
    }
}

fn value_mismatch(parameter: &str, expected: String, actual: String) -> Mismatch {
    Mismatch::Value {
        parameter: parameter.to_string(),
        expected,
        actual,
    }
}

fn condition_mismatch(failure: FailedComparison) -> Mismatch {
    Mismatch::Condition {
        parameter: failure.param,
        operator: failure.operator.to_string(),
        literal: failure.literal.to_string(),
        actual: failure.actual.map(|a| a.to_string()),
    }
}
