// paramcheck-core/src/domain/condition/evaluator.rs

use crate::domain::condition::ast::{Comparator, ConditionNode};
use crate::domain::error::DomainError;
use crate::domain::group::ParameterContext;
use crate::domain::value::{ParameterValue, Scalar};

/// A comparison leaf that did not hold, with the value actually configured.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedComparison {
    pub param: String,
    pub operator: Comparator,
    pub literal: ParameterValue,
    pub actual: Option<ParameterValue>,
}

/// Evaluates a condition against a parameter context.
///
/// A parameter absent from the context makes every comparison on it `false`,
/// `!=` included. Connectives short-circuit left to right.
pub fn evaluate(node: &ConditionNode, ctx: &ParameterContext) -> Result<bool, DomainError> {
    match node {
        ConditionNode::Comparison {
            param,
            operator,
            literal,
        } => match ctx.get(param) {
            Some(actual) => compare(param, *operator, actual, literal),
            None => Ok(false),
        },
        ConditionNode::And { left, right } => Ok(evaluate(left, ctx)? && evaluate(right, ctx)?),
        ConditionNode::Or { left, right } => Ok(evaluate(left, ctx)? || evaluate(right, ctx)?),
    }
}

/// Lists the leaves responsible for `node` being false: for `and`, the failing
/// side(s); for `or`, every side. Returns nothing when the node holds.
pub fn failed_comparisons(
    node: &ConditionNode,
    ctx: &ParameterContext,
) -> Result<Vec<FailedComparison>, DomainError> {
    let mut failures = Vec::new();
    collect_failures(node, ctx, &mut failures)?;
    Ok(failures)
}

fn collect_failures(
    node: &ConditionNode,
    ctx: &ParameterContext,
    failures: &mut Vec<FailedComparison>,
) -> Result<(), DomainError> {
    if evaluate(node, ctx)? {
        return Ok(());
    }
    match node {
        ConditionNode::Comparison {
            param,
            operator,
            literal,
        } => failures.push(FailedComparison {
            param: param.clone(),
            operator: *operator,
            literal: literal.clone(),
            actual: ctx.get(param).cloned(),
        }),
        ConditionNode::And { left, right } | ConditionNode::Or { left, right } => {
            collect_failures(left, ctx, failures)?;
            collect_failures(right, ctx, failures)?;
        }
    }
    Ok(())
}

fn compare(
    param: &str,
    operator: Comparator,
    actual: &ParameterValue,
    literal: &ParameterValue,
) -> Result<bool, DomainError> {
    if operator.is_ordering() {
        return Ok(match (actual, literal) {
            (ParameterValue::Scalar(a), ParameterValue::Scalar(b)) => compare_numbers(operator, a, b),
            _ => false,
        });
    }

    let equal = match (actual, literal) {
        (ParameterValue::Scalar(a), ParameterValue::Scalar(b)) => a.loosely_equals(b),
        (ParameterValue::Multi(a), ParameterValue::Multi(b)) => a.satisfies(b),
        (ParameterValue::Scalar(a), ParameterValue::Multi(b)) => a.text() == b.to_string(),
        (ParameterValue::Multi(_), ParameterValue::Scalar(b)) => {
            return Err(DomainError::UnsupportedComparison {
                parameter: param.to_string(),
                operator: operator.to_string(),
                literal: b.to_string(),
            });
        }
    };

    Ok(match operator {
        Comparator::Ne => !equal,
        _ => equal,
    })
}

fn compare_numbers(operator: Comparator, actual: &Scalar, literal: &Scalar) -> bool {
    let (Some(a), Some(b)) = (actual.as_number(), literal.as_number()) else {
        return false;
    };
    match operator {
        Comparator::Gt => a > b,
        Comparator::Lt => a < b,
        Comparator::Ge => a >= b,
        Comparator::Le => a <= b,
        Comparator::Eq => a == b,
        Comparator::Ne => a != b,
    }
}
