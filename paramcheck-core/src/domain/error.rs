// paramcheck-core/src/domain/error.rs

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum DomainError {
    #[error("Syntax error at position {position}: expected {expected}")]
    #[diagnostic(
        code(paramcheck::domain::syntax),
        help("Conditions look like `(name=value and other>3) or flag!=off`.")
    )]
    SyntaxError {
        #[source_code]
        expression: String,
        position: usize,
        expected: String,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("Malformed multi-value '{token}': {reason}")]
    #[diagnostic(
        code(paramcheck::domain::multi_value),
        help("Multi-value parameters are encoded as `key:value&key:value` with unique keys.")
    )]
    MalformedMultiValue { token: String, reason: String },

    #[error("Unsupported comparison: '{parameter}' {operator} '{literal}'")]
    #[diagnostic(
        code(paramcheck::domain::unsupported_comparison),
        help("A multi-value parameter can only be compared against a `key:value&...` literal.")
    )]
    UnsupportedComparison {
        parameter: String,
        operator: String,
        literal: String,
    },

    #[error("Rule graph cycle in MO '{mo_name}': {}", .path.join(" -> "))]
    #[diagnostic(
        code(paramcheck::domain::cycle),
        help("Check the subsequent-rule column of the rules listed.")
    )]
    RuleGraphCycle { mo_name: String, path: Vec<String> },

    #[error("Duplicate rule ID '{0}'")]
    #[diagnostic(code(paramcheck::domain::duplicate_rule))]
    DuplicateRule(String),

    #[error("Rule '{referenced_by}' references unknown subsequent rule '{rule_id}'")]
    #[diagnostic(code(paramcheck::domain::unknown_rule))]
    UnknownRule {
        rule_id: String,
        referenced_by: String,
    },

    #[error("Invalid rule '{rule_id}': {reason}")]
    #[diagnostic(code(paramcheck::domain::invalid_rule))]
    InvalidRule { rule_id: String, reason: String },
}

impl DomainError {
    pub fn syntax(expression: &str, position: usize, expected: impl Into<String>) -> Self {
        let position = position.min(expression.len());
        Self::SyntaxError {
            expression: expression.to_string(),
            position,
            expected: expected.into(),
            span: SourceSpan::from((position, 0)),
        }
    }

    pub fn invalid_rule(rule_id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule_id: rule_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Short stable label used in text reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SyntaxError { .. } => "syntax-error",
            Self::MalformedMultiValue { .. } => "malformed-multi-value",
            Self::UnsupportedComparison { .. } => "unsupported-comparison",
            Self::RuleGraphCycle { .. } => "rule-graph-cycle",
            Self::DuplicateRule(_) => "duplicate-rule",
            Self::UnknownRule { .. } => "unknown-rule",
            Self::InvalidRule { .. } => "invalid-rule",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_position_is_clamped() {
        let err = DomainError::syntax("a=1", 42, ")");
        match err {
            DomainError::SyntaxError { position, .. } => assert_eq!(position, 3),
            other => panic!("Expected SyntaxError, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_message_lists_path() {
        let err = DomainError::RuleGraphCycle {
            mo_name: "NRDUCELL".into(),
            path: vec!["R1".into(), "R2".into(), "R1".into()],
        };
        assert_eq!(
            err.to_string(),
            "Rule graph cycle in MO 'NRDUCELL': R1 -> R2 -> R1"
        );
        assert_eq!(err.kind(), "rule-graph-cycle");
    }
}
