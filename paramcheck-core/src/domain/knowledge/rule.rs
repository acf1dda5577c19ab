// paramcheck-core/src/domain/knowledge/rule.rs

use crate::domain::condition::{ConditionNode, parse};
use crate::domain::error::DomainError;
use crate::domain::knowledge::definition::ParameterType;
use crate::domain::value::{ParameterValue, parse_multi_value, parse_scalar};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

const COMPARATOR_CHARS: [char; 4] = ['=', '!', '<', '>'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    /// A present parameter holds a wrong value.
    Misconfiguration,
    /// A required parameter or sub-key is not configured.
    MissingConfiguration,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Misconfiguration => "misconfiguration",
            Self::MissingConfiguration => "missing-configuration",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CheckKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "错配" | "misconfiguration" | "mismatch" => Ok(Self::Misconfiguration),
            "漏配" | "missing-configuration" | "missing_configuration" | "missing" => {
                Ok(Self::MissingConfiguration)
            }
            _ => Err(format!("Unknown check kind: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for CheckKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CheckKind::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for CheckKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// How a rule composes with its siblings at the same execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalRelation {
    #[default]
    And,
    Or,
}

impl fmt::Display for LogicalRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

impl FromStr for LogicalRelation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "" | "AND" | "且" => Ok(Self::And),
            "OR" | "或" => Ok(Self::Or),
            _ => Err(format!("Unknown logical relation: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for LogicalRelation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LogicalRelation::from_str(&s).map_err(serde::de::Error::custom)
    }
}

fn default_execution_order() -> u32 {
    1
}

/// One row of the validation-rule table, as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub rule_id: String,
    pub mo_name: String,
    pub check_kind: CheckKind,
    pub parameter_combination: String,
    #[serde(default)]
    pub expected_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_condition: Option<String>,
    #[serde(default)]
    pub logical_relation: LogicalRelation,
    #[serde(default = "default_execution_order")]
    pub execution_order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsequent_rule: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// A parameter, or one sub-key of a multi-value parameter (`name[sub_key]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamRef {
    pub name: String,
    pub sub_key: Option<String>,
}

impl ParamRef {
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("empty parameter name in combination".to_string());
        }
        match text.split_once('[') {
            None if text.contains(']') => Err(format!("unbalanced ']' in '{}'", text)),
            None => Ok(Self {
                name: text.to_string(),
                sub_key: None,
            }),
            Some((name, rest)) => {
                let sub_key = rest
                    .strip_suffix(']')
                    .ok_or_else(|| format!("missing ']' in '{}'", text))?
                    .trim();
                let name = name.trim();
                if name.is_empty() || sub_key.is_empty() || sub_key.contains(['[', ']']) {
                    return Err(format!("malformed sub-key reference '{}'", text));
                }
                Ok(Self {
                    name: name.to_string(),
                    sub_key: Some(sub_key.to_string()),
                })
            }
        }
    }
}

impl fmt::Display for ParamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub_key {
            Some(sub) => write!(f, "{}[{}]", self.name, sub),
            None => write!(f, "{}", self.name),
        }
    }
}

/// What a rule expects of its parameter combination.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// No expected value authored (valid for missing-configuration rules only).
    Unspecified,
    /// A condition expression over the group's parameters.
    Condition(ConditionNode),
    /// One expected value per combination entry, positionally.
    Values(Vec<ParameterValue>),
}

/// A rule with its textual columns parsed, ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    pub filter: Option<ConditionNode>,
    pub targets: Vec<ParamRef>,
    pub expectation: Expectation,
}

impl CompiledRule {
    /// Every parameter name the rule reads, across filter, targets and expectation.
    pub fn referenced_parameters(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.targets.iter().map(|t| t.name.as_str()).collect();
        if let Some(filter) = &self.filter {
            names.extend(filter.parameters());
        }
        if let Expectation::Condition(node) = &self.expectation {
            names.extend(node.parameters());
        }
        names
    }
}

impl ValidationRule {
    /// Parses the combination, filter and expected-value columns.
    /// `parameter_type` resolves the declared type of a parameter of this rule's MO.
    pub fn compile<F>(&self, parameter_type: F) -> Result<CompiledRule, DomainError>
    where
        F: Fn(&str) -> Option<ParameterType>,
    {
        let invalid = |reason: String| DomainError::invalid_rule(&self.rule_id, reason);

        let targets = self
            .parameter_combination
            .split('&')
            .map(ParamRef::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;

        let filter = match self.filter_condition.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Some(parse(text)?),
            _ => None,
        };

        let expected = self.expected_value.trim();
        let expectation = if expected.is_empty() {
            Expectation::Unspecified
        } else if expected.contains(COMPARATOR_CHARS) {
            Expectation::Condition(parse(expected)?)
        } else if targets.len() == 1 {
            Expectation::Values(vec![
                expected_literal(&targets[0], expected, &parameter_type).map_err(invalid)?,
            ])
        } else {
            let parts: Vec<&str> = expected.split('&').collect();
            if parts.len() != targets.len() {
                return Err(invalid(format!(
                    "{} expected values for {} parameters in '{}'",
                    parts.len(),
                    targets.len(),
                    self.parameter_combination
                )));
            }
            Expectation::Values(
                targets
                    .iter()
                    .zip(parts)
                    .map(|(target, part)| expected_literal(target, part.trim(), &parameter_type))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(invalid)?,
            )
        };

        if self.check_kind == CheckKind::Misconfiguration
            && matches!(expectation, Expectation::Unspecified)
        {
            return Err(invalid(
                "misconfiguration rule has no expected value".to_string(),
            ));
        }

        Ok(CompiledRule {
            filter,
            targets,
            expectation,
        })
    }
}

fn expected_literal<F>(
    target: &ParamRef,
    text: &str,
    parameter_type: &F,
) -> Result<ParameterValue, String>
where
    F: Fn(&str) -> Option<ParameterType>,
{
    if target.sub_key.is_some() {
        return Ok(ParameterValue::Scalar(parse_scalar(text)));
    }
    match parameter_type(&target.name) {
        Some(ParameterType::Multiple) => parse_multi_value(text)
            .map(ParameterValue::Multi)
            .map_err(|e| e.to_string()),
        Some(ParameterType::Single) => Ok(ParameterValue::Scalar(parse_scalar(text))),
        None => ParameterValue::classify(text).map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::condition::Comparator;
    use anyhow::Result;

    fn rule(kind: CheckKind, combination: &str, expected: &str) -> ValidationRule {
        ValidationRule {
            rule_id: "R1".into(),
            mo_name: "NRDUCELL".into(),
            check_kind: kind,
            parameter_combination: combination.into(),
            expected_value: expected.into(),
            filter_condition: None,
            logical_relation: LogicalRelation::And,
            execution_order: 1,
            subsequent_rule: None,
            description: String::new(),
        }
    }

    fn untyped(_: &str) -> Option<ParameterType> {
        None
    }

    #[test]
    fn test_check_kind_accepts_both_vocabularies() -> Result<()> {
        assert_eq!(
            "错配".parse::<CheckKind>().map_err(anyhow::Error::msg)?,
            CheckKind::Misconfiguration
        );
        assert_eq!(
            "漏配".parse::<CheckKind>().map_err(anyhow::Error::msg)?,
            CheckKind::MissingConfiguration
        );
        assert_eq!(
            "Missing_Configuration".parse::<CheckKind>().map_err(anyhow::Error::msg)?,
            CheckKind::MissingConfiguration
        );
        assert!("other".parse::<CheckKind>().is_err());
        assert_eq!(CheckKind::MissingConfiguration.to_string(), "missing-configuration");
        Ok(())
    }

    #[test]
    fn test_logical_relation_parsing() -> Result<()> {
        assert_eq!("or".parse::<LogicalRelation>().map_err(anyhow::Error::msg)?, LogicalRelation::Or);
        assert_eq!("".parse::<LogicalRelation>().map_err(anyhow::Error::msg)?, LogicalRelation::And);
        assert!("xor".parse::<LogicalRelation>().is_err());
        Ok(())
    }

    #[test]
    fn test_param_ref_parsing() {
        assert_eq!(
            ParamRef::parse(" sw[k1] ").unwrap(),
            ParamRef {
                name: "sw".into(),
                sub_key: Some("k1".into())
            }
        );
        assert_eq!(ParamRef::parse("radius").unwrap().sub_key, None);
        assert!(ParamRef::parse("sw[k1").is_err());
        assert!(ParamRef::parse("sw[]").is_err());
        assert!(ParamRef::parse("sw]").is_err());
        assert!(ParamRef::parse("").is_err());
    }

    #[test]
    fn test_compile_scalar_expectation() -> Result<()> {
        let compiled = rule(CheckKind::Misconfiguration, "小区半径", "8000").compile(untyped)?;
        assert_eq!(compiled.targets.len(), 1);
        assert_eq!(
            compiled.expectation,
            Expectation::Values(vec![ParameterValue::scalar("8000")])
        );
        Ok(())
    }

    #[test]
    fn test_compile_multi_value_expectation_uses_declared_type() -> Result<()> {
        let typed = |name: &str| (name == "sw").then_some(ParameterType::Multiple);
        let compiled = rule(CheckKind::Misconfiguration, "sw", "k1:on&k2:on").compile(typed)?;
        match &compiled.expectation {
            Expectation::Values(values) => assert_eq!(values[0].as_multi().map(|m| m.len()), Some(2)),
            other => panic!("Expected Values, got {other:?}"),
        }

        let err = rule(CheckKind::Misconfiguration, "sw", "on").compile(typed).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRule { .. }));
        Ok(())
    }

    #[test]
    fn test_compile_rejects_undeclared_duplicate_sub_keys() {
        let err = rule(CheckKind::Misconfiguration, "sw", "k1:on&k1:off")
            .compile(untyped)
            .unwrap_err();
        match err {
            DomainError::InvalidRule { reason, .. } => assert!(reason.contains("duplicate sub-key")),
            other => panic!("Expected InvalidRule, got {other:?}"),
        }
    }

    #[test]
    fn test_compile_positional_expectations() -> Result<()> {
        let compiled =
            rule(CheckKind::MissingConfiguration, "邻区类型&载波频点", "同频&2100").compile(untyped)?;
        assert_eq!(
            compiled.expectation,
            Expectation::Values(vec![
                ParameterValue::scalar("同频"),
                ParameterValue::scalar("2100")
            ])
        );

        let err = rule(CheckKind::Misconfiguration, "a&b", "1").compile(untyped).unwrap_err();
        match err {
            DomainError::InvalidRule { reason, .. } => assert!(reason.contains("1 expected values for 2")),
            other => panic!("Expected InvalidRule, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_compile_condition_expectation_and_filter() -> Result<()> {
        let mut r = rule(CheckKind::Misconfiguration, "bw", "bw>=100 and band=N78");
        r.filter_condition = Some("(小区类型=宏站)".into());
        let compiled = r.compile(untyped)?;
        assert!(matches!(compiled.expectation, Expectation::Condition(_)));
        assert_eq!(
            compiled.filter,
            Some(ConditionNode::comparison("小区类型", Comparator::Eq, "宏站"))
        );
        assert_eq!(
            compiled.referenced_parameters().into_iter().collect::<Vec<_>>(),
            vec!["band", "bw", "小区类型"]
        );
        Ok(())
    }

    #[test]
    fn test_compile_surfaces_syntax_errors() {
        let mut r = rule(CheckKind::Misconfiguration, "a", "1");
        r.filter_condition = Some("(a=1".into());
        assert!(matches!(
            r.compile(untyped),
            Err(DomainError::SyntaxError { .. })
        ));
    }

    #[test]
    fn test_misconfiguration_requires_expected_value() {
        let err = rule(CheckKind::Misconfiguration, "a", " ").compile(untyped).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRule { .. }));
        assert!(rule(CheckKind::MissingConfiguration, "a", "").compile(untyped).is_ok());
    }

    #[test]
    fn test_blank_filter_is_no_filter() -> Result<()> {
        let mut r = rule(CheckKind::MissingConfiguration, "a", "");
        r.filter_condition = Some("   ".into());
        assert_eq!(r.compile(untyped)?.filter, None);
        Ok(())
    }
}
