// paramcheck-core/src/domain/finding.rs

use crate::domain::error::DomainError;
use crate::domain::knowledge::rule::CheckKind;
use serde::{Serialize, Serializer};
use std::fmt;

/// Rule ID carried by findings raised by the driver itself rather than a rule.
pub const SYSTEM_RULE_ID: &str = "SYSTEM";

/// One specific disagreement between the configuration and a rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Mismatch {
    /// A scalar parameter holds another value.
    Value {
        parameter: String,
        expected: String,
        actual: String,
    },
    /// One sub-key of a multi-value parameter differs or is missing.
    SubKey {
        parameter: String,
        sub_key: String,
        expected: String,
        actual: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// A parameter (or sub-key) is not configured at all.
    Absent {
        parameter: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        sub_key: Option<String>,
    },
    /// A comparison of an expected-value expression that did not hold.
    Condition {
        parameter: String,
        operator: String,
        literal: String,
        actual: Option<String>,
    },
}

impl Mismatch {
    pub fn parameter(&self) -> &str {
        match self {
            Self::Value { parameter, .. }
            | Self::SubKey { parameter, .. }
            | Self::Absent { parameter, .. }
            | Self::Condition { parameter, .. } => parameter,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value {
                parameter,
                expected,
                actual,
            } => write!(f, "{}: expected {}, got {}", parameter, expected, actual),
            Self::SubKey {
                parameter,
                sub_key,
                expected,
                actual,
                description,
            } => {
                write!(f, "{}: {} expected {}, got ", parameter, sub_key, expected)?;
                match actual {
                    Some(actual) => write!(f, "{}", actual)?,
                    None => write!(f, "nothing")?,
                }
                if let Some(desc) = description {
                    write!(f, " ({})", desc)?;
                }
                Ok(())
            }
            Self::Absent {
                parameter,
                sub_key: Some(sub_key),
            } => write!(f, "{}[{}] is absent", parameter, sub_key),
            Self::Absent {
                parameter,
                sub_key: None,
            } => write!(f, "{} is absent", parameter),
            Self::Condition {
                parameter,
                operator,
                literal,
                actual,
            } => match actual {
                Some(actual) => write!(f, "{}{}{} does not hold (actual {})", parameter, operator, literal, actual),
                None => write!(f, "{}{}{} does not hold ({} is absent)", parameter, operator, literal, parameter),
            },
        }
    }
}

/// A failed check. Findings are data: the engine collects them, it never raises them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub rule_id: String,
    pub mo_name: String,
    pub instance_key: String,
    pub check_kind: CheckKind,
    pub description: String,
    pub mismatches: Vec<Mismatch>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fix_commands: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rule_description: String,
}

impl ValidationError {
    pub fn new(
        rule_id: &str,
        mo_name: &str,
        instance_key: &str,
        check_kind: CheckKind,
        mismatches: Vec<Mismatch>,
    ) -> Self {
        let description = mismatches
            .iter()
            .map(Mismatch::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            rule_id: rule_id.to_string(),
            mo_name: mo_name.to_string(),
            instance_key: instance_key.to_string(),
            check_kind,
            description,
            mismatches,
            fix_commands: Vec::new(),
            rule_description: String::new(),
        }
    }

    /// Raised when rules exist for an MO but the instance has no data for it.
    pub fn missing_data(mo_name: &str, instance_key: &str) -> Self {
        Self {
            rule_id: SYSTEM_RULE_ID.to_string(),
            mo_name: mo_name.to_string(),
            instance_key: instance_key.to_string(),
            check_kind: CheckKind::MissingConfiguration,
            description: format!("{} data does not exist", mo_name),
            mismatches: Vec::new(),
            fix_commands: Vec::new(),
            rule_description: String::new(),
        }
    }

    pub fn with_fix_commands(mut self, commands: Vec<String>) -> Self {
        self.fix_commands = commands;
        self
    }

    pub fn with_rule_description(mut self, description: &str) -> Self {
        self.rule_description = description.to_string();
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}][{}][{}/{}] {}",
            self.rule_id, self.check_kind, self.mo_name, self.instance_key, self.description
        )
    }
}

/// A structural problem met while validating, kept apart from findings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineDiagnostic {
    pub mo_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(rename = "message", serialize_with = "serialize_error")]
    pub error: DomainError,
}

fn serialize_error<S>(error: &DomainError, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{}: {}", error.kind(), error))
}

impl EngineDiagnostic {
    pub fn for_mo(mo_name: &str, error: DomainError) -> Self {
        Self {
            mo_name: mo_name.to_string(),
            instance_key: None,
            rule_id: None,
            error,
        }
    }

    pub fn for_rule(mo_name: &str, rule_id: &str, error: DomainError) -> Self {
        Self {
            rule_id: Some(rule_id.to_string()),
            ..Self::for_mo(mo_name, error)
        }
    }

    pub fn at_instance(mut self, instance_key: &str) -> Self {
        self.instance_key = Some(instance_key.to_string());
        self
    }
}

impl fmt::Display for EngineDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.error.kind())?;
        match &self.instance_key {
            Some(key) => write!(f, "[{}/{}]", self.mo_name, key)?,
            None => write!(f, "[{}]", self.mo_name)?,
        }
        if let Some(rule_id) = &self.rule_id {
            write!(f, "[{}]", rule_id)?;
        }
        write!(f, " {}", self.error)
    }
}
