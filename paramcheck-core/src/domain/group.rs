// paramcheck-core/src/domain/group.rs

use crate::domain::error::DomainError;
use crate::domain::knowledge::KnowledgeBase;
use crate::domain::knowledge::definition::ParameterType;
use crate::domain::value::{ParameterValue, parse_multi_value, parse_scalar};
use std::collections::BTreeMap;

/// Parsed parameter values of one MO instance, as seen by the evaluator.
/// Parameters whose raw value could not be parsed are kept apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterContext {
    values: BTreeMap<String, ParameterValue>,
    malformed: BTreeMap<String, DomainError>,
}

impl ParameterContext {
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParameterValue) {
        self.values.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_malformed(&self, name: &str) -> bool {
        self.malformed.contains_key(name)
    }

    pub fn malformed(&self) -> impl Iterator<Item = (&str, &DomainError)> {
        self.malformed.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, ParameterValue)> for ParameterContext {
    fn from_iter<I: IntoIterator<Item = (String, ParameterValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
            malformed: BTreeMap::new(),
        }
    }
}

/// One MO instance to validate: raw parameter values keyed by parameter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoGroup {
    pub mo_name: String,
    pub instance_key: String,
    pub parameters: BTreeMap<String, String>,
}

impl MoGroup {
    pub fn new(mo_name: impl Into<String>, instance_key: impl Into<String>) -> Self {
        Self {
            mo_name: mo_name.into(),
            instance_key: instance_key.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, raw: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), raw.into());
        self
    }

    /// Types every raw value once: by its declared parameter type when the
    /// knowledge base defines it for this MO, by its shape otherwise.
    pub fn context(&self, kb: &KnowledgeBase) -> ParameterContext {
        let mut ctx = ParameterContext::default();
        for (name, raw) in &self.parameters {
            match kb.parameter_type(&self.mo_name, name) {
                Some(ParameterType::Multiple) => match parse_multi_value(raw) {
                    Ok(value) => ctx.insert(name.clone(), ParameterValue::Multi(value)),
                    Err(e) => {
                        ctx.malformed.insert(name.clone(), e);
                    }
                },
                Some(ParameterType::Single) => {
                    ctx.insert(name.clone(), ParameterValue::Scalar(parse_scalar(raw)))
                }
                None => match ParameterValue::classify(raw) {
                    Ok(value) => ctx.insert(name.clone(), value),
                    Err(e) => {
                        ctx.malformed.insert(name.clone(), e);
                    }
                },
            }
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::definition::ParameterDefinition;
    use anyhow::Result;

    fn kb() -> Result<KnowledgeBase> {
        let def = ParameterDefinition {
            mo_name: "NRCELLALGOSWITCH".into(),
            mo_description: String::new(),
            scenario: String::new(),
            parameter_name: "sw".into(),
            parameter_id: "Sw".into(),
            parameter_type: ParameterType::Multiple,
            parameter_meaning: String::new(),
            value_description: String::new(),
        };
        Ok(KnowledgeBase::new(vec![def], vec![])?)
    }

    #[test]
    fn test_context_types_by_definition() -> Result<()> {
        let group = MoGroup::new("NRCELLALGOSWITCH", "1-1")
            .with("sw", "k1:on&k2:off")
            .with("band", "N78")
            .with("bw", "100");
        let ctx = group.context(&kb()?);
        assert_eq!(ctx.len(), 3);
        assert!(matches!(ctx.get("sw"), Some(ParameterValue::Multi(_))));
        assert_eq!(ctx.get("bw").and_then(|v| v.as_scalar()).and_then(|s| s.as_number()), Some(100.0));
        Ok(())
    }

    #[test]
    fn test_malformed_multi_value_is_isolated() -> Result<()> {
        let group = MoGroup::new("NRCELLALGOSWITCH", "1-1")
            .with("sw", "k1:on&k1:off")
            .with("bw", "100");
        let ctx = group.context(&kb()?);
        assert!(ctx.is_malformed("sw"));
        assert!(!ctx.contains("sw"));
        assert!(ctx.contains("bw"));
        let (name, err) = ctx.malformed().next().unwrap_or_else(|| panic!("no malformed entry"));
        assert_eq!(name, "sw");
        assert!(matches!(err, DomainError::MalformedMultiValue { .. }));
        Ok(())
    }

    #[test]
    fn test_undeclared_duplicate_sub_key_is_malformed() -> Result<()> {
        let ctx = MoGroup::new("NRCELL", "1-1")
            .with("sw", "k1:on&k1:off&k2:on")
            .with("note", "a:1&b")
            .context(&kb()?);
        assert!(ctx.is_malformed("sw"));
        assert!(matches!(ctx.get("note"), Some(ParameterValue::Scalar(_))));
        Ok(())
    }

    #[test]
    fn test_declared_single_stays_scalar() -> Result<()> {
        let kb = KnowledgeBase::new(
            vec![ParameterDefinition {
                mo_name: "M".into(),
                mo_description: String::new(),
                scenario: String::new(),
                parameter_name: "note".into(),
                parameter_id: String::new(),
                parameter_type: ParameterType::Single,
                parameter_meaning: String::new(),
                value_description: String::new(),
            }],
            vec![],
        )?;
        let ctx = MoGroup::new("M", "1").with("note", "a:b").context(&kb);
        assert!(matches!(ctx.get("note"), Some(ParameterValue::Scalar(_))));
        Ok(())
    }
}
