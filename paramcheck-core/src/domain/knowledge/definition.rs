// paramcheck-core/src/domain/knowledge/definition.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterType {
    #[default]
    Single,
    /// Several named sub-settings packed as `k1:v1&k2:v2`.
    Multiple,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParameterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "single" | "单值" => Ok(Self::Single),
            "multiple" | "multi" | "多值" => Ok(Self::Multiple),
            _ => Err(format!("Unknown parameter type: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for ParameterType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ParameterType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ParameterType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// One row of the parameter-info table. Identity is (MO name, parameter name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub mo_name: String,
    #[serde(default)]
    pub mo_description: String,
    #[serde(default)]
    pub scenario: String,
    pub parameter_name: String,
    #[serde(default)]
    pub parameter_id: String,
    #[serde(default)]
    pub parameter_type: ParameterType,
    #[serde(default)]
    pub parameter_meaning: String,
    #[serde(default)]
    pub value_description: String,
}

impl ParameterDefinition {
    /// Identifier used in fix commands, falling back to the display name.
    pub fn command_id(&self) -> &str {
        if self.parameter_id.is_empty() {
            &self.parameter_name
        } else {
            &self.parameter_id
        }
    }

    /// Sub-key descriptions of a multi-value parameter, read from the value
    /// description written as `name:description;name:description`.
    pub fn sub_key_descriptions(&self) -> BTreeMap<String, String> {
        self.value_description
            .split([';', '；'])
            .filter_map(|item| {
                let (key, desc) = item.split_once([':', '：'])?;
                let key = key.trim();
                (!key.is_empty()).then(|| (key.to_string(), desc.trim().to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn switch_definition() -> ParameterDefinition {
        ParameterDefinition {
            mo_name: "NRCELLALGOSWITCH".into(),
            mo_description: "NR cell algorithm switches".into(),
            scenario: "airspace".into(),
            parameter_name: "异频切换算法开关".into(),
            parameter_id: "InterFreqHoSwitch".into(),
            parameter_type: ParameterType::Multiple,
            parameter_meaning: String::new(),
            value_description: "基于覆盖的异频切换开关:控制基于覆盖的异频切换功能;异频重定向开关:控制异频重定向功能"
                .into(),
        }
    }

    #[test]
    fn test_sub_key_descriptions() {
        let descriptions = switch_definition().sub_key_descriptions();
        assert_eq!(descriptions.len(), 2);
        assert_eq!(
            descriptions.get("异频重定向开关").map(String::as_str),
            Some("控制异频重定向功能")
        );
    }

    #[test]
    fn test_command_id_fallback() {
        let mut def = switch_definition();
        assert_eq!(def.command_id(), "InterFreqHoSwitch");
        def.parameter_id.clear();
        assert_eq!(def.command_id(), "异频切换算法开关");
    }

    #[test]
    fn test_parameter_type_parsing() -> Result<()> {
        assert_eq!("".parse::<ParameterType>().map_err(anyhow::Error::msg)?, ParameterType::Single);
        assert_eq!(
            "Multiple".parse::<ParameterType>().map_err(anyhow::Error::msg)?,
            ParameterType::Multiple
        );
        assert_eq!("多值".parse::<ParameterType>().map_err(anyhow::Error::msg)?, ParameterType::Multiple);
        assert!("list".parse::<ParameterType>().is_err());

        let yaml = "mo_name: M\nparameter_name: p\nparameter_type: multiple";
        let def: ParameterDefinition = serde_yaml::from_str(yaml)?;
        assert_eq!(def.parameter_type, ParameterType::Multiple);
        assert!(def.value_description.is_empty());
        Ok(())
    }
}
