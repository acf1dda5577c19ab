// paramcheck-core/src/domain/value.rs

use crate::domain::error::DomainError;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)$").expect("numeric grammar is a constant pattern")
});

const PAIR_SEPARATOR: char = '&';
const KEY_SEPARATOR: char = ':';

/// A single configured value. The source text is kept so that serializing
/// a parsed value gives back exactly what was configured.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number { value: f64, text: String },
    Text(String),
}

impl Scalar {
    pub fn text(&self) -> &str {
        match self {
            Self::Number { text, .. } => text,
            Self::Text(text) => text,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number { value, .. } => Some(*value),
            Self::Text(_) => None,
        }
    }

    /// Numeric equality when both sides are numbers, exact text match otherwise.
    pub fn loosely_equals(&self, other: &Scalar) -> bool {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a == b,
            _ => self.text() == other.text(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Parses a scalar token. Never fails: anything outside the numeric grammar is text.
pub fn parse_scalar(token: &str) -> Scalar {
    let token = token.trim();
    if NUMERIC.is_match(token)
        && let Ok(value) = token.parse::<f64>()
    {
        return Scalar::Number {
            value,
            text: token.to_string(),
        };
    }
    Scalar::Text(token.to_string())
}

/// Difference on one sub-key of a multi-value parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SubKeyDiff {
    pub key: String,
    pub expected: Scalar,
    /// `None` when the sub-key is not configured at all.
    pub actual: Option<Scalar>,
}

/// A set of named sub-settings packed into one parameter (`k1:on&k2:off`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiValue {
    entries: BTreeMap<String, Scalar>,
}

impl MultiValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a sub-key, refusing to overwrite an existing one.
    pub fn try_insert(&mut self, key: &str, value: Scalar) -> Result<(), String> {
        if self.entries.contains_key(key) {
            return Err(format!("duplicate sub-key '{}'", key));
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    /// Sub-keys of `expected` that are absent here or hold another value.
    /// Extra sub-keys configured here are tolerated.
    pub fn diff_against(&self, expected: &MultiValue) -> Vec<SubKeyDiff> {
        expected
            .iter()
            .filter_map(|(key, want)| match self.get(key) {
                Some(have) if have.loosely_equals(want) => None,
                have => Some(SubKeyDiff {
                    key: key.to_string(),
                    expected: want.clone(),
                    actual: have.cloned(),
                }),
            })
            .collect()
    }

    pub fn satisfies(&self, expected: &MultiValue) -> bool {
        self.diff_against(expected).is_empty()
    }
}

/// Canonical encoding: sub-keys sorted, `key:value` pairs joined by `&`.
impl fmt::Display for MultiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", PAIR_SEPARATOR)?;
            }
            write!(f, "{}{}{}", key, KEY_SEPARATOR, value)?;
        }
        Ok(())
    }
}

impl FromStr for MultiValue {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_multi_value(s)
    }
}

/// Parses `k1:v1&k2:v2`. A blank token is the empty set.
pub fn parse_multi_value(token: &str) -> Result<MultiValue, DomainError> {
    let malformed = |reason: String| DomainError::MalformedMultiValue {
        token: token.to_string(),
        reason,
    };

    let mut value = MultiValue::new();
    if token.trim().is_empty() {
        return Ok(value);
    }

    for segment in token.split(PAIR_SEPARATOR) {
        let (key, raw) = segment
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| malformed(format!("segment '{}' lacks ':'", segment.trim())))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(malformed(format!("segment '{}' has an empty key", segment.trim())));
        }
        value.try_insert(key, parse_scalar(raw)).map_err(malformed)?;
    }
    Ok(value)
}

fn looks_multi(token: &str) -> bool {
    token.contains(KEY_SEPARATOR)
        && token
            .split(PAIR_SEPARATOR)
            .all(|segment| segment.contains(KEY_SEPARATOR))
}

/// Value of one parameter in a parameter context, typed once at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Scalar(Scalar),
    Multi(MultiValue),
}

impl ParameterValue {
    pub fn scalar(token: &str) -> Self {
        Self::Scalar(parse_scalar(token))
    }

    pub fn multi(token: &str) -> Result<Self, DomainError> {
        parse_multi_value(token).map(Self::Multi)
    }

    /// Types an undeclared token by its shape. A token shaped like a
    /// multi-value (every `&` segment holds a `:`) must parse as one.
    pub fn classify(token: &str) -> Result<Self, DomainError> {
        if looks_multi(token) {
            return Self::multi(token);
        }
        Ok(Self::scalar(token))
    }

    /// Lenient [`ParameterValue::classify`]: a malformed multi-value stays a scalar.
    pub fn infer(token: &str) -> Self {
        Self::classify(token).unwrap_or_else(|_| Self::scalar(token))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Multi(_) => None,
        }
    }

    pub fn as_multi(&self) -> Option<&MultiValue> {
        match self {
            Self::Multi(m) => Some(m),
            Self::Scalar(_) => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{}", s),
            Self::Multi(m) => write!(f, "{}", m),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use proptest::prelude::*;

    #[test]
    fn test_parse_scalar_numeric_and_text() {
        assert_eq!(parse_scalar("8000").as_number(), Some(8000.0));
        assert_eq!(parse_scalar(" -1.5 ").as_number(), Some(-1.5));
        assert_eq!(parse_scalar(".5").as_number(), Some(0.5));
        assert_eq!(parse_scalar("N78"), Scalar::Text("N78".into()));
        assert_eq!(parse_scalar("1e5"), Scalar::Text("1e5".into()));
        assert_eq!(parse_scalar("NaN"), Scalar::Text("NaN".into()));
        assert_eq!(parse_scalar(""), Scalar::Text(String::new()));
    }

    #[test]
    fn test_scalar_keeps_source_text() {
        let s = parse_scalar("08000");
        assert_eq!(s.to_string(), "08000");
        assert!(s.loosely_equals(&parse_scalar("8000.0")));
        assert!(!s.loosely_equals(&parse_scalar("abc")));
    }

    #[test]
    fn test_parse_multi_value() -> Result<()> {
        let mv = parse_multi_value("k1:on & k2 : off")?;
        assert_eq!(mv.len(), 2);
        assert_eq!(mv.get("k2"), Some(&Scalar::Text("off".into())));
        assert_eq!(mv.to_string(), "k1:on&k2:off");
        Ok(())
    }

    #[test]
    fn test_parse_multi_value_rejects_missing_separator() {
        let err = parse_multi_value("k1:on&k2").unwrap_err();
        assert!(matches!(err, DomainError::MalformedMultiValue { .. }));
    }

    #[test]
    fn test_parse_multi_value_rejects_duplicate_key() {
        let err = parse_multi_value("k1:on&k1:off").unwrap_err();
        match err {
            DomainError::MalformedMultiValue { reason, .. } => {
                assert!(reason.contains("duplicate sub-key 'k1'"))
            }
            other => panic!("Expected MalformedMultiValue, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_multi_value_rejects_empty_key_and_trailing_separator() {
        assert!(parse_multi_value(":on").is_err());
        assert!(parse_multi_value("k1:on&").is_err());
        assert!(parse_multi_value("   ").unwrap().is_empty());
    }

    #[test]
    fn test_diff_reports_only_differing_keys() -> Result<()> {
        let actual = parse_multi_value("k1:on&k2:off&k9:on")?;
        let expected = parse_multi_value("k1:on&k2:on&k3:on")?;
        let diff = actual.diff_against(&expected);
        assert_eq!(diff.len(), 2);
        assert_eq!(diff[0].key, "k2");
        assert_eq!(diff[0].actual, Some(Scalar::Text("off".into())));
        assert_eq!(diff[1].key, "k3");
        assert_eq!(diff[1].actual, None);
        Ok(())
    }

    #[test]
    fn test_infer_shape() {
        assert!(matches!(
            ParameterValue::infer("k1:on&k2:off"),
            ParameterValue::Multi(_)
        ));
        assert!(matches!(ParameterValue::infer("100"), ParameterValue::Scalar(_)));
        assert!(matches!(ParameterValue::infer("a:1&b"), ParameterValue::Scalar(_)));
        // Lenient: a malformed multi-value stays a scalar.
        assert!(matches!(
            ParameterValue::infer("a:1&a:2"),
            ParameterValue::Scalar(_)
        ));
    }

    #[test]
    fn test_classify_rejects_malformed_multi_value() -> Result<()> {
        assert!(matches!(
            ParameterValue::classify("k1:on&k2:off")?,
            ParameterValue::Multi(_)
        ));
        assert!(matches!(ParameterValue::classify("a:1&b")?, ParameterValue::Scalar(_)));
        assert!(matches!(ParameterValue::classify("8000")?, ParameterValue::Scalar(_)));
        assert!(matches!(
            ParameterValue::classify("k1:on&k1:off&k2:on"),
            Err(DomainError::MalformedMultiValue { .. })
        ));
        assert!(matches!(
            ParameterValue::classify(":on"),
            Err(DomainError::MalformedMultiValue { .. })
        ));
        Ok(())
    }

    prop_compose! {
        fn pairs()(
            map in prop::collection::btree_map("[a-z][a-z0-9_]{0,8}", "[a-z0-9]{1,6}", 1..6)
        ) -> BTreeMap<String, String> {
            map
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Serializing a parsed multi-value gives the sorted encoding regardless of input order.
        #[test]
        fn multi_value_round_trip_is_canonical(map in pairs(), reverse in any::<bool>()) {
            let mut segments: Vec<String> = map.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
            let canonical = segments.join("&");
            if reverse {
                segments.reverse();
            }
            let parsed = parse_multi_value(&segments.join("&")).unwrap();
            prop_assert_eq!(parsed.to_string(), canonical);
        }
    }
}
