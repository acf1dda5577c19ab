// paramcheck-core/src/domain/condition/ast.rs

use crate::domain::value::ParameterValue;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Comparator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            ">=" => Some(Self::Ge),
            "<=" => Some(Self::Le),
            _ => None,
        }
    }

    /// `>`, `<`, `>=`, `<=` are only defined on numbers.
    pub fn is_ordering(&self) -> bool {
        !matches!(self, Self::Eq | Self::Ne)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Parsed condition. Immutable once built; equality is structural.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    Comparison {
        param: String,
        operator: Comparator,
        literal: ParameterValue,
    },
    And {
        left: Box<ConditionNode>,
        right: Box<ConditionNode>,
    },
    Or {
        left: Box<ConditionNode>,
        right: Box<ConditionNode>,
    },
}

impl ConditionNode {
    pub fn comparison(param: &str, operator: Comparator, literal: &str) -> Self {
        Self::Comparison {
            param: param.to_string(),
            operator,
            literal: ParameterValue::infer(literal),
        }
    }

    pub fn and(left: ConditionNode, right: ConditionNode) -> Self {
        Self::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: ConditionNode, right: ConditionNode) -> Self {
        Self::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Every parameter name referenced by a comparison leaf.
    pub fn parameters(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_parameters(&mut names);
        names
    }

    fn collect_parameters<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Self::Comparison { param, .. } => {
                names.insert(param.as_str());
            }
            Self::And { left, right } | Self::Or { left, right } => {
                left.collect_parameters(names);
                right.collect_parameters(names);
            }
        }
    }

    fn fmt_operand(node: &ConditionNode, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match node {
            Self::Comparison { .. } => write!(f, "{}", node),
            _ => write!(f, "({})", node),
        }
    }
}

impl fmt::Display for ConditionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison {
                param,
                operator,
                literal,
            } => write!(f, "{}{}{}", param, operator, literal),
            Self::And { left, right } => {
                Self::fmt_operand(left, f)?;
                f.write_str(" and ")?;
                Self::fmt_operand(right, f)
            }
            Self::Or { left, right } => {
                Self::fmt_operand(left, f)?;
                f.write_str(" or ")?;
                Self::fmt_operand(right, f)
            }
        }
    }
}
