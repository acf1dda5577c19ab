// paramcheck-core/src/application/lint.rs

use crate::domain::finding::EngineDiagnostic;
use crate::domain::knowledge::KnowledgeBase;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// A rule reading a parameter that has no definition for its MO.
/// Not fatal: the value is then typed from its shape alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndefinedParameter {
    pub mo_name: String,
    pub rule_id: String,
    pub parameter: String,
}

impl fmt::Display for UndefinedParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}][{}] parameter '{}' has no definition",
            self.mo_name, self.rule_id, self.parameter
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    pub parameters: usize,
    pub rules: usize,
    pub defects: Vec<EngineDiagnostic>,
    pub warnings: Vec<UndefinedParameter>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.defects.is_empty()
    }
}

/// Self-check of a knowledge base, run before any data is read.
pub fn lint_knowledge_base(kb: &KnowledgeBase) -> LintReport {
    let defects = kb.defects();
    for defect in &defects {
        warn!("{}", defect);
    }

    let mut warnings = Vec::new();
    for mo_name in kb.mo_names_with_rules() {
        for entry in kb.rules_for(mo_name) {
            let Ok(compiled) = &entry.compiled else {
                continue;
            };
            warnings.extend(
                compiled
                    .referenced_parameters()
                    .into_iter()
                    .filter(|name| kb.definition(mo_name, name).is_none())
                    .map(|name| UndefinedParameter {
                        mo_name: mo_name.to_string(),
                        rule_id: entry.id().to_string(),
                        parameter: name.to_string(),
                    }),
            );
        }
    }

    LintReport {
        parameters: kb.parameter_count(),
        rules: kb.rule_count(),
        defects,
        warnings,
    }
}
