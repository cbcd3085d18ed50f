use serde::{Deserialize, Serialize};

/// The kind of pacing constraint a chapter breached. Violations are
/// expected, recoverable outcomes handed back for regeneration — they are
/// never surfaced as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    Keyword,
    Time,
    Emotion,
}

impl ViolationKind {
    /// Returns the stable tag string for this kind (e.g., "keyword").
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Time => "time",
            Self::Emotion => "emotion",
        }
    }
}

/// A detected breach of a pacing constraint, with a remediation hint the
/// caller can feed back into its generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
    pub suggestion: String,
}

/// Result of a constraint check. No violations implies valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl CheckReport {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }

    /// A report with nothing flagged.
    pub fn clean() -> Self {
        Self::from_violations(Vec::new())
    }
}
