//! Quality issues raised by the scoring engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::job::JobId;

/// Severity of a quality issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Info => "info",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Error => "error",
        }
    }
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The closed set of issue kinds the scorer can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The scored sequence contained no frames
    Empty,
    /// Hand visibility fell below the warning threshold
    LowHandVisibility,
    /// Wrist tracking jitter exceeded the stability threshold
    UnstableTracking,
    /// Face coverage fell below the info threshold
    LowFaceCoverage,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Empty => "empty",
            IssueKind::LowHandVisibility => "low_hand_visibility",
            IssueKind::UnstableTracking => "unstable_tracking",
            IssueKind::LowFaceCoverage => "low_face_coverage",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An issue as produced by the scoring engine, before it is attached to a
/// job. Serializes as `{"type": ..., "severity": ..., "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    /// Metric value that triggered the issue, when one applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl ScoredIssue {
    pub fn new(kind: IssueKind, severity: IssueSeverity, value: Option<f64>) -> Self {
        Self {
            kind,
            severity,
            value,
        }
    }

    /// The single issue reported for an empty input sequence.
    pub fn empty_input() -> Self {
        Self::new(IssueKind::Empty, IssueSeverity::Error, None)
    }
}

/// Unique identifier for a persisted quality issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub String);

impl IssueId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IssueId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A quality issue attached to a job in the ledger. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub id: IssueId,
    pub job_id: JobId,
    pub issue_type: String,
    pub severity: IssueSeverity,
    /// Frame range the issue covers, when it is localized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_range: Option<(u32, u32)>,
    /// Free-form details (typically the serialized scored issue)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_issue_serialization() {
        let issue = ScoredIssue::new(
            IssueKind::LowHandVisibility,
            IssueSeverity::Warning,
            Some(0.42),
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["type"], "low_hand_visibility");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["value"], 0.42);
    }

    #[test]
    fn test_empty_input_issue() {
        let issue = ScoredIssue::empty_input();
        assert_eq!(issue.kind, IssueKind::Empty);
        assert_eq!(issue.severity, IssueSeverity::Error);
        assert!(issue.value.is_none());
    }
}
