//! Triage severity styling and the three-state case workflow.

use std::collections::BTreeMap;

use crate::models::{SeverityLevel, SortKey, TriageCase, TriageStatus};

/// Visual treatment for a severity in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityStyle {
    pub color: &'static str,
    pub badge: &'static str,
    pub label: &'static str,
}

const CRITICAL: SeverityStyle = SeverityStyle {
    color: "red",
    badge: "bg-red-100 text-red-800 border-red-200",
    label: "Critical",
};
const HIGH: SeverityStyle = SeverityStyle {
    color: "orange",
    badge: "bg-orange-100 text-orange-800 border-orange-200",
    label: "High",
};
const MODERATE: SeverityStyle = SeverityStyle {
    color: "yellow",
    badge: "bg-yellow-100 text-yellow-800 border-yellow-200",
    label: "Moderate",
};
const LOW: SeverityStyle = SeverityStyle {
    color: "green",
    badge: "bg-green-100 text-green-800 border-green-200",
    label: "Low",
};

/// Looks up the style for a severity. Unknown severities get none and the
/// caller falls back to a neutral look.
pub fn classify(level: &SeverityLevel) -> Option<SeverityStyle> {
    match level {
        SeverityLevel::Critical => Some(CRITICAL),
        SeverityLevel::High => Some(HIGH),
        SeverityLevel::Moderate => Some(MODERATE),
        SeverityLevel::Low => Some(LOW),
        SeverityLevel::Other(_) => None,
    }
}

impl SeverityLevel {
    /// Urgency order, highest first: critical 4 down to low 1, unknown 0.
    pub fn rank(&self) -> u8 {
        match self {
            SeverityLevel::Critical => 4,
            SeverityLevel::High => 3,
            SeverityLevel::Moderate => 2,
            SeverityLevel::Low => 1,
            SeverityLevel::Other(_) => 0,
        }
    }
}

/// The single legal next status, if any.
pub fn advance(status: TriageStatus) -> Option<TriageStatus> {
    match status {
        TriageStatus::Waiting => Some(TriageStatus::InProgress),
        TriageStatus::InProgress => Some(TriageStatus::Completed),
        TriageStatus::Completed => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriageAction {
    pub label: &'static str,
    pub target: TriageStatus,
}

/// The one action offered for a case in `status`.
pub fn action_for(status: TriageStatus) -> Option<TriageAction> {
    let target = advance(status)?;
    let label = match target {
        TriageStatus::InProgress => "Start Treatment",
        _ => "Complete",
    };
    Some(TriageAction { label, target })
}

/// Sort key the queue is requested with. Ordering is the store's job.
pub fn queue_order() -> SortKey {
    SortKey::descending("priority_score")
}

/// A case paired with its display treatment.
#[derive(Debug, Clone)]
pub struct QueueEntry<'a> {
    pub case: &'a TriageCase,
    pub style: Option<SeverityStyle>,
    pub action: Option<TriageAction>,
}

/// The triage queue exactly as the store ordered it.
#[derive(Debug, Clone, Default)]
pub struct TriageQueue {
    cases: Vec<TriageCase>,
}

impl TriageQueue {
    pub fn new(cases: Vec<TriageCase>) -> Self {
        Self { cases }
    }

    pub fn cases(&self) -> &[TriageCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = QueueEntry<'_>> {
        self.cases.iter().map(|case| QueueEntry {
            case,
            style: classify(&case.severity_level),
            action: action_for(case.status),
        })
    }

    pub fn find(&self, id: &str) -> Option<&TriageCase> {
        self.cases.iter().find(|c| c.id == id)
    }

    /// Cases still open, by severity label, most urgent first.
    pub fn severity_summary(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<(std::cmp::Reverse<u8>, String), usize> = BTreeMap::new();
        for case in self.cases.iter().filter(|c| c.status != TriageStatus::Completed) {
            let label = classify(&case.severity_level)
                .map(|s| s.label.to_string())
                .unwrap_or_else(|| case.severity_level.as_str().to_string());
            *counts
                .entry((std::cmp::Reverse(case.severity_level.rank()), label))
                .or_insert(0) += 1;
        }
        counts.into_iter().map(|((_, label), n)| (label, n)).collect()
    }

    /// Critical cases that are not yet completed.
    pub fn critical_open(&self) -> usize {
        count_critical_open(&self.cases)
    }
}

pub fn count_critical_open(cases: &[TriageCase]) -> usize {
    cases
        .iter()
        .filter(|c| {
            c.severity_level == SeverityLevel::Critical && c.status != TriageStatus::Completed
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn case(id: &str, severity: &str, score: i64, status: TriageStatus) -> TriageCase {
        TriageCase {
            id: id.into(),
            patient_name: format!("Patient {}", id),
            patient_id: id.into(),
            severity_level: SeverityLevel::from(severity.to_string()),
            priority_score: score,
            symptoms: vec!["fever".into()],
            vitals: None,
            chief_complaint: None,
            status,
            created_date: None,
        }
    }

    #[test_case("critical", "red", "Critical")]
    #[test_case("high", "orange", "High")]
    #[test_case("moderate", "yellow", "Moderate")]
    #[test_case("low", "green", "Low")]
    fn known_severities_have_a_style(raw: &str, color: &str, label: &str) {
        let style = classify(&SeverityLevel::from(raw.to_string())).unwrap();
        assert_eq!(style.color, color);
        assert_eq!(style.label, label);
    }

    #[test_case("" ; "empty")]
    #[test_case("CRITICAL" ; "wrong case")]
    #[test_case("severe" ; "unknown word")]
    fn unknown_severity_has_no_style(raw: &str) {
        assert_eq!(classify(&SeverityLevel::from(raw.to_string())), None);
    }

    #[test_case(TriageStatus::Waiting, Some(TriageStatus::InProgress))]
    #[test_case(TriageStatus::InProgress, Some(TriageStatus::Completed))]
    #[test_case(TriageStatus::Completed, None)]
    fn advance_moves_one_step(from: TriageStatus, to: Option<TriageStatus>) {
        assert_eq!(advance(from), to);
    }

    #[test]
    fn actions_are_gated_by_status() {
        assert_eq!(action_for(TriageStatus::Waiting).unwrap().label, "Start Treatment");
        assert_eq!(action_for(TriageStatus::InProgress).unwrap().label, "Complete");
        assert!(action_for(TriageStatus::Completed).is_none());
    }

    #[test]
    fn queue_keeps_store_order() {
        // A low score ahead of a high one stays where the store put it.
        let queue = TriageQueue::new(vec![
            case("a", "low", 1, TriageStatus::Waiting),
            case("b", "critical", 9, TriageStatus::Waiting),
            case("c", "purple", 5, TriageStatus::InProgress),
        ]);

        let ids: Vec<_> = queue.entries().map(|e| e.case.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(queue.entries().nth(2).unwrap().style.is_none());
    }

    #[test]
    fn summary_ranks_by_urgency_and_skips_completed() {
        let queue = TriageQueue::new(vec![
            case("a", "low", 1, TriageStatus::Waiting),
            case("b", "critical", 9, TriageStatus::Waiting),
            case("c", "critical", 8, TriageStatus::Completed),
            case("d", "purple", 5, TriageStatus::InProgress),
            case("e", "high", 7, TriageStatus::InProgress),
        ]);

        assert_eq!(
            queue.severity_summary(),
            vec![
                ("Critical".to_string(), 1),
                ("High".to_string(), 1),
                ("Low".to_string(), 1),
                ("purple".to_string(), 1),
            ]
        );
        assert_eq!(queue.critical_open(), 1);
    }

    #[test]
    fn queue_is_requested_by_descending_score() {
        assert_eq!(queue_order().to_string(), "-priority_score");
    }
}
