use serde::{Deserialize, Serialize};

use super::{Collection, Entity, OpenEnum};

/// Severity assigned at triage. Values outside the known four are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SeverityLevel {
    Critical,
    High,
    Moderate,
    Low,
    Other(String),
}

impl SeverityLevel {
    pub fn as_str(&self) -> &str {
        match self {
            SeverityLevel::Critical => "critical",
            SeverityLevel::High => "high",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::Low => "low",
            SeverityLevel::Other(raw) => raw,
        }
    }
}

impl OpenEnum for SeverityLevel {
    const KNOWN: &'static [&'static str] = &["critical", "high", "moderate", "low"];

    fn as_str(&self) -> &str {
        SeverityLevel::as_str(self)
    }
}

impl From<String> for SeverityLevel {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "critical" => SeverityLevel::Critical,
            "high" => SeverityLevel::High,
            "moderate" => SeverityLevel::Moderate,
            "low" => SeverityLevel::Low,
            _ => SeverityLevel::Other(raw),
        }
    }
}

impl From<SeverityLevel> for String {
    fn from(level: SeverityLevel) -> Self {
        match level {
            SeverityLevel::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageStatus {
    #[default]
    Waiting,
    InProgress,
    Completed,
}

impl TriageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriageStatus::Waiting => "waiting",
            TriageStatus::InProgress => "in_progress",
            TriageStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation: Option<f64>,
}

impl Vitals {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.blood_pressure.is_none()
            && self.heart_rate.is_none()
            && self.oxygen_saturation.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageCase {
    pub id: String,
    pub patient_name: String,
    #[serde(default)]
    pub patient_id: String,
    pub severity_level: SeverityLevel,
    #[serde(default)]
    pub priority_score: i64,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub vitals: Option<Vitals>,
    #[serde(default)]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub status: TriageStatus,
    #[serde(default)]
    pub created_date: Option<String>,
}

impl Entity for TriageCase {
    const COLLECTION: Collection = Collection::TriageCase;
    type New = NewTriageCase;
    type Patch = TriageCasePatch;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTriageCase {
    pub patient_name: String,
    pub patient_id: String,
    pub severity_level: SeverityLevel,
    pub priority_score: i64,
    pub symptoms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitals: Option<Vitals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<String>,
    pub status: TriageStatus,
}

/// A triage transition only ever writes the status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageCasePatch {
    pub status: TriageStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_severity_survives_deserialization() {
        let case: TriageCase = serde_json::from_value(json!({
            "id": "t1",
            "patient_name": "Ada",
            "severity_level": "purple",
            "priority_score": 4
        }))
        .unwrap();

        assert_eq!(case.severity_level, SeverityLevel::Other("purple".into()));
        assert_eq!(case.status, TriageStatus::Waiting);
        assert_eq!(serde_json::to_value(&case.severity_level).unwrap(), json!("purple"));
    }

    #[test]
    fn patch_serializes_status_only() {
        let patch = TriageCasePatch { status: TriageStatus::InProgress };
        assert_eq!(serde_json::to_value(patch).unwrap(), json!({ "status": "in_progress" }));
    }
}
