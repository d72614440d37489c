use serde::Deserialize;
use tracing::{error, info, instrument};
use validator::Validate;

use super::SubmitLatch;
use crate::context::HmsContext;
use crate::core::triage::{advance, queue_order, TriageQueue};
use crate::core::validation::{known_value, not_blank, validate_submission, Submission};
use crate::error::{HmsError, StoreError};
use crate::models::{
    Collection, NewTriageCase, SeverityLevel, TriageCase, TriageCasePatch, TriageStatus, Vitals,
};

/// New-patient intake form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TriageForm {
    #[validate(custom = "not_blank")]
    pub patient_name: String,
    #[validate(custom = "not_blank")]
    pub patient_id: String,
    #[validate(required, custom = "known_value")]
    pub severity_level: Option<SeverityLevel>,
    #[validate(length(min = 1))]
    pub symptoms: Vec<String>,
    /// Computed elsewhere and entered as-is.
    #[validate(required)]
    pub priority_score: Option<i64>,
    pub vitals: Option<Vitals>,
    pub chief_complaint: Option<String>,
}

impl Submission for TriageForm {
    const FIELDS: &'static [&'static str] = &[
        "patient_name",
        "patient_id",
        "severity_level",
        "symptoms",
        "priority_score",
    ];
}

impl TriageForm {
    /// Trims text and drops blank symptoms and empty vitals.
    pub fn normalized(mut self) -> Self {
        self.patient_name = self.patient_name.trim().to_string();
        self.patient_id = self.patient_id.trim().to_string();
        self.symptoms = self
            .symptoms
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self.vitals = self.vitals.filter(|v| !v.is_empty());
        self.chief_complaint = self
            .chief_complaint
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self
    }

    pub fn into_new(self) -> Result<NewTriageCase, HmsError> {
        Ok(NewTriageCase {
            patient_name: self.patient_name,
            patient_id: self.patient_id,
            severity_level: self.severity_level.ok_or(HmsError::MissingField("severity_level"))?,
            priority_score: self.priority_score.ok_or(HmsError::MissingField("priority_score"))?,
            symptoms: self.symptoms,
            vitals: self.vitals,
            chief_complaint: self.chief_complaint,
            status: TriageStatus::Waiting,
        })
    }
}

/// The triage page: queue, intake and the status workflow.
#[derive(Clone)]
pub struct TriageBoard {
    ctx: HmsContext,
    latch: SubmitLatch,
}

impl TriageBoard {
    pub fn new(ctx: HmsContext) -> Self {
        Self {
            ctx,
            latch: SubmitLatch::new(),
        }
    }

    pub fn latch(&self) -> &SubmitLatch {
        &self.latch
    }

    /// Cases in the order the store returned them.
    pub async fn queue(&self) -> Result<TriageQueue, HmsError> {
        let cases = self.ctx.list::<TriageCase>(Some(queue_order())).await?;
        Ok(TriageQueue::new(cases))
    }

    #[instrument(skip(self, form))]
    pub async fn admit(&self, form: TriageForm) -> Result<TriageCase, HmsError> {
        let _claim = self.latch.try_claim()?;
        let form = form.normalized();
        validate_submission(&form)?;

        let record = form.into_new()?;
        let created = self.ctx.create::<TriageCase>(&record).await.map_err(|e| {
            error!("Error creating triage case: {}", e);
            e
        })?;
        info!("Admitted {} with priority {}", created.patient_name, created.priority_score);
        Ok(created)
    }

    /// Moves a case one step along waiting → in_progress → completed.
    #[instrument(skip(self, case), fields(id = %case.id, from = case.status.as_str()))]
    pub async fn advance(&self, case: &TriageCase) -> Result<TriageCase, HmsError> {
        let next = advance(case.status).ok_or_else(|| HmsError::InvalidTransition {
            collection: Collection::TriageCase,
            from: case.status.as_str().to_string(),
        })?;

        let patch = TriageCasePatch { status: next };
        let updated = self.ctx.update::<TriageCase>(&case.id, &patch).await.map_err(|e| {
            error!("Error updating triage case {}: {}", case.id, e);
            e
        })?;
        Ok(updated)
    }

    pub async fn advance_by_id(&self, id: &str) -> Result<TriageCase, HmsError> {
        let case = self.find(id).await?;
        self.advance(&case).await
    }

    pub async fn find(&self, id: &str) -> Result<TriageCase, HmsError> {
        let queue = self.queue().await?;
        queue.find(id).cloned().ok_or_else(|| {
            StoreError::NotFound {
                collection: Collection::TriageCase,
                id: id.to_string(),
            }
            .into()
        })
    }
}
