use std::collections::BTreeMap;

use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, instrument};
use validator::Validate;

use super::{Outcome, SubmitLatch};
use crate::context::HmsContext;
use crate::core::analytics::{count_by, resolution_rate};
use crate::core::validation::{known_value, not_blank, validate_submission, Submission};
use crate::error::HmsError;
use crate::models::{
    ComplaintCategory, ComplaintPatch, ComplaintPriority, ComplaintStatus, ComplaintTicket,
    NewComplaintTicket, OpenEnum, SortKey,
};
use crate::notify::{deliver, templates};

/// Ticket ids are `TCK` followed by the unix time in milliseconds.
pub fn new_ticket_id() -> String {
    format!("TCK{}", Utc::now().timestamp_millis())
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ComplaintForm {
    /// Generated when left empty.
    pub ticket_id: String,
    #[validate(custom = "not_blank")]
    pub complainant_name: String,
    #[validate(custom = "not_blank")]
    pub contact_info: String,
    #[validate(required, custom = "known_value")]
    pub category: Option<ComplaintCategory>,
    #[validate(custom = "known_value")]
    pub priority: Option<ComplaintPriority>,
    #[validate(custom = "not_blank")]
    pub description: String,
    pub department: Option<String>,
}

impl Submission for ComplaintForm {
    const FIELDS: &'static [&'static str] = &[
        "complainant_name",
        "contact_info",
        "category",
        "priority",
        "description",
    ];
}

impl ComplaintForm {
    fn into_new(self) -> Result<NewComplaintTicket, HmsError> {
        let ticket_id = match self.ticket_id.trim() {
            "" => new_ticket_id(),
            id => id.to_string(),
        };
        Ok(NewComplaintTicket {
            ticket_id,
            complainant_name: self.complainant_name.trim().to_string(),
            contact_info: self.contact_info.trim().to_string(),
            category: self.category.ok_or(HmsError::MissingField("category"))?,
            priority: self.priority.unwrap_or_default(),
            description: self.description.trim().to_string(),
            department: self
                .department
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            status: ComplaintStatus::Submitted,
        })
    }
}

/// Counts behind the complaints analytics tab. Groups are keyed on the
/// stored value, including values outside the known set.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplaintAnalytics {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub resolution_rate: f64,
    open: usize,
}

impl ComplaintAnalytics {
    pub fn from_tickets(tickets: &[ComplaintTicket]) -> Self {
        Self {
            total: tickets.len(),
            by_category: count_by(tickets, |t| t.category.as_str().to_string()),
            by_status: count_by(tickets, |t| t.status.as_str().to_string()),
            by_priority: count_by(tickets, |t| t.priority.as_str().to_string()),
            resolution_rate: resolution_rate(tickets),
            open: tickets.iter().filter(|t| !t.status.is_settled()).count(),
        }
    }

    /// Tickets neither resolved nor closed.
    pub fn open(&self) -> usize {
        self.open
    }
}

#[derive(Clone)]
pub struct ComplaintDesk {
    ctx: HmsContext,
    latch: SubmitLatch,
}

impl ComplaintDesk {
    pub fn new(ctx: HmsContext) -> Self {
        Self {
            ctx,
            latch: SubmitLatch::new(),
        }
    }

    pub fn latch(&self) -> &SubmitLatch {
        &self.latch
    }

    pub async fn tickets(&self) -> Result<Vec<ComplaintTicket>, HmsError> {
        Ok(self.ctx.list::<ComplaintTicket>(Some(SortKey::newest_first())).await?)
    }

    /// Files a ticket, then acknowledges it by email when the contact is an
    /// address. The acknowledgement result is reported, never raised.
    #[instrument(skip(self, form))]
    pub async fn submit(
        &self,
        form: ComplaintForm,
    ) -> Result<Outcome<ComplaintTicket>, HmsError> {
        let _claim = self.latch.try_claim()?;
        validate_submission(&form)?;

        let record = form.into_new()?;
        let created = self.ctx.create::<ComplaintTicket>(&record).await.map_err(|e| {
            error!("Complaint submission error: {}", e);
            e
        })?;
        info!(
            "Complaint {} filed under {}",
            created.ticket_id,
            created.category.as_str()
        );

        let notice = templates::complaint_received(&created);
        let delivery = deliver(self.ctx.notifier.as_ref(), notice).await;
        Ok(Outcome {
            record: created,
            delivery,
        })
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: &str,
        status: ComplaintStatus,
    ) -> Result<ComplaintTicket, HmsError> {
        if !status.is_known() {
            return Err(HmsError::InvalidField {
                field: "status",
                reason: format!("must be one of {}", ComplaintStatus::KNOWN.join(", ")),
            });
        }
        Ok(self
            .ctx
            .update::<ComplaintTicket>(id, &ComplaintPatch { status })
            .await?)
    }

    pub async fn analytics(&self) -> Result<ComplaintAnalytics, HmsError> {
        Ok(ComplaintAnalytics::from_tickets(&self.tickets().await?))
    }
}
