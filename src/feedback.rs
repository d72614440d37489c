//! Toast notices shown after a page operation.

use std::fmt;

use crate::error::HmsError;
use crate::models::{ComplaintTicket, Prescription};
use crate::notify::Delivery;
use crate::pages::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == Variant::Destructive
    }

    /// Notice for a failed call. Validation failures name the field.
    pub fn failure(title: &str, err: &HmsError) -> Self {
        match err {
            HmsError::Busy => Self::info("Please wait", "A submission is already in progress."),
            e if e.is_validation() => Self::destructive(title, e.to_string()),
            e => Self::destructive(title, format!("Please try again. {}", e)),
        }
    }

    pub fn dispensed(outcome: &Outcome<Prescription>) -> Self {
        match outcome.delivery {
            Delivery::Sent => Self::info(
                "Prescription Dispensed",
                "Patient has been notified via email.",
            ),
            Delivery::Failed(_) => Self::destructive(
                "Dispensing Success, Email Failed",
                "Prescription dispensed, but email notification could not be sent.",
            ),
            Delivery::NotRequested => {
                Self::info("Prescription Dispensed", "Prescription has been marked as dispensed.")
            }
        }
    }

    pub fn dispense_failed(err: &HmsError) -> Self {
        Self::failure("Dispensing Failed", err)
    }

    /// The acknowledgement email never changes the notice.
    pub fn complaint_submitted(outcome: &Outcome<ComplaintTicket>) -> Self {
        Self::info(
            "Complaint Submitted",
            format!("Ticket ID: {}", outcome.record.ticket_id),
        )
    }

    pub fn submission_failed(err: &HmsError) -> Self {
        if err.is_validation() || matches!(err, HmsError::Busy) {
            return Self::failure("Submission Failed", err);
        }
        Self::destructive(
            "Submission Failed",
            "There was an issue submitting your complaint. Please try again.",
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.variant {
            Variant::Default => "✓",
            Variant::Destructive => "✗",
        };
        write!(f, "{} {}: {}", marker, self.title, self.description)
    }
}
