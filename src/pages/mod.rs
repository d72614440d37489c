//! Page services: what each browser view did, minus the rendering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::HmsError;
use crate::notify::Delivery;

pub mod complaints;
pub mod dashboard;
pub mod laundry;
pub mod pharmacy;
pub mod triage;

pub use complaints::{ComplaintAnalytics, ComplaintDesk, ComplaintForm};
pub use dashboard::{Dashboard, DashboardView, ModuleCard};
pub use laundry::{LaundryDesk, LaundryForm, LaundryOverview};
pub use pharmacy::{BillingSummary, PharmacyDesk, PrescriptionForm};
pub use triage::{TriageBoard, TriageForm};

/// Allows one in-flight submission per form.
#[derive(Debug, Clone, Default)]
pub struct SubmitLatch {
    busy: Arc<AtomicBool>,
}

impl SubmitLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the latch, or fails with `Busy` if a submission is running.
    /// The claim is released when dropped.
    pub fn try_claim(&self) -> Result<SubmitClaim, HmsError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| HmsError::Busy)?;
        Ok(SubmitClaim {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

#[must_use]
#[derive(Debug)]
pub struct SubmitClaim {
    busy: Arc<AtomicBool>,
}

impl Drop for SubmitClaim {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// A committed mutation and what happened to its follow-up email.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub record: T,
    pub delivery: Delivery,
}
