use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{error, info, instrument};
use validator::Validate;

use super::{Outcome, SubmitLatch};
use crate::context::HmsContext;
use crate::core::analytics::sum_field;
use crate::core::validation::{not_blank, validate_submission, Submission};
use crate::error::{HmsError, StoreError};
use crate::models::{
    Collection, InventoryItem, InventoryPatch, Medication, NewInventoryItem, NewPrescription,
    Prescription, PrescriptionPatch, PrescriptionStatus, SortKey,
};
use crate::notify::{deliver, templates};

/// E-prescription form. Medications are added one line at a time.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PrescriptionForm {
    #[validate(custom = "not_blank")]
    pub patient_name: String,
    pub patient_id: String,
    #[validate(email)]
    pub patient_email: Option<String>,
    #[validate(custom = "not_blank")]
    pub doctor_name: String,
    /// Defaults to today.
    pub prescription_date: Option<NaiveDate>,
    pub medications: Vec<Medication>,
}

impl Submission for PrescriptionForm {
    const FIELDS: &'static [&'static str] = &["patient_name", "patient_email", "doctor_name"];
}

impl PrescriptionForm {
    /// Adds a line if it names a medicine and has a quantity. Returns whether
    /// it was added.
    pub fn add_medication(&mut self, draft: Medication) -> bool {
        if draft.medicine_name.trim().is_empty() || draft.quantity == 0 {
            return false;
        }
        self.medications.push(draft);
        true
    }

    pub fn remove_medication(&mut self, index: usize) -> Option<Medication> {
        (index < self.medications.len()).then(|| self.medications.remove(index))
    }

    /// Σ quantity × price_per_unit, unrounded.
    pub fn total(&self) -> f64 {
        sum_field(&self.medications, |m| Some(m.line_total()))
    }

    fn normalized(mut self) -> Self {
        self.patient_name = self.patient_name.trim().to_string();
        self.doctor_name = self.doctor_name.trim().to_string();
        self.patient_email = self
            .patient_email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        let drafts = std::mem::take(&mut self.medications);
        for draft in drafts {
            self.add_medication(draft);
        }
        self
    }

    fn into_new(self, today: NaiveDate) -> NewPrescription {
        let total_amount = self.total();
        NewPrescription {
            patient_name: self.patient_name,
            patient_id: self.patient_id.trim().to_string(),
            patient_email: self.patient_email,
            doctor_name: self.doctor_name,
            prescription_date: self.prescription_date.unwrap_or(today),
            medications: self.medications,
            total_amount,
            status: PrescriptionStatus::Pending,
        }
    }
}

/// Revenue over dispensed prescriptions.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingSummary {
    pub dispensed: Vec<Prescription>,
    pub revenue: f64,
}

impl BillingSummary {
    pub fn from_prescriptions(prescriptions: Vec<Prescription>) -> Self {
        let dispensed: Vec<_> = prescriptions
            .into_iter()
            .filter(|p| p.status == PrescriptionStatus::Dispensed)
            .collect();
        let revenue = sum_field(&dispensed, |p| Some(p.total_amount));
        Self { dispensed, revenue }
    }

    pub fn count(&self) -> usize {
        self.dispensed.len()
    }

    pub fn average(&self) -> f64 {
        if self.dispensed.is_empty() {
            0.0
        } else {
            self.revenue / self.dispensed.len() as f64
        }
    }
}

/// Prescriptions, inventory and billing.
#[derive(Clone)]
pub struct PharmacyDesk {
    ctx: HmsContext,
    prescribe_latch: SubmitLatch,
    dispense_latch: SubmitLatch,
}

impl PharmacyDesk {
    pub fn new(ctx: HmsContext) -> Self {
        Self {
            ctx,
            prescribe_latch: SubmitLatch::new(),
            dispense_latch: SubmitLatch::new(),
        }
    }

    /// Newest first.
    pub async fn prescriptions(&self) -> Result<Vec<Prescription>, HmsError> {
        Ok(self.ctx.list::<Prescription>(Some(SortKey::newest_first())).await?)
    }

    pub async fn inventory(&self) -> Result<Vec<InventoryItem>, HmsError> {
        Ok(self.ctx.list::<InventoryItem>(None).await?)
    }

    pub async fn low_stock(&self) -> Result<Vec<InventoryItem>, HmsError> {
        let items = self.inventory().await?;
        Ok(items.into_iter().filter(InventoryItem::is_low_stock).collect())
    }

    pub async fn billing(&self) -> Result<BillingSummary, HmsError> {
        Ok(BillingSummary::from_prescriptions(self.prescriptions().await?))
    }

    pub async fn find(&self, id: &str) -> Result<Prescription, HmsError> {
        self.prescriptions()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| {
                StoreError::NotFound {
                    collection: Collection::Prescription,
                    id: id.to_string(),
                }
                .into()
            })
    }

    #[instrument(skip(self, form))]
    pub async fn prescribe(&self, form: PrescriptionForm) -> Result<Prescription, HmsError> {
        let _claim = self.prescribe_latch.try_claim()?;
        let form = form.normalized();
        validate_submission(&form)?;

        let record = form.into_new(Utc::now().date_naive());
        let created = self.ctx.create::<Prescription>(&record).await.map_err(|e| {
            error!("Error creating prescription: {}", e);
            e
        })?;
        info!(
            "Prescription {} created with {} medications",
            created.id,
            created.medications.len()
        );
        Ok(created)
    }

    /// Marks a pending prescription dispensed, then emails the patient if an
    /// address is on file. A failed email never undoes the dispense.
    #[instrument(skip(self, rx), fields(id = %rx.id))]
    pub async fn dispense(&self, rx: &Prescription) -> Result<Outcome<Prescription>, HmsError> {
        let _claim = self.dispense_latch.try_claim()?;
        if rx.status != PrescriptionStatus::Pending {
            return Err(HmsError::InvalidTransition {
                collection: Collection::Prescription,
                from: rx.status.as_str().to_string(),
            });
        }

        let patch = PrescriptionPatch {
            status: PrescriptionStatus::Dispensed,
            dispensed_by: Some(self.ctx.settings.pharmacy.pharmacist_name.clone()),
            dispensed_date: Some(Utc::now().date_naive()),
        };
        let updated = self.ctx.update::<Prescription>(&rx.id, &patch).await.map_err(|e| {
            error!("Error dispensing prescription {}: {}", rx.id, e);
            e
        })?;

        let delivery = deliver(self.ctx.notifier.as_ref(), templates::prescription_ready(rx)).await;
        Ok(Outcome {
            record: updated,
            delivery,
        })
    }

    pub async fn dispense_by_id(&self, id: &str) -> Result<Outcome<Prescription>, HmsError> {
        let rx = self.find(id).await?;
        self.dispense(&rx).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update_inventory(
        &self,
        id: &str,
        patch: InventoryPatch,
    ) -> Result<InventoryItem, HmsError> {
        if patch.is_empty() {
            return Err(HmsError::InvalidField {
                field: "inventory",
                reason: "no fields to update".into(),
            });
        }
        if patch.quantity.map_or(false, |q| q < 0) {
            return Err(HmsError::InvalidField {
                field: "quantity",
                reason: "must not be negative".into(),
            });
        }
        Ok(self.ctx.update::<InventoryItem>(id, &patch).await?)
    }

    pub async fn stock_item(&self, item: NewInventoryItem) -> Result<InventoryItem, HmsError> {
        if item.item_name.trim().is_empty() {
            return Err(HmsError::MissingField("item_name"));
        }
        Ok(self.ctx.create::<InventoryItem>(&item).await?)
    }
}
