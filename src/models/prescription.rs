use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{is_blank, Collection, Entity};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrescriptionStatus {
    #[default]
    Pending,
    Dispensed,
}

impl PrescriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrescriptionStatus::Pending => "pending",
            PrescriptionStatus::Dispensed => "dispensed",
        }
    }
}

/// One line of an e-prescription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub medicine_name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub price_per_unit: f64,
}

impl Medication {
    pub fn line_total(&self) -> f64 {
        f64::from(self.quantity) * self.price_per_unit
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: String,
    pub patient_name: String,
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub patient_email: Option<String>,
    pub doctor_name: String,
    #[serde(default)]
    pub prescription_date: Option<NaiveDate>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub status: PrescriptionStatus,
    #[serde(default)]
    pub dispensed_by: Option<String>,
    #[serde(default)]
    pub dispensed_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_date: Option<String>,
}

impl Prescription {
    /// Address for the pickup notice, if the patient left one.
    pub fn recipient(&self) -> Option<&str> {
        if is_blank(&self.patient_email) {
            None
        } else {
            self.patient_email.as_deref().map(str::trim)
        }
    }
}

impl Entity for Prescription {
    const COLLECTION: Collection = Collection::Prescription;
    type New = NewPrescription;
    type Patch = PrescriptionPatch;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPrescription {
    pub patient_name: String,
    pub patient_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_email: Option<String>,
    pub doctor_name: String,
    pub prescription_date: NaiveDate,
    pub medications: Vec<Medication>,
    pub total_amount: f64,
    pub status: PrescriptionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrescriptionPatch {
    pub status: PrescriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispensed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispensed_date: Option<NaiveDate>,
}
