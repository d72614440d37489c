use serde::{Deserialize, Serialize};

use super::{Collection, Entity};

open_enum! {
    pub enum ComplaintCategory {
        MedicalCare => "medical_care",
        StaffBehavior => "staff_behavior",
        Facility => "facility",
        Billing => "billing",
        Appointment => "appointment",
        Pharmacy => "pharmacy",
        Other => "other",
    }
}

open_enum! {
    #[derive(Default)]
    pub enum ComplaintPriority {
        Low => "low",
        #[default]
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

open_enum! {
    #[derive(Default)]
    pub enum ComplaintStatus {
        #[default]
        Submitted => "submitted",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
}

impl ComplaintStatus {
    /// Resolved and closed tickets count toward the resolution rate.
    pub fn is_settled(&self) -> bool {
        matches!(self, ComplaintStatus::Resolved | ComplaintStatus::Closed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintTicket {
    pub id: String,
    pub ticket_id: String,
    pub complainant_name: String,
    pub contact_info: String,
    pub category: ComplaintCategory,
    #[serde(default)]
    pub priority: ComplaintPriority,
    pub description: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub status: ComplaintStatus,
    #[serde(default)]
    pub created_date: Option<String>,
}

impl ComplaintTicket {
    /// Email acknowledgements go out only when the contact looks like an address.
    pub fn email_contact(&self) -> Option<&str> {
        let contact = self.contact_info.trim();
        contact.contains('@').then_some(contact)
    }
}

impl Entity for ComplaintTicket {
    const COLLECTION: Collection = Collection::ComplaintTicket;
    type New = NewComplaintTicket;
    type Patch = ComplaintPatch;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewComplaintTicket {
    pub ticket_id: String,
    pub complainant_name: String,
    pub contact_info: String,
    pub category: ComplaintCategory,
    pub priority: ComplaintPriority,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub status: ComplaintStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintPatch {
    pub status: ComplaintStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn off_list_values_still_decode() {
        let ticket: ComplaintTicket = serde_json::from_value(json!({
            "id": "c1",
            "ticket_id": "T1",
            "complainant_name": "Sam",
            "contact_info": "sam@example.org",
            "category": "parking",
            "priority": "whenever",
            "description": "No spaces left",
            "status": "escalated"
        }))
        .unwrap();

        assert_eq!(ticket.category, ComplaintCategory::Unrecognized("parking".into()));
        assert_eq!(ticket.category.as_str(), "parking");
        assert_eq!(ticket.priority.as_str(), "whenever");
        assert!(!ticket.status.is_settled());
    }
}
