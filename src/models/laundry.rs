use serde::{Deserialize, Serialize};

use super::{Collection, Entity};

open_enum! {
    #[derive(Default)]
    pub enum LaundryStatus {
        #[default]
        Pending => "pending",
        PickedUp => "picked_up",
        Processing => "processing",
        Delivered => "delivered",
    }
}

impl LaundryStatus {
    /// Linen only ever moves forward, one stage at a time. An unrecognized
    /// stage has no successor.
    pub fn next(&self) -> Option<LaundryStatus> {
        match self {
            LaundryStatus::Pending => Some(LaundryStatus::PickedUp),
            LaundryStatus::PickedUp => Some(LaundryStatus::Processing),
            LaundryStatus::Processing => Some(LaundryStatus::Delivered),
            LaundryStatus::Delivered | LaundryStatus::Unrecognized(_) => None,
        }
    }
}

open_enum! {
    #[derive(Default)]
    pub enum LaundryPriority {
        #[default]
        Routine => "routine",
        Urgent => "urgent",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaundryItem {
    pub item_type: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaundryRequest {
    pub id: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub items: Vec<LaundryItem>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub priority: LaundryPriority,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: LaundryStatus,
    #[serde(default)]
    pub created_date: Option<String>,
}

impl Entity for LaundryRequest {
    const COLLECTION: Collection = Collection::LaundryRequest;
    type New = NewLaundryRequest;
    type Patch = LaundryPatch;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLaundryRequest {
    pub department: String,
    pub items: Vec<LaundryItem>,
    pub total_items: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    pub priority: LaundryPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: LaundryStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaundryPatch {
    pub status: LaundryStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn laundry_moves_forward_until_delivered() {
        let mut status = LaundryStatus::default();
        let mut seen = vec![status.clone()];
        while let Some(next) = status.next() {
            seen.push(next.clone());
            status = next;
        }
        assert_eq!(
            seen,
            vec![
                LaundryStatus::Pending,
                LaundryStatus::PickedUp,
                LaundryStatus::Processing,
                LaundryStatus::Delivered
            ]
        );
    }

    #[test]
    fn unrecognized_stage_has_no_successor() {
        let request: LaundryRequest = serde_json::from_value(serde_json::json!({
            "id": "l1",
            "department": "ICU",
            "status": "lost",
            "priority": "asap"
        }))
        .unwrap();
        assert_eq!(request.status.next(), None);
        assert_eq!(request.priority.as_str(), "asap");
    }
}
