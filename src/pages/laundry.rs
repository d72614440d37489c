use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{error, info, instrument};
use validator::Validate;

use super::SubmitLatch;
use crate::context::HmsContext;
use crate::core::analytics::{sum_by, sum_field};
use crate::core::validation::{known_value, not_blank, validate_submission, Submission};
use crate::error::{HmsError, StoreError};
use crate::models::{
    Collection, LaundryItem, LaundryPatch, LaundryPriority, LaundryRequest, LaundryStatus,
    NewLaundryRequest, SortKey,
};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LaundryForm {
    #[validate(custom = "not_blank")]
    pub department: String,
    #[validate(length(min = 1))]
    pub items: Vec<LaundryItem>,
    pub cost: Option<f64>,
    #[validate(custom = "known_value")]
    pub priority: LaundryPriority,
    pub notes: Option<String>,
}

impl Submission for LaundryForm {
    const FIELDS: &'static [&'static str] = &["department", "items", "priority"];
}

impl LaundryForm {
    fn normalized(mut self) -> Self {
        self.department = self.department.trim().to_string();
        self.items.retain(|item| !item.item_type.trim().is_empty() && item.quantity > 0);
        self.notes = self.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        self
    }

    fn into_new(self) -> Result<NewLaundryRequest, HmsError> {
        let total_items = self
            .items
            .iter()
            .try_fold(0u32, |total, item| total.checked_add(item.quantity))
            .ok_or_else(|| HmsError::InvalidField {
                field: "items",
                reason: format!("total quantity exceeds {}", u32::MAX),
            })?;
        Ok(NewLaundryRequest {
            department: self.department,
            items: self.items,
            total_items,
            cost: self.cost,
            priority: self.priority,
            notes: self.notes,
            status: LaundryStatus::Pending,
        })
    }
}

/// Linen totals across all requests.
#[derive(Debug, Clone, PartialEq)]
pub struct LaundryOverview {
    pub requests: usize,
    pub total_items: u64,
    pub total_cost: f64,
    /// Quantity per item type.
    pub distribution: BTreeMap<String, u64>,
}

impl LaundryOverview {
    pub fn from_requests(requests: &[LaundryRequest]) -> Self {
        let items: Vec<&LaundryItem> = requests.iter().flat_map(|r| r.items.iter()).collect();
        Self {
            requests: requests.len(),
            total_items: requests.iter().map(|r| u64::from(r.total_items)).sum(),
            total_cost: sum_field(requests, |r| r.cost),
            distribution: sum_by(
                &items,
                |item| item.item_type.clone(),
                |item| u64::from(item.quantity),
            ),
        }
    }
}

#[derive(Clone)]
pub struct LaundryDesk {
    ctx: HmsContext,
    latch: SubmitLatch,
}

impl LaundryDesk {
    pub fn new(ctx: HmsContext) -> Self {
        Self {
            ctx,
            latch: SubmitLatch::new(),
        }
    }

    pub async fn requests(&self) -> Result<Vec<LaundryRequest>, HmsError> {
        Ok(self.ctx.list::<LaundryRequest>(Some(SortKey::newest_first())).await?)
    }

    pub async fn active(&self) -> Result<Vec<LaundryRequest>, HmsError> {
        let requests = self.requests().await?;
        Ok(requests
            .into_iter()
            .filter(|r| r.status != LaundryStatus::Delivered)
            .collect())
    }

    #[instrument(skip(self, form))]
    pub async fn request(&self, form: LaundryForm) -> Result<LaundryRequest, HmsError> {
        let _claim = self.latch.try_claim()?;
        let form = form.normalized();
        validate_submission(&form)?;

        let record = form.into_new()?;
        let created = self
            .ctx
            .create::<LaundryRequest>(&record)
            .await
            .map_err(|e| {
                error!("Error creating laundry request: {}", e);
                e
            })?;
        info!(
            "Laundry request {} for {} ({} items)",
            created.id, created.department, created.total_items
        );
        Ok(created)
    }

    /// pending → picked_up → processing → delivered, one stage per call.
    #[instrument(skip(self, request), fields(id = %request.id, from = request.status.as_str()))]
    pub async fn advance(&self, request: &LaundryRequest) -> Result<LaundryRequest, HmsError> {
        let next = request.status.next().ok_or_else(|| HmsError::InvalidTransition {
            collection: Collection::LaundryRequest,
            from: request.status.as_str().to_string(),
        })?;
        Ok(self
            .ctx
            .update::<LaundryRequest>(&request.id, &LaundryPatch { status: next })
            .await?)
    }

    pub async fn advance_by_id(&self, id: &str) -> Result<LaundryRequest, HmsError> {
        let request = self
            .requests()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: Collection::LaundryRequest,
                id: id.to_string(),
            })?;
        self.advance(&request).await
    }

    pub async fn overview(&self) -> Result<LaundryOverview, HmsError> {
        Ok(LaundryOverview::from_requests(&self.requests().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::config::Settings;
    use crate::notify::LogNotifier;
    use crate::store::MockEntityStore;

    fn desk(store: MockEntityStore) -> LaundryDesk {
        let ctx = HmsContext::new(Arc::new(store), Arc::new(LogNotifier), Settings::default());
        LaundryDesk::new(ctx)
    }

    fn item(kind: &str, quantity: u32) -> LaundryItem {
        LaundryItem {
            item_type: kind.into(),
            quantity,
        }
    }

    #[tokio::test]
    async fn request_needs_department_and_items() {
        let desk = desk(MockEntityStore::new());

        let err = desk
            .request(LaundryForm {
                items: vec![item("bed_sheets", 4)],
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, HmsError::MissingField("department")));

        let err = desk
            .request(LaundryForm {
                department: "ICU".into(),
                items: vec![item("gowns", 0)],
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, HmsError::MissingField("items")));
    }

    #[tokio::test]
    async fn request_totals_item_quantities() {
        let mut store = MockEntityStore::new();
        store
            .expect_create()
            .withf(|_, record| record["total_items"] == 7 && record["status"] == "pending")
            .times(1)
            .returning(|_, mut record| {
                record["id"] = json!("l1");
                Ok(record)
            });

        let created = desk(store)
            .request(LaundryForm {
                department: "ICU".into(),
                items: vec![item("bed_sheets", 4), item("gowns", 3)],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.total_items, 7);
    }

    #[tokio::test]
    async fn item_total_past_u32_is_rejected_before_the_store() {
        let err = desk(MockEntityStore::new())
            .request(LaundryForm {
                department: "ICU".into(),
                items: vec![item("bed_sheets", u32::MAX), item("gowns", 1)],
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, HmsError::InvalidField { field: "items", .. }));
    }

    #[tokio::test]
    async fn off_list_priority_is_rejected_at_intake() {
        let err = desk(MockEntityStore::new())
            .request(LaundryForm {
                department: "ICU".into(),
                items: vec![item("gowns", 2)],
                priority: LaundryPriority::Unrecognized("asap".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, HmsError::InvalidField { field: "priority", .. }));
    }

    #[tokio::test]
    async fn delivered_request_does_not_advance() {
        let request: LaundryRequest =
            serde_json::from_value(json!({ "id": "l1", "department": "ICU", "status": "delivered" })).unwrap();
        let err = desk(MockEntityStore::new()).advance(&request).await.unwrap_err();
        assert!(matches!(err, HmsError::InvalidTransition { .. }));
    }

    #[test]
    fn overview_sums_items_and_cost() {
        let requests: Vec<LaundryRequest> = serde_json::from_value(json!([
            { "id": "1", "department": "ICU", "items": [{ "item_type": "bed_sheets", "quantity": 10 }], "total_items": 10, "cost": 10.5 },
            { "id": "2", "department": "ER", "items": [{ "item_type": "gowns", "quantity": 2 }], "total_items": 2 },
            { "id": "3", "department": "OR", "items": [{ "item_type": "bed_sheets", "quantity": 5 }], "total_items": 5, "cost": 19.49 }
        ]))
        .unwrap();

        let overview = LaundryOverview::from_requests(&requests);
        assert_eq!(overview.requests, 3);
        assert_eq!(overview.total_items, 17);
        assert!((overview.total_cost - 29.99).abs() < 1e-9);
        assert_eq!(overview.distribution["bed_sheets"], 15);
        assert_eq!(overview.distribution["gowns"], 2);
    }
}
