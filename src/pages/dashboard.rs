use tracing::instrument;

use crate::context::HmsContext;
use crate::core::triage::{count_critical_open, queue_order};
use crate::error::HmsError;
use crate::models::{
    ComplaintTicket, InventoryItem, LaundryRequest, LaundryStatus, SortKey, TriageCase,
};

/// One module tile with its live statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCard {
    pub title: &'static str,
    pub description: &'static str,
    pub stat_label: &'static str,
    pub stat_value: usize,
    /// CLI subcommand that opens the module.
    pub command: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub cards: Vec<ModuleCard>,
}

impl DashboardView {
    pub fn card(&self, title: &str) -> Option<&ModuleCard> {
        self.cards.iter().find(|c| c.title == title)
    }
}

#[derive(Clone)]
pub struct Dashboard {
    ctx: HmsContext,
}

impl Dashboard {
    pub fn new(ctx: HmsContext) -> Self {
        Self { ctx }
    }

    /// Fetches the four collections concurrently through the cache.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<DashboardView, HmsError> {
        let (cases, inventory, tickets, laundry) = futures::try_join!(
            self.ctx.list::<TriageCase>(Some(queue_order())),
            self.ctx.list::<InventoryItem>(None),
            self.ctx.list::<ComplaintTicket>(Some(SortKey::newest_first())),
            self.ctx.list::<LaundryRequest>(Some(SortKey::newest_first())),
        )?;

        Ok(DashboardView {
            cards: vec![
                ModuleCard {
                    title: "Triage Management",
                    description: "Patient prioritization with symptom assessment",
                    stat_label: "Critical Cases",
                    stat_value: count_critical_open(&cases),
                    command: "triage",
                },
                ModuleCard {
                    title: "Pharmacy System",
                    description: "E-prescriptions, inventory management, and automated billing",
                    stat_label: "Low Stock Items",
                    stat_value: inventory.iter().filter(|i| i.is_low_stock()).count(),
                    command: "pharmacy",
                },
                ModuleCard {
                    title: "Complaints Tracker",
                    description: "Digital grievance system with automated tracking and resolution",
                    stat_label: "Open Tickets",
                    stat_value: tickets.iter().filter(|t| !t.status.is_settled()).count(),
                    command: "complaints",
                },
                ModuleCard {
                    title: "Laundry Management",
                    description: "Real-time tracking of linen flow from pickup to delivery",
                    stat_label: "Active Requests",
                    stat_value: laundry
                        .iter()
                        .filter(|r| r.status != LaundryStatus::Delivered)
                        .count(),
                    command: "laundry",
                },
            ],
        })
    }
}
