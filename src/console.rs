//! Plain-text rendering of page views for the `hms` binary.

use std::fmt::Write;

use crate::core::analytics::{chart_data, display_label, format_currency};
use crate::core::triage::TriageQueue;
use crate::models::{InventoryItem, LaundryRequest, Prescription};
use crate::pages::{BillingSummary, ComplaintAnalytics, DashboardView, LaundryOverview};

pub fn dashboard(view: &DashboardView) -> String {
    let mut out = String::from("MediCare HMS\n");
    for card in &view.cards {
        let _ = writeln!(
            out,
            "  {:<22} {:>5}  {:<16} (hms {})",
            card.title, card.stat_value, card.stat_label, card.command
        );
    }
    out
}

pub fn triage_queue(queue: &TriageQueue) -> String {
    if queue.is_empty() {
        return "No patients in queue\n".to_string();
    }

    let mut out = String::new();
    for entry in queue.entries() {
        let case = entry.case;
        let severity = entry
            .style
            .map(|s| s.label.to_string())
            .unwrap_or_else(|| case.severity_level.as_str().to_string());
        let action = entry.action.map(|a| a.label).unwrap_or("-");
        let _ = writeln!(
            out,
            "{:<12} {:<24} {:<10} score {:>3}  {:<12} [{}]",
            case.id,
            case.patient_name,
            severity,
            case.priority_score,
            display_label(case.status.as_str()),
            action
        );
        if !case.symptoms.is_empty() {
            let _ = writeln!(out, "{:>13}{}", "", case.symptoms.join(", "));
        }
    }

    let summary: Vec<String> = queue
        .severity_summary()
        .into_iter()
        .map(|(label, n)| format!("{} {}", n, label))
        .collect();
    if !summary.is_empty() {
        let _ = writeln!(out, "Open: {}", summary.join(", "));
    }
    out
}

pub fn prescriptions(list: &[Prescription]) -> String {
    if list.is_empty() {
        return "No prescriptions\n".to_string();
    }
    let mut out = String::new();
    for rx in list {
        let _ = writeln!(
            out,
            "{:<12} {:<20} {:<18} {:>2} meds {:>10}  {}",
            rx.id,
            rx.patient_name,
            rx.doctor_name,
            rx.medications.len(),
            format_currency(rx.total_amount),
            rx.status.as_str()
        );
    }
    out
}

pub fn billing(summary: &BillingSummary) -> String {
    let mut out = String::new();
    for rx in &summary.dispensed {
        let date = rx
            .dispensed_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "{:<12} {:<20} {:<10} {:>10}",
            rx.id,
            rx.patient_name,
            date,
            format_currency(rx.total_amount)
        );
    }
    let _ = writeln!(
        out,
        "{} dispensed, revenue {}, average {}",
        summary.count(),
        format_currency(summary.revenue),
        format_currency(summary.average())
    );
    out
}

pub fn inventory(items: &[InventoryItem]) -> String {
    if items.is_empty() {
        return "No inventory items\n".to_string();
    }
    let mut out = String::new();
    for item in items {
        let flag = if item.is_low_stock() { "LOW" } else { "" };
        let _ = writeln!(
            out,
            "{:<12} {:<24} qty {:>5} / reorder {:>4} {}",
            item.id, item.item_name, item.quantity, item.reorder_level, flag
        );
    }
    out
}

pub fn complaint_analytics(analytics: &ComplaintAnalytics) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Total {}  Open {}  Resolution rate {:.1}%",
        analytics.total,
        analytics.open(),
        analytics.resolution_rate
    );
    for (heading, groups) in [
        ("By category", &analytics.by_category),
        ("By status", &analytics.by_status),
        ("By priority", &analytics.by_priority),
    ] {
        let _ = writeln!(out, "{}:", heading);
        for datum in chart_data(groups.iter().map(|(k, v)| (k.as_str(), *v as f64))) {
            let _ = writeln!(out, "  {:<16} {}", datum.name, datum.value);
        }
    }
    out
}

pub fn laundry_requests(requests: &[LaundryRequest]) -> String {
    if requests.is_empty() {
        return "No laundry requests\n".to_string();
    }
    let mut out = String::new();
    for request in requests {
        let _ = writeln!(
            out,
            "{:<12} {:<16} {:>4} items  {:<10} {}",
            request.id,
            request.department,
            request.total_items,
            display_label(request.status.as_str()),
            request.priority.as_str()
        );
    }
    out
}

pub fn laundry_overview(overview: &LaundryOverview) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} requests, {} items processed, total cost {}",
        overview.requests,
        overview.total_items,
        format_currency(overview.total_cost)
    );
    for datum in chart_data(overview.distribution.iter().map(|(k, v)| (k, *v as f64))) {
        let _ = writeln!(out, "  {:<16} {}", datum.name, datum.value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::ModuleCard;

    #[test]
    fn dashboard_lists_every_card() {
        let view = DashboardView {
            cards: vec![ModuleCard {
                title: "Triage Management",
                description: "",
                stat_label: "Critical Cases",
                stat_value: 3,
                command: "triage",
            }],
        };
        let text = dashboard(&view);
        assert!(text.contains("Triage Management"));
        assert!(text.contains("Critical Cases"));
    }

    #[test]
    fn empty_queue_says_so() {
        assert_eq!(triage_queue(&TriageQueue::default()), "No patients in queue\n");
    }
}
