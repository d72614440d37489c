//! Reductions over collections that have already been fetched.
//!
//! All functions here are pure: same input, same output, nothing persisted.
//! Grouping keys are never normalized; `display_label` is for rendering only.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::ComplaintTicket;

/// Groups on the exact key and counts members.
pub fn count_by<T, K, F>(items: &[T], key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

/// Like `count_by`, but adds up a per-item weight instead of counting.
pub fn sum_by<T, K, F, W>(items: &[T], key: F, weight: W) -> BTreeMap<K, u64>
where
    K: Ord,
    F: Fn(&T) -> K,
    W: Fn(&T) -> u64,
{
    let mut totals = BTreeMap::new();
    for item in items {
        *totals.entry(key(item)).or_insert(0) += weight(item);
    }
    totals
}

/// Arithmetic sum where a missing value counts as zero. Not rounded.
pub fn sum_field<T, F>(items: &[T], field: F) -> f64
where
    F: Fn(&T) -> Option<f64>,
{
    items.iter().map(|item| field(item).unwrap_or(0.0)).sum()
}

/// Share of resolved or closed tickets as a percentage with one decimal.
/// An empty list is 0.0.
pub fn resolution_rate(complaints: &[ComplaintTicket]) -> f64 {
    if complaints.is_empty() {
        return 0.0;
    }
    let settled = complaints.iter().filter(|c| c.status.is_settled()).count();
    round_to(settled as f64 / complaints.len() as f64 * 100.0, 1)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `medical_care` -> `medical care`
pub fn display_label(key: &str) -> String {
    key.replace('_', " ")
}

/// Two-decimal money formatting, applied only when rendering.
pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDatum {
    pub name: String,
    pub value: f64,
}

/// Turns `(key, value)` pairs into labelled chart points.
pub fn chart_data<K, I>(groups: I) -> Vec<ChartDatum>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, f64)>,
{
    groups
        .into_iter()
        .map(|(name, value)| ChartDatum {
            name: display_label(name.as_ref()),
            value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComplaintCategory, ComplaintPriority, ComplaintStatus};
    use test_case::test_case;

    fn ticket(category: ComplaintCategory, status: ComplaintStatus) -> ComplaintTicket {
        ComplaintTicket {
            id: "c".into(),
            ticket_id: "TCK1".into(),
            complainant_name: "Sam".into(),
            contact_info: "555-0100".into(),
            category,
            priority: ComplaintPriority::Medium,
            description: "Long wait".into(),
            department: None,
            status,
            created_date: None,
        }
    }

    #[test]
    fn count_by_groups_exact_categories() {
        use ComplaintCategory::{Billing, Facility, Other};
        let complaints: Vec<_> = [Billing, Billing, Facility, Other, Billing]
            .into_iter()
            .map(|c| ticket(c, ComplaintStatus::Submitted))
            .collect();

        let counts = count_by(&complaints, |c| c.category.as_str().to_string());

        assert_eq!(counts.get("billing"), Some(&3));
        assert_eq!(counts.get("facility"), Some(&1));
        assert_eq!(counts.get("other"), Some(&1));
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.values().sum::<usize>(), complaints.len());
    }

    #[test]
    fn count_by_keeps_underscored_keys_intact() {
        let complaints = vec![ticket(ComplaintCategory::MedicalCare, ComplaintStatus::Submitted)];
        let counts = count_by(&complaints, |c| c.category.as_str().to_string());
        assert!(counts.contains_key("medical_care"));

        let chart = chart_data(counts.iter().map(|(k, v)| (k.as_str(), *v as f64)));
        assert_eq!(chart[0].name, "medical care");
    }

    #[test]
    fn resolution_rate_of_empty_list_is_zero() {
        let rate = resolution_rate(&[]);
        assert_eq!(rate, 0.0);
        assert!(!rate.is_nan());
    }

    #[test_case(
        &[ComplaintStatus::Resolved, ComplaintStatus::Submitted, ComplaintStatus::Closed],
        66.7 ;
        "two of three"
    )]
    #[test_case(&[ComplaintStatus::Submitted, ComplaintStatus::InProgress], 0.0 ; "none settled")]
    #[test_case(&[ComplaintStatus::Closed], 100.0 ; "all settled")]
    fn resolution_rate_rounds_to_one_decimal(statuses: &[ComplaintStatus], expected: f64) {
        let complaints: Vec<_> = statuses
            .iter()
            .map(|s| ticket(ComplaintCategory::Other, s.clone()))
            .collect();
        assert_eq!(resolution_rate(&complaints), expected);
    }

    #[test]
    fn sum_field_treats_missing_as_zero_and_does_not_round() {
        let costs = [Some(10.5), None, Some(0.0), Some(19.49)];
        let total = sum_field(&costs, |c| *c);
        assert!((total - 29.99).abs() < 1e-9);
        assert_eq!(format_currency(total), "$29.99");
    }

    #[test]
    fn sum_by_adds_weights_per_key() {
        let items = [("bed_sheets", 10u64), ("gowns", 4), ("bed_sheets", 5)];
        let totals = sum_by(&items, |(kind, _)| kind.to_string(), |(_, qty)| *qty);
        assert_eq!(totals["bed_sheets"], 15);
        assert_eq!(totals["gowns"], 4);
    }
}
