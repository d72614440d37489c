//! HTML bodies for the outgoing notification emails.

use crate::core::analytics::{display_label, format_currency};
use crate::models::{ComplaintTicket, Prescription};

use super::Email;

pub const PRESCRIPTION_READY_SUBJECT: &str = "Prescription Ready for Pickup - MediCare Pharmacy";

/// Escapes the characters that matter inside HTML text and attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Pickup notice for a dispensed prescription. `None` when the patient left no email.
pub fn prescription_ready(rx: &Prescription) -> Option<Email> {
    let to = rx.recipient()?;
    let date = rx
        .prescription_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let body = format!(
        "<h2>Prescription Dispensed</h2>\
         <p>Dear {patient},</p>\
         <p>Your prescription has been filled and is ready for pickup.</p>\
         <br>\
         <p><strong>Prescription Details:</strong></p>\
         <ul>\
         <li><strong>Doctor:</strong> {doctor}</li>\
         <li><strong>Date:</strong> {date}</li>\
         <li><strong>Total Medications:</strong> {count} items</li>\
         <li><strong>Total Amount:</strong> {total}</li>\
         </ul>\
         <br>\
         <p>Please collect your medication from the pharmacy counter during business hours.</p>\
         <p>Best regards,<br>MediCare Pharmacy</p>",
        patient = escape_html(&rx.patient_name),
        doctor = escape_html(&rx.doctor_name),
        date = date,
        count = rx.medications.len(),
        total = format_currency(rx.total_amount),
    );

    Some(Email {
        to: to.to_string(),
        subject: PRESCRIPTION_READY_SUBJECT.to_string(),
        body,
    })
}

/// Acknowledgement for a newly filed complaint. Sent only when the contact
/// info is an email address.
pub fn complaint_received(ticket: &ComplaintTicket) -> Option<Email> {
    let to = ticket.email_contact()?;

    let body = format!(
        "<h2>Complaint Acknowledgment</h2>\
         <p>Dear {name},</p>\
         <p>Thank you for bringing this matter to our attention. We have received your \
         complaint and assigned it ticket number <strong>{ticket_id}</strong>.</p>\
         <br>\
         <p><strong>Category:</strong> {category}</p>\
         <p><strong>Priority:</strong> {priority}</p>\
         <br>\
         <p>Our team will review your complaint and respond within 24-48 hours.</p>\
         <p>You can track your complaint status using the ticket ID above.</p>\
         <br>\
         <p>Best regards,<br>MediCare Patient Relations Team</p>",
        name = escape_html(&ticket.complainant_name),
        ticket_id = escape_html(&ticket.ticket_id),
        category = display_label(ticket.category.as_str()),
        priority = ticket.priority.as_str(),
    );

    Some(Email {
        to: to.to_string(),
        subject: format!("Complaint Ticket {} - Received", ticket.ticket_id),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ComplaintCategory, ComplaintPriority, ComplaintStatus, Medication, PrescriptionStatus,
    };
    use chrono::NaiveDate;

    fn prescription(email: Option<&str>) -> Prescription {
        Prescription {
            id: "rx1".into(),
            patient_name: "Grace <Admin>".into(),
            patient_id: "P-7".into(),
            patient_email: email.map(str::to_string),
            doctor_name: "Dr. Hopper".into(),
            prescription_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            medications: vec![
                Medication {
                    medicine_name: "Amoxicillin".into(),
                    quantity: 2,
                    price_per_unit: 3.5,
                    ..Default::default()
                },
                Medication {
                    medicine_name: "Ibuprofen".into(),
                    quantity: 1,
                    price_per_unit: 4.0,
                    ..Default::default()
                },
            ],
            total_amount: 11.0,
            status: PrescriptionStatus::Pending,
            dispensed_by: None,
            dispensed_date: None,
            created_date: None,
        }
    }

    #[test]
    fn prescription_email_lists_details() {
        let email = prescription_ready(&prescription(Some("grace@example.org"))).unwrap();

        assert_eq!(email.to, "grace@example.org");
        assert_eq!(email.subject, PRESCRIPTION_READY_SUBJECT);
        assert!(email.body.contains("Dear Grace &lt;Admin&gt;"));
        assert!(email.body.contains("2024-05-01"));
        assert!(email.body.contains("2 items"));
        assert!(email.body.contains("$11.00"));
    }

    #[test]
    fn no_email_without_address() {
        assert!(prescription_ready(&prescription(None)).is_none());
        assert!(prescription_ready(&prescription(Some(""))).is_none());
    }

    #[test]
    fn complaint_acknowledgement_uses_readable_category() {
        let ticket = ComplaintTicket {
            id: "c1".into(),
            ticket_id: "TCK1700000000000".into(),
            complainant_name: "Sam".into(),
            contact_info: "sam@example.org".into(),
            category: ComplaintCategory::StaffBehavior,
            priority: ComplaintPriority::High,
            description: "Rude".into(),
            department: None,
            status: ComplaintStatus::Submitted,
            created_date: None,
        };

        let email = complaint_received(&ticket).unwrap();
        assert_eq!(email.subject, "Complaint Ticket TCK1700000000000 - Received");
        assert!(email.body.contains("staff behavior"));
        assert!(email.body.contains("<strong>Priority:</strong> high"));

        let phone_only = ComplaintTicket {
            contact_info: "555-0100".into(),
            ..ticket
        };
        assert!(complaint_received(&phone_only).is_none());
    }
}
