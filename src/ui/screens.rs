//! Text rendering for each record type. Every function returns plain strings so
//! the console decides where they go.

use crate::models::{Appointment, Bill, BillItem, Doctor, Patient, RevenueReport};

/// Currency label printed in front of every amount.
const CURRENCY: &str = "Rs.";

pub(crate) fn money(amount: f64) -> String {
    format!("{CURRENCY} {amount:.2}")
}

pub(crate) fn patient_line(patient: &Patient) -> String {
    format!(
        "ID: {} | {} | Age: {} | Gender: {} | Phone: {}",
        patient.id, patient.name, patient.age, patient.gender, patient.phone
    )
}

pub(crate) fn doctor_line(doctor: &Doctor) -> String {
    format!(
        "ID: {} | Dr. {} | {} | Phone: {}",
        doctor.id, doctor.name, doctor.specialization, doctor.phone
    )
}

pub(crate) fn appointment_line(appointment: &Appointment) -> String {
    format!(
        "ID: {} | Patient: {} | Doctor: Dr. {} | {} {} | Notes: {}",
        appointment.id,
        appointment.patient_name,
        appointment.doctor_name,
        appointment.date,
        appointment.time,
        appointment.notes.as_deref().unwrap_or("")
    )
}

pub(crate) fn bill_line(bill: &Bill) -> String {
    format!(
        "ID: {} | Patient: {} | Total: {} | Status: {} | Created: {}",
        bill.id,
        bill.patient_name,
        money(bill.total_amount),
        bill.status,
        bill.created_at
    )
}

/// Header block of the bill detail view.
pub(crate) fn bill_summary_lines(bill: &Bill) -> Vec<String> {
    let mut lines = vec![
        format!("Bill ID: {}", bill.id),
        format!("Patient: {}", bill.patient_name),
    ];
    if let Some(appointment_id) = bill.appointment_id {
        lines.push(format!("Appointment ID: {appointment_id}"));
    }
    lines.push(format!("Total: {}", money(bill.total_amount)));
    lines.push(format!("Status: {}", bill.status));
    lines.push(format!("Created At: {}", bill.created_at));
    lines
}

pub(crate) fn bill_item_line(item: &BillItem) -> String {
    format!("- {}: {}", item.description, money(item.amount))
}

pub(crate) fn revenue_lines(report: &RevenueReport) -> [String; 2] {
    [
        format!("Total collected (PAID): {}", money(report.paid)),
        format!("Pending amount (UNPAID): {}", money(report.unpaid)),
    ]
}
