//! Domain models that mirror the SQLite schema. They stay plain data holders;
//! the `db` modules own the queries and the `ui` modules own presentation.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

#[derive(Debug, Clone, PartialEq)]
/// A registered patient. Referenced by appointments and bills.
pub struct Patient {
    /// Primary key assigned by SQLite, never reused or changed.
    pub id: i64,
    /// Name exactly as it was typed at registration.
    pub name: String,
    /// Age in years; the only field validated on input.
    pub age: i64,
    /// Free text, the console suggests M/F/O.
    pub gender: String,
    /// Contact number kept as text so leading zeros and dashes survive.
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Input for a patient that does not have an id yet.
pub struct NewPatient {
    /// See [`Patient::name`].
    pub name: String,
    /// See [`Patient::age`].
    pub age: i64,
    /// See [`Patient::gender`].
    pub gender: String,
    /// See [`Patient::phone`].
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq)]
/// A doctor on staff. Appointments point at one.
pub struct Doctor {
    /// Primary key assigned by SQLite.
    pub id: i64,
    /// Shown with a `Dr.` prefix in listings.
    pub name: String,
    /// Free-text department or specialty.
    pub specialization: String,
    /// Contact number as text.
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Input for a doctor that does not have an id yet.
pub struct NewDoctor {
    /// See [`Doctor::name`].
    pub name: String,
    /// See [`Doctor::specialization`].
    pub specialization: String,
    /// See [`Doctor::phone`].
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Appointment row joined with the patient and doctor names for listing.
pub struct Appointment {
    /// Primary key assigned by SQLite.
    pub id: i64,
    /// Name of the referenced patient.
    pub patient_name: String,
    /// Name of the referenced doctor, without the `Dr.` prefix.
    pub doctor_name: String,
    /// Free text, conventionally `YYYY-MM-DD`. Not validated as a calendar date.
    pub date: String,
    /// Free text, conventionally `HH:MM`.
    pub time: String,
    /// `None` when no notes were entered.
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
/// Input for scheduling an appointment.
pub struct NewAppointment {
    /// Must name an existing patient.
    pub patient_id: i64,
    /// Must name an existing doctor.
    pub doctor_id: i64,
    /// See [`Appointment::date`].
    pub date: String,
    /// See [`Appointment::time`].
    pub time: String,
    /// Blank notes are stored as NULL.
    pub notes: Option<String>,
}

/// Lifecycle of a bill. The only transition is `Unpaid` to `Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillStatus {
    /// Initial state of every new bill.
    Unpaid,
    /// Final state; there is no way back to `Unpaid`.
    Paid,
}

impl BillStatus {
    /// Text stored in the `bills.status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Unpaid => "UNPAID",
            BillStatus::Paid => "PAID",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNPAID" => Ok(BillStatus::Unpaid),
            "PAID" => Ok(BillStatus::Paid),
            other => Err(anyhow!("unknown bill status '{other}'")),
        }
    }
}

impl ToSql for BillStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BillStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse()
            .map_err(|err: anyhow::Error| FromSqlError::Other(err.into()))
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Bill summary joined with the patient name. `total_amount` is fixed when the
/// bill is created and never recomputed from its items.
pub struct Bill {
    /// Primary key assigned by SQLite.
    pub id: i64,
    /// Name of the billed patient.
    pub patient_name: String,
    /// Appointment the bill was raised for, if any.
    pub appointment_id: Option<i64>,
    /// Sum of the item amounts at creation time.
    pub total_amount: f64,
    /// Current lifecycle state.
    pub status: BillStatus,
    /// Local timestamp formatted as `YYYY-MM-DD HH:MM:SS`.
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
/// One line of a bill. Written together with its bill and never edited.
pub struct BillItem {
    /// Primary key assigned by SQLite.
    pub id: i64,
    /// The bill this line belongs to.
    pub bill_id: i64,
    /// Service or product being charged.
    pub description: String,
    /// Charge for this line.
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
/// A bill line collected before the bill exists.
pub struct NewBillItem {
    /// See [`BillItem::description`].
    pub description: String,
    /// See [`BillItem::amount`].
    pub amount: f64,
}

impl NewBillItem {
    /// Build a line from any string-like description.
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Everything needed to create a bill in one transaction.
pub struct NewBill {
    /// Must name an existing patient.
    pub patient_id: i64,
    /// Optional; when set it must name an existing appointment.
    pub appointment_id: Option<i64>,
    /// At least one line is required.
    pub items: Vec<NewBillItem>,
}

impl NewBill {
    /// Sum of the item amounts, stored as the bill total.
    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.amount).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A bill together with its line items, as shown by the detail view.
pub struct BillDetails {
    /// Summary row.
    pub bill: Bill,
    /// Lines in insertion order.
    pub items: Vec<BillItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// Totals of bill amounts grouped by status. Empty groups sum to zero.
pub struct RevenueReport {
    /// Sum over PAID bills.
    pub paid: f64,
    /// Sum over UNPAID bills.
    pub unpaid: f64,
}
