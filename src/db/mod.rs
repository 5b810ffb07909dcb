//! Persistence module split across one submodule per record type.

mod appointments;
mod bills;
mod connection;
mod doctors;
mod patients;

pub use appointments::{create_appointment, fetch_appointments};
pub use bills::{
    create_bill, create_bill_at, fetch_bill_details, fetch_bills, pay_bill, revenue_report,
};
pub use connection::{ensure_schema, Database};
pub use doctors::{create_doctor, fetch_doctors};
pub use patients::{create_patient, fetch_patients, search_patients};

#[cfg(test)]
pub(crate) use connection::test_connection;
