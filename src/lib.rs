//! Core library surface for the hospital administration console.
//!
//! The binary only wires these pieces together: a [`Config`] names the SQLite
//! file, [`Database`] hands out one connection per operation, and [`Console`]
//! drives the nested text menus on top of the record operations in [`db`].
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod ui;

/// Configuration passed explicitly into the persistence layer.
pub use config::Config;

/// Connection factory plus schema bootstrap.
pub use db::{ensure_schema, Database};

/// Domain errors that callers may want to downcast from `anyhow::Error`.
pub use error::{Entity, HospitalError};

/// Records moved between the store and the console.
pub use models::{
    Appointment, Bill, BillDetails, BillItem, BillStatus, Doctor, NewAppointment, NewBill,
    NewBillItem, NewDoctor, NewPatient, Patient, RevenueReport,
};

/// The interactive menu loop.
pub use ui::Console;
