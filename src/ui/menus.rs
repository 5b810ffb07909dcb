//! Menu tables and the leaf operations they dispatch to. Every leaf opens its
//! own connection, so the handle is released as soon as the leaf returns.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::db::{
    create_appointment, create_bill, create_doctor, create_patient, fetch_appointments,
    fetch_bill_details, fetch_bills, fetch_doctors, fetch_patients, pay_bill, revenue_report,
    search_patients,
};
use crate::error::{Entity, HospitalError};
use crate::models::{BillStatus, NewAppointment, NewBill, NewBillItem, NewDoctor, NewPatient};

use super::console::Console;
use super::prompt::{is_done, optional_text, parse_amount, parse_int, parse_optional_int};
use super::screens::{
    appointment_line, bill_item_line, bill_line, bill_summary_lines, doctor_line, money,
    patient_line, revenue_lines,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    AddPatient,
    ListPatients,
    SearchPatient,
    AddDoctor,
    ListDoctors,
    AddAppointment,
    ListAppointments,
    CreateBill,
    ListBills,
    ViewBill,
    PayBill,
    RevenueReport,
}

/// A submenu: its title and the numbered leaves it offers. `0` always goes
/// back and is not listed here.
pub(crate) struct Menu {
    pub(crate) title: &'static str,
    pub(crate) entries: &'static [(&'static str, &'static str, Action)],
}

static PATIENT_MENU: Menu = Menu {
    title: "Patient Management",
    entries: &[
        ("1", "Add patient", Action::AddPatient),
        ("2", "List patients", Action::ListPatients),
        ("3", "Search patient", Action::SearchPatient),
    ],
};

static DOCTOR_MENU: Menu = Menu {
    title: "Doctor Management",
    entries: &[
        ("1", "Add doctor", Action::AddDoctor),
        ("2", "List doctors", Action::ListDoctors),
    ],
};

static APPOINTMENT_MENU: Menu = Menu {
    title: "Appointment Management",
    entries: &[
        ("1", "Schedule appointment", Action::AddAppointment),
        ("2", "List appointments", Action::ListAppointments),
    ],
};

static BILLING_MENU: Menu = Menu {
    title: "Billing & Payments",
    entries: &[
        ("1", "Create bill", Action::CreateBill),
        ("2", "List bills", Action::ListBills),
        ("3", "View bill details", Action::ViewBill),
        ("4", "Mark bill as PAID", Action::PayBill),
        ("5", "Revenue report", Action::RevenueReport),
    ],
};

pub(crate) static MAIN_MENU: [(&str, &Menu); 4] = [
    ("1", &PATIENT_MENU),
    ("2", &DOCTOR_MENU),
    ("3", &APPOINTMENT_MENU),
    ("4", &BILLING_MENU),
];

impl<R: BufRead, W: Write> Console<'_, R, W> {
    pub(crate) fn perform(&mut self, action: Action) -> Result<()> {
        match action {
            Action::AddPatient => self.add_patient(),
            Action::ListPatients => self.list_patients(),
            Action::SearchPatient => self.search_patient(),
            Action::AddDoctor => self.add_doctor(),
            Action::ListDoctors => self.list_doctors(),
            Action::AddAppointment => self.add_appointment(),
            Action::ListAppointments => self.list_appointments(),
            Action::CreateBill => self.create_bill(),
            Action::ListBills => self.list_bills(),
            Action::ViewBill => self.view_bill(),
            Action::PayBill => self.pay_bill(),
            Action::RevenueReport => self.revenue_report(),
        }
    }

    fn print_rows<T>(&mut self, rows: &[T], empty: &str, render: fn(&T) -> String) -> Result<()> {
        if rows.is_empty() {
            return self.say(empty);
        }
        for row in rows {
            self.say(&render(row))?;
        }
        Ok(())
    }

    fn add_patient(&mut self) -> Result<()> {
        self.say("\n--- Add New Patient ---")?;
        // Stored as typed; only the age is validated.
        let name = self.ask("Name")?;
        let age = parse_int("Age", &self.ask("Age")?)?;
        let gender = self.ask("Gender (M/F/O)")?.trim().to_string();
        let phone = self.ask("Phone")?.trim().to_string();

        let conn = self.db.connect()?;
        let patient = create_patient(
            &conn,
            &NewPatient {
                name,
                age,
                gender,
                phone,
            },
        )?;
        self.success(&format!("Patient added with ID: {}", patient.id))
    }

    fn list_patients(&mut self) -> Result<()> {
        let patients = fetch_patients(&self.db.connect()?)?;
        self.say("\n--- Patients List ---")?;
        self.print_rows(&patients, "No patients found.", patient_line)
    }

    fn search_patient(&mut self) -> Result<()> {
        let term = self.ask("Enter patient ID or name to search")?;
        let patients = search_patients(&self.db.connect()?, &term)?;
        self.say("\n--- Search Results ---")?;
        self.print_rows(&patients, "No matching patients found.", patient_line)
    }

    fn add_doctor(&mut self) -> Result<()> {
        self.say("\n--- Add New Doctor ---")?;
        let name = self.ask("Name")?;
        let specialization = self.ask("Specialization")?.trim().to_string();
        let phone = self.ask("Phone")?.trim().to_string();

        let conn = self.db.connect()?;
        let doctor = create_doctor(
            &conn,
            &NewDoctor {
                name,
                specialization,
                phone,
            },
        )?;
        self.success(&format!("Doctor added with ID: {}", doctor.id))
    }

    fn list_doctors(&mut self) -> Result<()> {
        let doctors = fetch_doctors(&self.db.connect()?)?;
        self.say("\n--- Doctors List ---")?;
        self.print_rows(&doctors, "No doctors found.", doctor_line)
    }

    fn add_appointment(&mut self) -> Result<()> {
        self.say("\n--- Schedule Appointment ---")?;
        let patient_id = parse_int("Patient ID", &self.ask("Patient ID")?)?;
        let doctor_id = parse_int("Doctor ID", &self.ask("Doctor ID")?)?;
        let date = self.ask("Date (YYYY-MM-DD)")?.trim().to_string();
        let time = self.ask("Time (HH:MM)")?.trim().to_string();
        let notes = optional_text(&self.ask("Notes (optional)")?);

        let conn = self.db.connect()?;
        let id = create_appointment(
            &conn,
            &NewAppointment {
                patient_id,
                doctor_id,
                date,
                time,
                notes,
            },
        )?;
        self.success(&format!("Appointment created with ID: {id}"))
    }

    fn list_appointments(&mut self) -> Result<()> {
        let appointments = fetch_appointments(&self.db.connect()?)?;
        self.say("\n--- Appointments ---")?;
        self.print_rows(&appointments, "No appointments scheduled.", appointment_line)
    }

    fn create_bill(&mut self) -> Result<()> {
        self.say("\n--- Create Bill ---")?;
        let patient_id = parse_int("Patient ID", &self.ask("Patient ID")?)?;
        let appointment_id = parse_optional_int(
            "Appointment ID",
            &self.ask("Appointment ID (optional, press enter to skip)")?,
        )?;

        let mut items = Vec::new();
        loop {
            let description = self.ask("Service description (or 'done' to finish)")?;
            if is_done(&description) {
                break;
            }
            let amount = parse_amount("Amount", &self.ask("Amount")?)?;
            items.push(NewBillItem::new(description.trim(), amount));
        }

        if items.is_empty() {
            return Err(HospitalError::EmptyBill.into());
        }

        let bill = NewBill {
            patient_id,
            appointment_id,
            items,
        };
        let mut conn = self.db.connect()?;
        let bill_id = create_bill(&mut conn, &bill)?;
        self.success(&format!(
            "Bill created with ID: {bill_id}, Total: {}",
            money(bill.total())
        ))
    }

    fn list_bills(&mut self) -> Result<()> {
        let bills = fetch_bills(&self.db.connect()?)?;
        self.say("\n--- Bills ---")?;
        self.print_rows(&bills, "No bills found.", bill_line)
    }

    fn view_bill(&mut self) -> Result<()> {
        let bill_id = parse_int("Bill ID", &self.ask("Enter Bill ID")?)?;
        let Some(details) = fetch_bill_details(&self.db.connect()?, bill_id)? else {
            return self.failure("Bill not found.");
        };

        self.say("\n--- Bill Summary ---")?;
        for line in bill_summary_lines(&details.bill) {
            self.say(&line)?;
        }
        self.say("\nItems:")?;
        for item in &details.items {
            self.say(&bill_item_line(item))?;
        }
        Ok(())
    }

    fn pay_bill(&mut self) -> Result<()> {
        let bill_id = parse_int("Bill ID", &self.ask("Enter Bill ID to mark as PAID")?)?;
        match pay_bill(&self.db.connect()?, bill_id) {
            Ok(BillStatus::Unpaid) => self.success("Bill marked as PAID."),
            Ok(BillStatus::Paid) => self.say("Bill was already PAID."),
            Err(err) if HospitalError::is_not_found(&err, Entity::Bill) => {
                self.failure("Bill not found.")
            }
            Err(err) => Err(err),
        }
    }

    fn revenue_report(&mut self) -> Result<()> {
        let report = revenue_report(&self.db.connect()?)?;
        self.say("\n--- Revenue Report ---")?;
        for line in revenue_lines(&report) {
            self.say(&line)?;
        }
        Ok(())
    }
}
