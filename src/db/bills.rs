use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::connection::require_record;
use crate::error::{Entity, HospitalError};
use crate::models::{Bill, BillDetails, BillItem, BillStatus, NewBill, RevenueReport};

/// Format of `bills.created_at`. Lexicographic order equals chronological
/// order, which the listing relies on.
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn bill_from_row(row: &Row<'_>) -> rusqlite::Result<Bill> {
    Ok(Bill {
        id: row.get(0)?,
        patient_name: row.get(1)?,
        appointment_id: row.get(2)?,
        total_amount: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Create a bill stamped with the current local time. See [`create_bill_at`].
pub fn create_bill(conn: &mut Connection, bill: &NewBill) -> Result<i64> {
    create_bill_at(conn, bill, Local::now().naive_local())
}

/// Create an UNPAID bill and its line items in a single transaction and
/// return the bill id.
///
/// The stored total is the sum of the item amounts. A bill without items is
/// refused with [`HospitalError::EmptyBill`] before the database is touched,
/// and an unknown patient or appointment id yields `NotFound`. If any insert
/// fails the transaction is dropped uncommitted, so neither the bill nor any
/// of its items persist.
pub fn create_bill_at(
    conn: &mut Connection,
    bill: &NewBill,
    created_at: NaiveDateTime,
) -> Result<i64> {
    if bill.items.is_empty() {
        return Err(HospitalError::EmptyBill.into());
    }

    let total = bill.total();
    let created_at = created_at.format(CREATED_AT_FORMAT).to_string();

    let tx = conn
        .transaction()
        .context("failed to start bill transaction")?;

    require_record(&tx, Entity::Patient, bill.patient_id)?;
    if let Some(appointment_id) = bill.appointment_id {
        require_record(&tx, Entity::Appointment, appointment_id)?;
    }

    tx.execute(
        "INSERT INTO bills (patient_id, appointment_id, total_amount, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            bill.patient_id,
            bill.appointment_id,
            total,
            BillStatus::Unpaid,
            created_at,
        ],
    )
    .context("failed to insert bill")?;
    let bill_id = tx.last_insert_rowid();

    {
        let mut stmt = tx
            .prepare("INSERT INTO bill_items (bill_id, description, amount) VALUES (?1, ?2, ?3)")
            .context("failed to prepare bill item insert")?;
        for item in &bill.items {
            stmt.execute(params![bill_id, item.description, item.amount])
                .with_context(|| format!("failed to insert bill item '{}'", item.description))?;
        }
    }

    tx.commit().context("failed to commit bill")?;

    debug!(bill_id, items = bill.items.len(), total, "created bill");
    Ok(bill_id)
}

/// Every bill with its patient name, newest first.
pub fn fetch_bills(conn: &Connection) -> Result<Vec<Bill>> {
    let mut stmt = conn
        .prepare(
            "SELECT b.id, p.name, b.appointment_id, b.total_amount, b.status, b.created_at
             FROM bills b
             INNER JOIN patients p ON b.patient_id = p.id
             ORDER BY b.created_at DESC, b.id DESC",
        )
        .context("failed to prepare bill query")?;

    let bills = stmt
        .query_map([], bill_from_row)
        .context("failed to load bills")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect bills")?;

    Ok(bills)
}

/// Load one bill and its items. Returns `None` without querying items when the
/// bill does not exist.
pub fn fetch_bill_details(conn: &Connection, bill_id: i64) -> Result<Option<BillDetails>> {
    let bill = conn
        .query_row(
            "SELECT b.id, p.name, b.appointment_id, b.total_amount, b.status, b.created_at
             FROM bills b
             INNER JOIN patients p ON b.patient_id = p.id
             WHERE b.id = ?1",
            [bill_id],
            bill_from_row,
        )
        .optional()
        .context("failed to load bill")?;

    let Some(bill) = bill else {
        return Ok(None);
    };

    let mut stmt = conn
        .prepare(
            "SELECT id, bill_id, description, amount
             FROM bill_items
             WHERE bill_id = ?1
             ORDER BY id",
        )
        .context("failed to prepare bill item query")?;

    let items = stmt
        .query_map([bill_id], |row| {
            Ok(BillItem {
                id: row.get(0)?,
                bill_id: row.get(1)?,
                description: row.get(2)?,
                amount: row.get(3)?,
            })
        })
        .context("failed to load bill items")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect bill items")?;

    Ok(Some(BillDetails { bill, items }))
}

/// Mark a bill as PAID and return the status it had before.
///
/// Paying an already paid bill is accepted and leaves it PAID. An unknown id
/// fails with `NotFound` and changes nothing.
pub fn pay_bill(conn: &Connection, bill_id: i64) -> Result<BillStatus> {
    let previous: Option<BillStatus> = conn
        .query_row("SELECT status FROM bills WHERE id = ?1", [bill_id], |row| {
            row.get(0)
        })
        .optional()
        .context("failed to load bill status")?;

    let Some(previous) = previous else {
        return Err(HospitalError::not_found(Entity::Bill, bill_id).into());
    };

    conn.execute(
        "UPDATE bills SET status = ?1 WHERE id = ?2",
        params![BillStatus::Paid, bill_id],
    )
    .context("failed to mark bill as paid")?;

    debug!(bill_id, %previous, "bill marked as paid");
    Ok(previous)
}

/// Sum bill totals per status. An empty group contributes zero.
pub fn revenue_report(conn: &Connection) -> Result<RevenueReport> {
    let sum_for = |status: BillStatus| -> Result<f64> {
        conn.query_row(
            "SELECT IFNULL(SUM(total_amount), 0.0) FROM bills WHERE status = ?1",
            [status],
            |row| row.get(0),
        )
        .with_context(|| format!("failed to sum {status} bills"))
    };

    Ok(RevenueReport {
        paid: sum_for(BillStatus::Paid)?,
        unpaid: sum_for(BillStatus::Unpaid)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_appointment, create_doctor, create_patient, test_connection};
    use crate::models::{NewAppointment, NewBillItem, NewDoctor, NewPatient};
    use chrono::NaiveDate;

    fn add_patient(conn: &Connection, name: &str) -> i64 {
        create_patient(
            conn,
            &NewPatient {
                name: name.to_string(),
                age: 28,
                gender: "O".to_string(),
                phone: "000".to_string(),
            },
        )
        .unwrap()
        .id
    }

    fn consult_and_lab(patient_id: i64) -> NewBill {
        NewBill {
            patient_id,
            appointment_id: None,
            items: vec![
                NewBillItem::new("Consult", 500.0),
                NewBillItem::new("Lab", 250.0),
            ],
        }
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn bill_total_is_sum_of_items() {
        let mut conn = test_connection();
        let patient_id = add_patient(&conn, "Nisha");

        let bill_id = create_bill(&mut conn, &consult_and_lab(patient_id)).unwrap();

        let details = fetch_bill_details(&conn, bill_id).unwrap().unwrap();
        assert_eq!(details.bill.total_amount, 750.0);
        assert_eq!(details.bill.status, BillStatus::Unpaid);
        assert_eq!(details.bill.patient_name, "Nisha");
        assert_eq!(details.items.len(), 2);
        assert!(details.items.iter().all(|item| item.bill_id == bill_id));
        assert_eq!(details.items[0].description, "Consult");
        assert_eq!(details.items[1].amount, 250.0);
    }

    #[test]
    fn bill_without_items_persists_nothing() {
        let mut conn = test_connection();
        let patient_id = add_patient(&conn, "Nisha");

        let err = create_bill(
            &mut conn,
            &NewBill {
                patient_id,
                appointment_id: None,
                items: Vec::new(),
            },
        )
        .unwrap_err();

        assert_eq!(err.downcast_ref::<HospitalError>(), Some(&HospitalError::EmptyBill));
        assert_eq!(count(&conn, "bills"), 0);
        assert_eq!(count(&conn, "bill_items"), 0);
    }

    #[test]
    fn failed_item_insert_rolls_back_whole_bill() {
        let mut conn = test_connection();
        let patient_id = add_patient(&conn, "Nisha");
        conn.execute_batch(
            "CREATE TRIGGER reject_item BEFORE INSERT ON bill_items
             WHEN NEW.description = 'boom'
             BEGIN SELECT RAISE(ABORT, 'item rejected'); END;",
        )
        .unwrap();

        let mut bill = consult_and_lab(patient_id);
        bill.items.push(NewBillItem::new("boom", 1.0));
        assert!(create_bill(&mut conn, &bill).is_err());

        assert_eq!(count(&conn, "bills"), 0);
        assert_eq!(count(&conn, "bill_items"), 0);
    }

    #[test]
    fn unknown_patient_or_appointment_is_not_found() {
        let mut conn = test_connection();
        let err = create_bill(&mut conn, &consult_and_lab(5)).unwrap_err();
        assert!(HospitalError::is_not_found(&err, Entity::Patient));

        let patient_id = add_patient(&conn, "Nisha");
        let mut bill = consult_and_lab(patient_id);
        bill.appointment_id = Some(12);
        let err = create_bill(&mut conn, &bill).unwrap_err();
        assert!(HospitalError::is_not_found(&err, Entity::Appointment));

        assert_eq!(count(&conn, "bills"), 0);
    }

    #[test]
    fn bill_can_reference_an_appointment() {
        let mut conn = test_connection();
        let patient_id = add_patient(&conn, "Nisha");
        let doctor = create_doctor(
            &conn,
            &NewDoctor {
                name: "Sen".to_string(),
                specialization: "ENT".to_string(),
                phone: "9".to_string(),
            },
        )
        .unwrap();
        let appointment_id = create_appointment(
            &conn,
            &NewAppointment {
                patient_id,
                doctor_id: doctor.id,
                date: "2024-02-02".to_string(),
                time: "11:00".to_string(),
                notes: None,
            },
        )
        .unwrap();

        let mut bill = consult_and_lab(patient_id);
        bill.appointment_id = Some(appointment_id);
        let bill_id = create_bill(&mut conn, &bill).unwrap();

        let details = fetch_bill_details(&conn, bill_id).unwrap().unwrap();
        assert_eq!(details.bill.appointment_id, Some(appointment_id));
    }

    #[test]
    fn bills_are_listed_newest_first() {
        let mut conn = test_connection();
        let patient_id = add_patient(&conn, "Nisha");

        let morning = create_bill_at(&mut conn, &consult_and_lab(patient_id), at(9)).unwrap();
        let evening = create_bill_at(&mut conn, &consult_and_lab(patient_id), at(18)).unwrap();
        let noon = create_bill_at(&mut conn, &consult_and_lab(patient_id), at(12)).unwrap();

        let bills = fetch_bills(&conn).unwrap();
        let ids: Vec<i64> = bills.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![evening, noon, morning]);
        assert_eq!(bills[0].created_at, "2024-03-01 18:00:00");
    }

    #[test]
    fn paying_moves_unpaid_to_paid_once() {
        let mut conn = test_connection();
        let patient_id = add_patient(&conn, "Nisha");
        let bill_id = create_bill(&mut conn, &consult_and_lab(patient_id)).unwrap();

        assert_eq!(pay_bill(&conn, bill_id).unwrap(), BillStatus::Unpaid);
        assert_eq!(pay_bill(&conn, bill_id).unwrap(), BillStatus::Paid);

        let details = fetch_bill_details(&conn, bill_id).unwrap().unwrap();
        assert_eq!(details.bill.status, BillStatus::Paid);
    }

    #[test]
    fn paying_unknown_bill_changes_nothing() {
        let mut conn = test_connection();
        let patient_id = add_patient(&conn, "Nisha");
        let bill_id = create_bill(&mut conn, &consult_and_lab(patient_id)).unwrap();

        let err = pay_bill(&conn, bill_id + 100).unwrap_err();
        assert!(HospitalError::is_not_found(&err, Entity::Bill));

        let bills = fetch_bills(&conn).unwrap();
        assert!(bills.iter().all(|b| b.status == BillStatus::Unpaid));
    }

    #[test]
    fn missing_bill_details_are_none() {
        let conn = test_connection();
        assert_eq!(fetch_bill_details(&conn, 1).unwrap(), None);
    }

    #[test]
    fn revenue_of_empty_store_is_zero() {
        let conn = test_connection();
        assert_eq!(revenue_report(&conn).unwrap(), RevenueReport { paid: 0.0, unpaid: 0.0 });
    }

    #[test]
    fn revenue_splits_paid_and_unpaid() {
        let mut conn = test_connection();
        let patient_id = add_patient(&conn, "Nisha");
        let paid = create_bill(&mut conn, &consult_and_lab(patient_id)).unwrap();
        create_bill(
            &mut conn,
            &NewBill {
                patient_id,
                appointment_id: None,
                items: vec![NewBillItem::new("X-Ray", 120.5)],
            },
        )
        .unwrap();
        pay_bill(&conn, paid).unwrap();

        let report = revenue_report(&conn).unwrap();
        assert_eq!(report.paid, 750.0);
        assert_eq!(report.unpaid, 120.5);
    }
}
