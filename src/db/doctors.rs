use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::debug;

use crate::models::{Doctor, NewDoctor};

/// Insert a doctor and return it with the generated id.
pub fn create_doctor(conn: &Connection, doctor: &NewDoctor) -> Result<Doctor> {
    conn.execute(
        "INSERT INTO doctors (name, specialization, phone) VALUES (?1, ?2, ?3)",
        params![doctor.name, doctor.specialization, doctor.phone],
    )
    .context("failed to insert doctor")?;

    let id = conn.last_insert_rowid();
    debug!(doctor_id = id, "inserted doctor");
    Ok(Doctor {
        id,
        name: doctor.name.clone(),
        specialization: doctor.specialization.clone(),
        phone: doctor.phone.clone(),
    })
}

/// Every doctor in registration order.
pub fn fetch_doctors(conn: &Connection) -> Result<Vec<Doctor>> {
    let mut stmt = conn
        .prepare("SELECT id, name, specialization, phone FROM doctors ORDER BY id")
        .context("failed to prepare doctor query")?;

    let doctors = stmt
        .query_map([], |row| {
            Ok(Doctor {
                id: row.get(0)?,
                name: row.get(1)?,
                specialization: row.get(2)?,
                phone: row.get(3)?,
            })
        })
        .context("failed to load doctors")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect doctors")?;

    Ok(doctors)
}
