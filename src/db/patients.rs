use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use tracing::debug;

use crate::models::{NewPatient, Patient};

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        phone: row.get(4)?,
    })
}

/// Insert a patient and return it with the id SQLite assigned.
pub fn create_patient(conn: &Connection, patient: &NewPatient) -> Result<Patient> {
    conn.execute(
        "INSERT INTO patients (name, age, gender, phone) VALUES (?1, ?2, ?3, ?4)",
        params![patient.name, patient.age, patient.gender, patient.phone],
    )
    .context("failed to insert patient")?;

    let id = conn.last_insert_rowid();
    debug!(patient_id = id, "inserted patient");
    Ok(Patient {
        id,
        name: patient.name.clone(),
        age: patient.age,
        gender: patient.gender.clone(),
        phone: patient.phone.clone(),
    })
}

/// Every patient in registration order.
pub fn fetch_patients(conn: &Connection) -> Result<Vec<Patient>> {
    let mut stmt = conn
        .prepare("SELECT id, name, age, gender, phone FROM patients ORDER BY id")
        .context("failed to prepare patient query")?;

    let patients = stmt
        .query_map([], patient_from_row)
        .context("failed to load patients")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect patients")?;

    Ok(patients)
}

/// Look patients up by id or by name.
///
/// A term made only of ASCII digits is an exact id match; anything else is a
/// substring match on the name. LIKE wildcards in the term are escaped so
/// `50%` searches for the literal text.
pub fn search_patients(conn: &Connection, term: &str) -> Result<Vec<Patient>> {
    let term = term.trim();

    if !term.is_empty() && term.bytes().all(|b| b.is_ascii_digit()) {
        // Too many digits to be a rowid, so nothing can match.
        let Ok(id) = term.parse::<i64>() else {
            return Ok(Vec::new());
        };

        let mut stmt = conn
            .prepare("SELECT id, name, age, gender, phone FROM patients WHERE id = ?1")
            .context("failed to prepare patient id search")?;
        let patients = stmt
            .query_map([id], patient_from_row)
            .context("failed to search patients by id")?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to collect patients")?;
        return Ok(patients);
    }

    let pattern = format!("%{}%", escape_like(term));
    let mut stmt = conn
        .prepare(
            "SELECT id, name, age, gender, phone FROM patients
             WHERE name LIKE ?1 ESCAPE '\\'
             ORDER BY id",
        )
        .context("failed to prepare patient name search")?;
    let patients = stmt
        .query_map([pattern], patient_from_row)
        .context("failed to search patients by name")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect patients")?;

    Ok(patients)
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
