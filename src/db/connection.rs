use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Entity, HospitalError};

/// Handle on the SQLite file. It holds only the path; every operation asks for
/// its own connection through [`Database::connect`] and drops it on return,
/// including early returns through `?`.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Create missing parent directories, open the file once, and make sure
    /// all five tables exist before any operation runs.
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.db_path().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }

        let database = Self { path };
        let conn = database.connect()?;
        ensure_schema(&conn)?;
        info!(path = %database.path().display(), "database ready");

        Ok(database)
    }

    /// Open a fresh connection with foreign key enforcement turned on.
    pub fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).context("failed to open SQLite database")?;
        enable_foreign_keys(&conn)?;
        Ok(conn)
    }

    /// Location of the SQLite file this handle opens.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// SQLite leaves foreign keys off unless asked, and the setting is per
/// connection.
fn enable_foreign_keys(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;
    Ok(())
}

/// Create every table that does not exist yet. Safe to run on each start.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS patients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER,
            gender TEXT,
            phone TEXT
        )",
        [],
    )
    .context("failed to create patients table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS doctors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            specialization TEXT,
            phone TEXT
        )",
        [],
    )
    .context("failed to create doctors table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS appointments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL,
            doctor_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            notes TEXT,
            FOREIGN KEY(patient_id) REFERENCES patients(id),
            FOREIGN KEY(doctor_id) REFERENCES doctors(id)
        )",
        [],
    )
    .context("failed to create appointments table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bills (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL,
            appointment_id INTEGER,
            total_amount REAL NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(patient_id) REFERENCES patients(id),
            FOREIGN KEY(appointment_id) REFERENCES appointments(id)
        )",
        [],
    )
    .context("failed to create bills table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bill_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bill_id INTEGER NOT NULL,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            FOREIGN KEY(bill_id) REFERENCES bills(id)
        )",
        [],
    )
    .context("failed to create bill_items table")?;

    Ok(())
}

/// Fail with `NotFound` unless a row with `id` exists for `entity`. Used ahead
/// of inserts that reference other records so a bad id is reported by name
/// instead of as a raw constraint violation.
pub(crate) fn require_record(conn: &Connection, entity: Entity, id: i64) -> Result<()> {
    let sql = match entity {
        Entity::Patient => "SELECT EXISTS(SELECT 1 FROM patients WHERE id = ?1)",
        Entity::Doctor => "SELECT EXISTS(SELECT 1 FROM doctors WHERE id = ?1)",
        Entity::Appointment => "SELECT EXISTS(SELECT 1 FROM appointments WHERE id = ?1)",
        Entity::Bill => "SELECT EXISTS(SELECT 1 FROM bills WHERE id = ?1)",
    };
    let exists: bool = conn
        .query_row(sql, [id], |row| row.get(0))
        .with_context(|| format!("failed to look up {entity} {id}"))?;

    if exists {
        Ok(())
    } else {
        warn!(%entity, id, "referenced record does not exist");
        Err(HospitalError::not_found(entity, id).into())
    }
}

/// In-memory connection with the schema applied, shared by the db tests.
#[cfg(test)]
pub(crate) fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    enable_foreign_keys(&conn).unwrap();
    ensure_schema(&conn).unwrap();
    conn
}
