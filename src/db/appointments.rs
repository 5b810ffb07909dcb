use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::debug;

use super::connection::require_record;
use crate::error::Entity;
use crate::models::{Appointment, NewAppointment};

/// Schedule an appointment and return its id. Both the patient and the doctor
/// must already exist; a missing one is reported as `NotFound` and nothing is
/// inserted.
pub fn create_appointment(conn: &Connection, appointment: &NewAppointment) -> Result<i64> {
    require_record(conn, Entity::Patient, appointment.patient_id)?;
    require_record(conn, Entity::Doctor, appointment.doctor_id)?;

    conn.execute(
        "INSERT INTO appointments (patient_id, doctor_id, date, time, notes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            appointment.patient_id,
            appointment.doctor_id,
            appointment.date,
            appointment.time,
            appointment.notes,
        ],
    )
    .context("failed to insert appointment")?;

    let id = conn.last_insert_rowid();
    debug!(
        appointment_id = id,
        patient_id = appointment.patient_id,
        doctor_id = appointment.doctor_id,
        "inserted appointment"
    );
    Ok(id)
}

/// All appointments with patient and doctor names, earliest first. Date and
/// time are compared as text, which orders correctly for `YYYY-MM-DD` and
/// `HH:MM` input.
pub fn fetch_appointments(conn: &Connection) -> Result<Vec<Appointment>> {
    let mut stmt = conn
        .prepare(
            "SELECT a.id, p.name, d.name, a.date, a.time, a.notes
             FROM appointments a
             INNER JOIN patients p ON a.patient_id = p.id
             INNER JOIN doctors d ON a.doctor_id = d.id
             ORDER BY a.date, a.time, a.id",
        )
        .context("failed to prepare appointment query")?;

    let appointments = stmt
        .query_map([], |row| {
            Ok(Appointment {
                id: row.get(0)?,
                patient_name: row.get(1)?,
                doctor_name: row.get(2)?,
                date: row.get(3)?,
                time: row.get(4)?,
                notes: row.get(5)?,
            })
        })
        .context("failed to load appointments")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect appointments")?;

    Ok(appointments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_doctor, create_patient, test_connection};
    use crate::error::HospitalError;
    use crate::models::{NewDoctor, NewPatient};

    fn seed(conn: &Connection) -> (i64, i64) {
        let patient = create_patient(
            conn,
            &NewPatient {
                name: "Kiran".to_string(),
                age: 52,
                gender: "M".to_string(),
                phone: "123".to_string(),
            },
        )
        .unwrap();
        let doctor = create_doctor(
            conn,
            &NewDoctor {
                name: "Rao".to_string(),
                specialization: "Neurology".to_string(),
                phone: "456".to_string(),
            },
        )
        .unwrap();
        (patient.id, doctor.id)
    }

    fn book(patient_id: i64, doctor_id: i64, date: &str, time: &str) -> NewAppointment {
        NewAppointment {
            patient_id,
            doctor_id,
            date: date.to_string(),
            time: time.to_string(),
            notes: None,
        }
    }

    #[test]
    fn listing_sorts_by_date_then_time() {
        let conn = test_connection();
        let (patient_id, doctor_id) = seed(&conn);

        let late =
            create_appointment(&conn, &book(patient_id, doctor_id, "2024-05-02", "09:00")).unwrap();
        let mut with_notes = book(patient_id, doctor_id, "2024-05-01", "14:30");
        with_notes.notes = Some("follow-up".to_string());
        let afternoon = create_appointment(&conn, &with_notes).unwrap();
        let morning =
            create_appointment(&conn, &book(patient_id, doctor_id, "2024-05-01", "08:15")).unwrap();

        let listed = fetch_appointments(&conn).unwrap();
        let ids: Vec<i64> = listed.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![morning, afternoon, late]);
        assert_eq!(listed[0].patient_name, "Kiran");
        assert_eq!(listed[0].doctor_name, "Rao");
        assert_eq!(listed[1].notes.as_deref(), Some("follow-up"));
        assert_eq!(listed[0].notes, None);
    }

    #[test]
    fn missing_patient_or_doctor_is_rejected_without_insert() {
        let conn = test_connection();
        let (patient_id, doctor_id) = seed(&conn);

        let err =
            create_appointment(&conn, &book(77, doctor_id, "2024-01-01", "10:00")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<HospitalError>(),
            Some(&HospitalError::not_found(Entity::Patient, 77))
        );

        let err =
            create_appointment(&conn, &book(patient_id, 88, "2024-01-01", "10:00")).unwrap_err();
        assert!(HospitalError::is_not_found(&err, Entity::Doctor));

        assert!(fetch_appointments(&conn).unwrap().is_empty());
    }
}
