//! Domain errors. Persistence helpers return `anyhow::Result`, and these
//! variants travel inside it so the console (and tests) can tell a missing
//! record apart from a broken database.

use std::fmt;

use thiserror::Error;

/// Record kinds that can be looked up by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Patient,
    Doctor,
    Appointment,
    Bill,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Patient => "Patient",
            Entity::Doctor => "Doctor",
            Entity::Appointment => "Appointment",
            Entity::Bill => "Bill",
        };
        f.write_str(name)
    }
}

/// Failures the console reports to the user and then returns to the menu.
#[derive(Debug, Error, PartialEq)]
pub enum HospitalError {
    /// A numeric field could not be parsed. Raised before anything is written.
    #[error("{field} must be a number, got '{value}'.")]
    InvalidNumber { field: &'static str, value: String },

    /// No row with this id exists. Nothing was changed.
    #[error("{entity} not found (ID {id}).")]
    NotFound { entity: Entity, id: i64 },

    /// A bill was submitted without line items. Nothing was written.
    #[error("No items added. Bill cancelled.")]
    EmptyBill,

    /// Standard input reached end-of-file while a prompt was waiting.
    #[error("input closed")]
    InputClosed,
}

impl HospitalError {
    /// Shorthand for a `NotFound` of `entity` with `id`.
    pub fn not_found(entity: Entity, id: i64) -> Self {
        HospitalError::NotFound { entity, id }
    }

    /// Check whether an `anyhow` error carries a `NotFound` for `entity`.
    pub fn is_not_found(err: &anyhow::Error, entity: Entity) -> bool {
        matches!(
            err.downcast_ref::<HospitalError>(),
            Some(HospitalError::NotFound { entity: found, .. }) if *found == entity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = HospitalError::not_found(Entity::Bill, 42);
        assert_eq!(err.to_string(), "Bill not found (ID 42).");
    }

    #[test]
    fn is_not_found_matches_only_requested_entity() {
        let err = anyhow::Error::new(HospitalError::not_found(Entity::Patient, 3));
        assert!(HospitalError::is_not_found(&err, Entity::Patient));
        assert!(!HospitalError::is_not_found(&err, Entity::Doctor));
        assert!(!HospitalError::is_not_found(
            &anyhow::anyhow!("unrelated"),
            Entity::Patient
        ));
    }
}
