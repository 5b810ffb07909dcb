//! Line-oriented input: reading one answer per prompt and turning the raw text
//! into typed values. Parsing failures abort the current operation before any
//! database work starts.

use std::io::BufRead;

use anyhow::{Context, Result};

use crate::error::HospitalError;

/// Word that ends the bill item loop, compared case-insensitively.
pub(crate) const DONE_SENTINEL: &str = "done";

/// Read one line, without its line terminator. End of input is reported as
/// [`HospitalError::InputClosed`] so menu loops can stop instead of spinning.
pub(crate) fn read_answer<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read from standard input")?;
    if read == 0 {
        return Err(HospitalError::InputClosed.into());
    }
    let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed_len);
    Ok(line)
}

pub(crate) fn parse_int(field: &'static str, raw: &str) -> Result<i64, HospitalError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| HospitalError::InvalidNumber {
            field,
            value: raw.trim().to_string(),
        })
}

/// Blank means "not given"; anything else must be an integer.
pub(crate) fn parse_optional_int(
    field: &'static str,
    raw: &str,
) -> Result<Option<i64>, HospitalError> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_int(field, raw).map(Some)
    }
}

/// Money amounts. `NaN` and infinities parse as floats but are refused.
pub(crate) fn parse_amount(field: &'static str, raw: &str) -> Result<f64, HospitalError> {
    let invalid = || HospitalError::InvalidNumber {
        field,
        value: raw.trim().to_string(),
    };
    let amount = raw.trim().parse::<f64>().map_err(|_| invalid())?;
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(invalid())
    }
}

pub(crate) fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn is_done(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case(DONE_SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_answer_strips_line_endings_and_detects_eof() {
        let mut input: &[u8] = b"first\r\nsecond\nlast";
        assert_eq!(read_answer(&mut input).unwrap(), "first");
        assert_eq!(read_answer(&mut input).unwrap(), "second");
        assert_eq!(read_answer(&mut input).unwrap(), "last");

        let err = read_answer(&mut input).unwrap_err();
        assert_eq!(err.downcast_ref::<HospitalError>(), Some(&HospitalError::InputClosed));
    }

    #[test]
    fn integers_accept_surrounding_space_only() {
        assert_eq!(parse_int("Age", " 42 "), Ok(42));
        assert_eq!(
            parse_int("Age", "forty"),
            Err(HospitalError::InvalidNumber {
                field: "Age",
                value: "forty".to_string()
            })
        );
        assert!(parse_int("Age", "4.5").is_err());
        assert!(parse_int("Age", "").is_err());
    }

    #[test]
    fn optional_id_treats_blank_as_absent() {
        assert_eq!(parse_optional_int("Appointment ID", "   "), Ok(None));
        assert_eq!(parse_optional_int("Appointment ID", "7"), Ok(Some(7)));
        assert!(parse_optional_int("Appointment ID", "x").is_err());
    }

    #[test]
    fn amounts_must_be_finite_numbers() {
        assert_eq!(parse_amount("Amount", "250"), Ok(250.0));
        assert_eq!(parse_amount("Amount", "99.95"), Ok(99.95));
        assert!(parse_amount("Amount", "NaN").is_err());
        assert!(parse_amount("Amount", "inf").is_err());
        assert!(parse_amount("Amount", "ten").is_err());
    }

    #[test]
    fn done_sentinel_ignores_case_and_padding() {
        assert!(is_done("done"));
        assert!(is_done("  DONE "));
        assert!(!is_done("done deal"));
        assert_eq!(optional_text("  "), None);
        assert_eq!(optional_text(" fasting "), Some("fasting".to_string()));
    }
}
