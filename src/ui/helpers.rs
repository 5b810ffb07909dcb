use anyhow::Error;
use crossterm::style::{style, Color, Stylize};

use crate::error::HospitalError;

/// Pick the message worth showing for a failed operation: a domain error as
/// written, otherwise the innermost cause of the chain.
pub(crate) fn surface_error(err: &Error) -> String {
    if let Some(domain) = err.downcast_ref::<HospitalError>() {
        return domain.to_string();
    }
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Wrap `text` in ANSI colour codes when colour output is enabled.
pub(crate) fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        style(text).with(color).to_string()
    } else {
        text.to_string()
    }
}
