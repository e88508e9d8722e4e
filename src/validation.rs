//! Input validation for state-change intents
//!
//! Runs before any coordination logic so a rejected intent never touches the
//! task store.

use crate::error::AdmissionError;
use crate::models::{TargetState, MAX_TARGET_NAME_LENGTH};

/// Target names must be 1..=255 characters
pub fn validate_target_name(target_name: &str) -> Result<(), AdmissionError> {
    if target_name.is_empty() {
        return Err(AdmissionError::invalid_input("Server name is required"));
    }

    let length = target_name.chars().count();
    if length > MAX_TARGET_NAME_LENGTH {
        return Err(AdmissionError::invalid_input(format!(
            "Server name must be between 1 and {MAX_TARGET_NAME_LENGTH} characters (got {length})"
        )));
    }

    Ok(())
}

/// Case-insensitive parse of the requested state
pub fn parse_target_state(raw: &str) -> Result<TargetState, AdmissionError> {
    if raw.trim().is_empty() {
        return Err(AdmissionError::invalid_input("State is required"));
    }
    raw.trim().parse::<TargetState>().map_err(AdmissionError::InvalidInput)
}

/// Validate a full intent
pub fn validate_intent(
    target_name: &str,
    raw_state: &str,
) -> Result<TargetState, AdmissionError> {
    validate_target_name(target_name)?;
    parse_target_state(raw_state)
}
