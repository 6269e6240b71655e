use soroban_sdk::String;

use crate::errors::ComplianceError;

const MIN_NAME_LEN: u32 = 1;
const MAX_NAME_LEN: u32 = 64;

const MIN_FREQUENCY: u32 = 1;
const MAX_FREQUENCY: u32 = 24;

pub const MINUTES_PER_DAY: u32 = 1_440;

/// Validate a medication name.
/// Names must be between MIN_NAME_LEN and MAX_NAME_LEN bytes.
pub fn validate_name(name: &String) -> Result<(), ComplianceError> {
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&name.len()) {
        return Err(ComplianceError::InvalidInput);
    }
    Ok(())
}

pub fn validate_dosage(dosage: u32) -> Result<(), ComplianceError> {
    if dosage == 0 {
        return Err(ComplianceError::InvalidInput);
    }
    Ok(())
}

/// Validate the number of doses per day (1–24 inclusive).
pub fn validate_frequency(frequency_per_day: u32) -> Result<(), ComplianceError> {
    if !(MIN_FREQUENCY..=MAX_FREQUENCY).contains(&frequency_per_day) {
        return Err(ComplianceError::InvalidInput);
    }
    Ok(())
}

/// Resolve the dosing interval.
///
/// A non-zero `interval_minutes` is kept as supplied; zero derives the
/// interval from the daily frequency. `frequency_per_day` must already be
/// validated, so the derived value is at least 60.
pub fn resolve_interval(frequency_per_day: u32, interval_minutes: u32) -> u32 {
    if interval_minutes > 0 {
        return interval_minutes;
    }
    MINUTES_PER_DAY / frequency_per_day.max(MIN_FREQUENCY)
}

/// A dose carries an actual time exactly when it was taken.
pub fn validate_dose(taken: bool, actual_time: &Option<u64>) -> Result<(), ComplianceError> {
    if actual_time.is_some() != taken {
        return Err(ComplianceError::InvalidInput);
    }
    Ok(())
}

/// Run every add-medication check; returns the interval to store.
pub fn validate_medication(
    name: &String,
    dosage: u32,
    frequency_per_day: u32,
    interval_minutes: u32,
) -> Result<u32, ComplianceError> {
    validate_name(name)?;
    validate_dosage(dosage)?;
    validate_frequency(frequency_per_day)?;
    Ok(resolve_interval(frequency_per_day, interval_minutes))
}
