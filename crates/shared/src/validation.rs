//! Custom validators for warranty request types.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Shortest accepted warranty duration in months.
pub const MIN_WARRANTY_MONTHS: u32 = 1;

/// Longest accepted warranty duration in months (10 years).
pub const MAX_WARRANTY_MONTHS: u32 = 120;

/// Validates that a warranty duration is within the accepted range.
pub fn validate_duration_months(months: u32) -> Result<(), ValidationError> {
    if (MIN_WARRANTY_MONTHS..=MAX_WARRANTY_MONTHS).contains(&months) {
        Ok(())
    } else {
        let mut err = ValidationError::new("duration_months_range");
        err.message = Some("Warranty duration must be between 1 and 120 months".into());
        Err(err)
    }
}

/// Validates that a cost value is not negative.
pub fn validate_cost(cost: &Decimal) -> Result<(), ValidationError> {
    if cost.is_sign_negative() {
        let mut err = ValidationError::new("cost_negative");
        err.message = Some("Cost must not be negative".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a required identifier is not blank after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("This field may not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}
