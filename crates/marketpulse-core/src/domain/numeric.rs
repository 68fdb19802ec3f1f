use crate::ValidationError;

/// Validate and normalize currency to uppercase 3-letter code.
pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    let is_valid = normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

    if !is_valid {
        return Err(ValidationError::InvalidCurrency {
            value: input.to_owned(),
        });
    }

    Ok(normalized)
}

/// Rounds half away from zero, which is round-half-up for the non-negative
/// values this crate aggregates.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub(crate) fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

pub(crate) fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

pub(crate) fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_non_negative(field, value)?;
    }
    Ok(())
}

pub(crate) fn validate_not_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_currency() {
        assert_eq!(validate_currency_code("usd").expect("must normalize"), "USD");
        assert!(matches!(
            validate_currency_code("USDT"),
            Err(ValidationError::InvalidCurrency { .. })
        ));
    }

    #[test]
    fn rounds_half_up_to_one_decimal() {
        assert_eq!(round_half_up(25.25, 1), 25.3);
        assert_eq!(round_half_up(25.24, 1), 25.2);
        assert_eq!(round_half_up(0.05, 1), 0.1);
        assert_eq!(round_half_up(f64::NAN, 1), 0.0);
    }

    #[test]
    fn rejects_negative_values() {
        let err = validate_non_negative("price", -1.0).expect_err("must fail");
        assert_eq!(err, ValidationError::NegativeValue { field: "price" });
    }
}
