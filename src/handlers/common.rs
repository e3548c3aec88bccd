use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};

/// Reject blank values and values longer than `max_len` characters
pub fn validate_required(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    validate_length(value, field, max_len)
}

/// Length check for optional fields; `None` always passes
pub fn validate_optional(value: &Option<String>, field: &str, max_len: usize) -> AppResult<()> {
    match value {
        Some(v) => validate_length(v, field, max_len),
        None => Ok(()),
    }
}

pub fn validate_cost(cost: Option<Decimal>) -> AppResult<()> {
    match cost {
        Some(c) if c.is_sign_negative() && !c.is_zero() => Err(AppError::Validation(
            "Cost must not be negative".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_length(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(())
}

/// Parse an optional query value, naming the parameter in the validation error
pub fn parse_param<T>(value: Option<&str>, param: &str) -> AppResult<Option<T>>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| AppError::Validation(format!("Invalid {}: {}", param, e)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stage;

    #[test]
    fn test_required_rejects_blank() {
        assert!(validate_required("  ", "Name", 10).is_err());
        assert!(validate_required("Drop", "Name", 10).is_ok());
        assert!(validate_required("Drop drop drop", "Name", 10).is_err());
    }

    #[test]
    fn test_cost_must_be_non_negative() {
        assert!(validate_cost(None).is_ok());
        assert!(validate_cost(Some(Decimal::ZERO)).is_ok());
        assert!(validate_cost(Some(Decimal::new(-1, 2))).is_err());
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param::<Stage>(None, "stage").unwrap(), None);
        assert_eq!(parse_param::<Stage>(Some(""), "stage").unwrap(), None);
        assert_eq!(
            parse_param::<Stage>(Some("Active"), "stage").unwrap(),
            Some(Stage::Active)
        );
        assert!(matches!(
            parse_param::<Stage>(Some("archived"), "stage"),
            Err(AppError::Validation(_))
        ));
    }
}
