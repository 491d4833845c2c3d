//! Validation utilities.

use crate::{CatalogError, FieldError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `CatalogError` on failure.
    fn validate_request(&self) -> Result<(), CatalogError> {
        self.validate().map_err(validation_errors_to_catalog_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field errors, sorted by field.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));
    field_errors
}

/// Converts `validator::ValidationErrors` to `CatalogError`.
#[must_use]
pub fn validation_errors_to_catalog_error(errors: ValidationErrors) -> CatalogError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    CatalogError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates that a number is neither NaN nor infinite.
    pub fn finite(value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::new("not_finite"));
        }
        Ok(())
    }

    /// Validates that every entry of a list is non-blank.
    pub fn no_blank_entries(values: &[String]) -> Result<(), ValidationError> {
        if values.iter().any(|v| v.trim().is_empty()) {
            return Err(ValidationError::new("blank_entry"));
        }
        Ok(())
    }
}
