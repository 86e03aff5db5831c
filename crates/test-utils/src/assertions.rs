//! Snapshot formatting for error lists.
//!
//! ```
//! use graphql_test_utils::assertions::format_errors;
//!
//! let errors = vec!["first", "second"];
//! assert_eq!(format_errors(&errors), "[1] first\n[2] second");
//! ```

use std::fmt::Display;

/// One numbered line per error, or `(no errors)`.
#[must_use]
pub fn format_errors<E: Display>(errors: &[E]) -> String {
    if errors.is_empty() {
        return String::from("(no errors)");
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, error)| format!("[{}] {error}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Like [`format_errors`], prefixed with each validation error's code.
#[must_use]
pub fn format_validation_errors(errors: &[graphql_introspect::ValidationError]) -> String {
    if errors.is_empty() {
        return String::from("(no errors)");
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, error)| format!("[{}] {}: {error}", i + 1, error.code()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_introspect::ValidationError;

    #[test]
    fn test_format_errors_empty() {
        let empty: Vec<String> = vec![];
        assert_eq!(format_errors(&empty), "(no errors)");
    }

    #[test]
    fn test_format_validation_errors() {
        let errors = vec![ValidationError::FieldNotFound {
            path: "hero.age".to_string(),
            type_name: "Character".to_string(),
            field_name: "age".to_string(),
        }];
        assert_eq!(
            format_validation_errors(&errors),
            "[1] FIELD_NOT_FOUND: Field 'age' does not exist on type 'Character' (at 'hero.age')"
        );
    }
}
