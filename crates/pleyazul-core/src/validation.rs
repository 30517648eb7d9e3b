//! # Validation Module
//!
//! Input validation for order creation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport (out of scope)                                     │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Required fields, lengths, formats                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Fulfillment Core                                             │
//! │  └── Spread existence, state machine rules                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_EMAIL_LEN, MAX_QUESTION_LEN, MAX_SPREAD_ID_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a customer email address.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 254 characters
/// - Must contain exactly one `@` with text on both sides, no whitespace
///
/// This is delivery-address sanity checking, not RFC 5322 parsing.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected a single @ with text on both sides".to_string(),
        });
    }

    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a spread identifier.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 64 characters
/// - Only letters, numbers, hyphens and underscores
///
/// Existence in the catalog is checked by the Fulfillment Core, not here.
pub fn validate_spread_id(spread_id: &str) -> ValidationResult<()> {
    let spread_id = spread_id.trim();

    if spread_id.is_empty() {
        return Err(ValidationError::Required {
            field: "spread_id".to_string(),
        });
    }

    if spread_id.len() > MAX_SPREAD_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "spread_id".to_string(),
            max: MAX_SPREAD_ID_LEN,
        });
    }

    if !spread_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "spread_id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Normalizes and validates an optional custom question.
///
/// Returns `None` for absent or whitespace-only questions, the trimmed
/// text otherwise.
pub fn validate_custom_question(question: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(question) = question else {
        return Ok(None);
    };

    let question = question.trim();
    if question.is_empty() {
        return Ok(None);
    }

    if question.len() > MAX_QUESTION_LEN {
        return Err(ValidationError::TooLong {
            field: "custom_question".to_string(),
            max: MAX_QUESTION_LEN,
        });
    }

    Ok(Some(question.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(validate_email("cliente@pleyazul.com").is_ok());
        assert!(validate_email("  padded@ok.es  ").is_ok());
    }

    #[test]
    fn test_empty_email_is_required_error() {
        let err = validate_email("").unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));

        let err = validate_email("   ").unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));
    }

    #[test]
    fn test_malformed_email() {
        assert!(validate_email("no-arroba").is_err());
        assert!(validate_email("@dominio.com").is_err());
        assert!(validate_email("local@").is_err());
        assert!(validate_email("dos@arrobas@mal.com").is_err());
        assert!(validate_email("con espacio@mal.com").is_err());
    }

    #[test]
    fn test_overlong_email() {
        let long = format!("{}@x.com", "a".repeat(MAX_EMAIL_LEN));
        let err = validate_email(&long).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { .. }));
    }

    #[test]
    fn test_valid_spread_id() {
        assert!(validate_spread_id("tarot_3_ppf").is_ok());
        assert!(validate_spread_id("rueda_astral").is_ok());
    }

    #[test]
    fn test_empty_spread_id() {
        let err = validate_spread_id("").unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));
    }

    #[test]
    fn test_spread_id_charset() {
        assert!(validate_spread_id("tarot/3").is_err());
        assert!(validate_spread_id("tarot 3").is_err());
    }

    #[test]
    fn test_custom_question_normalization() {
        assert_eq!(validate_custom_question(None).unwrap(), None);
        assert_eq!(validate_custom_question(Some("   ")).unwrap(), None);
        assert_eq!(
            validate_custom_question(Some("  ¿Qué me depara el año?  ")).unwrap(),
            Some("¿Qué me depara el año?".to_string())
        );
    }

    #[test]
    fn test_custom_question_too_long() {
        let long = "q".repeat(MAX_QUESTION_LEN + 1);
        let err = validate_custom_question(Some(&long)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { .. }));
    }
}
