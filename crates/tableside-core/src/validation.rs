//! # Validation Module
//!
//! Input checks applied at the HTTP boundary before values reach the
//! domain types. The aggregate itself trusts its callers.
//!
//! ## Usage
//! ```rust
//! use tableside_core::validation::{validate_password, validate_quantity};
//!
//! assert!(validate_password("correct horse").is_ok());
//! assert!(validate_quantity(0).is_ok());
//! assert!(validate_quantity(-1).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Longest accepted password, in bytes. Longer input is rejected, never
/// truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

// =============================================================================
// Credentials
// =============================================================================

/// Validates a plaintext password before hashing.
///
/// ## Rules
/// - At least [`MIN_PASSWORD_CHARS`] characters
/// - At most [`MAX_PASSWORD_BYTES`] bytes
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: MAX_PASSWORD_BYTES,
        });
    }

    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_CHARS,
        });
    }

    Ok(())
}

/// Validates a manager email. Only a structural check.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain".to_string(),
        }),
    }
}

// =============================================================================
// Order Input
// =============================================================================

pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "must not be negative".to_string(),
        });
    }
    Ok(())
}

pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must not be negative".to_string(),
        });
    }
    Ok(())
}

/// A refund must move a positive amount.
pub fn validate_refund_amount(amount: Money) -> ValidationResult<()> {
    if amount <= Money::ZERO {
        return Err(ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_bounds() {
        assert!(validate_password("12345678").is_ok());
        assert!(matches!(
            validate_password("1234567"),
            Err(ValidationError::TooShort { min: 8, .. })
        ));

        assert!(validate_password(&"a".repeat(72)).is_ok());
        assert!(matches!(
            validate_password(&"a".repeat(73)),
            Err(ValidationError::TooLong { max: 72, .. })
        ));
    }

    #[test]
    fn test_password_limit_counts_bytes() {
        // 24 three-byte characters = 72 bytes, 25 = 75 bytes
        assert!(validate_password(&"あ".repeat(24)).is_ok());
        assert!(validate_password(&"あ".repeat(25)).is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("owner@cafe.test").is_ok());
        assert!(matches!(
            validate_email("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_email("owner").is_err());
        assert!(validate_email("@cafe.test").is_err());
    }

    #[test]
    fn test_order_input() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(-2).is_err());
        assert!(validate_price(Money::ZERO).is_ok());
        assert!(validate_price(Money::from_minor(-1)).is_err());
        assert!(validate_refund_amount(Money::from_minor(1)).is_ok());
        assert!(validate_refund_amount(Money::ZERO).is_err());
    }
}
