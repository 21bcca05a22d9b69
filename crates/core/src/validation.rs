//! Input validation policy for the public API surface.
//!
//! Validators return a human-readable reason on failure; the API layer
//! wraps it in [`crate::CoreError::Validation`] so the message reaches
//! the client unchanged.

use std::sync::OnceLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum stored length of an email address.
pub const EMAIL_MAX_LENGTH: usize = 255;

/// Minimum length of a display name, after trimming.
pub const NAME_MIN_LENGTH: usize = 2;

/// Maximum length of a display name, after trimming.
pub const NAME_MAX_LENGTH: usize = 100;

/// Minimum password length.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Smallest ticket quantity a single purchase may request.
pub const MIN_PURCHASE_QUANTITY: u32 = 1;

/// Largest ticket quantity a single purchase may request.
pub const MAX_PURCHASE_QUANTITY: u32 = 20;

/// Smallest accepted donation, in cents.
pub const MIN_DONATION_CENTS: i64 = 100;

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
    })
}

/// Validate an email address: non-empty, bounded, one `@`, a dotted domain.
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > EMAIL_MAX_LENGTH {
        return Err(format!("Email must be at most {EMAIL_MAX_LENGTH} characters"));
    }
    if !email_regex().is_match(email) {
        return Err("Email format is invalid".to_string());
    }
    Ok(())
}

/// Validate password strength: length plus upper/lower/digit classes.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "Password must be at least {PASSWORD_MIN_LENGTH} characters"
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain a digit".to_string());
    }
    Ok(())
}

/// Validate a display name after trimming surrounding whitespace.
pub fn validate_full_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.len() < NAME_MIN_LENGTH || trimmed.len() > NAME_MAX_LENGTH {
        return Err(format!(
            "Name must be between {NAME_MIN_LENGTH} and {NAME_MAX_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate a purchase quantity against the per-order bounds.
pub fn validate_purchase_quantity(quantity: u32) -> Result<(), String> {
    if !(MIN_PURCHASE_QUANTITY..=MAX_PURCHASE_QUANTITY).contains(&quantity) {
        return Err(format!(
            "Quantity must be between {MIN_PURCHASE_QUANTITY} and {MAX_PURCHASE_QUANTITY}"
        ));
    }
    Ok(())
}

/// Validate a donation amount in cents.
pub fn validate_donation_cents(amount_cents: i64) -> Result<(), String> {
    if amount_cents < MIN_DONATION_CENTS {
        return Err(format!(
            "Donation must be at least {MIN_DONATION_CENTS} cents"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Email -------------------------------------------------------------

    #[test]
    fn accepts_plain_email() {
        assert!(validate_email("ayumi@example.com").is_ok());
    }

    #[test]
    fn rejects_empty_email() {
        assert!(validate_email("").is_err());
    }

    #[test]
    fn rejects_email_without_at() {
        assert!(validate_email("ayumi.example.com").is_err());
    }

    #[test]
    fn rejects_email_without_domain_dot() {
        assert!(validate_email("ayumi@example").is_err());
    }

    #[test]
    fn rejects_email_with_spaces() {
        assert!(validate_email("ayu mi@example.com").is_err());
    }

    #[test]
    fn rejects_overlong_email() {
        let local = "a".repeat(EMAIL_MAX_LENGTH);
        assert!(validate_email(&format!("{local}@example.com")).is_err());
    }

    #[test]
    fn accepts_email_at_length_limit() {
        // 243 + "@example.com" (12) == 255
        let local = "a".repeat(EMAIL_MAX_LENGTH - 12);
        assert!(validate_email(&format!("{local}@example.com")).is_ok());
    }

    // -- Password ----------------------------------------------------------

    #[test]
    fn accepts_strong_password() {
        assert!(validate_password("Sunfl0wer").is_ok());
    }

    #[test]
    fn rejects_short_password() {
        assert!(validate_password("Ab1").is_err());
    }

    #[test]
    fn rejects_password_without_uppercase() {
        assert!(validate_password("sunfl0wer").is_err());
    }

    #[test]
    fn rejects_password_without_lowercase() {
        assert!(validate_password("SUNFL0WER").is_err());
    }

    #[test]
    fn rejects_password_without_digit() {
        assert!(validate_password("Sunflower").is_err());
    }

    // -- Name --------------------------------------------------------------

    #[test]
    fn accepts_reasonable_name() {
        assert!(validate_full_name("Kenji Watanabe").is_ok());
    }

    #[test]
    fn trims_before_checking_length() {
        assert!(validate_full_name("  A  ").is_err());
        assert!(validate_full_name("  Al  ").is_ok());
    }

    #[test]
    fn rejects_overlong_name() {
        assert!(validate_full_name(&"x".repeat(NAME_MAX_LENGTH + 1)).is_err());
    }

    // -- Quantity ----------------------------------------------------------

    #[test]
    fn accepts_quantity_bounds() {
        assert!(validate_purchase_quantity(MIN_PURCHASE_QUANTITY).is_ok());
        assert!(validate_purchase_quantity(MAX_PURCHASE_QUANTITY).is_ok());
    }

    #[test]
    fn rejects_quantity_outside_bounds() {
        assert!(validate_purchase_quantity(0).is_err());
        assert!(validate_purchase_quantity(MAX_PURCHASE_QUANTITY + 1).is_err());
    }

    // -- Donations ---------------------------------------------------------

    #[test]
    fn rejects_sub_minimum_donation() {
        assert!(validate_donation_cents(99).is_err());
        assert!(validate_donation_cents(-500).is_err());
    }

    #[test]
    fn accepts_minimum_donation() {
        assert!(validate_donation_cents(MIN_DONATION_CENTS).is_ok());
    }
}
