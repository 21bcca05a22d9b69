//! Ticket verification code generation.

use rand::Rng;

/// Length of a generated verification code (alphanumeric characters).
pub const CODE_LENGTH: usize = 16;

/// Generate a random alphanumeric verification code for a ticket.
///
/// The code is opaque: the door-check endpoint always reads ticket state
/// server-side, so possession of a code proves nothing by itself.
pub fn generate_verification_code() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Build the QR image URL for a verification code.
///
/// Codes are alphanumeric so no percent-encoding is needed.
pub fn qr_code_url(code: &str) -> String {
    format!("https://api.qrserver.com/v1/create-qr-code/?size=300x300&data={code}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_has_correct_length() {
        assert_eq!(generate_verification_code().len(), CODE_LENGTH);
    }

    #[test]
    fn generated_code_is_alphanumeric() {
        let code = generate_verification_code();
        assert!(
            code.chars().all(|c| c.is_ascii_alphanumeric()),
            "Code should be purely alphanumeric"
        );
    }

    #[test]
    fn codes_are_unique_across_generations() {
        let a = generate_verification_code();
        let b = generate_verification_code();
        assert_ne!(a, b);
    }

    #[test]
    fn qr_url_embeds_code() {
        let url = qr_code_url("Abc123Xyz456Demo");
        assert!(url.starts_with("https://api.qrserver.com/"));
        assert!(url.ends_with("data=Abc123Xyz456Demo"));
    }
}
