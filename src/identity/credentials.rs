use anyhow::{anyhow, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use crate::config::PasswordCheck;

/// Produce an Argon2 PHC string for directories running in `PasswordCheck::Argon2` mode.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

// Plaintext mode compares by equality, as the legacy directory stores raw passwords.
pub fn verify_password(mode: PasswordCheck, stored: &str, supplied: &str) -> bool {
    match mode {
        PasswordCheck::Plaintext => !stored.is_empty() && stored == supplied,
        PasswordCheck::Argon2 => {
            if let Ok(parsed) = PasswordHash::new(stored) {
                Argon2::default().verify_password(supplied.as_bytes(), &parsed).is_ok()
            } else { false }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_equality() {
        assert!(verify_password(PasswordCheck::Plaintext, "admin123", "admin123"));
        assert!(!verify_password(PasswordCheck::Plaintext, "admin123", "admin124"));
        assert!(!verify_password(PasswordCheck::Plaintext, "", ""));
    }

    #[test]
    fn argon2_phc_verification() {
        let phc = hash_password("s3cr3t!").unwrap();
        assert!(phc.starts_with("$argon2"));
        assert!(verify_password(PasswordCheck::Argon2, &phc, "s3cr3t!"));
        assert!(!verify_password(PasswordCheck::Argon2, &phc, "wrong"));
        // a plaintext entry never verifies in argon2 mode
        assert!(!verify_password(PasswordCheck::Argon2, "s3cr3t!", "s3cr3t!"));
    }
}
