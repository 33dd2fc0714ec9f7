use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::ErrorMessage;

/// Maximum allowed password length in characters, checked before hashing
pub const MAX_PASSWORD_LENGTH: usize = 64;

fn check_length(password: &str) -> Result<(), ErrorMessage> {
    if password.is_empty() {
        return Err(ErrorMessage::EmptyPassword);
    }
    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(ErrorMessage::ExceededMaxPasswordLength(MAX_PASSWORD_LENGTH));
    }
    Ok(())
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// Returns the PHC string (`$argon2id$v=19$...`), which embeds the salt and
/// parameters and is what gets stored in `users.password`.
pub fn hash(password: impl Into<String>) -> Result<String, ErrorMessage> {
    let password = password.into();
    check_length(&password)?;

    let salt = SaltString::generate(&mut OsRng);

    let hashed_password = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| ErrorMessage::HashingError)?
        .to_string();

    Ok(hashed_password)
}

/// Verify a password against a stored PHC hash.
///
/// `Ok(false)` on mismatch; `Err` only for invalid input or a corrupt hash.
pub fn compare(password: &str, hashed_password: &str) -> Result<bool, ErrorMessage> {
    check_length(password)?;

    let parsed_hash =
        PasswordHash::new(hashed_password).map_err(|_| ErrorMessage::InvalidHashFormat)?;

    let password_matched = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    Ok(password_matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_compare() {
        let hashed = hash("trofeo123").unwrap();

        assert!(hashed.starts_with("$argon2id$"));
        assert!(compare("trofeo123", &hashed).unwrap());
        assert!(!compare("trofeo124", &hashed).unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(hash("secreto").unwrap(), hash("secreto").unwrap());
    }

    #[test]
    fn length_limits_are_enforced() {
        assert_eq!(hash(""), Err(ErrorMessage::EmptyPassword));
        assert_eq!(
            hash("x".repeat(MAX_PASSWORD_LENGTH + 1)),
            Err(ErrorMessage::ExceededMaxPasswordLength(MAX_PASSWORD_LENGTH))
        );
        assert!(hash("ñ".repeat(MAX_PASSWORD_LENGTH)).is_ok());
    }

    #[test]
    fn corrupt_hash_is_reported() {
        assert_eq!(
            compare("secreto", "not-a-phc-string"),
            Err(ErrorMessage::InvalidHashFormat)
        );
    }
}
