use anyhow::{anyhow, Result};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow!("Invalid password hash format: {e}"))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("Password verification failed: {e}")),
    }
}

/// Registration policy: at least 8 characters with one uppercase
/// letter, one lowercase letter and one digit.
pub fn password_issues(password: &str) -> Vec<String> {
    let mut issues = Vec::new();
    if password.chars().count() < 8 {
        issues.push("Password must be at least 8 characters".to_string());
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        issues.push("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        issues.push("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        issues.push("Password must contain at least one number".to_string());
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("SecureP@ssw0rd").expect("Failed to hash");
        assert!(verify_password("SecureP@ssw0rd", &hash).expect("Verify failed"));
        assert!(!verify_password("WrongPassword", &hash).expect("Verify failed"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("SecureP@ssw0rd").unwrap();
        let second = hash_password("SecureP@ssw0rd").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_password_policy() {
        assert!(password_issues("Valid1Password").is_empty());
        assert_eq!(
            password_issues("short1A"),
            vec!["Password must be at least 8 characters"]
        );
        assert_eq!(
            password_issues("alllowercase1"),
            vec!["Password must contain at least one uppercase letter"]
        );
        assert_eq!(
            password_issues("ALLUPPERCASE1"),
            vec!["Password must contain at least one lowercase letter"]
        );
        assert_eq!(
            password_issues("NoDigitsHere"),
            vec!["Password must contain at least one number"]
        );
        assert_eq!(password_issues("").len(), 4);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("whatever", "not-a-hash").is_err());
    }
}
