use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// One-way transform with a fresh random salt per call. The hash is stored
/// at registration and only ever compared against, never decrypted.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?;
    Ok(hash.to_string())
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_accepts_same_plaintext() {
        let hash = hash_password("какой-то пароль").expect("hash");
        assert!(verify_password("какой-то пароль", &hash).expect("verify"));
    }

    #[test]
    fn verify_rejects_different_plaintext() {
        let hash = hash_password("correct-horse").expect("hash");
        assert!(!verify_password("battery-staple", &hash).expect("verify"));
    }

    #[test]
    fn two_hashes_of_same_plaintext_differ() {
        let a = hash_password("secret").expect("hash");
        let b = hash_password("secret").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-valid-hash").is_err());
    }
}
