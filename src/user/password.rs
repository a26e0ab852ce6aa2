//! Password hashing
//!
//! Passwords are stored as salted PBKDF2-HMAC-SHA256 digests, encoded as
//! `pbkdf2-sha256$<iterations>$<salt>$<digest>` with base64url fields.
//! Verification goes through `ring::pbkdf2::verify`, which compares in
//! constant time.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ring::pbkdf2;
use ring::rand::SecureRandom;
use std::num::NonZeroU32;

use super::errors::UserError;

const SCHEME: &str = "pbkdf2-sha256";
const ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

/// Hash a plaintext password with a fresh random salt.
pub(super) fn hash_password(password: &str) -> Result<String, UserError> {
    let rng = ring::rand::SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| UserError::Crypto("Failed to generate salt".to_string()))?;

    let iterations = NonZeroU32::new(ITERATIONS)
        .ok_or_else(|| UserError::Crypto("Invalid iteration count".to_string()))?;

    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &mut digest,
    );

    Ok(format!(
        "{SCHEME}${ITERATIONS}${}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(digest)
    ))
}

/// Verify a plaintext password against a stored hash string.
///
/// Returns `Ok(false)` for a well-formed hash that does not match and an
/// error only when the stored value itself cannot be parsed.
pub(super) fn verify_password(password: &str, stored: &str) -> Result<bool, UserError> {
    let mut parts = stored.split('$');

    let (scheme, iterations, salt, digest) = match (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) {
        (Some(scheme), Some(iterations), Some(salt), Some(digest), None) => {
            (scheme, iterations, salt, digest)
        }
        _ => {
            return Err(UserError::Crypto(
                "Malformed stored password hash".to_string(),
            ));
        }
    };

    if scheme != SCHEME {
        return Err(UserError::Crypto(format!(
            "Unsupported password hash scheme: {scheme}"
        )));
    }

    let iterations: NonZeroU32 = iterations
        .parse()
        .map_err(|_| UserError::Crypto("Invalid iteration count in stored hash".to_string()))?;

    let salt = URL_SAFE_NO_PAD
        .decode(salt)
        .map_err(|_| UserError::Crypto("Failed to decode salt".to_string()))?;
    let digest = URL_SAFE_NO_PAD
        .decode(digest)
        .map_err(|_| UserError::Crypto("Failed to decode digest".to_string()))?;

    Ok(pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &digest,
    )
    .is_ok())
}
