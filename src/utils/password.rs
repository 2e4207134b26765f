use base64::{
    Engine,
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD},
};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "pbkdf2_sha256";
const ITERATIONS: u32 = 600_000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Hashes a password as `pbkdf2_sha256$iterations$salt$hash`, the same layout
/// the previous backend stored, so existing rows keep verifying.
pub fn hash_password(password: &str) -> Result<String, String> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, ITERATIONS, &mut key)
        .map_err(|e| format!("PBKDF2 failed: {}", e))?;

    // No '$' in either alphabet, so splitting on '$' stays unambiguous
    let salt_b64 = STANDARD_NO_PAD.encode(salt);
    let hash_b64 = STANDARD.encode(key);

    Ok(format!(
        "{}${}${}${}",
        ALGORITHM, ITERATIONS, salt_b64, hash_b64
    ))
}

/// Verifies a password against a stored `pbkdf2_sha256$iterations$salt$hash`.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 4 {
        return Err("Invalid hash format".to_string());
    }
    if parts[0] != ALGORITHM {
        return Err(format!("Unsupported algorithm: {}", parts[0]));
    }

    let iterations = parts[1]
        .parse::<u32>()
        .map_err(|_| "Invalid iterations".to_string())?;

    let salt = decode_flexible(parts[2])?;
    let expected_hash = decode_flexible(parts[3])?;

    let mut computed = vec![0u8; expected_hash.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed)
        .map_err(|e| format!("PBKDF2 failed: {}", e))?;

    Ok(computed == expected_hash)
}

/// Decodes base64 (padded or not, standard or url-safe) or hex, to cover the
/// salt/hash encodings seen in rows written by earlier versions.
fn decode_flexible(input: &str) -> Result<Vec<u8>, String> {
    let padded = add_base64_padding(input);

    if let Ok(decoded) = STANDARD.decode(&padded) {
        return Ok(decoded);
    }
    if let Ok(decoded) = URL_SAFE_NO_PAD.decode(input) {
        return Ok(decoded);
    }

    hex::decode(input).map_err(|_| "Failed to decode".to_string())
}

fn add_base64_padding(input: &str) -> String {
    let padding_needed = (4 - (input.len() % 4)) % 4;
    format!("{}{}", input, "=".repeat(padding_needed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret-password").unwrap();
        assert!(hash.starts_with("pbkdf2_sha256$600000$"));
        assert!(verify_password("s3cret-password", &hash).unwrap());
    }

    #[test]
    fn test_wrong_password() {
        let hash = hash_password("s3cret-password").unwrap();
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        assert!(verify_password("x", "not-a-hash").is_err());
        assert!(verify_password("x", "md5$1000$salt$hash").is_err());
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }
}
