use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const ACCESS_TOKEN_LIFETIME_MINUTES: i64 = 30;
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 1;

const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // user_id
    pub email: String,
    pub moderator: bool,
    pub token_type: String, // "access" or "refresh"
    pub exp: i64,
}

fn build_token(
    secret: &str,
    user_id: i32,
    email: &str,
    moderator: bool,
    token_type: &str,
    lifetime: Duration,
) -> Result<String, String> {
    let expiration = Utc::now()
        .checked_add_signed(lifetime)
        .ok_or("Failed to calculate expiration")?
        .timestamp();

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        moderator,
        token_type: token_type.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| format!("Failed to generate token: {}", e))
}

/// Short-lived token carried on every authenticated request.
pub fn generate_access_token(
    secret: &str,
    user_id: i32,
    email: &str,
    moderator: bool,
) -> Result<String, String> {
    build_token(
        secret,
        user_id,
        email,
        moderator,
        TOKEN_TYPE_ACCESS,
        Duration::minutes(ACCESS_TOKEN_LIFETIME_MINUTES),
    )
}

/// Longer-lived token exchanged for new access tokens.
pub fn generate_refresh_token(
    secret: &str,
    user_id: i32,
    email: &str,
    moderator: bool,
) -> Result<String, String> {
    build_token(
        secret,
        user_id,
        email,
        moderator,
        TOKEN_TYPE_REFRESH,
        Duration::days(REFRESH_TOKEN_LIFETIME_DAYS),
    )
}

fn decode_token(secret: &str, token: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

pub fn verify_access_token(secret: &str, token: &str) -> Result<Claims, String> {
    let claims = decode_token(secret, token)?;
    if claims.token_type != TOKEN_TYPE_ACCESS {
        return Err("Not an access token".to_string());
    }
    Ok(claims)
}

pub fn verify_refresh_token(secret: &str, token: &str) -> Result<Claims, String> {
    let claims = decode_token(secret, token)?;
    if claims.token_type != TOKEN_TYPE_REFRESH {
        return Err("Not a refresh token".to_string());
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_generate_and_verify_access_token() {
        let token = generate_access_token(SECRET, 123, "user@example.com", false).unwrap();
        let claims = verify_access_token(SECRET, &token).unwrap();

        assert_eq!(claims.sub, 123);
        assert_eq!(claims.email, "user@example.com");
        assert!(!claims.moderator);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let token = generate_refresh_token(SECRET, 1, "user@example.com", true).unwrap();
        assert!(verify_access_token(SECRET, &token).is_err());
        let claims = verify_refresh_token(SECRET, &token).unwrap();
        assert!(claims.moderator);
    }

    #[test]
    fn test_invalid_token() {
        assert!(verify_access_token(SECRET, "invalid.token.here").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let token = generate_access_token(SECRET, 1, "user@example.com", false).unwrap();
        assert!(verify_access_token("other-secret", &token).is_err());
    }
}
