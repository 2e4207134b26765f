use actix_web::{Error, FromRequest, HttpRequest, HttpResponse, dev::Payload, web};
use futures::future::{Ready, ready};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::utils::jwt;

/// The authenticated caller, decoded from the access token.
/// Used as an extractor in protected routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub is_moderator: bool,
}

fn unauthorized(message: String) -> Error {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({
        "error": message
    }));
    actix_web::error::InternalError::from_response("", response).into()
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // 1. Extract the Authorization header
        let auth_header = match req.headers().get("Authorization") {
            Some(header) => header,
            None => {
                return ready(Err(unauthorized(
                    "Missing Authorization header".to_string(),
                )));
            }
        };

        let auth_str = match auth_header.to_str() {
            Ok(s) => s,
            Err(_) => {
                return ready(Err(unauthorized(
                    "Invalid Authorization header".to_string(),
                )));
            }
        };

        // 2. Strip the "Bearer " prefix
        let token = match auth_str.strip_prefix("Bearer ") {
            Some(token) => token,
            None => {
                return ready(Err(unauthorized(
                    "Invalid Authorization format (expected: Bearer <token>)".to_string(),
                )));
            }
        };

        // 3. Verify against the configured secret
        let config = match req.app_data::<web::Data<AppConfig>>() {
            Some(config) => config,
            None => {
                let response = HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Server configuration missing"
                }));
                return ready(Err(actix_web::error::InternalError::from_response(
                    "", response,
                )
                .into()));
            }
        };

        let claims = match jwt::verify_access_token(&config.jwt_secret, token) {
            Ok(claims) => claims,
            Err(e) => {
                return ready(Err(unauthorized(format!("Invalid token: {}", e))));
            }
        };

        ready(Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            is_moderator: claims.moderator,
        }))
    }
}
