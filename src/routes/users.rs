use actix_web::{HttpResponse, get, post, put, web};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::AppConfig;
use crate::middleware::AuthUser;
use crate::models::users::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as Users,
};
use crate::utils::{jwt, password};

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub phone: Option<String>,
    pub city: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub phone: Option<String>,
    pub city: Option<String>,
    pub image: Option<String>,
}

/// Token pair in the shape the clients already expect.
#[derive(Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

fn token_pair(secret: &str, user_id: i32, email: &str, moderator: bool) -> Result<TokenPairResponse, String> {
    Ok(TokenPairResponse {
        access: jwt::generate_access_token(secret, user_id, email, moderator)?,
        refresh: jwt::generate_refresh_token(secret, user_id, email, moderator)?,
    })
}

/// POST /user/register - create an account (public)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    // 1. The email is the identity, so it must be unused
    let existing = Users::find()
        .filter(UserColumn::Email.eq(&body.email))
        .one(db.get_ref())
        .await;

    match existing {
        Ok(Some(_)) => {
            return HttpResponse::Conflict().json(serde_json::json!({
                "error": "Email already registered"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
        _ => {}
    }

    // 2. Hash the password
    let password_hash = match password::hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to hash password: {}", e)
            }));
        }
    };

    // 3. Create the user
    let new_user = UserActiveModel {
        email: Set(body.email.clone()),
        password_hash: Set(password_hash),
        phone: Set(body.phone.clone()),
        city: Set(body.city.clone()),
        image: Set(None),
        is_moderator: Set(false),
        is_active: Set(true),
        last_login: Set(None),
        date_joined: Set(Utc::now()),
        ..Default::default()
    };

    let user = match new_user.insert(db.get_ref()).await {
        Ok(user) => user,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to create user: {}", e)
            }));
        }
    };

    // 4. Hand back a token pair right away
    match token_pair(&config.jwt_secret, user.id, &user.email, user.is_moderator) {
        Ok(tokens) => HttpResponse::Created().json(serde_json::json!({
            "user_id": user.id,
            "email": user.email,
            "access": tokens.access,
            "refresh": tokens.refresh,
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to generate token: {}", e)
        })),
    }
}

/// POST /user/login - obtain a token pair (public)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    let user = match Users::find()
        .filter(UserColumn::Email.eq(&body.email))
        .one(db.get_ref())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid email or password"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    if !user.is_active {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Account is disabled"
        }));
    }

    let is_valid = match password::verify_password(&body.password, &user.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Password verification error: {}", e)
            }));
        }
    };

    if !is_valid {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid email or password"
        }));
    }

    // Stamp last_login; the housekeeping task keys off it
    let mut active: UserActiveModel = user.clone().into();
    active.last_login = Set(Some(Utc::now()));
    if let Err(e) = active.update(db.get_ref()).await {
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to record login: {}", e)
        }));
    }

    match token_pair(&config.jwt_secret, user.id, &user.email, user.is_moderator) {
        Ok(tokens) => HttpResponse::Ok().json(tokens),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to generate token: {}", e)
        })),
    }
}

/// POST /user/token/refresh - trade a refresh token for a new access token
#[post("/token/refresh")]
pub async fn refresh_token(
    body: web::Json<RefreshRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    let claims = match jwt::verify_refresh_token(&config.jwt_secret, &body.refresh) {
        Ok(claims) => claims,
        Err(e) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": format!("Invalid token: {}", e)
            }));
        }
    };

    // Re-read the row so a revoked or demoted account stops refreshing
    let user = match Users::find_by_id(claims.sub).one(db.get_ref()).await {
        Ok(Some(user)) if user.is_active => user,
        Ok(_) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Account is disabled"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    match jwt::generate_access_token(&config.jwt_secret, user.id, &user.email, user.is_moderator) {
        Ok(access) => HttpResponse::Ok().json(serde_json::json!({ "access": access })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to generate token: {}", e)
        })),
    }
}

/// GET /user/me - current claims (protected)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(auth_user)
}

/// PUT /user/profile - update the caller's profile fields (protected)
#[put("/profile")]
pub async fn update_profile(
    auth_user: AuthUser,
    body: web::Json<UpdateProfileRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let user = match Users::find_by_id(auth_user.user_id).one(db.get_ref()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "User not found"
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    let mut active: UserActiveModel = user.into();
    active.phone = Set(body.phone.clone());
    active.city = Set(body.city.clone());
    active.image = Set(body.image.clone());

    match active.update(db.get_ref()).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to update profile: {}", e)
        })),
    }
}

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(refresh_token)
        .service(me)
        .service(update_profile);
}
