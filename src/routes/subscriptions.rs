use actix_web::{HttpResponse, post, web};
use sea_orm::DatabaseConnection;

use crate::middleware::AuthUser;
use crate::models::dto::SubscriptionRequest;
use crate::services::subscription_service::{SubscriptionService, ToggleOutcome};

/// POST /lms/subscription - flip the caller's subscription to a course.
#[post("/subscription")]
pub async fn toggle_subscription(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    body: web::Json<SubscriptionRequest>,
) -> HttpResponse {
    match SubscriptionService::toggle(db.get_ref(), auth_user.user_id, body.course).await {
        Ok(Some(ToggleOutcome::Added)) => HttpResponse::Ok().json(serde_json::json!({
            "message": "подписка добавлена"
        })),
        Ok(Some(ToggleOutcome::Removed)) => HttpResponse::Ok().json(serde_json::json!({
            "message": "подписка удалена"
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "detail": "Not found."
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

pub fn subscription_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(toggle_subscription);
}
