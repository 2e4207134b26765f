use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::Deserialize;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::dto::{CreatePaymentRequest, PageQuery, Paginated, PaymentResponse};
use crate::models::payment;
use crate::permissions::scope_payments;

#[derive(Debug, Deserialize)]
pub struct PaymentFilters {
    pub course: Option<i32>,
    pub lesson: Option<i32>,
    pub payment_method: Option<String>,
}

/// GET /user/payments - the caller's payments (moderators see everyone's),
/// filterable by course, lesson and method, newest first.
#[get("/payments")]
pub async fn list_payments(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    filters: web::Query<PaymentFilters>,
    page: web::Query<PageQuery>,
) -> HttpResponse {
    let mut select = scope_payments(&auth_user);

    if let Some(course_id) = filters.course {
        select = select.filter(payment::Column::CourseId.eq(course_id));
    }
    if let Some(lesson_id) = filters.lesson {
        select = select.filter(payment::Column::LessonId.eq(lesson_id));
    }
    if let Some(method) = &filters.payment_method {
        select = select.filter(payment::Column::PaymentMethod.eq(method));
    }

    let paginator = select
        .order_by_desc(payment::Column::PaymentDate)
        .paginate(db.get_ref(), page.size());

    let count = match paginator.num_items().await {
        Ok(count) => count,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    match paginator.fetch_page(page.index()).await {
        Ok(rows) => {
            let results: Vec<PaymentResponse> = rows.into_iter().map(Into::into).collect();
            HttpResponse::Ok().json(Paginated { count, results })
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// POST /user/payments - record a payment. The session id and link come from
/// the external gateway; this endpoint only books the row.
#[post("/payments")]
pub async fn create_payment(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    body: web::Json<CreatePaymentRequest>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    let new_payment = payment::ActiveModel {
        user_id: Set(Some(auth_user.user_id)),
        payment_date: Set(Utc::now()),
        course_id: Set(body.course),
        lesson_id: Set(body.lesson),
        payment_method: Set(body
            .payment_method
            .clone()
            .unwrap_or_else(|| "card".to_string())),
        session_id: Set(body.session_id.clone()),
        payment_link: Set(body.payment_link.clone()),
        ..Default::default()
    };

    match new_payment.insert(db.get_ref()).await {
        Ok(model) => HttpResponse::Created().json(PaymentResponse::from(model)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to record payment: {}", e)
        })),
    }
}

pub fn payment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_payments).service(create_payment);
}
