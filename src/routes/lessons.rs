use actix_web::{HttpResponse, delete, get, post, put, web};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryOrder,
    Set,
};
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::dto::{CreateLessonRequest, LessonResponse, PageQuery, Paginated};
use crate::models::lesson;
use crate::permissions::{Action, content_policy, scope_lessons};
use crate::services::content_service::ContentService;
use crate::services::notifier::Notifier;

#[get("")]
pub async fn list_lessons(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    query: web::Query<PageQuery>,
) -> HttpResponse {
    if !content_policy(Action::List).allows_request(&auth_user) {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Not allowed"
        }));
    }

    let paginator = scope_lessons(&auth_user)
        .order_by_asc(lesson::Column::Id)
        .paginate(db.get_ref(), query.size());

    let count = match paginator.num_items().await {
        Ok(count) => count,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    match paginator.fetch_page(query.index()).await {
        Ok(rows) => {
            let results: Vec<LessonResponse> = rows.into_iter().map(Into::into).collect();
            HttpResponse::Ok().json(Paginated { count, results })
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

#[post("")]
pub async fn create_lesson(
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Notifier>,
    auth_user: AuthUser,
    body: web::Json<CreateLessonRequest>,
) -> HttpResponse {
    if !content_policy(Action::Create).allows_request(&auth_user) {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Moderators cannot create lessons"
        }));
    }

    // Rejects non-YouTube links with "site is not ok"
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    match ContentService::create_lesson(db.get_ref(), auth_user.user_id, &body).await {
        Ok(Some(model)) => {
            // Fire-and-forget: subscribers learn the course changed
            notifier.course_updated(model.course_id);
            HttpResponse::Created().json(LessonResponse::from(model))
        }
        Ok(None) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Course {} does not exist", body.course)
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to create lesson: {}", e)
        })),
    }
}

#[get("/{id}")]
pub async fn retrieve_lesson(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> HttpResponse {
    let model = match lesson::Entity::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await
    {
        Ok(Some(model)) => model,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "detail": "Not found."
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    if !content_policy(Action::Retrieve).allows(&auth_user, model.owner_id) {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Not allowed"
        }));
    }

    HttpResponse::Ok().json(LessonResponse::from(model))
}

#[put("/{id}")]
pub async fn update_lesson(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<CreateLessonRequest>,
) -> HttpResponse {
    let model = match lesson::Entity::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await
    {
        Ok(Some(model)) => model,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "detail": "Not found."
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    if !content_policy(Action::Update).allows(&auth_user, model.owner_id) {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Not allowed"
        }));
    }

    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    // Moving the lesson to a course that does not exist is a client
    // error, not a FK blowup
    match ContentService::course_exists(db.get_ref(), body.course).await {
        Ok(true) => {}
        Ok(false) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("Course {} does not exist", body.course)
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    }

    let mut active: lesson::ActiveModel = model.into();
    active.title = Set(body.title.clone());
    active.description = Set(body.description.clone());
    active.link = Set(body.link.clone());
    active.course_id = Set(body.course);

    match active.update(db.get_ref()).await {
        Ok(model) => HttpResponse::Ok().json(LessonResponse::from(model)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to update lesson: {}", e)
        })),
    }
}

#[delete("/{id}")]
pub async fn destroy_lesson(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> HttpResponse {
    let model = match lesson::Entity::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await
    {
        Ok(Some(model)) => model,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "detail": "Not found."
            }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }));
        }
    };

    if !content_policy(Action::Destroy).allows(&auth_user, model.owner_id) {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Not allowed"
        }));
    }

    match model.delete(db.get_ref()).await {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to delete lesson: {}", e)
        })),
    }
}

pub fn lesson_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/lessons")
            .service(list_lessons)
            .service(create_lesson)
            .service(retrieve_lesson)
            .service(update_lesson)
            .service(destroy_lesson),
    );
}
