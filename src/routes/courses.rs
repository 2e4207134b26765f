use actix_web::{HttpResponse, delete, get, post, put, web};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::course;
use crate::models::dto::{CourseResponse, CreateCourseRequest, PageQuery, Paginated};
use crate::permissions::{Action, content_policy, scope_courses};
use crate::services::content_service::ContentService;

/// Resolves a course through the caller's scoped queryset, the way the
/// original viewset did: rows outside the scope read as missing.
async fn find_scoped(
    db: &DatabaseConnection,
    user: &AuthUser,
    id: i32,
) -> Result<Option<course::Model>, sea_orm::DbErr> {
    scope_courses(user)
        .filter(course::Column::Id.eq(id))
        .one(db)
        .await
}

#[get("")]
pub async fn list_courses(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    query: web::Query<PageQuery>,
) -> HttpResponse {
    if !content_policy(Action::List).allows_request(&auth_user) {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Not allowed"
        }));
    }

    let paginator = scope_courses(&auth_user)
        .order_by_asc(course::Column::Id)
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
            let results: Vec<CourseResponse> = rows.into_iter().map(Into::into).collect();
            HttpResponse::Ok().json(Paginated { count, results })
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

#[post("")]
pub async fn create_course(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    body: web::Json<CreateCourseRequest>,
) -> HttpResponse {
    // Moderators manage content, they do not author it
    if !content_policy(Action::Create).allows_request(&auth_user) {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Moderators cannot create courses"
        }));
    }

    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    match ContentService::create_course(db.get_ref(), auth_user.user_id, &body).await {
        Ok(model) => HttpResponse::Created().json(CourseResponse::from(model)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to create course: {}", e)
        })),
    }
}

#[get("/{id}")]
pub async fn retrieve_course(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> HttpResponse {
    let model = match find_scoped(db.get_ref(), &auth_user, path.into_inner()).await {
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

    HttpResponse::Ok().json(CourseResponse::from(model))
}

#[put("/{id}")]
pub async fn update_course(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<CreateCourseRequest>,
) -> HttpResponse {
    let model = match find_scoped(db.get_ref(), &auth_user, path.into_inner()).await {
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

    let mut active: course::ActiveModel = model.into();
    active.title = Set(body.title.clone());
    active.description = Set(body.description.clone());

    match active.update(db.get_ref()).await {
        Ok(model) => HttpResponse::Ok().json(CourseResponse::from(model)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to update course: {}", e)
        })),
    }
}

#[delete("/{id}")]
pub async fn destroy_course(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> HttpResponse {
    let model = match find_scoped(db.get_ref(), &auth_user, path.into_inner()).await {
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

    // Denies moderators deleting courses they do not own; see permissions.rs
    if !content_policy(Action::Destroy).allows(&auth_user, model.owner_id) {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Not allowed"
        }));
    }

    match model.delete(db.get_ref()).await {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to delete course: {}", e)
        })),
    }
}

pub fn course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/courses")
            .service(list_courses)
            .service(create_course)
            .service(retrieve_course)
            .service(update_course)
            .service(destroy_course),
    );
}
