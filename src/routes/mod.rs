pub mod courses;
pub mod lessons;
pub mod payments;
pub mod subscriptions;
pub mod users;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .configure(users::user_routes)
            .configure(payments::payment_routes),
    )
    .service(
        web::scope("/lms")
            .configure(courses::course_routes)
            .configure(lessons::lesson_routes)
            .configure(subscriptions::subscription_routes),
    );
}
