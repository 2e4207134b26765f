use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};

use crate::models::dto::{CreateCourseRequest, CreateLessonRequest};
use crate::models::{course, lesson};

pub struct ContentService;

impl ContentService {
    /// Inserts a course with the caller stamped as owner.
    pub async fn create_course(
        db: &DatabaseConnection,
        owner_id: i32,
        request: &CreateCourseRequest,
    ) -> Result<course::Model, DbErr> {
        let new_course = course::ActiveModel {
            title: Set(request.title.clone()),
            description: Set(request.description.clone()),
            owner_id: Set(owner_id),
            ..Default::default()
        };

        new_course.insert(db).await
    }

    /// Inserts a lesson with the caller stamped as owner.
    /// Returns `None` when the target course does not exist.
    pub async fn create_lesson(
        db: &DatabaseConnection,
        owner_id: i32,
        request: &CreateLessonRequest,
    ) -> Result<Option<lesson::Model>, DbErr> {
        if !Self::course_exists(db, request.course).await? {
            return Ok(None);
        }

        let new_lesson = lesson::ActiveModel {
            title: Set(request.title.clone()),
            description: Set(request.description.clone()),
            link: Set(request.link.clone()),
            course_id: Set(request.course),
            owner_id: Set(owner_id),
            ..Default::default()
        };

        new_lesson.insert(db).await.map(Some)
    }

    pub async fn course_exists(db: &DatabaseConnection, course_id: i32) -> Result<bool, DbErr> {
        Ok(course::Entity::find_by_id(course_id).one(db).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn a_course(id: i32, owner_id: i32) -> course::Model {
        course::Model {
            id,
            title: "Rust basics".to_string(),
            description: None,
            owner_id,
        }
    }

    #[tokio::test]
    async fn create_course_stamps_the_caller_as_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![a_course(1, 77)]])
            .into_connection();

        let request = CreateCourseRequest {
            title: "Rust basics".to_string(),
            description: None,
        };

        let created = ContentService::create_course(&db, 77, &request)
            .await
            .unwrap();
        assert_eq!(created.owner_id, 77);

        // The INSERT itself must carry the caller's id, not just the
        // row the mock returned
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("owner_id"), "got: {}", log);
        assert!(log.contains("77"), "got: {}", log);
    }

    #[tokio::test]
    async fn create_lesson_stamps_the_caller_as_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![a_course(5, 1)]])
            .append_query_results([vec![lesson::Model {
                id: 9,
                title: "Ownership".to_string(),
                description: None,
                link: None,
                course_id: 5,
                owner_id: 77,
            }]])
            .into_connection();

        let request = CreateLessonRequest {
            title: "Ownership".to_string(),
            description: None,
            link: None,
            course: 5,
        };

        let created = ContentService::create_lesson(&db, 77, &request)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.owner_id, 77);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("owner_id"), "got: {}", log);
        assert!(log.contains("77"), "got: {}", log);
    }

    #[tokio::test]
    async fn create_lesson_refuses_a_missing_course() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<course::Model, _, _>([vec![]])
            .into_connection();

        let request = CreateLessonRequest {
            title: "Ownership".to_string(),
            description: None,
            link: None,
            course: 99,
        };

        assert!(
            ContentService::create_lesson(&db, 77, &request)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn course_exists_is_false_for_a_missing_course() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<course::Model, _, _>([vec![]])
            .into_connection();

        assert!(!ContentService::course_exists(&db, 99).await.unwrap());
    }
}
