use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, Set,
};

use crate::models::{course, subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

pub struct SubscriptionService;

impl SubscriptionService {
    /// Get-or-create/delete flip for the (user, course) pair.
    ///
    /// Returns `None` when the course does not exist. Not transactional:
    /// two concurrent toggles for the same pair can race, which is accepted
    /// because the visible end state is idempotent under sequential use.
    pub async fn toggle(
        db: &DatabaseConnection,
        user_id: i32,
        course_id: i32,
    ) -> Result<Option<ToggleOutcome>, DbErr> {
        if course::Entity::find_by_id(course_id).one(db).await?.is_none() {
            return Ok(None);
        }

        let existing = subscription::Entity::find()
            .filter(subscription::Column::UserId.eq(user_id))
            .filter(subscription::Column::CourseId.eq(course_id))
            .one(db)
            .await?;

        match existing {
            Some(row) => {
                row.delete(db).await?;
                Ok(Some(ToggleOutcome::Removed))
            }
            None => {
                let row = subscription::ActiveModel {
                    user_id: Set(user_id),
                    course_id: Set(course_id),
                    ..Default::default()
                };
                row.insert(db).await?;
                Ok(Some(ToggleOutcome::Added))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn a_course(id: i32) -> course::Model {
        course::Model {
            id,
            title: "Rust".to_string(),
            description: None,
            owner_id: 1,
        }
    }

    #[tokio::test]
    async fn missing_course_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<course::Model, _, _>([vec![]])
            .into_connection();

        assert_eq!(SubscriptionService::toggle(&db, 1, 99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn first_toggle_creates_the_subscription() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![a_course(5)]])
            // no existing (user, course) row
            .append_query_results::<subscription::Model, _, _>([vec![]])
            // the insert, via RETURNING
            .append_query_results([vec![subscription::Model {
                id: 1,
                user_id: 7,
                course_id: 5,
            }]])
            .into_connection();

        assert_eq!(
            SubscriptionService::toggle(&db, 7, 5).await.unwrap(),
            Some(ToggleOutcome::Added)
        );
    }

    #[tokio::test]
    async fn second_toggle_removes_the_subscription() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![a_course(5)]])
            .append_query_results([vec![subscription::Model {
                id: 1,
                user_id: 7,
                course_id: 5,
            }]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        assert_eq!(
            SubscriptionService::toggle(&db, 7, 5).await.unwrap(),
            Some(ToggleOutcome::Removed)
        );
    }
}
