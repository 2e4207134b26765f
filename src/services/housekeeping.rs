use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::models::users;

/// Accounts idle longer than this are deactivated.
pub const INACTIVITY_CUTOFF_DAYS: i64 = 30;

/// Spawns the periodic last-login check.
pub fn spawn(db: Arc<DatabaseConnection>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            match check_last_login(&db).await {
                Ok(0) => {}
                Ok(n) => tracing::info!("deactivated {} stale account(s)", n),
                Err(e) => tracing::error!("last-login check failed: {}", e),
            }
        }
    });
}

/// Deactivates active accounts whose last login is older than the cutoff.
/// Accounts that never logged in are left alone.
pub async fn check_last_login(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let cutoff = Utc::now() - Duration::days(INACTIVITY_CUTOFF_DAYS);

    let result = users::Entity::update_many()
        .col_expr(users::Column::IsActive, Expr::value(false))
        .filter(users::Column::IsActive.eq(true))
        .filter(users::Column::LastLogin.lt(cutoff))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn reports_number_of_deactivated_accounts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();

        assert_eq!(check_last_login(&db).await.unwrap(), 3);

        let log = db.into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("is_active"), "got: {}", sql);
        assert!(sql.contains("last_login"), "got: {}", sql);
    }
}
