use crate::domain::{models::waitlist::WaitlistRequest, ports::WaitlistRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteWaitlistRepo {
    pool: SqlitePool,
}

impl SqliteWaitlistRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WaitlistRepository for SqliteWaitlistRepo {
    async fn create(&self, request: &WaitlistRequest) -> Result<WaitlistRequest, AppError> {
        sqlx::query_as::<_, WaitlistRequest>(
            "INSERT INTO waitlist_requests (id, service_id, customer_name, customer_email, start_date, end_date, status, notified_at, expires_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&request.id).bind(&request.service_id).bind(&request.customer_name).bind(&request.customer_email)
            .bind(request.start_date).bind(request.end_date).bind(&request.status)
            .bind(request.notified_at).bind(request.expires_at).bind(request.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<WaitlistRequest>, AppError> {
        sqlx::query_as::<_, WaitlistRequest>("SELECT * FROM waitlist_requests WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list(&self) -> Result<Vec<WaitlistRequest>, AppError> {
        sqlx::query_as::<_, WaitlistRequest>("SELECT * FROM waitlist_requests ORDER BY created_at DESC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_pending(&self) -> Result<Vec<WaitlistRequest>, AppError> {
        sqlx::query_as::<_, WaitlistRequest>("SELECT * FROM waitlist_requests WHERE status = 'PENDING' ORDER BY created_at ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn mark_notified(&self, id: &str, notified_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE waitlist_requests SET status = 'NOTIFIED', notified_at = ?, expires_at = ? WHERE id = ? AND status = 'PENDING'")
            .bind(notified_at).bind(expires_at).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
    async fn mark_converted(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE waitlist_requests SET status = 'CONVERTED' WHERE id = ? AND status = 'NOTIFIED'")
            .bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
    async fn cancel(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE waitlist_requests SET status = 'CANCELLED' WHERE id = ? AND status IN ('PENDING', 'NOTIFIED')")
            .bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE waitlist_requests SET status = 'EXPIRED' WHERE status = 'NOTIFIED' AND expires_at < ?")
            .bind(now).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
