use crate::domain::{models::booking::Booking, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::SqlitePool;

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, service_id, customer_name, customer_email, customer_note, date, start_time, duration_min, status, manage_token, calendar_event_id, waitlist_request_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.service_id).bind(&booking.customer_name).bind(&booking.customer_email)
            .bind(&booking.customer_note).bind(booking.date).bind(booking.start_time).bind(booking.duration_min)
            .bind(&booking.status).bind(&booking.manage_token).bind(&booking.calendar_event_id)
            .bind(&booking.waitlist_request_id).bind(booking.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_manage_token(&self, token: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE manage_token = ?").bind(token).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list(&self) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY date ASC, start_time ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_active_on(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE date = ? AND status IN ('CONFIRMED', 'PENDING')").bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn reschedule(&self, id: &str, date: NaiveDate, start_time: NaiveTime) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET date = ?, start_time = ? WHERE id = ? RETURNING *")
            .bind(date).bind(start_time).bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn cancel(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE bookings SET status = 'CANCELLED' WHERE id = ? AND status IN ('CONFIRMED', 'PENDING')")
            .bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
    async fn set_calendar_event_id(&self, id: &str, event_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET calendar_event_id = ? WHERE id = ?").bind(event_id).bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
}
