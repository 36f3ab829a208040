use crate::domain::{models::booking::Booking, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, service_id, customer_name, customer_email, customer_note, date, start_time, duration_min, status, manage_token, calendar_event_id, waitlist_request_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.service_id).bind(&booking.customer_name).bind(&booking.customer_email)
            .bind(&booking.customer_note).bind(booking.date).bind(booking.start_time).bind(booking.duration_min)
            .bind(&booking.status).bind(&booking.manage_token).bind(&booking.calendar_event_id)
            .bind(&booking.waitlist_request_id).bind(booking.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_manage_token(&self, token: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE manage_token = $1").bind(token).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list(&self) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY date ASC, start_time ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_active_on(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE date = $1 AND status IN ('CONFIRMED', 'PENDING')").bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn reschedule(&self, id: &str, date: NaiveDate, start_time: NaiveTime) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET date = $1, start_time = $2 WHERE id = $3 RETURNING *")
            .bind(date).bind(start_time).bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn cancel(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE bookings SET status = 'CANCELLED' WHERE id = $1 AND status IN ('CONFIRMED', 'PENDING')")
            .bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
    async fn set_calendar_event_id(&self, id: &str, event_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET calendar_event_id = $1 WHERE id = $2").bind(event_id).bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
}
