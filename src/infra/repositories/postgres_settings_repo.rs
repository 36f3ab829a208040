use crate::domain::{models::settings::{BusinessHourRule, BusinessSettings}, ports::SettingsRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};

pub struct PostgresSettingsRepo {
    pool: PgPool,
}

impl PostgresSettingsRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PostgresSettingsRepo {
    async fn load(&self) -> Result<BusinessSettings, AppError> {
        let row = sqlx::query("SELECT timezone, buffer_min, booking_floor_date, waitlist_enabled FROM business_settings WHERE id = 1")
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        let hours = sqlx::query_as::<_, BusinessHourRule>("SELECT weekday, is_open, open_time, close_time FROM business_hours ORDER BY weekday ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok(BusinessSettings {
            timezone: row.get("timezone"),
            buffer_min: row.get("buffer_min"),
            booking_floor_date: row.get("booking_floor_date"),
            waitlist_enabled: row.get("waitlist_enabled"),
            hours,
        })
    }
    async fn update_settings(&self, timezone: &str, buffer_min: i32, booking_floor_date: Option<NaiveDate>, waitlist_enabled: bool) -> Result<(), AppError> {
        sqlx::query("UPDATE business_settings SET timezone = $1, buffer_min = $2, booking_floor_date = $3, waitlist_enabled = $4 WHERE id = 1")
            .bind(timezone).bind(buffer_min).bind(booking_floor_date).bind(waitlist_enabled)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
    async fn update_hours(&self, rules: &[BusinessHourRule]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM business_hours").execute(&mut *tx).await.map_err(AppError::Database)?;
        for rule in rules {
            sqlx::query("INSERT INTO business_hours (weekday, is_open, open_time, close_time) VALUES ($1, $2, $3, $4)")
                .bind(rule.weekday).bind(rule.is_open).bind(rule.open_time).bind(rule.close_time)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
