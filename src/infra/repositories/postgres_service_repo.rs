use crate::domain::{models::service::Service, ports::ServiceRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresServiceRepo {
    pool: PgPool,
}

impl PostgresServiceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for PostgresServiceRepo {
    async fn create(&self, service: &Service) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            "INSERT INTO services (id, name, description, duration_min, price_cents, active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *"
        )
            .bind(&service.id).bind(&service.name).bind(&service.description)
            .bind(service.duration_min).bind(service.price_cents).bind(service.active).bind(service.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Service>, AppError> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list(&self) -> Result<Vec<Service>, AppError> {
        sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY name ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_active(&self) -> Result<Vec<Service>, AppError> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE active = TRUE ORDER BY name ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn update(&self, service: &Service) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            "UPDATE services SET name = $1, description = $2, duration_min = $3, price_cents = $4, active = $5
             WHERE id = $6
             RETURNING *"
        )
            .bind(&service.name).bind(&service.description).bind(service.duration_min)
            .bind(service.price_cents).bind(service.active).bind(&service.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Service not found".into())); }
        Ok(())
    }
}
