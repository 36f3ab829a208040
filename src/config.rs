use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub frontend_url: String,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub google_calendar_id: Option<String>,
    pub google_api_token: Option<String>,
    pub google_api_base: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string()),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            google_calendar_id: env::var("GOOGLE_CALENDAR_ID").ok(),
            google_api_token: env::var("GOOGLE_API_TOKEN").ok(),
            google_api_base: env::var("GOOGLE_API_BASE")
                .unwrap_or_else(|_| "https://www.googleapis.com/calendar/v3".to_string()),
        }
    }
}
