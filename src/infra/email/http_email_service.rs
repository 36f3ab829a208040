use crate::domain::models::booking::Booking;
use crate::domain::ports::{Notifier, WaitlistMatchNotice};
use crate::domain::services::waitlist_matcher::NOTIFY_EXPIRY_HOURS;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

/// Client for the standalone mail collaborator. Bodies are plain formatted
/// text; layout and branding live in the mail service itself.
pub struct HttpEmailService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpEmailService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }

    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), AppError> {
        let payload = EmailPayload {
            from_alias: "default".to_string(),
            to_addr: recipient.to_string(),
            subject: subject.to_string(),
            html_body: body.to_string(),
        };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Email service connection error: {}", e);
                error!("{}", msg);
                AppError::Upstream(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Email service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Upstream(msg));
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct EmailPayload {
    from_alias: String,
    to_addr: String,
    subject: String,
    html_body: String,
}

#[async_trait]
impl Notifier for HttpEmailService {
    async fn waitlist_match(&self, notice: &WaitlistMatchNotice) -> Result<(), AppError> {
        let subject = format!("A slot opened up for {}", notice.service_name);
        let body = format!(
            "Hi {},\n\nGood news: a {} appointment opened up on {} at {}.\n\nThis slot is held for you for {} hours. Book it here:\n{}\n",
            notice.customer_name,
            notice.service_name,
            notice.matched_date.format("%A, %B %-d, %Y"),
            notice.matched_time.format("%H:%M"),
            NOTIFY_EXPIRY_HOURS,
            notice.booking_link,
        );
        self.send(&notice.customer_email, &subject, &body).await
    }

    async fn booking_confirmed(&self, booking: &Booking, service_name: &str, manage_link: &str) -> Result<(), AppError> {
        let subject = format!("Your {} appointment is confirmed", service_name);
        let body = format!(
            "Hi {},\n\nYour {} appointment is confirmed for {} at {}.\n\nNeed to change it? Manage your booking here:\n{}\n",
            booking.customer_name,
            service_name,
            booking.date.format("%A, %B %-d, %Y"),
            booking.start_time.format("%H:%M"),
            manage_link,
        );
        self.send(&booking.customer_email, &subject, &body).await
    }

    async fn booking_cancelled(&self, booking: &Booking, service_name: &str) -> Result<(), AppError> {
        let subject = format!("Your {} appointment was cancelled", service_name);
        let body = format!(
            "Hi {},\n\nYour {} appointment on {} at {} has been cancelled.\n",
            booking.customer_name,
            service_name,
            booking.date.format("%A, %B %-d, %Y"),
            booking.start_time.format("%H:%M"),
        );
        self.send(&booking.customer_email, &subject, &body).await
    }
}
