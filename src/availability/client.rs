//! Remote slot service client.
//!
//! The service exposes two JSON endpoints:
//! - `POST /check-availability {postcode}` → 200
//!   `{available_slots: [{date, time}], total_slots}` or 400 `{message}`
//! - `POST /create-booking {date, time, customer_name, address, phone}` → 200
//!   `{message}` or `{error}`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::model::{AvailabilityOutcome, BookingOutcome, BookingSubmission, Slot};
use crate::error::TransportError;

const CHECK_ENDPOINT: &str = "check-availability";
const BOOK_ENDPOINT: &str = "create-booking";

/// The remote availability and booking collaborator.
///
/// Implementations perform exactly one attempt with the given timeout;
/// retrying is the caller's job.
#[async_trait]
pub trait SlotService: Send + Sync {
    async fn check_availability(
        &self,
        postcode: &str,
        timeout: Duration,
    ) -> Result<AvailabilityOutcome, TransportError>;

    async fn create_booking(
        &self,
        booking: &BookingSubmission,
        timeout: Duration,
    ) -> Result<BookingOutcome, TransportError>;
}

#[derive(Debug, Deserialize)]
struct AvailabilityBody {
    #[serde(default)]
    available_slots: Vec<Slot>,
    total_slots: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct MessageBody {
    message: Option<String>,
    error: Option<String>,
}

/// `SlotService` over HTTP.
pub struct HttpSlotService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSlotService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }
}

#[async_trait]
impl SlotService for HttpSlotService {
    async fn check_availability(
        &self,
        postcode: &str,
        timeout: Duration,
    ) -> Result<AvailabilityOutcome, TransportError> {
        let response = self
            .client
            .post(self.url(CHECK_ENDPOINT))
            .timeout(timeout)
            .json(&serde_json::json!({ "postcode": postcode }))
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(CHECK_ENDPOINT, timeout, e))?;

        let status = response.status();
        if status.is_success() {
            let body: AvailabilityBody = response
                .json()
                .await
                .map_err(|e| TransportError::from_reqwest(CHECK_ENDPOINT, timeout, e))?;
            let total = body
                .total_slots
                .unwrap_or(body.available_slots.len())
                .max(body.available_slots.len());
            tracing::debug!(
                postcode,
                returned = body.available_slots.len(),
                total,
                "Availability received"
            );
            return Ok(AvailabilityOutcome::Slots {
                slots: body.available_slots,
                total,
            });
        }

        if status == StatusCode::BAD_REQUEST {
            let body: MessageBody = response.json().await.unwrap_or_default();
            tracing::info!(postcode, message = ?body.message, "Availability lookup rejected");
            return Ok(AvailabilityOutcome::Rejected {
                message: body.message.filter(|m| !m.trim().is_empty()),
            });
        }

        Err(TransportError::UnexpectedStatus {
            endpoint: CHECK_ENDPOINT.to_string(),
            status: status.as_u16(),
        })
    }

    async fn create_booking(
        &self,
        booking: &BookingSubmission,
        timeout: Duration,
    ) -> Result<BookingOutcome, TransportError> {
        let response = self
            .client
            .post(self.url(BOOK_ENDPOINT))
            .timeout(timeout)
            .json(booking)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(BOOK_ENDPOINT, timeout, e))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(TransportError::UnexpectedStatus {
                endpoint: BOOK_ENDPOINT.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(BOOK_ENDPOINT, timeout, e))?;

        booking_outcome(status, &text).ok_or_else(|| TransportError::UnexpectedStatus {
            endpoint: BOOK_ENDPOINT.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Read a booking response. The service's own wording is relayed: the JSON
/// `error`/`message`, or the raw body when it isn't JSON. Fixed text only
/// stands in for an empty body.
fn booking_outcome(status: StatusCode, text: &str) -> Option<BookingOutcome> {
    let (body, plain) = match serde_json::from_str::<MessageBody>(text) {
        Ok(body) => (body, None),
        Err(_) => {
            let raw = text.trim();
            (MessageBody::default(), (!raw.is_empty()).then(|| raw.to_string()))
        }
    };

    if status.is_success() {
        if let Some(error) = body.error {
            return Some(BookingOutcome::Failed { error });
        }
        let message = body
            .message
            .or(plain)
            .unwrap_or_else(|| "Your booking request has been received.".to_string());
        return Some(BookingOutcome::Confirmed { message });
    }

    if status.is_client_error() {
        let error = body
            .error
            .or(body.message)
            .or(plain)
            .unwrap_or_else(|| "The booking could not be completed.".to_string());
        return Some(BookingOutcome::Failed { error });
    }

    None
}
