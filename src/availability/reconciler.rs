//! Slot lookups and pre-booking validation.
//!
//! Invariant: a booking is never submitted when a freshly fetched slot set
//! proves the requested `(date, time)` is not on offer. When the validation
//! lookup itself cannot complete, the booking is attempted anyway and the
//! degraded path is logged.

use std::sync::Arc;

use super::client::SlotService;
use super::format;
use super::model::{AvailabilityOutcome, BookingOutcome, BookingRequest, BookingSubmission};
use super::postcode::{extract_postcode, sanitize_postcode};
use crate::error::{BookingError, TemporalError, TransportError};
use crate::reply::Reply;
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::temporal::{TemporalNormalizer, canonical_date, canonical_time};

/// One page of a slot listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPage {
    pub reply: Reply,
    /// How many slots of the listing the user has now seen in total.
    pub shown_through: usize,
}

/// Reconciles customer requests against the remote slot service.
pub struct AvailabilityReconciler {
    service: Arc<dyn SlotService>,
    normalizer: TemporalNormalizer,
    retry: RetryPolicy,
    shop_phone: String,
}

impl AvailabilityReconciler {
    pub fn new(
        service: Arc<dyn SlotService>,
        normalizer: TemporalNormalizer,
        retry: RetryPolicy,
        shop_phone: impl Into<String>,
    ) -> Self {
        Self {
            service,
            normalizer,
            retry,
            shop_phone: shop_phone.into(),
        }
    }

    /// Query the service with retries. The postcode is sanitized first.
    pub async fn fetch_slots(&self, postcode: &str) -> Result<AvailabilityOutcome, TransportError> {
        let postcode = sanitize_postcode(postcode);
        let service = Arc::clone(&self.service);
        retry_with_backoff(&self.retry, "check-availability", |timeout| {
            let service = Arc::clone(&service);
            let postcode = postcode.clone();
            async move { service.check_availability(&postcode, timeout).await }
        })
        .await
    }

    /// List the first page of slots for a postcode.
    pub async fn check_availability(&self, postcode: &str) -> Reply {
        self.check_availability_page(postcode, 0).await.reply
    }

    /// List the next page after `already_shown` slots.
    pub async fn check_more(&self, postcode: &str, already_shown: usize) -> SlotPage {
        self.check_availability_page(postcode, already_shown).await
    }

    /// List slots starting at `offset`.
    pub async fn check_availability_page(&self, postcode: &str, offset: usize) -> SlotPage {
        let display_postcode = sanitize_postcode(postcode);
        let not_advanced = |reply| SlotPage {
            reply,
            shown_through: offset,
        };

        match self.fetch_slots(postcode).await {
            Ok(AvailabilityOutcome::Slots { slots, total }) => {
                match format::slot_listing(&display_postcode, &slots, total, offset) {
                    Some(listing) => SlotPage {
                        reply: Reply::Info(listing),
                        shown_through: (offset + format::SLOTS_PER_PAGE).min(slots.len()),
                    },
                    None if slots.is_empty() => not_advanced(Reply::Info(format::no_slots(
                        &display_postcode,
                        &self.shop_phone,
                    ))),
                    None => not_advanced(Reply::Info(format::no_more_slots(
                        &display_postcode,
                        &self.shop_phone,
                    ))),
                }
            }
            Ok(AvailabilityOutcome::Rejected { message }) => {
                let text = message.unwrap_or_else(|| {
                    format::no_suitable_slots(&display_postcode, &self.shop_phone)
                });
                not_advanced(Reply::Refused(text))
            }
            Err(e) => {
                tracing::error!(
                    postcode = %display_postcode,
                    error = %e,
                    "Availability lookup failed"
                );
                not_advanced(Reply::Apology(format::lookup_unavailable(&self.shop_phone)))
            }
        }
    }

    /// Validate and submit a booking. Always returns a user-facing reply.
    pub async fn book_slot(&self, request: &BookingRequest) -> Reply {
        match self.try_book(request).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::info!(error = %err, "Booking not submitted");
                self.reply_for(err, request)
            }
        }
    }

    async fn try_book(&self, request: &BookingRequest) -> Result<Reply, BookingError> {
        let postcode =
            extract_postcode(&request.address).ok_or_else(|| BookingError::PostcodeMissing {
                address: request.address.clone(),
            })?;
        let date = self.normalizer.date(&request.date)?;
        let time = self.normalizer.time(&request.time)?;

        match self.fetch_slots(&postcode).await {
            Ok(AvailabilityOutcome::Slots { slots, .. }) => {
                if !slots.iter().any(|slot| slot.matches(date, time)) {
                    return Err(BookingError::SlotUnavailable {
                        date: request.date.clone(),
                        time: request.time.clone(),
                        alternatives: slots,
                    });
                }
                tracing::debug!(%postcode, %date, %time, "Requested slot confirmed available");
            }
            Ok(AvailabilityOutcome::Rejected { message }) => {
                let text = message
                    .unwrap_or_else(|| format::no_suitable_slots(&postcode, &self.shop_phone));
                return Ok(Reply::Refused(text));
            }
            Err(e) => {
                tracing::warn!(
                    %postcode,
                    %date,
                    %time,
                    error = %e,
                    "Could not validate slot before booking; submitting without validation"
                );
            }
        }

        let submission = BookingSubmission {
            date: canonical_date(date),
            time: canonical_time(time),
            customer_name: request.customer_name.trim().to_string(),
            address: request.address.trim().to_string(),
            phone: request.phone.trim().to_string(),
        };

        let service = Arc::clone(&self.service);
        let outcome = retry_with_backoff(&self.retry, "create-booking", |timeout| {
            let service = Arc::clone(&service);
            let submission = submission.clone();
            async move { service.create_booking(&submission, timeout).await }
        })
        .await?;

        match outcome {
            BookingOutcome::Confirmed { message } => {
                tracing::info!(
                    date = %submission.date,
                    time = %submission.time,
                    "Booking confirmed"
                );
                Ok(Reply::Confirmed(message))
            }
            BookingOutcome::Failed { error } => {
                tracing::info!(
                    date = %submission.date,
                    time = %submission.time,
                    %error,
                    "Booking refused by service"
                );
                Ok(Reply::Refused(error))
            }
        }
    }

    fn reply_for(&self, err: BookingError, request: &BookingRequest) -> Reply {
        match err {
            BookingError::PostcodeMissing { .. } => Reply::Clarify(format::postcode_missing()),
            BookingError::Temporal(TemporalError::DateFormat { input }) => {
                Reply::Clarify(format::restate_date(&input))
            }
            BookingError::Temporal(TemporalError::TimeFormat { input }) => {
                Reply::Clarify(format::restate_time(&input))
            }
            BookingError::SlotUnavailable {
                date,
                time,
                alternatives,
            } => Reply::Refused(format::slot_taken(&date, &time, &alternatives)),
            BookingError::Transport(_) => Reply::Apology(format::booking_unavailable(
                &request.date,
                &request.time,
                &self.shop_phone,
            )),
        }
    }
}
