//! Availability reconciler: the single authority for slot lookups and for
//! validating a booking against live availability before it is submitted.

pub mod client;
pub mod format;
pub mod model;
pub mod postcode;
pub mod reconciler;

pub use client::{HttpSlotService, SlotService};
pub use model::{AvailabilityOutcome, BookingOutcome, BookingRequest, BookingSubmission, Slot};
pub use postcode::{extract_postcode, sanitize_postcode};
pub use reconciler::{AvailabilityReconciler, SlotPage};
