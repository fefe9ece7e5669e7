//! Core domain logic for whorl.
//!
//! The enrollment controller lives here as a synchronous state machine. It
//! never performs a capture itself: starting one yields a [`CaptureTicket`]
//! that the caller redeems once the capture service answers.

mod errors;
mod machine;

pub use errors::{IntentRejection, StaleCapture};
pub use machine::{CaptureTicket, Effect, EnrollmentMachine, Generation, Resolution, SessionExit};
