//! Core domain types for whorl.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod enrollment;
mod ids;
mod intent;
mod snapshot;
mod step;
pub mod ui;

pub use enrollment::EnrollmentSet;
pub use ids::{Identifier, InvalidIdentifier};
pub use intent::Intent;
pub use snapshot::EnrollmentSnapshot;
pub use step::{CaptureOutcome, CapturePhase, FlowVariant, Step};
