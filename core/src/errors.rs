//! Rejection taxonomy for the enrollment controller.
//!
//! None of these reach the end user. A rejected intent means the host offered
//! an action the current step does not allow; a stale capture means the
//! workflow moved on before the sensor answered.

use thiserror::Error;

use whorl_types::{Identifier, Step};

use crate::CaptureTicket;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentRejection {
    #[error("{intent} ignored while a capture is outstanding")]
    Busy { intent: &'static str },

    #[error("advance requires a selected identifier")]
    NoSelection,

    #[error("identifier {id} is already enrolled")]
    AlreadyEnrolled { id: Identifier },

    #[error("identifier {id} is not offered for enrollment")]
    UnknownIdentifier { id: Identifier },

    #[error("{intent} is not valid in step {step}")]
    NotValidInStep { intent: &'static str, step: Step },
}

/// A capture result that no longer belongs to the active workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stale {} capture result (generation {})", .ticket.phase().as_str(), .ticket.generation())]
pub struct StaleCapture {
    pub ticket: CaptureTicket,
}
