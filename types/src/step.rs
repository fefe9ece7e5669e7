//! Workflow step and capture vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The active enrollment step. Exactly one is active at a time and it alone
/// decides what the host renders and which intents are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    /// Pick an identifier to enroll.
    #[default]
    Select,
    /// First capture outstanding.
    Scanning,
    /// First capture matched; waiting for the user to move on to confirmation.
    CaptureOk,
    /// Waiting for the user to start the confirming capture.
    Confirming,
    /// Confirming capture outstanding.
    ConfirmScanning,
    /// Two-phase enrollment committed.
    FinalSuccess,
    /// Single-phase enrollment committed.
    Success,
    /// A capture was rejected; the user may retry.
    Rejected,
}

impl Step {
    pub const ALL: [Step; 8] = [
        Step::Select,
        Step::Scanning,
        Step::CaptureOk,
        Step::Confirming,
        Step::ConfirmScanning,
        Step::FinalSuccess,
        Step::Success,
        Step::Rejected,
    ];

    /// True while a capture is outstanding.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Step::Scanning | Step::ConfirmScanning)
    }

    /// Steps in which the enrollment has just been committed.
    #[must_use]
    pub const fn is_committed(self) -> bool {
        matches!(self, Step::FinalSuccess | Step::Success)
    }

    /// The scanning step that waits on a capture of the given phase.
    #[must_use]
    pub const fn scanning_for(phase: CapturePhase) -> Self {
        match phase {
            CapturePhase::First => Step::Scanning,
            CapturePhase::Confirm => Step::ConfirmScanning,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Step::Select => "select",
            Step::Scanning => "scanning",
            Step::CaptureOk => "capture_ok",
            Step::Confirming => "confirming",
            Step::ConfirmScanning => "confirm_scanning",
            Step::FinalSuccess => "final_success",
            Step::Success => "success",
            Step::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two captures a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapturePhase {
    First,
    Confirm,
}

impl CapturePhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CapturePhase::First => "first",
            CapturePhase::Confirm => "confirm",
        }
    }
}

/// Result of one capture attempt. Consumed by the transition logic, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Matched,
    Rejected,
}

/// Whether enrollment requires a confirming second capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowVariant {
    SinglePhase,
    #[default]
    TwoPhase,
}

impl FlowVariant {
    #[must_use]
    pub const fn from_confirmation_required(required: bool) -> Self {
        if required {
            FlowVariant::TwoPhase
        } else {
            FlowVariant::SinglePhase
        }
    }

    #[must_use]
    pub const fn requires_confirmation(self) -> bool {
        matches!(self, FlowVariant::TwoPhase)
    }
}
