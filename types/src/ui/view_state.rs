//! View state for rendering.
//!
//! Groups everything the host surface needs that is not part of the
//! enrollment workflow itself.

use std::time::Instant;

use super::ModalEffect;

/// UI configuration options derived from config/environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}

/// Whether the enrollment dialog is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalVisibility {
    #[default]
    Closed,
    Open,
}

#[derive(Debug)]
pub struct ViewState {
    pub modal: ModalVisibility,
    pub modal_effect: Option<ModalEffect>,
    pub ui_options: UiOptions,
    /// Timestamp of last frame (for animation timing).
    pub last_frame: Instant,
    /// Last spinner advance; keeps the spinner near 10 Hz whatever the render rate.
    pub last_ui_tick: Instant,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            modal: ModalVisibility::default(),
            modal_effect: None,
            ui_options: UiOptions::default(),
            last_frame: Instant::now(),
            last_ui_tick: Instant::now(),
        }
    }
}

impl ViewState {
    #[must_use]
    pub fn new(ui_options: UiOptions) -> Self {
        Self {
            ui_options,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_modal_open(&self) -> bool {
        self.modal == ModalVisibility::Open
    }
}
