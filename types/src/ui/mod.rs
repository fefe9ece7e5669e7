//! UI state types for the TUI layer.
//!
//! Pure data types with no IO, no async, no ratatui dependency.
//! Used by both the engine (state ownership) and tui (rendering/input).

mod modal;
mod view_state;

pub use modal::{ModalEffect, ModalEffectKind};
pub use view_state::{ModalVisibility, UiOptions, ViewState};
