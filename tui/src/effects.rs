//! Dialog animation effects.

use std::f32::consts::TAU;

use ratatui::layout::Rect;

use whorl_engine::{ModalEffect, ModalEffectKind};

/// Smallest fraction of the final size the dialog pops in from.
const POP_START: f32 = 0.6;
/// Peak horizontal displacement of a shake, in cells.
const SHAKE_CELLS: f32 = 3.0;
/// Full swings per shake.
const SHAKE_SWINGS: f32 = 4.0;

/// Where the dialog should be drawn this frame while `effect` plays.
#[must_use]
pub fn apply_modal_effect(effect: &ModalEffect, base: Rect, viewport: Rect) -> Rect {
    let t = effect.progress().clamp(0.0, 1.0);
    match effect.kind() {
        ModalEffectKind::PopScale => {
            let eased = 1.0 - (1.0 - t).powi(3);
            shrink_around_center(base, POP_START + (1.0 - POP_START) * eased)
        }
        ModalEffectKind::Shake => nudge_x(base, viewport, shake_offset(t)),
    }
}

/// Damped sine: full swing at the start, zero once the effect ends.
fn shake_offset(t: f32) -> i32 {
    let swing = (t * TAU * SHAKE_SWINGS).sin();
    (swing * SHAKE_CELLS * (1.0 - t)).round() as i32
}

fn nudge_x(base: Rect, viewport: Rect, offset: i32) -> Rect {
    let min_x = i32::from(viewport.x);
    let max_x = (i32::from(viewport.right()) - i32::from(base.width)).max(min_x);
    let x = (i32::from(base.x) + offset).clamp(min_x, max_x);
    Rect {
        x: u16::try_from(x).unwrap_or(base.x),
        ..base
    }
}

fn shrink_around_center(base: Rect, factor: f32) -> Rect {
    let scaled = |len: u16| ((f32::from(len) * factor).round() as u16).clamp(1, len.max(1));
    let width = scaled(base.width);
    let height = scaled(base.height);
    Rect {
        x: base.x + base.width.saturating_sub(width) / 2,
        y: base.y + base.height.saturating_sub(height) / 2,
        width,
        height,
    }
}
