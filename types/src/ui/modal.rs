//! Animation effects for the enrollment dialog.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEffectKind {
    /// Dialog grows into place when opened.
    PopScale,
    /// Dialog shakes horizontally after a rejected capture.
    Shake,
}

/// A one-shot dialog animation driven by frame deltas.
#[derive(Debug, Clone)]
pub struct ModalEffect {
    kind: ModalEffectKind,
    elapsed: Duration,
    duration: Duration,
}

impl ModalEffect {
    #[must_use]
    pub fn pop_scale(duration: Duration) -> Self {
        Self::new(ModalEffectKind::PopScale, duration)
    }

    #[must_use]
    pub fn shake(duration: Duration) -> Self {
        Self::new(ModalEffectKind::Shake, duration)
    }

    fn new(kind: ModalEffectKind, duration: Duration) -> Self {
        Self {
            kind,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    pub fn advance(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta).min(self.duration);
    }

    /// Fraction of the effect already played, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            1.0
        } else {
            self.elapsed.div_duration_f32(self.duration).clamp(0.0, 1.0)
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    #[must_use]
    pub fn kind(&self) -> ModalEffectKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::{ModalEffect, ModalEffectKind};
    use std::time::Duration;

    #[test]
    fn pop_scale_initial_state() {
        let effect = ModalEffect::pop_scale(Duration::from_millis(200));
        assert_eq!(effect.kind(), ModalEffectKind::PopScale);
        assert!(!effect.is_finished());
        assert!(effect.progress() < 0.1);
    }

    #[test]
    fn shake_runs_until_duration_elapses() {
        let mut effect = ModalEffect::shake(Duration::from_millis(250));
        assert_eq!(effect.kind(), ModalEffectKind::Shake);
        effect.advance(Duration::from_millis(100));
        assert!(!effect.is_finished());
        effect.advance(Duration::from_millis(200));
        assert!(effect.is_finished());
    }

    #[test]
    fn zero_duration_immediately_finished() {
        let effect = ModalEffect::pop_scale(Duration::ZERO);
        assert!(effect.is_finished());
        assert!((effect.progress() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn progress_clamped_at_one() {
        let mut effect = ModalEffect::pop_scale(Duration::from_millis(10));
        effect.advance(Duration::from_millis(1000));
        assert!(effect.progress() <= 1.0);
    }
}
