use std::f32::consts::TAU;

use crate::tuning::CarouselTuning;

/// Continuous position of the carousel, in card units.
///
/// `target` is always inside `[0, card_count - 1]`. `index` chases it
/// through [`InteractionState::step`] and is never clamped on its own.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionState {
    pub index: f32,
    pub target: f32,
    pub velocity: f32,
    card_count: usize,
}

impl InteractionState {
    /// Starts centered on the middle card.
    pub fn new(card_count: usize) -> Self {
        let start = (card_count / 2) as f32;
        Self {
            index: start,
            target: start,
            velocity: 0.0,
            card_count,
        }
    }

    pub fn card_count(&self) -> usize {
        self.card_count
    }

    pub fn max_index(&self) -> f32 {
        self.card_count.saturating_sub(1) as f32
    }

    /// Moves the target by `delta` card units and clamps it to the card range.
    pub fn nudge(&mut self, delta: f32) {
        if !delta.is_finite() {
            return;
        }
        self.target = (self.target + delta).clamp(0.0, self.max_index());
    }

    /// One integrator step of the damped spring.
    pub fn step(&mut self, tuning: &CarouselTuning) {
        let delta = self.target - self.index;
        self.velocity = self.velocity * tuning.damping + delta * tuning.stiffness;
        self.index += self.velocity;
    }

    /// Card whose slot is nearest the current position.
    pub fn centered_card(&self) -> usize {
        nearest_card(self.index, self.card_count)
    }

    pub fn is_at_rest(&self, epsilon: f32) -> bool {
        (self.target - self.index).abs() <= epsilon && self.velocity.abs() <= epsilon
    }
}

/// Rounds half up like the browser's `Math.round`, then clamps to a valid card.
pub fn nearest_card(position: f32, card_count: usize) -> usize {
    if card_count == 0 {
        return 0;
    }
    let rounded = (position + 0.5).floor();
    if rounded <= 0.0 || !rounded.is_finite() {
        return 0;
    }
    (rounded as usize).min(card_count - 1)
}

/// Vertical lift of the centered card at `elapsed_secs`.
pub fn bob_offset(elapsed_secs: f32, tuning: &CarouselTuning) -> f32 {
    (elapsed_secs * TAU * tuning.bob_frequency_hz).sin() * tuning.bob_amplitude
}
