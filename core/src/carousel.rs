use std::fmt;

use crate::camera::CameraRig;
use crate::catalog::Card;
use crate::input::{ArrowKey, InputController};
use crate::layout::{layout_cards, CardTransform, LabelTracker};
use crate::motion::{bob_offset, InteractionState};
use crate::pick::{is_actionable, pick_card};
use crate::tuning::CarouselTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselError {
    NoCards,
}

impl fmt::Display for CarouselError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarouselError::NoCards => write!(f, "carousel needs at least one card"),
        }
    }
}

impl std::error::Error for CarouselError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The click closed a drag and was swallowed.
    Suppressed,
    /// Nothing actionable under the pointer.
    Ignored,
    /// Open the overlay for this card.
    Open(usize),
}

/// Output of one animation step, borrowed from the carousel.
#[derive(Debug)]
pub struct Frame<'a> {
    pub transforms: &'a [CardTransform],
    /// Set when the title label must switch to this card.
    pub label_card: Option<usize>,
    pub camera: &'a CameraRig,
}

/// The whole interaction engine: input, spring, layout, picking and the
/// click gate for one carousel instance.
pub struct Carousel {
    cards: Vec<Card>,
    tuning: CarouselTuning,
    input: InputController,
    camera: CameraRig,
    labels: LabelTracker,
    transforms: Vec<CardTransform>,
    hovered: Option<usize>,
}

impl Carousel {
    pub fn new(
        cards: Vec<Card>,
        tuning: CarouselTuning,
        width: f32,
        height: f32,
    ) -> Result<Self, CarouselError> {
        if cards.is_empty() {
            return Err(CarouselError::NoCards);
        }
        let input = InputController::new(cards.len());
        let transforms = layout_cards(cards.len(), input.state().index, 0.0, &tuning);
        Ok(Self {
            cards,
            tuning,
            input,
            camera: CameraRig::new(width, height),
            labels: LabelTracker::new(),
            transforms,
            hovered: None,
        })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn tuning(&self) -> &CarouselTuning {
        &self.tuning
    }

    pub fn state(&self) -> &InteractionState {
        self.input.state()
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn transforms(&self) -> &[CardTransform] {
        &self.transforms
    }

    pub fn centered_card(&self) -> &Card {
        &self.cards[self.state().centered_card()]
    }

    pub fn wheel(&mut self, delta_y: f64) {
        self.input.wheel(delta_y, &self.tuning);
    }

    pub fn arrow(&mut self, key: ArrowKey) {
        self.input.arrow(key, &self.tuning);
    }

    pub fn press(&mut self, x: f32) {
        self.input.press(x);
    }

    pub fn drag_to(&mut self, x: f32, width: f32) {
        self.input.drag_to(x, width, &self.tuning);
    }

    pub fn release(&mut self) -> bool {
        self.input.release(&self.tuning)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.resize(width, height);
    }

    /// Advances the spring one frame and lays the cards out.
    pub fn tick(&mut self, elapsed_secs: f32) -> Frame<'_> {
        self.input.state_mut().step(&self.tuning);
        let bob = bob_offset(elapsed_secs, &self.tuning);
        let index = self.input.state().index;
        self.transforms = layout_cards(self.cards.len(), index, bob, &self.tuning);
        let label_card = self.labels.update(index, self.cards.len());
        Frame {
            transforms: &self.transforms,
            label_card,
            camera: &self.camera,
        }
    }

    /// Hit-tests the pointer at viewport pixel `(x, y)` and returns the card
    /// it would open, if the gate allows it.
    pub fn hover_at(&mut self, x: f32, y: f32) -> Option<&Card> {
        self.hovered = self.actionable_at(x, y);
        self.hovered_card()
    }

    pub fn hovered_card(&self) -> Option<&Card> {
        self.hovered.and_then(|index| self.cards.get(index))
    }

    /// Handles a click at viewport pixel `(x, y)`. The hit-test is redone at
    /// the click position; a hit opens whichever card is centered.
    pub fn click_at(&mut self, x: f32, y: f32) -> ClickOutcome {
        if self.input.take_click_suppression() {
            return ClickOutcome::Suppressed;
        }
        if self.hover_at(x, y).is_none() {
            return ClickOutcome::Ignored;
        }
        ClickOutcome::Open(self.state().centered_card())
    }

    fn actionable_at(&self, x: f32, y: f32) -> Option<usize> {
        let ndc = self.camera.pointer_to_ndc(x, y);
        let ray = self.camera.ray_from_ndc(ndc)?;
        let hit = pick_card(&ray, &self.transforms, &self.tuning)?;
        let state = self.state();
        is_actionable(hit, state.index, state.velocity, &self.tuning).then_some(hit)
    }
}
