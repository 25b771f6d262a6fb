use crate::motion::InteractionState;
use crate::tuning::CarouselTuning;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrowKey {
    Left,
    Right,
}

impl ArrowKey {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(ArrowKey::Left),
            "ArrowRight" => Some(ArrowKey::Right),
            _ => None,
        }
    }
}

/// One press of the mouse button or one touch, from down to up.
#[derive(Clone, Copy, Debug, PartialEq)]
struct DragSession {
    last_x: f32,
    /// Sum of absolute horizontal movement, in container widths.
    travelled: f32,
}

impl DragSession {
    fn new(x: f32) -> Self {
        Self {
            last_x: x,
            travelled: 0.0,
        }
    }
}

/// Turns wheel, key and drag input into target nudges and decides whether
/// the click that follows a press must be swallowed.
#[derive(Clone, Debug)]
pub struct InputController {
    state: InteractionState,
    drag: Option<DragSession>,
    suppress_next_click: bool,
}

impl InputController {
    pub fn new(card_count: usize) -> Self {
        Self {
            state: InteractionState::new(card_count),
            drag: None,
            suppress_next_click: false,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut InteractionState {
        &mut self.state
    }

    /// One card per wheel event in the direction of `delta_y`, whatever its size.
    pub fn wheel(&mut self, delta_y: f64, tuning: &CarouselTuning) {
        let direction = if delta_y > 0.0 {
            1.0
        } else if delta_y < 0.0 {
            -1.0
        } else {
            return;
        };
        self.state.nudge(direction * tuning.wheel_step);
    }

    pub fn arrow(&mut self, key: ArrowKey, tuning: &CarouselTuning) {
        match key {
            ArrowKey::Left => self.state.nudge(-tuning.key_step),
            ArrowKey::Right => self.state.nudge(tuning.key_step),
        }
    }

    pub fn press(&mut self, x: f32) {
        self.state.velocity = 0.0;
        self.drag = Some(DragSession::new(x));
    }

    /// Moves the carousel with the pointer. `width` is the container width
    /// used to normalize the displacement.
    pub fn drag_to(&mut self, x: f32, width: f32, tuning: &CarouselTuning) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        if !(width > 0.0) {
            return;
        }
        let dx = (x - drag.last_x) / width;
        drag.last_x = x;
        drag.travelled += dx.abs();
        self.state.nudge(-dx * tuning.drag_sensitivity);
        self.state.velocity = -dx * tuning.drag_sensitivity;
    }

    /// Ends the press. Returns true when the next click will be swallowed.
    pub fn release(&mut self, tuning: &CarouselTuning) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if drag.travelled > tuning.drag_cancel_eps {
            self.suppress_next_click = true;
        }
        self.suppress_next_click
    }

    /// Consumes the suppression flag. True means this click must do nothing.
    pub fn take_click_suppression(&mut self) -> bool {
        std::mem::take(&mut self.suppress_next_click)
    }

    pub fn click_suppressed(&self) -> bool {
        self.suppress_next_click
    }
}
