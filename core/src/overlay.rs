#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OverlayPhase {
    Closed,
    Open { card: usize },
}

/// Visibility of the overlay plus the page scroll setting it replaced.
#[derive(Clone, Debug)]
pub struct OverlayState {
    phase: OverlayPhase,
    saved_overflow: Option<String>,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayState {
    pub fn new() -> Self {
        Self {
            phase: OverlayPhase::Closed,
            saved_overflow: None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.phase, OverlayPhase::Open { .. })
    }

    pub fn open_card(&self) -> Option<usize> {
        match self.phase {
            OverlayPhase::Open { card } => Some(card),
            OverlayPhase::Closed => None,
        }
    }

    /// Shows `card`. `page_overflow` is the page's current overflow value; it
    /// is only remembered when coming from closed, so switching cards while
    /// open never records the overlay's own lock.
    pub fn open(&mut self, card: usize, page_overflow: &str) {
        if !self.is_open() {
            self.saved_overflow = Some(page_overflow.to_string());
        }
        self.phase = OverlayPhase::Open { card };
    }

    /// Hides the overlay and hands back the overflow value to restore.
    /// `None` when it was already closed.
    pub fn close(&mut self) -> Option<String> {
        if !self.is_open() {
            return None;
        }
        self.phase = OverlayPhase::Closed;
        Some(self.saved_overflow.take().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_restores_exact_previous_overflow() {
        let mut state = OverlayState::new();
        state.open(2, "scroll");
        assert_eq!(state.open_card(), Some(2));
        assert_eq!(state.close().as_deref(), Some("scroll"));
        assert!(!state.is_open());
    }

    #[test]
    fn switching_cards_keeps_first_saved_value() {
        let mut state = OverlayState::new();
        state.open(0, "auto");
        state.open(1, "hidden");
        assert_eq!(state.open_card(), Some(1));
        assert_eq!(state.close().as_deref(), Some("auto"));
    }

    #[test]
    fn closing_twice_is_a_no_op() {
        let mut state = OverlayState::new();
        state.open(0, "");
        assert_eq!(state.close().as_deref(), Some(""));
        assert_eq!(state.close(), None);
    }
}
