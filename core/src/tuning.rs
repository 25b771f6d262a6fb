use std::fmt;

use serde::Deserialize;

pub const DAMPING_DEFAULT: f32 = 0.8;
pub const STIFFNESS_DEFAULT: f32 = 0.008;
pub const DRAG_SENSITIVITY_DEFAULT: f32 = 5.0;
pub const KEY_STEP_DEFAULT: f32 = 1.0;
pub const WHEEL_STEP_DEFAULT: f32 = 1.0;
pub const CARD_WIDTH_DEFAULT: f32 = 4.5;
pub const CARD_HEIGHT_DEFAULT: f32 = 3.0;
pub const GAP_DEFAULT: f32 = 5.0;
pub const DEPTH_STEP_DEFAULT: f32 = 1.5;
pub const DEPTH_CAP_DEFAULT: f32 = 6.0;
pub const SCALE_MIN_DEFAULT: f32 = 0.75;
pub const SCALE_MAX_DEFAULT: f32 = 1.3;
pub const MAX_TILT_DEG_DEFAULT: f32 = 55.0;
pub const BOB_AMPLITUDE_DEFAULT: f32 = 0.14;
pub const BOB_FREQUENCY_HZ_DEFAULT: f32 = 0.2;
pub const CLICK_CENTER_EPS_DEFAULT: f32 = 0.25;
pub const CLICK_SPEED_EPS_DEFAULT: f32 = 0.003;
pub const DRAG_CANCEL_EPS_DEFAULT: f32 = 0.02;
pub const RESIZE_QUIET_MS_DEFAULT: f32 = 150.0;

/// Every tuning constant of the carousel in one place.
///
/// Positions are measured in card units (one unit = one card step), world
/// distances in scene units, and per-frame quantities assume one integrator
/// step per display refresh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarouselTuning {
    /// Velocity kept from one frame to the next. Must lie in (0, 1).
    pub damping: f32,
    /// Fraction of the remaining distance added to velocity each frame.
    /// Must lie in (0, 2 * (1 + damping)); outside that band the spring
    /// oscillates without bound.
    pub stiffness: f32,
    /// Card units moved per container width of horizontal drag.
    pub drag_sensitivity: f32,
    /// Card units per arrow key press.
    pub key_step: f32,
    /// Card units per wheel event, regardless of wheel magnitude.
    pub wheel_step: f32,
    pub card_width: f32,
    pub card_height: f32,
    /// Horizontal spacing between neighbouring cards.
    pub gap: f32,
    /// Depth pushback per card unit of distance from center.
    pub depth_step: f32,
    /// Maximum depth pushback.
    pub depth_cap: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    pub max_tilt_deg: f32,
    /// Peak vertical lift of the centered card.
    pub bob_amplitude: f32,
    pub bob_frequency_hz: f32,
    /// A card farther than this from the center position is never clickable.
    pub click_center_eps: f32,
    /// A carousel moving faster than this per frame is never clickable.
    pub click_speed_eps: f32,
    /// Accumulated drag, in container widths, beyond which the next click
    /// is swallowed.
    pub drag_cancel_eps: f32,
    /// Quiet period before a burst of resize events is applied.
    pub resize_quiet_ms: f32,
}

impl Default for CarouselTuning {
    fn default() -> Self {
        Self {
            damping: DAMPING_DEFAULT,
            stiffness: STIFFNESS_DEFAULT,
            drag_sensitivity: DRAG_SENSITIVITY_DEFAULT,
            key_step: KEY_STEP_DEFAULT,
            wheel_step: WHEEL_STEP_DEFAULT,
            card_width: CARD_WIDTH_DEFAULT,
            card_height: CARD_HEIGHT_DEFAULT,
            gap: GAP_DEFAULT,
            depth_step: DEPTH_STEP_DEFAULT,
            depth_cap: DEPTH_CAP_DEFAULT,
            scale_min: SCALE_MIN_DEFAULT,
            scale_max: SCALE_MAX_DEFAULT,
            max_tilt_deg: MAX_TILT_DEG_DEFAULT,
            bob_amplitude: BOB_AMPLITUDE_DEFAULT,
            bob_frequency_hz: BOB_FREQUENCY_HZ_DEFAULT,
            click_center_eps: CLICK_CENTER_EPS_DEFAULT,
            click_speed_eps: CLICK_SPEED_EPS_DEFAULT,
            drag_cancel_eps: DRAG_CANCEL_EPS_DEFAULT,
            resize_quiet_ms: RESIZE_QUIET_MS_DEFAULT,
        }
    }
}

impl CarouselTuning {
    /// Parses a JSON object of overrides and applies it on top of the
    /// defaults.
    pub fn from_json(raw: &str) -> Result<Self, TuningError> {
        let overrides: TuningOverrides = serde_json::from_str(raw)
            .map_err(|err| TuningError::InvalidOverrides(err.to_string()))?;
        let tuning = Self::default().with_overrides(&overrides);
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn with_overrides(mut self, overrides: &TuningOverrides) -> Self {
        let pairs: [(&mut f32, Option<f32>); 19] = [
            (&mut self.damping, overrides.damping),
            (&mut self.stiffness, overrides.stiffness),
            (&mut self.drag_sensitivity, overrides.drag_sensitivity),
            (&mut self.key_step, overrides.key_step),
            (&mut self.wheel_step, overrides.wheel_step),
            (&mut self.card_width, overrides.card_width),
            (&mut self.card_height, overrides.card_height),
            (&mut self.gap, overrides.gap),
            (&mut self.depth_step, overrides.depth_step),
            (&mut self.depth_cap, overrides.depth_cap),
            (&mut self.scale_min, overrides.scale_min),
            (&mut self.scale_max, overrides.scale_max),
            (&mut self.max_tilt_deg, overrides.max_tilt_deg),
            (&mut self.bob_amplitude, overrides.bob_amplitude),
            (&mut self.bob_frequency_hz, overrides.bob_frequency_hz),
            (&mut self.click_center_eps, overrides.click_center_eps),
            (&mut self.click_speed_eps, overrides.click_speed_eps),
            (&mut self.drag_cancel_eps, overrides.drag_cancel_eps),
            (&mut self.resize_quiet_ms, overrides.resize_quiet_ms),
        ];
        for (slot, value) in pairs {
            if let Some(value) = value {
                *slot = value;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        for (field, value) in self.fields() {
            if !value.is_finite() {
                return Err(TuningError::out_of_range(field, value, "a finite number"));
            }
        }
        if self.damping <= 0.0 || self.damping >= 1.0 {
            return Err(TuningError::out_of_range("damping", self.damping, "(0, 1)"));
        }
        if self.stiffness <= 0.0 || self.stiffness >= 2.0 * (1.0 + self.damping) {
            return Err(TuningError::out_of_range(
                "stiffness",
                self.stiffness,
                "(0, 2 * (1 + damping))",
            ));
        }
        let positive = [
            ("dragSensitivity", self.drag_sensitivity),
            ("keyStep", self.key_step),
            ("wheelStep", self.wheel_step),
            ("cardWidth", self.card_width),
            ("cardHeight", self.card_height),
            ("gap", self.gap),
            ("clickCenterEps", self.click_center_eps),
            ("clickSpeedEps", self.click_speed_eps),
            ("dragCancelEps", self.drag_cancel_eps),
            ("scaleMin", self.scale_min),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(TuningError::out_of_range(field, value, "greater than 0"));
            }
        }
        let non_negative = [
            ("depthStep", self.depth_step),
            ("depthCap", self.depth_cap),
            ("maxTiltDeg", self.max_tilt_deg),
            ("bobAmplitude", self.bob_amplitude),
            ("bobFrequencyHz", self.bob_frequency_hz),
            ("resizeQuietMs", self.resize_quiet_ms),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(TuningError::out_of_range(field, value, "at least 0"));
            }
        }
        if self.scale_max < self.scale_min {
            return Err(TuningError::out_of_range(
                "scaleMax",
                self.scale_max,
                "at least scaleMin",
            ));
        }
        if self.max_tilt_deg > 90.0 {
            return Err(TuningError::out_of_range("maxTiltDeg", self.max_tilt_deg, "at most 90"));
        }
        Ok(())
    }

    pub fn max_tilt_rad(&self) -> f32 {
        self.max_tilt_deg.to_radians()
    }

    /// World height of the reflective floor plane.
    pub fn floor_y(&self) -> f32 {
        -self.card_height * 0.8
    }

    fn fields(&self) -> [(&'static str, f32); 19] {
        [
            ("damping", self.damping),
            ("stiffness", self.stiffness),
            ("dragSensitivity", self.drag_sensitivity),
            ("keyStep", self.key_step),
            ("wheelStep", self.wheel_step),
            ("cardWidth", self.card_width),
            ("cardHeight", self.card_height),
            ("gap", self.gap),
            ("depthStep", self.depth_step),
            ("depthCap", self.depth_cap),
            ("scaleMin", self.scale_min),
            ("scaleMax", self.scale_max),
            ("maxTiltDeg", self.max_tilt_deg),
            ("bobAmplitude", self.bob_amplitude),
            ("bobFrequencyHz", self.bob_frequency_hz),
            ("clickCenterEps", self.click_center_eps),
            ("clickSpeedEps", self.click_speed_eps),
            ("dragCancelEps", self.drag_cancel_eps),
            ("resizeQuietMs", self.resize_quiet_ms),
        ]
    }
}

/// Partial tuning as supplied by the host page. Missing fields keep their
/// defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TuningOverrides {
    pub damping: Option<f32>,
    pub stiffness: Option<f32>,
    pub drag_sensitivity: Option<f32>,
    pub key_step: Option<f32>,
    pub wheel_step: Option<f32>,
    pub card_width: Option<f32>,
    pub card_height: Option<f32>,
    pub gap: Option<f32>,
    pub depth_step: Option<f32>,
    pub depth_cap: Option<f32>,
    pub scale_min: Option<f32>,
    pub scale_max: Option<f32>,
    pub max_tilt_deg: Option<f32>,
    pub bob_amplitude: Option<f32>,
    pub bob_frequency_hz: Option<f32>,
    pub click_center_eps: Option<f32>,
    pub click_speed_eps: Option<f32>,
    pub drag_cancel_eps: Option<f32>,
    pub resize_quiet_ms: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    OutOfRange {
        field: &'static str,
        value: f32,
        expected: &'static str,
    },
    InvalidOverrides(String),
}

impl TuningError {
    fn out_of_range(field: &'static str, value: f32, expected: &'static str) -> Self {
        TuningError::OutOfRange {
            field,
            value,
            expected,
        }
    }
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::OutOfRange {
                field,
                value,
                expected,
            } => write!(f, "{field} must be {expected}, got {value}"),
            TuningError::InvalidOverrides(message) => {
                write!(f, "invalid tuning overrides: {message}")
            }
        }
    }
}

impl std::error::Error for TuningError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(CarouselTuning::default().validate(), Ok(()));
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let tuning = CarouselTuning::from_json(r#"{"damping": 0.9, "gap": 6}"#).unwrap();
        assert_eq!(tuning.damping, 0.9);
        assert_eq!(tuning.gap, 6.0);
        assert_eq!(tuning.stiffness, STIFFNESS_DEFAULT);
    }

    #[test]
    fn unknown_override_field_is_rejected() {
        let err = CarouselTuning::from_json(r#"{"dampning": 0.9}"#).unwrap_err();
        assert!(matches!(err, TuningError::InvalidOverrides(_)));
    }

    #[test]
    fn damping_must_stay_below_one() {
        let err = CarouselTuning::from_json(r#"{"damping": 1.0}"#).unwrap_err();
        assert!(matches!(err, TuningError::OutOfRange { field: "damping", .. }));
    }

    #[test]
    fn stiffness_upper_bound_depends_on_damping() {
        let ok = CarouselTuning::from_json(r#"{"damping": 0.5, "stiffness": 2.9}"#);
        assert!(ok.is_ok());
        let err = CarouselTuning::from_json(r#"{"damping": 0.5, "stiffness": 3.0}"#).unwrap_err();
        assert!(matches!(err, TuningError::OutOfRange { field: "stiffness", .. }));
    }

    #[test]
    fn scale_range_must_be_ordered() {
        let err = CarouselTuning::from_json(r#"{"scaleMin": 1.5}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "scaleMax must be at least scaleMin, got 1.3"
        );
    }
}
