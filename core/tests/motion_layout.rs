use systems_carousel_core::{
    layout_cards, CarouselTuning, Debouncer, InteractionState, LabelTracker,
};

#[test]
fn index_converges_to_clamped_target() {
    let tuning = CarouselTuning::default();
    let mut state = InteractionState::new(6);
    state.nudge(40.0);
    assert_eq!(state.target, 5.0);
    for _ in 0..1000 {
        state.step(&tuning);
    }
    assert!(state.is_at_rest(1e-4));
    assert_eq!(state.centered_card(), 5);
}

#[test]
fn resting_state_stays_put() {
    let tuning = CarouselTuning::default();
    let mut state = InteractionState::new(3);
    let before = state;
    for _ in 0..10 {
        state.step(&tuning);
    }
    assert_eq!(state, before);
}

#[test]
fn non_finite_nudge_is_ignored() {
    let mut state = InteractionState::new(3);
    state.nudge(f32::NAN);
    state.nudge(f32::INFINITY);
    assert_eq!(state.target, 1.0);
}

#[test]
fn layout_is_deterministic_and_symmetric() {
    let tuning = CarouselTuning::default();
    let a = layout_cards(5, 2.0, 0.0, &tuning);
    let b = layout_cards(5, 2.0, 0.0, &tuning);
    assert_eq!(a, b);
    assert_eq!(a[2].translation.x, 0.0);
    assert_eq!(a[2].translation.z, 0.0);
    assert!((a[2].scale - tuning.scale_max).abs() < 1e-6);
    assert_eq!(a[2].rotation_y, 0.0);
    assert_eq!(a[1].translation.x, -a[3].translation.x);
    assert_eq!(a[1].rotation_y, -a[3].rotation_y);
}

#[test]
fn far_cards_hit_depth_and_tilt_caps() {
    let tuning = CarouselTuning::default();
    let layout = layout_cards(12, 0.0, 0.0, &tuning);
    let far = layout[11];
    assert_eq!(far.translation.z, -tuning.depth_cap);
    assert!((far.scale - tuning.scale_min).abs() < 1e-6);
    assert!((far.rotation_y + tuning.max_tilt_rad()).abs() < 1e-6);
    assert_eq!(far.shadow.opacity, layout[2].shadow.opacity);
    assert!(far.translation.x > layout[10].translation.x);
}

#[test]
fn shadow_fades_away_from_center() {
    let tuning = CarouselTuning::default();
    let layout = layout_cards(3, 1.0, 0.0, &tuning);
    assert!(layout[1].shadow.opacity > layout[0].shadow.opacity);
    assert!(layout[1].shadow.scale_x < layout[0].shadow.scale_x);
}

#[test]
fn reflection_bounces_opposite_to_bob() {
    let tuning = CarouselTuning::default();
    let layout = layout_cards(3, 1.0, 0.1, &tuning);
    let centered = layout[1];
    assert_eq!(centered.lift, 0.1);
    assert!((centered.reflection_y - (2.0 * tuning.floor_y() - 0.1)).abs() < 1e-6);
    assert_eq!(layout[0].reflection_y, 2.0 * tuning.floor_y());
}

#[test]
fn label_tracker_ignores_transit_within_one_slot() {
    let mut tracker = LabelTracker::new();
    assert_eq!(tracker.update(1.0, 3), Some(1));
    assert_eq!(tracker.update(1.3, 3), None);
    assert_eq!(tracker.update(0.7, 3), None);
    assert_eq!(tracker.update(1.6, 3), Some(2));
    assert_eq!(tracker.shown(), Some(2));
    assert_eq!(tracker.update(0.0, 0), None);
}

#[test]
fn resize_burst_fires_once_after_quiet_period() {
    let mut debounce = Debouncer::new(150.0);
    assert!(!debounce.poll(0.0));
    for now in [0.0, 40.0, 90.0, 130.0] {
        debounce.poke(now);
        assert!(!debounce.poll(now));
    }
    assert!(debounce.is_pending());
    assert!(!debounce.poll(279.0));
    assert!(debounce.poll(280.0));
    assert!(!debounce.poll(600.0));
    assert!(!debounce.is_pending());
}

#[test]
fn cancelled_debounce_never_fires() {
    let mut debounce = Debouncer::new(150.0);
    debounce.poke(0.0);
    debounce.cancel();
    assert!(!debounce.poll(1000.0));
}
