use systems_carousel_core::{
    ArrowKey, Card, Carousel, CarouselError, CarouselTuning, ClickOutcome,
};

const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;

fn cards(count: usize) -> Vec<Card> {
    (0..count)
        .map(|i| {
            Card::new(
                i,
                &format!("CARD{i}.SYSTEM"),
                &format!("/img/card{i}.jpg"),
                &format!("/systems/card{i}.html"),
            )
        })
        .collect()
}

fn carousel(count: usize) -> Carousel {
    let mut carousel =
        Carousel::new(cards(count), CarouselTuning::default(), WIDTH, HEIGHT).expect("carousel");
    carousel.tick(0.0);
    carousel
}

fn settle(carousel: &mut Carousel) {
    for _ in 0..800 {
        carousel.tick(0.0);
    }
}

#[test]
fn empty_card_list_is_rejected() {
    let err = Carousel::new(Vec::new(), CarouselTuning::default(), WIDTH, HEIGHT)
        .err()
        .expect("error");
    assert_eq!(err, CarouselError::NoCards);
    assert_eq!(err.to_string(), "carousel needs at least one card");
}

#[test]
fn click_at_screen_center_opens_centered_card() {
    let mut carousel = carousel(3);
    assert_eq!(
        carousel.click_at(WIDTH * 0.5, HEIGHT * 0.5),
        ClickOutcome::Open(1)
    );
    let hovered = carousel.hovered_card().expect("hover target");
    assert_eq!(hovered.link, "/systems/card1.html");
}

#[test]
fn click_in_empty_sky_is_ignored() {
    let mut carousel = carousel(3);
    assert_eq!(carousel.click_at(1.0, 1.0), ClickOutcome::Ignored);
    assert!(carousel.hovered_card().is_none());
}

#[test]
fn moving_carousel_is_not_clickable() {
    let mut carousel = carousel(3);
    carousel.arrow(ArrowKey::Right);
    carousel.tick(0.0);
    carousel.tick(0.0);
    assert!(carousel.state().velocity.abs() > carousel.tuning().click_speed_eps);
    assert_eq!(
        carousel.click_at(WIDTH * 0.5, HEIGHT * 0.5),
        ClickOutcome::Ignored
    );
    settle(&mut carousel);
    assert_eq!(
        carousel.click_at(WIDTH * 0.5, HEIGHT * 0.5),
        ClickOutcome::Open(2)
    );
}

#[test]
fn drag_past_threshold_swallows_exactly_one_click() {
    let mut carousel = carousel(3);
    carousel.press(500.0);
    carousel.drag_to(400.0, 1000.0);
    carousel.drag_to(500.0, 1000.0);
    assert!(carousel.release());
    assert_eq!(
        carousel.click_at(WIDTH * 0.5, HEIGHT * 0.5),
        ClickOutcome::Suppressed
    );
    settle(&mut carousel);
    assert_eq!(
        carousel.click_at(WIDTH * 0.5, HEIGHT * 0.5),
        ClickOutcome::Open(1)
    );
}

#[test]
fn short_drag_does_not_swallow_click() {
    let mut carousel = carousel(3);
    carousel.press(500.0);
    carousel.drag_to(505.0, 1000.0);
    assert!(!carousel.release());
    assert!(!carousel.input().click_suppressed());
    settle(&mut carousel);
    assert_eq!(
        carousel.click_at(WIDTH * 0.5, HEIGHT * 0.5),
        ClickOutcome::Open(1)
    );
}

#[test]
fn release_without_press_leaves_flag_alone() {
    let mut carousel = carousel(3);
    assert!(!carousel.release());
    assert_eq!(
        carousel.click_at(WIDTH * 0.5, HEIGHT * 0.5),
        ClickOutcome::Open(1)
    );
}

#[test]
fn label_changes_only_when_nearest_card_changes() {
    let mut carousel =
        Carousel::new(cards(5), CarouselTuning::default(), WIDTH, HEIGHT).expect("carousel");
    assert_eq!(carousel.tick(0.0).label_card, Some(2));
    assert_eq!(carousel.tick(0.1).label_card, None);
    carousel.wheel(120.0);
    let mut changes = Vec::new();
    for _ in 0..800 {
        if let Some(card) = carousel.tick(0.0).label_card {
            changes.push(card);
        }
    }
    assert_eq!(changes, vec![3]);
    assert_eq!(carousel.centered_card().label, "CARD3.SYSTEM");
}

#[test]
fn wheel_and_keys_never_push_target_out_of_range() {
    let mut carousel = carousel(4);
    for _ in 0..10 {
        carousel.wheel(-3.0);
        carousel.arrow(ArrowKey::Left);
    }
    assert_eq!(carousel.state().target, 0.0);
    for _ in 0..10 {
        carousel.wheel(900.0);
    }
    assert_eq!(carousel.state().target, 3.0);
}

#[test]
fn only_centered_card_bobs() {
    let mut carousel = carousel(3);
    let quarter = 0.25 / carousel.tuning().bob_frequency_hz;
    let frame = carousel.tick(quarter);
    let lifts: Vec<f32> = frame.transforms.iter().map(|t| t.lift).collect();
    assert_eq!(lifts[0], 0.0);
    assert_eq!(lifts[2], 0.0);
    assert!(lifts[1] > 0.0);
}
