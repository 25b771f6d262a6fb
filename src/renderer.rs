use glam::{Mat4, Vec3};
use systems_carousel_core::layout::{SHADOW_DEPTH_RATIO, SHADOW_WIDTH_RATIO};
use systems_carousel_core::{CameraRig, Card, CardTransform, CarouselTuning, Frame};
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, HtmlElement};

use crate::dom;

/// CSS pixels per world unit inside the 3D stage.
const PX_PER_UNIT: f32 = 100.0;
const SYSTEM_TITLE_HEIGHT_RATIO: f32 = 0.9;
const PAGE_TITLE_Y: f32 = 5.0;
const REFLECTION_OPACITY: &str = "0.5";

struct CardNodes {
    front: HtmlElement,
    reflection: HtmlElement,
    shadow: HtmlElement,
}

/// Draws the carousel with CSS 3D transforms: a perspective viewport, a
/// camera element carrying the view matrix, and one absolutely placed
/// element per card part. Labels live on a flat layer on top.
pub(crate) struct CarouselRenderer {
    surface: HtmlElement,
    camera: HtmlElement,
    cards: Vec<CardNodes>,
    labels: Vec<String>,
    system_title: HtmlElement,
    page_title: HtmlElement,
    card_height: f32,
}

impl CarouselRenderer {
    pub(crate) fn new(
        document: &Document,
        host: &Element,
        cards: &[Card],
        tuning: &CarouselTuning,
        page_title: &str,
    ) -> Result<Self, JsValue> {
        let surface = dom::create_div(document, "systems-stage")?;
        dom::set_styles(
            &surface,
            &[
                ("position", "absolute"),
                ("inset", "0"),
                ("overflow", "hidden"),
                ("touch-action", "pan-y"),
            ],
        )?;
        let camera = dom::create_div(document, "systems-camera")?;
        dom::set_styles(
            &camera,
            &[
                ("position", "absolute"),
                ("inset", "0"),
                ("transform-style", "preserve-3d"),
                ("pointer-events", "none"),
            ],
        )?;
        surface.append_child(&camera)?;

        let card_w = format!("{}px", tuning.card_width * PX_PER_UNIT);
        let card_h = format!("{}px", tuning.card_height * PX_PER_UNIT);
        let shadow_w = format!("{}px", tuning.card_width * SHADOW_WIDTH_RATIO * PX_PER_UNIT);
        let shadow_h = format!("{}px", tuning.card_height * SHADOW_DEPTH_RATIO * PX_PER_UNIT);
        let mut nodes = Vec::with_capacity(cards.len());
        for card in cards {
            let image = format!("url(\"{}\")", card.image);
            let shadow = dom::create_div(document, "systems-card-shadow")?;
            dom::set_styles(
                &shadow,
                &[
                    ("position", "absolute"),
                    ("width", &shadow_w),
                    ("height", &shadow_h),
                    (
                        "background",
                        "radial-gradient(closest-side, rgba(0,0,0,0.35) 40%, rgba(0,0,0,0) 100%)",
                    ),
                ],
            )?;
            let reflection = dom::create_div(document, "systems-card-reflection")?;
            dom::set_styles(
                &reflection,
                &[
                    ("position", "absolute"),
                    ("width", &card_w),
                    ("height", &card_h),
                    ("background-image", &image),
                    ("background-size", "cover"),
                    ("background-position", "center"),
                    ("opacity", REFLECTION_OPACITY),
                    ("filter", "brightness(0.6)"),
                    ("mask-image", "linear-gradient(to top, #000, transparent)"),
                    ("-webkit-mask-image", "linear-gradient(to top, #000, transparent)"),
                ],
            )?;
            let front = dom::create_div(document, "systems-card")?;
            front.set_attribute("role", "img")?;
            front.set_attribute("aria-label", &card.label)?;
            dom::set_styles(
                &front,
                &[
                    ("position", "absolute"),
                    ("width", &card_w),
                    ("height", &card_h),
                    ("background-image", &image),
                    ("background-size", "cover"),
                    ("background-position", "center"),
                    ("backface-visibility", "hidden"),
                ],
            )?;
            camera.append_child(&shadow)?;
            camera.append_child(&reflection)?;
            camera.append_child(&front)?;
            nodes.push(CardNodes {
                front,
                reflection,
                shadow,
            });
        }

        let label_layer = dom::create_div(document, "systems-labels")?;
        dom::set_styles(
            &label_layer,
            &[
                ("position", "absolute"),
                ("inset", "0"),
                ("pointer-events", "none"),
            ],
        )?;
        let system_title = dom::create_div(document, "systemTitle")?;
        let page_title_el = dom::create_div(document, "pageTitle")?;
        page_title_el.set_text_content(Some(page_title));
        for label in [&system_title, &page_title_el] {
            dom::set_styles(label, &[("position", "absolute"), ("left", "0"), ("top", "0")])?;
            label_layer.append_child(label)?;
        }
        surface.append_child(&label_layer)?;
        host.append_child(&surface)?;

        Ok(Self {
            surface,
            camera,
            cards: nodes,
            labels: cards.iter().map(|card| card.label.clone()).collect(),
            system_title,
            page_title: page_title_el,
            card_height: tuning.card_height,
        })
    }

    /// The element that receives pointer input.
    pub(crate) fn surface(&self) -> &HtmlElement {
        &self.surface
    }

    pub(crate) fn set_pointer(&self, active: bool) {
        dom::set_style(&self.surface, "cursor", if active { "pointer" } else { "" });
    }

    /// Scene pass then label pass, always in that order.
    pub(crate) fn render_frame(&self, frame: &Frame<'_>) {
        if let Some(card) = frame.label_card {
            let label = self.labels.get(card).map(String::as_str).unwrap_or("");
            self.system_title.set_text_content(Some(label));
        }
        self.render_scene(frame.transforms, frame.camera);
        self.render_labels(frame.camera);
    }

    fn render_scene(&self, transforms: &[CardTransform], camera: &CameraRig) {
        let viewport = camera.viewport();
        let focal = camera.focal_length_px();
        dom::set_style(&self.surface, "perspective", &format!("{focal}px"));
        let view = Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0))
            * to_stage_units(camera.view_matrix());
        dom::set_style(
            &self.camera,
            "transform",
            &format!(
                "translateZ({focal}px) {} translate({}px,{}px)",
                dom::matrix3d(&view),
                viewport.x * 0.5,
                viewport.y * 0.5
            ),
        );
        for (nodes, transform) in self.cards.iter().zip(transforms) {
            dom::set_style(
                &nodes.front,
                "transform",
                &object_transform(transform.front_matrix()),
            );
            dom::set_style(
                &nodes.reflection,
                "transform",
                &object_transform(transform.reflection_matrix()),
            );
            dom::set_style(
                &nodes.shadow,
                "transform",
                &object_transform(transform.shadow_matrix()),
            );
            dom::set_style(
                &nodes.shadow,
                "opacity",
                &transform.shadow.opacity.to_string(),
            );
        }
    }

    fn render_labels(&self, camera: &CameraRig) {
        let anchors = [
            (
                &self.system_title,
                Vec3::new(0.0, self.card_height * SYSTEM_TITLE_HEIGHT_RATIO, 0.0),
            ),
            (&self.page_title, Vec3::new(0.0, PAGE_TITLE_Y, 0.0)),
        ];
        for (label, anchor) in anchors {
            match camera.project_to_viewport(anchor) {
                Some(point) => {
                    dom::set_style(label, "display", "");
                    dom::set_style(
                        label,
                        "transform",
                        &format!(
                            "translate(-50%,-50%) translate({}px,{}px)",
                            point.x, point.y
                        ),
                    );
                }
                None => dom::set_style(label, "display", "none"),
            }
        }
    }

    pub(crate) fn teardown(&self) {
        self.surface.remove();
    }
}

/// Rescales a world matrix so translations are in stage pixels; rotation
/// and scale stay unitless.
fn to_stage_units(matrix: Mat4) -> Mat4 {
    let mut cols = matrix.to_cols_array();
    for value in &mut cols[12..15] {
        *value *= PX_PER_UNIT;
    }
    Mat4::from_cols_array(&cols)
}

/// CSS y grows downward, so the element's own y axis is flipped before the
/// world transform.
fn object_transform(world: Mat4) -> String {
    let matrix = to_stage_units(world) * Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0));
    format!("translate(-50%,-50%) {}", dom::matrix3d(&matrix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use systems_carousel_core::Carousel;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn cards() -> Vec<Card> {
        (0..3)
            .map(|i| Card::new(i, &format!("C{i}"), "/img/x.jpg", "/x.html"))
            .collect()
    }

    #[wasm_bindgen_test]
    fn builds_three_parts_per_card_and_updates_title_on_change() {
        let document = dom::document().unwrap();
        let host = document.create_element("div").unwrap();
        let tuning = CarouselTuning::default();
        let renderer =
            CarouselRenderer::new(&document, &host, &cards(), &tuning, "SYSTEMS").unwrap();
        assert_eq!(host.query_selector_all(".systems-card").unwrap().length(), 3);
        assert_eq!(
            host.query_selector_all(".systems-card-reflection").unwrap().length(),
            3
        );
        assert_eq!(
            renderer.page_title.text_content().as_deref(),
            Some("SYSTEMS")
        );

        let mut carousel = Carousel::new(cards(), tuning, 800.0, 600.0).unwrap();
        renderer.render_frame(&carousel.tick(0.0));
        assert_eq!(renderer.system_title.text_content().as_deref(), Some("C1"));
        let transform = dom::style_value(&renderer.cards[1].front, "transform");
        assert!(transform.contains("matrix3d"));
        renderer.teardown();
    }

    #[wasm_bindgen_test]
    fn stage_units_scale_only_translation() {
        let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)) * Mat4::from_rotation_y(0.5);
        let staged = to_stage_units(world);
        assert_eq!(staged.w_axis.truncate(), Vec3::new(100.0, 200.0, 300.0));
        assert_eq!(staged.x_axis, world.x_axis);
    }
}
