use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::console;
use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo::render::{request_animation_frame, AnimationFrame};
use systems_carousel_core::{
    catalog_cards, resolve_content, ArrowKey, Carousel, ClickOutcome, ContentRegistry, Debouncer,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Event, HtmlElement, KeyboardEvent, MouseEvent, PageTransitionEvent, TouchEvent,
    WheelEvent, Window,
};

use crate::dom;
use crate::overlay::OverlayController;
use crate::registry;
use crate::renderer::CarouselRenderer;
use crate::settings::{self, CONTAINER_ID};

thread_local! {
    static CAROUSEL_VIEW: RefCell<Option<Rc<CarouselView>>> = RefCell::new(None);
}

pub(crate) fn run() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let Some(container) = document
        .get_element_by_id(CONTAINER_ID)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        console::warn!(format!("carousel container #{CONTAINER_ID} not found"));
        return;
    };
    match CarouselView::mount(window, document, container) {
        Ok(view) => {
            CAROUSEL_VIEW.with(|slot| {
                *slot.borrow_mut() = Some(view);
            });
        }
        Err(err) => console::warn!("carousel mount failed", err),
    }
}

struct CarouselView {
    window: Window,
    document: Document,
    container: HtmlElement,
    carousel: RefCell<Carousel>,
    renderer: CarouselRenderer,
    registry: ContentRegistry,
    overlay: RefCell<Option<Rc<OverlayController>>>,
    resize: RefCell<Debouncer>,
    clock_origin: Cell<Option<f64>>,
    frame: RefCell<Option<AnimationFrame>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl CarouselView {
    fn mount(
        window: Window,
        document: Document,
        container: HtmlElement,
    ) -> Result<Rc<Self>, JsValue> {
        let settings = settings::load(&window, &container);
        dom::set_styles(
            &container,
            &[("position", "relative"), ("width", "100%"), ("height", "100vh")],
        )?;
        let (width, height) = container_size(&container);
        let cards = catalog_cards();
        let renderer = CarouselRenderer::new(
            &document,
            &container,
            &cards,
            &settings.tuning,
            &settings.page_title,
        )?;
        let quiet_ms = f64::from(settings.tuning.resize_quiet_ms);
        let carousel = Carousel::new(cards, settings.tuning, width, height)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        if settings.debug {
            console::log!(format!(
                "carousel mounted: {} cards, {width}x{height}",
                carousel.cards().len()
            ));
        }

        let view = Rc::new(Self {
            window,
            document,
            container,
            carousel: RefCell::new(carousel),
            renderer,
            registry: ContentRegistry::from_catalog(),
            overlay: RefCell::new(None),
            resize: RefCell::new(Debouncer::new(quiet_ms)),
            clock_origin: Cell::new(None),
            frame: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });
        view.install_listeners();
        view.schedule_frame();
        Ok(view)
    }

    fn install_listeners(self: &Rc<Self>) {
        let mut listeners = Vec::new();
        let passive = EventListenerOptions {
            phase: EventListenerPhase::Bubble,
            passive: true,
        };

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.container, "wheel", move |event: &Event| {
            let Some(event) = event.dyn_ref::<WheelEvent>() else {
                return;
            };
            view.carousel.borrow_mut().wheel(event.delta_y());
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.window, "keydown", move |event: &Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if view.overlay_open() {
                return;
            }
            if let Some(key) = ArrowKey::from_key(&event.key()) {
                view.carousel.borrow_mut().arrow(key);
            }
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.container, "mousedown", move |event: &Event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            view.carousel.borrow_mut().press(event.client_x() as f32);
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.window, "mousemove", move |event: &Event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            view.drag_to(event.client_x() as f32);
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.window, "mouseup", move |_event: &Event| {
            view.release();
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new_with_options(
            &self.container,
            "touchstart",
            passive,
            move |event: &Event| {
                let Some((x, _)) = first_touch(event) else {
                    return;
                };
                view.carousel.borrow_mut().press(x);
            },
        ));

        let view = Rc::clone(self);
        listeners.push(EventListener::new_with_options(
            &self.container,
            "touchmove",
            passive,
            move |event: &Event| {
                let Some((x, _)) = first_touch(event) else {
                    return;
                };
                view.drag_to(x);
            },
        ));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.container, "touchend", move |_event: &Event| {
            view.release();
        }));

        let surface = self.renderer.surface().clone();
        let view = Rc::clone(self);
        listeners.push(EventListener::new(&surface, "mousemove", move |event: &Event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            view.hover(event.client_x() as f32, event.client_y() as f32);
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new_with_options(
            &surface,
            "touchstart",
            passive,
            move |event: &Event| {
                let Some((x, y)) = first_touch(event) else {
                    return;
                };
                view.hover(x, y);
            },
        ));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&surface, "click", move |event: &Event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            view.click(event.client_x() as f32, event.client_y() as f32);
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.window, "resize", move |_event: &Event| {
            view.resize.borrow_mut().poke(now_ms(&view.window));
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.window, "pageshow", move |event: &Event| {
            if page_persisted(event) {
                view.resize.borrow_mut().poke(now_ms(&view.window));
            }
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.window, "pagehide", move |event: &Event| {
            // A cached page keeps its DOM and listeners for back navigation.
            if page_persisted(event) {
                return;
            }
            let view = Rc::clone(&view);
            // Listeners cannot be dropped from inside their own callback.
            spawn_local(async move {
                view.teardown();
            });
        }));

        *self.listeners.borrow_mut() = listeners;
    }

    fn schedule_frame(self: &Rc<Self>) {
        let view = Rc::clone(self);
        let handle = request_animation_frame(move |timestamp| {
            view.on_frame(timestamp);
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn on_frame(self: &Rc<Self>, timestamp: f64) {
        self.frame.borrow_mut().take();
        let origin = match self.clock_origin.get() {
            Some(origin) => origin,
            None => {
                self.clock_origin.set(Some(timestamp));
                timestamp
            }
        };
        let elapsed_secs = ((timestamp - origin) / 1000.0) as f32;
        if self.resize.borrow_mut().poll(timestamp) {
            let (width, height) = container_size(&self.container);
            self.carousel.borrow_mut().resize(width, height);
        }
        {
            let mut carousel = self.carousel.borrow_mut();
            let frame = carousel.tick(elapsed_secs);
            self.renderer.render_frame(&frame);
        }
        self.schedule_frame();
    }

    fn drag_to(&self, x: f32) {
        let width = self.container.client_width() as f32;
        self.carousel.borrow_mut().drag_to(x, width);
    }

    fn release(&self) {
        let suppress = self.carousel.borrow_mut().release();
        if suppress && settings::debug() {
            console::log!("carousel drag ended; next click suppressed");
        }
    }

    fn surface_point(&self, client_x: f32, client_y: f32) -> (f32, f32) {
        let rect = self.renderer.surface().get_bounding_client_rect();
        (client_x - rect.left() as f32, client_y - rect.top() as f32)
    }

    fn hover(&self, client_x: f32, client_y: f32) {
        let (x, y) = self.surface_point(client_x, client_y);
        let active = self.carousel.borrow_mut().hover_at(x, y).is_some();
        self.renderer.set_pointer(active);
    }

    fn click(&self, client_x: f32, client_y: f32) {
        let (x, y) = self.surface_point(client_x, client_y);
        let (outcome, active) = {
            let mut carousel = self.carousel.borrow_mut();
            let outcome = carousel.click_at(x, y);
            (outcome, carousel.hovered_card().is_some())
        };
        match outcome {
            ClickOutcome::Suppressed => {
                if settings::debug() {
                    console::log!("carousel click suppressed");
                }
            }
            ClickOutcome::Ignored => self.renderer.set_pointer(active),
            ClickOutcome::Open(index) => {
                self.renderer.set_pointer(active);
                self.open_overlay(index);
            }
        }
    }

    fn open_overlay(&self, index: usize) {
        let Some(card) = self.carousel.borrow().card(index).cloned() else {
            return;
        };
        let page_content = registry::page_content(&self.window, index);
        let content = page_content.as_ref().or_else(|| self.registry.get(index));
        let blocks = resolve_content(&card, content);
        let result = self
            .overlay()
            .and_then(|overlay| overlay.open(&card, &blocks));
        if let Err(err) = result {
            console::warn!("overlay open failed", err);
        }
    }

    fn overlay(&self) -> Result<Rc<OverlayController>, JsValue> {
        if let Some(overlay) = self.overlay.borrow().as_ref() {
            return Ok(Rc::clone(overlay));
        }
        let overlay = OverlayController::new(&self.document, &self.container)?;
        *self.overlay.borrow_mut() = Some(Rc::clone(&overlay));
        Ok(overlay)
    }

    fn overlay_open(&self) -> bool {
        self.overlay
            .borrow()
            .as_ref()
            .is_some_and(|overlay| overlay.is_open())
    }

    fn teardown(&self) {
        self.listeners.borrow_mut().clear();
        self.frame.borrow_mut().take();
        self.resize.borrow_mut().cancel();
        if let Some(overlay) = self.overlay.borrow_mut().take() {
            overlay.teardown();
        }
        self.renderer.teardown();
        CAROUSEL_VIEW.with(|slot| {
            slot.borrow_mut().take();
        });
        if settings::debug() {
            console::log!("carousel torn down");
        }
    }
}

fn container_size(container: &HtmlElement) -> (f32, f32) {
    (container.client_width() as f32, container.client_height() as f32)
}

/// Same timebase as the animation frame timestamp.
fn now_ms(window: &Window) -> f64 {
    window.performance().map_or(0.0, |performance| performance.now())
}

/// True for page transitions into or out of the back/forward cache.
fn page_persisted(event: &Event) -> bool {
    event
        .dyn_ref::<PageTransitionEvent>()
        .is_some_and(PageTransitionEvent::persisted)
}

fn first_touch(event: &Event) -> Option<(f32, f32)> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some((touch.client_x() as f32, touch.client_y() as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use js_sys::Promise;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::PageTransitionEventInit;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn transition(kind: &str, persisted: bool) -> Event {
        let init = PageTransitionEventInit::new();
        init.set_persisted(persisted);
        PageTransitionEvent::new_with_event_init_dict(kind, &init)
            .unwrap()
            .into()
    }

    #[wasm_bindgen_test]
    fn cached_page_hide_is_recognized() {
        assert!(page_persisted(&transition("pagehide", true)));
        assert!(page_persisted(&transition("pageshow", true)));
        assert!(!page_persisted(&transition("pagehide", false)));
        assert!(!page_persisted(&Event::new("pagehide").unwrap()));
    }

    #[wasm_bindgen_test]
    fn resize_clock_shares_the_frame_timebase() {
        let window = web_sys::window().unwrap();
        let mut debounce = Debouncer::new(150.0);
        let poked = now_ms(&window);
        debounce.poke(poked);
        assert!(poked < js_sys::Date::now());
        assert!(!debounce.poll(window.performance().unwrap().now()));
        assert!(debounce.poll(poked + 150.0));
    }

    async fn next_task(window: &Window) {
        let promise = Promise::new(&mut |resolve, _reject| {
            let _ = window.set_timeout_with_callback(&resolve);
        });
        let _ = JsFuture::from(promise).await;
    }

    fn mount_test_view() -> (Window, HtmlElement, Rc<CarouselView>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        let container = dom::create_div(&document, "").unwrap();
        dom::body(&document).unwrap().append_child(&container).unwrap();
        let view = CarouselView::mount(window.clone(), document, container.clone()).unwrap();
        (window, container, view)
    }

    #[wasm_bindgen_test]
    async fn cached_page_hide_keeps_the_stage() {
        let (window, container, view) = mount_test_view();
        window
            .dispatch_event(&transition("pagehide", true))
            .unwrap();
        next_task(&window).await;
        assert!(container.query_selector(".systems-stage").unwrap().is_some());
        assert!(!view.listeners.borrow().is_empty());
        assert!(view.frame.borrow().is_some());

        window
            .dispatch_event(&transition("pagehide", false))
            .unwrap();
        next_task(&window).await;
        assert!(container.query_selector(".systems-stage").unwrap().is_none());
        assert!(view.listeners.borrow().is_empty());
        container.remove();
    }
}
