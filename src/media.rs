use js_sys::{Array, Function, Promise, Reflect, WeakMap};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, HtmlMediaElement};

const BACKGROUND_VIDEOS: &str = "video[data-background-media]";
const BACKGROUND_VIMEOS: &str = r#"iframe[src*="player.vimeo.com/video/"][src*="background=1"]"#;

thread_local! {
    static VIMEO_PLAYERS: WeakMap = WeakMap::new();
}

/// Page media paused while the overlay is up.
#[derive(Default)]
pub(crate) struct BackgroundMedia {
    videos: Vec<HtmlMediaElement>,
    vimeos: Vec<JsValue>,
}

impl BackgroundMedia {
    pub(crate) fn pause(&mut self, document: &Document) {
        self.videos = select(document, BACKGROUND_VIDEOS)
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlMediaElement>().ok())
            .filter(|video| !video.paused())
            .collect();
        for video in &self.videos {
            let _ = video.pause();
        }
        self.vimeos = select(document, BACKGROUND_VIMEOS)
            .into_iter()
            .filter_map(|iframe| vimeo_player(&iframe))
            .collect();
        for player in &self.vimeos {
            call_ignoring_rejection(player, "pause");
        }
    }

    pub(crate) fn resume(&mut self) {
        for video in self.videos.drain(..) {
            if let Ok(promise) = video.play() {
                ignore_rejection(promise);
            }
        }
        for player in self.vimeos.drain(..) {
            call_ignoring_rejection(&player, "play");
        }
    }
}

fn select(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// One `Vimeo.Player` per iframe, created on first use. `None` when the
/// player API is not on the page.
fn vimeo_player(iframe: &Element) -> Option<JsValue> {
    let cached = VIMEO_PLAYERS.with(|players| players.get(iframe));
    if !cached.is_undefined() {
        return Some(cached);
    }
    let window = web_sys::window()?;
    let vimeo = Reflect::get(&window, &JsValue::from_str("Vimeo")).ok()?;
    if !vimeo.is_object() {
        return None;
    }
    let ctor = Reflect::get(&vimeo, &JsValue::from_str("Player"))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    let player = Reflect::construct(&ctor, &Array::of1(iframe)).ok()?;
    VIMEO_PLAYERS.with(|players| {
        players.set(iframe, &player);
    });
    Some(player)
}

fn call_ignoring_rejection(target: &JsValue, method: &str) {
    let Ok(func) = Reflect::get(target, &JsValue::from_str(method)) else {
        return;
    };
    let Ok(func) = func.dyn_into::<Function>() else {
        return;
    };
    let Ok(result) = func.call0(target) else {
        return;
    };
    if let Ok(promise) = result.dyn_into::<Promise>() {
        ignore_rejection(promise);
    }
}

fn ignore_rejection(promise: Promise) {
    spawn_local(async move {
        let _ = JsFuture::from(promise).await;
    });
}
