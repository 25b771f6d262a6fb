use gloo::console;
use js_sys::{Reflect, JSON};
use systems_carousel_core::OverlayContent;
use wasm_bindgen::JsValue;
use web_sys::Window;

const PAGE_REGISTRY_KEY: &str = "carouselInfo";

/// Reads `window.carouselInfo[index]`. Falsy entries count as absent;
/// entries of the wrong shape are reported and skipped.
pub(crate) fn page_content(window: &Window, index: usize) -> Option<OverlayContent> {
    let info = Reflect::get(window, &JsValue::from_str(PAGE_REGISTRY_KEY)).ok()?;
    if !info.is_object() {
        return None;
    }
    let entry = Reflect::get_u32(&info, u32::try_from(index).ok()?).ok()?;
    if !entry.is_truthy() {
        return None;
    }
    if let Some(markup) = entry.as_string() {
        return Some(OverlayContent::Markup(markup));
    }
    let parsed = JSON::stringify(&entry)
        .ok()
        .and_then(|json| json.as_string())
        .and_then(|json| serde_json::from_str::<OverlayContent>(&json).ok());
    if parsed.is_none() {
        console::warn!(format!("carouselInfo[{index}] has an unsupported shape"));
    }
    parsed
}
