use std::fmt::Write;

use glam::Mat4;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Window};

pub(crate) fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("window unavailable"))
}

pub(crate) fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("document unavailable"))
}

pub(crate) fn body(document: &Document) -> Result<HtmlElement, JsValue> {
    document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))
}

pub(crate) fn create_html(document: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    document.create_element(tag)?.dyn_into::<HtmlElement>().map_err(JsValue::from)
}

pub(crate) fn create_div(document: &Document, class: &str) -> Result<HtmlElement, JsValue> {
    let div = create_html(document, "div")?;
    if !class.is_empty() {
        div.set_class_name(class);
    }
    Ok(div)
}

pub(crate) fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), JsValue> {
    let style = element.style();
    for (name, value) in styles {
        style.set_property(name, value)?;
    }
    Ok(())
}

pub(crate) fn set_style(element: &HtmlElement, name: &str, value: &str) {
    let _ = element.style().set_property(name, value);
}

pub(crate) fn style_value(element: &HtmlElement, name: &str) -> String {
    element.style().get_property_value(name).unwrap_or_default()
}

pub(crate) fn clear_children(element: &Element) {
    while let Some(child) = element.first_child() {
        let _ = element.remove_child(&child);
    }
}

/// CSS `matrix3d(...)`. Both glam and CSS read the sixteen values
/// column-major.
pub(crate) fn matrix3d(matrix: &Mat4) -> String {
    let mut out = String::with_capacity(200);
    out.push_str("matrix3d(");
    for (i, value) in matrix.to_cols_array().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{value}");
    }
    out.push(')');
    out
}
