use std::cell::RefCell;
use std::rc::Rc;

use gloo::console;
use gloo::events::EventListener;
use systems_carousel_core::{Card, ContentBlock, ImportMap, OverlayState};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, HtmlAnchorElement, HtmlElement, HtmlImageElement, KeyboardEvent,
};

use crate::dom;
use crate::media::BackgroundMedia;
use crate::settings;

const OVERLAY_ID: &str = "systems-overlay";
const WIDGET_SELECTOR: &str = ".boxC";
const WIDGET_MIN_HEIGHT_PX: i32 = 40;
const WIDGET_FALLBACK_HEIGHT: &str = "180px";
const MODULE_SCRIPT_SELECTOR: &str = "script[type=module i]";

/// Modal panel showing rich content for the centered card. Built on first
/// open and reused afterwards; each open unmounts the previous blocks and
/// mounts the new ones.
pub(crate) struct OverlayController {
    document: Document,
    root: HtmlElement,
    panel: HtmlElement,
    close_button: HtmlElement,
    media: HtmlElement,
    body: HtmlElement,
    actions: HtmlElement,
    state: RefCell<OverlayState>,
    mounted: RefCell<Vec<Element>>,
    background: RefCell<BackgroundMedia>,
    previous_focus: RefCell<Option<HtmlElement>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl OverlayController {
    pub(crate) fn new(document: &Document, host: &Element) -> Result<Rc<Self>, JsValue> {
        let root = dom::create_div(document, "systems-overlay")?;
        root.set_id(OVERLAY_ID);
        root.set_attribute("role", "dialog")?;
        root.set_attribute("aria-modal", "true")?;
        dom::set_styles(
            &root,
            &[
                ("position", "absolute"),
                ("inset", "0"),
                ("display", "none"),
                ("align-items", "center"),
                ("justify-content", "center"),
                ("background", "rgba(0,0,0,0.5)"),
                ("z-index", "1"),
                ("pointer-events", "auto"),
            ],
        )?;

        let panel = dom::create_div(document, "systems-overlay-panel")?;
        dom::set_styles(
            &panel,
            &[
                ("width", "85%"),
                ("max-height", "600px"),
                ("overflow-y", "auto"),
                ("background", "rgba(0,0,0,0.4)"),
                ("border", "1px solid rgba(255,255,255,0.7)"),
                ("border-radius", "1px"),
                ("backdrop-filter", "blur(6px)"),
                ("color", "#eaeaea"),
                ("padding", "24px 24px 16px 24px"),
                ("position", "relative"),
            ],
        )?;

        let close_button = dom::create_html(document, "button")?;
        close_button.set_attribute("type", "button")?;
        close_button.set_attribute("aria-label", "Close")?;
        close_button.set_text_content(Some("\u{00d7}"));
        dom::set_styles(
            &close_button,
            &[
                ("position", "absolute"),
                ("top", "8px"),
                ("right", "12px"),
                ("font-size", "28px"),
                ("line-height", "28px"),
                ("background", "transparent"),
                ("border", "none"),
                ("color", "#ddd"),
                ("cursor", "pointer"),
            ],
        )?;

        let media = dom::create_div(document, "systems-overlay-media")?;
        dom::set_styles(
            &media,
            &[
                ("display", "grid"),
                ("grid-template-columns", "1fr"),
                ("gap", "16px"),
                ("margin-bottom", "16px"),
            ],
        )?;
        let body = dom::create_div(document, "systems-overlay-body")?;
        dom::set_styles(
            &body,
            &[
                ("font-size", "16px"),
                ("line-height", "1.55"),
                ("color", "#d6d6d6"),
                ("margin-bottom", "16px"),
            ],
        )?;
        let actions = dom::create_div(document, "systems-overlay-actions")?;
        dom::set_styles(
            &actions,
            &[("display", "flex"), ("gap", "12px"), ("margin-top", "8px")],
        )?;

        panel.append_child(&close_button)?;
        panel.append_child(&media)?;
        panel.append_child(&body)?;
        panel.append_child(&actions)?;
        root.append_child(&panel)?;
        host.append_child(&root)?;

        let overlay = Rc::new(Self {
            document: document.clone(),
            root,
            panel,
            close_button,
            media,
            body,
            actions,
            state: RefCell::new(OverlayState::new()),
            mounted: RefCell::new(Vec::new()),
            background: RefCell::new(BackgroundMedia::default()),
            previous_focus: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });
        overlay.install_listeners()?;
        Ok(overlay)
    }

    fn install_listeners(self: &Rc<Self>) -> Result<(), JsValue> {
        let mut listeners = Vec::new();

        let overlay = Rc::clone(self);
        listeners.push(EventListener::new(&self.root, "click", move |event: &Event| {
            let on_backdrop =
                event.target().map(JsValue::from) == Some(JsValue::from(overlay.root.clone()));
            if on_backdrop {
                overlay.close();
            }
        }));

        let overlay = Rc::clone(self);
        listeners.push(EventListener::new(
            &self.close_button,
            "click",
            move |_event: &Event| {
                overlay.close();
            },
        ));

        let window = dom::window()?;
        let overlay = Rc::clone(self);
        listeners.push(EventListener::new(&window, "keydown", move |event: &Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if event.key() == "Escape" && overlay.is_open() {
                overlay.close();
            }
        }));

        *self.listeners.borrow_mut() = listeners;
        Ok(())
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state.borrow().is_open()
    }

    /// Shows `blocks` for `card`, replacing whatever was mounted before.
    pub(crate) fn open(&self, card: &Card, blocks: &[ContentBlock]) -> Result<(), JsValue> {
        self.unmount();
        self.mount_or_rollback(|| self.mount_all(card, blocks))?;

        let was_open = self.is_open();
        let page = dom::body(&self.document)?;
        self.state
            .borrow_mut()
            .open(card.index, &dom::style_value(&page, "overflow"));
        dom::set_style(&page, "overflow", "hidden");
        dom::set_style(&self.root, "display", "flex");

        size_widgets(&self.panel)?;
        let mounted = self.mounted.borrow().clone();
        for (block, node) in blocks.iter().zip(mounted.iter()) {
            if block.is_markup() {
                activate_scripts(&self.document, node)?;
            }
        }

        if !was_open {
            self.background.borrow_mut().pause(&self.document);
            *self.previous_focus.borrow_mut() = self
                .document
                .active_element()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        }
        let _ = self.close_button.focus();
        if settings::debug() {
            console::log!(format!("overlay open: {}", card.label));
        }
        Ok(())
    }

    pub(crate) fn close(&self) {
        let Some(overflow) = self.state.borrow_mut().close() else {
            return;
        };
        dom::set_style(&self.root, "display", "none");
        if let Ok(page) = dom::body(&self.document) {
            if overflow.is_empty() {
                let _ = page.style().remove_property("overflow");
            } else {
                dom::set_style(&page, "overflow", &overflow);
            }
        }
        self.background.borrow_mut().resume();
        if let Some(previous) = self.previous_focus.borrow_mut().take() {
            let _ = previous.focus();
        }
        if settings::debug() {
            console::log!("overlay closed");
        }
    }

    /// Detaches the overlay from the page.
    pub(crate) fn teardown(&self) {
        self.close();
        self.listeners.borrow_mut().clear();
        self.root.remove();
    }

    /// Runs `mount`; on failure nothing it mounted stays behind.
    fn mount_or_rollback(
        &self,
        mount: impl FnOnce() -> Result<(), JsValue>,
    ) -> Result<(), JsValue> {
        mount().inspect_err(|_| self.unmount())
    }

    fn mount_all(&self, card: &Card, blocks: &[ContentBlock]) -> Result<(), JsValue> {
        for block in blocks {
            let node = self.mount_block(block)?;
            self.mounted.borrow_mut().push(node);
        }
        self.mount_actions(card)?;
        if self.has_module_script()? {
            ensure_import_map(&self.document)?;
        }
        Ok(())
    }

    /// Checked on the parsed nodes, before any script is re-created.
    fn has_module_script(&self) -> Result<bool, JsValue> {
        for node in self.mounted.borrow().iter() {
            if node.query_selector(MODULE_SCRIPT_SELECTOR)?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn unmount(&self) {
        for node in self.mounted.borrow_mut().drain(..) {
            node.remove();
        }
        dom::clear_children(&self.actions);
    }

    /// Mounts one block and returns its root node. Image lists mount a
    /// wrapper so each block owns exactly one node.
    fn mount_block(&self, block: &ContentBlock) -> Result<Element, JsValue> {
        let document = &self.document;
        let (node, parent): (HtmlElement, &HtmlElement) = match block {
            ContentBlock::MediaMarkup(markup) => {
                let node = dom::create_div(document, "overlay-media-markup")?;
                node.set_inner_html(markup);
                (node, &self.media)
            }
            ContentBlock::Images(sources) => {
                let node = dom::create_div(document, "overlay-images")?;
                dom::set_styles(&node, &[("display", "grid"), ("gap", "16px")])?;
                for src in sources {
                    let img = HtmlImageElement::new()?;
                    img.set_src(src);
                    dom::set_styles(&img, &[("width", "100%"), ("border-radius", "10px")])?;
                    node.append_child(&img)?;
                }
                (node, &self.media)
            }
            ContentBlock::RichText(markup) => {
                let node = dom::create_div(document, "overlay-rich-text")?;
                node.set_inner_html(markup);
                (node, &self.body)
            }
            ContentBlock::Preview { image, alt } => {
                let img = HtmlImageElement::new()?;
                img.set_class_name("overlay-preview");
                img.set_src(image);
                img.set_alt(alt);
                dom::set_styles(
                    &img,
                    &[
                        ("width", "30%"),
                        ("height", "auto"),
                        ("border-radius", "10px"),
                        ("border", "1px solid rgba(255,255,255,0.06)"),
                    ],
                )?;
                (img.into(), &self.media)
            }
            ContentBlock::Placeholder(text) => {
                let node = dom::create_html(document, "p")?;
                node.set_class_name("overlay-placeholder");
                node.set_text_content(Some(text));
                (node, &self.body)
            }
        };
        parent.append_child(&node)?;
        Ok(node.into())
    }

    fn mount_actions(&self, card: &Card) -> Result<(), JsValue> {
        if card.link.is_empty() {
            return Ok(());
        }
        let link = self
            .document
            .create_element("a")?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(JsValue::from)?;
        link.set_href(&card.link);
        link.set_class_name("overlay-action");
        link.set_text_content(Some(&format!("Open {}", card.label)));
        dom::set_styles(&link, &[("color", "#eaeaea")])?;
        self.actions.append_child(&link)?;
        Ok(())
    }
}

/// Adds a three.js import map unless the page already has one.
fn ensure_import_map(document: &Document) -> Result<(), JsValue> {
    if document
        .query_selector(r#"script[type="importmap"]"#)?
        .is_some()
    {
        return Ok(());
    }
    let Some(head) = document.head() else {
        return Ok(());
    };
    let script = document.create_element("script")?;
    script.set_attribute("type", "importmap")?;
    script.set_text_content(Some(&ImportMap::default().to_json()));
    head.append_child(&script)?;
    Ok(())
}

/// Canvas widgets size themselves from their container, so collapsed ones
/// get a usable height.
fn size_widgets(scope: &Element) -> Result<(), JsValue> {
    let widgets = scope.query_selector_all(WIDGET_SELECTOR)?;
    for i in 0..widgets.length() {
        let Some(widget) = widgets
            .item(i)
            .and_then(|node| node.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };
        if widget.client_height() >= WIDGET_MIN_HEIGHT_PX {
            continue;
        }
        dom::set_style(&widget, "min-height", WIDGET_FALLBACK_HEIGHT);
        dom::set_style(&widget, "height", WIDGET_FALLBACK_HEIGHT);
        if dom::style_value(&widget, "position").is_empty() {
            dom::set_style(&widget, "position", "relative");
        }
    }
    Ok(())
}

/// Scripts inserted through `innerHTML` never run; swapping each for a
/// freshly created copy makes the browser execute it.
fn activate_scripts(document: &Document, scope: &Element) -> Result<(), JsValue> {
    let scripts = scope.query_selector_all("script")?;
    for i in 0..scripts.length() {
        let Some(old) = scripts
            .item(i)
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };
        let fresh = document.create_element("script")?;
        for name in old.get_attribute_names().iter() {
            let Some(name) = name.as_string() else {
                continue;
            };
            if let Some(value) = old.get_attribute(&name) {
                fresh.set_attribute(&name, &value)?;
            }
        }
        if let Some(text) = old.text_content().filter(|text| !text.is_empty()) {
            fresh.set_text_content(Some(&text));
        }
        if let Some(parent) = old.parent_node() {
            parent.replace_child(&fresh, &old)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use js_sys::Reflect;
    use systems_carousel_core::{resolve_content, OverlayContent, StructuredContent};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn host() -> (Document, Element) {
        let document = dom::document().unwrap();
        let host = document.create_element("div").unwrap();
        dom::body(&document).unwrap().append_child(&host).unwrap();
        (document, host)
    }

    fn card() -> Card {
        Card::new(0, "STREAM.SYSTEM", "/img/stream.jpg", "/systems/T_STREAM.html")
    }

    fn count(scope: &Element, selector: &str) -> u32 {
        scope.query_selector_all(selector).unwrap().length()
    }

    #[wasm_bindgen_test]
    fn media_only_content_has_no_placeholder() {
        let (document, host) = host();
        let overlay = OverlayController::new(&document, &host).unwrap();
        let content = OverlayContent::Structured(StructuredContent {
            media: Some(vec!["/img/a.jpg".into(), "/img/b.jpg".into()]),
            ..StructuredContent::default()
        });
        let blocks = resolve_content(&card(), Some(&content));
        overlay.open(&card(), &blocks).unwrap();
        assert_eq!(count(&host, ".overlay-images img"), 2);
        assert_eq!(count(&host, ".overlay-placeholder"), 0);
        assert_eq!(count(&host, ".overlay-preview"), 0);
        overlay.teardown();
        host.remove();
    }

    #[wasm_bindgen_test]
    fn default_content_shows_preview_and_placeholder() {
        let (document, host) = host();
        let overlay = OverlayController::new(&document, &host).unwrap();
        overlay.open(&card(), &resolve_content(&card(), None)).unwrap();
        let preview = host
            .query_selector(".overlay-preview")
            .unwrap()
            .unwrap()
            .dyn_into::<HtmlImageElement>()
            .unwrap();
        assert_eq!(preview.alt(), "STREAM.SYSTEM");
        assert_eq!(count(&host, ".overlay-placeholder"), 1);
        let action = host.query_selector(".overlay-action").unwrap().unwrap();
        assert_eq!(
            action.get_attribute("href").as_deref(),
            Some("/systems/T_STREAM.html")
        );
        overlay.teardown();
        host.remove();
    }

    #[wasm_bindgen_test]
    fn backdrop_click_restores_exact_overflow() {
        let (document, host) = host();
        let page = dom::body(&document).unwrap();
        dom::set_style(&page, "overflow", "scroll");
        let overlay = OverlayController::new(&document, &host).unwrap();
        overlay.open(&card(), &resolve_content(&card(), None)).unwrap();
        assert!(overlay.is_open());
        assert_eq!(dom::style_value(&page, "overflow"), "hidden");

        overlay.root.click();
        assert!(!overlay.is_open());
        assert_eq!(dom::style_value(&page, "overflow"), "scroll");
        assert_eq!(dom::style_value(&overlay.root, "display"), "none");

        let _ = page.style().remove_property("overflow");
        overlay.teardown();
        host.remove();
    }

    #[wasm_bindgen_test]
    fn clicks_inside_panel_keep_overlay_open() {
        let (document, host) = host();
        let overlay = OverlayController::new(&document, &host).unwrap();
        overlay.open(&card(), &resolve_content(&card(), None)).unwrap();
        overlay.panel.click();
        assert!(overlay.is_open());
        overlay.close_button.click();
        assert!(!overlay.is_open());
        overlay.teardown();
        host.remove();
    }

    #[wasm_bindgen_test]
    fn reopening_replaces_content() {
        let (document, host) = host();
        let overlay = OverlayController::new(&document, &host).unwrap();
        let first = OverlayContent::Markup("<p class=\"first\">one</p>".into());
        let second = OverlayContent::Markup("<p class=\"second\">two</p>".into());
        overlay
            .open(&card(), &resolve_content(&card(), Some(&first)))
            .unwrap();
        overlay.close();
        overlay
            .open(&card(), &resolve_content(&card(), Some(&second)))
            .unwrap();
        assert_eq!(count(&host, ".first"), 0);
        assert_eq!(count(&host, ".second"), 1);
        assert_eq!(count(&host, ".overlay-action"), 1);
        overlay.teardown();
        host.remove();
    }

    #[wasm_bindgen_test]
    fn injected_scripts_run() {
        let (document, host) = host();
        let overlay = OverlayController::new(&document, &host).unwrap();
        let content = OverlayContent::Markup(
            "<div class=\"boxC\"><script data-marker=\"yes\">window.__overlayMarker = 7;</script></div>"
                .into(),
        );
        overlay
            .open(&card(), &resolve_content(&card(), Some(&content)))
            .unwrap();
        let window = dom::window().unwrap();
        let marker = Reflect::get(&window, &JsValue::from_str("__overlayMarker")).unwrap();
        assert_eq!(marker.as_f64(), Some(7.0));
        let script = host.query_selector("script").unwrap().unwrap();
        assert_eq!(script.get_attribute("data-marker").as_deref(), Some("yes"));
        let widget = host
            .query_selector(".boxC")
            .unwrap()
            .unwrap()
            .dyn_into::<HtmlElement>()
            .unwrap();
        assert_eq!(dom::style_value(&widget, "min-height"), "180px");
        overlay.teardown();
        host.remove();
    }

    fn remove_import_maps(document: &Document) {
        let maps = document
            .query_selector_all(r#"script[type="importmap"]"#)
            .unwrap();
        for i in 0..maps.length() {
            if let Some(node) = maps.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                node.remove();
            }
        }
    }

    fn import_maps(document: &Document) -> u32 {
        document
            .query_selector_all(r#"script[type="importmap"]"#)
            .unwrap()
            .length()
    }

    #[wasm_bindgen_test]
    fn unquoted_module_script_gets_import_map() {
        let (document, host) = host();
        remove_import_maps(&document);
        let overlay = OverlayController::new(&document, &host).unwrap();

        let classic = OverlayContent::Markup("<script>window.__classicRan = 1;</script>".into());
        overlay
            .open(&card(), &resolve_content(&card(), Some(&classic)))
            .unwrap();
        assert_eq!(import_maps(&document), 0);

        let module = OverlayContent::Markup(
            "<div class=boxC><script type = module>window.__moduleRan = 1;</script></div>".into(),
        );
        overlay
            .open(&card(), &resolve_content(&card(), Some(&module)))
            .unwrap();
        assert_eq!(import_maps(&document), 1);

        overlay
            .open(&card(), &resolve_content(&card(), Some(&module)))
            .unwrap();
        assert_eq!(import_maps(&document), 1);

        overlay.teardown();
        remove_import_maps(&document);
        host.remove();
    }

    #[wasm_bindgen_test]
    fn failed_mount_leaves_nothing_behind() {
        let (document, host) = host();
        let overlay = OverlayController::new(&document, &host).unwrap();
        let blocks = resolve_content(&card(), None);
        let result = overlay.mount_or_rollback(|| {
            let node = overlay.mount_block(&blocks[0])?;
            overlay.mounted.borrow_mut().push(node);
            overlay.mount_actions(&card())?;
            Err(JsValue::from_str("mount failed"))
        });
        assert!(result.is_err());
        assert!(overlay.mounted.borrow().is_empty());
        assert_eq!(count(&host, ".overlay-preview"), 0);
        assert_eq!(count(&host, ".overlay-action"), 0);
        assert!(!overlay.is_open());
        overlay.teardown();
        host.remove();
    }
}
