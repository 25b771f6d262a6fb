use std::cell::Cell;

use gloo::console;
use systems_carousel_core::{CarouselTuning, PAGE_TITLE};
use web_sys::{Element, UrlSearchParams, Window};

pub(crate) const CONTAINER_ID: &str = "systems-carousel";
const TUNING_ATTR: &str = "data-carousel-tuning";
const PAGE_TITLE_ATTR: &str = "data-page-title";
const DEBUG_PARAM: &str = "carousel-debug";

thread_local! {
    static DEBUG: Cell<bool> = Cell::new(false);
}

#[derive(Clone, Debug)]
pub(crate) struct CarouselSettings {
    pub(crate) tuning: CarouselTuning,
    pub(crate) page_title: String,
    pub(crate) debug: bool,
}

pub(crate) fn load(window: &Window, container: &Element) -> CarouselSettings {
    let settings = CarouselSettings {
        tuning: tuning_from_attribute(container.get_attribute(TUNING_ATTR).as_deref()),
        page_title: container
            .get_attribute(PAGE_TITLE_ATTR)
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| PAGE_TITLE.to_string()),
        debug: debug_requested(window),
    };
    DEBUG.with(|flag| flag.set(settings.debug));
    settings
}

pub(crate) fn debug() -> bool {
    DEBUG.with(|flag| flag.get())
}

fn tuning_from_attribute(raw: Option<&str>) -> CarouselTuning {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return CarouselTuning::default();
    };
    match CarouselTuning::from_json(raw) {
        Ok(tuning) => tuning,
        Err(err) => {
            console::warn!(format!("carousel tuning ignored: {err}"));
            CarouselTuning::default()
        }
    }
}

fn debug_requested(window: &Window) -> bool {
    let Ok(search) = window.location().search() else {
        return false;
    };
    let Ok(params) = UrlSearchParams::new_with_str(&search) else {
        return false;
    };
    params.has(DEBUG_PARAM)
}
