#[derive(Clone, Copy, Debug)]
pub struct CatalogCard {
    pub label: &'static str,
    pub image: &'static str,
    pub link: &'static str,
    pub content: Option<&'static str>,
}

include!(concat!(env!("OUT_DIR"), "/systems_catalog.rs"));

/// One carousel entry. `index` is stable for the lifetime of the carousel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub index: usize,
    pub label: String,
    pub image: String,
    pub link: String,
}

impl Card {
    pub fn new(index: usize, label: &str, image: &str, link: &str) -> Self {
        Self {
            index,
            label: label.to_string(),
            image: image.to_string(),
            link: link.to_string(),
        }
    }
}

pub fn catalog_cards() -> Vec<Card> {
    SYSTEM_CATALOG
        .iter()
        .enumerate()
        .map(|(index, entry)| Card::new(index, entry.label, entry.image, entry.link))
        .collect()
}
