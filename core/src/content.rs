//! Per-card overlay content: what may be registered, and how a registration
//! turns into the blocks the overlay mounts.

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::{Card, SYSTEM_CATALOG};

pub const PLACEHOLDER_TEXT: &str = "Add videos, galleries, and detailed copy for this system here. \
You can override this content by defining window.carouselInfo[index] as custom HTML.";

/// A registration for one card.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OverlayContent {
    /// Rich markup rendered as the body.
    Markup(String),
    Structured(StructuredContent),
}

/// A field of the wrong type reads as absent; the rest of the entry still
/// renders.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StructuredContent {
    /// Raw media markup; wins over `media` when both are set.
    #[serde(deserialize_with = "lenient")]
    pub media_html: Option<String>,
    /// Image references shown one per row.
    #[serde(deserialize_with = "lenient")]
    pub media: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    pub html: Option<String>,
    /// Used when `html` is missing or blank.
    #[serde(deserialize_with = "lenient")]
    pub body: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

/// What the overlay actually mounts, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentBlock {
    MediaMarkup(String),
    Images(Vec<String>),
    RichText(String),
    Preview { image: String, alt: String },
    Placeholder(String),
}

impl ContentBlock {
    /// True for blocks whose markup may carry scripts that must run.
    pub fn is_markup(&self) -> bool {
        matches!(self, ContentBlock::MediaMarkup(_) | ContentBlock::RichText(_))
    }

    pub fn is_media(&self) -> bool {
        matches!(
            self,
            ContentBlock::MediaMarkup(_) | ContentBlock::Images(_) | ContentBlock::Preview { .. }
        )
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

/// Resolves the blocks for `card`. Anything that would render nothing falls
/// back to the default preview and placeholder text.
pub fn resolve_content(card: &Card, content: Option<&OverlayContent>) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    match content {
        Some(OverlayContent::Markup(markup)) => {
            if !markup.trim().is_empty() {
                blocks.push(ContentBlock::RichText(markup.clone()));
            }
        }
        Some(OverlayContent::Structured(structured)) => {
            if let Some(media_html) = non_blank(&structured.media_html) {
                blocks.push(ContentBlock::MediaMarkup(media_html.to_string()));
            } else if let Some(media) = structured.media.as_ref() {
                let images: Vec<String> = media
                    .iter()
                    .filter(|src| !src.trim().is_empty())
                    .cloned()
                    .collect();
                if !images.is_empty() {
                    blocks.push(ContentBlock::Images(images));
                }
            }
            if let Some(html) = non_blank(&structured.html).or(non_blank(&structured.body)) {
                blocks.push(ContentBlock::RichText(html.to_string()));
            }
        }
        None => {}
    }
    if blocks.is_empty() {
        blocks.push(ContentBlock::Preview {
            image: card.image.clone(),
            alt: if card.label.is_empty() {
                "preview".to_string()
            } else {
                card.label.clone()
            },
        });
        blocks.push(ContentBlock::Placeholder(PLACEHOLDER_TEXT.to_string()));
    }
    blocks
}

/// Content registrations keyed by card index.
#[derive(Clone, Debug, Default)]
pub struct ContentRegistry {
    entries: HashMap<usize, OverlayContent>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry holding the markup bundled with the catalog.
    pub fn from_catalog() -> Self {
        let mut registry = Self::new();
        for (index, entry) in SYSTEM_CATALOG.iter().enumerate() {
            if let Some(markup) = entry.content {
                registry.register(
                    index,
                    OverlayContent::Structured(StructuredContent {
                        html: Some(markup.to_string()),
                        ..StructuredContent::default()
                    }),
                );
            }
        }
        registry
    }

    /// Registers or replaces the content for `index`.
    pub fn register(&mut self, index: usize, content: OverlayContent) {
        self.entries.insert(index, content);
    }

    pub fn remove(&mut self, index: usize) -> Option<OverlayContent> {
        self.entries.remove(&index)
    }

    pub fn get(&self, index: usize) -> Option<&OverlayContent> {
        self.entries.get(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolve(&self, card: &Card) -> Vec<ContentBlock> {
        resolve_content(card, self.get(card.index))
    }
}

/// Import map injected for module scripts inside overlay content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImportMap {
    pub imports: BTreeMap<String, String>,
}

const THREE_CDN: &str = "https://cdn.jsdelivr.net/npm/three@0.136.0";

impl Default for ImportMap {
    fn default() -> Self {
        let examples = [
            "controls/OrbitControls",
            "loaders/FBXLoader",
            "environments/RoomEnvironment",
            "postprocessing/EffectComposer",
            "postprocessing/RenderPass",
            "postprocessing/ShaderPass",
        ];
        let mut imports = BTreeMap::new();
        imports.insert(
            "three".to_string(),
            format!("{THREE_CDN}/build/three.module.js"),
        );
        for path in examples {
            imports.insert(
                format!("three/examples/jsm/{path}"),
                format!("{THREE_CDN}/examples/jsm/{path}.js"),
            );
        }
        Self { imports }
    }
}

impl ImportMap {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{\"imports\":{}}".to_string())
    }
}
