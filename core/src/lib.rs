pub mod camera;
pub mod carousel;
pub mod catalog;
pub mod content;
pub mod debounce;
pub mod input;
pub mod layout;
pub mod motion;
pub mod overlay;
pub mod pick;
pub mod tuning;

pub use camera::{responsive_fov, CameraRig, Ray};
pub use carousel::{Carousel, CarouselError, ClickOutcome, Frame};
pub use catalog::{catalog_cards, Card, CatalogCard, PAGE_TITLE, SYSTEM_CATALOG};
pub use content::{
    resolve_content, ContentBlock, ContentRegistry, ImportMap, OverlayContent,
    StructuredContent, PLACEHOLDER_TEXT,
};
pub use debounce::Debouncer;
pub use input::{ArrowKey, InputController};
pub use layout::{layout_cards, CardTransform, LabelTracker, ShadowPose};
pub use motion::{bob_offset, nearest_card, InteractionState};
pub use overlay::OverlayState;
pub use pick::{is_actionable, pick_card};
pub use tuning::{CarouselTuning, TuningError, TuningOverrides};
