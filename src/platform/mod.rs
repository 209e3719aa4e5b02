//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events and held-key state
//! - DOM widgets (real document on web, in-memory headless host elsewhere)
//! - Asset preloading (fetch on web, filesystem natively)

pub mod assets;
pub mod dom;
pub mod input;

pub use assets::{AssetCache, AssetEntry, AssetKind, LoadStatus};
#[cfg(target_arch = "wasm32")]
pub use dom::WebDom;
pub use dom::{DomHost, HeadlessDom, Owner, WidgetAction, WidgetEvent, WidgetId, WidgetKind};
pub use input::{InputEvent, InputState};
