//! Error taxonomy for scene setup, assets and dialogue scripts

use thiserror::Error;

/// Result type alias for hub operations
pub type Result<T> = std::result::Result<T, HubError>;

/// Errors surfaced outside the per-tick loop
#[derive(Error, Debug)]
pub enum HubError {
    #[error("Unknown scene: {0}")]
    UnknownScene(String),

    #[error("Failed to load asset {key}: {reason}")]
    AssetLoad { key: String, reason: String },

    #[error("Asset not preloaded: {0}")]
    AssetMissing(String),

    #[error("Invalid dialogue script: {0}")]
    InvalidScript(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Render error: {0}")]
    Render(String),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for HubError {
    fn from(err: wasm_bindgen::JsValue) -> Self {
        HubError::Dom(format!("{:?}", err))
    }
}
