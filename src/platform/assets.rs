//! Asset manifest and cache
//!
//! Everything the game needs is listed up front and loaded by the loader scene
//! before any other scene runs. Images and audio are handed to the browser by
//! URL (decoding them is not our job); JSON assets are parsed and kept.
//!
//! Loading is started with [`AssetCache::start_preload`] and observed with
//! [`AssetCache::poll`] once per tick. On wasm each entry is fetched in a
//! spawned future; natively JSON is read from disk under the asset root.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;

use crate::error::{HubError, Result};

/// How an asset is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Json,
    Audio,
}

/// A manifest line; the key doubles as the relative URL
#[derive(Debug, Clone, PartialEq)]
pub struct AssetEntry {
    pub key: String,
    pub kind: AssetKind,
}

impl AssetEntry {
    pub fn new(key: &str, kind: AssetKind) -> Self {
        Self {
            key: key.to_string(),
            kind,
        }
    }
}

/// A loaded asset
#[derive(Debug, Clone)]
pub enum Loaded {
    /// Image or audio, resolved to the URL the browser should use
    Url(String),
    Json(serde_json::Value),
}

pub mod keys {
    pub const BG_BIOLOGY: [&str; 3] = [
        "assets/backgrounds/laboratorio-biologia-1.png",
        "assets/backgrounds/laboratorio-biologia-2.png",
        "assets/backgrounds/laboratorio-biologia-3.png",
    ];
    pub const PLAYER: &str = "assets/characters/julia/julia.png";
    pub const PLAYER_PORTRAIT: &str = "assets/characters/julia/julia-portrait.png";
    pub const PASTEUR: &str = "assets/characters/pasteur/pasteur-idle.png";
    pub const PASTEUR_PORTRAIT: &str = "assets/characters/pasteur/pasteur-portrait.png";
    pub const MICROSCOPE: &str = "assets/objects/microscopio.png";
    pub const INDICATOR: &str = "assets/ui/balao-exclamacao.png";
    pub const BIOLOGY_INTRO: &str = "assets/dialogues/biologia_intro.json";
    pub const TRIAL_INTRO: &str = "assets/dialogues/teste_intro.json";
    pub const LANDER: &str = "assets/characters/nave/nave.png";
    pub const PAD: &str = "assets/characters/nave/base.png";
    pub const MUSIC: &str = "assets/audio/tema.mp3";
}

/// Every asset the game preloads
pub fn default_manifest() -> Vec<AssetEntry> {
    use AssetKind::*;
    let mut manifest: Vec<_> = keys::BG_BIOLOGY
        .iter()
        .map(|k| AssetEntry::new(k, Image))
        .collect();
    manifest.extend([
        AssetEntry::new(keys::PLAYER, Image),
        AssetEntry::new(keys::PLAYER_PORTRAIT, Image),
        AssetEntry::new(keys::PASTEUR, Image),
        AssetEntry::new(keys::PASTEUR_PORTRAIT, Image),
        AssetEntry::new(keys::MICROSCOPE, Image),
        AssetEntry::new(keys::INDICATOR, Image),
        AssetEntry::new(keys::BIOLOGY_INTRO, Json),
        AssetEntry::new(keys::TRIAL_INTRO, Json),
        AssetEntry::new(keys::LANDER, Image),
        AssetEntry::new(keys::PAD, Image),
        AssetEntry::new(keys::MUSIC, Audio),
    ]);
    manifest
}

/// Preload progress as seen by the loader scene
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Idle,
    /// Fraction of the manifest loaded, 0..1
    Loading(f32),
    Done,
    Failed(String),
}

type Inbox = Rc<RefCell<Vec<(String, std::result::Result<Loaded, String>)>>>;

/// Manifest plus everything loaded so far
#[derive(Debug)]
pub struct AssetCache {
    manifest: Vec<AssetEntry>,
    loaded: HashMap<String, Loaded>,
    inbox: Inbox,
    failure: Option<String>,
    started: bool,
    /// Native only: where relative keys are read from
    root: std::path::PathBuf,
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new(default_manifest())
    }
}

impl AssetCache {
    pub fn new(manifest: Vec<AssetEntry>) -> Self {
        Self {
            manifest,
            loaded: HashMap::new(),
            inbox: Rc::new(RefCell::new(Vec::new())),
            failure: None,
            started: false,
            root: std::path::PathBuf::from("."),
        }
    }

    /// Directory native loads resolve keys against
    pub fn with_root(mut self, root: impl Into<std::path::PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn manifest(&self) -> &[AssetEntry] {
        &self.manifest
    }

    /// Put a JSON asset in the cache directly
    pub fn insert_json(&mut self, key: &str, text: &str) -> Result<()> {
        let value = serde_json::from_str(text)?;
        self.loaded.insert(key.to_string(), Loaded::Json(value));
        Ok(())
    }

    /// Put an image or audio URL in the cache directly
    pub fn insert_url(&mut self, key: &str) {
        self.loaded
            .insert(key.to_string(), Loaded::Url(key.to_string()));
    }

    pub fn is_loaded(&self, key: &str) -> bool {
        self.loaded.contains_key(key)
    }

    /// URL of a preloaded image or audio asset
    pub fn resolve(&self, key: &str) -> Result<&str> {
        match self.loaded.get(key) {
            Some(Loaded::Url(url)) => Ok(url),
            Some(Loaded::Json(_)) => Err(HubError::AssetLoad {
                key: key.to_string(),
                reason: "JSON asset has no URL".into(),
            }),
            None => Err(HubError::AssetMissing(key.to_string())),
        }
    }

    /// Deserialize a preloaded JSON asset
    pub fn json<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        match self.loaded.get(key) {
            Some(Loaded::Json(value)) => Ok(T::deserialize(value)?),
            Some(Loaded::Url(_)) => Err(HubError::AssetLoad {
                key: key.to_string(),
                reason: "not a JSON asset".into(),
            }),
            None => Err(HubError::AssetMissing(key.to_string())),
        }
    }

    /// Fraction of the manifest loaded
    pub fn progress(&self) -> f32 {
        if self.manifest.is_empty() {
            return 1.0;
        }
        let done = self
            .manifest
            .iter()
            .filter(|e| self.loaded.contains_key(&e.key))
            .count();
        done as f32 / self.manifest.len() as f32
    }

    /// Kick off loading every manifest entry not already cached
    pub fn start_preload(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        let pending: Vec<_> = self
            .manifest
            .iter()
            .filter(|e| !self.loaded.contains_key(&e.key))
            .cloned()
            .collect();
        log::info!("Preloading {} assets", pending.len());
        self.spawn_loads(pending);
    }

    #[cfg(target_arch = "wasm32")]
    fn spawn_loads(&mut self, pending: Vec<AssetEntry>) {
        let inbox = self.inbox.clone();
        wasm_bindgen_futures::spawn_local(async move {
            for entry in pending {
                let result = web::fetch(&entry).await;
                inbox.borrow_mut().push((entry.key, result));
            }
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn spawn_loads(&mut self, pending: Vec<AssetEntry>) {
        let mut inbox = self.inbox.borrow_mut();
        for entry in pending {
            let result = match entry.kind {
                AssetKind::Json => std::fs::read_to_string(self.root.join(&entry.key))
                    .map_err(|e| e.to_string())
                    .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
                    .map(Loaded::Json),
                AssetKind::Image | AssetKind::Audio => Ok(Loaded::Url(entry.key.clone())),
            };
            inbox.push((entry.key, result));
        }
    }

    /// Move finished loads into the cache and report where we are
    pub fn poll(&mut self) -> LoadStatus {
        let finished: Vec<_> = self.inbox.borrow_mut().drain(..).collect();
        for (key, result) in finished {
            match result {
                Ok(asset) => {
                    self.loaded.insert(key, asset);
                }
                Err(reason) => {
                    let err = HubError::AssetLoad {
                        key: key.clone(),
                        reason,
                    };
                    log::error!("{}", err);
                    if self.failure.is_none() {
                        self.failure = Some(err.to_string());
                    }
                }
            }
        }

        if let Some(failure) = &self.failure {
            return LoadStatus::Failed(failure.clone());
        }
        let progress = self.progress();
        if progress >= 1.0 {
            LoadStatus::Done
        } else if self.started {
            LoadStatus::Loading(progress)
        } else {
            LoadStatus::Idle
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::Response;

    use super::{AssetEntry, AssetKind, Loaded};

    pub(super) async fn fetch(entry: &AssetEntry) -> std::result::Result<Loaded, String> {
        let window = web_sys::window().ok_or("no window")?;
        let response = JsFuture::from(window.fetch_with_str(&entry.key))
            .await
            .map_err(|e| format!("{:?}", e))?
            .dyn_into::<Response>()
            .map_err(|_| "fetch did not return a Response".to_string())?;
        if !response.ok() {
            return Err(format!("HTTP {}", response.status()));
        }
        match entry.kind {
            AssetKind::Json => {
                let text = JsFuture::from(response.text().map_err(|e| format!("{:?}", e))?)
                    .await
                    .map_err(|e| format!("{:?}", e))?
                    .as_string()
                    .ok_or("response body is not text")?;
                serde_json::from_str(&text)
                    .map(Loaded::Json)
                    .map_err(|e| e.to_string())
            }
            AssetKind::Image | AssetKind::Audio => Ok(Loaded::Url(entry.key.clone())),
        }
    }
}
