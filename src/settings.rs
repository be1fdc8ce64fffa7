use crate::CONFY_APP_NAME;

use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// Directory or URL prefix holding `{name}.png` / `{name}.json`.
    pub asset_base: Option<String>,
}

impl LoaderSettings {
    pub fn load() -> Self {
        load_or_default("loader")
    }

    pub fn save(&self) {
        store("loader", self);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    pub scale: f32,
    pub smoothing: bool,
    pub background: [u8; 4],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            smoothing: false,
            background: [0, 0, 0, 0],
        }
    }
}

impl RenderSettings {
    pub fn load() -> Self {
        load_or_default("render")
    }

    pub fn save(&self) {
        store("render", self);
    }
}

fn load_or_default<T>(config: &str) -> T
where
    T: Serialize + for<'de> Deserialize<'de> + Default,
{
    confy::load(CONFY_APP_NAME, config).unwrap_or_else(|e| {
        warn!("Could not read {} settings, using defaults: {}", config, e);
        T::default()
    })
}

fn store<T: Serialize>(config: &str, value: &T) {
    if let Err(e) = confy::store(CONFY_APP_NAME, config, value) {
        warn!("Could not save {} settings: {}", config, e);
    }
}

// Aggregate struct for convenience
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub loader: LoaderSettings,
    pub render: RenderSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            loader: LoaderSettings::load(),
            render: RenderSettings::load(),
        }
    }

    pub fn save(&self) {
        self.loader.save();
        self.render.save();
    }
}
