use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info};

use crate::error::CoreError;
use crate::storage::KeyValueStore;

/// Key under which the preference record is persisted.
pub const SETTINGS_KEY: &str = "mangaReaderSettings";

pub const PRELOAD_PAGES_RANGE: (u32, u32) = (1, 5);
pub const ZOOM_RANGE: (f64, f64) = (25.0, 400.0);
pub const AUTO_PLAY_SPEED_RANGE: (f64, f64) = (1.0, 60.0);

// ---------------------------------------------------------------------------
// Enumerated options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingMode {
    #[default]
    Single,
    Double,
    Webtoon,
    ScrollVertical,
    ScrollHorizontal,
}

impl ReadingMode {
    pub const ALL: [ReadingMode; 5] = [
        ReadingMode::Single,
        ReadingMode::Double,
        ReadingMode::Webtoon,
        ReadingMode::ScrollVertical,
        ReadingMode::ScrollHorizontal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Webtoon => "webtoon",
            Self::ScrollVertical => "scroll-vertical",
            Self::ScrollHorizontal => "scroll-horizontal",
        }
    }

    /// Continuous modes navigate by scroll offset rather than page index.
    pub fn is_scroll(self) -> bool {
        matches!(
            self,
            Self::Webtoon | Self::ScrollVertical | Self::ScrollHorizontal
        )
    }
}

impl fmt::Display for ReadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReadingMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.label() == s)
            .ok_or_else(|| CoreError::UnknownMode(s.to_string()))
    }
}

/// Reading direction. Right-to-left is the manga default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipDirection {
    #[default]
    Rtl,
    Ltr,
}

impl FlipDirection {
    pub fn label(self) -> &'static str {
        match self {
            Self::Rtl => "rtl",
            Self::Ltr => "ltr",
        }
    }
}

impl FromStr for FlipDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rtl" => Ok(Self::Rtl),
            "ltr" => Ok(Self::Ltr),
            other => Err(CoreError::UnknownDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    #[default]
    Width,
    Height,
    Page,
    Original,
}

// ---------------------------------------------------------------------------
// Preference record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub reading_mode: ReadingMode,
    #[serde(default)]
    pub flip_direction: FlipDirection,
    #[serde(default)]
    pub auto_play: bool,
    /// Seconds between automatic page turns.
    #[serde(default = "default_auto_play_speed")]
    pub auto_play_speed: f64,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    /// Prefetch window radius in pages.
    #[serde(
        default = "default_preload_pages",
        deserialize_with = "deserialize_page_count"
    )]
    pub preload_pages: u32,
    #[serde(rename = "showUI", default = "default_true")]
    pub show_ui: bool,
    #[serde(default)]
    pub fullscreen: bool,
    /// Zoom percentage.
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default = "default_true")]
    pub auto_zoom: bool,
    #[serde(default)]
    pub fit_mode: FitMode,
}

fn default_true() -> bool {
    true
}
fn default_auto_play_speed() -> f64 {
    10.0
}
fn default_preload_pages() -> u32 {
    2
}
fn default_zoom() -> f64 {
    100.0
}

/// Accept any JSON number for a page count, rounding fractions. Anything else
/// takes the default so one odd field does not discard the whole record.
fn deserialize_page_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(0.0, f64::from(u32::MAX)) as u32)
        .unwrap_or_else(default_preload_pages))
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            reading_mode: ReadingMode::default(),
            flip_direction: FlipDirection::default(),
            auto_play: false,
            auto_play_speed: default_auto_play_speed(),
            sound_enabled: true,
            preload_pages: default_preload_pages(),
            show_ui: true,
            fullscreen: false,
            zoom: default_zoom(),
            auto_zoom: true,
            fit_mode: FitMode::default(),
        }
    }
}

impl Preferences {
    /// Clamp numeric options into their accepted ranges.
    pub fn clamped(mut self) -> Self {
        self.preload_pages = self
            .preload_pages
            .clamp(PRELOAD_PAGES_RANGE.0, PRELOAD_PAGES_RANGE.1);
        self.zoom = clamp_finite(self.zoom, ZOOM_RANGE, default_zoom());
        self.auto_play_speed = clamp_finite(
            self.auto_play_speed,
            AUTO_PLAY_SPEED_RANGE,
            default_auto_play_speed(),
        );
        self
    }
}

fn clamp_finite(value: f64, (lo, hi): (f64, f64), fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        fallback
    }
}

/// A partial change to [`Preferences`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferencesPatch {
    pub reading_mode: Option<ReadingMode>,
    pub flip_direction: Option<FlipDirection>,
    pub auto_play: Option<bool>,
    pub auto_play_speed: Option<f64>,
    pub sound_enabled: Option<bool>,
    pub preload_pages: Option<u32>,
    pub show_ui: Option<bool>,
    pub fullscreen: Option<bool>,
    pub zoom: Option<f64>,
    pub auto_zoom: Option<bool>,
    pub fit_mode: Option<FitMode>,
}

impl PreferencesPatch {
    pub fn apply(&self, prefs: &mut Preferences) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field { prefs.$field = v; })*
            };
        }
        merge!(
            reading_mode,
            flip_direction,
            auto_play,
            auto_play_speed,
            sound_enabled,
            preload_pages,
            show_ui,
            fullscreen,
            zoom,
            auto_zoom,
            fit_mode
        );
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Owns the user's preferences and writes them through on every change.
pub struct PreferenceStore<S> {
    backend: S,
    current: Preferences,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    /// Open the store, reading whatever is persisted.
    pub fn open(backend: S) -> Self {
        let current = Self::read(&backend);
        Self { backend, current }
    }

    pub fn get(&self) -> &Preferences {
        &self.current
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Re-read persisted preferences, falling back to defaults.
    pub fn load(&mut self) -> Preferences {
        self.current = Self::read(&self.backend);
        self.current.clone()
    }

    /// Merge `patch` into the current record and persist the whole record.
    pub fn update(&mut self, patch: &PreferencesPatch) -> &Preferences {
        let mut next = self.current.clone();
        patch.apply(&mut next);
        self.current = next.clamped();
        self.save();
        &self.current
    }

    fn save(&mut self) {
        let json = match serde_json::to_string(&self.current) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize preferences: {e}");
                return;
            }
        };
        match self.backend.set(SETTINGS_KEY, &json) {
            Ok(()) => debug!("Saved preferences"),
            Err(e) => error!("Failed to write preferences: {e}"),
        }
    }

    fn read(backend: &S) -> Preferences {
        match backend.get(SETTINGS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Preferences>(&json) {
                Ok(prefs) => {
                    info!("Loaded preferences");
                    return prefs.clamped();
                }
                Err(e) => error!("Failed to parse preferences: {e}"),
            },
            Ok(None) => debug!("No stored preferences, using defaults"),
            Err(e) => error!("Failed to read preferences: {e}"),
        }
        Preferences::default()
    }
}
