use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use strata_types::{MappingRanges, ReduceContext, TimeSignature};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    undo: UndoConfig,
    #[serde(default)]
    defaults: DefaultsConfig,
    #[serde(default)]
    mapping: MappingConfig,
}

#[derive(Deserialize, Default)]
struct UndoConfig {
    max_depth: Option<usize>,
    coalesce_window_ms: Option<u64>,
}

#[derive(Deserialize, Default)]
struct DefaultsConfig {
    tempo: Option<f64>,
    time_signature: Option<[u8; 2]>,
    grid_spacing: Option<f64>,
}

#[derive(Deserialize, Default)]
struct MappingConfig {
    volume_range: Option<[f32; 2]>,
    effect_range: Option<[f32; 2]>,
}

pub struct Config {
    undo: UndoConfig,
    defaults: DefaultsConfig,
    mapping: MappingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(embedded())
    }
}

impl Config {
    /// Embedded defaults merged with the user's config file, if there is one.
    pub fn load() -> Self {
        match user_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::default(),
        }
    }

    /// Embedded defaults merged with the file at `path`. Unreadable or
    /// malformed files are logged and skipped.
    pub fn load_from(path: &Path) -> Self {
        let mut base = embedded();
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                Ok(user) => merge(&mut base, user),
                Err(e) => {
                    log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                }
            },
            Err(e) => {
                log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
            }
        }
        Self::from_file(base)
    }

    /// Embedded defaults merged with `contents`.
    pub fn from_toml_str(contents: &str) -> Self {
        let mut base = embedded();
        match toml::from_str::<ConfigFile>(contents) {
            Ok(user) => merge(&mut base, user),
            Err(e) => log::warn!(target: "config", "ignoring malformed config: {}", e),
        }
        Self::from_file(base)
    }

    fn from_file(file: ConfigFile) -> Self {
        Config {
            undo: file.undo,
            defaults: file.defaults,
            mapping: file.mapping,
        }
    }

    /// Undo history depth (at least 1).
    pub fn undo_max_depth(&self) -> usize {
        self.undo.max_depth.unwrap_or(500).max(1)
    }

    /// Wall-clock limit on one coalesced gesture; `None` when disabled.
    pub fn coalesce_window(&self) -> Option<Duration> {
        match self.undo.coalesce_window_ms.unwrap_or(0) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn default_tempo(&self) -> f64 {
        self.defaults
            .tempo
            .filter(|t| t.is_finite())
            .unwrap_or(120.0)
    }

    pub fn default_time_signature(&self) -> TimeSignature {
        self.defaults
            .time_signature
            .map(|[beats_per_bar, beat_unit]| TimeSignature {
                beats_per_bar,
                beat_unit,
            })
            .filter(TimeSignature::is_valid)
            .unwrap_or_default()
    }

    /// Grid step offered to the automation drawing tools, in bars.
    pub fn grid_spacing(&self) -> f64 {
        self.defaults
            .grid_spacing
            .filter(|g| g.is_finite() && *g > 0.0)
            .unwrap_or(0.25)
    }

    pub fn mapping_ranges(&self) -> MappingRanges {
        let fallback = MappingRanges::default();
        MappingRanges {
            volume: self.mapping.volume_range.map(|[lo, hi]| (lo, hi)).unwrap_or(fallback.volume),
            effect: self.mapping.effect_range.map(|[lo, hi]| (lo, hi)).unwrap_or(fallback.effect),
        }
    }

    /// Defaults handed to the reducers.
    pub fn reduce_context(&self) -> ReduceContext {
        ReduceContext {
            mapping_ranges: self.mapping_ranges(),
            default_tempo: self.default_tempo(),
            default_time_signature: self.default_time_signature(),
        }
    }
}

fn embedded() -> ConfigFile {
    toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
        log::error!(target: "config", "embedded config.toml is invalid: {}", e);
        ConfigFile::default()
    })
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("strata").join("config.toml"))
}

fn merge(base: &mut ConfigFile, user: ConfigFile) {
    if user.undo.max_depth.is_some() {
        base.undo.max_depth = user.undo.max_depth;
    }
    if user.undo.coalesce_window_ms.is_some() {
        base.undo.coalesce_window_ms = user.undo.coalesce_window_ms;
    }
    if user.defaults.tempo.is_some() {
        base.defaults.tempo = user.defaults.tempo;
    }
    if user.defaults.time_signature.is_some() {
        base.defaults.time_signature = user.defaults.time_signature;
    }
    if user.defaults.grid_spacing.is_some() {
        base.defaults.grid_spacing = user.defaults.grid_spacing;
    }
    if user.mapping.volume_range.is_some() {
        base.mapping.volume_range = user.mapping.volume_range;
    }
    if user.mapping.effect_range.is_some() {
        base.mapping.effect_range = user.mapping.effect_range;
    }
}
