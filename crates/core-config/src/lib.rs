//! Configuration loading and parsing.
//!
//! Parses `ox-ime.toml` (or an override path provided by the binary) and
//! extracts the `[ime]` table. Missing files and parse failures fall back to
//! defaults so composition never fails to start because of a bad config.
//! Unknown fields are ignored.
//!
//! ```toml
//! [ime]
//! chunk_capacity = 100
//! suggestion_width_cells = 10
//! wide_glyph_fallback = "blank"
//! ```
//!
//! `chunk_capacity` is clamped to `CHUNK_CAPACITY_MIN..=CHUNK_CAPACITY_MAX`
//! by `Config::apply_limits`; the raw parsed value is retained.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{debug, info};

/// Size of the fixed stack chunk used when streaming composition text.
pub const CHUNK_CAPACITY_MAX: usize = 100;
/// A chunk must hold at least one double-width glyph.
pub const CHUNK_CAPACITY_MIN: usize = 2;

/// What to do with a double-width glyph that cannot fit on the last usable
/// display row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WideGlyphFallback {
    /// Consume the glyph and write a single blank cell in its place.
    #[default]
    Blank,
    /// Consume the glyph without writing anything.
    Drop,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ImeConfig {
    #[serde(default = "ImeConfig::default_chunk_capacity")]
    pub chunk_capacity: usize,
    #[serde(default = "ImeConfig::default_suggestion_width")]
    pub suggestion_width_cells: u16,
    #[serde(default)]
    pub wide_glyph_fallback: WideGlyphFallback,
}

impl Default for ImeConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: Self::default_chunk_capacity(),
            suggestion_width_cells: Self::default_suggestion_width(),
            wide_glyph_fallback: WideGlyphFallback::default(),
        }
    }
}

impl ImeConfig {
    const fn default_chunk_capacity() -> usize {
        CHUNK_CAPACITY_MAX
    }
    const fn default_suggestion_width() -> u16 {
        10
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub ime: ImeConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("ox-ime.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("ox-ime").join("ox-ime.toml");
    }
    PathBuf::from("ox-ime.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config {
            raw: Some(content),
            file,
        }),
        Err(e) => {
            debug!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Clamp numeric settings into their supported ranges and return the
    /// effective `[ime]` table.
    pub fn apply_limits(&self) -> ImeConfig {
        let mut ime = self.file.ime.clone();
        let raw = ime.chunk_capacity;
        let clamped = raw.clamp(CHUNK_CAPACITY_MIN, CHUNK_CAPACITY_MAX);
        if clamped != raw {
            info!(
                target: "config",
                raw,
                clamped,
                min = CHUNK_CAPACITY_MIN,
                max = CHUNK_CAPACITY_MAX,
                "ime_chunk_capacity_clamped"
            );
        }
        ime.chunk_capacity = clamped;
        if ime.suggestion_width_cells == 0 {
            info!(target: "config", "ime_suggestion_width_zero_reset");
            ime.suggestion_width_cells = ImeConfig::default_suggestion_width();
        }
        ime
    }
}
