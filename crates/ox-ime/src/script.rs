//! Replay scripts.
//!
//! A script is a TOML file with a list of `[[step]]` tables, each tagged by
//! `op`:
//!
//! ```toml
//! [[step]]
//! op = "cursor"
//! x = 18
//! y = 2
//!
//! [[step]]
//! op = "compose"
//! text = "かな"
//! attrs = [1, 2]        # optional, defaults to 0 per char
//!
//! [[step]]
//! op = "commit"
//! text = "仮名"
//! ```
//!
//! Other ops: `start`, `end`, `resize_view { width, height }`,
//! `resize_buffer { width, height }`, `raw { bytes }` (payload sent as-is).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Start,
    End,
    Cursor {
        x: i32,
        y: i32,
    },
    Compose {
        text: String,
        #[serde(default)]
        attrs: Vec<u8>,
        colors: Option<[u16; 8]>,
    },
    Commit {
        text: String,
    },
    ResizeView {
        width: i32,
        height: i32,
    },
    ResizeBuffer {
        width: i32,
        height: i32,
    },
    Raw {
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(body: &str) -> Result<Self> {
        toml::from_str(body).context("invalid replay script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::parse(&body)
    }
}
