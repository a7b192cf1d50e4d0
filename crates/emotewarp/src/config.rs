use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::Result;

const DEFAULT_ENDPOINT: &str = "https://gif-emotes.opl.io";
const DEFAULT_MAX_FRAMES: usize = 256;
const DEFAULT_DELAY_UNIT_MS: u64 = 10;
const DEFAULT_DELAY_MS: u64 = 100;
const DEFAULT_MIN_DELAY_MS: u64 = 20;
const DEFAULT_INITIAL_CANVAS_SIZE: usize = 128;
/// egui's default `max_texture_side`
const DEFAULT_MAX_CANVAS_SIZE: usize = 2048;

/// Keys whose animated metadata is known to be unusable. They always
/// take the static fallback path.
const DEFAULT_DENY_LIST: [&str; 4] = [
    "5e0ea4610550d42106b8955a",
    "566ca38765dbbdab32ec0560",
    "55cb47a82718127806ad3202",
    "5e6fa08bd112fc3725746dd4",
];

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct EmoteConfig {
    /// Base address of the frame metadata service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Frames past this count are dropped from a sequence
    #[serde(default = "default_max_frames")]
    pub max_frames: usize,

    #[serde(default = "default_deny_list")]
    pub deny_list: Vec<String>,

    /// Length of one metadata delay tick. Frame delays arrive in
    /// hundredths of a second, like in GIF graphic control blocks.
    #[serde(default = "default_delay_unit_ms")]
    pub delay_unit_ms: u64,

    /// Used when a frame has no delay or a zero delay
    #[serde(default = "default_delay_ms")]
    pub default_delay_ms: u64,

    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Canvas edge used before the first frame's bounding box is known
    #[serde(default = "default_initial_canvas_size")]
    pub initial_canvas_size: usize,

    /// Largest canvas edge a player may allocate. Animations whose first
    /// frame needs more play as a static picture, static pictures are
    /// scaled down to fit.
    #[serde(default = "default_max_canvas_size")]
    pub max_canvas_size: usize,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_max_frames() -> usize {
    DEFAULT_MAX_FRAMES
}

fn default_deny_list() -> Vec<String> {
    DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect()
}

fn default_delay_unit_ms() -> u64 {
    DEFAULT_DELAY_UNIT_MS
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_min_delay_ms() -> u64 {
    DEFAULT_MIN_DELAY_MS
}

fn default_initial_canvas_size() -> usize {
    DEFAULT_INITIAL_CANVAS_SIZE
}

fn default_max_canvas_size() -> usize {
    DEFAULT_MAX_CANVAS_SIZE
}

impl Default for EmoteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            max_frames: default_max_frames(),
            deny_list: default_deny_list(),
            delay_unit_ms: default_delay_unit_ms(),
            default_delay_ms: default_delay_ms(),
            min_delay_ms: default_min_delay_ms(),
            initial_canvas_size: default_initial_canvas_size(),
            max_canvas_size: default_max_canvas_size(),
        }
    }
}

impl EmoteConfig {
    /// Read a json config file. A missing file yields the defaults, a
    /// malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(
                "config file {} not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn is_denied(&self, key: &str) -> bool {
        self.deny_list.iter().any(|denied| denied == key)
    }

    /// Turn a raw metadata delay into a playable duration. Missing or
    /// zero delays get the default, everything is kept above the minimum
    /// so the schedule never re-arms with a zero interval.
    pub fn frame_delay(&self, raw: Option<u32>) -> Duration {
        let ms = match raw {
            Some(0) | None => self.default_delay_ms,
            Some(ticks) => u64::from(ticks).saturating_mul(self.delay_unit_ms),
        };

        Duration::from_millis(ms.max(self.min_delay_ms.max(1)))
    }

    pub fn metadata_url(&self, key: &str) -> String {
        format!("{}/gif/{key}", self.endpoint.trim_end_matches('/'))
    }

    pub fn frame_url(&self, key: &str, index: usize) -> String {
        format!(
            "{}/static/{key}/{index}.png",
            self.endpoint.trim_end_matches('/')
        )
    }

    pub fn fallback_url(&self, key: &str) -> String {
        format!("{}/gif/{key}.gif", self.endpoint.trim_end_matches('/'))
    }
}
