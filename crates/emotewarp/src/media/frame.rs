use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::EmoteConfig;

/// What happens to a frame's pixels once its display turn ends
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisposalMode {
    /// Leave the canvas as it is; the next frame draws on top
    #[default]
    None,
    /// Clear the frame's own rectangle
    RestoreBackground,
    /// Put back the canvas as it looked before this frame
    RestorePrevious,
}

impl DisposalMode {
    /// Map a GIF disposal code. 0 (unspecified) and 1 (do not dispose)
    /// both keep the canvas, unknown codes are treated the same way.
    pub fn from_code(code: u8) -> Self {
        match code {
            2 => DisposalMode::RestoreBackground,
            3 => DisposalMode::RestorePrevious,
            _ => DisposalMode::None,
        }
    }
}

/// One frame as delivered by the metadata service
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct FrameMetadata {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// hundredths of a second
    #[serde(default)]
    pub delay: Option<u32>,
    #[serde(default)]
    pub disposal: u8,
}

/// Metadata response for one emote key
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct SequenceMetadata {
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub frames: Vec<FrameMetadata>,
}

impl SequenceMetadata {
    pub fn has_frames(&self) -> bool {
        matches!(self.count, Some(n) if n > 0) && !self.frames.is_empty()
    }
}

/// Static description of one animation frame. Descriptors never change
/// once a sequence is built.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDescriptor {
    pub offset_x: i32,
    pub offset_y: i32,
    pub width: u32,
    pub height: u32,
    pub delay: Duration,
    pub disposal: DisposalMode,
}

impl FrameDescriptor {
    pub fn new(width: u32, height: u32, delay: Duration) -> Self {
        Self {
            offset_x: 0,
            offset_y: 0,
            width,
            height,
            delay,
            disposal: DisposalMode::None,
        }
    }

    pub fn with_offset(mut self, x: i32, y: i32) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }

    pub fn with_disposal(mut self, disposal: DisposalMode) -> Self {
        self.disposal = disposal;
        self
    }

    pub fn from_metadata(config: &EmoteConfig, meta: &FrameMetadata) -> Self {
        Self {
            offset_x: meta.x,
            offset_y: meta.y,
            width: meta.width,
            height: meta.height,
            delay: config.frame_delay(meta.delay),
            disposal: DisposalMode::from_code(meta.disposal),
        }
    }
}

/// Build a playable sequence, truncated to the configured frame limit.
/// Returns None when the metadata has nothing to play.
pub fn sequence_from_metadata(
    config: &EmoteConfig,
    meta: &SequenceMetadata,
) -> Option<Vec<FrameDescriptor>> {
    if !meta.has_frames() || config.max_frames == 0 {
        return None;
    }

    if meta.frames.len() > config.max_frames {
        tracing::debug!(
            "truncating sequence of {} frames to {}",
            meta.frames.len(),
            config.max_frames
        );
    }

    Some(
        meta.frames
            .iter()
            .take(config.max_frames)
            .map(|frame| FrameDescriptor::from_metadata(config, frame))
            .collect(),
    )
}
