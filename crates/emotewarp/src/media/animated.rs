use std::time::{Duration, Instant};

use crate::media::canvas::canvas_edge_for;
use crate::media::clock::FrameClock;
use crate::media::compositor::Compositor;
use crate::media::frame::FrameDescriptor;
use crate::media::network::MediaFetcher;
use crate::media::picture::PictureSlot;
use crate::media::texture::OutputTexture;
use crate::EmoteConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Sequence known, schedule not started yet
    Uninitialized,
    Playing,
    /// Torn down; canvas and texture are released
    Disposed,
}

/// Result of one timing evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// The new frame was composited and the texture flagged
    Drawn(usize),
    /// The cursor moved but the frame's picture is not ready
    Skipped(usize),
}

/// Plays a frame sequence onto a power-of-two canvas.
///
/// Pictures arrive independently and in any order. The schedule never
/// waits for them: a frame whose picture is missing at its turn is
/// skipped and the canvas keeps its last pixels.
pub struct AnimatedPlayer {
    label: String,
    sequence: Vec<FrameDescriptor>,
    pictures: Vec<PictureSlot>,
    compositor: Compositor,
    texture: OutputTexture,
    cursor: usize,
    state: PlaybackState,
    clock: Option<FrameClock>,
    last_evaluation: Option<Evaluation>,
}

impl AnimatedPlayer {
    /// Returns None for an empty sequence or when the first frame needs a
    /// canvas wider than `max_edge`. Frames without a matching picture
    /// slot are treated as failed loads.
    pub fn new(
        label: impl Into<String>,
        sequence: Vec<FrameDescriptor>,
        mut pictures: Vec<PictureSlot>,
        max_edge: usize,
    ) -> Option<Self> {
        let first = sequence.first()?;
        let edge = canvas_edge_for(first.width, first.height);
        let label = label.into();

        if edge > max_edge {
            tracing::warn!(
                "{label}: first frame {}x{} needs a {edge} canvas, limit is {max_edge}",
                first.width,
                first.height
            );
            return None;
        }

        if pictures.len() != sequence.len() {
            tracing::warn!(
                "{label}: {} pictures for {} frames",
                pictures.len(),
                sequence.len()
            );
            pictures.truncate(sequence.len());
            pictures.resize_with(sequence.len(), || PictureSlot::Failed);
        }

        tracing::debug!(
            "{label}: {} frames on a {edge}x{edge} canvas",
            sequence.len()
        );

        Some(Self {
            compositor: Compositor::new(sequence.len()),
            texture: OutputTexture::new(edge),
            label,
            sequence,
            pictures,
            cursor: 0,
            state: PlaybackState::Uninitialized,
            clock: None,
            last_evaluation: None,
        })
    }

    /// Start loading every frame picture for `key` and build the player
    pub fn load(
        key: &str,
        sequence: Vec<FrameDescriptor>,
        config: &EmoteConfig,
        fetcher: &dyn MediaFetcher,
    ) -> Option<Self> {
        let pictures = (0..sequence.len())
            .map(|index| PictureSlot::Loading(fetcher.fetch_picture(&config.frame_url(key, index))))
            .collect();

        Self::new(key, sequence, pictures, config.max_canvas_size)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn sequence(&self) -> &[FrameDescriptor] {
        &self.sequence
    }

    pub fn frame_count(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_ready(&self, index: usize) -> bool {
        self.pictures.get(index).is_some_and(PictureSlot::is_ready)
    }

    pub fn ready_count(&self) -> usize {
        self.pictures.iter().filter(|p| p.is_ready()).count()
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn texture(&self) -> &OutputTexture {
        &self.texture
    }

    pub fn texture_mut(&mut self) -> &mut OutputTexture {
        &mut self.texture
    }

    /// When the next evaluation is due, if the schedule is running
    pub fn next_due(&self) -> Option<Instant> {
        match self.state {
            PlaybackState::Playing => self.clock.as_ref().map(FrameClock::due),
            _ => None,
        }
    }

    /// Outcome of the most recent frame advance
    pub fn last_evaluation(&self) -> Option<Evaluation> {
        self.last_evaluation
    }

    pub fn clock(&self) -> Option<&FrameClock> {
        self.clock.as_ref()
    }

    /// Length of one full loop
    pub fn loop_duration(&self) -> Duration {
        self.sequence.iter().map(|f| f.delay).sum()
    }

    /// Observe finished picture loads. Returns how many became ready.
    pub fn poll_pictures(&mut self) -> usize {
        let mut became_ready = 0;
        for (index, slot) in self.pictures.iter_mut().enumerate() {
            if slot.poll(&self.label, index) {
                became_ready += 1;
            }
        }
        became_ready
    }

    /// Drive the player from the external tick. Picks up loaded
    /// pictures, starts the schedule on the first call, and evaluates at
    /// most once when the deadline has passed. Returns the next deadline.
    #[profiling::function]
    pub fn update(&mut self, now: Instant) -> Option<Instant> {
        if self.state == PlaybackState::Disposed {
            return None;
        }

        self.poll_pictures();

        match self.state {
            PlaybackState::Uninitialized => self.start(now),
            PlaybackState::Playing => {
                if self.clock.as_ref().is_some_and(|clock| clock.is_due(now)) {
                    self.last_evaluation = Some(self.evaluate(now));
                }
            }
            PlaybackState::Disposed => {}
        }

        self.next_due()
    }

    fn start(&mut self, now: Instant) {
        let first_delay = self.sequence[0].delay;
        self.clock = Some(FrameClock::start(now, first_delay, self.loop_duration()));
        self.state = PlaybackState::Playing;
        self.cursor = 0;

        if let Some(picture) = self.pictures[0].ready() {
            self.compositor
                .composite(self.texture.canvas_mut(), &self.sequence, 0, picture);
            self.texture.mark_dirty();
        }

        tracing::debug!("{}: playing", self.label);
    }

    /// Advance exactly one frame and draw it if its picture is ready
    fn evaluate(&mut self, now: Instant) -> Evaluation {
        let leaving = self.cursor;
        let Some(clock) = self.clock.as_mut() else {
            return Evaluation::Skipped(leaving);
        };

        clock.advance(now, self.sequence[leaving].delay);
        self.cursor = (leaving + 1) % self.sequence.len();
        let index = self.cursor;

        let outcome = match self.pictures[index].ready() {
            Some(picture) => {
                self.compositor
                    .composite(self.texture.canvas_mut(), &self.sequence, index, picture);
                self.texture.mark_dirty();
                Evaluation::Drawn(index)
            }
            None => Evaluation::Skipped(index),
        };

        // the frame now on screen decides how long until the next look
        clock.rearm(now, self.sequence[index].delay);

        tracing::trace!(
            "{}: {outcome:?}, next in {:?}",
            self.label,
            clock.due().saturating_duration_since(now)
        );

        outcome
    }

    /// Stop the schedule and release the canvas. Pending picture loads
    /// are dropped, so completions arriving later go nowhere.
    pub fn dispose(&mut self) {
        if self.state == PlaybackState::Disposed {
            return;
        }

        self.state = PlaybackState::Disposed;
        self.clock = None;
        self.pictures.clear();
        self.compositor.clear();
        self.texture.release();
        tracing::debug!("{}: disposed", self.label);
    }
}
