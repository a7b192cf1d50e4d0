use egui::ColorImage;

use crate::media::canvas::Canvas;
use crate::media::frame::{DisposalMode, FrameDescriptor};

/// Applies disposal rules and keeps the per-frame snapshot table.
///
/// Snapshots are keyed by frame index and written at most once: the
/// canvas right after a frame was drawn for the first time.
pub struct Compositor {
    snapshots: Vec<Option<ColorImage>>,
}

impl Compositor {
    pub fn new(frame_count: usize) -> Self {
        Self {
            snapshots: vec![None; frame_count],
        }
    }

    pub fn snapshot(&self, index: usize) -> Option<&ColorImage> {
        self.snapshots.get(index).and_then(Option::as_ref)
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.iter().filter(|s| s.is_some()).count()
    }

    /// Frame whose snapshot a `RestorePrevious` on `disposed` goes back
    /// to: the nearest earlier frame that is index 0 or does not have a
    /// `None` disposal.
    pub fn restore_target(frames: &[FrameDescriptor], disposed: usize) -> Option<usize> {
        (0..disposed)
            .rev()
            .find(|&index| index == 0 || frames[index].disposal != DisposalMode::None)
    }

    /// Prepare the canvas for drawing frame `index`. Frame 0 starts each
    /// loop from a cleared canvas, every other frame gets the disposal of
    /// the frame before it.
    #[profiling::function]
    pub fn dispose_before(&self, canvas: &mut Canvas, frames: &[FrameDescriptor], index: usize) {
        if index == 0 {
            canvas.clear();
            return;
        }

        let previous = index - 1;
        let frame = &frames[previous];
        match frame.disposal {
            DisposalMode::None => {}
            DisposalMode::RestoreBackground => {
                canvas.clear_rect(frame.offset_x, frame.offset_y, frame.width, frame.height);
            }
            DisposalMode::RestorePrevious => {
                let Some(target) = Self::restore_target(frames, previous) else {
                    return;
                };

                match self.snapshot(target) {
                    Some(snapshot) => {
                        canvas.restore(snapshot);
                    }
                    None => {
                        tracing::trace!("frame {target} has no snapshot yet, nothing to restore");
                    }
                }
            }
        }
    }

    /// Draw frame `index` and remember the result if this is the first
    /// time it was drawn
    pub fn draw(
        &mut self,
        canvas: &mut Canvas,
        frames: &[FrameDescriptor],
        index: usize,
        picture: &ColorImage,
    ) {
        let frame = &frames[index];
        canvas.draw(picture, frame.offset_x, frame.offset_y);

        if let Some(slot) = self.snapshots.get_mut(index) {
            if slot.is_none() {
                *slot = Some(canvas.snapshot());
            }
        }
    }

    pub fn composite(
        &mut self,
        canvas: &mut Canvas,
        frames: &[FrameDescriptor],
        index: usize,
        picture: &ColorImage,
    ) {
        self.dispose_before(canvas, frames, index);
        self.draw(canvas, frames, index, picture);
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
