use egui::ColorImage;

use crate::media::canvas::Canvas;

/// The surface a renderer samples from. The player draws into the canvas
/// and flags it; the renderer re-uploads when the flag is set.
pub struct OutputTexture {
    canvas: Canvas,
    needs_update: bool,
    uploads: u64,
}

impl OutputTexture {
    pub fn new(edge: usize) -> Self {
        Self {
            canvas: Canvas::new(edge),
            needs_update: false,
            uploads: 0,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub(crate) fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn image(&self) -> &ColorImage {
        self.canvas.image()
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn mark_dirty(&mut self) {
        self.needs_update = true;
    }

    /// Number of times the texture has been flagged and then consumed
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Hand the pixels to the renderer if they changed since the last call
    pub fn take_update(&mut self) -> Option<&ColorImage> {
        if !self.needs_update {
            return None;
        }

        self.needs_update = false;
        self.uploads += 1;
        Some(self.canvas.image())
    }

    pub(crate) fn release(&mut self) {
        self.canvas.release();
        self.needs_update = false;
    }
}
