use crate::media::canvas::{canvas_edge_for, fit_ratio, scale_picture};
use crate::media::network::MediaFetcher;
use crate::media::picture::PictureSlot;
use crate::media::texture::OutputTexture;
use crate::EmoteConfig;

/// Single picture shown once. No schedule, no disposal.
pub struct StaticPlayer {
    label: String,
    picture: PictureSlot,
    texture: OutputTexture,
    max_edge: usize,
    drawn: bool,
}

impl StaticPlayer {
    /// Pictures larger than `max_edge` are scaled down onto a canvas of
    /// that edge.
    pub fn new(
        label: impl Into<String>,
        picture: PictureSlot,
        initial_edge: usize,
        max_edge: usize,
    ) -> Self {
        Self {
            label: label.into(),
            picture,
            texture: OutputTexture::new(initial_edge.min(max_edge)),
            max_edge,
            drawn: false,
        }
    }

    pub fn load(url: &str, config: &EmoteConfig, fetcher: &dyn MediaFetcher) -> Self {
        Self::new(
            url,
            PictureSlot::Loading(fetcher.fetch_picture(url)),
            config.initial_canvas_size,
            config.max_canvas_size,
        )
    }

    pub fn is_drawn(&self) -> bool {
        self.drawn
    }

    pub fn is_failed(&self) -> bool {
        !self.drawn && self.picture.is_failed()
    }

    pub fn texture(&self) -> &OutputTexture {
        &self.texture
    }

    pub fn texture_mut(&mut self) -> &mut OutputTexture {
        &mut self.texture
    }

    /// Draw the picture the first time it is seen ready. Returns true on
    /// that call only.
    pub fn update(&mut self) -> bool {
        if self.drawn {
            return false;
        }

        self.picture.poll(&self.label, 0);
        let Some(picture) = self.picture.ready() else {
            return false;
        };

        let [w, h] = picture.size;
        let edge = canvas_edge_for(w as u32, h as u32).min(self.max_edge);
        let canvas = self.texture.canvas_mut();
        canvas.resize(edge);

        let ratio = fit_ratio(canvas.size(), picture.size);
        let scaled = scale_picture(picture, ratio);
        canvas.draw(&scaled, 0, 0);

        tracing::debug!(
            "{}: static {w}x{h} drawn at {ratio:.3} on {edge}x{edge}",
            self.label
        );

        // the decoded picture is not needed once it is on the canvas
        self.picture = PictureSlot::Failed;
        self.drawn = true;
        self.texture.mark_dirty();
        true
    }

    pub fn dispose(&mut self) {
        self.picture = PictureSlot::Failed;
        self.texture.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, ColorImage};
    use poll_promise::Promise;

    #[test]
    fn test_fit_and_draw_once() {
        let (sender, promise) = Promise::new();
        let mut player = StaticPlayer::new("wide", PictureSlot::Loading(promise), 128, 2048);
        assert_eq!(player.texture().canvas().edge(), 128);
        assert!(!player.update());

        sender.send(Ok(ColorImage::new([300, 150], Color32::RED)));
        assert!(player.update());
        assert_eq!(player.texture().canvas().edge(), 512);
        assert!(player.texture().needs_update());

        let ratio = fit_ratio([512, 512], [300, 150]);
        assert!((ratio - 512.0 / 300.0).abs() < 1e-6);

        // scaled to 512x256 at the origin
        let canvas = player.texture().canvas();
        assert_eq!(canvas.pixel(0, 0), Color32::RED);
        assert_eq!(canvas.pixel(511, 255), Color32::RED);
        assert_eq!(canvas.pixel(0, 256), Color32::TRANSPARENT);
        assert_eq!(canvas.pixel(511, 511), Color32::TRANSPARENT);

        assert!(player.texture_mut().take_update().is_some());
        assert!(!player.update());
        assert!(!player.texture().needs_update());
        assert_eq!(player.texture().uploads(), 1);
    }

    #[test]
    fn test_large_picture_is_scaled_down_to_limit() {
        let (sender, promise) = Promise::new();
        let mut player = StaticPlayer::new("huge", PictureSlot::Loading(promise), 128, 64);
        assert_eq!(player.texture().canvas().edge(), 64);

        sender.send(Ok(ColorImage::new([300, 150], Color32::RED)));
        assert!(player.update());

        // fit ratio 64/300 gives 64x32
        let canvas = player.texture().canvas();
        assert_eq!(canvas.edge(), 64);
        assert_eq!(canvas.pixel(0, 0), Color32::RED);
        assert_eq!(canvas.pixel(63, 31), Color32::RED);
        assert_eq!(canvas.pixel(0, 32), Color32::TRANSPARENT);
    }

    #[test]
    fn test_failed_picture_keeps_placeholder() {
        let promise = Promise::from_ready(Err(crate::Error::Generic("404".to_owned())));
        let mut player = StaticPlayer::new("missing", PictureSlot::Loading(promise), 128, 2048);

        assert!(!player.update());
        assert!(player.is_failed());
        assert!(!player.is_drawn());
        assert_eq!(player.texture().canvas().edge(), 128);
        assert!(!player.texture().needs_update());
    }
}
