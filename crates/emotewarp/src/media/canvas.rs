use egui::{Color32, ColorImage};
use image::imageops::FilterType;

/// Smallest canvas edge the sizing ever picks
const MIN_CANVAS_EDGE: usize = 4;

/// Smallest power of two that holds both dimensions
pub fn canvas_edge_for(width: u32, height: u32) -> usize {
    (width.max(height) as usize)
        .next_power_of_two()
        .max(MIN_CANVAS_EDGE)
}

/// Uniform scale that fits an image inside the canvas
pub fn fit_ratio(canvas: [usize; 2], image: [usize; 2]) -> f32 {
    if image[0] == 0 || image[1] == 0 {
        return 1.0;
    }

    let [canvas_w, canvas_h] = canvas;
    let [img_w, img_h] = image;
    (canvas_h as f32 / img_h as f32).min(canvas_w as f32 / img_w as f32)
}

/// Resample a picture by `ratio`. Pixels stay premultiplied, which is the
/// correct space to filter in.
pub fn scale_picture(picture: &ColorImage, ratio: f32) -> ColorImage {
    let [w, h] = picture.size;
    let new_w = ((w as f32 * ratio).round() as u32).max(1);
    let new_h = ((h as f32 * ratio).round() as u32).max(1);

    if new_w as usize == w && new_h as usize == h {
        return picture.clone();
    }

    let raw: Vec<u8> = picture.pixels.iter().flat_map(|p| p.to_array()).collect();
    let Some(buffer) = image::RgbaImage::from_raw(w as u32, h as u32, raw) else {
        tracing::error!("picture buffer does not match its size {w}x{h}");
        return picture.clone();
    };

    let resized = image::imageops::resize(&buffer, new_w, new_h, FilterType::CatmullRom);
    ColorImage::from_rgba_premultiplied(
        [resized.width() as usize, resized.height() as usize],
        resized.as_raw(),
    )
}

/// Source-over for premultiplied colors
fn blend_over(dst: Color32, src: Color32) -> Color32 {
    match src.a() {
        255 => src,
        0 => dst,
        a => {
            let inv = 255 - u16::from(a);
            let mix = |s: u8, d: u8| -> u8 {
                (u16::from(s) + (u16::from(d) * inv + 127) / 255).min(255) as u8
            };
            Color32::from_rgba_premultiplied(
                mix(src.r(), dst.r()),
                mix(src.g(), dst.g()),
                mix(src.b(), dst.b()),
                mix(src.a(), dst.a()),
            )
        }
    }
}

/// Clip a rectangle against `[0, edge)` on both axes
fn clip(x: i64, y: i64, w: i64, h: i64, size: [usize; 2]) -> Option<(usize, usize, usize, usize)> {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(size[0] as i64);
    let y1 = (y + h).min(size[1] as i64);

    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
}

/// The shared square drawing surface frames are composited onto
#[derive(Clone)]
pub struct Canvas {
    image: ColorImage,
}

impl Canvas {
    pub fn new(edge: usize) -> Self {
        Self {
            image: ColorImage::new([edge, edge], Color32::TRANSPARENT),
        }
    }

    pub fn edge(&self) -> usize {
        self.image.size[0]
    }

    pub fn size(&self) -> [usize; 2] {
        self.image.size
    }

    pub fn image(&self) -> &ColorImage {
        &self.image
    }

    /// Resize to a new square edge. Contents are cleared.
    pub fn resize(&mut self, edge: usize) {
        self.image = ColorImage::new([edge, edge], Color32::TRANSPARENT);
    }

    /// Drop the pixel storage
    pub fn release(&mut self) {
        self.image = ColorImage::new([0, 0], Color32::TRANSPARENT);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Color32 {
        let [w, h] = self.image.size;
        if x >= w || y >= h {
            return Color32::TRANSPARENT;
        }
        self.image.pixels[y * w + x]
    }

    pub fn clear(&mut self) {
        self.image.pixels.fill(Color32::TRANSPARENT);
    }

    /// Clear exactly one rectangle, clipped to the canvas
    pub fn clear_rect(&mut self, x: i32, y: i32, width: u32, height: u32) {
        let Some((x0, y0, x1, y1)) = clip(
            x.into(),
            y.into(),
            width.into(),
            height.into(),
            self.image.size,
        ) else {
            return;
        };

        let stride = self.image.size[0];
        for row in y0..y1 {
            self.image.pixels[row * stride + x0..row * stride + x1].fill(Color32::TRANSPARENT);
        }
    }

    /// Composite a picture with its top left corner at (x, y)
    #[profiling::function]
    pub fn draw(&mut self, picture: &ColorImage, x: i32, y: i32) {
        let [pw, ph] = picture.size;
        let Some((x0, y0, x1, y1)) = clip(
            x.into(),
            y.into(),
            pw as i64,
            ph as i64,
            self.image.size,
        ) else {
            return;
        };

        let stride = self.image.size[0];
        for row in y0..y1 {
            let src_y = (row as i64 - i64::from(y)) as usize;
            for col in x0..x1 {
                let src_x = (col as i64 - i64::from(x)) as usize;
                let src = picture.pixels[src_y * pw + src_x];
                let dst = &mut self.image.pixels[row * stride + col];
                *dst = blend_over(*dst, src);
            }
        }
    }

    pub fn snapshot(&self) -> ColorImage {
        self.image.clone()
    }

    /// Copy a full snapshot back. Snapshots of another size are ignored.
    pub fn restore(&mut self, snapshot: &ColorImage) -> bool {
        if snapshot.size != self.image.size {
            tracing::warn!(
                "ignoring snapshot of size {:?} for canvas of size {:?}",
                snapshot.size,
                self.image.size
            );
            return false;
        }

        self.image.pixels.copy_from_slice(&snapshot.pixels);
        true
    }
}
