use std::path::{Path, PathBuf};

use egui::ColorImage;
use emotewarp::{Error, Result};

/// Write one republished texture as `frame-NNNNN.png` in `dir`
pub fn save_png(dir: &Path, seq: usize, image: &ColorImage) -> Result<PathBuf> {
    let [w, h] = image.size;
    let raw: Vec<u8> = image
        .pixels
        .iter()
        .flat_map(|p| p.to_srgba_unmultiplied())
        .collect();

    let buffer = image::RgbaImage::from_raw(w as u32, h as u32, raw)
        .ok_or_else(|| Error::Generic(format!("texture buffer does not match {w}x{h}")))?;

    let path = dir.join(format!("frame-{seq:05}.png"));
    buffer.save(&path)?;
    tracing::trace!("wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    #[test]
    fn test_save_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut image = ColorImage::new([4, 4], Color32::TRANSPARENT);
        image.pixels[0] = Color32::RED;

        let path = save_png(tmp.path(), 7, &image).unwrap();
        assert_eq!(path.file_name().unwrap(), "frame-00007.png");

        let written = image::open(&path).unwrap().into_rgba8();
        assert_eq!(written.dimensions(), (4, 4));
        assert_eq!(written.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(written.get_pixel(3, 3).0[3], 0);
    }
}
