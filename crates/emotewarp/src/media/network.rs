use egui::ColorImage;
use poll_promise::Promise;

use crate::media::frame::SequenceMetadata;
use crate::{Error, Result};

pub type MetadataPromise = Promise<Result<SequenceMetadata>>;
pub type PicturePromise = Promise<Result<ColorImage>>;

/// Where sequence metadata and pictures come from. Both calls return
/// immediately; the promise completes whenever the transfer does.
pub trait MediaFetcher {
    fn fetch_metadata(&self, url: &str) -> MetadataPromise;
    fn fetch_picture(&self, url: &str) -> PicturePromise;
}

/// Fetches over http with ehttp. Decoding happens on ehttp's thread, the
/// result is only observed when the owner polls the promise.
#[derive(Default, Clone, Copy)]
pub struct HttpFetcher;

impl MediaFetcher for HttpFetcher {
    fn fetch_metadata(&self, url: &str) -> MetadataPromise {
        let (sender, promise) = Promise::new();
        let request = ehttp::Request::get(url);
        let url = url.to_owned();

        tracing::trace!("fetching sequence metadata from {url}");
        ehttp::fetch(request, move |response| {
            let result = checked_body(&url, response)
                .and_then(|bytes| serde_json::from_slice(&bytes).map_err(Error::Json));
            if let Err(e) = &result {
                tracing::warn!("metadata request for {url} failed: {e}");
            }
            sender.send(result);
        });

        promise
    }

    fn fetch_picture(&self, url: &str) -> PicturePromise {
        let (sender, promise) = Promise::new();
        let request = ehttp::Request::get(url);
        let url = url.to_owned();

        tracing::trace!("fetching picture {url}");
        ehttp::fetch(request, move |response| {
            let result = checked_body(&url, response).and_then(|bytes| decode_picture(&bytes));
            if let Err(e) = &result {
                tracing::warn!("picture {url} failed to load: {e}");
            }
            sender.send(result);
        });

        promise
    }
}

fn checked_body(url: &str, response: ehttp::Result<ehttp::Response>) -> Result<Vec<u8>> {
    let response = response.map_err(Error::Http)?;
    if !response.ok {
        return Err(Error::http_status(
            url,
            response.status,
            &response.status_text,
        ));
    }

    Ok(response.bytes)
}

/// Decode any supported image into an egui color image
#[profiling::function]
pub fn decode_picture(bytes: &[u8]) -> Result<ColorImage> {
    let image = image::load_from_memory(bytes)?;
    let buffer = image.into_rgba8();
    Ok(ColorImage::from_rgba_unmultiplied(
        [buffer.width() as usize, buffer.height() as usize],
        buffer.as_flat_samples().as_slice(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decode_png() {
        let buffer = image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        buffer
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_picture(&bytes).unwrap();
        assert_eq!(decoded.size, [3, 2]);
        assert_eq!(decoded.pixels[0], egui::Color32::RED);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_picture(b"definitely not an image"),
            Err(Error::Image(_))
        ));
    }

    fn response(ok: bool, status: u16, status_text: &str) -> ehttp::Response {
        ehttp::Response {
            url: "https://example.com/x".to_owned(),
            ok,
            status,
            status_text: status_text.to_owned(),
            headers: Default::default(),
            bytes: b"body".to_vec(),
        }
    }

    #[test]
    fn test_non_success_status_is_an_error() {
        let result = checked_body("https://example.com/x", Ok(response(false, 404, "Not Found")));
        match result {
            Err(Error::Http(msg)) => assert!(msg.contains("404"), "{msg}"),
            other => panic!("expected http error, got {other:?}"),
        }
    }

    #[test]
    fn test_success_returns_body() {
        let body = checked_body("https://example.com/x", Ok(response(true, 200, "OK"))).unwrap();
        assert_eq!(body, b"body");
    }

    #[test]
    fn test_transport_error() {
        assert!(matches!(
            checked_body("https://example.com/x", Err("offline".to_owned())),
            Err(Error::Http(_))
        ));
    }
}
