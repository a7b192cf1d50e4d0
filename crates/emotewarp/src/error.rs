use std::io;

/// Errors produced while resolving or loading emote media
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("image error: {0}")]
    Image(#[from] image::error::ImageError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(String),

    #[error("generic error: {0}")]
    Generic(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}

impl Error {
    pub fn http_status(url: &str, status: u16, text: &str) -> Self {
        Error::Http(format!("{url} returned {status} {text}"))
    }
}
