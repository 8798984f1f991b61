use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The selector you are trying to scrape for is invalid. Selector: {0}")]
    ParseSelector(String),

    #[error("The listing JSON has no `{0}` field.")]
    ListingShape(&'static str),

    #[error("Request to {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Refusing to write outside the save folder: {0:?}")]
    UnsafeFileName(String),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
