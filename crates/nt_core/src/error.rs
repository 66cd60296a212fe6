use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Scraping {0} is not supported due to authentication requirements")]
    BlockedDomain(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch {url}: {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("Error fetching {url}: {cause}")]
    FetchTransport { url: String, cause: String },

    #[error("Search error: {0}")]
    Search(String),

    #[error("{0}")]
    NoContent(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Model request limit of {limit} exceeded")]
    UsageLimitExceeded { limit: usize },

    #[error("Invalid search method: {0}. Expected direct_scrape, serper or combined")]
    InvalidMethod(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// True for failures caused by the caller's input rather than by an
    /// upstream service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::BlockedDomain(_) | Error::InvalidUrl(_) | Error::InvalidMethod(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
