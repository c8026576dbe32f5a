use thiserror::Error;

/// Failure of the document handle itself.
///
/// A missing element is never a `DocumentError`; field extractors fall back to
/// their defaults for that. This error means the page could not be read at
/// all, and it aborts the extraction.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("could not connect to WebDriver at {url}")]
    Connect { url: String },

    #[error("invalid page URL \"{url}\": {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("document unavailable: {0}")]
    Unavailable(String),
}

/// Failure to fetch an image for inlining.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to set up an extraction: loading the page or building the extractor.
///
/// Problems met while reading an already loaded page never surface here;
/// they are reported in the record's `meta` instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not read page file: {0}")]
    Io(#[from] std::io::Error),
}
