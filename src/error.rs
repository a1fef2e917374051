use thiserror::Error;

/// The outbound request for a search page failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to marketplace failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("marketplace answered {status} for {url}")]
    Status { status: u16, url: String },
}

/// The fetched body could not be read as an HTML document at all.
///
/// Missing cards or fields are never a parse error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("document is empty")]
    Empty,

    #[error("document contains no markup")]
    NotMarkup,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid target domain '{0}'")]
    InvalidDomain(String),

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
