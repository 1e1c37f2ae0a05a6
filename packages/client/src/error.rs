/// Transport-level errors from a document store backend.
///
/// These are all "backend unavailable" conditions from the namespace's point
/// of view: the store could not be reached, answered with an unexpected
/// status, or returned a payload that failed to decode. None of them are
/// cached by higher layers - the next resolution retries the call.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no endpoint URLs configured")]
    NoEndpoints,
}
