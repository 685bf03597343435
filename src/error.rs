use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by the Bot API client.
#[derive(Debug, Error)]
pub enum Error {
    /// Request could not be sent or the response could not be read
    #[error("http error: {0}")]
    Http(reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-success status with a body that is not a Bot API envelope
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The server returned something that is not JSON
    #[error("the server returned an invalid JSON response ({status}): {body}")]
    InvalidJson { status: StatusCode, body: String },

    /// The envelope came back with `ok: false`
    #[error("api error {error_code}: {description}")]
    Api {
        error_code: i64,
        description: String,
        retry_after: Option<i64>,
        migrate_to_chat_id: Option<i64>,
    },

    /// `result` does not have the expected shape
    #[error("failed to decode result: {0}")]
    Decode(#[from] serde_json::Error),

    /// A parameter could not be serialized to JSON
    #[error("failed to encode parameter: {0}")]
    Encode(serde_json::Error),

    /// `getFile` returned a file that cannot be downloaded
    #[error("file {0} has no file_path")]
    MissingFilePath(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Bot API error code, when the server answered with one.
    pub fn error_code(&self) -> Option<i64> {
        match self {
            Error::Api { error_code, .. } => Some(*error_code),
            _ => None,
        }
    }
}

// The request URL carries the bot token.
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.without_url())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
