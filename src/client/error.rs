use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not found")]
    NotFound,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error body.
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;
