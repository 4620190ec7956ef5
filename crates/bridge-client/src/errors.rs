use http::StatusCode;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors surfaced by [`Client`](crate::Client) calls.
///
/// Stream protocol faults discovered after streaming has begun are not
/// represented here; they arrive as [`StreamEvent::Error`](crate::StreamEvent)
/// events on the open stream instead.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request could not be serialized; nothing was sent.
    #[error("failed to encode request: {0}")]
    EncodeRequest(#[source] serde_json::Error),

    /// The server answered successfully but the body did not parse.
    #[error("failed to decode response: {0}")]
    DecodeResponse(#[source] serde_json::Error),

    #[error("failed to read response body: {0}")]
    ReadBody(#[source] std::io::Error),

    /// The call never produced a response at all.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Api { status: StatusCode, message: String },

    /// A stream terminated with an error event.
    #[error("stream failed: {0}")]
    Stream(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
