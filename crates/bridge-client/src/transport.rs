//! Transport strategy the client drives.
//!
//! Both variants expose the same capability, "execute one HTTP-shaped
//! request and produce a response", so the client is written once against
//! the [`Transport`] trait. [`DirectTransport`] dispatches through the host's
//! internal plugin router without a socket; [`RelayTransport`] forwards
//! through the narrow primitive a sandboxed plugin gets from its host.

mod direct;
mod relay;

pub use direct::{DirectTransport, ServerApi};
pub use relay::{PluginApi, RelayTransport};

use std::io;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use thiserror::Error;

/// Errors raised while moving a request, as opposed to errors the server
/// answered with.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TransportError {
    /// The relay produced no response at all.
    #[error("inter-plugin request returned no response")]
    NoResponse,

    /// Catch-all for caller-supplied transport implementations.
    #[error("transport failed: {0}")]
    Failed(String),
}

/// Incrementally delivered response body.
pub type BodyStream = BoxStream<'static, io::Result<Bytes>>;

/// An HTTP-shaped request. The path is absolute from the caller's point of
/// view, i.e. it starts with the destination plugin's ID segment.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Request {
    pub fn new<S: Into<String>>(method: Method, path: S) -> Self {
        Request {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn get<S: Into<String>>(path: S) -> Self {
        Request::new(Method::GET, path)
    }

    pub fn post<S: Into<String>, B: Into<Bytes>>(path: S, body: B) -> Self {
        let mut request = Request::new(Method::POST, path);
        request.body = body.into();
        request
    }

    /// Set a header, replacing any previous value
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// An HTTP-shaped response whose body can be read incrementally.
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    body: BodyStream,
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &"<stream>")
            .finish()
    }
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: BodyStream) -> Self {
        Response {
            status,
            headers,
            body,
        }
    }

    /// Response over a fully buffered body
    pub fn from_bytes<B: Into<Bytes>>(status: StatusCode, body: B) -> Self {
        let body = body.into();
        Response::new(
            status,
            HeaderMap::new(),
            stream::once(async move { Ok(body) }).boxed(),
        )
    }

    /// Drain the whole body into one buffer
    pub async fn bytes(self) -> io::Result<Bytes> {
        let mut body = self.body;
        let mut collected = BytesMut::new();
        while let Some(chunk) = body.next().await {
            collected.extend_from_slice(&chunk?);
        }
        Ok(collected.freeze())
    }

    /// Release the body for streaming consumption
    pub fn into_body(self) -> BodyStream {
        self.body
    }
}

/// In-memory stand-in for the response writer a real server would hand the
/// plugin router. Starts out as an empty 200 response, like an untouched
/// response writer.
#[derive(Debug)]
pub struct ResponseRecorder {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        ResponseRecorder {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
        }
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Append a chunk to the recorded body
    pub fn write(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }

    pub fn into_response(self) -> Response {
        let body = self.body.freeze();
        Response::new(
            self.status,
            self.headers,
            stream::once(async move { Ok(body) }).boxed(),
        )
    }
}

impl Default for ResponseRecorder {
    fn default() -> Self {
        ResponseRecorder::new()
    }
}

/// A way to execute one HTTP call against the bridge plugin.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response, TransportError>;
}
