//! Client library for the completion API served by the AI bridge plugin.
//!
//! The same [`Client`] works from two very different call sites: a sandboxed
//! plugin, which can only ask its host to forward HTTP requests on its
//! behalf, and the host server itself, which dispatches requests straight to
//! the plugin router without touching a socket. Pick the constructor that
//! matches where the code runs; everything past construction is identical.

pub mod client;
pub mod errors;
pub mod models;
pub mod stream;
pub mod transport;

pub use client::Client;
pub use errors::{ClientError, ClientResult};
pub use models::discovery::{AgentInfo, ServiceInfo};
pub use models::event::StreamEvent;
pub use models::message::{CompletionRequest, CompletionResponse, Message, Role};
pub use models::target::Target;
pub use stream::CompletionStream;
pub use transport::{
    BodyStream, DirectTransport, PluginApi, RelayTransport, Request, Response, ResponseRecorder,
    ServerApi, Transport, TransportError,
};

/// Plugin ID of the AI bridge plugin that serves the completion API.
pub const BRIDGE_PLUGIN_ID: &str = "ai-bridge";

/// Source ID the host server presents when it originates a bridge request
/// itself rather than on behalf of another plugin.
pub(crate) const SERVER_SOURCE_ID: &str = "host-server";
