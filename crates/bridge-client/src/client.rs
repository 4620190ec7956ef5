//! The completion client: builds requests, routes them to a target, drives
//! the configured transport, and decodes what comes back.

use std::sync::Arc;

use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::errors::{ClientError, ClientResult};
use crate::models::discovery::{AgentInfo, AgentsResponse, ServiceInfo, ServicesResponse};
use crate::models::message::{CompletionRequest, CompletionResponse, ErrorResponse};
use crate::models::target::Target;
use crate::stream::{self, CompletionStream};
use crate::transport::{
    DirectTransport, PluginApi, RelayTransport, Request, Response, ServerApi, Transport,
};
use crate::BRIDGE_PLUGIN_ID;

/// A client for the AI bridge completion API.
///
/// The transport is chosen once at construction; concurrent calls against
/// one client are safe, as nothing mutable is shared between them.
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Client for code running inside the plugin sandbox.
    pub fn from_plugin(api: Arc<dyn PluginApi>) -> Self {
        Client::with_transport(Arc::new(RelayTransport::new(api)))
    }

    /// Client for the host server itself. `user_id` authenticates the
    /// internal requests this client makes.
    pub fn from_server<S: Into<String>>(api: Arc<dyn ServerApi>, user_id: S) -> Self {
        Client::with_transport(Arc::new(DirectTransport::new(api, user_id)))
    }

    /// Client over a caller-supplied transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Client { transport }
    }

    /// Request a completed answer in one round trip.
    pub async fn complete(
        &self,
        target: &Target,
        request: &CompletionRequest,
    ) -> ClientResult<String> {
        let response = self
            .post_json(completion_path(target, false), request, false)
            .await?;

        let status = response.status;
        let body = response.bytes().await.map_err(ClientError::ReadBody)?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let completion: CompletionResponse =
            serde_json::from_slice(&body).map_err(ClientError::DecodeResponse)?;
        Ok(completion.completion)
    }

    /// Request a streamed answer. The status code is validated before any
    /// stream is handed out: a rejected call comes back as an error here,
    /// never as an event.
    pub async fn complete_stream(
        &self,
        target: &Target,
        request: &CompletionRequest,
    ) -> ClientResult<CompletionStream> {
        let response = self
            .post_json(completion_path(target, true), request, true)
            .await?;

        if !response.status.is_success() {
            let status = response.status;
            let body = response.bytes().await.map_err(ClientError::ReadBody)?;
            return Err(api_error(status, &body));
        }

        Ok(stream::decode(response.into_body()))
    }

    /// List the agents the caller may route to. A `user_id` narrows the
    /// listing to what that user may access; an empty listing is a valid
    /// answer, not an error.
    pub async fn agents(&self, user_id: Option<&str>) -> ClientResult<Vec<AgentInfo>> {
        let listing: AgentsResponse = self.get_json(discovery_path("agents", user_id)).await?;
        Ok(listing.agents)
    }

    /// List the services the caller may route to, optionally narrowed to
    /// what `user_id` may access through its permitted agents.
    pub async fn services(&self, user_id: Option<&str>) -> ClientResult<Vec<ServiceInfo>> {
        let listing: ServicesResponse = self.get_json(discovery_path("services", user_id)).await?;
        Ok(listing.services)
    }

    async fn post_json(
        &self,
        path: String,
        request: &CompletionRequest,
        streaming: bool,
    ) -> ClientResult<Response> {
        let body = serde_json::to_vec(request).map_err(ClientError::EncodeRequest)?;
        let mut request = Request::post(path, body)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if streaming {
            request = request.header(ACCEPT, HeaderValue::from_static("text/event-stream"));
        }
        Ok(self.transport.execute(request).await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: String) -> ClientResult<T> {
        let response = self.transport.execute(Request::get(path)).await?;

        let status = response.status;
        let body = response.bytes().await.map_err(ClientError::ReadBody)?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        serde_json::from_slice(&body).map_err(ClientError::DecodeResponse)
    }
}

fn completion_path(target: &Target, streaming: bool) -> String {
    let mut path = format!(
        "/{}/bridge/v1/completion/{}/{}",
        BRIDGE_PLUGIN_ID,
        target.kind(),
        target.id()
    );
    if !streaming {
        path.push_str("/nostream");
    }
    path
}

fn discovery_path(resource: &str, user_id: Option<&str>) -> String {
    match user_id {
        Some(user_id) => format!(
            "/{}/bridge/v1/{}?user_id={}",
            BRIDGE_PLUGIN_ID, resource, user_id
        ),
        None => format!("/{}/bridge/v1/{}", BRIDGE_PLUGIN_ID, resource),
    }
}

/// Build the error for a non-success response: the structured message when
/// the body carries one, the raw body otherwise.
fn api_error(status: StatusCode, body: &[u8]) -> ClientError {
    let message = match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(error) => error.error,
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    };
    ClientError::Api { status, message }
}
