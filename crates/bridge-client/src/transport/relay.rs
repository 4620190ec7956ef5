use std::sync::Arc;

use async_trait::async_trait;

use super::{Request, Response, Transport, TransportError};

/// The narrow capability a sandboxed plugin gets from its host: ask it to
/// forward one HTTP request to the plugin named by the request path.
#[async_trait]
pub trait PluginApi: Send + Sync {
    /// Forward `request` and hand back whatever came out the other side.
    /// `None` means the host could not complete the call; it is never a
    /// valid empty response.
    async fn plugin_http(&self, request: Request) -> Option<Response>;
}

/// Transport for callers running inside the plugin sandbox.
pub struct RelayTransport {
    api: Arc<dyn PluginApi>,
}

impl RelayTransport {
    pub fn new(api: Arc<dyn PluginApi>) -> Self {
        RelayTransport { api }
    }
}

#[async_trait]
impl Transport for RelayTransport {
    async fn execute(&self, request: Request) -> Result<Response, TransportError> {
        tracing::debug!("relaying {} {} through plugin host", request.method, request.path);
        self.api
            .plugin_http(request)
            .await
            .ok_or(TransportError::NoResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use http::StatusCode;

    struct StubHost {
        answer: bool,
    }

    #[async_trait]
    impl PluginApi for StubHost {
        async fn plugin_http(&self, request: Request) -> Option<Response> {
            assert_eq!(request.path, "/ai-bridge/bridge/v1/agents");
            self.answer
                .then(|| Response::from_bytes(StatusCode::OK, r#"{"agents":[]}"#))
        }
    }

    #[tokio::test]
    async fn test_relay_passes_response_through() -> Result<()> {
        let transport = RelayTransport::new(Arc::new(StubHost { answer: true }));
        let response = transport
            .execute(Request::get("/ai-bridge/bridge/v1/agents"))
            .await?;
        assert_eq!(response.status, StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_absent_response_is_a_transport_failure() {
        let transport = RelayTransport::new(Arc::new(StubHost { answer: false }));
        let err = transport
            .execute(Request::get("/ai-bridge/bridge/v1/agents"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::NoResponse));
    }
}
