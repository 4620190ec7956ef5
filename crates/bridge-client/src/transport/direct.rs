use std::sync::Arc;

use async_trait::async_trait;

use super::{Request, Response, ResponseRecorder, Transport, TransportError};
use crate::{BRIDGE_PLUGIN_ID, SERVER_SOURCE_ID};

/// The host server's internal plugin router.
#[async_trait]
pub trait ServerApi: Send + Sync {
    /// Route `request` to `dest_plugin_id` on behalf of `user_id`, writing
    /// the plugin's output into `recorder`. The router expects paths
    /// relative to the destination plugin's API root.
    async fn serve_plugin_request(
        &self,
        user_id: &str,
        recorder: &mut ResponseRecorder,
        request: Request,
        source_plugin_id: &str,
        dest_plugin_id: &str,
    );
}

/// Transport for the host server itself; requests never touch a socket.
pub struct DirectTransport {
    api: Arc<dyn ServerApi>,
    user_id: String,
}

impl DirectTransport {
    /// `user_id` identifies the acting user for the lifetime of this
    /// transport; the router authenticates internal requests with it.
    pub fn new<S: Into<String>>(api: Arc<dyn ServerApi>, user_id: S) -> Self {
        DirectTransport {
            api,
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl Transport for DirectTransport {
    async fn execute(&self, mut request: Request) -> Result<Response, TransportError> {
        // The router expects destination-relative paths, so the sender's own
        // leading segment has to go.
        request.path = strip_first_segment(&request.path);
        tracing::debug!(
            "dispatching {} {} through the plugin router",
            request.method,
            request.path
        );

        let mut recorder = ResponseRecorder::new();
        self.api
            .serve_plugin_request(
                &self.user_id,
                &mut recorder,
                request,
                SERVER_SOURCE_ID,
                BRIDGE_PLUGIN_ID,
            )
            .await;
        Ok(recorder.into_response())
    }
}

/// Drop the first path segment: `/ai-bridge/bridge/v1/x` becomes
/// `/bridge/v1/x`. A path with a single segment collapses to `/`.
fn strip_first_segment(path: &str) -> String {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    match trimmed.find('/') {
        Some(second_slash) => trimmed[second_slash..].to_string(),
        None => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use bytes::Bytes;
    use http::StatusCode;
    use std::sync::Mutex;

    #[test]
    fn test_strip_first_segment() {
        assert_eq!(
            strip_first_segment("/ai-bridge/bridge/v1/agents"),
            "/bridge/v1/agents"
        );
        assert_eq!(
            strip_first_segment("/ai-bridge/bridge/v1/agents?user_id=u1"),
            "/bridge/v1/agents?user_id=u1"
        );
        assert_eq!(strip_first_segment("/ai-bridge"), "/");
        assert_eq!(strip_first_segment("/"), "/");
        assert_eq!(strip_first_segment(""), "/");
    }

    #[derive(Default)]
    struct StubRouter {
        seen: Mutex<Vec<(String, String, String, String)>>,
    }

    #[async_trait]
    impl ServerApi for StubRouter {
        async fn serve_plugin_request(
            &self,
            user_id: &str,
            recorder: &mut ResponseRecorder,
            request: Request,
            source_plugin_id: &str,
            dest_plugin_id: &str,
        ) {
            self.seen.lock().unwrap().push((
                user_id.to_string(),
                request.path.clone(),
                source_plugin_id.to_string(),
                dest_plugin_id.to_string(),
            ));
            recorder.set_status(StatusCode::OK);
            recorder.write(b"routed");
        }
    }

    #[tokio::test]
    async fn test_dispatch_rewrites_path_and_forwards_identity() -> Result<()> {
        let router = Arc::new(StubRouter::default());
        let transport = DirectTransport::new(router.clone(), "admin1");

        let response = transport
            .execute(Request::get("/ai-bridge/bridge/v1/services"))
            .await?;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.bytes().await?, Bytes::from("routed"));

        let seen = router.seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            &[(
                "admin1".to_string(),
                "/bridge/v1/services".to_string(),
                SERVER_SOURCE_ID.to_string(),
                BRIDGE_PLUGIN_ID.to_string(),
            )]
        );
        Ok(())
    }
}
