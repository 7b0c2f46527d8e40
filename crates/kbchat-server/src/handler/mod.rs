//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use kbchat_server::handler::routes;
//! use kbchat_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example(config: ServiceConfig) -> anyhow::Result<()> {
//! let state = ServiceState::from_config(&config).await?;
//! let router: axum::Router = routes(config.public_dir()).with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod chat;
mod error;
mod monitors;
pub mod request;
pub mod response;
mod sessions;

use std::path::Path;

use axum::Router;
use axum::handler::HandlerWithoutStateExt;
use axum::response::{IntoResponse, Response};
use tower_http::services::ServeDir;

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::ErrorResponse;
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes.
///
/// When `public_dir` is set, unmatched paths are served from it and fall
/// through to a JSON 404 when no file matches.
pub fn routes(public_dir: Option<&Path>) -> Router<ServiceState> {
    let router = Router::new()
        .merge(chat::routes())
        .merge(monitors::routes())
        .merge(sessions::routes());

    match public_dir {
        Some(public_dir) => {
            let assets = ServeDir::new(public_dir).fallback(handler.into_service());
            router.fallback_service(assets)
        }
        None => router.fallback(handler),
    }
}

#[cfg(test)]
pub(crate) mod test {
    use axum::Router;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use kbchat_rig::provider::mock::{MockCompletionModel, MockEmbeddingModel};
    use kbchat_rig::provider::{CompletionProvider, EmbeddingProvider};
    use kbchat_rig::{RigConfig, RigService};

    use crate::handler::routes;
    use crate::service::ServiceState;

    /// Returns a [`ServiceState`] with an empty knowledge base and `model`.
    pub async fn create_test_state(model: MockCompletionModel) -> anyhow::Result<ServiceState> {
        let docs = tempfile::tempdir()?;
        let config = RigConfig {
            docs_dir: docs.path().join("missing"),
            ..RigConfig::new("test-key")
        };

        let rig = RigService::with_providers(
            &config,
            CompletionProvider::mock(model),
            EmbeddingProvider::mock(MockEmbeddingModel::default()),
        )
        .await?;

        Ok(ServiceState::new(rig))
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub fn create_test_server_with_state(
        router: Router<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app = router.with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() -> anyhow::Result<()> {
        let state = create_test_state(MockCompletionModel::new(["ok"])).await?;
        let server = create_test_server_with_state(routes(None), state)?;

        let response = server.get("/missing").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<serde_json::Value>()["name"], "not_found");

        Ok(())
    }

    #[tokio::test]
    async fn serves_public_directory() -> anyhow::Result<()> {
        let public = tempfile::tempdir()?;
        std::fs::write(public.path().join("index.html"), "<h1>kbchat</h1>")?;

        let state = create_test_state(MockCompletionModel::new(["ok"])).await?;
        let server = create_test_server_with_state(routes(Some(public.path())), state)?;

        let response = server.get("/").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "<h1>kbchat</h1>");

        server.get("/health").await.assert_status_ok();
        server
            .get("/missing.js")
            .await
            .assert_status(StatusCode::NOT_FOUND);

        Ok(())
    }
}
