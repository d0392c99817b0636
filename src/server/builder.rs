//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::{EntityDescriptor, EntityRegistry};
use super::exposure::RestExposure;
use crate::core::auth::{AuthProvider, HeaderAuthProvider, SharedAuthProvider};
use crate::core::error::ConfigError;
use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the admin HTTP server
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(InMemoryOrderStore::new());
/// ServerBuilder::new()
///     .register_entity(OrderDescriptor::new(OrderService::with_default_access(store)))
///     .serve("127.0.0.1:3000".parse()?)
///     .await?;
/// ```
pub struct ServerBuilder {
    auth_provider: Option<Arc<dyn AuthProvider>>,
    entity_registry: EntityRegistry,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            auth_provider: None,
            entity_registry: EntityRegistry::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Replace the default [`HeaderAuthProvider`]
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth_provider = Some(Arc::new(provider));
        self
    }

    /// Add a list and its routes
    pub fn register_entity(mut self, descriptor: impl EntityDescriptor + 'static) -> Self {
        self.entity_registry.register(Box::new(descriptor));
        self
    }

    /// Add routes that are not part of any list
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the final REST router
    ///
    /// Fails when no list was registered.
    pub fn build(self) -> Result<Router> {
        if self.entity_registry.is_empty() {
            return Err(ConfigError::Invalid {
                message: "no lists registered; call .register_entity()".to_string(),
            }
            .into());
        }

        let provider = self
            .auth_provider
            .unwrap_or_else(|| Arc::new(HeaderAuthProvider) as Arc<dyn AuthProvider>);

        tracing::debug!(lists = ?self.entity_registry.entity_types(), "building router");

        Ok(RestExposure::build_router(
            self.entity_registry.build_routes(),
            self.custom_routes,
            SharedAuthProvider(provider),
        ))
    }

    /// Serve the application with graceful shutdown on SIGTERM or Ctrl+C
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::AuthContext;
    use crate::core::error::RequestError;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{HeaderMap, Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    struct StubList;

    impl EntityDescriptor for StubList {
        fn entity_type(&self) -> &str {
            "member"
        }

        fn plural(&self) -> &str {
            "members"
        }

        fn build_routes(&self) -> Router {
            Router::new().route("/members", get(|| async { "[]" }))
        }
    }

    struct AnonymousOnly;

    #[async_trait]
    impl AuthProvider for AnonymousOnly {
        async fn extract_context(&self, _headers: &HeaderMap) -> Result<AuthContext, RequestError> {
            Ok(AuthContext::Anonymous)
        }
    }

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ServerBuilder::default();
        assert!(builder.auth_provider.is_none());
        assert!(builder.entity_registry.is_empty());
        assert!(builder.custom_routes.is_empty());
    }

    #[test]
    fn test_build_without_lists_fails() {
        let err = ServerBuilder::new().build().unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_fluent_chaining_full_pipeline() {
        let builder = ServerBuilder::new()
            .with_auth_provider(AnonymousOnly)
            .register_entity(StubList)
            .with_custom_routes(Router::new().route("/version", get(|| async { "1" })));

        assert!(builder.auth_provider.is_some());
        assert_eq!(builder.entity_registry.entity_types(), vec!["member"]);
        assert_eq!(builder.custom_routes.len(), 1);
        assert!(builder.build().is_ok());
    }

    #[tokio::test]
    async fn test_built_router_serves_health_and_lists() {
        let app = ServerBuilder::new().register_entity(StubList).build().unwrap();

        for path in ["/health", "/healthz", "/members"] {
            let response = app
                .clone()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "GET {}", path);
        }
    }
}
