//! REST exposure
//!
//! Assembles the final Axum router: health checks, the routes of every
//! registered list, custom routes, the auth provider extension and request
//! tracing.

use crate::core::auth::SharedAuthProvider;
use axum::{Extension, Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

pub struct RestExposure;

impl RestExposure {
    pub fn build_router(
        list_routes: Router,
        custom_routes: Vec<Router>,
        auth: SharedAuthProvider,
    ) -> Router {
        let app = custom_routes
            .into_iter()
            .fold(Self::health_routes().merge(list_routes), |app, routes| {
                app.merge(routes)
            });

        app.layer(Extension(auth)).layer(TraceLayer::new_for_http())
    }

    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
        }))
    }
}
