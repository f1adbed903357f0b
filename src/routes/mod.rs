//! Router assembly.

mod category;
mod common;

pub use category::category_routes;
pub use common::common_routes;

use crate::config::Settings;
use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

/// Common routes at the root, category routes under `settings.api_namespace`, body size capped.
pub fn app(state: AppState, settings: &Settings) -> Router {
    let api = category_routes(state.clone());
    let router = Router::new().merge(common_routes(state));
    let router = match settings.api_namespace.trim_end_matches('/') {
        "" => router.merge(api),
        namespace => router.nest(namespace, api),
    };
    router.layer(RequestBodyLimitLayer::new(settings.body_limit_bytes))
}
