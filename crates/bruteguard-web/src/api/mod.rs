mod attempts;
mod lists;

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let max_body_bytes = state.config.server.max_body_bytes;

    Router::new()
        .route("/authorize", post(attempts::authorize))
        .route("/reset", post(attempts::reset))
        .route(
            "/lists/{list}",
            get(lists::list).post(lists::add).delete(lists::remove),
        )
        .route("/lists/{list}/check", get(lists::check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body_bytes)),
        )
        .with_state(state)
}
