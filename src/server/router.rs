use crate::users::error::INTERNAL_ERROR_MESSAGE;
use crate::users::handlers::*;
use crate::users::store::UserStore;
use crate::users::types::ErrorResponse;

use axum::{
    Extension, Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Public endpoint for liveness checks.
pub const ENDPOINT_STATUS: &str = "/";
/// Collection endpoint (list, create).
pub const ENDPOINT_USERS: &str = "/api/users";
/// Item endpoint (read, replace, delete).
pub const ENDPOINT_USER: &str = "/api/users/:user_id";

/// Builds the HTTP surface over the given store.
///
/// Unknown paths and unsupported methods on known paths both answer
/// `404 Endpoint not found`.
pub fn router(store: Arc<UserStore>) -> Router {
    with_middleware(routes(), store)
}

/// The route table alone, with no store, fallback or layers attached.
pub(super) fn routes() -> Router {
    let router = Router::new().route(
        ENDPOINT_STATUS,
        get(handle_status).fallback(handle_not_found),
    );

    let router = route_lenient(
        router,
        ENDPOINT_USERS,
        get(handle_list_users)
            .post(handle_create_user)
            .fallback(handle_not_found),
    );

    route_lenient(
        router,
        ENDPOINT_USER,
        get(handle_get_user)
            .put(handle_update_user)
            .delete(handle_delete_user)
            .fallback(handle_not_found),
    )
}

/// Wraps `routes` with the endpoint fallback, the store and the
/// request-level layers. Every route added before this call is covered.
pub(super) fn with_middleware(routes: Router, store: Arc<UserStore>) -> Router {
    routes
        .fallback(handle_not_found)
        .layer(Extension(store))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

/// Registers `path` and `path/` alike; a single trailing slash is not significant.
fn route_lenient(router: Router, path: &str, method_router: MethodRouter) -> Router {
    router
        .route(&format!("{}/", path), method_router.clone())
        .route(path, method_router)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: INTERNAL_ERROR_MESSAGE.to_string(),
        }),
    )
        .into_response()
}
