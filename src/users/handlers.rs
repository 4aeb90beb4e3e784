use super::error::ApiError;
use super::store::UserStore;
use super::types::{StatusResponse, UserId, UserPayload, UserRecord};

use axum::{
    Extension, Json,
    body::Bytes,
    extract::Path,
    http::{HeaderMap, StatusCode, Uri, header},
};
use std::sync::Arc;

pub async fn handle_status() -> (StatusCode, Json<StatusResponse>) {
    (
        StatusCode::OK,
        Json(StatusResponse {
            message: "Server is running".to_string(),
        }),
    )
}

pub async fn handle_list_users(
    Extension(store): Extension<Arc<UserStore>>,
) -> (StatusCode, Json<Vec<UserRecord>>) {
    (StatusCode::OK, Json(store.list()))
}

pub async fn handle_get_user(
    Extension(store): Extension<Arc<UserStore>>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<UserRecord>), ApiError> {
    let user_id = UserId::parse(&user_id)?;

    match store.get(&user_id) {
        Some(user) => Ok((StatusCode::OK, Json(user))),
        None => {
            tracing::debug!("User {} not found", user_id);
            Err(ApiError::UserNotFound)
        }
    }
}

pub async fn handle_create_user(
    Extension(store): Extension<Arc<UserStore>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<UserRecord>), ApiError> {
    let draft = read_payload(&headers, &body)?.into_draft()?;
    let user = store.insert(draft);

    tracing::info!("Created user {} ({})", user.id, user.username);

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn handle_update_user(
    Extension(store): Extension<Arc<UserStore>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<UserRecord>), ApiError> {
    let user_id = UserId::parse(&user_id)?;

    if !store.contains(&user_id) {
        return Err(ApiError::UserNotFound);
    }

    let draft = read_payload(&headers, &body)?.into_draft()?;

    // The record may have been deleted by a concurrent request since the check.
    let user = store
        .replace(&user_id, draft)
        .ok_or(ApiError::UserNotFound)?;

    tracing::info!("Updated user {}", user.id);

    Ok((StatusCode::OK, Json(user)))
}

pub async fn handle_delete_user(
    Extension(store): Extension<Arc<UserStore>>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user_id = UserId::parse(&user_id)?;

    match store.remove(&user_id) {
        Some(user) => {
            tracing::info!("Deleted user {}", user.id);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::UserNotFound),
    }
}

pub async fn handle_not_found(uri: Uri) -> ApiError {
    tracing::debug!("No route for {}", uri);
    ApiError::EndpointNotFound
}

/// Bodies are only read when declared as JSON. Anything else is treated as an
/// empty object, so the request fails the required-field check.
fn read_payload(headers: &HeaderMap, body: &[u8]) -> Result<UserPayload, ApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"));

    if !is_json {
        tracing::debug!("Ignoring request body without a JSON content type");
        return Ok(UserPayload::default());
    }

    UserPayload::from_body(body)
}
