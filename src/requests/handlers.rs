use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::{is_unique_violation, ApiError, ApiJson},
    requests::dto::{CreateRequestBody, CreatedRequestResponse, RequestResponse, RespondBody},
    requests::repo::{NewSkillRequest, SkillRequest},
    state::AppState,
    users::repo::User,
};

// One message per operation for every failed precondition, so a caller
// cannot tell "wrong recipient" from "already responded" from "no such id".
const RESPOND_NOT_FOUND: &str = "Request not found or already responded";
const DELETE_NOT_FOUND: &str = "Request not found or cannot be deleted";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests", post(create_request).get(list_requests))
        .route("/requests/:id", put(respond_request).delete(delete_request))
}

/// Create a pending swap request from the caller to another user,
/// snapshotting both parties' display data.
#[instrument(skip(state, body))]
pub async fn create_request(
    State(state): State<AppState>,
    AuthUser(sender_id): AuthUser,
    ApiJson(body): ApiJson<CreateRequestBody>,
) -> Result<(StatusCode, Json<CreatedRequestResponse>), ApiError> {
    let offered_skill = body.offered_skill.trim().to_string();
    let wanted_skill = body.wanted_skill.trim().to_string();
    if offered_skill.is_empty() || wanted_skill.is_empty() {
        return Err(ApiError::Validation("Missing required fields".into()));
    }
    if body.recipient_id == sender_id {
        return Err(ApiError::SelfReference);
    }

    let recipient = User::find_by_id(&state.db, body.recipient_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipient not found".into()))?;
    let sender = User::find_by_id(&state.db, sender_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    if SkillRequest::pending_exists(&state.db, sender_id, body.recipient_id).await? {
        return Err(ApiError::Conflict(
            "You already have a pending request with this user".into(),
        ));
    }

    let new = NewSkillRequest {
        sender_id,
        recipient_id: recipient.id,
        offered_skill,
        wanted_skill,
        message: body.message.as_deref().map(str::trim).unwrap_or("").to_string(),
        sender_name: sender.name,
        sender_photo: sender.profile_photo,
        recipient_name: recipient.name,
        recipient_photo: recipient.profile_photo,
    };

    // The existence check above races with concurrent creators; the partial
    // unique index settles it.
    let request = match SkillRequest::create(&state.db, &new).await {
        Ok(r) => r,
        Err(e) if is_unique_violation(&e) => {
            warn!(%sender_id, recipient_id = %new.recipient_id, "pending request race lost");
            return Err(ApiError::Conflict(
                "You already have a pending request with this user".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    info!(request_id = %request.id, %sender_id, recipient_id = %request.recipient_id, "request created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedRequestResponse {
            request_id: request.id,
        }),
    ))
}

/// Accept or reject. The match and the write are one conditional update; any
/// failed precondition (absent id, caller not the recipient, already
/// responded) comes back as the same NotFound on purpose.
#[instrument(skip(state, body))]
pub async fn respond_request(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<RespondBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let response_message = body
        .response_message
        .as_deref()
        .map(str::trim)
        .unwrap_or("");

    let transitioned =
        SkillRequest::respond(&state.db, id, caller, body.status.as_str(), response_message)
            .await?;
    if !transitioned {
        return Err(ApiError::NotFound(RESPOND_NOT_FOUND.into()));
    }

    info!(request_id = %id, decision = body.status.as_str(), "request responded");
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Withdraw a pending request. Either party may delete it; resolved requests
/// are immutable. Same collapsed NotFound as `respond_request`.
#[instrument(skip(state))]
pub async fn delete_request(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = SkillRequest::delete_pending(&state.db, id, caller).await?;
    if !deleted {
        return Err(ApiError::NotFound(DELETE_NOT_FOUND.into()));
    }

    info!(request_id = %id, "request deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}

#[instrument(skip(state))]
pub async fn list_requests(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<RequestResponse>>, ApiError> {
    let rows = SkillRequest::list_for(&state.db, caller).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequest;

    #[test]
    fn collapsed_not_found_does_not_disclose_the_failed_precondition() {
        let respond = ApiError::NotFound(RESPOND_NOT_FOUND.into());
        let delete = ApiError::NotFound(DELETE_NOT_FOUND.into());
        assert_eq!(respond.status(), StatusCode::NOT_FOUND);
        assert_eq!(delete.status(), StatusCode::NOT_FOUND);
        for msg in [RESPOND_NOT_FOUND, DELETE_NOT_FOUND] {
            let lower = msg.to_lowercase();
            assert!(!lower.contains("recipient"));
            assert!(!lower.contains("sender"));
            assert!(!lower.contains("pending"));
        }
    }

    #[tokio::test]
    async fn invalid_decision_maps_to_validation_error() {
        let req = axum::http::Request::builder()
            .method("PUT")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(r#"{"status":"pending"}"#))
            .expect("request");
        let err = ApiJson::<RespondBody>::from_request(req, &())
            .await
            .expect_err("pending is not a decision");
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_maps_to_validation_error() {
        let req = axum::http::Request::builder()
            .method("POST")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{not json"))
            .expect("request");
        let err = ApiJson::<CreateRequestBody>::from_request(req, &())
            .await
            .expect_err("body is not json");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
