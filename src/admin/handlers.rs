use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    admin::dto::{AnnouncementBody, Pagination, SetBannedBody},
    admin::repo::create_announcement,
    auth::jwt::AuthUser,
    error::{ApiError, ApiJson},
    requests::dto::RequestResponse,
    requests::repo::SkillRequest,
    state::AppState,
    users::dto::ProfileResponse,
    users::repo::User,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", put(set_banned))
        .route("/admin/requests", get(list_all_requests))
        .route("/admin/announcements", post(post_announcement))
}

async fn require_admin(state: &AppState, caller: Uuid) -> Result<User, ApiError> {
    let user = User::find_by_id(&state.db, caller)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;
    if !user.is_admin {
        return Err(ApiError::Forbidden("Admin access required".into()));
    }
    Ok(user)
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<ProfileResponse>>, ApiError> {
    require_admin(&state, caller).await?;
    let (limit, offset) = p.clamped();
    let users = User::list_all(&state.db, limit, offset).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn list_all_requests(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<RequestResponse>>, ApiError> {
    require_admin(&state, caller).await?;
    let (limit, offset) = p.clamped();
    let rows = SkillRequest::list_all(&state.db, limit, offset).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Ban or unban a user. The target's requests are intentionally left in
/// whatever state they are in; banning only blocks future logins.
#[instrument(skip(state))]
pub async fn set_banned(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<SetBannedBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&state, caller).await?;

    let updated = User::set_banned(&state.db, id, body.banned).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!(target = %id, banned = body.banned, admin = %caller, "ban flag updated");
    Ok(Json(serde_json::json!({ "success": true })))
}

#[instrument(skip(state, body))]
pub async fn post_announcement(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ApiJson(body): ApiJson<AnnouncementBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    require_admin(&state, caller).await?;

    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::Validation("Message is required".into()));
    }

    let id = create_announcement(&state.db, message, caller).await?;
    info!(announcement_id = %id, admin = %caller, "announcement posted");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true })),
    ))
}
