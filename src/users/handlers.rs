use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiJson},
    state::AppState,
    users::dto::{
        normalize_skills, PageInfo, ProfileResponse, SearchParams, UpdateProfileRequest, UserPage,
        AVAILABILITIES,
    },
    users::repo::{ProfileChanges, User},
};

const PAGE_SIZE: i64 = 12;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(search_users))
        .route("/users/:id", get(get_user).put(update_user))
}

/// Public listing with naive substring search over name and skill lists.
/// Visibility filters run in SQL; the text match is linear over the fetched
/// set. No ranking.
#[instrument(skip(state))]
pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<UserPage>, ApiError> {
    let availability = params
        .availability
        .as_deref()
        .filter(|a| *a != "all" && !a.is_empty());

    let mut users = User::list_public(&state.db, availability).await?;

    if let Some(search) = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        users.retain(|u| matches_search(u, &needle));
    }

    let total = users.len() as i64;
    let pages = (total + PAGE_SIZE - 1) / PAGE_SIZE;
    let page = params.page.max(1);
    let start = ((page - 1) * PAGE_SIZE) as usize;

    let users: Vec<ProfileResponse> = users
        .into_iter()
        .skip(start)
        .take(PAGE_SIZE as usize)
        .map(Into::into)
        .collect();

    Ok(Json(UserPage {
        users,
        pagination: PageInfo { page, total, pages },
    }))
}

fn matches_search(user: &User, needle: &str) -> bool {
    user.name.to_lowercase().contains(needle)
        || user
            .skills_offered
            .iter()
            .any(|s| s.to_lowercase().contains(needle))
        || user
            .skills_wanted
            .iter()
            .any(|s| s.to_lowercase().contains(needle))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(user.into()))
}

/// Owner-only profile update. Privileged fields are unreachable: the DTO has
/// no email/password/isAdmin/isBanned fields to begin with.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if caller != id {
        return Err(ApiError::Forbidden("Forbidden".into()));
    }

    if let Some(availability) = payload.availability.as_deref() {
        if !AVAILABILITIES.contains(&availability) {
            return Err(ApiError::Validation("Invalid availability".into()));
        }
    }
    if let Some(name) = payload.name.as_deref() {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("Name cannot be empty".into()));
        }
    }

    let changes = ProfileChanges {
        name: payload.name.map(|n| n.trim().to_string()),
        profile_photo: payload.profile_photo,
        location: payload.location,
        availability: payload.availability,
        skills_offered: payload.skills_offered.map(normalize_skills),
        skills_wanted: payload.skills_wanted.map(normalize_skills),
        is_public: payload.is_public,
    };

    let updated = User::update_profile(&state.db, id, &changes).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!(user_id = %id, "profile updated");
    Ok(Json(serde_json::json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_user(name: &str, offered: &[&str], wanted: &[&str]) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "hash".into(),
            name: name.into(),
            profile_photo: None,
            location: None,
            availability: "available".into(),
            skills_offered: offered.iter().map(|s| s.to_string()).collect(),
            skills_wanted: wanted.iter().map(|s| s.to_string()).collect(),
            is_public: true,
            rating: 5.0,
            is_admin: false,
            is_banned: false,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        }
    }

    #[test]
    fn search_matches_name_case_insensitively() {
        let user = sample_user("Alice", &[], &[]);
        assert!(matches_search(&user, "ali"));
        assert!(!matches_search(&user, "bob"));
    }

    #[test]
    fn search_matches_substrings_of_either_skill_list() {
        let user = sample_user("Bob", &["Guitar Lessons"], &["Spanish"]);
        assert!(matches_search(&user, "guitar"));
        assert!(matches_search(&user, "span"));
        assert!(!matches_search(&user, "piano"));
    }

    #[test]
    fn profile_response_uses_camel_case_and_hides_hash() {
        let user = sample_user("Carol", &["Chess"], &[]);
        let json = serde_json::to_string(&ProfileResponse::from(user)).unwrap();
        assert!(json.contains("skillsOffered"));
        assert!(json.contains("isPublic"));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("passwordHash"));
    }
}
