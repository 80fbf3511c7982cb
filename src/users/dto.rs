use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::User;

pub const AVAILABILITIES: [&str; 3] = ["available", "busy", "unavailable"];

/// Profile as rendered to clients. Built from a [`User`] row; the password
/// hash has no field here.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub profile_photo: Option<String>,
    pub location: Option<String>,
    pub availability: String,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub is_public: bool,
    pub rating: f64,
    pub is_admin: bool,
    pub is_banned: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

impl From<User> for ProfileResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            profile_photo: u.profile_photo,
            location: u.location,
            availability: u.availability,
            skills_offered: u.skills_offered,
            skills_wanted: u.skills_wanted,
            is_public: u.is_public,
            rating: u.rating,
            is_admin: u.is_admin,
            is_banned: u.is_banned,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Profile update body. Only non-privileged fields exist here; extra JSON
/// keys (email, password, isAdmin, isBanned, ...) are dropped on
/// deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub profile_photo: Option<String>,
    pub location: Option<String>,
    pub availability: Option<String>,
    pub skills_offered: Option<Vec<String>>,
    pub skills_wanted: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

/// Query parameters for the public listing.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub total: i64,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
pub struct UserPage {
    pub users: Vec<ProfileResponse>,
    pub pagination: PageInfo,
}

/// Trim entries, drop blanks, and de-duplicate case-insensitively keeping
/// the first occurrence. Adding the same skill twice is a no-op.
pub fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for skill in skills {
        let trimmed = skill.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(trimmed.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_skills_is_idempotent_for_repeated_adds() {
        let once = normalize_skills(vec!["Guitar".into(), "Spanish".into()]);
        let twice = normalize_skills(vec![
            "Guitar".into(),
            "Spanish".into(),
            "Guitar".into(),
            "guitar".into(),
        ]);
        assert_eq!(once, twice);
        assert_eq!(twice, vec!["Guitar".to_string(), "Spanish".to_string()]);
    }

    #[test]
    fn normalize_skills_trims_and_drops_blanks() {
        let skills = normalize_skills(vec![
            "  Guitar ".into(),
            "".into(),
            "   ".into(),
            "Cooking".into(),
        ]);
        assert_eq!(skills, vec!["Guitar".to_string(), "Cooking".to_string()]);
    }

    #[test]
    fn normalize_skills_keeps_first_occurrence_order() {
        let skills = normalize_skills(vec![
            "Piano".into(),
            "Chess".into(),
            "piano".into(),
            "Yoga".into(),
        ]);
        assert_eq!(
            skills,
            vec!["Piano".to_string(), "Chess".to_string(), "Yoga".to_string()]
        );
    }

    #[test]
    fn update_request_ignores_privileged_keys() {
        let json = r#"{
            "name": "Alice",
            "email": "evil@example.com",
            "password": "hacked",
            "isAdmin": true,
            "isBanned": false,
            "skillsOffered": ["Guitar"]
        }"#;
        let req: UpdateProfileRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.name.as_deref(), Some("Alice"));
        assert_eq!(req.skills_offered, Some(vec!["Guitar".to_string()]));
        // There is nowhere for email/password/isAdmin/isBanned to land.
    }

    #[test]
    fn search_params_default_to_page_one() {
        let params: SearchParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert!(params.search.is_none());
        assert!(params.availability.is_none());
    }
}
