use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
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

/// Caller-settable profile fields. Email, password and the privileged flags
/// have no column here, so a profile update cannot touch them.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub profile_photo: Option<String>,
    pub location: Option<String>,
    pub availability: Option<String>,
    pub skills_offered: Option<Vec<String>>,
    pub skills_wanted: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

const USER_COLUMNS: &str = r#"id, email, password_hash, name, profile_photo, location,
       availability, skills_offered, skills_wanted, is_public, rating,
       is_admin, is_banned, created_at, updated_at"#;

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a user with sign-up defaults: available, empty skill lists,
    /// public profile, rating 5, no privileges.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .fetch_one(db)
        .await
    }

    /// Apply the provided profile fields, leaving the rest untouched, and
    /// stamp updated_at. Returns false when no such user exists.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                profile_photo = COALESCE($3, profile_photo),
                location = COALESCE($4, location),
                availability = COALESCE($5, availability),
                skills_offered = COALESCE($6, skills_offered),
                skills_wanted = COALESCE($7, skills_wanted),
                is_public = COALESCE($8, is_public),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.profile_photo.as_deref())
        .bind(changes.location.as_deref())
        .bind(changes.availability.as_deref())
        .bind(changes.skills_offered.clone())
        .bind(changes.skills_wanted.clone())
        .bind(changes.is_public)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Admin ban toggle. Existing requests of the target are left alone.
    pub async fn set_banned(db: &PgPool, id: Uuid, banned: bool) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_banned = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(banned)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Everyone visible in the public listing: public, not banned, optionally
    /// narrowed by availability. The substring search runs over this set in
    /// the handler.
    pub async fn list_public(
        db: &PgPool,
        availability: Option<&str>,
    ) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE is_public = TRUE
              AND is_banned = FALSE
              AND ($1::text IS NULL OR availability = $1)
            ORDER BY lower(name)
            "#
        ))
        .bind(availability)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Admin view: every user, banned and private included.
    pub async fn list_all(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
