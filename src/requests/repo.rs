use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Swap request record. The sender/recipient name and photo columns are
/// snapshots taken at creation and never refreshed; later profile edits do
/// not show up here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillRequest {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub offered_skill: String,
    pub wanted_skill: String,
    pub message: String,
    pub status: String,
    pub response_message: Option<String>,
    pub sender_name: String,
    pub sender_photo: Option<String>,
    pub recipient_name: String,
    pub recipient_photo: Option<String>,
    pub created_at: OffsetDateTime,
    pub responded_at: Option<OffsetDateTime>,
}

pub struct NewSkillRequest {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub offered_skill: String,
    pub wanted_skill: String,
    pub message: String,
    pub sender_name: String,
    pub sender_photo: Option<String>,
    pub recipient_name: String,
    pub recipient_photo: Option<String>,
}

const REQUEST_COLUMNS: &str = r#"id, sender_id, recipient_id, offered_skill, wanted_skill,
       message, status, response_message, sender_name, sender_photo,
       recipient_name, recipient_photo, created_at, responded_at"#;

// The transition and deletion statements are the whole concurrency story:
// each one matches on the current status and mutates in the same statement,
// so the database decides the winner between concurrent callers.
const RESPOND_SQL: &str = r#"
    UPDATE requests
    SET status = $3, response_message = $4, responded_at = now()
    WHERE id = $1 AND recipient_id = $2 AND status = 'pending'
    "#;

const DELETE_PENDING_SQL: &str = r#"
    DELETE FROM requests
    WHERE id = $1
      AND status = 'pending'
      AND (sender_id = $2 OR recipient_id = $2)
    "#;

fn insert_sql() -> String {
    format!(
        r#"
        INSERT INTO requests
            (sender_id, recipient_id, offered_skill, wanted_skill, message,
             status, sender_name, sender_photo, recipient_name, recipient_photo)
        VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8, $9)
        RETURNING {REQUEST_COLUMNS}
        "#
    )
}

fn list_for_sql() -> String {
    format!(
        r#"
        SELECT {REQUEST_COLUMNS}
        FROM requests
        WHERE sender_id = $1 OR recipient_id = $1
        ORDER BY created_at DESC
        "#
    )
}

impl SkillRequest {
    pub async fn pending_exists(
        db: &PgPool,
        sender_id: Uuid,
        recipient_id: Uuid,
    ) -> anyhow::Result<bool> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM requests
            WHERE sender_id = $1 AND recipient_id = $2 AND status = 'pending'
            "#,
        )
        .bind(sender_id)
        .bind(recipient_id)
        .fetch_optional(db)
        .await?;
        Ok(row.is_some())
    }

    /// Insert a new pending request. A racing duplicate trips the partial
    /// unique index and surfaces as a sqlx unique-violation.
    pub async fn create(db: &PgPool, new: &NewSkillRequest) -> Result<SkillRequest, sqlx::Error> {
        sqlx::query_as::<_, SkillRequest>(&insert_sql())
            .bind(new.sender_id)
            .bind(new.recipient_id)
            .bind(&new.offered_skill)
            .bind(&new.wanted_skill)
            .bind(&new.message)
            .bind(&new.sender_name)
            .bind(new.sender_photo.as_deref())
            .bind(&new.recipient_name)
            .bind(new.recipient_photo.as_deref())
            .fetch_one(db)
            .await
    }

    /// The one transition in the state machine, as a single compare-and-set:
    /// the row must still be pending and addressed to the caller. Of two
    /// concurrent responders exactly one sees a row to match; the other gets
    /// zero rows affected. Returns true when the transition applied.
    pub async fn respond(
        db: &PgPool,
        id: Uuid,
        recipient_id: Uuid,
        status: &str,
        response_message: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(RESPOND_SQL)
            .bind(id)
            .bind(recipient_id)
            .bind(status)
            .bind(response_message)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Conditional delete: only a still-pending request, and only by one of
    /// its two participants. One statement, same atomicity as `respond`.
    pub async fn delete_pending(db: &PgPool, id: Uuid, caller: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(DELETE_PENDING_SQL)
            .bind(id)
            .bind(caller)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Everything the user is a party to, newest first.
    pub async fn list_for(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<SkillRequest>> {
        let rows = sqlx::query_as::<_, SkillRequest>(&list_for_sql())
            .bind(user_id)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    /// Admin view over all requests.
    pub async fn list_all(
        db: &PgPool,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<SkillRequest>> {
        let rows = sqlx::query_as::<_, SkillRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM requests
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
