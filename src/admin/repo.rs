use sqlx::PgPool;
use uuid::Uuid;

/// Store an announcement stamped with the admin who posted it. Delivery to
/// users is out of scope; the record is the contract.
pub async fn create_announcement(
    db: &PgPool,
    message: &str,
    created_by: Uuid,
) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO announcements (message, created_by)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(message)
    .bind(created_by)
    .fetch_one(db)
    .await?;
    Ok(id)
}
