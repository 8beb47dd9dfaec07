use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::NutritionInfo;

#[derive(Debug, Clone, FromRow)]
pub struct MealLogEntry {
    pub id: i64,
    pub meal: Json<NutritionInfo>,
    pub photo_key: Option<String>,
    pub logged_at: OffsetDateTime,
}

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    meal: &NutritionInfo,
    photo_key: Option<&str>,
    logged_at: OffsetDateTime,
) -> anyhow::Result<MealLogEntry> {
    let row = sqlx::query_as::<_, MealLogEntry>(
        r#"
        INSERT INTO meal_log_entries (user_id, meal, photo_key, logged_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, meal, photo_key, logged_at
        "#,
    )
    .bind(user_id)
    .bind(Json(meal))
    .bind(photo_key)
    .bind(logged_at)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<MealLogEntry>> {
    let rows = sqlx::query_as::<_, MealLogEntry>(
        r#"
        SELECT id, meal, photo_key, logged_at
        FROM meal_log_entries
        WHERE user_id = $1
        ORDER BY logged_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, user_id: Uuid, id: i64) -> anyhow::Result<Option<MealLogEntry>> {
    let row = sqlx::query_as::<_, MealLogEntry>(
        r#"
        SELECT id, meal, photo_key, logged_at
        FROM meal_log_entries
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Deletes the entry and hands back its photo key, `None` if nothing matched.
pub async fn delete(
    db: &PgPool,
    user_id: Uuid,
    id: i64,
) -> anyhow::Result<Option<Option<String>>> {
    let row = sqlx::query_as::<_, (Option<String>,)>(
        r#"
        DELETE FROM meal_log_entries
        WHERE id = $1 AND user_id = $2
        RETURNING photo_key
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(|(key,)| key))
}
