use serde::Serialize;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::NutritionInfo;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SavedMeal {
    pub id: i64,
    pub meal: Json<NutritionInfo>,
    pub source: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    meal: &NutritionInfo,
    source: Option<&str>,
) -> anyhow::Result<SavedMeal> {
    let row = sqlx::query_as::<_, SavedMeal>(
        r#"
        INSERT INTO saved_meals (user_id, meal, source)
        VALUES ($1, $2, $3)
        RETURNING id, meal, source, created_at
        "#,
    )
    .bind(user_id)
    .bind(Json(meal))
    .bind(source)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<SavedMeal>> {
    let rows = sqlx::query_as::<_, SavedMeal>(
        r#"
        SELECT id, meal, source, created_at
        FROM saved_meals
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: i64) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM saved_meals WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
