use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::NutritionInfo;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlannedMeal {
    pub day_offset: u32,
    pub slot: MealSlot,
    pub meal: NutritionInfo,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub id: i64,
    pub name: String,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    pub entries: Json<Vec<PlannedMeal>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Listing view without the meal payloads.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanSummary {
    pub id: i64,
    pub name: String,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    pub entry_count: i32,
}

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    name: &str,
    start_date: Date,
    entries: &[PlannedMeal],
) -> anyhow::Result<MealPlan> {
    let row = sqlx::query_as::<_, MealPlan>(
        r#"
        INSERT INTO meal_plans (user_id, name, start_date, entries)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, start_date, entries, created_at
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(start_date)
    .bind(Json(entries))
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<MealPlanSummary>> {
    let rows = sqlx::query_as::<_, MealPlanSummary>(
        r#"
        SELECT id, name, start_date, jsonb_array_length(entries) AS entry_count
        FROM meal_plans
        WHERE user_id = $1
        ORDER BY start_date DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, user_id: Uuid, id: i64) -> anyhow::Result<Option<MealPlan>> {
    let row = sqlx::query_as::<_, MealPlan>(
        r#"
        SELECT id, name, start_date, entries, created_at
        FROM meal_plans
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: i64) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meal_plans WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
