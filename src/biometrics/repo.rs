use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BiometricEntry {
    pub id: i64,
    pub weight_kg: f64,
    pub body_fat_pct: Option<f64>,
    pub resting_heart_rate: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

pub struct NewBiometricEntry {
    pub weight_kg: f64,
    pub body_fat_pct: Option<f64>,
    pub resting_heart_rate: Option<i32>,
    pub recorded_at: OffsetDateTime,
}

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    entry: &NewBiometricEntry,
) -> anyhow::Result<BiometricEntry> {
    let row = sqlx::query_as::<_, BiometricEntry>(
        r#"
        INSERT INTO biometric_entries (user_id, weight_kg, body_fat_pct, resting_heart_rate, recorded_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, weight_kg, body_fat_pct, resting_heart_rate, recorded_at
        "#,
    )
    .bind(user_id)
    .bind(entry.weight_kg)
    .bind(entry.body_fat_pct)
    .bind(entry.resting_heart_rate)
    .bind(entry.recorded_at)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<BiometricEntry>> {
    let rows = sqlx::query_as::<_, BiometricEntry>(
        r#"
        SELECT id, weight_kg, body_fat_pct, resting_heart_rate, recorded_at
        FROM biometric_entries
        WHERE user_id = $1
        ORDER BY recorded_at DESC
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

pub async fn delete(db: &PgPool, user_id: Uuid, id: i64) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM biometric_entries WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
