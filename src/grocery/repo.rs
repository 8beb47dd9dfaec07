use serde::Serialize;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::services::GroceryItem;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GroceryList {
    pub id: i64,
    pub name: String,
    pub items: Json<Vec<GroceryItem>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    name: &str,
    items: &[GroceryItem],
) -> anyhow::Result<GroceryList> {
    let row = sqlx::query_as::<_, GroceryList>(
        r#"
        INSERT INTO grocery_lists (user_id, name, items)
        VALUES ($1, $2, $3)
        RETURNING id, name, items, created_at
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(Json(items))
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<GroceryList>> {
    let rows = sqlx::query_as::<_, GroceryList>(
        r#"
        SELECT id, name, items, created_at
        FROM grocery_lists
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Flips one item's `checked` flag in place; `None` when the list or the
/// index does not exist.
pub async fn set_item_checked(
    db: &PgPool,
    user_id: Uuid,
    id: i64,
    index: i32,
    checked: bool,
) -> anyhow::Result<Option<GroceryList>> {
    let row = sqlx::query_as::<_, GroceryList>(
        r#"
        UPDATE grocery_lists
        SET items = jsonb_set(items, ARRAY[$3::int::text, 'checked'], to_jsonb($4::bool))
        WHERE id = $1 AND user_id = $2 AND $3 >= 0 AND $3 < jsonb_array_length(items)
        RETURNING id, name, items, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(index)
    .bind(checked)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: i64) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM grocery_lists WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
