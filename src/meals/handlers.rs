use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{LogMealRequest, MealLogDetails, MealLogItem};
use super::repo;
use crate::{
    auth::AuthUser,
    db::Pagination,
    error::AppError,
    nutrition::validate::validate_meal,
    state::AppState,
    storage::PHOTO_URL_TTL_SECS,
};

pub fn meal_log_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-log", get(list_entries).post(log_meal))
        .route("/meal-log/:id", get(get_entry).delete(delete_entry))
}

/// Photo keys are only accepted inside the caller's own prefix.
fn owns_photo(user_id: Uuid, key: &str) -> bool {
    key.strip_prefix(&format!("meals/{}/", user_id))
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/') && !rest.contains(".."))
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<MealLogItem>>, AppError> {
    let (limit, offset) = p.bounds();
    let rows = repo::list_by_user(&state.db, user_id, limit, offset).await?;
    let items = rows
        .into_iter()
        .map(|r| MealLogItem {
            id: r.id,
            calories: r.meal.totals.calories,
            meal_name: r.meal.0.meal_name,
            has_photo: r.photo_key.is_some(),
            logged_at: r.logged_at,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MealLogDetails>, AppError> {
    let entry = repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Meal log entry"))?;

    let photo_url = match entry.photo_key.as_deref() {
        Some(key) => Some(state.storage.presign_get(key, PHOTO_URL_TTL_SECS).await?),
        None => None,
    };

    Ok(Json(MealLogDetails {
        id: entry.id,
        meal: entry.meal.0,
        photo_url,
        logged_at: entry.logged_at,
    }))
}

#[instrument(skip(state, body))]
pub async fn log_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LogMealRequest>,
) -> Result<(StatusCode, HeaderMap, Json<MealLogDetails>), AppError> {
    validate_meal(&body.meal)?;
    if let Some(key) = body.photo_key.as_deref() {
        if !owns_photo(user_id, key) {
            warn!(%user_id, key = %key, "photo key outside user prefix");
            return Err(AppError::BadRequest("Invalid photo key".into()));
        }
    }

    let logged_at = body.logged_at.unwrap_or_else(OffsetDateTime::now_utc);
    let entry = repo::insert(
        &state.db,
        user_id,
        &body.meal,
        body.photo_key.as_deref(),
        logged_at,
    )
    .await?;

    info!(%user_id, id = entry.id, "meal logged");
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(&format!("/api/v1/meal-log/{}", entry.id)) {
        headers.insert(LOCATION, v);
    }
    Ok((
        StatusCode::CREATED,
        headers,
        Json(MealLogDetails {
            id: entry.id,
            meal: entry.meal.0,
            photo_url: None,
            logged_at: entry.logged_at,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let photo_key = repo::delete(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Meal log entry"))?;

    if let Some(key) = photo_key {
        if let Err(e) = state.storage.delete_object(&key).await {
            warn!(error = %e, key = %key, "photo cleanup failed");
        }
    }
    info!(%user_id, id, "meal log entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_key_must_sit_in_user_prefix() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(owns_photo(me, &format!("meals/{}/abc.jpg", me)));
        assert!(!owns_photo(me, &format!("meals/{}/abc.jpg", other)));
        assert!(!owns_photo(me, &format!("meals/{}/", me)));
        assert!(!owns_photo(me, &format!("meals/{}/../x.jpg", me)));
        assert!(!owns_photo(me, "avatars/abc.jpg"));
    }
}
