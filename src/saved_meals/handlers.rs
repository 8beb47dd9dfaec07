use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::repo::{self, SavedMeal};
use crate::{
    auth::AuthUser, error::AppError, nutrition::validate::validate_meal, nutrition::NutritionInfo,
    state::AppState,
};

const MAX_SOURCE_LEN: usize = 32;

pub fn saved_meal_routes() -> Router<AppState> {
    Router::new()
        .route("/saved-meals", get(list_saved).post(save_meal))
        .route("/saved-meals/:id", delete(delete_saved))
}

#[derive(Debug, Deserialize)]
pub struct SaveMealRequest {
    pub meal: NutritionInfo,
    /// Where the meal came from, e.g. `pantry`.
    pub source: Option<String>,
}

fn normalize_source(source: Option<&str>) -> Result<Option<String>, AppError> {
    match source.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) if s.len() > MAX_SOURCE_LEN => {
            Err(AppError::BadRequest("source is too long".into()))
        }
        Some(s) => Ok(Some(s.to_lowercase())),
    }
}

#[instrument(skip(state))]
pub async fn list_saved(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<SavedMeal>>, AppError> {
    Ok(Json(repo::list_by_user(&state.db, user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn save_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SaveMealRequest>,
) -> Result<(StatusCode, Json<SavedMeal>), AppError> {
    validate_meal(&body.meal)?;
    let source = normalize_source(body.source.as_deref())?;
    let saved = repo::insert(&state.db, user_id, &body.meal, source.as_deref()).await?;
    info!(%user_id, id = saved.id, "meal saved");
    Ok((StatusCode::CREATED, Json(saved)))
}

#[instrument(skip(state))]
pub async fn delete_saved(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Saved meal"));
    }
    info!(%user_id, id, "saved meal deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_is_trimmed_and_lowercased() {
        assert_eq!(normalize_source(Some(" Pantry ")).unwrap(), Some("pantry".into()));
        assert_eq!(normalize_source(Some("   ")).unwrap(), None);
        assert_eq!(normalize_source(None).unwrap(), None);
        assert!(normalize_source(Some(&"x".repeat(40))).is_err());
    }
}
