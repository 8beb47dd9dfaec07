use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use time::Date;
use tracing::{info, instrument};

use super::repo::{self, MealPlan, MealPlanSummary, PlannedMeal};
use crate::{auth::AuthUser, error::AppError, nutrition::validate::validate_meal, state::AppState};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Plans cover at most four weeks.
pub const MAX_PLAN_DAYS: u32 = 28;

pub fn meal_plan_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plans", get(list_plans).post(create_plan))
        .route("/meal-plans/:id", get(get_plan).delete(delete_plan))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub name: String,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    pub entries: Vec<PlannedMeal>,
}

fn check_plan(body: &CreatePlanRequest) -> Result<(), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    if body.entries.is_empty() {
        return Err(AppError::BadRequest("a plan needs at least one meal".into()));
    }
    for entry in &body.entries {
        if entry.day_offset >= MAX_PLAN_DAYS {
            return Err(AppError::BadRequest(format!(
                "dayOffset must be below {MAX_PLAN_DAYS}"
            )));
        }
        validate_meal(&entry.meal)?;
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MealPlanSummary>>, AppError> {
    Ok(Json(repo::list_by_user(&state.db, user_id).await?))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MealPlan>, AppError> {
    repo::get(&state.db, user_id, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Meal plan"))
}

#[instrument(skip(state, body))]
pub async fn create_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut body): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<MealPlan>), AppError> {
    check_plan(&body)?;
    body.entries.sort_by_key(|e| (e.day_offset, e.slot as u8));
    let plan = repo::insert(
        &state.db,
        user_id,
        body.name.trim(),
        body.start_date,
        &body.entries,
    )
    .await?;
    info!(%user_id, id = plan.id, entries = body.entries.len(), "meal plan created");
    Ok((StatusCode::CREATED, Json(plan)))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Meal plan"));
    }
    info!(%user_id, id, "meal plan deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> CreatePlanRequest {
        serde_json::from_value(json).unwrap()
    }

    fn meal() -> serde_json::Value {
        serde_json::json!({
            "mealName": "Porridge",
            "totals": {"calories": 150.0, "protein": 5.0, "carbs": 27.0, "fat": 3.0},
            "ingredients": [{"name": "Oats", "weightGrams": 40.0, "calories": 150.0,
                             "protein": 5.0, "carbs": 27.0, "fat": 3.0}]
        })
    }

    #[test]
    fn parses_iso_start_date() {
        let req = request(serde_json::json!({
            "name": "Week 1",
            "startDate": "2026-10-19",
            "entries": [{"dayOffset": 0, "slot": "breakfast", "meal": meal()}]
        }));
        assert_eq!(req.start_date.to_string(), "2026-10-19");
        assert!(check_plan(&req).is_ok());
    }

    #[test]
    fn rejects_day_offset_past_horizon() {
        let req = request(serde_json::json!({
            "name": "Too long",
            "startDate": "2026-10-19",
            "entries": [{"dayOffset": 40, "slot": "dinner", "meal": meal()}]
        }));
        assert!(matches!(check_plan(&req), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn rejects_empty_plan() {
        let req = request(serde_json::json!({
            "name": "Empty",
            "startDate": "2026-10-19",
            "entries": []
        }));
        assert!(check_plan(&req).is_err());
    }
}
