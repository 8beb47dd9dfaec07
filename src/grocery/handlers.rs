use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::repo::{self, GroceryList};
use super::services::{grocery_items_from_meals, GroceryItem};
use crate::{auth::AuthUser, error::AppError, meal_plans, state::AppState};

pub fn grocery_routes() -> Router<AppState> {
    Router::new()
        .route("/grocery-lists", get(list_lists).post(create_list))
        .route("/grocery-lists/from-plan/:plan_id", post(create_from_plan))
        .route("/grocery-lists/:id", delete(delete_list))
        .route("/grocery-lists/:id/items/:index", patch(check_item))
}

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
    pub items: Vec<GroceryItem>,
}

#[derive(Debug, Deserialize)]
pub struct CheckItemRequest {
    pub checked: bool,
}

fn check_items(items: &[GroceryItem]) -> Result<(), AppError> {
    for item in items {
        if item.name.trim().is_empty() {
            return Err(AppError::BadRequest("item name is required".into()));
        }
        if let Some(w) = item.weight_grams {
            if !w.is_finite() || w <= 0.0 {
                return Err(AppError::BadRequest(format!(
                    "weightGrams for '{}' must be positive",
                    item.name
                )));
            }
        }
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_lists(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<GroceryList>>, AppError> {
    Ok(Json(repo::list_by_user(&state.db, user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn create_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<GroceryList>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    check_items(&body.items)?;
    let list = repo::insert(&state.db, user_id, body.name.trim(), &body.items).await?;
    info!(%user_id, id = list.id, "grocery list created");
    Ok((StatusCode::CREATED, Json(list)))
}

#[instrument(skip(state))]
pub async fn create_from_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(plan_id): Path<i64>,
) -> Result<(StatusCode, Json<GroceryList>), AppError> {
    let plan = meal_plans::repo::get(&state.db, user_id, plan_id)
        .await?
        .ok_or(AppError::NotFound("Meal plan"))?;
    let items = grocery_items_from_meals(plan.entries.iter().map(|e| &e.meal));
    let list = repo::insert(&state.db, user_id, &plan.name, &items).await?;
    info!(%user_id, plan_id, id = list.id, items = items.len(), "grocery list derived from plan");
    Ok((StatusCode::CREATED, Json(list)))
}

#[instrument(skip(state))]
pub async fn check_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, index)): Path<(i64, i32)>,
    Json(body): Json<CheckItemRequest>,
) -> Result<Json<GroceryList>, AppError> {
    repo::set_item_checked(&state.db, user_id, id, index, body.checked)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Grocery item"))
}

#[instrument(skip(state))]
pub async fn delete_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Grocery list"));
    }
    info!(%user_id, id, "grocery list deleted");
    Ok(StatusCode::NO_CONTENT)
}
