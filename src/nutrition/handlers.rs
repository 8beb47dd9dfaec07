use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use base64ct::{Base64, Encoding};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::metabolism::{energy_targets, EnergyTargets, TargetsRequest};
use super::validate::validate_meal;
use super::{MealEditor, NutritionInfo, Recipe};
use crate::{
    ai::ImagePayload,
    auth::AuthUser,
    error::AppError,
    state::AppState,
    storage::{store_meal_photo, PHOTO_URL_TTL_SECS},
};

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn nutrition_routes() -> Router<AppState> {
    Router::new()
        .route("/nutrition/analyze", post(analyze_photo))
        .route("/nutrition/rescale", post(rescale_meal))
        .route("/nutrition/targets", post(targets))
        .route("/recipes/suggest", post(suggest_recipe))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub meal: NutritionInfo,
    pub photo_key: String,
    pub photo_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEdit {
    pub index: usize,
    pub weight_grams: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescaleRequest {
    pub meal: NutritionInfo,
    #[serde(default)]
    pub edits: Vec<WeightEdit>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RescaleResponse {
    pub meal: NutritionInfo,
    pub edited: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRecipeRequest {
    #[serde(default)]
    pub pantry_items: Vec<String>,
    pub image_base64: Option<String>,
    pub content_type: Option<String>,
}

/// POST /nutrition/analyze, multipart with one `image` field.
#[instrument(skip(state, mp))]
pub async fn analyze_photo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut image = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("image") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "image/jpeg".into());
            let body = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            image = Some(ImagePayload { body, content_type });
        }
    }
    let image = image
        .filter(|i| !i.body.is_empty())
        .ok_or_else(|| AppError::BadRequest("image is required".into()))?;

    let meal = state
        .ai
        .analyze_meal_photo(&image)
        .await
        .map_err(AppError::AiUnavailable)?;
    validate_meal(&meal).map_err(|e| {
        warn!(error = %e, "ai returned unusable meal");
        e
    })?;

    let photo_key =
        store_meal_photo(state.storage.as_ref(), user_id, image.body, &image.content_type).await?;
    let photo_url = state
        .storage
        .presign_get(&photo_key, PHOTO_URL_TTL_SECS)
        .await?;

    info!(%user_id, meal = %meal.meal_name, ingredients = meal.ingredients.len(), "meal analyzed");
    Ok(Json(AnalyzeResponse {
        meal,
        photo_key,
        photo_url,
    }))
}

/// POST /nutrition/rescale: applies weight edits, in order, to the supplied
/// meal and returns the result. Every request is its own editing session.
#[instrument(skip(body))]
pub async fn rescale_meal(
    AuthUser(user_id): AuthUser,
    Json(body): Json<RescaleRequest>,
) -> Result<Json<RescaleResponse>, AppError> {
    let mut editor = MealEditor::new(body.meal)?;
    for edit in &body.edits {
        editor.rescale_ingredient(edit.index, edit.weight_grams)?;
    }
    debug!(%user_id, edits = body.edits.len(), "meal rescaled");
    Ok(Json(RescaleResponse {
        edited: editor.is_edited(),
        meal: editor.commit(),
    }))
}

#[instrument(skip(body))]
pub async fn targets(
    AuthUser(_user_id): AuthUser,
    Json(body): Json<TargetsRequest>,
) -> Result<Json<EnergyTargets>, AppError> {
    Ok(Json(energy_targets(&body)?))
}

#[instrument(skip(state, body))]
pub async fn suggest_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SuggestRecipeRequest>,
) -> Result<Json<Recipe>, AppError> {
    let image = match body.image_base64.as_deref() {
        Some(b64) => {
            let raw = Base64::decode_vec(b64.trim())
                .map_err(|_| AppError::BadRequest("invalid base64".into()))?;
            Some(ImagePayload {
                body: Bytes::from(raw),
                content_type: body.content_type.clone().unwrap_or_else(|| "image/jpeg".into()),
            })
        }
        None => None,
    };
    let pantry: Vec<String> = body
        .pantry_items
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if pantry.is_empty() && image.is_none() {
        return Err(AppError::BadRequest(
            "pantryItems or imageBase64 is required".into(),
        ));
    }

    let recipe = state
        .ai
        .suggest_recipe(&pantry, image.as_ref())
        .await
        .map_err(AppError::AiUnavailable)?;
    validate_meal(&recipe.nutrition)?;
    info!(%user_id, title = %recipe.title, "recipe suggested");
    Ok(Json(recipe))
}
