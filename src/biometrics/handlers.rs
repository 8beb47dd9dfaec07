use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::repo::{self, BiometricEntry, NewBiometricEntry};
use crate::{auth::AuthUser, db::Pagination, error::AppError, state::AppState};

pub fn biometric_routes() -> Router<AppState> {
    Router::new()
        .route("/biometrics", get(list_entries).post(record_entry))
        .route("/biometrics/:id", delete(delete_entry))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordBiometricsRequest {
    pub weight_kg: f64,
    pub body_fat_pct: Option<f64>,
    pub resting_heart_rate: Option<i32>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub recorded_at: Option<OffsetDateTime>,
}

impl RecordBiometricsRequest {
    fn into_entry(self) -> Result<NewBiometricEntry, AppError> {
        if !(self.weight_kg > 0.0 && self.weight_kg <= 300.0) {
            return Err(AppError::BadRequest("weightKg must be in (0, 300]".into()));
        }
        if let Some(bf) = self.body_fat_pct {
            if !(0.0..100.0).contains(&bf) {
                return Err(AppError::BadRequest("bodyFatPct must be in [0, 100)".into()));
            }
        }
        if let Some(hr) = self.resting_heart_rate {
            if !(20..=250).contains(&hr) {
                return Err(AppError::BadRequest(
                    "restingHeartRate must be in [20, 250]".into(),
                ));
            }
        }
        Ok(NewBiometricEntry {
            weight_kg: self.weight_kg,
            body_fat_pct: self.body_fat_pct,
            resting_heart_rate: self.resting_heart_rate,
            recorded_at: self.recorded_at.unwrap_or_else(OffsetDateTime::now_utc),
        })
    }
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<BiometricEntry>>, AppError> {
    let (limit, offset) = p.bounds();
    Ok(Json(
        repo::list_by_user(&state.db, user_id, limit, offset).await?,
    ))
}

#[instrument(skip(state, body))]
pub async fn record_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<RecordBiometricsRequest>,
) -> Result<(StatusCode, Json<BiometricEntry>), AppError> {
    let entry = body.into_entry().map_err(|e| {
        warn!(%user_id, error = %e, "rejected biometrics");
        e
    })?;
    let row = repo::insert(&state.db, user_id, &entry).await?;
    info!(%user_id, id = row.id, "biometrics recorded");
    Ok((StatusCode::CREATED, Json(row)))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Biometric entry"));
    }
    info!(%user_id, id, "biometric entry deleted");
    Ok(StatusCode::NO_CONTENT)
}
