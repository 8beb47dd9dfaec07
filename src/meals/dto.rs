use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::nutrition::NutritionInfo;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMealRequest {
    pub meal: NutritionInfo,
    pub photo_key: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub logged_at: Option<OffsetDateTime>,
}

/// One row of the meal timeline.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealLogItem {
    pub id: i64,
    pub meal_name: String,
    pub calories: f64,
    pub has_photo: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealLogDetails {
    pub id: i64,
    pub meal: NutritionInfo,
    pub photo_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}
