pub mod aggregator;
pub mod handlers;
pub mod metabolism;
pub mod model;
pub mod validate;

use crate::state::AppState;
use axum::Router;
use thiserror::Error;

pub use aggregator::MealEditor;
pub use model::{Ingredient, NutritionInfo, Nutrients, Recipe};

#[derive(Debug, Error, PartialEq)]
pub enum NutritionError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid meal data: {0}")]
    InvalidMealData(String),
}

pub fn router() -> Router<AppState> {
    handlers::nutrition_routes()
}
