use tracing::{debug, warn};

use super::model::{Ingredient, Nutrients, NutritionInfo};
use super::validate::validate_meal;
use super::NutritionError;

/// Editing session over one meal.
///
/// Holds the authoritative meal (the last analyzed or loaded version) and a
/// working copy. Rescaling always derives per-gram density from the
/// authoritative ingredient, so repeated edits never compound.
#[derive(Debug, Clone)]
pub struct MealEditor {
    original: NutritionInfo,
    working: NutritionInfo,
    edited: bool,
}

impl MealEditor {
    /// Starts a session. Totals supplied with the meal are reported unchanged
    /// until the first edit.
    pub fn new(meal: NutritionInfo) -> Result<Self, NutritionError> {
        validate_meal(&meal)?;
        Ok(Self {
            working: meal.clone(),
            original: meal,
            edited: false,
        })
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn original(&self) -> &NutritionInfo {
        &self.original
    }

    pub fn working(&self) -> &NutritionInfo {
        &self.working
    }

    /// Sets ingredient `index` to `new_weight_grams`, scaling every nutrient
    /// field by `new_weight / original_weight`, then recomputes the meal
    /// totals from scratch. On error nothing changes.
    pub fn rescale_ingredient(
        &mut self,
        index: usize,
        new_weight_grams: f64,
    ) -> Result<&Ingredient, NutritionError> {
        let original = self.original.ingredients.get(index).ok_or_else(|| {
            NutritionError::InvalidArgument(format!(
                "ingredient index {index} out of range (meal has {})",
                self.original.ingredients.len()
            ))
        })?;
        if !new_weight_grams.is_finite() || new_weight_grams <= 0.0 {
            warn!(index, new_weight_grams, "rejected non-positive weight");
            return Err(NutritionError::InvalidArgument(format!(
                "weight must be a positive number of grams, got {new_weight_grams}"
            )));
        }
        let multiplier = new_weight_grams / original.weight_grams;
        let nutrients = original.nutrients.scaled(multiplier);
        if !multiplier.is_finite() || nutrients.fields().iter().any(|(_, v)| !v.is_finite()) {
            warn!(index, new_weight_grams, multiplier, "rescale overflowed");
            return Err(NutritionError::InvalidArgument(format!(
                "weight {new_weight_grams} g is out of range for ingredient '{}'",
                original.name
            )));
        }
        let rescaled = Ingredient {
            name: original.name.clone(),
            weight_grams: new_weight_grams,
            nutrients,
            image_url: original.image_url.clone(),
        };

        let totals = Nutrients::sum(
            self.working
                .ingredients
                .iter()
                .enumerate()
                .map(|(i, ing)| if i == index { &rescaled.nutrients } else { &ing.nutrients }),
        );
        if totals.fields().iter().any(|(_, v)| !v.is_finite()) {
            warn!(index, new_weight_grams, "meal totals overflowed");
            return Err(NutritionError::InvalidArgument(format!(
                "weight {new_weight_grams} g pushes the meal totals out of range"
            )));
        }
        debug!(index, multiplier, name = %rescaled.name, "ingredient rescaled");

        self.working.ingredients[index] = rescaled;
        self.working.totals = totals;
        self.edited = true;
        Ok(&self.working.ingredients[index])
    }

    /// The working copy with current totals, ready to be persisted.
    pub fn commit(&self) -> NutritionInfo {
        self.working.clone()
    }
}
