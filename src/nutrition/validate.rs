use super::model::{Nutrients, NutritionInfo};
use super::NutritionError;

fn check_nutrients(owner: &str, n: &Nutrients) -> Result<(), NutritionError> {
    for (field, value) in n.fields() {
        if !value.is_finite() || value < 0.0 {
            return Err(NutritionError::InvalidMealData(format!(
                "{owner}: {field} must be a non-negative number, got {value}"
            )));
        }
    }
    Ok(())
}

/// Boundary check for meals arriving from the AI service or a client.
///
/// Requires a name, at least one ingredient, positive weights and
/// non-negative finite nutrient values everywhere.
pub fn validate_meal(meal: &NutritionInfo) -> Result<(), NutritionError> {
    if meal.meal_name.trim().is_empty() {
        return Err(NutritionError::InvalidMealData("meal name is empty".into()));
    }
    if meal.ingredients.is_empty() {
        return Err(NutritionError::InvalidMealData(
            "meal has no ingredients".into(),
        ));
    }
    check_nutrients("totals", &meal.totals)?;

    for (i, ing) in meal.ingredients.iter().enumerate() {
        let owner = format!("ingredient {i} ('{}')", ing.name);
        if ing.name.trim().is_empty() {
            return Err(NutritionError::InvalidMealData(format!(
                "ingredient {i} has no name"
            )));
        }
        if !ing.weight_grams.is_finite() || ing.weight_grams <= 0.0 {
            return Err(NutritionError::InvalidMealData(format!(
                "{owner}: weightGrams must be positive, got {}",
                ing.weight_grams
            )));
        }
        check_nutrients(&owner, &ing.nutrients)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::model::Ingredient;

    fn sample() -> NutritionInfo {
        NutritionInfo {
            meal_name: "Oatmeal".into(),
            totals: Nutrients {
                calories: 150.0,
                protein: 5.0,
                carbs: 27.0,
                fat: 3.0,
                ..Default::default()
            },
            ingredients: vec![Ingredient {
                name: "Oats".into(),
                weight_grams: 40.0,
                nutrients: Nutrients {
                    calories: 150.0,
                    protein: 5.0,
                    carbs: 27.0,
                    fat: 3.0,
                    fiber: Some(4.0),
                    ..Default::default()
                },
                image_url: None,
            }],
        }
    }

    #[test]
    fn accepts_well_formed_meal() {
        assert_eq!(validate_meal(&sample()), Ok(()));
    }

    #[test]
    fn rejects_empty_ingredient_list() {
        let mut m = sample();
        m.ingredients.clear();
        assert!(matches!(validate_meal(&m), Err(NutritionError::InvalidMealData(_))));
    }

    #[test]
    fn rejects_negative_micronutrient() {
        let mut m = sample();
        m.ingredients[0].nutrients.fiber = Some(-1.0);
        let err = validate_meal(&m).unwrap_err();
        assert!(err.to_string().contains("fiber"));
    }

    #[test]
    fn rejects_nan_totals() {
        let mut m = sample();
        m.totals.calories = f64::NAN;
        assert!(validate_meal(&m).is_err());
    }

    #[test]
    fn rejects_non_positive_weight() {
        let mut m = sample();
        m.ingredients[0].weight_grams = -5.0;
        let err = validate_meal(&m).unwrap_err();
        assert!(err.to_string().contains("weightGrams"));
    }

    #[test]
    fn rejects_blank_meal_name() {
        let mut m = sample();
        m.meal_name = "   ".into();
        assert!(validate_meal(&m).is_err());
    }
}
