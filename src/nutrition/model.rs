use serde::{Deserialize, Serialize};

/// Absolute nutrient amounts. On an ingredient they describe its current
/// weight; on a meal they are the totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrients {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potassium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnesium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_d: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calcium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
}

impl Nutrients {
    /// Every field multiplied by `factor`; absent micronutrients stay absent.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |v: Option<f64>| v.map(|x| x * factor);
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
            potassium: scale(self.potassium),
            magnesium: scale(self.magnesium),
            vitamin_d: scale(self.vitamin_d),
            calcium: scale(self.calcium),
            sugar: scale(self.sugar),
            fiber: scale(self.fiber),
            sodium: scale(self.sodium),
        }
    }

    /// Field-wise sum. A micronutrient total is present when at least one
    /// addend carries it.
    pub fn sum<'a>(items: impl IntoIterator<Item = &'a Nutrients>) -> Self {
        fn add(acc: Option<f64>, v: Option<f64>) -> Option<f64> {
            match (acc, v) {
                (Some(a), Some(b)) => Some(a + b),
                (a, b) => a.or(b),
            }
        }
        items.into_iter().fold(Self::default(), |acc, n| Self {
            calories: acc.calories + n.calories,
            protein: acc.protein + n.protein,
            carbs: acc.carbs + n.carbs,
            fat: acc.fat + n.fat,
            potassium: add(acc.potassium, n.potassium),
            magnesium: add(acc.magnesium, n.magnesium),
            vitamin_d: add(acc.vitamin_d, n.vitamin_d),
            calcium: add(acc.calcium, n.calcium),
            sugar: add(acc.sugar, n.sugar),
            fiber: add(acc.fiber, n.fiber),
            sodium: add(acc.sodium, n.sodium),
        })
    }

    /// `(field name, value)` for every populated field, used by validation.
    pub fn fields(&self) -> Vec<(&'static str, f64)> {
        let mut out = vec![
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ];
        let optional = [
            ("potassium", self.potassium),
            ("magnesium", self.magnesium),
            ("vitaminD", self.vitamin_d),
            ("calcium", self.calcium),
            ("sugar", self.sugar),
            ("fiber", self.fiber),
            ("sodium", self.sodium),
        ];
        out.extend(optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))));
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    pub weight_grams: f64,
    #[serde(flatten)]
    pub nutrients: Nutrients,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A meal as produced by photo analysis or manual entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionInfo {
    pub meal_name: String,
    pub totals: Nutrients,
    pub ingredients: Vec<Ingredient>,
}

impl NutritionInfo {
    /// Totals computed from the ingredients, ignoring the stored ones.
    pub fn summed_totals(&self) -> Nutrients {
        Nutrients::sum(self.ingredients.iter().map(|i| &i.nutrients))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub title: String,
    pub instructions: Vec<String>,
    pub nutrition: NutritionInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingredient_uses_flat_camel_case_json() {
        let json = serde_json::json!({
            "name": "Salmon",
            "weightGrams": 120.0,
            "calories": 250.0,
            "protein": 25.0,
            "carbs": 0.0,
            "fat": 15.0,
            "vitaminD": 11.0
        });
        let ing: Ingredient = serde_json::from_value(json).unwrap();
        assert_eq!(ing.weight_grams, 120.0);
        assert_eq!(ing.nutrients.vitamin_d, Some(11.0));
        assert_eq!(ing.nutrients.sodium, None);

        let back = serde_json::to_value(&ing).unwrap();
        assert_eq!(back["vitaminD"], 11.0);
        assert!(back.get("sodium").is_none());
        assert!(back.get("nutrients").is_none());
    }

    #[test]
    fn sum_keeps_micronutrient_present_if_any_addend_has_it() {
        let a = Nutrients {
            calories: 100.0,
            potassium: Some(50.0),
            ..Default::default()
        };
        let b = Nutrients {
            calories: 20.0,
            ..Default::default()
        };
        let total = Nutrients::sum([&a, &b]);
        assert_eq!(total.calories, 120.0);
        assert_eq!(total.potassium, Some(50.0));
        assert_eq!(total.calcium, None);
    }

    #[test]
    fn scaled_leaves_absent_fields_absent() {
        let n = Nutrients {
            calories: 10.0,
            fiber: Some(2.0),
            ..Default::default()
        };
        let s = n.scaled(3.0);
        assert_eq!(s.calories, 30.0);
        assert_eq!(s.fiber, Some(6.0));
        assert_eq!(s.sugar, None);
    }
}
