pub mod gemini;

use async_trait::async_trait;
use bytes::Bytes;

use crate::nutrition::{NutritionInfo, Recipe};

pub use gemini::GeminiClient;

/// An image sent along with a prompt.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub body: Bytes,
    pub content_type: String,
}

/// Generative-AI capability used by the app. Implementations return the
/// parsed JSON only; validation happens at the caller.
#[async_trait]
pub trait AiClient: Send + Sync {
    async fn analyze_meal_photo(&self, image: &ImagePayload) -> anyhow::Result<NutritionInfo>;

    async fn suggest_recipe(
        &self,
        pantry_items: &[String],
        image: Option<&ImagePayload>,
    ) -> anyhow::Result<Recipe>;
}

pub(crate) const MEAL_PROMPT: &str = r#"Identify the food in this photo and estimate its nutrition.
Respond with JSON only, in exactly this shape:
{"mealName": string,
 "totals": {"calories": number, "protein": number, "carbs": number, "fat": number,
            "potassium": number, "magnesium": number, "vitaminD": number, "calcium": number,
            "sugar": number, "fiber": number, "sodium": number},
 "ingredients": [{"name": string, "weightGrams": number, "calories": number, "protein": number,
                  "carbs": number, "fat": number, "potassium": number, "magnesium": number,
                  "vitaminD": number, "calcium": number, "sugar": number, "fiber": number,
                  "sodium": number}]}
All nutrient amounts are absolute for the stated weight. Protein, carbs, fat, sugar and fiber in grams;
potassium, magnesium, calcium and sodium in milligrams; vitaminD in micrograms."#;

pub(crate) const RECIPE_PROMPT: &str = r#"Suggest one recipe that can be cooked mostly from the pantry items listed (and shown, if a photo is attached).
Respond with JSON only, in exactly this shape:
{"title": string,
 "instructions": [string],
 "nutrition": {"mealName": string,
               "totals": {"calories": number, "protein": number, "carbs": number, "fat": number},
               "ingredients": [{"name": string, "weightGrams": number, "calories": number,
                                "protein": number, "carbs": number, "fat": number}]}}
Nutrient amounts are absolute for the stated weight, macros in grams."#;

#[cfg(test)]
pub mod fake {
    use super::*;
    use crate::nutrition::{Ingredient, Nutrients};

    /// Returns a fixed meal and recipe, or fails every call when `fail` is set.
    #[derive(Default)]
    pub struct FakeAi {
        pub fail: bool,
        pub meal: Option<NutritionInfo>,
    }

    pub fn sample_meal() -> NutritionInfo {
        let rice = Ingredient {
            name: "Rice".into(),
            weight_grams: 100.0,
            nutrients: Nutrients {
                calories: 130.0,
                protein: 2.7,
                carbs: 28.0,
                fat: 0.3,
                ..Default::default()
            },
            image_url: None,
        };
        let chicken = Ingredient {
            name: "Chicken".into(),
            weight_grams: 150.0,
            nutrients: Nutrients {
                calories: 250.0,
                protein: 46.0,
                carbs: 0.0,
                fat: 5.4,
                ..Default::default()
            },
            image_url: None,
        };
        let mut meal = NutritionInfo {
            meal_name: "Chicken and rice".into(),
            totals: Nutrients::default(),
            ingredients: vec![rice, chicken],
        };
        meal.totals = meal.summed_totals();
        meal
    }

    #[async_trait]
    impl AiClient for FakeAi {
        async fn analyze_meal_photo(&self, _image: &ImagePayload) -> anyhow::Result<NutritionInfo> {
            if self.fail {
                anyhow::bail!("model unavailable");
            }
            Ok(self.meal.clone().unwrap_or_else(sample_meal))
        }

        async fn suggest_recipe(
            &self,
            pantry_items: &[String],
            _image: Option<&ImagePayload>,
        ) -> anyhow::Result<Recipe> {
            if self.fail {
                anyhow::bail!("model unavailable");
            }
            Ok(Recipe {
                title: format!("Bowl with {}", pantry_items.join(", ")),
                instructions: vec!["Cook the rice.".into(), "Grill the chicken.".into()],
                nutrition: sample_meal(),
            })
        }
    }
}
