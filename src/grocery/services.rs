use serde::{Deserialize, Serialize};

use crate::nutrition::NutritionInfo;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_grams: Option<f64>,
    #[serde(default)]
    pub checked: bool,
}

/// Merges the ingredients of `meals` into one shopping list.
///
/// Names are matched case-insensitively after trimming; weights add up and
/// the first spelling and position seen are kept.
pub fn grocery_items_from_meals<'a>(
    meals: impl IntoIterator<Item = &'a NutritionInfo>,
) -> Vec<GroceryItem> {
    let mut items: Vec<GroceryItem> = Vec::new();
    let mut keys: Vec<String> = Vec::new();
    for ing in meals.into_iter().flat_map(|m| m.ingredients.iter()) {
        let name = ing.name.trim();
        if name.is_empty() {
            continue;
        }
        let key = name.to_lowercase();
        match keys.iter().position(|k| *k == key) {
            Some(i) => {
                let w = items[i].weight_grams.get_or_insert(0.0);
                *w += ing.weight_grams;
            }
            None => {
                keys.push(key);
                items.push(GroceryItem {
                    name: name.to_string(),
                    weight_grams: Some(ing.weight_grams),
                    checked: false,
                });
            }
        }
    }
    items
}
