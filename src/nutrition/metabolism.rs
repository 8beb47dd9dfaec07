//! Daily energy estimates.
//!
//! BMR uses the Mifflin-St Jeor equation (Mifflin et al., 1990):
//! `10 * weight_kg + 6.25 * height_cm - 5 * age + s`, with `s = +5` for men
//! and `s = -161` for women. TDEE multiplies BMR by an activity factor.

use serde::{Deserialize, Serialize};

use super::NutritionError;

const MIN_DAILY_TARGET_KCAL: f64 = 1200.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl Goal {
    fn adjustment_kcal(self) -> f64 {
        match self {
            Goal::Lose => -500.0,
            Goal::Maintain => 0.0,
            Goal::Gain => 300.0,
        }
    }
}

/// Basal metabolic rate in kcal/day.
pub fn bmr_mifflin_st_jeor(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    sex: Sex,
) -> Result<f64, NutritionError> {
    if !(weight_kg > 0.0 && weight_kg <= 300.0) {
        return Err(NutritionError::InvalidArgument(
            "weight must be between 0 and 300 kg".into(),
        ));
    }
    if !(height_cm > 0.0 && height_cm <= 300.0) {
        return Err(NutritionError::InvalidArgument(
            "height must be between 0 and 300 cm".into(),
        ));
    }
    if !(10..=120).contains(&age) {
        return Err(NutritionError::InvalidArgument(
            "age must be between 10 and 120 years".into(),
        ));
    }
    let s = match sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    Ok(10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age) + s)
}

/// Total daily energy expenditure in kcal/day.
pub fn tdee(bmr: f64, activity: ActivityLevel) -> Result<f64, NutritionError> {
    if !(bmr.is_finite() && bmr > 0.0) {
        return Err(NutritionError::InvalidArgument("BMR must be positive".into()));
    }
    Ok(bmr * activity.factor())
}

pub fn daily_target(tdee: f64, goal: Goal) -> f64 {
    (tdee + goal.adjustment_kcal()).max(MIN_DAILY_TARGET_KCAL)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetsRequest {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub goal: Goal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnergyTargets {
    pub bmr: f64,
    pub tdee: f64,
    pub target_calories: f64,
}

pub fn energy_targets(req: &TargetsRequest) -> Result<EnergyTargets, NutritionError> {
    let bmr = bmr_mifflin_st_jeor(req.weight_kg, req.height_cm, req.age, req.sex)?;
    let tdee = tdee(bmr, req.activity_level)?;
    Ok(EnergyTargets {
        bmr,
        tdee,
        target_calories: daily_target(tdee, req.goal),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mifflin_reference_values() {
        // 70 kg, 175 cm, 30 y
        assert_eq!(bmr_mifflin_st_jeor(70.0, 175.0, 30, Sex::Male).unwrap(), 1648.75);
        assert_eq!(bmr_mifflin_st_jeor(70.0, 175.0, 30, Sex::Female).unwrap(), 1482.75);
    }

    #[test]
    fn tdee_applies_activity_factor() {
        let t = tdee(1000.0, ActivityLevel::Moderate).unwrap();
        assert!((t - 1550.0).abs() < 1e-9);
        assert!(tdee(0.0, ActivityLevel::Light).is_err());
    }

    #[test]
    fn rejects_out_of_range_inputs() {
        assert!(bmr_mifflin_st_jeor(0.0, 170.0, 30, Sex::Male).is_err());
        assert!(bmr_mifflin_st_jeor(70.0, 400.0, 30, Sex::Male).is_err());
        assert!(bmr_mifflin_st_jeor(70.0, 170.0, 5, Sex::Male).is_err());
        assert!(bmr_mifflin_st_jeor(f64::NAN, 170.0, 30, Sex::Male).is_err());
    }

    #[test]
    fn daily_target_is_floored() {
        assert_eq!(daily_target(1500.0, Goal::Lose), 1200.0);
        assert_eq!(daily_target(2500.0, Goal::Lose), 2000.0);
        assert_eq!(daily_target(2500.0, Goal::Gain), 2800.0);
    }

    #[test]
    fn targets_request_parses_camel_case() {
        let req: TargetsRequest = serde_json::from_value(serde_json::json!({
            "weightKg": 70.0,
            "heightCm": 175.0,
            "age": 30,
            "sex": "male",
            "activityLevel": "sedentary"
        }))
        .unwrap();
        assert_eq!(req.goal, Goal::Maintain);
        let t = energy_targets(&req).unwrap();
        assert!((t.tdee - 1978.5).abs() < 1e-9);
        assert_eq!(t.target_calories, t.tdee);
    }
}
