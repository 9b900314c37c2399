//! Nutrition analysis tools
//!
//! Recommended intake, meal-day analysis and the breakfast adder.

use serde::Serialize;

use crate::db::Database;
use crate::models::{FoodItem, MealKind, MealRecord, School};
use crate::nutrition::{
    assess, build_breakfast, compute_recommended_intake, NutrientAssessment, NutrientEntry,
    NutrientReport, NutritionParser, RecommendedNutrients, SyntheticMeal, UserProfile,
};

pub const MIN_AGE: i32 = 8;
pub const MAX_AGE: i32 = 19;

/// Reject profiles the intake tables do not cover
pub fn validate_profile(profile: &UserProfile) -> Result<(), String> {
    if !(MIN_AGE..=MAX_AGE).contains(&profile.age) {
        return Err(format!(
            "Age must be between {} and {} (got {})",
            MIN_AGE, MAX_AGE, profile.age
        ));
    }
    if !(profile.height.is_finite() && profile.height > 0.0) {
        return Err(format!("Height must be positive (got {})", profile.height));
    }
    if !(profile.weight.is_finite() && profile.weight > 0.0) {
        return Err(format!("Weight must be positive (got {})", profile.weight));
    }
    Ok(())
}

/// One row of the recommended-intake table
#[derive(Debug, Serialize)]
pub struct IntakeRow {
    pub name: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

/// Response for calculate_recommended_intake
#[derive(Debug, Serialize)]
pub struct RecommendedIntakeResponse {
    pub profile: UserProfile,
    pub recommended: RecommendedNutrients,
    pub rows: Vec<IntakeRow>,
}

/// Compute the daily recommended intake for a validated profile
pub fn calculate_recommended_intake(profile: UserProfile) -> Result<RecommendedIntakeResponse, String> {
    validate_profile(&profile)?;

    let recommended = compute_recommended_intake(&profile);
    let rows = recommended
        .rows()
        .into_iter()
        .map(|(name, value, unit)| IntakeRow { name, value, unit })
        .collect();

    Ok(RecommendedIntakeResponse {
        profile,
        recommended,
        rows,
    })
}

/// A meal as shown in an analysis
#[derive(Debug, Serialize)]
pub struct MealSummary {
    pub meal_code: String,
    pub meal_name: String,
    pub kind: MealKind,
    pub dishes: Vec<String>,
    pub calorie_info: Option<String>,
    pub calories: Option<f64>,
    pub included_in_report: bool,
}

impl From<&MealRecord> for MealSummary {
    fn from(record: &MealRecord) -> Self {
        Self {
            meal_code: record.meal_code.clone(),
            meal_name: record.meal_name.clone(),
            kind: record.kind(),
            dishes: record.dishes(),
            calorie_info: record.calorie_info.clone(),
            calories: record.calories(),
            included_in_report: record.kind() != MealKind::Dinner,
        }
    }
}

/// Response for analyze_meals
#[derive(Debug, Serialize)]
pub struct MealAnalysisResponse {
    pub school_code: String,
    pub school_name: Option<String>,
    pub meal_date: String,
    pub meals: Vec<MealSummary>,
    pub has_breakfast: bool,
    /// Lunch was served but breakfast was not, so a breakfast can be added by hand
    pub breakfast_addable: bool,
    pub report: NutrientReport,
    pub assessments: Vec<NutrientAssessment>,
}

/// Analyze the published meals of one school day against a profile
///
/// Dinner is listed but left out of the report. A day without meals gives an
/// empty analysis.
pub fn analyze_meals(
    db: &Database,
    parser: &NutritionParser,
    school_code: &str,
    meal_date: &str,
    profile: UserProfile,
) -> Result<MealAnalysisResponse, String> {
    validate_profile(&profile)?;
    let recommended = compute_recommended_intake(&profile);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let school = School::get(&conn, school_code)
        .map_err(|e| format!("Failed to get school: {}", e))?;
    let records = MealRecord::get_for_school_date(&conn, school_code, meal_date)
        .map_err(|e| format!("Failed to load meals: {}", e))?;

    let mut report = NutrientReport::new();
    for record in records.iter().filter(|r| r.kind() != MealKind::Dinner) {
        if let Some(text) = record.nutrition_info.as_deref() {
            report.merge(parser.parse_nutrition_line(text, &recommended));
        }
    }

    let has_breakfast = records.iter().any(|r| r.kind() == MealKind::Breakfast);
    let has_lunch = records.iter().any(|r| r.kind() == MealKind::Lunch);

    tracing::info!(
        "Analyzed {} meals for school {} on {} ({} nutrients)",
        records.len(),
        school_code,
        meal_date,
        report.len()
    );

    let assessments = assess(&report);

    Ok(MealAnalysisResponse {
        school_code: school_code.to_string(),
        school_name: school.map(|s| s.school_name),
        meal_date: crate::models::normalize_date(meal_date),
        meals: records.iter().map(MealSummary::from).collect(),
        has_breakfast,
        breakfast_addable: has_lunch && !has_breakfast,
        report,
        assessments,
    })
}

/// Response for analyze_nutrition_text
#[derive(Debug, Serialize)]
pub struct TextAnalysisResponse {
    pub report: NutrientReport,
    pub assessments: Vec<NutrientAssessment>,
}

/// Parse free nutrition text (one or more meals) against a profile
pub fn analyze_nutrition_text(
    parser: &NutritionParser,
    texts: &[String],
    profile: UserProfile,
) -> Result<TextAnalysisResponse, String> {
    validate_profile(&profile)?;
    let recommended = compute_recommended_intake(&profile);

    let report: NutrientReport = texts
        .iter()
        .flat_map(|text| parser.parse_nutrition_line(text, &recommended))
        .collect();
    let assessments = assess(&report);

    Ok(TextAnalysisResponse { report, assessments })
}

/// Response for add_breakfast
#[derive(Debug, Serialize)]
pub struct AddBreakfastResponse {
    pub breakfast: SyntheticMeal,
    pub missing_food_item_ids: Vec<i64>,
    pub report: NutrientReport,
    pub assessments: Vec<NutrientAssessment>,
}

/// Build a breakfast from catalog items and merge it into an existing report
pub fn add_breakfast(
    db: &Database,
    parser: &NutritionParser,
    profile: UserProfile,
    existing: Vec<NutrientEntry>,
    food_item_ids: &[i64],
) -> Result<AddBreakfastResponse, String> {
    validate_profile(&profile)?;
    if food_item_ids.is_empty() {
        return Err("Select at least one food item".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let (items, missing) = FoodItem::get_by_ids(&conn, food_item_ids)
        .map_err(|e| format!("Failed to load food items: {}", e))?;

    if items.is_empty() {
        return Err(format!("No food items found for ids {:?}", missing));
    }
    if !missing.is_empty() {
        tracing::warn!("Breakfast ignores unknown food items {:?}", missing);
    }

    let recommended = compute_recommended_intake(&profile);
    let breakfast = build_breakfast(&items);

    let mut report = NutrientReport::aggregate(existing);
    report.merge(parser.parse_nutrition_line(&breakfast.nutrition, &recommended));
    let assessments = assess(&report);

    Ok(AddBreakfastResponse {
        breakfast,
        missing_food_item_ids: missing,
        report,
        assessments,
    })
}
