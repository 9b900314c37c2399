//! Nutrition calculation module
//!
//! Recommended-intake calculation, meal nutrition parsing and report aggregation.

pub mod adequacy;
pub mod breakfast;
pub mod clause;
pub mod intake;
pub mod report;

pub use adequacy::{assess, AdequacyStatus, NutrientAssessment};
pub use breakfast::{build_breakfast, SyntheticMeal, BREAKFAST_MEAL_NAME};
pub use clause::{
    parse_calories, parse_leading_number, ClauseOutcome, NutritionParser, ParsedClause,
    Separator, SkipReason, FALLBACK_RECOMMENDED_FACTOR,
};
pub use intake::{
    compute_recommended_intake, total_energy_expenditure, Gender, Nutrient,
    RecommendedNutrients, UserProfile,
};
pub use report::{NutrientEntry, NutrientReport};
