//! Synthetic breakfast meals
//!
//! Schools that serve no breakfast let the user pick catalog foods instead.
//! The picks are summed and rendered in the same clause format the meal
//! service publishes, so they flow through the regular parser.

use serde::Serialize;

use super::clause::{parse_leading_number, Separator};
use super::intake::Nutrient;
use crate::models::FoodItem;

/// Meal label used for breakfast records
pub const BREAKFAST_MEAL_NAME: &str = "조식";

/// A meal assembled from catalog items, shaped like a published meal record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticMeal {
    pub meal_name: String,
    /// Food names joined with ", "
    pub dish_names: String,
    /// e.g. "412.5 Kcal"
    pub calories: String,
    /// `<br/>`-joined nutrient clauses
    pub nutrition: String,
}

/// Nutrients rendered as clauses, in order, with their decimal places
const CLAUSE_FIELDS: [(Nutrient, usize); 9] = [
    (Nutrient::Carbohydrate, 1),
    (Nutrient::Protein, 1),
    (Nutrient::Fat, 1),
    (Nutrient::VitaminA, 1),
    (Nutrient::Thiamine, 2),
    (Nutrient::Riboflavin, 2),
    (Nutrient::VitaminC, 1),
    (Nutrient::Calcium, 1),
    (Nutrient::Iron, 1),
];

/// Sum a text-encoded numeric field across items; unreadable values count as zero
fn sum_field(items: &[FoodItem], nutrient: Nutrient) -> f64 {
    items
        .iter()
        .map(|item| parse_leading_number(item.nutrient_field(nutrient)).unwrap_or(0.0))
        .sum()
}

/// Build a breakfast meal from the selected catalog items
///
/// Nutrients whose total is zero are left out of the nutrition text.
pub fn build_breakfast(items: &[FoodItem]) -> SyntheticMeal {
    let dish_names = items
        .iter()
        .map(|item| item.food_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let total_calories = sum_field(items, Nutrient::Energy);

    let clauses: Vec<String> = CLAUSE_FIELDS
        .iter()
        .filter_map(|&(nutrient, decimals)| {
            let total = sum_field(items, nutrient);
            (total > 0.0).then(|| {
                format!("{}({}) : {:.*}", nutrient.label(), nutrient.unit(), decimals, total)
            })
        })
        .collect();

    SyntheticMeal {
        meal_name: BREAKFAST_MEAL_NAME.to_string(),
        dish_names,
        calories: format!("{:.1} Kcal", total_calories),
        nutrition: clauses.join(Separator::LineBreak.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::clause::NutritionParser;
    use crate::nutrition::intake::{compute_recommended_intake, Gender, UserProfile};
    use crate::nutrition::report::{NutrientEntry, NutrientReport};

    fn food(name: &str, calories: &str, carbohydrate: &str, protein: &str, thiamine: &str) -> FoodItem {
        FoodItem {
            id: 0,
            food_code: format!("F-{}", name),
            food_name: name.to_string(),
            serving_size: "100g".to_string(),
            calories: calories.to_string(),
            carbohydrate: carbohydrate.to_string(),
            protein: protein.to_string(),
            fat: String::new(),
            vitamin_a: String::new(),
            thiamine: thiamine.to_string(),
            riboflavin: String::new(),
            vitamin_c: String::new(),
            calcium: "-".to_string(),
            iron: "0".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_build_breakfast_text() {
        let meal = build_breakfast(&[
            food("토스트", "250", "30", "8.2", "0.1"),
            food("우유", "130.5", "9.5", "6", "0.05"),
        ]);

        assert_eq!(meal.meal_name, "조식");
        assert_eq!(meal.dish_names, "토스트, 우유");
        assert_eq!(meal.calories, "380.5 Kcal");
        assert_eq!(
            meal.nutrition,
            "탄수화물(g) : 39.5<br/>단백질(g) : 14.2<br/>티아민(mg) : 0.15"
        );
    }

    #[test]
    fn test_empty_selection() {
        let meal = build_breakfast(&[]);
        assert_eq!(meal.dish_names, "");
        assert_eq!(meal.calories, "0.0 Kcal");
        assert_eq!(meal.nutrition, "");
    }

    #[test]
    fn test_breakfast_merges_into_existing_report() {
        let recommended = compute_recommended_intake(&UserProfile {
            age: 15,
            height: 170.0,
            weight: 65.0,
            gender: Gender::Male,
        });
        let parser = NutritionParser::default();

        let mut report = NutrientReport::aggregate(vec![NutrientEntry {
            name: "단백질".to_string(),
            current: 30.0,
            recommended: 59.0,
            unit: "g".to_string(),
        }]);

        let meal = build_breakfast(&[food("달걀", "80", "", "6.5", "")]);
        report.merge(parser.parse_nutrition_line(&meal.nutrition, &recommended));

        let protein = report.get("단백질").unwrap();
        assert!((protein.current - 36.5).abs() < 1e-9);
        assert_eq!(protein.recommended, 59.0);
        assert_eq!(report.len(), 1);
    }
}
