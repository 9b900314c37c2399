//! Recommended daily intake calculation
//!
//! Derives recommended daily values for ten nutrients from a child's age, sex,
//! height and weight. Energy-based targets come from the total energy
//! expenditure equations for ages 8-19; the micronutrient targets are
//! age-bracket lookups with inclusive upper bounds (<=8, <=11, <=14, else).
//!
//! Nothing here validates its input. Ages past the last bracket fall through
//! to the "else" row and absurd body metrics simply produce absurd numbers.

use serde::{Deserialize, Serialize};

/// Biological sex used for the reference tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "남" | "남자" => Some(Gender::Male),
            "female" | "f" | "여" | "여자" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// The person the recommendations are computed for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Age in whole years
    pub age: i32,
    /// Height in centimeters
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    pub gender: Gender,
}

/// The ten nutrients tracked against school meal reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Energy,
    Carbohydrate,
    Protein,
    Fat,
    VitaminA,
    Thiamine,
    Riboflavin,
    VitaminC,
    Calcium,
    Iron,
}

impl Nutrient {
    pub const ALL: [Nutrient; 10] = [
        Nutrient::Energy,
        Nutrient::Carbohydrate,
        Nutrient::Protein,
        Nutrient::Fat,
        Nutrient::VitaminA,
        Nutrient::Thiamine,
        Nutrient::Riboflavin,
        Nutrient::VitaminC,
        Nutrient::Calcium,
        Nutrient::Iron,
    ];

    /// Korean label as it appears in published meal nutrition text
    pub fn label(&self) -> &'static str {
        match self {
            Nutrient::Energy => "에너지",
            Nutrient::Carbohydrate => "탄수화물",
            Nutrient::Protein => "단백질",
            Nutrient::Fat => "지방",
            Nutrient::VitaminA => "비타민A",
            Nutrient::Thiamine => "티아민",
            Nutrient::Riboflavin => "리보플라빈",
            Nutrient::VitaminC => "비타민C",
            Nutrient::Calcium => "칼슘",
            Nutrient::Iron => "철분",
        }
    }

    /// Unit of the recommended value
    pub fn unit(&self) -> &'static str {
        match self {
            Nutrient::Energy => "kcal",
            Nutrient::Carbohydrate | Nutrient::Protein | Nutrient::Fat => "g",
            Nutrient::VitaminA => "R.E",
            Nutrient::Thiamine
            | Nutrient::Riboflavin
            | Nutrient::VitaminC
            | Nutrient::Calcium
            | Nutrient::Iron => "mg",
        }
    }

    /// Case-sensitive lookup by Korean label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|n| n.label() == label)
    }
}

/// Recommended daily values, one per nutrient, in each nutrient's natural unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendedNutrients {
    pub energy: f64,
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
    pub vitamin_a: f64,
    pub thiamine: f64,
    pub riboflavin: f64,
    pub vitamin_c: f64,
    pub calcium: f64,
    pub iron: f64,
}

impl RecommendedNutrients {
    pub fn value(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Energy => self.energy,
            Nutrient::Carbohydrate => self.carbohydrate,
            Nutrient::Protein => self.protein,
            Nutrient::Fat => self.fat,
            Nutrient::VitaminA => self.vitamin_a,
            Nutrient::Thiamine => self.thiamine,
            Nutrient::Riboflavin => self.riboflavin,
            Nutrient::VitaminC => self.vitamin_c,
            Nutrient::Calcium => self.calcium,
            Nutrient::Iron => self.iron,
        }
    }

    /// Look up a recommended value by the Korean label used in meal text
    pub fn get(&self, label: &str) -> Option<f64> {
        Nutrient::from_label(label).map(|n| self.value(n))
    }

    /// (label, value, unit) rows in canonical nutrient order
    pub fn rows(&self) -> Vec<(&'static str, f64, &'static str)> {
        Nutrient::ALL
            .iter()
            .map(|n| (n.label(), self.value(*n), n.unit()))
            .collect()
    }
}

/// Total energy expenditure (kcal/day) for ages 8-19
pub fn total_energy_expenditure(profile: &UserProfile) -> f64 {
    let age = profile.age as f64;
    let height_m = profile.height / 100.0;
    let weight = profile.weight;

    match profile.gender {
        Gender::Male => 88.5 - 61.9 + age + 1.13 * (26.7 * weight + 903.0 * height_m) + 25.0,
        Gender::Female => {
            135.3 - 30.8 * age + 1.13 * (10.0 * weight + 934.0 * height_m) + 25.0
        }
    }
}

/// Thiamine (mg)
pub fn thiamine(age: i32, gender: Gender) -> f64 {
    match (gender, age) {
        (_, a) if a <= 8 => 0.7,
        (_, a) if a <= 11 => 0.9,
        (_, a) if a <= 14 => 1.1,
        (Gender::Male, _) => 1.3,
        (Gender::Female, _) => 1.1,
    }
}

/// Riboflavin (mg)
pub fn riboflavin(age: i32, gender: Gender) -> f64 {
    match gender {
        Gender::Male => match age {
            a if a <= 8 => 0.9,
            a if a <= 11 => 1.1,
            a if a <= 14 => 1.5,
            _ => 1.7,
        },
        Gender::Female => match age {
            a if a <= 8 => 0.8,
            a if a <= 11 => 1.0,
            _ => 1.2,
        },
    }
}

/// Vitamin C (mg)
pub fn vitamin_c(age: i32) -> f64 {
    match age {
        a if a <= 8 => 50.0,
        a if a <= 11 => 70.0,
        a if a <= 14 => 90.0,
        _ => 100.0,
    }
}

/// Calcium (mg); the 15+ bracket is lower than 12-14
pub fn calcium(age: i32) -> f64 {
    match age {
        a if a <= 8 => 700.0,
        a if a <= 11 => 800.0,
        a if a <= 14 => 1000.0,
        _ => 900.0,
    }
}

/// Iron (mg); males have no separate 12-14 bracket
pub fn iron(age: i32, gender: Gender) -> f64 {
    match gender {
        Gender::Male => match age {
            a if a <= 8 => 9.0,
            a if a <= 11 => 11.0,
            _ => 14.0,
        },
        Gender::Female => match age {
            a if a <= 8 => 9.0,
            a if a <= 11 => 10.0,
            a if a <= 14 => 16.0,
            _ => 14.0,
        },
    }
}

/// Vitamin A (R.E), independent of age
pub fn vitamin_a(gender: Gender) -> f64 {
    match gender {
        Gender::Male => 1400.0,
        Gender::Female => 1200.0,
    }
}

/// Compute all ten recommended daily values for a profile
///
/// Energy, carbohydrate, protein and fat are rounded half away from zero;
/// every other value is returned exactly as tabulated.
pub fn compute_recommended_intake(profile: &UserProfile) -> RecommendedNutrients {
    let tee = total_energy_expenditure(profile);

    RecommendedNutrients {
        energy: tee.round(),
        carbohydrate: (tee / 4.0).round(),
        protein: (profile.weight * 0.9).round(),
        fat: (tee * 0.225 / 9.0).round(),
        vitamin_a: vitamin_a(profile.gender),
        thiamine: thiamine(profile.age, profile.gender),
        riboflavin: riboflavin(profile.age, profile.gender),
        vitamin_c: vitamin_c(profile.age),
        calcium: calcium(profile.age),
        iron: iron(profile.age, profile.gender),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(age: i32, height: f64, weight: f64, gender: Gender) -> UserProfile {
        UserProfile { age, height, weight, gender }
    }

    #[test]
    fn test_male_15_reference_case() {
        let p = profile(15, 170.0, 65.0, Gender::Male);

        let tee = total_energy_expenditure(&p);
        assert!((tee - 3762.378).abs() < 1e-6);

        let r = compute_recommended_intake(&p);
        assert_eq!(r.energy, 3762.0);
        assert_eq!(r.carbohydrate, 941.0);
        assert_eq!(r.protein, 59.0);
        assert_eq!(r.fat, 94.0);
        assert_eq!(r.vitamin_a, 1400.0);
        assert_eq!(r.thiamine, 1.3);
        assert_eq!(r.riboflavin, 1.7);
        assert_eq!(r.vitamin_c, 100.0);
        assert_eq!(r.calcium, 900.0);
        assert_eq!(r.iron, 14.0);
    }

    #[test]
    fn test_female_tee_formula() {
        let p = profile(10, 140.0, 35.0, Gender::Female);
        // 135.3 - 308 + 1.13 * (350 + 1307.6) + 25
        let expected = 135.3 - 308.0 + 1.13 * (350.0 + 1307.6) + 25.0;
        assert!((total_energy_expenditure(&p) - expected).abs() < 1e-9);

        let r = compute_recommended_intake(&p);
        assert_eq!(r.energy, expected.round());
        assert_eq!(r.carbohydrate, (expected / 4.0).round());
        assert_eq!(r.fat, (expected * 0.225 / 9.0).round());
        assert_eq!(r.protein, 32.0); // 31.5 rounds up
    }

    #[test]
    fn test_thiamine_young_children_ignore_body_metrics() {
        for age in [-3, 0, 5, 8] {
            for (h, w) in [(100.0, 20.0), (180.0, 90.0), (1.0, 1.0)] {
                assert_eq!(compute_recommended_intake(&profile(age, h, w, Gender::Male)).thiamine, 0.7);
                assert_eq!(compute_recommended_intake(&profile(age, h, w, Gender::Female)).thiamine, 0.7);
            }
        }
    }

    #[test]
    fn test_vitamin_a_depends_only_on_gender() {
        for age in [6, 8, 12, 15, 19, 40] {
            for (h, w) in [(120.0, 25.0), (175.0, 70.0)] {
                assert_eq!(compute_recommended_intake(&profile(age, h, w, Gender::Male)).vitamin_a, 1400.0);
                assert_eq!(compute_recommended_intake(&profile(age, h, w, Gender::Female)).vitamin_a, 1200.0);
            }
        }
    }

    #[test]
    fn test_bracket_boundaries_are_inclusive() {
        assert_eq!(thiamine(11, Gender::Male), 0.9);
        assert_eq!(thiamine(12, Gender::Male), 1.1);
        assert_eq!(thiamine(14, Gender::Male), 1.1);
        assert_eq!(thiamine(15, Gender::Male), 1.3);
        assert_eq!(thiamine(15, Gender::Female), 1.1);

        assert_eq!(riboflavin(8, Gender::Female), 0.8);
        assert_eq!(riboflavin(9, Gender::Female), 1.0);
        assert_eq!(riboflavin(14, Gender::Male), 1.5);
        assert_eq!(riboflavin(15, Gender::Male), 1.7);
        assert_eq!(riboflavin(18, Gender::Female), 1.2);

        assert_eq!(vitamin_c(8), 50.0);
        assert_eq!(vitamin_c(11), 70.0);
        assert_eq!(vitamin_c(14), 90.0);
        assert_eq!(vitamin_c(15), 100.0);

        assert_eq!(calcium(14), 1000.0);
        assert_eq!(calcium(15), 900.0);
    }

    #[test]
    fn test_iron_brackets_differ_by_gender() {
        assert_eq!(iron(12, Gender::Male), 14.0);
        assert_eq!(iron(12, Gender::Female), 16.0);
        assert_eq!(iron(10, Gender::Male), 11.0);
        assert_eq!(iron(10, Gender::Female), 10.0);
        assert_eq!(iron(17, Gender::Female), 14.0);
    }

    #[test]
    fn test_ages_past_range_use_last_bracket() {
        let r = compute_recommended_intake(&profile(45, 170.0, 70.0, Gender::Male));
        assert_eq!(r.thiamine, 1.3);
        assert_eq!(r.riboflavin, 1.7);
        assert_eq!(r.vitamin_c, 100.0);
        assert_eq!(r.calcium, 900.0);
        assert_eq!(r.iron, 14.0);
    }

    #[test]
    fn test_table_precision_is_preserved() {
        let r = compute_recommended_intake(&profile(13, 160.0, 50.0, Gender::Male));
        assert_eq!(r.riboflavin, 1.5);
        assert_eq!(r.thiamine, 1.1);
        assert_eq!(r.energy.fract(), 0.0);
        assert_eq!(r.carbohydrate.fract(), 0.0);
        assert_eq!(r.protein.fract(), 0.0);
        assert_eq!(r.fat.fract(), 0.0);
    }

    #[test]
    fn test_absurd_inputs_do_not_panic() {
        let r = compute_recommended_intake(&profile(19, 0.0, 0.0, Gender::Female));
        assert!(r.energy.is_finite());
        let r = compute_recommended_intake(&profile(i32::MAX, -10.0, -5.0, Gender::Male));
        assert_eq!(r.iron, 14.0);
    }

    #[test]
    fn test_deterministic() {
        let p = profile(9, 133.3, 29.9, Gender::Female);
        assert_eq!(compute_recommended_intake(&p), compute_recommended_intake(&p));
    }

    #[test]
    fn test_get_by_label() {
        let r = compute_recommended_intake(&profile(15, 170.0, 65.0, Gender::Male));
        assert_eq!(r.get("단백질"), Some(59.0));
        assert_eq!(r.get("리보플라빈"), Some(1.7));
        assert_eq!(r.get("나트륨"), None);
        assert_eq!(r.rows().len(), 10);
    }

    #[test]
    fn test_gender_from_str() {
        assert_eq!(Gender::from_str("Male"), Some(Gender::Male));
        assert_eq!(Gender::from_str("여"), Some(Gender::Female));
        assert_eq!(Gender::from_str("other"), None);
    }
}
