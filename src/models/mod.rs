//! Data models
//!
//! Rust structs representing database entities.

mod food_item;
mod meal_record;
mod school;

pub use food_item::{FoodItem, FoodItemUpsert};
pub use meal_record::{
    clean_dish_names, normalize_date, parse_meal_count, MealKind, MealRecord, MealRecordUpsert,
};
pub use school::{School, SchoolUpsert};

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern
pub(crate) fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("우유"), "우유");
    }
}
