//! Food Item model
//!
//! Catalog foods with per-serving nutrient values. Values keep the text form
//! of the source spreadsheet ("12.5", "-", "") and are parsed leniently when summed.

use std::collections::HashSet;

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::Nutrient;

/// A catalog food item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: i64,
    pub food_code: String,
    pub food_name: String,
    pub serving_size: String,
    pub calories: String,
    pub carbohydrate: String,
    pub protein: String,
    pub fat: String,
    pub vitamin_a: String,
    pub thiamine: String,
    pub riboflavin: String,
    pub vitamin_c: String,
    pub calcium: String,
    pub iron: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for inserting or replacing a food item (keyed by food_code)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodItemUpsert {
    pub food_code: String,
    pub food_name: String,
    pub serving_size: String,
    pub calories: String,
    pub carbohydrate: String,
    pub protein: String,
    pub fat: String,
    pub vitamin_a: String,
    pub thiamine: String,
    pub riboflavin: String,
    pub vitamin_c: String,
    pub calcium: String,
    pub iron: String,
}

impl FoodItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            food_code: row.get("food_code")?,
            food_name: row.get("food_name")?,
            serving_size: row.get("serving_size")?,
            calories: row.get("calories")?,
            carbohydrate: row.get("carbohydrate")?,
            protein: row.get("protein")?,
            fat: row.get("fat")?,
            vitamin_a: row.get("vitamin_a")?,
            thiamine: row.get("thiamine")?,
            riboflavin: row.get("riboflavin")?,
            vitamin_c: row.get("vitamin_c")?,
            calcium: row.get("calcium")?,
            iron: row.get("iron")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Raw text for a nutrient; energy reads the calories column
    pub fn nutrient_field(&self, nutrient: Nutrient) -> &str {
        match nutrient {
            Nutrient::Energy => &self.calories,
            Nutrient::Carbohydrate => &self.carbohydrate,
            Nutrient::Protein => &self.protein,
            Nutrient::Fat => &self.fat,
            Nutrient::VitaminA => &self.vitamin_a,
            Nutrient::Thiamine => &self.thiamine,
            Nutrient::Riboflavin => &self.riboflavin,
            Nutrient::VitaminC => &self.vitamin_c,
            Nutrient::Calcium => &self.calcium,
            Nutrient::Iron => &self.iron,
        }
    }

    /// Insert a food item or replace the one with the same food_code
    pub fn upsert(conn: &Connection, data: &FoodItemUpsert) -> DbResult<Self> {
        if data.food_code.trim().is_empty() {
            return Err(DbError::InvalidRecord("food_code cannot be empty".to_string()));
        }
        if data.food_name.trim().is_empty() {
            return Err(DbError::InvalidRecord(format!(
                "food item {} has no name",
                data.food_code
            )));
        }

        conn.execute(
            r#"
            INSERT INTO food_items (
                food_code, food_name, serving_size, calories, carbohydrate, protein, fat,
                vitamin_a, thiamine, riboflavin, vitamin_c, calcium, iron
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(food_code) DO UPDATE SET
                food_name = excluded.food_name,
                serving_size = excluded.serving_size,
                calories = excluded.calories,
                carbohydrate = excluded.carbohydrate,
                protein = excluded.protein,
                fat = excluded.fat,
                vitamin_a = excluded.vitamin_a,
                thiamine = excluded.thiamine,
                riboflavin = excluded.riboflavin,
                vitamin_c = excluded.vitamin_c,
                calcium = excluded.calcium,
                iron = excluded.iron,
                updated_at = datetime('now')
            "#,
            params![
                data.food_code.trim(),
                data.food_name.trim(),
                data.serving_size,
                data.calories,
                data.carbohydrate,
                data.protein,
                data.fat,
                data.vitamin_a,
                data.thiamine,
                data.riboflavin,
                data.vitamin_c,
                data.calcium,
                data.iron,
            ],
        )?;

        let mut stmt = conn.prepare("SELECT * FROM food_items WHERE food_code = ?1")?;
        let item = stmt.query_row([data.food_code.trim()], Self::from_row)?;
        Ok(item)
    }

    /// Get a food item by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_items WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch items in the order the IDs were first given; repeated IDs are
    /// fetched once and unknown IDs are reported back
    pub fn get_by_ids(conn: &Connection, ids: &[i64]) -> DbResult<(Vec<Self>, Vec<i64>)> {
        let mut found = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        let mut seen = HashSet::new();

        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            match Self::get_by_id(conn, id)? {
                Some(item) => found.push(item),
                None => missing.push(id),
            }
        }

        Ok((found, missing))
    }

    /// Case-insensitive substring search on food name
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", super::escape_like(query.trim()));
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM food_items
            WHERE food_name LIKE ?1 ESCAPE '\'
            ORDER BY food_name ASC
            LIMIT ?2
            "#,
        )?;

        let items = stmt
            .query_map(params![pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM food_items", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn item(code: &str, name: &str, protein: &str) -> FoodItemUpsert {
        FoodItemUpsert {
            food_code: code.to_string(),
            food_name: name.to_string(),
            serving_size: "200ml".to_string(),
            calories: "130".to_string(),
            protein: protein.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_upsert_replaces_by_food_code() {
        let conn = conn();
        let first = FoodItem::upsert(&conn, &item("D101", "우유", "6.0")).unwrap();
        let second = FoodItem::upsert(&conn, &item("D101", "저지방 우유", "6.5")).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.food_name, "저지방 우유");
        assert_eq!(second.nutrient_field(Nutrient::Protein), "6.5");
        assert_eq!(second.nutrient_field(Nutrient::Energy), "130");
        assert_eq!(FoodItem::count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_upsert_requires_code_and_name() {
        let conn = conn();
        assert!(matches!(
            FoodItem::upsert(&conn, &item("", "우유", "6")),
            Err(DbError::InvalidRecord(_))
        ));
        assert!(matches!(
            FoodItem::upsert(&conn, &item("D1", "  ", "6")),
            Err(DbError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let conn = conn();
        FoodItem::upsert(&conn, &item("B1", "Bagel 플레인", "9")).unwrap();
        FoodItem::upsert(&conn, &item("B2", "호밀 bagel", "8")).unwrap();
        FoodItem::upsert(&conn, &item("R1", "현미밥", "4")).unwrap();

        assert_eq!(FoodItem::search(&conn, "BAGEL", 20).unwrap().len(), 2);
        assert_eq!(FoodItem::search(&conn, "현미", 20).unwrap().len(), 1);
        assert_eq!(FoodItem::search(&conn, "bagel", 1).unwrap().len(), 1);
    }

    #[test]
    fn test_get_by_ids_keeps_order_and_reports_missing() {
        let conn = conn();
        let a = FoodItem::upsert(&conn, &item("A", "사과", "0.3")).unwrap();
        let b = FoodItem::upsert(&conn, &item("B", "바나나", "1.1")).unwrap();

        let (found, missing) = FoodItem::get_by_ids(&conn, &[b.id, 999, a.id]).unwrap();
        let names: Vec<&str> = found.iter().map(|i| i.food_name.as_str()).collect();
        assert_eq!(names, vec!["바나나", "사과"]);
        assert_eq!(missing, vec![999]);
    }

    #[test]
    fn test_get_by_ids_ignores_repeats() {
        let conn = conn();
        let a = FoodItem::upsert(&conn, &item("A", "사과", "0.3")).unwrap();

        let (found, missing) = FoodItem::get_by_ids(&conn, &[a.id, 999, a.id, 999]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(missing, vec![999]);
    }
}
