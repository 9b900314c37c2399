//! Meal record model
//!
//! A meal as published by the school meal service: dish list, calorie text
//! and nutrition text for one school, date and meal code.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::{parse_calories, parse_leading_number, Separator};

/// Allergen markers after dish names: "(5)", "(1.5.6.)"
static ALLERGEN_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\(\d+(?:\.\d+)*\.?\)").ok());

/// Meal kind, derived from the published meal name
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealKind {
    Breakfast,
    Lunch,
    Dinner,
    Other,
}

impl MealKind {
    pub fn from_meal_name(name: &str) -> Self {
        match name.trim() {
            "조식" => MealKind::Breakfast,
            "중식" => MealKind::Lunch,
            "석식" => MealKind::Dinner,
            _ => MealKind::Other,
        }
    }
}

/// A stored meal record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: i64,
    pub school_code: String,
    pub meal_code: String,
    pub meal_name: String,
    pub meal_date: String,
    pub meal_count: Option<f64>,
    pub dish_names: Option<String>,
    pub origin_info: Option<String>,
    pub calorie_info: Option<String>,
    pub nutrition_info: Option<String>,
    pub updated_date: Option<String>,
    pub created_at: String,
}

/// Data for inserting or replacing a meal record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealRecordUpsert {
    pub school_code: String,
    pub meal_code: String,
    pub meal_name: String,
    pub meal_date: String,
    pub meal_count: Option<f64>,
    pub dish_names: Option<String>,
    pub origin_info: Option<String>,
    pub calorie_info: Option<String>,
    pub nutrition_info: Option<String>,
    pub updated_date: Option<String>,
}

/// Normalize `YYYYMMDD` to `YYYY-MM-DD`; anything else is returned trimmed
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    match NaiveDate::parse_from_str(trimmed, "%Y%m%d") {
        Ok(date) if trimmed.len() == 8 => date.format("%Y-%m-%d").to_string(),
        _ => trimmed.to_string(),
    }
}

/// Split a `<br/>`- or newline-joined dish list and strip allergen markers
pub fn clean_dish_names(dish_names: &str) -> Vec<String> {
    dish_names
        .split(Separator::LineBreak.as_str())
        .flat_map(|part| part.split(Separator::Newline.as_str()))
        .map(|dish| match ALLERGEN_MARKER.as_ref() {
            Some(re) => re.replace_all(dish, "").trim().to_string(),
            None => dish.trim().to_string(),
        })
        .filter(|dish| !dish.is_empty())
        .collect()
}

impl MealRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            school_code: row.get("school_code")?,
            meal_code: row.get("meal_code")?,
            meal_name: row.get("meal_name")?,
            meal_date: row.get("meal_date")?,
            meal_count: row.get("meal_count")?,
            dish_names: row.get("dish_names")?,
            origin_info: row.get("origin_info")?,
            calorie_info: row.get("calorie_info")?,
            nutrition_info: row.get("nutrition_info")?,
            updated_date: row.get("updated_date")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn kind(&self) -> MealKind {
        MealKind::from_meal_name(&self.meal_name)
    }

    /// Dish names without allergen markers
    pub fn dishes(&self) -> Vec<String> {
        self.dish_names
            .as_deref()
            .map(clean_dish_names)
            .unwrap_or_default()
    }

    /// Calories parsed from the calorie text
    pub fn calories(&self) -> Option<f64> {
        self.calorie_info.as_deref().and_then(parse_calories)
    }

    /// Insert a meal record, replacing any record for the same school, date and meal code
    pub fn upsert(conn: &Connection, data: &MealRecordUpsert) -> DbResult<Self> {
        if data.school_code.trim().is_empty() || data.meal_code.trim().is_empty() {
            return Err(DbError::InvalidRecord(
                "school_code and meal_code are required".to_string(),
            ));
        }

        let meal_date = normalize_date(&data.meal_date);
        let updated_date = data.updated_date.as_deref().map(normalize_date);

        conn.execute(
            r#"
            INSERT INTO meal_info (
                school_code, meal_code, meal_name, meal_date, meal_count,
                dish_names, origin_info, calorie_info, nutrition_info, updated_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(school_code, meal_date, meal_code) DO UPDATE SET
                meal_name = excluded.meal_name,
                meal_count = excluded.meal_count,
                dish_names = excluded.dish_names,
                origin_info = excluded.origin_info,
                calorie_info = excluded.calorie_info,
                nutrition_info = excluded.nutrition_info,
                updated_date = excluded.updated_date
            "#,
            params![
                data.school_code,
                data.meal_code,
                data.meal_name,
                meal_date,
                data.meal_count,
                data.dish_names,
                data.origin_info,
                data.calorie_info,
                data.nutrition_info,
                updated_date,
            ],
        )?;

        let mut stmt = conn.prepare(
            "SELECT * FROM meal_info WHERE school_code = ?1 AND meal_date = ?2 AND meal_code = ?3",
        )?;
        let record = stmt.query_row(params![data.school_code, meal_date, data.meal_code], Self::from_row)?;
        Ok(record)
    }

    /// All records for a school on a date, ordered by meal code
    pub fn get_for_school_date(conn: &Connection, school_code: &str, meal_date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meal_info WHERE school_code = ?1 AND meal_date = ?2 ORDER BY meal_code ASC, id ASC",
        )?;

        let records = stmt
            .query_map(params![school_code, normalize_date(meal_date)], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Dates with stored meals for a school, newest first
    pub fn list_dates(conn: &Connection, school_code: &str, limit: i64) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT meal_date FROM meal_info WHERE school_code = ?1 ORDER BY meal_date DESC LIMIT ?2",
        )?;

        let dates = stmt
            .query_map(params![school_code, limit], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(dates)
    }
}

/// Parse a spreadsheet meal count cell ("1,024", "830.0", "")
pub fn parse_meal_count(raw: &str) -> Option<f64> {
    parse_leading_number(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{School, SchoolUpsert};

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        School::upsert(
            &conn,
            &SchoolUpsert {
                school_code: "7010057".to_string(),
                school_name: "서울고등학교".to_string(),
                office_code: None,
                office_name: None,
            },
        )
        .unwrap();
        conn
    }

    fn meal(code: &str, name: &str, date: &str, nutrition: &str) -> MealRecordUpsert {
        MealRecordUpsert {
            school_code: "7010057".to_string(),
            meal_code: code.to_string(),
            meal_name: name.to_string(),
            meal_date: date.to_string(),
            dish_names: Some("쌀밥<br/>된장국(5.6.)<br/>".to_string()),
            calorie_info: Some("812.4 Kcal".to_string()),
            nutrition_info: Some(nutrition.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("20250304"), "2025-03-04");
        assert_eq!(normalize_date("2025-03-04"), "2025-03-04");
        assert_eq!(normalize_date("20251399"), "20251399");
        assert_eq!(normalize_date(" 2025.03.04 "), "2025.03.04");
    }

    #[test]
    fn test_clean_dish_names() {
        assert_eq!(
            clean_dish_names("현미밥<br/>소고기미역국(5.6.13.16.)<br/>김치(9)<br/> "),
            vec!["현미밥", "소고기미역국", "김치"]
        );
        assert_eq!(
            clean_dish_names("흰쌀밥\n곰탕&소면 (5.6.13.16)\n컵과일(수능) (12)"),
            vec!["흰쌀밥", "곰탕&소면", "컵과일(수능)"]
        );
    }

    #[test]
    fn test_meal_kind() {
        assert_eq!(MealKind::from_meal_name("조식"), MealKind::Breakfast);
        assert_eq!(MealKind::from_meal_name("중식"), MealKind::Lunch);
        assert_eq!(MealKind::from_meal_name("석식"), MealKind::Dinner);
        assert_eq!(MealKind::from_meal_name("간식"), MealKind::Other);
    }

    #[test]
    fn test_upsert_replaces_same_meal() {
        let conn = conn();
        MealRecord::upsert(&conn, &meal("2", "중식", "20250304", "단백질(g) : 10.0")).unwrap();
        let replaced = MealRecord::upsert(&conn, &meal("2", "중식", "2025-03-04", "단백질(g) : 12.0")).unwrap();

        assert_eq!(replaced.meal_date, "2025-03-04");
        let records = MealRecord::get_for_school_date(&conn, "7010057", "2025-03-04").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].nutrition_info.as_deref(), Some("단백질(g) : 12.0"));
    }

    #[test]
    fn test_records_ordered_by_meal_code() {
        let conn = conn();
        MealRecord::upsert(&conn, &meal("3", "석식", "20250304", "")).unwrap();
        MealRecord::upsert(&conn, &meal("1", "조식", "20250304", "")).unwrap();
        MealRecord::upsert(&conn, &meal("2", "중식", "20250304", "")).unwrap();

        let records = MealRecord::get_for_school_date(&conn, "7010057", "20250304").unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.meal_name.as_str()).collect();
        assert_eq!(names, vec!["조식", "중식", "석식"]);
        assert_eq!(records[0].dishes(), vec!["쌀밥", "된장국"]);
        assert_eq!(records[0].calories(), Some(812.4));
        assert_eq!(MealRecord::list_dates(&conn, "7010057", 10).unwrap(), vec!["2025-03-04"]);
    }

    #[test]
    fn test_unknown_school_rejected_by_foreign_key() {
        let conn = conn();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        let mut orphan = meal("2", "중식", "20250304", "");
        orphan.school_code = "0000000".to_string();
        assert!(MealRecord::upsert(&conn, &orphan).is_err());
    }

    #[test]
    fn test_parse_meal_count() {
        assert_eq!(parse_meal_count("1,024"), Some(1024.0));
        assert_eq!(parse_meal_count(""), None);
    }
}
