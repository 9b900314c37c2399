//! Meal import tools
//!
//! Loads spreadsheet rows of published meals, registering each school once.

use std::collections::HashSet;

use serde::Serialize;

use super::{first_cell, optional_cell, Row};
use crate::db::{Database, DbError};
use crate::models::{parse_meal_count, MealRecord, MealRecordUpsert, School, SchoolUpsert};

/// Response for import_meals
#[derive(Debug, Serialize)]
pub struct ImportMealsResponse {
    pub success: bool,
    pub total_rows: usize,
    pub schools_imported: usize,
    pub meals_imported: usize,
    pub errors: Vec<String>,
}

/// School columns of a meal row
pub fn school_from_row(row: &Row) -> SchoolUpsert {
    SchoolUpsert {
        school_code: first_cell(row, &["school_code", "SD_SCHUL_CODE"]),
        school_name: first_cell(row, &["school_name", "SCHUL_NM"]),
        office_code: optional_cell(row, &["office_code", "ATPT_OFCDC_SC_CODE"]),
        office_name: optional_cell(row, &["office_name", "ATPT_OFCDC_SC_NM"]),
    }
}

/// Meal columns of a meal row; dates are normalized on insert
pub fn meal_from_row(row: &Row) -> MealRecordUpsert {
    MealRecordUpsert {
        school_code: first_cell(row, &["school_code", "SD_SCHUL_CODE"]),
        meal_code: first_cell(row, &["meal_code", "MMEAL_SC_CODE"]),
        meal_name: first_cell(row, &["meal_name", "MMEAL_SC_NM"]),
        meal_date: first_cell(row, &["meal_date", "MLSV_YMD"]),
        meal_count: parse_meal_count(&first_cell(row, &["meal_count", "MLSV_FGR"])),
        dish_names: optional_cell(row, &["dish_names", "DDISH_NM"]),
        origin_info: optional_cell(row, &["origin_info", "ORPLC_INFO"]),
        calorie_info: optional_cell(row, &["calorie_info", "CAL_INFO"]),
        nutrition_info: optional_cell(row, &["nutrition_info", "NTR_INFO"]),
        updated_date: optional_cell(row, &["updated_date", "LOAD_DTM"]),
    }
}

/// Import meal rows in one transaction
///
/// Schools are upserted first (the first row seen for a school wins), then
/// each meal is upserted on (school, date, meal code).
pub fn import_meals(db: &Database, rows: &[Row]) -> Result<ImportMealsResponse, String> {
    let mut seen = HashSet::new();
    let schools: Vec<SchoolUpsert> = rows
        .iter()
        .map(school_from_row)
        .filter(|s| !s.school_code.is_empty())
        .filter(|s| seen.insert(s.school_code.clone()))
        .collect();

    let mut schools_imported = 0;
    let mut meals_imported = 0;
    let mut errors = Vec::new();

    db.with_conn_mut(|conn| {
        let tx = conn.transaction()?;

        for school in &schools {
            School::upsert(&tx, school)?;
            schools_imported += 1;
        }

        for (index, row) in rows.iter().enumerate() {
            match MealRecord::upsert(&tx, &meal_from_row(row)) {
                Ok(_) => meals_imported += 1,
                Err(DbError::InvalidRecord(msg)) => errors.push(format!("Row {}: {}", index + 1, msg)),
                Err(e) => return Err(e),
            }
        }

        tx.commit()?;
        Ok(())
    })
    .map_err(|e| format!("Meal import failed: {}", e))?;

    tracing::info!(
        "Imported {} meals for {} schools ({} rows rejected)",
        meals_imported,
        schools_imported,
        errors.len()
    );

    Ok(ImportMealsResponse {
        success: errors.is_empty(),
        total_rows: rows.len(),
        schools_imported,
        meals_imported,
        errors,
    })
}
