//! Food Item tools
//!
//! Catalog search and spreadsheet import.

use serde::Serialize;

use super::{first_cell, Row};
use crate::db::{Database, DbError};
use crate::models::{FoodItem, FoodItemUpsert};

/// Shortest query that reaches the catalog
pub const MIN_QUERY_CHARS: usize = 2;
pub const SEARCH_LIMIT: i64 = 20;

/// Response for search_food_items
#[derive(Debug, Serialize)]
pub struct SearchFoodItemsResponse {
    pub items: Vec<FoodItem>,
    pub total: usize,
}

/// Search the catalog by name; queries shorter than two characters find nothing
pub fn search_food_items(db: &Database, query: &str) -> Result<SearchFoodItemsResponse, String> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Ok(SearchFoodItemsResponse {
            items: Vec::new(),
            total: 0,
        });
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let items = FoodItem::search(&conn, query, SEARCH_LIMIT)
        .map_err(|e| format!("Search failed: {}", e))?;

    Ok(SearchFoodItemsResponse {
        total: items.len(),
        items,
    })
}

/// Get a food item by ID
pub fn get_food_item(db: &Database, id: i64) -> Result<Option<FoodItem>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    FoodItem::get_by_id(&conn, id).map_err(|e| format!("Failed to get food item: {}", e))
}

/// Map a spreadsheet row to a catalog record; rows without a name give `None`
pub fn food_item_from_row(row: &Row) -> Option<FoodItemUpsert> {
    let food_name = first_cell(row, &["식품명", "음식명", "food_name"]);
    if food_name.is_empty() {
        return None;
    }

    Some(FoodItemUpsert {
        food_name,
        food_code: first_cell(row, &["식품코드", "food_code"]),
        serving_size: first_cell(row, &["1회제공량", "제공량", "serving_size"]),
        calories: first_cell(row, &["에너지(kcal)", "칼로리", "calories"]),
        carbohydrate: first_cell(row, &["탄수화물(g)", "carbohydrate"]),
        protein: first_cell(row, &["단백질(g)", "protein"]),
        fat: first_cell(row, &["지방(g)", "fat"]),
        vitamin_a: first_cell(row, &["비타민A(μg RAE)", "비타민A", "vitamin_a"]),
        thiamine: first_cell(row, &["티아민(mg)", "비타민B1", "thiamine"]),
        riboflavin: first_cell(row, &["리보플라빈(mg)", "비타민B2", "riboflavin"]),
        vitamin_c: first_cell(row, &["비타민C(mg)", "비타민C", "vitamin_c"]),
        calcium: first_cell(row, &["칼슘(mg)", "calcium"]),
        iron: first_cell(row, &["철(mg)", "iron"]),
    })
}

/// Response for import_food_items
#[derive(Debug, Serialize)]
pub struct ImportFoodItemsResponse {
    pub success: bool,
    pub total_rows: usize,
    pub imported: usize,
    /// Rows without a food name
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Upsert catalog rows by food_code in one transaction
///
/// Rows that fail validation are reported and skipped; a SQLite failure
/// rolls the whole import back.
pub fn import_food_items(db: &Database, rows: &[Row]) -> Result<ImportFoodItemsResponse, String> {
    let mut imported = 0;
    let mut skipped = 0;
    let mut errors = Vec::new();

    db.with_conn_mut(|conn| {
        let tx = conn.transaction()?;
        for (index, row) in rows.iter().enumerate() {
            let Some(item) = food_item_from_row(row) else {
                skipped += 1;
                continue;
            };
            match FoodItem::upsert(&tx, &item) {
                Ok(_) => imported += 1,
                Err(DbError::InvalidRecord(msg)) => errors.push(format!("Row {}: {}", index + 1, msg)),
                Err(e) => return Err(e),
            }
        }
        tx.commit()?;
        Ok(())
    })
    .map_err(|e| format!("Food import failed: {}", e))?;

    tracing::info!(
        "Imported {} food items ({} skipped, {} errors)",
        imported,
        skipped,
        errors.len()
    );

    Ok(ImportFoodItemsResponse {
        success: errors.is_empty(),
        total_rows: rows.len(),
        imported,
        skipped,
        errors,
    })
}
