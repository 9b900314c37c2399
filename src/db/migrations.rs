//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: schools, published meals and the food catalog
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- SCHOOLS
        -- One row per school from the education office directory
        -- ============================================
        CREATE TABLE schools (
            school_code TEXT PRIMARY KEY,        -- SD_SCHUL_CODE
            school_name TEXT NOT NULL,
            office_code TEXT,                    -- ATPT_OFCDC_SC_CODE
            office_name TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_schools_name ON schools(school_name);

        -- ============================================
        -- MEAL INFO
        -- Published meals; text fields are stored as the service returns them
        -- ============================================
        CREATE TABLE meal_info (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            school_code TEXT NOT NULL REFERENCES schools(school_code) ON DELETE CASCADE,
            meal_code TEXT NOT NULL,             -- "1" breakfast, "2" lunch, "3" dinner
            meal_name TEXT NOT NULL,             -- 조식 / 중식 / 석식
            meal_date TEXT NOT NULL,             -- ISO date: "2025-03-04"
            meal_count REAL,
            dish_names TEXT,                     -- <br/>-joined, with allergen markers
            origin_info TEXT,
            calorie_info TEXT,                   -- e.g. "812.4 Kcal"
            nutrition_info TEXT,                 -- <br/>-joined "name(unit) : value" clauses
            updated_date TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),

            UNIQUE(school_code, meal_date, meal_code)
        );

        CREATE INDEX idx_meal_info_school_date ON meal_info(school_code, meal_date);

        -- ============================================
        -- FOOD ITEMS
        -- Catalog used to build a breakfast by hand.
        -- Nutrient columns keep the spreadsheet text as-is.
        -- ============================================
        CREATE TABLE food_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            food_code TEXT NOT NULL UNIQUE,
            food_name TEXT NOT NULL,
            serving_size TEXT NOT NULL DEFAULT '',
            calories TEXT NOT NULL DEFAULT '',
            carbohydrate TEXT NOT NULL DEFAULT '',
            protein TEXT NOT NULL DEFAULT '',
            fat TEXT NOT NULL DEFAULT '',
            vitamin_a TEXT NOT NULL DEFAULT '',
            thiamine TEXT NOT NULL DEFAULT '',
            riboflavin TEXT NOT NULL DEFAULT '',
            vitamin_c TEXT NOT NULL DEFAULT '',
            calcium TEXT NOT NULL DEFAULT '',
            iron TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_food_items_name ON food_items(food_name);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
