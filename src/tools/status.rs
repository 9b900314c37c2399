//! SNA Status Tool
//!
//! Runtime status of the service, and usage notes for assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::Database;
use crate::models::{FoodItem, School};

/// How to drive the analysis tools
pub const ANALYSIS_INSTRUCTIONS: &str = r#"
# SNA Meal Analysis Instructions

## 1. Find the school

- `search_schools` looks through schools already imported (name, 2+ characters).
- `search_school_directory` asks the NEIS school directory and needs `SNA_NEIS_API_KEY`.
- `list_meal_dates` shows which dates have stored meals for a school code.

## 2. Describe the student

Every analysis takes a profile:

```json
{"age": 15, "height": 170.0, "weight": 65.0, "gender": "male"}
```

Age must be 8-19, height (cm) and weight (kg) positive. `calculate_recommended_intake`
returns the daily reference values on their own.

## 3. Analyze a day

`analyze_meals` with `school_code`, `meal_date` (YYYY-MM-DD or YYYYMMDD) and the profile.
Breakfast and lunch are summed; dinner is listed but not counted. Each nutrient gets
a percentage of its reference value and a status:

| Status    | Label | Percentage   |
|-----------|-------|--------------|
| excess    | 초과  | over 100     |
| adequate  | 충족  | 90 - 100     |
| fair      | 양호  | 70 - 90      |
| deficient | 부족  | under 70     |

Nutrients without a reference value (e.g. 나트륨) get 1.5x their own amount as the
reference, so they always show 66.7%.

## 4. Add a breakfast

When `breakfast_addable` is true (lunch served, no breakfast), use `search_food_items`
to pick foods, then `add_breakfast` with the profile, the `report` from step 3 and the
chosen `food_item_ids`. The returned report includes the breakfast.

## 5. Loading data

`import_meals` and `import_food_items` read a JSON file holding an array of
spreadsheet rows. Meal rows use the meal service column names (`school_code`,
`meal_date`, `nutrition_info`, ...); food rows use the food composition table headers
(`식품코드`, `식품명`, `에너지(kcal)`, ...).
"#;

/// Service status information
#[derive(Debug, Serialize)]
pub struct SnaStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub school_count: Option<i64>,
    pub food_item_count: Option<i64>,
    pub meal_count: Option<i64>,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status; counts are omitted if the database is unreachable
    pub fn get_status(&self, db: &Database) -> SnaStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let school_count = db.with_conn(School::count).ok();
        let food_item_count = db.with_conn(FoodItem::count).ok();
        let meal_count: Option<i64> = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM meal_info", [], |row| row.get(0))?))
            .ok();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        SnaStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            school_count,
            food_item_count,
            meal_count,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_status_counts() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();

        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/sna.db"));
        let status = tracker.get_status(&db);

        assert_eq!(status.school_count, Some(0));
        assert_eq!(status.food_item_count, Some(0));
        assert_eq!(status.meal_count, Some(0));
        assert!(status.database_size_bytes.is_none());
        assert_eq!(status.process_id, std::process::id());
    }

    #[test]
    fn test_status_without_schema() {
        let db = Database::in_memory().unwrap();
        let status = StatusTracker::new(PathBuf::from("sna.db")).get_status(&db);
        assert!(status.school_count.is_none());
    }
}
