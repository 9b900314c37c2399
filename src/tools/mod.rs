//! SNA Tools module
//!
//! Tool implementations behind the MCP service and the import binary.

pub mod analysis;
pub mod food_items;
pub mod meals;
pub mod schools;
pub mod status;

use serde_json::{Map, Value};

/// One spreadsheet row exported as a JSON object
pub type Row = Map<String, Value>;

/// Read a JSON file holding an array of row objects
pub fn load_rows(file_path: &str) -> Result<Vec<Row>, String> {
    let text = std::fs::read_to_string(file_path)
        .map_err(|e| format!("Failed to open file '{}': {}", file_path, e))?;
    parse_rows(&text).map_err(|e| format!("Invalid row file '{}': {}", file_path, e))
}

/// Parse a JSON array of row objects
pub fn parse_rows(text: &str) -> Result<Vec<Row>, serde_json::Error> {
    serde_json::from_str(text)
}

/// Text of a spreadsheet cell; numbers keep their JSON spelling, null is empty
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// First non-empty cell among alternative column names
pub(crate) fn first_cell(row: &Row, columns: &[&str]) -> String {
    columns
        .iter()
        .filter_map(|col| row.get(*col))
        .map(cell_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Like [`first_cell`], but empty cells become `None`
pub(crate) fn optional_cell(row: &Row, columns: &[&str]) -> Option<String> {
    Some(first_cell(row, columns)).filter(|text| !text.is_empty())
}
