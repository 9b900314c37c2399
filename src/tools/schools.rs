//! School search tools
//!
//! Local search over imported schools, plus a lookup against the NEIS
//! school directory (`hub/schoolInfo`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::db::Database;
use crate::models::School;

pub const NEIS_SCHOOL_INFO_URL: &str = "https://open.neis.go.kr/hub/schoolInfo";
const NEIS_PAGE_SIZE: &str = "100";

/// Shortest school name accepted by either search
pub const MIN_QUERY_CHARS: usize = 2;

/// School directory error types
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("School name must be at least 2 characters")]
    QueryTooShort,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Directory returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected directory response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A school as listed by the directory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectorySchool {
    pub school_name: String,
    pub school_code: String,
    pub office_code: String,
    pub address: Option<String>,
    pub school_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NeisSchoolRow {
    #[serde(rename = "SCHUL_NM")]
    school_name: String,
    #[serde(rename = "SD_SCHUL_CODE")]
    school_code: String,
    #[serde(rename = "ATPT_OFCDC_SC_CODE")]
    office_code: String,
    #[serde(rename = "ORG_RDNMA", default)]
    address: Option<String>,
    #[serde(rename = "SCHUL_KND_SC_NM", default)]
    school_type: Option<String>,
}

impl From<NeisSchoolRow> for DirectorySchool {
    fn from(row: NeisSchoolRow) -> Self {
        Self {
            school_name: row.school_name,
            school_code: row.school_code,
            office_code: row.office_code,
            address: row.address,
            school_type: row.school_type,
        }
    }
}

/// Response for search_school_directory
#[derive(Debug, Serialize)]
pub struct DirectorySearchResponse {
    pub query: String,
    pub schools: Vec<DirectorySchool>,
    pub total: usize,
}

fn validate_query(query: &str) -> Result<&str, DirectoryError> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(DirectoryError::QueryTooShort);
    }
    Ok(query)
}

/// Extract schools from a `schoolInfo` payload
///
/// The payload is `{"schoolInfo": [{"head": ...}, {"row": [...]}]}`; a payload
/// without rows (e.g. the `INFO-200` no-data result) yields no schools.
pub fn parse_directory_response(body: &serde_json::Value) -> Result<Vec<DirectorySchool>, DirectoryError> {
    let Some(rows) = body.pointer("/schoolInfo/1/row") else {
        if let Some(code) = body.pointer("/RESULT/CODE").and_then(|c| c.as_str()) {
            tracing::debug!("Directory returned no rows ({})", code);
        }
        return Ok(Vec::new());
    };

    let rows: Vec<NeisSchoolRow> = serde_json::from_value(rows.clone())?;
    Ok(rows.into_iter().map(DirectorySchool::from).collect())
}

/// Look up schools by name in the NEIS directory
pub async fn search_school_directory(
    config: &Config,
    query: &str,
) -> Result<DirectorySearchResponse, DirectoryError> {
    let query = validate_query(query)?;
    let api_key = config.require_neis_api_key()?;

    let client = reqwest::Client::new();
    let resp = client
        .get(NEIS_SCHOOL_INFO_URL)
        .query(&[
            ("KEY", api_key),
            ("Type", "json"),
            ("pIndex", "1"),
            ("pSize", NEIS_PAGE_SIZE),
            ("SCHUL_NM", query),
        ])
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(DirectoryError::Status { status, body });
    }

    let body: serde_json::Value = resp.json().await?;
    let schools = parse_directory_response(&body)?;
    tracing::info!("Directory search '{}' returned {} schools", query, schools.len());

    Ok(DirectorySearchResponse {
        query: query.to_string(),
        total: schools.len(),
        schools,
    })
}

/// Response for search_schools
#[derive(Debug, Serialize)]
pub struct SearchSchoolsResponse {
    pub schools: Vec<School>,
    pub total: usize,
}

/// Substring search over locally stored schools
pub fn search_schools(db: &Database, query: &str, limit: i64) -> Result<SearchSchoolsResponse, String> {
    let query = validate_query(query).map_err(|e| e.to_string())?;
    let limit = limit.clamp(1, 100);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let schools = School::search(&conn, query, limit)
        .map_err(|e| format!("Search failed: {}", e))?;

    Ok(SearchSchoolsResponse {
        total: schools.len(),
        schools,
    })
}

/// Response for list_meal_dates
#[derive(Debug, Serialize)]
pub struct MealDatesResponse {
    pub school_code: String,
    pub dates: Vec<String>,
}

/// Dates with stored meals for a school, newest first
pub fn list_meal_dates(db: &Database, school_code: &str, limit: i64) -> Result<MealDatesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let dates = crate::models::MealRecord::list_dates(&conn, school_code, limit.clamp(1, 366))
        .map_err(|e| format!("Failed to list meal dates: {}", e))?;

    Ok(MealDatesResponse {
        school_code: school_code.to_string(),
        dates,
    })
}
