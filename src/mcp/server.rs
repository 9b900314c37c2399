//! SNA MCP Server Implementation
//!
//! Implements the MCP server with all SNA tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::db::Database;
use crate::nutrition::{Gender, NutrientEntry, NutritionParser, UserProfile};
use crate::tools::schools::DirectoryError;
use crate::tools::status::StatusTracker;
use crate::tools::{analysis, food_items, load_rows, meals, schools};

/// SNA MCP Service
#[derive(Clone)]
pub struct SnaService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    config: Arc<Config>,
    parser: NutritionParser,
    tool_router: ToolRouter<SnaService>,
}

impl SnaService {
    pub fn new(config: Config, database: Database) -> Self {
        let database_path: PathBuf = config.database_path.clone();
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            parser: NutritionParser::new(config.separators.clone()),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct ProfileParams {
    /// Age in years (8-19)
    pub age: i32,
    /// Height in cm
    pub height: f64,
    /// Weight in kg
    pub weight: f64,
    /// "male" or "female"
    pub gender: String,
}

impl ProfileParams {
    fn into_profile(self) -> Result<UserProfile, McpError> {
        let gender = Gender::from_str(&self.gender).ok_or_else(|| {
            McpError::invalid_params(format!("Unknown gender '{}' (use male or female)", self.gender), None)
        })?;
        let profile = UserProfile {
            age: self.age,
            height: self.height,
            weight: self.weight,
            gender,
        };
        analysis::validate_profile(&profile).map_err(|e| McpError::invalid_params(e, None))?;
        Ok(profile)
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateIntakeParams {
    pub profile: ProfileParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeMealsParams {
    /// School code (SD_SCHUL_CODE)
    pub school_code: String,
    /// Date as YYYY-MM-DD or YYYYMMDD
    pub meal_date: String,
    pub profile: ProfileParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeNutritionTextParams {
    /// Nutrition texts, one per meal, e.g. "탄수화물(g) : 68.0<br/>단백질(g) : 6.0"
    pub texts: Vec<String>,
    pub profile: ProfileParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReportEntryParams {
    pub name: String,
    pub current: f64,
    pub recommended: f64,
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddBreakfastParams {
    pub profile: ProfileParams,
    /// Report rows from a previous analysis (may be empty)
    #[serde(default)]
    pub report: Vec<ReportEntryParams>,
    /// Catalog food item IDs making up the breakfast
    pub food_item_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchFoodItemsParams {
    /// Name substring (2+ characters)
    pub query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetFoodItemParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchSchoolsParams {
    /// School name substring (2+ characters)
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListMealDatesParams {
    pub school_code: String,
    #[serde(default = "default_dates_limit")]
    pub limit: i64,
}

fn default_dates_limit() -> i64 { 31 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportFileParams {
    /// Path to a JSON file holding an array of row objects
    pub file_path: String,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl SnaService {
    // --- Status ---

    #[tool(description = "Get the current status of the SNA service including build info, database counts, and process information")]
    async fn sna_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        to_json(&status)
    }

    #[tool(description = "Get step-by-step instructions for analyzing school meals. Call this first when unsure how to use the analysis tools.")]
    fn analysis_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::ANALYSIS_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(ANALYSIS_INSTRUCTIONS)]))
    }

    // --- Analysis ---

    #[tool(description = "Calculate daily recommended nutrient intake for a student profile (age 8-19, height cm, weight kg, gender)")]
    fn calculate_recommended_intake(&self, Parameters(p): Parameters<CalculateIntakeParams>) -> Result<CallToolResult, McpError> {
        let profile = p.profile.into_profile()?;
        let result = analysis::calculate_recommended_intake(profile).map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Analyze a school's published meals for one date against a student profile. Dinner is excluded from the totals. Reports whether a breakfast can be added.")]
    fn analyze_meals(&self, Parameters(p): Parameters<AnalyzeMealsParams>) -> Result<CallToolResult, McpError> {
        let profile = p.profile.into_profile()?;
        let result = analysis::analyze_meals(&self.database, &self.parser, &p.school_code, &p.meal_date, profile)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Parse raw meal nutrition text (\"name(unit) : value\" clauses) and compare the totals with a student profile's recommended intake")]
    fn analyze_nutrition_text(&self, Parameters(p): Parameters<AnalyzeNutritionTextParams>) -> Result<CallToolResult, McpError> {
        let profile = p.profile.into_profile()?;
        let result = analysis::analyze_nutrition_text(&self.parser, &p.texts, profile)
            .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Build a breakfast from catalog food items and merge its nutrients into an existing analysis report")]
    fn add_breakfast(&self, Parameters(p): Parameters<AddBreakfastParams>) -> Result<CallToolResult, McpError> {
        let profile = p.profile.into_profile()?;
        let existing: Vec<NutrientEntry> = p
            .report
            .into_iter()
            .map(|e| NutrientEntry {
                name: e.name,
                current: e.current,
                recommended: e.recommended,
                unit: e.unit,
            })
            .collect();
        let result = analysis::add_breakfast(&self.database, &self.parser, profile, existing, &p.food_item_ids)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Food Items ---

    #[tool(description = "Search catalog food items by name (case-insensitive, 2+ characters, up to 20 results)")]
    fn search_food_items(&self, Parameters(p): Parameters<SearchFoodItemsParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::search_food_items(&self.database, &p.query).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a catalog food item by ID")]
    fn get_food_item(&self, Parameters(p): Parameters<GetFoodItemParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::get_food_item(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(item) => to_json(&item),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Food item not found", "id": {}}}"#,
                p.id
            ))])),
        }
    }

    #[tool(description = "Import food composition rows from a JSON file (array of objects with 식품코드, 식품명, 에너지(kcal), ... columns). Upserts by food code.")]
    fn import_food_items(&self, Parameters(p): Parameters<ImportFileParams>) -> Result<CallToolResult, McpError> {
        let rows = load_rows(&p.file_path).map_err(|e| McpError::invalid_params(e, None))?;
        let result = food_items::import_food_items(&self.database, &rows).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Meals & Schools ---

    #[tool(description = "Import published meal rows from a JSON file (array of objects with school_code, school_name, meal_code, meal_name, meal_date, nutrition_info, ...). Registers schools and replaces existing meals.")]
    fn import_meals(&self, Parameters(p): Parameters<ImportFileParams>) -> Result<CallToolResult, McpError> {
        let rows = load_rows(&p.file_path).map_err(|e| McpError::invalid_params(e, None))?;
        let result = meals::import_meals(&self.database, &rows).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Search imported schools by name")]
    fn search_schools(&self, Parameters(p): Parameters<SearchSchoolsParams>) -> Result<CallToolResult, McpError> {
        let result = schools::search_schools(&self.database, &p.query, p.limit).map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Search the NEIS school directory by name (requires SNA_NEIS_API_KEY)")]
    async fn search_school_directory(&self, Parameters(p): Parameters<SearchSchoolsParams>) -> Result<CallToolResult, McpError> {
        let result = schools::search_school_directory(&self.config, &p.query)
            .await
            .map_err(|e| match e {
                DirectoryError::QueryTooShort => McpError::invalid_params(e.to_string(), None),
                _ => McpError::internal_error(e.to_string(), None),
            })?;
        to_json(&result)
    }

    #[tool(description = "List dates with stored meals for a school, newest first")]
    fn list_meal_dates(&self, Parameters(p): Parameters<ListMealDatesParams>) -> Result<CallToolResult, McpError> {
        let result = schools::list_meal_dates(&self.database, &p.school_code, p.limit).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for SnaService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "sna".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("School Nutrition Analyzer".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "School Nutrition Analyzer (SNA) - compares school meal nutrition with a student's recommended intake. \
                 IMPORTANT: Call analysis_instructions first. \
                 Intake: calculate_recommended_intake. \
                 Analysis: analyze_meals, analyze_nutrition_text, add_breakfast. \
                 Schools: search_schools, search_school_directory, list_meal_dates. \
                 Food catalog: search_food_items, get_food_item. \
                 Data: import_meals, import_food_items. \
                 Status: sna_status."
                    .into(),
            ),
        }
    }
}
