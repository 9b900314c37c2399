//! Nutrient clause grammar
//!
//! Published meal nutrition is a delimited list of clauses shaped like
//! `탄수화물(g) : 68.0`. The delimiter changed across data revisions
//! (`<br/>`, newline, `|`), so the parser carries its separator set.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::intake::RecommendedNutrients;
use super::report::NutrientEntry;

/// `<name>(<unit>) : <value>` with non-greedy name and unit
static CLAUSE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(.+?)\((.+?)\)\s*:\s*(.+)$").ok());

/// Leading numeric literal; `,` only as a thousands separator between groups of three
static LEADING_NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").ok()
});

/// Multiplier applied to a parsed value when its nutrient has no reference value.
///
/// This is a placeholder carried over for compatibility with existing reports,
/// not a dietary rule.
pub const FALLBACK_RECOMMENDED_FACTOR: f64 = 1.5;

/// Clause delimiter used in a nutrition blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    /// `<br/>` (NEIS meal service text)
    #[serde(alias = "br")]
    LineBreak,
    Newline,
    Pipe,
}

impl Separator {
    pub const ALL: [Separator; 3] = [Separator::LineBreak, Separator::Newline, Separator::Pipe];

    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::LineBreak => "<br/>",
            Separator::Newline => "\n",
            Separator::Pipe => "|",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "br" | "linebreak" | "<br/>" => Some(Separator::LineBreak),
            "newline" | "nl" | "\\n" => Some(Separator::Newline),
            "pipe" | "|" => Some(Separator::Pipe),
            _ => None,
        }
    }
}

/// A clause that matched the grammar
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedClause {
    pub name: String,
    pub unit: String,
    pub value: f64,
}

/// Why a clause was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `name(unit) : value` shape
    NoMatch,
    /// Shape matched but the value is not a non-negative number
    InvalidValue,
}

/// Result of parsing a single clause
#[derive(Debug, Clone, PartialEq)]
pub enum ClauseOutcome {
    Matched(ParsedClause),
    Skipped { clause: String, reason: SkipReason },
}

/// Parse the leading number of a string the way lenient form fields do:
/// `" 1,217.3 Kcal"` is 1217.3, `"abc"` is None.
///
/// Misplaced commas (`"1,2,3"`, `"12,3456"`) and values that overflow to
/// infinity give None rather than a misread number.
pub fn parse_leading_number(s: &str) -> Option<f64> {
    let re = LEADING_NUMBER.as_ref()?;
    let trimmed = s.trim_start();
    let m = re.find(trimmed)?;

    let mut rest = trimmed[m.end()..].chars();
    match rest.next() {
        Some(',') if rest.next().is_some_and(|c| c.is_ascii_digit()) => return None,
        Some(c) if c.is_ascii_digit() && m.as_str().contains(',') => return None,
        _ => {}
    }

    let digits: String = m.as_str().chars().filter(|c| *c != ',').collect();
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse the free-form calorie field (e.g. `"1217.3 Kcal"`)
pub fn parse_calories(text: &str) -> Option<f64> {
    parse_leading_number(text)
}

/// Splits nutrition text into clauses and parses each one
#[derive(Debug, Clone)]
pub struct NutritionParser {
    separators: Vec<Separator>,
}

impl Default for NutritionParser {
    fn default() -> Self {
        Self::new(Separator::ALL.to_vec())
    }
}

impl NutritionParser {
    /// An empty separator list falls back to all known separators
    pub fn new(separators: Vec<Separator>) -> Self {
        let separators = if separators.is_empty() {
            Separator::ALL.to_vec()
        } else {
            separators
        };
        Self { separators }
    }

    pub fn separators(&self) -> &[Separator] {
        &self.separators
    }

    /// Split a nutrition blob into non-blank, trimmed clauses
    pub fn split_clauses<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut pieces = vec![text];
        for sep in &self.separators {
            pieces = pieces
                .into_iter()
                .flat_map(|p| p.split(sep.as_str()))
                .collect();
        }
        pieces
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Match one clause against `name(unit) : value`
    pub fn parse_clause(&self, clause: &str) -> ClauseOutcome {
        let clause = clause.trim();
        let skipped = |reason| ClauseOutcome::Skipped {
            clause: clause.to_string(),
            reason,
        };

        let Some(caps) = CLAUSE_PATTERN.as_ref().and_then(|re| re.captures(clause)) else {
            return skipped(SkipReason::NoMatch);
        };

        let name = caps.get(1).map_or("", |m| m.as_str()).trim();
        let unit = caps.get(2).map_or("", |m| m.as_str()).trim();
        let raw_value = caps.get(3).map_or("", |m| m.as_str());

        match parse_leading_number(raw_value) {
            Some(value) if value >= 0.0 => ClauseOutcome::Matched(ParsedClause {
                name: name.to_string(),
                unit: unit.to_string(),
                value,
            }),
            _ => skipped(SkipReason::InvalidValue),
        }
    }

    /// Parse every clause of a nutrition blob and join it with the recommended values
    ///
    /// Malformed clauses are dropped. Nutrients without a reference value get
    /// `value * FALLBACK_RECOMMENDED_FACTOR` as their recommendation.
    pub fn parse_nutrition_line(
        &self,
        text: &str,
        recommended: &RecommendedNutrients,
    ) -> Vec<NutrientEntry> {
        let mut entries = Vec::new();

        for clause in self.split_clauses(text) {
            match self.parse_clause(clause) {
                ClauseOutcome::Matched(parsed) => {
                    let recommended_value = match recommended.get(&parsed.name) {
                        Some(v) => v,
                        None => {
                            tracing::debug!(
                                "No reference value for '{}', using {}x fallback",
                                parsed.name,
                                FALLBACK_RECOMMENDED_FACTOR
                            );
                            parsed.value * FALLBACK_RECOMMENDED_FACTOR
                        }
                    };
                    entries.push(NutrientEntry {
                        name: parsed.name,
                        current: parsed.value,
                        recommended: recommended_value,
                        unit: parsed.unit,
                    });
                }
                ClauseOutcome::Skipped { clause, reason } => {
                    tracing::debug!("Skipping nutrition clause {:?}: {:?}", clause, reason);
                }
            }
        }

        entries
    }
}
