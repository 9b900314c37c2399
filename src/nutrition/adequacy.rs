//! Intake adequacy classification
//!
//! Grades a report row by how much of its recommended value was eaten.

use serde::Serialize;

use super::report::{NutrientEntry, NutrientReport};

/// Share of the recommendation covered by the day's meals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdequacyStatus {
    /// Over 100%
    Excess,
    /// 90-100%
    Adequate,
    /// 70-90%
    Fair,
    /// Under 70%
    Deficient,
}

impl AdequacyStatus {
    /// Classify a percentage of the recommended value
    ///
    /// NaN (0/0) lands in `Deficient`; +inf (x/0) in `Excess`.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage > 100.0 {
            AdequacyStatus::Excess
        } else if percentage >= 90.0 {
            AdequacyStatus::Adequate
        } else if percentage >= 70.0 {
            AdequacyStatus::Fair
        } else {
            AdequacyStatus::Deficient
        }
    }

    /// Korean label shown next to the nutrient
    pub fn label(&self) -> &'static str {
        match self {
            AdequacyStatus::Excess => "초과",
            AdequacyStatus::Adequate => "충족",
            AdequacyStatus::Fair => "양호",
            AdequacyStatus::Deficient => "부족",
        }
    }
}

/// A report row with its adequacy grade
#[derive(Debug, Clone, Serialize)]
pub struct NutrientAssessment {
    pub name: String,
    pub current: f64,
    pub recommended: f64,
    pub unit: String,
    pub percentage: f64,
    pub status: AdequacyStatus,
    pub status_label: &'static str,
}

impl From<&NutrientEntry> for NutrientAssessment {
    fn from(entry: &NutrientEntry) -> Self {
        let percentage = entry.current / entry.recommended * 100.0;
        let status = AdequacyStatus::from_percentage(percentage);
        Self {
            name: entry.name.clone(),
            current: entry.current,
            recommended: entry.recommended,
            unit: entry.unit.clone(),
            percentage,
            status,
            status_label: status.label(),
        }
    }
}

/// Grade every row of a report, keeping report order
pub fn assess(report: &NutrientReport) -> Vec<NutrientAssessment> {
    report.entries().iter().map(NutrientAssessment::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(current: f64, recommended: f64) -> NutrientEntry {
        NutrientEntry {
            name: "칼슘".to_string(),
            current,
            recommended,
            unit: "mg".to_string(),
        }
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(AdequacyStatus::from_percentage(100.1), AdequacyStatus::Excess);
        assert_eq!(AdequacyStatus::from_percentage(100.0), AdequacyStatus::Adequate);
        assert_eq!(AdequacyStatus::from_percentage(90.0), AdequacyStatus::Adequate);
        assert_eq!(AdequacyStatus::from_percentage(89.9), AdequacyStatus::Fair);
        assert_eq!(AdequacyStatus::from_percentage(70.0), AdequacyStatus::Fair);
        assert_eq!(AdequacyStatus::from_percentage(69.9), AdequacyStatus::Deficient);
    }

    #[test]
    fn test_zero_recommendation() {
        assert_eq!(NutrientAssessment::from(&entry(5.0, 0.0)).status, AdequacyStatus::Excess);
        assert_eq!(NutrientAssessment::from(&entry(0.0, 0.0)).status, AdequacyStatus::Deficient);
    }

    #[test]
    fn test_assess_report() {
        let report = NutrientReport::aggregate(vec![entry(450.0, 900.0)]);
        let rows = assess(&report);
        assert_eq!(rows.len(), 1);
        assert!((rows[0].percentage - 50.0).abs() < 1e-9);
        assert_eq!(rows[0].status_label, "부족");
    }
}
