//! Nutrient report aggregation
//!
//! Folds per-meal nutrient entries into one row per nutrient name.

use std::collections::HashMap;

use serde::{Deserialize, Serialize, Serializer};

/// One nutrient parsed from meal text, joined with its recommended value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientEntry {
    /// Korean label as written in the source text (e.g. "탄수화물")
    pub name: String,
    pub current: f64,
    pub recommended: f64,
    /// Unit captured verbatim from the source text (e.g. "g", "R.E")
    pub unit: String,
}

/// Consolidated nutrient totals across meals
///
/// The first occurrence of a name fixes its `recommended` and `unit`;
/// every occurrence adds to `current`. Rows keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutrientReport {
    entries: Vec<NutrientEntry>,
    index: HashMap<String, usize>,
}

impl NutrientReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh report from a batch of entries
    pub fn aggregate<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = NutrientEntry>,
    {
        let mut report = Self::new();
        report.merge(entries);
        report
    }

    /// Fold a new batch into this report
    ///
    /// Nutrients already present keep their established `recommended` and `unit`.
    pub fn merge<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = NutrientEntry>,
    {
        for entry in entries {
            match self.index.get(&entry.name) {
                Some(&i) => self.entries[i].current += entry.current,
                None => {
                    self.index.insert(entry.name.clone(), self.entries.len());
                    self.entries.push(entry);
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&NutrientEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[NutrientEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<NutrientEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<NutrientEntry> for NutrientReport {
    fn from_iter<I: IntoIterator<Item = NutrientEntry>>(iter: I) -> Self {
        Self::aggregate(iter)
    }
}

impl Extend<NutrientEntry> for NutrientReport {
    fn extend<I: IntoIterator<Item = NutrientEntry>>(&mut self, iter: I) {
        self.merge(iter);
    }
}

impl Serialize for NutrientReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NutrientReport {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<NutrientEntry>::deserialize(deserializer)?;
        Ok(Self::aggregate(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, current: f64, recommended: f64, unit: &str) -> NutrientEntry {
        NutrientEntry {
            name: name.to_string(),
            current,
            recommended,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn test_duplicate_names_sum_current() {
        let report = NutrientReport::aggregate(vec![
            entry("단백질", 10.0, 59.0, "g"),
            entry("단백질", 10.0, 59.0, "g"),
        ]);
        assert_eq!(report.len(), 1);
        let protein = report.get("단백질").unwrap();
        assert!((protein.current - 20.0).abs() < 1e-9);
        assert_eq!(protein.recommended, 59.0);
    }

    #[test]
    fn test_first_occurrence_wins_recommended_and_unit() {
        let report = NutrientReport::aggregate(vec![
            entry("나트륨", 400.0, 600.0, "mg"),
            entry("나트륨", 500.0, 750.0, "MG"),
        ]);
        let sodium = report.get("나트륨").unwrap();
        assert!((sodium.current - 900.0).abs() < 1e-9);
        assert_eq!(sodium.recommended, 600.0);
        assert_eq!(sodium.unit, "mg");
    }

    #[test]
    fn test_merge_into_existing_report() {
        let mut report = NutrientReport::aggregate(vec![
            entry("탄수화물", 120.0, 941.0, "g"),
            entry("지방", 20.0, 94.0, "g"),
        ]);

        report.merge(vec![
            entry("탄수화물", 30.0, 999.0, "g"),
            entry("칼슘", 150.0, 900.0, "mg"),
        ]);

        assert_eq!(report.len(), 3);
        let carbs = report.get("탄수화물").unwrap();
        assert!((carbs.current - 150.0).abs() < 1e-9);
        assert_eq!(carbs.recommended, 941.0);
        assert_eq!(report.get("칼슘").unwrap().recommended, 900.0);

        let names: Vec<&str> = report.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["탄수화물", "지방", "칼슘"]);
    }

    #[test]
    fn test_empty_input() {
        let report = NutrientReport::aggregate(Vec::new());
        assert!(report.is_empty());
        assert_eq!(serde_json::to_string(&report).unwrap(), "[]");
    }

    #[test]
    fn test_serializes_as_sequence() {
        let report: NutrientReport = vec![entry("철분", 2.5, 14.0, "mg")].into_iter().collect();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json[0]["name"], "철분");
        assert_eq!(json[0]["current"], 2.5);
        assert_eq!(json[0]["recommended"], 14.0);
        assert_eq!(json[0]["unit"], "mg");

        let back: NutrientReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
