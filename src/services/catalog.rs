use std::collections::BTreeSet;
use serde::Serialize;
use crate::utils::compare_option_values;

/// Category value that disables category filtering
pub const ALL_CATEGORIES: &str = "All Categories";

/// One vocabulary row, every field already normalized to text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    pub grade: String,
    pub semester: String,
    pub model: String,
    pub unit: String,
    pub category: String,
    pub english: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WordEntry {
    pub category: String,
    #[serde(rename = "English")]
    pub english: String,
}

pub struct FilterQuery<'a> {
    pub grade: &'a str,
    pub semester: &'a str,
    pub model: &'a str,
    pub unit: &'a str,
    pub category: Option<&'a str>,
}

/// Distinct values offered by the selection page, plus preselected defaults
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SelectionOptions {
    pub grades: Vec<String>,
    pub semesters: Vec<String>,
    pub models: Vec<String>,
    pub units: Vec<String>,
    pub categories: Vec<String>,
    pub default_grade: String,
    pub default_semester: String,
    pub default_model: String,
    pub default_unit: String,
    pub default_category: String,
}

pub struct Catalog {
    records: Vec<WordRecord>,
}

impl Catalog {
    pub fn new(records: Vec<WordRecord>) -> Self {
        Catalog { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Exact-match filter in sheet row order
    pub fn filter(&self, query: &FilterQuery) -> Vec<WordEntry> {
        let category = query.category.filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);

        self.records
            .iter()
            .filter(|r| {
                r.grade == query.grade
                    && r.semester == query.semester
                    && r.model == query.model
                    && r.unit == query.unit
            })
            .filter(|r| category.map_or(true, |c| r.category == c))
            .map(|r| WordEntry {
                category: r.category.clone(),
                english: r.english.clone(),
            })
            .collect()
    }

    pub fn options(&self) -> SelectionOptions {
        let grades = self.distinct(|r| &r.grade);
        let semesters = self.distinct(|r| &r.semester);
        let models = self.distinct(|r| &r.model);
        let units = self.distinct(|r| &r.unit);
        let categories = self.distinct(|r| &r.category);

        let default_grade = if grades.is_empty() { "" } else { "5" }.to_string();
        let default_semester = if semesters.is_empty() { "" } else { "1" }.to_string();
        let default_model = models.first().cloned().unwrap_or_default();
        let default_unit = units.first().cloned().unwrap_or_default();

        SelectionOptions {
            grades,
            semesters,
            models,
            units,
            categories,
            default_grade,
            default_semester,
            default_model,
            default_unit,
            default_category: ALL_CATEGORIES.to_string(),
        }
    }

    fn distinct<F>(&self, field: F) -> Vec<String>
    where
        F: Fn(&WordRecord) -> &String,
    {
        let set: BTreeSet<&String> = self.records.iter().map(field).collect();
        let mut values: Vec<String> = set.into_iter().cloned().collect();
        values.sort_by(|a, b| compare_option_values(a, b));
        values
    }
}

#[cfg(test)]
pub(crate) fn record(grade: &str, semester: &str, model: &str, unit: &str, category: &str, english: &str) -> WordRecord {
    WordRecord {
        grade: grade.to_string(),
        semester: semester.to_string(),
        model: model.to_string(),
        unit: unit.to_string(),
        category: category.to_string(),
        english: english.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        record("5", "1", "1", "1", "noun", "apple"),
        record("5", "1", "1", "1", "verb", "run"),
        record("5", "1", "1", "1", "noun", "ice cream"),
        record("5", "1", "1", "2", "noun", "banana"),
        record("5", "2", "1", "1", "noun", "teacher"),
        record("6", "1", "2", "1", "phrase", "look after"),
        record("10", "1", "1", "1", "noun", "physics"),
    ])
}
