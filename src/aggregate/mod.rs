// src/aggregate/mod.rs

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::dataset::EnrollmentRecord;

/// Enrollee sum for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearlyTotal {
    pub year: i64,
    pub total_enrollees: i64,
}

/// Enrollee sum for one label (course code or course name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelTotal {
    pub label: String,
    pub total_enrollees: i64,
}

/// Sum enrollees per year over every record, sorted by year ascending.
pub fn yearly_totals(records: &[EnrollmentRecord]) -> Vec<YearlyTotal> {
    sum_by_year(records.iter())
}

/// Sum enrollees per year over the records carrying a given course name.
pub fn yearly_totals_for_course_name(
    records: &[EnrollmentRecord],
    course_name: &str,
) -> Vec<YearlyTotal> {
    sum_by_year(records.iter().filter(|r| r.course_name == course_name))
}

/// Per-course yearly series, keyed by course code.
///
/// Codes come back in order of first appearance in `records`.
pub fn yearly_totals_by_course(records: &[EnrollmentRecord]) -> Vec<(String, Vec<YearlyTotal>)> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, BTreeMap<i64, i64>> = HashMap::new();
    for r in records {
        let by_year = groups.entry(r.course_code.as_str()).or_insert_with(|| {
            order.push(r.course_code.as_str());
            BTreeMap::new()
        });
        *by_year.entry(r.year).or_insert(0) += r.num_enrollees;
    }

    order
        .into_iter()
        .map(|code| {
            let series = groups
                .remove(code)
                .unwrap_or_default()
                .into_iter()
                .map(|(year, total_enrollees)| YearlyTotal {
                    year,
                    total_enrollees,
                })
                .collect();
            (code.to_string(), series)
        })
        .collect()
}

/// Latest year present, if any.
pub fn latest_year(records: &[EnrollmentRecord]) -> Option<i64> {
    records.iter().map(|r| r.year).max()
}

/// Enrollees of `code` in `year`; zero when the course has no rows that year.
pub fn course_total_in_year(records: &[EnrollmentRecord], code: &str, year: i64) -> i64 {
    records
        .iter()
        .filter(|r| r.year == year && r.course_code == code)
        .map(|r| r.num_enrollees)
        .sum()
}

/// All-time enrollee sum per course code, sorted by code ascending.
pub fn totals_by_code(records: &[EnrollmentRecord]) -> Vec<LabelTotal> {
    sum_by_label(records.iter(), |r| r.course_code.as_str())
}

/// Enrollee sum per course name within `year`, sorted by course name ascending.
pub fn totals_by_name_in_year(records: &[EnrollmentRecord], year: i64) -> Vec<LabelTotal> {
    sum_by_label(records.iter().filter(|r| r.year == year), |r| {
        r.course_name.as_str()
    })
}

/// Distinct years, ascending.
pub fn distinct_years(records: &[EnrollmentRecord]) -> Vec<i64> {
    let mut years: Vec<i64> = records.iter().map(|r| r.year).collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Distinct course names, ascending.
pub fn distinct_course_names(records: &[EnrollmentRecord]) -> Vec<String> {
    let mut names: Vec<&str> = records.iter().map(|r| r.course_name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    names.into_iter().map(str::to_string).collect()
}

fn sum_by_year<'a>(records: impl Iterator<Item = &'a EnrollmentRecord>) -> Vec<YearlyTotal> {
    let mut by_year: BTreeMap<i64, i64> = BTreeMap::new();
    for r in records {
        *by_year.entry(r.year).or_insert(0) += r.num_enrollees;
    }
    by_year
        .into_iter()
        .map(|(year, total_enrollees)| YearlyTotal {
            year,
            total_enrollees,
        })
        .collect()
}

fn sum_by_label<'a>(
    records: impl Iterator<Item = &'a EnrollmentRecord>,
    key: impl Fn(&'a EnrollmentRecord) -> &'a str,
) -> Vec<LabelTotal> {
    let mut by_label: BTreeMap<&str, i64> = BTreeMap::new();
    for r in records {
        *by_label.entry(key(r)).or_insert(0) += r.num_enrollees;
    }
    by_label
        .into_iter()
        .map(|(label, total_enrollees)| LabelTotal {
            label: label.to_string(),
            total_enrollees,
        })
        .collect()
}
