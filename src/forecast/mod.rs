// src/forecast/mod.rs

pub mod trend;

use serde::Serialize;
use tracing::debug;

use crate::aggregate::{self, YearlyTotal};
use crate::catalog;
use crate::dataset::EnrollmentRecord;

pub use trend::LinearTrend;

/// How many courses make the ranking.
pub const TOP_COURSES: usize = 3;
/// How many years the overall trend is projected forward.
pub const PROJECTION_YEARS: usize = 3;

/// Predicted next-year enrollment for one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoursePrediction {
    pub code: String,
    pub name: String,
    pub predicted: i64,
}

/// Everything forecast from one dataset snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// Latest year in the dataset.
    pub latest_year: i64,
    /// `latest_year + 1`, shared by every prediction below.
    pub next_year: i64,
    /// Observed overall totals per year, ascending.
    pub actual_totals: Vec<YearlyTotal>,
    /// Overall totals for `next_year` and the years after it; empty when the
    /// dataset spans a single year.
    pub projection: Vec<YearlyTotal>,
    /// Highest predicted courses for `next_year`, descending.
    pub top_courses: Vec<CoursePrediction>,
}

/// Year every forecast targets: one past the latest year in the whole dataset.
pub fn next_year(records: &[EnrollmentRecord]) -> Option<i64> {
    aggregate::latest_year(records).map(|y| y + 1)
}

/// Overall totals projected `steps` years from `from` along `trend`.
pub fn project_totals(trend: &LinearTrend, from: i64, steps: usize) -> Vec<YearlyTotal> {
    trend
        .project(from, steps)
        .into_iter()
        .map(|(year, total_enrollees)| YearlyTotal {
            year,
            total_enrollees,
        })
        .collect()
}

/// Predict `target_year` for every course with at least two distinct years.
///
/// Courses come back in order of first appearance; the rest are skipped silently.
pub fn predict_courses(records: &[EnrollmentRecord], target_year: i64) -> Vec<CoursePrediction> {
    let mut skipped = 0usize;
    let mut out = Vec::new();
    for (code, series) in aggregate::yearly_totals_by_course(records) {
        match LinearTrend::fit(&series) {
            Some(trend) => out.push(CoursePrediction {
                name: catalog::display_name(&code),
                predicted: trend.predict(target_year),
                code,
            }),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, eligible = out.len(), "skipped courses with under two years of history");
    }
    out
}

/// Stable sort by prediction descending, keep the first `n`.
pub fn rank_top(mut predictions: Vec<CoursePrediction>, n: usize) -> Vec<CoursePrediction> {
    predictions.sort_by(|a, b| b.predicted.cmp(&a.predicted));
    predictions.truncate(n);
    predictions
}

/// Fit the overall trend and rank courses. `None` for an empty dataset.
#[tracing::instrument(level = "debug", skip(records), fields(records = records.len()))]
pub fn forecast(records: &[EnrollmentRecord]) -> Option<Forecast> {
    let next_year = next_year(records)?;
    let latest_year = next_year - 1;

    let actual_totals = aggregate::yearly_totals(records);
    let projection = match LinearTrend::fit(&actual_totals) {
        Some(trend) => {
            debug!(
                slope = trend.slope(),
                intercept = trend.intercept(),
                points = trend.n_observations(),
                "fitted overall trend"
            );
            project_totals(&trend, next_year, PROJECTION_YEARS)
        }
        None => Vec::new(),
    };
    let top_courses = rank_top(predict_courses(records, next_year), TOP_COURSES);

    Some(Forecast {
        latest_year,
        next_year,
        actual_totals,
        projection,
        top_courses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i64, code: &str, n: i64) -> EnrollmentRecord {
        EnrollmentRecord::new(year, code, code, n)
    }

    #[test]
    fn test_perfect_line_projection() {
        let records = vec![
            rec(2021, "BSIT", 60),
            rec(2021, "BSCS", 40),
            rec(2022, "BSIT", 90),
            rec(2022, "BSCS", 60),
            rec(2023, "BSIT", 120),
            rec(2023, "BSCS", 80),
        ];
        let f = forecast(&records).unwrap();
        assert_eq!(f.next_year, 2024);
        let projected: Vec<(i64, i64)> = f
            .projection
            .iter()
            .map(|t| (t.year, t.total_enrollees))
            .collect();
        assert_eq!(projected, vec![(2024, 250), (2025, 300), (2026, 350)]);
        assert_eq!(f.top_courses[0].code, "BSIT");
        assert_eq!(f.top_courses[0].predicted, 150);
        assert_eq!(
            f.top_courses[0].name,
            "Bachelor of Science in Information Technology"
        );
        assert_eq!(f.top_courses[1].predicted, 100);
    }

    #[test]
    fn test_single_year_course_never_ranked() {
        let records = vec![
            rec(2022, "BSIT", 10),
            rec(2023, "BSIT", 12),
            rec(2023, "HUGE", 100_000),
        ];
        let top = forecast(&records).unwrap().top_courses;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].code, "BSIT");
    }

    #[test]
    fn test_next_year_is_dataset_wide() {
        // BSCS stops in 2021, but is still predicted for 2024
        let records = vec![
            rec(2020, "BSCS", 10),
            rec(2021, "BSCS", 20),
            rec(2022, "BSIT", 5),
            rec(2023, "BSIT", 6),
        ];
        let f = forecast(&records).unwrap();
        assert_eq!(f.next_year, 2024);
        let bscs = f.top_courses.iter().find(|c| c.code == "BSCS").unwrap();
        assert_eq!(bscs.predicted, 50);
    }

    #[test]
    fn test_ranking_top_three_stable() {
        let preds = ["A", "B", "C", "D", "E"]
            .iter()
            .zip([5, 9, 5, 9, 1])
            .map(|(code, predicted)| CoursePrediction {
                code: code.to_string(),
                name: code.to_string(),
                predicted,
            })
            .collect();
        let top = rank_top(preds, TOP_COURSES);
        let codes: Vec<&str> = top.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["B", "D", "A"]);
    }

    #[test]
    fn test_unknown_code_keeps_raw_name() {
        let records = vec![rec(2022, "ZZ9", 1), rec(2023, "ZZ9", 2)];
        let preds = predict_courses(&records, 2024);
        assert_eq!(preds[0].name, "ZZ9");
        assert_eq!(preds[0].predicted, 3);
    }

    #[test]
    fn test_single_year_dataset_has_no_projection() {
        let records = vec![rec(2023, "BSIT", 30), rec(2023, "BSCS", 20)];
        let f = forecast(&records).unwrap();
        assert_eq!(f.next_year, 2024);
        assert_eq!(
            f.actual_totals,
            vec![YearlyTotal {
                year: 2023,
                total_enrollees: 50
            }]
        );
        assert!(f.projection.is_empty());
        assert!(f.top_courses.is_empty());
    }

    #[test]
    fn test_empty_and_idempotent() {
        assert!(forecast(&[]).is_none());
        assert_eq!(next_year(&[]), None);

        let records = vec![rec(2021, "BSN", 3), rec(2022, "BSN", 8), rec(2022, "BSA", 1)];
        assert_eq!(forecast(&records), forecast(&records));
    }
}
