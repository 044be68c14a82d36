// src/report/dashboard.rs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ChartKind, ChartPayload, Series, NO_DATA_MESSAGE};
use crate::aggregate::{self, LabelTotal, YearlyTotal};
use crate::dataset::{DatasetRepository, EnrollmentRecord};

/// How many courses the all-time ranking shows.
pub const DASHBOARD_TOP_COURSES: usize = 5;

/// Selector state for the dashboard's filtered charts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DashboardQuery {
    pub year: Option<i64>,
    pub course: Option<String>,
}

/// Data behind the dashboard page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardReport {
    pub has_data: bool,
    pub message: Option<String>,
    pub years: Vec<i64>,
    pub courses: Vec<String>,
    pub selected_year: Option<i64>,
    pub selected_course: Option<String>,
    pub total_per_year: Vec<YearlyTotal>,
    pub top_courses: Vec<LabelTotal>,
    pub year_distribution: Vec<LabelTotal>,
    pub course_trend: Vec<YearlyTotal>,
    pub charts: Vec<ChartPayload>,
}

impl DashboardReport {
    pub fn empty() -> Self {
        Self {
            has_data: false,
            message: Some(NO_DATA_MESSAGE.to_string()),
            years: Vec::new(),
            courses: Vec::new(),
            selected_year: None,
            selected_course: None,
            total_per_year: Vec::new(),
            top_courses: Vec::new(),
            year_distribution: Vec::new(),
            course_trend: Vec::new(),
            charts: Vec::new(),
        }
    }
}

/// Load the dataset from `repo` and assemble the dashboard.
pub fn build_dashboard(
    repo: &dyn DatasetRepository,
    query: &DashboardQuery,
) -> Result<DashboardReport> {
    let records = repo.load()?;
    Ok(assemble_dashboard(&records, query))
}

/// Assemble the dashboard from already-cleaned records.
///
/// Without a selection the latest year and the first course name (alphabetically)
/// are shown. A selection absent from the data yields empty filtered series.
#[tracing::instrument(level = "info", skip(records), fields(records = records.len()))]
pub fn assemble_dashboard(records: &[EnrollmentRecord], query: &DashboardQuery) -> DashboardReport {
    if records.is_empty() {
        info!("empty dataset; placeholder dashboard");
        return DashboardReport::empty();
    }

    let years = aggregate::distinct_years(records);
    let courses = aggregate::distinct_course_names(records);
    let selected_year = query.year.or_else(|| years.last().copied());
    let selected_course = query.course.clone().or_else(|| courses.first().cloned());

    let total_per_year = aggregate::yearly_totals(records);

    let mut top_courses = aggregate::totals_by_code(records);
    top_courses.sort_by(|a, b| b.total_enrollees.cmp(&a.total_enrollees));
    top_courses.truncate(DASHBOARD_TOP_COURSES);

    let mut year_distribution = match selected_year {
        Some(y) => aggregate::totals_by_name_in_year(records, y),
        None => Vec::new(),
    };
    year_distribution.sort_by_key(|t| t.total_enrollees);

    let course_trend = match &selected_course {
        Some(name) => aggregate::yearly_totals_for_course_name(records, name),
        None => Vec::new(),
    };

    let charts = vec![
        yearly_line("Total Enrollees Per Year", &total_per_year),
        label_bar(
            ChartKind::Bar,
            "Top 5 Courses by Total Enrollees",
            "Course",
            &top_courses,
        ),
        label_bar(
            ChartKind::HorizontalBar,
            &format!(
                "Course Distribution in {}",
                selected_year.map(|y| y.to_string()).unwrap_or_default()
            ),
            "Course",
            &year_distribution,
        ),
        yearly_line(
            &format!(
                "Enrollment Trend for {}",
                selected_course.as_deref().unwrap_or_default()
            ),
            &course_trend,
        ),
    ];

    DashboardReport {
        has_data: true,
        message: None,
        years,
        courses,
        selected_year,
        selected_course,
        total_per_year,
        top_courses,
        year_distribution,
        course_trend,
        charts,
    }
}

fn yearly_line(title: &str, series: &[YearlyTotal]) -> ChartPayload {
    ChartPayload::new(ChartKind::Line, title)
        .labels("Academic Year", "Number of Enrollees")
        .categories(series.iter().map(|t| t.year))
        .series(Series::dense(
            "Enrollees",
            series.iter().map(|t| t.total_enrollees),
        ))
}

fn label_bar(kind: ChartKind, title: &str, x_label: &str, totals: &[LabelTotal]) -> ChartPayload {
    ChartPayload::new(kind, title)
        .labels(x_label, "Number of Enrollees")
        .categories(totals.iter().map(|t| t.label.as_str()))
        .series(Series::dense(
            "Enrollees",
            totals.iter().map(|t| t.total_enrollees),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i64, code: &str, name: &str, n: i64) -> EnrollmentRecord {
        EnrollmentRecord::new(year, code, name, n)
    }

    fn sample() -> Vec<EnrollmentRecord> {
        vec![
            rec(2021, "BSIT", "Information Technology", 100),
            rec(2021, "BSCS", "Computer Science", 80),
            rec(2022, "BSIT", "Information Technology", 120),
            rec(2022, "BSCS", "Computer Science", 70),
            rec(2022, "BSN", "Nursing", 90),
            rec(2022, "BSA", "Accountancy", 10),
            rec(2022, "BSHM", "Hospitality", 15),
            rec(2022, "BSTM", "Tourism", 15),
        ]
    }

    #[test]
    fn test_defaults_to_latest_year_and_first_course() {
        let d = assemble_dashboard(&sample(), &DashboardQuery::default());
        assert!(d.has_data);
        assert_eq!(d.years, vec![2021, 2022]);
        assert_eq!(d.selected_year, Some(2022));
        assert_eq!(d.selected_course.as_deref(), Some("Accountancy"));
        assert_eq!(d.charts.len(), 4);
        assert_eq!(d.charts[2].title, "Course Distribution in 2022");
    }

    #[test]
    fn test_top_five_by_all_time_total() {
        let d = assemble_dashboard(&sample(), &DashboardQuery::default());
        let labels: Vec<&str> = d.top_courses.iter().map(|t| t.label.as_str()).collect();
        // BSHM and BSTM tie at 15; code order breaks it
        assert_eq!(labels, vec!["BSIT", "BSCS", "BSN", "BSHM", "BSTM"]);
        assert_eq!(d.top_courses[0].total_enrollees, 220);
    }

    #[test]
    fn test_selected_year_and_course() {
        let q = DashboardQuery {
            year: Some(2021),
            course: Some("Computer Science".to_string()),
        };
        let d = assemble_dashboard(&sample(), &q);
        let dist: Vec<(&str, i64)> = d
            .year_distribution
            .iter()
            .map(|t| (t.label.as_str(), t.total_enrollees))
            .collect();
        assert_eq!(
            dist,
            vec![("Computer Science", 80), ("Information Technology", 100)]
        );
        assert_eq!(
            d.course_trend,
            vec![
                YearlyTotal { year: 2021, total_enrollees: 80 },
                YearlyTotal { year: 2022, total_enrollees: 70 },
            ]
        );
    }

    #[test]
    fn test_unknown_selection_is_empty_not_error() {
        let q = DashboardQuery {
            year: Some(1999),
            course: Some("Basket Weaving".to_string()),
        };
        let d = assemble_dashboard(&sample(), &q);
        assert!(d.year_distribution.is_empty());
        assert!(d.course_trend.is_empty());
    }

    #[test]
    fn test_empty_dataset_placeholder() {
        let d = assemble_dashboard(&[], &DashboardQuery::default());
        assert_eq!(d, DashboardReport::empty());
    }
}
