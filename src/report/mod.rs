// src/report/mod.rs

pub mod chart;
pub mod dashboard;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::aggregate::{self, YearlyTotal};
use crate::dataset::{DatasetRepository, EnrollmentRecord};
use crate::forecast::{self, CoursePrediction};

pub use chart::{ChartKind, ChartPayload, Series};
pub use dashboard::{build_dashboard, DashboardQuery, DashboardReport};

pub const NO_DATA_MESSAGE: &str = "No data available. Please upload a dataset.";

/// Data behind the prediction page.
///
/// `course_labels`, `actual_values` and `predicted_values` are positionally
/// aligned with `top_courses`; `future_years` with `predicted_totals`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub has_data: bool,
    pub message: Option<String>,
    pub latest_year: Option<i64>,
    pub next_year: Option<i64>,
    pub actual_totals: Vec<YearlyTotal>,
    pub future_years: Vec<i64>,
    pub predicted_totals: Vec<i64>,
    pub top_courses: Vec<CoursePrediction>,
    pub course_labels: Vec<String>,
    pub actual_values: Vec<i64>,
    pub predicted_values: Vec<i64>,
    pub trend_chart: ChartPayload,
    pub comparison_chart: ChartPayload,
}

impl ForecastReport {
    /// Placeholder for an empty dataset.
    pub fn empty() -> Self {
        Self {
            has_data: false,
            message: Some(NO_DATA_MESSAGE.to_string()),
            latest_year: None,
            next_year: None,
            actual_totals: Vec::new(),
            future_years: Vec::new(),
            predicted_totals: Vec::new(),
            top_courses: Vec::new(),
            course_labels: Vec::new(),
            actual_values: Vec::new(),
            predicted_values: Vec::new(),
            trend_chart: trend_chart(&[], &[]),
            comparison_chart: comparison_chart(&[], &[], &[], None, None),
        }
    }
}

/// Load the dataset from `repo` and assemble the forecast report.
pub fn build_forecast_report(repo: &dyn DatasetRepository) -> Result<ForecastReport> {
    let records = repo.load()?;
    Ok(assemble_forecast_report(&records))
}

/// Assemble the forecast report from already-cleaned records.
#[tracing::instrument(level = "info", skip(records), fields(records = records.len()))]
pub fn assemble_forecast_report(records: &[EnrollmentRecord]) -> ForecastReport {
    let Some(fc) = forecast::forecast(records) else {
        info!("empty dataset; placeholder report");
        return ForecastReport::empty();
    };

    let future_years: Vec<i64> = fc.projection.iter().map(|t| t.year).collect();
    let predicted_totals: Vec<i64> = fc.projection.iter().map(|t| t.total_enrollees).collect();

    let course_labels: Vec<String> = fc.top_courses.iter().map(|c| c.name.clone()).collect();
    let predicted_values: Vec<i64> = fc.top_courses.iter().map(|c| c.predicted).collect();
    let actual_values: Vec<i64> = fc
        .top_courses
        .iter()
        .map(|c| aggregate::course_total_in_year(records, &c.code, fc.latest_year))
        .collect();

    info!(
        next_year = fc.next_year,
        top_courses = fc.top_courses.len(),
        projected = fc.projection.len(),
        "forecast report built"
    );

    ForecastReport {
        has_data: true,
        message: None,
        latest_year: Some(fc.latest_year),
        next_year: Some(fc.next_year),
        trend_chart: trend_chart(&fc.actual_totals, &fc.projection),
        comparison_chart: comparison_chart(
            &course_labels,
            &actual_values,
            &predicted_values,
            Some(fc.latest_year),
            Some(fc.next_year),
        ),
        actual_totals: fc.actual_totals,
        future_years,
        predicted_totals,
        top_courses: fc.top_courses,
        course_labels,
        actual_values,
        predicted_values,
    }
}

/// Actual totals followed by the projection on one year axis.
fn trend_chart(actual: &[YearlyTotal], projected: &[YearlyTotal]) -> ChartPayload {
    let mut years: Vec<i64> = actual.iter().chain(projected).map(|t| t.year).collect();
    years.sort_unstable();
    years.dedup();

    let lookup = |series: &[YearlyTotal], year: i64| {
        series
            .iter()
            .find(|t| t.year == year)
            .map(|t| t.total_enrollees)
    };
    let actual_values = years.iter().map(|&y| lookup(actual, y)).collect();
    let predicted_values = years.iter().map(|&y| lookup(projected, y)).collect();

    ChartPayload::new(ChartKind::Line, "Total Enrollees: Actual and Forecast")
        .labels("Academic Year", "Number of Enrollees")
        .categories(years)
        .series(Series::new("Actual", actual_values))
        .series(Series::new("Forecast", predicted_values))
}

/// Latest actual vs. predicted enrollees for each ranked course.
fn comparison_chart(
    labels: &[String],
    actual: &[i64],
    predicted: &[i64],
    latest_year: Option<i64>,
    next_year: Option<i64>,
) -> ChartPayload {
    let name = |prefix: &str, year: Option<i64>| match year {
        Some(y) => format!("{} {}", prefix, y),
        None => prefix.to_string(),
    };
    ChartPayload::new(ChartKind::GroupedBar, "Top Courses: Actual vs. Predicted")
        .labels("Course", "Number of Enrollees")
        .categories(labels)
        .series(Series::dense(name("Actual", latest_year), actual.iter().copied()))
        .series(Series::dense(
            name("Predicted", next_year),
            predicted.iter().copied(),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::CsvDatasetRepository;
    use tempfile::tempdir;

    fn rec(year: i64, code: &str, n: i64) -> EnrollmentRecord {
        EnrollmentRecord::new(year, code, code, n)
    }

    #[test]
    fn test_report_alignment() {
        let records = vec![
            rec(2021, "BSIT", 50),
            rec(2022, "BSIT", 60),
            rec(2023, "BSIT", 70),
            rec(2021, "BSCS", 30),
            rec(2022, "BSCS", 40),
            rec(2023, "BSCS", 50),
            rec(2021, "BSN", 20),
            rec(2022, "BSN", 30),
            rec(2021, "BSA", 5),
            rec(2022, "BSA", 6),
            rec(2023, "BSA", 7),
        ];
        let report = assemble_forecast_report(&records);

        assert!(report.has_data);
        assert_eq!(report.next_year, Some(2024));
        assert_eq!(report.future_years, vec![2024, 2025, 2026]);
        assert_eq!(report.predicted_totals.len(), report.future_years.len());

        assert_eq!(report.top_courses.len(), 3);
        assert_eq!(report.course_labels.len(), 3);
        assert_eq!(report.actual_values.len(), 3);
        assert_eq!(report.predicted_values.len(), 3);

        let codes: Vec<&str> = report.top_courses.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["BSIT", "BSCS", "BSN"]);
        assert_eq!(report.predicted_values, vec![80, 60, 50]);
        // BSN has no 2023 rows
        assert_eq!(report.actual_values, vec![70, 50, 0]);

        assert_eq!(report.comparison_chart.categories, report.course_labels);
        assert_eq!(report.comparison_chart.series[0].name, "Actual 2023");
        assert_eq!(report.comparison_chart.series[1].name, "Predicted 2024");

        let trend = &report.trend_chart;
        assert_eq!(trend.categories.len(), 6);
        assert_eq!(trend.series[0].values[3], None);
        assert_eq!(trend.series[1].values[0], None);
        assert!(trend.series[1].values[3].is_some());
    }

    #[test]
    fn test_empty_repository_gives_placeholder() -> Result<()> {
        let dir = tempdir()?;
        let repo = CsvDatasetRepository::new(dir.path(), "master_dataset.csv")?;
        let report = build_forecast_report(&repo)?;
        assert_eq!(report, ForecastReport::empty());
        assert_eq!(report.message.as_deref(), Some(NO_DATA_MESSAGE));
        Ok(())
    }

    #[test]
    fn test_report_from_repository() -> Result<()> {
        let dir = tempdir()?;
        let repo = CsvDatasetRepository::new(dir.path(), "master_dataset.csv")?;
        repo.append_csv(
            "upload.csv",
            b"year,code,coursename,num_of_enrollees\n2021,BSIT,IT,100\n2022,BSIT,IT,150\n2023,BSIT,IT,200\n2023,X,Y,oops\n",
        )?;
        let report = build_forecast_report(&repo)?;
        assert_eq!(report.predicted_totals, vec![250, 300, 350]);
        assert_eq!(report.top_courses[0].predicted, 250);
        Ok(())
    }
}
