use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    GroupedBar,
    HorizontalBar,
}

/// One named series; `values[i]` belongs to `categories[i]` of the owning chart.
/// Gaps are `None` so series of different spans share one category axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<i64>>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn dense(name: impl Into<String>, values: impl IntoIterator<Item = i64>) -> Self {
        Self::new(name, values.into_iter().map(Some).collect())
    }
}

/// Chart-library-agnostic payload handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPayload {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartPayload {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            categories: Vec::new(),
            series: Vec::new(),
        }
    }

    pub fn labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = x.into();
        self.y_label = y.into();
        self
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.categories = categories.into_iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a series, padding or cutting it to the category count.
    pub fn series(mut self, mut series: Series) -> Self {
        series.values.resize(self.categories.len(), None);
        self.series.push(series);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_aligned_to_categories() {
        let chart = ChartPayload::new(ChartKind::Line, "t")
            .categories([2021, 2022, 2023])
            .series(Series::dense("short", [1]))
            .series(Series::dense("long", [1, 2, 3, 4]));
        assert_eq!(chart.series[0].values, vec![Some(1), None, None]);
        assert_eq!(chart.series[1].values.len(), 3);
    }

    #[test]
    fn test_serializes_kind_snake_case() {
        let json = serde_json::to_value(ChartPayload::new(ChartKind::GroupedBar, "x")).unwrap();
        assert_eq!(json["kind"], "grouped_bar");
        assert_eq!(json["title"], "x");
    }
}
