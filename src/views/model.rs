//! View Model Module
//! Chart-ready aggregate shapes and the closed set of dashboard views.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The six dashboard views, in dropdown order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewKind {
    #[default]
    Transmission,
    DailyCases,
    StateWise,
    AgeWise,
    StateEmergence,
    PatientStatus,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown view code: {0}")]
pub struct UnknownViewCode(pub String);

impl ViewKind {
    pub const ALL: [ViewKind; 6] = [
        ViewKind::Transmission,
        ViewKind::DailyCases,
        ViewKind::StateWise,
        ViewKind::AgeWise,
        ViewKind::StateEmergence,
        ViewKind::PatientStatus,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable short identifier.
    pub fn code(self) -> &'static str {
        match self {
            ViewKind::Transmission => "TRANS",
            ViewKind::DailyCases => "TOT",
            ViewKind::StateWise => "STATE",
            ViewKind::AgeWise => "AGE",
            ViewKind::StateEmergence => "HIST",
            ViewKind::PatientStatus => "STATUS",
        }
    }

    /// Dropdown entry text.
    pub fn label(self) -> &'static str {
        match self {
            ViewKind::Transmission => "Type of transmission",
            ViewKind::DailyCases => "Total number of cases by date",
            ViewKind::StateWise => "State wise cases",
            ViewKind::AgeWise => "Age wise cases",
            ViewKind::StateEmergence => "Case emergence based on state",
            ViewKind::PatientStatus => "Patient current status",
        }
    }

    /// Chart title.
    pub fn title(self) -> &'static str {
        match self {
            ViewKind::Transmission => "Type of transmission",
            ViewKind::DailyCases => "No of cases vs Date with rangeslider",
            ViewKind::StateWise => "Statewise distribution of cases",
            ViewKind::AgeWise => "Age wise distribution of cases",
            ViewKind::StateEmergence => "Case emergence based on state",
            ViewKind::PatientStatus => "Patient status",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ViewKind {
    type Err = UnknownViewCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewKind::ALL
            .into_iter()
            .find(|k| k.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownViewCode(s.to_string()))
    }
}

/// One numeric series aligned by index to the view labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedSeries {
    pub name: String,
    pub values: Vec<u64>,
}

impl NamedSeries {
    pub fn new(name: impl Into<String>, values: Vec<u64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }
}

/// Category or date labels plus parallel numeric series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryView {
    pub labels: Vec<String>,
    pub series: Vec<NamedSeries>,
}

impl CategoryView {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A view with a single series.
    pub fn single(name: &str, labels: Vec<String>, values: Vec<u64>) -> Self {
        Self {
            labels,
            series: vec![NamedSeries::new(name, values)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.series.is_empty()
    }

    pub fn series(&self, name: &str) -> Option<&NamedSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Sum over every series.
    pub fn total(&self) -> u64 {
        self.series.iter().map(NamedSeries::total).sum()
    }

    /// `(label, value)` pairs of the first series.
    pub fn pairs(&self) -> Vec<(&str, u64)> {
        match self.series.first() {
            Some(s) => self
                .labels
                .iter()
                .map(String::as_str)
                .zip(s.values.iter().copied())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Per-record points of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointSeries {
    pub name: String,
    pub points: Vec<(NaiveDate, u64)>,
}

/// Independent point series, one per group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScatterView {
    pub series: Vec<PointSeries>,
}

impl ScatterView {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn series(&self, name: &str) -> Option<&PointSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    /// Earliest and latest date over all series.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.series.iter().flat_map(|s| s.points.iter().map(|p| p.0));
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

/// A named, chart-ready summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AggregateView {
    Category(CategoryView),
    Scatter(ScatterView),
}

impl AggregateView {
    pub fn is_empty(&self) -> bool {
        match self {
            AggregateView::Category(v) => v.is_empty(),
            AggregateView::Scatter(v) => v.is_empty(),
        }
    }

    pub fn as_category(&self) -> Option<&CategoryView> {
        match self {
            AggregateView::Category(v) => Some(v),
            AggregateView::Scatter(_) => None,
        }
    }

    pub fn as_scatter(&self) -> Option<&ScatterView> {
        match self {
            AggregateView::Scatter(v) => Some(v),
            AggregateView::Category(_) => None,
        }
    }
}

/// The full result set of one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardViews {
    views: [AggregateView; 6],
}

impl DashboardViews {
    pub fn new(
        transmission: CategoryView,
        daily_cases: CategoryView,
        state_wise: CategoryView,
        age_wise: CategoryView,
        state_emergence: ScatterView,
        patient_status: CategoryView,
    ) -> Self {
        Self {
            views: [
                AggregateView::Category(transmission),
                AggregateView::Category(daily_cases),
                AggregateView::Category(state_wise),
                AggregateView::Category(age_wise),
                AggregateView::Scatter(state_emergence),
                AggregateView::Category(patient_status),
            ],
        }
    }

    pub fn get(&self, kind: ViewKind) -> &AggregateView {
        &self.views[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ViewKind, &AggregateView)> {
        ViewKind::ALL.into_iter().zip(self.views.iter())
    }
}

impl Serialize for DashboardViews {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(kind, view)| (kind.code(), view)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_from_str() {
        for kind in ViewKind::ALL {
            assert_eq!(kind.code().parse::<ViewKind>(), Ok(kind));
        }
        assert_eq!("status".parse::<ViewKind>(), Ok(ViewKind::PatientStatus));
        assert_eq!(
            "PIE".parse::<ViewKind>(),
            Err(UnknownViewCode("PIE".to_string()))
        );
    }

    #[test]
    fn default_view_is_first_in_dropdown() {
        assert_eq!(ViewKind::default(), ViewKind::Transmission);
        assert_eq!(ViewKind::default(), ViewKind::ALL[0]);
    }

    #[test]
    fn index_matches_dropdown_order() {
        for (i, kind) in ViewKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn category_pairs_follow_first_series() {
        let view = CategoryView::single(
            "cases",
            vec!["Kerala".into(), "Delhi".into()],
            vec![3, 1],
        );
        assert_eq!(view.pairs(), vec![("Kerala", 3), ("Delhi", 1)]);
        assert_eq!(view.total(), 4);
        assert!(CategoryView::empty().pairs().is_empty());
    }

    #[test]
    fn scatter_date_range_spans_all_series() {
        let d = |day| NaiveDate::from_ymd_opt(2020, 3, day).unwrap();
        let view = ScatterView {
            series: vec![
                PointSeries {
                    name: "Kerala".into(),
                    points: vec![(d(5), 1), (d(2), 2)],
                },
                PointSeries {
                    name: "Delhi".into(),
                    points: vec![(d(9), 3)],
                },
            ],
        };
        assert_eq!(view.date_range(), Some((d(2), d(9))));
        assert_eq!(view.point_count(), 3);
        assert_eq!(ScatterView::default().date_range(), None);
    }
}
