//! Aggregator Module
//! Derives the six dashboard views from a normalized case table.
//!
//! Every function here is pure: the same table always yields the same views,
//! and an empty table yields empty views.

use crate::data::normalizer::{IMPORTED, LOCAL, TO_BE_DETERMINED};
use crate::data::record::{CaseRecord, CaseTable, NA};
use crate::views::model::{CategoryView, DashboardViews, NamedSeries, PointSeries, ScatterView};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Transmission categories, in chart order.
pub const TRANSMISSION_LABELS: [&str; 4] = [IMPORTED, LOCAL, NA, TO_BE_DETERMINED];

/// Half-open age bins `[lower, upper)` and their labels.
pub const AGE_BINS: [(f64, f64, &str); 4] = [
    (0.0, 13.0, "Kid"),
    (13.0, 20.0, "Teen"),
    (20.0, 60.0, "Adult"),
    (60.0, 110.0, "Senior citizen"),
];

/// Series name of the single-series count views.
pub const CASES_SERIES: &str = "cases";

/// Computes aggregate views. Holds no state.
pub struct Aggregator;

impl Aggregator {
    /// Compute all six views.
    pub fn aggregate(table: &CaseTable) -> DashboardViews {
        let records = table.records();
        tracing::info!("aggregating {} records", records.len());

        let views = DashboardViews::new(
            Self::transmission_by_gender(records),
            Self::daily_cases(records),
            Self::state_distribution(records),
            Self::age_distribution(records),
            Self::state_emergence(records),
            Self::status_distribution(records),
        );

        for (kind, view) in views.iter() {
            tracing::debug!(view = kind.code(), empty = view.is_empty(), "view ready");
        }
        views
    }

    /// Counts per (transmission, gender): one series per gender present,
    /// each dense over the four transmission labels.
    pub fn transmission_by_gender(records: &[CaseRecord]) -> CategoryView {
        if records.is_empty() {
            return CategoryView::empty();
        }

        let mut grid: BTreeMap<&str, [u64; 4]> = BTreeMap::new();
        for rec in records {
            let row = grid.entry(rec.gender.as_str()).or_insert([0; 4]);
            if let Some(i) = TRANSMISSION_LABELS
                .iter()
                .position(|t| *t == rec.transmission)
            {
                row[i] += 1;
            }
        }

        CategoryView {
            labels: TRANSMISSION_LABELS.iter().map(|s| s.to_string()).collect(),
            series: grid
                .into_iter()
                .map(|(gender, counts)| NamedSeries::new(gender, counts.to_vec()))
                .collect(),
        }
    }

    /// Cases per announcement date, ascending, with the latest date dropped
    /// as an incomplete trailing bucket.
    pub fn daily_cases(records: &[CaseRecord]) -> CategoryView {
        let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for date in records.iter().filter_map(|r| r.date_announced) {
            *per_day.entry(date).or_insert(0) += 1;
        }
        per_day.pop_last();

        if per_day.is_empty() {
            return CategoryView::empty();
        }

        let (labels, values) = per_day
            .into_iter()
            .map(|(date, n)| (date.format("%Y-%m-%d").to_string(), n))
            .unzip();
        CategoryView::single(CASES_SERIES, labels, values)
    }

    /// Cases per detected state, largest first.
    pub fn state_distribution(records: &[CaseRecord]) -> CategoryView {
        Self::ranked_counts(records.iter().map(|r| r.detected_state.as_str()))
    }

    /// Cases per age bin. Ages outside every bin, including the sentinel,
    /// are not counted.
    pub fn age_distribution(records: &[CaseRecord]) -> CategoryView {
        let mut counts = [0u64; 4];
        for rec in records {
            if let Some(i) = Self::age_bin(rec.age) {
                counts[i] += 1;
            }
        }

        if counts.iter().all(|&c| c == 0) {
            return CategoryView::empty();
        }

        CategoryView::single(
            CASES_SERIES,
            AGE_BINS.iter().map(|(_, _, label)| label.to_string()).collect(),
            counts.to_vec(),
        )
    }

    /// Index into [`AGE_BINS`] of the bin holding `age`.
    pub fn age_bin(age: f64) -> Option<usize> {
        AGE_BINS
            .iter()
            .position(|(lower, upper, _)| age >= *lower && age < *upper)
    }

    /// One `(date, ordinal)` point per record, partitioned by state. Series
    /// appear in first-occurrence order, points in record order.
    pub fn state_emergence(records: &[CaseRecord]) -> ScatterView {
        let mut series: Vec<PointSeries> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for rec in records {
            let Some(date) = rec.date_announced else {
                continue;
            };
            let state = rec.detected_state.as_str();
            let i = *index.entry(state).or_insert_with(|| {
                series.push(PointSeries {
                    name: state.to_string(),
                    points: Vec::new(),
                });
                series.len() - 1
            });
            series[i].points.push((date, rec.ordinal));
        }

        ScatterView { series }
    }

    /// Cases per current status, largest first.
    pub fn status_distribution(records: &[CaseRecord]) -> CategoryView {
        Self::ranked_counts(records.iter().map(|r| r.current_status.as_str()))
    }

    /// Count occurrences and order by count descending, then label ascending.
    fn ranked_counts<'a>(values: impl Iterator<Item = &'a str>) -> CategoryView {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for v in values {
            *counts.entry(v).or_insert(0) += 1;
        }

        if counts.is_empty() {
            return CategoryView::empty();
        }

        let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let (labels, values) = ranked
            .into_iter()
            .map(|(label, n)| (label.to_string(), n))
            .unzip();
        CategoryView::single(CASES_SERIES, labels, values)
    }
}
