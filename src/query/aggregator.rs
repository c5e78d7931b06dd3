use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::{db::models::Reading, error::{QueryError, ValidationError}};

/// The closed set of single-value aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Min,
    Max,
    Mean,
    Median,
    Mode,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Min,
        Metric::Max,
        Metric::Mean,
        Metric::Median,
        Metric::Mode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Min => "min",
            Metric::Max => "max",
            Metric::Mean => "mean",
            Metric::Median => "median",
            Metric::Mode => "mode",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ValidationError::Metric(s.to_owned()))
    }
}

/// Result of one aggregate, serialized as a bare JSON number.
///
/// Min, max, median and mode always select an existing reading, so they stay
/// integral. Only the mean is fractional, already rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(i64),
    Decimal(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            MetricValue::Integer(v) => v as f64,
            MetricValue::Decimal(v) => v,
        }
    }
}

/// Reading values sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedValues(Vec<i64>);

impl SortedValues {
    pub fn new(mut values: Vec<i64>) -> Self {
        values.sort_unstable();
        Self(values)
    }

    pub fn from_readings(readings: &[Reading]) -> Self {
        Self::new(readings.iter().map(|r| r.value).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }
}

/// Single dispatch point for every metric; all of them see the same values.
pub fn aggregate(metric: Metric, values: &SortedValues) -> Result<MetricValue, QueryError> {
    let v = values.as_slice();
    let (Some(&first), Some(&last)) = (v.first(), v.last()) else {
        return Err(QueryError::NoData);
    };

    let value = match metric {
        Metric::Min => MetricValue::Integer(first),
        Metric::Max => MetricValue::Integer(last),
        Metric::Mean => MetricValue::Decimal(round_to_cents(mean(v))),
        Metric::Median => MetricValue::Integer(v[v.len() / 2]),
        Metric::Mode => MetricValue::Integer(mode(v)),
    };
    Ok(value)
}

/// Rounds half away from zero to 2 decimal places.
pub fn round_to_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn mean(sorted: &[i64]) -> f64 {
    let sum: i128 = sorted.iter().map(|&v| i128::from(v)).sum();
    sum as f64 / sorted.len() as f64
}

/// Most frequent value; on a frequency tie the largest value wins.
fn mode(sorted: &[i64]) -> i64 {
    let mut best = (0usize, sorted[0]);
    for run in sorted.chunk_by(|a, b| a == b) {
        // Runs arrive in ascending order, so `>=` hands ties to the larger value.
        if run.len() >= best.0 {
            best = (run.len(), run[0]);
        }
    }
    best.1
}
