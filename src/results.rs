//! Result rows produced by parameter estimation runs.
//!
//! Every row describes one estimated variable of one candidate solution. Rows are
//! grouped by experiment identity (model, noise level, estimator, interpolator) and,
//! inside an experiment, by cluster and solution.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Column names every results table has to provide.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "model_name",
    "noise_level",
    "estimator",
    "interpolator_method",
    "cluster_id",
    "solution_in_cluster",
    "variable_name",
    "true_value",
    "estimated_value",
    "rel_error",
    "overall_problem_error",
];

/// One estimated variable within one candidate solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub model_name: String,
    pub noise_level: f64,
    pub estimator: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub interpolator_method: Option<String>,
    pub cluster_id: GroupKey,
    pub solution_in_cluster: GroupKey,
    pub variable_name: String,
    pub true_value: f64,
    pub estimated_value: f64,
    pub rel_error: f64,
    pub overall_problem_error: f64,
}

/// Identifier of a cluster or of a solution inside a cluster.
///
/// Identifiers written by the estimation tools are usually integers, but any label
/// is accepted. Numeric ids (integers and text such as `2.5`) order by value and sort
/// before other labels; numerically equal ids fall back to integers first, then
/// lexicographic text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Int(i64),
    Text(String),
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        if let (GroupKey::Int(a), GroupKey::Int(b)) = (self, other) {
            return a.cmp(b);
        }

        match (self.numeric_value(), other.numeric_value()) {
            (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| self.tie_break(other)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.tie_break(other),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i64> for GroupKey {
    fn from(value: i64) -> Self {
        GroupKey::Int(value)
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        GroupKey::parse(value)
    }
}

impl GroupKey {
    /// Interprets a raw cell value. Integral floats such as `2.0` are treated as `2`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(value) = raw.parse::<i64>() {
            return GroupKey::Int(value);
        }

        match raw.parse::<f64>() {
            Ok(value)
                if value.is_finite()
                    && value.fract() == 0.0
                    && value.abs() < i64::MAX as f64 =>
            {
                GroupKey::Int(value as i64)
            }
            _ => GroupKey::Text(raw.to_string()),
        }
    }

    /// Value of a numeric id. Text that does not parse to a finite number has none.
    fn numeric_value(&self) -> Option<f64> {
        match self {
            GroupKey::Int(value) => Some(*value as f64),
            GroupKey::Text(text) => text.parse::<f64>().ok().filter(|value| value.is_finite()),
        }
    }

    fn tie_break(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Int(a), GroupKey::Int(b)) => a.cmp(b),
            (GroupKey::Int(_), GroupKey::Text(_)) => Ordering::Less,
            (GroupKey::Text(_), GroupKey::Int(_)) => Ordering::Greater,
            (GroupKey::Text(a), GroupKey::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Int(value) => write!(f, "{value}"),
            GroupKey::Text(value) => write!(f, "{value}"),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GroupKey::Int(value) => serializer.serialize_i64(*value),
            GroupKey::Text(value) => serializer.serialize_str(value),
        }
    }
}

impl<'de> Deserialize<'de> for GroupKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(GroupKey::parse(&raw))
    }
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("nan")))
}

/// Formats a noise level the way the result tables print it.
///
/// Integral values keep a trailing `.0` (`0.0`, `1.0`), everything else uses the
/// shortest representation that round-trips (`0.05`).
pub fn format_noise(noise: f64) -> String {
    format!("{noise:?}")
}
