//! Best cluster / best solution selection.
//!
//! Candidate solutions of an estimation run are clustered upstream. The selector
//! picks the cluster whose worst per-variable relative error is smallest and, within
//! that cluster, the solution with the smallest mean relative error. Exact ties are
//! resolved towards the smallest identifier so the choice never depends on the order
//! in which rows were read.

use std::collections::{BTreeMap, HashSet};

use crate::results::{GroupKey, ResultRow};

use super::error::SelectionError;

/// The solution chosen for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub cluster_id: GroupKey,
    pub solution_id: GroupKey,
    /// Rows of the chosen solution, in input order
    pub rows: Vec<ResultRow>,
    /// Overall problem error shared by all rows of the chosen solution
    pub overall_error: f64,
    /// Number of distinct solutions in the chosen cluster
    pub cluster_size: usize,
}

#[derive(Default)]
struct SolutionStats<'a> {
    overall_error: Option<f64>,
    variables: HashSet<&'a str>,
    rel_errors: Vec<f64>,
}

impl SolutionStats<'_> {
    fn mean_rel_error(&self) -> f64 {
        // Summing in sorted order keeps the mean independent of row order.
        let mut errors = self.rel_errors.clone();
        errors.sort_by(f64::total_cmp);
        errors.iter().sum::<f64>() / errors.len() as f64
    }
}

/// Selects the best cluster and the best solution within it.
///
/// # Arguments
///
/// * `rows` - Result rows of a single experiment group.
///
/// # Returns
///
/// * `Ok(None)` if there are no rows.
/// * `Ok(Some(Selection))` with the chosen solution otherwise.
///
/// # Errors
///
/// Returns a [`SelectionError`] when the rows violate the table invariants: a
/// negative or NaN relative error, a variable listed twice for the same solution, or
/// a solution whose rows disagree on the overall problem error.
pub fn select_best<'a, I>(rows: I) -> Result<Option<Selection>, SelectionError>
where
    I: IntoIterator<Item = &'a ResultRow>,
{
    let rows: Vec<&ResultRow> = rows.into_iter().collect();
    if rows.is_empty() {
        return Ok(None);
    }

    let solutions = collect_solutions(&rows)?;

    let mut cluster_max: BTreeMap<&GroupKey, f64> = BTreeMap::new();
    for ((cluster, _), stats) in solutions.iter() {
        let solution_max = stats
            .rel_errors
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        cluster_max
            .entry(*cluster)
            .and_modify(|max| *max = max.max(solution_max))
            .or_insert(solution_max);
    }

    let Some(best_cluster) = argmin(cluster_max) else {
        return Ok(None);
    };

    let cluster_means: BTreeMap<&GroupKey, f64> = solutions
        .iter()
        .filter(|((cluster, _), _)| *cluster == best_cluster)
        .map(|((_, solution), stats)| (*solution, stats.mean_rel_error()))
        .collect();

    let cluster_size = cluster_means.len();
    let Some(best_solution) = argmin(cluster_means) else {
        return Ok(None);
    };

    let overall_error = solutions[&(best_cluster, best_solution)]
        .overall_error
        .unwrap_or(f64::NAN);

    let chosen: Vec<ResultRow> = rows
        .iter()
        .filter(|row| {
            &row.cluster_id == best_cluster && &row.solution_in_cluster == best_solution
        })
        .map(|row| (*row).clone())
        .collect();

    log::debug!(
        "Selected solution {} of cluster {} ({} solutions in cluster)",
        best_solution,
        best_cluster,
        cluster_size
    );

    Ok(Some(Selection {
        cluster_id: best_cluster.clone(),
        solution_id: best_solution.clone(),
        rows: chosen,
        overall_error,
        cluster_size,
    }))
}

/// Groups rows by `(cluster, solution)` and checks the per-solution invariants.
fn collect_solutions<'a>(
    rows: &[&'a ResultRow],
) -> Result<BTreeMap<(&'a GroupKey, &'a GroupKey), SolutionStats<'a>>, SelectionError> {
    let mut solutions: BTreeMap<(&GroupKey, &GroupKey), SolutionStats> = BTreeMap::new();

    for &row in rows {
        if row.rel_error.is_nan() || row.rel_error < 0.0 {
            return Err(SelectionError::InvalidRelativeError {
                cluster: row.cluster_id.clone(),
                variable: row.variable_name.clone(),
                value: row.rel_error,
            });
        }

        let stats = solutions
            .entry((&row.cluster_id, &row.solution_in_cluster))
            .or_default();

        match stats.overall_error {
            Some(first) if !same_value(first, row.overall_problem_error) => {
                return Err(SelectionError::InconsistentOverallError {
                    cluster: row.cluster_id.clone(),
                    solution: row.solution_in_cluster.clone(),
                    first,
                    second: row.overall_problem_error,
                });
            }
            Some(_) => {}
            None => stats.overall_error = Some(row.overall_problem_error),
        }

        if !stats.variables.insert(row.variable_name.as_str()) {
            return Err(SelectionError::DuplicateVariable {
                cluster: row.cluster_id.clone(),
                solution: row.solution_in_cluster.clone(),
                variable: row.variable_name.clone(),
            });
        }

        stats.rel_errors.push(row.rel_error);
    }

    Ok(solutions)
}

/// Key with the smallest value; ties keep the smallest key.
fn argmin<K: Ord>(values: BTreeMap<K, f64>) -> Option<K> {
    let mut best: Option<(K, f64)> = None;
    for (key, value) in values {
        match &best {
            Some((_, best_value)) if value >= *best_value => {}
            _ => best = Some((key, value)),
        }
    }
    best.map(|(key, _)| key)
}

fn same_value(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}
