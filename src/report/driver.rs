//! Walks the experiment hierarchy and renders the best solution of every group.
//!
//! Groups are visited in ascending order at every level:
//! model, noise level, estimator and, for the `PE` estimator only, interpolation
//! method. Other estimators are rendered as a single group.

use std::collections::{BTreeMap, HashMap};

use ordered_float::OrderedFloat;

use crate::results::ResultRow;
use crate::selection::{select_best, SelectionError};

use super::renderer::{GroupContext, Renderer, Section};

/// Estimator whose results are further split by interpolation method
pub const INTERPOLATING_ESTIMATOR: &str = "PE";

/// Rendered output of a full results table
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    /// Complete output, wrapped by [`Renderer::document`]
    pub text: String,
    /// Groups left out because their rows violate the table invariants
    pub skipped: Vec<(GroupContext, SelectionError)>,
}

impl RenderedReport {
    /// True if every group could be rendered
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Renders every experiment group found in `rows`.
///
/// # Arguments
///
/// * `rows` - All rows of a results table.
/// * `renderer` - Output format.
///
/// # Returns
///
/// The rendered document together with the groups that had to be skipped.
pub fn render_report<R: Renderer>(rows: &[ResultRow], renderer: &R) -> RenderedReport {
    let mut body = String::new();
    let mut skipped = Vec::new();
    let mut slugs = HashMap::new();

    let by_model = group_by(rows.iter(), |row| row.model_name.as_str());
    for (model, model_rows) in by_model {
        body.push_str(&renderer.section(Section::Model(model)));

        let by_noise = group_by(model_rows, |row| OrderedFloat(row.noise_level));
        for (noise, noise_rows) in by_noise {
            body.push_str(&renderer.section(Section::Noise(noise.into_inner())));

            let by_estimator = group_by(noise_rows, |row| row.estimator.as_str());
            for (estimator, estimator_rows) in by_estimator {
                body.push_str(&renderer.section(Section::Estimator(estimator)));

                let mut context = GroupContext {
                    model: model.to_string(),
                    noise: noise.into_inner(),
                    estimator: estimator.to_string(),
                    interpolator: None,
                    repeat: 0,
                };

                if estimator != INTERPOLATING_ESTIMATOR {
                    render_group(
                        renderer,
                        &estimator_rows,
                        context,
                        &mut body,
                        &mut skipped,
                        &mut slugs,
                    );
                    continue;
                }

                let by_interpolator =
                    group_by(estimator_rows, |row| row.interpolator_method.as_deref());
                for (interpolator, group_rows) in by_interpolator {
                    body.push_str(&renderer.section(Section::Interpolator(interpolator)));

                    context.interpolator = interpolator.map(str::to_string);
                    render_group(
                        renderer,
                        &group_rows,
                        context.clone(),
                        &mut body,
                        &mut skipped,
                        &mut slugs,
                    );
                }
            }
        }
    }

    RenderedReport {
        text: renderer.document(&body),
        skipped,
    }
}

fn render_group<R: Renderer>(
    renderer: &R,
    rows: &[&ResultRow],
    mut context: GroupContext,
    body: &mut String,
    skipped: &mut Vec<(GroupContext, SelectionError)>,
    slugs: &mut HashMap<String, usize>,
) {
    match select_best(rows.iter().copied()) {
        Ok(selection) => {
            let seen = slugs.entry(context.slug()).or_default();
            context.repeat = *seen;
            *seen += 1;
            body.push_str(&renderer.table(selection.as_ref(), &context));
        }
        Err(err) => {
            log::warn!(
                "Skipping model '{}', noise {}, estimator '{}': {}",
                context.model,
                context.noise_label(),
                context.estimator,
                err
            );
            skipped.push((context, err));
        }
    }
}

fn group_by<'a, K, I, F>(rows: I, key: F) -> BTreeMap<K, Vec<&'a ResultRow>>
where
    K: Ord,
    I: IntoIterator<Item = &'a ResultRow>,
    F: Fn(&'a ResultRow) -> K,
{
    let mut groups: BTreeMap<K, Vec<&'a ResultRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(key(row)).or_default().push(row);
    }
    groups
}
