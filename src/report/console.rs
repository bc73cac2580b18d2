//! Plain-text summary tables for the terminal.

use crate::results::format_noise;
use crate::selection::Selection;

use super::renderer::{GroupContext, Renderer, Section};

const HEADER_RULE: &str = "====================";
const NUMERIC_COLUMNS_WIDTH: usize = 45;

/// Renders groups as fixed-width text tables
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleRenderer;

impl Renderer for ConsoleRenderer {
    fn section(&self, section: Section<'_>) -> String {
        match section {
            Section::Model(model) => format!("\n{HEADER_RULE} Model: {model} {HEADER_RULE}\n"),
            Section::Noise(noise) => format!("\n--- Noise Level: {} ---\n", format_noise(noise)),
            Section::Estimator(estimator) => format!("\n##### Estimator: {estimator} #####\n"),
            Section::Interpolator(interpolator) => format!(
                "\n>>>> Interpolator Method: {} <<<<\n",
                interpolator.unwrap_or("nan")
            ),
        }
    }

    fn table(&self, selection: Option<&Selection>, context: &GroupContext) -> String {
        render_console(selection, context)
    }
}

/// Renders the summary of one group's best solution.
///
/// The `Variable` column grows to fit the longest name; the numeric columns are
/// twelve characters wide with six decimals. The group identity is already part of
/// the section headings, so `_context` does not change the table.
pub fn render_console(selection: Option<&Selection>, _context: &GroupContext) -> String {
    let Some(selection) = selection else {
        return "No data to display.\n".to_string();
    };

    let width = selection
        .rows
        .iter()
        .map(|row| row.variable_name.chars().count())
        .chain(std::iter::once("Variable".len()))
        .max()
        .unwrap_or_default();
    let rule = "-".repeat(width + NUMERIC_COLUMNS_WIDTH);

    let mut out = String::new();
    out.push_str(&format!(
        "\nBest cluster (ID {}) found with {} similar solutions.\n",
        selection.cluster_id, selection.cluster_size
    ));
    out.push_str(&format!(
        "Presenting best solution from this cluster (Error: {:.6}):\n",
        selection.overall_error
    ));

    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!(
        "{:<width$} | {:>12} | {:>12} | {:>12}\n",
        "Variable", "True Value", "Estimated", "Rel. Error"
    ));
    out.push_str(&rule);
    out.push('\n');

    for row in &selection.rows {
        out.push_str(&format!(
            "{:<width$} | {:>12.6} | {:>12.6} | {:>12.6}\n",
            row.variable_name, row.true_value, row.estimated_value, row.rel_error
        ));
    }
    out.push('\n');

    out
}
