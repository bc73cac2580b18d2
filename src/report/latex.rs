//! LaTeX tables for the best solution of every experiment group.
//!
//! Each group becomes one `table` float using `booktabs` rules. The document
//! wrapper loads `float` for the `[H]` placement and `amsmath` for the
//! time-indexed variable names.

use regex::Regex;

use crate::selection::Selection;

use super::renderer::{GroupContext, Renderer};

/// Preamble of the generated document
pub const DOCUMENT_HEADER: &str = r"\documentclass{article}
\usepackage{booktabs} % For professional quality tables
\usepackage{float}    % For the [H] table placement specifier
\usepackage{amsmath}  % For math formatting

\begin{document}

";

/// Closing line of the generated document
pub const DOCUMENT_FOOTER: &str = "\\end{document}\n";

lazy_static::lazy_static! {
    static ref TIME_INDEXED: Regex =
        Regex::new(r"^([a-zA-Z]+)(\d*)\(t\)$").expect("time-indexed pattern is valid");
}

/// Renders groups as LaTeX table floats
#[derive(Debug, Default, Clone, Copy)]
pub struct LatexRenderer;

impl Renderer for LatexRenderer {
    fn table(&self, selection: Option<&Selection>, context: &GroupContext) -> String {
        render_latex(selection, context)
    }

    fn document(&self, body: &str) -> String {
        format!("{DOCUMENT_HEADER}{body}{DOCUMENT_FOOTER}")
    }
}

/// Escapes a variable name for use inside a table cell.
///
/// Names of the form `x1(t)` become the math expression `$x_{1}(t)$` (`$x(t)$` when
/// there is no index). Other names only get their underscores escaped.
pub fn escape_latex(name: &str) -> String {
    if let Some(captures) = TIME_INDEXED.captures(name) {
        let base = &captures[1];
        let index = &captures[2];

        return if index.is_empty() {
            format!("${base}(t)$")
        } else {
            format!("${base}_{{{index}}}(t)$")
        };
    }

    name.replace('_', r"\_")
}

/// Renders the table float for one group.
///
/// Returns an empty string if the group had no rows.
pub fn render_latex(selection: Option<&Selection>, context: &GroupContext) -> String {
    let Some(selection) = selection else {
        return String::new();
    };

    let mut out = String::new();
    out.push_str("\\begin{table}[H]\n");
    out.push_str("\\centering\n");
    out.push_str("\\begin{tabular}{lrrr}\n");
    out.push_str("\\toprule\n");
    out.push_str("Variable & True Value & Estimated & Rel. Error \\\\\n");
    out.push_str("\\midrule\n");

    for row in &selection.rows {
        out.push_str(&format!(
            "{} & {:.6} & {:.6} & {:.6} \\\\\n",
            escape_latex(&row.variable_name),
            row.true_value,
            row.estimated_value,
            row.rel_error
        ));
    }

    out.push_str("\\bottomrule\n");
    out.push_str("\\end{tabular}\n");
    out.push_str(&format!("\\caption{{{}}}\n", caption(selection, context)));
    out.push_str(&format!("\\label{{{}}}\n", label(context)));
    out.push_str("\\end{table}\n\n");

    out
}

fn caption(selection: &Selection, context: &GroupContext) -> String {
    let mut caption = format!(
        r"Results for Model: \texttt{{{}}}, Estimator: \texttt{{{}}}",
        context.model.replace('_', " "),
        context.estimator
    );

    if let Some(interpolator) = &context.interpolator {
        caption.push_str(&format!(r", Interpolator: \texttt{{{interpolator}}}"));
    }

    caption.push_str(&format!(", Noise: {}.", context.noise_label()));
    caption.push_str(&format!(
        " Best solution from cluster of {} (Loss: {:.4}).",
        selection.cluster_size, selection.overall_error
    ));

    caption
}

/// Cross-reference label built from the group's slug.
///
/// A repeated slug gets a `_dup<n>` suffix, counting the first group as 1. Noise
/// labels never contain `dup`, so suffixed labels cannot clash with plain ones.
pub fn label(context: &GroupContext) -> String {
    match context.repeat {
        0 => format!("tab:{}", context.slug()),
        repeat => format!("tab:{}_dup{}", context.slug(), repeat + 1),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::results::{GroupKey, ResultRow};

    fn context(interpolator: Option<&str>) -> GroupContext {
        GroupContext {
            model: "lotka_volterra".to_string(),
            noise: 0.05,
            estimator: "PE".to_string(),
            interpolator: interpolator.map(str::to_string),
            repeat: 0,
        }
    }

    fn selection() -> Selection {
        let rows = [("x1(t)", 1.0, 1.01, 0.01), ("k_deg", 0.5, 0.49, 0.02)]
            .into_iter()
            .map(|(name, true_value, estimated_value, rel_error)| ResultRow {
                model_name: "lotka_volterra".to_string(),
                noise_level: 0.05,
                estimator: "PE".to_string(),
                interpolator_method: Some("AAA".to_string()),
                cluster_id: GroupKey::Int(2),
                solution_in_cluster: GroupKey::Int(1),
                variable_name: name.to_string(),
                true_value,
                estimated_value,
                rel_error,
                overall_problem_error: 0.123456,
            })
            .collect();

        Selection {
            cluster_id: GroupKey::Int(2),
            solution_id: GroupKey::Int(1),
            rows,
            overall_error: 0.123456,
            cluster_size: 3,
        }
    }

    #[test]
    fn test_escape_time_indexed() {
        assert_eq!(escape_latex("x1(t)"), "$x_{1}(t)$");
        assert_eq!(escape_latex("x12(t)"), "$x_{12}(t)$");
        assert_eq!(escape_latex("x(t)"), "$x(t)$");
    }

    #[test]
    fn test_escape_underscores() {
        assert_eq!(escape_latex("k_deg"), r"k\_deg");
        assert_eq!(escape_latex("beta"), "beta");
        assert_eq!(escape_latex("x_1(t)"), r"x\_1(t)");
    }

    #[test]
    fn test_render_empty_group() {
        assert_eq!(render_latex(None, &context(None)), "");
    }

    #[test]
    fn test_render_table() {
        let rendered = render_latex(Some(&selection()), &context(Some("AAA")));

        let expected = r"\begin{table}[H]
\centering
\begin{tabular}{lrrr}
\toprule
Variable & True Value & Estimated & Rel. Error \\
\midrule
$x_{1}(t)$ & 1.000000 & 1.010000 & 0.010000 \\
k\_deg & 0.500000 & 0.490000 & 0.020000 \\
\bottomrule
\end{tabular}
\caption{Results for Model: \texttt{lotka volterra}, Estimator: \texttt{PE}, Interpolator: \texttt{AAA}, Noise: 0.05. Best solution from cluster of 3 (Loss: 0.1235).}
\label{tab:lotka_volterra_PE_AAA_005}
\end{table}

";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_label_without_interpolator() {
        let mut context = context(None);
        context.estimator = "Opt".to_string();
        context.noise = 0.0;
        assert_eq!(label(&context), "tab:lotka_volterra_Opt__00");
    }

    #[test]
    fn test_repeated_slug_gets_suffix() {
        let mut context = context(Some("AAA"));
        context.repeat = 1;
        assert_eq!(label(&context), "tab:lotka_volterra_PE_AAA_005_dup2");
    }

    #[test]
    fn test_document_wrapper() {
        let document = LatexRenderer.document("BODY");
        assert!(document.starts_with("\\documentclass{article}\n"));
        assert!(document.contains("\\begin{document}\n\nBODY\\end{document}\n"));
    }
}
