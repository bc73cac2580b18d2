use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use petab_results::prelude::*;

fn result_rows(n_clusters: i64, n_solutions: i64, n_variables: usize) -> Vec<ResultRow> {
    let mut rows = Vec::new();

    for estimator in ["PE", "MLE"] {
        for cluster in 0..n_clusters {
            for solution in 0..n_solutions {
                for variable in 0..n_variables {
                    let rel_error = ((cluster * 7 + solution * 3) as f64 + variable as f64) / 100.0;
                    rows.push(ResultRow {
                        model_name: "lotka_volterra".to_string(),
                        noise_level: 0.05,
                        estimator: estimator.to_string(),
                        interpolator_method: (estimator == "PE").then(|| "cubic".to_string()),
                        cluster_id: GroupKey::Int(cluster),
                        solution_in_cluster: GroupKey::Int(solution),
                        variable_name: format!("k{variable}"),
                        true_value: 1.0,
                        estimated_value: 1.0 + rel_error,
                        rel_error,
                        overall_problem_error: (cluster + solution) as f64,
                    });
                }
            }
        }
    }

    rows
}

fn benchmark_selection(c: &mut Criterion) {
    let rows = result_rows(20, 50, 8);

    c.bench_function("select_best", |b| {
        b.iter(|| {
            let _ = black_box(select_best(black_box(&rows)));
        });
    });

    c.bench_function("render_latex_report", |b| {
        b.iter(|| {
            let _ = black_box(render_report(black_box(&rows), &LatexRenderer));
        });
    });

    c.bench_function("render_console_report", |b| {
        b.iter(|| {
            let _ = black_box(render_report(black_box(&rows), &ConsoleRenderer));
        });
    });
}

criterion_group!(benches, benchmark_selection);
criterion_main!(benches);
