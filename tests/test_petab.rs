#[cfg(all(test, feature = "simulation"))]
mod test_petab {
    use std::path::Path;

    use petab_results::io::IOError;
    use petab_results::petab::{generate_from_toml, PetabError};

    fn model_toml(output_dir: &Path, blind: bool) -> String {
        format!(
            r#"
[model]
equations = ["prey' = alpha * prey - beta * prey * predator", "predator' = delta * prey * predator - gamma * predator"]
states = [
    {{ name = "prey", initial_value = 10.0, estimate = true }},
    {{ name = "predator", initial_value = 5.0 }},
]
parameters = [
    {{ name = "alpha", value = 1.1, bounds = [0.1, 5.0], scale = "log10" }},
    {{ name = "beta", value = 0.4 }},
    {{ name = "delta", value = 0.1 }},
    {{ name = "gamma", value = 0.4, scale = "lin" }},
]
observables = [
    {{ name = "y_prey", formula = "prey", transformation = "log10" }},
    {{ name = "y_total", formula = "prey + predator", noise_distribution = "laplace" }},
]

[simulation]
timespan = [0.0, 5.0]
n_timepoints = 26
noise_level = 0.02
random_seed = 1234
output_dir = "{}"
blind = {blind}
"#,
            output_dir.display().to_string().replace('\\', "/")
        )
    }

    fn write_model(dir: &Path, blind: bool) -> std::path::PathBuf {
        let path = dir.join("model.toml");
        std::fs::write(&path, model_toml(&dir.join("out"), blind)).unwrap();
        path
    }

    #[test]
    fn test_generate_lotka_volterra() {
        let dir = tempfile::tempdir().unwrap();
        let problem = generate_from_toml(write_model(dir.path(), false)).unwrap();
        let out = dir.path().join("out");

        for file in [
            "measurements.tsv",
            "parameters.tsv",
            "observables.tsv",
            "conditions.tsv",
            "problem.yaml",
            "model.ant",
        ] {
            assert!(out.join(file).exists(), "{file} missing");
        }
        assert!(!out.join("true_values.json").exists());

        let yaml = std::fs::read_to_string(out.join("problem.yaml")).unwrap();
        assert_eq!(
            yaml.contains("model.xml"),
            out.join("model.xml").exists(),
            "problem.yaml and the written SBML model disagree"
        );

        let measurements = std::fs::read_to_string(out.join("measurements.tsv")).unwrap();
        let mut lines = measurements.lines();
        assert_eq!(
            lines.next().unwrap(),
            "simulationConditionId\tmeasurement\ttime\tobservableId\tobservableParameters\tnoiseParameters\tdatasetId\treplicateId"
        );
        assert_eq!(lines.count(), 2 * 26);
        assert_eq!(problem.measurements.len(), 2 * 26);

        let parameters = std::fs::read_to_string(out.join("parameters.tsv")).unwrap();
        let ids: Vec<&str> = parameters
            .lines()
            .skip(1)
            .map(|line| line.split('\t').next().unwrap())
            .collect();
        assert_eq!(
            ids,
            vec!["alpha", "beta", "delta", "gamma", "init_prey", "noiseParameter1"]
        );
        assert!(parameters.contains("alpha\tlog10\t0.1\t5.0\t1.1\t1"));
        assert!(parameters.contains("noiseParameter1\tlin\t0.02\t0.02\t0.02\t0"));

        let observables = std::fs::read_to_string(out.join("observables.tsv")).unwrap();
        assert!(observables.contains("y_total\tObservable y_total\tprey + predator\tlin\tnoiseParameter1 * y_total\tlaplace"));

        let conditions = std::fs::read_to_string(out.join("conditions.tsv")).unwrap();
        assert_eq!(conditions, "conditionId\tconditionName\tprey\ncondition1\t\tinit_prey\n");

        let antimony = std::fs::read_to_string(out.join("model.ant")).unwrap();
        assert!(antimony.starts_with("model feedback\ninit_prey = 10.0\n"));
        assert!(antimony.contains("alpha = 1.1\n"));
        assert!(antimony.ends_with("end"));
    }

    #[test]
    fn test_generation_is_reproducible() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        let a = generate_from_toml(write_model(first.path(), false)).unwrap();
        let b = generate_from_toml(write_model(second.path(), false)).unwrap();

        assert_eq!(a.measurements, b.measurements);
    }

    #[test]
    fn test_blind_problem() {
        let dir = tempfile::tempdir().unwrap();
        let problem = generate_from_toml(write_model(dir.path(), true)).unwrap();
        let out = dir.path().join("out");

        let json = std::fs::read_to_string(out.join("true_values.json")).unwrap();
        let values: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(values["parameters"]["alpha"], 1.1);
        assert_eq!(values["initial_conditions"]["prey"], 10.0);

        assert!(problem
            .parameters
            .iter()
            .filter(|p| p.estimate == 1)
            .all(|p| p.nominal_value == 1.0));

        let antimony = std::fs::read_to_string(out.join("model.ant")).unwrap();
        assert!(antimony.contains("alpha = 1.0\n"));
        assert!(antimony.contains("species predator = 1.0\n"));
    }

    #[test]
    fn test_invalid_model_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.toml");
        let toml = model_toml(&dir.path().join("out"), false)
            .replace("noise_level = 0.02", "noise_level = -1.0")
            .replace("gamma * predator\"", "gamma * predator * epsilon\"");
        std::fs::write(&path, toml).unwrap();

        match generate_from_toml(&path).unwrap_err() {
            PetabError::InvalidConfig(report) => {
                assert!(!report.is_valid);
                let text = report.to_string();
                assert!(text.contains("epsilon"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_missing_model_file() {
        let err = generate_from_toml("missing.toml").unwrap_err();
        assert!(matches!(
            err,
            PetabError::Io(IOError::FileNotFound { .. })
        ));
        assert_eq!(err.to_string(), "The file 'missing.toml' was not found.");
    }
}
