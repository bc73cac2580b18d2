//! SBML export of a model.
//!
//! The model is written as an SBML Level 3 Version 2 document:
//! - one compartment `cell` of unit size holding every species
//! - one species per state with its initial concentration
//! - one constant parameter per model parameter and per estimated initial value
//! - one rate rule per state
//! - one non-constant parameter with an assignment rule per observable
//!
//! Like the exported Antimony text, blind problems get `1.0` for every value.

use sbml::SBMLDocument;

use crate::petab::antimony::BLIND_VALUE;
use crate::petab::config::{DataGenerationSpec, ModelSpec};

/// Identifier of the single compartment
pub const COMPARTMENT_ID: &str = "cell";

/// Renders the model as an SBML document.
///
/// # Arguments
/// * `model` - The validated model
/// * `data` - Data generation settings; only `blind` is used
///
/// # Returns
/// * The SBML document serialized to XML
pub fn to_sbml(model: &ModelSpec, data: &DataGenerationSpec) -> String {
    build_document(model, data).to_xml_string()
}

fn build_document(model: &ModelSpec, data: &DataGenerationSpec) -> SBMLDocument {
    let value = |v: f64| if data.blind { BLIND_VALUE } else { v };

    let sbmldoc = SBMLDocument::new(3, 2, vec![]);
    let sbml_model = sbmldoc.create_model(crate::petab::antimony::MODEL_NAME);

    let compartment = sbml_model.create_compartment(COMPARTMENT_ID);
    compartment.set_size(1.0);
    compartment.set_constant(true);

    for state in model.estimated_states() {
        let parameter = sbml_model.create_parameter(&state.init_parameter());
        parameter.set_value(value(state.initial_value));
        parameter.set_constant(true);
    }

    for state in model.states.iter() {
        let species = sbml_model.create_species(&state.name);
        species.set_compartment(COMPARTMENT_ID);
        species.set_initial_concentration(value(state.initial_value));
        species.set_constant(false);
        species.set_has_only_substance_units(false);
    }

    for parameter in model.parameters.iter() {
        let sbml_parameter = sbml_model.create_parameter(&parameter.name);
        sbml_parameter.set_value(value(parameter.value));
        sbml_parameter.set_constant(true);
    }

    for equation in model.equations.iter() {
        sbml_model.create_rate_rule(&equation.state, &equation.expression);
    }

    for observable in model.observables.iter() {
        let sbml_parameter = sbml_model.create_parameter(&observable.name);
        sbml_parameter.set_constant(false);
        sbml_model.create_assignment_rule(&observable.name, &observable.formula);
    }

    sbmldoc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::petab::config::ModelConfig;

    #[test]
    fn test_to_sbml() {
        let (model, data) = ModelConfig::from_toml_str(
            r#"
[model]
equations = ["x1' = -k1 * x1", "x2' = k1 * x1"]
states = [{ name = "x1", initial_value = 1.0, estimate = true }, { name = "x2", initial_value = 0.0 }]
parameters = [{ name = "k1", value = 0.5 }]
"#,
        )
        .unwrap()
        .into_spec()
        .unwrap();

        let xml = to_sbml(&model, &data);

        assert!(xml.contains("level=\"3\""));
        assert!(xml.contains("<compartment id=\"cell\""));
        assert!(xml.contains("<species id=\"x1\""));
        assert!(xml.contains("<parameter id=\"init_x1\""));
        assert!(xml.contains("<rateRule variable=\"x2\""));
        assert!(xml.contains("<assignmentRule variable=\"obs_x1\""));
    }
}
