//! Rate equations and formula handling.
//!
//! Formulas are parsed with [`meval`], which only understands arithmetic
//! (`+ - * / ^ %`), parentheses, numeric literals, variables and a fixed set of
//! builtin functions. Nothing is ever executed as code.

use std::collections::BTreeSet;

use meval::Expr;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Constants provided by the default `meval` context
pub const BUILTIN_CONSTANTS: [&str; 2] = ["pi", "e"];

/// Symbol that refers to the simulation time inside formulas
pub const TIME_SYMBOL: &str = "time";

lazy_static::lazy_static! {
    static ref RATE_EQUATION: Regex =
        Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*'\s*=\s*(.+?)\s*$")
            .expect("rate equation pattern is valid");
}

/// A rate equation of the form `<state>' = <expression>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEquation {
    /// State whose derivative is defined
    pub state: String,
    /// Right-hand side as written in the model
    pub expression: String,
}

impl RateEquation {
    /// Renders the equation in the `<state>' = <expression>` form.
    pub fn to_antimony(&self) -> String {
        format!("{}' = {}", self.state, self.expression)
    }
}

/// Splits a rate equation into the state and its right-hand side.
///
/// # Arguments
///
/// * `raw` - The equation as written, e.g. `x1' = -k1 * x1`.
///
/// # Returns
///
/// Returns a `Result` containing the parsed [`RateEquation`] or an
/// [`EquationError::InvalidRateEquation`] if the equation does not have the expected
/// form. The right-hand side is not parsed here; see [`compile`].
pub fn parse_rate_equation(raw: &str) -> Result<RateEquation, EquationError> {
    let captures = RATE_EQUATION
        .captures(raw)
        .ok_or_else(|| EquationError::InvalidRateEquation(raw.to_string()))?;

    Ok(RateEquation {
        state: captures[1].to_string(),
        expression: captures[2].to_string(),
    })
}

/// Parses a formula into an expression tree.
///
/// # Arguments
///
/// * `formula` - The formula to parse.
///
/// # Returns
///
/// Returns the parsed [`Expr`] or an [`EquationError::ParseError`] describing why the
/// formula is not valid.
pub fn compile(formula: &str) -> Result<Expr, EquationError> {
    formula
        .parse::<Expr>()
        .map_err(|source| EquationError::ParseError {
            formula: formula.to_string(),
            message: source.to_string(),
        })
}

/// Extracts the variable symbols referenced by an expression, sorted by name.
///
/// Function names such as `exp` are not included.
pub fn extract_symbols(eq: &Expr) -> Vec<String> {
    let mut vars: BTreeSet<String> = BTreeSet::new();

    for token in eq.iter() {
        if let meval::tokenizer::Token::Var(v) = token {
            vars.insert(v.into());
        }
    }

    vars.into_iter().collect()
}

/// Returns the symbols of `eq` that are neither in `known` nor builtin constants or time.
pub fn unknown_symbols(eq: &Expr, known: &BTreeSet<&str>) -> Vec<String> {
    extract_symbols(eq)
        .into_iter()
        .filter(|symbol| {
            !known.contains(symbol.as_str())
                && symbol != TIME_SYMBOL
                && !BUILTIN_CONSTANTS.contains(&symbol.as_str())
        })
        .collect()
}

/// Errors raised while handling formulas.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EquationError {
    #[error("Invalid rate equation '{0}': expected the form <state>' = <expression>")]
    InvalidRateEquation(String),
    #[error("Could not parse formula '{formula}': {message}")]
    ParseError { formula: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate_equation() {
        let eq = parse_rate_equation("x1' = -k1 * x1 + k2").unwrap();
        assert_eq!(eq.state, "x1");
        assert_eq!(eq.expression, "-k1 * x1 + k2");
        assert_eq!(eq.to_antimony(), "x1' = -k1 * x1 + k2");

        let eq = parse_rate_equation("  S'=Vmax*S/(Km+S)  ").unwrap();
        assert_eq!(eq.state, "S");
        assert_eq!(eq.expression, "Vmax*S/(Km+S)");
    }

    #[test]
    fn test_parse_rate_equation_invalid() {
        for raw in ["x1 = k1", "' = k1", "x1' =", "1x' = 2"] {
            assert_eq!(
                parse_rate_equation(raw),
                Err(EquationError::InvalidRateEquation(raw.to_string()))
            );
        }
    }

    #[test]
    fn test_extract_symbols() {
        let expr = compile("k1 * exp(-x1 / K) + x1 * pi").unwrap();
        assert_eq!(extract_symbols(&expr), vec!["K", "k1", "pi", "x1"]);
    }

    #[test]
    fn test_unknown_symbols() {
        let expr = compile("k1 * x1 * time + e + missing").unwrap();
        let known = BTreeSet::from(["k1", "x1"]);
        assert_eq!(unknown_symbols(&expr, &known), vec!["missing"]);
    }

    #[test]
    fn test_compile_rejects_garbage() {
        assert!(matches!(
            compile("k1 * (x1"),
            Err(EquationError::ParseError { .. })
        ));
        assert!(compile("__import__('os')").is_err());
    }
}
