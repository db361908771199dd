//! Sandboxed expressions for `conditional` tasks, evaluated with minijinja.
//!
//! The execution context is the only variable namespace. Expressions use the
//! Jinja expression syntax: `and`/`or`/`not`, comparisons, `in`/`not in`,
//! member and index access (`fetch.status_code`, `input["key"]`,
//! `items[0]`), and the literals `true`/`True`, `false`/`False`,
//! `none`/`None`. Referencing a name or key that does not exist is an error.

use minijinja::{Environment, ErrorKind, UndefinedBehavior, Value as JinjaValue};
use serde_json::{Map, Value};
use thiserror::Error;

/// Longest accepted expression source.
pub const MAX_EXPRESSION_LEN: usize = 4096;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    #[error("expression is {0} characters long (max {MAX_EXPRESSION_LEN})")]
    TooLong(usize),

    #[error("invalid expression: {0}")]
    Syntax(String),

    #[error("expression evaluation failed: {0}")]
    Eval(String),

    #[error("expression refers to an undefined name or key")]
    Undefined,
}

impl From<minijinja::Error> for ExprError {
    fn from(err: minijinja::Error) -> Self {
        match err.kind() {
            ErrorKind::SyntaxError => Self::Syntax(err.to_string()),
            ErrorKind::UndefinedError => Self::Undefined,
            _ => Self::Eval(err.to_string()),
        }
    }
}

fn eval_raw(source: &str, vars: &Map<String, Value>) -> Result<JinjaValue, ExprError> {
    if source.len() > MAX_EXPRESSION_LEN {
        return Err(ExprError::TooLong(source.len()));
    }

    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    let expr = env.compile_expression(source)?;
    let value = expr.eval(JinjaValue::from_serialize(vars))?;
    if value.is_undefined() {
        return Err(ExprError::Undefined);
    }
    Ok(value)
}

/// Evaluate `source` against `vars` and return the result as JSON.
pub fn evaluate(source: &str, vars: &Map<String, Value>) -> Result<Value, ExprError> {
    let value = eval_raw(source, vars)?;
    serde_json::to_value(&value).map_err(|e| ExprError::Eval(e.to_string()))
}

/// Evaluate `source` and reduce the result to its truthiness: `none`,
/// `false`, `0`, and empty strings, lists and maps are false.
pub fn evaluate_bool(source: &str, vars: &Map<String, Value>) -> Result<bool, ExprError> {
    eval_raw(source, vars).map(|value| value.is_true())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars() -> Map<String, Value> {
        match json!({
            "input": { "amount": 150, "country": "NL", "tags": ["vip", "beta"] },
            "fetch": { "status_code": 200, "success": true, "body": "" },
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn eval_bool(source: &str) -> bool {
        evaluate_bool(source, &vars()).unwrap()
    }

    #[test]
    fn comparisons_on_numbers_and_strings() {
        assert!(eval_bool("input.amount > 100"));
        assert!(eval_bool("input['amount'] >= 150"));
        assert!(!eval_bool("input.amount < 100.5"));
        assert!(eval_bool("input.amount > -1"));
        assert!(eval_bool("fetch[\"status_code\"] == 200"));
        assert!(eval_bool("input.country != \"DE\""));
        assert!(eval_bool("input.country < 'Z'"));
    }

    #[test]
    fn boolean_operators_and_precedence() {
        assert!(eval_bool("fetch.success and input.amount > 100"));
        assert!(eval_bool("fetch.success and not (input.amount > 1000)"));
        assert!(eval_bool("false or True"));
        assert!(eval_bool("not fetch.body or input.amount == 0"));
        assert!(!eval_bool("not fetch.success or input.amount < 0 and true"));
    }

    #[test]
    fn membership_and_indexing() {
        assert!(eval_bool("'vip' in input.tags"));
        assert!(eval_bool("'gold' not in input.tags"));
        assert!(eval_bool("input.tags[1] == 'beta'"));
        assert!(eval_bool("'amount' in input"));
        assert!(eval_bool("input.country in ['NL', 'BE']"));
        assert!(eval_bool("'ET' in 'BETA'"));
    }

    #[test]
    fn truthiness_of_bare_values() {
        assert!(eval_bool("input.tags"));
        assert!(!eval_bool("fetch.body"));
        assert!(!eval_bool("None"));
        assert!(eval_bool("-1"));
    }

    #[test]
    fn evaluate_returns_json() {
        assert_eq!(evaluate("input.tags", &vars()).unwrap(), json!(["vip", "beta"]));
        assert_eq!(evaluate("input.amount + 1", &vars()).unwrap(), json!(151));
    }

    #[test]
    fn unknown_names_and_keys_are_errors() {
        assert_eq!(evaluate("undefined_var", &vars()).unwrap_err(), ExprError::Undefined);
        assert_eq!(evaluate("input.nope", &vars()).unwrap_err(), ExprError::Undefined);
        assert!(evaluate("undefined_var.amount > 1", &vars()).is_err());
    }

    #[test]
    fn syntax_errors_are_reported() {
        for source in ["input.amount >", "(true", "1 2", "'open", "a = b"] {
            assert!(
                matches!(evaluate(source, &vars()), Err(ExprError::Syntax(_))),
                "{source} should not compile"
            );
        }
    }

    #[test]
    fn oversized_expression_is_rejected() {
        let source = format!("{}true{}", "(".repeat(5_000), ")".repeat(5_000));
        assert_eq!(evaluate_bool(&source, &Map::new()), Err(ExprError::TooLong(source.len())));
    }

    #[test]
    fn deep_nesting_is_an_error_not_a_crash() {
        let source = format!("{}true{}", "(".repeat(1_000), ")".repeat(1_000));
        assert!(evaluate_bool(&source, &Map::new()).is_err());
    }

    #[test]
    fn negating_the_smallest_integer_does_not_panic() {
        let mut vars = Map::new();
        vars.insert("x".to_owned(), json!(i64::MIN));
        if let Ok(value) = evaluate("-x", &vars) {
            assert!(value.is_number());
        }
    }
}
