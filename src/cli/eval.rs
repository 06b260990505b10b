//! Evaluate MoLang formulas from the command line

use super::{CliError, molang_to_json, parse_context};
use crate::{CompileOptions, Environment, Value, compile_with, parser::DEFAULT_MAX_DEPTH};

/// Options for the eval command
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// The MoLang formula to evaluate
    pub expression: String,
    /// JSON object bound to the `context` root
    pub context: Option<String>,
    /// Number bound to `this`
    pub this: Option<f64>,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
    /// Skip constant folding
    pub no_fold: bool,
    /// Evaluate this many times against the same environment
    pub repeat: usize,
    /// Seed for the random functions
    pub seed: Option<u64>,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            expression: String::new(),
            context: None,
            this: None,
            syntax_only: false,
            no_fold: false,
            repeat: 1,
            seed: None,
        }
    }
}

/// Result of an eval operation
#[derive(Debug, PartialEq)]
pub enum EvalResult {
    /// Syntax validation passed
    SyntaxValid,
    /// One result per evaluation
    Success(Vec<Value>),
}

impl EvalResult {
    /// The result as a single value: the value itself for one evaluation,
    /// an array of them for several.
    pub fn into_value(self) -> Option<Value> {
        match self {
            EvalResult::SyntaxValid => None,
            EvalResult::Success(mut values) if values.len() == 1 => values.pop(),
            EvalResult::Success(values) => Some(Value::from(values)),
        }
    }

    pub fn into_json(self) -> Option<serde_json::Value> {
        self.into_value().map(|value| molang_to_json(&value))
    }
}

/// Execute a molang eval operation
pub fn execute_eval(options: &EvalOptions) -> Result<EvalResult, CliError> {
    let compile_options = CompileOptions {
        fold_constants: !options.no_fold,
        max_depth: DEFAULT_MAX_DEPTH,
    };
    let expr = compile_with(&options.expression, &compile_options)?;

    if options.syntax_only {
        return Ok(EvalResult::SyntaxValid);
    }

    let context = options.context.as_deref().map(parse_context).transpose()?;

    let env = match options.seed {
        Some(seed) => Environment::with_seed(seed),
        None => Environment::new(),
    };
    if let Some(this) = options.this {
        env.bind_this(this);
    }

    let mut results = Vec::with_capacity(options.repeat.max(1));
    for _ in 0..options.repeat.max(1) {
        results.push(expr.evaluate(&env, context.as_ref())?);
    }
    Ok(EvalResult::Success(results))
}
