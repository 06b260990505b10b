use tracing::{instrument, warn};

use crate::{
    ast::Ast,
    environment::{Context, Environment},
    evaluator::{Evaluator, RuntimeError, Scope},
    optimizer::ConstantFolder,
    parser::{DEFAULT_MAX_DEPTH, ParseError, Parser},
    value::Value,
};

/// Settings for [`compile_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Run the constant folding pass.
    pub fold_constants: bool,
    /// Deepest expression nesting the parser accepts.
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            fold_constants: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A parsed (and usually folded) formula, ready to be evaluated repeatedly.
///
/// Compiled expressions are immutable; every evaluation gets its own
/// [`Scope`], and all mutable state lives in the [`Environment`] passed in.
///
/// # Examples
///
/// ```
/// use molang::{compile, Environment, Value};
///
/// let expr = compile("v.foo = 5; return v.foo;").unwrap();
/// let env = Environment::new();
/// assert_eq!(expr.evaluate(&env, None).unwrap(), Value::from(5.0));
/// ```
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    ast: Ast,
}

impl CompiledExpression {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// True when the source held no statements. Evaluating it yields `0`.
    pub fn is_empty(&self) -> bool {
        self.ast.root().is_none()
    }

    /// Evaluates against `env` with a fresh scope.
    ///
    /// When `context` is given it becomes the data behind the `context` root;
    /// otherwise the previous binding stays. The `temp` store is cleared
    /// afterwards, also when evaluation fails. Errors carry a trace of the
    /// enclosing expressions.
    pub fn evaluate(&self, env: &Environment, context: Option<&Context>) -> Result<Value, RuntimeError> {
        if let Some(context) = context {
            env.bind_context(context)?;
        }

        let mut scope = Scope::new();
        let result = self.evaluate_in(&mut scope, env);
        let cleared = env.clear_temp();

        let value = result?;
        cleared?;
        Ok(value)
    }

    /// Evaluates within an existing scope without touching the context
    /// binding or the `temp` store.
    pub fn evaluate_in(&self, scope: &mut Scope, env: &Environment) -> Result<Value, RuntimeError> {
        Evaluator::new(&self.ast)
            .evaluate(scope, env)
            .map_err(|err| err.with_trace(&self.ast))
    }

    /// Evaluates and substitutes `0` on failure, logging the error.
    pub fn evaluate_or_zero(&self, env: &Environment, context: Option<&Context>) -> Value {
        match self.evaluate(env, context) {
            Ok(value) => value,
            Err(err) => {
                warn!(source = %self.source, "evaluation failed, using 0: {}", err);
                Value::ZERO
            }
        }
    }
}

/// Compiles `source` with default options.
pub fn compile(source: &str) -> Result<CompiledExpression, ParseError> {
    compile_with(source, &CompileOptions::default())
}

#[instrument(level = "debug", skip_all)]
pub fn compile_with(source: &str, options: &CompileOptions) -> Result<CompiledExpression, ParseError> {
    let mut ast = Parser::new(source).with_max_depth(options.max_depth).parse()?;

    if options.fold_constants {
        let scratch = Environment::with_seed(0);
        let mut scope = Scope::new();
        ConstantFolder::new(&scratch, &mut scope).fold(&mut ast);
    }

    Ok(CompiledExpression {
        source: source.to_string(),
        ast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvalError;

    #[test]
    fn test_temp_cleared_even_on_error() {
        let env = Environment::with_seed(0);
        let failing = compile("t.x = 1; nope.y").unwrap();
        assert!(failing.evaluate(&env, None).is_err());
        let read = compile("t.x").unwrap();
        assert_eq!(read.evaluate(&env, None).unwrap(), Value::ZERO);
    }

    #[test]
    fn test_context_kept_when_not_given() {
        let env = Environment::with_seed(0);
        let context = Context::new();
        context.insert("a", 4.0);
        let expr = compile("c.a").unwrap();
        assert_eq!(expr.evaluate(&env, Some(&context)).unwrap(), Value::from(4.0));
        assert_eq!(expr.evaluate(&env, None).unwrap(), Value::from(4.0));
    }

    #[test]
    fn test_evaluate_or_zero() {
        let env = Environment::with_seed(0);
        let expr = compile("query.missing").unwrap();
        assert_eq!(expr.evaluate_or_zero(&env, None), Value::ZERO);
        let err = expr.evaluate(&env, None).unwrap_err();
        assert_eq!(err.error, EvalError::UnknownRoot("query".to_string()));
        assert_eq!(err.trace.len(), 1);
    }

    #[test]
    fn test_empty_source() {
        let expr = compile("").unwrap();
        assert!(expr.is_empty());
        assert_eq!(expr.evaluate(&Environment::with_seed(0), None).unwrap(), Value::ZERO);
    }
}
