use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::{
    compiled::{CompiledExpression, compile},
    environment::Environment,
    evaluator::Scope,
    parser::ParseError,
};

#[derive(Debug, Clone, Error)]
pub enum VectorError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("expected a number, a formula or an array of 1 or 3 of them, found {0}")]
    InvalidShape(String),
}

/// One component of a [`MolangVec3`].
#[derive(Debug, Clone)]
pub enum Axis {
    Constant(f32),
    Formula(Arc<CompiledExpression>),
}

impl Axis {
    fn from_json(json: &serde_json::Value) -> Result<Self, VectorError> {
        match json {
            serde_json::Value::Number(n) => Ok(Axis::Constant(n.as_f64().unwrap_or(0.0) as f32)),
            serde_json::Value::String(s) => Self::from_formula(s),
            other => Err(VectorError::InvalidShape(other.to_string())),
        }
    }

    fn from_formula(source: &str) -> Result<Self, VectorError> {
        if let Ok(n) = source.trim().parse::<f32>() {
            return Ok(Axis::Constant(n));
        }
        Ok(Axis::Formula(Arc::new(compile(source)?)))
    }

    fn evaluate(&self, env: &Environment) -> f32 {
        match self {
            Axis::Constant(n) => *n,
            Axis::Formula(expr) => {
                let mut scope = Scope::new();
                match expr.evaluate_in(&mut scope, env) {
                    Ok(value) => value.as_number() as f32,
                    Err(err) => {
                        warn!(source = %expr.source(), "vector axis failed, using 0: {}", err);
                        0.0
                    }
                }
            }
        }
    }
}

/// A three-component value as written in animation files.
///
/// Accepted shapes:
///
/// ```text
/// 1.5                          all axes constant
/// "math.sin(q.anim_time)"      one formula shared by all axes
/// ["v.x"]                      same as above
/// [0, "v.y * 2", 1]            one entry per axis
/// ```
///
/// Strings that are plain numbers become constants.
///
/// # Examples
///
/// ```
/// use molang::{Environment, vector::MolangVec3};
///
/// let json = serde_json::json!([1, "v.y = 2; return v.y * 2;", 3]);
/// let vec = MolangVec3::from_json(&json).unwrap();
/// assert_eq!(vec.evaluate(&Environment::new()), [1.0, 4.0, 3.0]);
/// ```
#[derive(Debug, Clone)]
pub struct MolangVec3 {
    pub x: Axis,
    pub y: Axis,
    pub z: Axis,
}

impl MolangVec3 {
    pub fn constant(x: f32, y: f32, z: f32) -> Self {
        MolangVec3 {
            x: Axis::Constant(x),
            y: Axis::Constant(y),
            z: Axis::Constant(z),
        }
    }

    pub fn from_json(json: &serde_json::Value) -> Result<Self, VectorError> {
        match json {
            serde_json::Value::Array(items) => match items.as_slice() {
                [all] => Self::uniform(all),
                [x, y, z] => Ok(MolangVec3 {
                    x: Axis::from_json(x)?,
                    y: Axis::from_json(y)?,
                    z: Axis::from_json(z)?,
                }),
                _ => Err(VectorError::InvalidShape(format!("an array of {}", items.len()))),
            },
            other => Self::uniform(other),
        }
    }

    fn uniform(json: &serde_json::Value) -> Result<Self, VectorError> {
        let axis = Axis::from_json(json)?;
        Ok(MolangVec3 {
            x: axis.clone(),
            y: axis.clone(),
            z: axis,
        })
    }

    pub fn is_constant(&self) -> bool {
        [&self.x, &self.y, &self.z]
            .iter()
            .all(|axis| matches!(axis, Axis::Constant(_)))
    }

    /// Evaluates every axis against `env`. An axis that fails to evaluate is
    /// logged and reads as `0` without affecting the others.
    pub fn evaluate(&self, env: &Environment) -> [f32; 3] {
        let value = [self.x.evaluate(env), self.y.evaluate(env), self.z.evaluate(env)];
        if let Err(err) = env.clear_temp() {
            warn!("could not clear temp after vector evaluation: {}", err);
        }
        value
    }
}

impl Default for MolangVec3 {
    fn default() -> Self {
        Self::constant(0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shapes() {
        let env = Environment::with_seed(0);
        assert_eq!(MolangVec3::from_json(&json!(2)).unwrap().evaluate(&env), [2.0; 3]);
        assert_eq!(MolangVec3::from_json(&json!("1 + 1")).unwrap().evaluate(&env), [2.0; 3]);
        assert_eq!(MolangVec3::from_json(&json!(["3"])).unwrap().evaluate(&env), [3.0; 3]);
        assert_eq!(
            MolangVec3::from_json(&json!([1, "2", "1 + 2"])).unwrap().evaluate(&env),
            [1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn test_numeric_strings_are_constant() {
        let vec = MolangVec3::from_json(&json!(["1.5", 2, "-3"])).unwrap();
        assert!(vec.is_constant());
    }

    #[test]
    fn test_bad_shapes() {
        assert!(matches!(
            MolangVec3::from_json(&json!([1, 2])),
            Err(VectorError::InvalidShape(_))
        ));
        assert!(matches!(MolangVec3::from_json(&json!(null)), Err(VectorError::InvalidShape(_))));
        assert!(matches!(MolangVec3::from_json(&json!("1 +")), Err(VectorError::Parse(_))));
    }

    #[test]
    fn test_failing_axis_is_isolated() {
        let env = Environment::with_seed(0);
        let vec = MolangVec3::from_json(&json!([1, "query.missing", "v.a = 4; return v.a;"])).unwrap();
        assert_eq!(vec.evaluate(&env), [1.0, 0.0, 4.0]);
    }
}
