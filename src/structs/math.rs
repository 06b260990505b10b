use std::{cell::RefCell, collections::HashMap, f64::consts::PI};

use once_cell::sync::Lazy;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    ast::Path,
    evaluator::EvalError,
    structs::{MoParams, MoStruct},
    value::Value,
};

type MathFn = fn(&MoParams, &mut StdRng) -> Result<f64, EvalError>;

/// Functions that draw from the generator. The optimizer never folds these.
pub const NON_DETERMINISTIC: [&str; 4] = ["random", "random_integer", "die_roll", "die_roll_integer"];

static FUNCTIONS: Lazy<HashMap<&'static str, MathFn>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, MathFn> = HashMap::new();
    table.insert("abs", |p, _| Ok(p.get_number(0)?.abs()));
    table.insert("sin", |p, _| Ok(p.get_number(0)?.to_radians().sin()));
    table.insert("cos", |p, _| Ok(p.get_number(0)?.to_radians().cos()));
    table.insert("asin", |p, _| Ok(p.get_number(0)?.asin().to_degrees()));
    table.insert("acos", |p, _| Ok(p.get_number(0)?.acos().to_degrees()));
    table.insert("atan", |p, _| Ok(p.get_number(0)?.atan().to_degrees()));
    table.insert("atan2", |p, _| {
        Ok(p.get_number(0)?.atan2(p.get_number(1)?).to_degrees())
    });
    table.insert("ceil", |p, _| Ok(p.get_number(0)?.ceil()));
    table.insert("floor", |p, _| Ok(p.get_number(0)?.floor()));
    table.insert("round", |p, _| Ok(p.get_number(0)?.round()));
    table.insert("trunc", |p, _| Ok(p.get_number(0)?.trunc()));
    table.insert("clamp", |p, _| {
        Ok(clamp(p.get_number(0)?, p.get_number(1)?, p.get_number(2)?))
    });
    table.insert("exp", |p, _| Ok(p.get_number(0)?.exp()));
    table.insert("ln", |p, _| Ok(p.get_number(0)?.ln()));
    table.insert("sqrt", |p, _| Ok(p.get_number(0)?.sqrt()));
    table.insert("pow", |p, _| Ok(p.get_number(0)?.powf(p.get_number(1)?)));
    table.insert("mod", |p, _| Ok(p.get_number(0)? % p.get_number(1)?));
    table.insert("max", |p, _| Ok(p.get_number(0)?.max(p.get_number(1)?)));
    table.insert("min", |p, _| Ok(p.get_number(0)?.min(p.get_number(1)?)));
    table.insert("min_angle", |p, _| Ok(min_angle(p.get_number(0)?)));
    table.insert("pi", |_, _| Ok(PI));
    table.insert("hermite_blend", |p, _| Ok(hermite_blend(p.get_number(0)?)));
    table.insert("lerp", |p, _| {
        Ok(lerp(p.get_number(0)?, p.get_number(1)?, p.get_number(2)?))
    });
    table.insert("lerp_rotate", |p, _| {
        Ok(lerp_rotate(p.get_number(0)?, p.get_number(1)?, p.get_number(2)?))
    });
    table.insert("random", |p, rng| {
        Ok(random(rng, p.get_number(0)?, p.get_number(1)?))
    });
    table.insert("random_integer", |p, rng| {
        Ok(random_integer(rng, p.get_int(0)?, p.get_int(1)?) as f64)
    });
    table.insert("die_roll", |p, rng| {
        let (low, high) = (p.get_number(1)?, p.get_number(2)?);
        let rolls = p.get_number(0)?.ceil().max(0.0) as u64;
        Ok((0..rolls).map(|_| random(rng, low, high)).sum())
    });
    table.insert("die_roll_integer", |p, rng| {
        let (low, high) = (p.get_int(1)?, p.get_int(2)?);
        let rolls = p.get_int(0)?.max(0);
        Ok((0..rolls).map(|_| random_integer(rng, low, high) as f64).sum())
    });
    table
});

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Linear interpolation with the amount clamped to `0..=1`.
pub fn lerp(start: f64, end: f64, amount: f64) -> f64 {
    let amount = amount.clamp(0.0, 1.0);
    start + (end - start) * amount
}

/// Wraps an angle in degrees into `0..360`.
pub fn radify(degrees: f64) -> f64 {
    (((degrees + 180.0) % 360.0) + 180.0) % 360.0
}

/// Interpolates between two angles in degrees along the shorter arc.
pub fn lerp_rotate(start: f64, end: f64, amount: f64) -> f64 {
    let mut start = radify(start);
    let mut end = radify(end);
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }
    if end - start > 180.0 {
        return radify(end + amount * (360.0 - (end - start)));
    }
    start + amount * (end - start)
}

/// Smoothstep curve `3t^2 - 2t^3`.
pub fn hermite_blend(t: f64) -> f64 {
    3.0 * t * t - 2.0 * t * t * t
}

/// Wraps an angle in degrees into `-180..180`.
pub fn min_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}

fn random(rng: &mut StdRng, low: f64, high: f64) -> f64 {
    low + rng.random::<f64>() * (high - low)
}

/// Integer in `low..high`. An empty range yields `low`.
fn random_integer(rng: &mut StdRng, low: i32, high: i32) -> i32 {
    if high <= low {
        return low;
    }
    rng.random_range(low..high)
}

/// The `math` root: a read-only table of numeric functions.
///
/// Trigonometric functions take and return degrees. The random functions draw
/// from a generator owned by this instance, so two environments never share
/// random state.
///
/// # Examples
///
/// ```text
/// math.clamp(v.x, 0, 1)
/// math.lerp_rotate(350, 10, 0.5)
/// math.random_integer(0, 6)
/// math.pi
/// ```
#[derive(Debug)]
pub struct MathLibrary {
    rng: RefCell<StdRng>,
}

impl MathLibrary {
    /// A library whose generator is seeded from the operating system.
    pub fn new() -> Self {
        MathLibrary {
            rng: RefCell::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        MathLibrary {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn has_function(name: &str) -> bool {
        FUNCTIONS.contains_key(name.to_lowercase().as_str())
    }

    pub fn function_names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = FUNCTIONS.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn call(&self, name: &str, params: &MoParams) -> Result<f64, EvalError> {
        let function = FUNCTIONS
            .get(name.to_lowercase().as_str())
            .ok_or_else(|| EvalError::UnknownFunction(format!("math.{}", name)))?;
        let mut rng = self.rng.try_borrow_mut().map_err(|_| EvalError::StructBusy)?;
        function(params, &mut rng)
    }
}

impl Default for MathLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MoStruct for MathLibrary {
    fn get(&self, path: &Path, params: &MoParams) -> Result<Value, EvalError> {
        if path.has_children() {
            return Err(EvalError::InvalidPath(format!("math.{}", path.remaining())));
        }
        self.call(path.value(), params).map(Value::Number)
    }

    fn set(&mut self, path: &Path, _value: Value) -> Result<(), EvalError> {
        Err(EvalError::ReadOnly(format!("math.{}", path.remaining())))
    }

    fn clear(&mut self) -> Result<(), EvalError> {
        Err(EvalError::UnsupportedOperation("the math library cannot be cleared".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(math: &MathLibrary, name: &str, args: &[f64]) -> f64 {
        let params = MoParams::new(args.iter().copied().map(Value::from).collect());
        math.call(name, &params).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_clamp_and_lerp() {
        let math = MathLibrary::with_seed(1);
        assert_eq!(call(&math, "clamp", &[15.0, 0.0, 10.0]), 10.0);
        assert_eq!(call(&math, "clamp", &[-3.0, 0.0, 10.0]), 0.0);
        assert_eq!(call(&math, "lerp", &[0.0, 10.0, 0.5]), 5.0);
        assert_eq!(call(&math, "lerp", &[0.0, 10.0, 2.0]), 10.0);
    }

    #[test]
    fn test_trig_uses_degrees() {
        let math = MathLibrary::with_seed(1);
        assert!(close(call(&math, "sin", &[90.0]), 1.0));
        assert!(close(call(&math, "cos", &[180.0]), -1.0));
        assert!(close(call(&math, "asin", &[1.0]), 90.0));
        assert!(close(call(&math, "atan2", &[1.0, 1.0]), 45.0));
    }

    #[test]
    fn test_lerp_rotate_takes_short_arc() {
        assert!(close(lerp_rotate(0.0, 90.0, 0.5), 45.0));
        assert!(close(lerp_rotate(350.0, 10.0, 0.5), 0.0));
    }

    #[test]
    fn test_min_angle() {
        assert_eq!(min_angle(190.0), -170.0);
        assert_eq!(min_angle(-190.0), 170.0);
        assert_eq!(min_angle(45.0), 45.0);
    }

    #[test]
    fn test_hermite_blend() {
        assert_eq!(hermite_blend(0.0), 0.0);
        assert_eq!(hermite_blend(0.5), 0.5);
        assert_eq!(hermite_blend(1.0), 1.0);
    }

    #[test]
    fn test_random_stays_in_range_and_is_seeded() {
        let a = MathLibrary::with_seed(7);
        let b = MathLibrary::with_seed(7);
        for _ in 0..50 {
            let x = call(&a, "random", &[2.0, 4.0]);
            assert!((2.0..4.0).contains(&x));
            assert_eq!(x, call(&b, "random", &[2.0, 4.0]));
            let n = call(&a, "random_integer", &[0.0, 3.0]);
            assert!([0.0, 1.0, 2.0].contains(&n));
            call(&b, "random_integer", &[0.0, 3.0]);
        }
        assert_eq!(call(&a, "random_integer", &[5.0, 5.0]), 5.0);
    }

    #[test]
    fn test_die_roll_sums_rolls() {
        let math = MathLibrary::with_seed(3);
        let total = call(&math, "die_roll_integer", &[3.0, 1.0, 2.0]);
        assert_eq!(total, 3.0);
    }

    #[test]
    fn test_unknown_and_strict_arguments() {
        let math = MathLibrary::with_seed(1);
        assert_eq!(
            math.call("nope", &MoParams::empty()),
            Err(EvalError::UnknownFunction("math.nope".to_string()))
        );
        assert_eq!(
            math.call("abs", &MoParams::empty()),
            Err(EvalError::MissingArgument { index: 0 })
        );
        let text = MoParams::new(vec![Value::from("x")]);
        assert!(matches!(math.call("abs", &text), Err(EvalError::TypeMismatch { .. })));
    }

    #[test]
    fn test_pi_as_property() {
        let math = MathLibrary::with_seed(1);
        let value = math.get(&Path::new("pi"), &MoParams::empty()).unwrap();
        assert_eq!(value, Value::Number(PI));
    }
}
