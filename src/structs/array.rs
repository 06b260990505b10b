use crate::{
    ast::Path,
    evaluator::EvalError,
    structs::{MoParams, MoStruct, descend, descend_mut},
    value::Value,
};

/// Largest length a write may grow an array to.
pub const MAX_LEN: usize = 1 << 16;

/// Zero-based list addressed by numeric path segments.
///
/// Reads wrap around the length, so on a three element array index 5 reads
/// index 2 and index -1 reads the last element. Reading an empty array yields
/// `0`. Writing past the end grows the array, padding with `0`; negative
/// writes wrap like reads.
#[derive(Debug, Default, Clone)]
pub struct ArrayStruct {
    items: Vec<Value>,
}

impl ArrayStruct {
    pub fn new(items: Vec<Value>) -> Self {
        ArrayStruct { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    fn wrap(&self, index: i64) -> usize {
        index.rem_euclid(self.items.len() as i64) as usize
    }

    /// Element at `index`, wrapped around the length.
    pub fn at(&self, index: i64) -> Value {
        if self.items.is_empty() {
            return Value::ZERO;
        }
        self.items[self.wrap(index)].clone()
    }

    /// Writes `value` at `index`. Growing beyond [`MAX_LEN`] elements fails.
    pub fn store(&mut self, index: i64, value: Value) -> Result<(), EvalError> {
        let slot = match index {
            i if i >= 0 => i as usize,
            _ if self.items.is_empty() => 0,
            i => self.wrap(i),
        };
        if slot >= MAX_LEN {
            return Err(EvalError::InvalidPath(index.to_string()));
        }
        if slot >= self.items.len() {
            self.items.resize(slot + 1, Value::ZERO);
        }
        self.items[slot] = value;
        Ok(())
    }
}

fn parse_index(path: &Path) -> Result<i64, EvalError> {
    path.value()
        .trim()
        .parse::<f64>()
        .map(|n| n.trunc() as i64)
        .map_err(|_| EvalError::InvalidPath(path.remaining()))
}

impl MoStruct for ArrayStruct {
    fn get(&self, path: &Path, params: &MoParams) -> Result<Value, EvalError> {
        let index = parse_index(path)?;
        descend(self.at(index), path.next(), params)
    }

    fn set(&mut self, path: &Path, value: Value) -> Result<(), EvalError> {
        let index = parse_index(path)?;
        match path.next() {
            None => self.store(index, value),
            Some(rest) => descend_mut(self.at(index), path.value(), &rest, value),
        }
    }

    fn clear(&mut self) -> Result<(), EvalError> {
        self.items.clear();
        Ok(())
    }

    fn values(&self) -> Option<Vec<Value>> {
        Some(self.items.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(items: &[f64]) -> ArrayStruct {
        ArrayStruct::new(items.iter().copied().map(Value::from).collect())
    }

    #[test]
    fn test_reads_wrap() {
        let array = numbers(&[10.0, 20.0, 30.0]);
        assert_eq!(array.at(5), array.at(2));
        assert_eq!(array.at(-1), Value::from(30.0));
        assert_eq!(array.at(3), Value::from(10.0));
    }

    #[test]
    fn test_empty_reads_zero() {
        assert_eq!(ArrayStruct::default().at(4), Value::ZERO);
    }

    #[test]
    fn test_writes_grow_or_wrap() {
        let mut array = numbers(&[1.0, 2.0, 3.0]);
        array.store(-1, Value::from(9.0)).unwrap();
        assert_eq!(array.items()[2], Value::from(9.0));
        array.store(4, Value::from(5.0)).unwrap();
        assert!(array.store(1 << 20, Value::ONE).is_err());
        assert_eq!(array.len(), 5);
        assert_eq!(array.items()[3], Value::ZERO);

        let mut empty = ArrayStruct::default();
        empty.store(2, Value::from(4.0)).unwrap();
        assert_eq!(empty.items(), &[Value::ZERO, Value::ZERO, Value::from(4.0)]);
    }

    #[test]
    fn test_non_numeric_segment_is_error() {
        let array = numbers(&[1.0]);
        let err = array.get(&Path::new("first"), &MoParams::empty()).unwrap_err();
        assert_eq!(err, EvalError::InvalidPath("first".to_string()));
    }
}
