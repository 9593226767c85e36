use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Data type carried by program tree nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Boolean,
    Integer,
    Double,
}

impl DataType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Double)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "Boolean",
            DataType::Integer => "Integer",
            DataType::Double => "Double",
        };
        f.write_str(name)
    }
}

/// Runtime value produced by evaluating a program tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Double(f64),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Boolean(_) => DataType::Boolean,
            Value::Integer(_) => DataType::Integer,
            Value::Double(_) => DataType::Double,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to doubles
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            Value::Boolean(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
        }
    }
}

/// External environment mapping variable identifiers to their current values.
///
/// Owned by the evaluator, never by a tree: variables in a program are lookup
/// keys into this table.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_numeric_views() {
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::Double(2.5).as_i64(), None);
        assert_eq!(Value::Boolean(true).as_f64(), None);
        assert_eq!(Value::Boolean(false).data_type(), DataType::Boolean);
    }

    #[test]
    fn test_bindings_overwrite() {
        let mut bindings = Bindings::new();
        bindings.set("x", Value::Double(1.0));
        bindings.set("x", Value::Double(2.0));
        assert_eq!(bindings.get("x"), Some(Value::Double(2.0)));
        assert_eq!(bindings.len(), 1);
        assert!(bindings.get("y").is_none());
    }
}
