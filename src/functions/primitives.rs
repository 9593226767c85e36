use anyhow::{anyhow, bail, Result};
use rand::{Rng, RngCore};
use std::sync::Arc;

use super::traits::Primitive;
use crate::types::{Bindings, DataType, Value};

fn numeric_result(child_types: &[DataType]) -> Option<DataType> {
    match child_types {
        [DataType::Integer, DataType::Integer] => Some(DataType::Integer),
        [a, b] if a.is_numeric() && b.is_numeric() => Some(DataType::Double),
        _ => None,
    }
}

fn boolean_arg(args: &[Value], index: usize) -> Result<bool> {
    args.get(index)
        .and_then(Value::as_bool)
        .ok_or_else(|| anyhow!("argument {} is not a boolean", index))
}

fn numeric_arg(args: &[Value], index: usize) -> Result<f64> {
    args.get(index)
        .and_then(Value::as_f64)
        .ok_or_else(|| anyhow!("argument {} is not numeric", index))
}

// Integer arithmetic when both sides are integers, double otherwise.
fn arithmetic(
    args: &[Value],
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (args.first(), args.get(1)) {
        (Some(Value::Integer(a)), Some(Value::Integer(b))) => Ok(Value::Integer(int_op(*a, *b))),
        _ => Ok(Value::Double(float_op(numeric_arg(args, 0)?, numeric_arg(args, 1)?))),
    }
}

// --- Boolean ---

#[derive(Debug, Clone, Copy)]
pub struct And;

impl Primitive for And {
    fn identifier(&self) -> &str { "AND" }
    fn arity(&self) -> usize { 2 }
    fn return_type(&self, child_types: &[DataType]) -> Option<DataType> {
        (child_types == [DataType::Boolean, DataType::Boolean]).then_some(DataType::Boolean)
    }
    fn evaluate(&self, args: &[Value], _bindings: &Bindings) -> Result<Value> {
        Ok(Value::Boolean(boolean_arg(args, 0)? && boolean_arg(args, 1)?))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Or;

impl Primitive for Or {
    fn identifier(&self) -> &str { "OR" }
    fn arity(&self) -> usize { 2 }
    fn return_type(&self, child_types: &[DataType]) -> Option<DataType> {
        (child_types == [DataType::Boolean, DataType::Boolean]).then_some(DataType::Boolean)
    }
    fn evaluate(&self, args: &[Value], _bindings: &Bindings) -> Result<Value> {
        Ok(Value::Boolean(boolean_arg(args, 0)? || boolean_arg(args, 1)?))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Not;

impl Primitive for Not {
    fn identifier(&self) -> &str { "NOT" }
    fn arity(&self) -> usize { 1 }
    fn return_type(&self, child_types: &[DataType]) -> Option<DataType> {
        (child_types == [DataType::Boolean]).then_some(DataType::Boolean)
    }
    fn evaluate(&self, args: &[Value], _bindings: &Bindings) -> Result<Value> {
        Ok(Value::Boolean(!boolean_arg(args, 0)?))
    }
}

/// `IF(condition, then, else)`; both branches must share a type.
#[derive(Debug, Clone, Copy)]
pub struct If;

impl Primitive for If {
    fn identifier(&self) -> &str { "IF" }
    fn arity(&self) -> usize { 3 }
    fn return_type(&self, child_types: &[DataType]) -> Option<DataType> {
        match child_types {
            [DataType::Boolean, then, otherwise] if then == otherwise => Some(*then),
            _ => None,
        }
    }
    fn evaluate(&self, args: &[Value], _bindings: &Bindings) -> Result<Value> {
        let branch = if boolean_arg(args, 0)? { 1 } else { 2 };
        args.get(branch)
            .copied()
            .ok_or_else(|| anyhow!("IF expects 3 arguments, got {}", args.len()))
    }
}

// --- Arithmetic ---

#[derive(Debug, Clone, Copy)]
pub struct Add;

impl Primitive for Add {
    fn identifier(&self) -> &str { "ADD" }
    fn arity(&self) -> usize { 2 }
    fn return_type(&self, child_types: &[DataType]) -> Option<DataType> {
        numeric_result(child_types)
    }
    fn evaluate(&self, args: &[Value], _bindings: &Bindings) -> Result<Value> {
        arithmetic(args, i64::wrapping_add, |a, b| a + b)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sub;

impl Primitive for Sub {
    fn identifier(&self) -> &str { "SUB" }
    fn arity(&self) -> usize { 2 }
    fn return_type(&self, child_types: &[DataType]) -> Option<DataType> {
        numeric_result(child_types)
    }
    fn evaluate(&self, args: &[Value], _bindings: &Bindings) -> Result<Value> {
        arithmetic(args, i64::wrapping_sub, |a, b| a - b)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Mul;

impl Primitive for Mul {
    fn identifier(&self) -> &str { "MUL" }
    fn arity(&self) -> usize { 2 }
    fn return_type(&self, child_types: &[DataType]) -> Option<DataType> {
        numeric_result(child_types)
    }
    fn evaluate(&self, args: &[Value], _bindings: &Bindings) -> Result<Value> {
        arithmetic(args, i64::wrapping_mul, |a, b| a * b)
    }
}

/// Protected division: a zero divisor yields 1.0
#[derive(Debug, Clone, Copy)]
pub struct Div;

impl Primitive for Div {
    fn identifier(&self) -> &str { "DIV" }
    fn arity(&self) -> usize { 2 }
    fn return_type(&self, child_types: &[DataType]) -> Option<DataType> {
        numeric_result(child_types).map(|_| DataType::Double)
    }
    fn evaluate(&self, args: &[Value], _bindings: &Bindings) -> Result<Value> {
        let numerator = numeric_arg(args, 0)?;
        let divisor = numeric_arg(args, 1)?;
        if divisor == 0.0 {
            return Ok(Value::Double(1.0));
        }
        Ok(Value::Double(numerator / divisor))
    }
}

// --- Comparison ---

#[derive(Debug, Clone, Copy)]
pub struct GreaterThan;

impl Primitive for GreaterThan {
    fn identifier(&self) -> &str { "GT" }
    fn arity(&self) -> usize { 2 }
    fn return_type(&self, child_types: &[DataType]) -> Option<DataType> {
        numeric_result(child_types).map(|_| DataType::Boolean)
    }
    fn evaluate(&self, args: &[Value], _bindings: &Bindings) -> Result<Value> {
        Ok(Value::Boolean(numeric_arg(args, 0)? > numeric_arg(args, 1)?))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LessThan;

impl Primitive for LessThan {
    fn identifier(&self) -> &str { "LT" }
    fn arity(&self) -> usize { 2 }
    fn return_type(&self, child_types: &[DataType]) -> Option<DataType> {
        numeric_result(child_types).map(|_| DataType::Boolean)
    }
    fn evaluate(&self, args: &[Value], _bindings: &Bindings) -> Result<Value> {
        Ok(Value::Boolean(numeric_arg(args, 0)? < numeric_arg(args, 1)?))
    }
}

// --- Terminals ---

/// Fixed constant
#[derive(Debug, Clone)]
pub struct Literal {
    label: String,
    value: Value,
}

impl Literal {
    pub fn new(value: Value) -> Self {
        Self {
            label: value.to_string(),
            value,
        }
    }
}

impl Primitive for Literal {
    fn identifier(&self) -> &str { &self.label }
    fn arity(&self) -> usize { 0 }
    fn return_type(&self, _child_types: &[DataType]) -> Option<DataType> {
        Some(self.value.data_type())
    }
    fn evaluate(&self, _args: &[Value], _bindings: &Bindings) -> Result<Value> {
        Ok(self.value)
    }
    fn constant(&self) -> Option<Value> {
        Some(self.value)
    }
}

/// Lookup key into the evaluator's [`Bindings`].
///
/// The tree never holds the value itself, so copies of a program all observe
/// whatever the evaluator binds before each evaluation.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    data_type: DataType,
}

impl Variable {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Primitive for Variable {
    fn identifier(&self) -> &str { &self.name }
    fn arity(&self) -> usize { 0 }
    fn return_type(&self, _child_types: &[DataType]) -> Option<DataType> {
        Some(self.data_type)
    }
    fn evaluate(&self, _args: &[Value], bindings: &Bindings) -> Result<Value> {
        let value = bindings
            .get(&self.name)
            .ok_or_else(|| anyhow!("variable {} is not bound", self.name))?;
        if value.data_type() != self.data_type {
            bail!(
                "variable {} bound to {} but declared {}",
                self.name,
                value.data_type(),
                self.data_type
            );
        }
        Ok(value)
    }
}

/// Ephemeral random constant.
///
/// The prototype registered in a syntax set has no value; every time it is
/// drawn into a tree a new instance with a value sampled from `[lower, upper)`
/// is created and then stays fixed.
#[derive(Debug, Clone)]
pub struct Erc {
    label: String,
    data_type: DataType,
    lower: f64,
    upper: f64,
    value: Option<Value>,
}

impl Erc {
    /// Double-valued prototype
    pub fn double(lower: f64, upper: f64) -> Self {
        Self {
            label: "ERC".to_string(),
            data_type: DataType::Double,
            lower,
            upper,
            value: None,
        }
    }

    /// Integer-valued prototype
    pub fn integer(lower: i64, upper: i64) -> Self {
        Self {
            label: "ERC".to_string(),
            data_type: DataType::Integer,
            lower: lower as f64,
            upper: upper as f64,
            value: None,
        }
    }

    pub fn value(&self) -> Option<Value> {
        self.value
    }
}

impl Primitive for Erc {
    fn identifier(&self) -> &str { &self.label }
    fn arity(&self) -> usize { 0 }
    fn return_type(&self, _child_types: &[DataType]) -> Option<DataType> {
        Some(self.data_type)
    }
    fn evaluate(&self, _args: &[Value], _bindings: &Bindings) -> Result<Value> {
        self.value
            .ok_or_else(|| anyhow!("ephemeral random constant was never instantiated"))
    }
    fn instantiate(&self, rng: &mut dyn RngCore) -> Option<Arc<dyn Primitive>> {
        let value = match self.data_type {
            DataType::Integer if self.lower < self.upper => {
                Value::Integer(rng.gen_range(self.lower as i64..self.upper as i64))
            }
            DataType::Integer => Value::Integer(self.lower as i64),
            _ if self.lower < self.upper => Value::Double(rng.gen_range(self.lower..self.upper)),
            _ => Value::Double(self.lower),
        };
        Some(Arc::new(Self {
            label: value.to_string(),
            data_type: self.data_type,
            lower: self.lower,
            upper: self.upper,
            value: Some(value),
        }))
    }
    fn constant(&self) -> Option<Value> {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_numeric_promotion() {
        assert_eq!(Add.return_type(&[DataType::Integer, DataType::Integer]), Some(DataType::Integer));
        assert_eq!(Add.return_type(&[DataType::Integer, DataType::Double]), Some(DataType::Double));
        assert_eq!(Add.return_type(&[DataType::Boolean, DataType::Double]), None);
        assert_eq!(Div.return_type(&[DataType::Integer, DataType::Integer]), Some(DataType::Double));
    }

    #[test]
    fn test_if_requires_matching_branches() {
        assert_eq!(
            If.return_type(&[DataType::Boolean, DataType::Double, DataType::Double]),
            Some(DataType::Double)
        );
        assert_eq!(If.return_type(&[DataType::Boolean, DataType::Double, DataType::Integer]), None);
        assert_eq!(If.return_type(&[DataType::Double, DataType::Double, DataType::Double]), None);
    }

    #[test]
    fn test_protected_division() {
        let bindings = Bindings::new();
        let result = Div.evaluate(&[Value::Double(3.0), Value::Integer(0)], &bindings).unwrap();
        assert_eq!(result, Value::Double(1.0));
    }

    #[test]
    fn test_variable_lookup() {
        let x = Variable::new("x", DataType::Double);
        let mut bindings = Bindings::new();
        assert!(x.evaluate(&[], &bindings).is_err());
        bindings.set("x", Value::Double(4.5));
        assert_eq!(x.evaluate(&[], &bindings).unwrap(), Value::Double(4.5));
        bindings.set("x", Value::Boolean(true));
        assert!(x.evaluate(&[], &bindings).is_err());
    }

    #[test]
    fn test_erc_fixed_after_instantiation() {
        let mut rng = StdRng::seed_from_u64(7);
        let prototype = Erc::integer(0, 10);
        assert!(prototype.evaluate(&[], &Bindings::new()).is_err());

        let instance = prototype.instantiate(&mut rng).unwrap();
        let first = instance.evaluate(&[], &Bindings::new()).unwrap();
        let second = instance.evaluate(&[], &Bindings::new()).unwrap();
        assert_eq!(first, second);
        assert_eq!(instance.identifier(), first.to_string());
        assert!(matches!(first, Value::Integer(v) if (0..10).contains(&v)));
    }
}
