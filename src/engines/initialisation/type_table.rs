use crate::functions::registry::SyntaxSet;
use crate::functions::traits::Primitive;
use crate::types::DataType;

/// Data types a syntax set can produce within a depth budget.
///
/// `full_types(d)` holds the types of trees whose leaves all sit exactly `d`
/// edges below the root; `grow_types(d)` the types of trees at most `d` deep.
#[derive(Debug, Clone)]
pub struct TypeTable {
    full: Vec<Vec<DataType>>,
    grow: Vec<Vec<DataType>>,
}

impl TypeTable {
    pub fn new(syntax: &SyntaxSet, max_depth: usize) -> Self {
        let terminals = syntax.terminal_types();
        let mut full = vec![terminals.clone()];
        let mut grow = vec![terminals];

        for depth in 1..=max_depth {
            let full_next = producible(syntax, &full[depth - 1]);
            let mut grow_next = producible(syntax, &grow[depth - 1]);
            grow_next.extend(grow[depth - 1].iter().copied());
            grow_next.sort();
            grow_next.dedup();
            full.push(full_next);
            grow.push(grow_next);
        }

        Self { full, grow }
    }

    pub fn max_depth(&self) -> usize {
        self.full.len() - 1
    }

    pub fn full_types(&self, depth: usize) -> &[DataType] {
        self.full.get(depth).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn grow_types(&self, depth: usize) -> &[DataType] {
        self.grow.get(depth).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Return types of every function applied to children drawn from `available`
fn producible(syntax: &SyntaxSet, available: &[DataType]) -> Vec<DataType> {
    let mut types: Vec<DataType> = syntax
        .functions()
        .iter()
        .flat_map(|f| {
            combinations(f.arity(), available)
                .into_iter()
                .filter_map(|children| f.return_type(&children))
                .collect::<Vec<_>>()
        })
        .collect();
    types.sort();
    types.dedup();
    types
}

/// Child type lists from `available` for which `primitive` returns `target`
pub(crate) fn child_combinations(
    primitive: &dyn Primitive,
    available: &[DataType],
    target: DataType,
) -> Vec<Vec<DataType>> {
    combinations(primitive.arity(), available)
        .into_iter()
        .filter(|children| primitive.return_type(children) == Some(target))
        .collect()
}

fn combinations(arity: usize, available: &[DataType]) -> Vec<Vec<DataType>> {
    let mut out = vec![Vec::with_capacity(arity)];
    for _ in 0..arity {
        out = out
            .into_iter()
            .flat_map(|prefix| {
                available.iter().map(move |t| {
                    let mut next = prefix.clone();
                    next.push(*t);
                    next
                })
            })
            .collect();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::primitives::{Add, GreaterThan, If, Variable};
    use std::sync::Arc;

    fn syntax() -> SyntaxSet {
        SyntaxSet::new()
            .with(Arc::new(Add))
            .with(Arc::new(GreaterThan))
            .with(Arc::new(If))
            .with(Arc::new(Variable::new("x", DataType::Double)))
    }

    #[test]
    fn test_depth_zero_is_terminals() {
        let table = TypeTable::new(&syntax(), 3);
        assert_eq!(table.full_types(0), &[DataType::Double]);
        assert_eq!(table.grow_types(0), &[DataType::Double]);
        assert_eq!(table.max_depth(), 3);
    }

    #[test]
    fn test_full_and_grow_differ() {
        let table = TypeTable::new(&syntax(), 3);
        // GT(x x) is boolean, but IF needs a boolean child so it appears a level later
        assert_eq!(table.full_types(1), &[DataType::Boolean, DataType::Double]);
        assert!(table.grow_types(1).contains(&DataType::Double));
        assert!(table.full_types(4).is_empty());
    }

    #[test]
    fn test_child_combinations() {
        let available = [DataType::Boolean, DataType::Double];
        let combos = child_combinations(&If, &available, DataType::Double);
        assert_eq!(combos, vec![vec![DataType::Boolean, DataType::Double, DataType::Double]]);
        assert!(child_combinations(&Add, &[DataType::Boolean], DataType::Double).is_empty());
    }
}
