use crate::config::{CrossoverConfig, CrossoverMethod};
use crate::error::GpError;
use crate::tree::ProgramTree;
use crate::types::DataType;
use log::debug;
use rand::Rng;

/// Result of one subtree exchange
#[derive(Debug, Clone)]
pub struct CrossoverOutcome {
    pub first: ProgramTree,
    pub second: ProgramTree,
    /// Exchange points in the first and second parent; `None` when no
    /// compatible pair of points existed
    pub points: Option<(usize, usize)>,
    /// The exchange broke the depth limit and was undone
    pub reverted: bool,
}

/// Subtree crossover on typed program trees.
///
/// Parents are consumed: the chosen subtrees change owner, so the children
/// share no nodes with each other or with anything else.
#[derive(Debug, Clone, Default)]
pub struct CrossoverEngine {
    config: CrossoverConfig,
}

impl CrossoverEngine {
    pub fn new(config: CrossoverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CrossoverConfig {
        &self.config
    }

    pub fn crossover<R: Rng>(
        &self,
        first: ProgramTree,
        second: ProgramTree,
        rng: &mut R,
    ) -> Result<CrossoverOutcome, GpError> {
        match self.config.method {
            CrossoverMethod::Koza => self.exchange(first, second, Some(self.config.p_function), rng),
            CrossoverMethod::UniformPoint => self.exchange(first, second, None, rng),
        }
    }

    fn exchange<R: Rng>(
        &self,
        mut first: ProgramTree,
        mut second: ProgramTree,
        p_function: Option<f64>,
        rng: &mut R,
    ) -> Result<CrossoverOutcome, GpError> {
        let p_function = p_function.map(|p| p.clamp(0.0, 1.0));

        let point1 = select_point(&first, None, p_function, rng);
        let Some(point1) = point1 else {
            return Ok(unchanged(first, second));
        };
        let data_type = first.nth_node(point1)?.data_type();
        let Some(point2) = select_point(&second, Some(data_type), p_function, rng) else {
            debug!("No {} subtree in the second parent, crossover skipped", data_type);
            return Ok(unchanged(first, second));
        };

        swap_subtrees(&mut first, point1, &mut second, point2)?;

        let reverted = match self.config.max_depth {
            Some(limit) if first.depth() > limit || second.depth() > limit => {
                swap_subtrees(&mut first, point1, &mut second, point2)?;
                debug!(
                    "Crossover at ({}, {}) exceeded depth {}, reverted",
                    point1, point2, limit
                );
                true
            }
            _ => false,
        };

        Ok(CrossoverOutcome {
            first,
            second,
            points: Some((point1, point2)),
            reverted,
        })
    }
}

fn unchanged(first: ProgramTree, second: ProgramTree) -> CrossoverOutcome {
    CrossoverOutcome {
        first,
        second,
        points: None,
        reverted: false,
    }
}

/// Exchange the subtrees rooted at the two pre-order indices
pub fn swap_subtrees(
    first: &mut ProgramTree,
    point1: usize,
    second: &mut ProgramTree,
    point2: usize,
) -> Result<(), GpError> {
    let a = first.nth_node_mut(point1)?;
    let b = second.nth_node_mut(point2)?;
    if a.data_type() != b.data_type() {
        return Err(GpError::TypeMismatch {
            expected: a.data_type(),
            actual: b.data_type(),
        });
    }
    std::mem::swap(a, b);
    Ok(())
}

/// Pick a crossover point, optionally restricted to subtrees of `data_type`.
///
/// With `p_function` set, a function point is chosen with that probability
/// and a terminal point otherwise, falling back to the other kind when the
/// preferred kind has no candidate. Without it every node is equally likely.
pub fn select_point<R: Rng>(
    tree: &ProgramTree,
    data_type: Option<DataType>,
    p_function: Option<f64>,
    rng: &mut R,
) -> Option<usize> {
    let nodes = tree.flatten();
    let matches = |i: &usize| data_type.map_or(true, |t| nodes[*i].data_type() == t);

    let candidates: Vec<usize> = match p_function {
        None => (0..nodes.len()).filter(matches).collect(),
        Some(p) => {
            let functions: Vec<usize> = (0..nodes.len())
                .filter(|i| nodes[*i].is_function())
                .filter(matches)
                .collect();
            let terminals: Vec<usize> = (0..nodes.len())
                .filter(|i| nodes[*i].is_terminal())
                .filter(matches)
                .collect();
            if functions.is_empty() {
                terminals
            } else if terminals.is_empty() || rng.gen_bool(p) {
                functions
            } else {
                terminals
            }
        }
    };

    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.gen_range(0..candidates.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::primitives::{Add, GreaterThan, If, Literal, Mul, Variable};
    use crate::tree::Node;
    use crate::types::Value;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn var(name: &str) -> Node {
        Node::terminal(Arc::new(Variable::new(name, DataType::Double))).unwrap()
    }

    fn constant(value: f64) -> Node {
        Node::terminal(Arc::new(Literal::new(Value::Double(value)))).unwrap()
    }

    // IF(GT(x 1) MUL(x x) ADD(x 2))
    fn conditional() -> ProgramTree {
        let cond = Node::new(Arc::new(GreaterThan), vec![var("x"), constant(1.0)]).unwrap();
        let then = Node::new(Arc::new(Mul), vec![var("x"), var("x")]).unwrap();
        let otherwise = Node::new(Arc::new(Add), vec![var("x"), constant(2.0)]).unwrap();
        ProgramTree::new(Node::new(Arc::new(If), vec![cond, then, otherwise]).unwrap())
    }

    // ADD(y MUL(y 3))
    fn arithmetic() -> ProgramTree {
        let mul = Node::new(Arc::new(Mul), vec![var("y"), constant(3.0)]).unwrap();
        ProgramTree::new(Node::new(Arc::new(Add), vec![var("y"), mul]).unwrap())
    }

    #[test]
    fn test_swap_subtrees() {
        let mut a = conditional();
        let mut b = arithmetic();
        swap_subtrees(&mut a, 4, &mut b, 2).unwrap();
        assert_eq!(a.to_string(), "IF(GT(x 1) MUL(y 3) ADD(x 2))");
        assert_eq!(b.to_string(), "ADD(y MUL(x x))");
        // GT is boolean, y is double
        assert!(swap_subtrees(&mut a, 1, &mut b, 1).is_err());
    }

    #[test]
    fn test_children_stay_well_typed() {
        let engine = CrossoverEngine::default();
        let mut rng = StdRng::seed_from_u64(41);
        for _ in 0..100 {
            let outcome = engine.crossover(conditional(), arithmetic(), &mut rng).unwrap();
            assert_eq!(outcome.first.data_type(), DataType::Double);
            assert_eq!(outcome.second.data_type(), DataType::Double);
            assert_eq!(
                outcome.first.length() + outcome.second.length(),
                conditional().length() + arithmetic().length()
            );
        }
    }

    #[test]
    fn test_koza_prefers_functions() {
        let tree = conditional();
        let mut rng = StdRng::seed_from_u64(42);
        let function_points = (0..1000)
            .filter_map(|_| select_point(&tree, None, Some(0.9), &mut rng))
            .filter(|i| tree.nth_node(*i).unwrap().is_function())
            .count();
        assert!(function_points > 800 && function_points < 980);
    }

    #[test]
    fn test_terminal_only_tree() {
        let tree = ProgramTree::new(var("x"));
        let mut rng = StdRng::seed_from_u64(43);
        assert_eq!(select_point(&tree, None, Some(1.0), &mut rng), Some(0));
        assert_eq!(select_point(&tree, Some(DataType::Boolean), Some(1.0), &mut rng), None);
    }

    #[test]
    fn test_depth_guard_reverts() {
        let engine = CrossoverEngine::new(CrossoverConfig {
            method: CrossoverMethod::UniformPoint,
            p_function: 0.9,
            max_depth: Some(2),
        });
        let mut rng = StdRng::seed_from_u64(44);
        for _ in 0..100 {
            let outcome = engine.crossover(conditional(), arithmetic(), &mut rng).unwrap();
            assert!(outcome.first.depth() <= 2);
            assert!(outcome.second.depth() <= 2);
            if outcome.reverted {
                assert_eq!(outcome.first, conditional());
                assert_eq!(outcome.second, arithmetic());
            }
        }
    }
}
