use crate::config::MutationConfig;
use crate::engines::initialisation::{BuildMethod, TreeBuilder};
use crate::engines::mapping::{Chromosome, Codon};
use crate::error::GpError;
use crate::functions::registry::SyntaxSet;
use crate::functions::traits::{instantiate, Primitive};
use crate::tree::ProgramTree;
use log::{debug, trace};
use rand::Rng;
use std::sync::Arc;

/// Point and subtree mutation on typed program trees.
#[derive(Debug, Clone)]
pub struct MutationEngine {
    config: MutationConfig,
    subtree_builder: TreeBuilder,
}

impl MutationEngine {
    pub fn new(syntax: Arc<SyntaxSet>, config: MutationConfig) -> Result<Self, GpError> {
        let subtree_builder = TreeBuilder::new(syntax, config.max_subtree_depth)?;
        Ok(Self {
            config,
            subtree_builder,
        })
    }

    pub fn config(&self) -> &MutationConfig {
        &self.config
    }

    pub fn point<R: Rng>(&self, tree: &mut ProgramTree, rng: &mut R) -> Result<Vec<usize>, GpError> {
        point_mutation(tree, self.subtree_builder.syntax(), self.config.p_point, rng)
    }

    pub fn subtree<R: Rng>(&self, tree: &mut ProgramTree, rng: &mut R) -> Result<usize, GpError> {
        subtree_mutation(tree, &self.subtree_builder, rng)
    }

    /// Per-codon mutation at `codon_rate`; returns how many codons changed
    pub fn codons<R: Rng>(
        &self,
        chromosome: &mut Chromosome,
        max_codon: Codon,
        rng: &mut R,
    ) -> usize {
        super::chromosome::point_mutation(chromosome, self.config.codon_rate, max_codon, rng)
    }
}

/// Independently, with probability `p_point`, swap each node's primitive for
/// another one of the same arity that yields the same type over the existing
/// children. Returns the mutated pre-order indices.
///
/// A node with no such alternative is left alone.
pub fn point_mutation<R: Rng>(
    tree: &mut ProgramTree,
    syntax: &SyntaxSet,
    p_point: f64,
    rng: &mut R,
) -> Result<Vec<usize>, GpError> {
    if !(0.0..=1.0).contains(&p_point) {
        return Err(GpError::Configuration(format!(
            "p_point must be between 0 and 1, got {}",
            p_point
        )));
    }

    let mut mutated = Vec::new();
    for index in 0..tree.length() {
        if !rng.gen_bool(p_point) {
            continue;
        }
        let node = tree.nth_node_mut(index)?;
        let child_types = node.child_types();
        let alternatives: Vec<&Arc<dyn Primitive>> = syntax
            .all()
            .iter()
            .filter(|p| p.arity() == node.arity())
            .filter(|p| p.identifier() != node.identifier())
            .filter(|p| p.return_type(&child_types) == Some(node.data_type()))
            .collect();
        if alternatives.is_empty() {
            trace!("No alternative for {} at {}", node.identifier(), index);
            continue;
        }

        let chosen = alternatives[rng.gen_range(0..alternatives.len())];
        trace!("Point mutation at {}: {} -> {}", index, node.identifier(), chosen.identifier());
        node.replace_primitive(instantiate(chosen, rng))?;
        mutated.push(index);
    }

    if !mutated.is_empty() {
        debug!("Point mutation changed {} of {} nodes", mutated.len(), tree.length());
    }
    Ok(mutated)
}

/// Replace a uniformly chosen subtree with a freshly grown one of the same
/// type, at most `builder.max_depth()` deep. Returns the replaced index.
pub fn subtree_mutation<R: Rng>(
    tree: &mut ProgramTree,
    builder: &TreeBuilder,
    rng: &mut R,
) -> Result<usize, GpError> {
    let index = rng.gen_range(0..tree.length());
    let data_type = tree.nth_node(index)?.data_type();
    let replacement = builder.build_node(BuildMethod::Grow, builder.max_depth(), data_type, rng)?;
    let old = tree.set_nth_node(index, replacement)?;
    debug!("Subtree mutation at {} replaced {} nodes", index, old.length());
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::primitives::{Add, Div, Literal, Mul, Sub, Variable};
    use crate::tree::Node;
    use crate::types::{DataType, Value};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn syntax() -> SyntaxSet {
        SyntaxSet::new()
            .with(Arc::new(Add))
            .with(Arc::new(Sub))
            .with(Arc::new(Mul))
            .with(Arc::new(Div))
            .with(Arc::new(Variable::new("x", DataType::Double)))
            .with(Arc::new(Variable::new("y", DataType::Double)))
    }

    fn var(name: &str) -> Node {
        Node::terminal(Arc::new(Variable::new(name, DataType::Double))).unwrap()
    }

    // ADD(x MUL(y x))
    fn sample() -> ProgramTree {
        let mul = Node::new(Arc::new(Mul), vec![var("y"), var("x")]).unwrap();
        ProgramTree::new(Node::new(Arc::new(Add), vec![var("x"), mul]).unwrap())
    }

    #[test]
    fn test_codon_rate_drives_chromosome_mutation() {
        let mut rng = StdRng::seed_from_u64(12);
        let frozen = MutationEngine::new(
            Arc::new(syntax()),
            MutationConfig {
                codon_rate: 0.0,
                ..Default::default()
            },
        )
        .unwrap();
        let mut chromosome = Chromosome::from(vec![7; 20]);
        assert_eq!(frozen.codons(&mut chromosome, 3, &mut rng), 0);
        assert_eq!(chromosome.codons(), &[7; 20]);

        let always = MutationEngine::new(
            Arc::new(syntax()),
            MutationConfig {
                codon_rate: 1.0,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(always.codons(&mut chromosome, 3, &mut rng), 20);
        assert!(chromosome.codons().iter().all(|c| *c <= 3));
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let mut tree = sample();
        let mut rng = StdRng::seed_from_u64(51);
        let mutated = point_mutation(&mut tree, &syntax(), 0.0, &mut rng).unwrap();
        assert!(mutated.is_empty());
        assert_eq!(tree, sample());
        assert_eq!(tree.to_string(), sample().to_string());
    }

    #[test]
    fn test_full_rate_changes_every_node() {
        let mut tree = sample();
        let mut rng = StdRng::seed_from_u64(52);
        let mutated = point_mutation(&mut tree, &syntax(), 1.0, &mut rng).unwrap();
        assert_eq!(mutated, vec![0, 1, 2, 3, 4]);
        let original = sample();
        for i in 0..tree.length() {
            assert_ne!(
                tree.nth_node(i).unwrap().identifier(),
                original.nth_node(i).unwrap().identifier()
            );
        }
    }

    #[test]
    fn test_no_alternative_is_skipped() {
        let lonely = SyntaxSet::new()
            .with(Arc::new(Add))
            .with(Arc::new(Variable::new("x", DataType::Double)));
        let tree = ProgramTree::new(Node::new(Arc::new(Add), vec![var("x"), var("x")]).unwrap());
        let mut mutated_tree = tree.clone();
        let mut rng = StdRng::seed_from_u64(53);
        let mutated = point_mutation(&mut mutated_tree, &lonely, 1.0, &mut rng).unwrap();
        assert!(mutated.is_empty());
        assert_eq!(mutated_tree, tree);
    }

    #[test]
    fn test_point_mutation_keeps_types() {
        // Integer literal children: ADD keeps Integer, DIV would not
        let one = Node::terminal(Arc::new(Literal::new(Value::Integer(1)))).unwrap();
        let two = Node::terminal(Arc::new(Literal::new(Value::Integer(2)))).unwrap();
        let mut tree = ProgramTree::new(Node::new(Arc::new(Add), vec![one, two]).unwrap());
        let mut rng = StdRng::seed_from_u64(54);
        for _ in 0..20 {
            point_mutation(&mut tree, &syntax(), 1.0, &mut rng).unwrap();
            assert_eq!(tree.data_type(), DataType::Integer);
            assert_ne!(tree.root().identifier(), "DIV");
        }
    }

    #[test]
    fn test_subtree_mutation_bounded() {
        let engine = MutationEngine::new(
            Arc::new(syntax()),
            MutationConfig {
                max_subtree_depth: 2,
                ..Default::default()
            },
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(55);
        for _ in 0..50 {
            let mut tree = sample();
            let index = engine.subtree(&mut tree, &mut rng).unwrap();
            assert!(index < sample().length());
            // sample depth 2, deepest insertion point at depth 2
            assert!(tree.depth() <= 4);
            assert_eq!(tree.data_type(), DataType::Double);
        }
    }
}
