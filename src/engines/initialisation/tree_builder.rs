use super::ramped::ramped_half_and_half;
use super::type_table::{child_combinations, TypeTable};
use crate::config::{InitialisationConfig, InitialisationMethod};
use crate::error::GpError;
use crate::functions::registry::SyntaxSet;
use crate::functions::traits::{instantiate, Primitive};
use crate::tree::{Node, ProgramTree};
use crate::types::DataType;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMethod {
    /// Every leaf exactly at the requested depth
    Full,
    /// Functions and terminals mixed, depth at most the requested depth
    Grow,
}

/// Builds random typed program trees from a syntax set.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    syntax: Arc<SyntaxSet>,
    table: TypeTable,
}

impl TreeBuilder {
    /// Builder for trees up to `max_depth` edges deep
    pub fn new(syntax: Arc<SyntaxSet>, max_depth: usize) -> Result<Self, GpError> {
        syntax.validate()?;
        let table = TypeTable::new(&syntax, max_depth);
        Ok(Self { syntax, table })
    }

    pub fn syntax(&self) -> &Arc<SyntaxSet> {
        &self.syntax
    }

    pub fn max_depth(&self) -> usize {
        self.table.max_depth()
    }

    pub fn full<R: Rng>(&self, return_type: DataType, rng: &mut R) -> Result<ProgramTree, GpError> {
        self.build(BuildMethod::Full, self.max_depth(), return_type, rng)
    }

    pub fn grow<R: Rng>(&self, return_type: DataType, rng: &mut R) -> Result<ProgramTree, GpError> {
        self.build(BuildMethod::Grow, self.max_depth(), return_type, rng)
    }

    /// # Errors
    ///
    /// Configuration error when `depth` is beyond this builder's max depth or
    /// no tree of `return_type` can be built within it.
    pub fn build<R: Rng>(
        &self,
        method: BuildMethod,
        depth: usize,
        return_type: DataType,
        rng: &mut R,
    ) -> Result<ProgramTree, GpError> {
        if depth > self.max_depth() {
            return Err(GpError::Configuration(format!(
                "Requested depth {} exceeds builder max depth {}",
                depth,
                self.max_depth()
            )));
        }
        self.build_node(method, depth, return_type, rng)
            .map(ProgramTree::new)
    }

    /// Subtree whose root may take the place of a node of `return_type`
    pub fn build_node<R: Rng>(
        &self,
        method: BuildMethod,
        remaining: usize,
        return_type: DataType,
        rng: &mut R,
    ) -> Result<Node, GpError> {
        let candidates = self.candidates(method, remaining, return_type);
        if candidates.is_empty() {
            return Err(GpError::Configuration(format!(
                "No {:?} tree of type {} fits in depth {}",
                method, return_type, remaining
            )));
        }

        let (prototype, combos) = &candidates[rng.gen_range(0..candidates.len())];
        let child_types = &combos[rng.gen_range(0..combos.len())];
        let children = child_types
            .iter()
            .map(|t| self.build_node(method, remaining.saturating_sub(1), *t, rng))
            .collect::<Result<Vec<_>, _>>()?;

        Node::new(instantiate(prototype, rng), children)
    }

    /// Prototypes that can root a tree of `return_type`, each with its usable child type lists
    fn candidates(
        &self,
        method: BuildMethod,
        remaining: usize,
        return_type: DataType,
    ) -> Vec<(&Arc<dyn Primitive>, Vec<Vec<DataType>>)> {
        self.syntax
            .all()
            .iter()
            .filter_map(|p| {
                if p.arity() == 0 {
                    let allowed = method == BuildMethod::Grow || remaining == 0;
                    return (allowed && p.return_type(&[]) == Some(return_type))
                        .then(|| (p, vec![Vec::new()]));
                }
                if remaining == 0 {
                    return None;
                }
                let available = match method {
                    BuildMethod::Full => self.table.full_types(remaining - 1),
                    BuildMethod::Grow => self.table.grow_types(remaining - 1),
                };
                let combos = child_combinations(p.as_ref(), available, return_type);
                (!combos.is_empty()).then_some((p, combos))
            })
            .collect()
    }

    /// `count` trees built in parallel.
    ///
    /// Tree `i` draws from its own generator seeded from `(seed, i)`, so the
    /// result does not depend on thread scheduling.
    pub fn build_population_par(
        &self,
        method: BuildMethod,
        return_type: DataType,
        count: usize,
        seed: u64,
    ) -> Result<Vec<ProgramTree>, GpError> {
        (0..count)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(stream_seed(seed, i));
                self.build(method, self.max_depth(), return_type, &mut rng)
            })
            .collect()
    }

    /// Initial population following `config.method`
    pub fn population<R: Rng>(
        &self,
        config: &InitialisationConfig,
        rng: &mut R,
    ) -> Result<Vec<ProgramTree>, GpError> {
        let population = match config.method {
            InitialisationMethod::Full => (0..config.population_size)
                .map(|_| self.build(BuildMethod::Full, config.max_depth, config.return_type, rng))
                .collect::<Result<Vec<_>, _>>()?,
            InitialisationMethod::Grow => (0..config.population_size)
                .map(|_| self.build(BuildMethod::Grow, config.max_depth, config.return_type, rng))
                .collect::<Result<Vec<_>, _>>()?,
            InitialisationMethod::RampedHalfAndHalf => ramped_half_and_half(
                self,
                config.population_size,
                config.max_depth,
                config.return_type,
                config.max_retries,
                rng,
            )?,
        };
        info!(
            "Initialised {} trees with {:?} up to depth {}",
            population.len(),
            config.method,
            config.max_depth
        );
        Ok(population)
    }
}

pub(crate) fn stream_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
