use super::tree_builder::{BuildMethod, TreeBuilder};
use crate::error::GpError;
use crate::tree::ProgramTree;
use crate::types::DataType;
use log::{debug, warn};
use rand::Rng;
use std::collections::HashSet;

/// Ramped half-and-half initialisation.
///
/// The population is split evenly over depths `2..=max_depth`, the remainder
/// going to the deepest groups. Within a group even slots use Grow and odd
/// slots use Full. Each tree is regenerated until its rendering is new to the
/// population; after `max_retries` attempts the last tree is kept anyway.
pub fn ramped_half_and_half<R: Rng>(
    builder: &TreeBuilder,
    size: usize,
    max_depth: usize,
    return_type: DataType,
    max_retries: usize,
    rng: &mut R,
) -> Result<Vec<ProgramTree>, GpError> {
    if max_depth < 2 {
        return Err(GpError::Configuration(format!(
            "Ramped half-and-half needs max_depth >= 2, got {}",
            max_depth
        )));
    }

    let depths: Vec<usize> = (2..=max_depth).collect();
    let per_depth = size / depths.len();
    let remainder = size % depths.len();

    let mut population = Vec::with_capacity(size);
    let mut seen: HashSet<String> = HashSet::with_capacity(size);
    let mut duplicates = 0;

    for (group, &depth) in depths.iter().enumerate() {
        let group_size = per_depth + usize::from(group >= depths.len() - remainder);
        for slot in 0..group_size {
            let method = if slot % 2 == 0 {
                BuildMethod::Grow
            } else {
                BuildMethod::Full
            };

            let mut attempts = 0;
            let tree = loop {
                let tree = builder.build(method, depth, return_type, rng)?;
                attempts += 1;
                if seen.insert(tree.to_string()) {
                    break tree;
                }
                if attempts >= max_retries.max(1) {
                    duplicates += 1;
                    break tree;
                }
            };
            population.push(tree);
        }
        debug!("Ramped depth {}: {} trees", depth, group_size);
    }

    if duplicates > 0 {
        warn!(
            "Accepted {} duplicate trees after {} retries each",
            duplicates, max_retries
        );
    }
    Ok(population)
}
