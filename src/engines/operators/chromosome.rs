use crate::engines::mapping::{Chromosome, Codon};
use rand::Rng;

/// Variable-length one-point crossover.
///
/// Each parent gets its own cut point, so children may differ in length from
/// both parents.
pub fn one_point_crossover<R: Rng>(
    parent1: &Chromosome,
    parent2: &Chromosome,
    rng: &mut R,
) -> (Chromosome, Chromosome) {
    let point1 = rng.gen_range(0..=parent1.len());
    let point2 = rng.gen_range(0..=parent2.len());
    let (head1, tail1) = parent1.codons().split_at(point1);
    let (head2, tail2) = parent2.codons().split_at(point2);

    let child1 = head1.iter().chain(tail2).copied().collect();
    let child2 = head2.iter().chain(tail1).copied().collect();
    (child1, child2)
}

/// Replace each codon with a random one with probability `rate`.
/// Returns how many codons changed.
pub fn point_mutation<R: Rng>(
    chromosome: &mut Chromosome,
    rate: f64,
    max_codon: Codon,
    rng: &mut R,
) -> usize {
    let rate = rate.clamp(0.0, 1.0);
    let mut changed = 0;
    for codon in chromosome.codons_mut() {
        if rng.gen_bool(rate) {
            *codon = rng.gen_range(0..=max_codon);
            changed += 1;
        }
    }
    changed
}
