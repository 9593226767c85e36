use rand::Rng;
use serde::{Deserialize, Serialize};

pub type Codon = u32;

/// Codons consumed in order by the depth-first mapper, one per rule with more
/// than one production. Mapping may grow or shorten it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chromosome {
    codons: Vec<Codon>,
}

impl Chromosome {
    pub fn new(codons: Vec<Codon>) -> Self {
        Self { codons }
    }

    /// Uniformly random codons in `0..=max_codon`
    pub fn random<R: Rng>(length: usize, max_codon: Codon, rng: &mut R) -> Self {
        (0..length).map(|_| rng.gen_range(0..=max_codon)).collect()
    }

    pub fn len(&self) -> usize {
        self.codons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codons.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Codon> {
        self.codons.get(index).copied()
    }

    pub fn codons(&self) -> &[Codon] {
        &self.codons
    }

    pub fn codons_mut(&mut self) -> &mut [Codon] {
        &mut self.codons
    }

    pub fn push(&mut self, codon: Codon) {
        self.codons.push(codon);
    }

    pub fn truncate(&mut self, len: usize) {
        self.codons.truncate(len);
    }

    pub fn into_codons(self) -> Vec<Codon> {
        self.codons
    }
}

impl From<Vec<Codon>> for Chromosome {
    fn from(codons: Vec<Codon>) -> Self {
        Self::new(codons)
    }
}

impl FromIterator<Codon> for Chromosome {
    fn from_iter<I: IntoIterator<Item = Codon>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Source of fresh codons for the extension policy
pub trait CodonGenerator: Send {
    fn next_codon(&mut self) -> Codon;
}

/// Draws codons uniformly from `0..=max_codon_size`
#[derive(Debug, Clone)]
pub struct RandomCodonGenerator<R> {
    rng: R,
    max_codon_size: Codon,
}

impl<R: Rng + Send> RandomCodonGenerator<R> {
    pub fn new(rng: R, max_codon_size: Codon) -> Self {
        Self {
            rng,
            max_codon_size,
        }
    }
}

impl<R: Rng + Send> CodonGenerator for RandomCodonGenerator<R> {
    fn next_codon(&mut self) -> Codon {
        self.rng.gen_range(0..=self.max_codon_size)
    }
}
