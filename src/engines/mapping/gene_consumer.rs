use super::chromosome::{Chromosome, Codon, CodonGenerator};
use super::depth_first::MappingFailure;
use crate::config::ExhaustionPolicy;

/// Codon cursor over one individual's chromosome.
///
/// Applies the exhaustion policy when the cursor reaches the end: wrapping
/// restarts at the first codon, extension appends a generated codon.
pub struct GeneConsumer<'a> {
    chromosome: &'a mut Chromosome,
    generator: Option<&'a mut (dyn CodonGenerator + 'static)>,
    policy: ExhaustionPolicy,
    max_wraps: usize,
    max_length: usize,
    position: usize,
    wraps: usize,
}

impl<'a> GeneConsumer<'a> {
    pub fn new(
        chromosome: &'a mut Chromosome,
        generator: Option<&'a mut (dyn CodonGenerator + 'static)>,
        policy: ExhaustionPolicy,
        max_wraps: usize,
        max_length: usize,
    ) -> Self {
        Self {
            chromosome,
            generator,
            policy,
            max_wraps,
            max_length,
            position: 0,
            wraps: 0,
        }
    }

    /// Next codon, applying the exhaustion policy at the end of the chromosome
    pub fn consume(&mut self) -> Result<Codon, MappingFailure> {
        if self.position >= self.chromosome.len() {
            match self.policy {
                ExhaustionPolicy::Fail => return Err(MappingFailure::ChromosomeExhausted),
                ExhaustionPolicy::Wrap => {
                    if self.chromosome.is_empty() {
                        return Err(MappingFailure::ChromosomeExhausted);
                    }
                    if self.wraps >= self.max_wraps {
                        return Err(MappingFailure::WrapLimitExceeded);
                    }
                    self.wraps += 1;
                    self.position = 0;
                }
                ExhaustionPolicy::Extend => {
                    if self.chromosome.len() >= self.max_length {
                        return Err(MappingFailure::ChromosomeTooLong);
                    }
                    let generator = self
                        .generator
                        .as_deref_mut()
                        .ok_or(MappingFailure::ChromosomeExhausted)?;
                    self.chromosome.push(generator.next_codon());
                }
            }
        }

        let codon = self
            .chromosome
            .get(self.position)
            .ok_or(MappingFailure::ChromosomeExhausted)?;
        self.position += 1;
        Ok(codon)
    }

    /// Consume a codon and map it to a choice index
    pub fn choose(&mut self, num_choices: usize) -> Result<usize, MappingFailure> {
        let codon = self.consume()?;
        Ok(codon as usize % num_choices.max(1))
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn wraps(&self) -> usize {
        self.wraps
    }

    /// Codons that took part in the mapping; all of them once the cursor has wrapped
    pub fn codons_used(&self) -> usize {
        if self.wraps > 0 {
            self.chromosome.len()
        } else {
            self.position
        }
    }
}
