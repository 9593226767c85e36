use super::tree_builder::BuildMethod;
use crate::engines::mapping::{Chromosome, Codon, DerivationNode, DerivationTree};
use crate::error::GpError;
use crate::grammar::{Grammar, RuleId, Symbol};
use rand::Rng;
use std::sync::Arc;

/// Random derivations straight from a grammar.
///
/// Only productions whose minimum depth fits the remaining budget are
/// considered, so construction never dead-ends once the start rule fits.
/// Alongside each tree the builder emits a chromosome that the depth-first
/// mapper decodes back into the same tree.
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    grammar: Arc<Grammar>,
    max_depth: usize,
    max_codon_size: Codon,
}

impl GrammarBuilder {
    pub fn new(grammar: Arc<Grammar>, max_depth: usize, max_codon_size: Codon) -> Result<Self, GpError> {
        let start = grammar.start_rule();
        if start.min_depth() >= max_depth {
            return Err(GpError::Configuration(format!(
                "No derivation of <{}> fits in max_depth {}",
                start.name(),
                max_depth
            )));
        }
        // Every production index must itself be a valid codon
        let too_wide = |len: usize| len > 1 && (len - 1) as u64 > u64::from(max_codon_size);
        if let Some(rule) = grammar.rules().iter().find(|rule| too_wide(rule.len())) {
            return Err(GpError::Configuration(format!(
                "<{}> has {} productions but max_codon_size is {}",
                rule.name(),
                rule.len(),
                max_codon_size
            )));
        }
        Ok(Self {
            grammar,
            max_depth,
            max_codon_size,
        })
    }

    pub fn grow<R: Rng>(&self, rng: &mut R) -> Result<(DerivationTree, Chromosome), GpError> {
        self.build(BuildMethod::Grow, rng)
    }

    /// Prefers recursive productions while the depth budget allows them
    pub fn full<R: Rng>(&self, rng: &mut R) -> Result<(DerivationTree, Chromosome), GpError> {
        self.build(BuildMethod::Full, rng)
    }

    pub fn build<R: Rng>(
        &self,
        method: BuildMethod,
        rng: &mut R,
    ) -> Result<(DerivationTree, Chromosome), GpError> {
        let mut codons = Vec::new();
        let root = self.derive(method, self.grammar.start_id(), 0, &mut codons, rng)?;
        Ok((DerivationTree::new(root), Chromosome::from(codons)))
    }

    fn derive<R: Rng>(
        &self,
        method: BuildMethod,
        rule_id: RuleId,
        depth: usize,
        codons: &mut Vec<Codon>,
        rng: &mut R,
    ) -> Result<DerivationNode, GpError> {
        let rule = self.grammar.rule_by_id(rule_id);
        let remaining = self.max_depth.saturating_sub(depth + 1);

        let fitting: Vec<usize> = (0..rule.len())
            .filter(|&i| {
                rule.production(i)
                    .is_some_and(|p| p.min_depth() <= remaining)
            })
            .collect();
        let recursive: Vec<usize> = fitting
            .iter()
            .copied()
            .filter(|&i| rule.production(i).is_some_and(|p| p.is_recursive()))
            .collect();
        let candidates = match method {
            BuildMethod::Full if !recursive.is_empty() => recursive,
            _ => fitting,
        };
        if candidates.is_empty() {
            return Err(GpError::Configuration(format!(
                "No production of <{}> fits in {} remaining levels",
                rule.name(),
                remaining
            )));
        }

        let choice = candidates[rng.gen_range(0..candidates.len())];
        if rule.len() > 1 {
            codons.push(encode(choice, rule.len(), self.max_codon_size, rng));
        }

        let production = rule.production(choice).ok_or_else(|| {
            GpError::Generation(format!("<{}> has no production {}", rule.name(), choice))
        })?;
        let children = production
            .symbols()
            .iter()
            .map(|symbol| match symbol {
                Symbol::Literal(text) => Ok(DerivationNode::terminal(text.as_str())),
                Symbol::Rule(child) => self.derive(method, *child, depth + 1, codons, rng),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DerivationNode::NonTerminal {
            rule: rule_id,
            production: choice,
            depth,
            children,
        })
    }
}

/// A random codon `c <= max_codon` with `c % alternatives == choice`
fn encode<R: Rng>(choice: usize, alternatives: usize, max_codon: Codon, rng: &mut R) -> Codon {
    let choice = choice as Codon;
    let alternatives = alternatives as Codon;
    let span = max_codon.saturating_sub(choice) / alternatives;
    choice + rng.gen_range(0..=span) * alternatives
}
