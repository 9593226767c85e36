use super::chromosome::{Chromosome, CodonGenerator};
use super::derivation::{DerivationNode, DerivationTree};
use super::gene_consumer::GeneConsumer;
use crate::config::{ExhaustionPolicy, MappingConfig};
use crate::error::GpError;
use crate::grammar::{Grammar, RuleId, Symbol};
use log::debug;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Why a chromosome produced no phenotype.
///
/// This is a normal search outcome: the individual is invalid, nothing else
/// is wrong.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingFailure {
    #[error("derivation exceeded the maximum depth")]
    DepthExceeded,
    #[error("chromosome wrapped more often than allowed")]
    WrapLimitExceeded,
    #[error("chromosome exhausted")]
    ChromosomeExhausted,
    #[error("extension would exceed the maximum chromosome length")]
    ChromosomeTooLong,
}

/// Successful mapping of one chromosome
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub tree: DerivationTree,
    /// Codons that took part; the whole chromosome once it has wrapped
    pub codons_used: usize,
    pub wraps: usize,
}

/// Decodes chromosomes into derivation trees, depth first, left to right.
pub struct DepthFirstMapper {
    grammar: Arc<Grammar>,
    config: MappingConfig,
    generator: Option<Box<dyn CodonGenerator>>,
}

impl fmt::Debug for DepthFirstMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepthFirstMapper")
            .field("config", &self.config)
            .field("extends", &self.generator.is_some())
            .finish()
    }
}

impl DepthFirstMapper {
    /// Mapper for the `fail` and `wrap` policies.
    ///
    /// # Errors
    ///
    /// Configuration error if the policy is `extend` (use
    /// [`with_codon_generator`](Self::with_codon_generator)) or the grammar
    /// cannot derive any program within `max_depth`.
    pub fn new(grammar: Arc<Grammar>, config: MappingConfig) -> Result<Self, GpError> {
        if config.exhaustion == ExhaustionPolicy::Extend {
            return Err(GpError::Configuration(
                "The extend policy needs a codon generator".to_string(),
            ));
        }
        Self::build(grammar, config, None)
    }

    pub fn with_codon_generator(
        grammar: Arc<Grammar>,
        config: MappingConfig,
        generator: Box<dyn CodonGenerator>,
    ) -> Result<Self, GpError> {
        Self::build(grammar, config, Some(generator))
    }

    fn build(
        grammar: Arc<Grammar>,
        config: MappingConfig,
        generator: Option<Box<dyn CodonGenerator>>,
    ) -> Result<Self, GpError> {
        let start = grammar.start_rule();
        if start.min_depth() >= config.max_depth {
            return Err(GpError::Configuration(format!(
                "<{}> needs depth {} but max_depth is {}",
                start.name(),
                start.min_depth() + 1,
                config.max_depth
            )));
        }
        Ok(Self {
            grammar,
            config,
            generator,
        })
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Map `chromosome` starting from the grammar's start rule.
    ///
    /// The chromosome is modified in place when codons are appended under the
    /// extend policy, and truncated to the codons used when
    /// `remove_unused_codons` is set and no wrap occurred.
    pub fn map(&mut self, chromosome: &mut Chromosome) -> Result<Mapping, MappingFailure> {
        let grammar = Arc::clone(&self.grammar);
        let (root, codons_used, wraps) = {
            let mut consumer = GeneConsumer::new(
                chromosome,
                self.generator.as_deref_mut(),
                self.config.exhaustion,
                self.config.max_wraps,
                self.config.max_chromosome_length,
            );
            let root = map_rule(
                &grammar,
                self.config.max_depth,
                &mut consumer,
                grammar.start_id(),
                0,
            )
            .inspect_err(|failure| {
                debug!(
                    "Mapping failed after {} codons: {}",
                    consumer.position(),
                    failure
                )
            })?;
            (root, consumer.codons_used(), consumer.wraps())
        };

        if self.config.remove_unused_codons && wraps == 0 {
            chromosome.truncate(codons_used);
        }

        Ok(Mapping {
            tree: DerivationTree::new(root),
            codons_used,
            wraps,
        })
    }
}

fn map_rule(
    grammar: &Grammar,
    max_depth: usize,
    consumer: &mut GeneConsumer<'_>,
    rule_id: RuleId,
    depth: usize,
) -> Result<DerivationNode, MappingFailure> {
    if depth >= max_depth {
        return Err(MappingFailure::DepthExceeded);
    }

    let rule = grammar.rule_by_id(rule_id);
    let choice = match rule.len() {
        1 => 0,
        n => consumer.choose(n)?,
    };
    let production = rule
        .production(choice)
        .ok_or(MappingFailure::ChromosomeExhausted)?;

    let children = production
        .symbols()
        .iter()
        .map(|symbol| match symbol {
            Symbol::Literal(text) => Ok(DerivationNode::terminal(text.as_str())),
            Symbol::Rule(child) => map_rule(grammar, max_depth, consumer, *child, depth + 1),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DerivationNode::NonTerminal {
        rule: rule_id,
        production: choice,
        depth,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::mapping::RandomCodonGenerator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BOOLEAN: &str = "<n> ::= AND( <n> , <n> ) | D0 | D1";

    fn mapper(config: MappingConfig) -> DepthFirstMapper {
        let grammar = Arc::new(Grammar::compile(BOOLEAN).unwrap());
        DepthFirstMapper::new(grammar, config).unwrap()
    }

    fn config(max_depth: usize, exhaustion: ExhaustionPolicy) -> MappingConfig {
        MappingConfig {
            max_depth,
            exhaustion,
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_mapping() {
        let mut mapper = mapper(config(3, ExhaustionPolicy::Fail));
        let mut chromosome = Chromosome::from(vec![0, 4, 5]);
        let mapping = mapper.map(&mut chromosome).unwrap();
        assert_eq!(mapping.tree.to_string(), "AND(D0,D1)");
        assert_eq!(mapping.codons_used, 3);
        assert_eq!(mapping.wraps, 0);
        assert_eq!(chromosome.len(), 3);
    }

    #[test]
    fn test_depth_exceeded() {
        let mut mapper = mapper(config(2, ExhaustionPolicy::Fail));
        // AND at depth 0, AND at depth 1 -> children at depth 2
        let mut chromosome = Chromosome::from(vec![0, 0, 1, 1, 1]);
        assert_eq!(
            mapper.map(&mut chromosome),
            Err(MappingFailure::DepthExceeded)
        );
    }

    #[test]
    fn test_wrapping_uses_whole_chromosome() {
        let grammar = Arc::new(Grammar::compile("<e> ::= <v> + <v> \n <v> ::= a | b").unwrap());
        let mut mapper = DepthFirstMapper::new(grammar, config(3, ExhaustionPolicy::Wrap)).unwrap();
        let mut chromosome = Chromosome::from(vec![1]);
        let mapping = mapper.map(&mut chromosome).unwrap();
        assert_eq!(mapping.tree.to_string(), "b+b");
        assert_eq!(mapping.wraps, 1);
        assert_eq!(mapping.codons_used, chromosome.len());
    }

    #[test]
    fn test_wrap_limit() {
        let mut mapper = mapper(MappingConfig {
            max_depth: 6,
            exhaustion: ExhaustionPolicy::Wrap,
            max_wraps: 0,
            ..Default::default()
        });
        let mut chromosome = Chromosome::from(vec![0, 1]);
        assert_eq!(
            mapper.map(&mut chromosome),
            Err(MappingFailure::WrapLimitExceeded)
        );
    }

    #[test]
    fn test_fail_policy_exhausts() {
        let mut mapper = mapper(config(3, ExhaustionPolicy::Fail));
        let mut chromosome = Chromosome::from(vec![0, 1]);
        assert_eq!(
            mapper.map(&mut chromosome),
            Err(MappingFailure::ChromosomeExhausted)
        );
    }

    #[test]
    fn test_extension_grows_chromosome() {
        let grammar = Arc::new(Grammar::compile(BOOLEAN).unwrap());
        let generator = RandomCodonGenerator::new(StdRng::seed_from_u64(3), 100);
        let mut mapper = DepthFirstMapper::with_codon_generator(
            grammar,
            MappingConfig {
                max_depth: 4,
                exhaustion: ExhaustionPolicy::Extend,
                max_chromosome_length: 50,
                ..Default::default()
            },
            Box::new(generator),
        )
        .unwrap();

        let mut chromosome = Chromosome::from(vec![0]);
        match mapper.map(&mut chromosome) {
            Ok(mapping) => {
                assert!(chromosome.len() >= 3);
                assert!(chromosome.len() <= 50);
                assert_eq!(mapping.codons_used, chromosome.len());
            }
            Err(failure) => assert_eq!(failure, MappingFailure::DepthExceeded),
        }
    }

    #[test]
    fn test_extension_length_limit() {
        let grammar = Arc::new(Grammar::compile(BOOLEAN).unwrap());
        let generator = RandomCodonGenerator::new(StdRng::seed_from_u64(3), 100);
        let mut mapper = DepthFirstMapper::with_codon_generator(
            grammar,
            MappingConfig {
                max_depth: 4,
                exhaustion: ExhaustionPolicy::Extend,
                max_chromosome_length: 1,
                ..Default::default()
            },
            Box::new(generator),
        )
        .unwrap();
        let mut chromosome = Chromosome::from(vec![0]);
        assert_eq!(
            mapper.map(&mut chromosome),
            Err(MappingFailure::ChromosomeTooLong)
        );
    }

    #[test]
    fn test_remove_unused_codons() {
        let mut mapper = mapper(MappingConfig {
            max_depth: 3,
            remove_unused_codons: true,
            ..Default::default()
        });
        let mut chromosome = Chromosome::from(vec![0, 4, 5, 9, 9, 9]);
        let mapping = mapper.map(&mut chromosome).unwrap();
        assert_eq!(mapping.codons_used, 3);
        assert_eq!(chromosome.codons(), &[0, 4, 5]);
    }

    #[test]
    fn test_single_production_consumes_nothing() {
        let grammar =
            Arc::new(Grammar::compile("<e> ::= ( <v> ) \n <v> ::= x | y").unwrap());
        let mut mapper = DepthFirstMapper::new(grammar, config(3, ExhaustionPolicy::Fail)).unwrap();
        let mut chromosome = Chromosome::from(vec![1]);
        let mapping = mapper.map(&mut chromosome).unwrap();
        assert_eq!(mapping.tree.to_string(), "(y)");
        assert_eq!(mapping.codons_used, 1);
    }

    #[test]
    fn test_setup_errors() {
        let grammar = Arc::new(Grammar::compile(BOOLEAN).unwrap());
        assert!(DepthFirstMapper::new(
            Arc::clone(&grammar),
            config(3, ExhaustionPolicy::Extend)
        )
        .is_err());

        let deep = Arc::new(Grammar::compile("<a> ::= <b> \n <b> ::= <c> \n <c> ::= x").unwrap());
        assert!(DepthFirstMapper::new(deep, config(2, ExhaustionPolicy::Fail)).is_err());
    }
}
