pub mod chromosome;
pub mod depth_first;
pub mod derivation;
pub mod gene_consumer;

pub use chromosome::{Chromosome, Codon, CodonGenerator, RandomCodonGenerator};
pub use depth_first::{DepthFirstMapper, Mapping, MappingFailure};
pub use derivation::{DerivationNode, DerivationTree};
pub use gene_consumer::GeneConsumer;
