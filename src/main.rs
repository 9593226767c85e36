use anyhow::{Context, Result};
use gpcore::config::{ConfigManager, ExhaustionPolicy};
use gpcore::engines::initialisation::TreeBuilder;
use gpcore::engines::mapping::{Chromosome, DepthFirstMapper, RandomCodonGenerator};
use gpcore::engines::operators::{CrossoverEngine, MutationEngine};
use gpcore::functions::primitives::{Add, Div, Erc, GreaterThan, If, Mul, Sub, Variable};
use gpcore::{Bindings, DataType, Grammar, SyntaxSet, Value};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

const DEFAULT_GRAMMAR: &str = "\
<expr> ::= ( <expr> <op> <expr> ) | <var>
<op>   ::= + | - | *
<var>  ::= x | y | 1.0
";

fn syntax_set() -> Arc<SyntaxSet> {
    Arc::new(
        SyntaxSet::new()
            .with(Arc::new(Add))
            .with(Arc::new(Sub))
            .with(Arc::new(Mul))
            .with(Arc::new(Div))
            .with(Arc::new(If))
            .with(Arc::new(GreaterThan))
            .with(Arc::new(Variable::new("x", DataType::Double)))
            .with(Arc::new(Erc::double(-1.0, 1.0))),
    )
}

fn main() -> Result<()> {
    env_logger::init();

    let manager = ConfigManager::new();
    match std::env::args().nth(1) {
        Some(path) => manager
            .load_from_file(&path)
            .with_context(|| format!("loading {}", path))?,
        None => manager.load_from_env()?,
    }
    let config = manager.get()?;
    info!("Configuration: {}", serde_json::to_string(&config)?);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Grammatical evolution
    let text = config
        .grammar_text()?
        .unwrap_or_else(|| DEFAULT_GRAMMAR.to_string());
    let grammar = Arc::new(Grammar::compile(&text)?);
    let mut mapper = match config.mapping.exhaustion {
        ExhaustionPolicy::Extend => DepthFirstMapper::with_codon_generator(
            Arc::clone(&grammar),
            config.mapping.clone(),
            Box::new(RandomCodonGenerator::new(
                StdRng::from_rng(&mut rng)?,
                config.mapping.max_codon_size,
            )),
        )?,
        _ => DepthFirstMapper::new(Arc::clone(&grammar), config.mapping.clone())?,
    };

    let mut valid = 0;
    for _ in 0..config.initialisation.population_size {
        let mut chromosome = Chromosome::random(20, config.mapping.max_codon_size, &mut rng);
        if let Ok(mapping) = mapper.map(&mut chromosome) {
            valid += 1;
            if valid <= 3 {
                info!("{} ({} codons)", mapping.tree, mapping.codons_used);
            }
        }
    }
    info!(
        "Mapped {}/{} random chromosomes",
        valid, config.initialisation.population_size
    );

    let syntax = syntax_set();
    let mutation = MutationEngine::new(Arc::clone(&syntax), config.mutation.clone())?;
    let mut chromosome = Chromosome::random(20, config.mapping.max_codon_size, &mut rng);
    let changed = mutation.codons(&mut chromosome, config.mapping.max_codon_size, &mut rng);
    match mapper.map(&mut chromosome) {
        Ok(mapping) => info!("Mutated {} codons: {}", changed, mapping.tree),
        Err(e) => info!("Mutated {} codons: {}", changed, e),
    }

    // Tree GP
    let builder = TreeBuilder::new(Arc::clone(&syntax), config.initialisation.max_depth)?;
    let mut population = builder.population(&config.initialisation, &mut rng)?;

    let crossover = CrossoverEngine::new(config.crossover.clone());
    if population.len() >= 2 {
        let second = population.remove(1);
        let first = population.remove(0);
        let outcome = crossover.crossover(first, second, &mut rng)?;
        let mut child = outcome.first;
        mutation.point(&mut child, &mut rng)?;
        mutation.subtree(&mut child, &mut rng)?;

        let mut bindings = Bindings::new();
        bindings.set("x", Value::Double(2.0));
        match child.evaluate(&bindings) {
            Ok(value) => info!("Offspring {} = {} at x = 2", child, value),
            Err(e) => warn!("Offspring {} failed to evaluate: {}", child, e),
        }
    }

    Ok(())
}
