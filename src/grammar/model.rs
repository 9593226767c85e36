use super::error::GrammarError;
use super::parser::{parse_grammar, RawRule, RawSymbol};
use std::collections::HashMap;
use std::fmt;
use winnow::Parser;

/// Index of a rule within its [`Grammar`]
pub type RuleId = usize;

/// One symbol on the right-hand side of a production
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Rule(RuleId),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    symbols: Vec<Symbol>,
    min_depth: usize,
    recursive: bool,
}

impl Production {
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Shortest number of non-terminal levels needed below this production
    /// before only terminals remain (0 for terminal-only productions).
    pub fn min_depth(&self) -> usize {
        self.min_depth
    }

    /// True when some rule referenced here can derive the owning rule again
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    fn rule_refs(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.symbols.iter().filter_map(|s| match s {
            Symbol::Rule(id) => Some(*id),
            Symbol::Literal(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: String,
    productions: Vec<Production>,
    min_depth: usize,
    recursive: bool,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> Option<&Production> {
        self.productions.get(index)
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    /// Minimum depth over all of this rule's productions
    pub fn min_depth(&self) -> usize {
        self.min_depth
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }
}

/// Compiled, immutable context-free grammar.
///
/// The first rule in the source text is the start rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<Rule>,
    index: HashMap<String, RuleId>,
}

impl Grammar {
    /// Parse and compile BNF text.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError`] for malformed text, duplicate or undefined
    /// rules, and rules that can never derive a terminal-only string.
    pub fn compile(text: &str) -> Result<Self, GrammarError> {
        let raw = parse_grammar
            .parse(text)
            .map_err(|e| GrammarError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: Vec<RawRule>) -> Result<Self, GrammarError> {
        if raw.is_empty() {
            return Err(GrammarError::Empty);
        }

        let mut index = HashMap::with_capacity(raw.len());
        for (id, rule) in raw.iter().enumerate() {
            if index.insert(rule.name.clone(), id).is_some() {
                return Err(GrammarError::DuplicateRule(rule.name.clone()));
            }
        }

        let mut rules = Vec::with_capacity(raw.len());
        for raw_rule in raw {
            let mut productions = Vec::with_capacity(raw_rule.alternatives.len());
            for alternative in raw_rule.alternatives {
                let symbols = alternative
                    .into_iter()
                    .map(|symbol| match symbol {
                        RawSymbol::Literal(text) => Ok(Symbol::Literal(text)),
                        RawSymbol::Rule(name) => index
                            .get(&name)
                            .map(|id| Symbol::Rule(*id))
                            .ok_or(GrammarError::UndefinedRule(name)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                productions.push(Production {
                    symbols,
                    min_depth: usize::MAX,
                    recursive: false,
                });
            }
            rules.push(Rule {
                name: raw_rule.name,
                productions,
                min_depth: usize::MAX,
                recursive: false,
            });
        }

        let mut grammar = Self { rules, index };
        grammar.compute_min_depths()?;
        grammar.compute_recursion();
        Ok(grammar)
    }

    // Fixpoint iteration: depths only ever decrease, so cycles terminate and
    // rules still at usize::MAX afterwards cannot reach a terminal string.
    fn compute_min_depths(&mut self) -> Result<(), GrammarError> {
        let mut rule_depths = vec![usize::MAX; self.rules.len()];
        let mut changed = true;
        while changed {
            changed = false;
            for (id, rule) in self.rules.iter_mut().enumerate() {
                for production in &mut rule.productions {
                    let mut deepest = 0;
                    let mut finite = true;
                    let mut has_refs = false;
                    for child in production.rule_refs() {
                        has_refs = true;
                        match rule_depths[child] {
                            usize::MAX => {
                                finite = false;
                                break;
                            }
                            depth => deepest = deepest.max(depth),
                        }
                    }
                    if !finite {
                        continue;
                    }
                    let depth = if has_refs { deepest + 1 } else { 0 };
                    if depth < production.min_depth {
                        production.min_depth = depth;
                    }
                    if depth < rule_depths[id] {
                        rule_depths[id] = depth;
                        changed = true;
                    }
                }
            }
        }

        for (rule, depth) in self.rules.iter_mut().zip(rule_depths) {
            if depth == usize::MAX {
                return Err(GrammarError::NoFiniteDerivation(rule.name.clone()));
            }
            rule.min_depth = depth;
        }
        Ok(())
    }

    fn compute_recursion(&mut self) {
        let count = self.rules.len();
        // reach[a][b]: rule b is derivable from rule a in one or more steps
        let mut reach = vec![vec![false; count]; count];
        for (from, rule) in self.rules.iter().enumerate() {
            let mut stack: Vec<RuleId> = rule.productions.iter().flat_map(|p| p.rule_refs()).collect();
            while let Some(next) = stack.pop() {
                if reach[from][next] {
                    continue;
                }
                reach[from][next] = true;
                stack.extend(self.rules[next].productions.iter().flat_map(|p| p.rule_refs()));
            }
        }

        for (id, rule) in self.rules.iter_mut().enumerate() {
            rule.recursive = reach[id][id];
            for production in &mut rule.productions {
                production.recursive = production
                    .symbols
                    .iter()
                    .any(|s| matches!(s, Symbol::Rule(child) if *child == id || reach[*child][id]));
            }
        }
    }

    pub fn start_rule(&self) -> &Rule {
        &self.rules[0]
    }

    pub fn start_id(&self) -> RuleId {
        0
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|id| &self.rules[*id])
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.index.get(name).copied()
    }

    /// Panics if `id` did not come from this grammar.
    pub fn rule_by_id(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn min_depth(&self, name: &str) -> Option<usize> {
        self.rule(name).map(Rule::min_depth)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            write!(f, "<{}> ::=", rule.name)?;
            for (i, production) in rule.productions.iter().enumerate() {
                if i > 0 {
                    write!(f, " |")?;
                }
                for symbol in &production.symbols {
                    match symbol {
                        Symbol::Rule(id) => write!(f, " <{}>", self.rules[*id].name)?,
                        Symbol::Literal(text) if text.contains(char::is_whitespace) || text.contains('|') => {
                            write!(f, " \"{}\"", text)?
                        }
                        Symbol::Literal(text) => write!(f, " {}", text)?,
                    }
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
