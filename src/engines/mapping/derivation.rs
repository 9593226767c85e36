use crate::grammar::{Grammar, RuleId};
use std::fmt;

/// Node of a derivation tree.
///
/// A non-terminal's children correspond one-to-one with the symbols of the
/// production chosen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivationNode {
    NonTerminal {
        rule: RuleId,
        production: usize,
        /// Edges from the root
        depth: usize,
        children: Vec<DerivationNode>,
    },
    Terminal {
        literal: String,
    },
}

impl DerivationNode {
    pub fn terminal(literal: impl Into<String>) -> Self {
        DerivationNode::Terminal {
            literal: literal.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DerivationNode::Terminal { .. })
    }

    pub fn children(&self) -> &[DerivationNode] {
        match self {
            DerivationNode::NonTerminal { children, .. } => children,
            DerivationNode::Terminal { .. } => &[],
        }
    }

    /// Longest path to a leaf, in edges
    pub fn depth(&self) -> usize {
        self.children()
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn length(&self) -> usize {
        1 + self.children().iter().map(DerivationNode::length).sum::<usize>()
    }

    fn collect_terminals<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            DerivationNode::Terminal { literal } => out.push(literal),
            DerivationNode::NonTerminal { children, .. } => {
                for child in children {
                    child.collect_terminals(out);
                }
            }
        }
    }

    fn collect_choices(&self, grammar: &Grammar, out: &mut Vec<(usize, usize)>) {
        if let DerivationNode::NonTerminal {
            rule,
            production,
            children,
            ..
        } = self
        {
            let alternatives = grammar.rule_by_id(*rule).len();
            if alternatives > 1 {
                out.push((*production, alternatives));
            }
            for child in children {
                child.collect_choices(grammar, out);
            }
        }
    }
}

/// Phenotype produced by grammatical mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationTree {
    root: DerivationNode,
}

impl DerivationTree {
    pub fn new(root: DerivationNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &DerivationNode {
        &self.root
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn length(&self) -> usize {
        self.root.length()
    }

    pub fn non_terminal_count(&self) -> usize {
        self.length() - self.terminals().len()
    }

    /// Terminal literals, left to right
    pub fn terminals(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.root.collect_terminals(&mut out);
        out
    }

    /// `(production index, alternatives)` for every rule that offered a choice,
    /// in the order the depth-first mapper reads codons
    pub fn choices(&self, grammar: &Grammar) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        self.root.collect_choices(grammar, &mut out);
        out
    }
}

impl fmt::Display for DerivationTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for literal in self.terminals() {
            f.write_str(literal)?;
        }
        Ok(())
    }
}
