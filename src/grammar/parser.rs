use winnow::ascii::multispace0;
use winnow::combinator::{
    alt, cut_err, delimited, fail, not, peek, preceded, repeat, separated, terminated,
};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{none_of, one_of, take_till, take_while};

/// Right-hand side symbol before rule references are resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawSymbol {
    Rule(String),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawRule {
    pub name: String,
    pub alternatives: Vec<Vec<RawSymbol>>,
}

// -- Symbols ----------------------------------------------------------------

fn rule_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    delimited(
        '<',
        take_while(1.., |c: char| c != '<' && c != '>' && !c.is_whitespace()),
        '>',
    )
    .parse_next(input)
}

fn definition_head<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    terminated(rule_name, (multispace0, "::=")).parse_next(input)
}

fn quoted_literal<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt((
        delimited('"', take_till(0.., '"'), cut_err('"')),
        delimited('\'', take_till(0.., '\''), cut_err('\'')),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "closing quote",
    )))
    .parse_next(input)
}

// `<name` without its closing `>`; punctuation such as `<` or `<=` is left to
// `bare_literal`.
fn unclosed_reference(input: &mut &str) -> ModalResult<RawSymbol> {
    preceded(
        ('<', peek(one_of(|c: char| c.is_alphanumeric() || c == '_'))),
        cut_err(fail),
    )
    .context(StrContext::Expected(StrContextValue::CharLiteral('>')))
    .parse_next(input)
}

// A bare literal runs until whitespace, `|`, or the start of a rule reference.
fn bare_literal<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        none_of(|c: char| c.is_whitespace() || c == '|'),
        take_while(0.., |c: char| !c.is_whitespace() && c != '|' && c != '<'),
    )
        .take()
        .parse_next(input)
}

fn symbol(input: &mut &str) -> ModalResult<RawSymbol> {
    alt((
        rule_name.map(|name| RawSymbol::Rule(name.to_owned())),
        quoted_literal.map(|text| RawSymbol::Literal(text.to_owned())),
        unclosed_reference,
        bare_literal.map(|text| RawSymbol::Literal(text.to_owned())),
    ))
    .parse_next(input)
}

// -- Productions & rules ----------------------------------------------------

fn production(input: &mut &str) -> ModalResult<Vec<RawSymbol>> {
    repeat(0.., preceded((multispace0, not(definition_head)), symbol)).parse_next(input)
}

fn rule_def(input: &mut &str) -> ModalResult<RawRule> {
    multispace0.parse_next(input)?;
    let name = definition_head.parse_next(input)?;
    let alternatives: Vec<Vec<RawSymbol>> =
        cut_err(separated(1.., production, (multispace0, '|')))
            .context(StrContext::Expected(StrContextValue::Description(
                "rule alternatives",
            )))
            .parse_next(input)?;
    Ok(RawRule {
        name: name.to_owned(),
        alternatives,
    })
}

// -- Top-level parser -------------------------------------------------------

pub(crate) fn parse_grammar(input: &mut &str) -> ModalResult<Vec<RawRule>> {
    let rules: Vec<RawRule> = repeat(0.., rule_def).parse_next(input)?;
    multispace0.parse_next(input)?;
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Vec<RawRule>, String> {
        parse_grammar.parse(input).map_err(|e| e.to_string())
    }

    fn lit(text: &str) -> RawSymbol {
        RawSymbol::Literal(text.to_string())
    }

    fn rule(name: &str) -> RawSymbol {
        RawSymbol::Rule(name.to_string())
    }

    #[test]
    fn parse_single_rule_with_alternatives() {
        let rules = parse("<n> ::= AND( <n> , <n> ) | D0 | D1").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "n");
        assert_eq!(rules[0].alternatives.len(), 3);
        assert_eq!(
            rules[0].alternatives[0],
            vec![lit("AND("), rule("n"), lit(","), rule("n"), lit(")")]
        );
        assert_eq!(rules[0].alternatives[2], vec![lit("D1")]);
    }

    #[test]
    fn parse_adjacent_references() {
        let rules = parse("<e> ::= (<e>+<v>) | <v>\n<v> ::= x").unwrap();
        assert_eq!(
            rules[0].alternatives[0],
            vec![lit("("), rule("e"), lit("+"), rule("v"), lit(")")]
        );
    }

    #[test]
    fn parse_multiline_rules() {
        let input = "<a> ::= x\n    | y\n<b> ::= <a> <a>\n";
        let rules = parse(input).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].alternatives, vec![vec![lit("x")], vec![lit("y")]]);
        assert_eq!(rules[1].alternatives, vec![vec![rule("a"), rule("a")]]);
    }

    #[test]
    fn parse_quoted_literal_keeps_whitespace() {
        let rules = parse("<s> ::= \"if then\" | 'a|b'").unwrap();
        assert_eq!(rules[0].alternatives[0], vec![lit("if then")]);
        assert_eq!(rules[0].alternatives[1], vec![lit("a|b")]);
    }

    #[test]
    fn parse_less_than_literal() {
        let rules = parse("<op> ::= <= | < | >").unwrap();
        assert_eq!(
            rules[0].alternatives,
            vec![vec![lit("<=")], vec![lit("<")], vec![lit(">")]]
        );
    }

    #[test]
    fn parse_empty_alternative() {
        let rules = parse("<opt> ::= x | ").unwrap();
        assert_eq!(rules[0].alternatives.len(), 2);
        assert!(rules[0].alternatives[1].is_empty());
    }

    #[test]
    fn unterminated_quote_is_error() {
        assert!(parse("<s> ::= \"unbalanced").is_err());
    }

    #[test]
    fn unclosed_rule_reference_is_error() {
        assert!(parse("<a> ::= <b | x").is_err());
        assert!(parse("<a> ::= ( <two words> )").is_err());
        assert!(parse("<a> ::= x\n<b> ::= <a").is_err());
    }

    #[test]
    fn leading_garbage_is_error() {
        assert!(parse("stray text\n<a> ::= x").is_err());
    }
}
