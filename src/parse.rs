//! Normalize, validate and parse textual expressions

use crate::error::SyntaxError;
use crate::*;

use log::debug;
use once_cell::sync::Lazy;
use pest::error::InputLocation;
use pest::{iterators, Parser};
use regex::Regex;
use serde::Serialize;

#[derive(Parser)]
#[grammar_inline = r####"
expr    =  { SOI ~ disj ~ EOI }
disj    =  { conj ~ ( "+" ~ conj )* }
conj    =  { factor ~ ( "·"? ~ factor )* }
factor  =  { neg* ~ primary ~ prime* }
neg     =  { "!" }
prime   =  { "'" }
primary = _{ group | bt | bf | lit }
group   = _{ "(" ~ disj ~ ")" }
bt      =  { "1" }
bf      =  { "0" }
lit     = @{ ASCII_ALPHA }
"####]
struct ExpressionParser;

/// Longest accepted normalized text
pub const MAX_EXPRESSION_LENGTH: usize = 10_000;

/// Deepest accepted parenthesis nesting
pub const MAX_NESTING: usize = 256;

/// Deepest accepted expression tree, counting every operator on the path to a leaf.
///
/// AND and OR chains are balanced: only long runs of negations or deep groups reach it.
pub const MAX_DEPTH: usize = 512;

static RE_AND_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bAND\b").unwrap());
static RE_OR_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bOR\b").unwrap());
static RE_NOT_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bNOT\b").unwrap());
static RE_AND_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"&&|&|\*|∧|⋅").unwrap());
static RE_OR_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|\||\||∨").unwrap());
static RE_COMPLEMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\u{0305}|’|′").unwrap());
static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_PREFIX_NOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"!([A-Za-z01])").unwrap());

/// A parsed expression with the information derived from its text.
///
/// The variables are the sorted and deduplicated letters used in the expression.
/// All fields are derived at construction and can not be edited afterwards.
///
/// ```
/// use bolex::ParsedExpression;
/// # use bolex::BolexError;
/// # fn main() -> Result<(), BolexError> {
///
/// let parsed = ParsedExpression::parse("NOT B AND A || C")?;
/// assert_eq!(parsed.normalized_text(), "B'·A+C");
/// assert_eq!(parsed.ast().to_string(), "B'A + C");
/// assert_eq!(parsed.variable_names(), "ABC");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedExpression {
    original_text: String,
    normalized_text: String,
    ast: Expr,
    variables: Vec<Variable>,
    metadata: ExprMetrics,
}

impl ParsedExpression {
    /// Normalize, validate and parse an expression.
    ///
    /// Fails on the first invalid construct: no partial tree is returned.
    pub fn parse(text: &str) -> Result<Self, BolexError> {
        let normalized = normalize(text);
        debug!("normalized '{}' into '{}'", text, normalized);
        validate(&normalized).map_err(|e| BolexError::syntax(text, e))?;
        check_nesting(&normalized)?;
        let ast = parse_normalized(text, &normalized)?;
        Ok(Self::with(text.to_string(), normalized, ast))
    }

    /// Wrap an existing expression tree
    pub fn from_expr(ast: Expr) -> Self {
        let text = ast.to_string();
        Self::with(text.clone(), text, ast)
    }

    fn with(original_text: String, normalized_text: String, ast: Expr) -> Self {
        let variables = ast.get_variables().to_vec();
        let metadata = ast.metrics();
        Self {
            original_text,
            normalized_text,
            ast,
            variables,
            metadata,
        }
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn normalized_text(&self) -> &str {
        &self.normalized_text
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    pub fn into_ast(self) -> Expr {
        self.ast
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn metadata(&self) -> ExprMetrics {
        self.metadata
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// The letters of all variables, in order
    pub fn variable_names(&self) -> String {
        self.variables.iter().map(|v| v.letter()).collect()
    }
}

impl LogicFunction for ParsedExpression {
    fn eval(&self, state: &State) -> bool {
        self.ast.eval(state)
    }

    fn collect_variables(&self, variables: &mut VarSet) {
        variables.extend(self.variables.iter().copied())
    }
}

/// Rewrite all operator aliases into the canonical symbols.
///
/// AND becomes ```·```, OR becomes ```+```, NOT on a single operand becomes a postfix ```'```
/// and NOT on a parenthesized group remains a prefix ```!```. Whitespace is removed.
pub fn normalize(text: &str) -> String {
    let s = RE_AND_WORD.replace_all(text, "·");
    let s = RE_OR_WORD.replace_all(&s, "+");
    let s = RE_NOT_WORD.replace_all(&s, "!");
    let s = RE_AND_SYMBOL.replace_all(&s, "·");
    let s = RE_OR_SYMBOL.replace_all(&s, "+");
    let s = RE_COMPLEMENT.replace_all(&s, "'");
    let mut s = RE_SPACES.replace_all(&s, "").into_owned();
    // Repeated prefix negations are rewritten from the innermost one
    while RE_PREFIX_NOT.is_match(&s) {
        s = RE_PREFIX_NOT.replace_all(&s, "$1'").into_owned();
    }
    s
}

fn is_binary_operator(c: char) -> bool {
    matches!(c, '+' | '·')
}

/// Check the structure of a normalized expression before parsing it
fn validate(s: &str) -> Result<(), SyntaxError> {
    let chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return Err(SyntaxError::Empty);
    }

    for (position, &c) in chars.iter().enumerate() {
        if !(c.is_ascii_alphabetic() || matches!(c, '0' | '1' | '+' | '·' | '\'' | '!' | '(' | ')')) {
            return Err(SyntaxError::InvalidCharacter {
                character: c,
                position,
            });
        }
    }

    let mut depth = 0usize;
    for (position, &c) in chars.iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Err(SyntaxError::UnexpectedClosing { position }),
            ')' => depth -= 1,
            _ => (),
        }
    }
    if depth > 0 {
        return Err(SyntaxError::Unclosed { count: depth });
    }

    let first = chars[0];
    if is_binary_operator(first) {
        return Err(SyntaxError::LeadingOperator(first));
    }
    if first == '\'' {
        return Err(SyntaxError::MisplacedComplement { position: 0 });
    }
    let last = chars[chars.len() - 1];
    if is_binary_operator(last) || last == '!' {
        return Err(SyntaxError::TrailingOperator(last));
    }

    for (position, pair) in chars.windows(2).enumerate() {
        let construct: String = pair.iter().collect();
        match (pair[0], pair[1]) {
            ('(', ')') => return Err(SyntaxError::EmptyParentheses { position }),
            (a, b) if is_binary_operator(a) && is_binary_operator(b) => {
                return Err(SyntaxError::AdjacentOperators {
                    operators: construct,
                    position,
                })
            }
            ('!', b) if is_binary_operator(b) => {
                return Err(SyntaxError::AdjacentOperators {
                    operators: construct,
                    position,
                })
            }
            ('(', b) if is_binary_operator(b) => {
                return Err(SyntaxError::OperatorAtBoundary {
                    construct,
                    position,
                })
            }
            (a, ')') if is_binary_operator(a) || a == '!' => {
                return Err(SyntaxError::OperatorAtBoundary {
                    construct,
                    position,
                })
            }
            (a, '\'') if is_binary_operator(a) || a == '(' || a == '!' => {
                return Err(SyntaxError::MisplacedComplement {
                    position: position + 1,
                })
            }
            _ => (),
        }
    }
    Ok(())
}

fn check_nesting(s: &str) -> Result<(), BolexError> {
    let length = s.chars().count();
    if length > MAX_EXPRESSION_LENGTH {
        return Err(BolexError::TooComplex {
            what: "expression length",
            found: length,
            limit: MAX_EXPRESSION_LENGTH,
        });
    }
    let mut depth = 0usize;
    let mut deepest = 0usize;
    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            ')' => depth = depth.saturating_sub(1),
            _ => (),
        }
    }
    if deepest > MAX_NESTING {
        return Err(BolexError::TooComplex {
            what: "parenthesis nesting",
            found: deepest,
            limit: MAX_NESTING,
        });
    }
    Ok(())
}

fn parse_normalized(text: &str, s: &str) -> Result<Expr, BolexError> {
    let mut parsed = ExpressionParser::parse(Rule::expr, s).map_err(|e| {
        let offset = match e.location {
            InputLocation::Pos(p) => p,
            InputLocation::Span((p, _)) => p,
        };
        let error = SyntaxError::UnexpectedToken {
            position: s[..offset.min(s.len())].chars().count(),
            message: e.variant.message().to_string(),
        };
        BolexError::syntax(text, error)
    })?;

    let disj = parsed
        .next()
        .and_then(|expr| expr.into_inner().next())
        .ok_or_else(|| BolexError::syntax(text, SyntaxError::Empty))?;
    let (ast, depth) = Loader { text }.load(disj)?;
    debug!("loaded a tree of depth {}", depth);
    Ok(ast)
}

/// Build the tree from the parsed text, tracking its depth.
///
/// The depth is checked as the tree grows: a tree deeper than [MAX_DEPTH] is never built.
struct Loader<'a> {
    text: &'a str,
}

impl Loader<'_> {
    fn load(&self, pair: iterators::Pair<Rule>) -> Result<(Expr, usize), BolexError> {
        let rule = pair.as_rule();
        match rule {
            Rule::bt => Ok((Expr::from(true), 1)),
            Rule::bf => Ok((Expr::from(false), 1)),
            Rule::lit => pair
                .as_str()
                .chars()
                .next()
                .and_then(Variable::from_letter)
                .map(|v| (Expr::from(v), 1))
                .ok_or_else(|| self.unexpected(&pair)),
            Rule::disj => self.load_chain(pair, Operator::Or),
            Rule::conj => self.load_chain(pair, Operator::And),
            Rule::factor => {
                let mut prefix = 0;
                let mut operand = None;
                for inner in pair.clone().into_inner() {
                    match inner.as_rule() {
                        Rule::neg => prefix += 1,
                        Rule::prime => {
                            let (e, depth) = operand.take().ok_or_else(|| self.unexpected(&inner))?;
                            operand = Some((Expr::negate(e), check_depth(depth + 1)?));
                        }
                        _ => operand = Some(self.load(inner)?),
                    }
                }
                let (mut e, depth) = operand.ok_or_else(|| self.unexpected(&pair))?;
                let depth = check_depth(depth + prefix)?;
                for _ in 0..prefix {
                    e = Expr::negate(e);
                }
                Ok((e, depth))
            }
            // Other rules are outside of scope or hidden
            _ => Err(self.unexpected(&pair)),
        }
    }

    fn load_chain(&self, pair: iterators::Pair<Rule>, op: Operator) -> Result<(Expr, usize), BolexError> {
        let mut operands = vec![];
        let mut deepest = 0;
        for inner in pair.into_inner() {
            let (e, depth) = self.load(inner)?;
            deepest = deepest.max(depth);
            operands.push(e);
        }
        if operands.is_empty() {
            return Err(BolexError::syntax(self.text, SyntaxError::Empty));
        }
        let depth = check_depth(deepest + Expr::join_depth(operands.len()))?;
        Ok((Expr::join(op, operands), depth))
    }

    fn unexpected(&self, pair: &iterators::Pair<Rule>) -> BolexError {
        BolexError::syntax(self.text, unexpected(pair))
    }
}

fn check_depth(depth: usize) -> Result<usize, BolexError> {
    if depth > MAX_DEPTH {
        return Err(BolexError::TooComplex {
            what: "expression depth",
            found: depth,
            limit: MAX_DEPTH,
        });
    }
    Ok(depth)
}

fn unexpected(pair: &iterators::Pair<Rule>) -> SyntaxError {
    SyntaxError::UnexpectedToken {
        position: pair.as_span().start(),
        message: format!("unexpected '{}'", pair.as_str()),
    }
}
