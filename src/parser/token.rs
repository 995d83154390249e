//! Token classification and operator tables
//!
//! The grammar never builds a token stream. Instead, [`classify`] inspects
//! the unconsumed remainder of the input and reports which grammar
//! alternative applies at the cursor, testing a fixed, ordered list of
//! lexical patterns (first match wins — declaration order is significant:
//! `-` matches as a prefix operator at expression start before it could be
//! read as an infix symbol). [`match_infix`] and [`match_postfix`] cover
//! the continuation patterns checked after a primary expression is built.
//!
//! # Operator Table
//!
//! Operator symbols map to a canonical function name plus an associativity
//! rank — the symbol's index in the fixed declaration order. Symbols later
//! in the list bind tighter; the precedence rotation in the grammar
//! compares ranks to restructure infix chains after the fact.

use rustc_hash::FxHashMap;
use std::sync::LazyLock;

/// Operator symbols in declaration order, with their canonical names.
///
/// The index of a symbol in this list is its associativity rank. `!` is
/// the postfix factorial; it is declared here and matched by
/// [`match_postfix`], but no grammar rule consumes it today.
const OPERATOR_SYMBOLS: [(&str, &str); 10] = [
    ("+", "add"),
    ("-", "subtract"),
    ("*", "multiply"),
    ("×", "multiply"),
    ("/", "divide"),
    ("÷", "divide"),
    ("%", "modulo"),
    ("^", "power"),
    ("**", "power"),
    ("!", "factorial"),
];

/// Prefix operator symbols with their canonical names.
const PREFIX_SYMBOLS: [(char, &str); 2] = [('+', "plus"), ('-', "negate")];

/// Binary-arity built-in function keywords.
pub const BINARY_FUNCTIONS: [&str; 3] = ["min", "max", "pow"];

/// Unary-arity built-in function keywords.
pub const UNARY_FUNCTIONS: [&str; 11] = [
    "sqrt", "abs", "sin", "cos", "tan", "ln", "log", "exp", "floor", "ceil", "round",
];

/// Canonical name and associativity rank for an operator symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorEntry {
    pub name: &'static str,
    pub rank: usize,
}

static OPERATORS: LazyLock<FxHashMap<&'static str, OperatorEntry>> = LazyLock::new(|| {
    OPERATOR_SYMBOLS
        .iter()
        .enumerate()
        .map(|(rank, &(symbol, name))| (symbol, OperatorEntry { name, rank }))
        .collect()
});

static PREFIX_OPERATORS: LazyLock<FxHashMap<char, &'static str>> =
    LazyLock::new(|| PREFIX_SYMBOLS.iter().copied().collect());

/// Look up an infix/postfix operator symbol in the operator table.
pub fn operator_entry(symbol: &str) -> Option<OperatorEntry> {
    OPERATORS.get(symbol).copied()
}

/// Look up the canonical name of a prefix operator symbol.
pub fn prefix_name(symbol: char) -> Option<&'static str> {
    PREFIX_OPERATORS.get(&symbol).copied()
}

/// Grammar alternative matched at the current cursor position.
///
/// Lengths are in characters, so the grammar knows exactly how far to
/// advance the cursor over the matched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Number { len: usize },
    ParenOpen,
    Separator,
    Prefix { symbol: char },
    BinaryFn { name: &'static str, len: usize },
    UnaryFn { name: &'static str, len: usize },
}

/// Classify the remaining input against the expression-start patterns.
///
/// Returns `None` when no pattern matches, in which case the grammar
/// reports an "Invalid expression" diagnostic.
pub fn classify(rest: &[char]) -> Option<Token> {
    if let Some(len) = match_number(rest) {
        return Some(Token::Number { len });
    }

    match rest.first().copied() {
        Some('(') => return Some(Token::ParenOpen),
        Some(',') => return Some(Token::Separator),
        Some(sym @ ('+' | '-')) => return Some(Token::Prefix { symbol: sym }),
        _ => {}
    }

    if let Some((name, len)) = match_keyword(rest, &BINARY_FUNCTIONS) {
        return Some(Token::BinaryFn { name, len });
    }
    if let Some((name, len)) = match_keyword(rest, &UNARY_FUNCTIONS) {
        return Some(Token::UnaryFn { name, len });
    }

    None
}

/// Match the number pattern: digits with `_` grouping, an optional
/// fractional part, and an optional unsigned exponent.
///
/// The exponent marker is only consumed when a digit follows it directly,
/// so `1e+5` matches just `1` — a signed exponent is not part of the
/// number.
pub fn match_number(rest: &[char]) -> Option<usize> {
    let at = |i: usize| rest.get(i).copied();

    if !at(0)?.is_ascii_digit() {
        return None;
    }

    let mut len = 0;
    while matches!(at(len), Some(c) if c.is_ascii_digit() || c == '_') {
        len += 1;
    }

    if at(len) == Some('.') && matches!(at(len + 1), Some(c) if c.is_ascii_digit()) {
        len += 1;
        while matches!(at(len), Some(c) if c.is_ascii_digit() || c == '_') {
            len += 1;
        }
    }

    if matches!(at(len), Some('e') | Some('E'))
        && matches!(at(len + 1), Some(c) if c.is_ascii_digit())
    {
        len += 1;
        while matches!(at(len), Some(c) if c.is_ascii_digit() || c == '_') {
            len += 1;
        }
    }

    Some(len)
}

/// Match an infix operator symbol at the start of the remaining input.
///
/// `**` is matched before `*` so the two-character symbol is never split.
pub fn match_infix(rest: &[char]) -> Option<&'static str> {
    let first = rest.first().copied()?;

    if first == '*' && rest.get(1).copied() == Some('*') {
        return Some("**");
    }

    match first {
        '+' => Some("+"),
        '-' => Some("-"),
        '*' => Some("*"),
        '×' => Some("×"),
        '/' => Some("/"),
        '÷' => Some("÷"),
        '%' => Some("%"),
        '^' => Some("^"),
        _ => None,
    }
}

/// Match the postfix operator pattern.
///
/// Declared alongside the infix patterns, but no grammar rule consumes a
/// postfix operator after a primary expression; this is an extension
/// point.
pub fn match_postfix(rest: &[char]) -> Option<&'static str> {
    match rest.first().copied() {
        Some('!') => Some("!"),
        _ => None,
    }
}

/// Match one of the given function keywords, bound to a word boundary.
fn match_keyword(rest: &[char], keywords: &[&'static str]) -> Option<(&'static str, usize)> {
    for &keyword in keywords {
        let len = keyword.chars().count();
        if rest.len() < len {
            continue;
        }
        if !rest.iter().zip(keyword.chars()).all(|(&a, b)| a == b) {
            continue;
        }

        let bounded = match rest.get(len) {
            Some(&c) => !c.is_ascii_alphanumeric() && c != '_',
            None => true,
        };
        if bounded {
            return Some((keyword, len));
        }
    }
    None
}
