//! Recursive-descent expression grammar with batch error recovery
//!
//! This module provides the [`parse`] entry point and the parsing
//! session behind it, producing a [`SyntaxTree`] — a best-effort tree
//! plus every diagnostic found, never just the first one.
//!
//! # Grammar
//!
//! `parse_expression` classifies the input at the cursor and dispatches
//! to one grammar alternative: number, parenthesized argument list,
//! prefix operator, or named function call. After the primary form is
//! built it checks for an infix continuation; the right-hand side of an
//! infix operator is parsed by an unconstrained recursive call, and the
//! resulting node is repaired by a precedence rotation (see
//! [`Parser::build_infix`]) rather than by threading a precedence level
//! through the grammar.
//!
//! # Error Recovery
//!
//! User-facing diagnostics are non-fatal: the grammar skips a single
//! character (or drains the remainder, for the nesting ceiling) and
//! continues, so one call surfaces as many diagnostics as possible.
//! Broken parser invariants — entering the parenthesized-list rule away
//! from `(`, or an infix symbol missing from the operator table — panic
//! instead of being reported as user errors.

use super::ast::{Node, NodeKind, SourceLocation, Span};
use super::cursor::Cursor;
use super::token::{self, OperatorEntry, Token};
use std::fmt;
use tracing::{debug, trace};

/// Default ceiling on grammar recursion depth.
///
/// Recursion grows with nesting of parentheses and chained infix/prefix
/// operators; the ceiling converts stack exhaustion on adversarial
/// inputs into a reported diagnostic.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// The closed set of parser diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// No lexical pattern matched at an expression-start position
    InvalidExpression,
    /// Unexpected character while scanning a parenthesized argument list
    InvalidParenChar,
    /// Unconsumed, non-whitespace input after the root expression
    TrailingCharacters,
    /// The recursion ceiling was reached
    NestingTooDeep,
}

impl ParseErrorKind {
    /// The diagnostic message text.
    pub fn message(&self) -> &'static str {
        match self {
            ParseErrorKind::InvalidExpression => "Invalid expression",
            ParseErrorKind::InvalidParenChar => {
                "Invalid character in parenthesized expression"
            }
            ParseErrorKind::TrailingCharacters => "Trailing characters",
            ParseErrorKind::NestingTooDeep => "Expression nesting too deep",
        }
    }
}

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.location.line,
            self.location.column,
            self.kind.message()
        )
    }
}

impl std::error::Error for ParseError {}

/// The result of one parse session: the input text, the root node, and
/// every diagnostic found, in detection order.
#[derive(Debug)]
pub struct SyntaxTree {
    source: String,
    root: Node,
    errors: Vec<ParseError>,
}

impl SyntaxTree {
    /// The input text this tree was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The root node of the best-effort tree.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// All diagnostics, in left-to-right detection order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse an expression with the default recursion ceiling.
pub fn parse(input: &str) -> SyntaxTree {
    parse_with_limit(input, DEFAULT_MAX_DEPTH)
}

/// Parse an expression, bounding grammar recursion at `max_depth`.
pub fn parse_with_limit(input: &str, max_depth: usize) -> SyntaxTree {
    debug!(len = input.len(), "parsing expression");

    let mut parser = Parser::new(input, max_depth);
    let root = parser.parse_root();

    SyntaxTree {
        source: input.to_string(),
        root,
        errors: parser.errors,
    }
}

/// One parse session: cursor, error sink, and recursion bookkeeping.
struct Parser<'a> {
    source: &'a str,
    cursor: Cursor,
    errors: Vec<ParseError>,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, max_depth: usize) -> Self {
        Self {
            source,
            cursor: Cursor::new(source),
            errors: Vec::new(),
            depth: 0,
            max_depth,
        }
    }

    /// Parse the root expression and flag any trailing input.
    ///
    /// The remainder after the root expression is not re-parsed; it is
    /// reported once at the position of the first trailing character.
    fn parse_root(&mut self) -> Node {
        let root = self.parse_expression();

        self.cursor.skip_whitespace();
        if !self.cursor.at_end() {
            self.report(ParseErrorKind::TrailingCharacters, self.cursor.location());
        }

        root
    }

    /// Parse one expression: a primary form plus an optional infix
    /// continuation.
    fn parse_expression(&mut self) -> Node {
        self.cursor.skip_whitespace();

        if self.depth >= self.max_depth {
            return self.fail_nesting();
        }
        self.depth += 1;

        let primary = match token::classify(self.cursor.rest()) {
            Some(Token::Number { len }) => self.parse_number(len),
            Some(Token::ParenOpen) => self.parse_paren_list(),
            // Left unconsumed so the enclosing argument-list loop can
            // observe the comma.
            Some(Token::Separator) => self.empty_here(),
            Some(Token::Prefix { symbol }) => self.parse_prefix(symbol),
            Some(Token::BinaryFn { name, len }) => self.parse_function(name, len, true),
            Some(Token::UnaryFn { name, len }) => self.parse_function(name, len, false),
            None => self.fail_invalid(),
        };

        let node = self.parse_infix_continuation(primary);
        self.depth -= 1;
        node
    }

    /// Consume a maximal number match, strip grouping underscores, and
    /// build a number node.
    fn parse_number(&mut self, len: usize) -> Node {
        let (start, start_loc) = self.mark();
        self.cursor.advance(len);

        let span = self.span_from(start, start_loc);
        let text = self.text_for(&span);
        let cleaned: String = text.chars().filter(|&c| c != '_').collect();
        let value = match cleaned.parse::<f64>() {
            Ok(value) => value,
            Err(_) => panic!("number pattern admitted unparseable literal {:?}", cleaned),
        };

        Node::new(NodeKind::Number(value), span, text, Vec::new())
    }

    /// Parse `( expr , expr , ... )` into a parenthesized-list node.
    ///
    /// An unexpected character inside the list is reported and skipped,
    /// and the loop resumes with the next argument expression.
    fn parse_paren_list(&mut self) -> Node {
        let (start, start_loc) = self.mark();
        assert_eq!(
            self.cursor.peek(),
            Some('('),
            "parenthesized-list parse entered while cursor is not at '('"
        );
        self.cursor.advance(1);

        let mut children = Vec::new();
        loop {
            children.push(self.parse_expression());
            self.cursor.skip_whitespace();

            match self.cursor.peek() {
                Some(',') => self.cursor.advance(1),
                Some(')') => {
                    self.cursor.advance(1);
                    break;
                }
                Some(_) => {
                    self.report(ParseErrorKind::InvalidParenChar, self.cursor.location());
                    self.cursor.advance(1);
                }
                None => {
                    self.report(ParseErrorKind::InvalidParenChar, self.cursor.location());
                    break;
                }
            }
        }

        self.node_since(NodeKind::ParenList, start, start_loc, children)
    }

    /// Consume a prefix operator symbol and its operand.
    ///
    /// The operand is a full recursive expression parse, so the prefix
    /// operator applies to everything it can reach: `-1+2` parses as the
    /// negation of `1+2`.
    fn parse_prefix(&mut self, symbol: char) -> Node {
        let (start, start_loc) = self.mark();
        let Some(name) = token::prefix_name(symbol) else {
            panic!("prefix operator '{symbol}' matched the lexical pattern but has no table entry");
        };
        self.cursor.advance(1);

        let operand = self.parse_expression();
        let span = Span::new(start, operand.span.end, start_loc, operand.span.end_loc);
        let text = self.text_for(&span);

        Node::new(NodeKind::Prefix(name), span, text, vec![operand])
    }

    /// Consume a function keyword and its parenthesized argument list.
    ///
    /// The argument list is required; if the next non-whitespace
    /// character is not `(`, the missing list is reported and an empty
    /// placeholder stands in as the child. Argument count is not checked
    /// against the keyword's arity here — that is the evaluator's job.
    fn parse_function(&mut self, name: &'static str, len: usize, binary: bool) -> Node {
        let (start, start_loc) = self.mark();
        self.cursor.advance(len);
        self.cursor.skip_whitespace();

        let args = if self.cursor.peek() == Some('(') {
            self.parse_paren_list()
        } else {
            self.report(ParseErrorKind::InvalidExpression, self.cursor.location());
            self.empty_here()
        };

        let kind = if binary {
            NodeKind::BinaryFn(name)
        } else {
            NodeKind::UnaryFn(name)
        };
        let span = Span::new(start, args.span.end, start_loc, args.span.end_loc);
        let text = self.text_for(&span);

        Node::new(kind, span, text, vec![args])
    }

    /// Check for an infix operator after a primary expression and, if
    /// present, parse the right-hand side and build the infix node.
    fn parse_infix_continuation(&mut self, primary: Node) -> Node {
        self.cursor.skip_whitespace();

        let Some(symbol) = token::match_infix(self.cursor.rest()) else {
            return primary;
        };
        let Some(entry) = token::operator_entry(symbol) else {
            panic!("infix operator '{symbol}' matched the lexical pattern but has no table entry");
        };

        self.cursor.advance(symbol.chars().count());
        let right = self.parse_expression();

        self.build_infix(entry, primary, right)
    }

    /// Build an infix node, applying the precedence rotation.
    ///
    /// The right-hand side came from an unconstrained recursive parse,
    /// so when this operator binds at least as tightly as the operator
    /// at the root of its right-hand side, the pair is rotated once:
    /// `op1(left, op2(rl, rr))` becomes `op2(op1(left, rl), rr)`. The
    /// deepest call frame returns first, so every right-hand side
    /// arriving here has already been locally repaired; at equal rank
    /// the rotation yields left-associative grouping.
    fn build_infix(&self, entry: OperatorEntry, left: Node, right: Node) -> Node {
        if let NodeKind::Infix {
            name: right_name,
            rank: right_rank,
        } = right.kind
        {
            if entry.rank >= right_rank {
                trace!(outer = entry.name, inner = right_name, "rotating infix pair");

                let mut right_children = right.children;
                let rr = right_children.pop();
                let rl = right_children.pop();
                let (Some(rl), Some(rr)) = (rl, rr) else {
                    panic!("infix node does not have two children");
                };

                let inner_span =
                    Span::new(left.span.start, rl.span.end, left.span.start_loc, rl.span.end_loc);
                let inner_text = self.text_for(&inner_span);
                let inner = Node::new(
                    NodeKind::Infix {
                        name: entry.name,
                        rank: entry.rank,
                    },
                    inner_span,
                    inner_text,
                    vec![left, rl],
                );

                let outer_span =
                    Span::new(inner_span.start, rr.span.end, inner_span.start_loc, rr.span.end_loc);
                let outer_text = self.text_for(&outer_span);
                return Node::new(
                    NodeKind::Infix {
                        name: right_name,
                        rank: right_rank,
                    },
                    outer_span,
                    outer_text,
                    vec![inner, rr],
                );
            }
        }

        let span = Span::new(
            left.span.start,
            right.span.end,
            left.span.start_loc,
            right.span.end_loc,
        );
        let text = self.text_for(&span);
        Node::new(
            NodeKind::Infix {
                name: entry.name,
                rank: entry.rank,
            },
            span,
            text,
            vec![left, right],
        )
    }

    // ===== Recovery =====

    /// No pattern matched: report, skip one character, and stand in a
    /// placeholder node so parsing can continue.
    fn fail_invalid(&mut self) -> Node {
        self.report(ParseErrorKind::InvalidExpression, self.cursor.location());

        let (start, start_loc) = self.mark();
        if !self.cursor.at_end() {
            self.cursor.advance(1);
        }

        self.node_since(NodeKind::Empty, start, start_loc, Vec::new())
    }

    /// The recursion ceiling was reached: report once and drain the
    /// remaining input so every enclosing loop terminates.
    fn fail_nesting(&mut self) -> Node {
        let (start, start_loc) = self.mark();
        self.report(ParseErrorKind::NestingTooDeep, start_loc);

        let remaining = self.cursor.rest().len();
        self.cursor.advance(remaining);

        self.node_since(NodeKind::Empty, start, start_loc, Vec::new())
    }

    // ===== Helper methods =====

    fn report(&mut self, kind: ParseErrorKind, location: SourceLocation) {
        debug!(
            diagnostic = kind.message(),
            line = location.line,
            column = location.column,
            "parse diagnostic"
        );
        self.errors.push(ParseError { kind, location });
    }

    /// Zero-width placeholder node at the current cursor position.
    fn empty_here(&self) -> Node {
        let (start, loc) = self.mark();
        Node::new(
            NodeKind::Empty,
            Span::new(start, start, loc, loc),
            String::new(),
            Vec::new(),
        )
    }

    fn mark(&self) -> (usize, SourceLocation) {
        (self.cursor.byte_offset(), self.cursor.location())
    }

    fn span_from(&self, start: usize, start_loc: SourceLocation) -> Span {
        Span::new(start, self.cursor.byte_offset(), start_loc, self.cursor.location())
    }

    fn text_for(&self, span: &Span) -> String {
        self.source[span.start..span.end].to_string()
    }

    fn node_since(
        &self,
        kind: NodeKind,
        start: usize,
        start_loc: SourceLocation,
        children: Vec<Node>,
    ) -> Node {
        let span = self.span_from(start, start_loc);
        let text = self.text_for(&span);
        Node::new(kind, span, text, children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infix_name(node: &Node) -> &'static str {
        match node.kind {
            NodeKind::Infix { name, .. } => name,
            _ => panic!("expected infix node, got {:?}", node.kind),
        }
    }

    #[test]
    fn test_parse_number_value() {
        let tree = parse("1_000.5");
        assert!(!tree.has_errors());
        assert_eq!(tree.root().value(), Some(1000.5));
        assert_eq!(tree.root().text, "1_000.5");
    }

    #[test]
    fn test_multiply_nests_under_add() {
        let tree = parse("1+2*3");
        assert!(!tree.has_errors());

        let root = tree.root();
        assert_eq!(infix_name(root), "add");
        assert_eq!(root.children[0].value(), Some(1.0));

        let right = &root.children[1];
        assert_eq!(infix_name(right), "multiply");
        assert_eq!(right.children[0].value(), Some(2.0));
        assert_eq!(right.children[1].value(), Some(3.0));
    }

    #[test]
    fn test_equal_rank_groups_left() {
        let tree = parse("1-2-3");
        assert!(!tree.has_errors());

        let root = tree.root();
        assert_eq!(infix_name(root), "subtract");
        assert_eq!(root.children[1].value(), Some(3.0));

        let left = &root.children[0];
        assert_eq!(infix_name(left), "subtract");
        assert_eq!(left.children[0].value(), Some(1.0));
        assert_eq!(left.children[1].value(), Some(2.0));
        assert_eq!(left.text, "1-2");
    }

    #[test]
    fn test_parens_override_grouping() {
        let tree = parse("(1+2)*3");
        assert!(!tree.has_errors());

        let root = tree.root();
        assert_eq!(infix_name(root), "multiply");

        let left = &root.children[0];
        assert_eq!(left.kind, NodeKind::ParenList);
        assert_eq!(left.children.len(), 1);
        assert_eq!(infix_name(&left.children[0]), "add");
        assert_eq!(root.children[1].value(), Some(3.0));
    }

    #[test]
    fn test_unicode_operators() {
        let tree = parse("6÷2×3");
        assert!(!tree.has_errors());

        // ÷ and × share ranks with / and *; equal-class chain groups left
        let root = tree.root();
        assert_eq!(infix_name(root), "multiply");
        let left = &root.children[0];
        assert_eq!(infix_name(left), "divide");
        assert_eq!(left.text, "6÷2");
    }

    #[test]
    fn test_prefix_operand_is_full_expression() {
        let tree = parse("-1+2");
        assert!(!tree.has_errors());

        let root = tree.root();
        assert_eq!(root.kind, NodeKind::Prefix("negate"));
        assert_eq!(root.children.len(), 1);
        assert_eq!(infix_name(&root.children[0]), "add");
        assert_eq!(root.text, "-1+2");
    }

    #[test]
    fn test_function_wraps_argument_list() {
        let tree = parse("min(1, 2)");
        assert!(!tree.has_errors());

        let root = tree.root();
        assert_eq!(root.kind, NodeKind::BinaryFn("min"));
        assert_eq!(root.children.len(), 1);

        let args = &root.children[0];
        assert_eq!(args.kind, NodeKind::ParenList);
        assert_eq!(args.children.len(), 2);
        assert_eq!(args.children[0].value(), Some(1.0));
        assert_eq!(args.children[1].value(), Some(2.0));
    }

    #[test]
    fn test_function_without_argument_list_recovers() {
        let tree = parse("sqrt 4");
        let root = tree.root();

        assert_eq!(root.kind, NodeKind::UnaryFn("sqrt"));
        assert_eq!(root.children[0].kind, NodeKind::Empty);
        assert_eq!(
            tree.errors()[0].kind,
            ParseErrorKind::InvalidExpression
        );
        // the stray argument is then trailing input
        assert!(tree
            .errors()
            .iter()
            .any(|e| e.kind == ParseErrorKind::TrailingCharacters));
    }

    #[test]
    fn test_separator_yields_placeholder_argument() {
        let tree = parse("(,5)");
        let root = tree.root();

        assert_eq!(root.kind, NodeKind::ParenList);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].kind, NodeKind::Empty);
        assert_eq!(root.children[1].value(), Some(5.0));
    }

    #[test]
    fn test_invalid_character_in_paren_list() {
        let tree = parse("(1 @ 2)");
        let root = tree.root();

        assert_eq!(root.kind, NodeKind::ParenList);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].value(), Some(1.0));
        assert_eq!(root.children[1].value(), Some(2.0));

        assert_eq!(tree.errors().len(), 1);
        assert_eq!(tree.errors()[0].kind, ParseErrorKind::InvalidParenChar);
        assert_eq!(tree.errors()[0].location, SourceLocation::new(1, 4));
    }

    #[test]
    fn test_unclosed_paren_list_reports_at_end_of_input() {
        let tree = parse("(1, 2");
        assert_eq!(tree.root().kind, NodeKind::ParenList);
        assert_eq!(tree.errors().len(), 1);
        assert_eq!(tree.errors()[0].kind, ParseErrorKind::InvalidParenChar);
        assert_eq!(tree.errors()[0].location, SourceLocation::new(1, 6));
    }

    #[test]
    fn test_trailing_characters_position() {
        let tree = parse("1e+5");

        assert_eq!(tree.root().value(), Some(1.0));
        assert_eq!(tree.errors().len(), 1);
        assert_eq!(tree.errors()[0].kind, ParseErrorKind::TrailingCharacters);
        assert_eq!(tree.errors()[0].location, SourceLocation::new(1, 2));
    }

    #[test]
    fn test_recovery_consumes_remainder() {
        let tree = parse("1 + @ + 2");

        assert_eq!(tree.errors().len(), 1);
        assert_eq!(tree.errors()[0].kind, ParseErrorKind::InvalidExpression);
        assert_eq!(tree.errors()[0].location, SourceLocation::new(1, 5));

        // rotation pulled the placeholder under the first add
        let root = tree.root();
        assert_eq!(infix_name(root), "add");
        assert_eq!(root.children[1].value(), Some(2.0));
        let left = &root.children[0];
        assert_eq!(infix_name(left), "add");
        assert_eq!(left.children[0].value(), Some(1.0));
        assert_eq!(left.children[1].kind, NodeKind::Empty);
    }

    #[test]
    fn test_nesting_ceiling_reports_instead_of_overflowing() {
        let tree = parse_with_limit("((((1))))", 3);

        assert_eq!(tree.errors()[0].kind, ParseErrorKind::NestingTooDeep);
        // every enclosing list is left unclosed by the drain
        assert!(tree
            .errors()
            .iter()
            .skip(1)
            .all(|e| e.kind == ParseErrorKind::InvalidParenChar));
    }

    #[test]
    fn test_flat_chains_fit_default_ceiling() {
        let input = (0..100).map(|n| n.to_string()).collect::<Vec<_>>().join("+");
        let tree = parse(&input);
        assert!(!tree.has_errors());
    }

    #[test]
    fn test_error_display_format() {
        let err = ParseError {
            kind: ParseErrorKind::InvalidExpression,
            location: SourceLocation::new(2, 7),
        };
        assert_eq!(
            err.to_string(),
            "Parse error at line 2, column 7: Invalid expression"
        );
    }
}
