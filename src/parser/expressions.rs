//! Expression parsing implementation
//!
//! This module handles parsing of SQOPL expressions using a table of binary
//! precedence levels and recursive descent for other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: integers, strings, identifiers, arrays `[a, b]`
//! - Binary operators: logical, bitwise, comparison, shift, arithmetic
//! - Prefix operators: `-`, `!`, `~`, `&`, `*`
//! - Postfix: calls `f(x: 1)`, methods `a.f()`, members `a.b`, optional
//!   chains `a?.b`, bubbling `f()?`, casts `is T`, `as T`, `as! T`
//! - Ternary `c ? a : b` and null coalescing `a ?? b`
//! - Block-valued: `if … else …`, `match`, `when`, `{ … }`
//!
//! # Precedence
//!
//! Lowest first:
//!
//! ```text
//! ternary      ::= coalesce ("?" expression ":" ternary)?
//! coalesce     ::= binary ("??" binary)*
//! binary       ::= prefix (op binary)*   precedence climbing over BINARY_LEVELS
//! prefix       ::= ("-" | "!" | "~" | "&" | "*") prefix | postfix
//! postfix      ::= primary (call | "." ident call? | "?." ident | "?" | cast)*
//! ```
//!
//! Every `parse_expression` call and every prefix operator opens one nesting
//! level, so deeply nested input ends in `NestingTooDeep`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::error::{Diagnostic, Result};
use crate::parser::parse::Parser;
use crate::parser::token::{Location, Position, Token, TokenGroup};

/// Binary operator levels, loosest binding first.
const BINARY_LEVELS: &[&[&str]] = &[
    &["||"],
    &["&&"],
    &["|"],
    &["^"],
    &["&"],
    &["==", "!="],
    &["<=", ">=", "<", ">"],
    &["<<", ">>"],
    &["+", "-"],
    &["*", "/", "%"],
];

const PREFIX_OPERATORS: &[char] = &['-', '!', '~', '&', '*'];

/// Keywords that never begin an expression.
const RESERVED: &[&str] = &[
    "import", "fn", "extern", "struct", "const", "var", "let", "mut", "escaping", "dyn",
    "return", "else", "while", "loop", "for", "in", "where", "as", "is",
];

pub(crate) fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

/// Whether `token` can be the first token of an expression.
pub(crate) fn can_start_expression(token: &Token) -> bool {
    match token.group {
        TokenGroup::Integer | TokenGroup::String | TokenGroup::Decimal => true,
        TokenGroup::Identifier => !is_reserved(&token.characters),
        TokenGroup::Grouping => ['(', '[', '{']
            .iter()
            .any(|&ch| token.is_char(ch, TokenGroup::Grouping)),
        TokenGroup::Operator => PREFIX_OPERATORS
            .iter()
            .any(|&ch| token.is_char(ch, TokenGroup::Operator)),
        TokenGroup::Separator => false,
    }
}

fn span(from: &impl Node, to: &impl Node) -> Location {
    Location::new(from.location().start, to.location().end)
}

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expression> {
        self.nested_here(|p| p.parse_ternary())
    }

    /// Parse ternary: condition ? success : fallback
    fn parse_ternary(&mut self) -> Result<Expression> {
        let condition = self.parse_null_coalesce()?;

        if self.match_operator("?")?.is_none() {
            return Ok(condition);
        }

        self.within(NodeKind::TernaryExpression, |p| {
            let success_value = p.parse_expression()?;
            p.expect_separator(':')?;
            let fallback_value = p.parse_expression()?;

            Ok(Expression::Ternary(TernaryExpression {
                location: span(&condition, &fallback_value),
                condition: Box::new(condition),
                success_value: Box::new(success_value),
                fallback_value: Box::new(fallback_value),
            }))
        })
    }

    /// Parse `value ?? fallback`, folding left
    fn parse_null_coalesce(&mut self) -> Result<Expression> {
        let mut value = self.parse_binary(0)?;

        while self.match_operator("??")?.is_some() {
            let fallback_value = self.within(NodeKind::NullCoalesce, |p| p.parse_binary(0))?;
            value = Expression::NullCoalesce(NullCoalesce {
                location: span(&value, &fallback_value),
                value: Box::new(value),
                fallback_value: Box::new(fallback_value),
            });
        }

        Ok(value)
    }

    /// Parse binary operators binding at `min_level` or tighter, folding left
    fn parse_binary(&mut self, min_level: usize) -> Result<Expression> {
        let mut left = self.parse_prefix()?;

        while let Some((level, operator)) = self.match_binary_operator(min_level)? {
            let right = self.within(NodeKind::BinaryExpression, |p| p.parse_binary(level + 1))?;
            left = Expression::Binary(BinaryExpression {
                location: span(&left, &right),
                operator: operator.characters,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    /// Consume the next binary operator if it binds at `min_level` or tighter,
    /// returning it with its level.
    fn match_binary_operator(&mut self, min_level: usize) -> Result<Option<(usize, Token)>> {
        for (level, operators) in BINARY_LEVELS.iter().enumerate().skip(min_level) {
            if let Some(operator) = self.match_any_operator(operators)? {
                return Ok(Some((level, operator)));
            }
        }
        Ok(None)
    }

    /// Parse prefix operators. Each takes exactly one operator character,
    /// so `&&x` is a reference to a reference.
    fn parse_prefix(&mut self) -> Result<Expression> {
        let token = self.peek_required()?;
        let is_prefix = token.group == TokenGroup::Operator
            && token
                .single_char()
                .is_some_and(|ch| PREFIX_OPERATORS.contains(&ch));

        if !is_prefix {
            return self.parse_postfix();
        }

        let operator = self.advance()?;
        let operand = self.nested(operator.location, |p| {
            p.within(NodeKind::PrefixUnaryExpression, |p| p.parse_prefix())
        })?;

        Ok(Expression::PrefixUnary(PrefixUnaryExpression {
            location: Location::new(operator.start(), operand.location().end),
            operator: operator.characters,
            operand: Box::new(operand),
        }))
    }

    /// Parse a primary expression followed by any postfix forms
    fn parse_postfix(&mut self) -> Result<Expression> {
        let mut expr = self.parse_primary()?;
        if is_block_valued(&expr) {
            return Ok(expr);
        }

        loop {
            if self.check_char('(', TokenGroup::Grouping)? {
                expr = self.parse_function_call(expr)?;
            } else if self.check_char('.', TokenGroup::Operator)? {
                expr = self.parse_member(expr)?;
            } else if self.match_operator("?.")?.is_some() {
                expr = self.parse_optional_chain(expr)?;
            } else if self.check_operator("?")? && self.next_is_bubble()? {
                let question = self.advance()?;
                expr = Expression::BubbleToReturn(BubbleToReturn {
                    location: Location::new(expr.location().start, question.end()),
                    value: Box::new(expr),
                });
            } else if self.check_word("is")? || self.check_word("as")? {
                expr = self.parse_cast(expr)?;
            } else {
                return Ok(expr);
            }
        }
    }

    /// A `?` is a bubble unless an expression follows it, which makes it
    /// the start of a ternary.
    fn next_is_bubble(&mut self) -> Result<bool> {
        Ok(!self
            .peek_nth(1)?
            .is_some_and(|token| can_start_expression(&token)))
    }

    /// Parse `name(args)`; only a plain identifier can be called
    fn parse_function_call(&mut self, callee: Expression) -> Result<Expression> {
        let Some(name) = callee.as_identifier().map(str::to_string) else {
            let token = self.peek_required()?;
            return Err(Diagnostic::CannotParse { token });
        };

        self.within(NodeKind::FunctionCall, |p| {
            let arguments = p.parse_arguments()?;
            Ok(Expression::FunctionCall(FunctionCall {
                name,
                arguments,
                generics: Generics::default(),
                location: p.span_from(callee.location().start),
            }))
        })
    }

    /// Parse `.name` or `.name(args)`
    fn parse_member(&mut self, receiver: Expression) -> Result<Expression> {
        self.expect_operator('.')?;
        let name_token = self.expect_token_of_group(TokenGroup::Identifier)?;
        let start = receiver.location().start;

        if self.check_char('(', TokenGroup::Grouping)? {
            return self.within(NodeKind::MethodCall, |p| {
                let arguments = p.parse_arguments()?;
                Ok(Expression::MethodCall(MethodCall {
                    receiver: Box::new(receiver),
                    name: name_token.characters,
                    arguments,
                    generics: Generics::default(),
                    location: p.span_from(start),
                }))
            });
        }

        let segment = identifier(name_token);
        let segments = match receiver {
            Expression::Member(member) => {
                let mut segments = member.segments;
                segments.push(segment);
                segments
            }
            other => vec![other, segment],
        };

        Ok(Expression::Member(MemberExpression {
            segments,
            location: self.span_from(start),
        }))
    }

    /// Parse the name after `?.`
    fn parse_optional_chain(&mut self, receiver: Expression) -> Result<Expression> {
        let start = receiver.location().start;
        let segment = self.within(NodeKind::OptionalChaining, |p| {
            Ok(identifier(p.expect_token_of_group(TokenGroup::Identifier)?))
        })?;

        let chain = match receiver {
            Expression::OptionalChaining(optional) => {
                let mut chain = optional.chain;
                chain.push(segment);
                chain
            }
            other => vec![other, segment],
        };

        Ok(Expression::OptionalChaining(OptionalChaining {
            chain,
            location: self.span_from(start),
        }))
    }

    /// Parse `is T`, `as T` or `as! T`
    fn parse_cast(&mut self, value: Expression) -> Result<Expression> {
        let keyword = self.advance()?;

        let mode = if keyword.is_word("is") {
            CastMode::Query
        } else {
            match self.peek_token()? {
                Some(bang)
                    if bang.is_char('!', TokenGroup::Operator)
                        && bang.start() == keyword.end() =>
                {
                    self.advance()?;
                    CastMode::Runtime
                }
                _ => CastMode::Static,
            }
        };
        let kind = match mode {
            CastMode::Query => NodeKind::TypeCastableQuery,
            CastMode::Static => NodeKind::TypeCast,
            CastMode::Runtime => NodeKind::RuntimeTypeCast,
        };

        self.within(kind, |p| {
            let target = p.parse_single_type()?;
            Ok(Expression::Cast(CastExpression {
                mode,
                location: p.span_from(value.location().start),
                value: Box::new(value),
                target,
            }))
        })
    }

    /// Parse `(arg, label: arg, ...)`
    fn parse_arguments(&mut self) -> Result<Vec<Argument>> {
        self.expect_grouping('(')?;
        let mut arguments = Vec::new();

        if !self.check_char(')', TokenGroup::Grouping)? {
            loop {
                let start = self.next_start()?;
                let labelled = self
                    .peek_nth(1)?
                    .is_some_and(|token| token.is_char(':', TokenGroup::Separator));
                let label = if labelled && self.peek_required()?.group == TokenGroup::Identifier {
                    let label = self.expect_identifier()?;
                    self.expect_separator(':')?;
                    Some(label)
                } else {
                    None
                };

                let value = self.parse_expression()?;
                arguments.push(Argument {
                    label,
                    value,
                    location: self.span_from(start),
                });

                if !self.match_char(',', TokenGroup::Separator)? {
                    break;
                }
            }
        }

        self.expect_grouping(')')?;
        Ok(arguments)
    }

    /// Parse primary expressions: literals, identifiers, parentheses,
    /// arrays and block-valued expressions
    pub(crate) fn parse_primary(&mut self) -> Result<Expression> {
        let token = self.peek_required()?;

        match token.group {
            TokenGroup::Integer => {
                let token = self.advance()?;
                let value = token.characters.parse::<i64>().map_err(|_| {
                    Diagnostic::InvalidIntegerLiteral {
                        literal: token.characters.clone(),
                        radix: 10,
                        location: token.location,
                    }
                })?;
                Ok(Literal::Integer(IntegerLiteral {
                    value,
                    location: token.location,
                })
                .into())
            }
            TokenGroup::String => {
                let token = self.advance()?;
                Ok(Literal::String(StringLiteral {
                    value: token.characters,
                    location: token.location,
                })
                .into())
            }
            TokenGroup::Identifier => match token.characters.clone().as_str() {
                "if" => match self.parse_if(true)? {
                    Statement::Expression(expr) => Ok(expr),
                    _ => Err(Diagnostic::CannotParse { token }),
                },
                "match" => self.parse_match(),
                "when" => self.parse_when(),
                word if is_reserved(word) => Err(Diagnostic::CannotParse { token }),
                _ => Ok(identifier(self.advance()?).into()),
            },
            TokenGroup::Grouping if token.is_char('(', TokenGroup::Grouping) => {
                self.advance()?;
                let inner = self.parse_expression()?;
                self.expect_grouping(')')?;
                Ok(inner)
            }
            TokenGroup::Grouping if token.is_char('[', TokenGroup::Grouping) => {
                self.parse_array_literal()
            }
            TokenGroup::Grouping if token.is_char('{', TokenGroup::Grouping) => {
                Ok(Expression::Block(self.parse_block()?))
            }
            _ => Err(Diagnostic::CannotParse { token }),
        }
    }

    /// Parse `[a, b, ...]`
    fn parse_array_literal(&mut self) -> Result<Expression> {
        self.within(NodeKind::ArrayLiteral, |p| {
            let start = p.expect_grouping('[')?.start();
            let mut values = Vec::new();

            while !p.check_char(']', TokenGroup::Grouping)? {
                values.push(p.parse_expression()?);
                if !p.match_char(',', TokenGroup::Separator)? {
                    break;
                }
            }

            p.expect_grouping(']')?;
            Ok(Literal::Array(ArrayLiteral {
                values,
                location: p.span_from(start),
            })
            .into())
        })
    }

    /// Parse `match value { Variant (where cond)* => block, ..., else => block }`
    fn parse_match(&mut self) -> Result<Expression> {
        self.within(NodeKind::MatchExpression, |p| {
            let start = p.expect_keyword("match")?.start();
            let value = p.parse_expression()?;
            p.expect_grouping('{')?;

            let mut cases = Vec::new();
            let mut fallback = None;

            while !p.check_char('}', TokenGroup::Grouping)? {
                if p.check_word("else")? {
                    fallback = Some(p.parse_fallback_case()?);
                    p.match_char(',', TokenGroup::Separator)?;
                    break;
                }

                let constraint = p.parse_constraint()?;
                p.expect_glued("=>")?;
                let case = p.parse_case(constraint.location.start)?;
                cases.push((constraint, case));

                if !p.match_char(',', TokenGroup::Separator)? {
                    break;
                }
            }

            p.expect_grouping('}')?;
            Ok(Expression::Match(MatchExpression {
                value: Box::new(value),
                cases,
                fallback,
                location: p.span_from(start),
            }))
        })
    }

    /// Parse `Variant (where cond)*`
    fn parse_constraint(&mut self) -> Result<ConstraintNode> {
        self.within(NodeKind::Constraint, |p| {
            let variant = identifier_literal(p.expect_token_of_group(TokenGroup::Identifier)?);
            let mut where_clauses = Vec::new();
            while p.match_word("where")? {
                where_clauses.push(p.parse_expression()?);
            }

            Ok(ConstraintNode {
                location: p.span_from(variant.location.start),
                variant,
                where_clauses,
            })
        })
    }

    /// Parse `when { cond => block, ..., else => block }`
    fn parse_when(&mut self) -> Result<Expression> {
        self.within(NodeKind::WhenExpression, |p| {
            let start = p.expect_keyword("when")?.start();
            p.expect_grouping('{')?;

            let mut cases = Vec::new();
            let mut fallback = None;

            while !p.check_char('}', TokenGroup::Grouping)? {
                if p.check_word("else")? {
                    fallback = Some(p.parse_fallback_case()?);
                    p.match_char(',', TokenGroup::Separator)?;
                    break;
                }

                let condition = p.parse_expression()?;
                p.expect_glued("=>")?;
                let case = p.parse_case(condition.location().start)?;
                cases.push((condition, case));

                if !p.match_char(',', TokenGroup::Separator)? {
                    break;
                }
            }

            p.expect_grouping('}')?;
            Ok(Expression::When(WhenExpression {
                cases,
                fallback,
                location: p.span_from(start),
            }))
        })
    }

    /// Parse `else => block`
    fn parse_fallback_case(&mut self) -> Result<Case> {
        let start = self.expect_keyword("else")?.start();
        self.expect_glued("=>")?;
        self.parse_case(start)
    }

    fn parse_case(&mut self, start: Position) -> Result<Case> {
        let body = self.parse_block()?;
        Ok(Case {
            body,
            location: self.span_from(start),
        })
    }
}

fn identifier_literal(token: Token) -> IdentifierLiteral {
    IdentifierLiteral {
        name: token.characters,
        location: token.location,
    }
}

fn identifier(token: Token) -> Expression {
    Literal::Identifier(identifier_literal(token)).into()
}

/// Block-valued expressions take no postfix operators.
fn is_block_valued(expression: &Expression) -> bool {
    matches!(
        expression,
        Expression::Block(_)
            | Expression::If(_)
            | Expression::IfBinding(_)
            | Expression::Match(_)
            | Expression::When(_)
    )
}
