//! Statement parsing implementation
//!
//! This module handles parsing of all SQOPL statement types:
//!
//! - Declarations: `import`, `fn`, `extern fn`, `struct`, `const`/`var`/`let`
//! - Control flow: `if`, `if let`, `while`, `loop`, `for`
//! - Jump statements: `return`
//! - Blocks: `{ ... }`
//! - Expression statements: calls, assignments, and a block's trailing value
//!
//! # Grammar
//!
//! ```text
//! statement ::= import | function | extern | struct | variable
//!             | return_stmt | if_stmt | while_stmt | loop_stmt | for_stmt
//!             | expr_stmt
//! block     ::= "{" statement* "}"
//! expr_stmt ::= expression ("=" expression)? ";"
//! ```
//!
//! A statement that starts with a literal or punctuation is only accepted
//! inside a block, as an assignment target or as the block's trailing value.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::error::{Diagnostic, Result};
use crate::parser::expressions::{can_start_expression, is_reserved};
use crate::parser::parse::Parser;
use crate::parser::token::{Position, TokenGroup};

impl Parser {
    /// Parse one statement at the top level of a program.
    pub(crate) fn parse_top_level_statement(&mut self) -> Result<Statement> {
        self.parse_statement(false)
    }

    /// Parse `{ statement* }`
    pub(crate) fn parse_block(&mut self) -> Result<Block> {
        self.within(NodeKind::Block, |p| {
            let open = p.expect_grouping('{')?;
            p.nested(open.location, |p| {
                let mut code = Vec::new();

                while !p.peek_required()?.is_char('}', TokenGroup::Grouping) {
                    code.push(AstNode::Statement(p.parse_statement(true)?));
                }

                p.expect_grouping('}')?;
                Ok(Block {
                    code,
                    location: p.span_from(open.start()),
                })
            })
        })
    }

    /// Parse a statement
    fn parse_statement(&mut self, in_block: bool) -> Result<Statement> {
        let token = self.peek_required()?;

        if token.group == TokenGroup::Identifier {
            match token.characters.as_str() {
                "import" => return Ok(Statement::Import(self.parse_import()?)),
                "fn" => {
                    return Ok(Definition::Function(self.parse_function_definition()?).into())
                }
                "extern" => {
                    return Ok(Statement::Declaration(Declaration::ExternalFn(
                        self.parse_external_fn()?,
                    )))
                }
                "struct" => {
                    return Ok(Definition::Structure(self.parse_struct_definition()?).into())
                }
                "const" | "var" | "let" => {
                    return Ok(Definition::Variable(self.parse_variable_definition()?).into())
                }
                "return" => return self.parse_return_statement(),
                "if" => {
                    let statement = self.parse_if(false)?;
                    return self.finish_block_like(statement, in_block);
                }
                "while" => return self.parse_while_statement(),
                "loop" => return self.parse_forever_loop(),
                "for" => return self.parse_for_statement(),
                _ => {}
            }
        }

        if token.group == TokenGroup::Identifier || token.is_char('{', TokenGroup::Grouping) {
            if is_reserved(&token.characters) {
                return Err(Diagnostic::CannotParse { token });
            }
            return self.parse_expression_statement(in_block);
        }

        // Inside a block, other expressions may be assigned to (`*p = 1;`)
        // or be the block's value, but not stand alone.
        if in_block && can_start_expression(&token) {
            return match self.parse_expression_statement(true)? {
                Statement::Expression(_) => Err(Diagnostic::CannotParse { token }),
                statement => Ok(statement),
            };
        }

        Err(Diagnostic::CannotParse { token })
    }

    /// Parse `target = value;`, `expression;` or a block's trailing value.
    fn parse_expression_statement(&mut self, in_block: bool) -> Result<Statement> {
        let start = self.next_start()?;

        // A statement-leading block, `match` or `when` ends at its `}`.
        let block_led = self.check_char('{', TokenGroup::Grouping)?
            || self.check_word("match")?
            || self.check_word("when")?;

        let target = if block_led {
            self.parse_primary()?
        } else {
            self.parse_expression()?
        };

        if self.match_operator("=")?.is_some() {
            return self.within(NodeKind::AssignmentStatement, |p| {
                let value = p.parse_expression()?;
                p.expect_semicolon()?;
                Ok(Statement::Assignment(AssignmentStatement {
                    target,
                    value,
                    location: p.span_from(start),
                }))
            });
        }

        if in_block && self.check_char('}', TokenGroup::Grouping)? {
            return Ok(Statement::ImplicitReturn(ImplicitReturn {
                location: target.location(),
                value: target,
            }));
        }

        if is_block_like(&target) && !self.check_char(';', TokenGroup::Separator)? {
            return Ok(Statement::Expression(target));
        }

        self.expect_semicolon()?;
        Ok(Statement::Expression(target))
    }

    /// Turn a trailing `if … else …` into the block's value.
    fn finish_block_like(&mut self, statement: Statement, in_block: bool) -> Result<Statement> {
        match statement {
            Statement::Expression(value)
                if in_block && self.check_char('}', TokenGroup::Grouping)? =>
            {
                Ok(Statement::ImplicitReturn(ImplicitReturn {
                    location: value.location(),
                    value,
                }))
            }
            other => Ok(other),
        }
    }

    /// Parse `return value?;`
    fn parse_return_statement(&mut self) -> Result<Statement> {
        self.within(NodeKind::ExplicitReturn, |p| {
            let start = p.expect_keyword("return")?.start();

            let value = if p.check_char(';', TokenGroup::Separator)? {
                None
            } else {
                Some(p.parse_expression()?)
            };
            p.expect_semicolon()?;

            Ok(Statement::ExplicitReturn(ExplicitReturn {
                value,
                location: p.span_from(start),
            }))
        })
    }

    /// Parse an `if` chain.
    ///
    /// Without `else` this is an [`IfStatement`] (or an `if let` statement);
    /// with one it is an expression, returned as [`Statement::Expression`].
    /// `require_else` makes a missing `else` an error, and the chain is an
    /// expression from its first token.
    pub(crate) fn parse_if(&mut self, require_else: bool) -> Result<Statement> {
        let kind = if require_else {
            NodeKind::IfExpression
        } else {
            NodeKind::IfStatement
        };

        self.within(kind, |p| {
            let start = p.expect_keyword("if")?.start();

            let binding = if p.match_word("let")? {
                Some(BindingMode::Let)
            } else if p.match_word("var")? {
                Some(BindingMode::Var)
            } else {
                None
            };

            if let Some(mode) = binding {
                return p.parse_if_binding(start, mode, require_else);
            }

            let condition = p.parse_expression()?;
            let body = p.parse_block()?;

            if !p.match_else(require_else)? {
                return Ok(Statement::If(IfStatement {
                    condition,
                    body,
                    location: p.span_from(start),
                }));
            }

            p.retag(NodeKind::IfExpression);
            let fallback = p.parse_else_body()?;
            Ok(Statement::Expression(Expression::If(IfExpression {
                condition: Box::new(condition),
                body,
                fallback,
                location: p.span_from(start),
            })))
        })
    }

    /// `if let|var name = value { } (else { })?`, after the keywords.
    fn parse_if_binding(
        &mut self,
        start: Position,
        mode: BindingMode,
        require_else: bool,
    ) -> Result<Statement> {
        let (statement_kind, expression_kind) = match mode {
            BindingMode::Let => (NodeKind::IfLetStatement, NodeKind::IfLetExpression),
            BindingMode::Var => (NodeKind::IfVarStatement, NodeKind::IfVarExpression),
        };
        self.retag(if require_else {
            expression_kind
        } else {
            statement_kind
        });

        let name = self.expect_identifier()?;
        self.expect_operator('=')?;
        let value = self.parse_expression()?;
        let body = self.parse_block()?;

        if !self.match_else(require_else)? {
            return Ok(Statement::IfBinding(IfBindingStatement {
                mode,
                name,
                value,
                body,
                location: self.span_from(start),
            }));
        }

        self.retag(expression_kind);
        let fallback = self.parse_else_body()?;
        Ok(Statement::Expression(Expression::IfBinding(
            IfBindingExpression {
                mode,
                name,
                value: Box::new(value),
                body,
                fallback,
                location: self.span_from(start),
            },
        )))
    }

    fn match_else(&mut self, require_else: bool) -> Result<bool> {
        if require_else {
            self.expect_keyword("else")?;
            Ok(true)
        } else {
            self.match_word("else")
        }
    }

    /// The block after `else`. `else if …` becomes a block holding the nested if.
    fn parse_else_body(&mut self) -> Result<Block> {
        if !self.check_word("if")? {
            return self.parse_block();
        }

        let nested = self.parse_if(false)?;
        Ok(Block {
            location: nested.location(),
            code: vec![AstNode::Statement(nested)],
        })
    }

    /// Parse `while condition { body }`
    fn parse_while_statement(&mut self) -> Result<Statement> {
        self.within(NodeKind::WhileLoop, |p| {
            let start = p.expect_keyword("while")?.start();
            let condition = p.parse_expression()?;
            let body = p.parse_block()?;

            Ok(Statement::While(WhileLoop {
                condition,
                body,
                location: p.span_from(start),
            }))
        })
    }

    /// Parse `loop { body }`
    fn parse_forever_loop(&mut self) -> Result<Statement> {
        self.within(NodeKind::ForeverLoop, |p| {
            let start = p.expect_keyword("loop")?.start();
            let body = p.parse_block()?;

            Ok(Statement::Forever(ForeverLoop {
                body,
                location: p.span_from(start),
            }))
        })
    }

    /// Parse `for name in iterator { }` or `for init; check; increment { }`
    fn parse_for_statement(&mut self) -> Result<Statement> {
        self.within(NodeKind::ForInLoop, |p| {
            let start = p.expect_keyword("for")?.start();

            let c_style = p.check_char(';', TokenGroup::Separator)?
                || p.check_word("var")?
                || p.check_word("let")?
                || p.check_word("const")?;
            if c_style {
                p.retag(NodeKind::CStyleForLoop);
                return p.parse_c_style_for(start);
            }

            let variable = p.expect_identifier()?;
            p.expect_keyword("in")?;
            let iterator = p.parse_expression()?;
            let body = p.parse_block()?;

            Ok(Statement::ForIn(ForInLoop {
                variable,
                iterator,
                body,
                location: p.span_from(start),
            }))
        })
    }

    fn parse_c_style_for(&mut self, start: Position) -> Result<Statement> {
        let initialisation = if self.match_char(';', TokenGroup::Separator)? {
            None
        } else {
            // The definition consumes its own `;`.
            Some(Box::new(self.parse_variable_definition()?))
        };

        let check = if self.check_char(';', TokenGroup::Separator)? {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_semicolon()?;

        let increment = if self.check_char('{', TokenGroup::Grouping)? {
            None
        } else {
            let inc_start = self.next_start()?;
            let target = self.parse_expression()?;
            let statement = if self.match_operator("=")?.is_some() {
                let value = self.parse_expression()?;
                Statement::Assignment(AssignmentStatement {
                    target,
                    value,
                    location: self.span_from(inc_start),
                })
            } else {
                Statement::Expression(target)
            };
            Some(Box::new(statement))
        };

        let body = self.parse_block()?;

        Ok(Statement::CStyleFor(CStyleForLoop {
            initialisation,
            check,
            increment,
            body,
            location: self.span_from(start),
        }))
    }
}

/// Expressions that end in a block and need no `;` as statements.
fn is_block_like(expression: &Expression) -> bool {
    matches!(
        expression,
        Expression::Block(_)
            | Expression::If(_)
            | Expression::IfBinding(_)
            | Expression::Match(_)
            | Expression::When(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::MAX_NESTING_DEPTH;

    fn parse_one(source: &str) -> Statement {
        let mut statements = Parser::new(source).parse_program().unwrap().statements;
        assert_eq!(statements.len(), 1, "{:?}", statements);
        statements.remove(0)
    }

    fn parse_err(source: &str) -> Diagnostic {
        Parser::new(source).parse_program().unwrap_err()
    }

    fn body_of(source: &str) -> Block {
        match parse_one(source) {
            Statement::Declaration(Declaration::Definition(Definition::Function(f))) => f.body,
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_literal_statement_cannot_parse() {
        match parse_err("42") {
            Diagnostic::CannotParse { token } => {
                assert_eq!(token.group, TokenGroup::Integer);
                assert_eq!(token.characters, "42");
            }
            other => panic!("Expected cannot-parse, got {:?}", other),
        }
        let message = parse_err("42").to_string();
        assert!(message.contains("Integers(42) @ (1:1)-(1:3)"), "{message}");
    }

    #[test]
    fn test_literal_inside_block_needs_to_be_last() {
        let body = body_of("fn f() i32 { 42 }");
        match body.tail() {
            Some(Expression::Literal(Literal::Integer(lit))) => assert_eq!(lit.value, 42),
            other => panic!("Expected tail 42, got {:?}", other),
        }

        assert!(matches!(
            parse_err("fn f() { 42; }"),
            Diagnostic::CannotParse { .. }
        ));
    }

    #[test]
    fn test_dereference_assignment() {
        let body = body_of("fn f(p *i32) { *p = 3; }");
        match body.statements().next() {
            Some(Statement::Assignment(assign)) => {
                assert!(matches!(assign.target, Expression::PrefixUnary(_)))
            }
            other => panic!("Expected assignment, got {:?}", other),
        };
    }

    #[test]
    fn test_reserved_word_cannot_start_statement() {
        assert!(matches!(parse_err("else { }"), Diagnostic::CannotParse { .. }));
    }

    #[test]
    fn test_assignment_and_expression_statements() {
        let body = body_of("fn f() { x = y + 1; print(x); }");
        let statements: Vec<&Statement> = body.statements().collect();
        assert_eq!(statements.len(), 2);

        match statements[0] {
            Statement::Assignment(assign) => {
                assert_eq!(assign.target.as_identifier(), Some("x"));
                assert!(matches!(assign.value, Expression::Binary(_)));
                assert!(assign.location.encloses(&assign.value.location()));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
        assert!(matches!(
            statements[1],
            Statement::Expression(Expression::FunctionCall(_))
        ));
    }

    #[test]
    fn test_missing_semicolon() {
        match parse_err("fn f() { x = 1 y = 2; }") {
            Diagnostic::ExpectedCharacter { expected, got, .. } => {
                assert_eq!(expected, ';');
                assert!(got.is_word("y"));
            }
            other => panic!("Expected ';' error, got {:?}", other),
        }
    }

    #[test]
    fn test_return_statement() {
        let body = body_of("fn f() { return; return a; }");
        let statements: Vec<&Statement> = body.statements().collect();
        match (statements[0], statements[1]) {
            (Statement::ExplicitReturn(empty), Statement::ExplicitReturn(value)) => {
                assert!(empty.value.is_none());
                assert!(value.value.is_some());
            }
            other => panic!("Expected returns, got {:?}", other),
        }
    }

    #[test]
    fn test_if_statement_and_expression() {
        match parse_one("if ready { go(); }") {
            Statement::If(stmt) => {
                assert_eq!(stmt.condition.as_identifier(), Some("ready"));
                assert_eq!(stmt.body.code.len(), 1);
                assert_eq!(stmt.kind(), NodeKind::IfStatement);
            }
            other => panic!("Expected if statement, got {:?}", other),
        }

        match parse_one("if a { x(); } else if b { y(); } else { z(); }") {
            Statement::Expression(Expression::If(expr)) => {
                assert_eq!(expr.kind(), NodeKind::IfExpression);
                match expr.fallback.code.first().and_then(AstNode::as_statement) {
                    Some(Statement::Expression(Expression::If(_))) => {}
                    other => panic!("Expected nested if expression, got {:?}", other),
                }
                assert!(expr.location.encloses(&expr.fallback.location));
            }
            other => panic!("Expected if expression, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_if_is_block_value() {
        let body = body_of("fn f() i32 { if c { 1 } else { 2 } }");
        assert!(matches!(body.tail(), Some(Expression::If(_))));
    }

    #[test]
    fn test_if_let_and_if_var() {
        match parse_one("if let v = find(k) { use(v); }") {
            Statement::IfBinding(stmt) => {
                assert_eq!(stmt.kind(), NodeKind::IfLetStatement);
                assert_eq!(stmt.name, "v");
            }
            other => panic!("Expected if-let statement, got {:?}", other),
        }

        match parse_one("if var v = find(k) { v = 1; } else { fail(); }") {
            Statement::Expression(Expression::IfBinding(expr)) => {
                assert_eq!(expr.kind(), NodeKind::IfVarExpression);
                assert_eq!(expr.fallback.code.len(), 1);
            }
            other => panic!("Expected if-var expression, got {:?}", other),
        }
    }

    #[test]
    fn test_loops() {
        match parse_one("while i < 10 { i = i + 1; }") {
            Statement::While(stmt) => assert!(matches!(stmt.condition, Expression::Binary(_))),
            other => panic!("Expected while, got {:?}", other),
        }

        match parse_one("loop { tick(); }") {
            Statement::Forever(stmt) => assert_eq!(stmt.kind(), NodeKind::ForeverLoop),
            other => panic!("Expected loop, got {:?}", other),
        }

        match parse_one("for item in items { use(item); }") {
            Statement::ForIn(stmt) => {
                assert_eq!(stmt.variable, "item");
                assert_eq!(stmt.iterator.as_identifier(), Some("items"));
            }
            other => panic!("Expected for-in, got {:?}", other),
        }
    }

    #[test]
    fn test_c_style_for() {
        match parse_one("for var i = 0; i < n; i = i + 1 { step(i); }") {
            Statement::CStyleFor(stmt) => {
                assert_eq!(stmt.kind(), NodeKind::CStyleForLoop);
                assert_eq!(stmt.initialisation.as_ref().unwrap().name, "i");
                assert!(stmt.check.is_some());
                assert!(matches!(
                    stmt.increment.as_deref(),
                    Some(Statement::Assignment(_))
                ));
            }
            other => panic!("Expected C-style for, got {:?}", other),
        }

        match parse_one("for ;; { }") {
            Statement::CStyleFor(stmt) => {
                assert!(stmt.initialisation.is_none());
                assert!(stmt.check.is_none());
                assert!(stmt.increment.is_none());
            }
            other => panic!("Expected C-style for, got {:?}", other),
        }
    }

    #[test]
    fn test_block_statement_needs_no_semicolon() {
        let body = body_of("fn f() { { a(); } b(); }");
        let statements: Vec<&Statement> = body.statements().collect();
        assert!(matches!(statements[0], Statement::Expression(Expression::Block(_))));
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_eof_in_block() {
        match parse_err("fn main() { let x = 1;") {
            Diagnostic::UnexpectedEndOfInput { while_parsing, .. } => {
                assert_eq!(while_parsing, NodeKind::Block)
            }
            other => panic!("Expected EOF in block, got {:?}", other),
        }
    }

    #[test]
    fn test_eof_after_expression_statement_is_in_block() {
        match parse_err("fn main() { foo()") {
            Diagnostic::UnexpectedEndOfInput { while_parsing, .. } => {
                assert_eq!(while_parsing, NodeKind::Block)
            }
            other => panic!("Expected EOF in block, got {:?}", other),
        }
    }

    #[test]
    fn test_eof_after_assignment_operator() {
        match parse_err("fn main() { x =") {
            Diagnostic::UnexpectedEndOfInput { while_parsing, .. } => {
                assert_eq!(while_parsing, NodeKind::AssignmentStatement)
            }
            other => panic!("Expected EOF in assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_if_value_without_else_is_if_expression() {
        for (source, kind) in [
            ("let y = if a { 1 }", NodeKind::IfExpression),
            ("let y = if let v = f() { 1 }", NodeKind::IfLetExpression),
            ("let y = if var v = f() { 1 }", NodeKind::IfVarExpression),
        ] {
            match parse_err(source) {
                Diagnostic::UnexpectedEndOfInput { while_parsing, .. } => {
                    assert_eq!(while_parsing, kind, "{source}")
                }
                other => panic!("Expected EOF for {:?}, got {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_deeply_nested_blocks_are_rejected() {
        let source = format!("fn f() {}{}", "{".repeat(300), "}".repeat(300));
        match parse_err(&source) {
            Diagnostic::NestingTooDeep { limit, .. } => assert_eq!(limit, MAX_NESTING_DEPTH),
            other => panic!("Expected nesting error, got {:?}", other),
        }
    }

    #[test]
    fn test_eof_in_while_condition() {
        match parse_err("while") {
            Diagnostic::UnexpectedEndOfInput { while_parsing, .. } => {
                assert_eq!(while_parsing, NodeKind::WhileLoop)
            }
            other => panic!("Expected EOF, got {:?}", other),
        }
    }
}
