// Integration tests for the SQOPL parser

use rstest::rstest;

use sqopl::parser::ast::*;
use sqopl::parser::{Diagnostic, Parser, Position, TokenGroup, MAX_NESTING_DEPTH};

fn parse(source: &str) -> Program {
    Parser::new(source).parse_program().expect("Parsing failed")
}

fn parse_err(source: &str) -> Diagnostic {
    Parser::new(source)
        .parse_program()
        .expect_err("Parsing should fail")
}

fn function(statement: &Statement) -> &FunctionDefinition {
    match statement {
        Statement::Declaration(Declaration::Definition(Definition::Function(f))) => f,
        other => panic!("Expected function definition, got {:?}", other),
    }
}

/// Every child location must lie inside its parent's.
fn assert_block_encloses(block: &Block) {
    for node in &block.code {
        assert!(
            block.location.encloses(&node.location()),
            "{} escapes block {}",
            node.location(),
            block.location
        );
    }
}

#[test]
fn test_import_path() {
    let program = parse("import foo:bar:baz;");
    match &program.statements[0] {
        Statement::Import(import) => assert_eq!(import.path, ["foo", "bar", "baz"]),
        other => panic!("Expected import, got {:?}", other),
    }
}

#[test]
fn test_top_level_literal_cannot_parse() {
    let err = parse_err("42");
    assert!(matches!(err, Diagnostic::CannotParse { .. }));
    assert!(err.to_string().contains("Integers(42) @ (1:1)-(1:3)"));
}

#[test]
fn test_escaping_dyn_mut_reference() {
    let program = parse("fn f(x escaping dyn mut &Foo) { }");
    let f = function(&program.statements[0]);
    match &f.parameters["x"] {
        Type::MutableReference(reference) => {
            assert!(reference.escaping());
            assert!(reference.is_dyn());
            assert!(reference.mutable());
            match reference.inner_type() {
                Type::Named(named) => assert_eq!(named.name, "Foo"),
                other => panic!("Expected named inner type, got {:?}", other),
            }
        }
        other => panic!("Expected mutable reference, got {:?}", other),
    }
}

#[test]
fn test_full_program() {
    let source = r#"
import std:io;

extern fn puts(s &u8) i32;

struct Point {
    mut x i64,
    y i64,
}

fn distance<T: Num + Copy>(a &Point, b &Point) T {
    let dx = a.x - b.x;
    var total = 0;
    for var i = 0; i < 3; i = i + 1 {
        total = total + i;
    }
    for p in points {
        total = total + p.y;
    }
    while total > 100 {
        total = total / 2;
    }
    if let found = lookup(dx) {
        return found;
    }
    let kind = match shape {
        Circle where r > 0 => { 1 },
        else => { 0 }
    };
    when {
        dx < 0 => { neg() },
        else => { pos() }
    }
    loop {
        tick()?;
    }
    dx * dx + total
}
"#;
    let program = parse(source);
    assert_eq!(program.statements.len(), 4);

    let kinds: Vec<NodeKind> = program.statements.iter().map(Node::kind).collect();
    assert_eq!(
        kinds,
        [
            NodeKind::ImportStatement,
            NodeKind::ExternalFnDeclaration,
            NodeKind::StructureDefinition,
            NodeKind::FunctionDefinition,
        ]
    );

    let f = function(&program.statements[3]);
    assert_eq!(f.parameter_order, ["a", "b"]);
    assert_eq!(f.generics["T"].conforms_to.len(), 2);

    let body_kinds: Vec<NodeKind> = f.body.statements().map(Node::kind).collect();
    assert_eq!(
        body_kinds,
        [
            NodeKind::LetDefinition,
            NodeKind::VarDefinition,
            NodeKind::CStyleForLoop,
            NodeKind::ForInLoop,
            NodeKind::WhileLoop,
            NodeKind::IfLetStatement,
            NodeKind::LetDefinition,
            NodeKind::WhenExpression,
            NodeKind::ForeverLoop,
            NodeKind::ImplicitReturn,
        ]
    );

    assert!(f.location.encloses(&f.body.location));
    assert_block_encloses(&f.body);
    assert_eq!(f.body.location.end, Position::new(38, 2));
}

#[test]
fn test_statement_iterator_is_lazy() {
    let mut parser = Parser::new("import a; import b; $");
    assert!(matches!(parser.next(), Some(Ok(Statement::Import(_)))));
    assert!(matches!(parser.next(), Some(Ok(Statement::Import(_)))));
    assert!(matches!(
        parser.next(),
        Some(Err(Diagnostic::InvalidCharacter { character: '$', .. }))
    ));
    assert!(parser.next().is_none());
}

#[rstest]
#[case("fn main() {", NodeKind::Block)]
#[case("fn main() { let x = 1;", NodeKind::Block)]
#[case("import foo", NodeKind::ImportStatement)]
#[case("struct P { x", NodeKind::StructureDefinition)]
#[case("fn f(a", NodeKind::FunctionDefinition)]
#[case("let p &", NodeKind::ImmutableReferenceType)]
#[case("fn main() { foo()", NodeKind::Block)]
#[case("fn main() { x.y =", NodeKind::AssignmentStatement)]
#[case("let y = if a { 1 }", NodeKind::IfExpression)]
#[case("fn main() { if a { 1 }", NodeKind::Block)]
fn test_end_of_input_names_the_open_node(#[case] source: &str, #[case] kind: NodeKind) {
    match parse_err(source) {
        Diagnostic::UnexpectedEndOfInput { while_parsing, .. } => {
            assert_eq!(while_parsing, kind, "{source}")
        }
        other => panic!("Expected EOF for {:?}, got {:?}", source, other),
    }
}

#[test]
fn test_end_of_input_message() {
    let err = parse_err("fn main() {");
    assert_eq!(
        err.to_string(),
        "Unexpected EOF while parsing node Kind(Block Expression)"
    );
    assert!(err.is_end_of_input());
}

#[test]
fn test_expected_character_message() {
    let err = parse_err("import foo,bar;");
    assert_eq!(
        err.to_string(),
        "Expected character ':' of group Separators, but got token Separators(,) @ (1:11)-(1:12)"
    );
    assert_eq!(err.location().map(|l| l.start), Some(Position::new(1, 11)));
}

#[test]
fn test_mutability_needs_reference() {
    match parse_err("let x mut Foo = y;") {
        Diagnostic::ExpectedOneOfCharacters { expected, got } => {
            assert_eq!(
                expected,
                [('&', TokenGroup::Operator), ('[', TokenGroup::Grouping)]
            );
            assert!(got.is_word("Foo"));
        }
        other => panic!("Expected one-of error, got {:?}", other),
    }
}

#[test]
fn test_expected_identifier_message() {
    let err = parse_err("fn 1() { }");
    assert!(matches!(
        err,
        Diagnostic::ExpectedTokenOfGroup {
            expected: TokenGroup::Identifier,
            ..
        }
    ));
    assert!(err
        .to_string()
        .starts_with("Expected token of group Identifiers, but got token Integers(1)"));
}

#[test]
fn test_keyword_mismatch_message() {
    let err = parse_err("extern puts();");
    assert_eq!(
        err.to_string(),
        "Expected token Identifiers(fn), but got token Identifiers(puts) @ (1:8)-(1:12)"
    );
}

#[test]
fn test_location_of_nested_expression() {
    let program = parse("fn f() {\n    x = (a + b) * c;\n}");
    let f = function(&program.statements[0]);
    match f.body.statements().next() {
        Some(Statement::Assignment(assign)) => {
            assert_eq!(assign.location.start, Position::new(2, 5));
            assert_eq!(assign.location.end, Position::new(2, 21));
            assert!(assign.location.encloses(&assign.target.location()));
            assert!(assign.location.encloses(&assign.value.location()));
        }
        other => panic!("Expected assignment, got {:?}", other),
    };
}

#[test]
fn test_type_forms() {
    let program = parse(
        "fn f(a []i32, b [u8; 4], c (i32, bool), d {str: i32}, e i32 | str, g dyn *Foo, h Map<K, V>) ! { }",
    );
    let f = function(&program.statements[0]);
    let kinds: Vec<NodeKind> = f.ordered_parameters().map(|(_, t)| t.kind()).collect();
    assert_eq!(
        kinds,
        [
            NodeKind::SliceType,
            NodeKind::ArrayType,
            NodeKind::TupleType,
            NodeKind::TableType,
            NodeKind::UntaggedUnionType,
            NodeKind::RawPointerType,
            NodeKind::NamedType,
        ]
    );
    assert!(matches!(f.return_type, Some(Type::Never(_))));
}

#[rstest]
#[case::parentheses(format!("fn f() {{ x = {}1{}; }}", "(".repeat(300), ")".repeat(300)))]
#[case::negation(format!("fn f() {{ x = {}1; }}", "-".repeat(300)))]
#[case::references(format!("fn f() {{ x = {}y; }}", "& ".repeat(300)))]
#[case::blocks(format!("fn f() {}{}", "{".repeat(300), "}".repeat(300)))]
#[case::types(format!("let x {}Foo = y;", "&".repeat(300)))]
fn test_deep_nesting_is_reported(#[case] source: String) {
    match parse_err(&source) {
        Diagnostic::NestingTooDeep { location, limit } => {
            assert_eq!(limit, MAX_NESTING_DEPTH);
            assert_eq!(location.start.line, 1);
        }
        other => panic!("Expected nesting error, got {:?}", other),
    }
}

#[test]
fn test_nesting_below_the_limit_parses() {
    let depth = MAX_NESTING_DEPTH / 2;
    let source = format!("fn f() {{ x = {}1{}; }}", "(".repeat(depth), ")".repeat(depth));
    let program = parse(&source);
    assert_eq!(program.statements.len(), 1);
}
