//! Statement, expression, definition and segment nodes

use rustc_hash::FxHashMap;

use super::{
    impl_node, AstNode, Declaration, Expression, Generics, NamedType, Node, NodeKind, Statement,
    Type,
};
use crate::parser::token::Location;

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierLiteral {
    pub name: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub values: Vec<Expression>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub value: i64,
    pub location: Location,
}

/// Never produced by the parser; the lexer has no decimal literals yet.
#[derive(Debug, Clone, PartialEq)]
pub struct DecimalLiteral {
    pub value: f64,
    pub location: Location,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub operator: String,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixUnaryExpression {
    pub operator: String,
    pub operand: Box<Expression>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostfixUnaryExpression {
    pub operator: String,
    pub operand: Box<Expression>,
    pub location: Location,
}

/// `Point { x: 1, y: 2 }`
#[derive(Debug, Clone, PartialEq)]
pub struct StructureInitialisation {
    pub struct_name: String,
    pub field_values: FxHashMap<String, Expression>,
    pub location: Location,
}

/// Like [`StructureInitialisation`], but allocated behind a reference type.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureRefInitialisation {
    pub struct_name: String,
    pub field_values: FxHashMap<String, Expression>,
    pub reference_type: Box<Type>,
    pub location: Location,
}

/// A call argument, optionally labelled: `f(x: 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub label: Option<String>,
    pub value: Expression,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Vec<Argument>,
    pub generics: Generics,
    pub location: Location,
}

/// `receiver.name(args)`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub receiver: Box<Expression>,
    pub name: String,
    pub arguments: Vec<Argument>,
    pub generics: Generics,
    pub location: Location,
}

/// `a.b.c`: the first segment is any expression, the rest are identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    pub segments: Vec<Expression>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModulePath {
    pub segments: Vec<Expression>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpression {
    pub parameters: FxHashMap<String, Type>,
    pub parameter_order: Vec<String>,
    pub return_type: Option<Type>,
    pub body: Block,
    pub location: Location,
}

/// `if` with an `else`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub condition: Box<Expression>,
    pub body: Block,
    pub fallback: Block,
    pub location: Location,
}

/// Whether an `if let` / `if var` binding is mutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    Let,
    Var,
}

/// `if let name = value { } else { }`
#[derive(Debug, Clone, PartialEq)]
pub struct IfBindingExpression {
    pub mode: BindingMode,
    pub name: String,
    pub value: Box<Expression>,
    pub body: Block,
    pub fallback: Block,
    pub location: Location,
}

/// One arm body of a switch, match or when.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub body: Block,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpression {
    pub value: Box<Expression>,
    pub cases: Vec<(ConstraintNode, Case)>,
    pub fallback: Option<Case>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhenExpression {
    pub cases: Vec<(Expression, Case)>,
    pub fallback: Option<Case>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TernaryExpression {
    pub condition: Box<Expression>,
    pub success_value: Box<Expression>,
    pub fallback_value: Box<Expression>,
    pub location: Location,
}

/// `a?.b?.c`
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalChaining {
    pub chain: Vec<Expression>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastMode {
    /// `value is T`
    Query,
    /// `value as T`
    Static,
    /// `value as! T`
    Runtime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpression {
    pub mode: CastMode,
    pub value: Box<Expression>,
    pub target: Type,
    pub location: Location,
}

/// `value ?? fallback`
#[derive(Debug, Clone, PartialEq)]
pub struct NullCoalesce {
    pub value: Box<Expression>,
    pub fallback_value: Box<Expression>,
    pub location: Location,
}

/// `value?`
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleToReturn {
    pub value: Box<Expression>,
    pub location: Location,
}

// ---------------------------------------------------------------------------
// Definitions and declarations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Const,
    Var,
    Let,
}

impl BindingKind {
    pub fn keyword(self) -> &'static str {
        match self {
            BindingKind::Const => "const",
            BindingKind::Var => "var",
            BindingKind::Let => "let",
        }
    }
}

/// `const|var|let name Type? = value;`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    pub binding: BindingKind,
    pub name: String,
    pub value: Expression,
    pub value_type: Option<Type>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructureField {
    pub name: String,
    pub is_mutable: bool,
    pub field_type: Type,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructureDefinition {
    pub name: String,
    pub fields: Vec<StructureField>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: String,
    pub return_type: Type,
    pub argument_types: Vec<Type>,
    pub self_type: Option<Type>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorSignature {
    pub name: String,
    pub may_return_null: bool,
    pub argument_types: Vec<Type>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
    pub name: String,
    pub fields: Vec<StructureField>,
    pub methods: Vec<MethodSignature>,
    pub constructors: Vec<ConstructorSignature>,
    pub location: Location,
}

/// A function definition.
///
/// `parameters` is keyed by name and loses source order; `parameter_order`
/// keeps it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub parameters: FxHashMap<String, Type>,
    pub parameter_order: Vec<String>,
    pub return_type: Option<Type>,
    pub generics: Generics,
    pub body: Block,
    pub location: Location,
}

impl FunctionDefinition {
    /// Parameters in declaration order.
    pub fn ordered_parameters(&self) -> impl Iterator<Item = (&str, &Type)> + '_ {
        self.parameter_order
            .iter()
            .filter_map(|name| self.parameters.get(name).map(|ty| (name.as_str(), ty)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    pub name: String,
    pub parameters: FxHashMap<String, Type>,
    pub parameter_order: Vec<String>,
    pub return_type: Option<Type>,
    pub context_type: Type,
    pub generics: Generics,
    pub body: Block,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorOverload {
    pub operator: String,
    pub return_type: Type,
    pub context_type: Type,
    pub right_hand_type: Type,
    pub body: Block,
    pub location: Location,
}

/// Computed accessor requirement in an interface.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorDeclaration {
    pub self_type: Type,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceField {
    pub field_type: Type,
    pub getter: Option<AccessorDeclaration>,
    pub setter: Option<AccessorDeclaration>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMethod {
    pub return_type: Option<Type>,
    pub parameters: FxHashMap<String, Type>,
    pub context_type: Type,
    pub generics: Generics,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDefinition {
    pub name: String,
    pub extends: Vec<NamedType>,
    pub fields: FxHashMap<String, InterfaceField>,
    pub methods: FxHashMap<String, InterfaceMethod>,
    pub generics: Generics,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CStyleEnumDefinition {
    pub name: String,
    pub variants: Vec<String>,
    pub ordinal_type: Option<Type>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SumTypeVariant {
    pub parameters: FxHashMap<String, Type>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SumTypeEnumDefinition {
    pub name: String,
    pub variants: FxHashMap<String, SumTypeVariant>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDefinition {
    pub name: String,
    pub declarations: Vec<Declaration>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomMacroDefinition {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Block,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetterDefinition {
    pub body: Block,
    pub self_type: Type,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetterDefinition {
    pub body: Block,
    pub self_type: Type,
    pub new_value_name: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedVarDefinition {
    pub name: String,
    pub getter: GetterDefinition,
    pub setter: Option<SetterDefinition>,
    pub value_type: Type,
    pub location: Location,
}

/// `extern fn name(params) Type?;`
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalFnDeclaration {
    pub name: String,
    pub parameters: FxHashMap<String, Type>,
    pub parameter_order: Vec<String>,
    pub return_type: Option<Type>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InternalMacroDeclaration {
    pub name: String,
    pub location: Location,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// `import a:b:c;`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatement {
    pub path: Vec<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStatement {
    pub target: Expression,
    pub value: Expression,
    pub location: Location,
}

/// The trailing expression of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct ImplicitReturn {
    pub value: Expression,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitReturn {
    pub value: Option<Expression>,
    pub location: Location,
}

/// `if` without an `else`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub body: Block,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfBindingStatement {
    pub mode: BindingMode,
    pub name: String,
    pub value: Expression,
    pub body: Block,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    pub value: Expression,
    pub cases: Vec<(Expression, Case)>,
    pub location: Location,
}

/// `for var i = 0; i < n; i = i + 1 { }`
#[derive(Debug, Clone, PartialEq)]
pub struct CStyleForLoop {
    pub initialisation: Option<Box<VariableDefinition>>,
    pub check: Option<Expression>,
    pub increment: Option<Box<Statement>>,
    pub body: Block,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForInLoop {
    pub variable: String,
    pub iterator: Expression,
    pub body: Block,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileLoop {
    pub condition: Expression,
    pub body: Block,
    pub location: Location,
}

/// `loop { }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForeverLoop {
    pub body: Block,
    pub location: Location,
}

// ---------------------------------------------------------------------------
// Segments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub code: Vec<AstNode>,
    pub location: Location,
}

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.code.iter().filter_map(AstNode::as_statement)
    }

    /// The value of a trailing implicit return, if the block has one.
    pub fn tail(&self) -> Option<&Expression> {
        match self.code.last() {
            Some(AstNode::Statement(Statement::ImplicitReturn(ret))) => Some(&ret.value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DestructuredElement {
    pub mutable: bool,
    pub value_type: Option<Type>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructureShape {
    Tuple,
    ArrayKnownLength,
    ArrayUnknownLength,
    StructOrClass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDestructuring {
    pub shape: DestructureShape,
    pub elements: FxHashMap<String, DestructuredElement>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDestructuring {
    pub reference_type: Box<Type>,
    pub destructuring: Box<super::Destructure>,
    pub location: Location,
}

/// A match arm pattern: `Variant where cond`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintNode {
    pub variant: IdentifierLiteral,
    pub where_clauses: Vec<Expression>,
    pub location: Location,
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MacroUsage {
    pub name: String,
    pub arguments: Vec<Expression>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacroVariableUsage {
    pub name: String,
    pub location: Location,
}

// ---------------------------------------------------------------------------
// Node impls
// ---------------------------------------------------------------------------

impl_node! {
    IdentifierLiteral => IdentifierLiteral,
    StringLiteral => StringLiteral,
    ArrayLiteral => ArrayLiteral,
    IntegerLiteral => IntegerLiteral,
    DecimalLiteral => DecimalLiteral,
    BinaryExpression => BinaryExpression,
    PrefixUnaryExpression => PrefixUnaryExpression,
    PostfixUnaryExpression => PostfixUnaryExpression,
    StructureInitialisation => StructureInitialisation,
    StructureRefInitialisation => StructureRefInitialisation,
    FunctionCall => FunctionCall,
    MethodCall => MethodCall,
    MemberExpression => MemberExpression,
    ModulePath => ModulePath,
    LambdaExpression => LambdaExpression,
    IfExpression => IfExpression,
    MatchExpression => MatchExpression,
    WhenExpression => WhenExpression,
    TernaryExpression => TernaryExpression,
    OptionalChaining => OptionalChaining,
    NullCoalesce => NullCoalesce,
    BubbleToReturn => BubbleToReturn,
    StructureDefinition => StructureDefinition,
    ClassDefinition => ClassDefinition,
    FunctionDefinition => FunctionDefinition,
    MethodDefinition => MethodDefinition,
    OperatorOverload => OperatorOverload,
    InterfaceDefinition => InterfaceDefinition,
    CStyleEnumDefinition => CStyleEnumDefinition,
    SumTypeEnumDefinition => SumTypeEnumDefinition,
    NamespaceDefinition => NamespaceDefinition,
    CustomMacroDefinition => CustomMacroDefinition,
    ComputedVarDefinition => ComputedVarDefinition,
    ExternalFnDeclaration => ExternalFnDeclaration,
    InternalMacroDeclaration => InternalMacroDeclaration,
    ImportStatement => ImportStatement,
    AssignmentStatement => AssignmentStatement,
    ImplicitReturn => ImplicitReturn,
    ExplicitReturn => ExplicitReturn,
    IfStatement => IfStatement,
    SwitchStatement => SwitchStatement,
    CStyleForLoop => CStyleForLoop,
    ForInLoop => ForInLoop,
    WhileLoop => WhileLoop,
    ForeverLoop => ForeverLoop,
    Block => Block,
    ReferenceDestructuring => ReferenceDestructuring,
    ConstraintNode => Constraint,
    MacroUsage => MacroUsage,
    MacroVariableUsage => MacroVariableUsage,
}

impl Node for VariableDefinition {
    fn location(&self) -> Location {
        self.location
    }

    fn kind(&self) -> NodeKind {
        match self.binding {
            BindingKind::Const => NodeKind::ConstDefinition,
            BindingKind::Var => NodeKind::VarDefinition,
            BindingKind::Let => NodeKind::LetDefinition,
        }
    }
}

impl Node for IfBindingStatement {
    fn location(&self) -> Location {
        self.location
    }

    fn kind(&self) -> NodeKind {
        match self.mode {
            BindingMode::Let => NodeKind::IfLetStatement,
            BindingMode::Var => NodeKind::IfVarStatement,
        }
    }
}

impl Node for IfBindingExpression {
    fn location(&self) -> Location {
        self.location
    }

    fn kind(&self) -> NodeKind {
        match self.mode {
            BindingMode::Let => NodeKind::IfLetExpression,
            BindingMode::Var => NodeKind::IfVarExpression,
        }
    }
}

impl Node for CastExpression {
    fn location(&self) -> Location {
        self.location
    }

    fn kind(&self) -> NodeKind {
        match self.mode {
            CastMode::Query => NodeKind::TypeCastableQuery,
            CastMode::Static => NodeKind::TypeCast,
            CastMode::Runtime => NodeKind::RuntimeTypeCast,
        }
    }
}

impl Node for CollectionDestructuring {
    fn location(&self) -> Location {
        self.location
    }

    fn kind(&self) -> NodeKind {
        match self.shape {
            DestructureShape::Tuple => NodeKind::TupleDestructuring,
            DestructureShape::ArrayKnownLength => NodeKind::ArrayKnownLengthDestructuring,
            DestructureShape::ArrayUnknownLength => NodeKind::ArrayUnknownLengthDestructuring,
            DestructureShape::StructOrClass => NodeKind::StructOrClassDestructuring,
        }
    }
}
