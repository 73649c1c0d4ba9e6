//! AST (Abstract Syntax Tree) definitions for SQOPL
//!
//! Every concrete node shape has a unique [`NodeKind`]. Kinds are sorted into
//! coarse [`NodeGroup`]s by a pure lookup ([`NodeKind::group`]).
//!
//! Nodes are organised into layers, each a tagged sum type:
//!
//! ```text
//! AstNode
//! ├── Statement ── Declaration ── Definition
//! │            └── Expression ── Literal
//! ├── Type
//! ├── Component ── Block | Destructure | ConstraintNode
//! └── Meta
//! ```
//!
//! A narrower layer converts into a wider one with `From`, so a
//! [`Definition`] can be used anywhere a [`Statement`] is expected.

mod nodes;
mod types;

pub use nodes::*;
pub use types::*;

use super::token::Location;

/// Uniform introspection shared by every node and every layer.
pub trait Node {
    fn location(&self) -> Location;

    fn kind(&self) -> NodeKind;

    fn group(&self) -> NodeGroup {
        self.kind().group()
    }
}

/// Implements [`Node`] for a struct whose kind never varies.
macro_rules! impl_node {
    ($($ty:ident => $kind:ident),* $(,)?) => {
        $(
            impl crate::parser::ast::Node for $ty {
                fn location(&self) -> crate::parser::token::Location {
                    self.location
                }

                fn kind(&self) -> crate::parser::ast::NodeKind {
                    crate::parser::ast::NodeKind::$kind
                }
            }
        )*
    };
}

/// Implements [`Node`] for a layer enum by delegating to its variants, plus
/// `From<Payload>` for each variant.
macro_rules! node_layer {
    ($layer:ident { $($variant:ident($payload:ty)),* $(,)? }) => {
        impl crate::parser::ast::Node for $layer {
            fn location(&self) -> crate::parser::token::Location {
                match self {
                    $($layer::$variant(node) => crate::parser::ast::Node::location(node),)*
                }
            }

            fn kind(&self) -> crate::parser::ast::NodeKind {
                match self {
                    $($layer::$variant(node) => crate::parser::ast::Node::kind(node),)*
                }
            }
        }

        $(
            impl From<$payload> for $layer {
                fn from(node: $payload) -> Self {
                    $layer::$variant(node)
                }
            }
        )*
    };
}

pub(crate) use impl_node;
pub(crate) use node_layer;

/// The runtime tag of a node: one per concrete shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    ImportStatement,
    ConstDefinition,
    VarDefinition,
    LetDefinition,
    IdentifierLiteral,
    BinaryExpression,
    PostfixUnaryExpression,
    PrefixUnaryExpression,
    StructureDefinition,
    ClassDefinition,
    FunctionDefinition,
    MethodDefinition,
    OperatorOverload,
    AssignmentStatement,
    StructureInitialisation,
    StructureRefInitialisation,
    ImplicitReturn,
    ExplicitReturn,
    FunctionCall,
    MethodCall,
    MemberExpression,
    ModulePath,
    LambdaExpression,
    IfExpression,
    IfStatement,
    SwitchStatement,
    MatchExpression,
    WhenExpression,
    InterfaceDefinition,
    StringLiteral,
    ArrayLiteral,
    IntegerLiteral,
    DecimalLiteral,
    CStyleEnumDefinition,
    SumTypeEnumDefinition,
    NamespaceDefinition,
    ExternalFnDeclaration,
    CStyleForLoop,
    ForInLoop,
    WhileLoop,
    ForeverLoop,
    TernaryExpression,
    OptionalChaining,
    TypeCastableQuery,
    TypeCast,
    RuntimeTypeCast,
    InternalMacroDeclaration,
    CustomMacroDefinition,
    MacroUsage,
    MacroVariableUsage,
    Block,
    TupleDestructuring,
    ArrayKnownLengthDestructuring,
    ArrayUnknownLengthDestructuring,
    StructOrClassDestructuring,
    ReferenceDestructuring,
    Constraint,
    IfLetStatement,
    IfVarStatement,
    IfLetExpression,
    IfVarExpression,
    NullCoalesce,
    BubbleToReturn,
    MutableReferenceType,
    ImmutableReferenceType,
    RawPointerType,
    NamedType,
    UntaggedUnionType,
    NeverType,
    TableType,
    ArrayType,
    SliceType,
    TupleType,
    ComputedVarDefinition,
}

impl NodeKind {
    /// The most specific group this kind belongs to.
    pub fn group(self) -> NodeGroup {
        use NodeKind::*;
        match self {
            ImportStatement | AssignmentStatement | ImplicitReturn | ExplicitReturn
            | IfStatement | SwitchStatement | CStyleForLoop | ForInLoop | WhileLoop
            | ForeverLoop | IfLetStatement | IfVarStatement => NodeGroup::Statement,

            ConstDefinition | VarDefinition | LetDefinition | StructureDefinition
            | ClassDefinition | FunctionDefinition | MethodDefinition | OperatorOverload
            | InterfaceDefinition | CStyleEnumDefinition | SumTypeEnumDefinition
            | NamespaceDefinition | CustomMacroDefinition | ComputedVarDefinition => {
                NodeGroup::Definition
            }

            ExternalFnDeclaration | InternalMacroDeclaration => NodeGroup::Declaration,

            StringLiteral | ArrayLiteral | IntegerLiteral | DecimalLiteral
            | IdentifierLiteral => NodeGroup::Literal,

            BinaryExpression | PostfixUnaryExpression | PrefixUnaryExpression
            | StructureInitialisation | StructureRefInitialisation | FunctionCall
            | MethodCall | MemberExpression | ModulePath | LambdaExpression | IfExpression
            | MatchExpression | WhenExpression | TernaryExpression | OptionalChaining
            | TypeCastableQuery | TypeCast | RuntimeTypeCast | IfLetExpression
            | IfVarExpression | NullCoalesce | BubbleToReturn => NodeGroup::Expression,

            Block | TupleDestructuring | ArrayKnownLengthDestructuring
            | ArrayUnknownLengthDestructuring | StructOrClassDestructuring
            | ReferenceDestructuring | Constraint => NodeGroup::Segment,

            MacroUsage | MacroVariableUsage => NodeGroup::Meta,

            MutableReferenceType | ImmutableReferenceType | RawPointerType | NamedType
            | UntaggedUnionType | NeverType | TableType | ArrayType | SliceType
            | TupleType => NodeGroup::Type,
        }
    }

    /// Whether a node of this kind may stand where a statement is expected.
    pub fn is_statement(self) -> bool {
        matches!(
            self.group(),
            NodeGroup::Statement
                | NodeGroup::Declaration
                | NodeGroup::Definition
                | NodeGroup::Expression
                | NodeGroup::Literal
        ) || self == NodeKind::Block
    }

    /// Whether a node of this kind produces a value.
    pub fn is_expression(self) -> bool {
        NodeGroup::Expression.contains(self) || self.group() == NodeGroup::Literal
    }

    pub fn display_name(self) -> &'static str {
        use NodeKind::*;
        match self {
            ImportStatement => "Kind(Import Statement)",
            ConstDefinition => "Kind(Const Definition)",
            VarDefinition => "Kind(Var Definition)",
            LetDefinition => "Kind(Let Definition)",
            IdentifierLiteral => "Kind(Identifier Literal)",
            BinaryExpression => "Kind(Binary Expression)",
            PostfixUnaryExpression => "Kind(Postfix Unary Expression)",
            PrefixUnaryExpression => "Kind(Prefix Unary Expression)",
            StructureDefinition => "Kind(Structure Definition)",
            ClassDefinition => "Kind(Class Definition)",
            FunctionDefinition => "Kind(Function Definition)",
            MethodDefinition => "Kind(Method Definition)",
            OperatorOverload => "Kind(Operator Overload Definition)",
            AssignmentStatement => "Kind(Assignment Statement)",
            StructureInitialisation => "Kind(Structure Initialisation Expression)",
            StructureRefInitialisation => "Kind(Structure Ref Initialisation Expression)",
            ImplicitReturn => "Kind(Implicit Return Expression)",
            ExplicitReturn => "Kind(Explicit Return Expression)",
            FunctionCall => "Kind(Function Call Expression)",
            MethodCall => "Kind(Method Call Expression)",
            MemberExpression => "Kind(Member Expression)",
            ModulePath => "Kind(Module Path Expression)",
            LambdaExpression => "Kind(Lambda Expression)",
            IfExpression => "Kind(If Expression)",
            IfStatement => "Kind(If Statement)",
            SwitchStatement => "Kind(Switch Statement)",
            MatchExpression => "Kind(Match Expression)",
            WhenExpression => "Kind(When Expression)",
            InterfaceDefinition => "Kind(Interface Definition)",
            StringLiteral => "Kind(String Literal)",
            ArrayLiteral => "Kind(Array Literal)",
            IntegerLiteral => "Kind(Integer Literal)",
            DecimalLiteral => "Kind(Decimal Literal)",
            CStyleEnumDefinition => "Kind(C-Style Enum Definition)",
            SumTypeEnumDefinition => "Kind(Sum Type Enum Definition)",
            NamespaceDefinition => "Kind(Namespace Definition)",
            ExternalFnDeclaration => "Kind(External Function Declaration)",
            CStyleForLoop => "Kind(C-Style For Loop Statement)",
            ForInLoop => "Kind(For-In Loop Statement)",
            WhileLoop => "Kind(While Loop Statement)",
            ForeverLoop => "Kind(Forever Loop Statement)",
            TernaryExpression => "Kind(Ternary Expression)",
            OptionalChaining => "Kind(Optional Chaining Expression)",
            TypeCastableQuery => "Kind(Type-Is-Castable-To Query Expression)",
            TypeCast => "Kind(Type Cast Expression)",
            RuntimeTypeCast => "Kind(Runtime Type Cast Expression)",
            InternalMacroDeclaration => "Kind(Internal Macro Declaration)",
            CustomMacroDefinition => "Kind(Custom Macro Definition)",
            MacroUsage => "Kind(Macro Usage Node)",
            MacroVariableUsage => "Kind(Macro Variable Usage Node)",
            Block => "Kind(Block Expression)",
            TupleDestructuring => "Kind(Tuple Destructuring Segment)",
            ArrayKnownLengthDestructuring => "Kind(Array Known-Length Destructuring Segment)",
            ArrayUnknownLengthDestructuring => {
                "Kind(Array Unknown-Length Destructuring Segment)"
            }
            StructOrClassDestructuring => "Kind(Struct/Class Destructuring Segment)",
            ReferenceDestructuring => "Kind(Reference Destructuring Segment)",
            Constraint => "Kind(Constraint Segment)",
            IfLetStatement => "Kind(If-Let Statement)",
            IfVarStatement => "Kind(If-Var Statement)",
            IfLetExpression => "Kind(If-Let Expression)",
            IfVarExpression => "Kind(If-Var Expression)",
            NullCoalesce => "Kind(Null Coalesce Expression)",
            BubbleToReturn => "Kind(Bubble To Return Expression)",
            MutableReferenceType => "Kind(Mutable Reference Type)",
            ImmutableReferenceType => "Kind(Immutable Reference Type)",
            RawPointerType => "Kind(Raw Pointer Type)",
            NamedType => "Kind(Named Type)",
            UntaggedUnionType => "Kind(Untagged Union Type)",
            NeverType => "Kind(Never Type)",
            TableType => "Kind(Table Type)",
            ArrayType => "Kind(Array Type)",
            SliceType => "Kind(Slice Type)",
            TupleType => "Kind(Tuple Type)",
            ComputedVarDefinition => "Kind(Computed Var Definition)",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Coarse structural roles. Membership lists overlap; see [`NodeGroup::kinds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeGroup {
    Statement,
    Definition,
    Declaration,
    Literal,
    Expression,
    Type,
    Segment,
    Meta,
}

impl NodeGroup {
    /// The fixed membership list of this group.
    ///
    /// `Block` appears under both `Segment` and `Expression`, while its
    /// [`NodeKind::group`] is `Segment`.
    pub fn kinds(self) -> &'static [NodeKind] {
        use NodeKind::*;
        match self {
            NodeGroup::Statement => &[
                ImportStatement,
                AssignmentStatement,
                ImplicitReturn,
                ExplicitReturn,
                IfStatement,
                SwitchStatement,
                CStyleForLoop,
                ForInLoop,
                WhileLoop,
                ForeverLoop,
                IfLetStatement,
                IfVarStatement,
            ],
            NodeGroup::Definition => &[
                ConstDefinition,
                VarDefinition,
                LetDefinition,
                StructureDefinition,
                ClassDefinition,
                FunctionDefinition,
                MethodDefinition,
                OperatorOverload,
                InterfaceDefinition,
                CStyleEnumDefinition,
                SumTypeEnumDefinition,
                NamespaceDefinition,
                CustomMacroDefinition,
                ComputedVarDefinition,
            ],
            NodeGroup::Declaration => &[ExternalFnDeclaration, InternalMacroDeclaration],
            NodeGroup::Literal => &[
                StringLiteral,
                ArrayLiteral,
                IntegerLiteral,
                DecimalLiteral,
                IdentifierLiteral,
            ],
            NodeGroup::Expression => &[
                BinaryExpression,
                PostfixUnaryExpression,
                PrefixUnaryExpression,
                StructureInitialisation,
                StructureRefInitialisation,
                FunctionCall,
                MethodCall,
                MemberExpression,
                ModulePath,
                LambdaExpression,
                IfExpression,
                MatchExpression,
                WhenExpression,
                TernaryExpression,
                OptionalChaining,
                TypeCastableQuery,
                TypeCast,
                RuntimeTypeCast,
                Block,
                IfLetExpression,
                IfVarExpression,
                NullCoalesce,
                BubbleToReturn,
            ],
            NodeGroup::Type => &[
                MutableReferenceType,
                ImmutableReferenceType,
                RawPointerType,
                NamedType,
                UntaggedUnionType,
                NeverType,
                TableType,
                ArrayType,
                SliceType,
                TupleType,
            ],
            NodeGroup::Segment => &[
                TupleDestructuring,
                ArrayKnownLengthDestructuring,
                ArrayUnknownLengthDestructuring,
                StructOrClassDestructuring,
                ReferenceDestructuring,
                Constraint,
                Block,
            ],
            NodeGroup::Meta => &[MacroUsage, MacroVariableUsage],
        }
    }

    pub fn contains(self, kind: NodeKind) -> bool {
        self.kinds().contains(&kind)
    }
}

/// Literal layer: the leaves of the expression grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(StringLiteral),
    Array(ArrayLiteral),
    Integer(IntegerLiteral),
    Decimal(DecimalLiteral),
    Identifier(IdentifierLiteral),
}

node_layer!(Literal {
    String(StringLiteral),
    Array(ArrayLiteral),
    Integer(IntegerLiteral),
    Decimal(DecimalLiteral),
    Identifier(IdentifierLiteral),
});

/// Expression layer: statements that produce a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Binary(BinaryExpression),
    PrefixUnary(PrefixUnaryExpression),
    PostfixUnary(PostfixUnaryExpression),
    StructureInit(StructureInitialisation),
    StructureRefInit(StructureRefInitialisation),
    FunctionCall(FunctionCall),
    MethodCall(MethodCall),
    Member(MemberExpression),
    ModulePath(ModulePath),
    Lambda(LambdaExpression),
    If(IfExpression),
    IfBinding(IfBindingExpression),
    Match(MatchExpression),
    When(WhenExpression),
    Ternary(TernaryExpression),
    OptionalChaining(OptionalChaining),
    Cast(CastExpression),
    NullCoalesce(NullCoalesce),
    BubbleToReturn(BubbleToReturn),
    Block(Block),
}

node_layer!(Expression {
    Literal(Literal),
    Binary(BinaryExpression),
    PrefixUnary(PrefixUnaryExpression),
    PostfixUnary(PostfixUnaryExpression),
    StructureInit(StructureInitialisation),
    StructureRefInit(StructureRefInitialisation),
    FunctionCall(FunctionCall),
    MethodCall(MethodCall),
    Member(MemberExpression),
    ModulePath(ModulePath),
    Lambda(LambdaExpression),
    If(IfExpression),
    IfBinding(IfBindingExpression),
    Match(MatchExpression),
    When(WhenExpression),
    Ternary(TernaryExpression),
    OptionalChaining(OptionalChaining),
    Cast(CastExpression),
    NullCoalesce(NullCoalesce),
    BubbleToReturn(BubbleToReturn),
    Block(Block),
});

impl Expression {
    /// The identifier name if this is a bare identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expression::Literal(Literal::Identifier(ident)) => Some(&ident.name),
            _ => None,
        }
    }
}

/// Definition layer: declarations that also provide a body or value.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Variable(VariableDefinition),
    Structure(StructureDefinition),
    Class(ClassDefinition),
    Function(FunctionDefinition),
    Method(MethodDefinition),
    OperatorOverload(OperatorOverload),
    Interface(InterfaceDefinition),
    CStyleEnum(CStyleEnumDefinition),
    SumTypeEnum(SumTypeEnumDefinition),
    Namespace(NamespaceDefinition),
    CustomMacro(CustomMacroDefinition),
    ComputedVar(ComputedVarDefinition),
}

node_layer!(Definition {
    Variable(VariableDefinition),
    Structure(StructureDefinition),
    Class(ClassDefinition),
    Function(FunctionDefinition),
    Method(MethodDefinition),
    OperatorOverload(OperatorOverload),
    Interface(InterfaceDefinition),
    CStyleEnum(CStyleEnumDefinition),
    SumTypeEnum(SumTypeEnumDefinition),
    Namespace(NamespaceDefinition),
    CustomMacro(CustomMacroDefinition),
    ComputedVar(ComputedVarDefinition),
});

/// Declaration layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Definition(Definition),
    ExternalFn(ExternalFnDeclaration),
    InternalMacro(InternalMacroDeclaration),
}

node_layer!(Declaration {
    Definition(Definition),
    ExternalFn(ExternalFnDeclaration),
    InternalMacro(InternalMacroDeclaration),
});

/// Statement layer: anything that may appear in a block or at top level.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Declaration(Declaration),
    Expression(Expression),
    Import(ImportStatement),
    Assignment(AssignmentStatement),
    ImplicitReturn(ImplicitReturn),
    ExplicitReturn(ExplicitReturn),
    If(IfStatement),
    IfBinding(IfBindingStatement),
    Switch(SwitchStatement),
    CStyleFor(CStyleForLoop),
    ForIn(ForInLoop),
    While(WhileLoop),
    Forever(ForeverLoop),
}

node_layer!(Statement {
    Declaration(Declaration),
    Expression(Expression),
    Import(ImportStatement),
    Assignment(AssignmentStatement),
    ImplicitReturn(ImplicitReturn),
    ExplicitReturn(ExplicitReturn),
    If(IfStatement),
    IfBinding(IfBindingStatement),
    Switch(SwitchStatement),
    CStyleFor(CStyleForLoop),
    ForIn(ForInLoop),
    While(WhileLoop),
    Forever(ForeverLoop),
});

impl From<Definition> for Statement {
    fn from(definition: Definition) -> Self {
        Statement::Declaration(Declaration::Definition(definition))
    }
}

impl From<Literal> for Statement {
    fn from(literal: Literal) -> Self {
        Statement::Expression(Expression::Literal(literal))
    }
}

impl Definition {
    pub fn into_statement(self) -> Statement {
        self.into()
    }
}

impl Expression {
    pub fn into_statement(self) -> Statement {
        self.into()
    }
}

/// Destructuring patterns.
#[derive(Debug, Clone, PartialEq)]
pub enum Destructure {
    Collection(CollectionDestructuring),
    Reference(ReferenceDestructuring),
}

node_layer!(Destructure {
    Collection(CollectionDestructuring),
    Reference(ReferenceDestructuring),
});

/// Component layer: segments that only exist inside other nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Block(Block),
    Destructure(Destructure),
    Constraint(ConstraintNode),
}

node_layer!(Component {
    Block(Block),
    Destructure(Destructure),
    Constraint(ConstraintNode),
});

/// Meta layer: macro usages.
#[derive(Debug, Clone, PartialEq)]
pub enum Meta {
    MacroUsage(MacroUsage),
    MacroVariableUsage(MacroVariableUsage),
}

node_layer!(Meta {
    MacroUsage(MacroUsage),
    MacroVariableUsage(MacroVariableUsage),
});

/// Any node.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Statement(Statement),
    Type(Type),
    Component(Component),
    Meta(Meta),
}

node_layer!(AstNode {
    Statement(Statement),
    Type(Type),
    Component(Component),
    Meta(Meta),
});

impl AstNode {
    pub fn as_statement(&self) -> Option<&Statement> {
        match self {
            AstNode::Statement(statement) => Some(statement),
            _ => None,
        }
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Program { statements }
    }
}
