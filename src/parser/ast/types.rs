//! Type annotations

use rustc_hash::FxHashMap;

use super::{impl_node, node_layer};
use crate::parser::token::Location;

/// Generic parameters keyed by name.
pub type Generics = FxHashMap<String, TypeGeneric>;

/// Bounds on one generic parameter: `T: Hash + Eq`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeGeneric {
    pub conforms_to: Vec<NamedType>,
}

/// Shared view over the pointer-like types.
pub trait ReferenceLike {
    fn mutable(&self) -> bool;
    fn escaping(&self) -> bool;
    fn inner_type(&self) -> &Type;
    fn is_dyn(&self) -> bool;
}

/// `mut &T`
#[derive(Debug, Clone, PartialEq)]
pub struct MutableReference {
    pub escaping: bool,
    pub dynamic: bool,
    pub inner: Box<Type>,
    pub location: Location,
}

/// `&T` / `const &T`
#[derive(Debug, Clone, PartialEq)]
pub struct ImmutableReference {
    pub escaping: bool,
    pub dynamic: bool,
    pub inner: Box<Type>,
    pub location: Location,
}

/// `*T`. Always mutable and escaping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPointer {
    pub dynamic: bool,
    pub inner: Box<Type>,
    pub location: Location,
}

/// `[]T`, `mut []T`
#[derive(Debug, Clone, PartialEq)]
pub struct SliceType {
    pub mutable: bool,
    pub escaping: bool,
    pub element: Box<Type>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    pub name: String,
    pub generics: Generics,
    pub location: Location,
}

/// `A | B | C`
#[derive(Debug, Clone, PartialEq)]
pub struct UntaggedUnion {
    pub types: Vec<Type>,
    pub location: Location,
}

/// `!`
#[derive(Debug, Clone, PartialEq)]
pub struct NeverType {
    pub location: Location,
}

/// `{K: V}`
#[derive(Debug, Clone, PartialEq)]
pub struct TableType {
    pub key: Box<Type>,
    pub value: Box<Type>,
    pub location: Location,
}

/// `[T; N]`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub element: Box<Type>,
    pub length: u64,
    pub location: Location,
}

/// `(A, B)`
#[derive(Debug, Clone, PartialEq)]
pub struct TupleType {
    pub elements: Vec<Type>,
    pub location: Location,
}

impl_node! {
    MutableReference => MutableReferenceType,
    ImmutableReference => ImmutableReferenceType,
    RawPointer => RawPointerType,
    SliceType => SliceType,
    NamedType => NamedType,
    UntaggedUnion => UntaggedUnionType,
    NeverType => NeverType,
    TableType => TableType,
    ArrayType => ArrayType,
    TupleType => TupleType,
}

impl ReferenceLike for MutableReference {
    fn mutable(&self) -> bool {
        true
    }

    fn escaping(&self) -> bool {
        self.escaping
    }

    fn inner_type(&self) -> &Type {
        &self.inner
    }

    fn is_dyn(&self) -> bool {
        self.dynamic
    }
}

impl ReferenceLike for ImmutableReference {
    fn mutable(&self) -> bool {
        false
    }

    fn escaping(&self) -> bool {
        self.escaping
    }

    fn inner_type(&self) -> &Type {
        &self.inner
    }

    fn is_dyn(&self) -> bool {
        self.dynamic
    }
}

impl ReferenceLike for RawPointer {
    fn mutable(&self) -> bool {
        true
    }

    fn escaping(&self) -> bool {
        true
    }

    fn inner_type(&self) -> &Type {
        &self.inner
    }

    fn is_dyn(&self) -> bool {
        self.dynamic
    }
}

impl ReferenceLike for SliceType {
    fn mutable(&self) -> bool {
        self.mutable
    }

    fn escaping(&self) -> bool {
        self.escaping
    }

    fn inner_type(&self) -> &Type {
        &self.element
    }

    fn is_dyn(&self) -> bool {
        false
    }
}

/// Type layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    MutableReference(MutableReference),
    ImmutableReference(ImmutableReference),
    RawPointer(RawPointer),
    Slice(SliceType),
    Named(NamedType),
    Union(UntaggedUnion),
    Never(NeverType),
    Table(TableType),
    Array(ArrayType),
    Tuple(TupleType),
}

node_layer!(Type {
    MutableReference(MutableReference),
    ImmutableReference(ImmutableReference),
    RawPointer(RawPointer),
    Slice(SliceType),
    Named(NamedType),
    Union(UntaggedUnion),
    Never(NeverType),
    Table(TableType),
    Array(ArrayType),
    Tuple(TupleType),
});

impl Type {
    /// The reference-like view of this type, if it has one.
    pub fn as_reference(&self) -> Option<&dyn ReferenceLike> {
        match self {
            Type::MutableReference(reference) => Some(reference),
            Type::ImmutableReference(reference) => Some(reference),
            Type::RawPointer(pointer) => Some(pointer),
            Type::Slice(slice) => Some(slice),
            _ => None,
        }
    }

    pub fn as_named(&self) -> Option<&NamedType> {
        match self {
            Type::Named(named) => Some(named),
            _ => None,
        }
    }
}

impl NamedType {
    /// A named type without generic arguments.
    pub fn plain(name: impl Into<String>, location: Location) -> Self {
        NamedType {
            name: name.into(),
            generics: Generics::default(),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{Node, NodeGroup, NodeKind};
    use crate::parser::token::Position;

    fn named(name: &str) -> Type {
        Type::Named(NamedType::plain(
            name,
            Location::new(Position::new(1, 1), Position::new(1, 4)),
        ))
    }

    #[test]
    fn test_raw_pointer_is_mutable_and_escaping() {
        let pointer = RawPointer {
            dynamic: false,
            inner: Box::new(named("Foo")),
            location: Location::default(),
        };
        assert!(pointer.mutable());
        assert!(pointer.escaping());
        assert!(!pointer.is_dyn());
    }

    #[test]
    fn test_slice_is_never_dyn() {
        let slice = Type::Slice(SliceType {
            mutable: true,
            escaping: true,
            element: Box::new(named("u8")),
            location: Location::default(),
        });
        let view = slice.as_reference().unwrap();
        assert!(view.mutable());
        assert!(!view.is_dyn());
        assert_eq!(view.inner_type().as_named().unwrap().name, "u8");
    }

    #[test]
    fn test_type_kinds() {
        let reference = Type::ImmutableReference(ImmutableReference {
            escaping: false,
            dynamic: true,
            inner: Box::new(named("Foo")),
            location: Location::default(),
        });
        assert_eq!(reference.kind(), NodeKind::ImmutableReferenceType);
        assert_eq!(reference.group(), NodeGroup::Type);
        assert!(named("Foo").as_reference().is_none());
    }
}
