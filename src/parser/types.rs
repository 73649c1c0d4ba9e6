//! Type annotation parsing
//!
//! ```text
//! type      := single ('|' single)*
//! single    := prefix* ref-body | '!' | '(' types ')' | '{' type ':' type '}'
//!            | '[' type ';' integer ']' | named
//! prefix    := 'escaping' | 'dyn'
//! ref-body  := ('const' | 'mut')? ('&' single | '[' ']' single) | '*' single
//! named     := identifier ('<' generic (',' generic)* '>')?
//! generic   := identifier (':' named ('+' named)*)?
//! ```

use crate::parser::ast::*;
use crate::parser::error::{Diagnostic, Result};
use crate::parser::parse::Parser;
use crate::parser::token::{Position, Token, TokenGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutability {
    Const,
    Mut,
}

/// Flags gathered from the keywords in front of a reference type.
#[derive(Debug, Clone, Copy, Default)]
struct ReferenceFlags {
    escaping: bool,
    dynamic: bool,
    mutability: Option<Mutability>,
}

impl ReferenceFlags {
    fn is_mutable(self) -> bool {
        self.mutability == Some(Mutability::Mut)
    }
}

const REFERENCE_OR_SLICE: [(char, TokenGroup); 2] =
    [('&', TokenGroup::Operator), ('[', TokenGroup::Grouping)];

const REFERENCE_OR_POINTER: [(char, TokenGroup); 2] =
    [('&', TokenGroup::Operator), ('*', TokenGroup::Operator)];

impl Parser {
    /// Parse a type, including untagged unions.
    pub(crate) fn parse_type(&mut self) -> Result<Type> {
        let start = self.next_start()?;
        let first = self.parse_single_type()?;

        if !self.check_operator("|")? {
            return Ok(first);
        }

        self.within(NodeKind::UntaggedUnionType, |p| {
            let mut types = vec![first];
            while p.match_operator("|")?.is_some() {
                types.push(p.parse_single_type()?);
            }
            Ok(Type::Union(UntaggedUnion {
                types,
                location: p.span_from(start),
            }))
        })
    }

    /// Parse a type without a trailing union, as used after `is` and `as`.
    pub(crate) fn parse_single_type(&mut self) -> Result<Type> {
        let token = self.peek_required()?;
        self.nested(token.location, |p| p.parse_type_form(token))
    }

    fn parse_type_form(&mut self, token: Token) -> Result<Type> {
        let start = token.start();

        if token.is_word("escaping")
            || token.is_word("dyn")
            || token.is_word("const")
            || token.is_word("mut")
            || token.is_char('&', TokenGroup::Operator)
            || token.is_char('*', TokenGroup::Operator)
        {
            return self.parse_reference_type(start, ReferenceFlags::default());
        }

        if token.is_char('!', TokenGroup::Operator) {
            self.advance()?;
            return Ok(Type::Never(NeverType {
                location: self.span_from(start),
            }));
        }

        if token.is_char('[', TokenGroup::Grouping) {
            return self.parse_slice_or_array_type(start, ReferenceFlags::default());
        }

        if token.is_char('(', TokenGroup::Grouping) {
            return self.parse_tuple_type(start);
        }

        if token.is_char('{', TokenGroup::Grouping) {
            return self.parse_table_type(start);
        }

        Ok(Type::Named(self.parse_named_type()?))
    }

    /// Reference prefixes, then `&`, `*` or `[]`.
    fn parse_reference_type(&mut self, start: Position, mut flags: ReferenceFlags) -> Result<Type> {
        loop {
            let token = self.peek_required()?;

            if token.is_word("escaping") {
                self.advance()?;
                flags.escaping = true;
            } else if token.is_word("dyn") {
                self.advance()?;
                flags.dynamic = true;
            } else if token.is_word("const") || token.is_word("mut") {
                self.advance()?;
                flags.mutability = Some(if token.is_word("mut") {
                    Mutability::Mut
                } else {
                    Mutability::Const
                });
                let next = self.peek_required()?;
                if next.is_char('&', TokenGroup::Operator) {
                    return self.parse_reference_body(start, flags);
                }
                if next.is_char('[', TokenGroup::Grouping) && !flags.dynamic {
                    return self.parse_slice_or_array_type(start, flags);
                }
                // After `dyn mut`, only a reference can follow.
                let candidates: &[(char, TokenGroup)] =
                    if flags.dynamic && next.is_char('[', TokenGroup::Grouping) {
                        &[('&', TokenGroup::Operator)]
                    } else {
                        &REFERENCE_OR_SLICE
                    };
                return Err(Diagnostic::ExpectedOneOfCharacters {
                    expected: candidates.to_vec(),
                    got: next,
                });
            } else if token.is_char('&', TokenGroup::Operator) {
                return self.parse_reference_body(start, flags);
            } else if token.is_char('*', TokenGroup::Operator) {
                return self.parse_raw_pointer(start, flags);
            } else if token.is_char('[', TokenGroup::Grouping) && !flags.dynamic {
                return self.parse_slice_or_array_type(start, flags);
            } else {
                let candidates: &[(char, TokenGroup)] = if flags.dynamic {
                    &REFERENCE_OR_POINTER
                } else {
                    &[
                        ('&', TokenGroup::Operator),
                        ('*', TokenGroup::Operator),
                        ('[', TokenGroup::Grouping),
                    ]
                };
                return Err(Diagnostic::ExpectedOneOfCharacters {
                    expected: candidates.to_vec(),
                    got: token,
                });
            }
        }
    }

    /// `&` followed by the referenced type.
    fn parse_reference_body(&mut self, start: Position, flags: ReferenceFlags) -> Result<Type> {
        let kind = if flags.is_mutable() {
            NodeKind::MutableReferenceType
        } else {
            NodeKind::ImmutableReferenceType
        };

        self.within(kind, |p| {
            p.expect_operator('&')?;
            let inner = Box::new(p.parse_single_type()?);
            let location = p.span_from(start);

            Ok(if flags.is_mutable() {
                Type::MutableReference(MutableReference {
                    escaping: flags.escaping,
                    dynamic: flags.dynamic,
                    inner,
                    location,
                })
            } else {
                Type::ImmutableReference(ImmutableReference {
                    escaping: flags.escaping,
                    dynamic: flags.dynamic,
                    inner,
                    location,
                })
            })
        })
    }

    fn parse_raw_pointer(&mut self, start: Position, flags: ReferenceFlags) -> Result<Type> {
        self.within(NodeKind::RawPointerType, |p| {
            p.expect_operator('*')?;
            let inner = Box::new(p.parse_single_type()?);
            Ok(Type::RawPointer(RawPointer {
                dynamic: flags.dynamic,
                inner,
                location: p.span_from(start),
            }))
        })
    }

    /// `[]T` is a slice; `[T; N]` is a fixed-length array. Arrays take no
    /// reference prefixes.
    fn parse_slice_or_array_type(
        &mut self,
        start: Position,
        flags: ReferenceFlags,
    ) -> Result<Type> {
        self.expect_grouping('[')?;

        if self.check_char(']', TokenGroup::Grouping)? || flags.mutability.is_some() || flags.escaping
        {
            return self.within(NodeKind::SliceType, |p| {
                p.expect_grouping(']')?;
                let element = Box::new(p.parse_single_type()?);
                Ok(Type::Slice(SliceType {
                    mutable: flags.is_mutable(),
                    escaping: flags.escaping,
                    element,
                    location: p.span_from(start),
                }))
            });
        }

        self.within(NodeKind::ArrayType, |p| {
            let element = Box::new(p.parse_type()?);
            p.expect_separator(';')?;
            let length_token = p.expect_token_of_group(TokenGroup::Integer)?;
            let length = parse_length(&length_token)?;
            p.expect_grouping(']')?;
            Ok(Type::Array(ArrayType {
                element,
                length,
                location: p.span_from(start),
            }))
        })
    }

    fn parse_tuple_type(&mut self, start: Position) -> Result<Type> {
        self.within(NodeKind::TupleType, |p| {
            p.expect_grouping('(')?;
            let mut elements = Vec::new();
            if !p.check_char(')', TokenGroup::Grouping)? {
                loop {
                    elements.push(p.parse_type()?);
                    if !p.match_char(',', TokenGroup::Separator)? {
                        break;
                    }
                }
            }
            p.expect_grouping(')')?;
            Ok(Type::Tuple(TupleType {
                elements,
                location: p.span_from(start),
            }))
        })
    }

    fn parse_table_type(&mut self, start: Position) -> Result<Type> {
        self.within(NodeKind::TableType, |p| {
            p.expect_grouping('{')?;
            let key = Box::new(p.parse_type()?);
            p.expect_separator(':')?;
            let value = Box::new(p.parse_type()?);
            p.expect_grouping('}')?;
            Ok(Type::Table(TableType {
                key,
                value,
                location: p.span_from(start),
            }))
        })
    }

    /// Identifier with optional generic arguments.
    pub(crate) fn parse_named_type(&mut self) -> Result<NamedType> {
        self.within(NodeKind::NamedType, |p| {
            let name_token = p.expect_token_of_group(TokenGroup::Identifier)?;
            let start = name_token.start();
            let generics = if p.check_char('<', TokenGroup::Operator)? {
                p.parse_generics()?
            } else {
                Generics::default()
            };

            Ok(NamedType {
                name: name_token.characters,
                generics,
                location: p.span_from(start),
            })
        })
    }

    /// `<T: A + B, U>`
    pub(crate) fn parse_generics(&mut self) -> Result<Generics> {
        self.expect_operator('<')?;
        let mut generics = Generics::default();

        loop {
            let name = self.expect_identifier()?;
            let mut generic = TypeGeneric::default();

            if self.match_char(':', TokenGroup::Separator)? {
                loop {
                    generic.conforms_to.push(self.parse_named_type()?);
                    if !self.match_char('+', TokenGroup::Operator)? {
                        break;
                    }
                }
            }

            generics.insert(name, generic);
            if !self.match_char(',', TokenGroup::Separator)? {
                break;
            }
        }

        self.expect_operator('>')?;
        Ok(generics)
    }
}

fn parse_length(token: &crate::parser::token::Token) -> Result<u64> {
    token
        .characters
        .parse::<u64>()
        .map_err(|_| Diagnostic::InvalidIntegerLiteral {
            literal: token.characters.clone(),
            radix: 10,
            location: token.location,
        })
}
