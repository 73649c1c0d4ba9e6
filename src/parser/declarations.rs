//! Declaration parsing implementation
//!
//! This module handles parsing of imports and definitions:
//!
//! - Imports: `import a:b:c;`
//! - Function definitions: `fn name<T>(a T, b i32) i32 { ... }`
//! - External functions: `extern fn name(a i32) i32;`
//! - Struct definitions: `struct Name { mut x i32, y i32 }`
//! - Variables: `const|var|let name Type? = value;`
//!
//! # Grammar
//!
//! ```text
//! import   ::= "import" identifier (":" identifier)* ";"
//! function ::= "fn" identifier generics? "(" params ")" type? block
//! extern   ::= "extern" "fn" identifier "(" params ")" type? ";"
//! struct   ::= "struct" identifier "{" (field ("," field)* ","?)? "}"
//! field    ::= "mut"? identifier type
//! variable ::= ("const" | "var" | "let") identifier type? "=" expression ";"
//! params   ::= (identifier type ("," identifier type)*)?
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use rustc_hash::FxHashMap;

use crate::parser::ast::*;
use crate::parser::error::{Diagnostic, Result};
use crate::parser::parse::Parser;
use crate::parser::token::TokenGroup;

impl Parser {
    /// Parse `import a:b:c;`
    ///
    /// The path ends where a `:` was expected and a `;` was found.
    pub(crate) fn parse_import(&mut self) -> Result<ImportStatement> {
        self.within(NodeKind::ImportStatement, |p| {
            let start = p.expect_keyword("import")?.start();
            let mut path = vec![p.expect_identifier()?];

            loop {
                match p.expect_separator(':') {
                    Ok(_) => path.push(p.expect_identifier()?),
                    Err(Diagnostic::ExpectedCharacter { got, .. })
                        if got.is_char(';', TokenGroup::Separator) =>
                    {
                        break
                    }
                    Err(err) => return Err(err),
                }
            }

            Ok(ImportStatement {
                path,
                location: p.span_from(start),
            })
        })
    }

    /// Parse function definition: fn name<generics>(params) return_type { body }
    pub(crate) fn parse_function_definition(&mut self) -> Result<FunctionDefinition> {
        self.within(NodeKind::FunctionDefinition, |p| {
            let start = p.expect_keyword("fn")?.start();
            let name = p.expect_identifier()?;

            let generics = if p.check_char('<', TokenGroup::Operator)? {
                p.parse_generics()?
            } else {
                Generics::default()
            };

            let (parameters, parameter_order) = p.parse_parameter_list()?;

            // A `{` always opens the body.
            let return_type = if p.check_char('{', TokenGroup::Grouping)? {
                None
            } else {
                Some(p.parse_type()?)
            };

            let body = p.parse_block()?;

            Ok(FunctionDefinition {
                name,
                parameters,
                parameter_order,
                return_type,
                generics,
                body,
                location: p.span_from(start),
            })
        })
    }

    /// Parse `extern fn name(params) return_type;`
    pub(crate) fn parse_external_fn(&mut self) -> Result<ExternalFnDeclaration> {
        self.within(NodeKind::ExternalFnDeclaration, |p| {
            let start = p.expect_keyword("extern")?.start();
            p.expect_keyword("fn")?;
            let name = p.expect_identifier()?;
            let (parameters, parameter_order) = p.parse_parameter_list()?;

            let return_type = if p.check_char(';', TokenGroup::Separator)? {
                None
            } else {
                Some(p.parse_type()?)
            };
            p.expect_semicolon()?;

            Ok(ExternalFnDeclaration {
                name,
                parameters,
                parameter_order,
                return_type,
                location: p.span_from(start),
            })
        })
    }

    /// Parse parameter list: (name type, name type, ...)
    pub(crate) fn parse_parameter_list(
        &mut self,
    ) -> Result<(FxHashMap<String, Type>, Vec<String>)> {
        self.expect_grouping('(')?;

        let mut parameters = FxHashMap::default();
        let mut order = Vec::new();

        if !self.check_char(')', TokenGroup::Grouping)? {
            loop {
                let name = self.expect_identifier()?;
                let param_type = self.parse_type()?;
                if parameters.insert(name.clone(), param_type).is_none() {
                    order.push(name);
                }

                if !self.match_char(',', TokenGroup::Separator)? {
                    break;
                }
            }
        }

        self.expect_grouping(')')?;
        Ok((parameters, order))
    }

    /// Parse struct definition: struct Name { fields }
    pub(crate) fn parse_struct_definition(&mut self) -> Result<StructureDefinition> {
        self.within(NodeKind::StructureDefinition, |p| {
            let start = p.expect_keyword("struct")?.start();
            let name = p.expect_identifier()?;
            p.expect_grouping('{')?;

            let mut fields = Vec::new();
            while !p.check_char('}', TokenGroup::Grouping)? {
                let field_start = p.next_start()?;
                let is_mutable = p.match_word("mut")?;
                let field_name = p.expect_identifier()?;
                let field_type = p.parse_type()?;

                fields.push(StructureField {
                    name: field_name,
                    is_mutable,
                    field_type,
                    location: p.span_from(field_start),
                });

                if !p.match_char(',', TokenGroup::Separator)? {
                    break;
                }
            }

            p.expect_grouping('}')?;

            Ok(StructureDefinition {
                name,
                fields,
                location: p.span_from(start),
            })
        })
    }

    /// Parse `const|var|let name Type? = value;`
    pub(crate) fn parse_variable_definition(&mut self) -> Result<VariableDefinition> {
        let token = self.peek_required()?;
        let binding = match token.characters.as_str() {
            "const" => BindingKind::Const,
            "var" => BindingKind::Var,
            _ => BindingKind::Let,
        };
        let kind = match binding {
            BindingKind::Const => NodeKind::ConstDefinition,
            BindingKind::Var => NodeKind::VarDefinition,
            BindingKind::Let => NodeKind::LetDefinition,
        };

        self.within(kind, |p| {
            let start = p.expect_keyword(binding.keyword())?.start();
            let name = p.expect_identifier()?;

            let value_type = if p.check_char('=', TokenGroup::Operator)? {
                None
            } else {
                Some(p.parse_type()?)
            };

            p.expect_operator('=')?;
            let value = p.parse_expression()?;
            p.expect_semicolon()?;

            Ok(VariableDefinition {
                binding,
                name,
                value,
                value_type,
                location: p.span_from(start),
            })
        })
    }
}
