//! The graph type model: named types, type references, and the
//! input/output segregation rules.

use crate::error::TypeConfigError;
use lyra_parser::Grammar;
use lyra_parser::Name;
use std::sync::OnceLock;

mod builder;
mod complex;

pub use builder::FieldBuilder;
pub use complex::ComplexKind;
pub use complex::ComplexType;
pub use complex::FieldType;

/// A type reference as written in a schema or document, e.g. `[Episode!]!`.
pub use lyra_parser::ast::Type as TypeRef;

/// Parse a type reference from its GraphQL notation.
pub fn parse_type_ref(source: &str) -> Result<TypeRef, TypeConfigError> {
    static GRAMMAR: OnceLock<Grammar> = OnceLock::new();
    Ok(GRAMMAR.get_or_init(Grammar::new).parse_type(source)?)
}

/// The kind of a named type, deciding where it may appear.
///
/// Input positions (argument and input object field types) accept scalars,
/// enums, and input objects; output positions accept everything except input
/// objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Scalar,
    Enum,
    Object,
    Interface,
    Union,
    InputObject,
}

impl TypeKind {
    pub fn is_input(self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject)
    }

    pub fn is_output(self) -> bool {
        !matches!(self, TypeKind::InputObject)
    }

    pub fn describe(self) -> &'static str {
        match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Enum => "enum",
            TypeKind::Object => "object",
            TypeKind::Interface => "interface",
            TypeKind::Union => "union",
            TypeKind::InputObject => "input object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarType {
    pub name: Name,
    pub description: Option<String>,
}

impl ScalarType {
    pub fn new(name: &str) -> Result<Self, TypeConfigError> {
        Ok(Self {
            name: Name::new(name)?,
            description: None,
        })
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: Name,
    pub description: Option<String>,
    pub values: Vec<Name>,
}

impl EnumType {
    pub fn new<'a>(
        name: &str,
        values: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, TypeConfigError> {
        Ok(Self {
            name: Name::new(name)?,
            description: None,
            values: values
                .into_iter()
                .map(Name::new)
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionType {
    pub name: Name,
    pub description: Option<String>,
    pub members: Vec<Name>,
}

impl UnionType {
    pub fn new<'a>(
        name: &str,
        members: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, TypeConfigError> {
        Ok(Self {
            name: Name::new(name)?,
            description: None,
            members: members
                .into_iter()
                .map(Name::new)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Any registrable named type.
#[derive(Debug, Clone, PartialEq)]
pub enum NamedType {
    Scalar(ScalarType),
    Enum(EnumType),
    Union(UnionType),
    Complex(ComplexType),
}

impl NamedType {
    pub fn name(&self) -> &Name {
        match self {
            NamedType::Scalar(s) => &s.name,
            NamedType::Enum(e) => &e.name,
            NamedType::Union(u) => &u.name,
            NamedType::Complex(c) => &c.name,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            NamedType::Scalar(_) => TypeKind::Scalar,
            NamedType::Enum(_) => TypeKind::Enum,
            NamedType::Union(_) => TypeKind::Union,
            NamedType::Complex(c) => c.kind.type_kind(),
        }
    }
}

impl From<ScalarType> for NamedType {
    fn from(ty: ScalarType) -> Self {
        NamedType::Scalar(ty)
    }
}

impl From<EnumType> for NamedType {
    fn from(ty: EnumType) -> Self {
        NamedType::Enum(ty)
    }
}

impl From<UnionType> for NamedType {
    fn from(ty: UnionType) -> Self {
        NamedType::Union(ty)
    }
}

impl From<ComplexType> for NamedType {
    fn from(ty: ComplexType) -> Self {
        NamedType::Complex(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_output_segregation_by_kind() {
        assert!(TypeKind::Scalar.is_input());
        assert!(TypeKind::Scalar.is_output());
        assert!(TypeKind::InputObject.is_input());
        assert!(!TypeKind::InputObject.is_output());
        assert!(!TypeKind::Object.is_input());
        assert!(TypeKind::Object.is_output());
    }

    #[test]
    fn type_refs_parse_from_graphql_notation() {
        let ty = parse_type_ref("[Episode!]!").unwrap();
        assert_eq!(ty.to_string(), "[Episode!]!");
        assert_eq!(ty.innermost_name().as_str(), "Episode");
        assert!(parse_type_ref("[Episode").is_err());
    }
}
