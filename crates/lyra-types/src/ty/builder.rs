use crate::error::TypeConfigError;
use crate::ty::parse_type_ref;
use crate::ty::FieldType;
use crate::ty::TypeKind;
use crate::ty::TypeRef;
use crate::InputValue;
use lyra_parser::Name;

/// Fluent front end for constructing a [`FieldType`].
///
/// Sugar only: the invariant checks live in
/// [`ComplexType::add_field`][crate::ty::ComplexType::add_field] and in
/// [`build`][Self::build], which validates the name and parses the declared
/// type reference.
///
/// ```
/// use lyra_types::ty::FieldBuilder;
///
/// let field = FieldBuilder::new("age")
///     .of_type("Int")
///     .description("Age in years")
///     .build()
///     .unwrap();
/// assert_eq!(field.name.as_str(), "age");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldBuilder {
    name: String,
    ty_source: Option<String>,
    ty: Option<TypeRef>,
    resolved_kind: Option<TypeKind>,
    description: Option<String>,
    default_value: Option<InputValue>,
    deprecation_reason: Option<String>,
    target_member: Option<String>,
}

impl FieldBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Declare the field's type in GraphQL notation, e.g. `"[Item!]"`.
    pub fn of_type(mut self, ty: &str) -> Self {
        self.ty_source = Some(ty.to_owned());
        self
    }

    /// Declare the field's type as an already-built reference.
    pub fn of_type_ref(mut self, ty: TypeRef) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Mark the field's type kind as resolved out of band, without a
    /// reference into the registry.
    pub fn resolved(mut self, kind: TypeKind) -> Self {
        self.resolved_kind = Some(kind);
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    pub fn default_value(mut self, value: InputValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn deprecated(mut self, reason: &str) -> Self {
        self.deprecation_reason = Some(reason.to_owned());
        self
    }

    /// Bind this field to a differently-named member of the bound Rust type
    /// during input coercion.
    pub fn bind_to(mut self, member: &str) -> Self {
        self.target_member = Some(member.to_owned());
        self
    }

    pub fn build(self) -> Result<FieldType, TypeConfigError> {
        let ty = match (self.ty, self.ty_source) {
            (Some(ty), _) => Some(ty),
            (None, Some(source)) => Some(parse_type_ref(&source)?),
            (None, None) => None,
        };
        Ok(FieldType {
            name: Name::new(&self.name)?,
            ty,
            resolved_kind: self.resolved_kind,
            description: self.description,
            default_value: self.default_value,
            deprecation_reason: self.deprecation_reason,
            target_member: self.target_member,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_validates_name_and_type_syntax() {
        assert!(FieldBuilder::new("1bad").of_type("Int").build().is_err());
        assert!(FieldBuilder::new("ok").of_type("[Int").build().is_err());
        let field = FieldBuilder::new("ok").of_type("[Int!]").build().unwrap();
        assert_eq!(field.ty.unwrap().to_string(), "[Int!]");
    }

    #[test]
    fn target_member_defaults_to_the_field_name() {
        let plain = FieldBuilder::new("name").of_type("String").build().unwrap();
        assert_eq!(plain.member_name(), "name");
        let bound = FieldBuilder::new("fullName")
            .of_type("String")
            .bind_to("name")
            .build()
            .unwrap();
        assert_eq!(bound.member_name(), "name");
    }
}
