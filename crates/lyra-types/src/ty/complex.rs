use crate::error::TypeConfigError;
use crate::schema::TypeRegistry;
use crate::ty::TypeKind;
use crate::ty::TypeRef;
use crate::InputValue;
use lyra_parser::Name;
use std::fmt;

/// The flavor of a [`ComplexType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplexKind {
    Object,
    Interface,
    InputObject,
}

impl ComplexKind {
    pub fn type_kind(self) -> TypeKind {
        match self {
            ComplexKind::Object => TypeKind::Object,
            ComplexKind::Interface => TypeKind::Interface,
            ComplexKind::InputObject => TypeKind::InputObject,
        }
    }

    fn sdl_keyword(self) -> &'static str {
        match self {
            ComplexKind::Object => "type",
            ComplexKind::Interface => "interface",
            ComplexKind::InputObject => "input",
        }
    }
}

/// One declared field of a complex type.
///
/// Type information comes in one of two forms: a declared [`TypeRef`]
/// resolved against the registry, or an already-resolved [`TypeKind`] for
/// fields whose type is known out of band. At least one must be present.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldType {
    pub name: Name,
    pub ty: Option<TypeRef>,
    pub resolved_kind: Option<TypeKind>,
    pub description: Option<String>,
    pub default_value: Option<InputValue>,
    pub deprecation_reason: Option<String>,
    /// Overrides the target member this field binds to during input
    /// coercion; the GraphQL field name is used when absent.
    pub target_member: Option<String>,
}

impl FieldType {
    pub fn new(name: &str, ty: TypeRef) -> Result<Self, TypeConfigError> {
        Ok(Self {
            name: Name::new(name)?,
            ty: Some(ty),
            resolved_kind: None,
            description: None,
            default_value: None,
            deprecation_reason: None,
            target_member: None,
        })
    }

    /// The member name input coercion binds this field to.
    pub fn member_name(&self) -> &str {
        self.target_member.as_deref().unwrap_or(self.name.as_str())
    }
}

/// An object, interface, or input object type: a named, ordered collection
/// of fields with add-time validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexType {
    pub name: Name,
    pub kind: ComplexKind,
    pub description: Option<String>,
    fields: Vec<FieldType>,
}

impl ComplexType {
    pub fn new(kind: ComplexKind, name: &str) -> Result<Self, TypeConfigError> {
        Ok(Self {
            name: Name::new(name)?,
            kind,
            description: None,
            fields: Vec::new(),
        })
    }

    pub fn object(name: &str) -> Result<Self, TypeConfigError> {
        Self::new(ComplexKind::Object, name)
    }

    pub fn interface(name: &str) -> Result<Self, TypeConfigError> {
        Self::new(ComplexKind::Interface, name)
    }

    pub fn input_object(name: &str) -> Result<Self, TypeConfigError> {
        Self::new(ComplexKind::InputObject, name)
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// Add a field, validating it against this type and the registry.
    ///
    /// Rejects a field that duplicates an existing name (ordinal comparison:
    /// case variants are distinct fields and both survive), carries no type
    /// information, references a type the registry does not know, or lands
    /// on the wrong side of the input/output segregation rules.
    pub fn add_field(
        &mut self,
        registry: &TypeRegistry,
        field: FieldType,
    ) -> Result<(), TypeConfigError> {
        if self.has_field(field.name.as_str()) {
            return Err(TypeConfigError::DuplicateField {
                ty: self.name.to_string(),
                field: field.name.to_string(),
            });
        }
        let field_kind = match (field.resolved_kind, &field.ty) {
            (Some(kind), _) => kind,
            (None, Some(ty)) => {
                registry
                    .kind_of(ty)
                    .ok_or_else(|| TypeConfigError::UnknownType {
                        ty: self.name.to_string(),
                        name: ty.innermost_name().to_string(),
                    })?
            }
            (None, None) => {
                return Err(TypeConfigError::MissingTypeInfo {
                    ty: self.name.to_string(),
                    field: field.name.to_string(),
                })
            }
        };
        let ok = match self.kind {
            ComplexKind::InputObject => field_kind.is_input(),
            ComplexKind::Object | ComplexKind::Interface => field_kind.is_output(),
        };
        if !ok {
            let expected = match self.kind {
                ComplexKind::InputObject => "an input type",
                _ => "an output type",
            };
            return Err(TypeConfigError::KindMismatch {
                ty: self.name.to_string(),
                type_kind: self.kind.type_kind().describe(),
                field: field.name.to_string(),
                expected,
            });
        }
        self.fields.push(field);
        Ok(())
    }

    /// Linear scan, preserving insertion order. Field counts are tens, not
    /// thousands, so no secondary index is kept.
    pub fn get_field(&self, name: &str) -> Option<&FieldType> {
        self.fields.iter().find(|field| field.name == *name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// All fields, in the order they were added.
    pub fn fields(&self) -> &[FieldType] {
        &self.fields
    }
}

impl fmt::Display for ComplexType {
    /// SDL-style rendering, fields in insertion order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {{", self.kind.sdl_keyword(), self.name)?;
        for field in &self.fields {
            write!(f, "  {}", field.name)?;
            match &field.ty {
                Some(ty) => write!(f, ": {ty}")?,
                None => {
                    if let Some(kind) = field.resolved_kind {
                        write!(f, ": <{}>", kind.describe())?;
                    }
                }
            }
            if let Some(default) = &field.default_value {
                write!(f, " = {default}")?;
            }
            if field.deprecation_reason.is_some() {
                write!(f, " @deprecated")?;
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::FieldBuilder;
    use expect_test::expect;
    use pretty_assertions::assert_eq;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
    }

    fn string_field(name: &str) -> FieldType {
        FieldBuilder::new(name).of_type("String").build().unwrap()
    }

    #[test]
    fn duplicate_field_names_are_rejected_ordinally() {
        let registry = registry();
        let mut ty = ComplexType::input_object("Person").unwrap();
        ty.add_field(&registry, string_field("name")).unwrap();
        let err = ty.add_field(&registry, string_field("name")).unwrap_err();
        assert_eq!(
            err,
            TypeConfigError::DuplicateField {
                ty: "Person".to_owned(),
                field: "name".to_owned(),
            }
        );
        // Case variants are distinct fields; both survive.
        ty.add_field(&registry, string_field("Name")).unwrap();
        assert_eq!(ty.fields().len(), 2);
        assert!(ty.has_field("Name"));
    }

    #[test]
    fn input_objects_reject_output_typed_fields() {
        let mut registry = registry();
        let mut hero = ComplexType::object("Hero").unwrap();
        hero.add_field(&registry, string_field("name")).unwrap();
        registry.register(hero.into()).unwrap();

        let mut input = ComplexType::input_object("HeroInput").unwrap();
        let err = input
            .add_field(
                &registry,
                FieldBuilder::new("hero").of_type("Hero").build().unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, TypeConfigError::KindMismatch { .. }));
    }

    #[test]
    fn objects_reject_input_object_typed_fields() {
        let mut registry = registry();
        let mut filter = ComplexType::input_object("Filter").unwrap();
        filter.add_field(&registry, string_field("q")).unwrap();
        registry.register(filter.into()).unwrap();

        let mut query = ComplexType::object("Query").unwrap();
        let err = query
            .add_field(
                &registry,
                FieldBuilder::new("filter").of_type("Filter").build().unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, TypeConfigError::KindMismatch { .. }));
    }

    #[test]
    fn a_field_needs_type_information() {
        let registry = registry();
        let mut ty = ComplexType::object("Query").unwrap();
        let bare = FieldBuilder::new("mystery").build().unwrap();
        assert_eq!(
            ty.add_field(&registry, bare).unwrap_err(),
            TypeConfigError::MissingTypeInfo {
                ty: "Query".to_owned(),
                field: "mystery".to_owned(),
            }
        );
        // A resolved kind alone is enough.
        let resolved = FieldBuilder::new("mystery")
            .resolved(TypeKind::Scalar)
            .build()
            .unwrap();
        ty.add_field(&registry, resolved).unwrap();
    }

    #[test]
    fn unknown_type_references_are_rejected() {
        let registry = registry();
        let mut ty = ComplexType::object("Query").unwrap();
        let err = ty
            .add_field(
                &registry,
                FieldBuilder::new("hero").of_type("Hero").build().unwrap(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            TypeConfigError::UnknownType {
                ty: "Query".to_owned(),
                name: "Hero".to_owned(),
            }
        );
    }

    #[test]
    fn get_field_preserves_insertion_order() {
        let registry = registry();
        let mut ty = ComplexType::input_object("Person").unwrap();
        for name in ["b", "a", "c"] {
            ty.add_field(&registry, string_field(name)).unwrap();
        }
        let order: Vec<_> = ty.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(order, ["b", "a", "c"]);
        assert_eq!(ty.get_field("a").unwrap().name, "a");
        assert!(ty.get_field("missing").is_none());
    }

    #[test]
    fn sdl_display() {
        let registry = registry();
        let mut ty = ComplexType::input_object("Person").unwrap();
        ty.add_field(&registry, string_field("name")).unwrap();
        ty.add_field(
            &registry,
            FieldBuilder::new("age")
                .of_type("Int")
                .default_value(InputValue::Int(0))
                .build()
                .unwrap(),
        )
        .unwrap();
        expect![[r#"
            input Person {
              name: String
              age: Int = 0
            }"#]]
        .assert_eq(&ty.to_string());
    }
}
