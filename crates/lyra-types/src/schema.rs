//! Type registration and schema finalization.
//!
//! [`SchemaBuilder`] collects named types and Rust-type bindings, then
//! [`build`][SchemaBuilder::build] finalizes eagerly: coercion plans and
//! input converters are constructed up front so every configuration error
//! surfaces before the first request is served.

use crate::coerce::CoercionPlan;
use crate::coerce::DefaultValueConverter;
use crate::coerce::InputConverter;
use crate::coerce::ValueConverter;
use crate::error::TypeConfigError;
use crate::ty::ComplexKind;
use crate::ty::ComplexType;
use crate::ty::NamedType;
use crate::ty::ScalarType;
use crate::ty::TypeKind;
use crate::ty::TypeRef;
use indexmap::IndexMap;
use lyra_parser::Name;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// All named types of a schema, in registration order, with the built-in
/// scalars pre-registered.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRegistry {
    types: IndexMap<String, NamedType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            types: IndexMap::new(),
        };
        for builtin in ["Int", "Float", "String", "Boolean", "ID"] {
            let scalar = ScalarType {
                name: Name::new_unchecked(builtin.to_owned()),
                description: None,
            };
            registry.types.insert(builtin.to_owned(), scalar.into());
        }
        registry
    }

    pub fn register(&mut self, ty: NamedType) -> Result<(), TypeConfigError> {
        let name = ty.name().as_str().to_owned();
        if self.types.contains_key(&name) {
            return Err(TypeConfigError::DuplicateType(name));
        }
        self.types.insert(name, ty);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }

    pub fn complex(&self, name: &str) -> Option<&ComplexType> {
        match self.types.get(name) {
            Some(NamedType::Complex(ty)) => Some(ty),
            _ => None,
        }
    }

    /// The kind of the named type at the core of a reference, through list
    /// and non-null wrappers.
    pub fn kind_of(&self, ty: &TypeRef) -> Option<TypeKind> {
        self.get(ty.innermost_name().as_str()).map(NamedType::kind)
    }

    pub fn is_input_type(&self, ty: &TypeRef) -> bool {
        self.kind_of(ty).is_some_and(TypeKind::is_input)
    }

    pub fn is_output_type(&self, ty: &TypeRef) -> bool {
        self.kind_of(ty).is_some_and(TypeKind::is_output)
    }

    /// All registered types, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &NamedType> {
        self.types.values()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, immutable schema internals handed to every converter.
pub(crate) struct SchemaInner {
    pub(crate) registry: TypeRegistry,
    pub(crate) plans: HashMap<String, Arc<CoercionPlan>>,
    pub(crate) value_converter: Arc<dyn ValueConverter>,
}

type BindingBuilder =
    Box<dyn FnOnce(&Arc<SchemaInner>) -> Result<Box<dyn Any + Send + Sync>, TypeConfigError>>;

/// Collects types and bindings; finalized with [`build`][Self::build].
pub struct SchemaBuilder {
    registry: TypeRegistry,
    value_converter: Arc<dyn ValueConverter>,
    bindings: Vec<(String, BindingBuilder)>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::new(),
            value_converter: Arc::new(DefaultValueConverter),
            bindings: Vec::new(),
        }
    }

    pub fn register(mut self, ty: impl Into<NamedType>) -> Result<Self, TypeConfigError> {
        self.registry.register(ty.into())?;
        Ok(self)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Replace the scalar fallback converter used when a supplied value
    /// does not already match its declared scalar shape.
    pub fn with_value_converter(mut self, converter: impl ValueConverter + 'static) -> Self {
        self.value_converter = Arc::new(converter);
        self
    }

    /// Bind the input object type `type_name` to the Rust type `T`. The
    /// converter is built during [`build`][Self::build]; an unresolvable
    /// member or a missing input type fails there, not per request.
    pub fn bind_input<T>(mut self, type_name: &str) -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let name = type_name.to_owned();
        let builder = Box::new(move |inner: &Arc<SchemaInner>| {
            let plan = inner
                .plans
                .get(&name)
                .ok_or_else(|| TypeConfigError::NotInputObject(name.clone()))?;
            let converter = InputConverter::<T>::build(Arc::clone(inner), Arc::clone(plan))?;
            Ok(Box::new(converter) as Box<dyn Any + Send + Sync>)
        });
        self.bindings.push((type_name.to_owned(), builder));
        self
    }

    /// Finalize the schema. Builds a coercion plan for every input object
    /// type and an input converter for every binding; the first
    /// configuration error aborts the build.
    pub fn build(self) -> Result<Schema, TypeConfigError> {
        let mut plans = HashMap::new();
        for ty in self.registry.iter() {
            if let NamedType::Complex(ct) = ty {
                if ct.kind == ComplexKind::InputObject {
                    tracing::debug!(ty = %ct.name, "building coercion plan");
                    let plan = CoercionPlan::build(&self.registry, ct)?;
                    plans.insert(ct.name.as_str().to_owned(), Arc::new(plan));
                }
            }
        }
        let inner = Arc::new(SchemaInner {
            registry: self.registry,
            plans,
            value_converter: self.value_converter,
        });
        crate::coerce::validate_defaults(&inner)?;
        let mut converters = HashMap::new();
        for (name, builder) in self.bindings {
            tracing::debug!(ty = %name, "building input converter");
            converters.insert(name, builder(&inner)?);
        }
        Ok(Schema { inner, converters })
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A finalized, immutable schema.
///
/// Holds the registry plus one pre-built [`InputConverter`] per bound input
/// type. Converters belong to this schema instance: another schema binding
/// the same Rust type keeps its own, independent mapping.
pub struct Schema {
    inner: Arc<SchemaInner>,
    converters: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema").finish_non_exhaustive()
    }
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.inner.registry
    }

    /// The pre-built converter for `type_name`, downcast to its bound type.
    pub fn input_converter<T: 'static>(
        &self,
        type_name: &str,
    ) -> Result<&InputConverter<T>, TypeConfigError> {
        let converter = self
            .converters
            .get(type_name)
            .ok_or_else(|| TypeConfigError::NoConverter(type_name.to_owned()))?;
        converter
            .downcast_ref::<InputConverter<T>>()
            .ok_or_else(|| TypeConfigError::BoundTypeMismatch {
                ty: type_name.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::parse_type_ref;

    #[test]
    fn builtin_scalars_are_preregistered() {
        let registry = TypeRegistry::new();
        for name in ["Int", "Float", "String", "Boolean", "ID"] {
            assert_eq!(registry.get(name).map(NamedType::kind), Some(TypeKind::Scalar));
        }
        assert!(registry.get("Episode").is_none());
    }

    #[test]
    fn duplicate_type_names_are_rejected() {
        let mut registry = TypeRegistry::new();
        registry
            .register(ComplexType::object("Query").unwrap().into())
            .unwrap();
        let err = registry
            .register(ComplexType::object("Query").unwrap().into())
            .unwrap_err();
        assert_eq!(err, TypeConfigError::DuplicateType("Query".to_owned()));
    }

    #[test]
    fn type_references_resolve_through_wrappers() {
        let registry = TypeRegistry::new();
        let ty = parse_type_ref("[Int!]!").unwrap();
        assert_eq!(registry.kind_of(&ty), Some(TypeKind::Scalar));
        assert!(registry.is_input_type(&ty));
        assert!(registry.is_output_type(&ty));
        assert!(!registry.is_input_type(&parse_type_ref("Missing").unwrap()));
    }

    #[test]
    fn binding_a_non_input_type_fails_at_build() {
        let err = SchemaBuilder::new()
            .bind_input::<std::collections::HashMap<String, i32>>("Nope")
            .build()
            .unwrap_err();
        assert_eq!(err, TypeConfigError::NotInputObject("Nope".to_owned()));
    }
}
