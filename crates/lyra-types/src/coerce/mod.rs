//! The input object coercion engine.
//!
//! For every registered input object type the schema builds a
//! [`CoercionPlan`] (field → member mapping) at finalization, and for every
//! bound Rust type an [`InputConverter<T>`]: a pure, `Send + Sync` function
//! value from a supplied input map to a `T`. All configuration errors —
//! unresolvable members, member collisions, unknown type references —
//! surface while the schema is being built, never per request.

mod de;
mod probe;

use crate::error::CoercionError;
use crate::error::TypeConfigError;
use crate::schema::SchemaInner;
use crate::ty::ComplexKind;
use crate::ty::ComplexType;
use crate::ty::NamedType;
use crate::ty::TypeRef;
use crate::InputValue;
use crate::schema::TypeRegistry;
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use rust_decimal::prelude::ToPrimitive;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;

const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// The immutable field-to-member mapping for one input object type.
#[derive(Debug, Clone)]
pub(crate) struct CoercionPlan {
    pub(crate) type_name: String,
    pub(crate) fields: Vec<PlannedField>,
}

#[derive(Debug, Clone)]
pub(crate) struct PlannedField {
    pub(crate) graphql_name: String,
    pub(crate) member: String,
    pub(crate) ty: Option<TypeRef>,
    pub(crate) default_value: Option<InputValue>,
}

impl CoercionPlan {
    pub(crate) fn build(
        registry: &TypeRegistry,
        ty: &ComplexType,
    ) -> Result<Self, TypeConfigError> {
        debug_assert_eq!(ty.kind, ComplexKind::InputObject);
        let mut fields: Vec<PlannedField> = Vec::with_capacity(ty.fields().len());
        for field in ty.fields() {
            let member = field.member_name().to_owned();
            if let Some(existing) = fields
                .iter()
                .find(|planned| planned.member.eq_ignore_ascii_case(&member))
            {
                return Err(TypeConfigError::ConflictingMemberMapping {
                    ty: ty.name.to_string(),
                    first: existing.graphql_name.clone(),
                    second: field.name.to_string(),
                    member,
                });
            }
            if let Some(ty_ref) = &field.ty {
                let named = ty_ref.innermost_name();
                if registry.get(named.as_str()).is_none() {
                    return Err(TypeConfigError::UnknownType {
                        ty: ty.name.to_string(),
                        name: named.to_string(),
                    });
                }
            }
            fields.push(PlannedField {
                graphql_name: field.name.to_string(),
                member,
                ty: field.ty.clone(),
                default_value: field.default_value.clone(),
            });
        }
        Ok(Self {
            type_name: ty.name.to_string(),
            fields,
        })
    }
}

/// Coerce a supplied input map into a member-name-keyed map of coerced
/// values. Absent fields bind their declared default (coerced against the
/// field's type like any supplied value), or are left for the materializer
/// to default.
pub(crate) fn coerce_object(
    inner: &SchemaInner,
    plan: &CoercionPlan,
    input: &IndexMap<String, InputValue>,
) -> Result<IndexMap<String, InputValue>, CoercionError> {
    let mut out = IndexMap::with_capacity(plan.fields.len());
    for field in &plan.fields {
        // GraphQL field names are case-sensitive; the supplied key must
        // match exactly.
        match input.get(field.graphql_name.as_str()) {
            Some(value) => {
                let coerced =
                    coerce_value(inner, field.ty.as_ref(), value, &field.graphql_name)?;
                out.insert(field.member.clone(), coerced);
            }
            None => {
                if let Some(default) = &field.default_value {
                    let coerced =
                        coerce_value(inner, field.ty.as_ref(), default, &field.graphql_name)?;
                    out.insert(field.member.clone(), coerced);
                }
            }
        }
    }
    for key in input.keys() {
        if !plan.fields.iter().any(|field| field.graphql_name == *key) {
            tracing::debug!(ty = %plan.type_name, field = %key, "ignoring undeclared input field");
        }
    }
    Ok(out)
}

/// Check every declared field default against its field's type, so a
/// mis-typed default is a build-time configuration error rather than a
/// failure on the first request that omits the field.
pub(crate) fn validate_defaults(inner: &SchemaInner) -> Result<(), TypeConfigError> {
    for plan in inner.plans.values() {
        for field in &plan.fields {
            if let Some(default) = &field.default_value {
                coerce_value(inner, field.ty.as_ref(), default, &field.graphql_name).map_err(
                    |source| TypeConfigError::InvalidDefault {
                        ty: plan.type_name.clone(),
                        field: field.graphql_name.clone(),
                        message: source.to_string(),
                    },
                )?;
            }
        }
    }
    Ok(())
}

/// Coerce one value against its declared type, recursing structurally.
pub(crate) fn coerce_value(
    inner: &SchemaInner,
    ty: Option<&TypeRef>,
    value: &InputValue,
    field: &str,
) -> Result<InputValue, CoercionError> {
    let Some(ty) = ty else {
        // Resolved-kind-only fields carry no reference to recurse into.
        return Ok(value.clone());
    };
    match ty {
        TypeRef::NonNull(inner_ty) => {
            if value.is_null() {
                Err(CoercionError::NullForNonNull {
                    field: field.to_owned(),
                })
            } else {
                coerce_value(inner, Some(inner_ty.as_ref()), value, field)
            }
        }
        TypeRef::List(element) => match value {
            // A null list stays null, never an empty list.
            InputValue::Null => Ok(InputValue::Null),
            InputValue::List(items) => Ok(InputValue::List(
                items
                    .iter()
                    .map(|item| coerce_value(inner, Some(element.as_ref()), item, field))
                    .collect::<Result<_, _>>()?,
            )),
            // A single value in list position coerces to a one-element list.
            other => Ok(InputValue::List(vec![coerce_value(
                inner,
                Some(element.as_ref()),
                other,
                field,
            )?])),
        },
        TypeRef::Named(name) => {
            if value.is_null() {
                return Ok(InputValue::Null);
            }
            match inner.registry.get(name.as_str()) {
                Some(NamedType::Complex(ct)) if ct.kind == ComplexKind::InputObject => {
                    let InputValue::Object(map) = value else {
                        return Err(invalid(field, "an input object", value));
                    };
                    let Some(plan) = inner.plans.get(name.as_str()) else {
                        return Err(CoercionError::Message(format!(
                            "no coercion plan for input type `{name}`"
                        )));
                    };
                    Ok(InputValue::Object(coerce_object(inner, plan, map)?))
                }
                Some(NamedType::Scalar(_)) if is_builtin(name.as_str()) => {
                    coerce_scalar(inner, field, name.as_str(), value)
                }
                // Custom scalars pass through unchanged.
                Some(NamedType::Scalar(_)) => Ok(value.clone()),
                Some(NamedType::Enum(e)) => match value {
                    InputValue::Enum(n) if e.has_value(n.as_str()) => Ok(value.clone()),
                    InputValue::String(s) => e
                        .values
                        .iter()
                        .find(|v| *v == s.as_str())
                        .map(|v| InputValue::Enum(v.clone()))
                        .ok_or_else(|| invalid(field, &format!("a value of enum `{}`", e.name), value)),
                    _ => Err(invalid(
                        field,
                        &format!("a value of enum `{}`", e.name),
                        value,
                    )),
                },
                Some(NamedType::Union(_)) | Some(NamedType::Complex(_)) => {
                    Err(invalid(field, "an input type", value))
                }
                None => Err(CoercionError::Message(format!(
                    "field `{field}` references unknown type `{name}`"
                ))),
            }
        }
    }
}

fn is_builtin(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

fn invalid(field: &str, expected: &str, found: &InputValue) -> CoercionError {
    CoercionError::InvalidValue {
        field: field.to_owned(),
        expected: expected.to_owned(),
        found: found.describe().to_owned(),
    }
}

/// Pass a value through when it already has the scalar's shape, otherwise
/// hand it to the schema's [`ValueConverter`].
fn coerce_scalar(
    inner: &SchemaInner,
    field: &str,
    scalar: &str,
    value: &InputValue,
) -> Result<InputValue, CoercionError> {
    let already_shaped = matches!(
        (scalar, value),
        ("Int", InputValue::Int(_))
            | ("Float", InputValue::Float(_))
            | ("String", InputValue::String(_))
            | ("Boolean", InputValue::Boolean(_))
            | ("ID", InputValue::String(_))
    );
    if already_shaped {
        return Ok(value.clone());
    }
    inner
        .value_converter
        .convert(value, scalar)
        .ok_or_else(|| invalid(field, &format!("a value coercible to `{scalar}`"), value))
}

/// Arbitrary scalar-to-scalar conversion, injected at the schema level.
///
/// Returning `None` means the conversion is impossible; the engine turns
/// that into a [`CoercionError`] carrying the field context.
pub trait ValueConverter: Send + Sync {
    fn convert(&self, value: &InputValue, target: &str) -> Option<InputValue>;
}

/// Numeric widening/narrowing and string parsing for the built-in scalars.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueConverter;

impl ValueConverter for DefaultValueConverter {
    fn convert(&self, value: &InputValue, target: &str) -> Option<InputValue> {
        match target {
            "Int" => {
                let n = integer_value(value)?;
                i32::try_from(n).ok().map(InputValue::Int)
            }
            "Float" => float_value(value).map(|f| InputValue::Float(OrderedFloat(f))),
            "String" | "ID" => match value {
                InputValue::Int(i) => Some(InputValue::String(i.to_string())),
                InputValue::Long(l) => Some(InputValue::String(l.to_string())),
                InputValue::Decimal(d) => Some(InputValue::String(d.to_string())),
                InputValue::BigInt(b) => Some(InputValue::String(b.to_string())),
                InputValue::Float(f) => Some(InputValue::String(f.0.to_string())),
                InputValue::Boolean(b) => Some(InputValue::String(b.to_string())),
                InputValue::Enum(name) => Some(InputValue::String(name.to_string())),
                _ => None,
            },
            "Boolean" => match value {
                InputValue::String(s) if s == "true" => Some(InputValue::Boolean(true)),
                InputValue::String(s) if s == "false" => Some(InputValue::Boolean(false)),
                _ => None,
            },
            _ => None,
        }
    }
}

fn integer_value(value: &InputValue) -> Option<i64> {
    match value {
        InputValue::Int(i) => Some(i64::from(*i)),
        InputValue::Long(l) => Some(*l),
        InputValue::Float(f) if f.0.fract() == 0.0 => {
            let v = f.0;
            // The upper bound is exclusive: 2^63 itself is exactly
            // representable as f64 but one past i64::MAX.
            (v >= -(2f64.powi(63)) && v < 2f64.powi(63)).then_some(v as i64)
        }
        InputValue::Decimal(d) => d.to_i64(),
        InputValue::BigInt(b) => i64::try_from(b.clone()).ok(),
        InputValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn float_value(value: &InputValue) -> Option<f64> {
    match value {
        InputValue::Int(i) => Some(f64::from(*i)),
        InputValue::Long(l) => Some(*l as f64),
        InputValue::Float(f) => Some(f.0),
        InputValue::Decimal(d) => d.to_f64(),
        InputValue::BigInt(b) => b.to_string().parse().ok(),
        InputValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// A reusable conversion function from a supplied input map to a `T`.
///
/// Built once per bound graph type during schema finalization; pure and
/// `Send + Sync`, so one converter serves any number of concurrent requests.
/// Cached per graph-type instance rather than per Rust type: two schemas may
/// bind the same `T` with different field mappings.
pub struct InputConverter<T> {
    inner: Arc<SchemaInner>,
    plan: Arc<CoercionPlan>,
    marker: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for InputConverter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputConverter").finish_non_exhaustive()
    }
}

impl<T> Clone for InputConverter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            plan: Arc::clone(&self.plan),
            marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> InputConverter<T> {
    pub(crate) fn build(
        inner: Arc<SchemaInner>,
        plan: Arc<CoercionPlan>,
    ) -> Result<Self, TypeConfigError> {
        if let Some(declared) = probe::struct_fields::<T>() {
            for field in &plan.fields {
                let resolvable = declared
                    .iter()
                    .any(|member| member.eq_ignore_ascii_case(&field.member));
                if !resolvable {
                    return Err(TypeConfigError::UnresolvableMember {
                        ty: plan.type_name.clone(),
                        field: field.graphql_name.clone(),
                        target: std::any::type_name::<T>().to_owned(),
                    });
                }
            }
        }
        Ok(Self {
            inner,
            plan,
            marker: PhantomData,
        })
    }

    /// The graph type this converter was built for.
    pub fn graph_type(&self) -> &str {
        &self.plan.type_name
    }

    /// Coerce a supplied input map into a strongly-typed `T`.
    pub fn convert(&self, input: &IndexMap<String, InputValue>) -> Result<T, CoercionError> {
        let coerced = coerce_object(&self.inner, &self.plan, input)?;
        T::deserialize(de::StructDeserializer::new(&coerced))
    }

    /// Coerce a whole value: a null value yields `None`, an object coerces
    /// into `Some(T)`, anything else is a type error.
    pub fn convert_value(&self, value: &InputValue) -> Result<Option<T>, CoercionError> {
        match value {
            InputValue::Null => Ok(None),
            InputValue::Object(map) => self.convert(map).map(Some),
            other => Err(invalid(&self.plan.type_name, "an input object", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::FieldBuilder;
    use num_bigint::BigInt;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn default_converter_narrows_and_widens_numbers() {
        let c = DefaultValueConverter;
        assert_eq!(
            c.convert(&InputValue::Long(30), "Int"),
            Some(InputValue::Int(30))
        );
        assert_eq!(c.convert(&InputValue::Long(i64::MAX), "Int"), None);
        assert_eq!(
            c.convert(&InputValue::Int(2), "Float"),
            Some(InputValue::Float(OrderedFloat(2.0)))
        );
        assert_eq!(
            c.convert(&InputValue::Decimal(Decimal::from_str("12.10").unwrap()), "Float"),
            Some(InputValue::Float(OrderedFloat(12.1)))
        );
        assert_eq!(
            c.convert(&InputValue::String("30".to_owned()), "Int"),
            Some(InputValue::Int(30))
        );
        assert_eq!(
            c.convert(&InputValue::BigInt(BigInt::from(7)), "Int"),
            Some(InputValue::Int(7))
        );
    }

    #[test]
    fn integral_floats_convert_only_inside_the_i64_range() {
        assert_eq!(
            integer_value(&InputValue::Float(OrderedFloat(42.0))),
            Some(42)
        );
        assert_eq!(
            integer_value(&InputValue::Float(OrderedFloat(-9223372036854775808.0))),
            Some(i64::MIN)
        );
        // 2^63 is exactly representable as f64 but one past i64::MAX.
        assert_eq!(
            integer_value(&InputValue::Float(OrderedFloat(9223372036854775808.0))),
            None
        );
        assert_eq!(
            integer_value(&InputValue::Float(OrderedFloat(1.5))),
            None
        );
    }

    #[test]
    fn default_converter_stringifies_scalars() {
        let c = DefaultValueConverter;
        assert_eq!(
            c.convert(&InputValue::Int(42), "ID"),
            Some(InputValue::String("42".to_owned()))
        );
        assert_eq!(c.convert(&InputValue::Null, "String"), None);
    }

    #[test]
    fn plans_reject_case_insensitive_member_collisions() {
        let registry = TypeRegistry::new();
        let mut ty = ComplexType::input_object("Person").unwrap();
        ty.add_field(
            &registry,
            FieldBuilder::new("name").of_type("String").build().unwrap(),
        )
        .unwrap();
        // Distinct GraphQL fields, but both target the member `name`.
        ty.add_field(
            &registry,
            FieldBuilder::new("Name").of_type("String").build().unwrap(),
        )
        .unwrap();
        let err = CoercionPlan::build(&registry, &ty).unwrap_err();
        assert!(matches!(
            err,
            TypeConfigError::ConflictingMemberMapping { .. }
        ));
    }

    #[test]
    fn plans_record_explicit_member_overrides() {
        let registry = TypeRegistry::new();
        let mut ty = ComplexType::input_object("Person").unwrap();
        ty.add_field(
            &registry,
            FieldBuilder::new("fullName")
                .of_type("String")
                .bind_to("name")
                .build()
                .unwrap(),
        )
        .unwrap();
        let plan = CoercionPlan::build(&registry, &ty).unwrap();
        assert_eq!(plan.fields[0].graphql_name, "fullName");
        assert_eq!(plan.fields[0].member, "name");
    }
}
