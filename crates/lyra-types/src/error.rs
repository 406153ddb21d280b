use lyra_parser::InvalidNameError;
use lyra_parser::SyntaxError;
use std::fmt;

/// A schema misconfiguration, raised once at build time.
///
/// These never occur per-request: a schema that fails any of these checks
/// refuses to initialize instead of failing unpredictably under traffic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeConfigError {
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),

    #[error(transparent)]
    InvalidTypeRef(#[from] SyntaxError),

    #[error("type `{ty}` already declares a field named `{field}`")]
    DuplicateField { ty: String, field: String },

    #[error("field `{field}` on type `{ty}` declares neither a type reference nor a resolved kind")]
    MissingTypeInfo { ty: String, field: String },

    #[error("field `{field}` on {type_kind} type `{ty}` must be {expected}")]
    KindMismatch {
        ty: String,
        type_kind: &'static str,
        field: String,
        expected: &'static str,
    },

    #[error("type `{ty}` references unknown type `{name}`")]
    UnknownType { ty: String, name: String },

    #[error("a type named `{0}` is already registered")]
    DuplicateType(String),

    #[error("`{0}` is not an input object type")]
    NotInputObject(String),

    #[error("no member of `{target}` matches field `{field}` on input type `{ty}`")]
    UnresolvableMember {
        ty: String,
        field: String,
        target: String,
    },

    #[error(
        "fields `{first}` and `{second}` on input type `{ty}` both map to member `{member}`"
    )]
    ConflictingMemberMapping {
        ty: String,
        first: String,
        second: String,
        member: String,
    },

    #[error("default value for field `{field}` on type `{ty}` does not coerce: {message}")]
    InvalidDefault {
        ty: String,
        field: String,
        message: String,
    },

    #[error("no input converter is registered for type `{0}`")]
    NoConverter(String),

    #[error("the input converter for `{ty}` is bound to a different Rust type")]
    BoundTypeMismatch { ty: String },
}

/// A per-request failure to coerce a supplied value into its declared type.
///
/// Surfaced to the caller of the coercion function; how it is presented to
/// the client is the execution layer's concern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    #[error("field `{field}` is non-null but a null value was supplied")]
    NullForNonNull { field: String },

    #[error("field `{field}`: expected {expected}, found {found}")]
    InvalidValue {
        field: String,
        expected: String,
        found: String,
    },

    #[error("variable `${name}` must be resolved before input coercion")]
    UnresolvedVariable { name: String },

    #[error("member `{member}` has no matching field on the bound Rust type")]
    UnmatchedMember { member: String },

    #[error("{0}")]
    Message(String),
}

impl serde::de::Error for CoercionError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        CoercionError::Message(msg.to_string())
    }
}

/// Document conversion failed before completing its traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("document conversion was cancelled")]
    Cancelled,
}
