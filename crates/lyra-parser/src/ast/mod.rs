//! *Abstract Syntax Tree* for GraphQL request documents.
//!
//! Nodes are plain data holders constructed once by the grammar and never
//! mutated after attachment to a parent. Each node is wrapped in [`Node`],
//! which stamps an optional [`crate::SourceSpan`] without affecting equality.
//!
//! Start with [`crate::parse_document`] or [`crate::Grammar`].

use crate::Name;
use crate::Node;
use num_bigint::BigInt;
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;

mod impls;

pub use impls::IsEqualTo;
pub use impls::NodeRef;

/// A parsed request document: its operations and fragment definitions, in
/// source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub operations: Vec<Node<Operation>>,
    pub fragments: Vec<Node<FragmentDefinition>>,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub operation_type: OperationType,
    pub name: Option<Name>,
    pub variables: Vec<Node<VariableDefinition>>,
    pub directives: Vec<Node<Directive>>,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<Node<Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Field(Node<Field>),
    FragmentSpread(Node<FragmentSpread>),
    InlineFragment(Node<InlineFragment>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub alias: Option<Name>,
    pub name: Name,
    pub arguments: Vec<Node<Argument>>,
    pub directives: Vec<Node<Directive>>,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: Name,
    pub value: Node<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: Name,
    pub arguments: Vec<Node<Argument>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentDefinition {
    pub name: Name,
    pub type_condition: Name,
    pub directives: Vec<Node<Directive>>,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSpread {
    pub fragment_name: Name,
    pub directives: Vec<Node<Directive>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineFragment {
    pub type_condition: Option<Name>,
    pub directives: Vec<Node<Directive>>,
    pub selection_set: Vec<Selection>,
}

/// A type reference as written in a document, e.g. `[Episode!]!`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Named(Name),
    List(Box<Type>),
    NonNull(Box<Type>),
}

/// A literal value.
///
/// Integer literals pick the narrowest representation that round-trips the
/// source text: `Int` (32-bit), then `Long` (64-bit), then `Decimal`
/// (96-bit), then `BigInt` (arbitrary precision). Float literals become
/// `Float` only when the `f64` value's exact decimal expansion equals the
/// literal, otherwise `Decimal`, so `12.10` keeps its trailing zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Variable(Name),
    Int(i32),
    Long(i64),
    Decimal(Decimal),
    BigInt(BigInt),
    Float(OrderedFloat<f64>),
    String(String),
    Boolean(bool),
    Enum(Name),
    List(Vec<Node<Value>>),
    Object(Vec<(Name, Node<Value>)>),
}
