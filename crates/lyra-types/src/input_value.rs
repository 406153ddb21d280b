use indexmap::IndexMap;
use lyra_parser::Name;
use num_bigint::BigInt;
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use std::fmt;

/// A loosely-typed input value, as handed to the coercion engine.
///
/// This is the executable-document representation of
/// [`lyra_parser::ast::Value`]: spans are gone, object values are ordered
/// maps, and the numeric variants keep the parser's exact-representation
/// choices (`12.10` stays a `Decimal`, `12.5` is a `Float`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
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
    List(Vec<InputValue>),
    Object(IndexMap<String, InputValue>),
}

impl InputValue {
    pub fn is_null(&self) -> bool {
        matches!(self, InputValue::Null)
    }

    /// A short description of the value's shape, for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            InputValue::Null => "null",
            InputValue::Variable(_) => "a variable",
            InputValue::Int(_) => "an Int",
            InputValue::Long(_) => "a Long",
            InputValue::Decimal(_) => "a Decimal",
            InputValue::BigInt(_) => "a BigInt",
            InputValue::Float(_) => "a Float",
            InputValue::String(_) => "a String",
            InputValue::Boolean(_) => "a Boolean",
            InputValue::Enum(_) => "an enum value",
            InputValue::List(_) => "a list",
            InputValue::Object(_) => "an input object",
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::Null => f.write_str("null"),
            InputValue::Variable(name) => write!(f, "${name}"),
            InputValue::Int(i) => write!(f, "{i}"),
            InputValue::Long(l) => write!(f, "{l}"),
            InputValue::Decimal(d) => write!(f, "{d}"),
            InputValue::BigInt(b) => write!(f, "{b}"),
            InputValue::Float(v) => write!(f, "{}", v.0),
            InputValue::String(s) => write!(f, "\"{}\"", s.escape_default()),
            InputValue::Boolean(b) => write!(f, "{b}"),
            InputValue::Enum(name) => write!(f, "{name}"),
            InputValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            InputValue::Object(entries) => {
                f.write_str("{")?;
                for (i, (name, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<i32> for InputValue {
    fn from(value: i32) -> Self {
        InputValue::Int(value)
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        InputValue::Long(value)
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        InputValue::Float(OrderedFloat(value))
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        InputValue::Boolean(value)
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::String(value.to_owned())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::String(value)
    }
}

impl<V: Into<InputValue>> FromIterator<V> for InputValue {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        InputValue::List(iter.into_iter().map(Into::into).collect())
    }
}
