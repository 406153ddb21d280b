//! The graph type model and input coercion layer on top of `lyra-parser`.
//!
//! Three concerns live here:
//!
//! * [`ty`] and [`schema`]: named graph types (scalars, enums, objects,
//!   interfaces, input objects), a registry resolving type references, and a
//!   builder that finalizes schemas eagerly so configuration errors surface
//!   before the first request.
//! * [`convert`]: rebuilding a parsed document into an
//!   [`ExecutableDocument`] whose values are ready for coercion, with
//!   cooperative cancellation at node boundaries.
//! * [`coerce`]: per-input-type converters that turn loosely-typed input
//!   maps into bound Rust types through serde.
//!
//! ```
//! use lyra_types::ty::{ComplexType, FieldBuilder};
//! use lyra_types::{InputValue, SchemaBuilder};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//!
//! let mut person = ComplexType::input_object("Person").unwrap();
//! let builder = SchemaBuilder::new();
//! person
//!     .add_field(builder.registry(), FieldBuilder::new("name").of_type("String").build().unwrap())
//!     .unwrap();
//! person
//!     .add_field(builder.registry(), FieldBuilder::new("age").of_type("Int").build().unwrap())
//!     .unwrap();
//! let schema = builder
//!     .register(person)
//!     .unwrap()
//!     .bind_input::<Person>("Person")
//!     .build()
//!     .unwrap();
//!
//! let input = [
//!     ("name".to_owned(), InputValue::from("Ada")),
//!     ("age".to_owned(), InputValue::from(30)),
//! ]
//! .into_iter()
//! .collect();
//! let person: Person = schema
//!     .input_converter::<Person>("Person")
//!     .unwrap()
//!     .convert(&input)
//!     .unwrap();
//! assert_eq!(person.name, "Ada");
//! assert_eq!(person.age, 30);
//! ```

pub mod coerce;
pub mod convert;
pub mod doc;
mod error;
mod input_value;
mod schema;
pub mod ty;

pub use crate::coerce::DefaultValueConverter;
pub use crate::coerce::InputConverter;
pub use crate::coerce::ValueConverter;
pub use crate::convert::convert_document;
pub use crate::convert::DocumentConverter;
pub use crate::doc::ExecutableDocument;
pub use crate::error::CoercionError;
pub use crate::error::ConvertError;
pub use crate::error::TypeConfigError;
pub use crate::input_value::InputValue;
pub use crate::schema::Schema;
pub use crate::schema::SchemaBuilder;
pub use crate::schema::TypeRegistry;

pub use lyra_parser::Name;
