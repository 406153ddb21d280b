//! A recursive-descent parser for GraphQL request documents, built from
//! general-purpose combinators.
//!
//! The crate has two layers:
//!
//! * [`combinator`] is a small, GraphQL-agnostic parser combinator library:
//!   [`Parser<T>`] values composed with `then`/`or`/`many`, reporting
//!   failures by the furthest-failure heuristic and catching left-recursive
//!   grammar definitions.
//! * [`Grammar`] composes those combinators into the GraphQL request
//!   grammar, producing the [`ast`] node model.
//!
//! ```
//! let document = lyra_parser::parse_document("{ hero { name } }").unwrap();
//! assert_eq!(document.operations.len(), 1);
//! ```

pub mod ast;
pub mod combinator;
mod error;
mod grammar;
mod input;
mod name;
mod node;

pub use crate::combinator::forward;
pub use crate::combinator::Failure;
pub use crate::combinator::ForwardDecl;
pub use crate::combinator::ParseContext;
pub use crate::combinator::ParseResult;
pub use crate::combinator::Parser;
pub use crate::combinator::Success;
pub use crate::error::SyntaxError;
pub use crate::grammar::parse_document;
pub use crate::grammar::Grammar;
pub use crate::input::Input;
pub use crate::name::InvalidNameError;
pub use crate::name::Name;
pub use crate::name::NAME_PATTERN;
pub use crate::node::Node;
pub use crate::node::SourceSpan;
