//! The executable form of a parsed request document.
//!
//! Produced by [`crate::convert::DocumentConverter`]; the shapes mirror
//! `lyra_parser::ast` but argument and default values are
//! [`InputValue`]s, ready for the coercion engine, and argument lists become
//! ordered name-to-value maps.

use crate::InputValue;
use indexmap::IndexMap;
use lyra_parser::ast::OperationType;
use lyra_parser::ast::Type;
use lyra_parser::Name;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExecutableDocument {
    pub operations: Vec<ExecutableOperation>,
    pub fragments: Vec<ExecutableFragment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutableOperation {
    pub operation_type: OperationType,
    pub name: Option<Name>,
    pub variables: Vec<ExecutableVariable>,
    pub directives: Vec<ExecutableDirective>,
    pub selection_set: Vec<ExecutableSelection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutableVariable {
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<InputValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutableSelection {
    Field(ExecutableField),
    FragmentSpread(ExecutableFragmentSpread),
    InlineFragment(ExecutableInlineFragment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutableField {
    pub alias: Option<Name>,
    pub name: Name,
    pub arguments: IndexMap<String, InputValue>,
    pub directives: Vec<ExecutableDirective>,
    pub selection_set: Vec<ExecutableSelection>,
}

impl ExecutableField {
    /// The key this field's result appears under in the response.
    pub fn response_key(&self) -> &Name {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutableDirective {
    pub name: Name,
    pub arguments: IndexMap<String, InputValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutableFragment {
    pub name: Name,
    pub type_condition: Name,
    pub directives: Vec<ExecutableDirective>,
    pub selection_set: Vec<ExecutableSelection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutableFragmentSpread {
    pub fragment_name: Name,
    pub directives: Vec<ExecutableDirective>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutableInlineFragment {
    pub type_condition: Option<Name>,
    pub directives: Vec<ExecutableDirective>,
    pub selection_set: Vec<ExecutableSelection>,
}
