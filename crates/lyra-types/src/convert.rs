//! Conversion from the parser's AST into an [`ExecutableDocument`].
//!
//! A pure bottom-up rebuild: every node is converted into a fresh value,
//! nothing in the source tree is touched. The converter checks its
//! [`CancellationToken`] at the start of each node visit, so a cancelled
//! conversion stops at the next node boundary; a document is handed onward
//! only once the whole traversal has completed.

use crate::doc::*;
use crate::error::ConvertError;
use crate::InputValue;
use indexmap::IndexMap;
use lyra_parser::ast;
use lyra_parser::Node;
use tokio_util::sync::CancellationToken;

pub struct DocumentConverter {
    cancel: CancellationToken,
}

/// Convert a document without cancellation support.
pub fn convert_document(document: &ast::Document) -> Result<ExecutableDocument, ConvertError> {
    DocumentConverter::new().convert(document)
}

impl DocumentConverter {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn convert(&self, document: &ast::Document) -> Result<ExecutableDocument, ConvertError> {
        self.visit()?;
        Ok(ExecutableDocument {
            operations: document
                .operations
                .iter()
                .map(|op| self.operation(op))
                .collect::<Result<_, _>>()?,
            fragments: document
                .fragments
                .iter()
                .map(|fragment| self.fragment(fragment))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Convert a standalone value, e.g. one parsed with
    /// [`lyra_parser::Grammar::parse_const_value`].
    pub fn convert_value(&self, value: &ast::Value) -> Result<InputValue, ConvertError> {
        self.value(value)
    }

    fn visit(&self) -> Result<(), ConvertError> {
        if self.cancel.is_cancelled() {
            Err(ConvertError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn operation(&self, operation: &ast::Operation) -> Result<ExecutableOperation, ConvertError> {
        self.visit()?;
        Ok(ExecutableOperation {
            operation_type: operation.operation_type,
            name: operation.name.clone(),
            variables: operation
                .variables
                .iter()
                .map(|var| self.variable(var))
                .collect::<Result<_, _>>()?,
            directives: self.directives(&operation.directives)?,
            selection_set: self.selection_set(&operation.selection_set)?,
        })
    }

    fn variable(
        &self,
        variable: &ast::VariableDefinition,
    ) -> Result<ExecutableVariable, ConvertError> {
        self.visit()?;
        Ok(ExecutableVariable {
            name: variable.name.clone(),
            ty: variable.ty.clone(),
            default_value: variable
                .default_value
                .as_ref()
                .map(|value| self.value(value))
                .transpose()?,
        })
    }

    fn fragment(
        &self,
        fragment: &ast::FragmentDefinition,
    ) -> Result<ExecutableFragment, ConvertError> {
        self.visit()?;
        Ok(ExecutableFragment {
            name: fragment.name.clone(),
            type_condition: fragment.type_condition.clone(),
            directives: self.directives(&fragment.directives)?,
            selection_set: self.selection_set(&fragment.selection_set)?,
        })
    }

    fn selection_set(
        &self,
        selections: &[ast::Selection],
    ) -> Result<Vec<ExecutableSelection>, ConvertError> {
        selections
            .iter()
            .map(|selection| self.selection(selection))
            .collect()
    }

    fn selection(&self, selection: &ast::Selection) -> Result<ExecutableSelection, ConvertError> {
        self.visit()?;
        Ok(match selection {
            ast::Selection::Field(field) => ExecutableSelection::Field(ExecutableField {
                alias: field.alias.clone(),
                name: field.name.clone(),
                arguments: self.arguments(&field.arguments)?,
                directives: self.directives(&field.directives)?,
                selection_set: self.selection_set(&field.selection_set)?,
            }),
            ast::Selection::FragmentSpread(spread) => {
                ExecutableSelection::FragmentSpread(ExecutableFragmentSpread {
                    fragment_name: spread.fragment_name.clone(),
                    directives: self.directives(&spread.directives)?,
                })
            }
            ast::Selection::InlineFragment(inline) => {
                ExecutableSelection::InlineFragment(ExecutableInlineFragment {
                    type_condition: inline.type_condition.clone(),
                    directives: self.directives(&inline.directives)?,
                    selection_set: self.selection_set(&inline.selection_set)?,
                })
            }
        })
    }

    fn directives(
        &self,
        directives: &[Node<ast::Directive>],
    ) -> Result<Vec<ExecutableDirective>, ConvertError> {
        directives
            .iter()
            .map(|directive| {
                self.visit()?;
                Ok(ExecutableDirective {
                    name: directive.name.clone(),
                    arguments: self.arguments(&directive.arguments)?,
                })
            })
            .collect()
    }

    fn arguments(
        &self,
        arguments: &[Node<ast::Argument>],
    ) -> Result<IndexMap<String, InputValue>, ConvertError> {
        let mut out = IndexMap::with_capacity(arguments.len());
        for argument in arguments {
            self.visit()?;
            out.insert(argument.name.as_str().to_owned(), self.value(&argument.value)?);
        }
        Ok(out)
    }

    /// Rebuild a value tree. The match is total over every value kind the
    /// grammar can produce; a kind without a mapping cannot exist.
    fn value(&self, value: &ast::Value) -> Result<InputValue, ConvertError> {
        self.visit()?;
        Ok(match value {
            ast::Value::Null => InputValue::Null,
            ast::Value::Variable(name) => InputValue::Variable(name.clone()),
            ast::Value::Int(i) => InputValue::Int(*i),
            ast::Value::Long(l) => InputValue::Long(*l),
            ast::Value::Decimal(d) => InputValue::Decimal(*d),
            ast::Value::BigInt(b) => InputValue::BigInt(b.clone()),
            ast::Value::Float(v) => InputValue::Float(*v),
            ast::Value::String(s) => InputValue::String(s.clone()),
            ast::Value::Boolean(b) => InputValue::Boolean(*b),
            ast::Value::Enum(name) => InputValue::Enum(name.clone()),
            ast::Value::List(items) => InputValue::List(
                items
                    .iter()
                    .map(|item| self.value(item))
                    .collect::<Result<_, _>>()?,
            ),
            ast::Value::Object(entries) => InputValue::Object(
                entries
                    .iter()
                    .map(|(name, value)| {
                        Ok((name.as_str().to_owned(), self.value(value)?))
                    })
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

impl Default for DocumentConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyra_parser::parse_document;

    #[test]
    fn rebuilds_arguments_as_ordered_maps() {
        let document =
            parse_document(r#"{ hero(episode: JEDI, limit: 3) { name } }"#).unwrap();
        let executable = convert_document(&document).unwrap();
        let ExecutableSelection::Field(hero) = &executable.operations[0].selection_set[0] else {
            panic!("expected a field");
        };
        let keys: Vec<_> = hero.arguments.keys().map(String::as_str).collect();
        assert_eq!(keys, ["episode", "limit"]);
        assert_eq!(hero.arguments["limit"], InputValue::Int(3));
    }

    #[test]
    fn cancellation_stops_at_a_node_boundary() {
        let document = parse_document("{ hero { name } }").unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let err = DocumentConverter::with_cancellation(token)
            .convert(&document)
            .unwrap_err();
        assert_eq!(err, ConvertError::Cancelled);
    }

    #[test]
    fn conversion_is_pure() {
        let document = parse_document("{ a(x: [1, {y: 2}]) }").unwrap();
        let before = document.clone();
        let _ = convert_document(&document).unwrap();
        assert_eq!(document, before);
    }
}
