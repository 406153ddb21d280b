use super::*;
use std::fmt;

/// A borrowed view of any AST node, for generic tree traversal.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Document(&'a Document),
    Operation(&'a Operation),
    VariableDefinition(&'a VariableDefinition),
    Field(&'a Field),
    Argument(&'a Argument),
    Directive(&'a Directive),
    FragmentDefinition(&'a FragmentDefinition),
    FragmentSpread(&'a FragmentSpread),
    InlineFragment(&'a InlineFragment),
    Value(&'a Value),
}

fn selection_refs<'a>(selections: &'a [Selection], out: &mut Vec<NodeRef<'a>>) {
    for selection in selections {
        out.push(match selection {
            Selection::Field(f) => NodeRef::Field(f),
            Selection::FragmentSpread(s) => NodeRef::FragmentSpread(s),
            Selection::InlineFragment(i) => NodeRef::InlineFragment(i),
        });
    }
}

impl<'a> NodeRef<'a> {
    /// The node's direct children, in source order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        match self {
            NodeRef::Document(doc) => {
                out.extend(doc.operations.iter().map(|o| NodeRef::Operation(o)));
                out.extend(doc.fragments.iter().map(|f| NodeRef::FragmentDefinition(f)));
            }
            NodeRef::Operation(op) => {
                out.extend(op.variables.iter().map(|v| NodeRef::VariableDefinition(v)));
                out.extend(op.directives.iter().map(|d| NodeRef::Directive(d)));
                selection_refs(&op.selection_set, &mut out);
            }
            NodeRef::VariableDefinition(var) => {
                if let Some(default) = &var.default_value {
                    out.push(NodeRef::Value(default));
                }
            }
            NodeRef::Field(field) => {
                out.extend(field.arguments.iter().map(|a| NodeRef::Argument(a)));
                out.extend(field.directives.iter().map(|d| NodeRef::Directive(d)));
                selection_refs(&field.selection_set, &mut out);
            }
            NodeRef::Argument(arg) => out.push(NodeRef::Value(&arg.value)),
            NodeRef::Directive(directive) => {
                out.extend(directive.arguments.iter().map(|a| NodeRef::Argument(a)));
            }
            NodeRef::FragmentDefinition(fragment) => {
                out.extend(fragment.directives.iter().map(|d| NodeRef::Directive(d)));
                selection_refs(&fragment.selection_set, &mut out);
            }
            NodeRef::FragmentSpread(spread) => {
                out.extend(spread.directives.iter().map(|d| NodeRef::Directive(d)));
            }
            NodeRef::InlineFragment(inline) => {
                out.extend(inline.directives.iter().map(|d| NodeRef::Directive(d)));
                selection_refs(&inline.selection_set, &mut out);
            }
            NodeRef::Value(value) => match value {
                Value::List(items) => out.extend(items.iter().map(|v| NodeRef::Value(v))),
                Value::Object(entries) => {
                    out.extend(entries.iter().map(|(_, v)| NodeRef::Value(v)));
                }
                _ => {}
            },
        }
        out
    }

    /// Depth-first walk over this node and all its descendants.
    pub fn walk(&self, visit: &mut impl FnMut(NodeRef<'a>)) {
        visit(*self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

impl Document {
    pub fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Document(self)
    }
}

/// Structural equality over identity-relevant fields only.
///
/// Two fields are "the same field" when their name and alias match, no
/// matter what they select beneath; likewise for the other node kinds. This
/// is the comparison validation rules use to decide whether two selections
/// refer to the same response key.
pub trait IsEqualTo {
    fn is_equal_to(&self, other: &Self) -> bool;
}

impl IsEqualTo for Field {
    fn is_equal_to(&self, other: &Self) -> bool {
        self.name == other.name && self.alias == other.alias
    }
}

impl IsEqualTo for Operation {
    fn is_equal_to(&self, other: &Self) -> bool {
        self.operation_type == other.operation_type && self.name == other.name
    }
}

impl IsEqualTo for Argument {
    fn is_equal_to(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl IsEqualTo for Directive {
    fn is_equal_to(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl IsEqualTo for VariableDefinition {
    fn is_equal_to(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl IsEqualTo for FragmentDefinition {
    fn is_equal_to(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl IsEqualTo for FragmentSpread {
    fn is_equal_to(&self, other: &Self) -> bool {
        self.fragment_name == other.fragment_name
    }
}

impl IsEqualTo for InlineFragment {
    fn is_equal_to(&self, other: &Self) -> bool {
        self.type_condition == other.type_condition
    }
}

impl IsEqualTo for Value {
    fn is_equal_to(&self, other: &Self) -> bool {
        self == other
    }
}

impl<T: IsEqualTo> IsEqualTo for Node<T> {
    fn is_equal_to(&self, other: &Self) -> bool {
        T::is_equal_to(self, other)
    }
}

impl Type {
    /// The name at the core of the reference, through list and non-null
    /// wrappers.
    pub fn innermost_name(&self) -> &Name {
        match self {
            Type::Named(name) => name,
            Type::List(inner) | Type::NonNull(inner) => inner.innermost_name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNull(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{name}"),
            Type::List(inner) => write!(f, "[{inner}]"),
            Type::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Variable(name) => write!(f, "${name}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Long(l) => write!(f, "{l}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::BigInt(b) => write!(f, "{b}"),
            Value::Float(v) => write!(f, "{}", v.0),
            Value::String(s) => write!(f, "\"{}\"", s.escape_default()),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Enum(name) => write!(f, "{name}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(entries) => {
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

impl OperationType {
    pub fn name(self) -> &'static str {
        match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(alias: Option<&str>, name: &str) -> Field {
        Field {
            alias: alias.map(|a| Name::new(a).unwrap()),
            name: Name::new(name).unwrap(),
            arguments: Vec::new(),
            directives: Vec::new(),
            selection_set: Vec::new(),
        }
    }

    #[test]
    fn field_identity_is_name_and_alias_only() {
        let mut a = field(None, "hero");
        let b = field(None, "hero");
        a.selection_set.push(Selection::Field(Node::new(field(None, "name"))));
        assert!(a.is_equal_to(&b));
        assert!(!a.is_equal_to(&field(Some("h"), "hero")));
        assert!(!a.is_equal_to(&field(None, "villain")));
    }

    #[test]
    fn type_display_round_trips_wrappers() {
        let ty = Type::NonNull(Box::new(Type::List(Box::new(Type::NonNull(
            Box::new(Type::Named(Name::new("Episode").unwrap())),
        )))));
        assert_eq!(ty.to_string(), "[Episode!]!");
        assert_eq!(ty.innermost_name().as_str(), "Episode");
    }

    #[test]
    fn children_of_a_field_are_ordered() {
        let mut hero = field(None, "hero");
        hero.arguments.push(Node::new(Argument {
            name: Name::new("episode").unwrap(),
            value: Node::new(Value::Enum(Name::new("JEDI").unwrap())),
        }));
        hero.selection_set
            .push(Selection::Field(Node::new(field(None, "name"))));
        let node = NodeRef::Field(&hero);
        let children = node.children();
        assert_eq!(children.len(), 2);
        assert!(matches!(children[0], NodeRef::Argument(_)));
        assert!(matches!(children[1], NodeRef::Field(_)));
    }
}
