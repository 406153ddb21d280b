//! The GraphQL request-document grammar, expressed as compositions of the
//! generic combinators in [`crate::combinator`].
//!
//! Every production here returns AST nodes from [`crate::ast`]. Mutual
//! recursion (Value ↔ ListValue ↔ ObjectValue, SelectionSet ↔ Field) goes
//! through [`forward`] declarations, which also catch accidental left
//! recursion in the grammar definition itself.

use crate::ast::{
    Argument, Directive, Document, Field, FragmentDefinition, FragmentSpread, InlineFragment,
    Operation, OperationType, Selection, Type, Value, VariableDefinition,
};
use crate::combinator::text::{literal, pattern};
use crate::combinator::{forward, Failure, ParseResult, Parser, Success};
use crate::error::SyntaxError;
use crate::input::Input;
use crate::name::{Name, NAME_PATTERN};
use crate::node::Node;
use num_bigint::BigInt;
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::str::FromStr;
use std::sync::OnceLock;

const NUMBER_PATTERN: &str = r"-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?";

/// The compiled GraphQL grammar.
///
/// Building a `Grammar` compiles every regex-backed matcher up front; the
/// result is immutable and can be shared freely between threads, so one
/// instance serves any number of concurrent parses.
pub struct Grammar {
    document: Parser<Document>,
    value: Parser<Node<Value>>,
    const_value: Parser<Node<Value>>,
    ty: Parser<Type>,
}

/// Parse a request document with a process-wide shared [`Grammar`].
pub fn parse_document(source: &str) -> Result<Document, SyntaxError> {
    static GRAMMAR: OnceLock<Grammar> = OnceLock::new();
    GRAMMAR.get_or_init(Grammar::new).parse(source)
}

impl Grammar {
    pub fn new() -> Self {
        let value = build_value(true);
        let const_value = build_value(false);
        let ty = build_type();

        let (selection_set, selection_set_decl) = forward::<Vec<Selection>>("selection set");

        let argument = node(
            name_token()
                .then_skip(punct(":"))
                .then(value.clone())
                .map(|(name, value)| Argument { name, value }),
        );
        let arguments = punct("(")
            .skip_then(argument.many1())
            .then_skip(punct(")"));
        let opt_arguments = arguments.opt().map(Option::unwrap_or_default);

        let directive = node(
            punct("@")
                .skip_then(name_token())
                .then(opt_arguments.clone())
                .map(|(name, arguments)| Directive { name, arguments }),
        );
        let directives = directive.many();

        // A fragment name is any name except `on`, which introduces a type
        // condition instead.
        let fragment_name = name()
            .try_map(|n| {
                if n.as_str() == "on" {
                    Err("a fragment name".into())
                } else {
                    Ok(n)
                }
            })
            .token();
        let type_condition = keyword("on").skip_then(name_token());

        let alias_and_name = name_token()
            .then(punct(":").skip_then(name_token()).opt())
            .map(|(first, second)| match second {
                Some(name) => (Some(first), name),
                None => (None, first),
            });
        let field = node(
            alias_and_name
                .then(opt_arguments)
                .then(directives.clone())
                .then(selection_set.clone().opt().map(Option::unwrap_or_default))
                .map(
                    |((((alias, name), arguments), directives), selection_set)| Field {
                        alias,
                        name,
                        arguments,
                        directives,
                        selection_set,
                    },
                ),
        );
        let spread = node(
            punct("...")
                .skip_then(fragment_name.clone())
                .then(directives.clone())
                .map(|(fragment_name, directives)| FragmentSpread {
                    fragment_name,
                    directives,
                }),
        );
        let inline = node(
            punct("...")
                .skip_then(type_condition.clone().opt())
                .then(directives.clone())
                .then(selection_set.clone())
                .map(|((type_condition, directives), selection_set)| InlineFragment {
                    type_condition,
                    directives,
                    selection_set,
                }),
        );
        let selection = field
            .map(Selection::Field)
            .or(spread.map(Selection::FragmentSpread))
            .or(inline.map(Selection::InlineFragment));
        selection_set_decl.define(
            punct("{")
                .skip_then(selection.many1())
                .then_skip(punct("}")),
        );

        let variable_definition = node(
            punct("$")
                .skip_then(name_token())
                .then_skip(punct(":"))
                .then(ty.clone())
                .then(punct("=").skip_then(const_value.clone()).opt())
                .map(|((name, ty), default_value)| VariableDefinition {
                    name,
                    ty,
                    default_value,
                }),
        );
        let variable_definitions = punct("(")
            .skip_then(variable_definition.many1())
            .then_skip(punct(")"))
            .opt()
            .map(Option::unwrap_or_default);

        let operation_type = keyword("query")
            .map(|_| OperationType::Query)
            .or(keyword("mutation").map(|_| OperationType::Mutation))
            .or(keyword("subscription").map(|_| OperationType::Subscription));
        let named_operation = operation_type
            .then(name_token().opt())
            .then(variable_definitions)
            .then(directives.clone())
            .then(selection_set.clone())
            .map(
                |((((operation_type, name), variables), directives), selection_set)| Operation {
                    operation_type,
                    name,
                    variables,
                    directives,
                    selection_set,
                },
            );
        // Query shorthand: a bare selection set is an anonymous query.
        let shorthand = selection_set.clone().map(|selection_set| Operation {
            operation_type: OperationType::Query,
            name: None,
            variables: Vec::new(),
            directives: Vec::new(),
            selection_set,
        });
        let operation = node(named_operation.or(shorthand));

        let fragment_definition = node(
            keyword("fragment")
                .skip_then(fragment_name)
                .then(type_condition)
                .then(directives)
                .then(selection_set)
                .map(
                    |(((name, type_condition), directives), selection_set)| FragmentDefinition {
                        name,
                        type_condition,
                        directives,
                        selection_set,
                    },
                ),
        );

        enum Definition {
            Operation(Node<Operation>),
            Fragment(Node<FragmentDefinition>),
        }
        let definition = fragment_definition
            .map(Definition::Fragment)
            .or(operation.map(Definition::Operation));
        let document = definition.many1().map(|definitions| {
            let mut document = Document::default();
            for definition in definitions {
                match definition {
                    Definition::Operation(o) => document.operations.push(o),
                    Definition::Fragment(f) => document.fragments.push(f),
                }
            }
            document
        });

        Self {
            document,
            value,
            const_value,
            ty,
        }
    }

    /// Parse a complete request document.
    pub fn parse(&self, source: &str) -> Result<Document, SyntaxError> {
        run(&self.document, source)
    }

    /// Parse a standalone value, variable references allowed.
    pub fn parse_value(&self, source: &str) -> Result<Node<Value>, SyntaxError> {
        run(&self.value, source)
    }

    /// Parse a standalone constant value (no variable references).
    pub fn parse_const_value(&self, source: &str) -> Result<Node<Value>, SyntaxError> {
        run(&self.const_value, source)
    }

    /// Parse a standalone type reference like `[Episode!]!`.
    pub fn parse_type(&self, source: &str) -> Result<Type, SyntaxError> {
        run(&self.ty, source)
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

fn run<T: 'static>(parser: &Parser<T>, source: &str) -> Result<T, SyntaxError> {
    match parser.clone().end().parse(&Input::new(source)) {
        Ok(s) => Ok(s.value),
        Err(failure) => Err(failure.into()),
    }
}

fn punct(s: &'static str) -> Parser<&'static str> {
    literal(s).token()
}

fn name() -> Parser<Name> {
    pattern(NAME_PATTERN, "a name").map(Name::new_unchecked)
}

fn name_token() -> Parser<Name> {
    name().token()
}

fn keyword(kw: &'static str) -> Parser<()> {
    name()
        .try_map(move |n| {
            if n.as_str() == kw {
                Ok(())
            } else {
                Err(Cow::Owned(format!("'{kw}'")))
            }
        })
        .token()
}

/// Wrap a production's output in a span-stamped [`Node`]. Ignored tokens
/// before the node are skipped first so the span starts at its first
/// significant character.
fn node<T: 'static>(parser: Parser<T>) -> Parser<Node<T>> {
    let spanned = parser.spanned().map(|(value, span)| Node::new_parsed(value, span));
    Parser::new(move |input, cx| {
        let start = crate::combinator::text::skip_ignored(input);
        spanned.apply(&start, cx)
    })
}

/// Build the `Value` production graph. Non-constant positions (field
/// arguments) allow variable references; constant positions (variable
/// definition defaults) do not.
fn build_value(allow_variables: bool) -> Parser<Node<Value>> {
    let (value, value_decl) = forward::<Node<Value>>(if allow_variables {
        "value"
    } else {
        "constant value"
    });

    let null = keyword("null").map(|_| Value::Null);
    let boolean = keyword("true")
        .map(|_| Value::Boolean(true))
        .or(keyword("false").map(|_| Value::Boolean(false)));
    let number = pattern(NUMBER_PATTERN, "a number").try_map(parse_number);
    let string = string_value().map(Value::String);
    let enum_value = name().try_map(|n| match n.as_str() {
        // `true`, `false` and `null` are not enum values.
        "true" | "false" | "null" => Err("an enum value".into()),
        _ => Ok(Value::Enum(n)),
    });
    let list = punct("[")
        .skip_then(value.clone().many())
        .then_skip(punct("]"))
        .map(Value::List);
    let object_field = name_token().then_skip(punct(":")).then(value.clone());
    let object = punct("{")
        .skip_then(object_field.many())
        .then_skip(punct("}"))
        .map(Value::Object);

    let mut any = string
        .or(number)
        .or(boolean)
        .or(null)
        .or(enum_value)
        .or(list)
        .or(object);
    if allow_variables {
        let variable = literal("$").skip_then(name()).map(Value::Variable);
        any = variable.or(any);
    }
    value_decl.define(node(any).token());
    value
}

fn build_type() -> Parser<Type> {
    let (ty, ty_decl) = forward::<Type>("type");
    let named = name_token().map(Type::Named);
    let list = punct("[")
        .skip_then(ty.clone())
        .then_skip(punct("]"))
        .map(|inner| Type::List(Box::new(inner)));
    ty_decl.define(
        named
            .or(list)
            .then(punct("!").opt())
            .map(|(inner, bang)| {
                if bang.is_some() {
                    Type::NonNull(Box::new(inner))
                } else {
                    inner
                }
            }),
    );
    ty
}

/// Numeric literal policy: integers try i32 → i64 → 96-bit decimal →
/// arbitrary-precision integer, taking the first representation that holds
/// the literal exactly. Floats stay `Decimal` unless the `f64` parse's exact
/// decimal expansion equals the literal, in which case `f64` loses nothing.
fn parse_number(text: String) -> Result<Value, Cow<'static, str>> {
    let is_float = text.contains(['.', 'e', 'E']);
    if !is_float {
        if let Ok(i) = text.parse::<i32>() {
            return Ok(Value::Int(i));
        }
        if let Ok(l) = text.parse::<i64>() {
            return Ok(Value::Long(l));
        }
        if let Ok(d) = Decimal::from_str(&text) {
            return Ok(Value::Decimal(d));
        }
        return text
            .parse::<BigInt>()
            .map(Value::BigInt)
            .map_err(|_| Cow::Borrowed("an integer"));
    }
    let Ok(double) = text.parse::<f64>() else {
        return Err("a number".into());
    };
    let decimal = if text.contains(['e', 'E']) {
        Decimal::from_scientific(&text).ok()
    } else {
        Decimal::from_str(&text).ok()
    };
    match decimal {
        Some(d) => {
            if Decimal::from_f64_retain(double).is_some_and(|retained| retained == d) {
                Ok(Value::Float(OrderedFloat(double)))
            } else {
                Ok(Value::Decimal(d))
            }
        }
        // Out of decimal range entirely; f64 is the best we can do.
        None => Ok(Value::Float(OrderedFloat(double))),
    }
}

fn string_value() -> Parser<String> {
    Parser::new(|input, _cx| {
        let rest = input.rest();
        if rest.starts_with("\"\"\"") {
            return block_string(input);
        }
        if !rest.starts_with('"') {
            return Err(Failure::new(input.clone(), "a string"));
        }
        let body = &rest[1..];
        let mut out = String::new();
        let mut iter = body.char_indices();
        while let Some((i, c)) = iter.next() {
            match c {
                '"' => {
                    return Ok(Success {
                        value: out,
                        rest: input.advance(1 + i + 1),
                    });
                }
                '\\' => {
                    let Some((j, escape)) = iter.next() else { break };
                    match escape {
                        '"' => out.push('"'),
                        '\\' => out.push('\\'),
                        '/' => out.push('/'),
                        'b' => out.push('\u{0008}'),
                        'f' => out.push('\u{000C}'),
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        'u' => match unicode_escape(&mut iter) {
                            Some(c) => out.push(c),
                            None => {
                                return Err(Failure::new(
                                    input.advance(1 + j),
                                    "a valid Unicode escape",
                                ))
                            }
                        },
                        _ => {
                            return Err(Failure::new(
                                input.advance(1 + i),
                                "a valid escape sequence",
                            ))
                        }
                    }
                }
                // Single-quoted strings are single-line.
                '\n' | '\r' => return Err(Failure::new(input.advance(1 + i), "'\"'")),
                _ => out.push(c),
            }
        }
        Err(Failure::new(input.advance(rest.len()), "'\"'"))
    })
}

fn block_string(input: &Input) -> ParseResult<String> {
    let rest = input.rest();
    let body = &rest[3..];
    let mut raw = String::new();
    let mut i = 0;
    loop {
        let remaining = &body[i..];
        if remaining.starts_with("\\\"\"\"") {
            raw.push_str("\"\"\"");
            i += 4;
        } else if remaining.starts_with("\"\"\"") {
            return Ok(Success {
                value: dedent_block(&raw),
                rest: input.advance(3 + i + 3),
            });
        } else if let Some(c) = remaining.chars().next() {
            raw.push(c);
            i += c.len_utf8();
        } else {
            return Err(Failure::new(input.advance(rest.len()), "'\"\"\"'"));
        }
    }
}

fn unicode_escape(iter: &mut std::str::CharIndices) -> Option<char> {
    let hi = hex4(iter)?;
    if (0xD800..=0xDBFF).contains(&hi) {
        // Surrogate pair: a low half must follow as another \uXXXX escape.
        if iter.next()?.1 != '\\' || iter.next()?.1 != 'u' {
            return None;
        }
        let lo = hex4(iter)?;
        if !(0xDC00..=0xDFFF).contains(&lo) {
            return None;
        }
        char::from_u32(0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00))
    } else {
        char::from_u32(hi)
    }
}

fn hex4(iter: &mut std::str::CharIndices) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..4 {
        let (_, c) = iter.next()?;
        value = value * 16 + c.to_digit(16)?;
    }
    Some(value)
}

/// Strip the common indentation and blank delimiter lines of a block
/// string, per the spec's `BlockStringValue` algorithm.
fn dedent_block(raw: &str) -> String {
    let lines: Vec<&str> = raw
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    let mut common: Option<usize> = None;
    for line in &lines[1..] {
        let trimmed = line.trim_start_matches([' ', '\t']);
        if !trimmed.is_empty() {
            let indent = line.len() - trimmed.len();
            common = Some(common.map_or(indent, |c| c.min(indent)));
        }
    }
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            out.push(line);
        } else {
            let cut = common.unwrap_or(0).min(line.len());
            out.push(&line[cut..]);
        }
    }
    while out
        .first()
        .is_some_and(|l| l.trim_matches([' ', '\t']).is_empty())
    {
        out.remove(0);
    }
    while out
        .last()
        .is_some_and(|l| l.trim_matches([' ', '\t']).is_empty())
    {
        out.pop();
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grammar() -> &'static Grammar {
        static GRAMMAR: OnceLock<Grammar> = OnceLock::new();
        GRAMMAR.get_or_init(Grammar::new)
    }

    fn value(source: &str) -> Value {
        (*grammar().parse_value(source).unwrap()).clone()
    }

    #[test]
    fn int_literals_pick_the_narrowest_representation() {
        assert_eq!(value("0"), Value::Int(0));
        assert_eq!(value("2147483647"), Value::Int(i32::MAX));
        assert_eq!(value("-2147483648"), Value::Int(i32::MIN));
        assert_eq!(value("2147483648"), Value::Long(2147483648));
        assert_eq!(value("9223372036854775807"), Value::Long(i64::MAX));
        assert_eq!(
            value("9223372036854775808"),
            Value::Decimal(Decimal::from_str("9223372036854775808").unwrap())
        );
        let thirty_digits = "123456789012345678901234567890";
        assert_eq!(
            value(thirty_digits),
            Value::BigInt(thirty_digits.parse::<BigInt>().unwrap())
        );
    }

    #[test]
    fn float_literals_keep_exact_decimals() {
        // 12.5 is exactly representable as f64.
        assert_eq!(value("12.5"), Value::Float(OrderedFloat(12.5)));
        // 12.10 is not: the trailing zero must survive.
        assert_eq!(
            value("12.10"),
            Value::Decimal(Decimal::from_str("12.10").unwrap())
        );
    }

    #[test]
    fn keywords_are_not_enum_values() {
        assert_eq!(value("true"), Value::Boolean(true));
        assert_eq!(value("null"), Value::Null);
        assert_eq!(
            value("JEDI"),
            Value::Enum(Name::new("JEDI").unwrap())
        );
        // A name merely starting with a keyword is still an enum value.
        assert_eq!(
            value("nullable"),
            Value::Enum(Name::new("nullable").unwrap())
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            value(r#""line\nbreak é \"quoted\"""#),
            Value::String("line\nbreak é \"quoted\"".to_owned())
        );
        assert_eq!(
            value(r#""emoji 😀""#),
            Value::String("emoji 😀".to_owned())
        );
    }

    #[test]
    fn block_string_dedents() {
        let source = "\"\"\"\n    Hello,\n      World!\n\n    Yours,\n      GraphQL.\n\"\"\"";
        assert_eq!(
            value(source),
            Value::String("Hello,\n  World!\n\nYours,\n  GraphQL.".to_owned())
        );
    }

    #[test]
    fn lists_and_objects_nest() {
        let parsed = value(r#"{ ids: [1, 2], nested: { ok: true } }"#);
        let Value::Object(entries) = parsed else {
            panic!("expected an object, got {parsed:?}");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "ids");
        assert_eq!(
            *entries[0].1,
            Value::List(vec![Node::new(Value::Int(1)), Node::new(Value::Int(2))])
        );
    }

    #[test]
    fn variables_rejected_in_const_positions() {
        assert!(grammar().parse_value("$var").is_ok());
        assert!(grammar().parse_const_value("$var").is_err());
    }

    #[test]
    fn type_references() {
        assert_eq!(
            grammar().parse_type("[Episode!]!").unwrap().to_string(),
            "[Episode!]!"
        );
    }

    #[test]
    fn missing_brace_reports_position_and_expectation() {
        let err = grammar().parse("{ hero ").unwrap_err();
        assert_eq!(
            err.to_string(),
            "syntax error at line 1 column 8: expected '}' but end of source found"
        );
    }
}
