//! End-to-end flow: parse a request document, convert it into its
//! executable form, and coerce an argument into a bound Rust type.

use lyra_parser::{parse_document, Grammar};
use lyra_types::doc::ExecutableSelection;
use lyra_types::ty::{ComplexType, FieldBuilder};
use lyra_types::{convert_document, DocumentConverter, InputValue, SchemaBuilder};
use pretty_assertions::assert_eq;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
struct ReviewInput {
    stars: i32,
    commentary: Option<String>,
}

#[test]
fn a_parsed_argument_coerces_into_a_bound_type() {
    let builder = SchemaBuilder::new();
    let mut review = ComplexType::input_object("ReviewInput").unwrap();
    review
        .add_field(
            builder.registry(),
            FieldBuilder::new("stars").of_type("Int!").build().unwrap(),
        )
        .unwrap();
    review
        .add_field(
            builder.registry(),
            FieldBuilder::new("commentary")
                .of_type("String")
                .build()
                .unwrap(),
        )
        .unwrap();
    let schema = builder
        .register(review)
        .unwrap()
        .bind_input::<ReviewInput>("ReviewInput")
        .build()
        .unwrap();

    let document = parse_document(
        r#"mutation {
            createReview(review: { stars: 5, commentary: "fun and exact" }) {
                stars
            }
        }"#,
    )
    .unwrap();
    let executable = convert_document(&document).unwrap();
    let ExecutableSelection::Field(create) = &executable.operations[0].selection_set[0] else {
        panic!("expected a field");
    };
    let review = schema
        .input_converter::<ReviewInput>("ReviewInput")
        .unwrap()
        .convert_value(&create.arguments["review"])
        .unwrap();
    assert_eq!(
        review,
        Some(ReviewInput {
            stars: 5,
            commentary: Some("fun and exact".to_owned()),
        })
    );
}

#[test]
fn standalone_values_convert_through_the_same_path() {
    let grammar = Grammar::new();
    let parsed = grammar
        .parse_const_value(r#"{ stars: 5, commentary: null }"#)
        .unwrap();
    let value = DocumentConverter::new().convert_value(&parsed).unwrap();
    let InputValue::Object(map) = value else {
        panic!("expected an object, got {value}");
    };
    assert_eq!(map["stars"], InputValue::Int(5));
    assert_eq!(map["commentary"], InputValue::Null);
}

#[test]
fn response_keys_prefer_aliases() {
    let document = parse_document("{ five: createdAt }").unwrap();
    let executable = convert_document(&document).unwrap();
    let ExecutableSelection::Field(field) = &executable.operations[0].selection_set[0] else {
        panic!("expected a field");
    };
    assert_eq!(field.response_key().as_str(), "five");
}
