#![no_main]

use arbitrary::Arbitrary;
use hostlog_pipeline::{FieldBag, FieldNames, FieldValue};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Str(String),
    Int(i64),
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    host: String,
    fields: Vec<(String, FuzzValue)>,
    hostname_field: String,
    content_field: String,
}

fuzz_target!(|input: FuzzInput| {
    let bag: FieldBag = input
        .fields
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                FuzzValue::Str(s) => FieldValue::Str(s),
                FuzzValue::Int(i) => FieldValue::Int(i),
            };
            (key, value)
        })
        .collect();

    let names = FieldNames {
        hostname: input.hostname_field,
        content: input.content_field,
        ..FieldNames::default()
    };
    let entry = names.normalize(&input.host, &bag);
    assert_eq!(entry.host_identity, input.host);
});
