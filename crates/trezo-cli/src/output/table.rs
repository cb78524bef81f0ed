use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use trezo_core::format::format_money;
use trezo_core::Currency;

use super::{result_of, row_set, scalar_to_string};

/// Field-name suffixes that carry money and get French-locale formatting.
const MONEY_SUFFIXES: [&str; 10] = [
    "amount",
    "balance",
    "portion",
    "principal",
    "interest",
    "paid",
    "outstanding",
    "burden",
    "equivalent",
    "contribution",
];

/// Human-readable output: scalar fields, then nested summaries, then rows.
pub fn print_table(value: &Value) {
    let result = result_of(value);
    let Value::Object(map) = result else {
        println!("{}", scalar_to_string(result));
        return;
    };

    let currency = map
        .get("currency")
        .and_then(|c| serde_json::from_value::<Currency>(c.clone()).ok())
        .unwrap_or_default();

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map.iter().filter(|(_, v)| !v.is_object() && !v.is_array()) {
        builder.push_record([key.clone(), cell(key, val, &currency)]);
    }
    println!("{}", Table::from(builder));

    for (key, val) in map {
        if let Value::Object(inner) = val {
            println!("\n{}:", key);
            print_object(inner, &currency);
        }
    }

    if let Some((key, rows)) = row_set(result) {
        println!("\n{} ({}):", key, rows.len());
        print_rows(rows, &currency);
    }

    if let Some(envelope) = value.as_object().filter(|m| m.contains_key("result")) {
        print_notes(envelope);
    }
}

fn print_object(map: &Map<String, Value>, currency: &Currency) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), cell(key, val, currency)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value], currency: &Currency) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(empty)");
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());

    for row in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(h).map(|v| cell(h, v, currency)).unwrap_or_default())
            .collect();
        builder.push_record(record);
    }
    println!("{}", Table::from(builder));
}

fn print_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn cell(key: &str, value: &Value, currency: &Currency) -> String {
    if is_money_key(key) {
        if let Some(amount) = value.as_str().and_then(|s| s.parse::<Decimal>().ok()) {
            return format_money(amount, currency);
        }
    }
    match value {
        Value::Null => "-".to_string(),
        _ => scalar_to_string(value),
    }
}

fn is_money_key(key: &str) -> bool {
    MONEY_SUFFIXES.iter().any(|suffix| key.ends_with(suffix))
}
